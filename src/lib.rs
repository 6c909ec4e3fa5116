//! # phi-complex
//!
//! Integrated Information (Φ) and Major Complex Search for Discrete
//! Dynamical Systems
//!
//! ## Theoretical Framework
//!
//! This crate implements the cause-effect analysis of integrated
//! information theory for finite discrete systems given by a transition
//! probability matrix over joint states.
//!
//! ### Central Quantity
//!
//! A set of elements is integrated to the degree that its cause-effect
//! structure cannot be reproduced by any partition. Irreducibility is
//! measured at two levels:
//!
//! 1. **Small phi (φ)**: For a mechanism in its current state and a
//!    purview of elements, the minimum earth mover's distance between the
//!    mechanism's cause (effect) repertoire and the product repertoire of
//!    any bipartition of the mechanism/purview pair.
//!
//! 2. **Big phi (Φ)**: For a candidate set, the minimum extended EMD
//!    between its conceptual structure (the φ-weighted concepts of all its
//!    mechanisms) and the structure remaining after any unidirectional cut
//!    severing connections from one part to the rest.
//!
//! ### Major Complex
//!
//! The major complex is the subset of the system with maximal Φ. The
//! search enumerates every non-empty candidate subset, evaluates its Φ
//! over all unidirectional cuts, and selects the maximum with a
//! deterministic canonical-order tie-break, so results are reproducible
//! across runs and thread schedules.
//!
//! ## Pipeline
//!
//!   TPM → repertoires → small-phi MIPs → concepts → conceptual
//!   structure → big phi over cuts → major complex
//!
//! ## References
//!
//! - Oizumi, Albantakis & Tononi, "From the Phenomenology to the
//!   Mechanisms of Consciousness: Integrated Information Theory 3.0",
//!   PLoS Comput Biol 10(5) (2014)
//! - Tononi, "An information integration theory of consciousness",
//!   BMC Neuroscience 5:42 (2004)
//! - Pele & Werman, "Fast and Robust Earth Mover's Distances", ICCV (2009)

pub mod distance;
pub mod error;
pub mod partition;
pub mod phi;
pub mod repertoire;
pub mod system;

// Re-exports from error handling
pub use error::{PhiError, Result};

// Re-exports from system
pub use system::{ElementSet, Mechanism, StateSpace, System, Tpm};

// Re-exports from repertoire
pub use repertoire::{Direction, Repertoire, RepertoireCache, RepertoireEngine};

// Re-exports from distance
pub use distance::{
    min_cost_transport,
    DiscreteMetric,
    DistanceEngine,
    GroundMetric,
    Hamming,
};

// Re-exports from partition
pub use partition::{
    MechanismPartition,
    MechanismPartitions,
    PartitionPart,
    Subsets,
    SystemCut,
    SystemCuts,
};

// Re-exports from phi
pub use phi::{
    // Small phi (mechanism level)
    SmallPhi,
    SmallPhiEvaluator,
    // Concepts and conceptual structures
    Concept,
    ConceptFinder,
    ConceptualStructure,
    ConceptualStructureBuilder,
    CoreRepertoire,
    // Big phi (candidate-set level)
    xemd,
    BigPhiEvaluator,
    BigPhiResult,
    // Major complex search
    MajorComplex,
    MajorComplexOutcome,
    MajorComplexSearch,
    // Search control
    PhiConfig,
    SearchBudget,
    SearchStatus,
    PHI_TOLERANCE,
};
