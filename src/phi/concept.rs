//! Concepts: core causes, core effects, and conceptual structures
//!
//! A mechanism's core cause (effect) is the purview that maximizes its
//! cause (effect) small phi. A concept exists only when both cores exist
//! with positive phi; its phi is the smaller of the two. The conceptual
//! structure of a candidate set collects the concepts of all its non-empty
//! mechanisms in canonical enumeration order.
//!
//! `None` cores are a distinct outcome from a purview whose phi happens to
//! be zero; the two are never conflated.

use std::sync::Arc;

use tracing::debug;

use super::small::{SmallPhi, SmallPhiEvaluator};
use crate::error::{PhiError, Result};
use crate::partition::{MechanismPartition, Subsets};
use crate::repertoire::{Direction, Repertoire};
use crate::system::{ElementSet, Mechanism};

/// A core cause or core effect: the phi-maximizing purview with its
/// repertoire and minimum information partition.
#[derive(Debug, Clone)]
pub struct CoreRepertoire {
    pub direction: Direction,
    pub purview: ElementSet,
    pub phi: f64,
    pub repertoire: Arc<Repertoire>,
    pub mip: MechanismPartition,
}

/// A mechanism with its core cause and core effect
#[derive(Debug, Clone)]
pub struct Concept {
    pub mechanism: Mechanism,
    pub cause: CoreRepertoire,
    pub effect: CoreRepertoire,
    /// min(cause phi, effect phi)
    pub phi: f64,
}

/// Finds core causes, core effects, and concepts within a candidate set
#[derive(Debug, Clone, Copy)]
pub struct ConceptFinder<'a> {
    small: SmallPhiEvaluator<'a>,
}

impl<'a> ConceptFinder<'a> {
    pub fn new(small: SmallPhiEvaluator<'a>) -> Self {
        ConceptFinder { small }
    }

    pub fn evaluator(&self) -> SmallPhiEvaluator<'a> {
        self.small
    }

    /// Core purview of `mechanism` within `candidate` for one direction.
    ///
    /// Keeps the strictly largest phi; exact ties prefer the purview with
    /// more elements, then the earlier purview in canonical order. Returns
    /// `None` when no purview achieves positive phi.
    pub fn core(
        &self,
        direction: Direction,
        mechanism: &Mechanism,
        candidate: ElementSet,
    ) -> Result<Option<CoreRepertoire>> {
        if mechanism.elements.is_empty() {
            return Err(PhiError::EmptyInput {
                operation: "core purview search",
                what: "mechanism",
            });
        }

        let mut best: Option<CoreRepertoire> = None;
        for purview in Subsets::non_empty(candidate) {
            if self.small.budget().is_exceeded() {
                break;
            }
            let result = self.small.small_phi(direction, mechanism, purview)?;
            if !result.is_positive() {
                continue;
            }
            let SmallPhi {
                phi,
                repertoire,
                mip: Some(mip),
                ..
            } = result
            else {
                // Budget ran out mid-purview; nothing completed to rank
                continue;
            };
            let better = match &best {
                None => true,
                Some(incumbent) => {
                    phi > incumbent.phi
                        || (phi == incumbent.phi && purview.len() > incumbent.purview.len())
                }
            };
            if better {
                best = Some(CoreRepertoire {
                    direction,
                    purview,
                    phi,
                    repertoire,
                    mip,
                });
            }
        }
        Ok(best)
    }

    pub fn core_cause(
        &self,
        mechanism: &Mechanism,
        candidate: ElementSet,
    ) -> Result<Option<CoreRepertoire>> {
        self.core(Direction::Cause, mechanism, candidate)
    }

    pub fn core_effect(
        &self,
        mechanism: &Mechanism,
        candidate: ElementSet,
    ) -> Result<Option<CoreRepertoire>> {
        self.core(Direction::Effect, mechanism, candidate)
    }

    /// Concept of `mechanism` within `candidate`: exists only when both the
    /// core cause and the core effect exist.
    pub fn concept(
        &self,
        mechanism: &Mechanism,
        candidate: ElementSet,
    ) -> Result<Option<Concept>> {
        let Some(cause) = self.core_cause(mechanism, candidate)? else {
            return Ok(None);
        };
        let Some(effect) = self.core_effect(mechanism, candidate)? else {
            return Ok(None);
        };
        let phi = cause.phi.min(effect.phi);
        Ok(Some(Concept {
            mechanism: *mechanism,
            cause,
            effect,
            phi,
        }))
    }
}

/// The set of concepts a candidate set gives rise to, in canonical
/// mechanism enumeration order.
#[derive(Debug, Clone, Default)]
pub struct ConceptualStructure {
    pub candidate: ElementSet,
    pub concepts: Vec<Concept>,
}

impl ConceptualStructure {
    pub fn len(&self) -> usize {
        self.concepts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.concepts.is_empty()
    }

    /// Total phi across concepts
    pub fn sum_phi(&self) -> f64 {
        self.concepts.iter().map(|c| c.phi).sum()
    }
}

/// Assembles the conceptual structure of a candidate set
#[derive(Debug, Clone, Copy)]
pub struct ConceptualStructureBuilder<'a> {
    finder: ConceptFinder<'a>,
}

impl<'a> ConceptualStructureBuilder<'a> {
    pub fn new(finder: ConceptFinder<'a>) -> Self {
        ConceptualStructureBuilder { finder }
    }

    /// Concepts of every non-empty mechanism of `candidate`, in canonical
    /// order. The empty mechanism has no cause-effect power and is excluded
    /// by definition.
    pub fn build(&self, candidate: ElementSet) -> Result<ConceptualStructure> {
        let mut concepts = Vec::new();
        for elements in Subsets::non_empty(candidate) {
            if self.finder.evaluator().budget().is_exceeded() {
                break;
            }
            let mechanism = self.finder.evaluator().system().mechanism(elements);
            if let Some(concept) = self.finder.concept(&mechanism, candidate)? {
                debug!(
                    mechanism = %elements,
                    phi = concept.phi,
                    cause_purview = %concept.cause.purview,
                    effect_purview = %concept.effect.purview,
                    "found concept"
                );
                concepts.push(concept);
            }
        }
        Ok(ConceptualStructure {
            candidate,
            concepts,
        })
    }
}
