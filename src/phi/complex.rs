//! Major complex search
//!
//! Enumerates every non-empty subset of the system as a candidate set,
//! evaluates its big phi, and selects the maximum. Candidate evaluations
//! are independent and run on worker threads; the reduction always applies
//! the canonical-order tie-break (larger big phi, then more elements, then
//! the earlier canonical subset), never arrival order, so parallel runs are
//! bit-identical to serial ones.
//!
//! The repertoire cache is scoped to one invocation: candidate subsets of
//! the same system overlap heavily in the repertoires they query, so the
//! cache is shared across candidates but never across invocations.

use rayon::prelude::*;
use tracing::debug;

use super::big::{BigPhiEvaluator, BigPhiResult};
use super::concept::ConceptualStructure;
use super::{PhiConfig, SearchBudget, SearchStatus, PHI_TOLERANCE};
use crate::distance::DistanceEngine;
use crate::error::{PhiError, Result};
use crate::partition::{Subsets, SystemCut};
use crate::repertoire::RepertoireCache;
use crate::system::{ElementSet, System};

/// The candidate subset with maximal big phi
#[derive(Debug, Clone)]
pub struct MajorComplex {
    pub candidate: ElementSet,
    pub big_phi: f64,
    pub mip: Option<SystemCut>,
    pub structure: ConceptualStructure,
}

/// Outcome of a major-complex search
#[derive(Debug, Clone)]
pub struct MajorComplexOutcome {
    /// `None` when no subset has positive big phi (fully reducible system)
    pub complex: Option<MajorComplex>,
    pub status: SearchStatus,
    /// Partition/cut evaluations charged against the budget
    pub evaluations: u64,
}

/// Top-level search over every candidate subset of a system
pub struct MajorComplexSearch<'a> {
    system: &'a System,
    config: PhiConfig,
    distance: DistanceEngine,
}

impl<'a> MajorComplexSearch<'a> {
    pub fn new(system: &'a System) -> Self {
        MajorComplexSearch {
            system,
            config: PhiConfig::default(),
            distance: DistanceEngine::default(),
        }
    }

    pub fn with_config(mut self, config: PhiConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_distance(mut self, distance: DistanceEngine) -> Self {
        self.distance = distance;
        self
    }

    /// Run the search.
    ///
    /// Returns the major complex with its big phi, MIP, and conceptual
    /// structure, plus the completion status. A budget ceiling yields the
    /// best candidate found from the completed work, tagged
    /// `CeilingExceeded`.
    pub fn run(&self) -> Result<MajorComplexOutcome> {
        if self.system.n_elements() == 0 {
            return Err(PhiError::EmptyInput {
                operation: "major complex search",
                what: "system",
            });
        }

        let budget = SearchBudget::new(&self.config);
        let cache = RepertoireCache::new();
        let candidates: Vec<ElementSet> =
            Subsets::non_empty(self.system.all_elements()).collect();

        let evaluate = |candidate: &ElementSet| -> Result<BigPhiResult> {
            let result = BigPhiEvaluator::with_cache(self.system, &cache, &self.distance, &budget)
                .big_phi(*candidate)?;
            debug!(
                candidate = %result.candidate,
                big_phi = result.big_phi,
                "evaluated candidate set"
            );
            Ok(result)
        };

        // Candidate order is preserved by the indexed collect, so the
        // reduction below sees canonical order regardless of scheduling.
        let results: Vec<BigPhiResult> = if self.config.parallel {
            candidates
                .par_iter()
                .map(evaluate)
                .collect::<Result<Vec<_>>>()?
        } else {
            candidates
                .iter()
                .map(evaluate)
                .collect::<Result<Vec<_>>>()?
        };

        let mut best: Option<BigPhiResult> = None;
        for result in results {
            let better = match &best {
                None => true,
                Some(incumbent) => {
                    result.big_phi > incumbent.big_phi
                        || (result.big_phi == incumbent.big_phi
                            && result.candidate.len() > incumbent.candidate.len())
                }
            };
            if better {
                best = Some(result);
            }
        }

        let complex = best
            .filter(|result| result.big_phi > PHI_TOLERANCE)
            .map(|result| MajorComplex {
                candidate: result.candidate,
                big_phi: result.big_phi,
                mip: result.mip,
                structure: result.structure,
            });

        Ok(MajorComplexOutcome {
            complex,
            status: budget.status(),
            evaluations: budget.evaluations(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::builders;

    fn set(indices: &[usize]) -> ElementSet {
        ElementSet::from_indices(indices.iter().copied())
    }

    #[test]
    fn test_disconnected_system_has_no_complex() {
        let system = builders::independent_pair(0);
        let outcome = MajorComplexSearch::new(&system).run().unwrap();
        assert_eq!(outcome.status, SearchStatus::Complete);
        assert!(outcome.complex.is_none());
    }

    #[test]
    fn test_and_pair_complex_is_the_whole_system() {
        let system = builders::and_pair(3);
        let outcome = MajorComplexSearch::new(&system).run().unwrap();
        let complex = outcome.complex.expect("AND pair must be integrated");
        assert_eq!(complex.candidate, set(&[0, 1]));
        assert!(complex.big_phi > 0.0);
        assert!(complex.mip.is_some());
    }

    #[test]
    fn test_search_is_deterministic_across_runs() {
        let system = builders::majority_triple(7);
        let first = MajorComplexSearch::new(&system).run().unwrap();
        let second = MajorComplexSearch::new(&system).run().unwrap();
        match (&first.complex, &second.complex) {
            (Some(a), Some(b)) => {
                assert_eq!(a.candidate, b.candidate);
                assert_eq!(a.big_phi.to_bits(), b.big_phi.to_bits());
                assert_eq!(a.mip, b.mip);
                assert_eq!(a.structure.len(), b.structure.len());
            }
            (None, None) => {}
            _ => panic!("runs disagreed on complex existence"),
        }
    }

    #[test]
    fn test_parallel_matches_serial() {
        let system = builders::majority_triple(7);
        let parallel = MajorComplexSearch::new(&system).run().unwrap();
        let serial = MajorComplexSearch::new(&system)
            .with_config(PhiConfig {
                parallel: false,
                ..PhiConfig::default()
            })
            .run()
            .unwrap();
        match (&parallel.complex, &serial.complex) {
            (Some(a), Some(b)) => {
                assert_eq!(a.candidate, b.candidate);
                assert_eq!(a.big_phi.to_bits(), b.big_phi.to_bits());
            }
            (None, None) => {}
            _ => panic!("parallel and serial runs disagreed"),
        }
    }

    #[test]
    fn test_brute_force_oracle() {
        // The selected complex's big phi dominates every other subset
        let system = builders::majority_triple(7);
        let outcome = MajorComplexSearch::new(&system).run().unwrap();
        if let Some(complex) = &outcome.complex {
            let distance = DistanceEngine::default();
            let budget = SearchBudget::unlimited();
            let evaluator = BigPhiEvaluator::new(&system, &distance, &budget);
            for bits in 1u64..8 {
                let result = evaluator.big_phi(ElementSet::from_bits(bits)).unwrap();
                assert!(complex.big_phi >= result.big_phi - 1e-12);
            }
        }
    }

    #[test]
    fn test_ceiling_reports_incomplete() {
        let system = builders::and_pair(3);
        let outcome = MajorComplexSearch::new(&system)
            .with_config(PhiConfig {
                max_evaluations: Some(1),
                parallel: false,
                ..PhiConfig::default()
            })
            .run()
            .unwrap();
        assert_eq!(outcome.status, SearchStatus::CeilingExceeded);
        // The partial result is still well-formed (possibly no complex)
        assert!(outcome.evaluations >= 1);
    }

    #[test]
    fn test_empty_system_is_an_error() {
        use crate::system::{StateSpace, System, Tpm};
        use ndarray::Array2;
        let space = StateSpace::new(Vec::new());
        let tpm = Tpm::new(space, Array2::ones((1, 1))).unwrap();
        let system = System::new(tpm, 0);
        let err = MajorComplexSearch::new(&system).run().unwrap_err();
        assert!(matches!(err, PhiError::EmptyInput { .. }));
    }
}
