//! Small phi: irreducibility of a mechanism/purview pair
//!
//! The minimum EMD between the pair's repertoire and the product repertoire
//! of any bipartition. The partition achieving the minimum (the MIP) is part
//! of the result's provenance. Ties at the minimum resolve to the partition
//! that enumerates first in canonical order: the loop iterates in canonical
//! order and replaces the incumbent only on a strictly smaller distance.

use std::sync::Arc;

use tracing::trace;

use super::{SearchBudget, PHI_TOLERANCE};
use crate::distance::DistanceEngine;
use crate::error::Result;
use crate::partition::{MechanismPartition, MechanismPartitions};
use crate::repertoire::{Direction, Repertoire, RepertoireCache, RepertoireEngine};
use crate::system::{ElementSet, Mechanism, System};

/// Result of a small-phi evaluation
#[derive(Debug, Clone)]
pub struct SmallPhi {
    pub direction: Direction,
    pub mechanism: Mechanism,
    pub purview: ElementSet,
    /// Minimum distance over all partitions (0 for an empty purview)
    pub phi: f64,
    /// Unpartitioned repertoire
    pub repertoire: Arc<Repertoire>,
    /// Minimum information partition; `None` only for the empty-purview
    /// short-circuit or when the budget ran out before any partition
    pub mip: Option<MechanismPartition>,
    /// Product repertoire at the MIP
    pub partitioned: Option<Repertoire>,
}

impl SmallPhi {
    /// Whether the pair is irreducible beyond float noise
    pub fn is_positive(&self) -> bool {
        self.phi > PHI_TOLERANCE
    }
}

/// Minimum-information-partition search for one mechanism/purview pair
#[derive(Debug, Clone, Copy)]
pub struct SmallPhiEvaluator<'a> {
    repertoires: RepertoireEngine<'a>,
    distance: &'a DistanceEngine,
    budget: &'a SearchBudget,
}

impl<'a> SmallPhiEvaluator<'a> {
    pub fn new(
        system: &'a System,
        distance: &'a DistanceEngine,
        budget: &'a SearchBudget,
    ) -> Self {
        SmallPhiEvaluator {
            repertoires: RepertoireEngine::new(system),
            distance,
            budget,
        }
    }

    pub fn with_cache(
        system: &'a System,
        cache: &'a RepertoireCache,
        distance: &'a DistanceEngine,
        budget: &'a SearchBudget,
    ) -> Self {
        SmallPhiEvaluator {
            repertoires: RepertoireEngine::with_cache(system, cache),
            distance,
            budget,
        }
    }

    pub fn repertoires(&self) -> RepertoireEngine<'a> {
        self.repertoires
    }

    pub fn budget(&self) -> &'a SearchBudget {
        self.budget
    }

    pub fn system(&self) -> &'a System {
        self.repertoires.system()
    }

    /// Small phi of `(mechanism, purview)` in the given direction.
    ///
    /// An empty purview short-circuits to phi 0 (maximally uninformative),
    /// which is a defined outcome, not an error.
    pub fn small_phi(
        &self,
        direction: Direction,
        mechanism: &Mechanism,
        purview: ElementSet,
    ) -> Result<SmallPhi> {
        if purview.is_empty() {
            return Ok(SmallPhi {
                direction,
                mechanism: *mechanism,
                purview,
                phi: 0.0,
                repertoire: Arc::new(Repertoire::unit(direction)),
                mip: None,
                partitioned: None,
            });
        }

        let whole = self.repertoires.repertoire(direction, mechanism, purview)?;

        let mut best: Option<(f64, MechanismPartition, Repertoire)> = None;
        for partition in MechanismPartitions::new(mechanism.elements, purview) {
            if !self.budget.charge() {
                break;
            }
            let parted = self.repertoires.partitioned(direction, &partition)?;
            let distance = self.distance.emd(&whole, &parted);
            trace!(
                partition = %partition,
                distance,
                "evaluated mechanism partition"
            );
            // Strict comparison keeps the first partition in canonical
            // order on exact ties
            if best.as_ref().map_or(true, |(d, _, _)| distance < *d) {
                best = Some((distance, partition, parted));
            }
        }

        match best {
            Some((phi, mip, partitioned)) => Ok(SmallPhi {
                direction,
                mechanism: *mechanism,
                purview,
                phi,
                repertoire: whole,
                mip: Some(mip),
                partitioned: Some(partitioned),
            }),
            // Budget exhausted before any partition: incomplete, phi
            // defaults to the reducible value
            None => Ok(SmallPhi {
                direction,
                mechanism: *mechanism,
                purview,
                phi: 0.0,
                repertoire: whole,
                mip: None,
                partitioned: None,
            }),
        }
    }

    pub fn small_phi_cause(&self, mechanism: &Mechanism, purview: ElementSet) -> Result<SmallPhi> {
        self.small_phi(Direction::Cause, mechanism, purview)
    }

    pub fn small_phi_effect(&self, mechanism: &Mechanism, purview: ElementSet) -> Result<SmallPhi> {
        self.small_phi(Direction::Effect, mechanism, purview)
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
    fn test_empty_purview_is_zero() {
        let system = builders::and_pair(3);
        let distance = DistanceEngine::default();
        let budget = SearchBudget::unlimited();
        let evaluator = SmallPhiEvaluator::new(&system, &distance, &budget);
        let m = system.mechanism(set(&[0]));
        for direction in [Direction::Cause, Direction::Effect] {
            let result = evaluator
                .small_phi(direction, &m, ElementSet::EMPTY)
                .unwrap();
            assert_eq!(result.phi, 0.0);
            assert!(result.mip.is_none());
        }
    }

    #[test]
    fn test_and_pair_known_values() {
        // Worked by hand for the AND pair at (1, 1), mechanism {0},
        // purview {1}: the single partition {0}/∅ x ∅/{1} gives
        //   cause: EMD((0, 1), (1/2, 1/2)) = 1/2
        //   effect: EMD((1/2, 1/2), (3/4, 1/4)) = 1/4
        let system = builders::and_pair(3);
        let distance = DistanceEngine::default();
        let budget = SearchBudget::unlimited();
        let evaluator = SmallPhiEvaluator::new(&system, &distance, &budget);
        let m = system.mechanism(set(&[0]));

        let cause = evaluator.small_phi_cause(&m, set(&[1])).unwrap();
        assert!((cause.phi - 0.5).abs() < 1e-10);
        assert!(cause.mip.is_some());

        let effect = evaluator.small_phi_effect(&m, set(&[1])).unwrap();
        assert!((effect.phi - 0.25).abs() < 1e-10);
    }

    #[test]
    fn test_phi_is_non_negative() {
        let system = builders::majority_triple(7);
        let distance = DistanceEngine::default();
        let budget = SearchBudget::unlimited();
        let evaluator = SmallPhiEvaluator::new(&system, &distance, &budget);
        for mech_bits in 1u64..8 {
            let m = system.mechanism(ElementSet::from_bits(mech_bits));
            for purview_bits in 1u64..8 {
                let purview = ElementSet::from_bits(purview_bits);
                for direction in [Direction::Cause, Direction::Effect] {
                    let result = evaluator.small_phi(direction, &m, purview).unwrap();
                    assert!(result.phi >= 0.0);
                }
            }
        }
    }

    #[test]
    fn test_independent_elements_are_reducible() {
        // Self-copying elements: mechanism {0} over purview {1} constrains
        // nothing, so the partition reproduces the repertoire exactly
        let system = builders::independent_pair(0);
        let distance = DistanceEngine::default();
        let budget = SearchBudget::unlimited();
        let evaluator = SmallPhiEvaluator::new(&system, &distance, &budget);
        let m = system.mechanism(set(&[0]));
        let result = evaluator.small_phi_cause(&m, set(&[1])).unwrap();
        assert!(result.phi.abs() < 1e-10);
    }

    #[test]
    fn test_results_are_idempotent() {
        let system = builders::and_pair(3);
        let distance = DistanceEngine::default();
        let budget = SearchBudget::unlimited();
        let evaluator = SmallPhiEvaluator::new(&system, &distance, &budget);
        let m = system.mechanism(set(&[0, 1]));
        let first = evaluator.small_phi_cause(&m, set(&[0, 1])).unwrap();
        let second = evaluator.small_phi_cause(&m, set(&[0, 1])).unwrap();
        assert_eq!(first.phi.to_bits(), second.phi.to_bits());
        assert_eq!(first.mip, second.mip);
        assert_eq!(first.repertoire.probs, second.repertoire.probs);
    }
}
