//! Repertoire Engine: Cause and Effect Distributions
//!
//! A repertoire is the probability distribution over a purview's states
//! conditioned on a mechanism's current state:
//!
//! - **cause**: Bayesian inversion with a uniform prior over past joint
//!   states — which past purview states could have produced the mechanism's
//!   current state;
//! - **effect**: the TPM rows consistent with the mechanism state, averaged
//!   and marginalized onto the purview — which future purview states the
//!   mechanism constrains.
//!
//! Elements outside the purview are always marginalized uniformly
//! (maximum-entropy treatment of unconstrained elements). An empty purview
//! yields the unit distribution over the empty state space, which consumers
//! treat as carrying zero information.
//!
//! Conditioning on a mechanism state that no past state can produce is a
//! hard error (`DegenerateConditioning`), never a silent zero: coercing it
//! would corrupt every minimum/maximum selection downstream.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use ndarray::Array1;

use crate::error::{PhiError, Result};
use crate::partition::MechanismPartition;
use crate::system::{ElementSet, Mechanism, StateSpace, System};

/// Cause (past) or effect (future) direction of a repertoire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Cause,
    Effect,
}

/// A probability distribution over a purview's states
#[derive(Debug, Clone, PartialEq)]
pub struct Repertoire {
    pub direction: Direction,
    pub purview: ElementSet,
    /// State space of the purview (ascending element order)
    pub space: StateSpace,
    pub probs: Array1<f64>,
}

impl Repertoire {
    /// Unit distribution over the empty purview
    pub fn unit(direction: Direction) -> Self {
        Repertoire {
            direction,
            purview: ElementSet::EMPTY,
            space: StateSpace::new(Vec::new()),
            probs: Array1::ones(1),
        }
    }

    pub fn n_states(&self) -> usize {
        self.probs.len()
    }

    /// Maximum-entropy expansion onto a superset of the purview.
    ///
    /// Elements of `target` not in the purview are distributed uniformly.
    /// `system_space` is the full system's state space, which fixes the
    /// cardinalities of the added elements.
    pub fn expand(&self, system_space: &StateSpace, target: ElementSet) -> Repertoire {
        debug_assert!(self.purview.is_subset_of(target));
        let target_space = system_space.sub_space(target);
        let added = target.difference(self.purview);
        let scale = 1.0 / system_space.sub_space(added).n_states() as f64;

        let mut probs = Array1::zeros(target_space.n_states());
        for z in 0..target_space.n_states() {
            let inner = system_space.project_between(target, z, self.purview);
            probs[z] = self.probs[inner] * scale;
        }

        Repertoire {
            direction: self.direction,
            purview: target,
            space: target_space,
            probs,
        }
    }
}

/// Memoization cache for repertoire queries.
///
/// Keyed by (direction, mechanism, mechanism state, purview). Scoped to
/// exactly one top-level query: `MajorComplexSearch` creates one per
/// invocation and each cut system gets its own short-lived cache. Never
/// shared across independent `System` instances.
#[derive(Debug, Default)]
pub struct RepertoireCache {
    map: Mutex<HashMap<(Direction, u64, usize, u64), Arc<Repertoire>>>,
}

impl RepertoireCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.map.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Computes cause/effect repertoires against one immutable system
#[derive(Debug, Clone, Copy)]
pub struct RepertoireEngine<'a> {
    system: &'a System,
    cache: Option<&'a RepertoireCache>,
}

impl<'a> RepertoireEngine<'a> {
    pub fn new(system: &'a System) -> Self {
        RepertoireEngine {
            system,
            cache: None,
        }
    }

    pub fn with_cache(system: &'a System, cache: &'a RepertoireCache) -> Self {
        RepertoireEngine {
            system,
            cache: Some(cache),
        }
    }

    pub fn system(&self) -> &'a System {
        self.system
    }

    /// Repertoire of `purview` conditioned on the mechanism's current state
    pub fn repertoire(
        &self,
        direction: Direction,
        mechanism: &Mechanism,
        purview: ElementSet,
    ) -> Result<Arc<Repertoire>> {
        if purview.is_empty() {
            return Ok(Arc::new(Repertoire::unit(direction)));
        }

        let key = (
            direction,
            mechanism.elements.bits(),
            mechanism.state,
            purview.bits(),
        );
        if let Some(cache) = self.cache {
            if let Some(hit) = cache.map.lock().unwrap().get(&key) {
                return Ok(Arc::clone(hit));
            }
        }

        let computed = Arc::new(match direction {
            Direction::Cause => self.compute_cause(mechanism, purview)?,
            Direction::Effect => self.compute_effect(mechanism, purview)?,
        });

        if let Some(cache) = self.cache {
            cache
                .map
                .lock()
                .unwrap()
                .insert(key, Arc::clone(&computed));
        }
        Ok(computed)
    }

    pub fn cause(&self, mechanism: &Mechanism, purview: ElementSet) -> Result<Arc<Repertoire>> {
        self.repertoire(Direction::Cause, mechanism, purview)
    }

    pub fn effect(&self, mechanism: &Mechanism, purview: ElementSet) -> Result<Arc<Repertoire>> {
        self.repertoire(Direction::Effect, mechanism, purview)
    }

    fn compute_cause(&self, mechanism: &Mechanism, purview: ElementSet) -> Result<Repertoire> {
        let space = self.system.space();
        let tpm = self.system.tpm();
        let n = space.n_states();
        let sub = space.sub_space(purview);
        let mut probs = Array1::zeros(sub.n_states());

        // r[z] accumulates, over past states s projecting to z, the
        // probability that s produces the mechanism's current state. The
        // uniform prior is a constant and cancels in normalization.
        for s in 0..n {
            let mut weight = 0.0;
            for next in 0..n {
                if space.project(next, mechanism.elements) == mechanism.state {
                    weight += tpm.prob(s, next);
                }
            }
            probs[space.project(s, purview)] += weight;
        }

        let total = probs.sum();
        if total <= 0.0 {
            return Err(PhiError::DegenerateConditioning {
                mechanism: mechanism.elements,
                state: mechanism.state,
                purview,
            });
        }
        probs /= total;

        Ok(Repertoire {
            direction: Direction::Cause,
            purview,
            space: sub,
            probs,
        })
    }

    fn compute_effect(&self, mechanism: &Mechanism, purview: ElementSet) -> Result<Repertoire> {
        let space = self.system.space();
        let tpm = self.system.tpm();
        let n = space.n_states();
        let sub = space.sub_space(purview);
        let mut probs = Array1::zeros(sub.n_states());

        // Average the TPM rows of all current states consistent with the
        // mechanism state, marginalized onto the purview.
        for s in 0..n {
            if space.project(s, mechanism.elements) != mechanism.state {
                continue;
            }
            for next in 0..n {
                probs[space.project(next, purview)] += tpm.prob(s, next);
            }
        }

        let total = probs.sum();
        if total <= 0.0 {
            return Err(PhiError::DegenerateConditioning {
                mechanism: mechanism.elements,
                state: mechanism.state,
                purview,
            });
        }
        probs /= total;

        Ok(Repertoire {
            direction: Direction::Effect,
            purview,
            space: sub,
            probs,
        })
    }

    /// Product repertoire of a partitioned mechanism/purview pair.
    ///
    /// Each part's repertoire is computed independently and the result is
    /// their product over the joint purview state space.
    pub fn partitioned(
        &self,
        direction: Direction,
        partition: &MechanismPartition,
    ) -> Result<Repertoire> {
        let space = self.system.space();
        let purview = partition.parts[0]
            .purview
            .union(partition.parts[1].purview);
        debug_assert!(partition.parts[0]
            .purview
            .is_disjoint_from(partition.parts[1].purview));

        let mut factors = Vec::with_capacity(2);
        for part in &partition.parts {
            if part.purview.is_empty() {
                continue;
            }
            let part_mechanism = self.system.mechanism(part.mechanism);
            factors.push((
                part.purview,
                self.repertoire(direction, &part_mechanism, part.purview)?,
            ));
        }

        let sub = space.sub_space(purview);
        let mut probs = Array1::ones(sub.n_states());
        for z in 0..sub.n_states() {
            for (part_purview, rep) in &factors {
                let inner = space.project_between(purview, z, *part_purview);
                probs[z] *= rep.probs[inner];
            }
        }

        Ok(Repertoire {
            direction,
            purview,
            space: sub,
            probs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partition::{MechanismPartitions, PartitionPart};
    use crate::system::builders;
    use crate::system::StateSpace;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn set(indices: &[usize]) -> ElementSet {
        ElementSet::from_indices(indices.iter().copied())
    }

    #[test]
    fn test_cause_repertoire_and_pair() {
        // AND pair in state (1, 1): only past (1, 1) can produce element 0 = 1
        let system = builders::and_pair(3);
        let engine = RepertoireEngine::new(&system);
        let m = system.mechanism(set(&[0]));
        let rep = engine.cause(&m, set(&[1])).unwrap();
        assert!((rep.probs[0] - 0.0).abs() < 1e-12);
        assert!((rep.probs[1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_effect_repertoire_and_pair() {
        // Conditioning on element 0 = 1 leaves currents (1,0) and (1,1);
        // their next element-1 states are 0 and 1
        let system = builders::and_pair(3);
        let engine = RepertoireEngine::new(&system);
        let m = system.mechanism(set(&[0]));
        let rep = engine.effect(&m, set(&[1])).unwrap();
        assert!((rep.probs[0] - 0.5).abs() < 1e-12);
        assert!((rep.probs[1] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_unconstrained_cause_is_uniform() {
        let system = builders::and_pair(3);
        let engine = RepertoireEngine::new(&system);
        let empty = system.mechanism(ElementSet::EMPTY);
        let rep = engine.cause(&empty, set(&[0, 1])).unwrap();
        for z in 0..4 {
            assert!((rep.probs[z] - 0.25).abs() < 1e-12);
        }
    }

    #[test]
    fn test_repertoires_are_distributions() {
        let mut rng = StdRng::seed_from_u64(11);
        let system = builders::random_system(StateSpace::binary(3), 5, &mut rng);
        let engine = RepertoireEngine::new(&system);
        for mech_bits in 1u64..8 {
            let m = system.mechanism(ElementSet::from_bits(mech_bits));
            for purview_bits in 1u64..8 {
                let purview = ElementSet::from_bits(purview_bits);
                for direction in [Direction::Cause, Direction::Effect] {
                    let rep = engine.repertoire(direction, &m, purview).unwrap();
                    assert!((rep.probs.sum() - 1.0).abs() < 1e-9);
                    assert!(rep.probs.iter().all(|&p| p >= 0.0));
                }
            }
        }
    }

    #[test]
    fn test_degenerate_conditioning_fails() {
        // Element always transitions to 1; conditioning on next state 0 is
        // impossible, so the cause repertoire must fail loudly
        let system = builders::gate_network(StateSpace::binary(1), |_, _| 1, 0);
        let engine = RepertoireEngine::new(&system);
        let m = system.mechanism(set(&[0]));
        let err = engine.cause(&m, set(&[0])).unwrap_err();
        assert!(matches!(err, PhiError::DegenerateConditioning { .. }));
    }

    #[test]
    fn test_partitioned_repertoire_product() {
        // Partition {0}/∅ x ∅/{1} of ({0}, {1}) in the AND pair: part 2 is
        // the unconstrained effect marginal over element 1, which is (3/4, 1/4)
        let system = builders::and_pair(3);
        let engine = RepertoireEngine::new(&system);
        let partition = MechanismPartition {
            parts: [
                PartitionPart {
                    mechanism: set(&[0]),
                    purview: ElementSet::EMPTY,
                },
                PartitionPart {
                    mechanism: ElementSet::EMPTY,
                    purview: set(&[1]),
                },
            ],
        };
        let rep = engine.partitioned(Direction::Effect, &partition).unwrap();
        assert!((rep.probs[0] - 0.75).abs() < 1e-12);
        assert!((rep.probs[1] - 0.25).abs() < 1e-12);
    }

    #[test]
    fn test_partitioned_matches_enumerator_parts() {
        // Every enumerated partition must produce a valid distribution
        let system = builders::majority_triple(7);
        let engine = RepertoireEngine::new(&system);
        let mechanism = set(&[0, 1]);
        let purview = set(&[1, 2]);
        for partition in MechanismPartitions::new(mechanism, purview) {
            for direction in [Direction::Cause, Direction::Effect] {
                let rep = engine.partitioned(direction, &partition).unwrap();
                assert!((rep.probs.sum() - 1.0).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_expand_is_uniform_over_added_elements() {
        let system = builders::and_pair(3);
        let engine = RepertoireEngine::new(&system);
        let m = system.mechanism(set(&[0]));
        let rep = engine.cause(&m, set(&[1])).unwrap();
        let expanded = rep.expand(system.space(), set(&[0, 1]));
        assert_eq!(expanded.n_states(), 4);
        assert!((expanded.probs.sum() - 1.0).abs() < 1e-12);
        // Mass on element 1 = 1 splits evenly over element 0's states
        assert!((expanded.probs[2] - 0.5).abs() < 1e-12);
        assert!((expanded.probs[3] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_cache_hits_are_shared() {
        let system = builders::and_pair(3);
        let cache = RepertoireCache::new();
        let engine = RepertoireEngine::with_cache(&system, &cache);
        let m = system.mechanism(set(&[0]));
        let a = engine.cause(&m, set(&[1])).unwrap();
        let b = engine.cause(&m, set(&[1])).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);
    }
}
