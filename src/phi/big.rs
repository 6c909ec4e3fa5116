//! Big phi: irreducibility of a candidate set
//!
//! The minimum XEMD between the candidate's conceptual structure and the
//! structure it retains under any unidirectional cut. XEMD treats each
//! concept as a point of mass equal to its phi; the ground distance between
//! two concepts is the EMD between their cause repertoires plus the EMD
//! between their effect repertoires, both expanded onto the full candidate
//! set so structures with different mechanism sets remain comparable. A
//! null concept (the empty mechanism's unconstrained repertoires) absorbs
//! the mass imbalance, so a concept that simply disappears under a cut
//! contributes its full distance to "no constraint at all".

use ndarray::Array2;
use tracing::debug;

use super::concept::{ConceptFinder, ConceptualStructure, ConceptualStructureBuilder};
use super::small::SmallPhiEvaluator;
use super::SearchBudget;
use crate::distance::DistanceEngine;
use crate::error::Result;
use crate::partition::{SystemCut, SystemCuts};
use crate::repertoire::{Direction, Repertoire, RepertoireCache, RepertoireEngine};
use crate::system::{ElementSet, StateSpace, System};

/// Result of a big-phi evaluation
#[derive(Debug, Clone)]
pub struct BigPhiResult {
    pub candidate: ElementSet,
    /// Minimum XEMD over all unidirectional cuts (0 below two elements)
    pub big_phi: f64,
    /// Minimum information partition; `None` for degenerate candidates or
    /// when the budget ran out before any cut
    pub mip: Option<SystemCut>,
    /// Unpartitioned conceptual structure
    pub structure: ConceptualStructure,
}

/// Extended EMD between two conceptual structures.
///
/// `null_cause`/`null_effect` are the unconstrained repertoires over the
/// candidate set, already expanded; they define the ground distance to an
/// absent concept.
pub fn xemd(
    distance: &DistanceEngine,
    system_space: &StateSpace,
    candidate: ElementSet,
    a: &ConceptualStructure,
    b: &ConceptualStructure,
    null_cause: &Repertoire,
    null_effect: &Repertoire,
) -> f64 {
    let expand = |structure: &ConceptualStructure| -> Vec<(f64, Repertoire, Repertoire)> {
        structure
            .concepts
            .iter()
            .map(|concept| {
                (
                    concept.phi,
                    concept.cause.repertoire.expand(system_space, candidate),
                    concept.effect.repertoire.expand(system_space, candidate),
                )
            })
            .collect()
    };
    let points_a = expand(a);
    let points_b = expand(b);

    let sum_a: f64 = points_a.iter().map(|(phi, _, _)| phi).sum();
    let sum_b: f64 = points_b.iter().map(|(phi, _, _)| phi).sum();
    if sum_a <= 0.0 && sum_b <= 0.0 {
        return 0.0;
    }

    // One absorber node per side takes up the mass imbalance.
    let n_a = points_a.len() + 1;
    let n_b = points_b.len() + 1;
    let mut cost = Array2::zeros((n_a, n_b));
    for (i, (_, cause_a, effect_a)) in points_a.iter().enumerate() {
        for (j, (_, cause_b, effect_b)) in points_b.iter().enumerate() {
            cost[[i, j]] = distance.emd(cause_a, cause_b) + distance.emd(effect_a, effect_b);
        }
        cost[[i, n_b - 1]] =
            distance.emd(cause_a, null_cause) + distance.emd(effect_a, null_effect);
    }
    for (j, (_, cause_b, effect_b)) in points_b.iter().enumerate() {
        cost[[n_a - 1, j]] =
            distance.emd(cause_b, null_cause) + distance.emd(effect_b, null_effect);
    }

    let mut supply: Vec<f64> = points_a.iter().map(|(phi, _, _)| *phi).collect();
    supply.push((sum_b - sum_a).max(0.0));
    let mut demand: Vec<f64> = points_b.iter().map(|(phi, _, _)| *phi).collect();
    demand.push((sum_a - sum_b).max(0.0));

    distance.transport(&cost, &supply, &demand)
}

/// Minimum-information-partition search over unidirectional cuts
pub struct BigPhiEvaluator<'a> {
    system: &'a System,
    distance: &'a DistanceEngine,
    budget: &'a SearchBudget,
    cache: Option<&'a RepertoireCache>,
}

impl<'a> BigPhiEvaluator<'a> {
    pub fn new(
        system: &'a System,
        distance: &'a DistanceEngine,
        budget: &'a SearchBudget,
    ) -> Self {
        BigPhiEvaluator {
            system,
            distance,
            budget,
            cache: None,
        }
    }

    pub fn with_cache(
        system: &'a System,
        cache: &'a RepertoireCache,
        distance: &'a DistanceEngine,
        budget: &'a SearchBudget,
    ) -> Self {
        BigPhiEvaluator {
            system,
            distance,
            budget,
            cache: Some(cache),
        }
    }

    fn structure_of(&self, system: &System, cache: Option<&RepertoireCache>, candidate: ElementSet) -> Result<ConceptualStructure> {
        let small = match cache {
            Some(cache) => SmallPhiEvaluator::with_cache(system, cache, self.distance, self.budget),
            None => SmallPhiEvaluator::new(system, self.distance, self.budget),
        };
        ConceptualStructureBuilder::new(ConceptFinder::new(small)).build(candidate)
    }

    /// Big phi of a candidate set.
    ///
    /// Candidates with fewer than two elements cannot be partitioned and
    /// have big phi 0 by definition; an empty unpartitioned structure is
    /// likewise fully reducible.
    pub fn big_phi(&self, candidate: ElementSet) -> Result<BigPhiResult> {
        let structure = self.structure_of(self.system, self.cache, candidate)?;

        if candidate.len() < 2 || structure.is_empty() {
            return Ok(BigPhiResult {
                candidate,
                big_phi: 0.0,
                mip: None,
                structure,
            });
        }

        // Reference frame for concept distances: the unconstrained
        // repertoires of the uncut system.
        let engine = RepertoireEngine::new(self.system);
        let empty = self.system.mechanism(ElementSet::EMPTY);
        let space = self.system.space();
        let null_cause = engine
            .repertoire(Direction::Cause, &empty, candidate)?
            .expand(space, candidate);
        let null_effect = engine
            .repertoire(Direction::Effect, &empty, candidate)?
            .expand(space, candidate);

        let mut best: Option<(f64, SystemCut)> = None;
        for cut in SystemCuts::new(candidate) {
            if !self.budget.charge() {
                break;
            }
            let cut_system = self.system.apply_cut(cut.severed_from, cut.severed_to);
            let cut_cache = RepertoireCache::new();
            let cut_structure = self.structure_of(&cut_system, Some(&cut_cache), candidate)?;
            let value = xemd(
                self.distance,
                space,
                candidate,
                &structure,
                &cut_structure,
                &null_cause,
                &null_effect,
            );
            debug!(cut = %cut, xemd = value, "evaluated unidirectional cut");
            // First cut in canonical order wins exact ties
            if best.as_ref().map_or(true, |(d, _)| value < *d) {
                best = Some((value, cut));
            }
        }

        let (big_phi, mip) = match best {
            Some((value, cut)) => (value, Some(cut)),
            None => (0.0, None),
        };
        Ok(BigPhiResult {
            candidate,
            big_phi,
            mip,
            structure,
        })
    }
}
