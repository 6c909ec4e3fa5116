//! Phi Module: Irreducibility Searches
//!
//! The nested searches that turn repertoires and distances into integrated
//! information: small phi over mechanism partitions, concepts over
//! purviews, big phi over unidirectional cuts, and the major complex over
//! candidate subsets. Every layer is a pure function of the layer below;
//! all tie-breaks resolve in the enumerators' canonical order so repeated
//! runs are bit-identical.

mod big;
mod complex;
mod concept;
mod small;

pub use big::{xemd, BigPhiEvaluator, BigPhiResult};
pub use complex::{MajorComplex, MajorComplexOutcome, MajorComplexSearch};
pub use concept::{Concept, ConceptFinder, ConceptualStructure, ConceptualStructureBuilder, CoreRepertoire};
pub use small::{SmallPhi, SmallPhiEvaluator};

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Phi values at or below this are treated as zero.
///
/// Separates genuine irreducibility from transportation-solver float noise
/// in core-existence and major-complex positivity checks.
pub const PHI_TOLERANCE: f64 = 1e-10;

/// Whether a search ran to completion or hit its resource ceiling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStatus {
    Complete,
    CeilingExceeded,
}

/// Search configuration
#[derive(Debug, Clone)]
pub struct PhiConfig {
    /// Maximum number of partition/cut evaluations across the whole query
    pub max_evaluations: Option<u64>,
    /// Wall-clock budget for the whole query
    pub time_budget: Option<Duration>,
    /// Evaluate candidate subsets on worker threads
    pub parallel: bool,
}

impl Default for PhiConfig {
    fn default() -> Self {
        PhiConfig {
            max_evaluations: None,
            time_budget: None,
            parallel: true,
        }
    }
}

/// Shared evaluation budget for one top-level query.
///
/// Every partition and cut evaluation charges one unit. Once the ceiling is
/// hit, all enumeration loops stop at their next check and the query result
/// carries `SearchStatus::CeilingExceeded` with the best values found from
/// the work actually completed.
#[derive(Debug)]
pub struct SearchBudget {
    used: AtomicU64,
    max: Option<u64>,
    deadline: Option<Instant>,
    exceeded: AtomicBool,
}

impl SearchBudget {
    pub fn new(config: &PhiConfig) -> Self {
        SearchBudget {
            used: AtomicU64::new(0),
            max: config.max_evaluations,
            deadline: config.time_budget.map(|budget| Instant::now() + budget),
            exceeded: AtomicBool::new(false),
        }
    }

    pub fn unlimited() -> Self {
        SearchBudget::new(&PhiConfig {
            max_evaluations: None,
            time_budget: None,
            parallel: false,
        })
    }

    /// Charge one evaluation; returns false once the ceiling is exceeded.
    pub fn charge(&self) -> bool {
        if self.exceeded.load(Ordering::Relaxed) {
            return false;
        }
        let used = self.used.fetch_add(1, Ordering::Relaxed) + 1;
        let over_count = self.max.map_or(false, |max| used > max);
        let over_time = self
            .deadline
            .map_or(false, |deadline| Instant::now() > deadline);
        if over_count || over_time {
            self.exceeded.store(true, Ordering::Relaxed);
            return false;
        }
        true
    }

    pub fn is_exceeded(&self) -> bool {
        self.exceeded.load(Ordering::Relaxed)
    }

    /// Evaluations charged so far
    pub fn evaluations(&self) -> u64 {
        self.used.load(Ordering::Relaxed)
    }

    pub fn status(&self) -> SearchStatus {
        if self.is_exceeded() {
            SearchStatus::CeilingExceeded
        } else {
            SearchStatus::Complete
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unlimited_budget_never_exceeds() {
        let budget = SearchBudget::unlimited();
        for _ in 0..1000 {
            assert!(budget.charge());
        }
        assert_eq!(budget.status(), SearchStatus::Complete);
    }

    #[test]
    fn test_evaluation_ceiling() {
        let budget = SearchBudget::new(&PhiConfig {
            max_evaluations: Some(3),
            ..PhiConfig::default()
        });
        assert!(budget.charge());
        assert!(budget.charge());
        assert!(budget.charge());
        assert!(!budget.charge());
        assert!(!budget.charge());
        assert_eq!(budget.status(), SearchStatus::CeilingExceeded);
    }

    #[test]
    fn test_elapsed_deadline() {
        let budget = SearchBudget::new(&PhiConfig {
            time_budget: Some(Duration::ZERO),
            ..PhiConfig::default()
        });
        assert!(!budget.charge());
        assert_eq!(budget.status(), SearchStatus::CeilingExceeded);
    }
}
