//! System Module: Discrete Dynamics and State Indexing
//!
//! A `System` is an immutable view of the analyzed dynamics: an ordered set
//! of elements with finite state spaces, a validated transition probability
//! matrix, and the actual current joint state. Every higher layer is a pure
//! function of this view; nothing here mutates after construction.

mod state;
mod tpm;

pub mod builders;

pub use state::{ElementIter, ElementSet, StateSpace};
pub use tpm::{Tpm, ROW_TOLERANCE};

/// A mechanism: a subset of elements fixed at the system's current state.
///
/// `state` indexes the mechanism's sub-space (the projection of the current
/// joint state onto `elements`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Mechanism {
    pub elements: ElementSet,
    pub state: usize,
}

/// Immutable analyzed system: dynamics plus the current joint state
#[derive(Debug, Clone, PartialEq)]
pub struct System {
    tpm: Tpm,
    current: usize,
}

impl System {
    pub fn new(tpm: Tpm, current: usize) -> Self {
        assert!(
            current < tpm.n_states(),
            "current state must index the joint state space"
        );
        System { tpm, current }
    }

    pub fn tpm(&self) -> &Tpm {
        &self.tpm
    }

    pub fn space(&self) -> &StateSpace {
        self.tpm.space()
    }

    pub fn n_elements(&self) -> usize {
        self.space().n_elements()
    }

    /// Set of all element indices
    pub fn all_elements(&self) -> ElementSet {
        ElementSet::full(self.n_elements())
    }

    /// Current joint state index
    pub fn current_state(&self) -> usize {
        self.current
    }

    /// Mechanism over `elements` at the system's current state
    pub fn mechanism(&self, elements: ElementSet) -> Mechanism {
        Mechanism {
            elements,
            state: self.space().project(self.current, elements),
        }
    }

    /// System with the causal influence of `from` on `to` severed
    /// (same current state, cut dynamics).
    pub fn apply_cut(&self, from: ElementSet, to: ElementSet) -> System {
        System {
            tpm: self.tpm.apply_cut(from, to),
            current: self.current,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mechanism_projection() {
        let system = builders::and_pair(3);
        let m = system.mechanism(ElementSet::singleton(1));
        assert_eq!(m.state, 1);
        let m = system.mechanism(ElementSet::full(2));
        assert_eq!(m.state, 3);
    }
}
