//! Distance Engine: Earth Mover's Distance over Repertoires
//!
//! EMD between two repertoires over the same purview, with a pluggable
//! ground metric between individual states. The default ground distance is
//! Hamming over the mixed-radix digit representation; different analyses
//! may substitute their own metric without touching the solver.
//!
//! The raw transportation entry point is exposed separately because the
//! conceptual-structure distance (XEMD) reuses it with a concept-level cost
//! matrix instead of a state-level one.

mod transport;

pub use transport::{min_cost_transport, FLOW_TOLERANCE};

use ndarray::Array2;

use crate::repertoire::Repertoire;
use crate::system::StateSpace;

/// Ground distance between two joint states of the same space
pub trait GroundMetric: Send + Sync {
    fn distance(&self, space: &StateSpace, a: usize, b: usize) -> f64;
}

/// Hamming distance: number of elements whose digits differ
#[derive(Debug, Clone, Copy, Default)]
pub struct Hamming;

impl GroundMetric for Hamming {
    fn distance(&self, space: &StateSpace, a: usize, b: usize) -> f64 {
        let mut differing = 0;
        for i in 0..space.n_elements() {
            if space.digit(a, i) != space.digit(b, i) {
                differing += 1;
            }
        }
        differing as f64
    }
}

/// Discrete metric: 0 for identical states, 1 otherwise.
/// Makes EMD coincide with total variation distance.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscreteMetric;

impl GroundMetric for DiscreteMetric {
    fn distance(&self, _space: &StateSpace, a: usize, b: usize) -> f64 {
        if a == b {
            0.0
        } else {
            1.0
        }
    }
}

/// Exact EMD computation with a configurable ground metric
pub struct DistanceEngine {
    metric: Box<dyn GroundMetric>,
}

impl std::fmt::Debug for DistanceEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DistanceEngine").finish_non_exhaustive()
    }
}

impl Default for DistanceEngine {
    fn default() -> Self {
        DistanceEngine {
            metric: Box::new(Hamming),
        }
    }
}

impl DistanceEngine {
    pub fn new(metric: Box<dyn GroundMetric>) -> Self {
        DistanceEngine { metric }
    }

    /// Earth Mover's Distance between two repertoires over the same purview
    pub fn emd(&self, a: &Repertoire, b: &Repertoire) -> f64 {
        assert_eq!(
            a.purview, b.purview,
            "EMD requires repertoires over the same purview"
        );
        let n = a.n_states();
        debug_assert_eq!(n, b.n_states());

        let mut cost = Array2::zeros((n, n));
        for i in 0..n {
            for j in 0..n {
                cost[[i, j]] = self.metric.distance(&a.space, i, j);
            }
        }

        min_cost_transport(&cost, &a.probs.to_vec(), &b.probs.to_vec())
    }

    /// Raw exact transport over an arbitrary cost matrix (used by XEMD)
    pub fn transport(&self, cost: &Array2<f64>, supply: &[f64], demand: &[f64]) -> f64 {
        min_cost_transport(cost, supply, demand)
    }
}
