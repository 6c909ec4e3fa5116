//! Transition probability matrix
//!
//! The TPM is the single piece of long-lived state in an analysis: a
//! row-stochastic matrix mapping every joint current state to a distribution
//! over joint next states. Validation happens here at construction, so that
//! corrupted dynamics fail immediately rather than deep inside a search.
//!
//! ## Unidirectional cuts
//!
//! Severing the causal influence of one element group on another is realized
//! by refactoring the TPM into per-element next-state marginals, replacing
//! the severed inputs with uniform noise, and recomposing the row as the
//! product of the marginals. The recomposition assumes next states are
//! conditionally independent given the current state, which holds exactly
//! for deterministic dynamics and is the standard assumption for node-based
//! stochastic models.

use ndarray::{Array2, ArrayView1};

use super::state::{ElementSet, StateSpace};
use crate::error::{PhiError, Result};

/// Tolerance for row-stochasticity validation
pub const ROW_TOLERANCE: f64 = 1e-9;

/// Validated row-stochastic transition matrix over a joint state space
#[derive(Debug, Clone, PartialEq)]
pub struct Tpm {
    space: StateSpace,
    probs: Array2<f64>,
}

impl Tpm {
    /// Construct a TPM, validating shape, non-negativity, and row sums.
    pub fn new(space: StateSpace, probs: Array2<f64>) -> Result<Self> {
        let n = space.n_states();
        assert_eq!(
            probs.dim(),
            (n, n),
            "TPM shape must match the joint state space"
        );

        for row in 0..n {
            let mut sum = 0.0;
            for col in 0..n {
                let value = probs[[row, col]];
                if value < 0.0 {
                    return Err(PhiError::NegativeProbability { row, col, value });
                }
                sum += value;
            }
            if (sum - 1.0).abs() > ROW_TOLERANCE {
                return Err(PhiError::RowNotStochastic { row, sum });
            }
        }

        Ok(Tpm { space, probs })
    }

    pub fn space(&self) -> &StateSpace {
        &self.space
    }

    pub fn n_states(&self) -> usize {
        self.space.n_states()
    }

    /// Distribution over next joint states given current joint state `s`
    pub fn row(&self, s: usize) -> ArrayView1<'_, f64> {
        self.probs.row(s)
    }

    /// P(next = `next` | current = `current`)
    pub fn prob(&self, current: usize, next: usize) -> f64 {
        self.probs[[current, next]]
    }

    /// Next-state marginal of a single element: `m[[s, x]]` is the
    /// probability that element `i` is in state `x` at the next step, given
    /// current joint state `s`.
    pub fn element_marginal(&self, i: usize) -> Array2<f64> {
        let n = self.space.n_states();
        let card = self.space.card(i);
        let mut marginal = Array2::zeros((n, card));
        for s in 0..n {
            for next in 0..n {
                marginal[[s, self.space.digit(next, i)]] += self.probs[[s, next]];
            }
        }
        marginal
    }

    /// TPM with the causal influence of `from` on `to` severed.
    ///
    /// For every element in `to`, the inputs from `from` are marginalized
    /// uniformly; all other elements keep their next-state marginals. Rows
    /// are renormalized to absorb floating-point drift from the product
    /// recomposition.
    pub fn apply_cut(&self, from: ElementSet, to: ElementSet) -> Tpm {
        let n = self.space.n_states();
        let n_elements = self.space.n_elements();
        let from_space = self.space.sub_space(from);
        let n_from = from_space.n_states();

        // Per-element marginals, with severed inputs averaged out for
        // elements in the target group.
        let mut marginals: Vec<Array2<f64>> = Vec::with_capacity(n_elements);
        for i in 0..n_elements {
            let base = self.element_marginal(i);
            if !to.contains(i) {
                marginals.push(base);
                continue;
            }
            let card = self.space.card(i);
            let mut noised = Array2::zeros((n, card));
            for s in 0..n {
                for g in 0..n_from {
                    let variant = self.space.replace(s, from, g);
                    for x in 0..card {
                        noised[[s, x]] += base[[variant, x]];
                    }
                }
            }
            noised /= n_from as f64;
            marginals.push(noised);
        }

        // Product recomposition of each row.
        let mut probs = Array2::zeros((n, n));
        for s in 0..n {
            let mut row_sum = 0.0;
            for next in 0..n {
                let mut p = 1.0;
                for (i, marginal) in marginals.iter().enumerate() {
                    p *= marginal[[s, self.space.digit(next, i)]];
                }
                probs[[s, next]] = p;
                row_sum += p;
            }
            if row_sum > 0.0 {
                for next in 0..n {
                    probs[[s, next]] /= row_sum;
                }
            }
        }

        Tpm {
            space: self.space.clone(),
            probs,
        }
    }
}
