//! Ready-made example systems
//!
//! Small networks with known integration behavior, used by the tests and the
//! demo binaries: independent self-copying elements (fully reducible),
//! AND-coupled pairs (integrated), a three-element majority network, and
//! Dirichlet-random stochastic dynamics for property checks.

use ndarray::Array2;
use rand::Rng;
use rand_distr::{Dirichlet, Distribution};

use super::{StateSpace, System, Tpm};

/// Deterministic network from per-element update rules.
///
/// `rule(i, digits)` returns element `i`'s next state given the current
/// per-element digits. The resulting TPM has exactly one unit entry per row.
pub fn gate_network<F>(space: StateSpace, rule: F, current: usize) -> System
where
    F: Fn(usize, &[usize]) -> usize,
{
    let n = space.n_states();
    let mut probs = Array2::zeros((n, n));
    for s in 0..n {
        let digits = space.digits_of(s);
        let next: Vec<usize> = (0..space.n_elements()).map(|i| rule(i, &digits)).collect();
        probs[[s, space.index_of(&next)]] = 1.0;
    }
    let tpm = Tpm::new(space, probs).expect("deterministic rows are stochastic");
    System::new(tpm, current)
}

/// Two independent binary elements, each copying its own state.
/// Fully reducible: the minimum information partition severs nothing.
pub fn independent_pair(current: usize) -> System {
    gate_network(StateSpace::binary(2), |i, digits| digits[i], current)
}

/// Two binary elements, each computing the AND of both current states.
/// Integrated: no partition recovers the joint cause-effect structure.
pub fn and_pair(current: usize) -> System {
    gate_network(
        StateSpace::binary(2),
        |_, digits| digits[0] & digits[1],
        current,
    )
}

/// Three binary elements, each copying the majority of all three.
pub fn majority_triple(current: usize) -> System {
    gate_network(
        StateSpace::binary(3),
        |_, digits| {
            let ones: usize = digits.iter().sum();
            usize::from(ones >= 2)
        },
        current,
    )
}

/// Random stochastic dynamics: every TPM row drawn from a flat Dirichlet.
pub fn random_system<R: Rng>(space: StateSpace, current: usize, rng: &mut R) -> System {
    let n = space.n_states();
    let alpha = vec![1.0; n];
    let dirichlet = Dirichlet::new(&alpha).expect("flat Dirichlet is well-formed");
    let mut probs = Array2::zeros((n, n));
    for s in 0..n {
        let row = dirichlet.sample(rng);
        for (next, p) in row.into_iter().enumerate() {
            probs[[s, next]] = p;
        }
    }
    let tpm = Tpm::new(space, probs).expect("Dirichlet rows are stochastic");
    System::new(tpm, current)
}
