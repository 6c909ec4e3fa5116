//! Element sets and joint-state indexing
//!
//! Every subset of system elements is represented as a bitmask over a fixed,
//! stably-indexed element list. Canonical order between sets is ascending
//! numeric mask value; all enumeration and tie-breaking contracts in the
//! search layers are stated against this order.
//!
//! Joint states use mixed-radix indexing with element 0 as the least
//! significant digit, so a binary system's joint state is simply the bit
//! pattern of its elements.

use std::fmt;

/// An ordered subset of system element indices, as a bitmask.
///
/// Iteration is always ascending by element index. Supports at most 64
/// elements, which is far beyond what the doubly-exponential search can
/// handle anyway.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementSet(u64);

impl ElementSet {
    /// The empty set
    pub const EMPTY: ElementSet = ElementSet(0);

    /// Set containing a single element
    pub fn singleton(index: usize) -> Self {
        debug_assert!(index < 64);
        ElementSet(1 << index)
    }

    /// Set containing elements `0..n`
    pub fn full(n: usize) -> Self {
        debug_assert!(n <= 64);
        if n == 64 {
            ElementSet(u64::MAX)
        } else {
            ElementSet((1u64 << n) - 1)
        }
    }

    /// Build from element indices
    pub fn from_indices<I: IntoIterator<Item = usize>>(indices: I) -> Self {
        let mut bits = 0u64;
        for i in indices {
            debug_assert!(i < 64);
            bits |= 1 << i;
        }
        ElementSet(bits)
    }

    /// Raw mask value (defines the canonical order between sets)
    pub fn bits(self) -> u64 {
        self.0
    }

    pub fn from_bits(bits: u64) -> Self {
        ElementSet(bits)
    }

    /// Number of elements
    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn contains(self, index: usize) -> bool {
        index < 64 && self.0 & (1 << index) != 0
    }

    /// Smallest element index, if any
    pub fn lowest(self) -> Option<usize> {
        if self.0 == 0 {
            None
        } else {
            Some(self.0.trailing_zeros() as usize)
        }
    }

    pub fn union(self, other: ElementSet) -> ElementSet {
        ElementSet(self.0 | other.0)
    }

    pub fn intersection(self, other: ElementSet) -> ElementSet {
        ElementSet(self.0 & other.0)
    }

    /// Elements of `self` not in `other`
    pub fn difference(self, other: ElementSet) -> ElementSet {
        ElementSet(self.0 & !other.0)
    }

    pub fn is_subset_of(self, other: ElementSet) -> bool {
        self.0 & !other.0 == 0
    }

    pub fn is_disjoint_from(self, other: ElementSet) -> bool {
        self.0 & other.0 == 0
    }

    /// Ascending iterator over element indices
    pub fn iter(self) -> ElementIter {
        ElementIter { remaining: self.0 }
    }
}

impl fmt::Display for ElementSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (k, i) in self.iter().enumerate() {
            if k > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", i)?;
        }
        write!(f, "}}")
    }
}

/// Ascending iterator over the indices of an `ElementSet`
#[derive(Debug, Clone)]
pub struct ElementIter {
    remaining: u64,
}

impl Iterator for ElementIter {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.remaining == 0 {
            return None;
        }
        let index = self.remaining.trailing_zeros() as usize;
        self.remaining &= self.remaining - 1;
        Some(index)
    }
}

/// Mixed-radix state space over an ordered list of elements.
///
/// `cards[i]` is the number of states of element `i`. Joint states are
/// indexed with element 0 as the least significant digit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateSpace {
    cards: Vec<usize>,
}

impl StateSpace {
    pub fn new(cards: Vec<usize>) -> Self {
        debug_assert!(cards.iter().all(|&c| c >= 1));
        StateSpace { cards }
    }

    /// All-binary space over `n` elements
    pub fn binary(n: usize) -> Self {
        StateSpace { cards: vec![2; n] }
    }

    pub fn n_elements(&self) -> usize {
        self.cards.len()
    }

    /// Number of states of element `i`
    pub fn card(&self, i: usize) -> usize {
        self.cards[i]
    }

    pub fn cards(&self) -> &[usize] {
        &self.cards
    }

    /// Total number of joint states
    pub fn n_states(&self) -> usize {
        self.cards.iter().product()
    }

    /// Encode per-element digits into a joint-state index
    pub fn index_of(&self, digits: &[usize]) -> usize {
        debug_assert_eq!(digits.len(), self.cards.len());
        let mut index = 0;
        let mut stride = 1;
        for (i, &d) in digits.iter().enumerate() {
            debug_assert!(d < self.cards[i]);
            index += d * stride;
            stride *= self.cards[i];
        }
        index
    }

    /// Decode a joint-state index into per-element digits
    pub fn digits_of(&self, index: usize) -> Vec<usize> {
        let mut digits = Vec::with_capacity(self.cards.len());
        let mut rest = index;
        for &c in &self.cards {
            digits.push(rest % c);
            rest /= c;
        }
        digits
    }

    /// State of element `i` within joint state `index`
    pub fn digit(&self, index: usize, i: usize) -> usize {
        let mut rest = index;
        for &c in &self.cards[..i] {
            rest /= c;
        }
        rest % self.cards[i]
    }

    /// Project a joint-state index onto a subset of elements.
    ///
    /// The result is an index into `self.sub_space(set)`, with the subset's
    /// elements in ascending order.
    pub fn project(&self, index: usize, set: ElementSet) -> usize {
        let mut sub = 0;
        let mut stride = 1;
        for i in set.iter() {
            sub += self.digit(index, i) * stride;
            stride *= self.cards[i];
        }
        sub
    }

    /// State space restricted to a subset of elements (ascending order)
    pub fn sub_space(&self, set: ElementSet) -> StateSpace {
        StateSpace {
            cards: set.iter().map(|i| self.cards[i]).collect(),
        }
    }

    /// Overwrite the digits of `set` within joint state `index` with the
    /// digits of `sub`, a state of `self.sub_space(set)`.
    pub fn replace(&self, index: usize, set: ElementSet, sub: usize) -> usize {
        let mut digits = self.digits_of(index);
        let sub_digits = self.sub_space(set).digits_of(sub);
        for (k, i) in set.iter().enumerate() {
            digits[i] = sub_digits[k];
        }
        self.index_of(&digits)
    }

    /// Project a state of `self.sub_space(parent)` onto a child subset.
    ///
    /// `child` must be a subset of `parent`; the result indexes
    /// `self.sub_space(child)`.
    pub fn project_between(&self, parent: ElementSet, z: usize, child: ElementSet) -> usize {
        debug_assert!(child.is_subset_of(parent));
        let digits = self.sub_space(parent).digits_of(z);
        let mut sub = 0;
        let mut stride = 1;
        for (rank, i) in parent.iter().enumerate() {
            if child.contains(i) {
                sub += digits[rank] * stride;
                stride *= self.cards[i];
            }
        }
        sub
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_set_basics() {
        let s = ElementSet::from_indices([2, 0, 5]);
        assert_eq!(s.len(), 3);
        assert!(s.contains(0) && s.contains(2) && s.contains(5));
        assert!(!s.contains(1));
        assert_eq!(s.iter().collect::<Vec<_>>(), vec![0, 2, 5]);
        assert_eq!(s.lowest(), Some(0));
        assert_eq!(format!("{}", s), "{0, 2, 5}");
    }

    #[test]
    fn test_element_set_algebra() {
        let a = ElementSet::from_indices([0, 1]);
        let b = ElementSet::from_indices([1, 2]);
        assert_eq!(a.union(b), ElementSet::from_indices([0, 1, 2]));
        assert_eq!(a.intersection(b), ElementSet::singleton(1));
        assert_eq!(a.difference(b), ElementSet::singleton(0));
        assert!(a.is_subset_of(ElementSet::full(3)));
        assert!(ElementSet::EMPTY.is_empty());
    }

    #[test]
    fn test_index_digit_roundtrip() {
        let space = StateSpace::new(vec![2, 3, 2]);
        assert_eq!(space.n_states(), 12);
        for index in 0..space.n_states() {
            let digits = space.digits_of(index);
            assert_eq!(space.index_of(&digits), index);
            for (i, &d) in digits.iter().enumerate() {
                assert_eq!(space.digit(index, i), d);
            }
        }
    }

    #[test]
    fn test_projection() {
        let space = StateSpace::binary(3);
        // Joint state (1, 0, 1) -> index 5
        let index = space.index_of(&[1, 0, 1]);
        assert_eq!(index, 5);
        let set = ElementSet::from_indices([0, 2]);
        // Projection keeps (1, 1) over elements {0, 2}
        assert_eq!(space.project(index, set), 3);
        assert_eq!(space.sub_space(set).n_states(), 4);
        // Empty projection is the single empty-space state
        assert_eq!(space.project(index, ElementSet::EMPTY), 0);
        assert_eq!(space.sub_space(ElementSet::EMPTY).n_states(), 1);
    }

    #[test]
    fn test_replace() {
        let space = StateSpace::binary(3);
        let index = space.index_of(&[1, 0, 1]);
        let set = ElementSet::from_indices([0, 1]);
        // Overwrite elements {0, 1} with (0, 1)
        let sub = space.sub_space(set).index_of(&[0, 1]);
        let replaced = space.replace(index, set, sub);
        assert_eq!(space.digits_of(replaced), vec![0, 1, 1]);
    }

    #[test]
    fn test_project_between() {
        let space = StateSpace::binary(4);
        let parent = ElementSet::from_indices([0, 2, 3]);
        let child = ElementSet::from_indices([2, 3]);
        // Parent state (1, 0, 1) over elements (0, 2, 3)
        let z = space.sub_space(parent).index_of(&[1, 0, 1]);
        let projected = space.project_between(parent, z, child);
        assert_eq!(space.sub_space(child).digits_of(projected), vec![0, 1]);
    }
}
