//! Partition Enumerator: Deterministic Combinatorial Splits
//!
//! All enumeration here is lazy, exhaustive, and canonically ordered so the
//! tie-breaking contracts of the phi searches are reproducible across runs:
//!
//! - subsets of an element set ascend by bitmask value;
//! - mechanism/purview bipartitions anchor part 1's mechanism side on the
//!   mechanism's lowest element (which removes the part-swap duplicate) and
//!   ascend by (mechanism side, purview side);
//! - unidirectional cuts ascend by the group containing the lowest element,
//!   emitting the two severed directions in turn. Both directions are always
//!   produced; no symmetry argument is attempted.
//!
//! Counts are exponential by design; callers short-circuit via their
//! evaluation budget rather than the enumerators truncating anything.

use std::fmt;

use crate::system::ElementSet;

/// Lazy subset iterator in canonical ascending order.
///
/// Maps a counter's bits onto the parent's element positions, so subsets of
/// `{0, 2, 5}` arrive as `{}`, `{0}`, `{2}`, `{0, 2}`, `{5}`, ...
#[derive(Debug, Clone)]
pub struct Subsets {
    positions: Vec<usize>,
    counter: u64,
    total: u64,
}

impl Subsets {
    /// All subsets, including the empty set
    pub fn of(set: ElementSet) -> Self {
        let positions: Vec<usize> = set.iter().collect();
        let total = 1u64 << positions.len();
        Subsets {
            positions,
            counter: 0,
            total,
        }
    }

    /// All non-empty subsets
    pub fn non_empty(set: ElementSet) -> Self {
        let mut subsets = Subsets::of(set);
        subsets.counter = 1;
        subsets
    }
}

impl Iterator for Subsets {
    type Item = ElementSet;

    fn next(&mut self) -> Option<ElementSet> {
        if self.counter >= self.total {
            return None;
        }
        let mut bits = 0u64;
        for (j, &pos) in self.positions.iter().enumerate() {
            if self.counter & (1 << j) != 0 {
                bits |= 1 << pos;
            }
        }
        self.counter += 1;
        Some(ElementSet::from_bits(bits))
    }
}

/// One side of a mechanism/purview bipartition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PartitionPart {
    pub mechanism: ElementSet,
    pub purview: ElementSet,
}

/// A bipartition of a mechanism/purview pair into two independent parts.
///
/// The two parts tile the original mechanism and purview exactly; a part may
/// be empty on one axis but never on both (that would leave the pair uncut).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MechanismPartition {
    pub parts: [PartitionPart; 2],
}

impl fmt::Display for MechanismPartition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} x {}/{}",
            self.parts[0].mechanism,
            self.parts[0].purview,
            self.parts[1].mechanism,
            self.parts[1].purview
        )
    }
}

/// Lazy enumerator of every mechanism/purview bipartition.
///
/// For |M| = m and |P| = p the count is `2^(m-1+p) - 1`.
#[derive(Debug, Clone)]
pub struct MechanismPartitions {
    mechanism: ElementSet,
    purview: ElementSet,
    /// Subsets of the mechanism minus its lowest element; part 1's mechanism
    /// side is each of these plus the anchor.
    mech_rest: Subsets,
    current_m1: Option<ElementSet>,
    purview_subsets: Subsets,
}

impl MechanismPartitions {
    pub fn new(mechanism: ElementSet, purview: ElementSet) -> Self {
        let anchor = mechanism.lowest().map(ElementSet::singleton);
        let rest = match anchor {
            Some(a) => mechanism.difference(a),
            None => ElementSet::EMPTY,
        };
        let mut mech_rest = Subsets::of(rest);
        let current_m1 = mech_rest
            .next()
            .map(|x| x.union(anchor.unwrap_or(ElementSet::EMPTY)));
        MechanismPartitions {
            mechanism,
            purview,
            mech_rest,
            current_m1,
            purview_subsets: Subsets::of(purview),
        }
    }
}

impl Iterator for MechanismPartitions {
    type Item = MechanismPartition;

    fn next(&mut self) -> Option<MechanismPartition> {
        loop {
            let m1 = self.current_m1?;
            match self.purview_subsets.next() {
                Some(p1) => {
                    // The whole pair in one part leaves nothing cut
                    if m1 == self.mechanism && p1 == self.purview {
                        continue;
                    }
                    return Some(MechanismPartition {
                        parts: [
                            PartitionPart {
                                mechanism: m1,
                                purview: p1,
                            },
                            PartitionPart {
                                mechanism: self.mechanism.difference(m1),
                                purview: self.purview.difference(p1),
                            },
                        ],
                    });
                }
                None => {
                    let anchor = ElementSet::singleton(self.mechanism.lowest()?);
                    self.current_m1 = self.mech_rest.next().map(|x| x.union(anchor));
                    self.purview_subsets = Subsets::of(self.purview);
                }
            }
        }
    }
}

/// A unidirectional system partition: the causal influence of
/// `severed_from` on `severed_to`'s future is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SystemCut {
    pub severed_from: ElementSet,
    pub severed_to: ElementSet,
}

impl fmt::Display for SystemCut {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -/-> {}", self.severed_from, self.severed_to)
    }
}

/// Lazy enumerator of every unidirectional cut of a candidate set.
///
/// Each unordered non-empty bipartition yields two cuts (one per severed
/// direction), so a set of n elements produces `2^n - 2` cuts.
#[derive(Debug, Clone)]
pub struct SystemCuts {
    candidate: ElementSet,
    group_rest: Subsets,
    pending: Option<SystemCut>,
}

impl SystemCuts {
    pub fn new(candidate: ElementSet) -> Self {
        let anchor = candidate.lowest().map(ElementSet::singleton);
        let rest = match anchor {
            Some(a) => candidate.difference(a),
            None => ElementSet::EMPTY,
        };
        SystemCuts {
            candidate,
            group_rest: Subsets::of(rest),
            pending: None,
        }
    }
}

impl Iterator for SystemCuts {
    type Item = SystemCut;

    fn next(&mut self) -> Option<SystemCut> {
        if let Some(cut) = self.pending.take() {
            return Some(cut);
        }
        let anchor = ElementSet::singleton(self.candidate.lowest()?);
        loop {
            let group1 = self.group_rest.next()?.union(anchor);
            let group2 = self.candidate.difference(group1);
            if group2.is_empty() {
                continue;
            }
            self.pending = Some(SystemCut {
                severed_from: group2,
                severed_to: group1,
            });
            return Some(SystemCut {
                severed_from: group1,
                severed_to: group2,
            });
        }
    }
}
