// SPDX-License-Identifier: Apache-2.0

//! Equivalence-class enumeration: breadth-first exploration over the move
//! graph generated by adjacent commutation swaps, cyclic rotations,
//! reversal, and qubit relabelings.
//!
//! Every move preserves identity semantics and the gate-kind composition,
//! so the class of an identity representative contains only identities of
//! the same dimension and composition.

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use itertools::Itertools;

use crate::circuit::Circuit;
use crate::error::Result;

/// Cooperative cancellation flag, checked between dequeues.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> CancelToken {
        CancelToken::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

#[derive(Debug)]
pub struct UnrollOutcome {
    /// Every distinct circuit discovered, the representative included,
    /// in BFS discovery order.
    pub circuits: Vec<Circuit>,
    /// True only when the move graph was exhausted; false when the bound
    /// cut enumeration short or the token fired.
    pub fully_unrolled: bool,
}

/// Enumerates the equivalence class of `representative` up to
/// `max_equivalents` circuits.
///
/// Moves are applied in a fixed order (swaps by position, rotations by
/// shift, reversal, relabelings in lexicographic order) so the output is
/// deterministic for a given input.
pub fn unroll(
    representative: &Circuit,
    max_equivalents: usize,
    cancel: &CancelToken,
) -> Result<UnrollOutcome> {
    representative.validate()?;

    let mut seen: HashSet<Vec<u8>> = HashSet::new();
    let mut queue: VecDeque<Circuit> = VecDeque::new();
    let mut circuits: Vec<Circuit> = Vec::new();

    let mut emit = |candidate: Circuit,
                    seen: &mut HashSet<Vec<u8>>,
                    queue: &mut VecDeque<Circuit>,
                    circuits: &mut Vec<Circuit>| {
        if seen.insert(candidate.fingerprint()) {
            circuits.push(candidate.clone());
            queue.push_back(candidate);
        }
        circuits.len() >= max_equivalents
    };

    if emit(representative.clone(), &mut seen, &mut queue, &mut circuits) {
        return Ok(UnrollOutcome {
            circuits,
            fully_unrolled: false,
        });
    }

    while let Some(current) = queue.pop_front() {
        if cancel.is_cancelled() {
            log::debug!(
                "unroll cancelled after {} circuits, {} still queued",
                circuits.len(),
                queue.len()
            );
            return Ok(UnrollOutcome {
                circuits,
                fully_unrolled: false,
            });
        }
        let gate_count = current.len();

        for index in 0..gate_count.saturating_sub(1) {
            if current.commutes_at(index)? {
                let swapped = current.swap(index)?;
                if emit(swapped, &mut seen, &mut queue, &mut circuits) {
                    return Ok(UnrollOutcome {
                        circuits,
                        fully_unrolled: false,
                    });
                }
            }
        }

        for shift in 1..gate_count {
            if emit(current.rotate(shift), &mut seen, &mut queue, &mut circuits) {
                return Ok(UnrollOutcome {
                    circuits,
                    fully_unrolled: false,
                });
            }
        }

        if emit(current.reverse(), &mut seen, &mut queue, &mut circuits) {
            return Ok(UnrollOutcome {
                circuits,
                fully_unrolled: false,
            });
        }

        // Relabelings are streamed lazily: w! grows fast, and the bound is
        // allowed to cut the stream off mid-way.
        for perm in (0..current.width()).permutations(current.width()) {
            let relabeled = current
                .relabel(&perm)
                .expect("permutations of 0..width are valid relabelings");
            if emit(relabeled, &mut seen, &mut queue, &mut circuits) {
                return Ok(UnrollOutcome {
                    circuits,
                    fully_unrolled: false,
                });
            }
        }
    }

    Ok(UnrollOutcome {
        circuits,
        fully_unrolled: true,
    })
}
