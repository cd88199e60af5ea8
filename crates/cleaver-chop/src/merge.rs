//! Penalty-driven greedy merging of sub-programs.
//!
//! Sub-programs arrive as ascending lists of `(element, weight)` pairs. The
//! merger repeatedly commits the cheapest candidate merge until the live-set
//! count is within the bound, and always commits candidates with price ≤ 0
//! (one side dominates the other; keeping them apart is pure waste).
//!
//! Candidates referring to already-consumed sub-programs are not purged from
//! the queue eagerly; with O(k²) queued entries, filtering on pop against
//! the live-set map is cheaper than any bulk cleanup.

use std::cmp::{Ordering, Reverse};
use std::collections::{BTreeMap, BinaryHeap};

use crate::penalty::Penalty;

struct MergeCandidate {
    price: i64,
    /// Insertion sequence; the earlier of two equally priced candidates
    /// wins, which keeps the whole merge order deterministic.
    seq: u64,
    left: usize,
    right: usize,
    merged: Vec<(usize, i64)>,
}

impl PartialEq for MergeCandidate {
    fn eq(&self, other: &Self) -> bool {
        self.price == other.price && self.seq == other.seq
    }
}

impl Eq for MergeCandidate {}

impl PartialOrd for MergeCandidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MergeCandidate {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.price, self.seq).cmp(&(other.price, other.seq))
    }
}

/// Merge two ascending weighted lists in one pass.
///
/// Element weights are partitioned into left-exclusive, right-exclusive, and
/// shared sums; the shared sum feeds only the penalty, while shared entries
/// keep the left weight in the output.
pub fn penalty_and_merge<P: Penalty<usize> + ?Sized>(
    left: &[(usize, i64)],
    right: &[(usize, i64)],
    penalty: &P,
) -> (i64, Vec<(usize, i64)>) {
    let mut merged = Vec::with_capacity(left.len() + right.len());
    let (mut left_exclusive, mut right_exclusive, mut shared) = (0i64, 0i64, 0i64);
    let (mut i, mut j) = (0, 0);
    while i < left.len() && j < right.len() {
        match left[i].0.cmp(&right[j].0) {
            Ordering::Less => {
                left_exclusive += left[i].1;
                merged.push(left[i]);
                i += 1;
            }
            Ordering::Greater => {
                right_exclusive += right[j].1;
                merged.push(right[j]);
                j += 1;
            }
            Ordering::Equal => {
                shared += left[i].1;
                merged.push(left[i]);
                i += 1;
                j += 1;
            }
        }
    }
    for &e in &left[i..] {
        left_exclusive += e.1;
        merged.push(e);
    }
    for &e in &right[j..] {
        right_exclusive += e.1;
        merged.push(e);
    }
    (
        penalty.merge_penalty(left_exclusive, right_exclusive, shared),
        merged,
    )
}

/// Greedily merge until at most `bound` sub-programs remain (`None` means
/// no bound) and no forced merge is pending.
///
/// Surviving sub-programs come back in live-set key order: untouched inputs
/// first in input order, then merge results in creation order.
pub fn merge_programs<P: Penalty<usize> + ?Sized>(
    programs: Vec<Vec<(usize, i64)>>,
    bound: Option<usize>,
    penalty: &P,
) -> Vec<Vec<(usize, i64)>> {
    let bound = bound.unwrap_or(usize::MAX);

    let mut sets: BTreeMap<usize, Vec<(usize, i64)>> =
        programs.into_iter().enumerate().collect();
    let mut counter = sets.len();
    let mut seq = 0u64;

    let mut queue: BinaryHeap<Reverse<MergeCandidate>> = BinaryHeap::new();
    let keys: Vec<usize> = sets.keys().copied().collect();
    for (idx, &l) in keys.iter().enumerate() {
        for &r in &keys[idx + 1..] {
            let (price, merged) = penalty_and_merge(&sets[&l], &sets[&r], penalty);
            queue.push(Reverse(MergeCandidate {
                price,
                seq,
                left: l,
                right: r,
                merged,
            }));
            seq += 1;
        }
    }

    loop {
        // Skip candidates whose operands were already consumed.
        while let Some(Reverse(top)) = queue.peek() {
            if sets.contains_key(&top.left) && sets.contains_key(&top.right) {
                break;
            }
            queue.pop();
        }
        // The loop condition must be re-checked against the live head: the
        // stale entries just dropped may have been the only ones priced ≤ 0.
        let Some(Reverse(top)) = queue.peek() else {
            break;
        };
        if top.price > 0 && sets.len() <= bound {
            break;
        }
        let Some(Reverse(candidate)) = queue.pop() else {
            break;
        };

        sets.remove(&candidate.left);
        sets.remove(&candidate.right);
        let new_key = counter;
        counter += 1;
        for (&k, rep) in &sets {
            let (price, merged) = penalty_and_merge(rep, &candidate.merged, penalty);
            queue.push(Reverse(MergeCandidate {
                price,
                seq,
                left: k,
                right: new_key,
                merged,
            }));
            seq += 1;
        }
        sets.insert(new_key, candidate.merged);
    }

    sets.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::penalty::{contravariant_lift, DefaultPenalty, Strict};
    use crate::vertex::Vertex;

    /// Element weights are supplied inline by the tests, so the lift target
    /// only has to provide the default merge-penalty formula.
    fn default_merge_penalty() -> impl Penalty<usize> {
        contravariant_lift(DefaultPenalty::default(), |_: &usize| Vertex::Always)
    }

    fn strict_merge_penalty() -> impl Penalty<usize> {
        contravariant_lift(Strict(DefaultPenalty::default()), |_: &usize| Vertex::Always)
    }

    fn singleton(key: usize, weight: i64) -> Vec<(usize, i64)> {
        vec![(key, weight)]
    }

    #[test]
    fn penalty_and_merge_partitions_weights() {
        let penalty = default_merge_penalty();
        let left = vec![(1, 2), (2, 3)];
        let right = vec![(2, 3), (3, 5)];
        let (price, merged) = penalty_and_merge(&left, &right, &penalty);
        // left-exclusive 2, right-exclusive 5, shared 3 (below threshold)
        assert_eq!(price, 7);
        assert_eq!(merged, vec![(1, 2), (2, 3), (3, 5)]);
    }

    #[test]
    fn shared_entries_keep_the_left_weight() {
        let penalty = default_merge_penalty();
        let left = vec![(7, 10)];
        let right = vec![(7, 99)];
        let (_, merged) = penalty_and_merge(&left, &right, &penalty);
        assert_eq!(merged, vec![(7, 10)]);
    }

    #[test]
    fn unbounded_with_positive_prices_merges_nothing() {
        let penalty = default_merge_penalty();
        let programs = vec![singleton(0, 1), singleton(1, 1), singleton(2, 1)];
        let out = merge_programs(programs.clone(), None, &penalty);
        assert_eq!(out, programs);
    }

    #[test]
    fn bound_is_honored() {
        let penalty = default_merge_penalty();
        let programs = vec![singleton(0, 1), singleton(1, 1), singleton(2, 1)];
        let out = merge_programs(programs, Some(2), &penalty);
        assert_eq!(out.len(), 2);
        // Equal prices: the earliest-enqueued pair (inputs 0 and 1) merges.
        assert_eq!(out, vec![vec![(2, 1)], vec![(0, 1), (1, 1)]]);
    }

    #[test]
    fn bound_one_collapses_everything() {
        let penalty = default_merge_penalty();
        let programs = vec![
            vec![(0, 1), (3, 2)],
            vec![(1, 1), (3, 2)],
            vec![(2, 1)],
        ];
        let out = merge_programs(programs, Some(1), &penalty);
        assert_eq!(out, vec![vec![(0, 1), (1, 1), (2, 1), (3, 2)]]);
    }

    #[test]
    fn zero_cost_merges_are_forced_even_under_a_satisfied_bound() {
        let penalty = default_merge_penalty();
        let programs = vec![singleton(0, 0), singleton(1, 0), singleton(2, 1)];
        let out = merge_programs(programs, Some(3), &penalty);
        // The two weightless programs merge for free; the priced one stays.
        assert_eq!(out, vec![vec![(2, 1)], vec![(0, 0), (1, 0)]]);
    }

    #[test]
    fn strict_penalty_disables_forced_merges() {
        let penalty = strict_merge_penalty();
        let programs = vec![singleton(0, 0), singleton(1, 0)];
        let out = merge_programs(programs.clone(), None, &penalty);
        assert_eq!(out, programs);
    }

    #[test]
    fn merged_programs_can_merge_again() {
        let penalty = default_merge_penalty();
        let programs = vec![singleton(0, 5), singleton(1, 3), singleton(2, 1)];
        let out = merge_programs(programs, Some(1), &penalty);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0], vec![(0, 5), (1, 3), (2, 1)]);
    }

    #[test]
    fn cheapest_candidate_merges_first() {
        let penalty = default_merge_penalty();
        // Pair (1, 2) costs 2; any pair touching 0 costs at least 10.
        let programs = vec![singleton(0, 10), singleton(1, 1), singleton(2, 1)];
        let out = merge_programs(programs, Some(2), &penalty);
        assert_eq!(out, vec![vec![(0, 10)], vec![(1, 1), (2, 1)]]);
    }

    #[test]
    fn single_program_passes_through() {
        let penalty = default_merge_penalty();
        let programs = vec![vec![(0, 1), (1, 2)]];
        let out = merge_programs(programs.clone(), Some(1), &penalty);
        assert_eq!(out, programs);
    }

    #[test]
    fn empty_input_stays_empty() {
        let penalty = default_merge_penalty();
        let out = merge_programs(Vec::new(), None, &penalty);
        assert!(out.is_empty());
    }
}
