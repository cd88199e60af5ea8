//! Smallest-cut computation.
//!
//! Both variants take the node count, the selected start nodes, and the
//! adjacency, and return — for every *root* among the starts (a start no
//! other start reaches) — its transitively reachable set as an ascending
//! list. Shared leaves are duplicated across outputs; that is what makes
//! each output self-contained.
//!
//! The acyclic variant memoizes reachable sets across starts and is used on
//! the condensed component graph. The cyclic variant makes no memoization
//! assumption and is used directly on the vertex graph when the selection is
//! small enough that condensing would cost more than it saves.

use std::collections::{BTreeSet, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VisitState {
    NotVisited,
    /// Entered but not yet finalized; its reachable set is still being built.
    NotFinalized,
    /// Finalized by the DFS seeded at the given start.
    Finalized(usize),
}

/// Smallest cut on a graph known to be acyclic.
///
/// Iterative two-phase DFS: each node is pushed once to descend and once,
/// underneath its children, to finalize. On finalization the node's
/// reachable set is the sorted union of itself and its successors' sets.
/// A node encountered already finalized by a different start is reachable
/// from two selected nodes, so it cannot be a root. A repeated start with
/// the same start id is a no-op.
pub fn smallest_cut_acyclic(
    n: usize,
    starts: &[usize],
    edges: &[BTreeSet<usize>],
) -> Vec<Vec<usize>> {
    let mut state = vec![VisitState::NotVisited; n];
    let mut not_root = vec![false; n];
    let mut reachable: Vec<Vec<usize>> = vec![Vec::new(); n];
    let mut stack: Vec<usize> = Vec::new();

    for &s in starts {
        if let VisitState::Finalized(start) = state[s] {
            if start != s {
                not_root[s] = true;
            }
            continue;
        }
        stack.push(s);
        while let Some(v) = stack.pop() {
            match state[v] {
                VisitState::NotVisited => {
                    state[v] = VisitState::NotFinalized;
                    stack.push(v);
                    for &w in &edges[v] {
                        match state[w] {
                            VisitState::NotVisited => stack.push(w),
                            VisitState::NotFinalized => {}
                            VisitState::Finalized(start) => {
                                if start != s {
                                    not_root[w] = true;
                                }
                            }
                        }
                    }
                }
                VisitState::NotFinalized => {
                    let mut set = BTreeSet::new();
                    set.insert(v);
                    for &w in &edges[v] {
                        set.extend(reachable[w].iter().copied());
                    }
                    reachable[v] = set.into_iter().collect();
                    state[v] = VisitState::Finalized(s);
                }
                VisitState::Finalized(start) => {
                    if start != s {
                        not_root[v] = true;
                    }
                }
            }
        }
    }

    let mut emitted = HashSet::new();
    starts
        .iter()
        .filter(|&&s| !not_root[s] && emitted.insert(s))
        .map(|&s| reachable[s].clone())
        .collect()
}

/// Smallest cut on a possibly cyclic graph.
///
/// Each start runs a full DFS with a per-call local-visited bitmap (cycles
/// terminate) and a global visited bitmap shared across starts. A start
/// whose node was already claimed by an earlier traversal is not a root and
/// its own traversal is skipped; under mutual reachability this is what
/// leaves exactly the first-visited start as the root. A previously visited
/// node entered mid-traversal is likewise marked non-root: the current start
/// reaches it.
pub fn smallest_cut_cyclic(
    n: usize,
    starts: &[usize],
    edges: &[BTreeSet<usize>],
) -> Vec<Vec<usize>> {
    let mut visited = vec![false; n];
    let mut not_root = vec![false; n];

    let mut seen = HashSet::new();
    let unique_starts: Vec<usize> = starts.iter().copied().filter(|&s| seen.insert(s)).collect();

    let mut collected: Vec<Option<Vec<usize>>> = vec![None; n];
    let mut stack: Vec<usize> = Vec::new();

    for &s in &unique_starts {
        if visited[s] {
            not_root[s] = true;
            continue;
        }
        let mut local = vec![false; n];
        let mut set = BTreeSet::new();
        stack.push(s);
        while let Some(v) = stack.pop() {
            if local[v] {
                continue;
            }
            local[v] = true;
            if visited[v] {
                not_root[v] = true;
            } else {
                visited[v] = true;
            }
            set.insert(v);
            for &w in &edges[v] {
                if !local[w] {
                    stack.push(w);
                }
            }
        }
        collected[s] = Some(set.into_iter().collect());
    }

    unique_starts
        .iter()
        .filter(|&&s| !not_root[s])
        .filter_map(|&s| collected[s].take())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(n: usize, edges: &[(usize, usize)]) -> Vec<BTreeSet<usize>> {
        let mut adj = vec![BTreeSet::new(); n];
        for &(u, v) in edges {
            adj[u].insert(v);
        }
        adj
    }

    // -- acyclic ---------------------------------------------------------

    #[test]
    fn acyclic_single_start_returns_reachable_set() {
        let adj = graph(4, &[(0, 1), (1, 2)]);
        let cut = smallest_cut_acyclic(4, &[0], &adj);
        assert_eq!(cut, vec![vec![0, 1, 2]]);
    }

    #[test]
    fn acyclic_shared_leaf_is_duplicated() {
        let adj = graph(3, &[(0, 2), (1, 2)]);
        let cut = smallest_cut_acyclic(3, &[0, 1], &adj);
        assert_eq!(cut, vec![vec![0, 2], vec![1, 2]]);
    }

    #[test]
    fn acyclic_start_reached_by_other_start_is_not_a_root() {
        let adj = graph(3, &[(0, 1), (1, 2)]);
        let cut = smallest_cut_acyclic(3, &[0, 1], &adj);
        assert_eq!(cut, vec![vec![0, 1, 2]]);
    }

    #[test]
    fn acyclic_root_detection_is_order_independent() {
        let adj = graph(3, &[(0, 1), (1, 2)]);
        let cut = smallest_cut_acyclic(3, &[1, 0], &adj);
        assert_eq!(cut, vec![vec![0, 1, 2]]);
    }

    #[test]
    fn acyclic_duplicate_starts_yield_one_output() {
        let adj = graph(2, &[(0, 1)]);
        let cut = smallest_cut_acyclic(2, &[0, 0], &adj);
        assert_eq!(cut, vec![vec![0, 1]]);
    }

    #[test]
    fn acyclic_diamond_reaches_all_paths() {
        let adj = graph(4, &[(0, 1), (0, 2), (1, 3), (2, 3)]);
        let cut = smallest_cut_acyclic(4, &[0], &adj);
        assert_eq!(cut, vec![vec![0, 1, 2, 3]]);
    }

    #[test]
    fn acyclic_deep_chain_does_not_overflow() {
        let n = 200_000;
        let mut adj = vec![BTreeSet::new(); n];
        for i in 0..n - 1 {
            adj[i].insert(i + 1);
        }
        let cut = smallest_cut_acyclic(n, &[0], &adj);
        assert_eq!(cut.len(), 1);
        assert_eq!(cut[0].len(), n);
    }

    // -- cyclic ----------------------------------------------------------

    #[test]
    fn cyclic_cycle_is_fully_collected() {
        let adj = graph(3, &[(0, 1), (1, 0), (1, 2)]);
        let cut = smallest_cut_cyclic(3, &[0], &adj);
        assert_eq!(cut, vec![vec![0, 1, 2]]);
    }

    #[test]
    fn cyclic_mutually_reachable_starts_keep_first_visited_as_root() {
        let adj = graph(2, &[(0, 1), (1, 0)]);
        let cut = smallest_cut_cyclic(2, &[0, 1], &adj);
        assert_eq!(cut, vec![vec![0, 1]]);

        // Visit order decides the surviving root, not the node id.
        let cut = smallest_cut_cyclic(2, &[1, 0], &adj);
        assert_eq!(cut, vec![vec![0, 1]]);
    }

    #[test]
    fn cyclic_start_reached_by_earlier_start_is_not_a_root() {
        let adj = graph(3, &[(0, 1), (1, 2)]);
        let cut = smallest_cut_cyclic(3, &[0, 1], &adj);
        assert_eq!(cut, vec![vec![0, 1, 2]]);
    }

    #[test]
    fn cyclic_earlier_start_reached_by_later_start_is_not_a_root() {
        let adj = graph(3, &[(1, 0), (0, 2)]);
        let cut = smallest_cut_cyclic(3, &[0, 1], &adj);
        assert_eq!(cut, vec![vec![0, 1, 2]]);
    }

    #[test]
    fn cyclic_independent_starts_both_survive() {
        let adj = graph(4, &[(0, 2), (1, 3)]);
        let cut = smallest_cut_cyclic(4, &[0, 1], &adj);
        assert_eq!(cut, vec![vec![0, 2], vec![1, 3]]);
    }

    #[test]
    fn cyclic_duplicate_starts_yield_one_output() {
        let adj = graph(2, &[(0, 1), (1, 0)]);
        let cut = smallest_cut_cyclic(2, &[0, 0], &adj);
        assert_eq!(cut, vec![vec![0, 1]]);
    }
}
