//! Priority-seeded topological sort.
//!
//! [`topological_sort`] visits a set of nodes so that every node appears
//! after all of its predecessors. Unlike a plain Kahn ordering, the caller
//! controls priority twice over: seeds are visited in the order given, and a
//! node's predecessors are explored in the order the callback yields them.
//! Nodes with no ordering constraint between them therefore come out in seed
//! priority order, which is what lets a caller bias the result (e.g. most
//! frequently used first) while still respecting dependencies.

#![no_std]

extern crate alloc;

use alloc::vec::Vec;
use core::hash::Hash;

use hashbrown::HashMap;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Visiting,
    Done,
}

/// Orders `seeds` so every node's predecessors precede it.
///
/// `preds` is queried once per node and must yield the same predecessors on
/// every call for a given node. Every emitted node comes from `seeds`; the
/// predecessor callback is only consulted for nodes reachable from them, and
/// each node is emitted exactly once even if seeded multiple times.
///
/// # Panics
///
/// Panics if the predecessor relation contains a cycle. Callers are expected
/// to only hand in relations that a prior validation step proved acyclic, so
/// a cycle here is an internal invariant violation, not an input error.
pub fn topological_sort<T, I, P, PI>(seeds: I, mut preds: P) -> Vec<T>
where
    T: Copy + Eq + Hash,
    I: IntoIterator<Item = T>,
    P: FnMut(T) -> PI,
    PI: IntoIterator<Item = T>,
{
    let mut marks: HashMap<T, Mark> = HashMap::new();
    let mut order = Vec::new();
    // Frames are (node, children_pushed): a node is pushed once to expand its
    // predecessors and once more to be emitted after they all completed.
    let mut stack: Vec<(T, bool)> = Vec::new();

    for seed in seeds {
        if marks.contains_key(&seed) {
            continue;
        }
        stack.push((seed, false));
        while let Some((node, expanded)) = stack.pop() {
            if expanded {
                marks.insert(node, Mark::Done);
                order.push(node);
                continue;
            }
            match marks.get(&node) {
                // Finished via an earlier path through the graph.
                Some(Mark::Done) => continue,
                Some(Mark::Visiting) => panic!("cycle in topological sort input"),
                None => {}
            }
            marks.insert(node, Mark::Visiting);
            stack.push((node, true));
            let pending: Vec<T> = preds(node).into_iter().collect();
            // Reversed so the first-listed predecessor is expanded first.
            for &pred in pending.iter().rev() {
                if marks.get(&pred) != Some(&Mark::Done) {
                    stack.push((pred, false));
                }
            }
        }
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use alloc::vec::Vec;
    use pretty_assertions::assert_eq;

    fn preds_of(edges: &[(u32, u32)]) -> impl FnMut(u32) -> Vec<u32> + '_ {
        // (a, b) means b is a predecessor of a.
        move |node| {
            edges
                .iter()
                .filter(|&&(n, _)| n == node)
                .map(|&(_, p)| p)
                .collect()
        }
    }

    #[test]
    fn test_no_edges_keeps_seed_order() {
        let order = topological_sort([3, 1, 2], |_| Vec::new());
        assert_eq!(order, [3, 1, 2]);
    }

    #[test]
    fn test_chain() {
        // 0 depends on 1 depends on 2.
        let edges = [(0, 1), (1, 2)];
        let order = topological_sort([0, 1, 2], preds_of(&edges));
        assert_eq!(order, [2, 1, 0]);
    }

    #[test]
    fn test_diamond_respects_pred_order() {
        // 0 depends on 1 and 2 (in that priority), both depend on 3.
        let edges = [(0, 1), (0, 2), (1, 3), (2, 3)];
        let order = topological_sort([0, 1, 2, 3], preds_of(&edges));
        assert_eq!(order, [3, 1, 2, 0]);
    }

    #[test]
    fn test_high_priority_seed_first_unless_constrained() {
        // 2 is seeded first but depends on 0; 1 is unconstrained.
        let edges = [(2, 0)];
        let order = topological_sort([2, 1, 0], preds_of(&edges));
        assert_eq!(order, [0, 2, 1]);
    }

    #[test]
    fn test_duplicate_seeds_emit_once() {
        let order = topological_sort([1, 1, 2, 1], |_| Vec::new());
        assert_eq!(order, [1, 2]);
    }

    #[test]
    #[should_panic(expected = "cycle")]
    fn test_cycle_panics() {
        let edges = [(0, 1), (1, 0)];
        let _ = topological_sort([0, 1], preds_of(&edges));
    }
}
