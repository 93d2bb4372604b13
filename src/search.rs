// SPDX-FileCopyrightText: 2026 Eli Array Minkoff
//
// SPDX-License-Identifier: 0BSD

//! Best-first search over an abstract state graph
//!
//! Drivers that explore a maze by running an [Executor](crate::Executor) usually end up with a map
//! that still needs a shortest path through it. This module is independent of the VM itself.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::hash::Hash;

/// A graph to search, defined by its goal test, its moves, and a distance estimate
pub trait SearchSpace {
    /// A position within the graph
    type State: Clone + Eq + Hash;

    /// Whether `state` is a goal
    fn is_goal(&self, state: &Self::State) -> bool;

    /// Every state reachable from `state` in one move, with the cost of that move
    fn moves(&self, state: &Self::State) -> Vec<(u64, Self::State)>;

    /// Lower bound on the remaining cost from `state` to the nearest goal.
    ///
    /// Must never overestimate, or the path found may not be the cheapest. The default of `0`
    /// turns the search into Dijkstra's algorithm.
    fn estimate(&self, _state: &Self::State) -> u64 {
        0
    }
}

/// The cheapest route found by [`best_first`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPath<S> {
    /// Total cost of every move along the path
    pub cost: u64,
    /// Each state visited, starting with the start state and ending with the goal
    pub states: Vec<S>,
}

/// Find the cheapest path from `start` to a goal state, or [`None`] if no goal is reachable
///
/// ```
/// use intcode::search::{best_first, SearchSpace};
///
/// /// walk along a number line towards 10, in steps of 1 or 3
/// struct Line;
/// impl SearchSpace for Line {
///     type State = i32;
///     fn is_goal(&self, state: &i32) -> bool {
///         *state == 10
///     }
///     fn moves(&self, state: &i32) -> Vec<(u64, i32)> {
///         vec![(1, state + 1), (1, state + 3)]
///     }
///     fn estimate(&self, state: &i32) -> u64 {
///         u64::try_from((10 - state).max(0)).unwrap().div_ceil(3)
///     }
/// }
///
/// let path = best_first(&Line, 0).unwrap();
/// assert_eq!(path.cost, 4);
/// assert_eq!(path.states.first(), Some(&0));
/// assert_eq!(path.states.last(), Some(&10));
/// ```
pub fn best_first<S: SearchSpace + ?Sized>(
    space: &S,
    start: S::State,
) -> Option<SearchPath<S::State>> {
    // every state ever queued, along with the index of the state it was reached from
    let mut nodes: Vec<(S::State, Option<usize>)> = vec![(start.clone(), None)];
    let mut best: HashMap<S::State, u64> = HashMap::from([(start.clone(), 0)]);
    let mut open = BinaryHeap::from([Reverse((space.estimate(&start), 0, 0))]);

    while let Some(Reverse((_, cost, id))) = open.pop() {
        let state = nodes[id].0.clone();
        if best.get(&state).is_some_and(|&b| b < cost) {
            continue;
        }
        if space.is_goal(&state) {
            return Some(rebuild(&nodes, id, cost));
        }
        for (step, next) in space.moves(&state) {
            let next_cost = cost + step;
            if best.get(&next).is_some_and(|&b| b <= next_cost) {
                continue;
            }
            best.insert(next.clone(), next_cost);
            open.push(Reverse((
                next_cost + space.estimate(&next),
                next_cost,
                nodes.len(),
            )));
            nodes.push((next, Some(id)));
        }
    }
    None
}

fn rebuild<S: Clone>(nodes: &[(S, Option<usize>)], goal: usize, cost: u64) -> SearchPath<S> {
    let mut states = Vec::new();
    let mut current = Some(goal);
    while let Some(id) = current {
        states.push(nodes[id].0.clone());
        current = nodes[id].1;
    }
    states.reverse();
    SearchPath { cost, states }
}
