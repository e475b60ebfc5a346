//! Approximate Hamiltonian-cycle oracles.
//!
//! An oracle receives the complete graph over the waypoints only (the
//! origin removed) and returns every waypoint exactly once, in an order
//! that approximately minimizes total edge weight. This module defines
//! the [`TourOracle`] trait for pluggable strategies, the
//! [`TourOracleKind`] enum for runtime selection, and [`oracle_tour`],
//! which re-attaches the origin to the oracle's ordering.

use petgraph::algo::min_spanning_tree;
use petgraph::data::Element;
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};

use crate::graph::RouteGraph;
use crate::types::{Point, RouteError, Tour};

/// Minimum gain for a 2-opt exchange to be applied.
const TWO_OPT_EPSILON: f64 = 1e-9;

/// Selects which approximate-cycle strategy competes with
/// nearest-neighbour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TourOracleKind {
    /// Preorder walk of a minimum spanning tree.
    ///
    /// The classic double-tree 2-approximation for metric instances:
    /// the walk never costs more than twice the optimal cycle.
    #[default]
    DoubleTree,

    /// Double-tree walk refined with first-improvement 2-opt on the
    /// closed cycle until no exchange shortens it.
    TwoOpt,
}

impl std::fmt::Display for TourOracleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DoubleTree => write!(f, "double-tree"),
            Self::TwoOpt => write!(f, "two-opt"),
        }
    }
}

/// Trait for approximate-cycle strategies.
///
/// Input: a complete weighted undirected graph over the waypoints.
/// Output: each node weight exactly once, as an open path or cycle order.
pub trait TourOracle {
    /// Order the waypoints of `graph`.
    fn approximate_tour(&self, graph: &UnGraph<Point, f64>) -> Vec<Point>;
}

impl TourOracle for TourOracleKind {
    fn approximate_tour(&self, graph: &UnGraph<Point, f64>) -> Vec<Point> {
        let order = match *self {
            Self::DoubleTree => double_tree(graph),
            Self::TwoOpt => two_opt(graph, double_tree(graph)),
        };
        order
            .into_iter()
            .map(|i| graph[NodeIndex::new(i)])
            .collect()
    }
}

/// Run `oracle` on the waypoint subgraph and anchor the result at the
/// origin.
///
/// The origin is prepended to whichever end of the oracle's ordering is
/// closer to it; the ordering is reversed when the last element is
/// strictly closer.
///
/// # Errors
///
/// Returns [`RouteError::OracleContract`] if the oracle's output is not a
/// permutation of the waypoints.
pub fn oracle_tour<O: TourOracle + ?Sized>(
    graph: &RouteGraph,
    oracle: &O,
) -> Result<Tour, RouteError> {
    let waypoints = graph.waypoint_graph();
    let order = oracle.approximate_tour(&waypoints);
    check_permutation(&waypoints, &order)?;
    anchor_at_origin(graph, order)
}

fn check_permutation(graph: &UnGraph<Point, f64>, order: &[Point]) -> Result<(), RouteError> {
    let mut expected: Vec<Point> = graph.node_weights().copied().collect();
    let mut actual = order.to_vec();
    expected.sort_by_key(|p| p.number);
    actual.sort_by_key(|p| p.number);
    if expected == actual {
        Ok(())
    } else {
        log::warn!(
            "tour oracle returned {} points for {} waypoints",
            order.len(),
            expected.len()
        );
        Err(RouteError::OracleContract(
            "output is not a permutation of the waypoints".to_owned(),
        ))
    }
}

/// Prepend the origin to the closer end of `order`.
fn anchor_at_origin(graph: &RouteGraph, mut order: Vec<Point>) -> Result<Tour, RouteError> {
    let origin = graph.origin();
    let (Some(&first), Some(&last)) = (order.first(), order.last()) else {
        return Err(RouteError::OracleContract("output is empty".to_owned()));
    };

    let missing = |p: Point| RouteError::OracleContract(format!("{p} is not in the route graph"));
    let to_first = graph.weight(origin, first).ok_or_else(|| missing(first))?;
    let to_last = graph.weight(origin, last).ok_or_else(|| missing(last))?;

    if to_last < to_first {
        order.reverse();
    }

    let mut points = Vec::with_capacity(order.len() + 1);
    points.push(origin);
    points.extend(order);
    Ok(Tour::new(points))
}

/// Preorder walk of the minimum spanning tree, rooted at node 0.
///
/// Node index order is waypoint number order (see [`RouteGraph`]), so the
/// walk starts at the lowest-numbered waypoint and visits children in
/// ascending number order. Returns node
/// indices.
fn double_tree(graph: &UnGraph<Point, f64>) -> Vec<usize> {
    let n = graph.node_count();
    if n == 0 {
        return Vec::new();
    }

    let mut children = vec![Vec::new(); n];
    for element in min_spanning_tree(graph) {
        if let Element::Edge { source, target, .. } = element {
            children[source].push(target);
            children[target].push(source);
        }
    }
    for adjacent in &mut children {
        adjacent.sort_unstable();
    }

    let mut visited = vec![false; n];
    let mut order = Vec::with_capacity(n);
    let mut stack = vec![0];
    while let Some(node) = stack.pop() {
        if visited[node] {
            continue;
        }
        visited[node] = true;
        order.push(node);
        // Reverse so the lowest index is popped first.
        stack.extend(children[node].iter().rev().filter(|&&c| !visited[c]));
    }

    order
}

/// First-improvement 2-opt on the closed cycle `tour`.
fn two_opt(graph: &UnGraph<Point, f64>, mut tour: Vec<usize>) -> Vec<usize> {
    let n = tour.len();
    if n < 4 {
        return tour;
    }

    let mut matrix = vec![vec![f64::INFINITY; n]; n];
    for edge in graph.edge_references() {
        let (a, b) = (edge.source().index(), edge.target().index());
        matrix[a][b] = *edge.weight();
        matrix[b][a] = *edge.weight();
    }

    let mut improved = true;
    while improved {
        improved = false;
        for i in 0..n - 1 {
            for j in i + 2..n {
                // Edges (i, i+1) and (n-1, 0) are adjacent on the cycle.
                if i == 0 && j == n - 1 {
                    continue;
                }
                let (a, b) = (tour[i], tour[i + 1]);
                let (c, d) = (tour[j], tour[(j + 1) % n]);
                let delta = matrix[a][c] + matrix[b][d] - matrix[a][b] - matrix[c][d];
                if delta < -TWO_OPT_EPSILON {
                    tour[i + 1..=j].reverse();
                    improved = true;
                }
            }
        }
    }

    tour
}
