//! Distance metric and complete-graph construction.
//!
//! The graph is a complete, simple, undirected graph over the origin and
//! every waypoint. Node 0 is always the origin; waypoints follow in
//! ascending number order, whatever order they were passed in. Edge weights are Euclidean distances and are
//! computed once here so that every later comparison reads identical
//! values.

use std::collections::BTreeMap;

use geo::Euclidean;
use geo::line_measures::Distance;
use petgraph::graph::{NodeIndex, UnGraph};

use crate::types::{Point, PointStore, RouteError, validate_waypoints};

/// Euclidean distance between two points, in robot units.
#[must_use]
pub fn distance(a: Point, b: Point) -> f64 {
    Euclidean.distance(a.to_geo(), b.to_geo())
}

/// Complete weighted graph over the origin and the waypoints.
#[derive(Debug, Clone)]
pub struct RouteGraph {
    graph: UnGraph<Point, f64>,
    origin: NodeIndex,
    nodes: BTreeMap<u32, NodeIndex>,
}

/// Build the complete graph over `origin` and `points`.
///
/// # Errors
///
/// Returns [`RouteError::InvalidInput`] if `points` is empty, contains a
/// duplicate number, or contains a point numbered as the origin.
pub fn build_graph(origin: Point, points: &[Point]) -> Result<RouteGraph, RouteError> {
    validate_waypoints(points)?;
    Ok(RouteGraph::build(Point::origin(origin.x, origin.y), points))
}

impl RouteGraph {
    /// Build the graph for an already validated store.
    #[must_use]
    pub fn from_store(store: &PointStore) -> Self {
        Self::build(store.origin(), store.waypoints())
    }

    fn build(origin: Point, points: &[Point]) -> Self {
        let mut sorted = points.to_vec();
        sorted.sort_by_key(|p| p.number);

        let n = sorted.len();
        let mut graph = UnGraph::with_capacity(n + 1, n * (n + 1) / 2);
        let mut nodes = BTreeMap::new();

        let origin_idx = graph.add_node(origin);
        nodes.insert(origin.number, origin_idx);
        for point in &sorted {
            let idx = graph.add_node(*point);
            nodes.insert(point.number, idx);
        }

        let indices: Vec<NodeIndex> = graph.node_indices().collect();
        for (i, &a) in indices.iter().enumerate() {
            for &b in &indices[i + 1..] {
                let w = distance(graph[a], graph[b]);
                graph.add_edge(a, b, w);
            }
        }

        log::debug!(
            "built route graph: {} nodes, {} edges",
            graph.node_count(),
            graph.edge_count()
        );

        Self {
            graph,
            origin: origin_idx,
            nodes,
        }
    }

    /// The origin point.
    #[must_use]
    pub fn origin(&self) -> Point {
        self.graph[self.origin]
    }

    /// Node index of the origin.
    #[must_use]
    pub const fn origin_index(&self) -> NodeIndex {
        self.origin
    }

    /// Number of vertices, origin included.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// The underlying petgraph graph.
    #[must_use]
    pub const fn inner(&self) -> &UnGraph<Point, f64> {
        &self.graph
    }

    /// Node index of the point with the given identity number.
    #[must_use]
    pub fn node_of(&self, number: u32) -> Option<NodeIndex> {
        self.nodes.get(&number).copied()
    }

    /// Precomputed weight of the edge between `a` and `b`.
    ///
    /// Returns `None` if either point is not part of the graph (matched by
    /// number and coordinates) or if `a` and `b` are the same vertex.
    #[must_use]
    pub fn weight(&self, a: Point, b: Point) -> Option<f64> {
        let ia = self.node_of(a.number).filter(|&i| self.graph[i] == a)?;
        let ib = self.node_of(b.number).filter(|&i| self.graph[i] == b)?;
        let edge = self.graph.find_edge(ia, ib)?;
        self.graph.edge_weight(edge).copied()
    }

    /// The subgraph over the waypoints only, with the origin removed.
    ///
    /// Node index order is waypoint number order.
    #[must_use]
    pub fn waypoint_graph(&self) -> UnGraph<Point, f64> {
        let origin = self.origin;
        self.graph
            .filter_map(|n, p| (n != origin).then_some(*p), |_, w| Some(*w))
    }
}
