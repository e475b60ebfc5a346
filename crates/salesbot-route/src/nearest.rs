//! Nearest-neighbour tour: greedy walk from the origin.
//!
//! At each step the walk follows the cheapest edge from the current
//! vertex to a vertex not yet visited. The departed vertex is removed
//! from a private working copy of the graph, so the caller's graph is
//! left intact for the other heuristics.
//!
//! Equal weights are resolved in favour of the lowest waypoint number.
//! This does not depend on input order or petgraph's adjacency-list
//! order.

use petgraph::stable_graph::StableUnGraph;
use petgraph::visit::EdgeRef;

use crate::graph::RouteGraph;
use crate::types::Tour;

/// Compute the nearest-neighbour tour starting at the origin.
///
/// Returns an open path with the origin first and every waypoint exactly
/// once. O(V²) in the number of vertices.
#[must_use = "returns the nearest-neighbour tour"]
pub fn nearest_neighbor_tour(graph: &RouteGraph) -> Tour {
    let mut working: StableUnGraph<_, f64> = StableUnGraph::from(graph.inner().clone());

    let mut current = graph.origin_index();
    let mut order = Vec::with_capacity(working.node_count());
    order.push(working[current]);

    while working.node_count() > 1 {
        let next = working
            .edges(current)
            .map(|edge| {
                let other = if edge.source() == current {
                    edge.target()
                } else {
                    edge.source()
                };
                (*edge.weight(), working[other].number, other)
            })
            .min_by(|(wa, na, _), (wb, nb, _)| wa.total_cmp(wb).then(na.cmp(nb)))
            .map(|(_, _, other)| other);

        // On a complete graph every remaining vertex is adjacent to the
        // current one, so `next` is only `None` once the walk is done.
        let Some(next) = next else {
            break;
        };

        working.remove_node(current);
        order.push(working[next]);
        current = next;
    }

    Tour::new(order)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::graph::build_graph;
    use crate::types::{Point, PointStore};

    #[test]
    fn single_waypoint() {
        let graph = build_graph(Point::origin(0, 0), &[Point::new(5, 5, 1)]).unwrap();
        let tour = nearest_neighbor_tour(&graph);
        assert_eq!(tour.points(), &[Point::origin(0, 0), Point::new(5, 5, 1)]);
    }

    #[test]
    fn zero_distance_point_visited_once() {
        let points = [
            Point::new(0, 0, 1),
            Point::new(10, 0, 2),
            Point::new(10, 10, 3),
        ];
        let graph = build_graph(Point::origin(0, 0), &points).unwrap();
        let tour = nearest_neighbor_tour(&graph);
        assert_eq!(
            tour.points(),
            &[Point::origin(0, 0), points[0], points[1], points[2]]
        );
    }

    #[test]
    fn nearer_point_visited_first() {
        let points = [Point::new(100, 0, 1), Point::new(1, 0, 2)];
        let graph = build_graph(Point::origin(0, 0), &points).unwrap();
        let tour = nearest_neighbor_tour(&graph);
        assert_eq!(tour.waypoints(), &[points[1], points[0]]);
    }

    #[test]
    fn ties_prefer_lowest_number() {
        // #1 and #2 are both 5 away from the origin.
        let points = [Point::new(0, 5, 1), Point::new(3, 4, 2), Point::new(-5, 0, 3)];
        let graph = build_graph(Point::origin(0, 0), &points).unwrap();
        let tour = nearest_neighbor_tour(&graph);
        assert_eq!(tour.waypoints()[0].number, 1);
    }

    #[test]
    fn ties_ignore_input_order() {
        // #2 is listed first; both are 5 away from the origin.
        let store = PointStore::new(
            Point::origin(0, 0),
            vec![Point::new(3, 4, 2), Point::new(0, 5, 1)],
        )
        .unwrap();
        let tour = nearest_neighbor_tour(&RouteGraph::from_store(&store));
        assert_eq!(tour.waypoints()[0].number, 1);

        let graph = build_graph(
            Point::origin(0, 0),
            &[Point::new(3, 4, 2), Point::new(0, 5, 1)],
        )
        .unwrap();
        assert_eq!(nearest_neighbor_tour(&graph).waypoints()[0].number, 1);
    }

    #[test]
    fn visits_every_point_exactly_once() {
        let waypoints: Vec<Point> = (1..=12)
            .map(|i: i32| Point::new((i * 37) % 101, (i * 59) % 83, u32::try_from(i).unwrap()))
            .collect();
        let store = PointStore::new(Point::origin(20, 20), waypoints).unwrap();
        let graph = RouteGraph::from_store(&store);
        let tour = nearest_neighbor_tour(&graph);
        assert_eq!(tour.len(), 13);
        assert!(tour.points()[0].is_origin());
        assert!(tour.covers(&store));
    }

    #[test]
    fn caller_graph_is_unchanged() {
        let points = [Point::new(1, 2, 1), Point::new(3, 4, 2), Point::new(5, 0, 3)];
        let graph = build_graph(Point::origin(0, 0), &points).unwrap();
        let nodes_before = graph.node_count();
        let edges_before = graph.edge_count();

        let first = nearest_neighbor_tour(&graph);
        let second = nearest_neighbor_tour(&graph);

        assert_eq!(graph.node_count(), nodes_before);
        assert_eq!(graph.edge_count(), edges_before);
        assert_eq!(first, second);
    }

    #[test]
    fn is_an_open_path() {
        let points = [Point::new(1, 0, 1), Point::new(2, 0, 2)];
        let graph = build_graph(Point::origin(0, 0), &points).unwrap();
        let tour = nearest_neighbor_tour(&graph);
        assert_eq!(tour.len(), 3);
        assert_ne!(tour.points().last(), Some(&graph.origin()));
    }
}
