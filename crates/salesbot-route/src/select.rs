//! Tour length evaluation and candidate selection.

use crate::graph::RouteGraph;
use crate::types::{RouteError, Tour};

/// The candidate chosen by [`select_best_tour`].
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    /// Position of the chosen tour in the candidate list.
    pub index: usize,
    /// The chosen tour.
    pub tour: Tour,
    /// Its total open-path length.
    pub length: f64,
}

/// Total length of `tour` as an open path.
///
/// Sums the graph's precomputed edge weights over consecutive pairs, so
/// candidates built from the same graph compare identical values.
///
/// # Errors
///
/// Returns [`RouteError::InvalidInput`] if a consecutive pair has no edge
/// in `graph` (an unknown point, or the same point twice in a row).
pub fn path_length(tour: &Tour, graph: &RouteGraph) -> Result<f64, RouteError> {
    tour.points()
        .windows(2)
        .map(|pair| {
            graph.weight(pair[0], pair[1]).ok_or_else(|| {
                RouteError::InvalidInput(format!(
                    "tour step {} -> {} is not an edge of the route graph",
                    pair[0], pair[1]
                ))
            })
        })
        .sum()
}

/// Pick the shortest candidate.
///
/// A later candidate replaces the current best only when it is strictly
/// shorter, so exact ties keep the earliest candidate.
///
/// # Errors
///
/// Returns [`RouteError::EmptyCandidateSet`] if `candidates` is empty, or
/// the error from [`path_length`] for a malformed candidate.
pub fn select_best_tour(candidates: Vec<Tour>, graph: &RouteGraph) -> Result<Selection, RouteError> {
    let mut best: Option<Selection> = None;

    for (index, tour) in candidates.into_iter().enumerate() {
        let length = path_length(&tour, graph)?;
        log::debug!("candidate {index}: length {length:.3} ({tour})");

        let replace = best.as_ref().is_none_or(|b| length < b.length);
        if replace {
            best = Some(Selection {
                index,
                tour,
                length,
            });
        }
    }

    best.ok_or(RouteError::EmptyCandidateSet)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::graph::build_graph;
    use crate::types::Point;

    fn line() -> (RouteGraph, [Point; 3]) {
        let points = [Point::new(1, 0, 1), Point::new(2, 0, 2), Point::new(3, 0, 3)];
        (build_graph(Point::origin(0, 0), &points).unwrap(), points)
    }

    fn tour(graph: &RouteGraph, waypoints: &[Point]) -> Tour {
        let mut points = vec![graph.origin()];
        points.extend_from_slice(waypoints);
        Tour::new(points)
    }

    #[test]
    fn length_of_straight_line() {
        let (graph, p) = line();
        let length = path_length(&tour(&graph, &p), &graph).unwrap();
        assert!((length - 3.0).abs() < 1e-12);
    }

    #[test]
    fn length_of_origin_only_is_zero() {
        let (graph, _) = line();
        let length = path_length(&tour(&graph, &[]), &graph).unwrap();
        assert!(length.abs() < f64::EPSILON);
    }

    #[test]
    fn length_rejects_unknown_points() {
        let (graph, p) = line();
        let bad = tour(&graph, &[p[0], Point::new(50, 50, 7)]);
        assert!(matches!(
            path_length(&bad, &graph),
            Err(RouteError::InvalidInput(_))
        ));
    }

    #[test]
    fn empty_candidates_rejected() {
        let (graph, _) = line();
        let result = select_best_tour(Vec::new(), &graph);
        assert!(matches!(result, Err(RouteError::EmptyCandidateSet)));
    }

    #[test]
    fn shorter_candidate_wins() {
        let (graph, p) = line();
        let zigzag = tour(&graph, &[p[2], p[0], p[1]]);
        let straight = tour(&graph, &p);
        let chosen = select_best_tour(vec![zigzag, straight.clone()], &graph).unwrap();
        assert_eq!(chosen.index, 1);
        assert_eq!(chosen.tour, straight);
    }

    #[test]
    fn tie_keeps_first_candidate() {
        let points = [Point::new(0, 1, 1), Point::new(0, -1, 2)];
        let graph = build_graph(Point::origin(0, 0), &points).unwrap();
        let a = tour(&graph, &[points[0], points[1]]);
        let b = tour(&graph, &[points[1], points[0]]);
        let chosen = select_best_tour(vec![a.clone(), b], &graph).unwrap();
        assert_eq!(chosen.index, 0);
        assert_eq!(chosen.tour, a);
    }

    #[test]
    fn never_exceeds_minimum_candidate() {
        let (graph, p) = line();
        let candidates = vec![
            tour(&graph, &[p[2], p[0], p[1]]),
            tour(&graph, &[p[1], p[2], p[0]]),
            tour(&graph, &p),
            tour(&graph, &[p[0], p[2], p[1]]),
        ];
        let minimum = candidates
            .iter()
            .map(|t| path_length(t, &graph).unwrap())
            .fold(f64::INFINITY, f64::min);
        let chosen = select_best_tour(candidates, &graph).unwrap();
        assert!(chosen.length <= minimum);
    }
}
