//! salesbot-route: Pure waypoint route planning (sans-IO).
//!
//! Chooses a visiting order for a small set of waypoints through:
//! complete graph -> nearest-neighbour tour + oracle tour -> selection.
//!
//! This crate has **no I/O dependencies** -- it operates on in-memory
//! data and returns structured results. Reading the point source and
//! patching the robot program live in the `salesbot` binary and
//! `salesbot-asm`.

pub mod graph;
pub mod input;
pub mod nearest;
pub mod oracle;
pub mod select;
pub mod types;
pub mod units;

pub use graph::{RouteGraph, build_graph, distance};
pub use input::{load_store, parse_waypoints};
pub use nearest::nearest_neighbor_tour;
pub use oracle::{TourOracle, TourOracleKind, oracle_tour};
pub use select::{Selection, path_length, select_best_tour};
pub use types::{
    CandidateSummary, Heuristic, ORIGIN_NUMBER, Point, PointStore, RouteConfig, RouteError,
    RoutePlan, Tour,
};
pub use units::Units;

/// Run the full planning pipeline.
///
/// # Pipeline steps
///
/// 1. Build the complete graph over the origin and waypoints
/// 2. Nearest-neighbour tour from the origin
/// 3. Oracle tour over the waypoints, anchored at the origin
/// 4. Select the shorter tour (nearest-neighbour wins ties)
///
/// # Errors
///
/// Returns [`RouteError::OracleContract`] if the configured oracle returns
/// something other than a permutation of the waypoints.
pub fn plan_route(store: &PointStore, config: &RouteConfig) -> Result<RoutePlan, RouteError> {
    // 1. Complete graph.
    let graph = RouteGraph::from_store(store);

    // 2. Nearest-neighbour.
    let nearest = nearest_neighbor_tour(&graph);
    debug_assert!(nearest.covers(store), "nearest-neighbour tour is incomplete");

    // 3. Oracle.
    let cycle = oracle_tour(&graph, &config.oracle)?;

    // 4. Selection, in computation order.
    let heuristics = [
        Heuristic::NearestNeighbor,
        Heuristic::Oracle(config.oracle),
    ];
    let candidates = vec![nearest, cycle];
    let summaries = candidates
        .iter()
        .zip(heuristics)
        .map(|(tour, heuristic)| {
            path_length(tour, &graph).map(|length| CandidateSummary { heuristic, length })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let selection = select_best_tour(candidates, &graph)?;
    let heuristic = heuristics[selection.index];
    log::info!(
        "chose {heuristic} tour, length {:.3}: {}",
        selection.length,
        selection.tour
    );

    Ok(RoutePlan {
        tour: selection.tour,
        length: selection.length,
        heuristic,
        candidates: summaries,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn store(points: Vec<Point>) -> PointStore {
        PointStore::new(Point::origin(0, 0), points).unwrap()
    }

    #[test]
    fn plan_covers_every_waypoint() {
        let points: Vec<Point> = (1..=12)
            .map(|i: i32| Point::new((i * 53) % 91, (i * 29) % 67, u32::try_from(i).unwrap()))
            .collect();
        let store = store(points);
        for oracle in [TourOracleKind::DoubleTree, TourOracleKind::TwoOpt] {
            let config = RouteConfig {
                oracle,
                ..RouteConfig::default()
            };
            let plan = plan_route(&store, &config).unwrap();
            assert!(plan.tour.covers(&store));
            assert_eq!(plan.candidates.len(), 2);
        }
    }

    #[test]
    fn plan_length_is_minimum_of_candidates() {
        let points = vec![
            Point::new(10, 0, 1),
            Point::new(0, 10, 2),
            Point::new(-10, 0, 3),
            Point::new(0, -10, 4),
            Point::new(7, 7, 5),
        ];
        let plan = plan_route(&store(points), &RouteConfig::default()).unwrap();
        let minimum = plan
            .candidates
            .iter()
            .map(|c| c.length)
            .fold(f64::INFINITY, f64::min);
        assert!((plan.length - minimum).abs() < f64::EPSILON);
    }

    #[test]
    fn tie_prefers_nearest_neighbor() {
        // On a ray from the origin both heuristics walk outward.
        let points = vec![Point::new(1, 0, 1), Point::new(2, 0, 2), Point::new(3, 0, 3)];
        let plan = plan_route(&store(points), &RouteConfig::default()).unwrap();
        assert_eq!(plan.heuristic, Heuristic::NearestNeighbor);
        assert!((plan.length - 3.0).abs() < 1e-12);
    }

    #[test]
    fn oracle_wins_when_strictly_shorter() {
        // Greedy goes right first and has to cross back over the origin;
        // the tree walk starts from the far left point.
        let points = vec![Point::new(-4, 0, 1), Point::new(2, 0, 2), Point::new(7, 0, 3)];
        let plan = plan_route(&store(points), &RouteConfig::default()).unwrap();
        assert!((plan.candidates[0].length - 18.0).abs() < 1e-12);
        assert!((plan.candidates[1].length - 15.0).abs() < 1e-12);
        assert_eq!(plan.heuristic, Heuristic::Oracle(TourOracleKind::DoubleTree));
        assert_eq!(plan.tour.waypoints()[0].number, 1);
    }

    #[test]
    fn plan_serializes_to_json() {
        let plan = plan_route(&store(vec![Point::new(3, 4, 1)]), &RouteConfig::default()).unwrap();
        let json = serde_json::to_string(&plan).unwrap();
        assert!(json.contains("\"nearest_neighbor\""));
    }
}
