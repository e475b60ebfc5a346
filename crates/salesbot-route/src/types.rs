//! Shared types for the salesbot route pipeline.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::oracle::TourOracleKind;
use crate::units::Units;

/// Identity number reserved for the origin.
///
/// Waypoints are numbered densely from 1; the origin is never written
/// to the coordinate table.
pub const ORIGIN_NUMBER: u32 = 0;

/// A 2D point in robot-native positioning units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    /// Horizontal position.
    pub x: i32,
    /// Vertical position.
    pub y: i32,
    /// 1-based identity matching the input source and the output table,
    /// or [`ORIGIN_NUMBER`] for the origin.
    pub number: u32,
}

impl Point {
    /// Create a new waypoint.
    #[must_use]
    pub const fn new(x: i32, y: i32, number: u32) -> Self {
        Self { x, y, number }
    }

    /// Create the origin point.
    #[must_use]
    pub const fn origin(x: i32, y: i32) -> Self {
        Self {
            x,
            y,
            number: ORIGIN_NUMBER,
        }
    }

    /// Returns `true` if this point carries the origin identity.
    #[must_use]
    pub const fn is_origin(&self) -> bool {
        self.number == ORIGIN_NUMBER
    }

    pub(crate) fn to_geo(self) -> geo::Point<f64> {
        geo::Point::new(f64::from(self.x), f64::from(self.y))
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_origin() {
            write!(f, "origin ({}, {})", self.x, self.y)
        } else {
            write!(f, "#{} ({}, {})", self.number, self.x, self.y)
        }
    }
}

/// The origin plus the ordered waypoints for one run.
///
/// Size is a runtime property. Construction guarantees the waypoint
/// numbers are exactly `1..=N` with no duplicates, held in number order.
/// Deserialization goes through the same checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPointStore")]
pub struct PointStore {
    origin: Point,
    waypoints: Vec<Point>,
}

/// Unchecked wire form of [`PointStore`].
#[derive(Deserialize)]
struct RawPointStore {
    origin: Point,
    waypoints: Vec<Point>,
}

impl TryFrom<RawPointStore> for PointStore {
    type Error = RouteError;

    fn try_from(raw: RawPointStore) -> Result<Self, Self::Error> {
        Self::new(raw.origin, raw.waypoints)
    }
}

impl PointStore {
    /// Build a store from an origin and its waypoints.
    ///
    /// The origin's number is forced to [`ORIGIN_NUMBER`]. Waypoints are
    /// sorted by number, so store order is sequence order.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::InvalidInput`] if `waypoints` is empty, if any
    /// waypoint carries the origin number, or if the numbers are not the
    /// dense set `1..=N`.
    pub fn new(origin: Point, mut waypoints: Vec<Point>) -> Result<Self, RouteError> {
        validate_waypoints(&waypoints)?;

        let expected = waypoints.len();
        let numbers: BTreeSet<u32> = waypoints.iter().map(|p| p.number).collect();
        let dense = numbers.iter().copied().eq((1_u32..).take(expected));
        if !dense {
            return Err(RouteError::InvalidInput(format!(
                "waypoint numbers must be exactly 1..={expected}, got {numbers:?}"
            )));
        }

        waypoints.sort_by_key(|p| p.number);
        Ok(Self {
            origin: Point::origin(origin.x, origin.y),
            waypoints,
        })
    }

    /// The fixed starting point.
    #[must_use]
    pub const fn origin(&self) -> Point {
        self.origin
    }

    /// Waypoints in number order.
    #[must_use]
    pub fn waypoints(&self) -> &[Point] {
        &self.waypoints
    }

    /// Number of waypoints (excluding the origin).
    #[must_use]
    pub const fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// Always `false`: a store holds at least one waypoint.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Iterate over the waypoints in number order.
    pub fn iter(&self) -> std::slice::Iter<'_, Point> {
        self.waypoints.iter()
    }
}

impl<'a> IntoIterator for &'a PointStore {
    type Item = &'a Point;
    type IntoIter = std::slice::Iter<'a, Point>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Reject empty waypoint sets, origin identities and duplicates.
pub(crate) fn validate_waypoints(waypoints: &[Point]) -> Result<(), RouteError> {
    if waypoints.is_empty() {
        return Err(RouteError::InvalidInput(
            "at least one waypoint is required".to_owned(),
        ));
    }

    let mut seen = BTreeSet::new();
    for point in waypoints {
        if point.is_origin() {
            return Err(RouteError::InvalidInput(format!(
                "waypoint {point} carries the reserved origin number {ORIGIN_NUMBER}"
            )));
        }
        if !seen.insert(point.number) {
            return Err(RouteError::InvalidInput(format!(
                "duplicate waypoint number {}",
                point.number
            )));
        }
    }
    Ok(())
}

/// Ordered visiting sequence: origin first, then each waypoint once.
///
/// A tour is an open path; it does not return to the origin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tour(Vec<Point>);

impl Tour {
    /// Create a tour from a point sequence that starts at the origin.
    #[must_use]
    pub const fn new(points: Vec<Point>) -> Self {
        Self(points)
    }

    /// All points, origin included.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.0
    }

    /// The visiting order without the leading origin.
    #[must_use]
    pub fn waypoints(&self) -> &[Point] {
        match self.0.split_first() {
            Some((first, rest)) if first.is_origin() => rest,
            _ => &self.0,
        }
    }

    /// Number of points, origin included.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the tour has no points.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns `true` if the tour starts at the store's origin and visits
    /// every waypoint of `store` exactly once.
    #[must_use]
    pub fn covers(&self, store: &PointStore) -> bool {
        let Some((first, rest)) = self.0.split_first() else {
            return false;
        };
        if *first != store.origin() || rest.len() != store.len() {
            return false;
        }
        let mut visited: Vec<Point> = rest.to_vec();
        let mut expected: Vec<Point> = store.waypoints().to_vec();
        visited.sort_by_key(|p| p.number);
        expected.sort_by_key(|p| p.number);
        visited == expected
    }

    /// Consumes the tour and returns the underlying points.
    #[must_use]
    pub fn into_points(self) -> Vec<Point> {
        self.0
    }
}

impl std::fmt::Display for Tour {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for point in &self.0 {
            if !first {
                write!(f, " -> ")?;
            }
            first = false;
            if point.is_origin() {
                write!(f, "origin")?;
            } else {
                write!(f, "#{}", point.number)?;
            }
        }
        Ok(())
    }
}

/// Which heuristic produced a candidate tour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Heuristic {
    /// Greedy nearest-neighbour walk from the origin.
    NearestNeighbor,
    /// Approximate Hamiltonian cycle from the configured oracle.
    Oracle(TourOracleKind),
}

impl std::fmt::Display for Heuristic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NearestNeighbor => write!(f, "nearest-neighbor"),
            Self::Oracle(kind) => write!(f, "oracle ({kind})"),
        }
    }
}

/// Configuration for a planning run.
///
/// The origin is given in robot-native units; `units` applies only to
/// the point source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouteConfig {
    /// Origin horizontal position (robot units).
    pub origin_x: i32,

    /// Origin vertical position (robot units).
    pub origin_y: i32,

    /// Units of the coordinates in the point source.
    pub units: Units,

    /// Which approximate-cycle oracle competes with nearest-neighbour.
    pub oracle: TourOracleKind,
}

impl RouteConfig {
    /// Default origin horizontal position.
    pub const DEFAULT_ORIGIN_X: i32 = 0;
    /// Default origin vertical position.
    pub const DEFAULT_ORIGIN_Y: i32 = 0;
    /// Default point source units.
    pub const DEFAULT_UNITS: Units = Units::Robot;
    /// Default tour oracle.
    pub const DEFAULT_ORACLE: TourOracleKind = TourOracleKind::DoubleTree;

    /// The configured origin as a point.
    #[must_use]
    pub const fn origin(&self) -> Point {
        Point::origin(self.origin_x, self.origin_y)
    }
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            origin_x: Self::DEFAULT_ORIGIN_X,
            origin_y: Self::DEFAULT_ORIGIN_Y,
            units: Self::DEFAULT_UNITS,
            oracle: Self::DEFAULT_ORACLE,
        }
    }
}

/// Length of one candidate tour.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CandidateSummary {
    /// Heuristic that produced the candidate.
    pub heuristic: Heuristic,
    /// Total open-path length.
    pub length: f64,
}

/// Result of running the full planning pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutePlan {
    /// The chosen tour, origin first.
    pub tour: Tour,

    /// Total length of the chosen tour.
    pub length: f64,

    /// Heuristic that produced the chosen tour.
    pub heuristic: Heuristic,

    /// Every candidate in computation order.
    pub candidates: Vec<CandidateSummary>,
}

/// Errors that can occur during route planning.
#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    /// The point set is malformed or incomplete.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// No candidate tours were supplied to the selector.
    #[error("no candidate tours to compare")]
    EmptyCandidateSet,

    /// The tour oracle returned something other than a permutation of
    /// the waypoints.
    #[error("tour oracle broke its contract: {0}")]
    OracleContract(String),

    /// The point source is not valid JSON of the expected shape.
    #[error("failed to parse point source: {0}")]
    Parse(#[from] serde_json::Error),
}

impl RouteError {
    /// Short name of the error kind, for reporting.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) | Self::Parse(_) => "InvalidInput",
            Self::EmptyCandidateSet => "EmptyCandidateSet",
            Self::OracleContract(_) => "OracleContract",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn store() -> PointStore {
        PointStore::new(
            Point::origin(0, 0),
            vec![Point::new(1, 1, 1), Point::new(2, 2, 2), Point::new(3, 3, 3)],
        )
        .unwrap()
    }

    #[test]
    fn store_accepts_dense_numbers_in_any_order() {
        let store = PointStore::new(
            Point::origin(0, 0),
            vec![Point::new(5, 5, 2), Point::new(1, 1, 1)],
        )
        .unwrap();
        assert_eq!(
            store.waypoints(),
            &[Point::new(1, 1, 1), Point::new(5, 5, 2)]
        );
    }

    #[test]
    fn store_deserializes_through_validation() {
        let json = r#"{
            "origin": {"x": 0, "y": 0, "number": 0},
            "waypoints": [
                {"x": 5, "y": 5, "number": 2},
                {"x": 1, "y": 1, "number": 1}
            ]
        }"#;
        let store: PointStore = serde_json::from_str(json).unwrap();
        assert_eq!(store.waypoints()[0].number, 1);

        let gap = r#"{
            "origin": {"x": 0, "y": 0, "number": 0},
            "waypoints": [{"x": 1, "y": 1, "number": 2}]
        }"#;
        assert!(serde_json::from_str::<PointStore>(gap).is_err());

        let empty = r#"{"origin": {"x": 0, "y": 0, "number": 0}, "waypoints": []}"#;
        assert!(serde_json::from_str::<PointStore>(empty).is_err());
    }

    #[test]
    fn store_rejects_empty() {
        let result = PointStore::new(Point::origin(0, 0), Vec::new());
        assert!(matches!(result, Err(RouteError::InvalidInput(_))));
    }

    #[test]
    fn store_rejects_duplicates() {
        let result = PointStore::new(
            Point::origin(0, 0),
            vec![Point::new(1, 1, 1), Point::new(2, 2, 1)],
        );
        assert!(matches!(result, Err(RouteError::InvalidInput(_))));
    }

    #[test]
    fn store_rejects_gaps() {
        let result = PointStore::new(
            Point::origin(0, 0),
            vec![Point::new(1, 1, 1), Point::new(2, 2, 3)],
        );
        assert!(matches!(result, Err(RouteError::InvalidInput(_))));
    }

    #[test]
    fn store_rejects_origin_number() {
        let result = PointStore::new(
            Point::origin(0, 0),
            vec![Point::new(1, 1, ORIGIN_NUMBER)],
        );
        assert!(matches!(result, Err(RouteError::InvalidInput(_))));
    }

    #[test]
    fn store_normalizes_origin_number() {
        let store = PointStore::new(Point::new(4, 4, 9), vec![Point::new(1, 1, 1)]).unwrap();
        assert!(store.origin().is_origin());
        assert_eq!(store.origin().x, 4);
    }

    #[test]
    fn tour_waypoints_skip_origin() {
        let tour = Tour::new(vec![Point::origin(0, 0), Point::new(1, 1, 1)]);
        assert_eq!(tour.waypoints(), &[Point::new(1, 1, 1)]);
    }

    #[test]
    fn tour_covers_permutation() {
        let store = store();
        let tour = Tour::new(vec![
            store.origin(),
            Point::new(3, 3, 3),
            Point::new(1, 1, 1),
            Point::new(2, 2, 2),
        ]);
        assert!(tour.covers(&store));
    }

    #[test]
    fn tour_with_repeat_does_not_cover() {
        let store = store();
        let tour = Tour::new(vec![
            store.origin(),
            Point::new(1, 1, 1),
            Point::new(1, 1, 1),
            Point::new(2, 2, 2),
        ]);
        assert!(!tour.covers(&store));
    }

    #[test]
    fn tour_display_lists_numbers() {
        let tour = Tour::new(vec![
            Point::origin(0, 0),
            Point::new(1, 1, 2),
            Point::new(2, 2, 1),
        ]);
        assert_eq!(tour.to_string(), "origin -> #2 -> #1");
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = RouteConfig {
            origin_x: 10,
            units: Units::Feet,
            oracle: TourOracleKind::TwoOpt,
            ..RouteConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: RouteConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn config_missing_fields_use_defaults() {
        let config: RouteConfig = serde_json::from_str(r#"{"origin_y": 7}"#).unwrap();
        assert_eq!(config.origin_y, 7);
        assert_eq!(config.oracle, RouteConfig::DEFAULT_ORACLE);
    }
}
