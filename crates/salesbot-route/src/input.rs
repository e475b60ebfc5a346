//! Point source parsing.
//!
//! The source is a JSON object mapping 1-based stringified indices to
//! `[x, y]` pairs:
//!
//! ```json
//! { "1": [3.5, 2.0], "2": [7, -1.25] }
//! ```
//!
//! Every index from 1 to the number of entries must be present.

use std::collections::BTreeMap;

use crate::types::{Point, PointStore, RouteError};
use crate::units::Units;

/// Parse waypoints from a JSON point source, converting to robot units.
///
/// Waypoints are returned sorted by sequence number.
///
/// # Errors
///
/// Returns [`RouteError::Parse`] if the text is not a JSON object of
/// two-element numeric arrays, and [`RouteError::InvalidInput`] if a key
/// is not a positive integer, an index in `1..=N` is missing, or a value
/// cannot be converted to robot units.
pub fn parse_waypoints(json: &str, units: Units) -> Result<Vec<Point>, RouteError> {
    let raw: BTreeMap<String, [f64; 2]> = serde_json::from_str(json)?;

    let mut by_number = BTreeMap::new();
    for (key, [x, y]) in raw {
        let number: u32 = key
            .trim()
            .parse()
            .ok()
            .filter(|&n| n > 0)
            .ok_or_else(|| {
                RouteError::InvalidInput(format!("point key {key:?} is not a positive integer"))
            })?;
        let point = Point::new(units.to_robot(x)?, units.to_robot(y)?, number);
        if by_number.insert(number, point).is_some() {
            return Err(RouteError::InvalidInput(format!(
                "point {number} appears more than once"
            )));
        }
    }

    let count = by_number.len();
    if let Some(missing) = (1_u32..).take(count).find(|n| !by_number.contains_key(n)) {
        return Err(RouteError::InvalidInput(format!(
            "point source has {count} entries but index {missing} is missing"
        )));
    }

    let waypoints: Vec<Point> = by_number.into_values().collect();
    for point in &waypoints {
        log::debug!("loaded {point}");
    }
    Ok(waypoints)
}

/// Parse a point source and pair it with `origin` in a validated store.
///
/// # Errors
///
/// Returns the errors of [`parse_waypoints`] and [`PointStore::new`].
pub fn load_store(json: &str, units: Units, origin: Point) -> Result<PointStore, RouteError> {
    PointStore::new(origin, parse_waypoints(json, units)?)
}
