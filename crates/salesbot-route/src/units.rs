//! Conversion from point-source units to robot-native positioning units.

use serde::{Deserialize, Serialize};

use crate::types::RouteError;

/// Inches per foot.
const INCHES_PER_FOOT: f64 = 12.0;

/// Millimetres per inch.
const MM_PER_INCH: f64 = 25.4;

/// Millimetres travelled per robot position unit.
pub const MM_PER_ROBOT_UNIT: f64 = 1.05;

/// Units of the coordinates in the point source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Units {
    /// Values are already robot-native integers.
    #[default]
    Robot,

    /// Values are feet; converted with `trunc(feet * 12 * 25.4 / 1.05)`.
    Feet,
}

impl Units {
    /// Convert a single coordinate value to robot units.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::InvalidInput`] if the value is not finite,
    /// if a robot-unit value is not integral, or if the result does not
    /// fit in an `i32`.
    pub fn to_robot(self, value: f64) -> Result<i32, RouteError> {
        if !value.is_finite() {
            return Err(RouteError::InvalidInput(format!(
                "coordinate {value} is not a finite number"
            )));
        }

        let robot = match self {
            Self::Robot => {
                if value.fract() != 0.0 {
                    return Err(RouteError::InvalidInput(format!(
                        "coordinate {value} is not an integral robot unit"
                    )));
                }
                value
            }
            Self::Feet => (value * INCHES_PER_FOOT * MM_PER_INCH / MM_PER_ROBOT_UNIT).trunc(),
        };

        if robot < f64::from(i32::MIN) || robot > f64::from(i32::MAX) {
            return Err(RouteError::InvalidInput(format!(
                "coordinate {value} is out of range for robot units"
            )));
        }

        #[allow(clippy::cast_possible_truncation)]
        Ok(robot as i32)
    }
}

impl std::fmt::Display for Units {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Robot => write!(f, "robot"),
            Self::Feet => write!(f, "feet"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn robot_units_pass_through() {
        assert_eq!(Units::Robot.to_robot(-42.0).unwrap(), -42);
        assert_eq!(Units::Robot.to_robot(0.0).unwrap(), 0);
    }

    #[test]
    fn fractional_robot_units_rejected() {
        let result = Units::Robot.to_robot(1.5);
        assert!(matches!(result, Err(RouteError::InvalidInput(_))));
    }

    #[test]
    fn one_foot_converts() {
        // 12 * 25.4 / 1.05 = 290.28...
        assert_eq!(Units::Feet.to_robot(1.0).unwrap(), 290);
    }

    #[test]
    fn feet_truncate_toward_zero() {
        assert_eq!(Units::Feet.to_robot(-1.0).unwrap(), -290);
        assert_eq!(Units::Feet.to_robot(0.5).unwrap(), 145);
    }

    #[test]
    fn non_finite_rejected() {
        assert!(Units::Feet.to_robot(f64::NAN).is_err());
        assert!(Units::Robot.to_robot(f64::INFINITY).is_err());
    }

    #[test]
    fn out_of_range_rejected() {
        assert!(Units::Robot.to_robot(1e12).is_err());
        assert!(Units::Feet.to_robot(1e10).is_err());
    }
}
