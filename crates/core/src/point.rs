//! Point annotations: a single normalized location on an image.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{new_id, EntityId};
use crate::validation::validate_unit;

/// A labelled location, normalized to the image dimensions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub id: EntityId,
    pub x: f64,
    pub y: f64,
    pub image_id: EntityId,
    pub label: Option<String>,
}

impl Point {
    /// A point with a fresh id, not yet attached to an image.
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            id: new_id(),
            x,
            y,
            image_id: EntityId::nil(),
            label: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Both coordinates must lie in `[0, 1]`.
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_unit("point", "x", self.x)?;
        validate_unit("point", "y", self.y)
    }

    /// Two points are interchangeable when they sit at the same location.
    pub fn same_position(&self, other: &Point) -> bool {
        self.x == other.x && self.y == other.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn corners_of_unit_square_accepted() {
        assert!(Point::new(0.0, 0.0).validate().is_ok());
        assert!(Point::new(1.0, 1.0).validate().is_ok());
    }

    #[test]
    fn negative_x_rejected() {
        assert_matches!(
            Point::new(-0.001, 0.5).validate(),
            Err(CoreError::OutOfRange { field: "x", .. })
        );
    }

    #[test]
    fn y_above_one_rejected() {
        assert_matches!(
            Point::new(0.5, 1.001).validate(),
            Err(CoreError::OutOfRange { field: "y", .. })
        );
    }

    #[test]
    fn same_position_ignores_identity() {
        let a = Point::new(0.25, 0.75);
        let b = Point::new(0.25, 0.75).with_label("eye");
        assert_ne!(a.id, b.id);
        assert!(a.same_position(&b));
        assert!(!a.same_position(&Point::new(0.25, 0.7)));
    }
}
