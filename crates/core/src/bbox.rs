//! Axis-aligned labelled boxes.
//!
//! Corners are stored as `(x0, y0)` top-left and `(x1, y1)` bottom-right in
//! normalized image coordinates. While a box is being dragged the editor may
//! hold it degenerate; anything persisted must satisfy `x0 < x1` and
//! `y0 < y1`.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{new_id, EntityId};
use crate::validation::validate_unit;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub id: EntityId,
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
    pub image_id: EntityId,
    pub label: Option<String>,
}

impl BoundingBox {
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            id: new_id(),
            x0,
            y0,
            x1,
            y1,
            image_id: EntityId::nil(),
            label: None,
        }
    }

    /// Zero-size box with all four corners at `(x, y)`.
    pub fn at(x: f64, y: f64) -> Self {
        Self::new(x, y, x, y)
    }

    pub fn with_label(mut self, label: Option<String>) -> Self {
        self.label = label;
        self
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    /// `true` when the top-left corner is strictly above and left of the
    /// bottom-right one.
    pub fn is_well_formed(&self) -> bool {
        self.x0 < self.x1 && self.y0 < self.y1
    }

    /// Same box with corners reordered so that `x0 <= x1` and `y0 <= y1`.
    pub fn normalized(&self) -> Self {
        Self {
            x0: self.x0.min(self.x1),
            y0: self.y0.min(self.y1),
            x1: self.x0.max(self.x1),
            y1: self.y0.max(self.y1),
            ..self.clone()
        }
    }

    /// Check that a box can be persisted.
    ///
    /// Every corner coordinate must be in `[0, 1]` and the rectangle must
    /// have positive width and height.
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_unit("box", "x0", self.x0)?;
        validate_unit("box", "y0", self.y0)?;
        validate_unit("box", "x1", self.x1)?;
        validate_unit("box", "y1", self.y1)?;
        if !self.is_well_formed() {
            return Err(CoreError::Validation(format!(
                "box corners must satisfy x0 < x1 and y0 < y1, got ({}, {})-({}, {})",
                self.x0, self.y0, self.x1, self.y1
            )));
        }
        Ok(())
    }

    /// Two boxes are interchangeable when their corners and label agree.
    pub fn same_position(&self, other: &BoundingBox) -> bool {
        self.x0 == other.x0
            && self.y0 == other.y0
            && self.x1 == other.x1
            && self.y1 == other.y1
            && self.label == other.label
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn full_frame_box_is_valid() {
        assert!(BoundingBox::new(0.0, 0.0, 1.0, 1.0).validate().is_ok());
    }

    #[test]
    fn out_of_range_corner_rejected() {
        assert_matches!(
            BoundingBox::new(0.1, 0.1, 1.2, 0.5).validate(),
            Err(CoreError::OutOfRange { entity: "box", field: "x1", .. })
        );
    }

    #[test]
    fn crossed_box_rejected() {
        assert_matches!(
            BoundingBox::new(0.6, 0.2, 0.2, 0.6).validate(),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn zero_area_box_rejected() {
        assert!(BoundingBox::at(0.3, 0.3).validate().is_err());
    }

    #[test]
    fn normalized_swaps_crossed_axes() {
        let b = BoundingBox::new(0.6, 0.6, 0.2, 0.8).normalized();
        assert_eq!((b.x0, b.y0, b.x1, b.y1), (0.2, 0.6, 0.6, 0.8));
        assert!(b.is_well_formed());
    }

    #[test]
    fn normalized_keeps_identity_and_label() {
        let b = BoundingBox::new(0.6, 0.2, 0.2, 0.6).with_label(Some("face".into()));
        let n = b.normalized();
        assert_eq!(n.id, b.id);
        assert_eq!(n.label.as_deref(), Some("face"));
    }

    #[test]
    fn dimensions() {
        let b = BoundingBox::new(0.2, 0.25, 0.6, 0.75);
        assert!((b.width() - 0.4).abs() < 1e-12);
        assert!((b.height() - 0.5).abs() < 1e-12);
    }
}
