//! Input modes of the editor.

use serde::{Deserialize, Serialize};

/// What the next pointer gesture edits.
///
/// `Point` and `Box` decide what `add` creates. The four corner modes name
/// the box corner currently following the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum InputMode {
    Point,
    #[default]
    Box,
    /// Top-left handle: moves `(x0, y0)`.
    TL,
    /// Top-right handle: moves `(x1, y0)`.
    TR,
    /// Bottom-left handle: moves `(x0, y1)`.
    BL,
    /// Bottom-right handle: moves `(x1, y1)`.
    BR,
}

impl InputMode {
    /// `true` for `Box` and the four corner modes.
    pub fn is_box(&self) -> bool {
        !matches!(self, Self::Point)
    }

    pub fn is_corner(&self) -> bool {
        matches!(self, Self::TL | Self::TR | Self::BL | Self::BR)
    }

    /// Whether the handle sits on the left edge. `None` for non-corner modes.
    pub(crate) fn is_left(&self) -> Option<bool> {
        match self {
            Self::TL | Self::BL => Some(true),
            Self::TR | Self::BR => Some(false),
            _ => None,
        }
    }

    /// Whether the handle sits on the top edge. `None` for non-corner modes.
    pub(crate) fn is_top(&self) -> Option<bool> {
        match self {
            Self::TL | Self::TR => Some(true),
            Self::BL | Self::BR => Some(false),
            _ => None,
        }
    }

    /// Mirror the handle across the vertical axis (left <-> right).
    pub fn flip_horizontal(self) -> Self {
        match self {
            Self::TL => Self::TR,
            Self::TR => Self::TL,
            Self::BL => Self::BR,
            Self::BR => Self::BL,
            other => other,
        }
    }

    /// Mirror the handle across the horizontal axis (top <-> bottom).
    pub fn flip_vertical(self) -> Self {
        match self {
            Self::TL => Self::BL,
            Self::BL => Self::TL,
            Self::TR => Self::BR,
            Self::BR => Self::TR,
            other => other,
        }
    }
}
