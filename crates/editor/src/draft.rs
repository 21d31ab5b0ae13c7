//! Draft editing state: the unsaved annotations of one open image.
//!
//! Points and boxes are keyed by a locally generated [`LocalId`], decoupled
//! from the ids they are persisted under. Maps keep insertion order so
//! rendering and "first label" selection are stable.

use charpoints_core::bbox::BoundingBox;
use charpoints_core::image::{Image, ImageState, UpdateImage, DEFAULT_WEIGHT};
use charpoints_core::point::Point;
use charpoints_core::types::EntityId;
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;

use crate::error::EditError;
use crate::mode::InputMode;

/// Key of a point or box inside the draft.
pub type LocalId = uuid::Uuid;

/// Default display size of the canvas, in pixels.
pub const DEFAULT_SIZE: u32 = 512;

pub fn new_local_id() -> LocalId {
    uuid::Uuid::new_v4()
}

/// Pointer position in normalized image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Pos {
    pub x: f64,
    pub y: f64,
}

impl Pos {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl Default for Pos {
    fn default() -> Self {
        Self::new(0.5, 0.5)
    }
}

/// Snapshot of one editing session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DraftState {
    /// Image being edited; `None` until `init` succeeds.
    pub image_id: Option<EntityId>,
    pub image_state: ImageState,
    pub image_data: Option<String>,
    pub weight: f64,
    pub loss: Option<f64>,
    pub points: IndexMap<LocalId, Point>,
    pub boxes: IndexMap<LocalId, BoundingBox>,
    /// Model predictions, shown alongside the ground truth.
    pub predicted_boxes: IndexMap<LocalId, BoundingBox>,
    pub labels: IndexSet<String>,
    /// Label text being typed, committed by `AddLabel`.
    pub pending_label: String,
    /// Label attached to newly created boxes.
    pub current_label: Option<String>,
    pub mode: InputMode,
    pub dragging_id: Option<LocalId>,
    pub pos: Pos,
    pub size: u32,
}

impl Default for DraftState {
    fn default() -> Self {
        Self {
            image_id: None,
            image_state: ImageState::Todo,
            image_data: None,
            weight: DEFAULT_WEIGHT,
            loss: None,
            points: IndexMap::new(),
            boxes: IndexMap::new(),
            predicted_boxes: IndexMap::new(),
            labels: IndexSet::new(),
            pending_label: String::new(),
            current_label: None,
            mode: InputMode::default(),
            dragging_id: None,
            pos: Pos::default(),
            size: DEFAULT_SIZE,
        }
    }
}

/// Everything `save` sends to the services.
#[derive(Debug, Clone)]
pub struct SavePayload {
    pub image_id: EntityId,
    pub points: Vec<Point>,
    pub boxes: Vec<BoundingBox>,
    pub image: UpdateImage,
}

impl DraftState {
    /// Next state after loading an image and its annotations.
    ///
    /// Every loaded element gets a fresh local id. Box labels are merged into
    /// the known label set and the first known label becomes current.
    /// Display preferences (mode, size) and known labels carry over.
    pub fn loaded(&self, image: Image, boxes: Vec<BoundingBox>, points: Vec<Point>) -> Self {
        let mut labels = self.labels.clone();
        labels.extend(boxes.iter().filter_map(|b| b.label.clone()));
        let current_label = labels.first().cloned();

        Self {
            image_id: Some(image.id),
            image_state: image.state,
            image_data: image.data,
            weight: image.weight,
            loss: image.loss,
            points: points.into_iter().map(|p| (new_local_id(), p)).collect(),
            boxes: boxes.into_iter().map(|b| (new_local_id(), b)).collect(),
            predicted_boxes: IndexMap::new(),
            labels,
            pending_label: String::new(),
            current_label,
            dragging_id: None,
            ..self.clone()
        }
    }

    /// Next state after the current image was deleted: no image, no
    /// annotations. Labels and display preferences carry over.
    pub fn detached(&self) -> Self {
        Self {
            labels: self.labels.clone(),
            current_label: self.current_label.clone(),
            mode: self.mode,
            size: self.size,
            ..Self::default()
        }
    }

    /// Build the persistence payload for `save`.
    ///
    /// Boxes are normalized so that no crossed box is ever persisted; boxes
    /// with zero width or height (a click without a drag) are dropped.
    pub fn save_payload(&self) -> Result<SavePayload, EditError> {
        let image_id = self.image_id.ok_or(EditError::NoImageLoaded)?;

        let points = self
            .points
            .values()
            .map(|p| Point {
                image_id,
                ..p.clone()
            })
            .collect();

        let boxes = self
            .boxes
            .values()
            .map(|b| BoundingBox {
                image_id,
                ..b.normalized()
            })
            .filter(|b| {
                let keep = b.is_well_formed();
                if !keep {
                    tracing::debug!(box_id = %b.id, "Dropping zero-area box from save");
                }
                keep
            })
            .collect();

        let image = UpdateImage {
            id: image_id,
            state: self.image_state,
            data: self.image_data.clone(),
            name: None,
            weight: Some(self.weight),
        };

        Ok(SavePayload {
            image_id,
            points,
            boxes,
            image,
        })
    }
}
