//! Image entity, its workflow state, and the payloads the image service
//! accepts.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{new_id, EntityId, Timestamp};

/// Training weight given to a freshly created image.
pub const DEFAULT_WEIGHT: f64 = 1.0;

// ---------------------------------------------------------------------------
// ImageState
// ---------------------------------------------------------------------------

/// Annotation progress of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ImageState {
    #[default]
    Todo,
    Done,
}

impl ImageState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Todo => "Todo",
            Self::Done => "Done",
        }
    }

    pub fn from_str(s: &str) -> Result<Self, CoreError> {
        match s {
            "Todo" => Ok(Self::Todo),
            "Done" => Ok(Self::Done),
            _ => Err(CoreError::Validation(format!(
                "Invalid image state '{s}'. Must be one of: Todo, Done"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Image
// ---------------------------------------------------------------------------

/// One uploaded image; the owning root of its points and boxes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub id: EntityId,
    pub name: String,
    /// Base64 payload. `None` when the row was fetched without data.
    pub data: Option<String>,
    pub state: ImageState,
    pub weight: f64,
    pub box_count: i32,
    pub point_count: i32,
    /// Last training loss reported by the downstream pipeline.
    pub loss: Option<f64>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Image {
    /// Build a `Todo` record with default weight and zero counts.
    pub fn new(input: NewImage) -> Self {
        let now = chrono::Utc::now();
        Self {
            id: input.id.unwrap_or_else(new_id),
            name: input.name,
            data: input.data,
            state: ImageState::Todo,
            weight: DEFAULT_WEIGHT,
            box_count: 0,
            point_count: 0,
            loss: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply an update payload: state always, everything else only if given.
    pub fn apply(&mut self, input: &UpdateImage) {
        self.state = input.state;
        if let Some(data) = &input.data {
            self.data = Some(data.clone());
        }
        if let Some(name) = &input.name {
            self.name = name.clone();
        }
        if let Some(weight) = input.weight {
            self.weight = weight;
        }
        self.updated_at = chrono::Utc::now();
    }
}

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

/// Payload for creating an image. An explicit `id` must not already exist.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewImage {
    pub id: Option<EntityId>,
    pub name: String,
    pub data: Option<String>,
}

/// Payload for updating an image.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateImage {
    pub id: EntityId,
    pub state: ImageState,
    pub data: Option<String>,
    pub name: Option<String>,
    pub weight: Option<f64>,
}

impl UpdateImage {
    /// Update only the state, keeping every other field.
    pub fn state(id: EntityId, state: ImageState) -> Self {
        Self {
            id,
            state,
            data: None,
            name: None,
            weight: None,
        }
    }
}

/// Read-side filter; every `None` field matches everything.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageFilter {
    pub ids: Option<Vec<EntityId>>,
    pub state: Option<ImageState>,
    pub has_box: Option<bool>,
    pub has_point: Option<bool>,
}

impl ImageFilter {
    pub fn matches(&self, image: &Image) -> bool {
        if let Some(ids) = &self.ids {
            if !ids.contains(&image.id) {
                return false;
            }
        }
        if self.state.is_some_and(|s| s != image.state) {
            return false;
        }
        if self.has_box.is_some_and(|b| b != (image.box_count > 0)) {
            return false;
        }
        if self.has_point.is_some_and(|p| p != (image.point_count > 0)) {
            return false;
        }
        true
    }
}
