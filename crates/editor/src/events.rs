//! Editor notifications backed by a `tokio::sync::broadcast` channel.
//!
//! Every async editor operation publishes exactly one [`EditorEvent`]
//! describing how it ended. A UI layer subscribes and renders them.

use charpoints_core::types::EntityId;
use serde::Serialize;
use tokio::sync::broadcast;

use crate::error::EditError;

// ---------------------------------------------------------------------------
// EditorEvent
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EditorEvent {
    Initialized { image_id: EntityId },
    Saved { image_id: EntityId },
    Deleted { image_id: EntityId },
    Failed {
        /// Operation that failed, e.g. `"save"`.
        operation: String,
        image_id: Option<EntityId>,
        /// Stable machine-readable error code.
        code: String,
        message: String,
    },
}

impl EditorEvent {
    pub fn failed(operation: &str, image_id: Option<EntityId>, err: &EditError) -> Self {
        Self::Failed {
            operation: operation.to_string(),
            image_id,
            code: err.code().to_string(),
            message: err.to_string(),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

const DEFAULT_CAPACITY: usize = 256;

/// Fan-out bus shared via `Arc<EventBus>` by sessions and catalogs.
pub struct EventBus {
    sender: broadcast::Sender<EditorEvent>,
}

impl EventBus {
    /// Slow receivers past `capacity` observe `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn publish(&self, event: EditorEvent) {
        // A send error only means nobody is listening.
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EditorEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
