use crate::store::StoreError;
use crate::types::EntityId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: EntityId },

    #[error("Entity already exists: {entity} with id {id}")]
    AlreadyExists { entity: &'static str, id: EntityId },

    #[error("{entity}.{field} out of range [0, 1]: {value}")]
    OutOfRange {
        entity: &'static str,
        field: &'static str,
        value: f64,
    },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Storage failure: {0}")]
    Storage(#[from] StoreError),

    #[error("Timed out after {waited_ms}ms waiting for the mutation lock")]
    LockTimeout { waited_ms: u64 },
}

impl CoreError {
    /// Shorthand for a missing image, the most common lookup miss.
    pub fn image_not_found(id: EntityId) -> Self {
        Self::NotFound { entity: "image", id }
    }

    /// Short machine-readable code for the error kind.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::AlreadyExists { .. } => "ALREADY_EXISTS",
            Self::OutOfRange { .. } => "OUT_OF_RANGE",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Storage(_) => "STORAGE_FAILURE",
            Self::LockTimeout { .. } => "LOCK_TIMEOUT",
        }
    }
}
