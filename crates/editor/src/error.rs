use charpoints_core::error::CoreError;

use crate::draft::LocalId;

/// Errors from editing operations.
///
/// Wraps [`CoreError`] for anything surfaced by the domain services and adds
/// draft-level failures.
#[derive(Debug, thiserror::Error)]
pub enum EditError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("No draft element with id {0}")]
    UnknownElement(LocalId),

    #[error("No image is loaded in the editor")]
    NoImageLoaded,

    #[error("Invalid edit: {0}")]
    Validation(String),
}

impl EditError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Core(core) => core.code(),
            Self::UnknownElement(_) => "UNKNOWN_ELEMENT",
            Self::NoImageLoaded => "NO_IMAGE_LOADED",
            Self::Validation(_) => "VALIDATION_ERROR",
        }
    }
}
