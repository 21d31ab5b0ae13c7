//! Interactive editing engine for image annotations.
//!
//! - [`DraftState`]: unsaved points, boxes and labels of one open image,
//!   plus pointer and drag bookkeeping.
//! - [`EditAction`] and [`DraftState::apply`]: the pure transition function
//!   turning pointer gestures and keyboard commands into the next draft.
//! - [`EditorSession`]: owns a draft and runs `init`, `save` and `delete`
//!   through the domain services.
//! - [`EventBus`]: broadcast channel on which outcomes are reported.
//! - [`ImageCatalog`]: image list backing image selection.

pub mod catalog;
pub mod draft;
pub mod error;
pub mod events;
pub mod mode;
pub mod session;
pub mod transition;

pub use catalog::ImageCatalog;
pub use draft::{DraftState, LocalId, Pos};
pub use error::EditError;
pub use events::{EditorEvent, EventBus};
pub use mode::InputMode;
pub use session::EditorSession;
pub use transition::EditAction;
