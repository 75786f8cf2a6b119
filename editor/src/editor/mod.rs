//! Export definition editor.
//!
//! - [`state`] - Pure reducer over a loaded draft and its derived views
//! - [`session`] - Load/save lifecycle against a [`crate::sync::DefinitionSync`]

pub mod session;
pub mod state;

pub use session::{EditorPhase, EditorSession};
pub use state::{EditorCommand, EditorState, ExportDefinitionDraft, NO_COMPATIBLE_FORM_HINT};
