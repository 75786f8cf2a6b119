//! # Formexport - Export definition editor
//!
//! An export definition maps the fields of dynamically-shaped forms onto the
//! columns of an export: an ordered list of *associations*, each pairing a
//! source field with a target key.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────┐ fetch_all ┌───────────────┐  apply  ┌───────────────┐
//! │ DefinitionSync │──────────▶│ EditorSession │────────▶│ EditorState   │
//! │ (REST / mock)  │◀──────────│ load / save   │         │ draft + views │
//! └────────────────┘ save      └───────────────┘         └───────┬───────┘
//!                                                                │ recompute
//!                                                     ┌──────────┴───────────┐
//!                                                     │ AssociationList      │
//!                                                     │ matcher (compatible) │
//!                                                     └──────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use formexport::{EditorCommand, EditorConfig, EditorMode, EditorSession, HttpDefinitionSync};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let sync = HttpDefinitionSync::new(EditorConfig::from_env()?);
//!     let mut session = EditorSession::open(sync, EditorMode::Create).await;
//!     session.dispatch(EditorCommand::AddAssociation)?;
//!     session.save().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types
//! - [`models`] - Forms, exporter options and persisted definition shapes
//! - [`associations`] - Ordered copy-on-write association list
//! - [`matcher`] - Form compatibility
//! - [`editor`] - Reducer state and load/save session
//! - [`sync`] - Backend contract and REST client
//! - [`export`] - CSV export through a definition
//! - [`config`] - Endpoint configuration
//! - [`logs`] - Activity log broadcast
//! - [`server`] - In-memory dev REST server

// Core modules
pub mod error;
pub mod models;

// Editing
pub mod associations;
pub mod editor;
pub mod matcher;

// Persistence
pub mod sync;

// Export
pub mod export;

// Ambient
pub mod config;
pub mod logs;

// HTTP dev server
pub mod server;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{
    AssociationError, ConfigError, EditorError, EditorResult, ExportError, SyncError, SyncResult,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    DefinitionMap, ExportDefinitionPayload, ExportDefinitionResource, ExporterTypeOption,
    FieldMapping, FormOption, FormSnapshot, DEFAULT_EXPORTER,
};

// =============================================================================
// Re-exports - Associations & matching
// =============================================================================

pub use associations::{Association, AssociationId, AssociationList};
pub use matcher::{available_source_fields, compatible_forms, configured_fields, is_compatible};

// =============================================================================
// Re-exports - Editor
// =============================================================================

pub use editor::{
    EditorCommand, EditorPhase, EditorSession, EditorState, ExportDefinitionDraft,
    NO_COMPATIBLE_FORM_HINT,
};

// =============================================================================
// Re-exports - Sync
// =============================================================================

pub use sync::{DefinitionSync, EditorMode, FetchedResources, HttpDefinitionSync, SiblingDefinition};

// =============================================================================
// Re-exports - Export & config
// =============================================================================

pub use config::EditorConfig;
pub use export::{column_headers, export_to_path, export_to_string, write_csv};
