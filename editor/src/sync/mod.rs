//! Persistence of export definitions.
//!
//! The editor depends on [`DefinitionSync`] only; [`HttpDefinitionSync`] is
//! the REST implementation.
//!
//! | Method | Path                                   | Use                  |
//! |--------|----------------------------------------|----------------------|
//! | GET    | `{formDataEndpoint}`                   | form snapshots       |
//! | GET    | `{exportDefinitionEndpoint}/{id}`      | target definition    |
//! | GET    | `{exportDefinitionEndpoint}`           | sibling definitions  |
//! | POST   | `{exportDefinitionEndpoint}`           | create               |
//! | PUT    | `{exportDefinitionEndpoint}/{id}`      | update               |

pub mod http;

use serde::{Deserialize, Serialize};

use crate::error::SyncResult;
use crate::models::{ExportDefinitionPayload, ExportDefinitionResource, FormSnapshot};

pub use http::HttpDefinitionSync;

/// Whether the session edits a stored definition or creates a new one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorMode {
    Create,
    Update(String),
}

impl EditorMode {
    pub fn from_identifier(identifier: Option<String>) -> Self {
        match identifier {
            Some(id) if !id.is_empty() => EditorMode::Update(id),
            _ => EditorMode::Create,
        }
    }

    pub fn identifier(&self) -> Option<&str> {
        match self {
            EditorMode::Create => None,
            EditorMode::Update(id) => Some(id),
        }
    }
}

/// Another stored definition; only its exporter matters to the editor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SiblingDefinition {
    #[serde(rename = "__identity", default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub exporter: Option<String>,
}

/// Everything one `load()` needs, fetched together.
#[derive(Debug, Clone, Default)]
pub struct FetchedResources {
    pub forms: Vec<FormSnapshot>,
    pub definition: ExportDefinitionResource,
    pub siblings: Vec<SiblingDefinition>,
}

/// Backend contract of the editor.
///
/// `fetch_all` must resolve all three resources or fail as a whole.
#[allow(async_fn_in_trait)]
pub trait DefinitionSync {
    async fn fetch_all(&self, mode: &EditorMode) -> SyncResult<FetchedResources>;

    /// Returns the identifier assigned by the backend, when it reports one.
    async fn create(&self, payload: &ExportDefinitionPayload) -> SyncResult<Option<String>>;

    async fn update(&self, id: &str, payload: &ExportDefinitionPayload) -> SyncResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_from_identifier() {
        assert_eq!(EditorMode::from_identifier(None), EditorMode::Create);
        assert_eq!(EditorMode::from_identifier(Some(String::new())), EditorMode::Create);
        assert_eq!(
            EditorMode::from_identifier(Some("abc".into())).identifier(),
            Some("abc")
        );
    }

    #[test]
    fn test_sibling_ignores_extra_fields() {
        let siblings: Vec<SiblingDefinition> = serde_json::from_str(
            r#"[{"__identity":"1","label":"A","exporter":"csv","definition":{"a":{"changeKey":"b"}}},{}]"#,
        )
        .unwrap();

        assert_eq!(siblings[0].exporter.as_deref(), Some("csv"));
        assert_eq!(siblings[1], SiblingDefinition::default());
    }
}
