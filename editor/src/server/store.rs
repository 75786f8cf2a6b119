//! In-memory storage behind the dev server.

use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

use crate::models::{DefinitionMap, ExportDefinitionPayload, ExportDefinitionResource, FormSnapshot};

/// A definition as kept by the dev server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredDefinition {
    #[serde(rename = "__identity")]
    pub identity: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub exporter: String,
    #[serde(default)]
    pub definition: DefinitionMap,
}

impl StoredDefinition {
    fn from_payload(identity: String, payload: ExportDefinitionPayload) -> Self {
        Self {
            identity,
            label: payload.label,
            exporter: payload.exporter,
            definition: payload.definition,
        }
    }
}

impl From<StoredDefinition> for ExportDefinitionResource {
    fn from(stored: StoredDefinition) -> Self {
        Self {
            identity: Some(stored.identity),
            label: stored.label,
            exporter: Some(stored.exporter),
            definition: stored.definition,
        }
    }
}

/// Forms and definitions served by the dev server.
///
/// The seed file has the same shape: `{ "forms": [...], "definitions": [...] }`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DevStore {
    #[serde(default)]
    pub forms: Vec<FormSnapshot>,
    #[serde(default)]
    pub definitions: Vec<StoredDefinition>,
}

impl DevStore {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_json(&content)?)
    }

    pub fn get(&self, id: &str) -> Option<&StoredDefinition> {
        self.definitions.iter().find(|d| d.identity == id)
    }

    /// Store a new definition under a fresh identifier.
    pub fn create(&mut self, payload: ExportDefinitionPayload) -> StoredDefinition {
        let stored = StoredDefinition::from_payload(Uuid::new_v4().to_string(), payload);
        self.definitions.push(stored.clone());
        stored
    }

    /// Replace an existing definition; `None` when `id` is unknown.
    pub fn update(
        &mut self,
        id: &str,
        payload: ExportDefinitionPayload,
    ) -> Option<StoredDefinition> {
        let slot = self.definitions.iter_mut().find(|d| d.identity == id)?;
        *slot = StoredDefinition::from_payload(id.to_string(), payload);
        Some(slot.clone())
    }
}
