//! Domain models shared by the editor, the sync layer and the exporter.
//!
//! - [`FormSnapshot`] - Field names extracted from one form version
//! - [`FormOption`] - Entry of the form selector
//! - [`ExporterTypeOption`] - Entry of the exporter type selector
//! - [`FieldMapping`] / [`DefinitionMap`] - Persisted `definition` object
//! - [`ExportDefinitionResource`] - `GET` shape of a stored definition
//! - [`ExportDefinitionPayload`] - `POST`/`PUT` body

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

/// Number of hash characters shown in a form label.
const FORM_HASH_PREFIX_LEN: usize = 10;

// =============================================================================
// Forms
// =============================================================================

/// Field names available in one version of a form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSnapshot {
    #[serde(rename = "__identity")]
    pub identity: String,
    pub form_identifier: String,
    #[serde(default)]
    pub hash: String,
    #[serde(default)]
    pub processed_field_names: Vec<String>,
}

impl FormSnapshot {
    /// Selector label: `<formIdentifier>-<first 10 chars of hash>`.
    pub fn label(&self) -> String {
        let prefix: String = self.hash.chars().take(FORM_HASH_PREFIX_LEN).collect();
        format!("{}-{}", self.form_identifier, prefix)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.processed_field_names.iter().any(|f| f == name)
    }
}

/// One selectable form in the compatible forms view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormOption {
    pub id: String,
    pub label: String,
}

impl From<&FormSnapshot> for FormOption {
    fn from(form: &FormSnapshot) -> Self {
        Self {
            id: form.identity.clone(),
            label: form.label(),
        }
    }
}

// =============================================================================
// Exporter types
// =============================================================================

/// Exporter used when neither the definition nor any sibling names one.
pub const DEFAULT_EXPORTER: &str = "csv";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExporterTypeOption {
    pub label: String,
    pub value: String,
}

impl ExporterTypeOption {
    pub fn new(exporter: &str) -> Self {
        Self {
            label: exporter.to_string(),
            value: exporter.to_string(),
        }
    }
}

// =============================================================================
// Persisted definition
// =============================================================================

/// Target key for one source field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldMapping {
    #[serde(rename = "changeKey", default, deserialize_with = "null_as_empty")]
    pub change_key: String,
}

impl FieldMapping {
    pub fn new(change_key: impl Into<String>) -> Self {
        Self {
            change_key: change_key.into(),
        }
    }
}

/// The `definition` object: source field name -> [`FieldMapping`].
///
/// Keeps document order. Inserting an existing key replaces its value in place,
/// so the key stays where it was first seen and the last value wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefinitionMap {
    entries: Vec<(String, FieldMapping)>,
    positions: HashMap<String, usize>,
}

impl DefinitionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, mapping: FieldMapping) {
        let field = field.into();
        match self.positions.get(&field) {
            Some(&position) => self.entries[position].1 = mapping,
            None => {
                self.positions.insert(field.clone(), self.entries.len());
                self.entries.push((field, mapping));
            }
        }
    }

    pub fn get(&self, field: &str) -> Option<&FieldMapping> {
        self.positions
            .get(field)
            .map(|&position| &self.entries[position].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldMapping)> {
        self.entries.iter().map(|(name, mapping)| (name.as_str(), mapping))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, FieldMapping)> for DefinitionMap {
    fn from_iter<I: IntoIterator<Item = (K, FieldMapping)>>(iter: I) -> Self {
        let mut map = DefinitionMap::new();
        for (field, mapping) in iter {
            map.insert(field, mapping);
        }
        map
    }
}

impl Serialize for DefinitionMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (field, mapping) in &self.entries {
            map.serialize_entry(field, mapping)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for DefinitionMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct DefinitionVisitor;

        impl<'de> Visitor<'de> for DefinitionVisitor {
            type Value = DefinitionMap;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object of field name to { changeKey }")
            }

            // Stored definitions of brand-new records come back as `[]` or `null`.
            fn visit_unit<E: serde::de::Error>(self) -> Result<Self::Value, E> {
                Ok(DefinitionMap::new())
            }

            fn visit_none<E: serde::de::Error>(self) -> Result<Self::Value, E> {
                Ok(DefinitionMap::new())
            }

            fn visit_seq<A: serde::de::SeqAccess<'de>>(
                self,
                mut seq: A,
            ) -> Result<Self::Value, A::Error> {
                if seq.next_element::<serde::de::IgnoredAny>()?.is_some() {
                    return Err(serde::de::Error::custom(
                        "definition must be an object, got a non-empty array",
                    ));
                }
                Ok(DefinitionMap::new())
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut map = DefinitionMap::new();
                while let Some((field, mapping)) = access.next_entry::<String, FieldMapping>()? {
                    map.insert(field, mapping);
                }
                Ok(map)
            }
        }

        deserializer.deserialize_any(DefinitionVisitor)
    }
}

/// A stored export definition as returned by `GET {endpoint}/{id}`.
///
/// Every field is optional on the wire; an empty body decodes to the default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportDefinitionResource {
    #[serde(rename = "__identity", default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub label: String,
    #[serde(default)]
    pub exporter: Option<String>,
    #[serde(default)]
    pub definition: DefinitionMap,
}

/// Body of a create or update request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportDefinitionPayload {
    pub label: String,
    pub exporter: String,
    pub definition: DefinitionMap,
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
