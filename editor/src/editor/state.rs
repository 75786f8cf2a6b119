//! Reducer-style editor state.
//!
//! [`EditorState::apply`] is the only way to change a loaded draft. Structural
//! commands always recompute the available source fields, the compatible
//! forms and the form selection, so no caller can forget to.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::associations::AssociationList;
use crate::error::AssociationResult;
use crate::matcher::{available_source_fields, compatible_forms, configured_fields};
use crate::models::{
    ExportDefinitionPayload, ExporterTypeOption, FormOption, FormSnapshot, DEFAULT_EXPORTER,
};
use crate::sync::{FetchedResources, SiblingDefinition};

/// Shown in place of the form selector when no form is compatible.
pub const NO_COMPATIBLE_FORM_HINT: &str = "Please create an export definition.";

/// The editable aggregate.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDefinitionDraft {
    pub label: String,
    pub exporter_type: String,
    pub associations: AssociationList,
}

impl ExportDefinitionDraft {
    /// Body sent on save.
    pub fn to_payload(&self) -> ExportDefinitionPayload {
        ExportDefinitionPayload {
            label: self.label.clone(),
            exporter: self.exporter_type.clone(),
            definition: self.associations.to_definition(),
        }
    }
}

/// One user action on a loaded draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum EditorCommand {
    SetLabel { value: String },
    SetExporterType { value: String },
    SelectForm { id: String },
    AddAssociation,
    RemoveAssociation { index: usize },
    ReorderAssociation { from: usize, to: Option<usize> },
    SetSourceField { index: usize, value: String },
    SetTargetKey { index: usize, value: String },
}

impl EditorCommand {
    /// Whether the command can change which forms are compatible.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            EditorCommand::AddAssociation
                | EditorCommand::RemoveAssociation { .. }
                | EditorCommand::ReorderAssociation { .. }
                | EditorCommand::SetSourceField { .. }
        )
    }
}

/// A loaded draft together with everything derived from it.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorState {
    draft: ExportDefinitionDraft,
    forms: Arc<[FormSnapshot]>,
    exporter_types: Vec<ExporterTypeOption>,
    selected_form: Option<String>,
    available_fields: Vec<String>,
    compatible_forms: Vec<FormOption>,
}

impl EditorState {
    /// Build the initial state from freshly fetched resources.
    pub fn from_resources(resources: FetchedResources) -> Self {
        let FetchedResources {
            forms,
            definition,
            siblings,
        } = resources;

        let exporter_type = definition
            .exporter
            .clone()
            .filter(|e| !e.is_empty())
            .or_else(|| {
                siblings
                    .first()
                    .and_then(|s| s.exporter.clone())
                    .filter(|e| !e.is_empty())
            })
            .unwrap_or_else(|| DEFAULT_EXPORTER.to_string());

        let draft = ExportDefinitionDraft {
            label: definition.label.clone(),
            exporter_type,
            associations: AssociationList::from_definition(&definition.definition),
        };

        let selected_form = forms.first().map(|f| f.identity.clone());
        let mut state = Self {
            draft,
            forms: forms.into(),
            exporter_types: exporter_type_options(&siblings),
            selected_form,
            available_fields: Vec::new(),
            compatible_forms: Vec::new(),
        };
        state.recompute();
        state
    }

    /// Apply one command, returning the next state.
    pub fn apply(&self, command: EditorCommand) -> AssociationResult<Self> {
        let structural = command.is_structural();
        let mut next = self.clone();
        let associations = &self.draft.associations;

        match command {
            EditorCommand::SetLabel { value } => next.draft.label = value,
            EditorCommand::SetExporterType { value } => next.draft.exporter_type = value,
            EditorCommand::SelectForm { id } => {
                // Only listed forms can be selected.
                if self.compatible_forms.iter().any(|f| f.id == id) {
                    next.selected_form = Some(id);
                }
            }
            EditorCommand::AddAssociation => next.draft.associations = associations.append(),
            EditorCommand::RemoveAssociation { index } => {
                next.draft.associations = associations.remove_at(index)
            }
            EditorCommand::ReorderAssociation { from, to } => {
                next.draft.associations = associations.reorder(from, to)
            }
            EditorCommand::SetSourceField { index, value } => {
                next.draft.associations = associations.set_source_field(index, value)?
            }
            EditorCommand::SetTargetKey { index, value } => {
                next.draft.associations = associations.set_target_key(index, value)?
            }
        }

        if structural {
            next.recompute();
        }
        Ok(next)
    }

    /// Apply commands in order, stopping at the first failure.
    pub fn apply_all(
        &self,
        commands: impl IntoIterator<Item = EditorCommand>,
    ) -> AssociationResult<Self> {
        commands
            .into_iter()
            .try_fold(self.clone(), |state, command| state.apply(command))
    }

    fn recompute(&mut self) {
        let required = configured_fields(&self.draft.associations);
        self.available_fields = available_source_fields(&self.forms, &required);
        self.compatible_forms = compatible_forms(&self.forms, &required);

        let still_compatible = self
            .selected_form
            .as_ref()
            .is_some_and(|id| self.compatible_forms.iter().any(|f| &f.id == id));
        if !still_compatible {
            self.selected_form = self.compatible_forms.first().map(|f| f.id.clone());
        }
    }

    pub fn draft(&self) -> &ExportDefinitionDraft {
        &self.draft
    }

    pub fn associations(&self) -> &AssociationList {
        &self.draft.associations
    }

    /// Every fetched form, compatible or not.
    pub fn forms(&self) -> &[FormSnapshot] {
        &self.forms
    }

    pub fn exporter_types(&self) -> &[ExporterTypeOption] {
        &self.exporter_types
    }

    pub fn selected_form(&self) -> Option<&str> {
        self.selected_form.as_deref()
    }

    pub fn available_fields(&self) -> &[String] {
        &self.available_fields
    }

    pub fn compatible_forms(&self) -> &[FormOption] {
        &self.compatible_forms
    }

    /// Fallback message when no form matches the associations.
    pub fn form_selection_hint(&self) -> Option<&'static str> {
        self.compatible_forms.is_empty().then_some(NO_COMPATIBLE_FORM_HINT)
    }

    pub fn to_payload(&self) -> ExportDefinitionPayload {
        self.draft.to_payload()
    }
}

/// Exporter options from sibling definitions, deduplicated by value.
fn exporter_type_options(siblings: &[SiblingDefinition]) -> Vec<ExporterTypeOption> {
    let mut options: Vec<ExporterTypeOption> = Vec::new();
    for exporter in siblings.iter().filter_map(|s| s.exporter.as_deref()) {
        if !options.iter().any(|o| o.value == exporter) {
            options.push(ExporterTypeOption::new(exporter));
        }
    }

    if options.is_empty() {
        options.push(ExporterTypeOption::new(DEFAULT_EXPORTER));
    }
    options
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DefinitionMap, ExportDefinitionResource, FieldMapping};
    use serde_json::json;

    fn form(id: &str, fields: &[&str]) -> FormSnapshot {
        FormSnapshot {
            identity: id.to_string(),
            form_identifier: "contact".to_string(),
            hash: format!("{}0000000000000", id),
            processed_field_names: fields.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn sibling(exporter: &str) -> SiblingDefinition {
        SiblingDefinition {
            exporter: Some(exporter.to_string()),
            ..Default::default()
        }
    }

    fn resources(definition: ExportDefinitionResource) -> FetchedResources {
        FetchedResources {
            forms: vec![
                form("f1", &["name", "email", "phone"]),
                form("f2", &["name", "email"]),
                form("f3", &["title"]),
            ],
            definition,
            siblings: vec![sibling("csv"), sibling("xml"), sibling("csv")],
        }
    }

    fn compatible_ids(state: &EditorState) -> Vec<&str> {
        state.compatible_forms().iter().map(|f| f.id.as_str()).collect()
    }

    #[test]
    fn test_empty_definition_offers_every_form() {
        let state = EditorState::from_resources(resources(ExportDefinitionResource::default()));

        assert!(state.associations().is_empty());
        assert_eq!(compatible_ids(&state), vec!["f1", "f2", "f3"]);
        assert_eq!(state.available_fields(), ["name", "email", "phone", "title"]);
        assert_eq!(state.selected_form(), Some("f1"));
        assert_eq!(state.draft().exporter_type, "csv");
    }

    #[test]
    fn test_seeded_from_stored_definition() {
        let definition: DefinitionMap = [
            ("email", FieldMapping::new("E-Mail")),
            ("name", FieldMapping::new("Name")),
        ]
        .into_iter()
        .collect();
        let state = EditorState::from_resources(resources(ExportDefinitionResource {
            identity: Some("d1".into()),
            label: "Contacts".into(),
            exporter: Some("xml".into()),
            definition,
        }));

        let fields: Vec<_> = state.associations().iter().map(|a| a.source_field.as_str()).collect();
        assert_eq!(fields, vec!["email", "name"]);
        assert_eq!(state.draft().label, "Contacts");
        assert_eq!(state.draft().exporter_type, "xml");
        assert_eq!(compatible_ids(&state), vec!["f1", "f2"]);
        assert_eq!(state.available_fields(), ["name", "email", "phone"]);
    }

    #[test]
    fn test_exporter_type_fallbacks() {
        let state = EditorState::from_resources(FetchedResources {
            siblings: vec![sibling("xml"), sibling("csv"), sibling("xml")],
            ..Default::default()
        });
        assert_eq!(state.draft().exporter_type, "xml");
        let values: Vec<_> = state.exporter_types().iter().map(|o| o.value.as_str()).collect();
        assert_eq!(values, vec!["xml", "csv"]);

        let state = EditorState::from_resources(FetchedResources::default());
        assert_eq!(state.exporter_types(), [ExporterTypeOption::new("csv")]);
        assert_eq!(state.selected_form(), None);
        assert_eq!(state.form_selection_hint(), Some(NO_COMPATIBLE_FORM_HINT));
    }

    #[test]
    fn test_empty_sibling_exporter_falls_back_to_csv() {
        let state = EditorState::from_resources(FetchedResources {
            siblings: vec![SiblingDefinition {
                exporter: Some(String::new()),
                ..Default::default()
            }],
            ..Default::default()
        });
        assert_eq!(state.draft().exporter_type, "csv");
    }

    #[test]
    fn test_select_form_ignores_unlisted_ids() {
        let state = EditorState::from_resources(FetchedResources::default())
            .apply(EditorCommand::SelectForm { id: "nope".into() })
            .unwrap();
        assert_eq!(state.selected_form(), None);
        assert_eq!(state.form_selection_hint(), Some(NO_COMPATIBLE_FORM_HINT));

        let state = EditorState::from_resources(resources(ExportDefinitionResource::default()))
            .apply_all([
                EditorCommand::AddAssociation,
                EditorCommand::SetSourceField { index: 0, value: "email".into() },
                EditorCommand::SelectForm { id: "f3".into() },
            ])
            .unwrap();
        assert_eq!(state.selected_form(), Some("f1"));

        let state = state.apply(EditorCommand::SelectForm { id: "f2".into() }).unwrap();
        assert_eq!(state.selected_form(), Some("f2"));
    }

    #[test]
    fn test_structural_commands_recompute_compatibility() {
        let state = EditorState::from_resources(resources(ExportDefinitionResource::default()))
            .apply_all([
                EditorCommand::AddAssociation,
                EditorCommand::SetSourceField { index: 0, value: "phone".into() },
            ])
            .unwrap();
        assert_eq!(compatible_ids(&state), vec!["f1"]);

        let state = state.apply(EditorCommand::RemoveAssociation { index: 0 }).unwrap();
        assert_eq!(compatible_ids(&state), vec!["f1", "f2", "f3"]);
    }

    #[test]
    fn test_empty_compatible_set_is_a_state() {
        let state = EditorState::from_resources(resources(ExportDefinitionResource::default()))
            .apply_all([
                EditorCommand::AddAssociation,
                EditorCommand::SetSourceField { index: 0, value: "title".into() },
                EditorCommand::AddAssociation,
                EditorCommand::SetSourceField { index: 1, value: "name".into() },
            ])
            .unwrap();

        assert!(state.compatible_forms().is_empty());
        assert_eq!(state.selected_form(), None);
        assert_eq!(state.form_selection_hint(), Some(NO_COMPATIBLE_FORM_HINT));
    }

    #[test]
    fn test_selection_moves_off_incompatible_form() {
        let state = EditorState::from_resources(resources(ExportDefinitionResource::default()))
            .apply(EditorCommand::SelectForm { id: "f3".into() })
            .unwrap();
        assert_eq!(state.selected_form(), Some("f3"));

        let state = state
            .apply_all([
                EditorCommand::AddAssociation,
                EditorCommand::SetSourceField { index: 0, value: "email".into() },
            ])
            .unwrap();
        assert_eq!(state.selected_form(), Some("f1"));
    }

    #[test]
    fn test_target_key_does_not_touch_derived_views() {
        let state = EditorState::from_resources(resources(ExportDefinitionResource::default()))
            .apply(EditorCommand::AddAssociation)
            .unwrap();
        let renamed = state
            .apply(EditorCommand::SetTargetKey { index: 0, value: "Name".into() })
            .unwrap();

        assert_eq!(renamed.compatible_forms(), state.compatible_forms());
        assert_eq!(renamed.associations().get(0).unwrap().target_key, "Name");
    }

    #[test]
    fn test_invalid_index_leaves_state_untouched() {
        let state = EditorState::from_resources(resources(ExportDefinitionResource::default()));
        assert!(state
            .apply(EditorCommand::SetSourceField { index: 0, value: "x".into() })
            .is_err());
        assert!(state.associations().is_empty());
    }

    #[test]
    fn test_payload_serialization() {
        let state = EditorState::from_resources(resources(ExportDefinitionResource::default()))
            .apply_all([
                EditorCommand::SetLabel { value: "Export".into() },
                EditorCommand::AddAssociation,
                EditorCommand::SetSourceField { index: 0, value: "x".into() },
                EditorCommand::SetTargetKey { index: 0, value: "y".into() },
                EditorCommand::AddAssociation,
                EditorCommand::SetSourceField { index: 1, value: "z".into() },
                EditorCommand::SetTargetKey { index: 1, value: "w".into() },
            ])
            .unwrap();

        assert_eq!(
            serde_json::to_value(state.to_payload()).unwrap(),
            json!({
                "label": "Export",
                "exporter": "csv",
                "definition": {"x": {"changeKey": "y"}, "z": {"changeKey": "w"}}
            })
        );
    }

    #[test]
    fn test_command_script_format() {
        let commands: Vec<EditorCommand> = serde_json::from_str(
            r#"[{"action":"add_association"},
                {"action":"reorder_association","from":0,"to":null},
                {"action":"set_source_field","index":0,"value":"email"}]"#,
        )
        .unwrap();

        assert_eq!(commands[1], EditorCommand::ReorderAssociation { from: 0, to: None });
        assert!(commands.iter().all(EditorCommand::is_structural));
    }
}
