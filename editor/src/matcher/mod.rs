//! Form / definition compatibility.
//!
//! A form is compatible with a set of associations when every non-empty
//! source field of the set is one of the form's processed field names.
//! An empty requirement matches every form.

use std::collections::HashSet;

use crate::associations::AssociationList;
use crate::models::{FormOption, FormSnapshot};

/// Subset test: every non-empty `required` name is in `candidate`.
pub fn is_compatible<S: AsRef<str>>(candidate: &[String], required: &[S]) -> bool {
    required
        .iter()
        .map(AsRef::as_ref)
        .filter(|name| !name.is_empty())
        .all(|name| candidate.iter().any(|c| c == name))
}

/// Non-empty source fields of `list`, in list order.
pub fn configured_fields(list: &AssociationList) -> Vec<&str> {
    list.iter()
        .map(|a| a.source_field.as_str())
        .filter(|f| !f.is_empty())
        .collect()
}

/// Forms compatible with `required`, in fetch order.
pub fn compatible_forms<S: AsRef<str>>(forms: &[FormSnapshot], required: &[S]) -> Vec<FormOption> {
    forms
        .iter()
        .filter(|form| is_compatible(&form.processed_field_names, required))
        .map(FormOption::from)
        .collect()
}

/// Field names offered for new associations.
///
/// Union of the processed field names of every compatible form, deduplicated
/// in first-seen order.
pub fn available_source_fields<S: AsRef<str>>(
    forms: &[FormSnapshot],
    required: &[S],
) -> Vec<String> {
    let mut seen = HashSet::new();
    forms
        .iter()
        .filter(|form| is_compatible(&form.processed_field_names, required))
        .flat_map(|form| form.processed_field_names.iter())
        .filter(|name| seen.insert(name.as_str()))
        .cloned()
        .collect()
}
