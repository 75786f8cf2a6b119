//! Export form submissions through a stored definition.
//!
//! ```text
//! definition: { email: { changeKey: "E-Mail" }, name: { changeKey: "" } }
//! record:     { name: "Ada", email: "ada@example.org", age: 36 }
//!                    │
//!                    ▼
//! E-Mail,name
//! ada@example.org,Ada
//! ```
//!
//! Columns follow the definition order. Fields not in the definition are
//! dropped; fields missing from a record produce empty cells.

use serde_json::Value;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::error::{ExportError, ExportResult};
use crate::models::{DefinitionMap, ExportDefinitionPayload, DEFAULT_EXPORTER};

/// Column headers: each entry's target key, or the field name when unset.
pub fn column_headers(definition: &DefinitionMap) -> Vec<String> {
    definition
        .iter()
        .map(|(field, mapping)| {
            if mapping.change_key.is_empty() {
                field.to_string()
            } else {
                mapping.change_key.clone()
            }
        })
        .collect()
}

/// Write `records` as CSV through `definition`.
pub fn write_csv<W: Write>(
    writer: W,
    definition: &ExportDefinitionPayload,
    records: &[Value],
) -> ExportResult<usize> {
    if definition.exporter != DEFAULT_EXPORTER {
        return Err(ExportError::UnsupportedExporter(definition.exporter.clone()));
    }

    let mut csv_writer = csv::WriterBuilder::new().from_writer(writer);
    csv_writer.write_record(column_headers(&definition.definition))?;

    for (index, record) in records.iter().enumerate() {
        let fields = record.as_object().ok_or(ExportError::InvalidRecord(index))?;
        let row: Vec<String> = definition
            .definition
            .keys()
            .map(|field| fields.get(field).map(cell_value).unwrap_or_default())
            .collect();
        csv_writer.write_record(&row)?;
    }

    csv_writer.flush()?;
    Ok(records.len())
}

/// CSV text for `records`.
pub fn export_to_string(
    definition: &ExportDefinitionPayload,
    records: &[Value],
) -> ExportResult<String> {
    let mut buffer = Vec::new();
    write_csv(&mut buffer, definition, records)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// Write the CSV export to `path`, returning the number of rows.
pub fn export_to_path(
    path: &Path,
    definition: &ExportDefinitionPayload,
    records: &[Value],
) -> ExportResult<usize> {
    let file = File::create(path)?;
    write_csv(file, definition, records)
}

fn cell_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items.iter().map(cell_value).collect::<Vec<_>>().join(", "),
        Value::Object(_) => value.to_string(),
    }
}
