use std::path::{Path, PathBuf};

use crate::error::AppError;
use crate::models::GrantRecord;

/// A worked example of the target record shape.
///
/// The top-level keys of the document are the record's field set; the values
/// show the service what each field should look like.
#[derive(Debug, Clone)]
pub struct Exemplar {
    pub path: Option<PathBuf>,
    pub name: String,
    document: serde_json::Map<String, serde_json::Value>,
}

impl Exemplar {
    /// Load an exemplar from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            AppError::ExemplarError(format!(
                "Failed to read exemplar file {}: {e}",
                path.display()
            ))
        })?;

        let value: serde_json::Value = serde_json::from_str(&text).map_err(|e| {
            AppError::ExemplarError(format!(
                "Invalid JSON in exemplar file {}: {e}",
                path.display()
            ))
        })?;

        let mut exemplar = Self::from_value(derive_exemplar_name(path), value)?;
        exemplar.path = Some(path.to_path_buf());
        Ok(exemplar)
    }

    /// Build an exemplar from an in-memory document. It must be a non-empty object.
    pub fn from_value(name: impl Into<String>, value: serde_json::Value) -> Result<Self, AppError> {
        let name = name.into();
        let document = match value {
            serde_json::Value::Object(map) if !map.is_empty() => map,
            serde_json::Value::Object(_) => {
                return Err(AppError::ExemplarError(format!(
                    "Exemplar {name} has no fields"
                )));
            }
            other => {
                return Err(AppError::ExemplarError(format!(
                    "Exemplar {name} must be a JSON object, got {}",
                    json_kind(&other)
                )));
            }
        };

        Ok(Self {
            path: None,
            name,
            document,
        })
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.document.keys().map(String::as_str)
    }

    /// Pretty-printed document, as embedded in extraction instructions.
    pub fn to_prompt_text(&self) -> String {
        serde_json::to_string_pretty(&self.document).unwrap_or_default()
    }

    /// The record produced when nothing could be extracted: every field `null`.
    pub fn empty_record(&self) -> GrantRecord {
        self.document
            .keys()
            .map(|k| (k.clone(), serde_json::Value::Null))
            .collect()
    }

    /// Fill every exemplar field missing from `record` with `null`.
    ///
    /// Returns the record and the number of fields that had to be filled.
    pub fn conform(&self, mut record: GrantRecord) -> (GrantRecord, usize) {
        let mut filled = 0;
        for key in self.document.keys() {
            if !record.contains_key(key) {
                record.insert(key.clone(), serde_json::Value::Null);
                filled += 1;
            }
        }
        (record, filled)
    }
}

/// Derive an exemplar name from a file path.
///
/// Example: `"schemas/grant_example.json"` → `"grant_example"`
pub fn derive_exemplar_name(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("exemplar")
        .to_string()
}

pub(crate) fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
