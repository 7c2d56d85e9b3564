use std::path::Path;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ArtifactError;

/// Reads a JSON artifact holding either one record object or an array of them.
///
/// Records are structurally trusted: a single record that fails to coerce
/// fails the whole load.
pub fn read_records<T: DeserializeOwned>(
    path: &Path,
    file: &'static str,
) -> Result<Vec<T>, ArtifactError> {
    let text = std::fs::read_to_string(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_records(&text, file)
}

pub fn parse_records<T: DeserializeOwned>(
    text: &str,
    file: &'static str,
) -> Result<Vec<T>, ArtifactError> {
    let doc: Value = serde_json::from_str(text).map_err(|e| ArtifactError::Malformed {
        file,
        detail: format!("invalid JSON: {e}"),
    })?;

    let items = match doc {
        Value::Object(_) => vec![doc],
        Value::Array(items) => items,
        other => {
            return Err(ArtifactError::Malformed {
                file,
                detail: format!(
                    "unexpected JSON structure: expected object or array, got {}",
                    kind(&other)
                ),
            })
        }
    };

    let mut out = Vec::with_capacity(items.len());
    for (idx, item) in items.into_iter().enumerate() {
        let record =
            serde_json::from_value::<T>(item.clone()).map_err(|e| ArtifactError::Malformed {
                file,
                detail: format!("record {idx} ({item}): {e}"),
            })?;
        out.push(record);
    }
    Ok(out)
}

fn kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
