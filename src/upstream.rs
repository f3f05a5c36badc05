use serde::de::DeserializeOwned;
use serde_json::Value;
use std::error::Error;
use std::fmt;

/// Problems with payloads handed over by the AI collaborator.
#[derive(Debug)]
pub enum ReconcileError {
    /// The payload was not a JSON array (null, object, string, ...).
    NotAnArray { what: &'static str, found: &'static str },
    /// The payload was an array but one of its records could not be decoded.
    MalformedRecord {
        what: &'static str,
        index: usize,
        source: serde_json::Error,
    },
}

impl fmt::Display for ReconcileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReconcileError::NotAnArray { what, found } => {
                write!(f, "Malformed upstream {}: expected an array, got {}", what, found)
            }
            ReconcileError::MalformedRecord { what, index, source } => {
                write!(f, "Malformed upstream {} record at index {}: {}", what, index, source)
            }
        }
    }
}

impl Error for ReconcileError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ReconcileError::MalformedRecord { source, .. } => Some(source),
            _ => None,
        }
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Decodes an upstream JSON array into typed records. Any record that fails to
/// decode rejects the whole payload.
pub fn parse_upstream_array<T: DeserializeOwned>(
    payload: &Value,
    what: &'static str,
) -> Result<Vec<T>, ReconcileError> {
    let records = payload.as_array().ok_or(ReconcileError::NotAnArray {
        what,
        found: kind_of(payload),
    })?;

    records
        .iter()
        .enumerate()
        .map(|(index, record)| {
            T::deserialize(record).map_err(|source| ReconcileError::MalformedRecord {
                what,
                index,
                source,
            })
        })
        .collect()
}
