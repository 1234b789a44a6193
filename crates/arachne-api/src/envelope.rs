//! Status envelope parsing.
//!
//! Every mutating request to the server answers with a positional JSON
//! array: `["OK", result...]`, `["REJECT", {parm: message}]`,
//! `["ERROR", message]`, or `["EXCEPTION", message, stacktrace]`. This
//! module turns that duck-typed convention into a tagged union so callers
//! match exhaustively instead of indexing into the array.

use serde_json::Value;
use std::collections::BTreeMap;

/// Result of a server operation, decoded from the positional status array.
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope {
    /// Operation succeeded; carries the remaining array elements.
    Ok(Vec<Value>),
    /// Operation rejected; parameter errors keyed by parameter name.
    Reject(BTreeMap<String, String>),
    /// Operation failed with a user-level error message.
    Error(String),
    /// Server-side exception, with the server's stack trace.
    Exception { message: String, stack: String },
}

/// Failure to decode a status array.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EnvelopeError {
    #[error("status response is not an array: {0}")]
    NotAnArray(Value),
    #[error("status array is empty")]
    Empty,
    #[error("status tag is not a string: {0}")]
    BadTag(Value),
    /// An unrecognized tag is a protocol error, not an `Error` variant.
    /// (The reference client silently relabeled unknown tags, and even
    /// EXCEPTION, as ERROR.)
    #[error("unknown status tag {0:?}")]
    UnknownTag(String),
    #[error("{tag} status is missing its {field}")]
    MissingField { tag: &'static str, field: &'static str },
}

impl Envelope {
    /// Decode a status array.
    pub fn parse(value: Value) -> Result<Self, EnvelopeError> {
        let Value::Array(items) = value else {
            return Err(EnvelopeError::NotAnArray(value));
        };
        let mut items = items.into_iter();
        let tag = match items.next() {
            Some(Value::String(tag)) => tag,
            Some(other) => return Err(EnvelopeError::BadTag(other)),
            None => return Err(EnvelopeError::Empty),
        };

        match tag.as_str() {
            "OK" => Ok(Envelope::Ok(items.collect())),
            "REJECT" => {
                let Some(Value::Object(map)) = items.next() else {
                    return Err(EnvelopeError::MissingField {
                        tag: "REJECT",
                        field: "parameter error map",
                    });
                };
                let errors = map
                    .into_iter()
                    .map(|(parm, msg)| (parm, stringify(msg)))
                    .collect();
                Ok(Envelope::Reject(errors))
            }
            "ERROR" => {
                let Some(message) = items.next() else {
                    return Err(EnvelopeError::MissingField {
                        tag: "ERROR",
                        field: "message",
                    });
                };
                Ok(Envelope::Error(stringify(message)))
            }
            "EXCEPTION" => {
                let Some(message) = items.next() else {
                    return Err(EnvelopeError::MissingField {
                        tag: "EXCEPTION",
                        field: "message",
                    });
                };
                let stack = items.next().map(stringify).unwrap_or_default();
                Ok(Envelope::Exception {
                    message: stringify(message),
                    stack,
                })
            }
            _ => Err(EnvelopeError::UnknownTag(tag)),
        }
    }

    /// Whether the operation succeeded.
    pub fn is_ok(&self) -> bool {
        matches!(self, Envelope::Ok(_))
    }

    /// Success payload, if any.
    pub fn result(&self) -> Option<&[Value]> {
        match self {
            Envelope::Ok(result) => Some(result),
            _ => None,
        }
    }

    /// Human-readable outcome, for one-line reporting.
    pub fn message(&self) -> String {
        match self {
            Envelope::Ok(_) => "Operation completed successfully.".to_string(),
            Envelope::Reject(errors) => {
                let mut parts: Vec<String> = errors
                    .iter()
                    .map(|(parm, msg)| format!("{parm}: {msg}"))
                    .collect();
                parts.sort();
                format!("Request rejected ({})", parts.join("; "))
            }
            Envelope::Error(message) => message.clone(),
            Envelope::Exception { message, .. } => format!("Server exception: {message}"),
        }
    }
}

/// String content of a value, without JSON quoting for plain strings.
fn stringify(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}
