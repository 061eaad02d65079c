//! Error types

use crate::inject::RuleHandle;

/// Style compilation error
#[derive(Debug, thiserror::Error)]
pub enum StyleError {
    #[error("Variant key `{key}` combines `base` with other variants")]
    BaseInCompound { key: String },

    #[error("Style specification must be an object, got {what}")]
    NotAnObject { what: &'static str },

    #[error("Invalid style JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Injection target error
#[derive(Debug, thiserror::Error)]
pub enum InjectError {
    #[error("Rule for stylesheet {id} rejected: {reason}")]
    Rejected { id: String, reason: String },

    #[error("Unknown rule handle {0:?}")]
    Unknown(RuleHandle),
}

/// Short name of a JSON value's type, for error messages
pub(crate) fn json_type_name(value: &serde_json::Value) -> &'static str {
    use serde_json::Value;

    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
