//! Request and response schema checks for the `/predictions` contract.

use serde::Serialize;
use serde_json::Value;

use crate::error::SentimentError;
use crate::types::{BackendFailure, BackendOutcome, BackendResult};

/// A validated classification request body: `{ "text": string }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassifierInput {
    pub text: String,
}

impl ClassifierInput {
    /// Validate an untyped JSON body.
    ///
    /// Only the type of `text` is checked; an empty string is accepted.
    ///
    /// # Errors
    ///
    /// Returns [`SentimentError::InvalidInput`] if the body is not an object,
    /// `text` is missing, or `text` is not a string.
    pub fn from_json(body: &Value) -> Result<Self, SentimentError> {
        let Some(object) = body.as_object() else {
            return Err(SentimentError::InvalidInput(format!(
                "request body must be a JSON object, got {}",
                json_type(body)
            )));
        };

        match object.get("text") {
            Some(Value::String(text)) => Ok(Self { text: text.clone() }),
            Some(other) => Err(SentimentError::InvalidInput(format!(
                "text should be of type string, got {}",
                json_type(other)
            ))),
            None => Err(SentimentError::InvalidInput(
                "missing required field `text`".to_string(),
            )),
        }
    }
}

/// Validate a `/predictions` response body.
///
/// Entries carrying an `error` field are parsed as backend failures; every
/// other entry must be a well-formed backend result: probabilities within
/// `[0, 1]`, at least one present, and a label that follows from them.
///
/// # Errors
///
/// Returns [`SentimentError::Schema`] naming the first offending entry.
pub fn validate_output(body: &Value) -> Result<Vec<BackendOutcome>, SentimentError> {
    let Some(entries) = body.as_array() else {
        return Err(SentimentError::Schema(format!(
            "response must be a JSON array, got {}",
            json_type(body)
        )));
    };

    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let outcome = if entry.get("error").is_some() {
                serde_json::from_value::<BackendFailure>(entry.clone()).map(BackendOutcome::Failed)
            } else {
                serde_json::from_value::<BackendResult>(entry.clone()).map(BackendOutcome::Scored)
            };
            outcome.map_err(|e| SentimentError::Schema(format!("entry {index}: {e}")))
        })
        .collect()
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
