//! Response Decoder: engine output bytes to a [`DecodedResult`].
//!
//! Classification is total over JSON objects. Keys are checked in priority
//! order `Error`, `Success` (text), `Success` (list of people), `Found`. A key
//! whose value has the wrong shape is skipped like a missing one, and an
//! object matching none of them decodes to `Unknown`.

use serde_json::{Map, Value};
use tracing::debug;

use crate::data_model::{DecodedResult, EngineOutcome, FoundEntry};
use crate::error::PipelineError;

const ERROR_KEY: &str = "Error";
const SUCCESS_KEY: &str = "Success";
const FOUND_KEY: &str = "Found";
const NAME_KEY: &str = "name";
const MAIN_IMAGE_KEY: &str = "main_image";

/// Decode captured engine output.
///
/// Fails with [`PipelineError::MalformedOutput`] when no JSON object can be
/// found in the output.
pub fn decode(outcome: &EngineOutcome) -> Result<DecodedResult, PipelineError> {
    let object = parse_object(&outcome.raw_output)?;
    let result = classify(object);
    debug!(kind = result.kind(), exit_succeeded = outcome.exit_succeeded, "Decoded engine output");
    Ok(result)
}

/// Locate the JSON object in the combined output.
///
/// The whole buffer is tried first. Diagnostics written around the payload
/// are tolerated by falling back to the last line that is a JSON object.
fn parse_object(raw: &[u8]) -> Result<Map<String, Value>, PipelineError> {
    let text = String::from_utf8_lossy(raw);
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(PipelineError::MalformedOutput("engine produced no output".to_string()));
    }

    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Object(map)) => return Ok(map),
        Ok(other) => {
            return Err(PipelineError::MalformedOutput(format!(
                "expected a JSON object, got {}",
                json_type(&other)
            )))
        }
        Err(_) => {}
    }

    trimmed
        .lines()
        .rev()
        .map(str::trim)
        .filter(|line| line.starts_with('{'))
        .find_map(|line| match serde_json::from_str::<Value>(line) {
            Ok(Value::Object(map)) => Some(map),
            _ => None,
        })
        .ok_or_else(|| {
            PipelineError::MalformedOutput(format!("no JSON object in output: {}", preview(trimmed)))
        })
}

fn classify(object: Map<String, Value>) -> DecodedResult {
    if let Some(message) = object.get(ERROR_KEY).and_then(non_empty_text) {
        return DecodedResult::Error { message };
    }

    match object.get(SUCCESS_KEY) {
        Some(Value::String(message)) if !message.is_empty() => {
            return DecodedResult::Success { message: message.clone() };
        }
        Some(Value::Array(items)) => {
            if let Some(entries) = found_entries(items) {
                return DecodedResult::FoundMany { entries };
            }
        }
        _ => {}
    }

    if let Some(found) = object.get(FOUND_KEY) {
        let name = match found {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        let image_path = object
            .get(MAIN_IMAGE_KEY)
            .and_then(Value::as_str)
            .map(final_component)
            .unwrap_or_default();
        return DecodedResult::Found(FoundEntry { name, image_path });
    }

    DecodedResult::Unknown { raw: Value::Object(object) }
}

/// Every item must be an object with a string `name` and an optional string
/// `main_image`. `None` on any mismatch.
fn found_entries(items: &[Value]) -> Option<Vec<FoundEntry>> {
    items
        .iter()
        .map(|item| {
            let obj = item.as_object()?;
            let name = obj.get(NAME_KEY)?.as_str()?.to_string();
            let image_path = match obj.get(MAIN_IMAGE_KEY) {
                None | Some(Value::Null) => String::new(),
                Some(Value::String(path)) => final_component(path),
                Some(_) => return None,
            };
            Some(FoundEntry { name, image_path })
        })
        .collect()
}

fn non_empty_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Array(a) if a.is_empty() => None,
        Value::Object(o) if o.is_empty() => None,
        other => Some(other.to_string()),
    }
}

/// Last path component, accepting either separator.
pub fn final_component(path: &str) -> String {
    path.rsplit(['/', '\\']).next().unwrap_or_default().to_string()
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn preview(text: &str) -> String {
    const MAX: usize = 120;
    match text.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
