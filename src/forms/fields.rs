use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Message for a missing required field
pub const REQUIRED: &str = "This field is required.";

/// Message for a value that cannot be read as a whole number
pub const INVALID_INTEGER: &str = "Enter a whole number.";

/// Message for a value that cannot be read as a number
pub const INVALID_NUMBER: &str = "Enter a number.";

/// Message for a value of an entirely wrong shape
pub const INVALID_VALUE: &str = "Enter a valid value.";

/// Message for a choice token outside the available set
pub fn invalid_choice(value: &str) -> String {
    format!(
        "Select a valid choice. {} is not one of the available choices.",
        value
    )
}

/// Message for a reference that does not name an available row
pub fn invalid_model_choice() -> String {
    "Select a valid choice. That choice is not one of the available choices.".to_string()
}

/// Message for a string exceeding its length cap
pub fn max_length_exceeded(limit: usize, length: usize) -> String {
    format!(
        "Ensure this value has at most {} characters (it has {}).",
        limit, length
    )
}

/// Message for a number below its minimum
pub fn min_value(limit: i64) -> String {
    format!("Ensure this value is greater than or equal to {}.", limit)
}

/// Message for a number above its maximum
pub fn max_value(limit: i64) -> String {
    format!("Ensure this value is less than or equal to {}.", limit)
}

/// Per-field validation messages for one form
///
/// Fields are kept sorted so that serialized error payloads are stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a message to a field's error list
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// Gets the messages recorded for a field, if any
    pub fn get(&self, field: &str) -> Option<&Vec<String>> {
        self.0.get(field)
    }

    /// Whether no messages have been recorded
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The number of fields with at least one message
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates over the fields with messages
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

/// Reads an optional whole number
///
/// Accepts JSON integers and decimal strings. Nulls, absent values, and
/// empty strings read as `None`. Fractional numbers are rejected rather
/// than truncated.
pub fn optional_int(value: Option<&Value>) -> Result<Option<i32>, String> {
    let value = match value {
        None | Some(Value::Null) => return Ok(None),
        Some(value) => value,
    };

    match value {
        Value::Number(number) => number
            .as_i64()
            .and_then(|wide| i32::try_from(wide).ok())
            .map(Some)
            .ok_or_else(|| INVALID_INTEGER.to_string()),
        Value::String(text) => {
            let text = text.trim();
            if text.is_empty() {
                return Ok(None);
            }
            text.parse::<i64>()
                .ok()
                .and_then(|wide| i32::try_from(wide).ok())
                .map(Some)
                .ok_or_else(|| INVALID_INTEGER.to_string())
        }
        _ => Err(INVALID_INTEGER.to_string()),
    }
}

/// Reads a required whole number
pub fn required_int(value: Option<&Value>) -> Result<i32, String> {
    optional_int(value)?.ok_or_else(|| REQUIRED.to_string())
}

/// Reads an optional number, integral or fractional
pub fn optional_float(value: Option<&Value>) -> Result<Option<f64>, String> {
    let value = match value {
        None | Some(Value::Null) => return Ok(None),
        Some(value) => value,
    };

    match value {
        Value::Number(number) => number
            .as_f64()
            .map(Some)
            .ok_or_else(|| INVALID_NUMBER.to_string()),
        Value::String(text) => {
            let text = text.trim();
            if text.is_empty() {
                return Ok(None);
            }
            text.parse::<f64>()
                .map(Some)
                .map_err(|_| INVALID_NUMBER.to_string())
        }
        _ => Err(INVALID_NUMBER.to_string()),
    }
}

/// Reads a required number, integral or fractional
pub fn required_float(value: Option<&Value>) -> Result<f64, String> {
    optional_float(value)?.ok_or_else(|| REQUIRED.to_string())
}

/// Reads an optional string, stripping surrounding whitespace
///
/// A stripped-empty string reads as `None`. Numbers are accepted and
/// stringified.
pub fn optional_string(value: Option<&Value>) -> Result<Option<String>, String> {
    let value = match value {
        None | Some(Value::Null) => return Ok(None),
        Some(value) => value,
    };

    match value {
        Value::String(text) => {
            let text = text.trim();
            if text.is_empty() {
                Ok(None)
            } else {
                Ok(Some(text.to_string()))
            }
        }
        Value::Number(number) => Ok(Some(number.to_string())),
        _ => Err(INVALID_VALUE.to_string()),
    }
}

/// Reads a required string, stripping surrounding whitespace
pub fn required_string(value: Option<&Value>) -> Result<String, String> {
    optional_string(value)?.ok_or_else(|| REQUIRED.to_string())
}

/// Reads a required boolean
///
/// Accepts JSON booleans, the strings "true"/"false" (any case), "1"/"0",
/// and the checkbox value "on".
pub fn required_bool(value: Option<&Value>) -> Result<bool, String> {
    let value = match value {
        None | Some(Value::Null) => return Err(REQUIRED.to_string()),
        Some(value) => value,
    };

    match value {
        Value::Bool(flag) => Ok(*flag),
        Value::Number(number) => match number.as_i64() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err(INVALID_VALUE.to_string()),
        },
        Value::String(text) => {
            let text = text.trim();
            if text.eq_ignore_ascii_case("true") || text == "1" || text.eq_ignore_ascii_case("on")
            {
                Ok(true)
            } else if text.eq_ignore_ascii_case("false") || text == "0" {
                Ok(false)
            } else {
                Err(INVALID_VALUE.to_string())
            }
        }
        _ => Err(INVALID_VALUE.to_string()),
    }
}

/// Reads an optional boolean, treating absence as false
pub fn optional_bool(value: Option<&Value>) -> Result<bool, String> {
    match value {
        None | Some(Value::Null) => Ok(false),
        Some(Value::String(text)) if text.trim().is_empty() => Ok(false),
        Some(_) => required_bool(value),
    }
}

/// Turns a value into a choice token for comparison against a choice set
///
/// Numbers keep their JSON rendering, so `4.0` stays "4.0" and `4` stays
/// "4"; choice sets are matched textually.
pub fn choice_token(value: Option<&Value>) -> Option<String> {
    match value {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) => {
            let text = text.trim();
            if text.is_empty() {
                None
            } else {
                Some(text.to_string())
            }
        }
        Some(Value::Number(number)) => Some(number.to_string()),
        Some(Value::Bool(flag)) => Some(flag.to_string()),
        Some(other) => Some(other.to_string()),
    }
}
