//! Validation of snippet request bodies.
use serde_json::{json, Map, Value};

use crate::db::models::snippet::SnippetFields;
use crate::highlight;
use crate::server::errors::{ApiError, NON_FIELD_ERRORS};

/// Longest accepted title, in characters.
pub const TITLE_MAX_LENGTH: usize = 100;

/// Strings accepted as `true` by boolean fields.
const TRUE_VALUES: &[&str] = &[
    "t", "T", "y", "Y", "yes", "Yes", "YES", "true", "True", "TRUE", "on", "On", "ON", "1",
];
/// Strings accepted as `false` by boolean fields.
const FALSE_VALUES: &[&str] = &[
    "f", "F", "n", "N", "no", "No", "NO", "false", "False", "FALSE", "off", "Off", "OFF", "0",
];

/// Validated snippet input. Fields absent from the body are `None`.
///
/// Read-only fields (`id`, `url`, `highlight`, `owner`, `created`) are ignored if sent.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SnippetInput {
    /// New title.
    pub title: Option<String>,
    /// New source code.
    pub code: Option<String>,
    /// New line-number flag.
    pub linenos: Option<bool>,
    /// New language token.
    pub language: Option<String>,
    /// New style name.
    pub style: Option<String>,
}

impl SnippetInput {
    /// Parse and validate a request body.
    ///
    /// An empty body is treated as an empty object. When `partial` is false every
    /// required field (`code`) must be present.
    ///
    /// # Errors
    /// Errors with `Parse` if the body is not JSON, and with `Validation` carrying
    /// every failing field otherwise.
    pub fn parse(body: &[u8], partial: bool) -> Result<Self, ApiError> {
        let value = if body.iter().all(u8::is_ascii_whitespace) {
            Value::Object(Map::new())
        } else {
            serde_json::from_slice(body).map_err(|err| ApiError::Parse(err.to_string()))?
        };
        let Value::Object(data) = value else {
            let mut errors = Map::new();
            errors.insert(
                NON_FIELD_ERRORS.to_owned(),
                json!([format!(
                    "Invalid data. Expected a dictionary, but got {}.",
                    kind(&value)
                )]),
            );
            return Err(ApiError::Validation(errors));
        };
        Self::validate(&data, partial)
    }

    /// Validate the fields of a JSON object.
    fn validate(data: &Map<String, Value>, partial: bool) -> Result<Self, ApiError> {
        let mut errors = Map::new();
        let mut record = |name: &str, message: String| {
            errors.insert(name.to_owned(), json!([message]));
        };

        let title = char_field(data.get("title"), false, true, Some(TITLE_MAX_LENGTH), partial)
            .unwrap_or_else(|message| {
                record("title", message);
                None
            });
        let code = char_field(data.get("code"), true, false, None, partial).unwrap_or_else(
            |message| {
                record("code", message);
                None
            },
        );
        let linenos = boolean_field(data.get("linenos")).unwrap_or_else(|message| {
            record("linenos", message);
            None
        });
        let language =
            choice_field(data.get("language"), highlight::is_language).unwrap_or_else(|message| {
                record("language", message);
                None
            });
        let style = choice_field(data.get("style"), highlight::is_style).unwrap_or_else(|message| {
            record("style", message);
            None
        });

        if !errors.is_empty() {
            return Err(ApiError::Validation(errors));
        }
        Ok(Self {
            title,
            code,
            linenos,
            language,
            style,
        })
    }

    /// Overlay the supplied fields onto `fields`.
    #[must_use]
    pub fn apply(self, fields: SnippetFields) -> SnippetFields {
        SnippetFields {
            title: self.title.unwrap_or(fields.title),
            code: self.code.unwrap_or(fields.code),
            linenos: self.linenos.unwrap_or(fields.linenos),
            language: self.language.unwrap_or(fields.language),
            style: self.style.unwrap_or(fields.style),
        }
    }
}

/// Name of a JSON value's kind, as reported in validation messages.
const fn kind(value: &Value) -> &'static str {
    match *value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}

/// Validate a string field. Surrounding whitespace is trimmed; numbers are
/// accepted and converted to their decimal text.
fn char_field(
    value: Option<&Value>,
    required: bool,
    allow_blank: bool,
    max_length: Option<usize>,
    partial: bool,
) -> Result<Option<String>, String> {
    let text = match value {
        None if required && !partial => return Err("This field is required.".to_owned()),
        None => return Ok(None),
        Some(&Value::Null) => return Err("This field may not be null.".to_owned()),
        Some(&Value::String(ref text)) => text.trim().to_owned(),
        Some(&Value::Number(ref number)) => number.to_string(),
        Some(_) => return Err("Not a valid string.".to_owned()),
    };
    if text.is_empty() && !allow_blank {
        return Err("This field may not be blank.".to_owned());
    }
    if let Some(max) = max_length {
        if text.chars().count() > max {
            return Err(format!(
                "Ensure this field has no more than {max} characters."
            ));
        }
    }
    Ok(Some(text))
}

/// Validate a boolean field.
fn boolean_field(value: Option<&Value>) -> Result<Option<bool>, String> {
    let invalid = || "Must be a valid boolean.".to_owned();
    match value {
        None => Ok(None),
        Some(&Value::Null) => Err("This field may not be null.".to_owned()),
        Some(&Value::Bool(flag)) => Ok(Some(flag)),
        Some(&Value::Number(ref number)) => match number.as_f64() {
            Some(one) if (one - 1.0).abs() < f64::EPSILON => Ok(Some(true)),
            Some(zero) if zero == 0.0 => Ok(Some(false)),
            _ => Err(invalid()),
        },
        Some(&Value::String(ref text)) if TRUE_VALUES.contains(&text.as_str()) => Ok(Some(true)),
        Some(&Value::String(ref text)) if FALSE_VALUES.contains(&text.as_str()) => Ok(Some(false)),
        Some(_) => Err(invalid()),
    }
}

/// Validate a choice field against `is_valid`.
fn choice_field(
    value: Option<&Value>,
    is_valid: fn(&str) -> bool,
) -> Result<Option<String>, String> {
    let choice = match value {
        None => return Ok(None),
        Some(&Value::Null) => return Err("This field may not be null.".to_owned()),
        Some(&Value::String(ref text)) => text.clone(),
        Some(other) => other.to_string(),
    };
    if is_valid(&choice) {
        Ok(Some(choice))
    } else {
        Err(format!("\"{choice}\" is not a valid choice."))
    }
}
