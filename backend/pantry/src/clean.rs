//! # Cleaning
//!
//! Rules applied to every raw dataset record before it is stored.
//!
//! - `rating`, `prep_time`, `cook_time`, `total_time`: non-finite tokens (`NaN`, `Infinity`)
//!   become null
//! - `nutrients`: kept only when it is an object whose `calories` is text. The text is reduced to
//!   digits and decimal points and parsed; an empty or unparseable result leaves `calories` null.
//!   Any other shape drops the whole `nutrients` object, not only `calories`.
//! - `cuisine`, `title`, `description`, `serves`: copied as is, but the key must exist
use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use crate::recipe::NewRecipe;

pub const CALORIES: &str = "calories";

static NON_NUMERIC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^0-9.]").unwrap());

#[derive(Error, Debug, PartialEq)]
pub enum IngestError {
    #[error("Record {record} is missing required field `{field}`")]
    MissingField { record: String, field: &'static str },

    #[error("Record {record} is not a JSON object")]
    NotAnObject { record: String },
}

/// Removes every character that is not an ASCII digit or a decimal point.
pub fn strip_non_numeric(input: &str) -> String {
    NON_NUMERIC.replace_all(input, "").into_owned()
}

/// Reduces free text such as `"1,200 Cal"` to a number.
///
/// Cleaning a value that is already clean gives the same number back.
pub fn parse_calories(input: &str) -> Option<f64> {
    let stripped = strip_non_numeric(input);

    if stripped.is_empty() {
        return None;
    }

    stripped.parse::<f64>().ok().filter(|value| value.is_finite())
}

/// Turns one raw dataset entry into a storable recipe.
///
/// `record` names the entry (its key or index in the dataset) for error reporting.
pub fn clean_recipe(record: &str, raw: &Value) -> Result<NewRecipe, IngestError> {
    let Some(fields) = raw.as_object() else {
        return Err(IngestError::NotAnObject {
            record: record.to_string(),
        });
    };

    Ok(NewRecipe {
        cuisine: required_text(record, fields, "cuisine")?,
        title: required_text(record, fields, "title")?,
        rating: clean_float(fields.get("rating")),
        prep_time: clean_minutes(fields.get("prep_time")),
        cook_time: clean_minutes(fields.get("cook_time")),
        total_time: clean_minutes(fields.get("total_time")),
        description: required_text(record, fields, "description")?,
        nutrients: clean_nutrients(record, fields.get("nutrients")),
        serves: required_text(record, fields, "serves")?,
    })
}

fn required_text(
    record: &str,
    fields: &Map<String, Value>,
    field: &'static str,
) -> Result<Option<String>, IngestError> {
    match fields.get(field) {
        None => Err(IngestError::MissingField {
            record: record.to_string(),
            field,
        }),
        Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(Some(text.clone())),
        Some(other) => Ok(Some(other.to_string())),
    }
}

fn clean_float(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(number) => number.as_f64(),
        // Bare NaN/Infinity tokens reach us quoted, see `process::utils::quote_non_finite`.
        Value::String(text) => match text.trim().parse::<f64>() {
            Ok(parsed) if parsed.is_finite() => Some(parsed),
            _ => {
                debug!("Dropping non-finite value {text:?}");
                None
            }
        },
        _ => None,
    }
}

fn clean_minutes(value: Option<&Value>) -> Option<i64> {
    if let Some(minutes) = value.and_then(Value::as_i64) {
        return Some(minutes);
    }

    clean_float(value).map(|minutes| minutes.round() as i64)
}

fn clean_nutrients(record: &str, value: Option<&Value>) -> Option<Map<String, Value>> {
    let Some(Value::Object(nutrients)) = value else {
        debug!("Record {record}: nutrients missing or not an object, dropping");
        return None;
    };

    let Some(Value::String(calories)) = nutrients.get(CALORIES) else {
        debug!("Record {record}: calories missing or not text, dropping nutrients");
        return None;
    };

    let cleaned = parse_calories(calories).map_or(Value::Null, Value::from);

    let mut nutrients = nutrients.clone();
    nutrients.insert(CALORIES.to_string(), cleaned);

    Some(nutrients)
}
