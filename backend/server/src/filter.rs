//! # Filters
//!
//! Query strings such as `calories=<=400` or `cuisine=Italian` become a [`FilterSpec`].
//!
//! Grammar: `[operator]value`
//! - operator: one of `<`, `<=`, `>`, `>=`, `=`, `==`, `!=`; equality when left out
//! - value: a number when it is all digits, optionally with a single fractional part, text otherwise
//!
//! A leading run of `<>!=` that is not one of the operators above is not an error. The whole
//! raw string is then matched as text by equality.
use std::{str::FromStr, sync::LazyLock};

use regex::Regex;
use thiserror::Error;

static OPERATOR_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([<>!=]+)(.+)$").unwrap());
static NUMERIC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+(\.\d+)?$").unwrap());

/// The closed set of filterable fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Calories,
    Title,
    Cuisine,
    TotalTime,
    Rating,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::Calories,
        Field::Title,
        Field::Cuisine,
        Field::TotalTime,
        Field::Rating,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Field::Calories => "calories",
            Field::Title => "title",
            Field::Cuisine => "cuisine",
            Field::TotalTime => "total_time",
            Field::Rating => "rating",
        }
    }
}

#[derive(Error, Debug, PartialEq)]
#[error("Unknown filter field `{0}`")]
pub struct UnknownField(pub String);

impl FromStr for Field {
    type Err = UnknownField;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Field::ALL
            .into_iter()
            .find(|field| field.name() == name)
            .ok_or_else(|| UnknownField(name.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    Equal,
    NotEqual,
}

impl Operator {
    /// `==` is accepted as a spelling of `=`.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "<" => Some(Operator::Less),
            "<=" => Some(Operator::LessEqual),
            ">" => Some(Operator::Greater),
            ">=" => Some(Operator::GreaterEqual),
            "=" | "==" => Some(Operator::Equal),
            "!=" => Some(Operator::NotEqual),
            _ => None,
        }
    }

    pub fn sql(self) -> &'static str {
        match self {
            Operator::Less => "<",
            Operator::LessEqual => "<=",
            Operator::Greater => ">",
            Operator::GreaterEqual => ">=",
            Operator::Equal => "=",
            Operator::NotEqual => "!=",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Number(f64),
    Text(String),
}

impl FilterValue {
    fn from_token(token: &str) -> Self {
        if NUMERIC.is_match(token) {
            if let Ok(number) = token.parse() {
                return FilterValue::Number(number);
            }
        }

        FilterValue::Text(token.to_string())
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            FilterValue::Number(number) => Some(*number),
            FilterValue::Text(_) => None,
        }
    }
}

/// One parsed filter, alive for a single request.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSpec {
    pub field: Field,
    pub operator: Operator,
    pub value: FilterValue,
    /// The value exactly as written, used by the text fields.
    pub token: String,
}

/// Parses `raw` for `field`. Empty input means no filter.
pub fn parse_filter(field: Field, raw: &str) -> Option<FilterSpec> {
    if raw.is_empty() {
        return None;
    }

    let (operator, token) = match OPERATOR_PREFIX.captures(raw) {
        Some(captures) => {
            let (_, [operator, token]) = captures.extract();

            match Operator::from_token(operator) {
                Some(operator) => (operator, token),
                None => return Some(literal(field, raw)),
            }
        }
        None => (Operator::Equal, raw),
    };

    Some(FilterSpec {
        field,
        operator,
        value: FilterValue::from_token(token),
        token: token.to_string(),
    })
}

fn literal(field: Field, raw: &str) -> FilterSpec {
    FilterSpec {
        field,
        operator: Operator::Equal,
        value: FilterValue::Text(raw.to_string()),
        token: raw.to_string(),
    }
}
