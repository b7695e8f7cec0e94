//! # Compiling Filters
//!
//! Each [`Field`] has exactly one compilation strategy, listed in [`strategy`]:
//!
//! | field        | condition                                            | operator |
//! |--------------|------------------------------------------------------|----------|
//! | `title`      | case-insensitive substring                           | ignored  |
//! | `cuisine`    | exact equality                                       | ignored  |
//! | `total_time` | numeric comparison on the column                     | used     |
//! | `rating`     | numeric comparison on the column                     | used     |
//! | `calories`   | numeric comparison on cleaned `nutrients.calories`   | used     |
//!
//! Calories are cleaned again at query time by the store's `clean_calories` function, so rows
//! written before the loader cleaned them still compare correctly. Titles are folded by the
//! store's `fold_case` function on both sides, which covers non-ASCII letters.
use pantry::{
    Predicate,
    clean::CALORIES,
    store::{CLEAN_CALORIES_FN, FOLD_CASE_FN},
};
use rusqlite::types::Value;

use crate::{
    error::AppError,
    filter::{Field, FilterSpec},
};

type Strategy = fn(&FilterSpec) -> Result<Predicate, AppError>;

fn strategy(field: Field) -> Strategy {
    match field {
        Field::Title => title_contains,
        Field::Cuisine => cuisine_equals,
        Field::TotalTime => total_time,
        Field::Rating => rating,
        Field::Calories => calories,
    }
}

pub fn compile_filter(spec: &FilterSpec) -> Result<Predicate, AppError> {
    strategy(spec.field)(spec)
}

/// AND of every filter. No filters matches every recipe.
pub fn compile_filters(specs: &[FilterSpec]) -> Result<Predicate, AppError> {
    let predicates = specs
        .iter()
        .map(compile_filter)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Predicate::all(predicates))
}

fn title_contains(spec: &FilterSpec) -> Result<Predicate, AppError> {
    Ok(Predicate::new(
        format!("instr({FOLD_CASE_FN}(title), {FOLD_CASE_FN}(?)) > 0"),
        vec![Value::Text(spec.token.clone())],
    ))
}

fn cuisine_equals(spec: &FilterSpec) -> Result<Predicate, AppError> {
    Ok(Predicate::new(
        "cuisine = ?",
        vec![Value::Text(spec.token.clone())],
    ))
}

fn total_time(spec: &FilterSpec) -> Result<Predicate, AppError> {
    compare("total_time", spec)
}

fn rating(spec: &FilterSpec) -> Result<Predicate, AppError> {
    compare("rating", spec)
}

fn calories(spec: &FilterSpec) -> Result<Predicate, AppError> {
    compare(
        &format!("{CLEAN_CALORIES_FN}(json_extract(nutrients, '$.{CALORIES}'))"),
        spec,
    )
}

fn compare(expression: &str, spec: &FilterSpec) -> Result<Predicate, AppError> {
    let number = spec
        .value
        .as_number()
        .ok_or_else(|| AppError::TypeMismatch {
            field: spec.field.name(),
            value: spec.token.clone(),
        })?;

    Ok(Predicate::new(
        format!("{expression} {} ?", spec.operator.sql()),
        vec![Value::Real(number)],
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::parse_filter;

    fn compile(field: Field, raw: &str) -> Result<Predicate, AppError> {
        compile_filter(&parse_filter(field, raw).unwrap())
    }

    #[test]
    fn test_title_ignores_operator() {
        for raw in ["pasta", ">pasta", "!=pasta"] {
            let predicate = compile(Field::Title, raw).unwrap();
            assert_eq!(
                predicate.sql(),
                "instr(fold_case(title), fold_case(?)) > 0"
            );
            assert_eq!(predicate.params(), &[Value::Text("pasta".to_string())]);
        }
    }

    #[test]
    fn test_title_wildcards_are_literal() {
        let predicate = compile(Field::Title, "100%_a\\b").unwrap();
        assert_eq!(
            predicate.params(),
            &[Value::Text("100%_a\\b".to_string())]
        );
    }

    #[test]
    fn test_cuisine_ignores_operator() {
        for raw in ["Italian", "!=Italian", "<Italian"] {
            let predicate = compile(Field::Cuisine, raw).unwrap();
            assert_eq!(predicate.sql(), "cuisine = ?");
            assert_eq!(predicate.params(), &[Value::Text("Italian".to_string())]);
        }
    }

    #[test]
    fn test_numeric_columns() {
        let predicate = compile(Field::Rating, ">4.5").unwrap();
        assert_eq!(predicate.sql(), "rating > ?");
        assert_eq!(predicate.params(), &[Value::Real(4.5)]);

        let predicate = compile(Field::TotalTime, "!=30").unwrap();
        assert_eq!(predicate.sql(), "total_time != ?");
        assert_eq!(predicate.params(), &[Value::Real(30.0)]);
    }

    #[test]
    fn test_calories_cleaned_in_query() {
        let predicate = compile(Field::Calories, "<=400").unwrap();
        assert_eq!(
            predicate.sql(),
            "clean_calories(json_extract(nutrients, '$.calories')) <= ?"
        );
        assert_eq!(predicate.params(), &[Value::Real(400.0)]);
    }

    #[test]
    fn test_type_mismatch() {
        for field in [Field::Rating, Field::TotalTime, Field::Calories] {
            match compile(field, ">lots") {
                Err(AppError::TypeMismatch { field: name, value }) => {
                    assert_eq!(name, field.name());
                    assert_eq!(value, "lots");
                }
                other => panic!("expected type mismatch, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_combined() {
        let specs = [
            parse_filter(Field::Cuisine, "Italian").unwrap(),
            parse_filter(Field::Rating, ">4.5").unwrap(),
        ];

        let predicate = compile_filters(&specs).unwrap();

        assert_eq!(predicate.sql(), "(cuisine = ?) AND (rating > ?)");
        assert_eq!(compile_filters(&[]).unwrap(), Predicate::always());
    }
}
