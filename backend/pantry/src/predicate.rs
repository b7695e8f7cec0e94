use rusqlite::types::Value;

/// A SQL condition over the `recipes` table together with its bound parameters.
///
/// Leaves are written with positional `?` placeholders; values are never spliced
/// into the SQL text.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    sql: String,
    params: Vec<Value>,
}

impl Predicate {
    pub fn new(sql: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }

    /// Matches every row.
    pub fn always() -> Self {
        Self::new("1 = 1", Vec::new())
    }

    /// AND-combines predicates. No predicates at all matches every row.
    pub fn all<I>(predicates: I) -> Self
    where
        I: IntoIterator<Item = Predicate>,
    {
        let mut clauses = Vec::new();
        let mut params = Vec::new();

        for predicate in predicates {
            clauses.push(format!("({})", predicate.sql));
            params.extend(predicate.params);
        }

        if clauses.is_empty() {
            return Self::always();
        }

        Self::new(clauses.join(" AND "), params)
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }
}
