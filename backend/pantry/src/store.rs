//! # Recipe Store
//!
//! SQLite file holding the single `recipes` table.
//!
//! ## Schema
//! - Plain columns for text and numeric fields
//! - `nutrients` (**JSON text**): queried through the JSON1 `json_extract` function
//!
//! ## Connections
//! A [`Store`] is only a path. Every operation opens its own connection, which keeps the handle
//! `Clone + Send` so the API can hand it to blocking tasks.
//!
//! Each connection registers two SQL functions:
//! - `clean_calories(value)`: the SQL face of [`parse_calories`](crate::clean::parse_calories)
//! - `fold_case(text)`: Unicode lowercase, for case-insensitive matching beyond ASCII
use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use rusqlite::{
    Connection, Row, Transaction, functions::FunctionFlags, params, params_from_iter,
    types::ValueRef,
};
use serde_json::Value;
use tracing::info;

use crate::{
    clean::parse_calories,
    error::StoreError,
    predicate::Predicate,
    recipe::{NewRecipe, Recipe},
};

pub const CLEAN_CALORIES_FN: &str = "clean_calories";
pub const FOLD_CASE_FN: &str = "fold_case";

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS recipes (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        cuisine TEXT,
        title TEXT,
        rating REAL,
        prep_time INTEGER,
        cook_time INTEGER,
        total_time INTEGER,
        description TEXT,
        nutrients TEXT,
        serves TEXT
    );

    CREATE INDEX IF NOT EXISTS idx_recipes_rating ON recipes(rating);
    CREATE INDEX IF NOT EXISTS idx_recipes_cuisine ON recipes(cuisine);
"#;

const COLUMNS: &str =
    "id, cuisine, title, rating, prep_time, cook_time, total_time, description, nutrients, serves";

#[derive(Debug, Clone)]
pub struct Store {
    path: PathBuf,
}

impl Store {
    /// Opens the database at `path`, creating the file and table if needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let store = Self {
            path: path.as_ref().to_path_buf(),
        };

        store.connect()?.execute_batch(SCHEMA)?;

        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connect(&self) -> Result<Connection, StoreError> {
        let conn = Connection::open(&self.path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;

        conn.create_scalar_function(
            CLEAN_CALORIES_FN,
            1,
            FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
            |ctx| {
                let cleaned = match ctx.get_raw(0) {
                    ValueRef::Text(text) => std::str::from_utf8(text).ok().and_then(parse_calories),
                    ValueRef::Integer(number) => parse_calories(&number.to_string()),
                    ValueRef::Real(number) => parse_calories(&number.to_string()),
                    ValueRef::Null | ValueRef::Blob(_) => None,
                };

                Ok(cleaned)
            },
        )?;

        // LIKE and lower() only fold ASCII
        conn.create_scalar_function(
            FOLD_CASE_FN,
            1,
            FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
            |ctx| {
                let folded = match ctx.get_raw(0) {
                    ValueRef::Text(text) => std::str::from_utf8(text).ok().map(str::to_lowercase),
                    _ => None,
                };

                Ok(folded)
            },
        )?;

        Ok(conn)
    }

    /// Inserts all recipes in one transaction. Nothing is written if any insert fails.
    pub fn insert_batch(&self, recipes: &[NewRecipe]) -> Result<usize, StoreError> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;

        insert_rows(&tx, recipes)?;

        tx.commit()?;

        Ok(recipes.len())
    }

    /// Swaps every stored recipe for `recipes` in one transaction.
    ///
    /// The table is dropped and recreated, so ids start again from 1. On failure the previous
    /// recipes are kept.
    pub fn replace_all(&self, recipes: &[NewRecipe]) -> Result<usize, StoreError> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;

        tx.execute_batch("DROP TABLE IF EXISTS recipes;")?;
        tx.execute_batch(SCHEMA)?;
        insert_rows(&tx, recipes)?;

        tx.commit()?;

        info!("Recipes table replaced with {} recipes", recipes.len());
        Ok(recipes.len())
    }

    pub fn count(&self) -> Result<u64, StoreError> {
        let total: i64 = self
            .connect()?
            .query_row("SELECT COUNT(*) FROM recipes", [], |row| row.get(0))?;

        Ok(total as u64)
    }

    /// Rating descending with unrated recipes last, ties broken by id.
    ///
    /// An offset past what SQLite can address is past the end, so the page is empty.
    pub fn page(&self, offset: u64, limit: u64) -> Result<Vec<Recipe>, StoreError> {
        let Ok(offset) = i64::try_from(offset) else {
            return Ok(Vec::new());
        };
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        let conn = self.connect()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {COLUMNS} FROM recipes
             ORDER BY rating IS NULL, rating DESC, id ASC
             LIMIT ?1 OFFSET ?2"
        ))?;

        let rows = stmt.query_map(params![limit, offset], read_row)?;

        collect_rows(rows)
    }

    /// Every recipe matching `predicate`, ordered by id.
    pub fn find(&self, predicate: &Predicate) -> Result<Vec<Recipe>, StoreError> {
        let conn = self.connect()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {COLUMNS} FROM recipes WHERE {} ORDER BY id ASC",
            predicate.sql()
        ))?;

        let rows = stmt.query_map(params_from_iter(predicate.params()), read_row)?;

        collect_rows(rows)
    }
}

fn insert_rows(tx: &Transaction<'_>, recipes: &[NewRecipe]) -> Result<(), StoreError> {
    let mut stmt = tx.prepare(
        "INSERT INTO recipes (
            cuisine, title, rating, prep_time, cook_time, total_time,
            description, nutrients, serves
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
    )?;

    for recipe in recipes {
        let nutrients = recipe
            .nutrients
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        stmt.execute(params![
            recipe.cuisine,
            recipe.title,
            recipe.rating,
            recipe.prep_time,
            recipe.cook_time,
            recipe.total_time,
            recipe.description,
            nutrients,
            recipe.serves,
        ])?;
    }

    Ok(())
}

type RawRow = (Recipe, Option<String>);

fn read_row(row: &Row) -> rusqlite::Result<RawRow> {
    let recipe = Recipe {
        id: row.get(0)?,
        cuisine: row.get(1)?,
        title: row.get(2)?,
        rating: row.get(3)?,
        prep_time: row.get(4)?,
        cook_time: row.get(5)?,
        total_time: row.get(6)?,
        description: row.get(7)?,
        nutrients: None,
        serves: row.get(9)?,
    };

    Ok((recipe, row.get(8)?))
}

fn collect_rows<I>(rows: I) -> Result<Vec<Recipe>, StoreError>
where
    I: Iterator<Item = rusqlite::Result<RawRow>>,
{
    let mut recipes = Vec::new();

    for row in rows {
        let (mut recipe, nutrients) = row?;
        recipe.nutrients = nutrients
            .as_deref()
            .map(serde_json::from_str::<Value>)
            .transpose()?;

        recipes.push(recipe);
    }

    Ok(recipes)
}
