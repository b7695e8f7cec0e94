//! # Recipe Loading
//!
//! One-shot batch that fills the recipe store from a JSON dataset.
//!
//! ## Steps
//! 1. Read the dataset and quote bare `NaN`/`Infinity` tokens so it parses as JSON.
//!
//! 2. Walk the records in file order. The top level may be an object keyed by record id or an
//!    array.
//!
//! 3. Clean every record with [`pantry::clean_recipe`]. A record missing one of `cuisine`,
//!    `title`, `description` or `serves` stops the run before anything is written, naming the
//!    record and the field.
//!
//! 4. Insert the whole batch in one transaction. With `--reset` the same transaction first drops
//!    what an earlier run loaded, so a failed run leaves the old recipes in place.
//!
//! ## Usage
//! ```sh
//! DATABASE_PATH=recipes.db cargo run -p process -- recipes.json --reset
//! ```
use std::{fs, path::Path};

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use pantry::{NewRecipe, Store, clean_recipe};
use serde_json::Value;
use tracing::info;

pub mod models;
pub mod utils;

use models::{Entry, entries};
use utils::quote_non_finite;

pub fn load_recipes(dataset: &Path, store: &Store, reset: bool) -> Result<usize> {
    let text = fs::read_to_string(dataset)
        .with_context(|| format!("Failed to read dataset {}", dataset.display()))?;

    let document: Value =
        serde_json::from_str(&quote_non_finite(&text)).context("Dataset is not valid JSON")?;

    let entries = entries(&document)?;
    info!("Read {} records from {}", entries.len(), dataset.display());

    let recipes = clean_entries(&entries)?;

    let inserted = if reset {
        store.replace_all(&recipes)?
    } else {
        store.insert_batch(&recipes)?
    };
    info!("Inserted {inserted} recipes");

    Ok(inserted)
}

fn clean_entries(entries: &[Entry<'_>]) -> Result<Vec<NewRecipe>> {
    let pb = ProgressBar::new(entries.len() as u64);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
        )?
        .progress_chars("=> "),
    );
    pb.set_message("Cleaning");

    let mut recipes = Vec::with_capacity(entries.len());

    for entry in entries {
        let recipe = clean_recipe(&entry.label, entry.raw)?;
        recipes.push(recipe);

        pb.inc(1);
    }

    pb.finish_with_message("Done");
    Ok(recipes)
}
