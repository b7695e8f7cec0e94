//! # Recipe Queries
//!
//! Glue between request parameters and the store.
//!
//! ## Listing
//! Rating descending, unrated last, ties by id. The page is `(page - 1) * limit .. page * limit`
//! and comes back with the total row count.
//!
//! ## Searching
//! Every recognized, non-empty parameter becomes one filter and all filters must hold.
//! Unknown parameter names are skipped here, before anything reaches the compiler.
use pantry::{Recipe, Store};
use serde::{Deserialize, Serialize};
use tokio::task::spawn_blocking;
use tracing::debug;

use crate::{
    compile::compile_filters,
    error::AppError,
    filter::{Field, FilterSpec, parse_filter},
};

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 10;

#[derive(Debug, Deserialize)]
pub struct PageParams {
    #[serde(default = "default_page")]
    pub page: u64,

    #[serde(default = "default_limit")]
    pub limit: u64,
}

fn default_page() -> u64 {
    DEFAULT_PAGE
}

fn default_limit() -> u64 {
    DEFAULT_LIMIT
}

#[derive(Debug, Serialize)]
pub struct RecipePage {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub data: Vec<Recipe>,
}

#[derive(Debug, Serialize)]
pub struct SearchResults {
    pub data: Vec<Recipe>,
}

pub async fn list_recipes(
    store: Store,
    params: PageParams,
    max_limit: u64,
) -> Result<RecipePage, AppError> {
    let PageParams { page, limit } = params;

    if page < 1 || limit < 1 {
        return Err(AppError::InvalidPagination);
    }

    let limit = limit.min(max_limit);
    let offset = (page - 1).checked_mul(limit);

    let (total, data) = spawn_blocking(move || -> Result<_, AppError> {
        let data = match offset {
            Some(offset) => store.page(offset, limit)?,
            // a page no offset can reach lies past the last row
            None => Vec::new(),
        };

        Ok((store.count()?, data))
    })
    .await??;

    Ok(RecipePage {
        page,
        limit,
        total,
        data,
    })
}

/// Turns raw `(name, value)` query pairs into filters, in request order.
pub fn collect_filters<'a, I>(params: I) -> Vec<FilterSpec>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    params
        .into_iter()
        .filter_map(|(name, raw)| match name.parse::<Field>() {
            Ok(field) => parse_filter(field, raw),
            Err(e) => {
                debug!("Ignoring parameter: {e}");
                None
            }
        })
        .collect()
}

pub async fn search_recipes(store: Store, specs: Vec<FilterSpec>) -> Result<SearchResults, AppError> {
    let predicate = compile_filters(&specs)?;
    debug!("Searching with {} filter(s): {}", specs.len(), predicate.sql());

    let data = spawn_blocking(move || store.find(&predicate)).await??;

    Ok(SearchResults { data })
}
