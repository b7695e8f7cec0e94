//! # Pantry
//!
//! Shared recipe data layer used by both the loader (`process`) and the API (`server`).
//!
//! - [`recipe`]: persisted and to-be-persisted recipe shapes
//! - [`clean`]: ingestion-time cleaning rules for raw dataset records
//! - [`predicate`]: bound SQL conditions built by the query layer
//! - [`store`]: SQLite backed recipe table
//!
//!
//!
//! ## Calories
//!
//! Calorie values arrive as free text such as `"1,200 Cal"` or `"450 kcal"`. Both the loader
//! and the store's `clean_calories` SQL function go through [`clean::parse_calories`], so a value
//! cleaned at load time and a value cleaned at query time always agree.

pub mod clean;
pub mod error;
pub mod predicate;
pub mod recipe;
pub mod store;

pub use clean::{IngestError, clean_recipe, parse_calories, strip_non_numeric};
pub use error::StoreError;
pub use predicate::Predicate;
pub use recipe::{NewRecipe, Recipe};
pub use store::Store;
