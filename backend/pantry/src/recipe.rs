use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A stored recipe. Every column other than `id` may be null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: i64,
    pub cuisine: Option<String>,
    pub title: Option<String>,
    pub rating: Option<f64>,
    pub prep_time: Option<i64>,
    pub cook_time: Option<i64>,
    pub total_time: Option<i64>,
    pub description: Option<String>,
    pub nutrients: Option<Value>,
    pub serves: Option<String>,
}

/// A cleaned recipe waiting for the store to assign its id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewRecipe {
    pub cuisine: Option<String>,
    pub title: Option<String>,
    pub rating: Option<f64>,
    pub prep_time: Option<i64>,
    pub cook_time: Option<i64>,
    pub total_time: Option<i64>,
    pub description: Option<String>,
    pub nutrients: Option<Map<String, Value>>,
    pub serves: Option<String>,
}
