use std::{env, fmt::Display, path::PathBuf, str::FromStr};

use tracing::{info, warn};

/// Process-wide settings, read once at startup and handed to the router through [`AppState`].
///
/// [`AppState`]: crate::state::AppState
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_path: PathBuf,
    pub static_dir: PathBuf,
    pub allowed_origins: Vec<String>,
    pub max_page_limit: u64,
}

impl Config {
    pub fn load() -> Self {
        Self {
            port: try_load("RUST_PORT", "8000"),
            database_path: try_load("DATABASE_PATH", "recipes.db"),
            static_dir: try_load("STATIC_DIR", "static"),
            allowed_origins: split_origins(&try_load::<String>(
                "ALLOWED_ORIGINS",
                "*,http://localhost:8000,http://127.0.0.1:8000",
            )),
            max_page_limit: at_least_one("MAX_PAGE_LIMIT", try_load("MAX_PAGE_LIMIT", "100"))
                .map_err(|e| {
                    warn!("{e}");
                })
                .expect("Environment misconfigured!"),
        }
    }

    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.iter().any(|origin| origin == "*")
    }
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(String::from)
        .collect()
}

fn at_least_one(key: &str, value: u64) -> Result<u64, String> {
    if value < 1 {
        return Err(format!("Invalid {key} value: must be at least 1, got {value}"));
    }

    Ok(value)
}

fn var(key: &str) -> Result<String, ()> {
    env::var(key).map_err(|_| {
        warn!("Environment variable {key} not found, using default");
    })
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
        })
        .expect("Environment misconfigured!")
}
