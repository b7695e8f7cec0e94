//! # Recipe API
//!
//! Read-only HTTP API over the recipe store filled by `process`.
//!
//!
//!
//! ## Routes
//! - `GET /`: liveness message
//! - `GET /api/recipes?page=1&limit=10`: `{page, limit, total, data}`, best rated first
//! - `GET /api/recipes/search?calories=<=400&cuisine=Italian`: `{data}`, every filter must match
//! - `/static/*`: files from `STATIC_DIR`
//!
//!
//!
//! ## Filters
//! Each search parameter is `[operator]value`, see [`filter`]. How each field turns into SQL is
//! decided in one table in [`compile`].
//!
//! - `title`: substring, any case
//! - `cuisine`: exact match
//! - `total_time`, `rating`, `calories`: numeric comparison, a non-numeric value is a 400
//!
//!
//!
//! ## Environment
//!
//! | variable          | default                                         |
//! |-------------------|-------------------------------------------------|
//! | `RUST_PORT`       | `8000`                                          |
//! | `DATABASE_PATH`   | `recipes.db`                                    |
//! | `STATIC_DIR`      | `static`                                        |
//! | `ALLOWED_ORIGINS` | `*,http://localhost:8000,http://127.0.0.1:8000` |
//! | `MAX_PAGE_LIMIT`  | `100`                                           |
//!
//! Logging follows `RUST_LOG`.
//! ```sh
//! RUST_LOG=server=debug cargo run -p server
//! ```
use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    http::{HeaderValue, Method, header::CONTENT_TYPE},
    routing::get,
};

use signal::{
    ctrl_c,
    unix::{SignalKind, signal},
};
use tokio::{net::TcpListener, signal};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    services::ServeDir,
};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

pub mod compile;
pub mod config;
pub mod error;
pub mod filter;
pub mod routes;
pub mod search;
pub mod state;

use config::Config;
use routes::{recipes_handler, root_handler, search_handler};
use state::AppState;

pub async fn start_server() -> anyhow::Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Loading config...");
    let config = Config::load();

    info!("Opening store at {}", config.database_path.display());
    let state = AppState::new(config)?;

    info!("Starting server...");
    let app = app(state.clone());

    let address = format!("0.0.0.0:{}", state.config.port);
    info!("Binding to {address}");

    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

pub fn app(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config);
    let assets = ServeDir::new(&state.config.static_dir);

    Router::new()
        .route("/", get(root_handler))
        .route("/api/recipes", get(recipes_handler))
        .route("/api/recipes/search", get(search_handler))
        .nest_service("/static", assets)
        .layer(cors)
        .with_state(state)
}

fn cors_layer(config: &Config) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .max_age(Duration::from_secs(60 * 60));

    // browsers refuse credentials alongside a wildcard origin
    if config.allows_any_origin() {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| {
            origin
                .parse()
                .map_err(|e| warn!("Skipping invalid origin {origin}: {e}"))
                .ok()
        })
        .collect();

    cors.allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }

        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
            }
            Err(e) => {
                warn!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }

        info!("Received terminate signal, shutting down");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode, header::ORIGIN},
        response::Response,
    };
    use pantry::{NewRecipe, clean_recipe};
    use serde_json::{Value, json};
    use tempfile::TempDir;
    use tower::ServiceExt;

    use super::*;

    fn test_config(dir: &TempDir, origins: &[&str]) -> Config {
        Config {
            port: 0,
            database_path: dir.path().join("recipes.db"),
            static_dir: dir.path().join("static"),
            allowed_origins: origins.iter().map(|o| o.to_string()).collect(),
            max_page_limit: 100,
        }
    }

    fn seeded_app(dir: &TempDir, recipes: &[NewRecipe]) -> Router {
        let state = AppState::new(test_config(dir, &["*"])).unwrap();
        state.store.insert_batch(recipes).unwrap();
        app(state)
    }

    fn recipe(cuisine: &str, title: &str, rating: f64) -> NewRecipe {
        NewRecipe {
            cuisine: Some(cuisine.to_string()),
            title: Some(title.to_string()),
            rating: Some(rating),
            ..Default::default()
        }
    }

    async fn get(app: Router, uri: &str) -> Response {
        app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_root() {
        let dir = TempDir::new().unwrap();
        let response = get(seeded_app(&dir, &[]), "/").await;

        assert_eq!(response.status(), StatusCode::OK);
        assert!(json_body(response).await["message"].is_string());
    }

    #[tokio::test]
    async fn test_list_defaults() {
        let dir = TempDir::new().unwrap();
        let recipes: Vec<_> = (0..12)
            .map(|i| recipe("Italian", &format!("dish {i}"), i as f64 / 3.0))
            .collect();

        let response = get(seeded_app(&dir, &recipes), "/api/recipes").await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        assert_eq!(body["page"], 1);
        assert_eq!(body["limit"], 10);
        assert_eq!(body["total"], 12);
        assert_eq!(body["data"].as_array().unwrap().len(), 10);
        assert_eq!(body["data"][0]["title"], "dish 11");
    }

    #[tokio::test]
    async fn test_list_rejects_bad_paging() {
        let dir = TempDir::new().unwrap();
        let app = seeded_app(&dir, &[]);

        for uri in [
            "/api/recipes?page=0",
            "/api/recipes?limit=0",
            "/api/recipes?page=abc",
        ] {
            let response = get(app.clone(), uri).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_search_combined() {
        let dir = TempDir::new().unwrap();
        let app = seeded_app(
            &dir,
            &[
                recipe("Italian", "Risotto", 4.8),
                recipe("Italian", "Pizza", 4.2),
                recipe("Thai", "Curry", 4.9),
            ],
        );

        let response = get(app, "/api/recipes/search?cuisine=Italian&rating=%3E4.5&unknown=1").await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = json_body(response).await;
        let data = body["data"].as_array().unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data[0]["title"], "Risotto");
    }

    #[tokio::test]
    async fn test_search_empty_params_ignored() {
        let dir = TempDir::new().unwrap();
        let app = seeded_app(
            &dir,
            &[recipe("Italian", "Risotto", 4.8), recipe("Thai", "Curry", 4.9)],
        );

        let response = get(app, "/api/recipes/search?title=&calories=").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["data"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_search_title_any_case() {
        let dir = TempDir::new().unwrap();
        let app = seeded_app(
            &dir,
            &[
                recipe("French", "Crème Brûlée", 4.7),
                recipe("French", "ÉCLAIR", 4.1),
            ],
        );

        // CRÈME
        let response = get(app.clone(), "/api/recipes/search?title=CR%C3%88ME").await;
        let body = json_body(response).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
        assert_eq!(body["data"][0]["title"], "Crème Brûlée");

        // éclair
        let response = get(app, "/api/recipes/search?title=%C3%A9clair").await;
        let body = json_body(response).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
        assert_eq!(body["data"][0]["title"], "ÉCLAIR");
    }

    #[tokio::test]
    async fn test_search_type_mismatch() {
        let dir = TempDir::new().unwrap();
        let response = get(seeded_app(&dir, &[]), "/api/recipes/search?total_time=%3Cquick").await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let detail = json_body(response).await["detail"].as_str().unwrap().to_string();
        assert!(detail.contains("total_time"), "{detail}");
    }

    #[tokio::test]
    async fn test_cleaned_calories_round_trip() {
        let raw = json!({
            "cuisine": "American",
            "title": "Burger",
            "rating": 4.0,
            "description": "Big",
            "serves": "1",
            "nutrients": { "calories": "1,200 Cal" }
        });
        let dir = TempDir::new().unwrap();
        let app = seeded_app(&dir, &[clean_recipe("0", &raw).unwrap()]);

        let matched = get(app.clone(), "/api/recipes/search?calories=%3C%3D1200").await;
        let body = json_body(matched).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
        assert_eq!(body["data"][0]["nutrients"]["calories"], 1200.0);

        let missed = get(app, "/api/recipes/search?calories=%3C1200").await;
        assert!(json_body(missed).await["data"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cors_any_origin() {
        let dir = TempDir::new().unwrap();
        let request = Request::builder()
            .uri("/api/recipes")
            .header(ORIGIN, "http://example.com")
            .body(Body::empty())
            .unwrap();

        let response = seeded_app(&dir, &[]).oneshot(request).await.unwrap();

        assert_eq!(
            response.headers()["access-control-allow-origin"],
            "*"
        );
    }

    #[tokio::test]
    async fn test_cors_listed_origin() {
        let dir = TempDir::new().unwrap();
        let state = AppState::new(test_config(&dir, &["http://localhost:8000"])).unwrap();
        let request = Request::builder()
            .uri("/")
            .header(ORIGIN, "http://localhost:8000")
            .body(Body::empty())
            .unwrap();

        let response = app(state).oneshot(request).await.unwrap();

        assert_eq!(
            response.headers()["access-control-allow-origin"],
            "http://localhost:8000"
        );
        assert_eq!(
            response.headers()["access-control-allow-credentials"],
            "true"
        );
    }

    #[tokio::test]
    async fn test_static_files() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("static")).unwrap();
        std::fs::write(dir.path().join("static/index.html"), "<h1>recipes</h1>").unwrap();

        let response = get(seeded_app(&dir, &[]), "/static/index.html").await;

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"<h1>recipes</h1>");
    }
}
