use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::path::PathBuf;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use trials_core::config::normalise_api_base_url;
use trials_core::constants::{GENERATE_SUMMARY_PATH, SEARCH_TRIALS_PATH};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_BIND_ADDR: &str = "0.0.0.0";
const DEFAULT_STATIC_DIR: &str = "static";
const BACKEND_NOT_CONFIGURED: &str = "search backend is not configured";

/// Dev server settings, read once at startup.
#[derive(Clone, Debug, PartialEq)]
struct ServerConfig {
    addr: SocketAddr,
    static_dir: PathBuf,
    backend_url: Option<String>,
}

impl ServerConfig {
    fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let non_empty = |key: &str| get(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let port = match non_empty("PORT") {
            Some(port) => port
                .parse::<u16>()
                .map_err(|_| anyhow::anyhow!("invalid PORT: {}", port))?,
            None => DEFAULT_PORT,
        };
        let host = non_empty("TRIALS_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.into());
        let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

        let static_dir = non_empty("TRIALS_STATIC_DIR")
            .unwrap_or_else(|| DEFAULT_STATIC_DIR.into())
            .into();
        let backend_url = non_empty("TRIALS_BACKEND_URL")
            .map(|url| normalise_api_base_url(&url))
            .transpose()?;

        Ok(Self {
            addr,
            static_dir,
            backend_url,
        })
    }
}

/// Application state shared across handlers
#[derive(Clone)]
struct AppState {
    backend: Option<Backend>,
}

#[derive(Clone)]
struct Backend {
    client: reqwest::Client,
    base_url: String,
}

/// Main entry point for the trial finder dev server
///
/// Serves the page and its wasm bundle from the static directory and relays the two API
/// endpoints to the search backend.
///
/// # Environment Variables
/// - `PORT`: listen port (default: 8080)
/// - `TRIALS_BIND_ADDR`: listen address (default: "0.0.0.0")
/// - `TRIALS_STATIC_DIR`: directory holding `index.html` and `pkg/` (default: "static")
/// - `TRIALS_BACKEND_URL`: base URL of the search backend; API routes answer 503 without it
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("trials_run=info".parse()?)
                .add_directive("tower_http=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;
    let backend = match &config.backend_url {
        Some(url) => {
            tracing::info!("++ Relaying API requests to {}", url);
            Some(Backend {
                client: reqwest::Client::builder().build()?,
                base_url: url.clone(),
            })
        }
        None => {
            tracing::warn!("TRIALS_BACKEND_URL not set; API routes will answer 503");
            None
        }
    };

    tracing::info!(
        "++ Starting trial finder on {} serving {}",
        config.addr,
        config.static_dir.display()
    );

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app(&config, AppState { backend })).await?;

    Ok(())
}

fn app(config: &ServerConfig, state: AppState) -> Router {
    let index = config.static_dir.join("index.html");
    let assets = ServeDir::new(&config.static_dir).fallback(ServeFile::new(index));

    Router::new()
        .route("/health", get(health))
        .route(SEARCH_TRIALS_PATH, post(search_trials))
        .route(GENERATE_SUMMARY_PATH, post(generate_summary))
        .fallback_service(assets)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Health check endpoint
async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "service": "trials-run" }))
}

async fn search_trials(State(state): State<AppState>, body: Bytes) -> Response {
    relay(&state, SEARCH_TRIALS_PATH, body).await
}

async fn generate_summary(State(state): State<AppState>, body: Bytes) -> Response {
    relay(&state, GENERATE_SUMMARY_PATH, body).await
}

/// Forward a JSON request to the backend and hand its status, content type and body back
/// unchanged.
async fn relay(state: &AppState, path: &str, body: Bytes) -> Response {
    let Some(backend) = &state.backend else {
        return error_response(StatusCode::SERVICE_UNAVAILABLE, BACKEND_NOT_CONFIGURED);
    };

    let url = format!("{}{}", backend.base_url, path);
    let reply = backend
        .client
        .post(&url)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body)
        .send()
        .await;

    let reply = match reply {
        Ok(reply) => reply,
        Err(e) => {
            tracing::error!("Backend request to {} failed: {}", url, e);
            return error_response(StatusCode::BAD_GATEWAY, "search backend is unreachable");
        }
    };

    let status = StatusCode::from_u16(reply.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
    let content_type = reply.headers().get(header::CONTENT_TYPE).cloned();
    match reply.bytes().await {
        Ok(bytes) => {
            let mut response = (status, bytes).into_response();
            match content_type {
                Some(value) => response.headers_mut().insert(header::CONTENT_TYPE, value),
                None => response.headers_mut().remove(header::CONTENT_TYPE),
            };
            response
        }
        Err(e) => {
            tracing::error!("Backend reply from {} could not be read: {}", url, e);
            error_response(StatusCode::BAD_GATEWAY, "search backend reply was incomplete")
        }
    }
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "status": "error", "error": message }))).into_response()
}
