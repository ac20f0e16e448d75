use axum::{
    Json, Router,
    extract::State,
    http::{HeaderValue, Method, StatusCode, header},
    response::Redirect,
    routing::get,
};
use serde_json::{Value, json};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::{debug, warn};

use crate::{AppState, infra::config::CorsConfig, routes};

/// Assemble the HTTP application: liveness routes, the versioned API and,
/// when configured, the static front end as fallback.
pub fn create_app(state: AppState) -> Router {
    let versioned_api = routes::create_api_router(state.clone());

    let mut app = Router::new()
        .route("/ping", get(ping_handler))
        .route("/health", get(health_handler))
        .route("/", get(|| async { Redirect::temporary("/index.html") }))
        .merge(versioned_api);

    if let Some(dir) = state.config().static_dir() {
        debug!("serving static files from {}", dir.display());
        app = app.fallback_service(ServeDir::new(dir));
    }

    app.layer(cors_layer(&state.config().cors, state.config().dev_mode))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(cors: &CorsConfig, dev_mode: bool) -> CorsLayer {
    if dev_mode {
        return CorsLayer::permissive();
    }

    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT]);

    // A wildcard origin cannot be combined with credentials.
    if cors.is_wildcard_included() {
        return layer.allow_origin(AllowOrigin::any());
    }

    let origins: Vec<HeaderValue> = cors
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin.trim()) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("ignoring invalid CORS origin {origin:?}");
                None
            }
        })
        .collect();

    layer
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(cors.allow_credentials)
}

async fn ping_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "message": "Buvette Ops API is running",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn health_handler(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let mut health_status = json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
        "checks": {}
    });

    let status = match state.postgres().ping().await {
        Ok(()) => {
            let stats = state.postgres().pool_stats();
            health_status["checks"]["database"] = json!({
                "status": "healthy",
                "pool_size": stats.size,
                "idle_connections": stats.idle,
                "max_connections": stats.max_size
            });
            StatusCode::OK
        }
        Err(e) => {
            warn!("health check failed: {e}");
            health_status["checks"]["database"] = json!({
                "status": "unhealthy",
                "error": e.to_string()
            });
            health_status["status"] = json!("unhealthy");
            StatusCode::SERVICE_UNAVAILABLE
        }
    };

    (status, Json(health_status))
}
