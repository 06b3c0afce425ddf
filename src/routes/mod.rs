// HTTP routes: stats ingest/query plus auxiliary GETs

mod http;
mod stats;

use axum::{
    Router,
    response::{IntoResponse, Response},
    routing::get,
};
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::error::ApiError;
use crate::history_repo::HistoryRepo;

pub use stats::parse_sample;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) history_repo: Arc<HistoryRepo>,
    pub(crate) require_timestamp: bool,
}

pub fn app(history_repo: Arc<HistoryRepo>, config: AppConfig) -> Router {
    let state = AppState {
        history_repo,
        require_timestamp: config.history.require_timestamp,
    };
    let mut router = Router::new()
        .route("/", get(http::root_handler)) // GET /
        .route("/version", get(http::version_handler)) // GET /version
        .route("/stats", get(stats::query_all).post(stats::ingest)) // GET, POST /stats
        .route("/stats/history", get(stats::query_all)) // GET /stats/history
        .route("/stats/latest", get(stats::query_latest)); // GET /stats/latest
    if config.server.expose_ips {
        router = router.route("/ips", get(http::ips_handler)); // GET /ips
    }
    router
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

fn panic_response(payload: Box<dyn std::any::Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    };
    ApiError::Internal(format!("handler panicked: {}", detail)).into_response()
}
