use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use cronui_core::config::{CronuiConfig, MAX_BODY_BYTES};
use cronui_sync::Reconciler;
use std::sync::Arc;

/// Central shared state, passed as Arc<AppState> to all Axum handlers.
///
/// Nothing here is mutable: every request reads the table fresh through the
/// reconciler.
pub struct AppState {
    pub config: CronuiConfig,
    pub reconciler: Reconciler,
}

impl AppState {
    pub fn new(config: CronuiConfig, reconciler: Reconciler) -> Self {
        Self { config, reconciler }
    }
}

/// Assemble the full Axum router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(crate::http::health::health_handler))
        .route("/crontab", get(crate::http::crontab::list_handler))
        .route("/save_crontab", post(crate::http::crontab::save_handler))
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(tower_http::trace::TraceLayer::new_for_http())
}
