use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

use regbot_core::RecordStore;
use regbot_core::config::ServerConfig;

use crate::notifier::Notifier;
use crate::{api, assets, webhook};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub store: RecordStore,
    pub notifier: Arc<Notifier>,
}

/// Assemble the full HTTP surface: API, webhook, health check and static site.
pub fn build_router(state: AppState, server: &ServerConfig) -> Router {
    Router::new()
        .route("/healthz", get(api::healthz))
        .route("/api/notify-admin", post(api::notify_admin))
        .route("/api/submit-registration", post(api::submit_registration))
        .route("/api/check-status/{id}", get(api::check_status))
        .route("/api/tg-webhook", post(webhook::telegram_webhook))
        .merge(assets::router(&server.site_root, &server.public_path()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
