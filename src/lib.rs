use std::sync::Arc;

use axum::{middleware, routing::get, Router};
use ipnet::IpNet;
use tokio_util::sync::CancellationToken;

pub mod auth;
pub mod config;
pub mod domain;
pub mod errors;
pub mod http;
pub mod logging;
pub mod process;
pub mod systemd_client;

use systemd_client::UnitProvider;

#[derive(Clone)]
pub struct AppState {
    pub api_token: Arc<str>,
    pub allowed_cidr: Option<IpNet>,
    pub unit_provider: Arc<dyn UnitProvider>,
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(
        api_token: String,
        allowed_cidr: Option<IpNet>,
        unit_provider: Arc<dyn UnitProvider>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            api_token: Arc::<str>::from(api_token),
            allowed_cidr,
            unit_provider,
            shutdown,
        }
    }
}

pub fn build_app(state: AppState) -> Router {
    let protected = Router::new()
        .route("/api/status", get(http::handlers::unit_status))
        .route("/api/logs", get(http::handlers::unit_logs))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_bearer_token,
        ));

    Router::new()
        .route("/health", get(http::handlers::health))
        .merge(protected)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::enforce_ip_allowlist,
        ))
        .layer(middleware::from_fn(logging::request_logging_middleware))
        .with_state(state)
}
