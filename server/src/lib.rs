//! HTTP boundary for blobgate.
//!
//! One route, one read method: `GET /api/token` runs the issuance pipeline
//! (vault fetch, connection string validation, SAS derivation) and maps each
//! failure kind to its HTTP status. Everything a handler needs travels in an
//! immutable [`AppState`] built once at startup.

use axum::routing::get;
use axum::Router;
use blobgate_core::{Context, ProvideSecret};
use std::sync::Arc;

pub mod config;
pub mod handler;
mod http_send;

pub use config::ServerConfig;
pub use http_send::ReqwestHttpSend;

/// Shared state handed to every request. All fields are immutable after
/// construction; requests never mutate shared state.
#[derive(Clone)]
pub struct AppState {
    /// Capability context used for outbound vault traffic.
    pub ctx: Context,
    /// Configuration snapshot built at startup.
    pub config: Arc<ServerConfig>,
    /// The vault capability; tests substitute a fake here.
    pub secrets: Arc<dyn ProvideSecret>,
}

impl AppState {
    /// Bundle the collaborators for the issuance route.
    pub fn new(ctx: Context, config: ServerConfig, secrets: impl ProvideSecret + 'static) -> Self {
        Self {
            ctx,
            config: Arc::new(config),
            secrets: Arc::new(secrets),
        }
    }
}

/// Build the application router.
///
/// Only GET is routed; axum answers any other method on the path with
/// 405 and an empty body.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/token", get(handler::issue_token))
        .with_state(state)
}
