//! Axum router assembly.

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use homectl_app::ports::{DependentController, DeviceRegistry, EventPublisher, VendorAdapter};

use crate::state::AppState;

/// Build the top-level axum [`Router`].
///
/// Includes a [`TraceLayer`] that logs each HTTP request/response at the
/// `DEBUG` level using the `tracing` ecosystem.
pub fn build<V, R, C, P>(state: AppState<V, R, C, P>) -> Router
where
    V: VendorAdapter + Send + Sync + 'static,
    R: DeviceRegistry + Send + Sync + 'static,
    C: DependentController + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(health_check))
        .merge(crate::api::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
