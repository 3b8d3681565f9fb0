//! JSON REST API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod devices;

use axum::Router;
use axum::routing::get;
use serde::Serialize;

use homectl_app::ports::{DependentController, DeviceRegistry, EventPublisher, VendorAdapter};

use crate::state::AppState;

/// `{"data": ...}` envelope wrapping every successful response body.
#[derive(Debug, Serialize)]
pub struct Data<T> {
    pub data: T,
}

impl<T> Data<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Build the device routes.
pub fn routes<V, R, C, P>() -> Router<AppState<V, R, C, P>>
where
    V: VendorAdapter + Send + Sync + 'static,
    R: DeviceRegistry + Send + Sync + 'static,
    C: DependentController + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    Router::new()
        .route("/devices", get(devices::list::<V, R, C, P>))
        .route(
            "/device/{id}",
            get(devices::get::<V, R, C, P>).patch(devices::update::<V, R, C, P>),
        )
}
