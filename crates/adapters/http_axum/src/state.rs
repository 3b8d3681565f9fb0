//! Shared application state for axum handlers.

use std::sync::Arc;

use homectl_app::ports::{DependentController, DeviceRegistry, EventPublisher, VendorAdapter};
use homectl_app::services::DeviceService;

/// Application state shared across all axum handlers.
///
/// Generic over the port implementations to avoid dynamic dispatch.
/// `Clone` is implemented manually so the underlying types themselves do not
/// need to be `Clone`; only the `Arc` wrapper is cloned.
pub struct AppState<V, R, C, P> {
    /// Device read and command service.
    pub device_service: Arc<DeviceService<V, R, C, P>>,
}

impl<V, R, C, P> Clone for AppState<V, R, C, P> {
    fn clone(&self) -> Self {
        Self {
            device_service: Arc::clone(&self.device_service),
        }
    }
}

impl<V, R, C, P> AppState<V, R, C, P>
where
    V: VendorAdapter + Send + Sync + 'static,
    R: DeviceRegistry + Send + Sync + 'static,
    C: DependentController + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
{
    /// Create a new application state from a service instance.
    pub fn new(device_service: DeviceService<V, R, C, P>) -> Self {
        Self::from_arc(Arc::new(device_service))
    }

    /// Create a new application state from a pre-wrapped service.
    pub fn from_arc(device_service: Arc<DeviceService<V, R, C, P>>) -> Self {
        Self { device_service }
    }
}
