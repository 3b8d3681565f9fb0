//! Stub ports and state builders shared by the handler tests.

use std::sync::Arc;
use std::time::Duration;

use homectl_app::factory::DeviceFactory;
use homectl_app::ports::{DependentController, DeviceRegistry, EventPublisher, VendorAdapter};
use homectl_app::propagator::DependencyPropagator;
use homectl_app::services::DeviceService;
use homectl_app::store::DeviceStore;
use homectl_domain::capability::{BaseShape, StateMap};
use homectl_domain::device::Device;
use homectl_domain::error::{RemoteError, VendorError};
use homectl_domain::event::Event;
use homectl_domain::header::{Attributes, DeviceHeader};
use serde_json::json;

use crate::state::AppState;

/// Echoes every command back as the new hardware state.
pub(crate) struct StubVendor {
    failing: bool,
}

pub(crate) struct StubRegistry;
pub(crate) struct StubController;
pub(crate) struct StubPublisher;

impl VendorAdapter for StubVendor {
    async fn fetch_state(&self, _attributes: &Attributes) -> Result<StateMap, VendorError> {
        Ok(StateMap::new())
    }

    async fn apply_state(
        &self,
        _attributes: &Attributes,
        command: StateMap,
    ) -> Result<StateMap, VendorError> {
        if self.failing {
            return Err(VendorError::Rejected("bridge offline".to_string()));
        }
        Ok(command)
    }
}

impl DeviceRegistry for StubRegistry {
    async fn list_devices(&self, _controller_name: &str) -> Result<Vec<DeviceHeader>, RemoteError> {
        Ok(vec![])
    }

    async fn get_device(&self, identifier: &str) -> Result<DeviceHeader, RemoteError> {
        Err(RemoteError::Status {
            target: "service.registry.device".to_string(),
            status: 404,
            message: format!("device '{identifier}' not found"),
        })
    }
}

impl DependentController for StubController {
    async fn patch(
        &self,
        _controller_name: &str,
        _identifier: &str,
        _body: StateMap,
    ) -> Result<(), RemoteError> {
        Ok(())
    }
}

impl EventPublisher for StubPublisher {
    async fn publish(&self, _event: Event) -> Result<(), RemoteError> {
        Ok(())
    }
}

pub(crate) type TestState = AppState<StubVendor, StubRegistry, StubController, StubPublisher>;

pub(crate) fn lamp(identifier: &str) -> Device {
    let header: DeviceHeader = serde_json::from_value(json!({
        "identifier": identifier,
        "name": identifier,
        "type": "light",
        "controller_name": "service.controller.hue",
        "attributes": { "address": identifier },
    }))
    .unwrap();
    DeviceFactory::new(BaseShape::Light).build(header)
}

fn state(devices: Vec<Device>, failing: bool) -> TestState {
    let store = Arc::new(DeviceStore::new());
    for device in devices {
        store.insert(device).unwrap();
    }
    store.flush();

    let propagator =
        DependencyPropagator::new(StubRegistry, StubController, Duration::from_millis(100));
    AppState::new(DeviceService::new(
        store,
        StubVendor { failing },
        propagator,
        StubPublisher,
        Duration::from_millis(100),
    ))
}

pub(crate) fn test_state(devices: Vec<Device>) -> TestState {
    state(devices, false)
}

pub(crate) fn test_state_with_failing_vendor(devices: Vec<Device>) -> TestState {
    state(devices, true)
}
