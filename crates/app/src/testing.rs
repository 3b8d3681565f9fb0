//! In-memory port fakes shared by the unit tests of this crate.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use homectl_domain::capability::{BaseShape, StateMap};
use homectl_domain::device::Device;
use homectl_domain::error::{RemoteError, VendorError};
use homectl_domain::event::Event;
use homectl_domain::header::{Attributes, DependencyRule, DeviceHeader};
use serde_json::{Value, json};

use crate::factory::DeviceFactory;
use crate::ports::{
    DependentController, DeviceRegistry, EventPublisher, StateProvider, VendorAdapter,
    VendorPayload,
};

pub(crate) const CONTROLLER: &str = "service.controller.hue";

pub(crate) fn payload(value: Value) -> StateMap {
    value.as_object().cloned().unwrap()
}

/// Light header whose vendor address equals its identifier.
pub(crate) fn header(identifier: &str, features: &[&str]) -> DeviceHeader {
    serde_json::from_value(json!({
        "identifier": identifier,
        "name": identifier,
        "type": "light",
        "controller_name": CONTROLLER,
        "attributes": { "address": identifier, "features": features },
    }))
    .unwrap()
}

pub(crate) fn light(identifier: &str, features: &[&str]) -> Device {
    DeviceFactory::new(BaseShape::Light).build(header(identifier, features))
}

pub(crate) fn rule(local: (&str, Value), remote_device: &str, remote: (&str, Value)) -> DependencyRule {
    DependencyRule {
        local_property: local.0.to_string(),
        local_value: local.1,
        remote_device_identifier: remote_device.to_string(),
        remote_property: remote.0.to_string(),
        remote_value: remote.1,
    }
}

fn transport(target: &str) -> RemoteError {
    RemoteError::Status {
        target: target.to_string(),
        status: 503,
        message: "unavailable".to_string(),
    }
}

#[derive(Default)]
pub(crate) struct FakeRegistry {
    pub headers: Mutex<Vec<DeviceHeader>>,
    pub failing: AtomicBool,
}

impl FakeRegistry {
    pub fn with(headers: Vec<DeviceHeader>) -> Self {
        Self {
            headers: Mutex::new(headers),
            failing: AtomicBool::new(false),
        }
    }

    pub fn set(&self, headers: Vec<DeviceHeader>) {
        *self.headers.lock().unwrap() = headers;
    }
}

impl DeviceRegistry for FakeRegistry {
    fn list_devices(
        &self,
        controller_name: &str,
    ) -> impl Future<Output = Result<Vec<DeviceHeader>, RemoteError>> + Send {
        let result = if self.failing.load(Ordering::SeqCst) {
            Err(transport("service.registry.device"))
        } else {
            Ok(self
                .headers
                .lock()
                .unwrap()
                .iter()
                .filter(|h| h.controller_name == controller_name)
                .cloned()
                .collect())
        };
        async { result }
    }

    fn get_device(
        &self,
        identifier: &str,
    ) -> impl Future<Output = Result<DeviceHeader, RemoteError>> + Send {
        let found = self
            .headers
            .lock()
            .unwrap()
            .iter()
            .find(|h| h.identifier == identifier)
            .cloned();
        let result = found.ok_or_else(|| RemoteError::Status {
            target: "service.registry.device".to_string(),
            status: 404,
            message: format!("device '{identifier}' not found"),
        });
        async { result }
    }
}

/// Simulated hardware keyed by `attributes.address`.
#[derive(Default)]
pub(crate) struct FakeVendor {
    pub states: Mutex<HashMap<String, StateMap>>,
    pub failing: Mutex<HashSet<String>>,
    pub hanging: Mutex<HashSet<String>>,
    pub commands: Mutex<Vec<(String, StateMap)>>,
}

impl FakeVendor {
    pub fn with_state(self, address: &str, state: Value) -> Self {
        self.states
            .lock()
            .unwrap()
            .insert(address.to_string(), payload(state));
        self
    }

    fn address(attributes: &Attributes) -> String {
        attributes
            .get("address")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    }

    fn check(&self, address: &str) -> Result<bool, VendorError> {
        if self.failing.lock().unwrap().contains(address) {
            return Err(VendorError::Rejected(format!("{address} is unreachable")));
        }
        Ok(self.hanging.lock().unwrap().contains(address))
    }
}

impl VendorAdapter for FakeVendor {
    fn fetch_state(
        &self,
        attributes: &Attributes,
    ) -> impl Future<Output = Result<VendorPayload, VendorError>> + Send {
        let address = Self::address(attributes);
        let check = self.check(&address);
        let state = self
            .states
            .lock()
            .unwrap()
            .get(&address)
            .cloned()
            .unwrap_or_default();
        async move {
            if check? {
                std::future::pending::<()>().await;
            }
            Ok(state)
        }
    }

    fn apply_state(
        &self,
        attributes: &Attributes,
        command: StateMap,
    ) -> impl Future<Output = Result<VendorPayload, VendorError>> + Send {
        let address = Self::address(attributes);
        let check = self.check(&address);
        let state = if matches!(check, Ok(false)) {
            self.commands
                .lock()
                .unwrap()
                .push((address.clone(), command.clone()));
            let mut states = self.states.lock().unwrap();
            let state = states.entry(address).or_default();
            state.extend(command);
            state.clone()
        } else {
            StateMap::new()
        };
        async move {
            if check? {
                std::future::pending::<()>().await;
            }
            Ok(state)
        }
    }
}

/// Provider answers keyed by `(provider, identifier)`; unknown pairs answer `{}`.
#[derive(Default)]
pub(crate) struct FakeStateProvider {
    pub states: Mutex<HashMap<(String, String), StateMap>>,
    pub failing: Mutex<HashSet<String>>,
    pub requests: Mutex<Vec<(String, String)>>,
}

impl FakeStateProvider {
    pub fn with_state(self, provider: &str, identifier: &str, state: Value) -> Self {
        self.states
            .lock()
            .unwrap()
            .insert((provider.to_string(), identifier.to_string()), payload(state));
        self
    }
}

impl StateProvider for FakeStateProvider {
    fn provided_state(
        &self,
        provider: &str,
        identifier: &str,
    ) -> impl Future<Output = Result<StateMap, RemoteError>> + Send {
        self.requests
            .lock()
            .unwrap()
            .push((provider.to_string(), identifier.to_string()));
        let result = if self.failing.lock().unwrap().contains(provider) {
            Err(transport(provider))
        } else {
            Ok(self
                .states
                .lock()
                .unwrap()
                .get(&(provider.to_string(), identifier.to_string()))
                .cloned()
                .unwrap_or_default())
        };
        async { result }
    }
}

#[derive(Default)]
pub(crate) struct FakeController {
    pub patches: Mutex<Vec<(String, String, StateMap)>>,
    pub failing: Mutex<HashSet<String>>,
}

impl DependentController for FakeController {
    fn patch(
        &self,
        controller_name: &str,
        identifier: &str,
        body: StateMap,
    ) -> impl Future<Output = Result<(), RemoteError>> + Send {
        let result = if self.failing.lock().unwrap().contains(identifier) {
            Err(transport(controller_name))
        } else {
            self.patches.lock().unwrap().push((
                controller_name.to_string(),
                identifier.to_string(),
                body,
            ));
            Ok(())
        };
        async { result }
    }
}

#[derive(Default)]
pub(crate) struct RecordingPublisher {
    pub events: Mutex<Vec<Event>>,
    pub failing: AtomicBool,
    /// Held back before recording the next published event, once.
    pub first_delay: Mutex<Option<Duration>>,
}

impl RecordingPublisher {
    pub fn topics(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.topic.clone())
            .collect()
    }
}

impl EventPublisher for RecordingPublisher {
    fn publish(&self, event: Event) -> impl Future<Output = Result<(), RemoteError>> + Send {
        let failing = self.failing.load(Ordering::SeqCst);
        let delay = self.first_delay.lock().unwrap().take();
        async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            if failing {
                return Err(transport("firehose"));
            }
            self.events.lock().unwrap().push(event);
            Ok(())
        }
    }
}
