//! # homectl-adapter-virtual
//!
//! Virtual vendor that keeps simulated hardware state in memory.
//!
//! Each simulated device is addressed by the `address` attribute of its
//! header. Commands are merged into the stored state and the full state is
//! reported back, the way a vendor bridge answers a write. Individual
//! addresses can be switched to a failing mode to exercise error paths.
//!
//! ## Dependency rule
//!
//! Depends on `homectl-app` (port traits) and `homectl-domain` only.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use serde_json::Value;

use homectl_app::ports::{VendorAdapter, VendorPayload};
use homectl_domain::capability::StateMap;
use homectl_domain::error::VendorError;
use homectl_domain::header::Attributes;

/// Attribute holding the simulated hardware address.
pub const ADDRESS_ATTRIBUTE: &str = "address";

/// In-memory vendor simulating devices keyed by hardware address.
#[derive(Debug, Default)]
pub struct VirtualVendor {
    hardware: Mutex<HashMap<String, StateMap>>,
    failing: Mutex<HashSet<String>>,
    latency: Option<Duration>,
}

impl VirtualVendor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every call by `latency` before answering.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Replace the simulated state of the device at `address`.
    pub fn seed(&self, address: impl Into<String>, state: StateMap) {
        self.hardware
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(address.into(), state);
    }

    /// Make every call addressed to `address` fail (or succeed again).
    pub fn set_failing(&self, address: &str, failing: bool) {
        let mut set = self.failing.lock().unwrap_or_else(PoisonError::into_inner);
        if failing {
            set.insert(address.to_string());
        } else {
            set.remove(address);
        }
    }

    /// Current simulated state of the device at `address`.
    #[must_use]
    pub fn state_of(&self, address: &str) -> Option<StateMap> {
        self.hardware
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(address)
            .cloned()
    }

    fn address(attributes: &Attributes) -> Result<String, VendorError> {
        attributes
            .get(ADDRESS_ATTRIBUTE)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or(VendorError::MissingAttribute(ADDRESS_ATTRIBUTE))
    }

    fn ensure_reachable(&self, address: &str) -> Result<(), VendorError> {
        let failing = self.failing.lock().unwrap_or_else(PoisonError::into_inner);
        if failing.contains(address) {
            return Err(VendorError::Rejected(format!(
                "device at '{address}' is unreachable"
            )));
        }
        Ok(())
    }

    fn read(&self, address: &str) -> Result<StateMap, VendorError> {
        self.ensure_reachable(address)?;
        Ok(self.state_of(address).unwrap_or_default())
    }

    fn write(&self, address: &str, command: StateMap) -> Result<StateMap, VendorError> {
        self.ensure_reachable(address)?;
        let mut hardware = self.hardware.lock().unwrap_or_else(PoisonError::into_inner);
        let state = hardware.entry(address.to_string()).or_default();
        state.extend(command);
        Ok(state.clone())
    }

    async fn delay(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

impl VendorAdapter for VirtualVendor {
    fn fetch_state(
        &self,
        attributes: &Attributes,
    ) -> impl Future<Output = Result<VendorPayload, VendorError>> + Send {
        let address = Self::address(attributes);
        async move {
            let address = address?;
            self.delay().await;
            let state = self.read(&address)?;
            tracing::trace!(%address, "virtual state read");
            Ok(state)
        }
    }

    fn apply_state(
        &self,
        attributes: &Attributes,
        command: StateMap,
    ) -> impl Future<Output = Result<VendorPayload, VendorError>> + Send {
        let address = Self::address(attributes);
        async move {
            let address = address?;
            self.delay().await;
            let state = self.write(&address, command)?;
            tracing::debug!(%address, "virtual command applied");
            Ok(state)
        }
    }
}
