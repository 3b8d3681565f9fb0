//! Vendor port: the hardware (or vendor bridge) behind a controller.
//!
//! Payloads are opaque JSON objects; only capabilities read fields out of
//! them, through `Device::apply_remote_state`.

use std::future::Future;

use homectl_domain::capability::StateMap;
use homectl_domain::error::VendorError;
use homectl_domain::header::Attributes;

/// Raw state as reported by the vendor.
pub type VendorPayload = StateMap;

/// Reads and writes hardware state for a device identified by its attributes.
pub trait VendorAdapter {
    /// Read the current hardware state.
    fn fetch_state(
        &self,
        attributes: &Attributes,
    ) -> impl Future<Output = Result<VendorPayload, VendorError>> + Send;

    /// Send a command and return the resulting hardware state.
    fn apply_state(
        &self,
        attributes: &Attributes,
        command: StateMap,
    ) -> impl Future<Output = Result<VendorPayload, VendorError>> + Send;
}

impl<T: VendorAdapter + Send + Sync> VendorAdapter for std::sync::Arc<T> {
    fn fetch_state(
        &self,
        attributes: &Attributes,
    ) -> impl Future<Output = Result<VendorPayload, VendorError>> + Send {
        (**self).fetch_state(attributes)
    }

    fn apply_state(
        &self,
        attributes: &Attributes,
        command: StateMap,
    ) -> impl Future<Output = Result<VendorPayload, VendorError>> + Send {
        (**self).apply_state(attributes, command)
    }
}
