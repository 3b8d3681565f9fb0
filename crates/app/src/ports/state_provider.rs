//! State provider port: services that know a device's state on its behalf.
//!
//! Devices that cannot report their own state (an infrared receiver, say)
//! name one or more providers in their header's `stateProviders`. Answers use
//! the device's property names, not a vendor payload.

use std::future::Future;

use homectl_domain::capability::StateMap;
use homectl_domain::error::RemoteError;

/// Asks a named provider service for a device's current state.
pub trait StateProvider {
    /// State that `provider` holds for the device `identifier`.
    fn provided_state(
        &self,
        provider: &str,
        identifier: &str,
    ) -> impl Future<Output = Result<StateMap, RemoteError>> + Send;
}

impl<T: StateProvider + Send + Sync> StateProvider for std::sync::Arc<T> {
    fn provided_state(
        &self,
        provider: &str,
        identifier: &str,
    ) -> impl Future<Output = Result<StateMap, RemoteError>> + Send {
        (**self).provided_state(provider, identifier)
    }
}
