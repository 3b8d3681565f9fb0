//! Dependent controller port: patch devices owned by other controllers.

use std::future::Future;

use homectl_domain::capability::StateMap;
use homectl_domain::error::RemoteError;

/// Sends property patches to the controller that owns a device.
pub trait DependentController {
    /// Apply `body` to device `identifier` on `controller_name`.
    fn patch(
        &self,
        controller_name: &str,
        identifier: &str,
        body: StateMap,
    ) -> impl Future<Output = Result<(), RemoteError>> + Send;
}

impl<T: DependentController + Send + Sync> DependentController for std::sync::Arc<T> {
    fn patch(
        &self,
        controller_name: &str,
        identifier: &str,
        body: StateMap,
    ) -> impl Future<Output = Result<(), RemoteError>> + Send {
        (**self).patch(controller_name, identifier, body)
    }
}
