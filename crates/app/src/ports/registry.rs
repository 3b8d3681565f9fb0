//! Device registry port: where device headers come from.

use std::future::Future;

use homectl_domain::error::RemoteError;
use homectl_domain::header::DeviceHeader;

/// Read access to the device registry service.
pub trait DeviceRegistry {
    /// Headers of every device owned by `controller_name`.
    fn list_devices(
        &self,
        controller_name: &str,
    ) -> impl Future<Output = Result<Vec<DeviceHeader>, RemoteError>> + Send;

    /// Header of a single device, whichever controller owns it.
    fn get_device(
        &self,
        identifier: &str,
    ) -> impl Future<Output = Result<DeviceHeader, RemoteError>> + Send;
}

impl<T: DeviceRegistry + Send + Sync> DeviceRegistry for std::sync::Arc<T> {
    fn list_devices(
        &self,
        controller_name: &str,
    ) -> impl Future<Output = Result<Vec<DeviceHeader>, RemoteError>> + Send {
        (**self).list_devices(controller_name)
    }

    fn get_device(
        &self,
        identifier: &str,
    ) -> impl Future<Output = Result<DeviceHeader, RemoteError>> + Send {
        (**self).get_device(identifier)
    }
}
