//! Device registry client.

use std::future::Future;

use homectl_app::ports::DeviceRegistry;
use homectl_domain::error::RemoteError;
use homectl_domain::header::DeviceHeader;

use crate::client::GatewayClient;

/// Service name of the registry behind the gateway.
pub const REGISTRY_SERVICE: &str = "service.registry.device";

/// [`DeviceRegistry`] backed by the registry service's HTTP API.
#[derive(Debug, Clone)]
pub struct HttpRegistry {
    client: GatewayClient,
}

impl HttpRegistry {
    #[must_use]
    pub fn new(client: GatewayClient) -> Self {
        Self { client }
    }
}

impl DeviceRegistry for HttpRegistry {
    fn list_devices(
        &self,
        controller_name: &str,
    ) -> impl Future<Output = Result<Vec<DeviceHeader>, RemoteError>> + Send {
        let path = format!("{REGISTRY_SERVICE}/devices");
        async move {
            self.client
                .get(
                    REGISTRY_SERVICE,
                    &path,
                    &[("controller_name", controller_name)],
                )
                .await
        }
    }

    fn get_device(
        &self,
        identifier: &str,
    ) -> impl Future<Output = Result<DeviceHeader, RemoteError>> + Send {
        let path = format!("{REGISTRY_SERVICE}/device/{identifier}");
        async move { self.client.get(REGISTRY_SERVICE, &path, &[]).await }
    }
}
