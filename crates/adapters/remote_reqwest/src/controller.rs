//! Client for patching devices owned by other controllers.

use std::future::Future;

use homectl_app::ports::DependentController;
use homectl_domain::capability::StateMap;
use homectl_domain::error::RemoteError;

use crate::client::GatewayClient;

/// [`DependentController`] issuing `PATCH {gateway}/{controller}/device/{id}`.
#[derive(Debug, Clone)]
pub struct HttpDependentController {
    client: GatewayClient,
}

impl HttpDependentController {
    #[must_use]
    pub fn new(client: GatewayClient) -> Self {
        Self { client }
    }
}

impl DependentController for HttpDependentController {
    fn patch(
        &self,
        controller_name: &str,
        identifier: &str,
        body: StateMap,
    ) -> impl Future<Output = Result<(), RemoteError>> + Send {
        let path = format!("{controller_name}/device/{identifier}");
        async move {
            tracing::debug!(controller = %controller_name, device = %identifier, "patching dependency");
            self.client.patch(controller_name, &path, &body).await
        }
    }
}
