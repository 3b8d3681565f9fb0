//! State provider client.

use std::future::Future;

use serde::Deserialize;

use homectl_app::ports::StateProvider;
use homectl_domain::capability::StateMap;
use homectl_domain::error::RemoteError;

use crate::client::GatewayClient;

/// Body of `GET {provider}/provide-state`. Not wrapped in a data envelope.
#[derive(Deserialize)]
struct ProvidedState {
    #[serde(default)]
    state: StateMap,
}

/// [`StateProvider`] that reaches provider services through the gateway.
#[derive(Debug, Clone)]
pub struct HttpStateProvider {
    client: GatewayClient,
}

impl HttpStateProvider {
    #[must_use]
    pub fn new(client: GatewayClient) -> Self {
        Self { client }
    }
}

impl StateProvider for HttpStateProvider {
    fn provided_state(
        &self,
        provider: &str,
        identifier: &str,
    ) -> impl Future<Output = Result<StateMap, RemoteError>> + Send {
        let path = format!("{provider}/provide-state");
        async move {
            let body: ProvidedState = self
                .client
                .get_raw(provider, &path, &[("device_id", identifier)])
                .await?;
            Ok(body.state)
        }
    }
}
