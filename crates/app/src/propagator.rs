//! Dependency propagator: cascades a command into patches on other devices.

use std::time::Duration;

use futures::future::join_all;
use homectl_domain::capability::StateMap;
use homectl_domain::error::{CascadeError, RemoteError, RuleFailure};
use homectl_domain::header::DependencyRule;

use crate::ports::{DependentController, DeviceRegistry};

const REGISTRY_TARGET: &str = "service.registry.device";

/// Resolves dependency rules against the registry and patches remote devices.
pub struct DependencyPropagator<R, C> {
    registry: R,
    controller: C,
    timeout: Duration,
}

impl<R, C> DependencyPropagator<R, C>
where
    R: DeviceRegistry + Send + Sync,
    C: DependentController + Send + Sync,
{
    /// Each registry lookup and each patch is bounded by `timeout`.
    pub fn new(registry: R, controller: C, timeout: Duration) -> Self {
        Self {
            registry,
            controller,
            timeout,
        }
    }

    /// Fire every rule whose trigger matches `delta`, concurrently.
    ///
    /// Returns the number of patches issued. Patches that succeeded are not
    /// undone when others fail.
    ///
    /// # Errors
    ///
    /// Returns [`CascadeError`] listing every rule that failed.
    #[tracing::instrument(skip_all, fields(rules = rules.len()))]
    pub async fn propagate(
        &self,
        delta: &StateMap,
        rules: &[DependencyRule],
    ) -> Result<usize, CascadeError> {
        let triggered: Vec<&DependencyRule> = rules
            .iter()
            .filter(|rule| rule.is_triggered_by(delta))
            .collect();
        if triggered.is_empty() {
            return Ok(0);
        }

        let attempted = triggered.len();
        let results = join_all(triggered.into_iter().map(|rule| async move {
            self.cascade(rule).await.map_err(|source| RuleFailure {
                remote_device: rule.remote_device_identifier.clone(),
                remote_property: rule.remote_property.clone(),
                source,
            })
        }))
        .await;

        let failures: Vec<RuleFailure> = results.into_iter().filter_map(Result::err).collect();
        if failures.is_empty() {
            tracing::debug!(count = attempted, "dependencies updated");
            Ok(attempted)
        } else {
            for failure in &failures {
                tracing::warn!(
                    device = %failure.remote_device,
                    property = %failure.remote_property,
                    error = %failure.source,
                    "dependency update failed"
                );
            }
            Err(CascadeError {
                attempted,
                failures,
            })
        }
    }

    async fn cascade(&self, rule: &DependencyRule) -> Result<(), RemoteError> {
        let identifier = &rule.remote_device_identifier;
        let header = tokio::time::timeout(self.timeout, self.registry.get_device(identifier))
            .await
            .map_err(|_| RemoteError::Timeout {
                target: REGISTRY_TARGET.to_string(),
            })??;

        let controller_name = header.controller_name;
        tokio::time::timeout(
            self.timeout,
            self.controller
                .patch(&controller_name, identifier, rule.remote_patch()),
        )
        .await
        .map_err(|_| RemoteError::Timeout {
            target: controller_name.clone(),
        })?
    }
}
