//! Device service: read and command use-cases behind the HTTP surface.

use std::sync::Arc;
use std::time::Duration;

use homectl_domain::capability::StateMap;
use homectl_domain::device::Device;
use homectl_domain::error::{ControlError, NotFoundError, VendorError};

use crate::ports::{DependentController, DeviceRegistry, EventPublisher, VendorAdapter};
use crate::propagator::DependencyPropagator;
use crate::store::DeviceStore;

/// Application service for listing devices and applying caller commands.
pub struct DeviceService<V, R, C, P> {
    store: Arc<DeviceStore>,
    vendor: V,
    propagator: DependencyPropagator<R, C>,
    publisher: P,
    vendor_timeout: Duration,
}

impl<V, R, C, P> DeviceService<V, R, C, P>
where
    V: VendorAdapter + Send + Sync,
    R: DeviceRegistry + Send + Sync,
    C: DependentController + Send + Sync,
    P: EventPublisher + Send + Sync,
{
    pub fn new(
        store: Arc<DeviceStore>,
        vendor: V,
        propagator: DependencyPropagator<R, C>,
        publisher: P,
        vendor_timeout: Duration,
    ) -> Self {
        Self {
            store,
            vendor,
            propagator,
            publisher,
            vendor_timeout,
        }
    }

    /// List all devices, ordered by identifier.
    pub fn list_devices(&self) -> Vec<Device> {
        self.store.find_all()
    }

    /// Look up a device by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ControlError::NotFound`] when no such device is stored.
    pub fn get_device(&self, identifier: &str) -> Result<Device, ControlError> {
        self.store
            .find_by_id(identifier)
            .ok_or_else(|| not_found(identifier).into())
    }

    /// Validate, cascade and apply a partial property update.
    ///
    /// Dependency cascades run before the device itself is commanded. A
    /// failed cascade does not prevent the primary update; its error is
    /// returned once the primary state has been applied and published.
    ///
    /// # Errors
    ///
    /// - [`ControlError::NotFound`] for an unknown device
    /// - [`ControlError::Validation`] before any network call is made
    /// - [`ControlError::Vendor`] when the hardware rejects or times out
    /// - [`ControlError::Cascade`] when one or more dependencies failed
    #[tracing::instrument(skip_all, fields(device = %identifier))]
    pub async fn update_device(
        &self,
        identifier: &str,
        input: StateMap,
    ) -> Result<Device, ControlError> {
        let device = self.get_device(identifier)?;
        device.validate(&input)?;
        let delta = device.transform(&input);

        let cascade = self.propagator.propagate(&delta, device.depends_on()).await;

        let command = device.prepare_command(&delta);
        let updated = if command.is_empty() {
            device
        } else {
            let payload = tokio::time::timeout(
                self.vendor_timeout,
                self.vendor.apply_state(device.attributes(), command),
            )
            .await
            .map_err(|_| VendorError::Timeout(self.vendor_timeout))??;

            self.store.update(identifier, |stored| {
                stored.apply_remote_state(&payload);
                stored.clone()
            })?
        };

        let published = self.store.settle(&self.publisher).await;
        tracing::debug!(published, "device updated");

        cascade?;
        Ok(updated)
    }
}

fn not_found(identifier: &str) -> NotFoundError {
    NotFoundError {
        entity: "device",
        id: identifier.to_string(),
    }
}
