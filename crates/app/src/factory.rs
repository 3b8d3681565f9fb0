//! Builds devices from registry headers.

use homectl_domain::capability::{self, BaseShape};
use homectl_domain::device::Device;
use homectl_domain::header::DeviceHeader;

/// Feature name implied by the legacy `attributes.energy: true` flag.
const LEGACY_ENERGY_FLAG: &str = "energy";

/// Maps a [`DeviceHeader`] onto a [`Device`] for one controller.
///
/// Every device gets the controller's base shape, followed by the header's
/// declared features in order. Unknown or repeated features are logged and
/// skipped.
#[derive(Debug, Clone, Copy)]
pub struct DeviceFactory {
    base: BaseShape,
}

impl DeviceFactory {
    #[must_use]
    pub fn new(base: BaseShape) -> Self {
        Self { base }
    }

    /// Instantiate and decorate a device.
    #[must_use]
    pub fn build(&self, header: DeviceHeader) -> Device {
        let mut features: Vec<String> = header.features().into_iter().map(String::from).collect();
        if header.attribute_flag(LEGACY_ENERGY_FLAG)
            && !features.iter().any(|f| f == capability::energy::NAME)
        {
            features.push(capability::energy::NAME.to_string());
        }

        let identifier = header.identifier.clone();
        let mut builder = Device::builder(header, self.base.capability());
        for feature in &features {
            let Some(capability) = capability::from_feature(feature) else {
                tracing::warn!(device = %identifier, %feature, "unknown feature, skipping");
                continue;
            };
            if let Err(err) = builder.attach(capability) {
                tracing::warn!(device = %identifier, %feature, %err, "skipping capability");
            }
        }
        builder.build()
    }
}
