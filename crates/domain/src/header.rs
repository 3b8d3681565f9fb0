//! Device headers and dependency rules as delivered by the device registry.
//!
//! The registry speaks snake_case while devices serialise in camelCase, so
//! every field accepts both spellings.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Opaque vendor-specific attributes (hardware address, feature list, …).
pub type Attributes = Map<String, Value>;

/// Registry description of a device before capability composition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceHeader {
    pub identifier: String,
    pub name: String,
    #[serde(rename = "type")]
    pub device_type: String,
    #[serde(default, alias = "controller_name")]
    pub controller_name: String,
    #[serde(default)]
    pub attributes: Attributes,
    #[serde(default, alias = "depends_on")]
    pub depends_on: Vec<DependencyRule>,
    #[serde(default, alias = "state_providers")]
    pub state_providers: Vec<String>,
}

impl DeviceHeader {
    /// Feature names listed under `attributes.features`, in declaration order.
    ///
    /// Non-string entries are ignored.
    #[must_use]
    pub fn features(&self) -> Vec<&str> {
        self.attributes
            .get("features")
            .and_then(Value::as_array)
            .map(|features| features.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    /// Read a boolean attribute, `false` when absent.
    #[must_use]
    pub fn attribute_flag(&self, key: &str) -> bool {
        self.attributes
            .get(key)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}

/// Cascades a local property change into a patch on another device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyRule {
    #[serde(alias = "local_property")]
    pub local_property: String,
    #[serde(alias = "local_value")]
    pub local_value: Value,
    #[serde(alias = "remote_device_identifier")]
    pub remote_device_identifier: String,
    #[serde(alias = "remote_property")]
    pub remote_property: String,
    #[serde(alias = "remote_value")]
    pub remote_value: Value,
}

impl DependencyRule {
    /// Whether the given desired-state delta satisfies this rule's trigger.
    #[must_use]
    pub fn is_triggered_by(&self, delta: &Map<String, Value>) -> bool {
        delta.get(&self.local_property) == Some(&self.local_value)
    }

    /// Body of the patch to send to the remote device.
    #[must_use]
    pub fn remote_patch(&self) -> Map<String, Value> {
        let mut patch = Map::new();
        patch.insert(self.remote_property.clone(), self.remote_value.clone());
        patch
    }
}
