//! Pluggable units of device behaviour.
//!
//! A [`Device`](crate::device::Device) is a base shape (light, plug) followed
//! by zero or more capabilities in attachment order. Every hook has a no-op
//! default, so a capability only implements what it contributes.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ValidationError;
use crate::property::PropertySchema;

pub mod color;
pub mod color_temp;
pub mod energy;
pub mod light;
pub mod plug;
pub mod rgb;

pub use color::Color;
pub use color_temp::ColorTemp;
pub use energy::Energy;
pub use light::Light;
pub use plug::Plug;
pub use rgb::Rgb;

/// JSON object used for local state, desired deltas, and vendor payloads.
pub type StateMap = Map<String, Value>;

/// One unit of device behaviour.
///
/// Hooks receive the result of everything composed before them.
pub trait Capability: fmt::Debug + Send + Sync {
    /// Feature name, unique per device.
    fn name(&self) -> &'static str;

    /// Inspect raw caller input against the current state.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] describing the first offending property.
    fn validate(&self, _current: &StateMap, _input: &StateMap) -> Result<(), ValidationError> {
        Ok(())
    }

    /// Copy or derive validated input into the desired delta.
    fn transform(&self, _current: &StateMap, _input: &StateMap, _output: &mut StateMap) {}

    /// Add this capability's property descriptors.
    fn describe_properties(&self, schema: PropertySchema) -> PropertySchema {
        schema
    }

    /// Read this capability's fields from a vendor payload into local state.
    ///
    /// Missing or malformed fields leave the local value untouched.
    fn apply_remote_state(&self, _state: &mut StateMap, _payload: &StateMap) {}

    /// Encode this capability's fields of the desired delta as vendor command fields.
    fn prepare_command(&self, _delta: &StateMap, _command: &mut StateMap) {}
}

/// Controller-wide behaviour every device starts from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BaseShape {
    Light,
    Plug,
}

impl BaseShape {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Plug => "plug",
        }
    }

    /// Instantiate the base capability.
    #[must_use]
    pub fn capability(self) -> Arc<dyn Capability> {
        match self {
            Self::Light => Arc::new(Light),
            Self::Plug => Arc::new(Plug),
        }
    }
}

impl fmt::Display for BaseShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown base shape name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown base shape '{0}', expected 'light' or 'plug'")]
pub struct UnknownBaseShape(pub String);

impl FromStr for BaseShape {
    type Err = UnknownBaseShape;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Self::Light),
            "plug" => Ok(Self::Plug),
            other => Err(UnknownBaseShape(other.to_string())),
        }
    }
}

/// Look up a built-in capability by feature name.
#[must_use]
pub fn from_feature(feature: &str) -> Option<Arc<dyn Capability>> {
    let capability: Arc<dyn Capability> = match feature {
        color::NAME => Arc::new(Color),
        color_temp::NAME => Arc::new(ColorTemp),
        rgb::NAME => Arc::new(Rgb),
        energy::NAME => Arc::new(Energy),
        _ => return None,
    };
    Some(capability)
}

/// Mark the desired delta as switching the device on.
pub(crate) fn imply_power_on(output: &mut StateMap) {
    output.insert("power".to_string(), Value::Bool(true));
}

pub(crate) fn require_bool(property: &str, value: &Value) -> Result<bool, ValidationError> {
    value.as_bool().ok_or_else(|| ValidationError::InvalidType {
        property: property.to_string(),
        expected: "boolean",
        value: value.clone(),
    })
}

#[allow(clippy::cast_precision_loss)]
pub(crate) fn require_int_in(
    property: &str,
    value: &Value,
    min: i64,
    max: i64,
) -> Result<i64, ValidationError> {
    let number = value.as_i64().ok_or_else(|| ValidationError::InvalidType {
        property: property.to_string(),
        expected: "integer",
        value: value.clone(),
    })?;
    if (min..=max).contains(&number) {
        Ok(number)
    } else {
        Err(ValidationError::OutOfRange {
            property: property.to_string(),
            value: value.clone(),
            min: min as f64,
            max: max as f64,
        })
    }
}
