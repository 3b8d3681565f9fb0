//! A base shape composed with capabilities, plus its current state.

use std::iter;
use std::sync::Arc;

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

use crate::capability::{Capability, StateMap};
use crate::error::{CompositionError, ValidationError};
use crate::header::{Attributes, DependencyRule, DeviceHeader};
use crate::property::PropertySchema;

/// A controllable device assembled from a [`DeviceHeader`].
///
/// The set of property keys is fixed when the device is built; only their
/// values change afterwards. Unknown values are `null`.
#[derive(Debug, Clone)]
pub struct Device {
    header: DeviceHeader,
    base: Arc<dyn Capability>,
    capabilities: Vec<Arc<dyn Capability>>,
    schema: PropertySchema,
    state: StateMap,
}

impl Device {
    /// Start assembling a device on top of a base shape.
    #[must_use]
    pub fn builder(header: DeviceHeader, base: Arc<dyn Capability>) -> DeviceBuilder {
        DeviceBuilder {
            header,
            base,
            capabilities: Vec::new(),
        }
    }

    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.header.identifier
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.header.name
    }

    #[must_use]
    pub fn device_type(&self) -> &str {
        &self.header.device_type
    }

    #[must_use]
    pub fn controller_name(&self) -> &str {
        &self.header.controller_name
    }

    #[must_use]
    pub fn attributes(&self) -> &Attributes {
        &self.header.attributes
    }

    #[must_use]
    pub fn depends_on(&self) -> &[DependencyRule] {
        &self.header.depends_on
    }

    #[must_use]
    pub fn header(&self) -> &DeviceHeader {
        &self.header
    }

    #[must_use]
    pub fn schema(&self) -> &PropertySchema {
        &self.schema
    }

    /// Current property values, one entry per schema key.
    #[must_use]
    pub fn state(&self) -> &StateMap {
        &self.state
    }

    /// Current value of a single property.
    #[must_use]
    pub fn property(&self, key: &str) -> Option<&Value> {
        self.state.get(key)
    }

    /// Names of the base shape and attached capabilities, in composition order.
    #[must_use]
    pub fn capability_names(&self) -> Vec<&'static str> {
        self.layers().map(|layer| layer.name()).collect()
    }

    fn layers(&self) -> impl Iterator<Item = &Arc<dyn Capability>> {
        iter::once(&self.base).chain(self.capabilities.iter())
    }

    /// Check caller input against every layer, stopping at the first error.
    ///
    /// Read-only properties are rejected before any layer runs. Keys that
    /// match no property are ignored.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] raised.
    pub fn validate(&self, input: &StateMap) -> Result<(), ValidationError> {
        if let Some(property) = input.keys().find(|key| {
            self.schema
                .get(key)
                .is_some_and(|descriptor| descriptor.immutable)
        }) {
            return Err(ValidationError::Immutable {
                property: property.clone(),
            });
        }
        self.layers()
            .try_for_each(|layer| layer.validate(&self.state, input))
    }

    /// Turn validated input into the desired-state delta.
    #[must_use]
    pub fn transform(&self, input: &StateMap) -> StateMap {
        let mut output = StateMap::new();
        for layer in self.layers() {
            layer.transform(&self.state, input, &mut output);
        }
        output
    }

    /// Encode a desired-state delta as a vendor command.
    #[must_use]
    pub fn prepare_command(&self, delta: &StateMap) -> StateMap {
        let mut command = StateMap::new();
        for layer in self.layers() {
            layer.prepare_command(delta, &mut command);
        }
        command
    }

    /// Merge a vendor payload into local state, base shape first.
    pub fn apply_remote_state(&mut self, payload: &StateMap) {
        let mut state = std::mem::take(&mut self.state);
        for layer in self.layers() {
            layer.apply_remote_state(&mut state, payload);
        }
        state.retain(|key, _| self.schema.contains(key));
        self.state = state;
    }

    /// Overwrite property values by name.
    ///
    /// Used for state that already speaks the device's property names, such
    /// as a state provider's answer or the values carried over when a device
    /// is rebuilt from a newer header. Keys the schema does not describe are
    /// ignored.
    pub fn merge_state(&mut self, values: &StateMap) {
        for (key, value) in values {
            if let Some(slot) = self.state.get_mut(key) {
                *slot = value.clone();
            }
        }
    }

    /// Serialised form, also used as the store snapshot.
    #[must_use]
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

impl Serialize for Device {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(5 + self.state.len()))?;
        map.serialize_entry("identifier", &self.header.identifier)?;
        map.serialize_entry("name", &self.header.name)?;
        map.serialize_entry("type", &self.header.device_type)?;
        map.serialize_entry("controllerName", &self.header.controller_name)?;
        map.serialize_entry("availableProperties", &self.schema)?;
        for key in self.schema.keys() {
            map.serialize_entry(key, self.state.get(key).unwrap_or(&Value::Null))?;
        }
        map.end()
    }
}

/// Step-by-step builder for [`Device`].
#[derive(Debug)]
pub struct DeviceBuilder {
    header: DeviceHeader,
    base: Arc<dyn Capability>,
    capabilities: Vec<Arc<dyn Capability>>,
}

impl DeviceBuilder {
    /// Attach a capability after those already attached.
    ///
    /// # Errors
    ///
    /// Returns [`CompositionError::DuplicateCapability`] if a layer with the
    /// same name is already part of the device.
    pub fn attach(&mut self, capability: Arc<dyn Capability>) -> Result<(), CompositionError> {
        let name = capability.name();
        let attached = iter::once(&self.base)
            .chain(self.capabilities.iter())
            .any(|layer| layer.name() == name);
        if attached {
            return Err(CompositionError::DuplicateCapability {
                device: self.header.identifier.clone(),
                capability: name,
            });
        }
        self.capabilities.push(capability);
        Ok(())
    }

    /// Chaining form of [`attach`](Self::attach).
    ///
    /// # Errors
    ///
    /// See [`attach`](Self::attach).
    pub fn with(mut self, capability: Arc<dyn Capability>) -> Result<Self, CompositionError> {
        self.attach(capability)?;
        Ok(self)
    }

    /// Assemble the property schema and an all-`null` state.
    #[must_use]
    pub fn build(self) -> Device {
        let schema = iter::once(&self.base)
            .chain(self.capabilities.iter())
            .fold(PropertySchema::new(), |schema, layer| {
                layer.describe_properties(schema)
            });
        let state = schema
            .keys()
            .map(|key| (key.to_string(), Value::Null))
            .collect();
        Device {
            header: self.header,
            base: self.base,
            capabilities: self.capabilities,
            schema,
            state,
        }
    }
}
