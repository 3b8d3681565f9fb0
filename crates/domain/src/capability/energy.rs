//! Read-only power draw reported by metering plugs.

use serde_json::Value;

use super::{Capability, StateMap};
use crate::error::ValidationError;
use crate::property::{PropertyDescriptor, PropertySchema};

pub const NAME: &str = "energy";

const PROPERTY: &str = "watts";

#[derive(Debug, Clone, Copy, Default)]
pub struct Energy;

impl Capability for Energy {
    fn name(&self) -> &'static str {
        NAME
    }

    fn validate(&self, _current: &StateMap, input: &StateMap) -> Result<(), ValidationError> {
        if input.contains_key(PROPERTY) {
            return Err(ValidationError::Immutable {
                property: PROPERTY.to_string(),
            });
        }
        Ok(())
    }

    fn describe_properties(&self, schema: PropertySchema) -> PropertySchema {
        schema.with(PROPERTY, PropertyDescriptor::float().immutable())
    }

    fn apply_remote_state(&self, state: &mut StateMap, payload: &StateMap) {
        if let Some(watts) = payload.get(PROPERTY).and_then(Value::as_f64) {
            state.insert(PROPERTY.to_string(), Value::from(watts));
        }
    }
}
