//! Smart plug base shape: a single `power` switch.

use serde_json::Value;

use super::{Capability, StateMap, require_bool};
use crate::error::ValidationError;
use crate::property::{PropertyDescriptor, PropertySchema};

#[derive(Debug, Clone, Copy, Default)]
pub struct Plug;

impl Capability for Plug {
    fn name(&self) -> &'static str {
        "plug"
    }

    fn validate(&self, _current: &StateMap, input: &StateMap) -> Result<(), ValidationError> {
        if let Some(power) = input.get("power") {
            require_bool("power", power)?;
        }
        Ok(())
    }

    fn transform(&self, _current: &StateMap, input: &StateMap, output: &mut StateMap) {
        if let Some(power) = input.get("power").and_then(Value::as_bool) {
            output.insert("power".to_string(), Value::Bool(power));
        }
    }

    fn describe_properties(&self, schema: PropertySchema) -> PropertySchema {
        schema.with("power", PropertyDescriptor::bool())
    }

    fn apply_remote_state(&self, state: &mut StateMap, payload: &StateMap) {
        if let Some(power) = payload.get("power").and_then(Value::as_bool) {
            state.insert("power".to_string(), Value::Bool(power));
        }
    }

    fn prepare_command(&self, delta: &StateMap, command: &mut StateMap) {
        if let Some(power) = delta.get("power") {
            command.insert("power".to_string(), power.clone());
        }
    }
}
