//! Hue / saturation colour.

use serde_json::{Value, json};

use super::{Capability, StateMap, imply_power_on, require_int_in};
use crate::error::ValidationError;
use crate::property::{PropertyDescriptor, PropertySchema};

pub const NAME: &str = "color";

const HUE_MAX: i64 = 65_536;
const SATURATION_MAX: i64 = 254;

#[derive(Debug, Clone, Copy, Default)]
pub struct Color;

impl Capability for Color {
    fn name(&self) -> &'static str {
        NAME
    }

    fn validate(&self, _current: &StateMap, input: &StateMap) -> Result<(), ValidationError> {
        let Some(value) = input.get("color") else {
            return Ok(());
        };
        let components = value.as_object().ok_or_else(|| ValidationError::InvalidType {
            property: "color".to_string(),
            expected: "object with hue and saturation",
            value: value.clone(),
        })?;
        let hue = components.get("hue").unwrap_or(&Value::Null);
        require_int_in("color.hue", hue, 0, HUE_MAX)?;
        let saturation = components.get("saturation").unwrap_or(&Value::Null);
        require_int_in("color.saturation", saturation, 0, SATURATION_MAX)?;
        Ok(())
    }

    fn transform(&self, _current: &StateMap, input: &StateMap, output: &mut StateMap) {
        let Some((hue, saturation)) = input.get("color").and_then(read_components) else {
            return;
        };
        output.insert(
            "color".to_string(),
            json!({ "hue": hue, "saturation": saturation }),
        );
        imply_power_on(output);
    }

    fn describe_properties(&self, schema: PropertySchema) -> PropertySchema {
        schema.with("color", PropertyDescriptor::color())
    }

    fn apply_remote_state(&self, state: &mut StateMap, payload: &StateMap) {
        let hue = payload.get("hue").and_then(Value::as_i64);
        let saturation = payload.get("saturation").and_then(Value::as_i64);
        if let (Some(hue), Some(saturation)) = (hue, saturation) {
            state.insert(
                "color".to_string(),
                json!({ "hue": hue, "saturation": saturation }),
            );
        }
    }

    fn prepare_command(&self, delta: &StateMap, command: &mut StateMap) {
        if let Some((hue, saturation)) = delta.get("color").and_then(read_components) {
            command.insert("hue".to_string(), Value::from(hue));
            command.insert("saturation".to_string(), Value::from(saturation));
        }
    }
}

fn read_components(value: &Value) -> Option<(i64, i64)> {
    let hue = value.get("hue")?.as_i64()?;
    let saturation = value.get("saturation")?.as_i64()?;
    Some((hue, saturation))
}
