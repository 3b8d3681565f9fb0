//! `#RRGGBB` colour, sent to hardware as CIE xy.

use serde_json::{Value, json};

use super::{Capability, StateMap, imply_power_on};
use crate::conversion::{format_rgb_hex, parse_rgb_hex, rgb_hex_to_xy, xy_to_rgb_hex};
use crate::error::ValidationError;
use crate::property::{PropertyDescriptor, PropertySchema};

pub const NAME: &str = "rgb";

#[derive(Debug, Clone, Copy, Default)]
pub struct Rgb;

impl Capability for Rgb {
    fn name(&self) -> &'static str {
        NAME
    }

    fn validate(&self, _current: &StateMap, input: &StateMap) -> Result<(), ValidationError> {
        let Some(value) = input.get(NAME) else {
            return Ok(());
        };
        let hex = value.as_str().ok_or_else(|| ValidationError::InvalidType {
            property: NAME.to_string(),
            expected: "string",
            value: value.clone(),
        })?;
        if parse_rgb_hex(hex).is_none() {
            return Err(ValidationError::Malformed {
                property: NAME.to_string(),
                value: value.clone(),
                reason: "expected #RRGGBB",
            });
        }
        Ok(())
    }

    fn transform(&self, _current: &StateMap, input: &StateMap, output: &mut StateMap) {
        let channels = input
            .get(NAME)
            .and_then(Value::as_str)
            .and_then(parse_rgb_hex);
        if let Some(channels) = channels {
            output.insert(NAME.to_string(), Value::from(format_rgb_hex(channels)));
            imply_power_on(output);
        }
    }

    fn describe_properties(&self, schema: PropertySchema) -> PropertySchema {
        schema.with(NAME, PropertyDescriptor::rgb())
    }

    fn apply_remote_state(&self, state: &mut StateMap, payload: &StateMap) {
        let Some(xy) = payload.get("xy").and_then(Value::as_array) else {
            return;
        };
        if let [x, y] = xy.as_slice()
            && let (Some(x), Some(y)) = (x.as_f64(), y.as_f64())
        {
            state.insert(NAME.to_string(), Value::from(xy_to_rgb_hex(x, y)));
        }
    }

    fn prepare_command(&self, delta: &StateMap, command: &mut StateMap) {
        let xy = delta
            .get(NAME)
            .and_then(Value::as_str)
            .and_then(rgb_hex_to_xy);
        if let Some((x, y)) = xy {
            command.insert("xy".to_string(), json!([x, y]));
        }
    }
}
