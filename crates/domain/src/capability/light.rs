//! Dimmable light base shape: `power` and `brightness`.

use serde_json::Value;

use super::{Capability, StateMap, require_bool, require_int_in};
use crate::error::ValidationError;
use crate::property::{Interpolation, PropertyDescriptor, PropertySchema};

const BRIGHTNESS_MAX: i64 = 254;

#[derive(Debug, Clone, Copy, Default)]
pub struct Light;

impl Capability for Light {
    fn name(&self) -> &'static str {
        "light"
    }

    fn validate(&self, current: &StateMap, input: &StateMap) -> Result<(), ValidationError> {
        if let Some(power) = input.get("power") {
            require_bool("power", power)?;
        }
        if let Some(value) = input.get("brightness") {
            let brightness = require_int_in("brightness", value, 0, BRIGHTNESS_MAX)?;
            if brightness == 0 && current.get("power") != Some(&Value::Bool(true)) {
                return Err(ValidationError::BrightnessZeroWhileOff);
            }
        }
        Ok(())
    }

    fn transform(&self, _current: &StateMap, input: &StateMap, output: &mut StateMap) {
        if let Some(power) = input.get("power").and_then(Value::as_bool) {
            output.insert("power".to_string(), Value::Bool(power));
        }
        if let Some(brightness) = input.get("brightness").and_then(Value::as_i64) {
            output.insert("brightness".to_string(), Value::from(brightness));
            output.insert("power".to_string(), Value::Bool(brightness > 0));
        }
    }

    fn describe_properties(&self, schema: PropertySchema) -> PropertySchema {
        schema.with("power", PropertyDescriptor::bool()).with(
            "brightness",
            PropertyDescriptor::int_range(0, BRIGHTNESS_MAX, Interpolation::Continuous),
        )
    }

    fn apply_remote_state(&self, state: &mut StateMap, payload: &StateMap) {
        if let Some(on) = payload.get("on").and_then(Value::as_bool) {
            state.insert("power".to_string(), Value::Bool(on));
        }
        if let Some(brightness) = payload.get("brightness").and_then(Value::as_i64) {
            state.insert("brightness".to_string(), Value::from(brightness));
        }
    }

    fn prepare_command(&self, delta: &StateMap, command: &mut StateMap) {
        if let Some(power) = delta.get("power") {
            command.insert("on".to_string(), power.clone());
        }
        if let Some(brightness) = delta.get("brightness") {
            command.insert("brightness".to_string(), brightness.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> StateMap {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn should_reject_zero_brightness_when_light_is_off() {
        let current = map(json!({ "power": false, "brightness": 100 }));
        let input = map(json!({ "brightness": 0 }));
        assert_eq!(
            Light.validate(&current, &input),
            Err(ValidationError::BrightnessZeroWhileOff)
        );
    }

    #[test]
    fn should_reject_zero_brightness_when_power_is_unknown() {
        let current = map(json!({ "power": null, "brightness": null }));
        let input = map(json!({ "brightness": 0 }));
        assert!(Light.validate(&current, &input).is_err());
    }

    #[test]
    fn should_accept_zero_brightness_when_light_is_on() {
        let current = map(json!({ "power": true }));
        let input = map(json!({ "brightness": 0 }));
        assert!(Light.validate(&current, &input).is_ok());
    }

    #[test]
    fn should_reject_brightness_above_max() {
        let input = map(json!({ "brightness": 255 }));
        let err = Light.validate(&StateMap::new(), &input).unwrap_err();
        assert!(matches!(err, ValidationError::OutOfRange { .. }));
    }

    #[test]
    fn should_reject_non_boolean_power() {
        let input = map(json!({ "power": "on" }));
        let err = Light.validate(&StateMap::new(), &input).unwrap_err();
        assert_eq!(err.property(), "power");
    }

    #[test]
    fn should_imply_power_from_brightness() {
        let mut output = StateMap::new();
        Light.transform(&StateMap::new(), &map(json!({ "brightness": 80 })), &mut output);
        assert_eq!(Value::Object(output), json!({ "brightness": 80, "power": true }));

        let mut output = StateMap::new();
        Light.transform(
            &StateMap::new(),
            &map(json!({ "power": true, "brightness": 0 })),
            &mut output,
        );
        assert_eq!(Value::Object(output), json!({ "brightness": 0, "power": false }));
    }

    #[test]
    fn should_map_power_to_on_in_command() {
        let mut command = StateMap::new();
        Light.prepare_command(&map(json!({ "power": true, "brightness": 12 })), &mut command);
        assert_eq!(Value::Object(command), json!({ "on": true, "brightness": 12 }));
    }

    #[test]
    fn should_read_on_and_brightness_from_vendor() {
        let mut state = map(json!({ "power": null, "brightness": 3 }));
        Light.apply_remote_state(&mut state, &map(json!({ "on": true, "brightness": "bad" })));
        assert_eq!(Value::Object(state), json!({ "power": true, "brightness": 3 }));
    }
}
