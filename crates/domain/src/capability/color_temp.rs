//! White colour temperature, exposed in Kelvin and sent to hardware in Mirek.

use serde_json::Value;

use super::{Capability, StateMap, imply_power_on, require_int_in};
use crate::conversion::{kelvin_to_mirek, mirek_to_kelvin};
use crate::error::ValidationError;
use crate::property::{Interpolation, PropertyDescriptor, PropertySchema};

pub const NAME: &str = "color-temp";

const PROPERTY: &str = "colorTemp";
const KELVIN_MIN: u32 = 2000;
const KELVIN_MAX: u32 = 6536;

#[derive(Debug, Clone, Copy, Default)]
pub struct ColorTemp;

impl Capability for ColorTemp {
    fn name(&self) -> &'static str {
        NAME
    }

    fn validate(&self, _current: &StateMap, input: &StateMap) -> Result<(), ValidationError> {
        if let Some(value) = input.get(PROPERTY) {
            require_int_in(
                PROPERTY,
                value,
                i64::from(KELVIN_MIN),
                i64::from(KELVIN_MAX),
            )?;
        }
        Ok(())
    }

    fn transform(&self, _current: &StateMap, input: &StateMap, output: &mut StateMap) {
        if let Some(kelvin) = input.get(PROPERTY).and_then(Value::as_u64) {
            output.insert(PROPERTY.to_string(), Value::from(kelvin));
            imply_power_on(output);
        }
    }

    fn describe_properties(&self, schema: PropertySchema) -> PropertySchema {
        schema.with(
            PROPERTY,
            PropertyDescriptor::int_range(
                i64::from(KELVIN_MIN),
                i64::from(KELVIN_MAX),
                Interpolation::Continuous,
            ),
        )
    }

    fn apply_remote_state(&self, state: &mut StateMap, payload: &StateMap) {
        let kelvin = payload
            .get(PROPERTY)
            .and_then(Value::as_u64)
            .and_then(|mirek| u32::try_from(mirek).ok())
            .and_then(mirek_to_kelvin);
        if let Some(kelvin) = kelvin {
            state.insert(
                PROPERTY.to_string(),
                Value::from(kelvin.clamp(KELVIN_MIN, KELVIN_MAX)),
            );
        }
    }

    fn prepare_command(&self, delta: &StateMap, command: &mut StateMap) {
        let mirek = delta
            .get(PROPERTY)
            .and_then(Value::as_u64)
            .and_then(|kelvin| u32::try_from(kelvin).ok())
            .and_then(kelvin_to_mirek);
        if let Some(mirek) = mirek {
            command.insert(PROPERTY.to_string(), Value::from(mirek));
        }
    }
}
