//! Property descriptors advertised by a device.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Value shape of a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyKind {
    Bool,
    Int,
    Float,
    /// Hue / saturation pair.
    Color,
    /// `#RRGGBB` string.
    Rgb,
}

/// How a numeric property moves between its bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interpolation {
    Continuous,
    Discrete,
}

/// Describes one settable (or read-only) property of a device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDescriptor {
    #[serde(rename = "type")]
    pub kind: PropertyKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interpolation: Option<Interpolation>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub immutable: bool,
}

impl PropertyDescriptor {
    fn of(kind: PropertyKind) -> Self {
        Self {
            kind,
            min: None,
            max: None,
            interpolation: None,
            immutable: false,
        }
    }

    #[must_use]
    pub fn bool() -> Self {
        Self::of(PropertyKind::Bool)
    }

    #[must_use]
    pub fn color() -> Self {
        Self::of(PropertyKind::Color)
    }

    #[must_use]
    pub fn rgb() -> Self {
        Self::of(PropertyKind::Rgb)
    }

    #[must_use]
    pub fn float() -> Self {
        Self::of(PropertyKind::Float)
    }

    /// An integer property bounded by `min..=max`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn int_range(min: i64, max: i64, interpolation: Interpolation) -> Self {
        Self {
            min: Some(min as f64),
            max: Some(max as f64),
            interpolation: Some(interpolation),
            ..Self::of(PropertyKind::Int)
        }
    }

    /// Mark the property as read-only for callers.
    #[must_use]
    pub fn immutable(mut self) -> Self {
        self.immutable = true;
        self
    }
}

/// Ordered union of a device's property descriptors.
///
/// Keys keep the order in which the base shape and capabilities added them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertySchema(IndexMap<String, PropertyDescriptor>);

impl PropertySchema {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a descriptor, returning the schema for chaining.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, descriptor: PropertyDescriptor) -> Self {
        self.0.insert(key.into(), descriptor);
        self
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&PropertyDescriptor> {
        self.0.get(key)
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Property keys in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyDescriptor)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
