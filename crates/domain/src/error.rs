//! Common error types used across the workspace.
//!
//! Each failure class has its own typed error; [`ControlError`] gathers them
//! with `#[from]` conversions so use-cases can propagate with `?`.

use std::time::Duration;

use serde_json::Value;

/// Top-level error for every controller use-case.
#[derive(Debug, thiserror::Error)]
pub enum ControlError {
    /// Caller input violates a property constraint.
    #[error("validation error")]
    Validation(#[from] ValidationError),

    /// Unknown device identifier.
    #[error("not found")]
    NotFound(#[from] NotFoundError),

    /// A vendor adapter call failed or timed out.
    #[error("vendor error")]
    Vendor(#[from] VendorError),

    /// The registry or another controller could not be reached.
    #[error("remote service error")]
    Remote(#[from] RemoteError),

    /// One or more dependency cascades failed.
    #[error("dependency cascade failed")]
    Cascade(#[from] CascadeError),

    /// A device with the same identifier is already stored.
    #[error("duplicate identifier")]
    DuplicateIdentifier(#[from] DuplicateIdentifierError),

    /// A device could not be assembled from its capabilities.
    #[error("composition error")]
    Composition(#[from] CompositionError),
}

/// Caller input rejected by a property constraint.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("invalid value for '{property}': expected {expected}")]
    InvalidType {
        property: String,
        expected: &'static str,
        value: Value,
    },

    #[error("invalid {property} '{value}': must be between {min} and {max}")]
    OutOfRange {
        property: String,
        value: Value,
        min: f64,
        max: f64,
    },

    #[error("invalid {property} '{value}': {reason}")]
    Malformed {
        property: String,
        value: Value,
        reason: &'static str,
    },

    #[error("property '{property}' is read-only")]
    Immutable { property: String },

    #[error("cannot set brightness to zero while light is off")]
    BrightnessZeroWhileOff,
}

impl ValidationError {
    /// Name of the property the error refers to.
    #[must_use]
    pub fn property(&self) -> &str {
        match self {
            Self::InvalidType { property, .. }
            | Self::OutOfRange { property, .. }
            | Self::Malformed { property, .. }
            | Self::Immutable { property } => property,
            Self::BrightnessZeroWhileOff => "brightness",
        }
    }

    /// The offending value, when one was supplied.
    #[must_use]
    pub fn value(&self) -> Option<&Value> {
        match self {
            Self::InvalidType { value, .. }
            | Self::OutOfRange { value, .. }
            | Self::Malformed { value, .. } => Some(value),
            Self::Immutable { .. } | Self::BrightnessZeroWhileOff => None,
        }
    }
}

/// Requested resource does not exist.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{entity} '{id}' not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

/// Failure talking to vendor hardware.
#[derive(Debug, thiserror::Error)]
pub enum VendorError {
    #[error("vendor call timed out after {0:?}")]
    Timeout(Duration),

    #[error("vendor rejected the request: {0}")]
    Rejected(String),

    #[error("device attributes are missing '{0}'")]
    MissingAttribute(&'static str),

    #[error("vendor transport failure")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Failure talking to another service (registry or a dependent controller).
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("request to {target} timed out")]
    Timeout { target: String },

    #[error("request to {target} failed with status {status}: {message}")]
    Status {
        target: String,
        status: u16,
        message: String,
    },

    #[error("request to {target} failed")]
    Transport {
        target: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("invalid response from {target}")]
    Decode {
        target: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// A single dependency rule that could not be applied.
#[derive(Debug, thiserror::Error)]
#[error("failed to set {remote_property} on '{remote_device}'")]
pub struct RuleFailure {
    pub remote_device: String,
    pub remote_property: String,
    #[source]
    pub source: RemoteError,
}

/// Aggregate failure of a dependency cascade.
///
/// Patches that succeeded before or alongside the failures are not undone.
#[derive(Debug, thiserror::Error)]
#[error("{} of {attempted} dependency update(s) failed", failures.len())]
pub struct CascadeError {
    pub attempted: usize,
    pub failures: Vec<RuleFailure>,
}

/// Insert-only store operation hit an existing identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("device '{identifier}' already exists")]
pub struct DuplicateIdentifierError {
    pub identifier: String,
}

/// Device assembly failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompositionError {
    #[error("capability '{capability}' is already attached to '{device}'")]
    DuplicateCapability {
        device: String,
        capability: &'static str,
    },
}
