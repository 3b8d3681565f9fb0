//! # homectl-domain
//!
//! Pure domain model for the homectl device controllers.
//!
//! ## Responsibilities
//! - Foundational types: event identifiers and the error taxonomy
//! - Colour-space and unit **conversions** (RGB↔xy, Kelvin↔Mirek)
//! - **Property descriptors** advertising what a device can be set to
//! - **Capabilities**: pluggable units of validate / transform / describe /
//!   apply-remote-state behaviour, plus the base shapes every device starts from
//! - **Devices** composed from a base shape and an ordered list of capabilities
//! - **Device headers** and **dependency rules** as delivered by the registry
//! - **Events** describing store transitions (added / changed / removed)
//!
//! ## Dependency rule
//! This crate has **no internal dependencies** and performs no IO.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;

pub mod capability;
pub mod conversion;
pub mod device;
pub mod event;
pub mod header;
pub mod property;
