//! # homectl-adapter-remote-reqwest
//!
//! Outbound HTTP adapter built on [reqwest](https://docs.rs/reqwest).
//!
//! ## Responsibilities
//! - Implement [`DeviceRegistry`](homectl_app::ports::DeviceRegistry) against
//!   the registry service behind the API gateway
//! - Implement [`DependentController`](homectl_app::ports::DependentController)
//!   by patching devices owned by other controllers through the same gateway
//! - Implement [`StateProvider`](homectl_app::ports::StateProvider) by asking
//!   provider services for the state they hold on a device's behalf
//! - Unwrap the `{"data": ...}` envelope and map HTTP failures to
//!   [`RemoteError`](homectl_domain::error::RemoteError)
//!
//! ## Dependency rule
//! Depends on `homectl-app` (port traits) and `homectl-domain` (headers and
//! errors). reqwest types never cross the port boundary.

mod client;
pub mod controller;
pub mod registry;
pub mod state_provider;

pub use client::{GatewayClient, GatewayConfig};
pub use controller::HttpDependentController;
pub use registry::HttpRegistry;
pub use state_provider::HttpStateProvider;
