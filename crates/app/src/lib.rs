//! # homectl-app
//!
//! Application layer: use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `DeviceRegistry`: headers for this controller, lookups by identifier
//!   - `VendorAdapter`: read and write hardware state
//!   - `StateProvider`: state held by another service for devices that
//!     cannot report their own
//!   - `DependentController`: patch a device owned by another controller
//!   - `EventPublisher`: fire-and-forget notification of store transitions
//! - Own the in-memory **device store** and its diffing flush
//! - Drive the **reconciliation loop** (populate, pull, settle)
//! - Cascade commands through the **dependency propagator**
//! - Provide **in-process infrastructure** (event bus) that doesn't need IO
//!
//! ## Dependency rule
//! Depends on `homectl-domain` only (plus `tokio` for timers and channels).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod event_bus;
pub mod factory;
pub mod ports;
pub mod propagator;
pub mod reconciler;
pub mod services;
pub mod store;

#[cfg(test)]
pub(crate) mod testing;
