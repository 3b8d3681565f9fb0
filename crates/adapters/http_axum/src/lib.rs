//! # homectl-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve the controller's **JSON API**: `GET /devices`, `GET /device/{id}`
//!   and `PATCH /device/{id}`, plus `GET /health`
//! - Map HTTP requests into [`DeviceService`](homectl_app::services::DeviceService)
//!   calls (driving adapter)
//! - Map results and typed errors into `{"data": ...}` / `{"message": ...}`
//!   responses
//!
//! ## Dependency rule
//! Depends on `homectl-app` (for port traits and services) and `homectl-domain`
//! (for domain types used in request/response mapping). Never leaks axum types
//! into the domain.

pub mod api;
pub mod error;
pub mod router;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;
