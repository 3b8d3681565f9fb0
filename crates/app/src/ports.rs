//! Port definitions: traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside world.
//! They are defined here (in `app`) so that both the use-case layer and the
//! adapter layer can depend on them without creating circular dependencies.

pub mod controller;
pub mod event_bus;
pub mod registry;
pub mod state_provider;
pub mod vendor;

pub use controller::DependentController;
pub use event_bus::EventPublisher;
pub use registry::DeviceRegistry;
pub use state_provider::StateProvider;
pub use vendor::{VendorAdapter, VendorPayload};
