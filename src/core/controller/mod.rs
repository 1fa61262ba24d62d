pub mod generic_controller;
pub mod handler;
pub mod lifecycle;

pub use generic_controller::{GenericController, Starter};
pub use handler::{handler_fn, FeatureGate, HandlerFunc};
pub use lifecycle::{Lifecycle, LifecycleDelegate, ObjectLifecycleAdapter};
