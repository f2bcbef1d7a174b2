//! Dispatch - the registry and the notification engine.
//!
//! - **HandlerRegistry**: event_type -> ordered handler list
//! - **EventDispatcher**: locked registry + `notify`
//! - **DispatcherBuilder**: up-front wiring with a missing-handler check

pub mod builder;
pub mod dispatcher;
pub mod registry;

pub use self::builder::{BuildError, DispatcherBuilder};
pub use self::dispatcher::EventDispatcher;
pub use self::registry::HandlerRegistry;
