//! Typed - payload types bound to their event type at compile time.
//!
//! Two layers:
//! - **typed**: `DomainEvent`, `Handler<E>` for application code.
//! - **dyn**: `TypedHandler<E, H>` erases `E` into an `EventHandler` so the
//!   dispatcher keeps a single `HandlerRef` list per event type.

pub mod event;
pub mod handler;

pub use self::event::DomainEvent;
pub use self::handler::{Handler, TypedHandler};
