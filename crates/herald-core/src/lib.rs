//! herald-core
//!
//! In-process event dispatch: handlers subscribe to event types and
//! `notify` fans one event out to them synchronously, in registration order.
//!
//! # Modules
//! - **domain**: `Event`, `EventType`, `EventId`, errors
//! - **ports**: `EventHandler` capability, `Clock`
//! - **dispatch**: `HandlerRegistry`, `EventDispatcher`, `DispatcherBuilder`
//! - **typed**: `DomainEvent` / `Handler<E>` on top of the raw event API

pub mod dispatch;
pub mod domain;
pub mod ports;
pub mod typed;

pub use dispatch::{BuildError, DispatcherBuilder, EventDispatcher};
pub use domain::{Event, EventError, EventType, HandlerError};
pub use ports::{EventHandler, HandlerRef};
