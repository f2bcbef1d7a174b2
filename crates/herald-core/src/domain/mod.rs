//! Domain model: event types, identifiers, the event value and its errors.

pub mod errors;
pub mod event;
pub mod event_type;
pub mod ids;

pub use self::errors::{DispatchFailures, EventError, HandlerError, HandlerFailure};
pub use self::event::{Event, EventFactory};
pub use self::event_type::EventType;
pub use self::ids::EventId;
