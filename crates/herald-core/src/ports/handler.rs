//! EventHandler port - the capability every subscriber implements.

use std::sync::Arc;

use crate::domain::{Event, HandlerError};

/// A unit of side-effecting logic run for an event.
///
/// Handlers run synchronously on the thread that called `notify` and receive
/// the same `&Event` as every other handler for that call.
///
/// # Example
/// ```ignore
/// struct AuditLog;
///
/// impl EventHandler for AuditLog {
///     fn handle(&self, event: &Event) -> Result<(), HandlerError> {
///         println!("{} at {}", event.event_type(), event.occurred_at());
///         Ok(())
///     }
/// }
/// ```
pub trait EventHandler: Send + Sync {
    fn handle(&self, event: &Event) -> Result<(), HandlerError>;

    /// Label used in logs and in `DispatchFailures`.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Shared reference to a registered handler.
///
/// The dispatcher stores clones of this `Arc`; the caller keeps its own clone
/// to `unregister` later.
pub type HandlerRef = Arc<dyn EventHandler>;

/// Whether two references point at the same handler instance.
///
/// Only the data pointer is compared. Two distinct instances that are equal
/// by value are different handlers.
pub fn same_handler(a: &HandlerRef, b: &HandlerRef) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

/// Adapts a closure into an `EventHandler`.
pub struct FnHandler<F> {
    name: String,
    f: F,
}

impl<F> FnHandler<F>
where
    F: Fn(&Event) -> Result<(), HandlerError> + Send + Sync,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

impl<F> EventHandler for FnHandler<F>
where
    F: Fn(&Event) -> Result<(), HandlerError> + Send + Sync,
{
    fn handle(&self, event: &Event) -> Result<(), HandlerError> {
        (self.f)(event)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
