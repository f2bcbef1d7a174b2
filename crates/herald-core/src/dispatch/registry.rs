use std::collections::HashMap;

use crate::domain::EventType;
use crate::ports::{HandlerRef, same_handler};

/// Registry of handlers (event_type -> ordered handler list).
///
/// - Order within a type is registration order.
/// - No de-duplication: the same handler registered twice is stored twice.
/// - A type whose list becomes empty is dropped from the map.
///
/// Not synchronized on its own; `EventDispatcher` wraps it in a lock.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<EventType, Vec<HandlerRef>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Append `handler` to the list for `event_type`.
    pub fn register(&mut self, event_type: EventType, handler: HandlerRef) {
        self.handlers.entry(event_type).or_default().push(handler);
    }

    /// Remove the first registration of this exact handler instance.
    ///
    /// Returns whether something was removed. Unknown types and handlers are
    /// not an error.
    pub fn unregister(&mut self, event_type: &str, handler: &HandlerRef) -> bool {
        let Some(list) = self.handlers.get_mut(event_type) else {
            return false;
        };
        let Some(pos) = list.iter().position(|h| same_handler(h, handler)) else {
            return false;
        };
        list.remove(pos);
        if list.is_empty() {
            self.handlers.remove(event_type);
        }
        true
    }

    /// Drop every registration for one event type. Returns how many were dropped.
    pub fn clear_type(&mut self, event_type: &str) -> usize {
        self.handlers
            .remove(event_type)
            .map(|list| list.len())
            .unwrap_or(0)
    }

    pub fn clear(&mut self) {
        self.handlers.clear();
    }

    /// Handlers for `event_type`, in invocation order.
    pub fn handlers_for(&self, event_type: &str) -> &[HandlerRef] {
        self.handlers
            .get(event_type)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn count_for(&self, event_type: &str) -> usize {
        self.handlers_for(event_type).len()
    }

    /// Event types with at least one handler, sorted.
    pub fn event_types(&self) -> Vec<EventType> {
        let mut types: Vec<EventType> = self.handlers.keys().cloned().collect();
        types.sort();
        types
    }

    /// Total number of registrations across all types.
    pub fn len(&self) -> usize {
        self.handlers.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
