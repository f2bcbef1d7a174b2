//! DispatcherBuilder - wiring handlers up front, with a start-up check.
//!
//! # Fail-fast wiring
//! - `expect_event_types()` lists the types the application relies on
//! - `build()` fails if any of them ended up with no handler

use std::sync::Arc;

use super::dispatcher::EventDispatcher;
use super::registry::HandlerRegistry;
use crate::domain::{EventError, EventType};
use crate::ports::HandlerRef;
use crate::typed::{DomainEvent, Handler, TypedHandler};

/// Builds an `EventDispatcher`.
///
/// # Example
/// ```ignore
/// let dispatcher = DispatcherBuilder::new()
///     .subscribe::<CustomerCreated, _>(SendWelcomeMail)?
///     .register(EventType::new("CustomerDeleted")?, audit.clone())
///     .expect_event_types(&["CustomerCreated", "CustomerDeleted"])
///     .build()?;
/// ```
#[derive(Default)]
pub struct DispatcherBuilder {
    registry: HandlerRegistry,
    expected: Option<Vec<String>>,
}

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("Missing event types: {0:?}. These event types were expected but have no handler.")]
    MissingEventTypes(Vec<String>),
}

impl DispatcherBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, event_type: EventType, handler: HandlerRef) -> Self {
        self.registry.register(event_type, handler);
        self
    }

    pub fn subscribe<E, H>(mut self, handler: H) -> Result<Self, EventError>
    where
        E: DomainEvent,
        H: Handler<E> + 'static,
    {
        let event_type = EventType::new(E::TYPE)?;
        self.registry
            .register(event_type, Arc::new(TypedHandler::<E, H>::new(handler)));
        Ok(self)
    }

    /// Event types that must have a handler by the time `build()` runs.
    pub fn expect_event_types(mut self, event_types: &[&str]) -> Self {
        self.expected = Some(event_types.iter().map(|t| t.to_string()).collect());
        self
    }

    pub fn build(self) -> Result<EventDispatcher, BuildError> {
        if let Some(expected) = &self.expected {
            let mut missing: Vec<String> = expected
                .iter()
                .filter(|t| self.registry.count_for(t) == 0)
                .cloned()
                .collect();
            if !missing.is_empty() {
                missing.sort();
                missing.dedup();
                return Err(BuildError::MissingEventTypes(missing));
            }
        }
        Ok(EventDispatcher::from_registry(self.registry))
    }
}
