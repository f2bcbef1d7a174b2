//! Typed handlers and their type-erased adapter.
//!
//! `Handler<E>` is what application code implements; `TypedHandler<E, H>`
//! decodes the raw `Event` payload and turns it into an `EventHandler` the
//! dispatcher can store next to untyped handlers.

use std::marker::PhantomData;

use super::event::DomainEvent;
use crate::domain::{Event, HandlerError};
use crate::ports::EventHandler;

/// Handles one decoded domain event type.
pub trait Handler<E: DomainEvent>: Send + Sync {
    fn handle(&self, event: E) -> Result<(), HandlerError>;
}

pub struct TypedHandler<E: DomainEvent, H: Handler<E>> {
    handler: H,
    name: String,
    _marker: PhantomData<fn() -> E>,
}

impl<E: DomainEvent, H: Handler<E>> TypedHandler<E, H> {
    pub fn new(handler: H) -> Self {
        Self {
            handler,
            name: std::any::type_name::<H>().to_string(),
            _marker: PhantomData,
        }
    }

    pub fn inner(&self) -> &H {
        &self.handler
    }
}

impl<E: DomainEvent, H: Handler<E>> EventHandler for TypedHandler<E, H> {
    fn handle(&self, event: &Event) -> Result<(), HandlerError> {
        let decoded: E = event.decode().map_err(|e| {
            HandlerError::with_source(format!("decode payload for event_type={}", E::TYPE), e)
        })?;
        self.handler.handle(decoded)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
