//! Event - immutable record of something that happened in the domain.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use super::errors::EventError;
use super::{EventId, EventType};
use crate::ports::{Clock, SystemClock};
use crate::typed::DomainEvent;

/// An event type, the moment it occurred and an opaque payload.
///
/// Fields are private and there are no setters: once built, an `Event` is
/// only ever read. The payload schema belongs to whoever produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    id: EventId,
    event_type: EventType,
    occurred_at: DateTime<Utc>,
    data: serde_json::Value,
}

impl Event {
    /// Build an event stamped with the system clock.
    pub fn new(event_type: EventType, data: serde_json::Value) -> Self {
        EventFactory::new(SystemClock).create(event_type, data)
    }

    /// Encode a typed domain event. The event type is `E::TYPE`.
    pub fn from_domain<E: DomainEvent>(event: &E) -> Result<Self, EventError> {
        EventFactory::new(SystemClock).create_domain(event)
    }

    pub fn id(&self) -> EventId {
        self.id
    }

    pub fn event_type(&self) -> &EventType {
        &self.event_type
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    pub fn data(&self) -> &serde_json::Value {
        &self.data
    }

    /// Decode the payload into a concrete type.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        T::deserialize(&self.data)
    }
}

/// Creates events from an injected clock.
///
/// Both `occurred_at` and the timestamp half of the ULID come from the clock,
/// so events built from a `FixedClock` carry a predictable time.
pub struct EventFactory<C> {
    clock: C,
}

impl<C: Clock> EventFactory<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }

    pub fn create(&self, event_type: EventType, data: serde_json::Value) -> Event {
        let occurred_at = self.clock.now();
        let timestamp_ms = occurred_at.timestamp_millis().max(0) as u64;
        let id = EventId::from(Ulid::from_parts(timestamp_ms, rand::random()));
        Event {
            id,
            event_type,
            occurred_at,
            data,
        }
    }

    pub fn create_domain<E: DomainEvent>(&self, event: &E) -> Result<Event, EventError> {
        let event_type = EventType::new(E::TYPE)?;
        let data = serde_json::to_value(event)?;
        Ok(self.create(event_type, data))
    }
}
