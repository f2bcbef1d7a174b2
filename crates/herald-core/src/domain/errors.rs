//! Errors - event construction and handler failures.
//!
//! Registration itself never fails; the only runtime error the dispatcher
//! surfaces is a handler's own `HandlerError`.

use std::error::Error as StdError;

use thiserror::Error;

use super::EventType;

type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Errors raised while building an `EventType` or an `Event`.
#[derive(Debug, Error)]
pub enum EventError {
    #[error("event type must not be empty")]
    EmptyType,

    #[error("failed to encode event payload: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A failure reported by a handler.
///
/// `notify` hands this back exactly as the handler produced it.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct HandlerError {
    message: String,
    #[source]
    source: Option<BoxError>,
}

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// One handler that failed during `notify_isolated`.
#[derive(Debug, Error)]
#[error("handler {handler} failed: {error}")]
pub struct HandlerFailure {
    pub handler: String,
    #[source]
    pub error: HandlerError,
}

/// Every failure collected by `notify_isolated`, in invocation order.
#[derive(Debug, Error)]
#[error("{} handler(s) failed for event_type={event_type}", .failures.len())]
pub struct DispatchFailures {
    pub event_type: EventType,
    pub failures: Vec<HandlerFailure>,
}

impl DispatchFailures {
    pub fn len(&self) -> usize {
        self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn handlers(&self) -> impl Iterator<Item = &str> {
        self.failures.iter().map(|f| f.handler.as_str())
    }
}
