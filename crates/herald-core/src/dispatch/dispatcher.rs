use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, trace};

use super::registry::HandlerRegistry;
use crate::domain::{DispatchFailures, Event, EventError, EventType, HandlerError, HandlerFailure};
use crate::ports::HandlerRef;
use crate::typed::{DomainEvent, Handler, TypedHandler};

/// Connects events to the handlers registered for their type.
///
/// `notify` runs every handler for the event's type on the caller's thread,
/// one after another, in registration order.
///
/// The registry sits behind a `RwLock`, so a dispatcher can be shared with
/// `Arc<EventDispatcher>`. `notify` copies the handler list and releases the
/// lock before running handlers: a handler may register or unregister on the
/// same dispatcher, and the change applies from the next `notify`. Handler
/// bodies get no extra synchronization.
#[derive(Default)]
pub struct EventDispatcher {
    registry: RwLock<HandlerRegistry>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self {
            registry: RwLock::new(HandlerRegistry::new()),
        }
    }

    pub(crate) fn from_registry(registry: HandlerRegistry) -> Self {
        Self {
            registry: RwLock::new(registry),
        }
    }

    /// Append `handler` to the list for `event_type`.
    pub fn register(&self, event_type: EventType, handler: HandlerRef) {
        debug!(event_type = %event_type, handler = handler.name(), "register");
        self.registry.write().register(event_type, handler);
    }

    /// Register a typed handler under `E::TYPE`.
    ///
    /// Returns the stored reference so the caller can `unregister` it later.
    pub fn subscribe<E, H>(&self, handler: H) -> Result<HandlerRef, EventError>
    where
        E: DomainEvent,
        H: Handler<E> + 'static,
    {
        let event_type = EventType::new(E::TYPE)?;
        let handler: HandlerRef = Arc::new(TypedHandler::<E, H>::new(handler));
        self.register(event_type, Arc::clone(&handler));
        Ok(handler)
    }

    /// Remove the first registration of this exact handler instance.
    ///
    /// Does nothing if the type or the handler is unknown.
    pub fn unregister(&self, event_type: &str, handler: &HandlerRef) {
        let removed = self.registry.write().unregister(event_type, handler);
        debug!(event_type, handler = handler.name(), removed, "unregister");
    }

    /// Drop every handler for every event type.
    pub fn unregister_all(&self) {
        self.registry.write().clear();
        debug!("unregister_all");
    }

    /// Drop every handler for one event type.
    pub fn unregister_type(&self, event_type: &str) {
        let removed = self.registry.write().clear_type(event_type);
        debug!(event_type, removed, "unregister_type");
    }

    /// Run every handler registered for `event.event_type()`.
    ///
    /// Stops at the first handler that fails and returns its error as is;
    /// the remaining handlers are not called. No handlers is not an error.
    pub fn notify(&self, event: &Event) -> Result<(), HandlerError> {
        let handlers = self.snapshot(event);
        for handler in &handlers {
            trace!(handler = handler.name(), "invoke");
            handler.handle(event)?;
        }
        Ok(())
    }

    /// Like `notify`, but keeps going after a failure.
    ///
    /// Every handler runs once; failures are returned together, in the order
    /// they happened.
    pub fn notify_isolated(&self, event: &Event) -> Result<(), DispatchFailures> {
        let handlers = self.snapshot(event);
        let mut failures = Vec::new();
        for handler in &handlers {
            trace!(handler = handler.name(), "invoke");
            if let Err(error) = handler.handle(event) {
                failures.push(HandlerFailure {
                    handler: handler.name().to_string(),
                    error,
                });
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(DispatchFailures {
                event_type: event.event_type().clone(),
                failures,
            })
        }
    }

    pub fn handler_count(&self, event_type: &str) -> usize {
        self.registry.read().count_for(event_type)
    }

    pub fn event_types(&self) -> Vec<EventType> {
        self.registry.read().event_types()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.read().is_empty()
    }

    fn snapshot(&self, event: &Event) -> Vec<HandlerRef> {
        let handlers = self
            .registry
            .read()
            .handlers_for(event.event_type().as_str())
            .to_vec();
        debug!(
            event_type = %event.event_type(),
            event_id = %event.id(),
            handlers = handlers.len(),
            "notify"
        );
        handlers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{EventHandler, FnHandler};
    use parking_lot::Mutex;
    use rstest::rstest;
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    type Log = Arc<Mutex<Vec<(String, usize)>>>;

    /// Records its label and the address of the event it received.
    struct Recorder {
        label: String,
        log: Log,
    }

    impl EventHandler for Recorder {
        fn handle(&self, event: &Event) -> Result<(), HandlerError> {
            let addr = event as *const Event as usize;
            self.log.lock().push((self.label.clone(), addr));
            Ok(())
        }

        fn name(&self) -> &str {
            &self.label
        }
    }

    struct Failing {
        label: String,
        log: Log,
    }

    impl EventHandler for Failing {
        fn handle(&self, event: &Event) -> Result<(), HandlerError> {
            let addr = event as *const Event as usize;
            self.log.lock().push((self.label.clone(), addr));
            Err(HandlerError::new(format!("{} failed", self.label)))
        }

        fn name(&self) -> &str {
            &self.label
        }
    }

    fn recorder(label: &str, log: &Log) -> HandlerRef {
        Arc::new(Recorder {
            label: label.to_string(),
            log: Arc::clone(log),
        })
    }

    fn failing(label: &str, log: &Log) -> HandlerRef {
        Arc::new(Failing {
            label: label.to_string(),
            log: Arc::clone(log),
        })
    }

    fn ty(s: &str) -> EventType {
        EventType::new(s).unwrap()
    }

    fn event(s: &str) -> Event {
        Event::new(ty(s), json!({}))
    }

    fn labels(log: &Log) -> Vec<String> {
        log.lock().iter().map(|(l, _)| l.clone()).collect()
    }

    #[rstest]
    #[case::one(1)]
    #[case::two(2)]
    #[case::five(5)]
    fn notify_runs_handlers_in_registration_order(#[case] n: usize) {
        let log: Log = Arc::default();
        let d = EventDispatcher::new();
        let expected: Vec<String> = (0..n).map(|i| format!("h{i}")).collect();
        for label in &expected {
            d.register(ty("T"), recorder(label, &log));
        }

        let e = event("T");
        d.notify(&e).unwrap();

        assert_eq!(labels(&log), expected);
        let addr = &e as *const Event as usize;
        assert!(log.lock().iter().all(|(_, a)| *a == addr));
    }

    #[test]
    fn notify_without_handlers_is_noop() {
        let log: Log = Arc::default();
        let d = EventDispatcher::new();
        d.register(ty("Other"), recorder("other", &log));

        d.notify(&event("Nobody")).unwrap();

        assert!(log.lock().is_empty());
    }

    #[test]
    fn notify_only_reaches_matching_type() {
        let log: Log = Arc::default();
        let d = EventDispatcher::new();
        d.register(ty("A"), recorder("a", &log));
        d.register(ty("B"), recorder("b", &log));

        d.notify(&event("B")).unwrap();

        assert_eq!(labels(&log), vec!["b"]);
    }

    #[test]
    fn unregistered_handler_is_not_called() {
        let log: Log = Arc::default();
        let d = EventDispatcher::new();
        let a = recorder("a", &log);
        let b = recorder("b", &log);
        d.register(ty("T"), a.clone());
        d.register(ty("T"), b.clone());

        d.unregister("T", &a);
        d.notify(&event("T")).unwrap();

        assert_eq!(labels(&log), vec!["b"]);
    }

    #[test]
    fn unregister_of_unknown_handler_leaves_others() {
        let log: Log = Arc::default();
        let d = EventDispatcher::new();
        let a = recorder("a", &log);
        let never = recorder("never", &log);
        d.register(ty("T"), a.clone());

        d.unregister("T", &never);
        d.unregister("Missing", &a);
        d.notify(&event("T")).unwrap();

        assert_eq!(labels(&log), vec!["a"]);
    }

    #[test]
    fn unregister_is_by_identity() {
        let log: Log = Arc::default();
        let d = EventDispatcher::new();
        let a = recorder("same", &log);
        let look_alike = recorder("same", &log);
        d.register(ty("T"), a.clone());

        d.unregister("T", &look_alike);

        assert_eq!(d.handler_count("T"), 1);
    }

    #[test]
    fn unregister_all_silences_every_type() {
        let log: Log = Arc::default();
        let d = EventDispatcher::new();
        d.register(ty("A"), recorder("a", &log));
        d.register(ty("B"), recorder("b", &log));

        d.unregister_all();
        d.notify(&event("A")).unwrap();
        d.notify(&event("B")).unwrap();

        assert!(log.lock().is_empty());
        assert!(d.is_empty());
    }

    #[test]
    fn unregister_type_keeps_other_types() {
        let log: Log = Arc::default();
        let d = EventDispatcher::new();
        d.register(ty("A"), recorder("a", &log));
        d.register(ty("B"), recorder("b", &log));

        d.unregister_type("A");
        d.notify(&event("A")).unwrap();
        d.notify(&event("B")).unwrap();

        assert_eq!(labels(&log), vec!["b"]);
        assert_eq!(d.event_types(), vec![ty("B")]);
    }

    #[test]
    fn same_handler_twice_runs_twice() {
        let log: Log = Arc::default();
        let d = EventDispatcher::new();
        let a = recorder("a", &log);
        d.register(ty("T"), a.clone());
        d.register(ty("T"), a.clone());

        d.notify(&event("T")).unwrap();

        assert_eq!(labels(&log), vec!["a", "a"]);

        // one unregister removes one of the two
        log.lock().clear();
        d.unregister("T", &a);
        d.notify(&event("T")).unwrap();
        assert_eq!(labels(&log), vec!["a"]);
    }

    // Fail-fast is the default contract but is inferred rather than confirmed
    // by the customer scenarios; this pins it down.
    #[test]
    fn notify_stops_at_first_failing_handler() {
        let log: Log = Arc::default();
        let d = EventDispatcher::new();
        d.register(ty("T"), recorder("first", &log));
        d.register(ty("T"), failing("broken", &log));
        d.register(ty("T"), recorder("never", &log));

        let err = d.notify(&event("T")).unwrap_err();

        assert_eq!(err.message(), "broken failed");
        assert_eq!(labels(&log), vec!["first", "broken"]);
    }

    #[test]
    fn notify_isolated_runs_everything_and_collects_failures() {
        let log: Log = Arc::default();
        let d = EventDispatcher::new();
        d.register(ty("T"), failing("x", &log));
        d.register(ty("T"), recorder("ok", &log));
        d.register(ty("T"), failing("y", &log));

        let failures = d.notify_isolated(&event("T")).unwrap_err();

        assert_eq!(labels(&log), vec!["x", "ok", "y"]);
        assert_eq!(failures.event_type, ty("T"));
        assert_eq!(failures.handlers().collect::<Vec<_>>(), vec!["x", "y"]);
        assert_eq!(failures.failures[1].error.message(), "y failed");
    }

    #[test]
    fn notify_isolated_ok_when_all_succeed() {
        let log: Log = Arc::default();
        let d = EventDispatcher::new();
        d.register(ty("T"), recorder("a", &log));
        assert!(d.notify_isolated(&event("T")).is_ok());
        assert!(d.notify_isolated(&event("Nobody")).is_ok());
    }

    #[test]
    fn handler_may_reenter_dispatcher() {
        let d = Arc::new(EventDispatcher::new());
        let log: Log = Arc::default();
        let late = recorder("late", &log);

        let d2 = Arc::clone(&d);
        let late2 = Arc::clone(&late);
        let hook = FnHandler::new("hook", move |_event: &Event| {
            d2.register(EventType::new("T").unwrap(), Arc::clone(&late2));
            Ok(())
        });
        d.register(ty("T"), Arc::new(hook));

        // first notify registers `late` but does not see it yet
        d.notify(&event("T")).unwrap();
        assert!(log.lock().is_empty());

        d.notify(&event("T")).unwrap();
        assert_eq!(labels(&log), vec!["late"]);
    }

    #[test]
    fn shared_across_threads() {
        let d = Arc::new(EventDispatcher::new());
        let log: Log = Arc::default();
        d.register(ty("T"), recorder("a", &log));

        let threads: Vec<_> = (0..4)
            .map(|_| {
                let d = Arc::clone(&d);
                std::thread::spawn(move || d.notify(&event("T")).unwrap())
            })
            .collect();
        for t in threads {
            t.join().unwrap();
        }

        assert_eq!(log.lock().len(), 4);
    }

    #[derive(Debug, Serialize, Deserialize)]
    struct Ping {
        n: u32,
    }

    impl DomainEvent for Ping {
        const TYPE: &'static str = "Ping";
    }

    struct SumPings(Arc<Mutex<u32>>);

    impl Handler<Ping> for SumPings {
        fn handle(&self, event: Ping) -> Result<(), HandlerError> {
            *self.0.lock() += event.n;
            Ok(())
        }
    }

    #[test]
    fn subscribe_registers_typed_handler() {
        let total = Arc::new(Mutex::new(0));
        let d = EventDispatcher::new();
        let handle = d.subscribe::<Ping, _>(SumPings(Arc::clone(&total))).unwrap();

        d.notify(&Event::from_domain(&Ping { n: 2 }).unwrap()).unwrap();
        d.notify(&Event::from_domain(&Ping { n: 3 }).unwrap()).unwrap();
        assert_eq!(*total.lock(), 5);

        d.unregister(Ping::TYPE, &handle);
        d.notify(&Event::from_domain(&Ping { n: 100 }).unwrap()).unwrap();
        assert_eq!(*total.lock(), 5);
    }
}
