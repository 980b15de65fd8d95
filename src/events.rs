//! Host-side event handlers.

use std::collections::HashMap;

use tracing::trace;
use waterbridge_core::EventValue;

type Handler = Box<dyn FnMut(Option<&str>)>;

/// Outcome of [`EventRegistry::dispatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Dispatch {
    /// A handler ran.
    Handled,
    /// No handler is registered for the id and name. Expected when an event races an
    /// unmount.
    Missing,
}

/// Handlers keyed by node id and event name.
#[derive(Default)]
pub struct EventRegistry {
    handlers: HashMap<String, HashMap<String, Handler>>,
}

waterbridge_core::impl_debug!(EventRegistry);

impl EventRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for events named `name` on node `id`, replacing any earlier
    /// handler for the pair. Returns `true` if one was replaced.
    pub fn register_handler(
        &mut self,
        id: impl Into<String>,
        name: impl Into<String>,
        handler: impl FnMut(Option<&str>) + 'static,
    ) -> bool {
        self.handlers
            .entry(id.into())
            .or_default()
            .insert(name.into(), Box::new(handler))
            .is_some()
    }

    /// Registers a handler that receives the value decoded by its [`EventValue`]
    /// adapter. Events whose value is absent or does not decode are ignored.
    pub fn register_typed<V: EventValue + 'static>(
        &mut self,
        id: impl Into<String>,
        name: impl Into<String>,
        mut handler: impl FnMut(V) + 'static,
    ) -> bool {
        self.register_handler(id, name, move |value| {
            match value.and_then(V::from_event_value) {
                Some(value) => handler(value),
                None => trace!(value = ?value, "event value did not decode"),
            }
        })
    }

    /// Invokes the handler for `(id, name)`, if any.
    pub fn dispatch(&mut self, id: &str, name: &str, value: Option<&str>) -> Dispatch {
        match self
            .handlers
            .get_mut(id)
            .and_then(|handlers| handlers.get_mut(name))
        {
            Some(handler) => {
                handler(value);
                Dispatch::Handled
            }
            None => {
                trace!(id = %id, event = %name, "no handler registered");
                Dispatch::Missing
            }
        }
    }

    /// Removes every handler of node `id`, returning how many were removed.
    pub fn remove_node(&mut self, id: &str) -> usize {
        self.handlers.remove(id).map_or(0, |handlers| handlers.len())
    }

    /// Removes one handler. Returns `true` if it existed.
    pub fn remove_handler(&mut self, id: &str, name: &str) -> bool {
        let Some(handlers) = self.handlers.get_mut(id) else {
            return false;
        };
        let removed = handlers.remove(name).is_some();
        if handlers.is_empty() {
            self.handlers.remove(id);
        }
        removed
    }

    /// Total number of registered handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.values().map(HashMap::len).sum()
    }

    /// Returns `true` if no handler is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Drops every handler.
    pub fn clear(&mut self) {
        self.handlers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{cell::RefCell, rc::Rc};

    #[test]
    fn registration_overwrites() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut registry = EventRegistry::new();
        let first = Rc::clone(&calls);
        assert!(!registry.register_handler("b", "change", move |_| first.borrow_mut().push("first")));
        let second = Rc::clone(&calls);
        assert!(registry.register_handler("b", "change", move |_| second.borrow_mut().push("second")));

        assert_eq!(registry.dispatch("b", "change", None), Dispatch::Handled);
        assert_eq!(*calls.borrow(), ["second"]);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn missing_handlers_are_no_ops() {
        let mut registry = EventRegistry::new();
        assert_eq!(registry.dispatch("gone", "press", None), Dispatch::Missing);
    }

    #[test]
    fn typed_handlers_decode_values() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let mut registry = EventRegistry::new();
        registry.register_typed("s", "change", move |value: f64| sink.borrow_mut().push(value));

        let _ = registry.dispatch("s", "change", Some("0.5"));
        let _ = registry.dispatch("s", "change", Some("loud"));
        assert_eq!(*seen.borrow(), [0.5]);
    }

    #[test]
    fn removal_by_node_and_by_name() {
        let mut registry = EventRegistry::new();
        registry.register_handler("b", "change", |_| {});
        registry.register_handler("b", "focus", |_| {});
        registry.register_handler("c", "press", |_| {});

        assert!(registry.remove_handler("c", "press"));
        assert!(!registry.remove_handler("c", "press"));
        assert_eq!(registry.remove_node("b"), 2);
        assert!(registry.is_empty());
    }
}
