//! Target-side event routing.
//!
//! Each structural decode binds fresh closures into the event slots of every
//! interactive node. The closures remember the router generation they were bound
//! under; [`EventRouter::rebind`] advances the generation before the next decode, which
//! turns every closure of the superseded tree inert.

extern crate alloc;

use alloc::rc::Rc;
use core::{cell::Cell, fmt};

use tracing::{debug, warn};
use waterbridge_core::{EventEnvelope, EventSink, EventValue, NodeType};

type SlotFn = Rc<dyn Fn(Option<String>) -> bool>;

/// Named event slots of one node.
#[derive(Clone, Default)]
pub struct EventSlots {
    slots: Vec<(&'static str, SlotFn)>,
}

impl EventSlots {
    /// Fires the named slot with an optional string payload.
    ///
    /// Returns `true` when an envelope was put on the event channel. Unknown slot names,
    /// stale slots and a disconnected channel all return `false`.
    pub fn fire(&self, name: &str, value: Option<String>) -> bool {
        self.slots
            .iter()
            .find(|(slot, _)| *slot == name)
            .is_some_and(|(_, handler)| handler(value))
    }

    /// Fires the named slot, encoding `value` with its [`EventValue`] adapter.
    pub fn fire_value<V: EventValue>(&self, name: &str, value: &V) -> bool {
        self.fire(name, Some(value.to_event_value()))
    }

    /// Returns `true` if a slot with this name is bound.
    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.slots.iter().any(|(slot, _)| *slot == name)
    }

    /// Names of the bound slots.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.slots.iter().map(|(name, _)| *name)
    }

    /// Returns `true` if no slot is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl fmt::Debug for EventSlots {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// Binds event slots to the outbound event channel.
#[derive(Debug, Clone)]
pub struct EventRouter {
    sink: EventSink,
    generation: Rc<Cell<u64>>,
}

impl EventRouter {
    /// Creates a router emitting into `sink`.
    #[must_use]
    pub fn new(sink: EventSink) -> Self {
        Self {
            sink,
            generation: Rc::new(Cell::new(0)),
        }
    }

    /// Current binding generation.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation.get()
    }

    /// Invalidates every slot bound so far and returns the new generation.
    pub fn rebind(&self) -> u64 {
        let next = self.generation.get() + 1;
        self.generation.set(next);
        debug!(generation = next, "event slots rebound");
        next
    }

    /// Binds the named slots for one node under the current generation.
    #[must_use]
    pub fn slots_for(&self, id: &str, node_type: &NodeType, names: &'static [&'static str]) -> EventSlots {
        let slots = names
            .iter()
            .map(|&name| (name, self.bind(id, node_type, name)))
            .collect();
        EventSlots { slots }
    }

    fn bind(&self, id: &str, node_type: &NodeType, name: &'static str) -> SlotFn {
        let bound = self.generation.get();
        let current = Rc::clone(&self.generation);
        let sink = self.sink.clone();
        let id = id.to_owned();
        let node_type = node_type.clone();
        Rc::new(move |value: Option<String>| {
            if current.get() != bound {
                debug!(id = %id, event = name, generation = bound, "ignoring event from superseded tree");
                return false;
            }
            let envelope = EventEnvelope {
                name: name.to_owned(),
                node_type: node_type.clone(),
                id: id.clone(),
                value,
            };
            match sink.emit(envelope) {
                Ok(()) => true,
                Err(err) => {
                    warn!(id = %id, event = name, "event dropped: {err}");
                    false
                }
            }
        })
    }
}
