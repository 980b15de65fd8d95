//! Observable props containers.
//!
//! Every decoded node owns one [`ObservableProps`]. Native views bind to it and
//! subscribe for changes; incremental patches mutate it field by field. The container
//! is reference-counted and never replaced between structural decodes, so whatever the
//! native side attached to it (focus, selection, animation state) survives a patch.

extern crate alloc;

use alloc::rc::{Rc, Weak};
use core::{
    cell::{Cell, RefCell},
    fmt,
};

use serde_json::{Map, Value};

type Listener = Rc<dyn Fn(&str, &Value)>;

struct PropsCell {
    fields: RefCell<Map<String, Value>>,
    listeners: RefCell<Vec<(u64, Listener)>>,
    next_listener: Cell<u64>,
}

/// A shared, observable map of prop fields.
///
/// Cloning yields another handle to the *same* container.
#[derive(Clone)]
pub struct ObservableProps {
    cell: Rc<PropsCell>,
}

impl ObservableProps {
    /// Creates a container holding the given fields.
    #[must_use]
    pub fn new(fields: Map<String, Value>) -> Self {
        Self {
            cell: Rc::new(PropsCell {
                fields: RefCell::new(fields),
                listeners: RefCell::new(Vec::new()),
                next_listener: Cell::new(0),
            }),
        }
    }

    /// Returns a copy of one field.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<Value> {
        self.cell.fields.borrow().get(field).cloned()
    }

    /// Returns one field as a string, if it is one.
    #[must_use]
    pub fn get_str(&self, field: &str) -> Option<String> {
        self.cell
            .fields
            .borrow()
            .get(field)
            .and_then(Value::as_str)
            .map(ToOwned::to_owned)
    }

    /// Returns one field as a number, if it is one.
    #[must_use]
    pub fn get_f64(&self, field: &str) -> Option<f64> {
        self.cell.fields.borrow().get(field).and_then(Value::as_f64)
    }

    /// Returns one field as a boolean, if it is one.
    #[must_use]
    pub fn get_bool(&self, field: &str) -> Option<bool> {
        self.cell.fields.borrow().get(field).and_then(Value::as_bool)
    }

    /// Assigns one field and notifies subscribers synchronously.
    ///
    /// Returns `false` without notifying when the value is unchanged.
    pub fn set(&self, field: &str, value: Value) -> bool {
        {
            let mut fields = self.cell.fields.borrow_mut();
            if fields.get(field) == Some(&value) {
                return false;
            }
            fields.insert(field.to_owned(), value.clone());
        }
        // Listeners may read or subscribe, so no borrow is held while they run.
        let listeners: Vec<Listener> = self
            .cell
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        for listener in listeners {
            listener(field, &value);
        }
        true
    }

    /// Assigns every field present in `patch`, leaving all others untouched.
    ///
    /// Returns how many fields actually changed.
    pub fn merge(&self, patch: &Map<String, Value>) -> usize {
        let mut changed = 0;
        for (field, value) in patch {
            if self.set(field, value.clone()) {
                changed += 1;
            }
        }
        changed
    }

    /// Registers a listener called with `(field, new_value)` after every change.
    ///
    /// The listener stays registered until the returned [`Subscription`] is dropped.
    #[must_use = "dropping the subscription unsubscribes immediately"]
    pub fn subscribe(&self, listener: impl Fn(&str, &Value) + 'static) -> Subscription {
        let id = self.cell.next_listener.get();
        self.cell.next_listener.set(id + 1);
        self.cell
            .listeners
            .borrow_mut()
            .push((id, Rc::new(listener)));
        Subscription {
            cell: Rc::downgrade(&self.cell),
            id,
        }
    }

    /// Returns a copy of all fields.
    #[must_use]
    pub fn snapshot(&self) -> Map<String, Value> {
        self.cell.fields.borrow().clone()
    }

    /// Returns `true` when both handles point at the same container.
    #[must_use]
    pub fn ptr_eq(a: &Self, b: &Self) -> bool {
        Rc::ptr_eq(&a.cell, &b.cell)
    }
}

impl Default for ObservableProps {
    fn default() -> Self {
        Self::new(Map::new())
    }
}

impl fmt::Debug for ObservableProps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObservableProps")
            .field("fields", &self.cell.fields.borrow())
            .field("listeners", &self.cell.listeners.borrow().len())
            .finish()
    }
}

/// Keeps a listener registered. Dropping it unsubscribes.
pub struct Subscription {
    cell: Weak<PropsCell>,
    id: u64,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cell) = self.cell.upgrade() {
            cell.listeners
                .borrow_mut()
                .retain(|(id, _)| *id != self.id);
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}
