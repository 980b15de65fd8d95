//! Authoritative map of live node descriptors.
//!
//! Mounted components upsert their descriptor on every render. The registry keeps
//! no order of its own; sibling order is recovered from the
//! [`RenderSequencer`](crate::sequence::RenderSequencer) at serialization time.

use core::fmt;
use std::collections::HashMap;

use tracing::{debug, trace};
use waterbridge_core::{
    NodeDescriptor, NodeType, ProtocolViolation, Props, ROOT_ID, value::merge_props,
};

/// Identity of one registration of an id.
///
/// A fresh registration after an unmount allocates a new generation even when the id
/// is reused, so a remounted node is never mistaken for its predecessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeGeneration(u64);

impl NodeGeneration {
    /// Raw counter value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeGeneration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A live entry of the registry.
#[derive(Debug, Clone, PartialEq)]
pub struct RegisteredNode {
    descriptor: NodeDescriptor,
    parent: Option<String>,
    generation: NodeGeneration,
}

impl RegisteredNode {
    /// The descriptor as last registered or patched.
    #[must_use]
    pub const fn descriptor(&self) -> &NodeDescriptor {
        &self.descriptor
    }

    /// Node id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.descriptor.id
    }

    /// Type discriminant.
    #[must_use]
    pub const fn node_type(&self) -> &NodeType {
        &self.descriptor.node_type
    }

    /// Current props.
    #[must_use]
    pub const fn props(&self) -> &Props {
        &self.descriptor.props
    }

    /// Parent id, `None` for children of the synthetic root.
    #[must_use]
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    /// Registration generation.
    #[must_use]
    pub const fn generation(&self) -> NodeGeneration {
        self.generation
    }
}

/// Outcome of [`NodeRegistry::register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// The id was not live; a new node identity was allocated.
    Created(NodeGeneration),
    /// The id was live and its entry was refreshed.
    Updated(NodeGeneration),
}

impl Registration {
    /// Generation of the registered node.
    #[must_use]
    pub const fn generation(self) -> NodeGeneration {
        match self {
            Self::Created(generation) | Self::Updated(generation) => generation,
        }
    }
}

/// Map of live node descriptors, keyed by id.
#[derive(Debug, Default)]
pub struct NodeRegistry {
    nodes: HashMap<String, RegisteredNode>,
    tombstones: HashMap<String, NodeType>,
    next_generation: u64,
    dirty: bool,
}

impl NodeRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Upserts a descriptor under `parent`. Both `None` and the root id attach the
    /// node to the synthetic root.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolViolation::ReservedId`] for the synthetic root's id, and
    /// [`ProtocolViolation::TypeChanged`] if the id is known under another type, either
    /// live or unmounted since the last structural flush. The registry is left
    /// unchanged.
    pub fn register(
        &mut self,
        descriptor: NodeDescriptor,
        parent: Option<&str>,
    ) -> Result<Registration, ProtocolViolation> {
        if descriptor.id == ROOT_ID {
            return Err(ProtocolViolation::ReservedId { id: descriptor.id });
        }
        let parent = parent.filter(|parent| *parent != ROOT_ID);
        let known = self
            .nodes
            .get(&descriptor.id)
            .map(RegisteredNode::node_type)
            .or_else(|| self.tombstones.get(&descriptor.id));
        if let Some(existing) = known {
            if *existing != descriptor.node_type {
                return Err(ProtocolViolation::TypeChanged {
                    id: descriptor.id,
                    existing: existing.clone(),
                    attempted: descriptor.node_type,
                });
            }
        }

        if let Some(node) = self.nodes.get_mut(&descriptor.id) {
            let parent_changed = node.parent.as_deref() != parent;
            if parent_changed {
                node.parent = parent.map(str::to_owned);
            }
            let props_changed = node.descriptor.props != descriptor.props;
            if props_changed {
                node.descriptor.props = descriptor.props;
            }
            if parent_changed || props_changed {
                trace!(id = %node.descriptor.id, parent_changed, props_changed, "node refreshed");
                self.dirty = true;
            }
            return Ok(Registration::Updated(node.generation));
        }

        self.tombstones.remove(&descriptor.id);
        self.next_generation += 1;
        let generation = NodeGeneration(self.next_generation);
        debug!(
            id = %descriptor.id,
            node_type = %descriptor.node_type,
            %generation,
            "node registered"
        );
        self.nodes.insert(
            descriptor.id.clone(),
            RegisteredNode {
                descriptor,
                parent: parent.map(str::to_owned),
                generation,
            },
        );
        self.dirty = true;
        Ok(Registration::Created(generation))
    }

    /// Removes an entry. Children are not touched; they unregister on their own.
    ///
    /// The removed type stays known until [`forget_tombstones`](Self::forget_tombstones).
    pub fn unregister(&mut self, id: &str) -> Option<RegisteredNode> {
        let node = self.nodes.remove(id)?;
        debug!(id = %id, generation = %node.generation, "node unregistered");
        self.tombstones
            .insert(id.to_owned(), node.node_type().clone());
        self.dirty = true;
        Some(node)
    }

    /// Merges `patch` into the props of `id`.
    ///
    /// Returns `true` if any field changed under deep value equality; only then is the
    /// registry marked dirty.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolViolation::UnknownNode`] if `id` is not live.
    pub fn update_props(&mut self, id: &str, patch: &Props) -> Result<bool, ProtocolViolation> {
        let node = self
            .nodes
            .get_mut(id)
            .ok_or_else(|| ProtocolViolation::UnknownNode { id: id.to_owned() })?;
        let changed = merge_props(&mut node.descriptor.props, patch);
        if changed {
            self.dirty = true;
        }
        Ok(changed)
    }

    /// Looks up a live entry.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&RegisteredNode> {
        self.nodes.get(id)
    }

    /// Read-only view of every live entry, in registration order.
    #[must_use]
    pub fn snapshot(&self) -> Vec<&RegisteredNode> {
        let mut nodes: Vec<_> = self.nodes.values().collect();
        nodes.sort_by_key(|node| node.generation);
        nodes
    }

    /// Number of live entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether anything changed since the dirty flag was last taken.
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Returns and clears the dirty flag.
    pub const fn take_dirty(&mut self) -> bool {
        core::mem::replace(&mut self.dirty, false)
    }

    /// Releases the types of unmounted ids. Called once the target has received a
    /// structural payload without them.
    pub fn forget_tombstones(&mut self) {
        if !self.tombstones.is_empty() {
            trace!(count = self.tombstones.len(), "tombstones released");
            self.tombstones.clear();
        }
    }
}
