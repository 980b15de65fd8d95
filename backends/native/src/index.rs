//! Id index used by the incremental patch path.
//!
//! The index is rebuilt from scratch after every structural decode and is only valid
//! until the next one. Applying a patch is one hash lookup plus one assignment per
//! patched field: no JSON re-decode, no tree walk, no rebuild.

extern crate alloc;

use alloc::rc::Rc;
use std::collections::HashMap;

use waterbridge_core::{ProtocolViolation, PropsPatch, value::props_to_json};

use crate::node::DecodedNode;

/// Lookup from node id to decoded node.
#[derive(Debug, Default)]
pub struct NodeIndex {
    nodes: HashMap<String, Rc<DecodedNode>>,
}

impl NodeIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the index contents with every node of `root`'s tree.
    pub fn rebuild(&mut self, root: &Rc<DecodedNode>) {
        self.nodes.clear();
        let mut stack = vec![Rc::clone(root)];
        while let Some(node) = stack.pop() {
            stack.extend(node.children().iter().cloned());
            self.nodes.insert(node.id().to_owned(), node);
        }
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    /// Looks up a node.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Rc<DecodedNode>> {
        self.nodes.get(id)
    }

    /// Number of indexed nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` when nothing is indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Merges a patch into the matching node's props container.
    ///
    /// Returns how many fields changed.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolViolation::UnknownNode`] if the id is not indexed and
    /// [`ProtocolViolation::PatchTypeMismatch`] if the patch carries a type that differs
    /// from the node's. In both cases nothing is modified.
    pub fn apply_patch(&self, patch: &PropsPatch) -> Result<usize, ProtocolViolation> {
        let node = self
            .nodes
            .get(&patch.id)
            .ok_or_else(|| ProtocolViolation::UnknownNode {
                id: patch.id.clone(),
            })?;
        if let Some(expected) = &patch.node_type {
            if expected != node.node_type() {
                return Err(ProtocolViolation::PatchTypeMismatch {
                    id: patch.id.clone(),
                    expected: expected.clone(),
                    found: node.node_type().clone(),
                });
            }
        }
        let fields = props_to_json(&patch.props);
        Ok(node.kind().run_merge(node.props(), &fields))
    }
}
