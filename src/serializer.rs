//! Deterministic tree serialization.
//!
//! The serializer links every live descriptor to its parent, falling back to the
//! synthetic root when the parent is not registered, then stable-sorts each children
//! list by the node's position in the current render pass. Ids that did not register
//! this pass sort last. Ties keep registration order, so identical registry and
//! sequence contents always produce the identical payload.

use std::collections::{HashMap, HashSet};

use tracing::{trace, warn};
use waterbridge_core::{TransportError, WireNode};

use crate::{
    registry::{NodeRegistry, RegisteredNode},
    sequence::RenderSequencer,
};

/// Builds the rooted wire tree from a registry and a render sequence.
#[derive(Debug, Default, Clone, Copy)]
pub struct TreeSerializer;

impl TreeSerializer {
    /// Builds the rooted tree.
    ///
    /// Nodes caught in a parent cycle cannot be reached from the root and are left out.
    #[must_use]
    pub fn build(registry: &NodeRegistry, sequence: &RenderSequencer) -> WireNode {
        let nodes = registry.snapshot();
        let mut roots: Vec<&RegisteredNode> = Vec::new();
        let mut children: HashMap<&str, Vec<&RegisteredNode>> = HashMap::new();
        for &node in &nodes {
            match node.parent() {
                Some(parent) if registry.get(parent).is_some() => {
                    children.entry(parent).or_default().push(node);
                }
                Some(parent) => {
                    trace!(id = %node.id(), parent = %parent, "parent not registered, attaching to root");
                    roots.push(node);
                }
                None => roots.push(node),
            }
        }

        let rank = |node: &&RegisteredNode| sequence.index_of(node.id()).unwrap_or(usize::MAX);
        roots.sort_by_key(rank);
        for list in children.values_mut() {
            list.sort_by_key(rank);
        }

        let mut emitted = HashSet::new();
        let tree = WireNode::root(
            roots
                .into_iter()
                .map(|node| emit(node, &children, &mut emitted))
                .collect(),
        );

        if emitted.len() < nodes.len() {
            let pruned: Vec<&str> = nodes
                .iter()
                .map(|node| node.id())
                .filter(|id| !emitted.contains(id))
                .collect();
            warn!(?pruned, "nodes unreachable from the root were left out");
        }
        tree
    }

    /// Builds and encodes the rooted tree.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] if encoding fails.
    pub fn serialize(registry: &NodeRegistry, sequence: &RenderSequencer) -> Result<String, TransportError> {
        let tree = Self::build(registry, sequence);
        Ok(serde_json::to_string(&tree)?)
    }
}

fn emit<'a>(
    node: &'a RegisteredNode,
    children: &HashMap<&str, Vec<&'a RegisteredNode>>,
    emitted: &mut HashSet<&'a str>,
) -> WireNode {
    emitted.insert(node.id());
    let mut kids = Vec::new();
    for &child in children.get(node.id()).into_iter().flatten() {
        if !emitted.contains(child.id()) {
            kids.push(emit(child, children, emitted));
        }
    }
    WireNode {
        id: node.id().to_owned(),
        node_type: node.node_type().clone(),
        props: node.props().clone(),
        children: kids,
    }
}
