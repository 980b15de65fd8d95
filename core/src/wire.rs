//! The wire format spoken across the runtime boundary.
//!
//! ```text
//! structural   host ──▶ target   {"id":"root","type":"Group","children":[...]}
//! incremental  host ──▶ target   {"command":"updateProps","id":"b","props":{...}}
//! event        target ──▶ host   {"name":"change","type":"TextField","id":"b","value":"42"}
//! ```
//!
//! Structural payloads are opaque strings once serialized; the target decodes them with
//! its own strict decoder. Patches and events are small and use serde directly.

use serde::{Deserialize, Serialize};

use crate::{node::NodeType, value::Props};

/// Id of the synthetic root every structural payload starts from.
pub const ROOT_ID: &str = "root";

/// One node of a serialized tree.
///
/// Empty props are omitted. Children are always written, even when empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireNode {
    /// Node id.
    pub id: String,
    /// Type discriminant.
    #[serde(rename = "type")]
    pub node_type: NodeType,
    /// Node props.
    #[serde(default, skip_serializing_if = "Props::is_empty")]
    pub props: Props,
    /// Children in display order.
    #[serde(default)]
    pub children: Vec<WireNode>,
}

impl WireNode {
    /// Creates the synthetic root container.
    #[must_use]
    pub fn root(children: Vec<Self>) -> Self {
        Self {
            id: ROOT_ID.into(),
            node_type: NodeType::GROUP,
            props: Props::new(),
            children,
        }
    }

    /// Counts this node and all of its descendants.
    #[must_use]
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(Self::count).sum::<usize>()
    }
}

/// A leaf-value update for one node.
///
/// Only the keys present in `props` are assigned on the target; everything else is
/// left untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropsPatch {
    /// Target node id.
    pub id: String,
    /// Expected node type. When present the patch only applies to a node of this type.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub node_type: Option<NodeType>,
    /// Fields to assign.
    pub props: Props,
}

impl PropsPatch {
    /// Creates a patch without a type guard.
    #[must_use]
    pub fn new(id: impl Into<String>, props: Props) -> Self {
        Self {
            id: id.into(),
            node_type: None,
            props,
        }
    }

    /// Restricts the patch to nodes of the given type.
    #[must_use]
    pub fn with_type(mut self, node_type: impl Into<NodeType>) -> Self {
        self.node_type = Some(node_type.into());
        self
    }
}

/// A single user interaction reported by the target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Event name, such as `change` or `press`.
    pub name: String,
    /// Type of the node that fired.
    #[serde(rename = "type")]
    pub node_type: NodeType,
    /// Id of the node that fired.
    pub id: String,
    /// Payload, already converted to a string by the value adapter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// Side commands accepted by the target runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum Command {
    /// Apply a [`PropsPatch`].
    UpdateProps(PropsPatch),
    /// Apply several commands in order.
    Batch {
        /// The commands to run.
        commands: Vec<Command>,
    },
}

/// A message queued from host to target.
#[derive(Debug, Clone, PartialEq)]
pub enum HostMessage {
    /// A full structural payload.
    Tree(String),
    /// An incremental patch.
    Patch(PropsPatch),
}
