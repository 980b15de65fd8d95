//! Error taxonomy of the bridge.
//!
//! Nothing here is fatal. A [`ProtocolViolation`] drops the offending operation, a
//! [`DecodeError`] or [`TransportError`] swaps the rendered tree for a diagnostic
//! placeholder, and an event without a handler is simply ignored.

use thiserror::Error;

use crate::node::NodeType;

/// An operation that breaks the protocol's invariants. Logged and dropped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolViolation {
    /// An id was re-registered with a different type.
    #[error("node `{id}` is known as `{existing}` and cannot become `{attempted}`")]
    TypeChanged {
        /// Offending id.
        id: String,
        /// Type the id is known under.
        existing: NodeType,
        /// Type that was attempted.
        attempted: NodeType,
    },
    /// An operation targeted an id nobody registered.
    #[error("no node with id `{id}` is known")]
    UnknownNode {
        /// Offending id.
        id: String,
    },
    /// A component tried to register under the synthetic root's id.
    #[error("id `{id}` is reserved for the synthetic root")]
    ReservedId {
        /// Offending id.
        id: String,
    },
    /// A type-guarded patch hit a node of another type.
    #[error("patch for `{id}` expects `{expected}` but the node is `{found}`")]
    PatchTypeMismatch {
        /// Target id.
        id: String,
        /// Type carried by the patch.
        expected: NodeType,
        /// Type of the indexed node.
        found: NodeType,
    },
}

/// A structural payload that could not be decoded. Aborts the whole decode.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Something other than an object appeared where a node was expected.
    #[error("expected a node object at {path}")]
    NotAnObject {
        /// Location inside the payload.
        path: String,
    },
    /// A required field is absent.
    #[error("node at {path} is missing required field `{field}`")]
    MissingField {
        /// Location inside the payload.
        path: String,
        /// Name of the field.
        field: String,
    },
    /// A field is present but has the wrong shape.
    #[error("field `{field}` of node `{id}` must be {expected}")]
    InvalidField {
        /// Node id.
        id: String,
        /// Name of the field.
        field: String,
        /// Description of the accepted shape.
        expected: &'static str,
    },
    /// No decoder is registered for the discriminant.
    #[error("node `{id}` has unknown type `{node_type}`")]
    UnknownType {
        /// Node id.
        id: String,
        /// The unrecognized discriminant.
        node_type: String,
    },
    /// Two siblings share an id.
    #[error("duplicate sibling id `{id}` under `{parent}`")]
    DuplicateSibling {
        /// Parent id.
        parent: String,
        /// Repeated id.
        id: String,
    },
    /// An id appears twice in different parts of the tree.
    #[error("id `{id}` appears more than once in the tree")]
    DuplicateId {
        /// Repeated id.
        id: String,
    },
    /// A leaf kind carried children.
    #[error("node `{id}` of type `{node_type}` cannot have children")]
    UnexpectedChildren {
        /// Node id.
        id: String,
        /// Its type.
        node_type: NodeType,
    },
    /// The top of the payload is not a `Group` container.
    #[error("payload root must be a `Group`, found `{found}`")]
    RootNotGroup {
        /// Type found at the top of the payload.
        found: String,
    },
    /// The payload does not start from the synthetic root.
    #[error("payload root must be `root`, found `{found}`")]
    NotRoot {
        /// Id found at the top of the payload.
        found: String,
    },
}

/// A message that could not be carried across the boundary.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The payload is not valid JSON, or not the expected JSON shape.
    #[error("payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// The other side of the channel is gone.
    #[error("bridge channel is disconnected")]
    Disconnected,
}

/// Any bridge failure.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// See [`ProtocolViolation`].
    #[error(transparent)]
    Protocol(#[from] ProtocolViolation),
    /// See [`DecodeError`].
    #[error(transparent)]
    Decode(#[from] DecodeError),
    /// See [`TransportError`].
    #[error(transparent)]
    Transport(#[from] TransportError),
}
