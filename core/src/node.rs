//! Node descriptors and type discriminants.

use core::fmt;
use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::value::{PropValue, Props};

/// The type discriminant of a node, such as `"Section"` or `"TextField"`.
///
/// A node's type is fixed for the lifetime of its id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeType(Cow<'static, str>);

impl NodeType {
    /// The container type used for the synthetic root.
    pub const GROUP: Self = Self::from_static("Group");

    /// Creates a node type from a static string.
    #[must_use]
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    /// Creates a node type from any string.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    /// Returns the discriminant as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for NodeType {
    fn from(name: &'static str) -> Self {
        Self::from_static(name)
    }
}

impl From<String> for NodeType {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl PartialEq<str> for NodeType {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for NodeType {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

/// A unit of UI description contributed by one mounted host component.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeDescriptor {
    /// Stable id, unique across the tree.
    pub id: String,
    /// Type discriminant, immutable for this id.
    pub node_type: NodeType,
    /// Type-specific props.
    pub props: Props,
}

impl NodeDescriptor {
    /// Creates a descriptor with empty props.
    #[must_use]
    pub fn new(id: impl Into<String>, node_type: impl Into<NodeType>) -> Self {
        Self {
            id: id.into(),
            node_type: node_type.into(),
            props: Props::new(),
        }
    }

    /// Adds a prop, returning the descriptor.
    #[must_use]
    pub fn with_prop(mut self, key: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.props.insert(key.into(), value.into());
        self
    }

    /// Replaces the props, returning the descriptor.
    #[must_use]
    pub fn with_props(mut self, props: Props) -> Self {
        self.props = props;
        self
    }
}
