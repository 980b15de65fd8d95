//! Native view descriptions handed to the platform toolkit.
//!
//! A [`NativeView`] is what the platform adapter renders. Its [`ViewIdentity`] is
//! derived purely from the node's id and type, so rebuilding an unchanged node yields
//! an equal identity and the toolkit can diff instead of recreating the view.

use waterbridge_core::{NodeType, ROOT_ID};

use crate::{node::DecodedNode, observable::ObservableProps, router::EventSlots};

/// Stable identity of a native view.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ViewIdentity {
    id: String,
    node_type: NodeType,
}

impl ViewIdentity {
    /// Creates an identity from an id and a type.
    #[must_use]
    pub fn new(id: impl Into<String>, node_type: NodeType) -> Self {
        Self {
            id: id.into(),
            node_type,
        }
    }

    /// Node id part.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Node type part.
    #[must_use]
    pub const fn node_type(&self) -> &NodeType {
        &self.node_type
    }
}

/// What the platform toolkit should put on screen.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum ViewRole {
    /// Plain vertical container.
    Stack,
    /// Titled group of rows.
    Section,
    /// Static text.
    Label,
    /// Pressable button.
    Button,
    /// Editable single-line text.
    TextInput,
    /// On/off switch.
    Toggle,
    /// Continuous value slider.
    Slider,
    /// Date selector.
    DatePicker,
    /// A kind registered outside the built-in kit.
    Custom(NodeType),
    /// Diagnostic view shown instead of a tree that failed to decode.
    Placeholder {
        /// User-facing caption.
        label: String,
        /// What went wrong.
        diagnostic: String,
    },
}

/// One native view and its children.
#[derive(Debug, Clone)]
pub struct NativeView {
    identity: ViewIdentity,
    role: ViewRole,
    props: ObservableProps,
    slots: EventSlots,
    children: Vec<NativeView>,
}

impl NativeView {
    /// Creates a view bound to a decoded node's props and event slots.
    #[must_use]
    pub fn new(node: &DecodedNode, role: ViewRole) -> Self {
        Self {
            identity: ViewIdentity::new(node.id(), node.node_type().clone()),
            role,
            props: node.props().clone(),
            slots: node.slots().clone(),
            children: Vec::new(),
        }
    }

    /// An empty root, shown before the first structural payload arrives.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            identity: ViewIdentity::new(ROOT_ID, NodeType::GROUP),
            role: ViewRole::Stack,
            props: ObservableProps::default(),
            slots: EventSlots::default(),
            children: Vec::new(),
        }
    }

    /// A diagnostic placeholder replacing an undecodable tree.
    #[must_use]
    pub fn placeholder(label: impl Into<String>, diagnostic: impl Into<String>) -> Self {
        Self {
            identity: ViewIdentity::new(ROOT_ID, NodeType::from_static("Placeholder")),
            role: ViewRole::Placeholder {
                label: label.into(),
                diagnostic: diagnostic.into(),
            },
            props: ObservableProps::default(),
            slots: EventSlots::default(),
            children: Vec::new(),
        }
    }

    /// Attaches children, returning the view.
    #[must_use]
    pub fn with_children(mut self, children: Vec<Self>) -> Self {
        self.children = children;
        self
    }

    /// Stable identity.
    #[must_use]
    pub const fn identity(&self) -> &ViewIdentity {
        &self.identity
    }

    /// Role of the view.
    #[must_use]
    pub const fn role(&self) -> &ViewRole {
        &self.role
    }

    /// Props container, shared with the decoded node.
    #[must_use]
    pub const fn props(&self) -> &ObservableProps {
        &self.props
    }

    /// Event slots, shared with the decoded node.
    #[must_use]
    pub const fn slots(&self) -> &EventSlots {
        &self.slots
    }

    /// Children in display order.
    #[must_use]
    pub fn children(&self) -> &[Self] {
        &self.children
    }

    /// Returns `true` for a diagnostic placeholder.
    #[must_use]
    pub const fn is_placeholder(&self) -> bool {
        matches!(self.role, ViewRole::Placeholder { .. })
    }

    /// Finds a view by node id in this subtree.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&Self> {
        if self.identity.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }
}
