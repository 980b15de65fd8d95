//! Decoded nodes.

extern crate alloc;

use alloc::rc::Rc;

use waterbridge_core::NodeType;

use crate::{kind::KindSpec, observable::ObservableProps, router::EventSlots};

/// A node produced by a structural decode.
///
/// The whole tree is replaced on the next structural decode. Until then its props are
/// only ever mutated in place through [`ObservableProps`].
#[derive(Debug)]
pub struct DecodedNode {
    id: String,
    kind: Rc<KindSpec>,
    props: ObservableProps,
    slots: EventSlots,
    children: Vec<Rc<DecodedNode>>,
}

impl DecodedNode {
    pub(crate) const fn new(
        id: String,
        kind: Rc<KindSpec>,
        props: ObservableProps,
        slots: EventSlots,
        children: Vec<Rc<Self>>,
    ) -> Self {
        Self {
            id,
            kind,
            props,
            slots,
            children,
        }
    }

    /// Node id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Type discriminant.
    #[must_use]
    pub fn node_type(&self) -> &NodeType {
        self.kind.node_type()
    }

    /// The props container shared with the native view.
    #[must_use]
    pub const fn props(&self) -> &ObservableProps {
        &self.props
    }

    /// Event slots bound during the decode that produced this node.
    #[must_use]
    pub const fn slots(&self) -> &EventSlots {
        &self.slots
    }

    /// Children in display order.
    #[must_use]
    pub fn children(&self) -> &[Rc<Self>] {
        &self.children
    }

    pub(crate) fn kind(&self) -> &KindSpec {
        &self.kind
    }

    /// Finds a node by id in this subtree.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&Self> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }

    /// Counts this node and all of its descendants.
    #[must_use]
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(|child| child.count()).sum::<usize>()
    }
}
