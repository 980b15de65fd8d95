//! Mapping decoded trees onto native views.

use crate::{node::DecodedNode, view::NativeView};

/// Builds [`NativeView`] trees from decoded nodes.
///
/// The mapping is pure: children are built first, in array order, and handed to the
/// kind's build routine. Identities come from `(id, type)`, never from a counter, so
/// an unchanged node keeps its identity across rebuilds.
#[derive(Debug, Default, Clone, Copy)]
pub struct ViewTreeBuilder;

impl ViewTreeBuilder {
    /// Creates a builder.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Builds the view for `node` and its subtree.
    #[must_use]
    pub fn build(&self, node: &DecodedNode) -> NativeView {
        let children = node
            .children()
            .iter()
            .map(|child| self.build(child))
            .collect();
        node.kind().run_build(node, children)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{decoder::NodeDecoder, observable::ObservableProps, router::EventRouter, view::ViewRole};
    use waterbridge_core::EventSink;

    const PAYLOAD: &str = r#"{"id":"root","type":"Group","children":[
        {"id":"a","type":"Section","children":[
            {"id":"b","type":"TextField","props":{"text":"hi"}},
            {"id":"c","type":"Slider","props":{"value":0.5}}
        ]}
    ]}"#;

    #[test]
    fn roles_follow_the_kind_table() {
        let router = EventRouter::new(EventSink::channel().0);
        let root = NodeDecoder::with_builtin_kinds()
            .decode_str(PAYLOAD, &router)
            .unwrap();
        let view = ViewTreeBuilder::new().build(&root);

        assert_eq!(view.role(), &ViewRole::Stack);
        let section = &view.children()[0];
        assert_eq!(section.role(), &ViewRole::Section);
        assert_eq!(section.children()[0].role(), &ViewRole::TextInput);
        assert_eq!(section.children()[1].role(), &ViewRole::Slider);
    }

    #[test]
    fn views_share_the_decoded_props_container() {
        let router = EventRouter::new(EventSink::channel().0);
        let root = NodeDecoder::with_builtin_kinds()
            .decode_str(PAYLOAD, &router)
            .unwrap();
        let view = ViewTreeBuilder::new().build(&root);
        let node = root.find("b").unwrap();
        assert!(ObservableProps::ptr_eq(
            node.props(),
            view.find("b").unwrap().props()
        ));
    }

    #[test]
    fn rebuilding_keeps_identities() {
        let router = EventRouter::new(EventSink::channel().0);
        let decoder = NodeDecoder::with_builtin_kinds();
        let first = ViewTreeBuilder::new().build(&decoder.decode_str(PAYLOAD, &router).unwrap());
        router.rebind();
        let second = ViewTreeBuilder::new().build(&decoder.decode_str(PAYLOAD, &router).unwrap());

        for id in ["root", "a", "b", "c"] {
            assert_eq!(
                first.find(id).unwrap().identity(),
                second.find(id).unwrap().identity()
            );
        }
    }
}
