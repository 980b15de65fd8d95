//! Static text.

use serde_json::{Map, Value};
use waterbridge_core::DecodeError;

use crate::{
    kind::{KindSpec, NodeFields, retain_valid},
    node::DecodedNode,
    observable::ObservableProps,
    view::{NativeView, ViewRole},
};

/// A read-only label. The `text` prop is required.
#[must_use]
pub fn text() -> KindSpec {
    KindSpec::new("Text")
        .decode(decode)
        .build(build)
        .merge(merge)
}

fn decode(fields: &NodeFields<'_>) -> Result<Map<String, Value>, DecodeError> {
    let mut props = Map::new();
    props.insert("text".into(), fields.required_str("text")?.into());
    if let Some(style) = fields.optional_str("style")? {
        props.insert("style".into(), style.into());
    }
    Ok(props)
}

fn build(node: &DecodedNode, _children: Vec<NativeView>) -> NativeView {
    NativeView::new(node, ViewRole::Label)
}

fn merge(props: &ObservableProps, patch: &Map<String, Value>) -> usize {
    retain_valid(props, patch, |field, value| {
        matches!(field, "text" | "style") && value.is_string()
    })
}
