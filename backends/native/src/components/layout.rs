//! Container kinds.

use serde_json::{Map, Value};
use waterbridge_core::{DecodeError, NodeType};

use crate::{
    kind::{KindSpec, NodeFields, retain_valid},
    node::DecodedNode,
    observable::ObservableProps,
    view::{NativeView, ViewRole},
};

/// The plain container, also used for the synthetic root.
#[must_use]
pub fn group() -> KindSpec {
    KindSpec::new(NodeType::GROUP)
        .container()
        .decode(decode_group)
        .build(build_group)
        .merge(merge_group)
}

/// A titled group of rows.
#[must_use]
pub fn section() -> KindSpec {
    KindSpec::new("Section")
        .container()
        .decode(decode_section)
        .build(build_section)
        .merge(merge_section)
}

fn decode_group(fields: &NodeFields<'_>) -> Result<Map<String, Value>, DecodeError> {
    let mut props = Map::new();
    if let Some(spacing) = fields.optional_f64("spacing")? {
        props.insert("spacing".into(), spacing.into());
    }
    Ok(props)
}

fn build_group(node: &DecodedNode, children: Vec<NativeView>) -> NativeView {
    NativeView::new(node, ViewRole::Stack).with_children(children)
}

fn merge_group(props: &ObservableProps, patch: &Map<String, Value>) -> usize {
    retain_valid(props, patch, |field, value| {
        field == "spacing" && (value.is_number() || value.is_null())
    })
}

fn decode_section(fields: &NodeFields<'_>) -> Result<Map<String, Value>, DecodeError> {
    let mut props = Map::new();
    for field in ["header", "footer"] {
        if let Some(text) = fields.optional_str(field)? {
            props.insert(field.into(), text.into());
        }
    }
    Ok(props)
}

fn build_section(node: &DecodedNode, children: Vec<NativeView>) -> NativeView {
    NativeView::new(node, ViewRole::Section).with_children(children)
}

fn merge_section(props: &ObservableProps, patch: &Map<String, Value>) -> usize {
    retain_valid(props, patch, |field, value| {
        matches!(field, "header" | "footer") && (value.is_string() || value.is_null())
    })
}
