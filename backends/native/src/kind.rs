//! Per-kind registration contract.
//!
//! A widget kind plugs into the bridge as one [`KindSpec`]: its discriminant, whether it
//! may hold children, the events it exposes, and three plain functions. `decode`
//! validates and normalizes raw props, `build` maps a decoded node onto a
//! [`NativeView`], and `merge` applies an incremental patch to its props container.

use serde_json::{Map, Value};
use time::{OffsetDateTime, format_description::well_known::Rfc3339};
use tracing::warn;
use waterbridge_core::{DecodeError, NodeType};

use crate::{
    node::DecodedNode,
    observable::ObservableProps,
    view::{NativeView, ViewRole},
};

/// Validates raw props and returns the normalized field map.
pub type DecodeFn = fn(&NodeFields<'_>) -> Result<Map<String, Value>, DecodeError>;

/// Maps a decoded node and its already built children onto a native view.
pub type BuildFn = fn(&DecodedNode, Vec<NativeView>) -> NativeView;

/// Applies a patch to a props container, returning how many fields changed.
pub type MergeFn = fn(&ObservableProps, &Map<String, Value>) -> usize;

/// Registration entry for one node kind.
#[derive(Debug, Clone)]
pub struct KindSpec {
    node_type: NodeType,
    container: bool,
    events: &'static [&'static str],
    decode: DecodeFn,
    build: BuildFn,
    merge: MergeFn,
}

impl KindSpec {
    /// Creates a leaf kind that keeps its props as-is, builds a
    /// [`ViewRole::Custom`] view and merges patches verbatim.
    #[must_use]
    pub fn new(node_type: impl Into<NodeType>) -> Self {
        Self {
            node_type: node_type.into(),
            container: false,
            events: &[],
            decode: passthrough,
            build: custom_view,
            merge: merge_verbatim,
        }
    }

    /// Allows nodes of this kind to hold children.
    #[must_use]
    pub const fn container(mut self) -> Self {
        self.container = true;
        self
    }

    /// Declares the event slots bound for every node of this kind.
    #[must_use]
    pub const fn events(mut self, events: &'static [&'static str]) -> Self {
        self.events = events;
        self
    }

    /// Sets the decode routine.
    #[must_use]
    pub const fn decode(mut self, decode: DecodeFn) -> Self {
        self.decode = decode;
        self
    }

    /// Sets the build routine.
    #[must_use]
    pub const fn build(mut self, build: BuildFn) -> Self {
        self.build = build;
        self
    }

    /// Sets the merge routine.
    #[must_use]
    pub const fn merge(mut self, merge: MergeFn) -> Self {
        self.merge = merge;
        self
    }

    /// The discriminant this entry handles.
    #[must_use]
    pub const fn node_type(&self) -> &NodeType {
        &self.node_type
    }

    /// Whether nodes of this kind may hold children.
    #[must_use]
    pub const fn is_container(&self) -> bool {
        self.container
    }

    /// Names of the event slots.
    #[must_use]
    pub const fn event_names(&self) -> &'static [&'static str] {
        self.events
    }

    pub(crate) fn run_decode(&self, fields: &NodeFields<'_>) -> Result<Map<String, Value>, DecodeError> {
        (self.decode)(fields)
    }

    pub(crate) fn run_build(&self, node: &DecodedNode, children: Vec<NativeView>) -> NativeView {
        (self.build)(node, children)
    }

    pub(crate) fn run_merge(&self, props: &ObservableProps, patch: &Map<String, Value>) -> usize {
        (self.merge)(props, patch)
    }
}

fn passthrough(fields: &NodeFields<'_>) -> Result<Map<String, Value>, DecodeError> {
    Ok(fields.raw().clone())
}

fn custom_view(node: &DecodedNode, children: Vec<NativeView>) -> NativeView {
    NativeView::new(node, ViewRole::Custom(node.node_type().clone())).with_children(children)
}

/// Merge routine that assigns every patched field without validation.
pub fn merge_verbatim(props: &ObservableProps, patch: &Map<String, Value>) -> usize {
    props.merge(patch)
}

/// Read-only view over the raw props of the node being decoded.
///
/// The accessors turn absent or mistyped fields into [`DecodeError`]s that name the
/// node and the field.
#[derive(Debug)]
pub struct NodeFields<'a> {
    id: &'a str,
    props: &'a Map<String, Value>,
}

impl<'a> NodeFields<'a> {
    pub(crate) const fn new(id: &'a str, props: &'a Map<String, Value>) -> Self {
        Self { id, props }
    }

    /// Id of the node being decoded.
    #[must_use]
    pub const fn id(&self) -> &'a str {
        self.id
    }

    /// The raw props object.
    #[must_use]
    pub const fn raw(&self) -> &'a Map<String, Value> {
        self.props
    }

    fn missing(&self, field: &str) -> DecodeError {
        DecodeError::MissingField {
            path: format!("`{}`.props", self.id),
            field: field.to_owned(),
        }
    }

    fn invalid(&self, field: &str, expected: &'static str) -> DecodeError {
        DecodeError::InvalidField {
            id: self.id.to_owned(),
            field: field.to_owned(),
            expected,
        }
    }

    /// Reads a required string field.
    ///
    /// # Errors
    ///
    /// Fails when the field is absent or not a string.
    pub fn required_str(&self, field: &str) -> Result<&'a str, DecodeError> {
        self.optional_str(field)?.ok_or_else(|| self.missing(field))
    }

    /// Reads an optional string field. `null` counts as absent.
    ///
    /// # Errors
    ///
    /// Fails when the field is present but not a string.
    pub fn optional_str(&self, field: &str) -> Result<Option<&'a str>, DecodeError> {
        match self.props.get(field) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(value)) => Ok(Some(value.as_str())),
            Some(_) => Err(self.invalid(field, "a string")),
        }
    }

    /// Reads a required number field.
    ///
    /// # Errors
    ///
    /// Fails when the field is absent or not a number.
    pub fn required_f64(&self, field: &str) -> Result<f64, DecodeError> {
        self.optional_f64(field)?.ok_or_else(|| self.missing(field))
    }

    /// Reads an optional number field. `null` counts as absent.
    ///
    /// # Errors
    ///
    /// Fails when the field is present but not a number.
    pub fn optional_f64(&self, field: &str) -> Result<Option<f64>, DecodeError> {
        match self.props.get(field) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Number(value)) => value
                .as_f64()
                .map(Some)
                .ok_or_else(|| self.invalid(field, "a finite number")),
            Some(_) => Err(self.invalid(field, "a number")),
        }
    }

    /// Reads an optional boolean field. `null` counts as absent.
    ///
    /// # Errors
    ///
    /// Fails when the field is present but not a boolean.
    pub fn optional_bool(&self, field: &str) -> Result<Option<bool>, DecodeError> {
        match self.props.get(field) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Bool(value)) => Ok(Some(*value)),
            Some(_) => Err(self.invalid(field, "a boolean")),
        }
    }

    /// Reads an optional RFC 3339 date field. `null` counts as absent.
    ///
    /// # Errors
    ///
    /// Fails when the field is present but not an RFC 3339 string.
    pub fn optional_date(&self, field: &str) -> Result<Option<OffsetDateTime>, DecodeError> {
        self.optional_str(field)?
            .map(|value| {
                OffsetDateTime::parse(value, &Rfc3339)
                    .map_err(|_| self.invalid(field, "an RFC 3339 date"))
            })
            .transpose()
    }
}

/// Keeps only the patched fields that satisfy `accept`, logging the rest.
///
/// Used by merge routines of kinds with typed fields: a patch must never turn a
/// number into a string behind the native view's back.
pub fn retain_valid(
    props: &ObservableProps,
    patch: &Map<String, Value>,
    accept: impl Fn(&str, &Value) -> bool,
) -> usize {
    let mut changed = 0;
    for (field, value) in patch {
        if accept(field, value) {
            if props.set(field, value.clone()) {
                changed += 1;
            }
        } else {
            warn!(field = %field, value = %value, "dropping mistyped patch field");
        }
    }
    changed
}
