//! Structural payload decoding.
//!
//! [`NodeDecoder`] maps each type discriminant to its [`KindSpec`] and walks the
//! payload recursively. Decoding is strict: the first malformed node aborts the whole
//! payload, because a partially decoded tree could link children to the wrong parents.
//! Children keep their array order; the host already sorted them.

extern crate alloc;

use alloc::rc::Rc;
use std::collections::{HashMap, HashSet};

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, trace};
use waterbridge_core::{BridgeError, DecodeError, NodeType, ROOT_ID, TransportError};

use crate::{
    components,
    kind::{KindSpec, NodeFields},
    node::DecodedNode,
    observable::ObservableProps,
    router::EventRouter,
};

/// Dispatch table from type discriminant to decode routine.
#[derive(Debug)]
pub struct NodeDecoder {
    kinds: HashMap<String, Rc<KindSpec>>,
}

impl Default for NodeDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeDecoder {
    /// Creates a decoder that only knows the root container kind.
    #[must_use]
    pub fn new() -> Self {
        let mut decoder = Self {
            kinds: HashMap::new(),
        };
        decoder.register(components::layout::group());
        decoder
    }

    /// Creates a decoder with every built-in kind registered.
    #[must_use]
    pub fn with_builtin_kinds() -> Self {
        let mut decoder = Self::new();
        for kind in components::builtin_kinds() {
            decoder.register(kind);
        }
        decoder
    }

    /// Registers a kind, replacing any previous entry for the same discriminant.
    pub fn register(&mut self, kind: KindSpec) -> Option<Rc<KindSpec>> {
        debug!(node_type = %kind.node_type(), "register node kind");
        self.kinds
            .insert(kind.node_type().as_str().to_owned(), Rc::new(kind))
    }

    /// Looks up the entry for a discriminant.
    #[must_use]
    pub fn kind(&self, node_type: &str) -> Option<&KindSpec> {
        self.kinds.get(node_type).map(|kind| &**kind)
    }

    /// Decodes a serialized payload.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] if the payload is not JSON, or a [`DecodeError`] if
    /// any node in it is malformed.
    pub fn decode_str(&self, payload: &str, router: &EventRouter) -> Result<Rc<DecodedNode>, BridgeError> {
        // Deep trees exceed serde_json's default nesting limit.
        let mut deserializer = serde_json::Deserializer::from_str(payload);
        deserializer.disable_recursion_limit();
        let value = Value::deserialize(&mut deserializer).map_err(TransportError::from)?;
        deserializer.end().map_err(TransportError::from)?;
        Ok(self.decode_value(&value, router)?)
    }

    /// Decodes an already parsed payload.
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] if any node is malformed, a discriminant is unknown,
    /// an id repeats, or the payload does not start at the synthetic `Group` root.
    pub fn decode_value(&self, value: &Value, router: &EventRouter) -> Result<Rc<DecodedNode>, DecodeError> {
        if let Some(found) = value.get("id").and_then(Value::as_str) {
            if found != ROOT_ID {
                return Err(DecodeError::NotRoot {
                    found: found.to_owned(),
                });
            }
        }
        if let Some(found) = value.get("type").and_then(Value::as_str) {
            if NodeType::GROUP != found {
                return Err(DecodeError::RootNotGroup {
                    found: found.to_owned(),
                });
            }
        }
        let mut ctx = DecodeCtx {
            decoder: self,
            router,
            seen: HashSet::new(),
        };
        let root = ctx.decode_node(value, "$")?;
        trace!(nodes = ctx.seen.len(), "decoded structural payload");
        Ok(root)
    }
}

struct DecodeCtx<'a> {
    decoder: &'a NodeDecoder,
    router: &'a EventRouter,
    seen: HashSet<String>,
}

impl DecodeCtx<'_> {
    fn decode_node(&mut self, value: &Value, path: &str) -> Result<Rc<DecodedNode>, DecodeError> {
        let Value::Object(object) = value else {
            return Err(DecodeError::NotAnObject {
                path: path.to_owned(),
            });
        };

        let id = required_string(object, "id", path, path)?;
        let type_name = required_string(object, "type", path, id)?;
        let kind = self
            .decoder
            .kinds
            .get(type_name)
            .cloned()
            .ok_or_else(|| DecodeError::UnknownType {
                id: id.to_owned(),
                node_type: type_name.to_owned(),
            })?;

        let empty = Map::new();
        let raw_props = match object.get("props") {
            None | Some(Value::Null) => &empty,
            Some(Value::Object(props)) => props,
            Some(_) => return Err(invalid(id, "props", "an object")),
        };
        let raw_children: &[Value] = match object.get("children") {
            None | Some(Value::Null) => &[],
            Some(Value::Array(children)) => children,
            Some(_) => return Err(invalid(id, "children", "an array")),
        };
        if !kind.is_container() && !raw_children.is_empty() {
            return Err(DecodeError::UnexpectedChildren {
                id: id.to_owned(),
                node_type: kind.node_type().clone(),
            });
        }

        if !self.seen.insert(id.to_owned()) {
            return Err(DecodeError::DuplicateId { id: id.to_owned() });
        }

        let props = kind.run_decode(&NodeFields::new(id, raw_props))?;

        let mut siblings = HashSet::new();
        let mut children = Vec::with_capacity(raw_children.len());
        for (index, child) in raw_children.iter().enumerate() {
            if let Some(child_id) = child.get("id").and_then(Value::as_str) {
                if !siblings.insert(child_id) {
                    return Err(DecodeError::DuplicateSibling {
                        parent: id.to_owned(),
                        id: child_id.to_owned(),
                    });
                }
            }
            children.push(self.decode_node(child, &format!("{path}.children[{index}]"))?);
        }

        let slots = self
            .router
            .slots_for(id, kind.node_type(), kind.event_names());
        Ok(Rc::new(DecodedNode::new(
            id.to_owned(),
            kind,
            ObservableProps::new(props),
            slots,
            children,
        )))
    }
}

fn required_string<'v>(
    object: &'v Map<String, Value>,
    field: &str,
    path: &str,
    id: &str,
) -> Result<&'v str, DecodeError> {
    match object.get(field) {
        None | Some(Value::Null) => Err(DecodeError::MissingField {
            path: path.to_owned(),
            field: field.to_owned(),
        }),
        Some(Value::String(value)) => Ok(value.as_str()),
        Some(_) => Err(invalid(id, field, "a string")),
    }
}

fn invalid(id: &str, field: &str, expected: &'static str) -> DecodeError {
    DecodeError::InvalidField {
        id: id.to_owned(),
        field: field.to_owned(),
        expected,
    }
}
