//! # WaterBridge Core
//!
//! Protocol vocabulary shared by both sides of a WaterBridge session.
//!
//! A host runtime describes its UI as a set of [`NodeDescriptor`]s. Those are
//! serialized into a rooted [`WireNode`](wire::WireNode) tree and shipped across a
//! [`BridgeTransport`] to a native runtime, which decodes and renders them. Leaf-only
//! changes travel as [`PropsPatch`](wire::PropsPatch)es, and user interaction flows
//! back as [`EventEnvelope`](wire::EventEnvelope)s.
//!
//! This crate owns only the shared types:
//! - [`PropValue`] and [`Props`], the structured prop values
//! - [`NodeType`] and [`NodeDescriptor`]
//! - the [`wire`] format and the [`event`] value adapters
//! - the [`error`] taxonomy
//! - the in-process [`transport`] channel pair

#[macro_use]
mod macros;
pub mod error;
pub mod event;
pub mod node;
pub mod transport;
pub mod value;
pub mod wire;

#[doc(inline)]
pub use error::{BridgeError, DecodeError, ProtocolViolation, TransportError};
#[doc(inline)]
pub use event::EventValue;
#[doc(inline)]
pub use node::{NodeDescriptor, NodeType};
#[doc(inline)]
pub use transport::{BridgeTransport, EventSink, HostPort, TargetPort};
#[doc(inline)]
pub use value::{PropValue, Props};
#[doc(inline)]
pub use wire::{Command, EventEnvelope, HostMessage, PropsPatch, ROOT_ID, WireNode};
