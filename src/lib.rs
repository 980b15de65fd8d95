#![doc = include_str!("../README.md")]

pub mod bridge;
pub mod config;
pub mod events;
pub mod logging;
pub mod registry;
pub mod sequence;
pub mod serializer;
pub mod session;

#[cfg(test)]
mod tests;

#[doc(inline)]
pub use bridge::{Bridge, Pumped};
#[doc(inline)]
pub use config::BridgeConfig;
#[doc(inline)]
pub use events::{Dispatch, EventRegistry};
#[doc(inline)]
pub use registry::{NodeGeneration, NodeRegistry, RegisteredNode, Registration};
#[doc(inline)]
pub use sequence::RenderSequencer;
#[doc(inline)]
pub use serializer::TreeSerializer;
#[doc(inline)]
pub use session::{BridgeSession, Commit};

pub use waterbridge_core as protocol;
pub use waterbridge_native as native;

pub use waterbridge_core::{
    BridgeError, DecodeError, EventEnvelope, EventValue, NodeDescriptor, NodeType, PropValue,
    Props, PropsPatch, ProtocolViolation, TransportError,
};
