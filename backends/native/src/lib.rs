//! Native side of a WaterBridge session.
//!
//! The crate turns structural payloads into native view trees and keeps them live:
//! a [`NodeDecoder`] dispatch table decodes payloads into [`DecodedNode`]s, the
//! [`ViewTreeBuilder`] maps them onto [`NativeView`]s, the [`NodeIndex`] applies
//! incremental patches in place, and the [`EventRouter`] binds event slots to the
//! outbound channel. [`TargetRuntime`] ties all of it together behind the three calls a
//! platform adapter needs.
//!
//! Widget kinds plug in as [`KindSpec`] entries; [`components`] ships the built-in kit.

#![deny(missing_debug_implementations)]

pub mod builder;
pub mod components;
pub mod decoder;
pub mod index;
pub mod kind;
pub mod node;
pub mod observable;
pub mod router;
pub mod runtime;
pub mod view;

pub use builder::ViewTreeBuilder;
pub use decoder::NodeDecoder;
pub use index::NodeIndex;
pub use kind::{KindSpec, NodeFields, merge_verbatim, retain_valid};
pub use node::DecodedNode;
pub use observable::{ObservableProps, Subscription};
pub use router::{EventRouter, EventSlots};
pub use runtime::{DEFAULT_PLACEHOLDER_LABEL, TargetRuntime};
pub use view::{NativeView, ViewIdentity, ViewRole};
