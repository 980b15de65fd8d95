//! In-process transport between a host session and a target runtime.
//!
//! Two unbounded queues back the three logical channels: structural payloads and
//! incremental patches share the host→target queue (so their relative order is kept),
//! events use the target→host queue. Both sides drain synchronously with `try_recv`;
//! nothing here needs an executor.
//!
//! ```text
//! ┌──────────┐  HostMessage::{Tree, Patch}   ┌────────────┐
//! │ HostPort │ ─────────────────────────────▶│ TargetPort │
//! │          │ ◀─────────────────────────────│ (EventSink)│
//! └──────────┘        EventEnvelope          └────────────┘
//! ```

use async_channel::{Receiver, Sender};
use tracing::trace;

use crate::{
    error::TransportError,
    wire::{EventEnvelope, HostMessage, PropsPatch},
};

/// Factory for a connected [`HostPort`]/[`TargetPort`] pair.
#[derive(Debug, Clone, Copy)]
pub struct BridgeTransport;

impl BridgeTransport {
    /// Creates a connected pair of ports.
    #[must_use]
    pub fn channel() -> (HostPort, TargetPort) {
        let (outbound_tx, outbound_rx) = async_channel::unbounded();
        let (event_tx, event_rx) = async_channel::unbounded();
        (
            HostPort {
                outbound: outbound_tx,
                events: event_rx,
            },
            TargetPort {
                inbound: outbound_rx,
                events: EventSink { sender: event_tx },
            },
        )
    }
}

/// Host end of the transport.
#[derive(Debug, Clone)]
pub struct HostPort {
    outbound: Sender<HostMessage>,
    events: Receiver<EventEnvelope>,
}

impl HostPort {
    /// Queues a full structural payload.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Disconnected`] if the target port was dropped.
    pub fn send_tree(&self, payload: String) -> Result<(), TransportError> {
        trace!(bytes = payload.len(), "queue structural payload");
        self.send(HostMessage::Tree(payload))
    }

    /// Queues an incremental patch.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Disconnected`] if the target port was dropped.
    pub fn send_patch(&self, patch: PropsPatch) -> Result<(), TransportError> {
        trace!(id = %patch.id, "queue props patch");
        self.send(HostMessage::Patch(patch))
    }

    fn send(&self, message: HostMessage) -> Result<(), TransportError> {
        self.outbound
            .try_send(message)
            .map_err(|_| TransportError::Disconnected)
    }

    /// Takes every event the target has emitted so far.
    #[must_use]
    pub fn drain_events(&self) -> Vec<EventEnvelope> {
        core::iter::from_fn(|| self.events.try_recv().ok()).collect()
    }
}

/// Target end of the transport.
#[derive(Debug, Clone)]
pub struct TargetPort {
    inbound: Receiver<HostMessage>,
    events: EventSink,
}

impl TargetPort {
    /// Takes every queued host message, oldest first.
    #[must_use]
    pub fn drain(&self) -> Vec<HostMessage> {
        core::iter::from_fn(|| self.inbound.try_recv().ok()).collect()
    }

    /// Returns a sink for outbound events.
    #[must_use]
    pub fn event_sink(&self) -> EventSink {
        self.events.clone()
    }
}

/// Sending half of the event channel, cloned into every event slot.
#[derive(Debug, Clone)]
pub struct EventSink {
    sender: Sender<EventEnvelope>,
}

impl EventSink {
    /// Creates a standalone sink and the receiver that observes it.
    #[must_use]
    pub fn channel() -> (Self, Receiver<EventEnvelope>) {
        let (sender, receiver) = async_channel::unbounded();
        (Self { sender }, receiver)
    }

    /// Emits one event envelope.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Disconnected`] if the host port was dropped.
    pub fn emit(&self, envelope: EventEnvelope) -> Result<(), TransportError> {
        trace!(id = %envelope.id, event = %envelope.name, "emit event");
        self.sender
            .try_send(envelope)
            .map_err(|_| TransportError::Disconnected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{node::NodeType, value::Props};

    #[test]
    fn host_messages_keep_their_order() {
        let (host, target) = BridgeTransport::channel();
        host.send_tree("{}".into()).unwrap();
        host.send_patch(PropsPatch::new("x", Props::new())).unwrap();
        let drained = target.drain();
        assert!(matches!(drained[0], HostMessage::Tree(_)));
        assert!(matches!(drained[1], HostMessage::Patch(_)));
        assert!(target.drain().is_empty());
    }

    #[test]
    fn events_flow_back_to_host() {
        let (host, target) = BridgeTransport::channel();
        target
            .event_sink()
            .emit(EventEnvelope {
                name: "press".into(),
                node_type: NodeType::from_static("Button"),
                id: "ok".into(),
                value: None,
            })
            .unwrap();
        let events = host.drain_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id, "ok");
    }

    #[test]
    fn sending_to_a_dropped_target_fails() {
        let (host, target) = BridgeTransport::channel();
        drop(target);
        assert!(matches!(
            host.send_tree("{}".into()),
            Err(TransportError::Disconnected)
        ));
    }
}
