//! Host-side bridge session.
//!
//! A [`BridgeSession`] scopes one node registry, one render sequence and one event
//! registry to the lifetime of a mounted UI root. Several sessions can coexist; each
//! talks to its own target through its own [`HostPort`].
//!
//! A render pass looks like this:
//!
//! 1. [`begin_pass`](BridgeSession::begin_pass) resets the render sequence,
//! 2. mounted components call [`register`](BridgeSession::register) in render order,
//! 3. unmounted ones call [`unmount`](BridgeSession::unmount),
//! 4. once the pass settles, [`commit`](BridgeSession::commit) sends at most one
//!    structural payload.
//!
//! Leaf-only changes between passes go through
//! [`update_props`](BridgeSession::update_props) and are sent right away as patches.

use tracing::{debug, info, warn};
use uuid::Uuid;
use waterbridge_core::{
    BridgeError, EventEnvelope, EventValue, HostPort, NodeDescriptor, ProtocolViolation, Props,
    PropsPatch,
};

use crate::{
    config::BridgeConfig,
    events::{Dispatch, EventRegistry},
    registry::{NodeRegistry, Registration},
    sequence::RenderSequencer,
    serializer::TreeSerializer,
};

/// Outcome of [`BridgeSession::commit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Commit {
    /// Nothing changed since the last commit.
    Clean,
    /// The registry changed but produced the payload that was sent last.
    Unchanged,
    /// A structural payload was sent.
    Sent {
        /// Payload size.
        bytes: usize,
    },
}

/// One host tree and its channel to a target.
#[derive(Debug)]
pub struct BridgeSession {
    id: Uuid,
    config: BridgeConfig,
    registry: NodeRegistry,
    sequence: RenderSequencer,
    events: EventRegistry,
    port: HostPort,
    last_payload: Option<String>,
}

impl BridgeSession {
    /// Creates a session sending through `port`.
    #[must_use]
    pub fn new(port: HostPort, config: BridgeConfig) -> Self {
        let id = Uuid::new_v4();
        info!(session = %id, "bridge session created");
        Self {
            id,
            config,
            registry: NodeRegistry::new(),
            sequence: RenderSequencer::new(),
            events: EventRegistry::new(),
            port,
            last_payload: None,
        }
    }

    /// Session id.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Session configuration.
    #[must_use]
    pub const fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// The node registry.
    #[must_use]
    pub const fn registry(&self) -> &NodeRegistry {
        &self.registry
    }

    /// The sequence of the current pass.
    #[must_use]
    pub const fn sequence(&self) -> &RenderSequencer {
        &self.sequence
    }

    /// The event handlers.
    #[must_use]
    pub const fn events(&self) -> &EventRegistry {
        &self.events
    }

    /// Starts a render pass.
    pub fn begin_pass(&mut self) {
        self.sequence.reset();
    }

    /// Registers a node under `parent` (`None` for the root) and records it in the
    /// current pass.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolViolation::ReservedId`] for the synthetic root's id and
    /// [`ProtocolViolation::TypeChanged`] if the id is already known under another
    /// type. The violation is logged and nothing is recorded.
    pub fn register(
        &mut self,
        descriptor: NodeDescriptor,
        parent: Option<&str>,
    ) -> Result<Registration, ProtocolViolation> {
        let id = descriptor.id.clone();
        match self.registry.register(descriptor, parent) {
            Ok(registration) => {
                self.sequence.record(&id);
                Ok(registration)
            }
            Err(violation) => {
                warn!(session = %self.id, id = %id, "registration rejected: {violation}");
                Err(violation)
            }
        }
    }

    /// Unmounts a node and drops its event handlers. Returns `false` if it was not
    /// registered.
    pub fn unmount(&mut self, id: &str) -> bool {
        let removed = self.registry.unregister(id).is_some();
        let handlers = self.events.remove_node(id);
        if handlers > 0 {
            debug!(session = %self.id, id = %id, handlers, "handlers dropped on unmount");
        }
        removed
    }

    /// Merges a leaf-value change and sends it to the target as a patch.
    ///
    /// Nothing is sent when no field changed. Returns whether anything changed.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolViolation::UnknownNode`] for an id that is not registered, or
    /// a transport error if the target is gone.
    pub fn update_props(&mut self, id: &str, patch: Props) -> Result<bool, BridgeError> {
        let changed = self.registry.update_props(id, &patch).inspect_err(|violation| {
            warn!(session = %self.id, id = %id, "patch rejected: {violation}");
        })?;
        if !changed {
            return Ok(false);
        }
        let mut patch = PropsPatch::new(id, patch);
        if let Some(node) = self.registry.get(id) {
            patch = patch.with_type(node.node_type().clone());
        }
        self.port.send_patch(patch)?;
        Ok(true)
    }

    /// Registers a raw event handler. See [`EventRegistry::register_handler`].
    pub fn on(
        &mut self,
        id: impl Into<String>,
        name: impl Into<String>,
        handler: impl FnMut(Option<&str>) + 'static,
    ) -> bool {
        self.events.register_handler(id, name, handler)
    }

    /// Registers a handler receiving decoded values. See
    /// [`EventRegistry::register_typed`].
    pub fn on_value<V: EventValue + 'static>(
        &mut self,
        id: impl Into<String>,
        name: impl Into<String>,
        handler: impl FnMut(V) + 'static,
    ) -> bool {
        self.events.register_typed(id, name, handler)
    }

    /// Ends a settled pass: sends the structural payload if the registry changed.
    ///
    /// # Errors
    ///
    /// Returns a transport error if encoding fails or the target is gone. The registry
    /// stays dirty so the next commit retries.
    pub fn commit(&mut self) -> Result<Commit, BridgeError> {
        if !self.registry.is_dirty() {
            return Ok(Commit::Clean);
        }
        let payload = TreeSerializer::serialize(&self.registry, &self.sequence)?;
        if self.config.skip_identical_payloads() && self.last_payload.as_deref() == Some(payload.as_str()) {
            debug!(session = %self.id, "payload identical to the last one, not sent");
            let _ = self.registry.take_dirty();
            self.registry.forget_tombstones();
            return Ok(Commit::Unchanged);
        }

        let bytes = payload.len();
        self.port.send_tree(payload.clone())?;
        let _ = self.registry.take_dirty();
        self.registry.forget_tombstones();
        self.last_payload = Some(payload);
        debug!(session = %self.id, bytes, nodes = self.registry.len(), "structural payload sent");
        Ok(Commit::Sent { bytes })
    }

    /// Dispatches one event envelope to its handler.
    pub fn handle_event(&mut self, envelope: &EventEnvelope) -> Dispatch {
        self.events
            .dispatch(&envelope.id, &envelope.name, envelope.value.as_deref())
    }

    /// Dispatches every event the target has sent so far. Returns how many found a
    /// handler.
    pub fn process_events(&mut self) -> usize {
        let mut handled = 0;
        for envelope in self.port.drain_events() {
            if self.handle_event(&envelope) == Dispatch::Handled {
                handled += 1;
            }
        }
        handled
    }

    /// Tears the session down, dropping every node and handler.
    pub fn destroy(mut self) {
        let nodes = self.registry.len();
        let handlers = self.events.len();
        self.events.clear();
        info!(session = %self.id, nodes, handlers, "bridge session destroyed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waterbridge_core::{BridgeTransport, HostMessage, TargetPort, TransportError};

    fn session() -> (BridgeSession, TargetPort) {
        let (host, target) = BridgeTransport::channel();
        (BridgeSession::new(host, BridgeConfig::default()), target)
    }

    fn trees(target: &TargetPort) -> Vec<String> {
        target
            .drain()
            .into_iter()
            .filter_map(|message| match message {
                HostMessage::Tree(payload) => Some(payload),
                HostMessage::Patch(_) => None,
            })
            .collect()
    }

    #[test]
    fn commit_coalesces_a_pass_into_one_payload() {
        let (mut session, target) = session();
        session.begin_pass();
        for id in ["a", "b", "c"] {
            session.register(NodeDescriptor::new(id, "Text"), None).unwrap();
        }
        assert!(matches!(session.commit().unwrap(), Commit::Sent { .. }));
        assert_eq!(session.commit().unwrap(), Commit::Clean);
        assert_eq!(trees(&target).len(), 1);
    }

    #[test]
    fn identical_payloads_are_skipped() {
        let (mut session, target) = session();
        session.register(NodeDescriptor::new("a", "Text"), None).unwrap();
        let _ = session.commit().unwrap();

        session.unmount("a");
        session.register(NodeDescriptor::new("a", "Text"), None).unwrap();
        assert_eq!(session.commit().unwrap(), Commit::Unchanged);
        assert_eq!(trees(&target).len(), 1);
    }

    #[test]
    fn identical_payloads_resend_when_configured() {
        let (host, target) = BridgeTransport::channel();
        let mut session = BridgeSession::new(
            host,
            BridgeConfig::default().with_skip_identical_payloads(false),
        );
        session.register(NodeDescriptor::new("a", "Text"), None).unwrap();
        let _ = session.commit().unwrap();
        session.unmount("a");
        session.register(NodeDescriptor::new("a", "Text"), None).unwrap();
        assert!(matches!(session.commit().unwrap(), Commit::Sent { .. }));
        assert_eq!(trees(&target).len(), 2);
    }

    #[test]
    fn update_props_sends_typed_patch_only_on_change() {
        let (mut session, target) = session();
        session
            .register(NodeDescriptor::new("b", "TextField").with_prop("text", ""), None)
            .unwrap();
        let _ = session.commit().unwrap();
        let _ = target.drain();

        let patch = Props::from([("text".to_owned(), "hello".into())]);
        assert!(session.update_props("b", patch.clone()).unwrap());
        assert!(!session.update_props("b", patch).unwrap());

        let messages = target.drain();
        assert_eq!(messages.len(), 1);
        let HostMessage::Patch(sent) = &messages[0] else {
            panic!("expected a patch, got {messages:?}");
        };
        assert_eq!(sent.id, "b");
        assert_eq!(sent.node_type.as_ref().map(|t| t.as_str()), Some("TextField"));
    }

    #[test]
    fn update_props_for_unknown_node_fails() {
        let (mut session, _target) = session();
        assert!(matches!(
            session.update_props("ghost", Props::new()),
            Err(BridgeError::Protocol(ProtocolViolation::UnknownNode { .. }))
        ));
    }

    #[test]
    fn unmount_drops_handlers() {
        let (mut session, _target) = session();
        session.register(NodeDescriptor::new("b", "Button"), None).unwrap();
        session.on("b", "press", |_| {});
        assert!(session.unmount("b"));
        assert!(session.events().is_empty());
        assert_eq!(
            session.handle_event(&EventEnvelope {
                name: "press".into(),
                node_type: "Button".into(),
                id: "b".into(),
                value: None,
            }),
            Dispatch::Missing
        );
    }

    #[test]
    fn commit_fails_when_target_is_gone() {
        let (mut session, target) = session();
        drop(target);
        session.register(NodeDescriptor::new("a", "Text"), None).unwrap();
        assert!(matches!(
            session.commit(),
            Err(BridgeError::Transport(TransportError::Disconnected))
        ));
        assert!(session.registry().is_dirty());
    }
}
