//! The view-hosting container on the target side.
//!
//! [`TargetRuntime`] owns everything a platform adapter needs: it accepts structural
//! payloads through [`TargetRuntime::set_tree_string`], side commands through
//! [`TargetRuntime::run_command`], and reports user interaction through the
//! [`EventSink`] it was created with.
//!
//! A structural payload always replaces the whole tree. Before decoding, the event
//! router advances its generation so closures of the previous tree go inert; after a
//! successful decode the id index is rebuilt and the native view tree is rebuilt once.
//! A payload that fails to decode leaves a diagnostic placeholder on screen and an
//! empty index behind.

extern crate alloc;

use alloc::rc::Rc;

use tracing::{debug, info, warn};
use waterbridge_core::{
    BridgeError, Command, EventSink, HostMessage, PropsPatch, TargetPort, TransportError,
};

use crate::{
    builder::ViewTreeBuilder, decoder::NodeDecoder, index::NodeIndex, node::DecodedNode,
    router::EventRouter, view::NativeView,
};

/// Default caption of the diagnostic placeholder.
pub const DEFAULT_PLACEHOLDER_LABEL: &str = "Unable to render view";

/// Target-side runtime for one bridge session.
#[derive(Debug)]
pub struct TargetRuntime {
    decoder: NodeDecoder,
    builder: ViewTreeBuilder,
    router: EventRouter,
    index: NodeIndex,
    tree: Option<Rc<DecodedNode>>,
    view: NativeView,
    rebuilds: usize,
    placeholder_label: String,
}

impl TargetRuntime {
    /// Creates a runtime that decodes with `decoder` and emits events into `sink`.
    #[must_use]
    pub fn new(decoder: NodeDecoder, sink: EventSink) -> Self {
        Self {
            decoder,
            builder: ViewTreeBuilder::new(),
            router: EventRouter::new(sink),
            index: NodeIndex::new(),
            tree: None,
            view: NativeView::empty(),
            rebuilds: 0,
            placeholder_label: DEFAULT_PLACEHOLDER_LABEL.to_owned(),
        }
    }

    /// Sets the caption shown by the diagnostic placeholder.
    #[must_use]
    pub fn with_placeholder_label(mut self, label: impl Into<String>) -> Self {
        self.placeholder_label = label.into();
        self
    }

    /// Replaces the whole tree with a structural payload.
    ///
    /// # Errors
    ///
    /// Returns the decode or transport error when the payload is rejected. The runtime
    /// has already switched to the placeholder view by then, so callers only need the
    /// error for reporting.
    pub fn set_tree_string(&mut self, payload: &str) -> Result<(), BridgeError> {
        self.router.rebind();
        match self.decoder.decode_str(payload, &self.router) {
            Ok(root) => {
                self.index.rebuild(&root);
                self.view = self.builder.build(&root);
                self.tree = Some(root);
                self.rebuilds += 1;
                debug!(
                    nodes = self.index.len(),
                    rebuilds = self.rebuilds,
                    "structural payload applied"
                );
                Ok(())
            }
            Err(err) => {
                warn!(bytes = payload.len(), "structural payload rejected: {err}");
                self.index.clear();
                self.tree = None;
                self.view = NativeView::placeholder(self.placeholder_label.clone(), err.to_string());
                Err(err)
            }
        }
    }

    /// Runs a side command.
    ///
    /// Returns how many prop fields changed. Patches that violate the protocol are
    /// logged and skipped; the remaining commands of a batch still run.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] if `command` is not a valid command envelope.
    pub fn run_command(&self, command: &str) -> Result<usize, BridgeError> {
        let command: Command = serde_json::from_str(command).map_err(|err| {
            warn!("command rejected: {err}");
            TransportError::from(err)
        })?;
        Ok(self.execute(&command))
    }

    fn execute(&self, command: &Command) -> usize {
        match command {
            Command::UpdateProps(patch) => self.apply_patch(patch),
            Command::Batch { commands } => commands.iter().map(|cmd| self.execute(cmd)).sum(),
        }
    }

    /// Applies an incremental patch in place.
    ///
    /// Returns how many fields changed. An unknown id or a mismatched type guard is
    /// logged and dropped.
    pub fn apply_patch(&self, patch: &PropsPatch) -> usize {
        match self.index.apply_patch(patch) {
            Ok(changed) => changed,
            Err(violation) => {
                warn!(id = %patch.id, "patch dropped: {violation}");
                0
            }
        }
    }

    /// Applies every message queued on `port`, oldest first.
    ///
    /// Returns how many messages were processed.
    pub fn drain(&mut self, port: &TargetPort) -> usize {
        let messages = port.drain();
        for message in &messages {
            match message {
                // Failures already switched to the placeholder and were logged.
                HostMessage::Tree(payload) => {
                    let _ = self.set_tree_string(payload);
                }
                HostMessage::Patch(patch) => {
                    self.apply_patch(patch);
                }
            }
        }
        messages.len()
    }

    /// The native view tree currently on screen.
    #[must_use]
    pub const fn view(&self) -> &NativeView {
        &self.view
    }

    /// The decoded tree, if the last structural payload was accepted.
    #[must_use]
    pub const fn tree(&self) -> Option<&Rc<DecodedNode>> {
        self.tree.as_ref()
    }

    /// How many times the native view tree was rebuilt from a structural payload.
    #[must_use]
    pub const fn rebuild_count(&self) -> usize {
        self.rebuilds
    }

    /// The id index of the current tree.
    #[must_use]
    pub const fn index(&self) -> &NodeIndex {
        &self.index
    }

    /// The decoder's kind table.
    #[must_use]
    pub const fn decoder(&self) -> &NodeDecoder {
        &self.decoder
    }

    /// Fires an event slot of the node `id`, as the platform toolkit would on user
    /// interaction.
    ///
    /// Returns `false` if the node or slot does not exist.
    pub fn fire(&self, id: &str, name: &str, value: Option<String>) -> bool {
        let Some(node) = self.index.get(id) else {
            info!(id = %id, event = %name, "event for a node that is not on screen");
            return false;
        };
        node.slots().fire(name, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waterbridge_core::{BridgeTransport, DecodeError, event::names::CHANGE};

    const SCENARIO: &str = r#"{"id":"root","type":"Group","children":[{"id":"a","type":"Section","children":[{"id":"b","type":"TextField","children":[]}]}]}"#;

    fn runtime() -> (TargetRuntime, async_channel::Receiver<waterbridge_core::EventEnvelope>) {
        let (sink, events) = EventSink::channel();
        (TargetRuntime::new(NodeDecoder::with_builtin_kinds(), sink), events)
    }

    #[test]
    fn commands_patch_without_rebuilding() {
        let (mut runtime, _events) = runtime();
        runtime.set_tree_string(SCENARIO).unwrap();
        let changed = runtime
            .run_command(r#"{"command":"updateProps","id":"b","props":{"text":"hello"}}"#)
            .unwrap();

        assert_eq!(changed, 1);
        assert_eq!(runtime.rebuild_count(), 1);
        let view = runtime.view().find("b").unwrap();
        assert_eq!(view.props().get_str("text").as_deref(), Some("hello"));
    }

    #[test]
    fn batches_run_in_order_and_skip_violations() {
        let (mut runtime, _events) = runtime();
        runtime.set_tree_string(SCENARIO).unwrap();
        let changed = runtime
            .run_command(
                r#"{"command":"batch","commands":[
                    {"command":"updateProps","id":"ghost","props":{"text":"x"}},
                    {"command":"updateProps","id":"b","props":{"text":"one"}},
                    {"command":"updateProps","id":"b","props":{"text":"two"}}
                ]}"#,
            )
            .unwrap();
        assert_eq!(changed, 2);
        assert_eq!(
            runtime.index().get("b").unwrap().props().get_str("text").as_deref(),
            Some("two")
        );
    }

    #[test]
    fn unknown_commands_are_transport_errors() {
        let (runtime, _events) = runtime();
        assert!(matches!(
            runtime.run_command(r#"{"command":"explode"}"#),
            Err(BridgeError::Transport(_))
        ));
    }

    #[test]
    fn bad_payload_shows_placeholder_and_drops_old_tree() {
        let (mut runtime, events) = runtime();
        runtime.set_tree_string(SCENARIO).unwrap();
        let stale = runtime.index().get("b").unwrap().slots().clone();

        let err = runtime
            .set_tree_string(r#"{"id":"root","type":"Group","children":[{"id":"x","type":"Nope"}]}"#)
            .unwrap_err();
        assert!(matches!(err, BridgeError::Decode(DecodeError::UnknownType { .. })));

        assert!(runtime.view().is_placeholder());
        assert!(runtime.index().is_empty());
        assert!(runtime.tree().is_none());
        assert!(!stale.fire(CHANGE, Some("late".into())));
        assert!(!runtime.fire("b", CHANGE, None));
        assert!(events.try_recv().is_err());

        runtime.set_tree_string(SCENARIO).unwrap();
        assert!(!runtime.view().is_placeholder());
        assert_eq!(runtime.rebuild_count(), 2);
    }

    #[test]
    fn placeholder_uses_configured_label() {
        let (sink, _events) = EventSink::channel();
        let mut runtime =
            TargetRuntime::new(NodeDecoder::with_builtin_kinds(), sink).with_placeholder_label("Oops");
        assert!(runtime.set_tree_string("not json").is_err());
        match runtime.view().role() {
            crate::view::ViewRole::Placeholder { label, diagnostic } => {
                assert_eq!(label, "Oops");
                assert!(!diagnostic.is_empty());
            }
            other => panic!("expected placeholder, got {other:?}"),
        }
    }

    #[test]
    fn fired_events_reach_the_sink() {
        let (mut runtime, events) = runtime();
        runtime.set_tree_string(SCENARIO).unwrap();
        assert!(runtime.fire("b", CHANGE, Some("42".into())));
        let envelope = events.try_recv().unwrap();
        assert_eq!(envelope.id, "b");
        assert_eq!(envelope.value.as_deref(), Some("42"));
    }

    #[test]
    fn drain_keeps_message_order() {
        let (host, target) = BridgeTransport::channel();
        let mut runtime = TargetRuntime::new(NodeDecoder::with_builtin_kinds(), target.event_sink());

        let mut props = waterbridge_core::Props::new();
        props.insert("text".into(), "typed".into());
        host.send_tree(SCENARIO.to_owned()).unwrap();
        host.send_patch(PropsPatch::new("b", props)).unwrap();

        assert_eq!(runtime.drain(&target), 2);
        assert_eq!(
            runtime.index().get("b").unwrap().props().get_str("text").as_deref(),
            Some("typed")
        );
    }
}
