//! In-process loopback between a host session and a target runtime.

use waterbridge_core::{BridgeTransport, TargetPort};
use waterbridge_native::{NodeDecoder, TargetRuntime};

use crate::{config::BridgeConfig, session::BridgeSession};

/// Counts reported by [`Bridge::pump`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pumped {
    /// Host messages applied by the target.
    pub messages: usize,
    /// Events that reached a host handler.
    pub events: usize,
}

/// A host session wired to a target runtime in the same process.
///
/// Nothing moves until [`pump`](Self::pump) is called, so tests and embedders decide
/// exactly when each side observes the other.
#[derive(Debug)]
pub struct Bridge {
    session: BridgeSession,
    runtime: TargetRuntime,
    target: TargetPort,
}

impl Bridge {
    /// Creates a bridge whose target knows the built-in kinds.
    #[must_use]
    pub fn new(config: BridgeConfig) -> Self {
        Self::with_decoder(config, NodeDecoder::with_builtin_kinds())
    }

    /// Creates a bridge whose target decodes with `decoder`.
    #[must_use]
    pub fn with_decoder(config: BridgeConfig, decoder: NodeDecoder) -> Self {
        let (host, target) = BridgeTransport::channel();
        let runtime = TargetRuntime::new(decoder, target.event_sink())
            .with_placeholder_label(config.placeholder_label());
        Self {
            session: BridgeSession::new(host, config),
            runtime,
            target,
        }
    }

    /// The host session.
    #[must_use]
    pub const fn session(&self) -> &BridgeSession {
        &self.session
    }

    /// The host session, for registering nodes and handlers.
    pub const fn session_mut(&mut self) -> &mut BridgeSession {
        &mut self.session
    }

    /// The target runtime.
    #[must_use]
    pub const fn runtime(&self) -> &TargetRuntime {
        &self.runtime
    }

    /// Delivers queued host messages to the target, then queued events to the host.
    pub fn pump(&mut self) -> Pumped {
        let messages = self.runtime.drain(&self.target);
        let events = self.session.process_events();
        Pumped { messages, events }
    }

    /// Tears down both sides.
    pub fn destroy(self) {
        self.session.destroy();
    }
}
