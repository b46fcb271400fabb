//! Router module - Core orchestration of surface messages into commands
//!
//! One synchronous pass per inbound message:
//! - Decode the raw buffer (short buffers are dropped)
//! - Echo/self-test loop for pad presses
//! - Note path (channel filter, reserved range, pad remapping)
//! - Control-change path (fixed CC table, routing slots, learn select)
//!
//! The router never mutates the session: it reads `RoutingState` and returns
//! a `RouteOutcome` for the host to apply.

mod control_path;
mod echo;
mod note_path;

pub use control_path::{control_action, ControlAction};


use crate::command::{Command, EngineCall};
use crate::engine::SoundEngine;
use crate::midi::{MessageKind, RawMessage};
use crate::state::RoutingState;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::trace;

/// Everything produced by routing one message, in emission order
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RouteOutcome {
    /// Commands for the host session / UI
    pub commands: Vec<Command>,
    /// Calls for the sound engine
    pub engine_calls: Vec<EngineCall>,
    /// Raw buffers to send back to the surface
    pub echo: Vec<[u8; 3]>,
}

impl RouteOutcome {
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty() && self.engine_calls.is_empty() && self.echo.is_empty()
    }

    /// Forward engine calls in order
    pub fn dispatch(&self, engine: &mut dyn SoundEngine) {
        for call in &self.engine_calls {
            engine.call(call);
        }
    }

    fn push(&mut self, command: Command) {
        self.commands.push(command);
    }

    fn call(&mut self, call: EngineCall) {
        self.engine_calls.push(call);
    }
}

/// Message counters since the router was created
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RouterStats {
    pub received: u64,
    /// Messages that produced nothing
    pub dropped: u64,
}

/// Surface message router
#[derive(Debug, Default)]
pub struct Router {
    received: AtomicU64,
    dropped: AtomicU64,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route one raw message against the current session.
    ///
    /// Never fails: malformed or unmapped input yields an empty outcome.
    pub fn route(&self, raw: &[u8], state: &RoutingState) -> RouteOutcome {
        self.received.fetch_add(1, Ordering::Relaxed);
        let mut out = RouteOutcome::default();

        match RawMessage::decode(raw) {
            Some(msg) => self.route_message(&msg, state, &mut out),
            None => trace!("Dropped short buffer ({} bytes)", raw.len()),
        }

        if out.is_empty() {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
        out
    }

    fn route_message(&self, msg: &RawMessage, state: &RoutingState, out: &mut RouteOutcome) {
        trace!("Routing {}", msg);

        if state.echo_test && msg.is_note_on() {
            self.echo_pad(msg, state, out);
            return;
        }

        match msg.kind {
            MessageKind::NoteOn | MessageKind::NoteOff => self.route_note(msg, state, out),
            MessageKind::ControlChange => self.route_control(msg, state, out),
            MessageKind::Other(nibble) => trace!("Ignored status 0x{:02X}", nibble),
        }
    }

    pub fn stats(&self) -> RouterStats {
        RouterStats {
            received: self.received.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
        }
    }
}
