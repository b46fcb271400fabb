//! Sound engine seam
//!
//! The router never talks to the audio engine directly; it returns
//! `EngineCall`s which the host forwards to a `SoundEngine` implementation.

use crate::command::{EngineCall, ParamTarget};
use tracing::{debug, info};

/// Synchronous sound engine interface.
///
/// Calls are fire-and-forget and must not block: they are made from the
/// thread that routes surface input.
pub trait SoundEngine {
    /// Engine name, for logs
    fn name(&self) -> &str;

    fn trigger_note(&mut self, track: usize, note: u8, velocity: u8);

    fn release_note(&mut self, track: usize, note: u8);

    fn set_track_volume(&mut self, track: usize, volume: f32);

    fn set_parameter(&mut self, target: ParamTarget, parameter: i32, value: f32);

    fn set_macro(&mut self, index: usize, value: f32);

    /// Dispatch a call to the matching method
    fn call(&mut self, call: &EngineCall) {
        match *call {
            EngineCall::TriggerNote { track, note, velocity } => self.trigger_note(track, note, velocity),
            EngineCall::ReleaseNote { track, note } => self.release_note(track, note),
            EngineCall::SetTrackVolume { track, volume } => self.set_track_volume(track, volume),
            EngineCall::SetParameter { target, parameter, value } => {
                self.set_parameter(target, parameter, value)
            }
            EngineCall::SetMacro { index, value } => self.set_macro(index, value),
        }
    }
}

/// Logs every engine call
///
/// Useful for:
/// - Exercising a surface without the audio engine
/// - Checking routing and learn assignments live
pub struct ConsoleEngine {
    name: String,
    call_count: u64,
}

impl ConsoleEngine {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            call_count: 0,
        }
    }

    pub fn call_count(&self) -> u64 {
        self.call_count
    }

    fn log(&mut self, call: EngineCall) {
        self.call_count += 1;
        info!(
            "🎛️ [{}] Engine '{}' → {} [call #{}]",
            chrono::Local::now().format("%H:%M:%S%.3f"),
            self.name,
            call,
            self.call_count
        );
        debug!(engine = %self.name, call = ?call, "ConsoleEngine call");
    }
}

impl SoundEngine for ConsoleEngine {
    fn name(&self) -> &str {
        &self.name
    }

    fn trigger_note(&mut self, track: usize, note: u8, velocity: u8) {
        self.log(EngineCall::TriggerNote { track, note, velocity });
    }

    fn release_note(&mut self, track: usize, note: u8) {
        self.log(EngineCall::ReleaseNote { track, note });
    }

    fn set_track_volume(&mut self, track: usize, volume: f32) {
        self.log(EngineCall::SetTrackVolume { track, volume });
    }

    fn set_parameter(&mut self, target: ParamTarget, parameter: i32, value: f32) {
        self.log(EngineCall::SetParameter { target, parameter, value });
    }

    fn set_macro(&mut self, index: usize, value: f32) {
        self.log(EngineCall::SetMacro { index, value });
    }
}

/// Records calls in order (tests, offline hosts)
#[derive(Debug, Default)]
pub struct RecordingEngine {
    pub calls: Vec<EngineCall>,
}

impl SoundEngine for RecordingEngine {
    fn name(&self) -> &str {
        "recording"
    }

    fn trigger_note(&mut self, track: usize, note: u8, velocity: u8) {
        self.calls.push(EngineCall::TriggerNote { track, note, velocity });
    }

    fn release_note(&mut self, track: usize, note: u8) {
        self.calls.push(EngineCall::ReleaseNote { track, note });
    }

    fn set_track_volume(&mut self, track: usize, volume: f32) {
        self.calls.push(EngineCall::SetTrackVolume { track, volume });
    }

    fn set_parameter(&mut self, target: ParamTarget, parameter: i32, value: f32) {
        self.calls.push(EngineCall::SetParameter { target, parameter, value });
    }

    fn set_macro(&mut self, index: usize, value: f32) {
        self.calls.push(EngineCall::SetMacro { index, value });
    }
}
