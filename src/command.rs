//! Commands emitted by the router
//!
//! `Command` is consumed by the host (UI/session owner); `EngineCall` goes to
//! the sound engine. Both are one-shot values emitted in message order.

use serde::Serialize;
use std::fmt;

/// Transport buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportAction {
    Play,
    Stop,
    Record,
}

/// Typed command for the host session and UI
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    /// Switch the sequencer surface bank (0 = pads)
    BankChange { bank: u8 },
    /// Track volume in [0, 1]
    TrackVolume { track: usize, volume: f32 },
    /// Parameter value in [0, 1]. Negative ids are strip/knob UI-sync ids.
    ParameterChange { track: usize, parameter: i32, value: f32 },
    Transport { action: TransportAction },
    NextTrack,
    ToggleLearnMode,
    /// Strip 0-3 (faders) or 4-7 (knobs) picked while learn mode selects
    LearnSelect { strip: usize },
    MacroValue { index: usize, value: f32 },
    /// Velocity 0 means release
    NoteTriggered { note: u8, velocity: u8 },
    StepToggle { step: usize },
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Command::BankChange { bank } => write!(f, "BankChange({})", bank),
            Command::TrackVolume { track, volume } => {
                write!(f, "TrackVolume(track:{} vol:{:.3})", track, volume)
            }
            Command::ParameterChange { track, parameter, value } => {
                write!(f, "ParameterChange(track:{} param:{} v:{:.3})", track, parameter, value)
            }
            Command::Transport { action } => write!(f, "Transport({:?})", action),
            Command::NextTrack => write!(f, "NextTrack"),
            Command::ToggleLearnMode => write!(f, "ToggleLearnMode"),
            Command::LearnSelect { strip } => write!(f, "LearnSelect({})", strip),
            Command::MacroValue { index, value } => {
                write!(f, "MacroValue(macro:{} v:{:.3})", index, value)
            }
            Command::NoteTriggered { note, velocity } => {
                write!(f, "NoteTriggered(n:{} v:{})", note, velocity)
            }
            Command::StepToggle { step } => write!(f, "StepToggle({})", step),
        }
    }
}

/// Destination of a parameter write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamTarget {
    Track(usize),
    /// Global effect bus (not track-scoped)
    Global,
}

impl ParamTarget {
    /// Index used by the engine's flat parameter API (-1 = global)
    pub fn engine_index(self) -> i32 {
        match self {
            ParamTarget::Track(index) => index as i32,
            ParamTarget::Global => -1,
        }
    }
}

/// Synchronous call into the sound engine
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum EngineCall {
    TriggerNote { track: usize, note: u8, velocity: u8 },
    ReleaseNote { track: usize, note: u8 },
    SetTrackVolume { track: usize, volume: f32 },
    SetParameter { target: ParamTarget, parameter: i32, value: f32 },
    SetMacro { index: usize, value: f32 },
}

impl fmt::Display for EngineCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            EngineCall::TriggerNote { track, note, velocity } => {
                write!(f, "trigger-note(track:{} n:{} v:{})", track, note, velocity)
            }
            EngineCall::ReleaseNote { track, note } => {
                write!(f, "release-note(track:{} n:{})", track, note)
            }
            EngineCall::SetTrackVolume { track, volume } => {
                write!(f, "set-track-volume(track:{} vol:{:.3})", track, volume)
            }
            EngineCall::SetParameter { target, parameter, value } => write!(
                f,
                "set-parameter(target:{} param:{} v:{:.3})",
                target.engine_index(),
                parameter,
                value
            ),
            EngineCall::SetMacro { index, value } => {
                write!(f, "set-macro(macro:{} v:{:.3})", index, value)
            }
        }
    }
}
