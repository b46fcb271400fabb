//! Session state type definitions

use crate::learn::LearnSession;
use crate::midi::OMNI_CHANNEL;
use crate::remap::{EngineFamily, PadScale};
use crate::routing::{RoutingTable, SLOT_COUNT};
use crate::scale::ScaleType;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

pub const DEFAULT_TRACK_COUNT: usize = 8;
pub const DEFAULT_MACRO_COUNT: usize = 6;
/// C3
pub const DEFAULT_ROOT_NOTE: u8 = 48;
/// Steps per track pattern
pub const STEP_COUNT: usize = 64;

/// MIDI-in channel filter of a track.
///
/// Serialized as the raw filter value: 0 = none, 1-16 = channel, 17 = omni.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ChannelFilter {
    /// Receives nothing
    None,
    /// Receives a single channel (1-16)
    Channel(u8),
    /// Receives every channel
    #[default]
    Omni,
}

impl ChannelFilter {
    pub fn from_raw(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(ChannelFilter::None),
            1..=16 => Some(ChannelFilter::Channel(raw)),
            OMNI_CHANNEL => Some(ChannelFilter::Omni),
            _ => None,
        }
    }

    pub fn as_raw(self) -> u8 {
        match self {
            ChannelFilter::None => 0,
            ChannelFilter::Channel(channel) => channel,
            ChannelFilter::Omni => OMNI_CHANNEL,
        }
    }

    /// Whether a message on `channel` (1-16) passes the filter
    pub fn accepts(self, channel: u8) -> bool {
        match self {
            ChannelFilter::None => false,
            ChannelFilter::Channel(own) => own == channel,
            ChannelFilter::Omni => true,
        }
    }
}

impl TryFrom<u8> for ChannelFilter {
    type Error = String;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        Self::from_raw(raw).ok_or_else(|| format!("invalid channel filter {} (expected 0-17)", raw))
    }
}

impl From<ChannelFilter> for u8 {
    fn from(filter: ChannelFilter) -> Self {
        filter.as_raw()
    }
}

/// Per-track state
#[derive(Debug, Clone, PartialEq)]
pub struct TrackState {
    pub engine: EngineFamily,
    pub midi_in: ChannelFilter,
    pub volume: f32,
    /// parameter id -> value
    pub parameters: BTreeMap<i32, f32>,
    pub steps: Vec<bool>,
}

impl TrackState {
    pub fn new(engine: EngineFamily) -> Self {
        Self {
            engine,
            midi_in: ChannelFilter::Omni,
            volume: 0.8,
            parameters: BTreeMap::new(),
            steps: vec![false; STEP_COUNT],
        }
    }

    pub fn with_channel(mut self, midi_in: ChannelFilter) -> Self {
        self.midi_in = midi_in;
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TransportState {
    pub playing: bool,
    pub recording: bool,
}

/// Everything the router reads for one routing pass
#[derive(Debug, Clone)]
pub struct RoutingState {
    pub tracks: Vec<TrackState>,
    pub selected_track: usize,
    /// 0 = pad bank, 1-3 = step-sequencer banks
    pub bank: u8,
    pub scale: ScaleType,
    pub root_note: u8,
    /// Hardware self-test: echo pad presses back to the surface
    pub echo_test: bool,
    pub routing: RoutingTable,
    pub learn: LearnSession,
    pub macros: Vec<f32>,
    /// Last UI-sync value per fader/knob slot
    pub strip_values: [f32; SLOT_COUNT],
    pub transport: TransportState,
    pub held_notes: BTreeSet<u8>,
    /// (note, velocity) of the last note-on
    pub last_note: Option<(u8, u8)>,
}

impl Default for RoutingState {
    fn default() -> Self {
        let tracks = (0..DEFAULT_TRACK_COUNT)
            .map(|i| TrackState::new(EngineFamily::default_for_track(i)))
            .collect();
        Self::with_tracks(tracks)
    }
}

impl RoutingState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh session over the given tracks
    pub fn with_tracks(tracks: Vec<TrackState>) -> Self {
        Self {
            tracks,
            selected_track: 0,
            bank: 0,
            scale: ScaleType::Major,
            root_note: DEFAULT_ROOT_NOTE,
            echo_test: false,
            routing: RoutingTable::new(),
            learn: LearnSession::new(),
            macros: vec![0.0; DEFAULT_MACRO_COUNT],
            strip_values: [0.5; SLOT_COUNT],
            transport: TransportState::default(),
            held_notes: BTreeSet::new(),
            last_note: None,
        }
    }

    /// The selected track, if the index is in range
    pub fn selected(&self) -> Option<&TrackState> {
        self.tracks.get(self.selected_track)
    }

    pub fn selected_mut(&mut self) -> Option<&mut TrackState> {
        self.tracks.get_mut(self.selected_track)
    }

    pub fn pad_scale(&self) -> PadScale {
        PadScale {
            root: self.root_note,
            scale: self.scale,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_filter_raw_values() {
        assert_eq!(ChannelFilter::from_raw(0), Some(ChannelFilter::None));
        assert_eq!(ChannelFilter::from_raw(10), Some(ChannelFilter::Channel(10)));
        assert_eq!(ChannelFilter::from_raw(17), Some(ChannelFilter::Omni));
        assert_eq!(ChannelFilter::from_raw(18), None);
        assert_eq!(ChannelFilter::Channel(3).as_raw(), 3);
    }

    #[test]
    fn test_channel_filter_accepts() {
        for channel in 1..=16 {
            assert!(ChannelFilter::Omni.accepts(channel));
            assert!(!ChannelFilter::None.accepts(channel));
        }
        assert!(ChannelFilter::Channel(2).accepts(2));
        assert!(!ChannelFilter::Channel(2).accepts(3));
    }

    #[test]
    fn test_channel_filter_yaml() {
        let filter: ChannelFilter = serde_yaml::from_str("17").unwrap();
        assert_eq!(filter, ChannelFilter::Omni);
        assert!(serde_yaml::from_str::<ChannelFilter>("42").is_err());
        assert_eq!(serde_yaml::to_string(&ChannelFilter::Channel(5)).unwrap().trim(), "5");
    }

    #[test]
    fn test_default_session() {
        let state = RoutingState::new();
        assert_eq!(state.tracks.len(), DEFAULT_TRACK_COUNT);
        assert_eq!(state.tracks[5].engine, EngineFamily::FmDrum);
        assert_eq!(state.tracks[6].engine, EngineFamily::AnalogDrum);
        assert!(state.tracks.iter().all(|t| t.midi_in == ChannelFilter::Omni));
        assert_eq!(state.macros.len(), DEFAULT_MACRO_COUNT);
        assert_eq!(state.pad_scale(), PadScale { root: 48, scale: ScaleType::Major });
        assert!(state.selected().is_some());
    }

    #[test]
    fn test_selected_out_of_range() {
        let mut state = RoutingState::new();
        state.selected_track = 99;
        assert!(state.selected().is_none());
    }
}
