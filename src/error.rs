//! Configuration error types

use thiserror::Error;

/// A configuration that parsed but cannot describe a session
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("at least one track must be configured")]
    NoTracks,

    #[error("track {track}: invalid midi_in channel {channel} (expected 0-17)")]
    InvalidChannel { track: usize, channel: u8 },

    #[error("selected track {selected} out of range ({tracks} tracks)")]
    SelectedTrackOutOfRange { selected: usize, tracks: usize },

    #[error("root note {0} out of range (0-127)")]
    RootNoteOutOfRange(u8),

    #[error("binding '{label}': slot {slot} out of range (0-7)")]
    SlotOutOfRange { label: String, slot: usize },

    #[error("binding '{label}': invalid value range [{min}, {max}]")]
    InvalidRange { label: String, min: f32, max: f32 },

    #[error("binding '{label}': macro {index} out of range ({count} macros)")]
    MacroOutOfRange { label: String, index: i32, count: usize },

    #[error("duplicate binding for slot {slot} in layer {layer}")]
    DuplicateBinding { layer: String, slot: usize },
}
