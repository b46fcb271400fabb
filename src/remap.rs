//! Pad note remapping
//!
//! Physical pads send fixed notes. In the pad bank they are translated into
//! either a drum map or the active scale, depending on the engine family of
//! the receiving track.

use crate::scale::{scale_note, ScaleType, SCALE_NOTE_COUNT};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Bank index of the pad/performance bank
pub const PAD_BANK: u8 = 0;

/// First note of the 8-note drum map
pub const BASE_DRUM_NOTE: u8 = 60;

/// Drum map length
pub const DRUM_MAP_SIZE: usize = 8;

/// Number of physical pads
pub const PAD_COUNT: usize = 16;

/// Pad notes outside the pad bank are discarded in this range
pub const RESERVED_PAD_NOTES: RangeInclusive<u8> = 41..=95;

/// Zone table: physical note range -> first pad index of the zone.
///
/// The surface numbers its rows bottom-up (48 = bottom left) while pads are
/// indexed top-down, so the top row (60-63) is pads 0-3.
const PAD_ZONES: [(RangeInclusive<u8>, usize); 4] = [
    (60..=63, 0),
    (56..=59, 4),
    (52..=55, 8),
    (48..=51, 12),
];

/// Sound engine family of a track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineFamily {
    Subtractive,
    Fm,
    Sampler,
    Granular,
    Wavetable,
    FmDrum,
    AnalogDrum,
    Midi,
}

impl EngineFamily {
    pub fn is_drum(self) -> bool {
        matches!(self, EngineFamily::FmDrum | EngineFamily::AnalogDrum)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EngineFamily::Subtractive => "subtractive",
            EngineFamily::Fm => "fm",
            EngineFamily::Sampler => "sampler",
            EngineFamily::Granular => "granular",
            EngineFamily::Wavetable => "wavetable",
            EngineFamily::FmDrum => "fm_drum",
            EngineFamily::AnalogDrum => "analog_drum",
            EngineFamily::Midi => "midi",
        }
    }

    /// Default engine for track `index` of a fresh session
    pub fn default_for_track(index: usize) -> Self {
        match index {
            0 => EngineFamily::Subtractive,
            1 => EngineFamily::Fm,
            2 => EngineFamily::Wavetable,
            3 => EngineFamily::Sampler,
            4 => EngineFamily::Granular,
            5 => EngineFamily::FmDrum,
            6 => EngineFamily::AnalogDrum,
            _ => EngineFamily::Subtractive,
        }
    }
}

impl std::fmt::Display for EngineFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Resolve the pad index (0-15) of a physical note, if it falls in a zone
pub fn pad_index(note: u8) -> Option<usize> {
    PAD_ZONES
        .iter()
        .find(|(zone, _)| zone.contains(&note))
        .map(|(zone, offset)| offset + (note - zone.start()) as usize)
}

/// Whether a note on a non-pad bank must be discarded
pub fn is_reserved_outside_pad_bank(bank: u8, note: u8) -> bool {
    bank != PAD_BANK && RESERVED_PAD_NOTES.contains(&note)
}

/// Scale context of the pad surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PadScale {
    pub root: u8,
    pub scale: ScaleType,
}

/// Resolve the note a pad press should play.
///
/// Total: any input maps to some note. Outside the pad bank, or for notes
/// outside every zone, the physical note passes through unchanged.
pub fn resolve_note(note: u8, bank: u8, family: EngineFamily, scale: PadScale) -> u8 {
    if bank != PAD_BANK {
        return note;
    }

    let Some(pad) = pad_index(note) else {
        return note;
    };

    if family.is_drum() {
        return BASE_DRUM_NOTE + (pad % DRUM_MAP_SIZE) as u8;
    }

    if pad >= SCALE_NOTE_COUNT {
        return note;
    }
    scale_note(scale.root, scale.scale, pad).unwrap_or(note)
}
