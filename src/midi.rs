//! MIDI utilities and message types
//!
//! Decodes raw control-surface buffers into classified channel messages,
//! encodes echo messages back to the surface, and converts 7-bit values.

use serde::Serialize;
use std::fmt;

/// Channel filter value meaning "listen on every channel"
pub const OMNI_CHANNEL: u8 = 17;

/// Highest 7-bit data value
pub const MAX_DATA: u8 = 0x7F;

/// Message kind, taken from the upper status nibble
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    /// Note Off (0x8_)
    NoteOff,
    /// Note On (0x9_), velocity 0 is a release
    NoteOn,
    /// Control Change (0xB_)
    ControlChange,
    /// Any other status nibble (ignored by the router)
    Other(u8),
}

impl MessageKind {
    /// Classify a status byte
    pub fn from_status(status: u8) -> Self {
        match status & 0xF0 {
            0x80 => MessageKind::NoteOff,
            0x90 => MessageKind::NoteOn,
            0xB0 => MessageKind::ControlChange,
            nibble => MessageKind::Other(nibble),
        }
    }

    /// Status nibble (`status & 0xF0`) for this kind
    pub fn status_nibble(self) -> u8 {
        match self {
            MessageKind::NoteOff => 0x80,
            MessageKind::NoteOn => 0x90,
            MessageKind::ControlChange => 0xB0,
            MessageKind::Other(nibble) => nibble,
        }
    }

    pub fn is_note(self) -> bool {
        matches!(self, MessageKind::NoteOff | MessageKind::NoteOn)
    }
}

/// Decoded channel message.
///
/// All fields are derived from the input buffer; no reference to the buffer
/// is kept. `channel` is 1-based (1-16).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawMessage {
    pub kind: MessageKind,
    pub channel: u8,
    pub data1: u8,
    pub data2: u8,
}

impl RawMessage {
    /// Decode a raw buffer.
    ///
    /// Buffers shorter than three bytes are rejected. Bytes past the third
    /// are ignored.
    pub fn decode(data: &[u8]) -> Option<Self> {
        let &[status, data1, data2, ..] = data else {
            return None;
        };

        Some(Self {
            kind: MessageKind::from_status(status),
            channel: (status & 0x0F) + 1,
            data1: data1 & MAX_DATA,
            data2: data2 & MAX_DATA,
        })
    }

    /// Upper nibble of the status byte
    pub fn status_nibble(&self) -> u8 {
        self.kind.status_nibble()
    }

    /// Note On with a non-zero velocity
    pub fn is_note_on(&self) -> bool {
        self.kind == MessageKind::NoteOn && self.data2 > 0
    }

    /// Note Off of any velocity, or Note On with velocity 0
    pub fn is_note_release(&self) -> bool {
        match self.kind {
            MessageKind::NoteOff => true,
            MessageKind::NoteOn => self.data2 == 0,
            _ => false,
        }
    }

    /// `data2` scaled into [0, 1]
    pub fn normalized_value(&self) -> f32 {
        convert::normalize_7bit(self.data2)
    }
}

impl fmt::Display for RawMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            MessageKind::NoteOff => {
                write!(f, "NoteOff ch:{} n:{} v:{}", self.channel, self.data1, self.data2)
            }
            MessageKind::NoteOn => {
                write!(f, "NoteOn ch:{} n:{} v:{}", self.channel, self.data1, self.data2)
            }
            MessageKind::ControlChange => {
                write!(f, "CC ch:{} cc:{} v:{}", self.channel, self.data1, self.data2)
            }
            MessageKind::Other(nibble) => {
                write!(f, "Status 0x{:02X} ch:{} d1:{} d2:{}", nibble, self.channel, self.data1, self.data2)
            }
        }
    }
}

/// Encode a Note On for the echo/self-test loop (channel is 1-based)
pub fn encode_note_on(channel: u8, note: u8, velocity: u8) -> [u8; 3] {
    [
        0x90 | (channel.saturating_sub(1) & 0x0F),
        note & MAX_DATA,
        velocity & MAX_DATA,
    ]
}

/// MIDI value conversion utilities
pub mod convert {
    /// Convert a 7-bit value (0-127) to [0, 1]
    pub fn normalize_7bit(value: u8) -> f32 {
        (value & 0x7F) as f32 / 127.0
    }
}

/// Format MIDI bytes as hex string for debugging
pub fn format_hex(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse a whitespace-separated hex string ("90 3C 64") into bytes
pub fn parse_hex(line: &str) -> Result<Vec<u8>, std::num::ParseIntError> {
    line.split_whitespace()
        .map(|token| {
            let token = token.trim_start_matches("0x").trim_start_matches("0X");
            u8::from_str_radix(token, 16)
        })
        .collect()
}
