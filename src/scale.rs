//! Musical scales used by the pad note remapper

use serde::{Deserialize, Serialize};

/// Minimum number of scale notes generated for pad lookup
pub const SCALE_NOTE_COUNT: usize = 24;

const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Scale types available on the pads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleType {
    Chromatic,
    #[default]
    Major,
    NaturalMinor,
    HarmonicMinor,
    MelodicMinor,
    PentatonicMajor,
    PentatonicMinor,
    Blues,
    Dorian,
    Phrygian,
    Lydian,
    Mixolydian,
    Locrian,
    WholeTone,
    DiminishedWh,
    DiminishedHw,
    Augmented,
    Enigmatic,
    NeapolitanMajor,
    NeapolitanMinor,
    BebopMajor,
    BebopMinor,
    SpanishGypsy,
    Flamenco,
}

impl ScaleType {
    /// All scales, in display order
    pub const ALL: [ScaleType; 24] = [
        ScaleType::Chromatic,
        ScaleType::Major,
        ScaleType::NaturalMinor,
        ScaleType::HarmonicMinor,
        ScaleType::MelodicMinor,
        ScaleType::PentatonicMajor,
        ScaleType::PentatonicMinor,
        ScaleType::Blues,
        ScaleType::Dorian,
        ScaleType::Phrygian,
        ScaleType::Lydian,
        ScaleType::Mixolydian,
        ScaleType::Locrian,
        ScaleType::WholeTone,
        ScaleType::DiminishedWh,
        ScaleType::DiminishedHw,
        ScaleType::Augmented,
        ScaleType::Enigmatic,
        ScaleType::NeapolitanMajor,
        ScaleType::NeapolitanMinor,
        ScaleType::BebopMajor,
        ScaleType::BebopMinor,
        ScaleType::SpanishGypsy,
        ScaleType::Flamenco,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            ScaleType::Chromatic => "Chromatic",
            ScaleType::Major => "Major",
            ScaleType::NaturalMinor => "Natural Minor",
            ScaleType::HarmonicMinor => "Harmonic Minor",
            ScaleType::MelodicMinor => "Melodic Minor",
            ScaleType::PentatonicMajor => "Pentatonic Major",
            ScaleType::PentatonicMinor => "Pentatonic Minor",
            ScaleType::Blues => "Blues",
            ScaleType::Dorian => "Dorian",
            ScaleType::Phrygian => "Phrygian",
            ScaleType::Lydian => "Lydian",
            ScaleType::Mixolydian => "Mixolydian",
            ScaleType::Locrian => "Locrian",
            ScaleType::WholeTone => "Whole Tone",
            ScaleType::DiminishedWh => "Diminished (W-H)",
            ScaleType::DiminishedHw => "Diminished (H-W)",
            ScaleType::Augmented => "Augmented",
            ScaleType::Enigmatic => "Enigmatic",
            ScaleType::NeapolitanMajor => "Neapolitan Major",
            ScaleType::NeapolitanMinor => "Neapolitan Minor",
            ScaleType::BebopMajor => "Bebop Major",
            ScaleType::BebopMinor => "Bebop Minor",
            ScaleType::SpanishGypsy => "Spanish",
            ScaleType::Flamenco => "Flamenco",
        }
    }

    /// Semitone offsets from the root, ascending within one octave
    pub fn intervals(self) -> &'static [u8] {
        match self {
            ScaleType::Chromatic => &[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11],
            ScaleType::Major => &[0, 2, 4, 5, 7, 9, 11],
            ScaleType::NaturalMinor => &[0, 2, 3, 5, 7, 8, 10],
            ScaleType::HarmonicMinor => &[0, 2, 3, 5, 7, 8, 11],
            ScaleType::MelodicMinor => &[0, 2, 3, 5, 7, 9, 11],
            ScaleType::PentatonicMajor => &[0, 2, 4, 7, 9],
            ScaleType::PentatonicMinor => &[0, 3, 5, 7, 10],
            ScaleType::Blues => &[0, 3, 5, 6, 7, 10],
            ScaleType::Dorian => &[0, 2, 3, 5, 7, 9, 10],
            ScaleType::Phrygian => &[0, 1, 3, 5, 7, 8, 10],
            ScaleType::Lydian => &[0, 2, 4, 6, 7, 9, 11],
            ScaleType::Mixolydian => &[0, 2, 4, 5, 7, 9, 10],
            ScaleType::Locrian => &[0, 1, 3, 5, 6, 8, 10],
            ScaleType::WholeTone => &[0, 2, 4, 6, 8, 10],
            ScaleType::DiminishedWh => &[0, 2, 3, 5, 6, 8, 9, 11],
            ScaleType::DiminishedHw => &[0, 1, 3, 4, 6, 7, 9, 10],
            ScaleType::Augmented => &[0, 3, 4, 7, 8, 11],
            ScaleType::Enigmatic => &[0, 1, 4, 6, 8, 10, 11],
            ScaleType::NeapolitanMajor => &[0, 1, 3, 5, 7, 9, 11],
            ScaleType::NeapolitanMinor => &[0, 1, 3, 5, 7, 8, 11],
            ScaleType::BebopMajor => &[0, 2, 4, 5, 7, 8, 9, 11],
            ScaleType::BebopMinor => &[0, 2, 3, 4, 5, 7, 9, 10],
            ScaleType::SpanishGypsy => &[0, 1, 4, 5, 7, 8, 10],
            ScaleType::Flamenco => &[0, 1, 3, 4, 5, 7, 8, 10],
        }
    }
}

/// Ascending scale notes from `root` up to 127.
///
/// Notes above 127 are skipped; generation stops once an octave root passes 127.
fn scale_notes(root: u8, scale: ScaleType) -> impl Iterator<Item = u8> {
    (root as u16..=127)
        .step_by(12)
        .flat_map(move |octave_root| {
            scale
                .intervals()
                .iter()
                .map(move |&interval| octave_root + interval as u16)
        })
        .filter(|&note| note <= 127)
        .map(|note| note as u8)
}

/// Generate up to `count` ascending scale notes starting at `root`.
///
/// High roots yield fewer than `count` notes.
pub fn generate_scale_notes(root: u8, scale: ScaleType, count: usize) -> Vec<u8> {
    scale_notes(root, scale).take(count).collect()
}

/// The `index`-th note of the scale from `root`, without building the list
pub fn scale_note(root: u8, scale: ScaleType, index: usize) -> Option<u8> {
    scale_notes(root, scale).nth(index)
}

/// Note name with octave, e.g. 60 -> "C4"
pub fn note_name(note: u8) -> String {
    let octave = (note / 12) as i32 - 1;
    format!("{}{}", NOTE_NAMES[(note % 12) as usize], octave)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_major_from_c3() {
        let notes = generate_scale_notes(48, ScaleType::Major, 8);
        assert_eq!(notes, vec![48, 50, 52, 53, 55, 57, 59, 60]);
    }

    #[test]
    fn test_generates_requested_count() {
        for scale in ScaleType::ALL {
            let notes = generate_scale_notes(36, scale, SCALE_NOTE_COUNT);
            assert_eq!(notes.len(), SCALE_NOTE_COUNT, "{}", scale.display_name());
            assert!(notes.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn test_high_root_truncates() {
        let notes = generate_scale_notes(120, ScaleType::Major, SCALE_NOTE_COUNT);
        assert_eq!(notes, vec![120, 122, 124, 125, 127]);
    }

    #[test]
    fn test_scale_note_matches_generated_list() {
        for scale in ScaleType::ALL {
            for root in [0u8, 36, 48, 60, 100, 120, 127] {
                let notes = generate_scale_notes(root, scale, SCALE_NOTE_COUNT);
                for index in 0..SCALE_NOTE_COUNT {
                    assert_eq!(
                        scale_note(root, scale, index),
                        notes.get(index).copied(),
                        "{} root {} index {}",
                        scale.display_name(),
                        root,
                        index
                    );
                }
            }
        }
        assert_eq!(scale_note(120, ScaleType::Major, 4), Some(127));
        assert_eq!(scale_note(120, ScaleType::Major, 5), None);
    }

    #[test]
    fn test_intervals_start_at_root() {
        for scale in ScaleType::ALL {
            let intervals = scale.intervals();
            assert_eq!(intervals[0], 0);
            assert!(intervals.iter().all(|&i| i < 12));
        }
    }

    #[test]
    fn test_note_names() {
        assert_eq!(note_name(48), "C3");
        assert_eq!(note_name(60), "C4");
        assert_eq!(note_name(61), "C#4");
        assert_eq!(note_name(0), "C-1");
    }

    #[test]
    fn test_serde_names() {
        let scale: ScaleType = serde_yaml::from_str("harmonic_minor").unwrap();
        assert_eq!(scale, ScaleType::HarmonicMinor);
    }
}
