//! # Pitch Table
//!
//! The single source of truth for the 14 staff pitches (C4 to B5, diatonic).
//!
//! Each pitch carries three attributes, all read from [`PITCH_TABLE`]:
//! - **label** - the key string handed to the staff renderer (`"c/4"`)
//! - **MIDI note** - the note number written by the exporter (60-83)
//! - **frequency** - the oscillator frequency used by the preview
//!
//! Nothing is computed from the label at runtime; editing, rendering, preview
//! and export all look their values up here.
//!
//! ```rust
//! use staffmidi::Pitch;
//!
//! let g = Pitch::from_label("g/4").unwrap();
//! assert_eq!(g.midi_note(), 67);
//! assert_eq!(g.frequency(), 392.00);
//! assert_eq!(g.to_string(), "g/4");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::StaffError;

/// One of the 14 diatonic pitches between middle C and the B above the next C.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Pitch {
    C4,
    D4,
    E4,
    F4,
    G4,
    A4,
    B4,
    C5,
    D5,
    E5,
    F5,
    G5,
    A5,
    B5,
}

/// A row of the pitch table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PitchInfo {
    pub pitch: Pitch,
    pub label: &'static str,
    pub midi_note: u8,
    pub frequency: f64,
}

/// Pitch attributes in ascending order. Row `i` describes `Pitch::ALL[i]`.
pub static PITCH_TABLE: [PitchInfo; 14] = [
    PitchInfo { pitch: Pitch::C4, label: "c/4", midi_note: 60, frequency: 261.63 },
    PitchInfo { pitch: Pitch::D4, label: "d/4", midi_note: 62, frequency: 293.66 },
    PitchInfo { pitch: Pitch::E4, label: "e/4", midi_note: 64, frequency: 329.63 },
    PitchInfo { pitch: Pitch::F4, label: "f/4", midi_note: 65, frequency: 349.23 },
    PitchInfo { pitch: Pitch::G4, label: "g/4", midi_note: 67, frequency: 392.00 },
    PitchInfo { pitch: Pitch::A4, label: "a/4", midi_note: 69, frequency: 440.00 },
    PitchInfo { pitch: Pitch::B4, label: "b/4", midi_note: 71, frequency: 493.88 },
    PitchInfo { pitch: Pitch::C5, label: "c/5", midi_note: 72, frequency: 523.25 },
    PitchInfo { pitch: Pitch::D5, label: "d/5", midi_note: 74, frequency: 587.33 },
    PitchInfo { pitch: Pitch::E5, label: "e/5", midi_note: 76, frequency: 659.25 },
    PitchInfo { pitch: Pitch::F5, label: "f/5", midi_note: 77, frequency: 698.46 },
    PitchInfo { pitch: Pitch::G5, label: "g/5", midi_note: 79, frequency: 783.99 },
    PitchInfo { pitch: Pitch::A5, label: "a/5", midi_note: 81, frequency: 880.00 },
    PitchInfo { pitch: Pitch::B5, label: "b/5", midi_note: 83, frequency: 987.77 },
];

impl Pitch {
    /// All pitches, lowest first.
    pub const ALL: [Pitch; 14] = [
        Pitch::C4,
        Pitch::D4,
        Pitch::E4,
        Pitch::F4,
        Pitch::G4,
        Pitch::A4,
        Pitch::B4,
        Pitch::C5,
        Pitch::D5,
        Pitch::E5,
        Pitch::F5,
        Pitch::G5,
        Pitch::A5,
        Pitch::B5,
    ];

    /// Substituted for unrecognized labels under the lenient policy.
    pub const MIDDLE_C: Pitch = Pitch::C4;

    /// Table row for this pitch.
    pub fn info(self) -> &'static PitchInfo {
        &PITCH_TABLE[self as usize]
    }

    pub fn label(self) -> &'static str {
        self.info().label
    }

    pub fn midi_note(self) -> u8 {
        self.info().midi_note
    }

    pub fn frequency(self) -> f64 {
        self.info().frequency
    }

    /// Look a renderer label (`"c/4"` .. `"b/5"`) up in the table.
    /// Labels are matched exactly; `"C/4"` is not a pitch.
    pub fn from_label(label: &str) -> Option<Pitch> {
        PITCH_TABLE
            .iter()
            .find(|info| info.label == label)
            .map(|info| info.pitch)
    }
}

impl fmt::Display for Pitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Pitch {
    type Err = StaffError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Pitch::from_label(s).ok_or_else(|| StaffError::UnknownPitch(s.to_string()))
    }
}

impl TryFrom<String> for Pitch {
    type Error = StaffError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Pitch> for String {
    fn from(pitch: Pitch) -> Self {
        pitch.label().to_string()
    }
}
