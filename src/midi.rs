//! # MIDI Encoding
//!
//! Turns a note sequence into a Standard MIDI File.
//!
//! ## Layout
//! ```text
//! MThd  format 1, 1 track, 480 ticks per quarter note
//! MTrk  delta 0    program change 0 (channel 0)
//!       delta 0    note on   <note> velocity 64     } once per pitch,
//!       delta 480  note off  <note> velocity 64     } in sequence order
//!       delta 0    end of track
//! ```
//!
//! Every note is a quarter note; notes follow each other with no gaps or
//! overlaps. The encoding depends only on the input, so exporting the same
//! sequence twice gives identical bytes.
//!
//! ## Label Policy
//! Export requests arrive as label strings. Under [`LabelPolicy::Lenient`] an
//! unrecognized label is written as middle C (note 60) and logged; under
//! [`LabelPolicy::Strict`] it is rejected with [`StaffError::UnknownPitch`].
//!
//! ```rust
//! use staffmidi::{LabelPolicy, MidiDocument};
//!
//! let doc = MidiDocument::from_labels(&["e/4", "z/9"], LabelPolicy::Lenient).unwrap();
//! assert_eq!(doc.notes(), &[64, 60]);
//! assert!(MidiDocument::from_labels(&["z/9"], LabelPolicy::Strict).is_err());
//! ```

use log::warn;
use midly::num::{u15, u28, u4, u7};
use midly::{Format, Header, MetaMessage, MidiMessage, Smf, Timing, Track, TrackEvent, TrackEventKind};
use serde::{Deserialize, Serialize};

use crate::editor::NoteSequence;
use crate::error::StaffError;
use crate::pitch::Pitch;

/// Metrical division written to the header.
pub const TICKS_PER_QUARTER: u16 = 480;
/// Length of every note.
pub const NOTE_TICKS: u32 = 480;
/// Velocity of both note-on and note-off.
pub const NOTE_VELOCITY: u8 = 64;
/// General MIDI program 0 (acoustic grand piano).
pub const DEFAULT_PROGRAM: u8 = 0;
pub const CHANNEL: u8 = 0;

/// What to do with a label that is not in the pitch table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelPolicy {
    /// Substitute middle C and log a warning.
    #[default]
    Lenient,
    /// Fail with `StaffError::UnknownPitch`.
    Strict,
}

impl LabelPolicy {
    /// Resolve one label under this policy.
    pub fn resolve(self, label: &str) -> Result<Pitch, StaffError> {
        match (Pitch::from_label(label), self) {
            (Some(pitch), _) => Ok(pitch),
            (None, LabelPolicy::Lenient) => {
                warn!("unknown pitch label '{}', writing middle C", label);
                Ok(Pitch::MIDDLE_C)
            }
            (None, LabelPolicy::Strict) => Err(StaffError::UnknownPitch(label.to_string())),
        }
    }
}

/// Immutable snapshot of the notes to export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MidiDocument {
    notes: Vec<u8>,
}

impl MidiDocument {
    pub fn from_sequence(sequence: &NoteSequence) -> Self {
        Self {
            notes: sequence.iter().map(|p| p.midi_note()).collect(),
        }
    }

    pub fn from_labels<S: AsRef<str>>(labels: &[S], policy: LabelPolicy) -> Result<Self, StaffError> {
        let notes = labels
            .iter()
            .map(|label| policy.resolve(label.as_ref()).map(Pitch::midi_note))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { notes })
    }

    /// MIDI note numbers in playback order.
    pub fn notes(&self) -> &[u8] {
        &self.notes
    }

    /// Track events including the trailing end-of-track.
    pub fn track(&self) -> Track<'static> {
        let channel = u4::new(CHANNEL);
        let vel = u7::new(NOTE_VELOCITY);
        let mut track = Vec::with_capacity(self.notes.len() * 2 + 2);

        track.push(TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Midi {
                channel,
                message: MidiMessage::ProgramChange {
                    program: u7::new(DEFAULT_PROGRAM),
                },
            },
        });

        for &note in &self.notes {
            let key = u7::new(note);
            track.push(TrackEvent {
                delta: u28::new(0),
                kind: TrackEventKind::Midi {
                    channel,
                    message: MidiMessage::NoteOn { key, vel },
                },
            });
            track.push(TrackEvent {
                delta: u28::new(NOTE_TICKS),
                kind: TrackEventKind::Midi {
                    channel,
                    message: MidiMessage::NoteOff { key, vel },
                },
            });
        }

        track.push(TrackEvent {
            delta: u28::new(0),
            kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
        });

        track
    }

    /// Encode as a complete MIDI file.
    pub fn to_bytes(&self) -> Result<Vec<u8>, StaffError> {
        let smf = Smf {
            header: Header {
                format: Format::Parallel,
                timing: Timing::Metrical(u15::new(TICKS_PER_QUARTER)),
            },
            tracks: vec![self.track()],
        };

        let mut buffer = Vec::new();
        smf.write_std(&mut buffer)
            .map_err(|e| StaffError::ExportFailed(e.to_string()))?;
        Ok(buffer)
    }
}

/// Encode a sequence placed in the editor.
pub fn to_midi_bytes(sequence: &NoteSequence) -> Result<Vec<u8>, StaffError> {
    MidiDocument::from_sequence(sequence).to_bytes()
}

/// Encode labels as received from an export request.
pub fn labels_to_midi_bytes<S: AsRef<str>>(labels: &[S], policy: LabelPolicy) -> Result<Vec<u8>, StaffError> {
    MidiDocument::from_labels(labels, policy)?.to_bytes()
}
