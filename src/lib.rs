pub mod config;
pub mod editor;
pub mod error;
pub mod export;
pub mod midi;
pub mod pitch;
pub mod preview;
pub mod render;

pub use config::Config;
pub use editor::{NoteSequence, ScoreEditor, StaffLayout};
pub use error::*;
pub use export::{ExportRequest, ExportResponse, ExportSettings, Exporter};
pub use midi::{labels_to_midi_bytes, to_midi_bytes, LabelPolicy, MidiDocument};
pub use pitch::{Pitch, PitchInfo, PITCH_TABLE};
pub use preview::{preview_tones, schedule_preview, AudioSink, PreviewSettings, Tone};
pub use render::{to_musicxml, MusicXmlRenderer, StaffRenderer};

/// Encode an export request body straight to MIDI bytes.
/// This is the pure half of the export endpoint; nothing is written to disk.
pub fn encode_request(body: &[u8], policy: LabelPolicy) -> Result<Vec<u8>, StaffError> {
    let request = ExportRequest::from_json(body);
    labels_to_midi_bytes(&request.notes, policy)
}
