//! # Export Endpoint
//!
//! The server half of "Export MIDI": take the JSON body the page posts,
//! encode it, overwrite the one export file and hand the bytes back for
//! download.
//!
//! ## Request
//! ```json
//! { "notes": ["c/4", "e/4", "g/4"] }
//! ```
//! A missing or `null` list, an empty body and unparseable JSON are all read
//! as an empty list, which still produces a valid MIDI file. Entries that are
//! not strings are kept in place as their JSON text, so they go through the
//! label policy like any other unknown label.
//!
//! ## Response
//! The file bytes plus the metadata a transport needs to offer them as an
//! attachment named `output.mid`.
//!
//! ## Limitations
//! Every export writes the same path. Two exports running at once race on
//! that file; the returned bytes are always the caller's own.

use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

use crate::editor::NoteSequence;
use crate::error::StaffError;
use crate::midi::{LabelPolicy, MidiDocument};

pub const DEFAULT_EXPORT_DIR: &str = "exports";
pub const DEFAULT_FILE_NAME: &str = "output.mid";
pub const MIDI_CONTENT_TYPE: &str = "audio/midi";

/// Body of an export request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRequest {
    #[serde(default, deserialize_with = "labels_or_empty")]
    pub notes: Vec<String>,
}

fn labels_or_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let entries = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(entries
        .into_iter()
        .map(|entry| match entry {
            Value::String(label) => label,
            other => other.to_string(),
        })
        .collect())
}

impl ExportRequest {
    pub fn new<S: Into<String>>(notes: impl IntoIterator<Item = S>) -> Self {
        Self {
            notes: notes.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse a request body, treating anything unusable as an empty list.
    pub fn from_json(body: &[u8]) -> Self {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Self::default();
        }
        match serde_json::from_slice(body) {
            Ok(request) => request,
            Err(e) => {
                warn!("unreadable export request, exporting no notes: {}", e);
                Self::default()
            }
        }
    }

    /// Resolve every label through `policy`, in request order.
    pub fn resolve(&self, policy: LabelPolicy) -> Result<NoteSequence, StaffError> {
        self.notes.iter().map(|label| policy.resolve(label)).collect()
    }
}

impl From<&NoteSequence> for ExportRequest {
    fn from(sequence: &NoteSequence) -> Self {
        Self::new(sequence.labels())
    }
}

/// Where and how exports are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSettings {
    pub dir: PathBuf,
    pub file_name: String,
    pub label_policy: LabelPolicy,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_EXPORT_DIR),
            file_name: DEFAULT_FILE_NAME.to_string(),
            label_policy: LabelPolicy::default(),
        }
    }
}

impl ExportSettings {
    pub fn validate(&self) -> Result<(), StaffError> {
        let name = Path::new(&self.file_name);
        if self.file_name.is_empty() || name.file_name() != Some(name.as_os_str()) {
            return Err(StaffError::ConfigError(format!(
                "file-name must be a bare file name, got '{}'",
                self.file_name
            )));
        }
        Ok(())
    }
}

/// A finished export, ready to be sent as a download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportResponse {
    pub file_name: String,
    pub path: PathBuf,
    pub bytes: Vec<u8>,
}

impl ExportResponse {
    pub fn content_type(&self) -> &'static str {
        MIDI_CONTENT_TYPE
    }

    pub fn content_disposition(&self) -> String {
        format!("attachment; filename=\"{}\"", self.file_name)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Exporter {
    settings: ExportSettings,
}

impl Exporter {
    pub fn new(settings: ExportSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &ExportSettings {
        &self.settings
    }

    /// Path every export overwrites.
    pub fn output_path(&self) -> PathBuf {
        self.settings.dir.join(&self.settings.file_name)
    }

    /// Handle one export request.
    pub fn export(&self, request: &ExportRequest) -> Result<ExportResponse, StaffError> {
        let document = MidiDocument::from_labels(&request.notes, self.settings.label_policy)?;
        self.write(&document)
    }

    /// Export a sequence straight from an editor.
    pub fn export_sequence(&self, sequence: &NoteSequence) -> Result<ExportResponse, StaffError> {
        self.write(&MidiDocument::from_sequence(sequence))
    }

    fn write(&self, document: &MidiDocument) -> Result<ExportResponse, StaffError> {
        let bytes = document.to_bytes()?;
        let path = self.output_path();

        fs::create_dir_all(&self.settings.dir)?;
        fs::write(&path, &bytes)?;
        info!(
            "wrote {} notes ({} bytes) to {}",
            document.notes().len(),
            bytes.len(),
            path.display()
        );

        Ok(ExportResponse {
            file_name: self.settings.file_name.clone(),
            path,
            bytes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::midi::labels_to_midi_bytes;
    use crate::pitch::Pitch;

    fn exporter_in(dir: &Path) -> Exporter {
        Exporter::new(ExportSettings {
            dir: dir.join("exports"),
            ..ExportSettings::default()
        })
    }

    #[test]
    fn test_request_parsing() {
        let request = ExportRequest::from_json(br#"{"notes": ["c/4", "g/5"]}"#);
        assert_eq!(request.notes, vec!["c/4", "g/5"]);
    }

    #[test]
    fn test_missing_or_malformed_body_is_empty() {
        let bodies: [&[u8]; 5] = [
            b"",
            b"  \n",
            b"{}",
            br#"{"notes": null}"#,
            b"{not json",
        ];
        for body in bodies {
            assert!(
                ExportRequest::from_json(body).notes.is_empty(),
                "{:?}",
                String::from_utf8_lossy(body)
            );
        }
    }

    #[test]
    fn test_non_string_entries_fall_back_per_note() {
        let request = ExportRequest::from_json(br#"{"notes": ["e/4", 5, "g/4"]}"#);
        assert_eq!(request.notes, vec!["e/4", "5", "g/4"]);

        let document = MidiDocument::from_labels(&request.notes, LabelPolicy::Lenient).unwrap();
        assert_eq!(document.notes(), &[64, 60, 67]);

        let strict = MidiDocument::from_labels(&request.notes, LabelPolicy::Strict);
        assert!(matches!(strict, Err(StaffError::UnknownPitch(label)) if label == "5"));
    }

    #[test]
    fn test_resolve_matches_encoded_notes() {
        let request = ExportRequest::new(["z/9", "a/4"]);
        let sequence = request.resolve(LabelPolicy::Lenient).unwrap();
        assert_eq!(sequence.as_slice(), &[Pitch::C4, Pitch::A4]);
        assert_eq!(crate::render::to_musicxml(&sequence.labels()).matches("<note>").count(), 2);

        assert!(request.resolve(LabelPolicy::Strict).is_err());
    }

    #[test]
    fn test_extra_fields_ignored() {
        let request = ExportRequest::from_json(br#"{"notes": ["a/4"], "tempo": 90}"#);
        assert_eq!(request.notes, vec!["a/4"]);
    }

    #[test]
    fn test_export_writes_and_returns_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = exporter_in(dir.path());

        let response = exporter.export(&ExportRequest::new(["c/4", "e/4", "g/4"])).unwrap();

        assert_eq!(response.file_name, "output.mid");
        assert_eq!(response.path, dir.path().join("exports").join("output.mid"));
        assert_eq!(fs::read(&response.path).unwrap(), response.bytes);
        assert_eq!(
            response.bytes,
            labels_to_midi_bytes(&["c/4", "e/4", "g/4"], LabelPolicy::Strict).unwrap()
        );
        assert_eq!(response.content_type(), "audio/midi");
        assert_eq!(response.content_disposition(), "attachment; filename=\"output.mid\"");
    }

    #[test]
    fn test_export_overwrites_fixed_file() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = exporter_in(dir.path());

        let first = exporter.export(&ExportRequest::new(["b/5", "b/5", "b/5"])).unwrap();
        let second = exporter.export(&ExportRequest::default()).unwrap();

        assert_eq!(first.path, second.path);
        assert_eq!(fs::read(&second.path).unwrap(), second.bytes);
        assert!(second.bytes.len() < first.bytes.len());
        assert_eq!(fs::read_dir(dir.path().join("exports")).unwrap().count(), 1);
    }

    #[test]
    fn test_strict_policy_rejects_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = Exporter::new(ExportSettings {
            dir: dir.path().join("exports"),
            label_policy: LabelPolicy::Strict,
            ..ExportSettings::default()
        });

        let result = exporter.export(&ExportRequest::new(["z/9"]));
        assert!(matches!(result, Err(StaffError::UnknownPitch(_))));
        assert!(!exporter.output_path().exists());
    }

    #[test]
    fn test_export_sequence_matches_request() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = exporter_in(dir.path());
        let seq: NoteSequence = [Pitch::F4, Pitch::A5].into_iter().collect();

        let direct = exporter.export_sequence(&seq).unwrap();
        let via_request = exporter.export(&ExportRequest::from(&seq)).unwrap();
        assert_eq!(direct.bytes, via_request.bytes);
    }

    #[test]
    fn test_settings_validation() {
        assert!(ExportSettings::default().validate().is_ok());
        for name in ["", "../output.mid", "sub/output.mid"] {
            let settings = ExportSettings {
                file_name: name.to_string(),
                ..ExportSettings::default()
            };
            assert!(settings.validate().is_err(), "{}", name);
        }
    }
}
