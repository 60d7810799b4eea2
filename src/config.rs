//! # Configuration
//!
//! Optional YAML settings for the staff geometry, the export file and the
//! preview sound. Every key may be left out; missing keys keep their defaults.
//!
//! ```yaml
//! staff:
//!   top-margin: 40
//!   row-height: 10
//!   rows: [b/5, a/5, g/5, f/5, e/5, d/5, c/5, b/4, a/4, g/4, f/4, e/4, d/4, c/4]
//! export:
//!   dir: exports
//!   file-name: output.mid
//!   label-policy: strict
//! preview:
//!   note-spacing: 0.5
//!   note-length: 0.5
//!   peak-gain: 0.1
//!   decay-time: 0.4
//!   floor-gain: 0.0001
//! ```
//!
//! The file is read into raw optional fields, then merged over the defaults
//! and validated, so a bad value is reported by name rather than as a serde
//! type error where possible.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::editor::StaffLayout;
use crate::error::StaffError;
use crate::export::ExportSettings;
use crate::midi::LabelPolicy;
use crate::pitch::Pitch;
use crate::preview::PreviewSettings;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub staff: StaffLayout,
    pub export: ExportSettings,
    pub preview: PreviewSettings,
}

/// Raw configuration for YAML deserialization
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct RawConfig {
    staff: Option<RawStaff>,
    export: Option<RawExport>,
    preview: Option<RawPreview>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct RawStaff {
    top_margin: Option<f64>,
    row_height: Option<f64>,
    rows: Option<Vec<String>>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct RawExport {
    dir: Option<PathBuf>,
    file_name: Option<String>,
    label_policy: Option<LabelPolicy>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct RawPreview {
    note_spacing: Option<f64>,
    note_length: Option<f64>,
    peak_gain: Option<f64>,
    decay_time: Option<f64>,
    floor_gain: Option<f64>,
}

impl Config {
    /// Parse and validate a YAML document. An empty document gives the defaults.
    pub fn from_yaml(content: &str) -> Result<Self, StaffError> {
        let has_content = content
            .lines()
            .map(str::trim)
            .any(|line| !line.is_empty() && !line.starts_with('#'));
        let raw: RawConfig = if has_content {
            serde_yaml::from_str(content).map_err(|e| StaffError::ConfigError(e.to_string()))?
        } else {
            RawConfig::default()
        };

        let mut config = Config::default();

        if let Some(staff) = raw.staff {
            if let Some(margin) = staff.top_margin {
                config.staff.top_margin = margin;
            }
            if let Some(height) = staff.row_height {
                config.staff.row_height = height;
            }
            if let Some(rows) = staff.rows {
                config.staff.rows = parse_rows(&rows)?;
            }
        }

        if let Some(export) = raw.export {
            if let Some(dir) = export.dir {
                config.export.dir = dir;
            }
            if let Some(name) = export.file_name {
                config.export.file_name = name;
            }
            if let Some(policy) = export.label_policy {
                config.export.label_policy = policy;
            }
        }

        if let Some(preview) = raw.preview {
            let p = &mut config.preview;
            p.note_spacing = preview.note_spacing.unwrap_or(p.note_spacing);
            p.note_length = preview.note_length.unwrap_or(p.note_length);
            p.peak_gain = preview.peak_gain.unwrap_or(p.peak_gain);
            p.decay_time = preview.decay_time.unwrap_or(p.decay_time);
            p.floor_gain = preview.floor_gain.unwrap_or(p.floor_gain);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, StaffError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            StaffError::ConfigError(format!("cannot read '{}': {}", path.display(), e))
        })?;
        Self::from_yaml(&content)
    }

    pub fn validate(&self) -> Result<(), StaffError> {
        self.staff.validate()?;
        self.export.validate()?;
        self.preview.validate()?;
        Ok(())
    }
}

fn parse_rows(labels: &[String]) -> Result<Vec<Pitch>, StaffError> {
    labels
        .iter()
        .map(|label| {
            Pitch::from_label(label)
                .ok_or_else(|| StaffError::ConfigError(format!("unknown pitch '{}' in staff rows", label)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_is_default() {
        assert_eq!(Config::from_yaml("").unwrap(), Config::default());
        assert_eq!(Config::from_yaml("# nothing here\n").unwrap(), Config::default());
    }

    #[test]
    fn test_partial_override() {
        let config = Config::from_yaml(
            r#"
staff:
  row-height: 12
export:
  label-policy: strict
preview:
  peak-gain: 0.2
"#,
        )
        .unwrap();

        assert_eq!(config.staff.row_height, 12.0);
        assert_eq!(config.staff.top_margin, 40.0);
        assert_eq!(config.staff.rows.len(), 14);
        assert_eq!(config.export.label_policy, LabelPolicy::Strict);
        assert_eq!(config.export.file_name, "output.mid");
        assert_eq!(config.preview.peak_gain, 0.2);
        assert_eq!(config.preview.note_spacing, 0.5);
    }

    #[test]
    fn test_custom_rows() {
        let config = Config::from_yaml("staff:\n  rows: [c/5, c/4]\n").unwrap();
        assert_eq!(config.staff.rows, vec![Pitch::C5, Pitch::C4]);
    }

    #[test]
    fn test_unknown_row_label() {
        let err = Config::from_yaml("staff:\n  rows: [c/5, h/2]\n").unwrap_err();
        assert!(err.to_string().contains("h/2"));
    }

    #[test]
    fn test_invalid_values() {
        for yaml in [
            "staff:\n  row-height: 0\n",
            "export:\n  file-name: ../escape.mid\n",
            "export:\n  label-policy: picky\n",
            "preview:\n  decay-time: 2\n",
            "staff:\n  colour: red\n",
            "- not\n- a map\n",
        ] {
            assert!(
                matches!(Config::from_yaml(yaml), Err(StaffError::ConfigError(_))),
                "{}",
                yaml
            );
        }
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(err, StaffError::ConfigError(_)));
    }
}
