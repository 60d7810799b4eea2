//! # Score Editor
//!
//! Session-scoped state for one staff: the ordered [`NoteSequence`] and the
//! click-to-pitch mapping that grows it.
//!
//! ## Click Mapping
//! A click's vertical offset (pixels from the top of the canvas) becomes a row
//! index by integer division:
//!
//! ```text
//! row = floor((offset - top_margin) / row_height)
//! ```
//!
//! The row is then looked up in the layout's row table, which lists pitches
//! from the top of the staff down. Higher on screen means higher pitch. Clicks
//! above the first row or below the last one are ignored without feedback.
//!
//! ## Redraw
//! Every mutation redraws the whole staff through the editor's
//! [`StaffRenderer`]; there is no incremental diffing.
//!
//! ## Example
//! ```rust
//! use staffmidi::{MusicXmlRenderer, ScoreEditor, StaffLayout};
//!
//! let mut editor = ScoreEditor::new(StaffLayout::default(), MusicXmlRenderer::new());
//! editor.register_click(175.0); // c/4
//! editor.register_click(5.0);   // above the staff, ignored
//! assert_eq!(editor.current_sequence().labels(), vec!["c/4"]);
//! ```

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::StaffError;
use crate::pitch::Pitch;
use crate::render::StaffRenderer;

/// Staff rows from top to bottom.
pub const DEFAULT_ROWS: [Pitch; 14] = [
    Pitch::B5,
    Pitch::A5,
    Pitch::G5,
    Pitch::F5,
    Pitch::E5,
    Pitch::D5,
    Pitch::C5,
    Pitch::B4,
    Pitch::A4,
    Pitch::G4,
    Pitch::F4,
    Pitch::E4,
    Pitch::D4,
    Pitch::C4,
];

pub const DEFAULT_TOP_MARGIN: f64 = 40.0;
pub const DEFAULT_ROW_HEIGHT: f64 = 10.0;

/// Geometry of the clickable staff.
#[derive(Debug, Clone, PartialEq)]
pub struct StaffLayout {
    pub top_margin: f64,
    pub row_height: f64,
    /// Row table, top row first.
    pub rows: Vec<Pitch>,
}

impl Default for StaffLayout {
    fn default() -> Self {
        Self {
            top_margin: DEFAULT_TOP_MARGIN,
            row_height: DEFAULT_ROW_HEIGHT,
            rows: DEFAULT_ROWS.to_vec(),
        }
    }
}

impl StaffLayout {
    /// Row index for a vertical offset, if it lands on the staff.
    pub fn row_at(&self, offset: f64) -> Option<usize> {
        let row = ((offset - self.top_margin) / self.row_height).floor();
        if !row.is_finite() || row < 0.0 || row >= self.rows.len() as f64 {
            return None;
        }
        Some(row as usize)
    }

    pub fn pitch_at(&self, offset: f64) -> Option<Pitch> {
        self.row_at(offset).map(|row| self.rows[row])
    }

    pub fn validate(&self) -> Result<(), StaffError> {
        if !self.top_margin.is_finite() {
            return Err(StaffError::ConfigError(
                "top-margin must be a finite number".to_string(),
            ));
        }
        if !self.row_height.is_finite() || self.row_height <= 0.0 {
            return Err(StaffError::ConfigError(format!(
                "row-height must be positive, got {}",
                self.row_height
            )));
        }
        if self.rows.is_empty() {
            return Err(StaffError::ConfigError(
                "rows must list at least one pitch".to_string(),
            ));
        }
        Ok(())
    }
}

/// Ordered pitches placed on the staff, in playback order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteSequence(Vec<Pitch>);

impl NoteSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, pitch: Pitch) {
        self.0.push(pitch);
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Pitch> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Pitch] {
        &self.0
    }

    /// Renderer labels in sequence order.
    pub fn labels(&self) -> Vec<&'static str> {
        self.0.iter().map(|p| p.label()).collect()
    }
}

impl FromIterator<Pitch> for NoteSequence {
    fn from_iter<I: IntoIterator<Item = Pitch>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a NoteSequence {
    type Item = &'a Pitch;
    type IntoIter = std::slice::Iter<'a, Pitch>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Interactive editor for one staff.
///
/// Owns its sequence and its renderer. Independent editors share nothing.
#[derive(Debug)]
pub struct ScoreEditor<R: StaffRenderer> {
    layout: StaffLayout,
    sequence: NoteSequence,
    renderer: R,
}

impl<R: StaffRenderer> ScoreEditor<R> {
    /// Create an empty editor and draw the bare staff.
    pub fn new(layout: StaffLayout, renderer: R) -> Self {
        let mut editor = Self {
            layout,
            sequence: NoteSequence::new(),
            renderer,
        };
        editor.redraw();
        editor
    }

    /// Place a note for a click at `offset` pixels from the top of the canvas.
    ///
    /// Returns the appended pitch, or `None` when the click missed the staff
    /// (nothing changes and nothing is redrawn).
    pub fn register_click(&mut self, offset: f64) -> Option<Pitch> {
        let pitch = self.layout.pitch_at(offset)?;
        debug!("click at {} placed {}", offset, pitch);
        self.sequence.push(pitch);
        self.redraw();
        Some(pitch)
    }

    /// Remove every note and redraw the empty staff.
    pub fn reset(&mut self) {
        self.sequence.clear();
        self.redraw();
    }

    pub fn current_sequence(&self) -> &NoteSequence {
        &self.sequence
    }

    /// Owned copy of the sequence, for hand-off to an exporter.
    pub fn snapshot(&self) -> NoteSequence {
        self.sequence.clone()
    }

    pub fn layout(&self) -> &StaffLayout {
        &self.layout
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn into_renderer(self) -> R {
        self.renderer
    }

    fn redraw(&mut self) {
        let labels = self.sequence.labels();
        self.renderer.draw(&labels);
    }
}
