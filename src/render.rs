//! Staff rendering contract.
//!
//! The editor never draws anything itself. After every mutation it hands the
//! complete list of pitch labels to a [`StaffRenderer`], which draws a treble
//! clef, one stave and one quarter note per label. In the browser that is the
//! VexFlow page; headless callers can use [`MusicXmlRenderer`].

use crate::pitch::Pitch;

/// Draws the whole staff from scratch for the given labels.
///
/// An empty slice means "clef and stave only".
pub trait StaffRenderer {
    fn draw(&mut self, labels: &[&str]);
}

impl<R: StaffRenderer + ?Sized> StaffRenderer for &mut R {
    fn draw(&mut self, labels: &[&str]) {
        (**self).draw(labels)
    }
}

/// Renders each draw into a MusicXML document and keeps the latest one.
#[derive(Debug, Default, Clone)]
pub struct MusicXmlRenderer {
    document: String,
    draws: usize,
}

impl MusicXmlRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The document produced by the most recent draw.
    pub fn document(&self) -> &str {
        &self.document
    }

    /// Number of full redraws so far.
    pub fn draw_count(&self) -> usize {
        self.draws
    }
}

impl StaffRenderer for MusicXmlRenderer {
    fn draw(&mut self, labels: &[&str]) {
        self.document = to_musicxml(labels);
        self.draws += 1;
    }
}

/// Convert a label list to a single-measure MusicXML score.
///
/// The measure holds one quarter note per recognized label, with a time
/// signature of `n/4` so every note fits. Unrecognized labels are skipped.
pub fn to_musicxml(labels: &[&str]) -> String {
    let pitches: Vec<Pitch> = labels.iter().filter_map(|l| Pitch::from_label(l)).collect();
    let mut xml = String::new();

    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    xml.push('\n');
    xml.push_str(r#"<!DOCTYPE score-partwise PUBLIC "-//Recordare//DTD MusicXML 4.0 Partwise//EN" "http://www.musicxml.org/dtds/partwise.dtd">"#);
    xml.push('\n');
    xml.push_str(r#"<score-partwise version="4.0">"#);
    xml.push('\n');

    xml.push_str("  <part-list>\n");
    xml.push_str("    <score-part id=\"P1\">\n");
    xml.push_str("      <part-name>Music</part-name>\n");
    xml.push_str("    </score-part>\n");
    xml.push_str("  </part-list>\n");

    xml.push_str("  <part id=\"P1\">\n");
    xml.push_str("    <measure number=\"1\">\n");
    xml.push_str("      <attributes>\n");
    xml.push_str("        <divisions>1</divisions>\n");
    if !pitches.is_empty() {
        xml.push_str("        <time>\n");
        xml.push_str(&format!("          <beats>{}</beats>\n", pitches.len()));
        xml.push_str("          <beat-type>4</beat-type>\n");
        xml.push_str("        </time>\n");
    }
    xml.push_str("        <clef>\n");
    xml.push_str("          <sign>G</sign>\n");
    xml.push_str("          <line>2</line>\n");
    xml.push_str("        </clef>\n");
    xml.push_str("      </attributes>\n");

    for pitch in pitches {
        xml.push_str(&note_to_xml(pitch));
    }

    xml.push_str("    </measure>\n");
    xml.push_str("  </part>\n");
    xml.push_str("</score-partwise>\n");

    xml
}

fn note_to_xml(pitch: Pitch) -> String {
    // "c/4" -> step C, octave 4
    let (step, octave) = pitch.label().split_once('/').unwrap_or(("c", "4"));

    let mut xml = String::new();
    xml.push_str("      <note>\n");
    xml.push_str("        <pitch>\n");
    xml.push_str(&format!("          <step>{}</step>\n", step.to_ascii_uppercase()));
    xml.push_str(&format!("          <octave>{}</octave>\n", octave));
    xml.push_str("        </pitch>\n");
    xml.push_str("        <duration>1</duration>\n");
    xml.push_str("        <type>quarter</type>\n");
    xml.push_str("      </note>\n");
    xml
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_staff_has_clef_only() {
        let xml = to_musicxml(&[]);
        assert!(xml.contains("<score-partwise"));
        assert!(xml.contains("<sign>G</sign>"));
        assert!(!xml.contains("<note>"));
        assert!(!xml.contains("<time>"));
    }

    #[test]
    fn test_notes_in_order() {
        let xml = to_musicxml(&["c/4", "e/5", "g/4"]);
        assert!(xml.contains("<beats>3</beats>"));
        assert_eq!(xml.matches("<note>").count(), 3);

        let c = xml.find("<step>C</step>").unwrap();
        let e = xml.find("<step>E</step>").unwrap();
        let g = xml.find("<step>G</step>").unwrap();
        assert!(c < e && e < g);
        assert!(xml.contains("<octave>5</octave>"));
    }

    #[test]
    fn test_unknown_labels_skipped() {
        let xml = to_musicxml(&["z/9", "a/4"]);
        assert_eq!(xml.matches("<note>").count(), 1);
        assert!(xml.contains("<beats>1</beats>"));
    }

    #[test]
    fn test_renderer_keeps_latest_document() {
        let mut renderer = MusicXmlRenderer::new();
        renderer.draw(&["c/4"]);
        renderer.draw(&[]);
        assert_eq!(renderer.draw_count(), 2);
        assert!(!renderer.document().contains("<note>"));
    }
}
