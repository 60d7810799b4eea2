//! Audio preview scheduling.
//!
//! Each pitch at index `i` becomes one decaying sine tone:
//!
//! ```text
//! start      = i * note_spacing
//! decay_end  = start + decay_time     gain ramps peak_gain -> floor_gain
//! stop       = start + note_length
//! ```
//!
//! Tones go to an [`AudioSink`]; in the browser that is a Web Audio context,
//! with times taken relative to its current time. Scheduling a second preview
//! while one is playing simply layers both.

use serde::{Deserialize, Serialize};

use crate::editor::NoteSequence;
use crate::error::StaffError;

/// Timing and loudness of the preview, in seconds and linear gain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewSettings {
    pub note_spacing: f64,
    pub note_length: f64,
    pub peak_gain: f64,
    pub decay_time: f64,
    pub floor_gain: f64,
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self {
            note_spacing: 0.5,
            note_length: 0.5,
            peak_gain: 0.1,
            decay_time: 0.4,
            floor_gain: 0.0001,
        }
    }
}

impl PreviewSettings {
    pub fn validate(&self) -> Result<(), StaffError> {
        let timings = [
            ("note-spacing", self.note_spacing),
            ("note-length", self.note_length),
            ("decay-time", self.decay_time),
        ];
        for (name, value) in timings {
            if !value.is_finite() || value <= 0.0 {
                return Err(StaffError::ConfigError(format!(
                    "{} must be a positive number of seconds, got {}",
                    name, value
                )));
            }
        }
        if self.decay_time > self.note_length {
            return Err(StaffError::ConfigError(format!(
                "decay-time ({}) cannot exceed note-length ({})",
                self.decay_time, self.note_length
            )));
        }
        if !(self.peak_gain > 0.0 && self.peak_gain <= 1.0) {
            return Err(StaffError::ConfigError(format!(
                "peak-gain must be in (0, 1], got {}",
                self.peak_gain
            )));
        }
        // exponential ramps cannot reach zero
        if !(self.floor_gain > 0.0 && self.floor_gain < self.peak_gain) {
            return Err(StaffError::ConfigError(format!(
                "floor-gain must be above 0 and below peak-gain, got {}",
                self.floor_gain
            )));
        }
        Ok(())
    }
}

/// One scheduled oscillator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tone {
    pub frequency: f64,
    pub start: f64,
    pub stop: f64,
    pub peak_gain: f64,
    pub decay_end: f64,
    pub floor_gain: f64,
}

/// Receiver of scheduled tones.
pub trait AudioSink {
    fn schedule_tone(&mut self, tone: &Tone);
}

impl AudioSink for Vec<Tone> {
    fn schedule_tone(&mut self, tone: &Tone) {
        self.push(*tone);
    }
}

impl<S: AudioSink + ?Sized> AudioSink for &mut S {
    fn schedule_tone(&mut self, tone: &Tone) {
        (**self).schedule_tone(tone)
    }
}

/// Tone schedule for a sequence.
pub fn preview_tones(sequence: &NoteSequence, settings: &PreviewSettings) -> Vec<Tone> {
    sequence
        .iter()
        .enumerate()
        .map(|(i, pitch)| {
            let start = i as f64 * settings.note_spacing;
            Tone {
                frequency: pitch.frequency(),
                start,
                stop: start + settings.note_length,
                peak_gain: settings.peak_gain,
                decay_end: start + settings.decay_time,
                floor_gain: settings.floor_gain,
            }
        })
        .collect()
}

/// Hand every tone of the preview to `sink`, in sequence order.
pub fn schedule_preview<S: AudioSink>(sequence: &NoteSequence, settings: &PreviewSettings, mut sink: S) {
    for tone in preview_tones(sequence, settings) {
        sink.schedule_tone(&tone);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pitch::Pitch;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_empty_sequence_schedules_nothing() {
        let mut sink: Vec<Tone> = Vec::new();
        schedule_preview(&NoteSequence::new(), &PreviewSettings::default(), &mut sink);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_tone_timing() {
        let seq: NoteSequence = [Pitch::C4, Pitch::E4, Pitch::A4].into_iter().collect();
        let tones = preview_tones(&seq, &PreviewSettings::default());

        assert_eq!(tones.len(), 3);
        for (i, tone) in tones.iter().enumerate() {
            let start = i as f64 * 0.5;
            assert!(close(tone.start, start));
            assert!(close(tone.stop, start + 0.5));
            assert!(close(tone.decay_end, start + 0.4));
            assert!(close(tone.peak_gain, 0.1));
            assert!(close(tone.floor_gain, 0.0001));
        }
        assert_eq!(tones[0].frequency, 261.63);
        assert_eq!(tones[1].frequency, 329.63);
        assert_eq!(tones[2].frequency, 440.00);
    }

    #[test]
    fn test_sink_receives_tones_in_order() {
        let seq: NoteSequence = [Pitch::B5, Pitch::C4].into_iter().collect();
        let mut sink: Vec<Tone> = Vec::new();
        schedule_preview(&seq, &PreviewSettings::default(), &mut sink);
        assert_eq!(sink, preview_tones(&seq, &PreviewSettings::default()));
        assert!(sink[0].start < sink[1].start);
    }

    #[test]
    fn test_repeated_preview_layers() {
        let seq: NoteSequence = [Pitch::G4].into_iter().collect();
        let mut sink: Vec<Tone> = Vec::new();
        schedule_preview(&seq, &PreviewSettings::default(), &mut sink);
        schedule_preview(&seq, &PreviewSettings::default(), &mut sink);
        assert_eq!(sink.len(), 2);
        assert_eq!(sink[0], sink[1]);
    }

    #[test]
    fn test_settings_validation() {
        assert!(PreviewSettings::default().validate().is_ok());

        let bad = [
            PreviewSettings { note_spacing: 0.0, ..Default::default() },
            PreviewSettings { note_length: f64::NAN, ..Default::default() },
            PreviewSettings { decay_time: 0.6, ..Default::default() },
            PreviewSettings { peak_gain: 1.5, ..Default::default() },
            PreviewSettings { floor_gain: 0.0, ..Default::default() },
            PreviewSettings { floor_gain: 0.2, ..Default::default() },
        ];
        for settings in bad {
            assert!(
                matches!(settings.validate(), Err(StaffError::ConfigError(_))),
                "{:?} should be rejected",
                settings
            );
        }
    }
}
