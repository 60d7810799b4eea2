use serde::Serialize;
use staffmidi::{
    preview_tones, Exporter, LabelPolicy, MidiDocument, PreviewSettings, ScoreEditor, StaffError,
    StaffLayout, StaffRenderer,
};
use wasm_bindgen::prelude::*;

#[derive(Serialize)]
struct BindingError {
    message: String,
    label: Option<String>,
}

fn to_binding_error(e: StaffError) -> BindingError {
    match e {
        StaffError::UnknownPitch(label) => BindingError {
            message: format!("Unknown pitch label '{}'", label),
            label: Some(label),
        },
        other => BindingError {
            message: other.to_string(),
            label: None,
        },
    }
}

fn to_js_error(e: StaffError) -> JsValue {
    let error = to_binding_error(e);
    let json = serde_json::to_string(&error).unwrap_or_else(|_| error.message.clone());
    JsValue::from_str(&json)
}

/// Holds the latest full redraw until the page collects it.
#[derive(Debug, Default)]
struct PendingDraw {
    labels: Option<Vec<String>>,
}

impl StaffRenderer for PendingDraw {
    fn draw(&mut self, labels: &[&str]) {
        self.labels = Some(labels.iter().map(|l| l.to_string()).collect());
    }
}

/// One staff on the page.
///
/// The page forwards clicks and reset presses, then calls `take_redraw` and
/// hands the labels to VexFlow. Playback uses `preview_schedule` with the
/// Web Audio context's current time added to every tone.
#[wasm_bindgen]
pub struct Editor {
    inner: ScoreEditor<PendingDraw>,
    preview: PreviewSettings,
}

#[wasm_bindgen]
impl Editor {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Editor {
        Editor {
            inner: ScoreEditor::new(StaffLayout::default(), PendingDraw::default()),
            preview: PreviewSettings::default(),
        }
    }

    /// Editor with a custom top margin and row height (in CSS pixels).
    pub fn with_layout(top_margin: f64, row_height: f64) -> Result<Editor, JsValue> {
        let layout = StaffLayout {
            top_margin,
            row_height,
            ..StaffLayout::default()
        };
        layout.validate().map_err(to_js_error)?;
        Ok(Editor {
            inner: ScoreEditor::new(layout, PendingDraw::default()),
            preview: PreviewSettings::default(),
        })
    }

    /// Returns the placed label, or `undefined` when the click missed the staff.
    pub fn register_click(&mut self, offset: f64) -> Option<String> {
        self.inner.register_click(offset).map(|p| p.label().to_string())
    }

    pub fn reset(&mut self) {
        self.inner.reset();
    }

    /// JSON array of the labels to draw, or `undefined` if nothing changed
    /// since the last call.
    pub fn take_redraw(&mut self) -> Option<String> {
        self.inner
            .renderer_mut()
            .labels
            .take()
            .map(|labels| serde_json::to_string(&labels).unwrap_or_else(|_| "[]".to_string()))
    }

    pub fn len(&self) -> usize {
        self.inner.current_sequence().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.current_sequence().is_empty()
    }

    /// Body for the export endpoint: `{"notes": [...]}`.
    pub fn request_body(&self) -> String {
        let request = staffmidi::ExportRequest::from(self.inner.current_sequence());
        serde_json::to_string(&request).unwrap_or_else(|_| r#"{"notes":[]}"#.to_string())
    }

    /// Encode the current notes in the browser, without a server round trip.
    pub fn export_midi(&self) -> Result<Vec<u8>, JsValue> {
        MidiDocument::from_sequence(self.inner.current_sequence())
            .to_bytes()
            .map_err(to_js_error)
    }

    /// Array of `{frequency, start, stop, peakGain, decayEnd, floorGain}`.
    pub fn preview_schedule(&self) -> Result<JsValue, JsValue> {
        let tones = preview_tones(self.inner.current_sequence(), &self.preview);
        serde_wasm_bindgen::to_value(&tones).map_err(|e| JsValue::from_str(&e.to_string()))
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}

/// Encode an export request body (`{"notes": [...]}`) to MIDI bytes.
#[wasm_bindgen]
pub fn encode_request(body: &str, strict: bool) -> Result<Vec<u8>, JsValue> {
    let policy = if strict { LabelPolicy::Strict } else { LabelPolicy::Lenient };
    staffmidi::encode_request(body.as_bytes(), policy).map_err(to_js_error)
}

/// Name the export is offered under.
#[wasm_bindgen]
pub fn export_file_name() -> String {
    Exporter::default().settings().file_name.clone()
}
