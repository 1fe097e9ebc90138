//! WebAssembly bindings for stamp-core.
//!
//! A browser host wires DOM events into [`WasmStampEditor::handle_event`] as
//! JSON and applies the JSON effects it gets back.

use wasm_bindgen::prelude::*;

use crate::{EditorConfig, HostEffect, HostEvent, StampEditor};

/// Initialize the stamp WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    // Set up panic hook for better error messages
    #[cfg(feature = "wasm")]
    console_error_panic_hook::set_once();
}

/// Stamp editor instance for WASM.
#[wasm_bindgen]
pub struct WasmStampEditor {
    editor: StampEditor,
}

#[wasm_bindgen]
impl WasmStampEditor {
    /// Create an editor with default configuration.
    #[wasm_bindgen(constructor)]
    #[must_use]
    pub fn new() -> Self {
        Self {
            editor: StampEditor::default(),
        }
    }

    /// Create an editor from a JSON [`EditorConfig`].
    ///
    /// # Errors
    ///
    /// Returns an error string if JSON parsing fails or the starting scale is
    /// invalid.
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(json: &str) -> Result<WasmStampEditor, String> {
        let config: EditorConfig = serde_json::from_str(json).map_err(|e| e.to_string())?;
        Ok(Self {
            editor: StampEditor::new(config).map_err(|e| e.to_string())?,
        })
    }

    /// Handle a JSON host event and return the resulting effects as JSON.
    ///
    /// # Errors
    ///
    /// Returns an error string if the event is malformed or rejected.
    #[wasm_bindgen(js_name = handleEvent)]
    pub fn handle_event(&mut self, json: &str) -> Result<String, String> {
        let event: HostEvent = serde_json::from_str(json).map_err(|e| e.to_string())?;
        let effects: Vec<HostEffect> = self.editor.handle(event).map_err(|e| e.to_string())?;
        serde_json::to_string(&effects).map_err(|e| e.to_string())
    }

    /// Get the session (page, scale and stamps) as JSON.
    #[wasm_bindgen(js_name = getSessionJson)]
    #[must_use]
    pub fn get_session_json(&self) -> String {
        self.editor.session().to_json().unwrap_or_default()
    }

    /// Current page number.
    #[wasm_bindgen(js_name = currentPage)]
    #[must_use]
    pub fn current_page(&self) -> u32 {
        self.editor.session().current_page()
    }

    /// Number of pages in the open document.
    #[wasm_bindgen(js_name = pageCount)]
    #[must_use]
    pub fn page_count(&self) -> u32 {
        self.editor.session().page_count()
    }

    /// Current zoom scale.
    #[wasm_bindgen(js_name = currentScale)]
    #[must_use]
    pub fn current_scale(&self) -> f64 {
        self.editor.session().current_scale()
    }

    /// Indices of the stamps mounted on the overlay.
    #[wasm_bindgen(js_name = visibleStamps)]
    #[must_use]
    pub fn visible_stamps(&self) -> js_sys::Array {
        self.editor
            .overlay()
            .mounted()
            .map(|(index, _)| JsValue::from(u32::try_from(index.get()).unwrap_or(u32::MAX)))
            .collect()
    }
}

impl Default for WasmStampEditor {
    fn default() -> Self {
        Self::new()
    }
}
