use newtab_layout_core::LayoutController;
use newtab_layout_core::config::{ConfigError, LayoutConfig};
use newtab_layout_core::controller::Committed;
use newtab_layout_core::drag::{INTERACTIVE_SELECTOR, PointerInput};
use newtab_layout_core::metrics::MetricsSnapshot;
use newtab_layout_core::settings::{LayoutSink, Settings, SettingsError};
use newtab_layout_protocol::{
    LayoutCommand, StoredLayoutEntry, UnknownWidget, ViewportSize, WidgetId,
};
use serde::Serialize;
use thiserror::Error;
use wasm_bindgen::prelude::*;

#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Config(#[from] ConfigError),
    #[error("settings: {0}")]
    Settings(#[from] SettingsError),
    #[error("{0}")]
    Widget(#[from] UnknownWidget),
}

/// Holds the serialized layout until the page script writes it to storage.
/// A write the page then fails to store is reported back through
/// `layoutWriteFailed`.
#[derive(Debug, Default)]
struct PendingWrite(Option<Vec<StoredLayoutEntry>>);

impl LayoutSink for PendingWrite {
    fn write_layout(&mut self, layout: Vec<StoredLayoutEntry>) -> Result<(), SettingsError> {
        self.0 = Some(layout);
        Ok(())
    }
}

/// What the page script gets back from a persisting call.
#[derive(Debug, Serialize)]
struct CommitResult {
    commands: Vec<LayoutCommand>,
    /// The `widgets.layout` array to hand to `updateSettings`, or `null` when
    /// nothing changed.
    layout: Option<Vec<StoredLayoutEntry>>,
}

/// Layout engine instance owned by the new tab page script.
///
/// The script keeps element measurements current with `setMetrics`,
/// forwards pointer/resize/settings events, and applies the returned
/// commands (JSON arrays of `LayoutCommand`).
#[wasm_bindgen]
pub struct LayoutEngine {
    controller: LayoutController,
    metrics: MetricsSnapshot,
}

impl LayoutEngine {
    fn create(config: Option<&str>, width: f64, height: f64) -> Result<Self, BridgeError> {
        let config = match config {
            Some(json) => LayoutConfig::from_json(json.as_bytes())?,
            None => LayoutConfig::default(),
        };
        Ok(Self {
            controller: LayoutController::new(config, ViewportSize::new(width, height)),
            metrics: MetricsSnapshot::new(),
        })
    }

    fn update_metrics(&mut self, json: &str) -> Result<(), BridgeError> {
        self.metrics = serde_json::from_str(json)?;
        Ok(())
    }

    fn hydrate(&mut self, settings_json: &str) -> Result<Vec<LayoutCommand>, BridgeError> {
        let settings = Settings::from_json(settings_json)?;
        Ok(self.controller.load_widget_layout(&settings, &self.metrics))
    }

    fn press(&mut self, widget: &str, event_json: &str) -> Result<Vec<LayoutCommand>, BridgeError> {
        let id: WidgetId = widget.parse()?;
        let input: PointerInput = serde_json::from_str(event_json)?;
        Ok(self.controller.on_pointer_down(id, &input, &self.metrics))
    }

    fn drag_to(&mut self, event_json: &str) -> Result<Vec<LayoutCommand>, BridgeError> {
        let input: PointerInput = serde_json::from_str(event_json)?;
        Ok(self.controller.on_pointer_move(&input, &self.metrics))
    }

    fn release(&mut self, event_json: &str) -> Result<Vec<LayoutCommand>, BridgeError> {
        let input: PointerInput = serde_json::from_str(event_json)?;
        Ok(self.controller.on_pointer_up(&input, &self.metrics))
    }

    fn flush(&mut self) -> Option<CommitResult> {
        let mut pending = PendingWrite::default();
        let committed = self
            .controller
            .flush_pending_persist(&self.metrics, &mut pending)?;
        Some(commit_result(committed, pending))
    }

    fn reset(&mut self) -> CommitResult {
        let mut pending = PendingWrite::default();
        let committed = self
            .controller
            .apply_default_layout(&self.metrics, &mut pending);
        commit_result(committed, pending)
    }
}

fn commit_result(committed: Committed, pending: PendingWrite) -> CommitResult {
    CommitResult {
        commands: committed.commands,
        layout: pending.0,
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, JsError> {
    serde_json::to_string(value).map_err(|e| JsError::new(&e.to_string()))
}

#[wasm_bindgen]
impl LayoutEngine {
    /// Create an engine for a viewport of `width` × `height`. `config` is an
    /// optional partial `LayoutConfig` JSON.
    #[wasm_bindgen(constructor)]
    pub fn new(config: Option<String>, width: f64, height: f64) -> Result<LayoutEngine, JsError> {
        Ok(Self::create(config.as_deref(), width, height)?)
    }

    /// Replace the element measurements (`{ widgetId: { width, height, left,
    /// top, connected, initial } }`).
    #[wasm_bindgen(js_name = setMetrics)]
    pub fn set_metrics(&mut self, metrics_json: &str) -> Result<(), JsError> {
        Ok(self.update_metrics(metrics_json)?)
    }

    /// Load the layout from a settings document (on startup and whenever
    /// another instance changes settings).
    #[wasm_bindgen(js_name = loadWidgetLayout)]
    pub fn load_widget_layout(&mut self, settings_json: &str) -> Result<String, JsError> {
        let commands = self.hydrate(settings_json)?;
        to_json(&commands)
    }

    pub fn resize(&mut self, width: f64, height: f64) -> Result<String, JsError> {
        let commands = self
            .controller
            .on_resize(ViewportSize::new(width, height), &self.metrics);
        to_json(&commands)
    }

    #[wasm_bindgen(js_name = pointerDown)]
    pub fn pointer_down(&mut self, widget: &str, event_json: &str) -> Result<String, JsError> {
        let commands = self.press(widget, event_json)?;
        to_json(&commands)
    }

    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(&mut self, event_json: &str) -> Result<String, JsError> {
        let commands = self.drag_to(event_json)?;
        to_json(&commands)
    }

    /// Handles both `pointerup` and `pointercancel`.
    #[wasm_bindgen(js_name = pointerUp)]
    pub fn pointer_up(&mut self, event_json: &str) -> Result<String, JsError> {
        let commands = self.release(event_json)?;
        to_json(&commands)
    }

    #[wasm_bindgen(js_name = animationFrame)]
    pub fn animation_frame(&mut self) -> Result<String, JsError> {
        to_json(&self.controller.on_animation_frame())
    }

    /// Run the persist scheduled by a drag release. Returns `undefined` when
    /// none is pending.
    #[wasm_bindgen(js_name = flushPersist)]
    pub fn flush_persist(&mut self) -> Result<Option<String>, JsError> {
        self.flush().map(|result| to_json(&result)).transpose()
    }

    #[wasm_bindgen(js_name = applyDefaultLayout)]
    pub fn apply_default_layout(&mut self) -> Result<String, JsError> {
        to_json(&self.reset())
    }

    /// The page could not store the `layout` returned by the last
    /// `flushPersist` or `applyDefaultLayout`; the next persist writes it
    /// again.
    #[wasm_bindgen(js_name = layoutWriteFailed)]
    pub fn layout_write_failed(&mut self) {
        self.controller.layout_write_failed();
    }
}

/// Selector for `target.closest(...)`: a pointerdown inside a match sets
/// `targetInteractive` and does not start a drag.
#[wasm_bindgen(js_name = interactiveSelector)]
pub fn interactive_selector() -> String {
    INTERACTIVE_SELECTOR.to_string()
}
