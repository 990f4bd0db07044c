//! Settings document, storage backends and the settings service the layout
//! engine writes through.

pub mod backend;
pub mod service;

use newtab_layout_protocol::StoredLayoutEntry;
use newtab_layout_protocol::layout::loose_entries;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

pub use backend::{
    BackendKind, HostCapabilities, LocalBackend, MemoryArea, MemoryFallback, SettingsBackend,
    StorageArea, SyncBackend, detect_backend,
};
pub use service::{SettingsBroadcast, SettingsService, SubscriptionId};

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("storage: {0}")]
    Storage(String),
    #[error("serialize: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("settings item is {bytes} bytes, over the {limit} byte quota")]
    QuotaExceeded { bytes: usize, limit: usize },
    #[error("settings service is closed")]
    Closed,
}

/// The persisted settings document.
///
/// Only `widgets.layout` is modelled; everything else (theme, search,
/// per-widget options) is carried through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub widgets: WidgetSettings,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WidgetSettings {
    #[serde(default, deserialize_with = "loose_entries")]
    pub layout: Vec<StoredLayoutEntry>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl Settings {
    pub fn from_json(data: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(data)?)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Merge `patch` into `target`: objects merge key by key, recursively;
/// anything else (arrays, scalars, `null`) replaces the target value.
pub fn merge_patch(target: &mut Value, patch: Value) {
    match (target, patch) {
        (Value::Object(target), Value::Object(patch)) => {
            for (key, value) in patch {
                match target.get_mut(&key) {
                    Some(existing) => merge_patch(existing, value),
                    None => {
                        target.insert(key, value);
                    }
                }
            }
        }
        (target, patch) => *target = patch,
    }
}

/// Destination for serialized layouts; the seam between the layout engine
/// and the settings layer.
pub trait LayoutSink {
    fn write_layout(&mut self, layout: Vec<StoredLayoutEntry>) -> Result<(), SettingsError>;
}
