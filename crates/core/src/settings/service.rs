use newtab_layout_protocol::StoredLayoutEntry;
use serde_json::{Value, json};
use tracing::{debug, warn};

use super::backend::{BackendKind, SettingsBackend};
use super::{LayoutSink, Settings, SettingsError, merge_patch};

pub type SubscriptionId = u64;

/// Notifies other browser instances (tabs, the options page) that the
/// settings document changed.
pub trait SettingsBroadcast {
    fn post(&self, settings: &Settings);
}

type Listener = Box<dyn FnMut(&Settings)>;

/// Cached, write-through access to the settings document.
///
/// Constructed once per page load with [`SettingsService::open`] and torn
/// down with [`SettingsService::close`]. Each instance owns its cache, so
/// tests can run any number of them side by side.
pub struct SettingsService {
    backend: Box<dyn SettingsBackend>,
    current: Settings,
    listeners: Vec<(SubscriptionId, Listener)>,
    broadcast: Option<Box<dyn SettingsBroadcast>>,
    next_id: SubscriptionId,
    closed: bool,
}

impl SettingsService {
    /// Load the document from `backend`. A missing or unreadable document
    /// yields defaults; the page must render regardless.
    pub fn open(backend: Box<dyn SettingsBackend>) -> Self {
        let current = match backend.load() {
            Ok(Some(settings)) => settings,
            Ok(None) => {
                debug!(kind = ?backend.kind(), "no stored settings, using defaults");
                Settings::default()
            }
            Err(e) => {
                warn!(kind = ?backend.kind(), "failed to load settings, using defaults: {e}");
                Settings::default()
            }
        };
        Self {
            backend,
            current,
            listeners: Vec::new(),
            broadcast: None,
            next_id: 0,
            closed: false,
        }
    }

    pub fn with_broadcast(mut self, broadcast: Box<dyn SettingsBroadcast>) -> Self {
        self.broadcast = Some(broadcast);
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.current
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.backend.kind()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Merge `patch` into the document and save it.
    ///
    /// The cache only changes once the backend accepted the write, so a
    /// failed save leaves the service showing what is actually stored.
    pub fn update(&mut self, patch: Value) -> Result<&Settings, SettingsError> {
        if self.closed {
            return Err(SettingsError::Closed);
        }
        let mut doc = serde_json::to_value(&self.current)?;
        merge_patch(&mut doc, patch);
        let next: Settings = serde_json::from_value(doc)?;
        self.backend.save(&next)?;
        self.current = next;

        self.notify();
        if let Some(broadcast) = &self.broadcast {
            broadcast.post(&self.current);
        }
        Ok(&self.current)
    }

    /// Adopt a document written by another instance. Nothing is saved or
    /// re-broadcast.
    pub fn receive_remote(&mut self, settings: Settings) {
        if self.closed {
            return;
        }
        self.current = settings;
        self.notify();
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&Settings) + 'static) -> SubscriptionId {
        let id = self.next_id;
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    /// Drop all listeners and the broadcast channel; later writes fail with
    /// [`SettingsError::Closed`].
    pub fn close(&mut self) {
        self.listeners.clear();
        self.broadcast = None;
        self.closed = true;
    }

    fn notify(&mut self) {
        for (_, listener) in &mut self.listeners {
            listener(&self.current);
        }
    }
}

impl LayoutSink for SettingsService {
    fn write_layout(&mut self, layout: Vec<StoredLayoutEntry>) -> Result<(), SettingsError> {
        self.update(json!({ "widgets": { "layout": layout } }))?;
        Ok(())
    }
}
