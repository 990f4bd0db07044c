use std::collections::HashMap;

use tracing::{info, warn};

use super::{Settings, SettingsError};

/// Key under which the settings document is stored.
pub const SETTINGS_KEY: &str = "settings";
/// Per-item size limit of browser sync storage (`QUOTA_BYTES_PER_ITEM`).
pub const SYNC_QUOTA_BYTES_PER_ITEM: usize = 8192;

/// One raw key/value storage area provided by the host (`storage.sync`,
/// `storage.local`, ...).
pub trait StorageArea {
    fn get(&self, key: &str) -> Result<Option<String>, SettingsError>;
    fn set(&mut self, key: &str, value: String) -> Result<(), SettingsError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Sync,
    Local,
    Memory,
}

/// Where the settings document lives.
pub trait SettingsBackend {
    fn kind(&self) -> BackendKind;
    fn load(&self) -> Result<Option<Settings>, SettingsError>;
    fn save(&mut self, settings: &Settings) -> Result<(), SettingsError>;
}

fn load_from(area: &dyn StorageArea) -> Result<Option<Settings>, SettingsError> {
    area.get(SETTINGS_KEY)?
        .map(|raw| Settings::from_json(&raw))
        .transpose()
}

/// Storage synced across the user's browser instances. Writes over the
/// per-item quota are refused before reaching the host.
pub struct SyncBackend {
    area: Box<dyn StorageArea>,
    quota: usize,
}

impl SyncBackend {
    pub fn new(area: Box<dyn StorageArea>) -> Self {
        Self {
            area,
            quota: SYNC_QUOTA_BYTES_PER_ITEM,
        }
    }

    pub fn with_quota(mut self, quota: usize) -> Self {
        self.quota = quota;
        self
    }
}

impl SettingsBackend for SyncBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Sync
    }

    fn load(&self) -> Result<Option<Settings>, SettingsError> {
        load_from(self.area.as_ref())
    }

    fn save(&mut self, settings: &Settings) -> Result<(), SettingsError> {
        let json = settings.to_json()?;
        let bytes = SETTINGS_KEY.len() + json.len();
        if bytes > self.quota {
            return Err(SettingsError::QuotaExceeded {
                bytes,
                limit: self.quota,
            });
        }
        self.area.set(SETTINGS_KEY, json)
    }
}

/// Storage local to this browser profile.
pub struct LocalBackend {
    area: Box<dyn StorageArea>,
}

impl LocalBackend {
    pub fn new(area: Box<dyn StorageArea>) -> Self {
        Self { area }
    }
}

impl SettingsBackend for LocalBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Local
    }

    fn load(&self) -> Result<Option<Settings>, SettingsError> {
        load_from(self.area.as_ref())
    }

    fn save(&mut self, settings: &Settings) -> Result<(), SettingsError> {
        self.area.set(SETTINGS_KEY, settings.to_json()?)
    }
}

/// A storage area held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryArea {
    items: HashMap<String, String>,
}

impl MemoryArea {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StorageArea for MemoryArea {
    fn get(&self, key: &str) -> Result<Option<String>, SettingsError> {
        Ok(self.items.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), SettingsError> {
        self.items.insert(key.to_string(), value);
        Ok(())
    }
}

/// Used when the host exposes no storage at all (e.g. the page opened
/// outside the extension). Settings last for the page's lifetime only.
#[derive(Debug, Clone, Default)]
pub struct MemoryFallback {
    area: MemoryArea,
}

impl MemoryFallback {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsBackend for MemoryFallback {
    fn kind(&self) -> BackendKind {
        BackendKind::Memory
    }

    fn load(&self) -> Result<Option<Settings>, SettingsError> {
        load_from(&self.area)
    }

    fn save(&mut self, settings: &Settings) -> Result<(), SettingsError> {
        self.area.set(SETTINGS_KEY, settings.to_json()?)
    }
}

/// Storage areas the host found at startup.
#[derive(Default)]
pub struct HostCapabilities {
    pub sync: Option<Box<dyn StorageArea>>,
    pub local: Option<Box<dyn StorageArea>>,
}

/// Pick the backend once: sync storage if present, then local, then memory.
pub fn detect_backend(capabilities: HostCapabilities) -> Box<dyn SettingsBackend> {
    let backend: Box<dyn SettingsBackend> = match capabilities {
        HostCapabilities {
            sync: Some(area), ..
        } => Box::new(SyncBackend::new(area)),
        HostCapabilities {
            local: Some(area), ..
        } => Box::new(LocalBackend::new(area)),
        _ => {
            warn!("no extension storage available, settings will not persist");
            Box::new(MemoryFallback::new())
        }
    };
    info!(kind = ?backend.kind(), "selected settings backend");
    backend
}
