use newtab_layout_protocol::Size;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Margin kept between a widget and the viewport edges when clamping.
pub const CLAMP_PADDING: f64 = 16.0;
/// Maximum distance from an edge at which a dropped widget anchors to it.
pub const ANCHOR_THRESHOLD: f64 = 32.0;
/// Vertical gap between cascaded default widgets.
pub const DEFAULT_GAP: f64 = 20.0;
/// Size assumed for a widget whose element measures as empty.
pub const FALLBACK_SIZE: Size = Size {
    width: 300.0,
    height: 200.0,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid layout config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{field} must be a finite, non-negative number (got {value})")]
    Negative { field: &'static str, value: f64 },
    #[error("fallback size must be positive (got {width}x{height})")]
    FallbackSize { width: f64, height: f64 },
}

/// Geometry constants of the layout engine.
///
/// These are implementation constants, not user preferences; the struct
/// exists so hosts and tests can construct an engine without globals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    pub clamp_padding: f64,
    pub anchor_threshold: f64,
    pub default_gap: f64,
    pub fallback_size: Size,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            clamp_padding: CLAMP_PADDING,
            anchor_threshold: ANCHOR_THRESHOLD,
            default_gap: DEFAULT_GAP,
            fallback_size: FALLBACK_SIZE,
        }
    }
}

impl LayoutConfig {
    /// Parse a (possibly partial) JSON config; missing fields take defaults.
    pub fn from_json(data: &[u8]) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_slice(data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("clampPadding", self.clamp_padding),
            ("anchorThreshold", self.anchor_threshold),
            ("defaultGap", self.default_gap),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Negative { field, value });
            }
        }
        if !self.fallback_size.is_measurable() {
            return Err(ConfigError::FallbackSize {
                width: self.fallback_size.width,
                height: self.fallback_size.height,
            });
        }
        Ok(())
    }
}
