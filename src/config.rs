//! Card configuration.
//!
//! The host's config editor produces a plain JSON object; this module turns
//! it into a typed [`CardConfig`].  The only hard failure is a missing
//! `entity`: every other option has a default, and unknown keys are ignored
//! so editor-private fields do not break the card.

use serde::{Deserialize, Serialize};

use crate::attributes::ShortcutKind;
use crate::catalog::ButtonGroup;
use crate::error::ConfigError;

/// Core card configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardConfig {
    /// The remote entity the card drives (e.g. `remote.living_room_hub`).
    #[serde(default)]
    pub entity: String,
    /// Named theme to apply, resolved through the host's theme registry.
    #[serde(default)]
    pub theme: Option<String>,
    /// Explicit background colour as an RGB triple.
    #[serde(default)]
    pub background_override: Option<[u8; 3]>,

    // --- Group visibility ---
    #[serde(default = "default_true")]
    pub show_activity: bool,
    #[serde(default = "default_true")]
    pub show_dpad: bool,
    #[serde(default = "default_true")]
    pub show_nav: bool,
    #[serde(default = "default_true")]
    pub show_mid: bool,
    #[serde(default = "default_true")]
    pub show_media: bool,
    #[serde(default = "default_true")]
    pub show_colors: bool,
    #[serde(default = "default_true")]
    pub show_abc: bool,
    #[serde(default = "default_true")]
    pub show_macros: bool,
    #[serde(default = "default_true")]
    pub show_favorites: bool,

    // --- Timing ---
    #[serde(default)]
    pub timing: TimingConfig,
}

/// Tunable time constants, all in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    /// How long an unconfirmed selector request is shown optimistically.
    pub pending_expiry_ms: u64,
    /// Safety valve: the activity-loading indicator is forced off after this.
    pub activity_load_timeout_ms: u64,
    /// Minimum visible busy pulse after any button press.
    pub command_pulse_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            pending_expiry_ms: 15_000,
            activity_load_timeout_ms: 60_000,
            command_pulse_ms: 1_000,
        }
    }
}

fn default_true() -> bool {
    true
}

impl CardConfig {
    /// Minimal valid configuration for `entity` with every option defaulted.
    pub fn for_entity(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            theme: None,
            background_override: None,
            show_activity: true,
            show_dpad: true,
            show_nav: true,
            show_mid: true,
            show_media: true,
            show_colors: true,
            show_abc: true,
            show_macros: true,
            show_favorites: true,
            timing: TimingConfig::default(),
        }
    }

    /// Build and validate a configuration from the host's plain object.
    pub fn from_value(value: serde_json::Value) -> Result<Self, ConfigError> {
        let mut config: Self = serde_json::from_value(value)?;
        config.entity = config.entity.trim().to_owned();
        config.validate()?;
        Ok(config)
    }

    /// Convenience wrapper over [`from_value`](Self::from_value) for raw JSON text.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let value: serde_json::Value = serde_json::from_str(text)?;
        Self::from_value(value)
    }

    /// Reject configurations the card cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.entity.is_empty() {
            return Err(ConfigError::MissingEntity);
        }
        match self.entity.split_once('.') {
            Some((domain, object_id)) if !domain.is_empty() && !object_id.is_empty() => Ok(()),
            _ => Err(ConfigError::InvalidEntity(self.entity.clone())),
        }
    }

    /// Whether the given button group is switched on in the configuration.
    pub fn shows(&self, group: ButtonGroup) -> bool {
        match group {
            ButtonGroup::Dpad => self.show_dpad,
            ButtonGroup::Nav => self.show_nav,
            ButtonGroup::Mid => self.show_mid,
            ButtonGroup::Media => self.show_media,
            ButtonGroup::Colors => self.show_colors,
            ButtonGroup::Abc => self.show_abc,
        }
    }

    /// Whether macros or favourites are switched on.
    pub fn shows_shortcut(&self, kind: ShortcutKind) -> bool {
        match kind {
            ShortcutKind::Macro => self.show_macros,
            ShortcutKind::Favorite => self.show_favorites,
        }
    }

    /// The explicit background override rendered as a CSS colour.
    pub fn background_css(&self) -> Option<String> {
        self.background_override
            .map(|[r, g, b]| format!("rgb({r}, {g}, {b})"))
    }
}
