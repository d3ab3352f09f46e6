//! Inbound commands to the card service.
//!
//! These are genuine user interactions forwarded by the host adapter.  The
//! selector's own display write-back is *not* a command; see
//! [`CardService::sync_selector_display`](super::service::CardService::sync_selector_display).

use serde::Deserialize;

/// User actions the host can send into the card core.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardCommand {
    /// The user picked an option in the activity selector.
    SelectActivity(String),

    /// The user pressed a catalog button, by key (e.g. `"vol_up"`).
    PressButton(String),

    /// The user pressed the n-th macro/favourite of the current activity.
    PressShortcut(usize),
}
