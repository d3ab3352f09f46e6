//! Button gating: per-tick visible/enabled flags and command routing.
//!
//! ```text
//!  visible = !restricted || hub is second generation
//!  enabled = !powered_off && capabilities.is_enabled(id)
//! ```

use serde::Serialize;

use crate::attributes::{Shortcut, ShortcutKind};
use crate::capability::CapabilitySet;
use crate::catalog::{BUTTONS, ButtonDescriptor, ButtonGroup};

/// Activity labels (trimmed, lower-cased) that mean the hub is off.
pub const POWERED_OFF_SYNONYMS: [&str; 3] = ["powered off", "powered_off", "off"];

/// Derived per-tick state of one catalog button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ButtonRenderState {
    pub key: &'static str,
    pub group: ButtonGroup,
    /// Hub-variant visibility only; the configured group flag lives in
    /// [`RenderState::groups`](crate::render::RenderState::groups).
    pub visible: bool,
    pub enabled: bool,
}

/// Derived per-tick state of one macro/favourite shortcut.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShortcutRenderState {
    pub kind: ShortcutKind,
    pub label: String,
    pub visible: bool,
    pub enabled: bool,
}

/// Powered-off check on the confirmed label, falling back to the selector's
/// raw value when the label is empty.
pub fn is_powered_off(activity_label: &str, selector_value: &str) -> bool {
    let label = activity_label.trim();
    let source = if label.is_empty() {
        selector_value.trim()
    } else {
        label
    };
    let lower = source.to_lowercase();
    POWERED_OFF_SYNONYMS.contains(&lower.as_str())
}

pub struct ButtonGatingEngine;

impl ButtonGatingEngine {
    pub fn button_state(
        button: &ButtonDescriptor,
        second_generation: bool,
        powered_off: bool,
        caps: &CapabilitySet,
    ) -> ButtonRenderState {
        ButtonRenderState {
            key: button.key,
            group: button.group,
            visible: !button.is_hub_variant_restricted || second_generation,
            enabled: !powered_off && caps.is_enabled(button.numeric_id),
        }
    }

    /// Flags for every catalog button, in layout order.
    pub fn evaluate(
        second_generation: bool,
        powered_off: bool,
        caps: &CapabilitySet,
    ) -> Vec<ButtonRenderState> {
        BUTTONS
            .iter()
            .map(|b| Self::button_state(b, second_generation, powered_off, caps))
            .collect()
    }

    /// Shortcuts are not listed in the capability set; only power gates them.
    /// `show(kind)` is the configured visibility of each kind.
    pub fn evaluate_shortcuts(
        shortcuts: &[Shortcut],
        powered_off: bool,
        show: impl Fn(ShortcutKind) -> bool,
    ) -> Vec<ShortcutRenderState> {
        shortcuts
            .iter()
            .map(|s| ShortcutRenderState {
                kind: s.kind,
                label: s.label.clone(),
                visible: show(s.kind),
                enabled: !powered_off,
            })
            .collect()
    }

    /// Where a press of `command_id` goes: the owner recorded in the
    /// capability list, else the current activity.
    pub fn resolve_route(
        caps: &CapabilitySet,
        command_id: i64,
        current_activity_id: Option<i64>,
    ) -> Option<i64> {
        caps.command_target(command_id)
            .and_then(|e| e.target_activity_id)
            .or(current_activity_id)
    }

    /// Favourites go to their own device; macros to the current activity.
    pub fn resolve_shortcut_route(
        shortcut: &Shortcut,
        current_activity_id: Option<i64>,
    ) -> Option<i64> {
        match shortcut.kind {
            ShortcutKind::Favorite => shortcut.device_id.or(current_activity_id),
            ShortcutKind::Macro => current_activity_id,
        }
    }
}
