//! Render state: everything the renderer needs for one pass.
//!
//! [`compose`] is pure.  The renderer applies the result to DOM handles it
//! built once; applying the same `RenderState` twice is a no-op.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::attributes::{ActivitySelectorSnapshot, Availability, DeviceSnapshot};
use crate::catalog::ButtonGroup;
use crate::config::CardConfig;
use crate::gating::{ButtonRenderState, ShortcutRenderState};

/// Non-fatal inline warnings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Warning {
    DeviceUnavailable,
    DeviceMissing,
    SelectorMissing,
    SelectorUnavailable,
    /// The vendor app holds the hub; activity changes are blocked.
    AppConnected,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectorRenderState {
    pub visible: bool,
    pub enabled: bool,
    pub options: Vec<String>,
    pub displayed_value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderState {
    /// Configured group visibility.  Not folded into
    /// [`ButtonRenderState::visible`]; a button is drawn only when both its
    /// group and its own flag are visible (see [`RenderState::button_shown`]).
    pub groups: BTreeMap<ButtonGroup, bool>,
    pub buttons: Vec<ButtonRenderState>,
    pub selector: SelectorRenderState,
    pub shortcuts: Vec<ShortcutRenderState>,
    pub loading: bool,
    pub powered_off: bool,
    pub warnings: Vec<Warning>,
}

impl RenderState {
    pub fn button(&self, key: &str) -> Option<&ButtonRenderState> {
        self.buttons.iter().find(|b| b.key == key)
    }

    pub fn group_visible(&self, group: ButtonGroup) -> bool {
        self.groups.get(&group).copied().unwrap_or(false)
    }

    /// Whether the renderer draws `key`: group flag AND button flag.
    pub fn button_shown(&self, key: &str) -> bool {
        self.button(key)
            .is_some_and(|b| b.visible && self.group_visible(b.group))
    }
}

/// Inputs of one composition.
pub struct Frame<'a> {
    pub config: &'a CardConfig,
    pub device: &'a DeviceSnapshot,
    pub selector: &'a ActivitySelectorSnapshot,
    pub buttons: &'a [ButtonRenderState],
    pub shortcuts: &'a [ShortcutRenderState],
    pub displayed_value: &'a str,
    pub loading: bool,
    pub powered_off: bool,
}

pub fn compose(frame: &Frame<'_>) -> RenderState {
    let config = frame.config;
    let mut warnings = Vec::new();

    match frame.device.availability {
        Availability::Available => {}
        Availability::Unavailable => warnings.push(Warning::DeviceUnavailable),
        Availability::Missing => warnings.push(Warning::DeviceMissing),
    }
    if config.show_activity {
        match frame.selector.availability {
            Availability::Available => {}
            Availability::Unavailable => warnings.push(Warning::SelectorUnavailable),
            Availability::Missing => warnings.push(Warning::SelectorMissing),
        }
    }
    if frame.device.app_connected {
        warnings.push(Warning::AppConnected);
    }

    RenderState {
        groups: ButtonGroup::ALL
            .iter()
            .map(|g| (*g, config.shows(*g)))
            .collect(),
        buttons: frame.buttons.to_vec(),
        selector: SelectorRenderState {
            visible: config.show_activity,
            enabled: frame.selector.availability == Availability::Available
                && !frame.device.app_connected,
            options: frame.selector.options.clone(),
            displayed_value: frame.displayed_value.to_owned(),
        },
        shortcuts: frame.shortcuts.to_vec(),
        loading: frame.loading,
        powered_off: frame.powered_off,
        warnings,
    }
}
