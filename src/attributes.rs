//! Attribute adapter: host entity bags → typed, read-only snapshots.
//!
//! The host hands the card a per-entity `{ state, attributes }` bag that is
//! replaced wholesale on every update.  This module is the only place that
//! knows attribute names; everything downstream works on
//! [`DeviceSnapshot`] and [`ActivitySelectorSnapshot`].
//!
//! ```text
//!  remote.<hub>  ──▶ DeviceSnapshot ───────────┐
//!                                              ├──▶ reconciliation pass
//!  select.<act>  ──▶ ActivitySelectorSnapshot ─┘
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::app::ports::StatePort;

/// State sentinel the host uses for an entity it cannot reach.
pub const UNAVAILABLE: &str = "unavailable";

// ---------------------------------------------------------------------------
// Host entity bag
// ---------------------------------------------------------------------------

/// One entity as delivered by the host.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityState {
    #[serde(default)]
    pub entity_id: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub attributes: Map<String, Value>,
}

impl EntityState {
    pub fn attr(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name).filter(|v| !v.is_null())
    }

    fn attr_str(&self, name: &str) -> Option<&str> {
        self.attr(name).and_then(Value::as_str)
    }
}

/// Whether an entity can be used this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    Available,
    Unavailable,
    #[default]
    Missing,
}

impl Availability {
    fn of(entity: Option<&EntityState>) -> Self {
        match entity {
            None => Self::Missing,
            Some(e) if e.state.eq_ignore_ascii_case(UNAVAILABLE) => Self::Unavailable,
            Some(_) => Self::Available,
        }
    }
}

// ---------------------------------------------------------------------------
// Hub variant
// ---------------------------------------------------------------------------

/// Hardware revision reported in `hub_version`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub enum HubVariant {
    X1,
    X1S,
    X2,
    #[default]
    Unknown,
}

impl HubVariant {
    /// Classify a free-text version string.  Anything containing `x2`
    /// (case-insensitive) is second generation, whatever else it says.
    pub fn parse(raw: &str) -> Self {
        let lower = raw.trim().to_ascii_lowercase();
        if lower.contains("x2") {
            Self::X2
        } else if lower.contains("x1s") {
            Self::X1S
        } else if lower.contains("x1") {
            Self::X1
        } else {
            Self::Unknown
        }
    }

    pub fn is_second_generation(&self) -> bool {
        matches!(self, Self::X2)
    }
}

// ---------------------------------------------------------------------------
// Shortcuts (macros and favourites)
// ---------------------------------------------------------------------------

/// Where a shortcut came from; decides how it is routed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ShortcutKind {
    /// Activity macro: sent to the current activity.
    Macro,
    /// Favourite: sent to the device it was recorded against.
    Favorite,
}

/// A per-activity macro or favourite exposed by the hub.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Shortcut {
    pub kind: ShortcutKind,
    pub label: String,
    pub command_id: i64,
    pub device_id: Option<i64>,
}

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

/// Read-only view of the remote entity for one tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceSnapshot {
    pub hub_variant_raw: String,
    pub hub_variant: HubVariant,
    pub current_activity_id: Option<i64>,
    pub current_activity_label: String,
    pub enabled_buttons_raw: Vec<Value>,
    pub activity_selector_entity_ref: Option<String>,
    pub availability: Availability,
    /// Raw `load_state` attribute, when the backend exposes one.
    pub load_state: Option<String>,
    /// The vendor app currently holds the hub through the proxy.
    pub app_connected: bool,
    /// Macros and favourites of the current activity.
    pub shortcuts: Vec<Shortcut>,
}

impl DeviceSnapshot {
    /// `load_state` reports the hub is still busy.
    pub fn reports_loading(&self) -> bool {
        self.load_state
            .as_deref()
            .is_some_and(|s| s.trim().eq_ignore_ascii_case("loading"))
    }
}

/// Read-only view of the companion activity selector for one tick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivitySelectorSnapshot {
    pub options: Vec<String>,
    pub current_value: String,
    pub availability: Availability,
}

// ---------------------------------------------------------------------------
// Adapter
// ---------------------------------------------------------------------------

/// Builds snapshots from the host's entity bags.
pub struct AttributeAdapter;

impl AttributeAdapter {
    /// Read the remote entity and its companion selector from `states`.
    pub fn read(
        states: &impl StatePort,
        entity_id: &str,
    ) -> (DeviceSnapshot, ActivitySelectorSnapshot) {
        let device = Self::device_snapshot(states.entity(entity_id));
        let selector = Self::selector_snapshot(
            device
                .activity_selector_entity_ref
                .as_deref()
                .and_then(|id| states.entity(id)),
        );
        (device, selector)
    }

    pub fn device_snapshot(entity: Option<&EntityState>) -> DeviceSnapshot {
        let availability = Availability::of(entity);
        let Some(e) = entity else {
            return DeviceSnapshot::default();
        };

        let hub_variant_raw = e.attr_str("hub_version").unwrap_or_default().to_owned();
        let current_activity_id = e.attr("current_activity_id").and_then(integer);
        let enabled_buttons_raw = match e.attr("enabled_buttons") {
            None => Vec::new(),
            Some(Value::Array(items)) => items.clone(),
            // A lone scalar or record is treated as a one-entry list so the
            // parser can judge it instead of it vanishing silently.
            Some(other) => vec![other.clone()],
        };

        DeviceSnapshot {
            hub_variant: HubVariant::parse(&hub_variant_raw),
            hub_variant_raw,
            current_activity_id,
            current_activity_label: e
                .attr_str("current_activity")
                .unwrap_or_default()
                .to_owned(),
            enabled_buttons_raw,
            activity_selector_entity_ref: e
                .attr_str("activity_select_entity_id")
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_owned),
            availability,
            load_state: e.attr_str("load_state").map(str::to_owned),
            app_connected: e
                .attr("proxy_client_connected")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            shortcuts: current_activity_id
                .map(|id| shortcuts_for(e, id))
                .unwrap_or_default(),
        }
    }

    pub fn selector_snapshot(entity: Option<&EntityState>) -> ActivitySelectorSnapshot {
        let availability = Availability::of(entity);
        let Some(e) = entity else {
            return ActivitySelectorSnapshot::default();
        };
        let options = e
            .attr("options")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default();

        ActivitySelectorSnapshot {
            options,
            current_value: if availability == Availability::Available {
                e.state.clone()
            } else {
                String::new()
            },
            availability,
        }
    }
}

impl StatePort for HashMap<String, EntityState> {
    fn entity(&self, entity_id: &str) -> Option<&EntityState> {
        self.get(entity_id)
    }
}

/// Integer from a JSON number or numeric string; `None` otherwise.
pub(crate) fn integer(v: &Value) -> Option<i64> {
    match v {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(whole_f64)),
        Value::String(s) => {
            let s = s.trim();
            if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
                i64::from_str_radix(hex, 16).ok()
            } else {
                s.parse::<i64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().and_then(whole_f64))
            }
        }
        _ => None,
    }
}

/// Whole, finite floats inside the `i64` range; anything else is rejected
/// rather than saturated.
fn whole_f64(f: f64) -> Option<i64> {
    const LOWER: f64 = i64::MIN as f64;
    const UPPER: f64 = i64::MAX as f64;
    (f.is_finite() && f.fract() == 0.0 && (LOWER..UPPER).contains(&f)).then(|| f as i64)
}

fn shortcuts_for(e: &EntityState, activity_id: i64) -> Vec<Shortcut> {
    let key = activity_id.to_string();
    let mut out = Vec::new();
    for (attr, kind) in [
        ("macro_keys", ShortcutKind::Macro),
        ("favorite_keys", ShortcutKind::Favorite),
    ] {
        let Some(items) = e
            .attr(attr)
            .and_then(|v| v.get(&key))
            .and_then(Value::as_array)
        else {
            continue;
        };
        for item in items {
            let Some(command_id) = item.get("id").and_then(integer) else {
                continue;
            };
            let label = item
                .get("name")
                .and_then(Value::as_str)
                .map_or_else(|| format!("#{command_id}"), str::to_owned);
            let device_id = match kind {
                ShortcutKind::Macro => None,
                ShortcutKind::Favorite => item.get("device_id").and_then(integer),
            };
            out.push(Shortcut {
                kind,
                label,
                command_id,
                device_id,
            });
        }
    }
    out
}
