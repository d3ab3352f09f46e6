//! Mock host adapters for integration tests.
//!
//! Records every outbound call, style mutation and event so tests can
//! assert on the full history without a dashboard runtime.

use std::collections::{BTreeMap, HashMap};

use remotecard::{CardConfig, CardEvent, CardService, RenderState};
use remotecard::app::ports::{EventSink, OutboundCall, ServicePort, StylePort, ThemePort};
use remotecard::attributes::EntityState;
use remotecard::error::ServiceError;
use remotecard::theme::ThemeDefinition;
use serde_json::{Value, json};

pub const REMOTE: &str = "remote.hub";
pub const SELECTOR: &str = "select.hub_activity";

// ── MockHost ──────────────────────────────────────────────────

#[derive(Default)]
pub struct MockHost {
    pub calls: Vec<OutboundCall>,
    pub style: BTreeMap<String, String>,
    pub style_mutations: usize,
    pub themes: HashMap<String, ThemeDefinition>,
    pub dark: bool,
    pub reject: Option<String>,
}

#[allow(dead_code)]
impl MockHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_theme(mut self, name: &str, vars: Value) -> Self {
        let def = serde_json::from_value(vars).expect("theme fixture");
        self.themes.insert(name.to_owned(), def);
        self
    }
}

impl ServicePort for MockHost {
    fn call(&mut self, call: &OutboundCall) -> Result<(), ServiceError> {
        if let Some(reason) = &self.reject {
            return Err(ServiceError::Rejected {
                service: format!("{}.{}", call.domain(), call.service()),
                reason: reason.clone(),
            });
        }
        self.calls.push(call.clone());
        Ok(())
    }
}

impl StylePort for MockHost {
    fn set_property(&mut self, name: &str, value: &str) {
        self.style.insert(name.to_owned(), value.to_owned());
        self.style_mutations += 1;
    }

    fn remove_property(&mut self, name: &str) {
        self.style.remove(name);
        self.style_mutations += 1;
    }
}

impl ThemePort for MockHost {
    fn theme(&self, id: &str) -> Option<&ThemeDefinition> {
        self.themes.get(id)
    }

    fn dark_mode(&self) -> bool {
        self.dark
    }
}

// ── RecordingSink ─────────────────────────────────────────────

#[derive(Default)]
pub struct RecordingSink {
    pub events: Vec<CardEvent>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&CardEvent) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &CardEvent) {
        self.events.push(event.clone());
    }
}

// ── Entity fixtures ───────────────────────────────────────────

pub fn entity(id: &str, state: &str, attributes: Value) -> EntityState {
    EntityState {
        entity_id: id.to_owned(),
        state: state.to_owned(),
        attributes: attributes.as_object().cloned().unwrap_or_default(),
    }
}

/// Remote entity on an X1S hub showing `activity` (id 101 unless powered off).
pub fn remote(activity: &str, enabled_buttons: Value) -> EntityState {
    remote_with(activity, enabled_buttons, json!({}))
}

/// Like [`remote`], with extra attributes merged on top.
pub fn remote_with(activity: &str, enabled_buttons: Value, extra: Value) -> EntityState {
    let activity_id = if activity.eq_ignore_ascii_case("powered off") {
        Value::Null
    } else {
        json!(101)
    };
    let mut attrs = json!({
        "hub_version": "X1S",
        "current_activity": activity,
        "current_activity_id": activity_id,
        "enabled_buttons": enabled_buttons,
        "activity_select_entity_id": SELECTOR,
    });
    if let (Some(base), Some(more)) = (attrs.as_object_mut(), extra.as_object()) {
        for (k, v) in more {
            base.insert(k.clone(), v.clone());
        }
    }
    entity(REMOTE, "on", attrs)
}

pub fn selector(state: &str) -> EntityState {
    entity(
        SELECTOR,
        state,
        json!({ "options": ["Powered off", "Watch TV", "Movie", "Music"] }),
    )
}

pub fn states(entities: impl IntoIterator<Item = EntityState>) -> HashMap<String, EntityState> {
    entities
        .into_iter()
        .map(|e| (e.entity_id.clone(), e))
        .collect()
}

// ── Service fixtures ──────────────────────────────────────────

/// Started service for `config`, a fresh host and an empty event log.
pub fn start(config: CardConfig) -> (CardService, MockHost, RecordingSink) {
    let mut svc = CardService::new(config).expect("valid config");
    let mut sink = RecordingSink::new();
    svc.start(&mut sink);
    (svc, MockHost::new(), sink)
}

/// Started service with every option defaulted.
pub fn start_default() -> (CardService, MockHost, RecordingSink) {
    start(CardConfig::for_entity(REMOTE))
}

/// Push one state update containing `entities`.
pub fn push(
    svc: &mut CardService,
    host: &mut MockHost,
    sink: &mut RecordingSink,
    now_ms: u64,
    entities: impl IntoIterator<Item = EntityState>,
) -> RenderState {
    svc.update_from_states(&states(entities), now_ms, host, sink)
}
