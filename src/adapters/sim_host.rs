//! In-memory host for the simulator and tests.
//!
//! Entity state lives in a plain `HashMap<String, EntityState>` (which
//! already implements `StatePort`); this adapter is the rest of the host:
//! the service bus, the style target and the theme registry.

use std::collections::{BTreeMap, HashMap};
use std::io::Write;

use log::{info, warn};

use crate::app::ports::{OutboundCall, RenderSink, ServicePort, StylePort, ThemePort};
use crate::error::ServiceError;
use crate::render::RenderState;
use crate::theme::ThemeDefinition;

#[derive(Default)]
pub struct SimHost {
    themes: HashMap<String, ThemeDefinition>,
    dark_mode: bool,
    style: BTreeMap<String, String>,
    calls: Vec<OutboundCall>,
    /// When set, every call fails with this error.
    failure: Option<ServiceError>,
}

impl SimHost {
    pub fn new(themes: HashMap<String, ThemeDefinition>, dark_mode: bool) -> Self {
        Self {
            themes,
            dark_mode,
            ..Self::default()
        }
    }

    pub fn set_dark_mode(&mut self, dark: bool) {
        self.dark_mode = dark;
    }

    /// Fail every subsequent call with `failure`, or accept them again.
    pub fn fail_calls(&mut self, failure: Option<ServiceError>) {
        self.failure = failure;
    }

    /// Take the hub off the bus: calls fail as undeliverable.
    pub fn set_offline(&mut self, offline: bool) {
        self.fail_calls(offline.then(|| ServiceError::Unavailable("hub offline".into())));
    }

    /// Calls accepted so far, oldest first.
    pub fn calls(&self) -> &[OutboundCall] {
        &self.calls
    }

    pub fn style(&self) -> &BTreeMap<String, String> {
        &self.style
    }
}

impl ServicePort for SimHost {
    fn call(&mut self, call: &OutboundCall) -> Result<(), ServiceError> {
        if let Some(failure) = &self.failure {
            return Err(failure.clone());
        }
        info!(
            "SIM | {}.{} {}",
            call.domain(),
            call.service(),
            call.service_data()
        );
        self.calls.push(call.clone());
        Ok(())
    }
}

impl StylePort for SimHost {
    fn set_property(&mut self, name: &str, value: &str) {
        self.style.insert(name.to_owned(), value.to_owned());
    }

    fn remove_property(&mut self, name: &str) {
        self.style.remove(name);
    }
}

impl ThemePort for SimHost {
    fn theme(&self, id: &str) -> Option<&ThemeDefinition> {
        self.themes.get(id)
    }

    fn dark_mode(&self) -> bool {
        self.dark_mode
    }
}

/// Renderer that prints each render state as one JSON line.
pub struct JsonLinesRenderer<W: Write> {
    out: W,
    at_ms: u64,
}

impl<W: Write> JsonLinesRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out, at_ms: 0 }
    }

    /// Timestamp attached to subsequent lines.
    pub fn set_time(&mut self, at_ms: u64) {
        self.at_ms = at_ms;
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> RenderSink for JsonLinesRenderer<W> {
    fn apply(&mut self, state: &RenderState) {
        let line = serde_json::json!({ "at": self.at_ms, "render": state });
        if let Err(e) = writeln!(self.out, "{line}") {
            warn!("render output failed: {}", e);
        }
    }
}
