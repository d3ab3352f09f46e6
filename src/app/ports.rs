//! Port traits: the hexagonal boundary between the card core and its host.
//!
//! ```text
//!   Host adapter ──▶ Port trait ──▶ CardService (domain)
//! ```
//!
//! The host's entity store, service bus, style target and theme registry
//! implement these traits.  [`CardService`](super::service::CardService)
//! consumes them via generics, so the core never touches the dashboard
//! runtime directly.

use serde::Serialize;
use serde_json::{Value, json};

use crate::attributes::EntityState;
use crate::error::ServiceError;
use crate::render::RenderState;
use crate::theme::ThemeDefinition;

// ───────────────────────────────────────────────────────────────
// State port (driven adapter: host → domain)
// ───────────────────────────────────────────────────────────────

/// Read-side port: lookup of the host's current entity bags.
pub trait StatePort {
    fn entity(&self, entity_id: &str) -> Option<&EntityState>;
}

// ───────────────────────────────────────────────────────────────
// Service port (driven adapter: domain → backend)
// ───────────────────────────────────────────────────────────────

/// An outbound service invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "call", rename_all = "snake_case")]
pub enum OutboundCall {
    /// `remote.send_command`: press one key on an activity or device.
    SendCommand {
        entity_id: String,
        command_id: i64,
        device: i64,
    },
    /// `select.select_option`: switch the hub's activity.
    SelectOption { entity_id: String, option: String },
}

impl OutboundCall {
    pub fn domain(&self) -> &'static str {
        match self {
            Self::SendCommand { .. } => "remote",
            Self::SelectOption { .. } => "select",
        }
    }

    pub fn service(&self) -> &'static str {
        match self {
            Self::SendCommand { .. } => "send_command",
            Self::SelectOption { .. } => "select_option",
        }
    }

    /// Service payload in the host's wire shape.
    pub fn service_data(&self) -> Value {
        match self {
            Self::SendCommand {
                entity_id,
                command_id,
                device,
            } => json!({
                "entity_id": entity_id,
                "command": command_id,
                "device": device,
            }),
            Self::SelectOption { entity_id, option } => json!({
                "entity_id": entity_id,
                "option": option,
            }),
        }
    }
}

/// Fire-and-forget service invocation.  `Ok` means "accepted for delivery",
/// not "the hub did it"; completion shows up in a later state push.
pub trait ServicePort {
    fn call(&mut self, call: &OutboundCall) -> Result<(), ServiceError>;
}

// ───────────────────────────────────────────────────────────────
// Style + theme ports (driven adapter: domain → renderer)
// ───────────────────────────────────────────────────────────────

/// Custom-property target (the card's root element).
pub trait StylePort {
    fn set_property(&mut self, name: &str, value: &str);
    fn remove_property(&mut self, name: &str);
}

/// The host's theme registry.
pub trait ThemePort {
    fn theme(&self, id: &str) -> Option<&ThemeDefinition>;
    /// Ambient dark-mode flag used to pick a theme's `modes` sub-map.
    fn dark_mode(&self) -> bool;
}

/// Everything a reconciliation pass talks to.
pub trait HostPort: ServicePort + StylePort + ThemePort {}

impl<T: ServicePort + StylePort + ThemePort> HostPort for T {}

// ───────────────────────────────────────────────────────────────
// Timer port (decouples controllers from the scheduler)
// ───────────────────────────────────────────────────────────────

/// The two kinds of timer the card ever schedules.  At most one of each
/// kind is live at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerKind {
    /// Clears the visible busy pulse after a button press.
    CommandPulse,
    /// Forces the activity-loading indicator off if the hub never confirms.
    ActivityLoadSafety,
}

/// Opaque handle returned by [`TimerPort::schedule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(pub u32);

/// Cancellable one-shot timers.
pub trait TimerPort {
    /// Schedule a one-shot timer at absolute `deadline_ms`.  Any live timer
    /// of the same kind is cancelled first.
    fn schedule(&mut self, kind: TimerKind, deadline_ms: u64) -> TimerHandle;

    /// Cancel a timer.  Unknown or already-fired handles are ignored.
    fn cancel(&mut self, handle: TimerHandle);
}

/// Callback the scheduler invokes when a timer fires.
///
/// The [`Scheduler`](crate::scheduler::Scheduler) knows nothing about
/// loading state; the [`LoadIndicatorController`](crate::loading::LoadIndicatorController)
/// implements this and decides what a fire means.
pub trait SchedulerDelegate {
    fn on_timer_fired(&mut self, handle: TimerHandle, kind: TimerKind, now_ms: u64);
}

// ───────────────────────────────────────────────────────────────
// Event + render sinks (driven adapter: domain → logging / DOM)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`CardEvent`](super::events::CardEvent)s
/// through this port.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::CardEvent);
}

/// The renderer.  Applies flags to existing DOM handles; must be idempotent.
pub trait RenderSink {
    fn apply(&mut self, state: &RenderState);
}
