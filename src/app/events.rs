//! Outbound card events.
//!
//! The [`CardService`](super::service::CardService) emits these through the
//! [`EventSink`](super::ports::EventSink) port.

use serde::Serialize;

/// Why a button or shortcut press produced no service call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    UnknownKey,
    Hidden,
    Disabled,
    /// Neither the capability list nor the current activity names a target.
    NoRoute,
}

/// Structured events emitted by the card core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CardEvent {
    /// The service has started for this entity.
    Started { entity: String },

    /// A user selection was sent to the hub and is displayed optimistically.
    ActivityRequested { option: String },

    /// The hub confirmed the requested activity.
    ActivityConfirmed { option: String },

    /// The request was not confirmed in time; the display reverted.
    ActivityRequestExpired { option: String, reverted_to: String },

    /// The merged busy indicator flipped.
    LoadingChanged { loading: bool },

    /// The activity-load safety valve cleared a stuck loading state.
    ActivityLoadTimedOut { target: String },

    /// The hub sent a non-empty capability list that parsed to nothing.
    CapabilitiesMalformed { raw_entries: usize },

    CommandSent {
        key: String,
        command_id: i64,
        device: i64,
    },

    CommandSkipped { key: String, reason: SkipReason },

    /// An outbound call was rejected; it is not retried.
    ServiceCallFailed { service: String, error: String },

    ThemeApplied {
        theme: Option<String>,
        mutations: usize,
    },
}
