//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured card events through the
//! `log` facade.  The simulator routes that to `tracing-subscriber`; an
//! embedding host can install any logger it likes.

use log::{info, warn};

use crate::app::events::CardEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`CardEvent`].
#[derive(Default)]
pub struct LogEventSink;

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &CardEvent) {
        match event {
            CardEvent::Started { entity } => {
                info!("START | entity={}", entity);
            }
            CardEvent::ActivityRequested { option } => {
                info!("ACTIVITY | requested '{}'", option);
            }
            CardEvent::ActivityConfirmed { option } => {
                info!("ACTIVITY | confirmed '{}'", option);
            }
            CardEvent::ActivityRequestExpired {
                option,
                reverted_to,
            } => {
                warn!(
                    "ACTIVITY | '{}' expired unconfirmed, showing '{}'",
                    option, reverted_to
                );
            }
            CardEvent::LoadingChanged { loading } => {
                info!("LOAD | {}", if *loading { "busy" } else { "idle" });
            }
            CardEvent::ActivityLoadTimedOut { target } => {
                warn!("LOAD | safety timeout for '{}'", target);
            }
            CardEvent::CapabilitiesMalformed { raw_entries } => {
                warn!("CAPS | {} raw entries, none usable; failing open", raw_entries);
            }
            CardEvent::CommandSent {
                key,
                command_id,
                device,
            } => {
                info!("CMD | {} (0x{:02X}) -> {}", key, command_id, device);
            }
            CardEvent::CommandSkipped { key, reason } => {
                info!("CMD | {} skipped: {:?}", key, reason);
            }
            CardEvent::ServiceCallFailed { service, error } => {
                warn!("CALL | {} failed: {}", service, error);
            }
            CardEvent::ThemeApplied { theme, mutations } => {
                info!(
                    "THEME | {} ({} mutations)",
                    theme.as_deref().unwrap_or("<default>"),
                    mutations
                );
            }
        }
    }
}
