//! Load indicator controller.
//!
//! Merges the independent "something is busy" signals into one boolean:
//!
//! ```text
//!  loading = activity_load_active
//!          OR (pulse_until is set AND now < pulse_until)
//!          OR external load_state == "loading"
//! ```
//!
//! Every mutation funnels through [`recompute_indicator`], which only
//! reports a value when it differs from the last one reported.
//!
//! [`recompute_indicator`]: LoadIndicatorController::recompute_indicator

use log::{info, warn};

use crate::app::ports::{SchedulerDelegate, TimerHandle, TimerKind, TimerPort};
use crate::config::TimingConfig;

/// Raw loading state, owned by the controller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadingState {
    pub activity_load_active: bool,
    pub activity_load_target: Option<String>,
    pub activity_load_timeout_handle: Option<TimerHandle>,
    pub command_pulse_until_ms: Option<u64>,
    pub pulse_timeout_handle: Option<TimerHandle>,
}

pub struct LoadIndicatorController {
    state: LoadingState,
    external_loading: bool,
    last_indicator: bool,
    timed_out_target: Option<String>,
    activity_load_timeout_ms: u64,
    command_pulse_ms: u64,
}

impl LoadIndicatorController {
    pub fn new(timing: &TimingConfig) -> Self {
        Self {
            state: LoadingState::default(),
            external_loading: false,
            last_indicator: false,
            timed_out_target: None,
            activity_load_timeout_ms: timing.activity_load_timeout_ms,
            command_pulse_ms: timing.command_pulse_ms,
        }
    }

    pub fn state(&self) -> &LoadingState {
        &self.state
    }

    pub fn is_loading_active(&self, now_ms: u64) -> bool {
        self.state.activity_load_active
            || self
                .state
                .command_pulse_until_ms
                .is_some_and(|until| now_ms < until)
            || self.external_loading
    }

    /// Start (or extend) the minimum busy pulse.  Last pulse wins.
    pub fn trigger_command_pulse(&mut self, now_ms: u64, timers: &mut impl TimerPort) {
        if let Some(h) = self.state.pulse_timeout_handle.take() {
            timers.cancel(h);
        }
        let until = now_ms.saturating_add(self.command_pulse_ms);
        self.state.command_pulse_until_ms = Some(until);
        self.state.pulse_timeout_handle = Some(timers.schedule(TimerKind::CommandPulse, until));
    }

    /// Mark an activity switch in progress and arm the safety valve.
    pub fn start_activity_loading(
        &mut self,
        target: &str,
        now_ms: u64,
        timers: &mut impl TimerPort,
    ) {
        if let Some(h) = self.state.activity_load_timeout_handle.take() {
            timers.cancel(h);
        }
        self.state.activity_load_active = true;
        self.state.activity_load_target = Some(target.to_owned());
        self.state.activity_load_timeout_handle = Some(timers.schedule(
            TimerKind::ActivityLoadSafety,
            now_ms.saturating_add(self.activity_load_timeout_ms),
        ));
        info!("activity loading started for '{}'", target);
    }

    /// Clear the activity-loading flag.  Returns `false` if it was already off.
    pub fn stop_activity_loading(&mut self, timers: &mut impl TimerPort) -> bool {
        if let Some(h) = self.state.activity_load_timeout_handle.take() {
            timers.cancel(h);
        }
        if !self.state.activity_load_active {
            return false;
        }
        self.state.activity_load_active = false;
        self.state.activity_load_target = None;
        true
    }

    /// Feed the device's own `load_state` term.
    pub fn set_external_loading(&mut self, loading: bool) {
        self.external_loading = loading;
    }

    /// Stop loading once the hub reports the target as the current activity.
    pub fn auto_stop(&mut self, confirmed_label: &str, timers: &mut impl TimerPort) -> bool {
        let reached = self.state.activity_load_active
            && self
                .state
                .activity_load_target
                .as_deref()
                .is_some_and(|t| t == confirmed_label);
        if reached {
            info!("activity '{}' is now current", confirmed_label);
            self.stop_activity_loading(timers)
        } else {
            false
        }
    }

    /// New indicator value, or `None` if unchanged since the last call.
    pub fn recompute_indicator(&mut self, now_ms: u64) -> Option<bool> {
        let now_active = self.is_loading_active(now_ms);
        if now_active == self.last_indicator {
            return None;
        }
        self.last_indicator = now_active;
        Some(now_active)
    }

    /// The indicator value last reported.
    pub fn indicator(&self) -> bool {
        self.last_indicator
    }

    /// Target whose safety valve fired since the last call.
    pub fn take_timed_out(&mut self) -> Option<String> {
        self.timed_out_target.take()
    }
}

impl SchedulerDelegate for LoadIndicatorController {
    fn on_timer_fired(&mut self, handle: TimerHandle, kind: TimerKind, _now_ms: u64) {
        match kind {
            TimerKind::CommandPulse => {
                if self.state.pulse_timeout_handle != Some(handle) {
                    return;
                }
                self.state.pulse_timeout_handle = None;
                self.state.command_pulse_until_ms = None;
            }
            TimerKind::ActivityLoadSafety => {
                if self.state.activity_load_timeout_handle != Some(handle) {
                    return;
                }
                self.state.activity_load_timeout_handle = None;
                self.state.activity_load_active = false;
                let target = self.state.activity_load_target.take().unwrap_or_default();
                warn!(
                    "activity '{}' still not confirmed after {}ms; clearing loading",
                    target, self.activity_load_timeout_ms
                );
                self.timed_out_target = Some(target);
            }
        }
    }
}
