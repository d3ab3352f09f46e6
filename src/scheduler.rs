//! One-shot timer engine.
//!
//! The card only ever suspends on timers: the busy-pulse clear and the
//! activity-load safety valve.  The scheduler owns the live timers and
//! notifies a [`SchedulerDelegate`] when one fires; it knows nothing about
//! what the timers mean.
//!
//! ```text
//!  LoadIndicatorController ──schedule/cancel──▶ Scheduler (TimerPort)
//!            ▲                                      │
//!            └────────── on_timer_fired ◀── poll(now_ms)
//! ```
//!
//! Scheduling a kind replaces any live timer of that kind, so there is
//! never more than one timer per [`TimerKind`].

use heapless::Vec;
use log::{debug, warn};

use crate::app::ports::{SchedulerDelegate, TimerHandle, TimerKind, TimerPort};

// ═══════════════════════════════════════════════════════════════
//  Scheduler engine
// ═══════════════════════════════════════════════════════════════

/// Maximum number of concurrent timers (stack-allocated).
const MAX_TIMERS: usize = 4;

/// Internal bookkeeping for a live timer.
#[derive(Debug, Clone, Copy)]
struct TimerEntry {
    handle: TimerHandle,
    kind: TimerKind,
    deadline_ms: u64,
}

pub struct Scheduler {
    timers: Vec<TimerEntry, MAX_TIMERS>,
    next_handle: u32,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    pub fn new() -> Self {
        Self {
            timers: Vec::new(),
            next_handle: 1,
        }
    }

    /// Fire every timer due at `now_ms`, earliest deadline first.
    /// Returns the number of timers fired.
    pub fn poll(&mut self, now_ms: u64, delegate: &mut dyn SchedulerDelegate) -> usize {
        let mut fired = 0;
        while let Some(idx) = self.earliest_due(now_ms) {
            let entry = self.timers.swap_remove(idx);
            debug!(
                "Scheduler: {:?} #{} fired at {}ms (deadline {}ms)",
                entry.kind, entry.handle.0, now_ms, entry.deadline_ms
            );
            delegate.on_timer_fired(entry.handle, entry.kind, now_ms);
            fired += 1;
        }
        fired
    }

    /// Earliest pending deadline, for hosts that arm a single wake-up.
    pub fn next_deadline(&self) -> Option<u64> {
        self.timers.iter().map(|t| t.deadline_ms).min()
    }

    /// Number of live timers.
    pub fn active_count(&self) -> usize {
        self.timers.len()
    }

    /// Whether a timer of `kind` is live.
    pub fn is_scheduled(&self, kind: TimerKind) -> bool {
        self.timers.iter().any(|t| t.kind == kind)
    }

    fn earliest_due(&self, now_ms: u64) -> Option<usize> {
        self.timers
            .iter()
            .enumerate()
            .filter(|(_, t)| t.deadline_ms <= now_ms)
            .min_by_key(|(_, t)| (t.deadline_ms, t.handle))
            .map(|(i, _)| i)
    }
}

impl TimerPort for Scheduler {
    fn schedule(&mut self, kind: TimerKind, deadline_ms: u64) -> TimerHandle {
        self.timers.retain(|t| t.kind != kind);

        let handle = TimerHandle(self.next_handle);
        self.next_handle = self.next_handle.wrapping_add(1).max(1);

        let entry = TimerEntry {
            handle,
            kind,
            deadline_ms,
        };
        if self.timers.push(entry).is_err() {
            warn!("Scheduler: no free slot for {:?}; timer dropped", kind);
        } else {
            debug!("Scheduler: {:?} #{} armed for {}ms", kind, handle.0, deadline_ms);
        }
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.timers.retain(|t| t.handle != handle);
    }
}

// ═══════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════
