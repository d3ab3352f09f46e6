//! Activity coordinator: optimistic-update controller for the selector.
//!
//! Two entry points:
//!
//! - [`select`](ActivityCoordinator::select) reacts to genuine user input
//!   and may move the FSM `Idle → Pending`.
//! - [`sync_display`](ActivityCoordinator::sync_display) is the write-back
//!   path that keeps the control showing the right value.  It never feeds
//!   the FSM, so the card cannot loop on its own writes.

use log::debug;

use crate::fsm::context::{CoordinatorAction, CoordinatorContext, PendingActivity, Resolution};
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, StateId};

pub struct ActivityCoordinator {
    fsm: Fsm,
    ctx: CoordinatorContext,
    last_written: Option<String>,
}

impl ActivityCoordinator {
    pub fn new(pending_expiry_ms: u64) -> Self {
        Self {
            fsm: Fsm::new(build_state_table(), StateId::Idle),
            ctx: CoordinatorContext::new(pending_expiry_ms),
            last_written: None,
        }
    }

    /// Handle a user selection.  A value equal to what is already displayed
    /// is ignored.
    pub fn select(&mut self, value: &str, confirmed: &str, now_ms: u64) -> Vec<CoordinatorAction> {
        let mut actions = self.reconcile(confirmed, now_ms);
        if value == self.ctx.displayed_value() {
            debug!("selector: '{}' already displayed; ignoring", value);
            return actions;
        }
        self.ctx.selection = Some(value.to_owned());
        self.fsm.step(&mut self.ctx);
        actions.append(&mut self.ctx.outbox);
        actions
    }

    /// Fold in the hub's confirmed value and the clock.
    pub fn reconcile(&mut self, confirmed: &str, now_ms: u64) -> Vec<CoordinatorAction> {
        self.ctx.now_ms = now_ms;
        if self.ctx.confirmed != confirmed {
            self.ctx.confirmed = confirmed.to_owned();
        }
        self.fsm.step(&mut self.ctx);
        std::mem::take(&mut self.ctx.outbox)
    }

    /// Value to show in the selector as of the last reconcile.
    pub fn displayed_value(&self) -> &str {
        self.ctx.displayed_value()
    }

    /// Display write-back: the value to push into the control, only when it
    /// differs from what was last pushed.
    pub fn sync_display(&mut self) -> Option<String> {
        let shown = self.ctx.displayed_value();
        if self.last_written.as_deref() == Some(shown) {
            return None;
        }
        let shown = shown.to_owned();
        self.last_written = Some(shown.clone());
        Some(shown)
    }

    pub fn state(&self) -> StateId {
        self.fsm.current_state()
    }

    pub fn pending(&self) -> Option<&PendingActivity> {
        self.ctx.pending.as_ref()
    }

    /// How the last pending period ended, consumed once.
    pub fn take_resolution(&mut self) -> Option<Resolution> {
        self.ctx.resolution.take()
    }
}
