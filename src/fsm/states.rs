//! Concrete selector state handlers and table builder.
//!
//! ```text
//!  IDLE ──[user selects v ≠ displayed]──▶ PENDING(v, now)
//!    ▲                                      │  │
//!    │              [confirmed == v]────────┘  │   (stop loading)
//!    └──────────────[now − t > expiry]─────────┘   (abandon request)
//!
//!  PENDING ──[user selects w ≠ v]──▶ PENDING(w, now)   (supersede)
//! ```

use super::context::{CoordinatorAction, CoordinatorContext, PendingActivity, Resolution};
use super::{StateDescriptor, StateId};
use log::{info, warn};

/// Build the static state table.
pub fn build_state_table() -> [StateDescriptor; StateId::COUNT] {
    [
        // Index 0: Idle
        StateDescriptor {
            name: "Idle",
            on_enter: Some(idle_enter),
            on_exit: None,
            on_update: idle_update,
        },
        // Index 1: Pending
        StateDescriptor {
            name: "Pending",
            on_enter: Some(pending_enter),
            on_exit: Some(pending_exit),
            on_update: pending_update,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  IDLE state
// ═══════════════════════════════════════════════════════════════════════════

fn idle_enter(ctx: &mut CoordinatorContext) {
    ctx.pending = None;
}

fn idle_update(ctx: &mut CoordinatorContext) -> Option<StateId> {
    let value = ctx.selection.take()?;
    if value == ctx.confirmed {
        return None;
    }
    ctx.pending = Some(PendingActivity {
        requested_value: value,
        requested_at_ms: ctx.now_ms,
    });
    Some(StateId::Pending)
}

// ═══════════════════════════════════════════════════════════════════════════
//  PENDING state
// ═══════════════════════════════════════════════════════════════════════════

fn pending_enter(ctx: &mut CoordinatorContext) {
    ctx.resolution = None;
    request_current(ctx);
}

fn pending_exit(ctx: &mut CoordinatorContext) {
    ctx.pending = None;
}

fn pending_update(ctx: &mut CoordinatorContext) -> Option<StateId> {
    if let Some(value) = ctx.selection.take() {
        let current = ctx.pending.as_ref().map(|p| p.requested_value.as_str());
        if current != Some(value.as_str()) {
            info!("activity request superseded by '{}'", value);
            ctx.pending = Some(PendingActivity {
                requested_value: value,
                requested_at_ms: ctx.now_ms,
            });
            request_current(ctx);
        }
    }

    let requested = ctx.pending.as_ref()?.requested_value.clone();

    if ctx.confirmed == requested {
        ctx.outbox.push(CoordinatorAction::StopLoading);
        ctx.resolution = Some(Resolution::Confirmed(requested));
        return Some(StateId::Idle);
    }

    if ctx.pending_expired() {
        warn!(
            "activity request '{}' not confirmed within {}ms; reverting to '{}'",
            requested, ctx.pending_expiry_ms, ctx.confirmed
        );
        ctx.resolution = Some(Resolution::Expired(requested));
        return Some(StateId::Idle);
    }

    None
}

// ═══════════════════════════════════════════════════════════════════════════
//  Helpers
// ═══════════════════════════════════════════════════════════════════════════

fn request_current(ctx: &mut CoordinatorContext) {
    if let Some(p) = &ctx.pending {
        ctx.outbox
            .push(CoordinatorAction::SelectOption(p.requested_value.clone()));
        ctx.outbox
            .push(CoordinatorAction::StartLoading(p.requested_value.clone()));
    }
}
