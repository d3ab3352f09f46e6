//! Context threaded through every selector FSM handler.
//!
//! The caller writes the inputs (`now_ms`, `confirmed`, `selection`) before
//! each step and drains `outbox` / `resolution` afterwards.  Handlers only
//! ever see this struct.

/// An unconfirmed user request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingActivity {
    pub requested_value: String,
    pub requested_at_ms: u64,
}

/// Side effects requested by the FSM, executed by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoordinatorAction {
    /// Issue a select-option service call for this value.
    SelectOption(String),
    /// Start (or restart) the activity-loading indicator for this target.
    StartLoading(String),
    /// Stop the activity-loading indicator early.
    StopLoading,
}

/// How the last `Pending` period ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The hub confirmed the requested value.
    Confirmed(String),
    /// The request was abandoned after the expiry window.
    Expired(String),
}

pub struct CoordinatorContext {
    // -- Inputs --
    /// Current monotonic time in milliseconds.
    pub now_ms: u64,
    /// Value the hub currently reports as selected.
    pub confirmed: String,
    /// A genuine user selection not yet consumed by the FSM.
    pub selection: Option<String>,

    // -- State --
    pub pending: Option<PendingActivity>,
    pub pending_expiry_ms: u64,

    // -- Outputs --
    pub outbox: Vec<CoordinatorAction>,
    pub resolution: Option<Resolution>,
}

impl CoordinatorContext {
    pub fn new(pending_expiry_ms: u64) -> Self {
        Self {
            now_ms: 0,
            confirmed: String::new(),
            selection: None,
            pending: None,
            pending_expiry_ms,
            outbox: Vec::new(),
            resolution: None,
        }
    }

    /// The pending request has outlived the expiry window.
    pub fn pending_expired(&self) -> bool {
        self.pending.as_ref().is_some_and(|p| {
            self.now_ms.saturating_sub(p.requested_at_ms) > self.pending_expiry_ms
        })
    }

    /// Value the selector should display right now.
    pub fn displayed_value(&self) -> &str {
        match &self.pending {
            Some(p) if !self.pending_expired() => &p.requested_value,
            _ => &self.confirmed,
        }
    }
}
