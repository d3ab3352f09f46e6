//! Card service, the hexagonal core.
//!
//! [`CardService`] owns the selector coordinator, the load indicator, the
//! timer scheduler and the theme applier.  Every host state push runs one
//! synchronous reconciliation pass; all I/O flows through port traits
//! injected at call sites.
//!
//! ```text
//!  StatePort ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!                │          CardService         │
//!  ServicePort ◀─│ Coordinator · Loading · Gate │ ──▶ RenderState
//!  StylePort   ◀─│ Theme · Scheduler            │
//!                └──────────────────────────────┘
//! ```
//!
//! Pass order: snapshot → capabilities → gating → coordinator → loading →
//! theme → compose.

use log::{debug, info, warn};

use crate::attributes::{ActivitySelectorSnapshot, AttributeAdapter, Availability, DeviceSnapshot};
use crate::capability::CapabilitySet;
use crate::catalog;
use crate::config::CardConfig;
use crate::coordinator::ActivityCoordinator;
use crate::error::ConfigError;
use crate::fsm::StateId;
use crate::fsm::context::{CoordinatorAction, Resolution};
use crate::gating::{ButtonGatingEngine, ButtonRenderState, ShortcutRenderState, is_powered_off};
use crate::loading::{LoadIndicatorController, LoadingState};
use crate::render::{Frame, RenderState, compose};
use crate::scheduler::Scheduler;
use crate::theme::ThemeApplier;

use super::commands::CardCommand;
use super::events::{CardEvent, SkipReason};
use super::ports::{EventSink, HostPort, OutboundCall, ServicePort, StatePort};

// ───────────────────────────────────────────────────────────────
// CardService
// ───────────────────────────────────────────────────────────────

pub struct CardService {
    config: CardConfig,
    coordinator: ActivityCoordinator,
    loading: LoadIndicatorController,
    scheduler: Scheduler,
    theme: ThemeApplier,

    // Last snapshots seen; replaced wholesale every pass.
    device: DeviceSnapshot,
    selector: ActivitySelectorSnapshot,

    // Gating output of the last pass with an available device.
    caps: CapabilitySet,
    buttons: Vec<ButtonRenderState>,
    shortcuts: Vec<ShortcutRenderState>,
    powered_off: bool,

    confirmed: String,
    last_render: Option<RenderState>,
}

impl CardService {
    /// Construct the service.  Fails fast on an unusable configuration.
    pub fn new(config: CardConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let caps = CapabilitySet::default();
        let buttons = ButtonGatingEngine::evaluate(false, false, &caps);
        Ok(Self {
            coordinator: ActivityCoordinator::new(config.timing.pending_expiry_ms),
            loading: LoadIndicatorController::new(&config.timing),
            scheduler: Scheduler::new(),
            theme: ThemeApplier::new(),
            device: DeviceSnapshot::default(),
            selector: ActivitySelectorSnapshot::default(),
            caps,
            buttons,
            shortcuts: Vec::new(),
            powered_off: false,
            confirmed: String::new(),
            last_render: None,
            config,
        })
    }

    // ── Lifecycle ─────────────────────────────────────────────

    pub fn start(&mut self, sink: &mut impl EventSink) {
        sink.emit(&CardEvent::Started {
            entity: self.config.entity.clone(),
        });
        info!("CardService started for {}", self.config.entity);
    }

    // ── Per-update reconciliation ─────────────────────────────

    /// Read both snapshots through the [`AttributeAdapter`] and reconcile.
    pub fn update_from_states(
        &mut self,
        states: &impl StatePort,
        now_ms: u64,
        host: &mut impl HostPort,
        sink: &mut impl EventSink,
    ) -> RenderState {
        let (device, selector) = AttributeAdapter::read(states, &self.config.entity);
        self.update(device, selector, now_ms, host, sink)
    }

    /// One full reconciliation pass.  Runs to completion; never yields.
    pub fn update(
        &mut self,
        device: DeviceSnapshot,
        selector: ActivitySelectorSnapshot,
        now_ms: u64,
        host: &mut impl HostPort,
        sink: &mut impl EventSink,
    ) -> RenderState {
        self.device = device;
        self.selector = selector;

        // 1. Capabilities and gating.  An unavailable or missing device
        //    leaves the last computed gating in place.
        if self.device.availability == Availability::Available {
            self.refresh_gating(sink);
        } else {
            debug!(
                "{}: device {:?}; keeping previous gating",
                self.config.entity, self.device.availability
            );
        }

        // 2. Selector coordination
        if let Some(confirmed) = self.confirmed_value() {
            self.confirmed = confirmed;
        }
        let actions = self.coordinator.reconcile(&self.confirmed, now_ms);
        self.run_actions(actions, now_ms, host, sink);
        self.report_resolution(sink);

        // 3. Loading indicator
        self.loading
            .set_external_loading(self.device.reports_loading());
        let label = if self.device.current_activity_label.is_empty() {
            self.confirmed.clone()
        } else {
            self.device.current_activity_label.clone()
        };
        self.loading.auto_stop(&label, &mut self.scheduler);
        self.report_loading(now_ms, sink);

        // 4. Theme
        let background = self.config.background_css();
        let mutations = self
            .theme
            .apply(self.config.theme.as_deref(), background.as_deref(), host);
        if mutations > 0 {
            sink.emit(&CardEvent::ThemeApplied {
                theme: self.config.theme.clone(),
                mutations,
            });
        }

        // 5. Compose
        self.recompose()
    }

    // ── Command handling ──────────────────────────────────────

    /// Process a user interaction.  Returns the new render state, or
    /// `None` when the interaction was ignored.
    pub fn handle_command(
        &mut self,
        cmd: CardCommand,
        now_ms: u64,
        host: &mut impl ServicePort,
        sink: &mut impl EventSink,
    ) -> Option<RenderState> {
        match cmd {
            CardCommand::SelectActivity(option) => {
                if !self.selector_enabled() {
                    debug!("selector disabled; ignoring '{}'", option);
                    return None;
                }
                if !self.selector.options.is_empty() && !self.selector.options.contains(&option) {
                    warn!("'{}' is not an activity option; ignoring", option);
                    return None;
                }
                let before = self.coordinator.state();
                let actions = self.coordinator.select(&option, &self.confirmed, now_ms);
                if actions.is_empty() && before == self.coordinator.state() {
                    return None;
                }
                self.run_actions(actions, now_ms, host, sink);
                self.report_resolution(sink);
                self.report_loading(now_ms, sink);
                Some(self.recompose())
            }
            CardCommand::PressButton(key) => {
                let Some(button) = catalog::find(&key) else {
                    return skip(&key, SkipReason::UnknownKey, sink);
                };
                let state = self.buttons.iter().find(|b| b.key == button.key);
                if !self.config.shows(button.group) || !state.is_some_and(|s| s.visible) {
                    return skip(&key, SkipReason::Hidden, sink);
                }
                if !state.is_some_and(|s| s.enabled) {
                    return skip(&key, SkipReason::Disabled, sink);
                }
                let route = ButtonGatingEngine::resolve_route(
                    &self.caps,
                    button.numeric_id,
                    self.device.current_activity_id,
                );
                let Some(device) = route else {
                    warn!("no activity to route '{}' to", key);
                    return skip(&key, SkipReason::NoRoute, sink);
                };
                self.send_command(&key, button.numeric_id, device, now_ms, host, sink);
                Some(self.recompose())
            }
            CardCommand::PressShortcut(index) => {
                let key = format!("shortcut#{index}");
                let Some(shortcut) = self.device.shortcuts.get(index).cloned() else {
                    return skip(&key, SkipReason::UnknownKey, sink);
                };
                let Some(state) = self.shortcuts.get(index) else {
                    return skip(&key, SkipReason::UnknownKey, sink);
                };
                if !state.visible {
                    return skip(&shortcut.label, SkipReason::Hidden, sink);
                }
                if !state.enabled {
                    return skip(&shortcut.label, SkipReason::Disabled, sink);
                }
                let Some(device) = ButtonGatingEngine::resolve_shortcut_route(
                    &shortcut,
                    self.device.current_activity_id,
                ) else {
                    warn!("no activity to route '{}' to", shortcut.label);
                    return skip(&shortcut.label, SkipReason::NoRoute, sink);
                };
                self.send_command(&shortcut.label, shortcut.command_id, device, now_ms, host, sink);
                Some(self.recompose())
            }
        }
    }

    /// Display write-back for the selector control.  Returns the value to
    /// write only when it changed since the last write; never a transition.
    pub fn sync_selector_display(&mut self) -> Option<String> {
        self.coordinator.sync_display()
    }

    // ── Timers ────────────────────────────────────────────────

    /// Fire due timers and expire a stale optimistic request.  Returns a
    /// new render state when anything visible changed.
    pub fn poll_timers(&mut self, now_ms: u64, sink: &mut impl EventSink) -> Option<RenderState> {
        let fired = self.scheduler.poll(now_ms, &mut self.loading);
        if let Some(target) = self.loading.take_timed_out() {
            sink.emit(&CardEvent::ActivityLoadTimedOut { target });
        }

        let shown_before = self.coordinator.displayed_value().to_owned();
        for action in self.coordinator.reconcile(&self.confirmed, now_ms) {
            // Without a new selection the coordinator cannot ask for a call.
            self.apply_loading_action(&action, now_ms);
        }
        self.report_resolution(sink);
        let loading_changed = self.report_loading(now_ms, sink);

        if fired == 0 && !loading_changed && shown_before == self.coordinator.displayed_value() {
            return None;
        }
        Some(self.recompose())
    }

    /// Earliest time at which [`poll_timers`](Self::poll_timers) has work.
    pub fn next_deadline(&self) -> Option<u64> {
        let expiry = self.coordinator.pending().map(|p| {
            p.requested_at_ms
                .saturating_add(self.config.timing.pending_expiry_ms)
                .saturating_add(1)
        });
        match (self.scheduler.next_deadline(), expiry) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn config(&self) -> &CardConfig {
        &self.config
    }

    pub fn selector_state(&self) -> StateId {
        self.coordinator.state()
    }

    pub fn loading_state(&self) -> &LoadingState {
        self.loading.state()
    }

    pub fn last_render(&self) -> Option<&RenderState> {
        self.last_render.as_ref()
    }

    // ── Internal ──────────────────────────────────────────────

    fn refresh_gating(&mut self, sink: &mut impl EventSink) {
        let caps = CapabilitySet::parse(&self.device.enabled_buttons_raw);
        if caps.is_malformed() && !self.caps.is_malformed() {
            warn!(
                "{}: enabled_buttons has {} entries and none parse; allowing all buttons",
                self.config.entity,
                self.device.enabled_buttons_raw.len()
            );
            sink.emit(&CardEvent::CapabilitiesMalformed {
                raw_entries: self.device.enabled_buttons_raw.len(),
            });
        }
        self.caps = caps;

        self.powered_off = is_powered_off(
            &self.device.current_activity_label,
            &self.selector.current_value,
        );
        self.buttons = ButtonGatingEngine::evaluate(
            self.device.hub_variant.is_second_generation(),
            self.powered_off,
            &self.caps,
        );
        let config = &self.config;
        self.shortcuts = ButtonGatingEngine::evaluate_shortcuts(
            &self.device.shortcuts,
            self.powered_off,
            |kind| config.shows_shortcut(kind),
        );
    }

    /// The hub's confirmed selector value: the selector's own state, else
    /// the remote's activity label.  `None` when neither is known.
    fn confirmed_value(&self) -> Option<String> {
        [&self.selector.current_value, &self.device.current_activity_label]
            .into_iter()
            .map(|v| v.trim())
            .find(|v| !v.is_empty())
            .map(str::to_owned)
    }

    fn selector_enabled(&self) -> bool {
        self.config.show_activity
            && self.selector.availability == Availability::Available
            && !self.device.app_connected
    }

    fn run_actions(
        &mut self,
        actions: Vec<CoordinatorAction>,
        now_ms: u64,
        host: &mut impl ServicePort,
        sink: &mut impl EventSink,
    ) {
        for action in actions {
            let option = match action {
                CoordinatorAction::SelectOption(option) => option,
                other => {
                    self.apply_loading_action(&other, now_ms);
                    continue;
                }
            };
            let Some(entity_id) = self.device.activity_selector_entity_ref.clone() else {
                warn!("no activity selector entity; '{}' not sent", option);
                sink.emit(&CardEvent::ServiceCallFailed {
                    service: "select.select_option".into(),
                    error: "no activity selector entity".into(),
                });
                continue;
            };
            info!("requesting activity '{}'", option);
            dispatch(
                &OutboundCall::SelectOption {
                    entity_id,
                    option: option.clone(),
                },
                host,
                sink,
            );
            sink.emit(&CardEvent::ActivityRequested { option });
        }
    }

    fn apply_loading_action(&mut self, action: &CoordinatorAction, now_ms: u64) {
        match action {
            CoordinatorAction::StartLoading(target) => {
                self.loading
                    .start_activity_loading(target, now_ms, &mut self.scheduler);
            }
            CoordinatorAction::StopLoading => {
                self.loading.stop_activity_loading(&mut self.scheduler);
            }
            CoordinatorAction::SelectOption(option) => {
                debug!("select of '{}' outside a host pass dropped", option);
            }
        }
    }

    fn report_resolution(&mut self, sink: &mut impl EventSink) {
        match self.coordinator.take_resolution() {
            Some(Resolution::Confirmed(option)) => {
                info!("activity '{}' confirmed", option);
                sink.emit(&CardEvent::ActivityConfirmed { option });
            }
            Some(Resolution::Expired(option)) => {
                sink.emit(&CardEvent::ActivityRequestExpired {
                    option,
                    reverted_to: self.coordinator.displayed_value().to_owned(),
                });
            }
            None => {}
        }
    }

    fn report_loading(&mut self, now_ms: u64, sink: &mut impl EventSink) -> bool {
        match self.loading.recompute_indicator(now_ms) {
            Some(loading) => {
                info!("loading {}", if loading { "on" } else { "off" });
                sink.emit(&CardEvent::LoadingChanged { loading });
                true
            }
            None => false,
        }
    }

    fn send_command(
        &mut self,
        key: &str,
        command_id: i64,
        device: i64,
        now_ms: u64,
        host: &mut impl ServicePort,
        sink: &mut impl EventSink,
    ) {
        let call = OutboundCall::SendCommand {
            entity_id: self.config.entity.clone(),
            command_id,
            device,
        };
        if dispatch(&call, host, sink) {
            info!("sent '{}' (0x{:02X}) to {}", key, command_id, device);
            sink.emit(&CardEvent::CommandSent {
                key: key.to_owned(),
                command_id,
                device,
            });
        }
        self.loading.trigger_command_pulse(now_ms, &mut self.scheduler);
        self.report_loading(now_ms, sink);
    }

    fn recompose(&mut self) -> RenderState {
        let render = compose(&Frame {
            config: &self.config,
            device: &self.device,
            selector: &self.selector,
            buttons: &self.buttons,
            shortcuts: &self.shortcuts,
            displayed_value: self.coordinator.displayed_value(),
            loading: self.loading.indicator(),
            powered_off: self.powered_off,
        });
        self.last_render = Some(render.clone());
        render
    }
}

// ───────────────────────────────────────────────────────────────
// Helpers
// ───────────────────────────────────────────────────────────────

/// Fire-and-forget call.  A rejection is logged and reported, never retried.
fn dispatch(call: &OutboundCall, host: &mut impl ServicePort, sink: &mut impl EventSink) -> bool {
    match host.call(call) {
        Ok(()) => true,
        Err(e) => {
            let service = format!("{}.{}", call.domain(), call.service());
            warn!("{} rejected: {}", service, e);
            sink.emit(&CardEvent::ServiceCallFailed {
                service,
                error: e.to_string(),
            });
            false
        }
    }
}

fn skip(key: &str, reason: SkipReason, sink: &mut impl EventSink) -> Option<RenderState> {
    debug!("press of '{}' ignored: {:?}", key, reason);
    sink.emit(&CardEvent::CommandSkipped {
        key: key.to_owned(),
        reason,
    });
    None
}
