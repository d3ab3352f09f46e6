//! Activity selector and load indicator flows through the full service.

use remotecard::CardCommand;
use remotecard::CardEvent;
use remotecard::app::ports::OutboundCall;
use remotecard::fsm::StateId;
use remotecard::render::Warning;
use serde_json::json;

use crate::mock_host::*;

fn select(option: &str) -> CardCommand {
    CardCommand::SelectActivity(option.to_owned())
}

// ── Optimistic selection ──────────────────────────────────────

#[test]
fn pending_request_confirmed_within_window() {
    let (mut svc, mut host, mut sink) = start_default();
    let r = push(&mut svc, &mut host, &mut sink, 0, [remote("Watch TV", json!([])), selector("Watch TV")]);
    assert_eq!(r.selector.displayed_value, "Watch TV");
    assert!(r.selector.enabled);
    assert!(!r.loading);

    let t0 = 1_000;
    let r = svc
        .handle_command(select("Movie"), t0, &mut host, &mut sink)
        .expect("selection renders");
    assert_eq!(r.selector.displayed_value, "Movie");
    assert!(r.loading);
    assert_eq!(svc.selector_state(), StateId::Pending);
    assert_eq!(
        host.calls,
        vec![OutboundCall::SelectOption {
            entity_id: SELECTOR.into(),
            option: "Movie".into(),
        }]
    );

    // Hub has not switched yet: display stays optimistic.
    let r = push(&mut svc, &mut host, &mut sink, t0 + 500, [remote("Watch TV", json!([])), selector("Watch TV")]);
    assert_eq!(r.selector.displayed_value, "Movie");
    assert!(r.loading);

    let r = push(&mut svc, &mut host, &mut sink, t0 + 2_000, [remote("Movie", json!([])), selector("Movie")]);
    assert_eq!(svc.selector_state(), StateId::Idle);
    assert_eq!(r.selector.displayed_value, "Movie");
    assert!(!r.loading);
    assert_eq!(svc.next_deadline(), None);
    assert_eq!(sink.count(|e| matches!(e, CardEvent::ActivityConfirmed { .. })), 1);
    assert_eq!(host.calls.len(), 1, "confirmation must not trigger another call");
}

#[test]
fn unconfirmed_request_expires_and_reverts() {
    let (mut svc, mut host, mut sink) = start_default();
    push(&mut svc, &mut host, &mut sink, 0, [remote("Watch TV", json!([])), selector("Watch TV")]);

    let t0 = 1_000;
    svc.handle_command(select("Movie"), t0, &mut host, &mut sink);
    assert_eq!(svc.next_deadline(), Some(t0 + 15_001));

    assert!(svc.poll_timers(t0 + 15_000, &mut sink).is_none());
    let r = svc.poll_timers(t0 + 15_001, &mut sink).expect("display reverts");
    assert_eq!(svc.selector_state(), StateId::Idle);
    assert_eq!(r.selector.displayed_value, "Watch TV");
    assert!(r.loading, "activity loading outlives the optimistic window");
    assert!(sink.events.contains(&CardEvent::ActivityRequestExpired {
        option: "Movie".into(),
        reverted_to: "Watch TV".into(),
    }));

    // Safety valve clears the stuck indicator.
    assert_eq!(svc.next_deadline(), Some(t0 + 60_000));
    let r = svc.poll_timers(t0 + 60_000, &mut sink).expect("loading clears");
    assert!(!r.loading);
    assert!(sink.events.contains(&CardEvent::ActivityLoadTimedOut {
        target: "Movie".into()
    }));
    assert_eq!(svc.next_deadline(), None);
}

#[test]
fn superseding_request_issues_new_call() {
    let (mut svc, mut host, mut sink) = start_default();
    push(&mut svc, &mut host, &mut sink, 0, [remote("Watch TV", json!([])), selector("Watch TV")]);

    svc.handle_command(select("Movie"), 1_000, &mut host, &mut sink);
    let r = svc
        .handle_command(select("Music"), 2_000, &mut host, &mut sink)
        .expect("second selection renders");
    assert_eq!(r.selector.displayed_value, "Music");
    assert_eq!(host.calls.len(), 2);
    assert_eq!(svc.next_deadline(), Some(2_000 + 15_001));
}

#[test]
fn reselecting_displayed_value_is_ignored() {
    let (mut svc, mut host, mut sink) = start_default();
    push(&mut svc, &mut host, &mut sink, 0, [remote("Watch TV", json!([])), selector("Watch TV")]);

    assert!(svc.handle_command(select("Watch TV"), 10, &mut host, &mut sink).is_none());
    svc.handle_command(select("Movie"), 20, &mut host, &mut sink);
    assert!(svc.handle_command(select("Movie"), 30, &mut host, &mut sink).is_none());
    assert_eq!(host.calls.len(), 1);
}

#[test]
fn unknown_option_is_ignored() {
    let (mut svc, mut host, mut sink) = start_default();
    push(&mut svc, &mut host, &mut sink, 0, [remote("Watch TV", json!([])), selector("Watch TV")]);
    assert!(svc.handle_command(select("Karaoke"), 10, &mut host, &mut sink).is_none());
    assert!(host.calls.is_empty());
}

#[test]
fn display_write_back_does_not_loop() {
    let (mut svc, mut host, mut sink) = start_default();
    push(&mut svc, &mut host, &mut sink, 0, [remote("Watch TV", json!([])), selector("Watch TV")]);

    assert_eq!(svc.sync_selector_display().as_deref(), Some("Watch TV"));
    assert_eq!(svc.sync_selector_display(), None);

    // The host echoes the written value back as a state push.
    push(&mut svc, &mut host, &mut sink, 100, [remote("Watch TV", json!([])), selector("Watch TV")]);
    assert_eq!(svc.sync_selector_display(), None);
    assert_eq!(svc.selector_state(), StateId::Idle);
    assert!(host.calls.is_empty());
}

#[test]
fn rejected_call_is_not_retried_and_expires() {
    let (mut svc, mut host, mut sink) = start_default();
    push(&mut svc, &mut host, &mut sink, 0, [remote("Watch TV", json!([])), selector("Watch TV")]);

    host.reject = Some("hub offline".into());
    let r = svc
        .handle_command(select("Movie"), 1_000, &mut host, &mut sink)
        .expect("optimistic state still shown");
    assert_eq!(r.selector.displayed_value, "Movie");
    assert_eq!(
        sink.count(|e| matches!(e, CardEvent::ServiceCallFailed { service, .. } if service == "select.select_option")),
        1
    );

    host.reject = None;
    let r = svc.poll_timers(16_001, &mut sink).expect("reverts");
    assert_eq!(r.selector.displayed_value, "Watch TV");
    assert!(host.calls.is_empty(), "no automatic retry");
}

// ── Selector availability ─────────────────────────────────────

#[test]
fn missing_selector_disables_control_only() {
    let (mut svc, mut host, mut sink) = start_default();
    let r = push(&mut svc, &mut host, &mut sink, 0, [remote("Watch TV", json!([]))]);
    assert!(!r.selector.enabled);
    assert!(r.warnings.contains(&Warning::SelectorMissing));
    assert!(svc.handle_command(select("Movie"), 10, &mut host, &mut sink).is_none());

    // Buttons keep working.
    assert!(svc
        .handle_command(CardCommand::PressButton("ok".into()), 20, &mut host, &mut sink)
        .is_some());
    assert_eq!(host.calls.len(), 1);
}

#[test]
fn app_connection_blocks_selector() {
    let (mut svc, mut host, mut sink) = start_default();
    let r = push(
        &mut svc,
        &mut host,
        &mut sink,
        0,
        [
            remote_with("Watch TV", json!([]), json!({ "proxy_client_connected": true })),
            selector("Watch TV"),
        ],
    );
    assert!(!r.selector.enabled);
    assert!(r.warnings.contains(&Warning::AppConnected));
    assert!(svc.handle_command(select("Movie"), 10, &mut host, &mut sink).is_none());
    assert!(host.calls.is_empty());
}

// ── Load indicator ────────────────────────────────────────────

#[test]
fn button_press_pulses_busy_indicator() {
    let (mut svc, mut host, mut sink) = start_default();
    push(&mut svc, &mut host, &mut sink, 0, [remote("Watch TV", json!([])), selector("Watch TV")]);

    let r = svc
        .handle_command(CardCommand::PressButton("ok".into()), 5_000, &mut host, &mut sink)
        .expect("press renders");
    assert!(r.loading);
    assert_eq!(svc.next_deadline(), Some(6_000));

    assert!(svc.poll_timers(5_999, &mut sink).is_none());
    let r = svc.poll_timers(6_000, &mut sink).expect("pulse clears");
    assert!(!r.loading);
}

#[test]
fn rapid_presses_extend_pulse() {
    let (mut svc, mut host, mut sink) = start_default();
    push(&mut svc, &mut host, &mut sink, 0, [remote("Watch TV", json!([])), selector("Watch TV")]);

    svc.handle_command(CardCommand::PressButton("up".into()), 5_000, &mut host, &mut sink);
    svc.handle_command(CardCommand::PressButton("up".into()), 5_600, &mut host, &mut sink);
    assert_eq!(svc.next_deadline(), Some(6_600));
    assert!(svc.poll_timers(6_000, &mut sink).is_none());
    assert!(!svc.poll_timers(6_600, &mut sink).expect("clears").loading);
    assert_eq!(
        sink.count(|e| matches!(e, CardEvent::LoadingChanged { .. })),
        2,
        "one on, one off"
    );
}

#[test]
fn hub_reaching_target_stops_loading_before_selector_confirms() {
    let (mut svc, mut host, mut sink) = start_default();
    push(&mut svc, &mut host, &mut sink, 0, [remote("Watch TV", json!([])), selector("Watch TV")]);
    svc.handle_command(select("Movie"), 1_000, &mut host, &mut sink);

    // Remote already reports the new activity; the selector entity lags.
    let r = push(&mut svc, &mut host, &mut sink, 1_500, [remote("Movie", json!([])), selector("Watch TV")]);
    assert!(!r.loading);
    assert_eq!(svc.selector_state(), StateId::Pending);
    assert_eq!(r.selector.displayed_value, "Movie");
}

#[test]
fn device_load_state_feeds_indicator() {
    let (mut svc, mut host, mut sink) = start_default();
    let r = push(
        &mut svc,
        &mut host,
        &mut sink,
        0,
        [
            remote_with("Watch TV", json!([]), json!({ "load_state": "loading" })),
            selector("Watch TV"),
        ],
    );
    assert!(r.loading);

    let r = push(
        &mut svc,
        &mut host,
        &mut sink,
        500,
        [
            remote_with("Watch TV", json!([]), json!({ "load_state": "ready" })),
            selector("Watch TV"),
        ],
    );
    assert!(!r.loading);
    assert_eq!(sink.count(|e| matches!(e, CardEvent::LoadingChanged { .. })), 2);
}
