//! Button and shortcut gating, routing and degraded-input handling.

use remotecard::app::events::SkipReason;
use remotecard::app::ports::OutboundCall;
use remotecard::catalog::ButtonGroup;
use remotecard::render::Warning;
use remotecard::{CardCommand, CardConfig, CardEvent, CardService, ConfigError};
use serde_json::json;

use crate::mock_host::*;

fn press(key: &str) -> CardCommand {
    CardCommand::PressButton(key.to_owned())
}

fn send(command_id: i64, device: i64) -> OutboundCall {
    OutboundCall::SendCommand {
        entity_id: REMOTE.into(),
        command_id,
        device,
    }
}

fn skipped(sink: &RecordingSink, reason: SkipReason) -> usize {
    sink.count(|e| matches!(e, CardEvent::CommandSkipped { reason: r, .. } if *r == reason))
}

// ── Configuration ─────────────────────────────────────────────

#[test]
fn missing_entity_fails_at_construction() {
    assert!(matches!(
        CardService::new(CardConfig::for_entity("")),
        Err(ConfigError::MissingEntity)
    ));
    assert!(matches!(
        CardConfig::from_value(json!({ "theme": "dark" })),
        Err(ConfigError::MissingEntity)
    ));
}

#[test]
fn hidden_color_group() {
    let config = CardConfig::from_value(json!({ "entity": REMOTE, "show_colors": false })).unwrap();
    let (mut svc, mut host, mut sink) = start(config);
    let r = push(&mut svc, &mut host, &mut sink, 0, [remote("Watch TV", json!([])), selector("Watch TV")]);

    assert!(!r.group_visible(ButtonGroup::Colors));
    assert!(r.button("red").unwrap().visible, "button flag tracks hub variant only");
    assert!(!r.button_shown("red"));
    assert!(r.button_shown("up"));
    assert!(!r.button_shown("guide"), "X1S hides second-generation keys");
    for group in ButtonGroup::ALL {
        if group != ButtonGroup::Colors {
            assert!(r.group_visible(group), "{group:?} should default visible");
        }
    }
    assert!(svc.handle_command(press("red"), 10, &mut host, &mut sink).is_none());
    assert_eq!(skipped(&sink, SkipReason::Hidden), 1);
    assert!(host.calls.is_empty());
}

// ── Capabilities ──────────────────────────────────────────────

#[test]
fn capability_list_gates_buttons() {
    let (mut svc, mut host, mut sink) = start_default();
    let r = push(
        &mut svc,
        &mut host,
        &mut sink,
        0,
        [remote("Watch TV", json!([{ "command_id": 0xB6 }])), selector("Watch TV")],
    );
    assert!(r.button("vol_up").unwrap().enabled);
    assert!(!r.button("ok").unwrap().enabled);

    assert!(svc.handle_command(press("ok"), 10, &mut host, &mut sink).is_none());
    assert_eq!(skipped(&sink, SkipReason::Disabled), 1);

    assert!(svc.handle_command(press("vol_up"), 20, &mut host, &mut sink).is_some());
    assert_eq!(host.calls, vec![send(0xB6, 101)]);
}

#[test]
fn malformed_capability_list_fails_open_and_reports_once() {
    let (mut svc, mut host, mut sink) = start_default();
    for now in [0, 100] {
        let r = push(
            &mut svc,
            &mut host,
            &mut sink,
            now,
            [remote("Watch TV", json!(["junk", null, {"name": "x"}])), selector("Watch TV")],
        );
        assert!(r.buttons.iter().all(|b| b.enabled));
    }
    assert_eq!(
        sink.count(|e| matches!(e, CardEvent::CapabilitiesMalformed { raw_entries: 3 })),
        1
    );
}

#[test]
fn command_routes_to_recorded_owner() {
    let (mut svc, mut host, mut sink) = start_default();
    push(
        &mut svc,
        &mut host,
        &mut sink,
        0,
        [
            remote("Watch TV", json!([{ "command_id": 0xB0, "device_id": 7 }, 0xAE])),
            selector("Watch TV"),
        ],
    );
    svc.handle_command(press("ok"), 10, &mut host, &mut sink);
    svc.handle_command(press("up"), 20, &mut host, &mut sink);
    assert_eq!(host.calls, vec![send(0xB0, 7), send(0xAE, 101)]);
}

#[test]
fn no_route_sends_nothing() {
    let (mut svc, mut host, mut sink) = start_default();
    push(
        &mut svc,
        &mut host,
        &mut sink,
        0,
        [
            remote_with("Watch TV", json!([]), json!({ "current_activity_id": null })),
            selector("Watch TV"),
        ],
    );
    assert!(svc.handle_command(press("ok"), 10, &mut host, &mut sink).is_none());
    assert_eq!(skipped(&sink, SkipReason::NoRoute), 1);
    assert!(host.calls.is_empty());
    assert_eq!(svc.next_deadline(), None, "no pulse without a dispatch");
}

#[test]
fn unknown_key_is_skipped() {
    let (mut svc, mut host, mut sink) = start_default();
    push(&mut svc, &mut host, &mut sink, 0, [remote("Watch TV", json!([])), selector("Watch TV")]);
    assert!(svc.handle_command(press("teleport"), 10, &mut host, &mut sink).is_none());
    assert_eq!(skipped(&sink, SkipReason::UnknownKey), 1);
}

// ── Power and hub variant ─────────────────────────────────────

#[test]
fn powered_off_disables_everything() {
    let (mut svc, mut host, mut sink) = start_default();
    let r = push(&mut svc, &mut host, &mut sink, 0, [remote("Powered Off", json!([])), selector("Powered off")]);
    assert!(r.powered_off);
    assert!(r.buttons.iter().all(|b| !b.enabled));
    assert!(svc.handle_command(press("ok"), 10, &mut host, &mut sink).is_none());
    assert!(host.calls.is_empty());
}

#[test]
fn powered_off_falls_back_to_selector_value() {
    let (mut svc, mut host, mut sink) = start_default();
    let r = push(&mut svc, &mut host, &mut sink, 0, [remote("", json!([])), selector("Powered off")]);
    assert!(r.powered_off);
}

#[test]
fn second_generation_buttons_follow_hub_variant() {
    let (mut svc, mut host, mut sink) = start_default();
    let r = push(&mut svc, &mut host, &mut sink, 0, [remote("Watch TV", json!([])), selector("Watch TV")]);
    assert!(!r.button("guide").unwrap().visible);
    assert!(r.button("up").unwrap().visible);
    assert!(svc.handle_command(press("guide"), 10, &mut host, &mut sink).is_none());
    assert_eq!(skipped(&sink, SkipReason::Hidden), 1);

    let r = push(
        &mut svc,
        &mut host,
        &mut sink,
        20,
        [
            remote_with("Watch TV", json!([]), json!({ "hub_version": "x1s-X2-rev3" })),
            selector("Watch TV"),
        ],
    );
    for key in ["guide", "exit", "play", "dvr", "a", "b", "c"] {
        assert!(r.button(key).unwrap().visible, "{key} visible on X2");
    }
    assert!(svc.handle_command(press("guide"), 30, &mut host, &mut sink).is_some());
    assert_eq!(host.calls, vec![send(0x9D, 101)]);
}

// ── Degraded device ───────────────────────────────────────────

#[test]
fn unavailable_device_keeps_last_gating() {
    let (mut svc, mut host, mut sink) = start_default();
    push(
        &mut svc,
        &mut host,
        &mut sink,
        0,
        [remote("Watch TV", json!([0xB6])), selector("Watch TV")],
    );

    let r = push(
        &mut svc,
        &mut host,
        &mut sink,
        100,
        [entity(REMOTE, "unavailable", json!({})), selector("Watch TV")],
    );
    assert!(r.warnings.contains(&Warning::DeviceUnavailable));
    assert!(r.button("vol_up").unwrap().enabled);
    assert!(!r.button("ok").unwrap().enabled);

    let r = push(&mut svc, &mut host, &mut sink, 200, [selector("Watch TV")]);
    assert!(r.warnings.contains(&Warning::DeviceMissing));
    assert!(!r.button("ok").unwrap().enabled);
}

// ── Shortcuts ─────────────────────────────────────────────────

fn remote_with_shortcuts() -> remotecard::attributes::EntityState {
    remote_with(
        "Watch TV",
        json!([]),
        json!({
            "macro_keys": { "101": [{ "id": 9, "name": "Lights" }] },
            "favorite_keys": { "101": [{ "id": 3, "name": "BBC One", "device_id": 4 }] }
        }),
    )
}

#[test]
fn shortcuts_route_by_kind() {
    let (mut svc, mut host, mut sink) = start_default();
    let r = push(&mut svc, &mut host, &mut sink, 0, [remote_with_shortcuts(), selector("Watch TV")]);
    assert_eq!(r.shortcuts.len(), 2);
    assert_eq!(r.shortcuts[0].label, "Lights");

    svc.handle_command(CardCommand::PressShortcut(1), 10, &mut host, &mut sink);
    svc.handle_command(CardCommand::PressShortcut(0), 20, &mut host, &mut sink);
    assert_eq!(host.calls, vec![send(3, 4), send(9, 101)]);

    assert!(svc
        .handle_command(CardCommand::PressShortcut(5), 30, &mut host, &mut sink)
        .is_none());
    assert_eq!(skipped(&sink, SkipReason::UnknownKey), 1);
}

#[test]
fn hidden_shortcut_kind_is_not_sent() {
    let config = CardConfig::from_value(json!({ "entity": REMOTE, "show_favorites": false })).unwrap();
    let (mut svc, mut host, mut sink) = start(config);
    let r = push(&mut svc, &mut host, &mut sink, 0, [remote_with_shortcuts(), selector("Watch TV")]);
    assert!(r.shortcuts[0].visible);
    assert!(!r.shortcuts[1].visible);

    assert!(svc
        .handle_command(CardCommand::PressShortcut(1), 10, &mut host, &mut sink)
        .is_none());
    assert_eq!(skipped(&sink, SkipReason::Hidden), 1);
    assert!(host.calls.is_empty());
}

#[test]
fn rejected_command_still_pulses() {
    let (mut svc, mut host, mut sink) = start_default();
    push(&mut svc, &mut host, &mut sink, 0, [remote("Watch TV", json!([])), selector("Watch TV")]);
    host.reject = Some("busy".into());

    let r = svc.handle_command(press("ok"), 10, &mut host, &mut sink).unwrap();
    assert!(r.loading);
    assert_eq!(sink.count(|e| matches!(e, CardEvent::CommandSent { .. })), 0);
    assert_eq!(sink.count(|e| matches!(e, CardEvent::ServiceCallFailed { .. })), 1);
}
