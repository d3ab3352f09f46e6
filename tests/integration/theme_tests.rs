//! Theme application through the service pass.

use remotecard::{CardConfig, CardEvent};
use serde_json::json;

use crate::mock_host::*;

fn themed(theme: Option<&str>, background: Option<[u8; 3]>) -> CardConfig {
    CardConfig {
        theme: theme.map(str::to_owned),
        background_override: background,
        ..CardConfig::for_entity(REMOTE)
    }
}

fn host() -> MockHost {
    MockHost::new().with_theme(
        "dark",
        json!({
            "primary-color": "#03a9f4",
            "card-background-color": "#202020",
            "modes": {
                "dark": { "ha-card-background": "#111111" },
                "light": { "ha-card-background": "#eeeeee" }
            }
        }),
    )
}

fn theme_events(sink: &RecordingSink) -> usize {
    sink.count(|e| matches!(e, CardEvent::ThemeApplied { .. }))
}

#[test]
fn repeated_updates_apply_theme_once() {
    let (mut svc, _, mut sink) = start(themed(Some("dark"), None));
    let mut host = host();

    push(&mut svc, &mut host, &mut sink, 0, [remote("Watch TV", json!([])), selector("Watch TV")]);
    let after_first = host.style_mutations;
    assert!(after_first > 0);
    assert_eq!(host.style["--primary-color"], "#03a9f4");
    assert_eq!(host.style["background"], "#eeeeee");

    for now in [100, 200, 300] {
        push(&mut svc, &mut host, &mut sink, now, [remote("Movie", json!([])), selector("Movie")]);
    }
    assert_eq!(host.style_mutations, after_first);
    assert_eq!(theme_events(&sink), 1);
}

#[test]
fn background_override_wins() {
    let (mut svc, _, mut sink) = start(themed(Some("dark"), Some([10, 20, 30])));
    let mut host = host();

    push(&mut svc, &mut host, &mut sink, 0, [remote("Watch TV", json!([])), selector("Watch TV")]);
    for prop in ["background", "background-color", "--ha-card-background", "--card-background-color"] {
        assert_eq!(host.style[prop], "rgb(10, 20, 30)", "{prop}");
    }
}

#[test]
fn override_without_theme() {
    let (mut svc, mut host, mut sink) = start(themed(None, Some([0, 0, 0])));
    push(&mut svc, &mut host, &mut sink, 0, [remote("Watch TV", json!([])), selector("Watch TV")]);
    assert_eq!(host.style["background-color"], "rgb(0, 0, 0)");
}

#[test]
fn dark_mode_flip_reapplies() {
    let (mut svc, _, mut sink) = start(themed(Some("dark"), None));
    let mut host = host();

    push(&mut svc, &mut host, &mut sink, 0, [remote("Watch TV", json!([])), selector("Watch TV")]);
    host.dark = true;
    push(&mut svc, &mut host, &mut sink, 100, [remote("Watch TV", json!([])), selector("Watch TV")]);

    assert_eq!(host.style["background"], "#111111");
    assert_eq!(theme_events(&sink), 2);
}

#[test]
fn unknown_theme_leaves_host_defaults() {
    let (mut svc, mut host, mut sink) = start(themed(Some("missing"), None));
    push(&mut svc, &mut host, &mut sink, 0, [remote("Watch TV", json!([])), selector("Watch TV")]);
    assert!(host.style.is_empty());
}
