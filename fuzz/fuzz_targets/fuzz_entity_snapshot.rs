//! Fuzz target: entity attribute adapter
//!
//! Treats the input as a remote entity's attribute object and runs it
//! through `AttributeAdapter::device_snapshot`, then gates the result.
//! Host attributes are untrusted; nothing here may panic.
//!
//! cargo fuzz run fuzz_entity_snapshot

#![no_main]

use libfuzzer_sys::fuzz_target;
use remotecard::attributes::{AttributeAdapter, EntityState};
use remotecard::capability::CapabilitySet;
use remotecard::gating::{ButtonGatingEngine, is_powered_off};
use serde_json::Value;

fuzz_target!(|data: &[u8]| {
    let Ok(Value::Object(attributes)) = serde_json::from_slice::<Value>(data) else {
        return;
    };
    let entity = EntityState {
        entity_id: "remote.fuzz".into(),
        state: "on".into(),
        attributes,
    };

    let device = AttributeAdapter::device_snapshot(Some(&entity));
    let caps = CapabilitySet::parse(&device.enabled_buttons_raw);
    let powered_off = is_powered_off(&device.current_activity_label, "");
    let buttons =
        ButtonGatingEngine::evaluate(device.hub_variant.is_second_generation(), powered_off, &caps);
    if powered_off {
        assert!(buttons.iter().all(|b| !b.enabled));
    }

    for shortcut in &device.shortcuts {
        let _ = ButtonGatingEngine::resolve_shortcut_route(shortcut, device.current_activity_id);
    }
});
