//! Fuzz target: `enabled_buttons` parser
//!
//! Feeds arbitrary JSON into `CapabilitySet::parse` and verifies:
//! - No panics on any entry shape
//! - A list with no usable entry never disables a button
//! - A usable list enables exactly the ids it names
//!
//! cargo fuzz run fuzz_enabled_buttons

#![no_main]

use libfuzzer_sys::fuzz_target;
use remotecard::capability::CapabilitySet;
use remotecard::catalog::BUTTONS;
use serde_json::Value;

fuzz_target!(|data: &[u8]| {
    let Ok(value) = serde_json::from_slice::<Value>(data) else {
        return;
    };
    let raw = match value {
        Value::Array(items) => items,
        other => vec![other],
    };

    let caps = CapabilitySet::parse(&raw);

    if caps.entries().is_empty() {
        assert_eq!(caps.is_malformed(), !raw.is_empty());
        for button in &BUTTONS {
            assert!(caps.is_enabled(button.numeric_id), "fail-open violated");
        }
        return;
    }

    assert!(!caps.is_malformed());
    for button in &BUTTONS {
        let listed = caps.entries().iter().any(|e| e.command_id == button.numeric_id);
        assert_eq!(caps.is_enabled(button.numeric_id), listed);
        if listed {
            assert!(caps.command_target(button.numeric_id).is_some());
        }
    }
});
