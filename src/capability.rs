//! Enabled-buttons parser.
//!
//! The hub publishes which command ids are currently usable as a list of
//! heterogeneous entries: bare ids, or records carrying the id and an
//! optional owning activity/device under one of several field names.
//! This module normalises that into [`CapabilityEntry`]s and answers
//! "may this button be pressed?" with a **fail-open** policy:
//!
//! | Raw list            | Parsed list | `is_enabled(x)`              |
//! |---------------------|-------------|------------------------------|
//! | empty               | empty       | `true` (no data)             |
//! | non-empty           | empty       | `true` (malformed payload)   |
//! | non-empty           | non-empty   | `true` iff some entry has `x`|

use serde::Serialize;
use serde_json::Value;

use crate::attributes::integer;

/// Field names tried, in order, for a record's command id.
pub const COMMAND_ID_FIELDS: [&str; 6] =
    ["command_id", "command", "button_id", "button", "id", "code"];

/// Field names tried, in order, for a record's owning activity/device id.
pub const TARGET_ID_FIELDS: [&str; 5] =
    ["activity_id", "device_id", "activity", "device", "target"];

/// One normalised capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CapabilityEntry {
    pub command_id: i64,
    pub target_activity_id: Option<i64>,
}

/// Outcome of parsing a single raw entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedEntry {
    Parsed(CapabilityEntry),
    Invalid,
}

impl ParsedEntry {
    /// Parse one raw entry.  Records use the first *populated* field of
    /// each alias list; scalars are the command id itself.
    pub fn parse(raw: &Value) -> Self {
        let parsed = match raw {
            Value::Object(record) => first_populated(record, &COMMAND_ID_FIELDS)
                .and_then(integer)
                .map(|command_id| CapabilityEntry {
                    command_id,
                    target_activity_id: first_populated(record, &TARGET_ID_FIELDS)
                        .and_then(integer),
                }),
            Value::Number(_) | Value::String(_) => integer(raw).map(|command_id| CapabilityEntry {
                command_id,
                target_activity_id: None,
            }),
            Value::Null | Value::Bool(_) | Value::Array(_) => None,
        };
        parsed.map_or(Self::Invalid, Self::Parsed)
    }
}

fn first_populated<'a>(
    record: &'a serde_json::Map<String, Value>,
    fields: &[&str],
) -> Option<&'a Value> {
    fields.iter().find_map(|f| {
        record.get(*f).filter(|v| match v {
            Value::Null => false,
            Value::String(s) => !s.trim().is_empty(),
            _ => true,
        })
    })
}

/// The canonical capability list for one tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilitySet {
    entries: Vec<CapabilityEntry>,
    malformed: bool,
}

impl CapabilitySet {
    /// Normalise a raw `enabled_buttons` list, discarding invalid entries.
    pub fn parse(raw: &[Value]) -> Self {
        let entries: Vec<CapabilityEntry> = raw
            .iter()
            .filter_map(|r| match ParsedEntry::parse(r) {
                ParsedEntry::Parsed(entry) => Some(entry),
                ParsedEntry::Invalid => None,
            })
            .collect();
        let malformed = !raw.is_empty() && entries.is_empty();
        Self { entries, malformed }
    }

    pub fn entries(&self) -> &[CapabilityEntry] {
        &self.entries
    }

    /// Non-empty raw list that yielded nothing usable.
    pub fn is_malformed(&self) -> bool {
        self.malformed
    }

    /// Whether command `id` may be used.  Fails open on malformed or absent data.
    pub fn is_enabled(&self, id: i64) -> bool {
        if self.malformed || self.entries.is_empty() {
            return true;
        }
        self.entries.iter().any(|e| e.command_id == id)
    }

    /// First entry for command `id`, if any.
    pub fn command_target(&self, id: i64) -> Option<&CapabilityEntry> {
        self.entries.iter().find(|e| e.command_id == id)
    }
}
