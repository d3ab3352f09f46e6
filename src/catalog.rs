//! Static button catalog.
//!
//! One row per physical button the card can draw.  Numeric ids are the
//! hub's own key codes; rows flagged `is_hub_variant_restricted` exist only
//! on second-generation hubs.
//!
//! | Group  | Buttons                                   |
//! |--------|-------------------------------------------|
//! | Dpad   | up, down, left, right, ok                 |
//! | Nav    | back, home, menu, guide*, exit*           |
//! | Mid    | vol_up, vol_down, mute, ch_up, ch_down    |
//! | Media  | rew, play*, pause, fwd, dvr*              |
//! | Colors | red, green, yellow, blue                  |
//! | Abc    | a*, b*, c*                                |
//!
//! `*` = second-generation only.

use serde::Serialize;

/// Layout group a button belongs to; each maps to one `show_*` option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonGroup {
    Dpad,
    Nav,
    Mid,
    Media,
    Colors,
    Abc,
}

impl ButtonGroup {
    pub const ALL: [ButtonGroup; 6] = [
        Self::Dpad,
        Self::Nav,
        Self::Mid,
        Self::Media,
        Self::Colors,
        Self::Abc,
    ];
}

/// Immutable description of one button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonDescriptor {
    pub key: &'static str,
    pub numeric_id: i64,
    pub is_hub_variant_restricted: bool,
    pub group: ButtonGroup,
}

const fn button(key: &'static str, numeric_id: i64, group: ButtonGroup) -> ButtonDescriptor {
    ButtonDescriptor {
        key,
        numeric_id,
        is_hub_variant_restricted: false,
        group,
    }
}

const fn x2_button(key: &'static str, numeric_id: i64, group: ButtonGroup) -> ButtonDescriptor {
    ButtonDescriptor {
        key,
        numeric_id,
        is_hub_variant_restricted: true,
        group,
    }
}

/// The full button table, in layout order.
pub static BUTTONS: [ButtonDescriptor; 27] = [
    // Dpad
    button("up", 0xAE, ButtonGroup::Dpad),
    button("down", 0xB2, ButtonGroup::Dpad),
    button("left", 0xAF, ButtonGroup::Dpad),
    button("right", 0xB1, ButtonGroup::Dpad),
    button("ok", 0xB0, ButtonGroup::Dpad),
    // Nav
    button("back", 0xB3, ButtonGroup::Nav),
    button("home", 0xB4, ButtonGroup::Nav),
    button("menu", 0xB5, ButtonGroup::Nav),
    x2_button("guide", 0x9D, ButtonGroup::Nav),
    x2_button("exit", 0x9A, ButtonGroup::Nav),
    // Mid
    button("vol_up", 0xB6, ButtonGroup::Mid),
    button("vol_down", 0xB9, ButtonGroup::Mid),
    button("mute", 0xB8, ButtonGroup::Mid),
    button("ch_up", 0xB7, ButtonGroup::Mid),
    button("ch_down", 0xBA, ButtonGroup::Mid),
    // Media
    button("rew", 0xBB, ButtonGroup::Media),
    x2_button("play", 0x9C, ButtonGroup::Media),
    button("pause", 0xBC, ButtonGroup::Media),
    button("fwd", 0xBD, ButtonGroup::Media),
    x2_button("dvr", 0x9B, ButtonGroup::Media),
    // Colors
    button("red", 0xBE, ButtonGroup::Colors),
    button("green", 0xBF, ButtonGroup::Colors),
    button("yellow", 0xC0, ButtonGroup::Colors),
    button("blue", 0xC1, ButtonGroup::Colors),
    // Abc
    x2_button("a", 0x99, ButtonGroup::Abc),
    x2_button("b", 0x98, ButtonGroup::Abc),
    x2_button("c", 0x97, ButtonGroup::Abc),
];

/// Look up a descriptor by key.
pub fn find(key: &str) -> Option<&'static ButtonDescriptor> {
    BUTTONS.iter().find(|b| b.key == key)
}
