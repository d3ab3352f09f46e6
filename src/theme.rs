//! Theme applier.
//!
//! Diffs the card's custom properties across renders.  Work only happens
//! when the `(theme, override, dark_mode)` key changes; re-applying the same
//! key performs zero style mutations.
//!
//! Background precedence:
//!
//! | Source                                   | Wins over |
//! |------------------------------------------|-----------|
//! | `background_override` from the config    | all       |
//! | theme `ha-card-background`               | below     |
//! | theme `card-background-color`            | none      |

use std::collections::{BTreeMap, BTreeSet};

use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::app::ports::{StylePort, ThemePort};

/// Theme variables checked, in order, for a background colour.
pub const BACKGROUND_VARS: [&str; 2] = ["ha-card-background", "card-background-color"];

/// Semantic properties the resolved background is forced onto.
const FORCED_BACKGROUND_VARS: [&str; 2] = ["--ha-card-background", "--card-background-color"];

/// Literal properties the resolved background is forced onto.
const FORCED_BACKGROUND_PROPS: [&str; 2] = ["background", "background-color"];

/// Optional light/dark overlays of a theme.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThemeModes {
    #[serde(default)]
    pub light: BTreeMap<String, Value>,
    #[serde(default)]
    pub dark: BTreeMap<String, Value>,
}

/// One named theme as the host's registry stores it: a flat variable map
/// plus optional `modes`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThemeDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modes: Option<ThemeModes>,
    #[serde(flatten)]
    pub vars: BTreeMap<String, Value>,
}

impl ThemeDefinition {
    /// Effective variables for the given mode, mode overlay winning.
    /// Values that are not strings or numbers are dropped.
    pub fn resolve(&self, dark_mode: bool) -> BTreeMap<String, String> {
        let overlay = self
            .modes
            .as_ref()
            .map(|m| if dark_mode { &m.dark } else { &m.light });
        self.vars
            .iter()
            .chain(overlay.into_iter().flatten())
            .filter_map(|(name, value)| css_value(value).map(|v| (name.clone(), v)))
            .collect()
    }
}

fn css_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_owned()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn property_name(var: &str) -> String {
    if var.starts_with("--") {
        var.to_owned()
    } else {
        format!("--{var}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct ThemeKey {
    theme: Option<String>,
    override_color: Option<String>,
    dark_mode: bool,
}

#[derive(Default)]
pub struct ThemeApplier {
    last_key: Option<ThemeKey>,
    applied: BTreeSet<String>,
    background: Option<String>,
}

impl ThemeApplier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Background currently forced onto the card, if any.
    pub fn background(&self) -> Option<&str> {
        self.background.as_deref()
    }

    /// Apply `theme` with an optional explicit background.  Returns the
    /// number of style mutations performed.
    ///
    /// `host` is both the theme registry and the style target.
    pub fn apply(
        &mut self,
        theme: Option<&str>,
        override_color: Option<&str>,
        host: &mut (impl ThemePort + StylePort),
    ) -> usize {
        let key = ThemeKey {
            theme: theme.map(str::to_owned),
            override_color: override_color.map(str::to_owned),
            dark_mode: host.dark_mode(),
        };
        if self.last_key.as_ref() == Some(&key) {
            return 0;
        }

        let mut mutations = 0;
        for name in std::mem::take(&mut self.applied) {
            host.remove_property(&name);
            mutations += 1;
        }

        let vars = match theme {
            Some(id) => match host.theme(id) {
                Some(def) => def.resolve(key.dark_mode),
                None => {
                    warn!("theme '{}' not found; using host defaults", id);
                    BTreeMap::new()
                }
            },
            None => BTreeMap::new(),
        };

        for (name, value) in &vars {
            let prop = property_name(name);
            host.set_property(&prop, value);
            self.applied.insert(prop);
            mutations += 1;
        }

        let background = override_color
            .map(str::to_owned)
            .or_else(|| BACKGROUND_VARS.iter().find_map(|v| vars.get(*v).cloned()));

        match &background {
            Some(bg) => {
                for prop in FORCED_BACKGROUND_VARS {
                    host.set_property(prop, bg);
                    self.applied.insert(prop.to_owned());
                    mutations += 1;
                }
                for prop in FORCED_BACKGROUND_PROPS {
                    host.set_property(prop, bg);
                    mutations += 1;
                }
            }
            None => {
                for prop in FORCED_BACKGROUND_PROPS {
                    host.remove_property(prop);
                    mutations += 1;
                }
            }
        }

        info!(
            "theme {:?} applied ({} vars, background {:?}, dark={})",
            theme,
            vars.len(),
            background,
            key.dark_mode
        );
        self.background = background;
        self.last_key = Some(key);
        mutations
    }
}
