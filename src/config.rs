//! Synchronizer configuration
//!
//! One parameterized component covers both page layouts; the layouts are
//! shipped as presets.

use serde::{Deserialize, Serialize};

use crate::control::Control;

/// Well-known storage keys, class names and ids
pub mod consts {
    /// Storage key of the knob-only layout
    pub const PROMPT_KNOB_KEY: &str = "promptKnobValues";
    /// Storage key of the knobs + model select layout
    pub const PERSISTENT_INPUTS_KEY: &str = "persistentInputsValues";

    /// Class carried by every persisted knob
    pub const KNOB_CLASS: &str = "promptKnob";
    /// Id of the model selection dropdown
    pub const MODEL_SELECT_ID: &str = "promptModelSelect";
    /// Marker class of slider readouts
    pub const SLIDER_OUT_CLASS: &str = "slider-out";
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("selector matches no classes or ids")]
    EmptySelector,
}

/// Union of classes and ids selecting the tracked controls
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlSelector {
    pub classes: Vec<String>,
    pub ids: Vec<String>,
}

impl ControlSelector {
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty() && self.ids.is_empty()
    }

    /// CSS selector list for `querySelectorAll`
    pub fn to_css(&self) -> String {
        self.classes
            .iter()
            .map(|c| format!(".{}", css_escape(c)))
            .chain(self.ids.iter().map(|id| format!("#{}", css_escape(id))))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Whether `control` is selected
    pub fn matches<C: Control>(&self, control: &C) -> bool {
        if self.classes.iter().any(|c| control.has_class(c)) {
            return true;
        }
        let id = control.id();
        !id.is_empty() && self.ids.iter().any(|i| *i == id)
    }
}

/// Escape an identifier for use in a selector, as `CSS.escape` does
pub fn css_escape(ident: &str) -> String {
    let chars: Vec<char> = ident.chars().collect();
    let mut out = String::with_capacity(ident.len());
    for (i, &c) in chars.iter().enumerate() {
        let leading_digit =
            c.is_ascii_digit() && (i == 0 || (i == 1 && chars[0] == '-'));
        match c {
            '\0' => out.push('\u{FFFD}'),
            '\u{1}'..='\u{1F}' | '\u{7F}' => out.push_str(&format!("\\{:x} ", c as u32)),
            _ if leading_digit => out.push_str(&format!("\\{:x} ", c as u32)),
            '-' if chars.len() == 1 => out.push_str("\\-"),
            '-' | '_' => out.push(c),
            _ if c.is_ascii_alphanumeric() || c as u32 >= 0x80 => out.push(c),
            _ => {
                out.push('\\');
                out.push(c);
            }
        }
    }
    out
}

/// Which preceding siblings get the restored value mirrored into them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "class")]
pub enum CompanionPolicy {
    /// Never mirror
    Disabled,
    /// Mirror into any preceding sibling with a value
    Unconditional,
    /// Mirror only into siblings carrying the given class
    RequireClass(String),
}

impl Default for CompanionPolicy {
    fn default() -> Self {
        CompanionPolicy::RequireClass(consts::SLIDER_OUT_CLASS.to_string())
    }
}

impl CompanionPolicy {
    /// Whether `sibling` qualifies as a companion display
    pub fn accepts<C: Control>(&self, sibling: &C) -> bool {
        match self {
            CompanionPolicy::Disabled => false,
            CompanionPolicy::Unconditional => true,
            CompanionPolicy::RequireClass(class) => sibling.has_class(class),
        }
    }
}

/// Full synchronizer configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub storage_key: String,
    pub selector: ControlSelector,
    pub companion: CompanionPolicy,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::persistent_inputs()
    }
}

impl SyncConfig {
    /// Knobs only, unconditional companion mirroring
    pub fn prompt_knobs() -> Self {
        Self {
            storage_key: consts::PROMPT_KNOB_KEY.to_string(),
            selector: ControlSelector {
                classes: vec![consts::KNOB_CLASS.to_string()],
                ids: Vec::new(),
            },
            companion: CompanionPolicy::Unconditional,
        }
    }

    /// Knobs plus the model select, mirroring only into `slider-out` readouts
    pub fn persistent_inputs() -> Self {
        Self {
            storage_key: consts::PERSISTENT_INPUTS_KEY.to_string(),
            selector: ControlSelector {
                classes: vec![consts::KNOB_CLASS.to_string()],
                ids: vec![consts::MODEL_SELECT_ID.to_string()],
            },
            companion: CompanionPolicy::default(),
        }
    }

    /// Look up a preset by name
    pub fn preset(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "prompt-knobs" | "prompt_knobs" => Some(Self::prompt_knobs()),
            "persistent-inputs" | "persistent_inputs" => Some(Self::persistent_inputs()),
            _ => None,
        }
    }

    /// Parse a JSON configuration; missing fields take the default preset's values
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        if config.selector.is_empty() {
            return Err(ConfigError::EmptySelector);
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::MemoryControl;

    #[test]
    fn test_selector_css() {
        assert_eq!(SyncConfig::prompt_knobs().selector.to_css(), ".promptKnob");
        assert_eq!(
            SyncConfig::persistent_inputs().selector.to_css(),
            ".promptKnob, #promptModelSelect"
        );
    }

    #[test]
    fn test_selector_css_escapes_identifiers() {
        let config = SyncConfig::from_json(
            r#"{"selector":{"classes":["promptKnob"],"ids":["1stModel","model.select"]}}"#,
        )
        .unwrap();
        assert_eq!(
            config.selector.to_css(),
            r".promptKnob, #\31 stModel, #model\.select"
        );
    }

    #[test]
    fn test_css_escape_edge_cases() {
        assert_eq!(css_escape("slider-out"), "slider-out");
        assert_eq!(css_escape("-"), r"\-");
        assert_eq!(css_escape("-2x"), r"-\32 x");
        assert_eq!(css_escape("a b#c"), r"a\ b\#c");
        assert_eq!(css_escape("top_p\u{e9}"), "top_p\u{e9}");
        assert_eq!(css_escape("tab\there"), r"tab\9 here");
    }

    #[test]
    fn test_selector_matches() {
        let selector = SyncConfig::persistent_inputs().selector;
        let knob = MemoryControl::input("temperature", "1").with_class("promptKnob");
        let model = MemoryControl::input("promptModelSelect", "davinci");
        let other = MemoryControl::input("textbox", "hello");

        assert!(selector.matches(&knob));
        assert!(selector.matches(&model));
        assert!(!selector.matches(&other));
        assert!(!SyncConfig::prompt_knobs().selector.matches(&model));
    }

    #[test]
    fn test_companion_policies() {
        let marked = MemoryControl::display("1").with_class("slider-out");
        let unmarked = MemoryControl::display("1");

        assert!(CompanionPolicy::Unconditional.accepts(&unmarked));
        assert!(CompanionPolicy::default().accepts(&marked));
        assert!(!CompanionPolicy::default().accepts(&unmarked));
        assert!(!CompanionPolicy::Disabled.accepts(&marked));
        assert!(CompanionPolicy::RequireClass("readout".into())
            .accepts(&MemoryControl::display("1").with_class("readout")));
    }

    #[test]
    fn test_preset_lookup() {
        assert_eq!(SyncConfig::preset("prompt-knobs"), Some(SyncConfig::prompt_knobs()));
        assert_eq!(
            SyncConfig::preset("Persistent_Inputs"),
            Some(SyncConfig::persistent_inputs())
        );
        assert_eq!(SyncConfig::preset("nope"), None);
    }

    #[test]
    fn test_from_json_defaults_missing_fields() {
        let config = SyncConfig::from_json(r#"{"storage_key": "myKnobs"}"#).unwrap();
        assert_eq!(config.storage_key, "myKnobs");
        assert_eq!(config.selector, SyncConfig::persistent_inputs().selector);
        assert_eq!(
            config.companion,
            CompanionPolicy::RequireClass("slider-out".into())
        );
    }

    #[test]
    fn test_from_json_companion_forms() {
        let config = SyncConfig::from_json(
            r#"{"companion": {"kind": "require_class", "class": "readout"}}"#,
        )
        .unwrap();
        assert_eq!(config.companion, CompanionPolicy::RequireClass("readout".into()));

        let config = SyncConfig::from_json(r#"{"companion": {"kind": "unconditional"}}"#).unwrap();
        assert_eq!(config.companion, CompanionPolicy::Unconditional);
    }

    #[test]
    fn test_from_json_rejects_bad_input() {
        assert!(matches!(
            SyncConfig::from_json("{oops"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            SyncConfig::from_json(r#"{"selector": {"classes": [], "ids": []}}"#),
            Err(ConfigError::EmptySelector)
        ));
    }
}
