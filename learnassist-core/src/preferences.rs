use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::PreferenceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FontSize {
    Small,
    #[default]
    Medium,
    Large,
    ExtraLarge,
}

impl FontSize {
    pub const ALL: [FontSize; 4] = [
        FontSize::Small,
        FontSize::Medium,
        FontSize::Large,
        FontSize::ExtraLarge,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FontSize::Small => "small",
            FontSize::Medium => "medium",
            FontSize::Large => "large",
            FontSize::ExtraLarge => "extra-large",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FontSize::Small => "Small",
            FontSize::Medium => "Medium",
            FontSize::Large => "Large",
            FontSize::ExtraLarge => "Extra Large",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.as_str() == raw)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Contrast {
    #[default]
    Normal,
    High,
    Inverted,
}

impl Contrast {
    pub const ALL: [Contrast; 3] = [Contrast::Normal, Contrast::High, Contrast::Inverted];

    pub fn as_str(self) -> &'static str {
        match self {
            Contrast::Normal => "normal",
            Contrast::High => "high",
            Contrast::Inverted => "inverted",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Contrast::Normal => "Normal",
            Contrast::High => "High",
            Contrast::Inverted => "Inverted",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.as_str() == raw)
    }
}

/// One independently persisted dimension of [`PreferenceSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PreferenceAxis {
    FontSize,
    Contrast,
    SpeechEnabled,
    DarkMode,
    KeyboardNavHint,
}

impl PreferenceAxis {
    pub const ALL: [PreferenceAxis; 5] = [
        PreferenceAxis::FontSize,
        PreferenceAxis::Contrast,
        PreferenceAxis::SpeechEnabled,
        PreferenceAxis::DarkMode,
        PreferenceAxis::KeyboardNavHint,
    ];

    /// Key under which the axis is stored.
    ///
    /// These are stable; changing one orphans every persisted value for that axis.
    pub fn storage_key(self) -> &'static str {
        match self {
            PreferenceAxis::FontSize => "fontSize",
            PreferenceAxis::Contrast => "contrast",
            PreferenceAxis::SpeechEnabled => "textToSpeech",
            PreferenceAxis::DarkMode => "darkMode",
            PreferenceAxis::KeyboardNavHint => "keyboardNav",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.storage_key() == key)
    }

    /// Human-readable name used in spoken confirmations.
    pub fn label(self) -> &'static str {
        match self {
            PreferenceAxis::FontSize => "Font size",
            PreferenceAxis::Contrast => "Contrast",
            PreferenceAxis::SpeechEnabled => "Text to speech",
            PreferenceAxis::DarkMode => "Dark mode",
            PreferenceAxis::KeyboardNavHint => "Keyboard navigation hints",
        }
    }

    pub fn domain(self) -> Vec<&'static str> {
        match self {
            PreferenceAxis::FontSize => FontSize::ALL.iter().map(|v| v.as_str()).collect(),
            PreferenceAxis::Contrast => Contrast::ALL.iter().map(|v| v.as_str()).collect(),
            _ => vec!["true", "false"],
        }
    }

    /// Validates `raw` against the axis domain.
    pub fn parse_value(self, raw: &str) -> Result<PreferenceValue, PreferenceError> {
        let parsed = match self {
            PreferenceAxis::FontSize => FontSize::parse(raw).map(PreferenceValue::FontSize),
            PreferenceAxis::Contrast => Contrast::parse(raw).map(PreferenceValue::Contrast),
            PreferenceAxis::SpeechEnabled => parse_flag(raw).map(PreferenceValue::SpeechEnabled),
            PreferenceAxis::DarkMode => parse_flag(raw).map(PreferenceValue::DarkMode),
            PreferenceAxis::KeyboardNavHint => {
                parse_flag(raw).map(PreferenceValue::KeyboardNavHint)
            }
        };

        parsed.ok_or_else(|| PreferenceError::InvalidValue {
            axis: self,
            value: raw.to_string(),
            expected: self.domain().join(", "),
        })
    }
}

impl fmt::Display for PreferenceAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.storage_key())
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

/// A validated value for exactly one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PreferenceValue {
    FontSize(FontSize),
    Contrast(Contrast),
    SpeechEnabled(bool),
    DarkMode(bool),
    KeyboardNavHint(bool),
}

impl PreferenceValue {
    pub fn axis(self) -> PreferenceAxis {
        match self {
            PreferenceValue::FontSize(_) => PreferenceAxis::FontSize,
            PreferenceValue::Contrast(_) => PreferenceAxis::Contrast,
            PreferenceValue::SpeechEnabled(_) => PreferenceAxis::SpeechEnabled,
            PreferenceValue::DarkMode(_) => PreferenceAxis::DarkMode,
            PreferenceValue::KeyboardNavHint(_) => PreferenceAxis::KeyboardNavHint,
        }
    }

    /// String encoding used for persistence.
    pub fn encode(self) -> String {
        match self {
            PreferenceValue::FontSize(v) => v.as_str().into(),
            PreferenceValue::Contrast(v) => v.as_str().into(),
            PreferenceValue::SpeechEnabled(v)
            | PreferenceValue::DarkMode(v)
            | PreferenceValue::KeyboardNavHint(v) => v.to_string(),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PreferenceValue::FontSize(v) => v.label(),
            PreferenceValue::Contrast(v) => v.label(),
            PreferenceValue::SpeechEnabled(v)
            | PreferenceValue::DarkMode(v)
            | PreferenceValue::KeyboardNavHint(v) => {
                if v {
                    "On"
                } else {
                    "Off"
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PreferenceSet {
    pub font_size: FontSize,
    pub contrast: Contrast,
    pub speech_enabled: bool,
    pub dark_mode: bool,
    pub keyboard_nav_hint: bool,
}

impl PreferenceSet {
    pub fn value(&self, axis: PreferenceAxis) -> PreferenceValue {
        match axis {
            PreferenceAxis::FontSize => PreferenceValue::FontSize(self.font_size),
            PreferenceAxis::Contrast => PreferenceValue::Contrast(self.contrast),
            PreferenceAxis::SpeechEnabled => PreferenceValue::SpeechEnabled(self.speech_enabled),
            PreferenceAxis::DarkMode => PreferenceValue::DarkMode(self.dark_mode),
            PreferenceAxis::KeyboardNavHint => {
                PreferenceValue::KeyboardNavHint(self.keyboard_nav_hint)
            }
        }
    }

    pub fn apply(&mut self, value: PreferenceValue) {
        match value {
            PreferenceValue::FontSize(v) => self.font_size = v,
            PreferenceValue::Contrast(v) => self.contrast = v,
            PreferenceValue::SpeechEnabled(v) => self.speech_enabled = v,
            PreferenceValue::DarkMode(v) => self.dark_mode = v,
            PreferenceValue::KeyboardNavHint(v) => self.keyboard_nav_hint = v,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_first_run_values() {
        let p = PreferenceSet::default();
        assert_eq!(p.font_size, FontSize::Medium);
        assert_eq!(p.contrast, Contrast::Normal);
        assert!(!p.speech_enabled);
        assert!(!p.dark_mode);
        assert!(!p.keyboard_nav_hint);
    }

    #[test]
    fn rejects_values_outside_the_domain() {
        let err = PreferenceAxis::FontSize.parse_value("huge").unwrap_err();
        match err {
            PreferenceError::InvalidValue { axis, value, expected } => {
                assert_eq!(axis, PreferenceAxis::FontSize);
                assert_eq!(value, "huge");
                assert!(expected.contains("extra-large"));
            }
        }

        assert!(PreferenceAxis::DarkMode.parse_value("yes").is_err());
        assert!(PreferenceAxis::Contrast.parse_value("HIGH").is_err());
    }

    #[test]
    fn parsed_value_applies_to_its_own_axis() {
        let mut p = PreferenceSet::default();
        let v = PreferenceAxis::FontSize.parse_value("extra-large").unwrap();
        p.apply(v);
        assert_eq!(p.font_size, FontSize::ExtraLarge);
        assert_eq!(p.value(PreferenceAxis::FontSize).encode(), "extra-large");

        let v = PreferenceAxis::SpeechEnabled.parse_value("true").unwrap();
        assert_eq!(v.axis(), PreferenceAxis::SpeechEnabled);
        p.apply(v);
        assert!(p.speech_enabled);
        assert_eq!(p.value(PreferenceAxis::SpeechEnabled).encode(), "true");
    }

    #[test]
    fn storage_keys_round_trip() {
        for axis in PreferenceAxis::ALL {
            assert_eq!(PreferenceAxis::from_key(axis.storage_key()), Some(axis));
        }
        assert_eq!(PreferenceAxis::from_key("volume"), None);
    }
}
