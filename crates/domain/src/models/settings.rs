//! Slider rotation settings.

use serde::{Deserialize, Serialize};
use std::fmt;

pub const DEFAULT_SPEED: u32 = 5000;
pub const DEFAULT_PAUSE_ON_HOVER: bool = true;
pub const DEFAULT_WRAP: bool = true;

/// Keys under which slider settings are persisted in the configuration store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    Speed,
    PauseOnHover,
    Wrap,
}

impl SettingKey {
    pub const ALL: [SettingKey; 3] = [SettingKey::Speed, SettingKey::PauseOnHover, SettingKey::Wrap];

    /// Configuration store key.
    pub fn as_str(&self) -> &'static str {
        match self {
            SettingKey::Speed => "IMAGE_SLIDER_SPEED",
            SettingKey::PauseOnHover => "IMAGE_SLIDER_PAUSE_ON_HOVER",
            SettingKey::Wrap => "IMAGE_SLIDER_WRAP",
        }
    }

    /// Admin form field name.
    pub fn form_field(&self) -> &'static str {
        match self {
            SettingKey::Speed => "SPEED",
            SettingKey::PauseOnHover => "PAUSE_ON_HOVER",
            SettingKey::Wrap => "WRAP",
        }
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Effective rotation behavior of the carousel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SliderSettings {
    /// Milliseconds between slides.
    pub speed: u32,
    pub pause_on_hover: bool,
    pub wrap: bool,
}

impl Default for SliderSettings {
    fn default() -> Self {
        Self {
            speed: DEFAULT_SPEED,
            pause_on_hover: DEFAULT_PAUSE_ON_HOVER,
            wrap: DEFAULT_WRAP,
        }
    }
}

/// Parses a stored flag (`"1"`, `"0"`, any integer) into a bool.
pub fn parse_flag(value: &str) -> Option<bool> {
    value.trim().parse::<i64>().ok().map(|v| v != 0)
}

fn flag_value(flag: bool) -> String {
    if flag { "1" } else { "0" }.to_string()
}

impl SliderSettings {
    /// Builds settings from resolved raw values, falling back to the compiled
    /// default for any missing or unparsable value.
    pub fn from_values(speed: Option<&str>, pause_on_hover: Option<&str>, wrap: Option<&str>) -> Self {
        let defaults = Self::default();
        Self {
            speed: speed
                .and_then(|v| v.trim().parse::<u32>().ok())
                .unwrap_or(defaults.speed),
            pause_on_hover: pause_on_hover
                .and_then(parse_flag)
                .unwrap_or(defaults.pause_on_hover),
            wrap: wrap.and_then(parse_flag).unwrap_or(defaults.wrap),
        }
    }

    /// Stored representation of each setting.
    pub fn value_of(&self, key: SettingKey) -> String {
        match key {
            SettingKey::Speed => self.speed.to_string(),
            SettingKey::PauseOnHover => flag_value(self.pause_on_hover),
            SettingKey::Wrap => flag_value(self.wrap),
        }
    }

    /// Carousel pause mode attribute (`"hover"` or empty).
    pub fn pause_mode(&self) -> &'static str {
        if self.pause_on_hover {
            "hover"
        } else {
            ""
        }
    }

    /// Carousel wrap attribute.
    pub fn wrap_flag(&self) -> &'static str {
        if self.wrap {
            "true"
        } else {
            "false"
        }
    }
}
