// Terminal color themes

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    pub fn palette(self) -> Palette {
        match self {
            Theme::Dark => Palette {
                title: Color::from_hex(0x7dd3fc),
                body: Color::from_hex(0xe5e7eb),
                tag: Color::from_hex(0xa78bfa),
                muted: Color::from_hex(0x9ca3af),
                error: Color::from_hex(0xf87171),
            },
            Theme::Light => Palette {
                title: Color::from_hex(0x0369a1),
                body: Color::from_hex(0x111827),
                tag: Color::from_hex(0x6d28d9),
                muted: Color::from_hex(0x6b7280),
                error: Color::from_hex(0xb91c1c),
            },
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::Dark => f.write_str("dark"),
            Theme::Light => f.write_str("light"),
        }
    }
}

impl FromStr for Theme {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dark" => Ok(Theme::Dark),
            "light" => Ok(Theme::Light),
            other => Err(ConfigError::InvalidValue {
                key: "theme".into(),
                value: other.into(),
                reason: "expected dark or light".into(),
            }),
        }
    }
}

/// Colors used when rendering transcript cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub title: Color,
    pub body: Color,
    pub tag: Color,
    pub muted: Color,
    pub error: Color,
}
