// Bot settings
// Persisted under the `settings` key of the active store
// (~/.config/numbot/settings.json by default)

use serde::{Deserialize, Serialize};

use numbot_engine::parse::{format_refs, parse_refs};
use numbot_engine::{ConfidenceFormula, EvalOptions, Mode, DEFAULT_REFS, DEFAULT_SCALE};

use crate::error::ConfigError;
use crate::store::{Store, StoreExt};
use crate::theme::Theme;

pub const SETTINGS_KEY: &str = "settings";

/// Keys accepted by [`Settings::set`].
pub const SETTABLE_KEYS: [&str; 5] = ["refs", "mode", "conf", "scale", "theme"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Reference numbers queries are compared against.
    pub refs: Vec<f64>,

    pub mode: Mode,

    /// Confidence formula.
    pub conf: ConfidenceFormula,

    /// Decay scale for the `exp` formula. Stored as entered; non-positive
    /// values fall back to the default when evaluating.
    pub scale: f64,

    pub theme: Theme,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            refs: DEFAULT_REFS.to_vec(),
            mode: Mode::Closest,
            conf: ConfidenceFormula::Ratio,
            scale: DEFAULT_SCALE,
            theme: Theme::Dark,
        }
    }
}

impl Settings {
    /// Load settings, falling back to defaults.
    ///
    /// A malformed or unreadable document is logged and ignored rather than
    /// failing the caller.
    pub fn load(store: &dyn Store) -> Self {
        match store.load::<Settings>(SETTINGS_KEY) {
            Ok(Some(settings)) => settings,
            Ok(None) => Self::default(),
            Err(e) => {
                log::warn!("{e}; using default settings");
                Self::default()
            }
        }
    }

    pub fn save(&self, store: &mut dyn Store) -> Result<(), ConfigError> {
        store.save(SETTINGS_KEY, self)
    }

    /// Evaluation options derived from these settings.
    pub fn eval_options(&self) -> EvalOptions {
        EvalOptions::new(self.mode, self.conf).with_scale(self.scale)
    }

    /// Replace the reference list; an empty list is rejected.
    pub fn set_refs(&mut self, refs: Vec<f64>) -> Result<(), ConfigError> {
        if refs.is_empty() {
            return Err(ConfigError::EmptyRefs);
        }
        self.refs = refs;
        Ok(())
    }

    pub fn reset_refs(&mut self) {
        self.refs = DEFAULT_REFS.to_vec();
    }

    pub fn refs_display(&self) -> String {
        format_refs(&self.refs)
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        self.theme
    }

    /// Set one setting from text, as typed on the command line.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            reason,
        };

        match key {
            "refs" => self.set_refs(parse_refs(value)),
            "mode" => {
                self.mode = value.parse().map_err(|e: numbot_engine::EvalError| invalid(e.to_string()))?;
                Ok(())
            }
            "conf" => {
                self.conf = value.parse().map_err(|e: numbot_engine::EvalError| invalid(e.to_string()))?;
                Ok(())
            }
            "scale" => {
                let scale: f64 = value
                    .trim()
                    .parse()
                    .map_err(|_| invalid("expected a number".to_string()))?;
                if !scale.is_finite() {
                    return Err(invalid("expected a finite number".to_string()));
                }
                self.scale = scale;
                Ok(())
            }
            "theme" => {
                self.theme = value.parse()?;
                Ok(())
            }
            other => Err(ConfigError::UnknownKey(other.to_string())),
        }
    }

    /// Current value of a setting, formatted for display.
    pub fn get(&self, key: &str) -> Result<String, ConfigError> {
        match key {
            "refs" => Ok(self.refs_display()),
            "mode" => Ok(self.mode.to_string()),
            "conf" => Ok(self.conf.to_string()),
            "scale" => Ok(self.scale.to_string()),
            "theme" => Ok(self.theme.to_string()),
            other => Err(ConfigError::UnknownKey(other.to_string())),
        }
    }
}
