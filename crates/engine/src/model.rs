use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EvalError;
use crate::DEFAULT_SCALE;

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// What the evaluator reports alongside the best match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Best reference, distance, confidence.
    #[default]
    Closest,
    /// Every reference, sorted by ascending distance.
    Rank,
    /// Best reference plus the min/max of the reference set.
    Range,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Closest, Mode::Rank, Mode::Range];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Closest => "closest",
            Self::Rank => "rank",
            Self::Range => "range",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "closest" => Ok(Self::Closest),
            "rank" => Ok(Self::Rank),
            "range" => Ok(Self::Range),
            other => Err(EvalError::ParseFailure(format!(
                "unknown mode '{other}' (expected closest, rank or range)"
            ))),
        }
    }
}

/// How the confidence score is derived from distances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceFormula {
    /// Relative: how much closer the best match is than the runner-up.
    #[default]
    Ratio,
    /// Absolute: exponential decay of the best distance over `scale`.
    Exp,
}

impl ConfidenceFormula {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ratio => "ratio",
            Self::Exp => "exp",
        }
    }
}

impl fmt::Display for ConfidenceFormula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfidenceFormula {
    type Err = EvalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ratio" => Ok(Self::Ratio),
            "exp" => Ok(Self::Exp),
            other => Err(EvalError::ParseFailure(format!(
                "unknown confidence formula '{other}' (expected ratio or exp)"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EvalOptions {
    pub mode: Mode,
    pub formula: ConfidenceFormula,
    /// Decay scale for [`ConfidenceFormula::Exp`]. `None` means default.
    pub scale: Option<f64>,
}

impl EvalOptions {
    pub fn new(mode: Mode, formula: ConfidenceFormula) -> Self {
        Self { mode, formula, scale: None }
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = Some(scale);
        self
    }

    /// Scale actually used: falls back to [`DEFAULT_SCALE`] when missing,
    /// non-positive or non-finite.
    pub fn effective_scale(&self) -> f64 {
        match self.scale {
            Some(s) if s.is_finite() && s > 0.0 => s,
            _ => DEFAULT_SCALE,
        }
    }
}

// ---------------------------------------------------------------------------
// Result
// ---------------------------------------------------------------------------

/// A reference value and its absolute distance to the query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankedRef {
    pub value: f64,
    pub distance: f64,
}

/// Bounds of the whole reference set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub min: f64,
    pub max: f64,
}

/// Mode-specific part of an evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum Detail {
    Closest,
    Rank { ranked: Vec<RankedRef> },
    Range { region: Region },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub query: f64,
    pub best: RankedRef,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runner_up: Option<RankedRef>,
    /// Integer confidence in `0..=100`.
    pub confidence: u8,
    /// Unrounded confidence in `0.0..=100.0`.
    pub score: f64,
    #[serde(flatten)]
    pub detail: Detail,
}

impl Evaluation {
    pub fn closest(&self) -> f64 {
        self.best.value
    }

    pub fn distance(&self) -> f64 {
        self.best.distance
    }

    pub fn mode(&self) -> Mode {
        match self.detail {
            Detail::Closest => Mode::Closest,
            Detail::Rank { .. } => Mode::Rank,
            Detail::Range { .. } => Mode::Range,
        }
    }

    pub fn ranked(&self) -> Option<&[RankedRef]> {
        match &self.detail {
            Detail::Rank { ranked } => Some(ranked),
            _ => None,
        }
    }

    pub fn region(&self) -> Option<Region> {
        match self.detail {
            Detail::Range { region } => Some(region),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_parse_is_case_insensitive() {
        assert_eq!("Rank".parse::<Mode>().unwrap(), Mode::Rank);
        assert_eq!(" range ".parse::<Mode>().unwrap(), Mode::Range);
        assert!("nearest".parse::<Mode>().is_err());
    }

    #[test]
    fn formula_round_trips_through_display() {
        for f in [ConfidenceFormula::Ratio, ConfidenceFormula::Exp] {
            assert_eq!(f.to_string().parse::<ConfidenceFormula>().unwrap(), f);
        }
    }

    #[test]
    fn effective_scale_defaults() {
        let opts = EvalOptions::default();
        assert_eq!(opts.effective_scale(), DEFAULT_SCALE);
        assert_eq!(opts.with_scale(0.0).effective_scale(), DEFAULT_SCALE);
        assert_eq!(opts.with_scale(-3.0).effective_scale(), DEFAULT_SCALE);
        assert_eq!(opts.with_scale(f64::NAN).effective_scale(), DEFAULT_SCALE);
        assert_eq!(opts.with_scale(2.5).effective_scale(), 2.5);
    }

    #[test]
    fn detail_serializes_with_mode_tag() {
        let eval = Evaluation {
            query: 10.0,
            best: RankedRef { value: 0.0, distance: 10.0 },
            runner_up: None,
            confidence: 100,
            score: 100.0,
            detail: Detail::Range { region: Region { min: 0.0, max: 20.0 } },
        };
        let json = serde_json::to_value(&eval).unwrap();
        assert_eq!(json["mode"], "range");
        assert_eq!(json["region"]["max"], 20.0);
        assert!(json.get("runner_up").is_none());
    }
}
