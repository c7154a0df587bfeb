//! Confidence formulas.
//!
//! Both formulas produce an unrounded score in `0.0..=100.0`; [`Confidence`]
//! pairs it with the integer percentage shown to users.

use crate::model::ConfidenceFormula;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Confidence {
    pub percent: u8,
    pub score: f64,
}

/// Score the best match under `formula`.
///
/// `runner_up` is only consulted by [`ConfidenceFormula::Ratio`], `scale`
/// only by [`ConfidenceFormula::Exp`] and must already be positive.
pub fn score(formula: ConfidenceFormula, best: f64, runner_up: Option<f64>, scale: f64) -> Confidence {
    match formula {
        ConfidenceFormula::Ratio => {
            let score = ratio_score(best, runner_up);
            Confidence { percent: to_percent(score), score }
        }
        ConfidenceFormula::Exp => {
            let score = exp_score(best, scale);
            let mut percent = to_percent(score);
            // 100 is reserved for an exact hit
            if percent == 100 && best > 0.0 {
                percent = 99;
            }
            Confidence { percent, score }
        }
    }
}

/// `100 * (1 - dmin / (dmin + dsec))`, clamped to `0..=100`.
///
/// A lone reference scores 100. Equal best and runner-up distances score
/// exactly 50, including the zero-zero case.
pub fn ratio_score(dmin: f64, dsec: Option<f64>) -> f64 {
    let Some(dsec) = dsec else {
        return 100.0;
    };
    if dmin == dsec {
        return 50.0;
    }

    let (a, b) = if (dmin + dsec).is_infinite() {
        (dmin * 0.5, dsec * 0.5)
    } else {
        (dmin, dsec)
    };
    let raw = 1.0 - a / (a + b);
    raw.clamp(0.0, 1.0) * 100.0
}

/// `100 * exp(-dmin / scale)`.
pub fn exp_score(dmin: f64, scale: f64) -> f64 {
    ((-dmin / scale).exp() * 100.0).clamp(0.0, 100.0)
}

/// Round half away from zero and clamp into `0..=100`.
pub fn to_percent(score: f64) -> u8 {
    if score.is_nan() {
        return 0;
    }
    score.round().clamp(0.0, 100.0) as u8
}
