use crate::confidence;
use crate::error::EvalError;
use crate::model::{ConfidenceFormula, Detail, EvalOptions, Evaluation, Mode, RankedRef, Region};

/// Find the reference closest to `query` and score the match.
///
/// References are ranked by absolute distance with a stable sort, so ties
/// resolve to the earliest reference in input order.
pub fn evaluate(query: f64, refs: &[f64], options: &EvalOptions) -> Result<Evaluation, EvalError> {
    if refs.is_empty() {
        return Err(EvalError::InvalidInput("no reference numbers provided".into()));
    }
    if !query.is_finite() {
        return Err(EvalError::InvalidInput(format!("query value {query} is not finite")));
    }
    if let Some(bad) = refs.iter().find(|r| !r.is_finite()) {
        return Err(EvalError::InvalidInput(format!("reference value {bad} is not finite")));
    }

    let keyed = rank_keyed(query, refs);
    let best = keyed[0].1;
    let runner_up = keyed.get(1).map(|&(_, r)| r);

    // The ratio is scale-free, so it takes the sort keys; exp needs the true distance.
    let (dmin, dsec) = match options.formula {
        ConfidenceFormula::Ratio => (keyed[0].0, keyed.get(1).map(|&(key, _)| key)),
        ConfidenceFormula::Exp => (best.distance, runner_up.map(|r| r.distance)),
    };
    let conf = confidence::score(options.formula, dmin, dsec, options.effective_scale());
    let ranked: Vec<RankedRef> = keyed.into_iter().map(|(_, r)| r).collect();

    let detail = match options.mode {
        Mode::Closest => Detail::Closest,
        Mode::Rank => Detail::Rank { ranked },
        Mode::Range => Detail::Range { region: region(refs) },
    };

    Ok(Evaluation {
        query,
        best,
        runner_up,
        confidence: conf.percent,
        score: conf.score,
        detail,
    })
}

/// Every reference paired with its distance to `query`, nearest first, with
/// the key each entry was sorted by.
///
/// Finite inputs can still be more than `f64::MAX` apart. When any distance
/// overflows, every key is the halved distance `|query/2 - value/2|`, which
/// is always finite and preserves order. Reported distances stay unhalved
/// and saturate to infinity.
fn rank_keyed(query: f64, refs: &[f64]) -> Vec<(f64, RankedRef)> {
    let overflow = refs.iter().any(|&value| (query - value).is_infinite());
    let mut ranked: Vec<(f64, RankedRef)> = refs
        .iter()
        .map(|&value| {
            let distance = (query - value).abs();
            let key = if overflow { (query * 0.5 - value * 0.5).abs() } else { distance };
            (key, RankedRef { value, distance })
        })
        .collect();
    ranked.sort_by(|a, b| a.0.total_cmp(&b.0));
    ranked
}

/// Min and max of `refs`, independent of ranking. `refs` must be non-empty.
fn region(refs: &[f64]) -> Region {
    let (min, max) = refs
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &r| (lo.min(r), hi.max(r)));
    Region { min, max }
}
