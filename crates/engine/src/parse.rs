// Text <-> number helpers for user-facing input

use crate::error::EvalError;

/// Parse a single query value. Non-finite values are rejected.
pub fn parse_query(text: &str) -> Result<f64, EvalError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(EvalError::ParseFailure("empty input".into()));
    }
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(EvalError::ParseFailure(format!("couldn't parse \"{trimmed}\" as a number"))),
    }
}

/// Parse a comma-separated reference list.
///
/// Empty and invalid tokens are skipped, so `"0, x, 1,,20"` yields
/// `[0, 1, 20]`. The result may be empty.
pub fn parse_refs(text: &str) -> Vec<f64> {
    text.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .filter_map(|t| t.parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .collect()
}

/// Render a number without a trailing `.0`; negative zero prints as `0`.
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    value.to_string()
}

/// Inverse of [`parse_refs`] for display and storage.
pub fn format_refs(refs: &[f64]) -> String {
    refs.iter().map(|r| format_number(*r)).collect::<Vec<_>>().join(",")
}
