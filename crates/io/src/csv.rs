// CSV export of the history log

use std::io::Write;

use chrono::SecondsFormat;

use numbot_engine::parse::format_number;

use crate::error::HistoryError;
use crate::history::History;

pub const HEADER: [&str; 5] = ["input", "output", "confidence", "dv", "time"];

/// Write `history` as CSV, oldest first. Returns the number of data rows.
///
/// Times are ISO 8601 UTC with millisecond precision. An empty history is
/// an error so callers don't produce header-only files.
pub fn export<W: Write>(history: &History, writer: W) -> Result<usize, HistoryError> {
    if history.is_empty() {
        return Err(HistoryError::Empty);
    }

    let mut wtr = ::csv::WriterBuilder::new().terminator(::csv::Terminator::Any(b'\n')).from_writer(writer);
    wtr.write_record(HEADER)?;

    let mut rows = 0;
    for entry in history.iter() {
        let input = format_number(entry.input);
        let confidence = entry.confidence.to_string();
        let time = entry.time.to_rfc3339_opts(SecondsFormat::Millis, true);
        wtr.write_record([
            input.as_str(),
            entry.output.as_str(),
            confidence.as_str(),
            entry.dv.as_str(),
            time.as_str(),
        ])?;
        rows += 1;
    }

    wtr.flush().map_err(|e| HistoryError::Csv(e.to_string()))?;
    Ok(rows)
}

/// Export into an in-memory string.
pub fn export_to_string(history: &History) -> Result<String, HistoryError> {
    let mut buf = Vec::new();
    export(history, &mut buf)?;
    String::from_utf8(buf).map_err(|e| HistoryError::Csv(e.to_string()))
}
