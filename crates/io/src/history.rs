use std::collections::VecDeque;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use numbot_config::{Store, StoreExt};
use numbot_core::VerificationId;
use numbot_engine::parse::format_number;
use numbot_engine::{Evaluation, Mode};

use crate::error::HistoryError;

pub const HISTORY_KEY: &str = "history";

/// Oldest entries are dropped past this many.
pub const HISTORY_LIMIT: usize = 200;

/// Output column value for rank-mode replies.
pub const RANKED_OUTPUT: &str = "ranked";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub input: f64,
    /// Closest reference as text, or `ranked` for rank-mode replies.
    pub output: String,
    pub confidence: u8,
    pub dv: VerificationId,
    pub time: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn from_evaluation(eval: &Evaluation, dv: VerificationId, time: DateTime<Utc>) -> Self {
        let output = match eval.mode() {
            Mode::Rank => RANKED_OUTPUT.to_string(),
            Mode::Closest | Mode::Range => format_number(eval.closest()),
        };
        Self {
            input: eval.query,
            output,
            confidence: eval.confidence,
            dv,
            time,
        }
    }
}

impl fmt::Display for HistoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} → {} ({}%)", format_number(self.input), self.output, self.confidence)
    }
}

/// Chronological log of replies, bounded at [`HISTORY_LIMIT`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct History {
    entries: VecDeque<HistoryEntry>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from `store`. A corrupt log is logged and treated as empty.
    pub fn load(store: &dyn Store) -> Self {
        match store.load::<Vec<HistoryEntry>>(HISTORY_KEY) {
            Ok(Some(entries)) => {
                let mut history = Self { entries: entries.into() };
                history.truncate();
                history
            }
            Ok(None) => Self::new(),
            Err(e) => {
                log::warn!("{e}; starting with empty history");
                Self::new()
            }
        }
    }

    pub fn save(&self, store: &mut dyn Store) -> Result<(), HistoryError> {
        let entries: Vec<&HistoryEntry> = self.entries.iter().collect();
        store.save(HISTORY_KEY, &entries)?;
        Ok(())
    }

    /// Append, evicting the oldest entry once the log is over the limit.
    pub fn push(&mut self, entry: HistoryEntry) {
        self.entries.push_back(entry);
        self.truncate();
    }

    fn truncate(&mut self) {
        while self.entries.len() > HISTORY_LIMIT {
            self.entries.pop_front();
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Oldest first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn newest_first(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter().rev()
    }
}

/// Load, append one entry, save.
pub fn record(store: &mut dyn Store, entry: HistoryEntry) -> Result<(), HistoryError> {
    let mut history = History::load(store);
    history.push(entry);
    history.save(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use numbot_config::MemoryStore;
    use numbot_engine::{evaluate, ConfidenceFormula, EvalOptions, DEFAULT_REFS};

    fn entry(input: f64) -> HistoryEntry {
        HistoryEntry {
            input,
            output: "1".into(),
            confidence: 67,
            dv: "1234-LP-5678".parse().unwrap(),
            time: Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap(),
        }
    }

    #[test]
    fn entry_from_closest_evaluation() {
        let opts = EvalOptions::new(Mode::Closest, ConfidenceFormula::Ratio);
        let eval = evaluate(2.0, &DEFAULT_REFS, &opts).unwrap();
        let e = HistoryEntry::from_evaluation(&eval, "0000-KK-0000".parse().unwrap(), Utc::now());
        assert_eq!(e.output, "1");
        assert_eq!(e.confidence, 67);
        assert_eq!(e.to_string(), "2 → 1 (67%)");
    }

    #[test]
    fn entry_from_rank_evaluation_says_ranked() {
        let opts = EvalOptions::new(Mode::Rank, ConfidenceFormula::Ratio);
        let eval = evaluate(-30.0, &DEFAULT_REFS, &opts).unwrap();
        let e = HistoryEntry::from_evaluation(&eval, "0000-KK-0000".parse().unwrap(), Utc::now());
        assert_eq!(e.output, "ranked");
        assert_eq!(e.to_string(), "-30 → ranked (51%)");
    }

    #[test]
    fn push_evicts_oldest_past_limit() {
        let mut h = History::new();
        for i in 0..(HISTORY_LIMIT + 5) {
            h.push(entry(i as f64));
        }
        assert_eq!(h.len(), HISTORY_LIMIT);
        assert_eq!(h.iter().next().unwrap().input, 5.0);
        assert_eq!(h.newest_first().next().unwrap().input, (HISTORY_LIMIT + 4) as f64);
    }

    #[test]
    fn save_and_load_round_trip() {
        let mut store = MemoryStore::new();
        record(&mut store, entry(1.0)).unwrap();
        record(&mut store, entry(2.0)).unwrap();

        let h = History::load(&store);
        assert_eq!(h.len(), 2);
        let inputs: Vec<f64> = h.iter().map(|e| e.input).collect();
        assert_eq!(inputs, vec![1.0, 2.0]);
    }

    #[test]
    fn oversized_stored_log_is_truncated_on_load() {
        let mut store = MemoryStore::new();
        let entries: Vec<HistoryEntry> = (0..250).map(|i| entry(i as f64)).collect();
        store.save(HISTORY_KEY, &entries).unwrap();
        let h = History::load(&store);
        assert_eq!(h.len(), HISTORY_LIMIT);
        assert_eq!(h.iter().next().unwrap().input, 50.0);
    }

    #[test]
    fn corrupt_log_loads_empty() {
        let mut store = MemoryStore::new();
        store.set_raw(HISTORY_KEY, "{\"oops\": true}").unwrap();
        assert!(History::load(&store).is_empty());
    }

    #[test]
    fn file_store_writes_history_json() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = numbot_config::FileStore::new(dir.path());
        record(&mut store, entry(3.0)).unwrap();

        let raw = std::fs::read_to_string(dir.path().join("history.json")).unwrap();
        assert!(raw.contains("\"dv\": \"1234-LP-5678\""));
        assert!(raw.contains("2026-01-02T03:04:05Z"));
        assert_eq!(History::load(&store).len(), 1);
    }

    #[test]
    fn clear_empties() {
        let mut h = History::new();
        h.push(entry(1.0));
        h.clear();
        assert!(h.is_empty());
    }
}
