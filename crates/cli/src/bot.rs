// Query handling shared by `ask`, `chat` and `examples`

use std::io::{self, Write};
use std::thread;
use std::time::Duration;

use chrono::Utc;
use rand::Rng;

use numbot_config::{Settings, Store};
use numbot_core::{IdGenerator, RandomIdGenerator, SeededIdGenerator, VerificationId};
use numbot_engine::parse::{parse_query, parse_refs};
use numbot_engine::{evaluate, ConfidenceFormula, EvalError, EvalOptions, Evaluation, Mode};
use numbot_io::history::{self, HistoryEntry};

use crate::transcript::{Card, BOT_NAME};

/// Queries sent by `examples` and `/examples`.
pub const EXAMPLE_QUERIES: [&str; 2] = ["2", "-30"];

/// Per-invocation overrides of the persisted settings.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub refs: Option<String>,
    pub mode: Option<Mode>,
    pub conf: Option<ConfidenceFormula>,
    pub scale: Option<f64>,
}

/// A successful reply.
#[derive(Debug, Clone)]
pub struct Answer {
    pub eval: Evaluation,
    pub dv: VerificationId,
}

pub struct Bot<'a> {
    store: &'a mut dyn Store,
    settings: Settings,
    overrides: Overrides,
    ids: Box<dyn IdGenerator>,
    record_history: bool,
    typing: bool,
}

impl<'a> Bot<'a> {
    pub fn new(store: &'a mut dyn Store) -> Self {
        let settings = Settings::load(store);
        Self {
            store,
            settings,
            overrides: Overrides::default(),
            ids: Box::new(RandomIdGenerator),
            record_history: true,
            typing: false,
        }
    }

    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        self.overrides = overrides;
        self
    }

    /// Deterministic verification IDs.
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        if let Some(seed) = seed {
            self.ids = Box::new(SeededIdGenerator::new(seed));
        }
        self
    }

    pub fn with_history(mut self, record: bool) -> Self {
        self.record_history = record;
        self
    }

    /// Pause 600-1000 ms before each reply, like a person typing.
    pub fn with_typing(mut self, typing: bool) -> Self {
        self.typing = typing;
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn refs(&self) -> Vec<f64> {
        match &self.overrides.refs {
            Some(text) => parse_refs(text),
            None => self.settings.refs.clone(),
        }
    }

    pub fn options(&self) -> EvalOptions {
        let mut opts = self.settings.eval_options();
        if let Some(mode) = self.overrides.mode {
            opts.mode = mode;
        }
        if let Some(conf) = self.overrides.conf {
            opts.formula = conf;
        }
        if let Some(scale) = self.overrides.scale {
            opts.scale = Some(scale);
        }
        opts
    }

    /// Parse `raw`, evaluate it, and record the reply in history.
    ///
    /// A history write failure is logged; it never turns a good answer into
    /// an error.
    pub fn answer(&mut self, raw: &str) -> Result<Answer, EvalError> {
        self.pause();

        let query = parse_query(raw)?;
        let refs = self.refs();
        let options = self.options();
        tracing::debug!(query, refs = refs.len(), mode = %options.mode, formula = %options.formula, "evaluating");

        let eval = evaluate(query, &refs, &options)?;
        let dv = self.ids.next_id();

        if self.record_history {
            let entry = HistoryEntry::from_evaluation(&eval, dv.clone(), Utc::now());
            if let Err(e) = history::record(self.store, entry) {
                tracing::warn!("could not record history: {e}");
            }
        }

        Ok(Answer { eval, dv })
    }

    /// Reply card for `raw`: the answer, or an error card.
    pub fn reply(&mut self, raw: &str) -> Card {
        match self.answer(raw) {
            Ok(answer) => Card::reply(&answer.eval, &answer.dv),
            Err(e) => Card::eval_error(&e, raw.trim()),
        }
    }

    /// Hand the user's card to `show`, then the reply card. The typing pause
    /// falls between the two.
    pub fn converse(&mut self, raw: &str, show: &mut dyn FnMut(&Card) -> io::Result<()>) -> io::Result<()> {
        show(&Card::user(raw.trim()))?;
        let reply = self.reply(raw);
        show(&reply)
    }

    pub fn run_examples(&mut self, show: &mut dyn FnMut(&Card) -> io::Result<()>) -> io::Result<()> {
        for query in EXAMPLE_QUERIES {
            self.converse(query, show)?;
        }
        Ok(())
    }

    fn pause(&self) {
        if !self.typing {
            return;
        }
        let ms = 600 + rand::thread_rng().gen_range(0..400);
        eprint!("{BOT_NAME} is typing…");
        let _ = io::stderr().flush();
        thread::sleep(Duration::from_millis(ms));
        eprintln!();
    }
}
