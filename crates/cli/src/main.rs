// numbot CLI - closest-reference chat bot for the terminal
// Settings and history live in $NUMBOT_HOME (default: ~/.config/numbot)

mod bot;
mod exit_codes;
mod logging;
mod transcript;

use std::fs::File;
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

use numbot_config::settings::SETTABLE_KEYS;
use numbot_config::theme::Palette;
use numbot_config::{ConfigError, FileStore, Settings, Store};
use numbot_core::VerificationId;
use numbot_engine::{ConfidenceFormula, EvalError, Evaluation, Mode};
use numbot_io::{History, HistoryEntry, HistoryError, DEFAULT_EXPORT_NAME};

use bot::{Bot, Overrides};
use exit_codes::{
    config_exit_code, eval_exit_code, history_exit_code, EXIT_ERROR, EXIT_IO, EXIT_SUCCESS,
};
use transcript::Card;

#[derive(Parser)]
#[command(name = "numbot")]
#[command(about = "Find the closest reference number, with a confidence score")]
#[command(long_version = long_version())]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    /// Directory holding settings.json and history.json
    #[arg(long, global = true, env = "NUMBOT_HOME", value_name = "DIR")]
    home: Option<PathBuf>,

    /// Colorize transcript output
    #[arg(long, global = true, value_enum, default_value_t = ColorChoice::Auto)]
    color: ColorChoice,

    /// Debug logging on stderr (NUMBOT_LOG overrides)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ColorChoice {
    Auto,
    Always,
    Never,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask for the reference closest to a number
    #[command(after_help = "\
Examples:
  numbot ask 2
  numbot ask -30 --mode range
  numbot ask 7 --refs 0,5,10 --mode rank
  numbot ask 3 --conf exp --scale 4 --json")]
    Ask {
        /// The number to look up
        #[arg(allow_hyphen_values = true)]
        value: String,

        /// Comma-separated references for this query only
        #[arg(long, value_name = "LIST", allow_hyphen_values = true)]
        refs: Option<String>,

        /// closest, rank or range
        #[arg(long)]
        mode: Option<Mode>,

        /// Confidence formula: ratio or exp
        #[arg(long)]
        conf: Option<ConfidenceFormula>,

        /// Decay scale for the exp formula
        #[arg(long, allow_negative_numbers = true)]
        scale: Option<f64>,

        /// Print the evaluation as JSON
        #[arg(long)]
        json: bool,

        /// Pause before replying
        #[arg(long)]
        typing: bool,

        /// Don't record this query in history
        #[arg(long)]
        no_history: bool,

        /// Seed for reproducible verification IDs
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Chat: one number per line on stdin (/examples, /clear, /quit)
    Chat {
        /// Pause before each reply
        #[arg(long)]
        typing: bool,

        /// Don't record queries in history
        #[arg(long)]
        no_history: bool,

        /// Seed for reproducible verification IDs
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Run the example queries (2 and -30)
    Examples {
        /// Pause before each reply
        #[arg(long)]
        typing: bool,

        /// Don't record queries in history
        #[arg(long)]
        no_history: bool,

        /// Seed for reproducible verification IDs
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Show or change the reference numbers
    Refs {
        #[command(subcommand)]
        command: Option<RefsCommands>,
    },

    /// Show or change settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Show or toggle the color theme
    Theme {
        #[command(subcommand)]
        command: Option<ThemeCommands>,
    },

    /// Past replies
    History {
        #[command(subcommand)]
        command: Option<HistoryCommands>,
    },
}

#[derive(Subcommand)]
enum RefsCommands {
    /// Print the reference list
    Show,
    /// Replace the reference list (invalid entries are skipped)
    Set {
        #[arg(allow_hyphen_values = true)]
        list: String,
    },
    /// Restore the default references (0,1,20)
    Reset,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print all settings
    Show {
        #[arg(long)]
        json: bool,
    },
    /// Print one setting
    Get { key: String },
    /// Change one setting (refs, mode, conf, scale, theme)
    Set {
        key: String,
        #[arg(allow_hyphen_values = true)]
        value: String,
    },
    /// Print the settings file location
    Path,
}

#[derive(Subcommand)]
enum ThemeCommands {
    /// Switch between dark and light
    Toggle,
}

#[derive(Subcommand)]
enum HistoryCommands {
    /// List replies, newest first
    Show {
        #[arg(long)]
        json: bool,

        /// Show at most N entries
        #[arg(long, short = 'n')]
        limit: Option<usize>,
    },
    /// Forget all replies
    Clear,
    /// Write history as CSV (stdout unless -o is given)
    Export {
        /// Output file; `-` for stdout
        #[arg(long, short = 'o', num_args = 0..=1, default_missing_value = DEFAULT_EXPORT_NAME)]
        output: Option<PathBuf>,
    },
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\nengine:  numbot-engine ", env!("CARGO_PKG_VERSION"),
        "\nbuild:   ", env!("BUILD_PROFILE"),
        "\ntarget:  ", env!("TARGET"),
    )
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let mut store = match cli.home.clone() {
        Some(dir) => FileStore::new(dir),
        None => FileStore::default(),
    };
    tracing::debug!(home = %store.dir().display(), "using store");
    let out = Output::new(cli.color);

    let result = match cli.command {
        None => {
            eprintln!("Usage: numbot <command> [options]");
            eprintln!("       numbot chat    to start chatting");
            eprintln!("       numbot --help  for more information");
            Ok(())
        }
        Some(Commands::Ask { value, refs, mode, conf, scale, json, typing, no_history, seed }) => {
            let overrides = Overrides { refs, mode, conf, scale };
            cmd_ask(&mut store, &out, &value, overrides, json, typing, no_history, seed)
        }
        Some(Commands::Chat { typing, no_history, seed }) => {
            cmd_chat(&mut store, &out, typing, no_history, seed)
        }
        Some(Commands::Examples { typing, no_history, seed }) => {
            cmd_examples(&mut store, &out, typing, no_history, seed)
        }
        Some(Commands::Refs { command }) => cmd_refs(&mut store, command.unwrap_or(RefsCommands::Show)),
        Some(Commands::Config { command }) => cmd_config(&mut store, command),
        Some(Commands::Theme { command }) => cmd_theme(&mut store, command),
        Some(Commands::History { command }) => cmd_history(
            &mut store,
            command.unwrap_or(HistoryCommands::Show { json: false, limit: None }),
        ),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

// ============================================================================
// Errors and output
// ============================================================================

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn general(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_IO, message: msg.into(), hint: None }
    }

    /// Failed query; `raw` is the text the user typed.
    pub fn eval(err: &EvalError, raw: &str) -> Self {
        let code = eval_exit_code(err);
        match err {
            EvalError::ParseFailure(_) => Self {
                code,
                message: format!("couldn't parse \"{}\" as a number", raw.trim()),
                hint: None,
            },
            EvalError::InvalidInput(msg) if msg.starts_with("no reference") => Self {
                code,
                message: msg.clone(),
                hint: Some("set references with `numbot refs set 0,1,20` or pass --refs".to_string()),
            },
            EvalError::InvalidInput(msg) => Self { code, message: msg.clone(), hint: None },
        }
    }

    pub fn config(err: ConfigError) -> Self {
        let hint = match &err {
            ConfigError::UnknownKey(_) => Some(format!("known settings: {}", SETTABLE_KEYS.join(", "))),
            _ => None,
        };
        Self { code: config_exit_code(&err), message: err.to_string(), hint }
    }

    pub fn history(err: HistoryError) -> Self {
        Self { code: history_exit_code(&err), message: err.to_string(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Stdout writer that knows whether to color transcript cards.
struct Output {
    color: ColorChoice,
}

impl Output {
    fn new(color: ColorChoice) -> Self {
        Self { color }
    }

    fn palette(&self, settings: &Settings) -> Option<Palette> {
        let enabled = match self.color {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => io::stdout().is_terminal(),
        };
        enabled.then(|| settings.theme.palette())
    }

    fn cards(&self, cards: &[Card], palette: Option<&Palette>) -> Result<(), CliError> {
        for card in cards {
            show_card(card, palette).map_err(|e| CliError::io(e.to_string()))?;
        }
        Ok(())
    }
}

/// Write one card and flush.
fn show_card(card: &Card, palette: Option<&Palette>) -> io::Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle.write_all(card.render(palette).as_bytes())?;
    handle.flush()
}

fn emit(text: &str) -> Result<(), CliError> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle.write_all(text.as_bytes()).map_err(|e| CliError::io(e.to_string()))?;
    handle.flush().map_err(|e| CliError::io(e.to_string()))
}

fn emit_line(text: &str) -> Result<(), CliError> {
    emit(&format!("{text}\n"))
}

fn emit_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(value).map_err(|e| CliError::general(e.to_string()))?;
    emit_line(&json)
}

// ============================================================================
// ask / chat / examples
// ============================================================================

#[derive(Serialize)]
struct AskOutput<'a> {
    input: &'a str,
    dv: &'a VerificationId,
    #[serde(flatten)]
    eval: &'a Evaluation,
}

#[allow(clippy::too_many_arguments)]
fn cmd_ask(
    store: &mut dyn Store,
    out: &Output,
    value: &str,
    overrides: Overrides,
    json: bool,
    typing: bool,
    no_history: bool,
    seed: Option<u64>,
) -> Result<(), CliError> {
    let mut bot = Bot::new(store)
        .with_overrides(overrides)
        .with_seed(seed)
        .with_history(!no_history)
        .with_typing(typing);

    let answer = bot.answer(value).map_err(|e| CliError::eval(&e, value))?;

    if json {
        return emit_json(&AskOutput { input: value.trim(), dv: &answer.dv, eval: &answer.eval });
    }
    let palette = out.palette(bot.settings());
    out.cards(&[Card::reply(&answer.eval, &answer.dv)], palette.as_ref())
}

fn cmd_chat(
    store: &mut dyn Store,
    out: &Output,
    typing: bool,
    no_history: bool,
    seed: Option<u64>,
) -> Result<(), CliError> {
    let mut bot = Bot::new(store)
        .with_seed(seed)
        .with_history(!no_history)
        .with_typing(typing);
    let palette = out.palette(bot.settings());
    let interactive = io::stdin().is_terminal();

    let intro = Card::note(format!(
        "References: {}. Type a number, /examples, /clear or /quit.",
        bot.settings().refs_display().replace(',', ", ")
    ));
    out.cards(&[intro], palette.as_ref())?;

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        if interactive {
            emit("> ")?;
        }
        let Some(line) = lines.next() else {
            break;
        };
        let line = line.map_err(|e| CliError::io(e.to_string()))?;
        let mut show = |card: &Card| show_card(card, palette.as_ref());
        let shown = match line.trim() {
            "" => continue,
            "/quit" | "/exit" => break,
            "/clear" => {
                if interactive {
                    // ANSI clear screen + home
                    emit("\x1b[2J\x1b[H")?;
                }
                show(&Card::note("Cleared. Try another number."))
            }
            "/examples" => bot.run_examples(&mut show),
            "/help" => show(&Card::note("Type a number, /examples, /clear or /quit.")),
            query => bot.converse(query, &mut show),
        };
        shown.map_err(|e| CliError::io(e.to_string()))?;
    }
    Ok(())
}

fn cmd_examples(
    store: &mut dyn Store,
    out: &Output,
    typing: bool,
    no_history: bool,
    seed: Option<u64>,
) -> Result<(), CliError> {
    let mut bot = Bot::new(store)
        .with_seed(seed)
        .with_history(!no_history)
        .with_typing(typing);
    let palette = out.palette(bot.settings());
    bot.run_examples(&mut |card: &Card| show_card(card, palette.as_ref()))
        .map_err(|e| CliError::io(e.to_string()))
}

// ============================================================================
// refs / config / theme
// ============================================================================

fn cmd_refs(store: &mut dyn Store, command: RefsCommands) -> Result<(), CliError> {
    let mut settings = Settings::load(store);
    match command {
        RefsCommands::Show => emit_line(&settings.refs_display()),
        RefsCommands::Set { list } => {
            settings.set("refs", &list).map_err(CliError::config)?;
            settings.save(store).map_err(CliError::config)?;
            emit_line(&format!("Saved refs: {}", settings.refs_display()))
        }
        RefsCommands::Reset => {
            settings.reset_refs();
            settings.save(store).map_err(CliError::config)?;
            emit_line(&format!("Reset to defaults: {}", settings.refs_display()))
        }
    }
}

fn cmd_config(store: &mut FileStore, command: ConfigCommands) -> Result<(), CliError> {
    let mut settings = Settings::load(store);
    match command {
        ConfigCommands::Show { json: true } => emit_json(&settings),
        ConfigCommands::Show { json: false } => {
            for key in SETTABLE_KEYS {
                let value = settings.get(key).map_err(CliError::config)?;
                emit_line(&format!("{key} = {value}"))?;
            }
            Ok(())
        }
        ConfigCommands::Get { key } => {
            let value = settings.get(&key).map_err(CliError::config)?;
            emit_line(&value)
        }
        ConfigCommands::Set { key, value } => {
            settings.set(&key, &value).map_err(CliError::config)?;
            settings.save(store).map_err(CliError::config)?;
            let shown = settings.get(&key).map_err(CliError::config)?;
            emit_line(&format!("{key} = {shown}"))
        }
        ConfigCommands::Path => {
            let path = store.path_for(numbot_config::settings::SETTINGS_KEY);
            emit_line(&path.display().to_string())
        }
    }
}

fn cmd_theme(store: &mut dyn Store, command: Option<ThemeCommands>) -> Result<(), CliError> {
    let mut settings = Settings::load(store);
    if let Some(ThemeCommands::Toggle) = command {
        settings.toggle_theme();
        settings.save(store).map_err(CliError::config)?;
    }
    emit_line(&settings.theme.to_string())
}

// ============================================================================
// history
// ============================================================================

fn cmd_history(store: &mut dyn Store, command: HistoryCommands) -> Result<(), CliError> {
    match command {
        HistoryCommands::Show { json, limit } => {
            let history = History::load(store);
            let limit = limit.unwrap_or(usize::MAX);
            let entries: Vec<&HistoryEntry> = history.newest_first().take(limit).collect();
            if json {
                return emit_json(&entries);
            }
            if entries.is_empty() {
                eprintln!("no history yet");
                return Ok(());
            }
            let text: String = entries.iter().map(|e| format!("{e}\n")).collect();
            emit(&text)
        }
        HistoryCommands::Clear => {
            let mut history = History::load(store);
            let n = history.len();
            history.clear();
            history.save(store).map_err(CliError::history)?;
            emit_line(&format!("Cleared {n} entries."))
        }
        HistoryCommands::Export { output } => {
            let history = History::load(store);
            match output.as_deref() {
                Some(path) if path != Path::new("-") => export_to_file(&history, path),
                _ => {
                    let stdout = io::stdout();
                    numbot_io::csv::export(&history, stdout.lock()).map_err(CliError::history)?;
                    Ok(())
                }
            }
        }
    }
}

fn export_to_file(history: &History, path: &Path) -> Result<(), CliError> {
    if history.is_empty() {
        return Err(CliError::history(HistoryError::Empty));
    }
    let file = File::create(path)
        .map_err(|e| CliError::io(format!("{}: {}", path.display(), e)))?;
    let rows = numbot_io::csv::export(history, file).map_err(|e| {
        CliError::history(e).with_hint(format!("partial output may remain in {}", path.display()))
    })?;
    eprintln!("exported {} rows to {}", rows, path.display());
    Ok(())
}
