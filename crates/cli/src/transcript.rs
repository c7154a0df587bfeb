// Chat transcript cards and their terminal rendering

use numbot_config::theme::Palette;
use numbot_core::VerificationId;
use numbot_engine::parse::format_number;
use numbot_engine::{EvalError, Evaluation, Mode};

pub const BOT_NAME: &str = "TinyNumberBot";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Bot,
    System,
}

/// One message in the transcript.
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub role: Role,
    pub title: Option<String>,
    pub body: Vec<String>,
    pub tags: Vec<String>,
    pub is_error: bool,
}

impl Card {
    fn new(role: Role) -> Self {
        Self { role, title: None, body: Vec::new(), tags: Vec::new(), is_error: false }
    }

    pub fn user(text: &str) -> Self {
        let mut card = Self::new(Role::User);
        card.body.push(text.to_string());
        card
    }

    pub fn note(text: impl Into<String>) -> Self {
        let mut card = Self::new(Role::System);
        card.body.push(text.into());
        card
    }

    pub fn error(message: impl Into<String>) -> Self {
        let mut card = Self::new(Role::Bot);
        card.title = Some("Error".to_string());
        card.body.push(message.into());
        card.is_error = true;
        card
    }

    /// Error card for a failed query; `raw` is the text the user sent.
    pub fn eval_error(err: &EvalError, raw: &str) -> Self {
        match err {
            EvalError::ParseFailure(_) => Self::error(format!("Couldn't parse \"{raw}\" as a number.")),
            EvalError::InvalidInput(msg) => Self::error(sentence(msg)),
        }
    }

    pub fn reply(eval: &Evaluation, dv: &VerificationId) -> Self {
        let value = format_number(eval.query);
        let closest = format_number(eval.closest());
        let mut card = Self::new(Role::Bot);

        match eval.mode() {
            Mode::Closest => {
                card.title = Some(format!("{value} is closer to {closest}!"));
                card.body.push("Have a nice day ☺️".to_string());
            }
            Mode::Rank => {
                card.title = Some(format!("{value} — Ranked references"));
                for r in eval.ranked().unwrap_or_default() {
                    card.body.push(format!("{} (dist {})", format_number(r.value), format_number(r.distance)));
                }
            }
            Mode::Range => {
                card.title = Some(format!("{value} is closest to {closest}"));
                card.body.push(format!("Closest distance: {}", format_number(eval.distance())));
                if let Some(region) = eval.region() {
                    card.tags.push(format!(
                        "Region: {} → {}",
                        format_number(region.min),
                        format_number(region.max)
                    ));
                }
            }
        }

        card.tags.push(format!("Confidence: {}%", eval.confidence));
        card.tags.push(format!("Data Verified: {dv}"));
        card
    }

    /// Render as terminal text. `palette` enables 24-bit color.
    pub fn render(&self, palette: Option<&Palette>) -> String {
        let paint = |color: Option<String>, text: &str| match color {
            Some(code) => format!("{code}{text}{RESET}"),
            None => text.to_string(),
        };
        let title_color = palette.map(|p| (if self.is_error { p.error } else { p.title }).ansi_fg());
        let body_color = palette.map(|p| p.body.ansi_fg());
        let tag_color = palette.map(|p| p.tag.ansi_fg());
        let muted = palette.map(|p| p.muted.ansi_fg());

        let mut out = String::new();
        match self.role {
            Role::User => {
                out.push_str(&paint(muted.clone(), "You: "));
                out.push_str(&paint(body_color, &self.body.join(" ")));
                out.push('\n');
                return out;
            }
            Role::System => {
                for line in &self.body {
                    out.push_str(&paint(muted.clone(), &format!("-- {line} --")));
                    out.push('\n');
                }
                return out;
            }
            Role::Bot => {}
        }

        out.push_str(&paint(muted.clone(), &format!("{BOT_NAME}: ")));
        if let Some(title) = &self.title {
            out.push_str(&paint(title_color, title));
        }
        out.push('\n');
        for line in &self.body {
            out.push_str("  ");
            out.push_str(&paint(body_color.clone(), line));
            out.push('\n');
        }
        if !self.tags.is_empty() {
            out.push_str("  ");
            out.push_str(&paint(muted, "---"));
            out.push('\n');
            let tags: Vec<String> = self.tags.iter().map(|t| format!("[{t}]")).collect();
            out.push_str("  ");
            out.push_str(&paint(tag_color, &tags.join(" ")));
            out.push('\n');
        }
        out
    }
}

const RESET: &str = "\x1b[0m";

/// Capitalize the first letter and end with a period.
fn sentence(msg: &str) -> String {
    let mut chars = msg.chars();
    let mut out: String = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    };
    if !out.ends_with('.') {
        out.push('.');
    }
    out
}
