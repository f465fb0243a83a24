//! Turning checker findings into user-visible output.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Mutex;

use serde::Serialize;

use crate::types::Position;

/// Sink for findings.
///
/// Called from checker tasks while they run, so reports from different
/// checkers on the same unit may arrive in any order.
pub trait Reporter: Send + Sync {
    /// Reports one finding of `rule` at `position`.
    fn report(&self, rule: &str, position: &Position, message: &str);
}

/// Output format for findings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Format {
    /// `<location>: <rule>: <message>`
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Known root directories abbreviated in locations, with their aliases.
#[derive(Debug, Clone, Default)]
pub struct RootAliases {
    roots: Vec<(String, &'static str)>,
}

impl RootAliases {
    /// Creates an empty alias table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// `$CARGO_HOME` and `$RUSTUP_HOME`, when they can be resolved.
    #[must_use]
    pub fn toolchain() -> Self {
        let mut aliases = Self::new();
        if let Ok(dir) = home::cargo_home() {
            aliases = aliases.with(dir, "$CARGO_HOME");
        }
        if let Ok(dir) = home::rustup_home() {
            aliases = aliases.with(dir, "$RUSTUP_HOME");
        }
        aliases
    }

    /// Adds a root and its alias. Earlier roots are tried first.
    #[must_use]
    pub fn with(mut self, root: impl Into<PathBuf>, alias: &'static str) -> Self {
        let root = root.into().to_string_lossy().into_owned();
        if !root.is_empty() {
            self.roots.push((root, alias));
        }
        self
    }

    /// Replaces the first matching root prefix of `loc` with its alias.
    #[must_use]
    pub fn shorten(&self, loc: &str) -> String {
        for (root, alias) in &self.roots {
            if let Some(rest) = loc.strip_prefix(root.as_str()) {
                return format!("{alias}{rest}");
            }
        }
        loc.to_string()
    }
}

/// Writes findings to stdout.
#[derive(Debug, Default)]
pub struct Printer {
    format: Format,
    colored: bool,
    aliases: Option<RootAliases>,
}

#[derive(Serialize)]
struct JsonLine<'a> {
    location: &'a str,
    rule: &'a str,
    message: &'a str,
}

impl Printer {
    /// Creates a plain-text printer without colors or shortening.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the output format.
    #[must_use]
    pub fn format(mut self, format: Format) -> Self {
        self.format = format;
        self
    }

    /// Enables ANSI colors for text output.
    #[must_use]
    pub fn colored(mut self, colored: bool) -> Self {
        self.colored = colored;
        self
    }

    /// Abbreviates locations under the given roots.
    #[must_use]
    pub fn shorten_with(mut self, aliases: RootAliases) -> Self {
        self.aliases = Some(aliases);
        self
    }

    /// Renders one finding as a single output line.
    #[must_use]
    pub fn render(&self, rule: &str, position: &Position, message: &str) -> String {
        let loc = position.to_string();
        let loc = match &self.aliases {
            Some(aliases) => aliases.shorten(&loc),
            None => loc,
        };

        match self.format {
            Format::Json => serde_json::to_string(&JsonLine {
                location: &loc,
                rule,
                message,
            })
            .unwrap_or_else(|e| format!("{{\"error\":\"{e}\"}}")),
            Format::Text if self.colored => {
                format!("\x1b[1;35m{loc}\x1b[0m: \x1b[31m{rule}\x1b[0m: {message}")
            }
            Format::Text => format!("{loc}: {rule}: {message}"),
        }
    }
}

impl Reporter for Printer {
    fn report(&self, rule: &str, position: &Position, message: &str) {
        let line = self.render(rule, position, message);
        let mut out = std::io::stdout().lock();
        let _ = writeln!(out, "{line}");
    }
}

/// One collected finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    /// Name of the checker.
    pub rule: String,
    /// Resolved location.
    pub position: Position,
    /// Finding text.
    pub message: String,
}

/// Keeps findings in memory.
#[derive(Debug, Default)]
pub struct Collector {
    reports: Mutex<Vec<Report>>,
}

impl Collector {
    /// Creates an empty collector.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns everything reported so far, in arrival order.
    #[must_use]
    pub fn reports(&self) -> Vec<Report> {
        self.reports
            .lock()
            .map(|r| r.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

impl Reporter for Collector {
    fn report(&self, rule: &str, position: &Position, message: &str) {
        let report = Report {
            rule: rule.to_string(),
            position: position.clone(),
            message: message.to_string(),
        };
        match self.reports.lock() {
            Ok(mut reports) => reports.push(report),
            Err(poisoned) => poisoned.into_inner().push(report),
        }
    }
}
