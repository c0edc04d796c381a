//! User-facing status output
//!
//! Everything the pipeline and the sinks tell the user goes through a
//! [`Reporter`] handed in by the caller. The terminal implementation colors
//! its output; [`MemoryReporter`] keeps messages for inspection in tests.

use colored::Colorize;
use std::io::{self, Write};

/// Severity of a reported message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Success,
    Warn,
    Error,
    /// Pre-rendered block such as a table
    Block,
}

/// Destination for user-facing messages
pub trait Reporter {
    fn report(&mut self, level: Level, message: &str);

    fn info(&mut self, message: &str) {
        self.report(Level::Info, message);
    }

    fn success(&mut self, message: &str) {
        self.report(Level::Success, message);
    }

    fn warn(&mut self, message: &str) {
        self.report(Level::Warn, message);
    }

    fn error(&mut self, message: &str) {
        self.report(Level::Error, message);
    }

    /// Writes a multi-line block verbatim
    fn emit(&mut self, block: &str) {
        self.report(Level::Block, block);
    }
}

/// Writes to stdout, errors to stderr
#[derive(Debug)]
pub struct TerminalReporter {
    color: bool,
}

impl Default for TerminalReporter {
    fn default() -> Self {
        Self::new(true)
    }
}

impl TerminalReporter {
    /// With `color` set, `colored` still decides from the terminal and
    /// `NO_COLOR`; unset always prints plain text.
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn styled(&self, level: Level, message: &str) -> String {
        if !self.color {
            return message.to_string();
        }
        match level {
            Level::Info => message.cyan().bold().to_string(),
            Level::Success => message.green().bold().to_string(),
            Level::Warn => message.yellow().bold().to_string(),
            Level::Error => message.red().bold().to_string(),
            Level::Block => message.to_string(),
        }
    }
}

impl Reporter for TerminalReporter {
    fn report(&mut self, level: Level, message: &str) {
        let line = self.styled(level, message);
        // A closed pipe on stdout/stderr is not worth aborting over.
        let _ = match level {
            Level::Error => writeln!(io::stderr().lock(), "{}", line),
            _ => writeln!(io::stdout().lock(), "{}", line),
        };
    }
}

/// Collects messages in memory
#[derive(Debug, Default, Clone)]
pub struct MemoryReporter {
    messages: Vec<(Level, String)>,
}

impl MemoryReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[(Level, String)] {
        &self.messages
    }

    /// Messages at one level, in order
    pub fn at(&self, level: Level) -> Vec<&str> {
        self.messages
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.as_str())
            .collect()
    }

    pub fn errors(&self) -> Vec<&str> {
        self.at(Level::Error)
    }

    /// True if any message contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.messages.iter().any(|(_, m)| m.contains(needle))
    }
}

impl Reporter for MemoryReporter {
    fn report(&mut self, level: Level, message: &str) {
        self.messages.push((level, message.to_string()));
    }
}
