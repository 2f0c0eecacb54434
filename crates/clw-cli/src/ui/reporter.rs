//! Terminal-backed [`Reporter`].
//!
//! Everything is written to stderr; stdout belongs to the artifact. Styling
//! and the live progress line are only used when stderr is a terminal, so
//! redirected output stays free of escape codes.

use std::io::{IsTerminal, Write};
use std::sync::{Mutex, PoisonError};

use clw_core::Reporter;
use crossterm::QueueableCommand;
use crossterm::cursor::MoveToColumn;
use crossterm::style::Stylize;
use crossterm::terminal::{Clear, ClearType};

use super::progress::format_progress;

#[derive(Debug, Clone, Copy)]
enum Tone {
    Plain,
    Success,
    Warning,
    Error,
}

#[derive(Debug)]
pub struct TerminalReporter {
    interactive: bool,
    quiet: bool,
    announce_up_to_date: bool,
    /// Text of the progress line currently on screen, if any.
    line: Mutex<Option<String>>,
}

impl Default for TerminalReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalReporter {
    pub fn new() -> Self {
        Self {
            interactive: std::io::stderr().is_terminal(),
            quiet: false,
            announce_up_to_date: false,
            line: Mutex::new(None),
        }
    }

    /// Suppress everything except errors.
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Print a notice when no install was needed. Off for the launcher,
    /// which would otherwise print it on every run.
    pub fn announce_up_to_date(mut self, announce: bool) -> Self {
        self.announce_up_to_date = announce;
        self
    }

    /// Print an error. Shown even when quiet.
    pub fn error(&self, msg: &str) {
        self.emit(Tone::Error, &format!("Error: {msg}"));
    }

    /// Leave the terminal tidy after Ctrl-C.
    pub fn interrupted(&self) {
        self.end_line();
        if !self.quiet {
            self.emit(Tone::Warning, "Interrupted");
        }
    }

    fn emit(&self, tone: Tone, msg: &str) {
        self.end_line();

        if !self.interactive {
            eprintln!("{msg}");
            return;
        }

        match tone {
            Tone::Plain => eprintln!("{msg}"),
            Tone::Success => eprintln!("{}", msg.green()),
            Tone::Warning => eprintln!("{}", msg.yellow()),
            Tone::Error => eprintln!("{}", msg.red().bold()),
        }
    }

    /// Terminate the progress line, if one is showing.
    fn end_line(&self) {
        let mut line = self.line.lock().unwrap_or_else(PoisonError::into_inner);
        if line.take().is_some() {
            eprintln!();
        }
    }
}

fn draw(text: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr().lock();
    stderr.queue(MoveToColumn(0))?;
    write!(stderr, "{text}")?;
    stderr.queue(Clear(ClearType::UntilNewLine))?;
    stderr.flush()
}

impl Reporter for TerminalReporter {
    fn info(&self, msg: &str) {
        if !self.quiet {
            self.emit(Tone::Plain, msg);
        }
    }

    fn success(&self, msg: &str) {
        if !self.quiet {
            self.emit(Tone::Success, msg);
        }
    }

    fn warning(&self, msg: &str) {
        if !self.quiet {
            self.emit(Tone::Warning, msg);
        }
    }

    fn up_to_date(&self, msg: &str) {
        if self.announce_up_to_date && !self.quiet {
            self.emit(Tone::Plain, msg);
        }
    }

    fn downloading(&self, current: u64, total: Option<u64>) {
        if self.quiet || !self.interactive {
            return;
        }

        let text = format_progress(current, total);
        let mut line = self.line.lock().unwrap_or_else(PoisonError::into_inner);
        if line.as_deref() == Some(text.as_str()) {
            return;
        }

        if let Err(e) = draw(&text) {
            tracing::debug!("failed to draw progress: {e}");
        }
        *line = Some(text);
    }

    fn download_finished(&self, total: u64) {
        tracing::debug!(total, "download complete");
        self.end_line();
    }
}
