use crate::config::Verbosity;
use colored::{ColoredString, Colorize};
use std::io::{self, Write};
use std::path::Path;

/// Width of the rule under a top-level suite heading.
const SUITE_RULE_WIDTH: usize = 81;

/// One thing the console may show.
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleLine<'a> {
    Suite { title: &'a str, depth: usize },
    Pass { title: &'a str, depth: usize },
    Fail { title: &'a str, depth: usize, message: Option<&'a str> },
    Pending { title: &'a str, depth: usize },
    ResultsWritten { path: &'a Path },
    WriteFailed { path: &'a Path, error: String },
    DirectoryFailed { path: &'a Path, error: String },
    SerializeFailed { error: String },
    RunComplete,
    Tally { passes: u64, failures: u64 },
}

impl ConsoleLine<'_> {
    /// Lowest verbosity at which the line is shown.
    fn min_verbosity(&self) -> Verbosity {
        match self {
            Self::Suite { .. } | Self::Pass { .. } | Self::Fail { .. } | Self::Pending { .. } => {
                Verbosity::On
            }
            _ => Verbosity::Result,
        }
    }
}

type Style = fn(&str) -> ColoredString;

fn paint(color: bool, text: String, style: Style) -> String {
    if color {
        style(&text).to_string()
    } else {
        text
    }
}

fn indent(depth: usize) -> String {
    "  ".repeat(depth.max(1))
}

/// Render a line for the given verbosity; `None` when it must stay silent.
/// Deterministic, unit-testable.
#[must_use]
pub fn render_line(line: &ConsoleLine<'_>, verbosity: Verbosity, color: bool) -> Option<String> {
    if verbosity == Verbosity::Silent || verbosity < line.min_verbosity() {
        return None;
    }
    let out = match line {
        ConsoleLine::Suite { title, depth } if *depth <= 1 => {
            let heading = paint(color, format!("TEST SUITE: {title}"), |s| s.bold());
            format!("\n{heading}\n{}", "-".repeat(SUITE_RULE_WIDTH))
        }
        ConsoleLine::Suite { title, depth } => {
            let pad = "  ".repeat(depth - 1);
            format!("{pad}{}", paint(color, format!("» {title}"), |s| s.cyan()))
        }
        ConsoleLine::Pass { title, depth } => {
            format!("{}{}", indent(*depth), paint(color, format!("PASS: {title}"), |s| s.green()))
        }
        ConsoleLine::Fail {
            title,
            depth,
            message,
        } => {
            let head = format!(
                "{}{}",
                indent(*depth),
                paint(color, format!("FAIL: {title}"), |s| s.red())
            );
            match message {
                Some(message) => format!("{head} -- error: {message}"),
                None => head,
            }
        }
        ConsoleLine::Pending { title, depth } => format!(
            "{}{}",
            indent(*depth),
            paint(color, format!("PENDING: {title}"), |s| s.blue())
        ),
        ConsoleLine::ResultsWritten { path } => {
            format!("\nResults written to {}", path.display())
        }
        ConsoleLine::WriteFailed { path, error } => format!(
            "\n{}\nError: {error}",
            paint(
                color,
                format!("Failed to write test output to {}.", path.display()),
                |s| s.red()
            )
        ),
        ConsoleLine::DirectoryFailed { path, error } => format!(
            "{} Error: {error}",
            paint(
                color,
                format!("Failed to create results directory {}.", path.display()),
                |s| s.red()
            )
        ),
        ConsoleLine::SerializeFailed { error } => format!(
            "{}  Error: {error}",
            paint(color, "Failed to convert test results to JSON.".to_string(), |s| s.red())
        ),
        ConsoleLine::RunComplete => "\nTest run complete.".to_string(),
        ConsoleLine::Tally { passes, failures } => format!(
            "\n{}",
            paint(
                color,
                format!("FINAL SCORE: Passing: {passes}  Failing: {failures}"),
                |s| s.blue()
            )
        ),
    };
    Some(out)
}

/// Verbosity-gated line writer.
pub struct Console<W> {
    out: W,
    verbosity: Verbosity,
    color: bool,
}

impl Console<io::Stdout> {
    pub fn stdout(verbosity: Verbosity) -> Self {
        Self::new(io::stdout(), verbosity)
    }
}

impl<W: Write> Console<W> {
    pub fn new(out: W, verbosity: Verbosity) -> Self {
        Self {
            out,
            verbosity,
            color: true,
        }
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    /// Write a line if the verbosity allows it. Console failures are logged
    /// and never interrupt the run.
    pub fn emit(&mut self, line: ConsoleLine<'_>) {
        let Some(text) = render_line(&line, self.verbosity, self.color) else {
            return;
        };
        if let Err(e) = writeln!(self.out, "{text}") {
            tracing::debug!(error = %e, "console write failed");
        }
    }

    pub fn flush(&mut self) {
        if let Err(e) = self.out.flush() {
            tracing::debug!(error = %e, "console flush failed");
        }
    }

    pub fn get_ref(&self) -> &W {
        &self.out
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
