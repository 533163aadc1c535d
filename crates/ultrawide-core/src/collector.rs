//! Event aggregation: one [`Collector`] per test run.

use crate::config::ReporterConfig;
use crate::errors::ReporterError;
use crate::model::{ErrorObject, OutcomeRecord, RunStats, RunSummary};
use crate::report::console::{Console, ConsoleLine};
use crate::report::json::{to_json, write_results};
use crate::source::{OutcomeSource, RunEvent};
use crate::terminate::{ProcessExit, Terminator};
use chrono::Utc;
use std::io::{self, Write};

/// Accumulates outcomes for a single run, prints progress and writes the
/// results file when the run finishes.
///
/// Events are delivered one at a time; a collector is not reused across runs.
pub struct Collector<T = ProcessExit, W = io::Stdout> {
    config: ReporterConfig,
    console: Console<W>,
    terminator: T,
    stats: RunStats,
    passes: Vec<OutcomeRecord>,
    failures: Vec<OutcomeRecord>,
    pending: Vec<OutcomeRecord>,
    summary: Option<RunSummary>,
    exit_code: Option<i32>,
}

impl<T: Terminator, W: Write> Collector<T, W> {
    pub fn new(config: ReporterConfig, terminator: T, out: W) -> Self {
        let console = Console::new(out, config.verbosity);
        Self::with_console(config, terminator, console)
    }

    /// Build around a prepared console. Creates the results directory up
    /// front; failing to do so is reported but not fatal.
    pub fn with_console(config: ReporterConfig, terminator: T, mut console: Console<W>) -> Self {
        if let Err(e) = config.prepare_output_dir() {
            tracing::warn!(error = %e, "results directory unavailable, write will be attempted anyway");
            if let ReporterError::DirectoryCreation { path, source } = &e {
                console.emit(ConsoleLine::DirectoryFailed {
                    path,
                    error: source.to_string(),
                });
            }
        }
        Self {
            config,
            console,
            terminator,
            stats: RunStats::default(),
            passes: Vec::new(),
            failures: Vec::new(),
            pending: Vec::new(),
            summary: None,
            exit_code: None,
        }
    }

    /// Drive a whole run from a source until it finishes.
    ///
    /// Malformed events are skipped. A stream that ends (or breaks) before
    /// `run_finished` still gets its results written.
    pub fn run<S: OutcomeSource + ?Sized>(&mut self, source: &mut S) {
        if self.config.keep_running {
            source.configure_bail(false);
        }
        while !self.is_finished() {
            match source.next_event() {
                Some(Ok(event)) => self.handle(event),
                Some(Err(ReporterError::Io(e))) => {
                    tracing::error!(error = %e, "event stream broke");
                    break;
                }
                Some(Err(e)) => tracing::warn!(error = %e, "skipping malformed event"),
                None => break,
            }
        }
        if !self.is_finished() {
            tracing::warn!("event stream ended before run_finished, finalizing results");
            self.finish();
        }
    }

    /// Apply one lifecycle event.
    pub fn handle(&mut self, event: RunEvent) {
        if self.is_finished() {
            tracing::debug!(?event, "run already finished, ignoring event");
            return;
        }
        self.stats.start.get_or_insert_with(Utc::now);

        match event {
            RunEvent::RunStarted => {}
            RunEvent::SuiteEntered(suite) => {
                if !suite.is_root() {
                    self.stats.suites += 1;
                }
                if !suite.title.is_empty() {
                    self.console.emit(ConsoleLine::Suite {
                        title: &suite.title,
                        depth: suite.depth,
                    });
                }
            }
            RunEvent::TestPassed(test) => {
                self.stats.passes += 1;
                self.console.emit(ConsoleLine::Pass {
                    title: &test.title,
                    depth: test.depth,
                });
                self.passes.push(test.into_record(ErrorObject::new()));
            }
            RunEvent::TestFailed { test, err } => {
                self.stats.failures += 1;
                self.console.emit(ConsoleLine::Fail {
                    title: &test.title,
                    depth: test.depth,
                    message: err.message(),
                });
                self.failures.push(test.into_record(err));
            }
            RunEvent::TestPending(test) => {
                self.stats.pending += 1;
                self.console.emit(ConsoleLine::Pending {
                    title: &test.title,
                    depth: test.depth,
                });
                self.pending.push(test.into_record(ErrorObject::new()));
            }
            RunEvent::TestFinished(_) => self.stats.tests += 1,
            RunEvent::RunFinished => self.finish(),
        }
    }

    fn finish(&mut self) {
        let end = Utc::now();
        let start = *self.stats.start.get_or_insert(end);
        self.stats.end = Some(end);
        self.stats.duration = Some(u64::try_from((end - start).num_milliseconds()).unwrap_or(0));

        let summary = RunSummary {
            stats: self.stats.clone(),
            pending: self.pending.clone(),
            passes: self.passes.clone(),
            failures: self.failures.clone(),
        };

        let path = &self.config.results_file;
        let code = match to_json(&summary) {
            Ok(json) => {
                match write_results(path, &json) {
                    Ok(()) => {
                        tracing::info!(path = %path.display(), tests = summary.total(), "results written");
                        self.console.emit(ConsoleLine::ResultsWritten { path });
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "results not written");
                        let error = match &e {
                            ReporterError::Write { source, .. } => source.to_string(),
                            other => other.to_string(),
                        };
                        self.console.emit(ConsoleLine::WriteFailed { path, error });
                    }
                }
                0
            }
            Err(e) => {
                tracing::error!(error = %e, "results could not be serialized");
                self.console.emit(ConsoleLine::SerializeFailed {
                    error: e.to_string(),
                });
                1
            }
        };

        self.console.emit(ConsoleLine::RunComplete);
        self.console.emit(ConsoleLine::Tally {
            passes: self.stats.passes,
            failures: self.stats.failures,
        });
        self.console.flush();

        self.summary = Some(summary);
        self.exit_code = Some(code);
        self.terminator.terminate(code);
    }

    pub fn is_finished(&self) -> bool {
        self.exit_code.is_some()
    }

    pub fn config(&self) -> &ReporterConfig {
        &self.config
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    pub fn passes(&self) -> &[OutcomeRecord] {
        &self.passes
    }

    pub fn failures(&self) -> &[OutcomeRecord] {
        &self.failures
    }

    pub fn pending(&self) -> &[OutcomeRecord] {
        &self.pending
    }

    /// Summary built at run end.
    pub fn summary(&self) -> Option<&RunSummary> {
        self.summary.as_ref()
    }

    /// Exit code requested at run end.
    pub fn exit_code(&self) -> Option<i32> {
        self.exit_code
    }

    pub fn terminator(&self) -> &T {
        &self.terminator
    }

    pub fn console(&self) -> &Console<W> {
        &self.console
    }
}
