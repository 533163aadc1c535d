//! Lifecycle events and the host-runner seam.
//!
//! A host runner feeds [`RunEvent`]s to the collector, either pushed one at a
//! time (`Collector::handle`) or pulled from an [`OutcomeSource`].

use crate::errors::{ReporterError, ReporterResult};
use crate::model::{ErrorObject, OutcomeRecord};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::io::BufRead;

/// Separator between ancestor suite titles in a full title.
pub const FULL_TITLE_DELIMITER: &str = " ";

/// A suite as reported on entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuiteInfo {
    #[serde(default)]
    pub title: String,
    /// 0 for the root suite, 1 for top-level suites, and so on.
    #[serde(default)]
    pub depth: usize,
}

impl SuiteInfo {
    pub fn root() -> Self {
        Self {
            title: String::new(),
            depth: 0,
        }
    }

    pub fn new(title: impl Into<String>, depth: usize) -> Self {
        Self {
            title: title.into(),
            depth,
        }
    }

    pub fn is_root(&self) -> bool {
        self.depth == 0
    }
}

/// A test as reported when it reaches a terminal state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestInfo {
    pub title: String,
    /// Falls back to `title` when the host does not send one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_title: Option<String>,
    /// Milliseconds; hosts may send fractions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<serde_json::Number>,
    #[serde(default)]
    pub current_retry: u32,
    /// Number of enclosing non-root suites.
    #[serde(default)]
    pub depth: usize,
}

impl TestInfo {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            full_title: None,
            duration: None,
            current_retry: 0,
            depth: 0,
        }
    }

    /// Place the test under the given ancestor suites (outermost first).
    /// Empty titles, such as the root suite's, are skipped.
    pub fn in_suites<S: AsRef<str>>(mut self, suites: &[S]) -> Self {
        let parents: Vec<&str> = suites
            .iter()
            .map(AsRef::as_ref)
            .filter(|t| !t.is_empty())
            .collect();
        self.depth = parents.len();
        let mut parts = parents;
        parts.push(&self.title);
        self.full_title = Some(parts.join(FULL_TITLE_DELIMITER));
        self
    }

    pub fn with_duration(mut self, ms: u64) -> Self {
        self.duration = Some(ms.into());
        self
    }

    /// Fractional duration; non-finite values leave the test untimed.
    pub fn with_duration_f64(mut self, ms: f64) -> Self {
        self.duration = serde_json::Number::from_f64(ms);
        self
    }

    pub fn with_retry(mut self, retry: u32) -> Self {
        self.current_retry = retry;
        self
    }

    pub fn full_title(&self) -> &str {
        self.full_title.as_deref().unwrap_or(&self.title)
    }

    /// Freeze into an outcome record.
    pub fn into_record(self, err: ErrorObject) -> OutcomeRecord {
        let full_title = self.full_title.unwrap_or_else(|| self.title.clone());
        OutcomeRecord {
            title: self.title,
            full_title,
            duration: self.duration,
            current_retry: self.current_retry,
            err,
        }
    }
}

/// Lifecycle signal from the host runner.
///
/// JSON form is one object tagged by `event`, e.g.
/// `{"event":"test_passed","title":"adds","fullTitle":"Math adds","duration":3}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum RunEvent {
    RunStarted,
    SuiteEntered(SuiteInfo),
    TestPassed(TestInfo),
    TestFailed {
        #[serde(flatten)]
        test: TestInfo,
        #[serde(default)]
        err: ErrorObject,
    },
    TestPending(TestInfo),
    TestFinished(TestInfo),
    RunFinished,
}

/// Host runner capability the collector pulls events from.
pub trait OutcomeSource {
    /// Next event, or `None` once the host has nothing more to deliver.
    fn next_event(&mut self) -> Option<ReporterResult<RunEvent>>;

    /// Toggle abort-suite-on-first-failure. Hosts without such a switch keep
    /// the default no-op.
    fn configure_bail(&mut self, _bail: bool) {}
}

/// In-memory source: a queued list of events.
#[derive(Debug, Default)]
pub struct VecSource {
    events: VecDeque<RunEvent>,
    bail: Option<bool>,
}

impl VecSource {
    pub fn new(events: impl IntoIterator<Item = RunEvent>) -> Self {
        Self {
            events: events.into_iter().collect(),
            bail: None,
        }
    }

    pub fn push(&mut self, event: RunEvent) {
        self.events.push_back(event);
    }

    /// Last value passed to [`OutcomeSource::configure_bail`].
    pub fn bail(&self) -> Option<bool> {
        self.bail
    }

    pub fn remaining(&self) -> usize {
        self.events.len()
    }
}

impl OutcomeSource for VecSource {
    fn next_event(&mut self) -> Option<ReporterResult<RunEvent>> {
        self.events.pop_front().map(Ok)
    }

    fn configure_bail(&mut self, bail: bool) {
        self.bail = Some(bail);
    }
}

/// Newline-delimited JSON events read from any buffered reader.
///
/// Lines are read as raw bytes; a line that is not valid UTF-8 is reported as
/// a malformed event and the stream carries on with the next line.
pub struct JsonLinesSource<R> {
    reader: R,
    line_no: usize,
    buf: Vec<u8>,
}

impl<R: BufRead> JsonLinesSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line_no: 0,
            buf: Vec::new(),
        }
    }
}

impl<R: BufRead> OutcomeSource for JsonLinesSource<R> {
    fn next_event(&mut self) -> Option<ReporterResult<RunEvent>> {
        loop {
            self.buf.clear();
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => return Some(Err(ReporterError::Io(e))),
            }
            self.line_no += 1;
            let line_no = self.line_no;
            let parse_error = |message: String| ReporterError::EventParse {
                line: line_no,
                message,
            };
            let line = match std::str::from_utf8(&self.buf) {
                Ok(text) => text.trim(),
                Err(e) => return Some(Err(parse_error(format!("invalid UTF-8: {e}")))),
            };
            if line.is_empty() {
                continue;
            }
            return Some(serde_json::from_str(line).map_err(|e| parse_error(e.to_string())));
        }
    }
}
