//! Test-run result collector.
//!
//! Attaches to a test runner's lifecycle events, accumulates outcomes, prints
//! human-readable progress and writes a JSON summary to disk:
//!
//! - Configuration from `OUTPUT_FILE` / `CONSOLE` or a host options object
//! - Ordered pass / fail / pending outcome lists with Mocha-style run stats
//! - Verbosity-gated, colorized console lines
//! - Pretty JSON results file (`stats`, `pending`, `passes`, `failures`)
//!
//! # Quick Start
//!
//! ```no_run
//! use ultrawide_core::{Collector, ReporterConfig, RecordedExit, RunEvent, TestInfo};
//!
//! # fn example() -> ultrawide_core::ReporterResult<()> {
//! let config = ReporterConfig::from_env(None)?;
//! let mut collector = Collector::new(config, RecordedExit::default(), std::io::stdout());
//!
//! collector.handle(RunEvent::TestPassed(TestInfo::new("adds").in_suites(&["Math"])));
//! collector.handle(RunEvent::RunFinished);
//! assert_eq!(collector.exit_code(), Some(0));
//! # Ok(())
//! # }
//! ```

pub mod collector;
pub mod config;
pub mod errors;
pub mod model;
pub mod report;
pub mod source;
pub mod terminate;

pub use collector::Collector;
pub use config::{HostOptions, ReporterConfig, ReporterOptions, Verbosity};
pub use errors::{ReporterError, ReporterResult};
pub use model::{ErrorObject, ErrorValue, OutcomeKind, OutcomeRecord, RunStats, RunSummary};
pub use report::{Console, ConsoleLine};
pub use source::{JsonLinesSource, OutcomeSource, RunEvent, SuiteInfo, TestInfo, VecSource};
pub use terminate::{ProcessExit, RecordedExit, Terminator};
