//! Reporter configuration: results path, verbosity and the bail hook.
//!
//! | Environment Variable | Description |
//! |---------------------|-------------|
//! | `OUTPUT_FILE` | Results file; when set, the environment wins over options (empty value: `test_results.json`) |
//! | `CONSOLE` | Console output level: `ON`, `RESULT` (default) or `OFF`/`SILENT` |

use crate::errors::{ReporterError, ReporterResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const OUTPUT_FILE_ENV: &str = "OUTPUT_FILE";
pub const CONSOLE_ENV: &str = "CONSOLE";

/// Results file used when `OUTPUT_FILE` is set but empty.
pub const DEFAULT_ENV_RESULTS_FILE: &str = "test_results.json";
/// Results file used when options carry no `resultsFile`.
pub const DEFAULT_RESULTS_FILE: &str = "test-results.json";

/// Console detail level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verbosity {
    /// No console output at all.
    Silent,
    /// Final tally only.
    #[default]
    Result,
    /// A line per suite and per test outcome.
    On,
}

impl Verbosity {
    /// Parse a level, falling back to [`Verbosity::Result`] on unknown words.
    pub fn parse_lenient(raw: &str) -> Self {
        raw.parse().unwrap_or_else(|_| {
            tracing::warn!(value = raw, "unknown console output level, using RESULT");
            Self::Result
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Silent => "SILENT",
            Self::Result => "RESULT",
            Self::On => "ON",
        }
    }
}

impl FromStr for Verbosity {
    type Err = ReporterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "ON" => Ok(Self::On),
            "RESULT" => Ok(Self::Result),
            "OFF" | "SILENT" => Ok(Self::Silent),
            _ => Err(ReporterError::InvalidOption {
                option: "consoleOutput".into(),
                reason: format!("unknown level '{s}' (expected ON, RESULT or OFF)"),
            }),
        }
    }
}

impl fmt::Display for Verbosity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reporter-specific options, as a host passes them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReporterOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub results_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub console_output: Option<String>,
    /// Keep running every test after a failure (asks the host to disable bail).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keep_running: Option<bool>,
}

impl ReporterOptions {
    /// Parse `key=value` pairs separated by commas, e.g.
    /// `resultsFile=out.json,consoleOutput=ON`.
    pub fn parse_pairs(raw: &str) -> ReporterResult<Self> {
        let mut opts = Self::default();
        opts.merge_pairs(raw)?;
        Ok(opts)
    }

    /// Apply `key=value` pairs on top of the current values.
    pub fn merge_pairs(&mut self, raw: &str) -> ReporterResult<()> {
        for pair in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').ok_or_else(|| ReporterError::InvalidOption {
                option: pair.to_string(),
                reason: "expected key=value".into(),
            })?;
            let value = value.trim().to_string();
            match key.trim() {
                "resultsFile" => self.results_file = Some(value),
                "consoleOutput" => self.console_output = Some(value),
                "keepRunning" => {
                    let flag = value.parse::<bool>().map_err(|_| ReporterError::InvalidOption {
                        option: pair.to_string(),
                        reason: "expected true or false".into(),
                    })?;
                    self.keep_running = Some(flag);
                }
                other => {
                    return Err(ReporterError::InvalidOption {
                        option: other.to_string(),
                        reason: "unknown key (expected resultsFile, consoleOutput or keepRunning)"
                            .into(),
                    })
                }
            }
        }
        Ok(())
    }
}

/// The options object handed over by the host runner.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostOptions {
    #[serde(default)]
    pub reporter_options: Option<ReporterOptions>,
}

impl HostOptions {
    pub fn with_reporter_options(options: ReporterOptions) -> Self {
        Self {
            reporter_options: Some(options),
        }
    }

    /// Load from a YAML or JSON file.
    pub fn load(path: &Path) -> ReporterResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| ReporterError::OptionsFile {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        serde_yaml::from_str(&raw).map_err(|e| ReporterError::OptionsFile {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}

/// Effective configuration for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReporterConfig {
    /// Absolute path of the results file.
    pub results_file: PathBuf,
    pub verbosity: Verbosity,
    pub keep_running: bool,
}

impl ReporterConfig {
    /// Resolve against the real process environment and working directory.
    pub fn from_env(options: Option<&HostOptions>) -> ReporterResult<Self> {
        let cwd = std::env::current_dir().map_err(ReporterError::WorkingDir)?;
        Ok(Self::resolve_with(
            options,
            |key| std::env::var(key).ok(),
            &cwd,
        ))
    }

    /// Resolve with an explicit environment lookup and working directory.
    ///
    /// `OUTPUT_FILE` takes precedence over the options object whenever it is set.
    pub fn resolve_with<F>(options: Option<&HostOptions>, lookup: F, cwd: &Path) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let reporter = options.and_then(|o| o.reporter_options.as_ref());
        let keep_running = reporter.and_then(|r| r.keep_running).unwrap_or(true);

        let (file, verbosity) = match lookup(OUTPUT_FILE_ENV) {
            Some(file) => {
                let file = non_empty(Some(file)).unwrap_or_else(|| DEFAULT_ENV_RESULTS_FILE.into());
                let verbosity = lookup(CONSOLE_ENV)
                    .map(|v| Verbosity::parse_lenient(&v))
                    .unwrap_or_default();
                tracing::debug!(file = %file, "results file taken from environment");
                (file, verbosity)
            }
            None => {
                let file = non_empty(reporter.and_then(|r| r.results_file.clone()))
                    .unwrap_or_else(|| DEFAULT_RESULTS_FILE.into());
                let verbosity = non_empty(reporter.and_then(|r| r.console_output.clone()))
                    .map(|v| Verbosity::parse_lenient(&v))
                    .unwrap_or_default();
                (file, verbosity)
            }
        };

        Self {
            results_file: absolutize(cwd, &file),
            verbosity,
            keep_running,
        }
    }

    /// Create the parent directory of the results file if it is missing.
    pub fn prepare_output_dir(&self) -> ReporterResult<()> {
        let Some(parent) = self.results_file.parent() else {
            return Ok(());
        };
        if parent.as_os_str().is_empty() || parent.is_dir() {
            return Ok(());
        }
        std::fs::create_dir_all(parent).map_err(|source| ReporterError::DirectoryCreation {
            path: parent.to_path_buf(),
            source,
        })?;
        tracing::debug!(dir = %parent.display(), "created results directory");
        Ok(())
    }
}

fn non_empty(v: Option<String>) -> Option<String> {
    v.filter(|s| !s.trim().is_empty())
}

fn absolutize(cwd: &Path, file: &str) -> PathBuf {
    let p = Path::new(file);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        cwd.join(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn cwd() -> PathBuf {
        if cfg!(windows) {
            PathBuf::from(r"C:\work")
        } else {
            PathBuf::from("/work")
        }
    }

    #[test]
    fn test_options_results_file_joined_to_cwd() {
        let opts = HostOptions::with_reporter_options(ReporterOptions {
            results_file: Some("out.json".into()),
            ..Default::default()
        });
        let cfg = ReporterConfig::resolve_with(Some(&opts), env(&[]), &cwd());
        assert_eq!(cfg.results_file, cwd().join("out.json"));
        assert_eq!(cfg.verbosity, Verbosity::Result);
        assert!(cfg.keep_running);
    }

    #[test]
    fn test_defaults_without_env_or_options() {
        let cfg = ReporterConfig::resolve_with(None, env(&[]), &cwd());
        assert_eq!(cfg.results_file, cwd().join(DEFAULT_RESULTS_FILE));
        assert_eq!(cfg.verbosity, Verbosity::Result);
    }

    #[test]
    fn test_env_output_file_takes_precedence() {
        let opts = HostOptions::with_reporter_options(ReporterOptions {
            results_file: Some("from-options.json".into()),
            console_output: Some("OFF".into()),
            ..Default::default()
        });
        let cfg = ReporterConfig::resolve_with(
            Some(&opts),
            env(&[("OUTPUT_FILE", "reports/env.json"), ("CONSOLE", "on")]),
            &cwd(),
        );
        assert_eq!(cfg.results_file, cwd().join("reports/env.json"));
        assert_eq!(cfg.verbosity, Verbosity::On);
    }

    #[test]
    fn test_env_empty_output_file_uses_env_default() {
        let cfg = ReporterConfig::resolve_with(None, env(&[("OUTPUT_FILE", "")]), &cwd());
        assert_eq!(cfg.results_file, cwd().join(DEFAULT_ENV_RESULTS_FILE));
        assert_eq!(cfg.verbosity, Verbosity::Result);
    }

    #[test]
    fn test_absolute_env_path_kept() {
        let abs = cwd().join("elsewhere").join("r.json");
        let cfg = ReporterConfig::resolve_with(
            None,
            env(&[("OUTPUT_FILE", abs.to_str().unwrap())]),
            Path::new("/ignored"),
        );
        assert_eq!(cfg.results_file, abs);
    }

    #[test]
    fn test_console_env_ignored_without_output_file() {
        let cfg = ReporterConfig::resolve_with(None, env(&[("CONSOLE", "ON")]), &cwd());
        assert_eq!(cfg.verbosity, Verbosity::Result);
    }

    #[test]
    fn test_resolved_path_always_absolute() {
        let inputs = ["a.json", "./nested/b.json", "../up.json", "", "   "];
        for input in inputs {
            let from_env = ReporterConfig::resolve_with(None, env(&[("OUTPUT_FILE", input)]), &cwd());
            assert!(from_env.results_file.is_absolute(), "env {input:?}");

            let opts = HostOptions::with_reporter_options(ReporterOptions {
                results_file: Some(input.into()),
                ..Default::default()
            });
            let from_opts = ReporterConfig::resolve_with(Some(&opts), env(&[]), &cwd());
            assert!(from_opts.results_file.is_absolute(), "options {input:?}");
        }
    }

    #[test]
    fn test_verbosity_parsing() {
        assert_eq!("on".parse::<Verbosity>().unwrap(), Verbosity::On);
        assert_eq!("Result".parse::<Verbosity>().unwrap(), Verbosity::Result);
        assert_eq!("OFF".parse::<Verbosity>().unwrap(), Verbosity::Silent);
        assert_eq!("silent".parse::<Verbosity>().unwrap(), Verbosity::Silent);
        assert!("loud".parse::<Verbosity>().is_err());
        assert_eq!(Verbosity::parse_lenient("loud"), Verbosity::Result);
    }

    #[test]
    fn test_parse_pairs() {
        let opts =
            ReporterOptions::parse_pairs("resultsFile=out/r.json, consoleOutput=ON,keepRunning=false")
                .unwrap();
        assert_eq!(opts.results_file.as_deref(), Some("out/r.json"));
        assert_eq!(opts.console_output.as_deref(), Some("ON"));
        assert_eq!(opts.keep_running, Some(false));

        assert!(ReporterOptions::parse_pairs("resultsFile").is_err());
        assert!(ReporterOptions::parse_pairs("colour=red").is_err());
        assert!(ReporterOptions::parse_pairs("keepRunning=maybe").is_err());
        assert_eq!(ReporterOptions::parse_pairs("").unwrap(), ReporterOptions::default());
    }

    #[test]
    fn test_host_options_load_yaml_and_json() {
        let dir = tempfile::tempdir().unwrap();
        let yaml = dir.path().join("opts.yaml");
        std::fs::write(
            &yaml,
            "reporterOptions:\n  resultsFile: out.json\n  consoleOutput: ON\n",
        )
        .unwrap();
        let opts = HostOptions::load(&yaml).unwrap();
        let r = opts.reporter_options.unwrap();
        assert_eq!(r.results_file.as_deref(), Some("out.json"));
        assert_eq!(r.console_output.as_deref(), Some("ON"));

        let json = dir.path().join("opts.json");
        std::fs::write(&json, r#"{"reporterOptions":{"keepRunning":false}}"#).unwrap();
        let opts = HostOptions::load(&json).unwrap();
        assert_eq!(opts.reporter_options.unwrap().keep_running, Some(false));

        let missing = HostOptions::load(&dir.path().join("nope.yaml")).unwrap_err();
        assert!(matches!(missing, ReporterError::OptionsFile { .. }));
    }

    #[test]
    fn test_prepare_output_dir_creates_missing_parents() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = ReporterConfig {
            results_file: dir.path().join("a/b/results.json"),
            verbosity: Verbosity::Result,
            keep_running: true,
        };
        cfg.prepare_output_dir().unwrap();
        assert!(dir.path().join("a/b").is_dir());
        // Second call is a no-op.
        cfg.prepare_output_dir().unwrap();
    }

    #[test]
    fn test_prepare_output_dir_reports_failure() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "file, not a dir").unwrap();
        let cfg = ReporterConfig {
            results_file: blocker.join("sub/results.json"),
            verbosity: Verbosity::Result,
            keep_running: true,
        };
        let err = cfg.prepare_output_dir().unwrap_err();
        assert!(matches!(err, ReporterError::DirectoryCreation { .. }));
        assert!(!err.is_fatal());
    }

    #[test]
    #[serial]
    fn test_from_env_reads_process_environment() {
        std::env::remove_var(OUTPUT_FILE_ENV);
        std::env::remove_var(CONSOLE_ENV);

        std::env::set_var(OUTPUT_FILE_ENV, "env-results.json");
        std::env::set_var(CONSOLE_ENV, "off");
        let cfg = ReporterConfig::from_env(None).unwrap();
        std::env::remove_var(OUTPUT_FILE_ENV);
        std::env::remove_var(CONSOLE_ENV);

        assert!(cfg.results_file.is_absolute());
        assert!(cfg.results_file.ends_with("env-results.json"));
        assert_eq!(cfg.verbosity, Verbosity::Silent);
    }
}
