use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "ultrawide",
    version,
    about = "Test-run result collector: lifecycle events in, console tally and JSON results out"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Read a JSON-lines lifecycle event stream and write the results file
    Collect(CollectArgs),
    /// Print the effective reporter configuration as JSON
    Config(ConfigArgs),
    /// Summarize an existing results file
    Show(ShowArgs),
}

/// Reporter options. `OUTPUT_FILE` / `CONSOLE` in the environment win over all of these.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct ReporterArgs {
    /// YAML or JSON file holding a `reporterOptions` object
    #[arg(long)]
    pub options_file: Option<PathBuf>,

    /// Mocha-style options, e.g. resultsFile=out.json,consoleOutput=ON (repeatable)
    #[arg(long, value_name = "KEY=VALUE,...")]
    pub reporter_options: Vec<String>,

    /// Results file (relative paths are resolved against the working directory)
    #[arg(long)]
    pub results_file: Option<String>,

    /// Console output level: ON, RESULT or OFF
    #[arg(long)]
    pub console_output: Option<String>,
}

#[derive(clap::Args, Debug, Clone)]
pub struct CollectArgs {
    #[command(flatten)]
    pub reporter: ReporterArgs,

    /// Event stream to read; `-` reads stdin
    #[arg(long, default_value = "-")]
    pub events: PathBuf,

    /// Disable colored console output
    #[arg(long)]
    pub no_color: bool,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ConfigArgs {
    #[command(flatten)]
    pub reporter: ReporterArgs,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ShowArgs {
    /// Results file written by `ultrawide collect`
    pub file: PathBuf,

    /// Print the run stats as JSON instead of text
    #[arg(long)]
    pub json: bool,

    /// Disable colored console output
    #[arg(long)]
    pub no_color: bool,
}
