use anyhow::Context;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;
use ultrawide_core::{Collector, Console, JsonLinesSource, ProcessExit, ReporterConfig};

use crate::cli::args::CollectArgs;
use crate::exit_codes::SUCCESS;

pub fn run(args: CollectArgs) -> anyhow::Result<i32> {
    let options = super::host_options(&args.reporter)?;
    let config = ReporterConfig::from_env(options.as_ref())?;
    tracing::debug!(
        results_file = %config.results_file.display(),
        verbosity = %config.verbosity,
        "resolved reporter config"
    );

    // Open the input before the collector exists so a bad path is a usage error.
    let input: Box<dyn io::BufRead> = if args.events == Path::new("-") {
        Box::new(io::stdin().lock())
    } else {
        let file = File::open(&args.events)
            .with_context(|| format!("failed to open event stream {}", args.events.display()))?;
        Box::new(BufReader::new(file))
    };

    let console = Console::stdout(config.verbosity).with_color(!args.no_color);
    let mut collector = Collector::with_console(config, ProcessExit, console);
    let mut source = JsonLinesSource::new(input);
    // Ends the process with the run's exit code.
    collector.run(&mut source);

    Ok(collector.exit_code().unwrap_or(SUCCESS))
}
