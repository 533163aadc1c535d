use super::args::*;
use ultrawide_core::{HostOptions, ReporterOptions, ReporterResult};

pub mod collect;
pub mod config;
pub mod show;

pub fn dispatch(cli: Cli) -> anyhow::Result<i32> {
    match cli.cmd {
        Command::Collect(args) => collect::run(args),
        Command::Config(args) => config::run(args),
        Command::Show(args) => show::run(args),
    }
}

/// Build the host options object from the CLI flags.
///
/// Layering: options file, then `--reporter-options` pairs, then the
/// dedicated flags. `None` when no flag was given at all.
pub(crate) fn host_options(args: &ReporterArgs) -> ReporterResult<Option<HostOptions>> {
    let mut host = match &args.options_file {
        Some(path) => HostOptions::load(path)?,
        None => HostOptions::default(),
    };
    let mut given = args.options_file.is_some();

    let reporter = host
        .reporter_options
        .get_or_insert_with(ReporterOptions::default);
    for pairs in &args.reporter_options {
        reporter.merge_pairs(pairs)?;
        given = true;
    }
    if let Some(file) = &args.results_file {
        reporter.results_file = Some(file.clone());
        given = true;
    }
    if let Some(level) = &args.console_output {
        reporter.console_output = Some(level.clone());
        given = true;
    }

    Ok(given.then_some(host))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_flags_means_no_options() {
        assert!(host_options(&ReporterArgs::default()).unwrap().is_none());
    }

    #[test]
    fn test_flags_override_pairs() {
        let args = ReporterArgs {
            reporter_options: vec!["resultsFile=a.json,consoleOutput=OFF".into()],
            results_file: Some("b.json".into()),
            ..Default::default()
        };
        let host = host_options(&args).unwrap().unwrap();
        let r = host.reporter_options.unwrap();
        assert_eq!(r.results_file.as_deref(), Some("b.json"));
        assert_eq!(r.console_output.as_deref(), Some("OFF"));
    }

    #[test]
    fn test_bad_pair_is_rejected() {
        let args = ReporterArgs {
            reporter_options: vec!["nonsense".into()],
            ..Default::default()
        };
        assert!(host_options(&args).is_err());
    }
}
