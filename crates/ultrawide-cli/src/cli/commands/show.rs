use ultrawide_core::report::read_results;
use ultrawide_core::{Console, ConsoleLine, OutcomeKind, Verbosity};

use crate::cli::args::ShowArgs;
use crate::exit_codes::SUCCESS;

pub fn run(args: ShowArgs) -> anyhow::Result<i32> {
    let summary = read_results(&args.file)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary.stats)?);
        return Ok(SUCCESS);
    }

    println!("Results: {}", args.file.display());
    println!(
        "tests: {}  passes: {}  failures: {}  pending: {}",
        summary.total(),
        summary.passes.len(),
        summary.failures.len(),
        summary.pending.len()
    );

    let mut console = Console::stdout(Verbosity::On).with_color(!args.no_color);
    for rec in summary.records(OutcomeKind::Fail) {
        console.emit(ConsoleLine::Fail {
            title: &rec.full_title,
            depth: 1,
            message: rec.err.message(),
        });
    }
    for rec in summary.records(OutcomeKind::Pending) {
        console.emit(ConsoleLine::Pending {
            title: &rec.full_title,
            depth: 1,
        });
    }
    console.emit(ConsoleLine::Tally {
        passes: summary.passes.len() as u64,
        failures: summary.failures.len() as u64,
    });
    console.flush();
    Ok(SUCCESS)
}
