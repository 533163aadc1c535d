use ultrawide_core::ReporterConfig;

use crate::cli::args::ConfigArgs;
use crate::exit_codes::SUCCESS;

pub fn run(args: ConfigArgs) -> anyhow::Result<i32> {
    let options = super::host_options(&args.reporter)?;
    let config = ReporterConfig::from_env(options.as_ref())?;
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(SUCCESS)
}
