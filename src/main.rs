use anyhow::Result;
use clap::Parser;
use tracing::error;

use pageviews::app::{print_run_summary, process_hours};
use pageviews::utils::{setup_logging, validate_args};
use pageviews::Args;

fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging(args.verbose);
    validate_args(&args)?;

    match process_hours(&args) {
        Ok(summary) => {
            print_run_summary(&summary, &args);
            Ok(())
        }
        Err(e) => {
            error!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}
