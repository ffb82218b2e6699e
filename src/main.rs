use clap::Parser;
use std::process::ExitCode;
use tidywatch::cli::{Cli, run};
use tidywatch::output::OutputFormatter;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Diagnostics only; the activity log is a separate, explicit sink.
    let default_filter = if cli.verbose { "tidywatch=info" } else { "warn" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            OutputFormatter::error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}
