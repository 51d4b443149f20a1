use acf_sync::{
    Cli, Command,
    handlers::{handle_scan, handle_to_json, handle_to_php},
};
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match &cli.command {
        Command::Scan(args) => handle_scan(&cli, args),
        Command::ToPhp(args) => handle_to_php(&cli, args),
        Command::ToJson(args) => handle_to_json(&cli, args),
    };
    result.into()
}

/// `RUST_LOG` wins; otherwise warnings, or debug with `--verbose`.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
