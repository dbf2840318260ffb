//! `lanes` binary: lays out a scenario file and writes it as SVG.

use std::{process::ExitCode, str::FromStr};

use clap::Parser;
use log::{LevelFilter, debug, error, info};
use miette::GraphicalReportHandler;

use lanes_cli::{Args, CliError};

fn main() -> ExitCode {
    miette::set_panic_hook();
    let args = Args::parse();
    init_logging(&args.log_level);
    debug!(args:?; "Parsed arguments");

    match lanes_cli::run(&args) {
        Ok(()) => {
            info!(output = args.output; "Done");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{}", render_report(&err));
            ExitCode::FAILURE
        }
    }
}

/// Installs env_logger at `level`, falling back to `warn` for unknown names.
fn init_logging(level: &str) {
    let filter = LevelFilter::from_str(level).unwrap_or_else(|_| {
        eprintln!("Unknown log level '{level}', logging at 'warn'");
        LevelFilter::Warn
    });
    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(filter)
        .init();
    info!(level:% = filter; "Lanes starting");
}

fn render_report(err: &CliError) -> String {
    let mut report = String::new();
    if GraphicalReportHandler::new()
        .render_report(&mut report, err)
        .is_err()
    {
        report = err.to_string();
    }
    report
}
