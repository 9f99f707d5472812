use std::process::ExitCode;

use clap::Parser;
use log::{LevelFilter, error};

use edge_cert_rotator::cli::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match edge_cert_rotator::run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if verbose {
        builder.filter_module("edge_cert_rotator", LevelFilter::Debug);
    }
    builder.format_timestamp_secs().init();
}
