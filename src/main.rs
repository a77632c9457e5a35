use std::{process, str::FromStr};

use clap::Parser;
use log::{LevelFilter, debug, error, info};

use archview::Args;

fn main() {
    let args = Args::parse();

    let log_level = LevelFilter::from_str(&args.log_level).unwrap_or_else(|_| {
        eprintln!(
            "Invalid log level: {}. Using 'warn' instead.",
            args.log_level
        );
        LevelFilter::Warn
    });

    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .init();

    info!(log_level:?; "Starting archview");
    debug!(args:?; "Parsed arguments");

    if let Err(err) = archview::run(&args) {
        error!("{err:#}");
        process::exit(1);
    }
}
