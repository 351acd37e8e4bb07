//! `cdm` entry point.

use cdm_cli::{resolve_config, run, Args, EXIT_FAILURE};
use cdm_core::init_logging;
use clap::Parser;
use std::process;

fn main() {
    let args = Args::parse();

    let config = match resolve_config(&args) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {err}");
            process::exit(err.exit_code());
        }
    };

    if let Err(err) = init_logging(&config.logging) {
        eprintln!("error: {err}");
        process::exit(EXIT_FAILURE);
    }

    match run(&args.command, &config) {
        Ok(output) => println!("{output}"),
        Err(err) => {
            eprintln!("error: {err}");
            process::exit(err.exit_code());
        }
    }
}
