//! Entry point for the `spirit` binary.
#![forbid(unsafe_code)]

use std::error::Error;

use spirit_cli::CliError;

fn main() {
    if let Err(err) = spirit_cli::run() {
        if let CliError::ArgumentParsing(clap_err) = &err {
            clap_err.exit();
        }
        eprintln!("spirit: {err}");
        let mut cause = err.source();
        while let Some(source) = cause {
            eprintln!("  caused by: {source}");
            cause = source.source();
        }
        std::process::exit(1);
    }
}
