//! fastpage CLI entry point
//!
//! Parses arguments, dispatches to the CLI module and exits non-zero when a
//! response could not be written.

use fastpage::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
