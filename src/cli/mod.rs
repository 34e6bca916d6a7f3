//! CLI module for fastpage
//!
//! Provides command-line interface for:
//! - paginate: Run one page of a query document against a SQLite database
//! - explain: Show the statements the rewrite would issue, without a database

mod args;
mod commands;
mod errors;
mod io;
mod request;

pub use args::{Cli, Command, GrammarKind};
pub use commands::{explain, explain_document, run, run_command};
#[cfg(feature = "sqlite")]
pub use commands::{paginate, paginate_document};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{read_request, write_error, write_response};
pub use request::QueryDocument;
