//! CLI argument definitions using clap
//!
//! Commands:
//! - fastpage paginate --db <path> [--config <path>] [--mode <capability>] [--unmodified]
//! - fastpage explain [--config <path>] [--grammar sqlite|mysql] [--mode <capability>]

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::rewrite::FAST_PAGINATE;

/// fastpage - deferred-join offset pagination
#[derive(Parser, Debug)]
#[command(name = "fastpage")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Paginate the query document read from stdin
    Paginate {
        /// SQLite database file
        #[arg(long)]
        db: PathBuf,

        /// Path to pagination config (JSON)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Paginator capability name
        #[arg(long, default_value = FAST_PAGINATE)]
        mode: String,

        /// Skip the rewrite and paginate the query as written
        #[arg(long)]
        unmodified: bool,
    },

    /// Explain how the query document read from stdin would be paginated
    Explain {
        /// Path to pagination config (JSON)
        #[arg(long)]
        config: Option<PathBuf>,

        /// SQL dialect used to render statements
        #[arg(long, value_enum, default_value_t = GrammarKind::Sqlite)]
        grammar: GrammarKind,

        /// Paginator capability name
        #[arg(long, default_value = FAST_PAGINATE)]
        mode: String,
    },
}

/// SQL dialects available to `explain`
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum GrammarKind {
    Sqlite,
    Mysql,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
