//! CLI command implementations
//!
//! Each command reads one query document from stdin and writes exactly one JSON
//! response to stdout. Failures are written as error responses too; the process
//! exit code reflects only I/O failures on stdout itself.

use std::path::Path;

use serde_json::Value;

use crate::config::PaginationConfig;
use crate::query::{Grammar, MySqlGrammar, SqliteGrammar};
use crate::rewrite::{install, RewriteExplain};

use super::args::{Command, GrammarKind};
use super::errors::{CliError, CliResult};
use super::io::{read_request, write_error, write_response};
use super::request::QueryDocument;

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
/// This is the only function that main.rs should call.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        #[cfg(feature = "sqlite")]
        Command::Paginate {
            db,
            config,
            mode,
            unmodified,
        } => paginate(&db, config.as_deref(), &mode, unmodified),
        #[cfg(not(feature = "sqlite"))]
        Command::Paginate { .. } => write_error(
            super::errors::CliErrorCode::DatabaseError.code(),
            "fastpage was built without SQLite support",
        ),
        Command::Explain {
            config,
            grammar,
            mode,
        } => explain(config.as_deref(), grammar, &mode),
    }
}

/// Paginate the document on stdin against a SQLite database
#[cfg(feature = "sqlite")]
pub fn paginate(db: &Path, config: Option<&Path>, mode: &str, unmodified: bool) -> CliResult<()> {
    respond(read_document().and_then(|document| {
        paginate_document(db, config, mode, unmodified, &document)
    }))
}

/// Explain the document on stdin
pub fn explain(config: Option<&Path>, grammar: GrammarKind, mode: &str) -> CliResult<()> {
    respond(read_document().and_then(|document| explain_document(config, grammar, mode, &document)))
}

/// Runs one page of `document` and returns the serialized paginator
#[cfg(feature = "sqlite")]
pub fn paginate_document(
    db: &Path,
    config: Option<&Path>,
    mode: &str,
    unmodified: bool,
    document: &QueryDocument,
) -> CliResult<Value> {
    use crate::connection::SqliteConnection;
    use crate::model::Record;
    use crate::pagination::{Paginated, PaginationMode};

    let registry = install(load_config(config)?);
    let pagination_mode = registry
        .lookup(mode)
        .ok_or_else(|| CliError::unknown_mode(mode))?;

    if !db.exists() {
        return Err(CliError::new(
            super::errors::CliErrorCode::DatabaseError,
            format!("Database not found: {}", db.display()),
        ));
    }
    let mut conn = SqliteConnection::open(db)?;

    let model = document.to_model_query();
    let request = document.to_request()?;

    let page: Paginated<Record> = if unmodified {
        match pagination_mode {
            PaginationMode::LengthAware => model.paginate(&mut conn, &request)?.into(),
            PaginationMode::Simple => model.simple_paginate(&mut conn, &request)?.into(),
        }
    } else {
        model.call_paginator(mode, &mut conn, &request)?
    };

    Ok(serde_json::to_value(&page)?)
}

/// Explains `document` without touching a database
pub fn explain_document(
    config: Option<&Path>,
    grammar: GrammarKind,
    mode: &str,
    document: &QueryDocument,
) -> CliResult<Value> {
    let config = load_config(config)?;
    let registry = install(config.clone());
    let pagination_mode = registry
        .lookup(mode)
        .ok_or_else(|| CliError::unknown_mode(mode))?;

    let meta = document.meta();
    let resolved = registry.resolve(&document.to_request()?, &meta);
    let query = document.to_query().with_default_columns(&resolved.columns);

    let grammar: &dyn Grammar = match grammar {
        GrammarKind::Sqlite => &SqliteGrammar,
        GrammarKind::Mysql => &MySqlGrammar,
    };
    let explain = RewriteExplain::build(
        &query,
        &meta,
        grammar,
        resolved.window,
        pagination_mode,
        resolved.count_query.as_ref(),
        &config,
    );

    Ok(serde_json::to_value(&explain)?)
}

fn load_config(path: Option<&Path>) -> CliResult<PaginationConfig> {
    match path {
        Some(path) => Ok(PaginationConfig::load(path)?),
        None => Ok(PaginationConfig::default()),
    }
}

fn read_document() -> CliResult<QueryDocument> {
    QueryDocument::from_value(read_request()?)
}

fn respond(result: CliResult<Value>) -> CliResult<()> {
    match result {
        Ok(data) => write_response(data),
        Err(e) => write_error(e.code_str(), e.message()),
    }
}

#[cfg(test)]
mod tests {
    use super::super::errors::CliErrorCode;
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn document(value: Value) -> QueryDocument {
        QueryDocument::from_value(value).unwrap()
    }

    #[test]
    fn test_explain_document() {
        let data = explain_document(
            None,
            GrammarKind::Sqlite,
            "fast_paginate",
            &document(json!({
                "table": "posts",
                "order_by": [{"column": "created_at", "direction": "desc"}],
                "per_page": 10,
                "page": 2
            })),
        )
        .unwrap();

        assert_eq!(data["rewritten"], json!(true));
        assert_eq!(
            data["page"]["sql"],
            json!("select \"posts\".\"id\", \"created_at\" from \"posts\" order by \"created_at\" desc limit 10 offset 10")
        );
    }

    #[test]
    fn test_explain_unknown_mode() {
        let err = explain_document(None, GrammarKind::Mysql, "paginate", &document(json!({"table": "posts"})))
            .unwrap_err();
        assert_eq!(err.code(), &CliErrorCode::UnknownMode);
    }

    #[test]
    fn test_explain_reads_config_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("fastpage.json");
        fs::write(&config_path, json!({"strict_grouping": false}).to_string()).unwrap();

        let data = explain_document(
            Some(&config_path),
            GrammarKind::Sqlite,
            "simple_fast_paginate",
            &document(json!({"table": "posts", "group_by": ["author_id"], "per_page": 5})),
        )
        .unwrap();
        assert_eq!(data["rewritten"], json!(true));
        assert_eq!(data["distinct"], json!(false));
    }

    #[test]
    fn test_bad_config_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("fastpage.json");
        fs::write(&config_path, "{not json").unwrap();

        let err = explain_document(
            Some(&config_path),
            GrammarKind::Sqlite,
            "fast_paginate",
            &document(json!({"table": "posts"})),
        )
        .unwrap_err();
        assert_eq!(err.code(), &CliErrorCode::ConfigError);
    }

    #[cfg(feature = "sqlite")]
    #[test]
    fn test_paginate_missing_database() {
        let temp_dir = TempDir::new().unwrap();
        let err = paginate_document(
            &temp_dir.path().join("missing.db"),
            None,
            "fast_paginate",
            false,
            &document(json!({"table": "posts"})),
        )
        .unwrap_err();
        assert_eq!(err.code(), &CliErrorCode::DatabaseError);
    }
}
