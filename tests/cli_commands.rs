//! CLI Command Tests
//!
//! Drives the paginate and explain commands against a SQLite file:
//! - Rewritten and unmodified responses agree
//! - Explain output matches the statements actually executed
//! - Errors carry stable codes
//! - The binary writes exactly one JSON document to stdout

#![cfg(feature = "sqlite")]

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use fastpage::cli::{explain_document, paginate_document, CliErrorCode, GrammarKind, QueryDocument};
use fastpage::connection::SqliteConnection;
use serde_json::{json, Value};
use tempfile::TempDir;

// =============================================================================
// Fixtures
// =============================================================================

fn seeded_db(temp_dir: &TempDir) -> PathBuf {
    let path = temp_dir.path().join("blog.db");
    let conn = SqliteConnection::open(&path).unwrap();
    conn.execute_batch(
        "create table users (id integer primary key, name text not null, active integer not null);
         create table posts (
             id integer primary key,
             author_id integer not null,
             title text not null,
             created_at text not null
         );
         with recursive seq(n) as (select 1 union all select n + 1 from seq where n < 4)
         insert into users (id, name, active) select n, 'user ' || n, n % 2 from seq;
         with recursive seq(n) as (select 1 union all select n + 1 from seq where n < 25)
         insert into posts (id, author_id, title, created_at)
         select n, (n % 4) + 1, 'post ' || n, printf('2024-02-%02d', n) from seq;",
    )
    .unwrap();
    path
}

fn document(value: Value) -> QueryDocument {
    QueryDocument::from_value(value).unwrap()
}

fn ids(response: &Value) -> Vec<i64> {
    response["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["id"].as_i64().unwrap())
        .collect()
}

fn recent_posts() -> QueryDocument {
    document(json!({
        "table": "posts",
        "select": ["posts.*"],
        "joins": [{"table": "users", "first": "users.id", "second": "posts.author_id"}],
        "wheres": [{"column": "users.active", "value": 1}],
        "order_by": [{"column": "created_at", "direction": "desc"}],
        "per_page": 4,
        "page": 2
    }))
}

// =============================================================================
// Paginate Tests
// =============================================================================

/// Rewritten and unmodified responses are identical.
#[test]
fn test_fast_and_unmodified_agree() {
    let temp_dir = TempDir::new().unwrap();
    let db = seeded_db(&temp_dir);
    let doc = recent_posts();

    let fast = paginate_document(&db, None, "fast_paginate", false, &doc).unwrap();
    let plain = paginate_document(&db, None, "fast_paginate", true, &doc).unwrap();

    assert_eq!(fast, plain);
    assert_eq!(fast["total"], json!(12));
    assert_eq!(fast["current_page"], json!(2));
    assert_eq!(fast["last_page"], json!(3));
    assert_eq!(fast["page_name"], json!("page"));
    assert_eq!(ids(&fast), vec![16, 14, 12, 10]);
}

/// Simple mode reports has_more_pages and no total.
#[test]
fn test_simple_mode_response() {
    let temp_dir = TempDir::new().unwrap();
    let db = seeded_db(&temp_dir);
    let doc = document(json!({
        "table": "posts",
        "order_by": [{"column": "id", "direction": "asc"}],
        "per_page": 10,
        "page": 3
    }));

    let fast = paginate_document(&db, None, "simple_fast_paginate", false, &doc).unwrap();
    assert_eq!(fast["has_more_pages"], json!(false));
    assert!(fast.get("total").is_none());
    assert_eq!(ids(&fast), vec![21, 22, 23, 24, 25]);

    let plain = paginate_document(&db, None, "simple_fast_paginate", true, &doc).unwrap();
    assert_eq!(fast, plain);
}

/// Unknown capability names are rejected before touching the database.
#[test]
fn test_unknown_mode() {
    let temp_dir = TempDir::new().unwrap();
    let db = seeded_db(&temp_dir);
    let err = paginate_document(&db, None, "cursor_paginate", false, &recent_posts()).unwrap_err();
    assert_eq!(err.code(), &CliErrorCode::UnknownMode);
}

/// SQL errors surface as database errors.
#[test]
fn test_bad_column_is_database_error() {
    let temp_dir = TempDir::new().unwrap();
    let db = seeded_db(&temp_dir);
    let doc = document(json!({
        "table": "posts",
        "order_by": [{"column": "published_at", "direction": "desc"}]
    }));
    let err = paginate_document(&db, None, "fast_paginate", false, &doc).unwrap_err();
    assert_eq!(err.code(), &CliErrorCode::DatabaseError);
    assert!(err.message().contains("published_at"));
}

// =============================================================================
// Explain Tests
// =============================================================================

/// Explain shows the three statements of a rewritten page.
#[test]
fn test_explain_rewritten_page() {
    let data = explain_document(None, GrammarKind::Sqlite, "fast_paginate", &recent_posts()).unwrap();

    assert_eq!(data["rewritten"], json!(true));
    assert_eq!(data["mode"], json!("length_aware"));
    assert_eq!(
        data["count"]["sql"],
        json!(
            "select count(*) as aggregate from (select \"posts\".\"id\", \"created_at\" from \"posts\" \
             inner join \"users\" on \"users\".\"id\" = \"posts\".\"author_id\" \
             where \"users\".\"active\" = ?) as \"temp_table\""
        )
    );
    assert_eq!(data["count"]["bindings"], json!([1]));
    assert_eq!(
        data["page"]["sql"],
        json!(
            "select \"posts\".\"id\", \"created_at\" from \"posts\" \
             inner join \"users\" on \"users\".\"id\" = \"posts\".\"author_id\" \
             where \"users\".\"active\" = ? order by \"created_at\" desc limit 4 offset 4"
        )
    );
    assert!(data["outer"]["sql"]
        .as_str()
        .unwrap()
        .starts_with("select \"posts\".* from \"posts\""));
}

/// Explain reports the fallback code for non-key grouping.
#[test]
fn test_explain_fallback() {
    let doc = document(json!({
        "table": "posts",
        "group_by": ["author_id"],
        "per_page": 5
    }));
    let data = explain_document(None, GrammarKind::Mysql, "fast_paginate", &doc).unwrap();

    assert_eq!(data["rewritten"], json!(false));
    assert_eq!(data["fallback_code"], json!("FAST_PAGINATE_NON_KEY_GROUPING"));
    assert!(data["outer"].is_null());
    assert_eq!(
        data["page"]["sql"],
        json!("select * from `posts` group by `author_id` limit 5")
    );
}

// =============================================================================
// Process Tests
// =============================================================================

/// With trace logging on, stdout still holds a single JSON response and the
/// log lines go to stderr.
#[test]
fn test_stdout_is_one_document() {
    let temp_dir = TempDir::new().unwrap();
    let db = seeded_db(&temp_dir);
    let config = temp_dir.path().join("fastpage.json");
    std::fs::write(&config, r#"{"log_level":"TRACE"}"#).unwrap();
    let input = serde_json::to_string(&json!({
        "table": "posts",
        "order_by": [{"column": "created_at", "direction": "desc"}],
        "per_page": 5,
        "page": 2
    }))
    .unwrap();

    let mut child = Command::new(env!("CARGO_BIN_EXE_fastpage"))
        .arg("paginate")
        .arg("--db")
        .arg(&db)
        .arg("--config")
        .arg(&config)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child.stdin.take().unwrap().write_all(input.as_bytes()).unwrap();
    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    assert_eq!(stdout.trim_end().lines().count(), 1, "stdout: {}", stdout);
    let response: Value = serde_json::from_str(stdout.trim_end()).unwrap();
    assert_eq!(response["status"], json!("ok"));
    assert_eq!(ids(&response["data"]), vec![20, 19, 18, 17, 16]);

    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("PAGINATORS_INSTALLED"));
    assert!(stderr.contains("FAST_PAGINATE_REWRITE"));
}
