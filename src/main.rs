//! caret CLI entry point.
//!
//! Initializes logging, dispatches the subcommand against a disk-backed
//! cursor, and prints one JSON envelope per invocation. Exit codes follow
//! the stable error codes in `caret_core::error`.

use std::sync::Arc;

use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use caret::cli::{build_action, parse_location, Cli, Command};
use caret::output::{error_envelope, ok_envelope, unified_diff};
use caret::store::DiskFileStore;
use caret_core::analysis::CodeAnalysis;
use caret_core::context::Context;
use caret_core::error::CursorResult;
use caret_core::outline::OutlineAstProvider;
use caret_core::position::Position;
use caret_core::{Cursor, Providers};

fn main() {
    init_logging();
    let cli = Cli::parse();
    match run(cli) {
        Ok(rendered) => println!("{}", rendered),
        Err(err) => {
            let (rendered, code) = error_envelope(&err);
            println!("{}", rendered);
            std::process::exit(code);
        }
    }
}

/// Logging goes to stderr so stdout stays a clean JSON stream. Set
/// `CARET_LOG_FORMAT=json` for structured log lines.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if std::env::var("CARET_LOG_FORMAT").as_deref() == Ok("json") {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn open_cursor(root: &str, position: Position) -> CursorResult<Cursor> {
    let store = DiskFileStore::new(root);
    let providers = Providers::new(Arc::new(store))
        .with_ast(Arc::new(OutlineAstProvider))
        .with_project_root(root);
    Cursor::open(providers, position)
}

// ============================================================================
// Command Payloads
// ============================================================================

#[derive(Serialize)]
struct ContextPayload {
    position: Position,
    context: Context,
}

#[derive(Serialize)]
struct SeekPayload {
    found: bool,
    position: Position,
    #[serde(skip_serializing_if = "Option::is_none")]
    block: Option<String>,
}

#[derive(Serialize)]
struct AnalyzePayload {
    position: Position,
    analysis: CodeAnalysis,
}

#[derive(Serialize)]
struct ReferencesPayload {
    references: Vec<Position>,
}

#[derive(Serialize)]
struct ActionPayload {
    action: String,
    applied: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    diff: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    files_written: Option<Vec<String>>,
}

#[derive(Serialize)]
struct ListPayload {
    files: Vec<String>,
}

// ============================================================================
// Dispatch
// ============================================================================

fn run(cli: Cli) -> CursorResult<String> {
    match cli.command {
        Command::Context { at } => {
            let cursor = open_cursor(&cli.root, parse_location(&at)?)?;
            Ok(ok_envelope(&ContextPayload {
                position: cursor.position().clone(),
                context: cursor.context().clone(),
            }))
        }
        Command::Seek { at, kind } => {
            let mut cursor = open_cursor(&cli.root, parse_location(&at)?)?;
            let found = cursor.seek_structure(&kind)?;
            let block = found.then(|| cursor.extract_block()).transpose()?;
            Ok(ok_envelope(&SeekPayload {
                found,
                position: cursor.position().clone(),
                block,
            }))
        }
        Command::Analyze { at } => {
            let mut cursor = open_cursor(&cli.root, parse_location(&at)?)?;
            let analysis = cursor.analyze_code();
            Ok(ok_envelope(&AnalyzePayload {
                position: cursor.position().clone(),
                analysis,
            }))
        }
        Command::References { at, symbol } => {
            let mut cursor = open_cursor(&cli.root, parse_location(&at)?)?;
            let references = cursor.find_references(symbol.as_deref())?;
            Ok(ok_envelope(&ReferencesPayload { references }))
        }
        Command::Action {
            action,
            at,
            name,
            annotation,
            context_name,
            apply,
        } => {
            let code_action = build_action(
                &action,
                name.as_deref(),
                annotation.as_deref(),
                context_name.as_deref(),
            )?;
            let mut cursor = open_cursor(&cli.root, parse_location(&at)?)?;
            let before = cursor.lines();
            let applied = cursor.apply_action(&code_action)?;
            let diff = applied
                .then(|| unified_diff(&cursor.path(), &before, &cursor.lines()))
                .filter(|d| !d.is_empty());
            let files_written = if applied && apply {
                cursor.commit()?;
                Some(vec![cursor.path()])
            } else {
                None
            };
            Ok(ok_envelope(&ActionPayload {
                action,
                applied,
                diff,
                files_written,
            }))
        }
        Command::List => {
            let store = DiskFileStore::new(&cli.root);
            Ok(ok_envelope(&ListPayload {
                files: store.list_source_files(),
            }))
        }
    }
}
