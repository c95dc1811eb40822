//! CLI front door.
//!
//! Defines the argument surface and the builders that turn CLI input into
//! engine types: location strings into [`Position`]s and action names plus
//! option flags into a [`CodeAction`]. Execution lives in `main.rs`; every
//! command prints one JSON envelope.

use clap::{Parser, Subcommand};

use caret_core::error::{CursorError, CursorResult};
use caret_core::CodeAction;
use caret_core::Position;

/// Structural cursor engine for position-aware code navigation and
/// transformation.
#[derive(Debug, Parser)]
#[command(name = "caret", version, about)]
pub struct Cli {
    /// Workspace root the file store resolves paths against.
    #[arg(long, global = true, default_value = ".")]
    pub root: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the context window, imports, and scope at a location.
    Context {
        /// Location as path:line or path:line:col.
        #[arg(long)]
        at: String,
    },
    /// Seek the nearest structure of a kind from a location.
    Seek {
        /// Location as path:line or path:line:col.
        #[arg(long)]
        at: String,
        /// Node kind to seek (e.g. function, class, jsx).
        #[arg(long)]
        kind: String,
    },
    /// Run the heuristic analysis battery at a location.
    Analyze {
        /// Location as path:line or path:line:col.
        #[arg(long)]
        at: String,
    },
    /// List references to a symbol via the project index.
    References {
        /// Location as path:line or path:line:col.
        #[arg(long)]
        at: String,
        /// Symbol to look up; defaults to the one under the cursor.
        #[arg(long)]
        symbol: Option<String>,
    },
    /// Apply a code action at a location.
    Action {
        /// Action name (e.g. extractVariable, renameSymbol).
        action: String,
        /// Location as path:line or path:line:col.
        #[arg(long)]
        at: String,
        /// Name option for actions that mint a binding.
        #[arg(long)]
        name: Option<String>,
        /// Annotation option for addTypeAnnotation.
        #[arg(long)]
        annotation: Option<String>,
        /// Context name option for refactorToContextApi.
        #[arg(long)]
        context_name: Option<String>,
        /// Write the edited buffer back through the file store.
        #[arg(long)]
        apply: bool,
    },
    /// List the source files the store can serve.
    List,
}

/// Parse a `path:line[:col]` location string.
pub fn parse_location(at: &str) -> CursorResult<Position> {
    Position::parse(at).ok_or_else(|| {
        CursorError::invalid_args(format!(
            "invalid location '{}', expected path:line or path:line:col",
            at
        ))
    })
}

/// Build a [`CodeAction`] from its public name and the option flags.
///
/// Rejected at the boundary when the name is unknown or a required option
/// is missing, so tag and payload can never disagree.
pub fn build_action(
    action: &str,
    name: Option<&str>,
    annotation: Option<&str>,
    context_name: Option<&str>,
) -> CursorResult<CodeAction> {
    let need_name = |field: &str| {
        name.map(str::to_string).ok_or_else(|| {
            CursorError::invalid_args(format!("action '{}' requires --{}", action, field))
        })
    };
    match action {
        "extractVariable" => Ok(CodeAction::ExtractVariable {
            name: need_name("name")?,
        }),
        "extractFunction" => Ok(CodeAction::ExtractFunction {
            name: need_name("name")?,
        }),
        "inlineVariable" => Ok(CodeAction::InlineVariable),
        "renameSymbol" => Ok(CodeAction::RenameSymbol {
            new_name: need_name("name")?,
        }),
        "organizeImports" => Ok(CodeAction::OrganizeImports),
        "fixAllLintProblems" => Ok(CodeAction::FixAllLintProblems),
        "convertToArrowFunction" => Ok(CodeAction::ConvertToArrowFunction),
        "wrapWithTryCatch" => Ok(CodeAction::WrapWithTryCatch),
        "addTypeAnnotation" => {
            let annotation = annotation.map(str::to_string).ok_or_else(|| {
                CursorError::invalid_args("action 'addTypeAnnotation' requires --annotation")
            })?;
            Ok(CodeAction::AddTypeAnnotation { annotation })
        }
        "convertToServerComponent" => Ok(CodeAction::ConvertToServerComponent),
        "convertToClientComponent" => Ok(CodeAction::ConvertToClientComponent),
        "extractToCustomHook" => Ok(CodeAction::ExtractToCustomHook {
            name: need_name("name")?,
        }),
        "convertToTypeScript" => Ok(CodeAction::ConvertToTypeScript),
        "refactorToUseReducer" => Ok(CodeAction::RefactorToUseReducer),
        "refactorToContextAPI" => {
            let context_name = context_name.map(str::to_string).ok_or_else(|| {
                CursorError::invalid_args("action 'refactorToContextAPI' requires --context-name")
            })?;
            Ok(CodeAction::RefactorToContextApi { context_name })
        }
        "optimizeImports" => Ok(CodeAction::OptimizeImports),
        "extractToSharedComponent" => Ok(CodeAction::ExtractToSharedComponent {
            name: need_name("name")?,
        }),
        other => Err(CursorError::invalid_args(format!(
            "unknown action '{}'",
            other
        ))),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use caret_core::error::OutputErrorCode;

    mod locations {
        use super::*;

        #[test]
        fn valid_locations_parse() {
            let pos = parse_location("src/app.tsx:12:4").unwrap();
            assert_eq!(pos.file_path, "src/app.tsx");
            assert_eq!(pos.line, 12);
            assert_eq!(pos.column, Some(4));
        }

        #[test]
        fn invalid_location_is_invalid_arguments() {
            let err = parse_location("src/app.tsx").unwrap_err();
            assert_eq!(err.error_code(), OutputErrorCode::InvalidArguments);
        }
    }

    mod action_building {
        use super::*;

        #[test]
        fn actions_with_options_build() {
            let action = build_action("extractVariable", Some("total"), None, None).unwrap();
            assert_eq!(
                action,
                CodeAction::ExtractVariable {
                    name: "total".to_string()
                }
            );
            let action = build_action("addTypeAnnotation", None, Some("number"), None).unwrap();
            assert_eq!(
                action,
                CodeAction::AddTypeAnnotation {
                    annotation: "number".to_string()
                }
            );
        }

        #[test]
        fn missing_required_option_is_rejected() {
            let err = build_action("renameSymbol", None, None, None).unwrap_err();
            assert_eq!(err.error_code(), OutputErrorCode::InvalidArguments);
            assert!(err.to_string().contains("--name"));
        }

        #[test]
        fn unknown_action_is_rejected() {
            let err = build_action("levitate", None, None, None).unwrap_err();
            assert_eq!(err.error_code(), OutputErrorCode::InvalidArguments);
        }

        #[test]
        fn every_documented_action_name_resolves() {
            for name in [
                "inlineVariable",
                "organizeImports",
                "fixAllLintProblems",
                "convertToArrowFunction",
                "wrapWithTryCatch",
                "convertToServerComponent",
                "convertToClientComponent",
                "convertToTypeScript",
                "refactorToUseReducer",
                "optimizeImports",
            ] {
                assert!(build_action(name, None, None, None).is_ok(), "{}", name);
            }
        }
    }
}
