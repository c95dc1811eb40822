//! Import housekeeping: organize, optimize, add.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

use crate::actions::{ActionContext, ActionPlan};
use crate::buffer::LineEdit;
use crate::context::ImportReference;
use crate::error::CursorResult;
use crate::ident;
use crate::provider::ImportResolver;
use crate::tree::Span;

fn import_parts_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"^(\s*)import\s+(?:(.+?)\s+from\s+)?["']([^"']+)["']"#).expect("static regex")
    })
}

// ============================================================================
// Import Line Model
// ============================================================================

/// One import statement decomposed into its clause parts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct ImportParts {
    indent: String,
    default: Option<String>,
    named: Vec<String>,
    namespace: Option<String>,
    source: String,
}

fn parse_parts(line: &str) -> Option<ImportParts> {
    let caps = import_parts_re().captures(line)?;
    let mut parts = ImportParts {
        indent: caps[1].to_string(),
        source: caps[3].to_string(),
        ..ImportParts::default()
    };
    let Some(clause) = caps.get(2) else {
        return Some(parts);
    };
    let clause = clause.as_str();

    // Named group, if present.
    let mut outside = clause.to_string();
    if let (Some(open), Some(close)) = (clause.find('{'), clause.rfind('}')) {
        if open < close {
            for part in clause[open + 1..close].split(',') {
                let local = match part.rsplit_once(" as ") {
                    Some((_, alias)) => alias,
                    None => part,
                };
                if let Some(name) = ident::first_identifier(local) {
                    parts.named.push(name);
                }
            }
            outside = format!("{}{}", &clause[..open], &clause[close + 1..]);
        }
    }

    // Default and namespace bindings outside the braces.
    for part in outside.split(',') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        if let Some(rest) = part.strip_prefix('*') {
            let alias = rest.trim().strip_prefix("as").map(str::trim).unwrap_or("");
            if let Some(name) = ident::first_identifier(alias) {
                parts.namespace = Some(name);
            }
        } else if let Some(name) = ident::first_identifier(part) {
            parts.default = Some(name);
        }
    }
    Some(parts)
}

fn build_line(parts: &ImportParts) -> String {
    let mut clauses: Vec<String> = Vec::new();
    if let Some(default) = &parts.default {
        clauses.push(default.clone());
    }
    if let Some(ns) = &parts.namespace {
        clauses.push(format!("* as {}", ns));
    }
    if !parts.named.is_empty() {
        clauses.push(format!("{{ {} }}", parts.named.join(", ")));
    }
    if clauses.is_empty() {
        format!("{}import '{}';", parts.indent, parts.source)
    } else {
        format!(
            "{}import {} from '{}';",
            parts.indent,
            clauses.join(", "),
            parts.source
        )
    }
}

// ============================================================================
// Organize Imports
// ============================================================================

/// Reorder the leading import block: external sources first, then relative,
/// each sorted by source; exact duplicate lines collapse.
///
/// File-scoped by design: this action may touch lines away from the cursor.
pub fn organize_imports(ctx: &ActionContext<'_>) -> CursorResult<Option<ActionPlan>> {
    if ctx.imports.is_empty() {
        return Ok(None);
    }
    let first = ctx.imports[0].line;
    let block: Vec<&ImportReference> = ctx
        .imports
        .iter()
        .enumerate()
        .take_while(|(k, imp)| imp.line == first + *k as u32)
        .map(|(_, imp)| imp)
        .collect();
    let block_len = block.len() as u32;

    let mut entries: Vec<(bool, String, String)> = block
        .iter()
        .filter_map(|imp| {
            ctx.lines
                .get(imp.line as usize - 1)
                .map(|l| (imp.is_relative, imp.source.clone(), l.as_ref().to_string()))
        })
        .collect();

    let mut seen: HashSet<String> = HashSet::new();
    entries.retain(|(_, _, text)| seen.insert(text.clone()));
    entries.sort_by(|a, b| (a.0, &a.1).cmp(&(b.0, &b.1)));

    let mut edits = Vec::new();
    for (k, (_, _, text)) in entries.iter().enumerate() {
        let line = first + k as u32;
        if ctx.lines.get(line as usize - 1).map(|l| l.as_ref()) != Some(text.as_str()) {
            edits.push(LineEdit::Write {
                line,
                text: text.clone(),
            });
        }
    }
    // Duplicates shrank the block: drop the leftover tail lines.
    for line in (first + entries.len() as u32..first + block_len).rev() {
        edits.push(LineEdit::Delete { line });
    }
    if edits.is_empty() {
        return Ok(None);
    }
    Ok(Some(ActionPlan {
        edits,
        summary: format!("organized {} import(s)", entries.len()),
    }))
}

// ============================================================================
// Optimize Imports
// ============================================================================

/// Drop import symbols that are never referenced outside the import block;
/// an import left with no bindings is removed entirely. Side-effect imports
/// are preserved.
pub fn optimize_imports(ctx: &ActionContext<'_>) -> CursorResult<Option<ActionPlan>> {
    if ctx.imports.is_empty() {
        return Ok(None);
    }
    let import_lines: HashSet<u32> = ctx.imports.iter().map(|i| i.line).collect();
    let usage: String = ctx
        .lines
        .iter()
        .enumerate()
        .filter(|(idx, _)| !import_lines.contains(&(*idx as u32 + 1)))
        .map(|(_, l)| l.as_ref())
        .collect::<Vec<_>>()
        .join("\n");

    let mut writes = Vec::new();
    let mut deletes = Vec::new();
    for imp in ctx.imports {
        if imp.symbols.is_empty() {
            continue;
        }
        let Some(line_text) = ctx.lines.get(imp.line as usize - 1) else {
            continue;
        };
        let Some(parts) = parse_parts(line_text.as_ref()) else {
            continue;
        };
        let kept = ImportParts {
            indent: parts.indent.clone(),
            default: parts
                .default
                .clone()
                .filter(|d| ident::count_word(&usage, d) > 0),
            named: parts
                .named
                .iter()
                .filter(|n| ident::count_word(&usage, n) > 0)
                .cloned()
                .collect(),
            namespace: parts
                .namespace
                .clone()
                .filter(|n| ident::count_word(&usage, n) > 0),
            source: parts.source.clone(),
        };
        if kept == parts {
            continue;
        }
        if kept.default.is_none() && kept.named.is_empty() && kept.namespace.is_none() {
            deletes.push(imp.line);
        } else {
            writes.push(LineEdit::Write {
                line: imp.line,
                text: build_line(&kept),
            });
        }
    }
    if writes.is_empty() && deletes.is_empty() {
        return Ok(None);
    }
    let removed = deletes.len();
    let rewritten = writes.len();
    deletes.sort_unstable();
    let mut edits = writes;
    edits.extend(deletes.into_iter().rev().map(|line| LineEdit::Delete { line }));
    Ok(Some(ActionPlan {
        edits,
        summary: format!(
            "optimized imports ({} rewritten, {} removed)",
            rewritten, removed
        ),
    }))
}

// ============================================================================
// Add Import
// ============================================================================

/// Plan adding an import following project conventions.
///
/// Merges into an existing import of the same source when possible; returns
/// `Ok(None)` when every requested symbol is already imported.
pub fn plan_add_import(
    ctx: &ActionContext<'_>,
    resolver: &dyn ImportResolver,
    source: &str,
    symbols: &[String],
) -> CursorResult<Option<ActionPlan>> {
    for symbol in symbols {
        ident::validate_identifier(symbol)?;
    }

    if let Some(existing) = ctx.imports.iter().find(|i| i.source == source) {
        let new_symbols: Vec<String> = symbols
            .iter()
            .filter(|s| !existing.symbols.contains(s))
            .cloned()
            .collect();
        if new_symbols.is_empty() {
            return Ok(None);
        }
        let Some(line_text) = ctx.lines.get(existing.line as usize - 1) else {
            return Ok(None);
        };
        let Some(mut parts) = parse_parts(line_text.as_ref()) else {
            return Ok(None);
        };
        parts.named.extend(new_symbols.clone());
        return Ok(Some(ActionPlan {
            edits: vec![LineEdit::Write {
                line: existing.line,
                text: build_line(&parts),
            }],
            summary: format!("merged {} symbol(s) into import of '{}'", new_symbols.len(), source),
        }));
    }

    let candidate = ImportReference {
        source: source.to_string(),
        is_relative: source.starts_with('.') || source.starts_with('/'),
        symbols: symbols.to_vec(),
        range: Span::new(0, 0),
        line: 0,
    };
    let insert_at = resolver.insertion_point_for(&candidate, ctx.imports);
    let text = build_line(&ImportParts {
        indent: String::new(),
        default: None,
        named: symbols.to_vec(),
        namespace: None,
        source: source.to_string(),
    });
    let edit = if insert_at > ctx.line_count() {
        LineEdit::InsertBelow {
            line: ctx.line_count(),
            text,
        }
    } else {
        LineEdit::InsertAbove {
            line: insert_at.max(1),
            text,
        }
    };
    Ok(Some(ActionPlan {
        edits: vec![edit],
        summary: format!("added import of '{}'", source),
    }))
}

// ============================================================================
// Tests
// ============================================================================
