//! Inline and rename actions.

use std::sync::OnceLock;

use regex::Regex;

use crate::actions::{ActionContext, ActionPlan};
use crate::buffer::LineEdit;
use crate::error::CursorResult;
use crate::ident;
use crate::navigate;
use crate::text;

fn binding_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(\s*)(?:const|let|var)\s+([A-Za-z_$][A-Za-z0-9_$]*)\s*=\s*(.+?);?\s*$")
            .expect("static regex")
    })
}

/// The 1-indexed line range of the scope the cursor sits in, falling back
/// to the whole file.
fn scope_line_range(ctx: &ActionContext<'_>) -> (u32, u32) {
    if let (Some(tree), Some(node)) = (ctx.tree, ctx.node) {
        if let Some(scope) = navigate::scope_of(tree, node) {
            return text::span_to_line_range(ctx.lines, tree.span(scope));
        }
    }
    (1, ctx.line_count())
}

// ============================================================================
// Inline Variable
// ============================================================================

/// Inline a single-use local binding into its use site and delete the
/// declaration.
///
/// Precondition: the current line declares a binding that is used exactly
/// once elsewhere in its scope.
pub fn inline_variable(ctx: &ActionContext<'_>) -> CursorResult<Option<ActionPlan>> {
    let decl_line = ctx.position.line;
    let line_text = ctx.current_line().to_string();
    let Some(caps) = binding_re().captures(&line_text) else {
        return Ok(None);
    };
    let name = caps[2].to_string();
    let init = caps[3].to_string();

    let (scope_start, scope_end) = scope_line_range(ctx);
    let mut use_line: Option<u32> = None;
    let mut uses = 0usize;
    for n in scope_start..=scope_end.min(ctx.line_count()) {
        if n == decl_line {
            continue;
        }
        let Some(line) = ctx.lines.get(n as usize - 1) else {
            continue;
        };
        let count = ident::count_word(line.as_ref(), &name);
        if count > 0 {
            uses += count;
            use_line.get_or_insert(n);
        }
    }
    let (Some(use_line), 1) = (use_line, uses) else {
        return Ok(None);
    };

    let replaced = ident::replace_word(
        ctx.lines[use_line as usize - 1].as_ref(),
        &name,
        &init,
    );
    let edits = vec![
        LineEdit::Write {
            line: use_line,
            text: replaced,
        },
        LineEdit::Delete { line: decl_line },
    ];
    Ok(Some(ActionPlan {
        edits,
        summary: format!("inlined '{}' into line {}", name, use_line),
    }))
}

// ============================================================================
// Rename Symbol
// ============================================================================

/// Rename the symbol under the cursor throughout its enclosing scope.
pub fn rename_symbol(ctx: &ActionContext<'_>, new_name: &str) -> CursorResult<Option<ActionPlan>> {
    ident::validate_identifier(new_name)?;
    let current = ctx.current_line();
    let symbol = ctx
        .position
        .column
        .and_then(|col| ident::word_at_column(current, col))
        .or_else(|| ident::declared_name(current))
        .or_else(|| ident::first_identifier(current));
    let Some(symbol) = symbol else {
        return Ok(None);
    };
    if symbol == new_name {
        return Ok(None);
    }

    let (scope_start, scope_end) = scope_line_range(ctx);
    let mut edits = Vec::new();
    let mut occurrences = 0usize;
    for n in scope_start..=scope_end.min(ctx.line_count()) {
        let Some(line) = ctx.lines.get(n as usize - 1) else {
            continue;
        };
        let count = ident::count_word(line.as_ref(), &symbol);
        if count == 0 {
            continue;
        }
        occurrences += count;
        edits.push(LineEdit::Write {
            line: n,
            text: ident::replace_word(line.as_ref(), &symbol, new_name),
        });
    }
    if edits.is_empty() {
        return Ok(None);
    }
    Ok(Some(ActionPlan {
        edits,
        summary: format!(
            "renamed '{}' to '{}' ({} occurrence(s))",
            symbol, new_name, occurrences
        ),
    }))
}

// ============================================================================
// Tests
// ============================================================================
