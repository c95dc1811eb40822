//! Extraction actions: expression to binding, statements to function, hook,
//! or shared component.

use std::sync::OnceLock;

use regex::Regex;

use crate::actions::{ActionContext, ActionPlan};
use crate::buffer::LineEdit;
use crate::error::CursorResult;
use crate::ident;
use crate::text;

fn hook_call_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\buse[A-Z][A-Za-z0-9_]*\s*\(").expect("static regex"))
}

fn is_expression_kind(kind: &str) -> bool {
    kind.ends_with("_expression") || matches!(kind, "string" | "number" | "template_string")
}

// ============================================================================
// Extract Variable
// ============================================================================

/// Extract the expression under the cursor into `const <name> = ...;`
/// inserted directly above the statement.
///
/// Precondition: the cursor resolves to an expression node confined to a
/// single line.
pub fn extract_variable(ctx: &ActionContext<'_>, name: &str) -> CursorResult<Option<ActionPlan>> {
    ident::validate_identifier(name)?;
    let (Some(tree), Some(node)) = (ctx.tree, ctx.node) else {
        return Ok(None);
    };
    let Some(expr) = tree.ancestor_or_self(node, |n| is_expression_kind(&n.kind)) else {
        return Ok(None);
    };
    let span = tree.span(expr);
    let (start_line, end_line) = text::span_to_line_range(ctx.lines, span);
    if start_line != end_line {
        return Ok(None);
    }

    let line_text = ctx
        .lines
        .get(start_line as usize - 1)
        .map(|l| l.as_ref().to_string())
        .unwrap_or_default();
    let Some(line_start) = text::line_start_offset(ctx.lines, start_line) else {
        return Ok(None);
    };
    let rel_start = span.start - line_start;
    let rel_end = span.end - line_start;
    if rel_end > line_text.len() {
        return Ok(None);
    }
    let expr_text = line_text[rel_start..rel_end].to_string();
    let indent = text::leading_indent(&line_text).to_string();

    let replaced = format!(
        "{}{}{}",
        &line_text[..rel_start],
        name,
        &line_text[rel_end..]
    );
    let edits = vec![
        LineEdit::Write {
            line: start_line,
            text: replaced,
        },
        LineEdit::InsertAbove {
            line: start_line,
            text: format!("{}const {} = {};", indent, name, expr_text),
        },
    ];
    Ok(Some(ActionPlan {
        edits,
        summary: format!("extracted '{}' into const {}", expr_text, name),
    }))
}

// ============================================================================
// Extract Function / Hook / Component
// ============================================================================

/// Replace lines `start..=end` with `call_line` and insert `def_lines`
/// directly below it.
fn replace_block(
    start: u32,
    end: u32,
    call_line: String,
    def_lines: Vec<String>,
) -> Vec<LineEdit> {
    let mut edits = vec![LineEdit::Write {
        line: start,
        text: call_line,
    }];
    for _ in start..end {
        edits.push(LineEdit::Delete { line: start + 1 });
    }
    for (k, text) in def_lines.into_iter().enumerate() {
        edits.push(LineEdit::InsertBelow {
            line: start + k as u32,
            text,
        });
    }
    edits
}

fn block_lines(ctx: &ActionContext<'_>, start: u32, end: u32) -> Vec<String> {
    (start..=end)
        .filter_map(|n| ctx.lines.get(n as usize - 1))
        .map(|l| l.as_ref().to_string())
        .collect()
}

/// Extract the statement(s) under the cursor into a named function declared
/// below the call site.
pub fn extract_function(ctx: &ActionContext<'_>, name: &str) -> CursorResult<Option<ActionPlan>> {
    ident::validate_identifier(name)?;
    let Some((start, end)) = statement_target(ctx) else {
        return Ok(None);
    };
    let body = block_lines(ctx, start, end);
    let indent = body
        .first()
        .map(|l| text::leading_indent(l).to_string())
        .unwrap_or_default();

    let mut def_lines = vec![format!("{}function {}() {{", indent, name)];
    def_lines.extend(body.iter().map(|l| format!("  {}", l)));
    def_lines.push(format!("{}}}", indent));

    let edits = replace_block(start, end, format!("{}{}();", indent, name), def_lines);
    Ok(Some(ActionPlan {
        edits,
        summary: format!(
            "extracted lines {}-{} into function {}",
            start, end, name
        ),
    }))
}

/// Extract hook-calling statements into a custom hook.
///
/// Precondition: the name follows the hook convention (`useX`) and the
/// extracted block actually calls a hook.
pub fn extract_to_custom_hook(
    ctx: &ActionContext<'_>,
    name: &str,
) -> CursorResult<Option<ActionPlan>> {
    ident::validate_identifier(name)?;
    let follows_convention = name
        .strip_prefix("use")
        .and_then(|rest| rest.chars().next())
        .is_some_and(|c| c.is_uppercase());
    if !follows_convention {
        return Ok(None);
    }
    let Some((start, end)) = statement_target(ctx) else {
        return Ok(None);
    };
    let body = block_lines(ctx, start, end);
    if !body.iter().any(|l| hook_call_re().is_match(l)) {
        return Ok(None);
    }
    let indent = body
        .first()
        .map(|l| text::leading_indent(l).to_string())
        .unwrap_or_default();

    let mut def_lines = vec![format!("{}function {}() {{", indent, name)];
    def_lines.extend(body.iter().map(|l| format!("  {}", l)));
    def_lines.push(format!("{}}}", indent));

    let edits = replace_block(start, end, format!("{}{}();", indent, name), def_lines);
    Ok(Some(ActionPlan {
        edits,
        summary: format!("extracted lines {}-{} into hook {}", start, end, name),
    }))
}

/// Extract the JSX element under the cursor into a component declared below
/// its use site.
pub fn extract_to_shared_component(
    ctx: &ActionContext<'_>,
    name: &str,
) -> CursorResult<Option<ActionPlan>> {
    ident::validate_identifier(name)?;
    if !name.chars().next().is_some_and(|c| c.is_uppercase()) {
        return Ok(None);
    }
    let (Some(tree), Some(node)) = (ctx.tree, ctx.node) else {
        return Ok(None);
    };
    let Some(element) = tree.ancestor_or_self(node, |n| n.kind.starts_with("jsx")) else {
        return Ok(None);
    };
    let (start, end) = text::span_to_line_range(ctx.lines, tree.span(element));
    let body = block_lines(ctx, start, end);
    let indent = body
        .first()
        .map(|l| text::leading_indent(l).to_string())
        .unwrap_or_default();

    let mut def_lines = vec![
        format!("{}function {}() {{", indent, name),
        format!("{}  return (", indent),
    ];
    def_lines.extend(body.iter().map(|l| format!("    {}", l)));
    def_lines.push(format!("{}  );", indent));
    def_lines.push(format!("{}}}", indent));

    let edits = replace_block(start, end, format!("{}<{} />", indent, name), def_lines);
    Ok(Some(ActionPlan {
        edits,
        summary: format!("extracted lines {}-{} into component {}", start, end, name),
    }))
}

/// Statement target for extraction; requires a resolved statement node so
/// multi-line extraction never guesses at block boundaries.
fn statement_target(ctx: &ActionContext<'_>) -> Option<(u32, u32)> {
    let tree = ctx.tree?;
    let node = ctx.node?;
    let stmt = tree.ancestor_or_self(node, |n| crate::actions::is_statement_kind(&n.kind))?;
    Some(text::span_to_line_range(ctx.lines, tree.span(stmt)))
}

// ============================================================================
// Tests
// ============================================================================
