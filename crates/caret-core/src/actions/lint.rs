//! Mechanical lint fixes applied file-wide.

use crate::actions::{ActionContext, ActionPlan};
use crate::buffer::LineEdit;
use crate::error::CursorResult;

/// Apply the fixed battery of mechanical fixes across the whole file:
/// trailing whitespace, `var` bindings, loose equality, and statements that
/// only log debug output.
///
/// File-scoped by design. Returns `Ok(None)` when the file is already clean.
pub fn fix_all_lint_problems(ctx: &ActionContext<'_>) -> CursorResult<Option<ActionPlan>> {
    let mut writes = Vec::new();
    let mut deletes = Vec::new();

    for (idx, line) in ctx.lines.iter().enumerate() {
        let line_no = idx as u32 + 1;
        let original = line.as_ref();

        if is_debug_only_line(original) && ctx.lines.len() > 1 {
            deletes.push(line_no);
            continue;
        }

        let mut fixed = original.trim_end().to_string();
        fixed = fix_var_binding(&fixed);
        fixed = fix_loose_equality(&fixed);
        if fixed != original {
            writes.push(LineEdit::Write {
                line: line_no,
                text: fixed,
            });
        }
    }

    if writes.is_empty() && deletes.is_empty() {
        return Ok(None);
    }
    let fixed = writes.len();
    let removed = deletes.len();
    let mut edits = writes;
    edits.extend(deletes.into_iter().rev().map(|line| LineEdit::Delete { line }));
    Ok(Some(ActionPlan {
        edits,
        summary: format!("fixed {} line(s), removed {} debug line(s)", fixed, removed),
    }))
}

fn is_debug_only_line(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.starts_with("console.log(") && trimmed.ends_with(';')
}

fn fix_var_binding(line: &str) -> String {
    let trimmed = line.trim_start();
    if let Some(rest) = trimmed.strip_prefix("var ") {
        let indent = &line[..line.len() - trimmed.len()];
        return format!("{}let {}", indent, rest);
    }
    line.to_string()
}

/// Promote `==`/`!=` to strict equality without touching existing strict
/// operators or relational comparisons.
fn fix_loose_equality(line: &str) -> String {
    const STRICT_EQ: &str = "\u{1}SE\u{1}";
    const STRICT_NE: &str = "\u{1}SN\u{1}";
    const LE: &str = "\u{1}LE\u{1}";
    const GE: &str = "\u{1}GE\u{1}";
    const ARROW: &str = "\u{1}AR\u{1}";

    line.replace("===", STRICT_EQ)
        .replace("!==", STRICT_NE)
        .replace("<=", LE)
        .replace(">=", GE)
        .replace("=>", ARROW)
        .replace("==", "===")
        .replace("!=", "!==")
        .replace(STRICT_EQ, "===")
        .replace(STRICT_NE, "!==")
        .replace(LE, "<=")
        .replace(GE, ">=")
        .replace(ARROW, "=>")
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Position;
    use std::sync::Arc;

    fn lines(src: &[&str]) -> Vec<Arc<str>> {
        src.iter().map(|s| Arc::from(*s)).collect()
    }

    fn plan_for(src: &[&str]) -> Option<ActionPlan> {
        let src = lines(src);
        let pos = Position::new("a.ts", 1);
        let ctx = ActionContext {
            lines: &src,
            tree: None,
            node: None,
            position: &pos,
            imports: &[],
        };
        fix_all_lint_problems(&ctx).unwrap()
    }

    #[test]
    fn fixes_var_equality_and_trailing_whitespace() {
        let plan = plan_for(&["var x = 1;   ", "if (x == 1) { }"]).unwrap();
        assert_eq!(
            plan.edits,
            vec![
                LineEdit::Write {
                    line: 1,
                    text: "let x = 1;".to_string(),
                },
                LineEdit::Write {
                    line: 2,
                    text: "if (x === 1) { }".to_string(),
                },
            ]
        );
    }

    #[test]
    fn strict_operators_left_alone() {
        assert_eq!(fix_loose_equality("a === b && c !== d"), "a === b && c !== d");
        assert_eq!(fix_loose_equality("a <= b || c >= d"), "a <= b || c >= d");
        assert_eq!(fix_loose_equality("const f = () => 1"), "const f = () => 1");
        assert_eq!(fix_loose_equality("a == b"), "a === b");
        assert_eq!(fix_loose_equality("a != b"), "a !== b");
    }

    #[test]
    fn debug_only_lines_deleted() {
        let plan = plan_for(&["console.log('here');", "work();"]).unwrap();
        assert_eq!(plan.edits, vec![LineEdit::Delete { line: 1 }]);
    }

    #[test]
    fn clean_file_does_not_apply() {
        assert!(plan_for(&["const x = 1;", "use(x);"]).is_none());
    }
}
