//! Conversion actions: function style, error handling, annotations, and
//! framework-directive rewrites.

use std::sync::OnceLock;

use regex::Regex;

use crate::actions::{target_statement_range, ActionContext, ActionPlan};
use crate::buffer::LineEdit;
use crate::error::CursorResult;
use crate::ident;
use crate::navigate;
use crate::text;

fn function_decl_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^(\s*)(export\s+)?(async\s+)?function\s+([A-Za-z_$][A-Za-z0-9_$]*)\s*\(([^)]*)\)\s*\{(.*)$",
        )
        .expect("static regex")
    })
}

fn use_state_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"^(\s*)const\s*\[\s*([A-Za-z_$][A-Za-z0-9_$]*)\s*,\s*(set[A-Za-z0-9_$]*)\s*\]\s*=\s*useState\s*\((.*)\)\s*;?\s*$",
        )
        .expect("static regex")
    })
}

fn binding_head_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(\s*(?:const|let|var)\s+[A-Za-z_$][A-Za-z0-9_$]*)(\s*=)").expect("static regex")
    })
}

const CLIENT_DIRECTIVES: [&str; 2] = ["'use client';", "\"use client\";"];

// ============================================================================
// Function Style
// ============================================================================

/// Rewrite `function name(args) {` as `const name = (args) => {`.
pub fn to_arrow_function(ctx: &ActionContext<'_>) -> CursorResult<Option<ActionPlan>> {
    let (line_no, line_text) = declaration_line(ctx);
    let Some(caps) = function_decl_re().captures(&line_text) else {
        return Ok(None);
    };
    let indent = &caps[1];
    let export = caps.get(2).map(|m| m.as_str()).unwrap_or("");
    let is_async = caps.get(3).map(|m| m.as_str()).unwrap_or("");
    let name = &caps[4];
    let params = &caps[5];
    let rest = &caps[6];
    let text = format!(
        "{}{}const {} = {}({}) => {{{}",
        indent, export, name, is_async, params, rest
    );
    Ok(Some(ActionPlan {
        edits: vec![LineEdit::Write {
            line: line_no,
            text,
        }],
        summary: format!("converted function {} to arrow style", name),
    }))
}

/// Annotate untyped parameters of the function under the cursor.
pub fn to_typescript(ctx: &ActionContext<'_>) -> CursorResult<Option<ActionPlan>> {
    let (line_no, line_text) = declaration_line(ctx);
    let Some(caps) = function_decl_re().captures(&line_text) else {
        return Ok(None);
    };
    let params = caps[5].to_string();
    if params.trim().is_empty() {
        return Ok(None);
    }
    let annotated: Vec<String> = params
        .split(',')
        .map(|p| annotate_param(p.trim()))
        .collect();
    let annotated = annotated.join(", ");
    if annotated == params.trim() {
        return Ok(None);
    }
    let range = caps.get(5).expect("params group present").range();
    let text = format!(
        "{}{}{}",
        &line_text[..range.start],
        annotated,
        &line_text[range.end..]
    );
    Ok(Some(ActionPlan {
        edits: vec![LineEdit::Write {
            line: line_no,
            text,
        }],
        summary: "annotated untyped parameters".to_string(),
    }))
}

fn annotate_param(param: &str) -> String {
    if param.contains(':') || param.is_empty() {
        return param.to_string();
    }
    match param.split_once('=') {
        Some((name, default)) => format!("{}: any = {}", name.trim(), default.trim()),
        None => format!("{}: any", param),
    }
}

/// The function declaration line the cursor targets: the first line of the
/// enclosing function node, or the current line in line-only mode.
fn declaration_line(ctx: &ActionContext<'_>) -> (u32, String) {
    if let (Some(tree), Some(node)) = (ctx.tree, ctx.node) {
        if let Some(func) = tree.ancestor_or_self(node, |n| navigate::is_function_kind(&n.kind)) {
            let (start, _) = text::span_to_line_range(ctx.lines, tree.span(func));
            if let Some(line) = ctx.lines.get(start as usize - 1) {
                return (start, line.as_ref().to_string());
            }
        }
    }
    (ctx.position.line, ctx.current_line().to_string())
}

// ============================================================================
// Error Handling
// ============================================================================

/// Wrap the statement(s) under the cursor in a try/catch block.
pub fn wrap_with_try_catch(ctx: &ActionContext<'_>) -> CursorResult<Option<ActionPlan>> {
    let (start, end) = target_statement_range(ctx);
    let Some(first) = ctx.lines.get(start as usize - 1) else {
        return Ok(None);
    };
    if first.as_ref().trim().is_empty() {
        return Ok(None);
    }
    let indent = text::leading_indent(first.as_ref()).to_string();

    let mut edits = Vec::new();
    for n in start..=end {
        if let Some(line) = ctx.lines.get(n as usize - 1) {
            edits.push(LineEdit::Write {
                line: n,
                text: format!("  {}", line.as_ref()),
            });
        }
    }
    edits.push(LineEdit::InsertAbove {
        line: start,
        text: format!("{}try {{", indent),
    });
    // The body shifted down by one; close below its new last line.
    let body_end = end + 1;
    edits.push(LineEdit::InsertBelow {
        line: body_end,
        text: format!("{}}} catch (err) {{", indent),
    });
    edits.push(LineEdit::InsertBelow {
        line: body_end + 1,
        text: format!("{}  throw err;", indent),
    });
    edits.push(LineEdit::InsertBelow {
        line: body_end + 2,
        text: format!("{}}}", indent),
    });
    Ok(Some(ActionPlan {
        edits,
        summary: format!("wrapped lines {}-{} in try/catch", start, end),
    }))
}

// ============================================================================
// Annotations
// ============================================================================

/// Add a type annotation to the binding declared on the current line.
pub fn add_type_annotation(
    ctx: &ActionContext<'_>,
    annotation: &str,
) -> CursorResult<Option<ActionPlan>> {
    if annotation.trim().is_empty() {
        return Ok(None);
    }
    let line_no = ctx.position.line;
    let line_text = ctx.current_line().to_string();
    if line_text.contains(':') {
        return Ok(None);
    }
    let Some(caps) = binding_head_re().captures(&line_text) else {
        return Ok(None);
    };
    let head_end = caps.get(1).expect("head group present").end();
    let text = format!(
        "{}: {}{}",
        &line_text[..head_end],
        annotation.trim(),
        &line_text[head_end..]
    );
    Ok(Some(ActionPlan {
        edits: vec![LineEdit::Write {
            line: line_no,
            text,
        }],
        summary: format!("annotated binding with {}", annotation.trim()),
    }))
}

// ============================================================================
// Framework Directives
// ============================================================================

/// Whether the cursor's node covers the module head, so directive edits stay
/// inside the node's range.
fn at_module_level(ctx: &ActionContext<'_>) -> bool {
    match (ctx.tree, ctx.node) {
        (Some(tree), Some(node)) => navigate::is_module_scope(tree.kind(node)),
        _ => ctx.position.line == 1,
    }
}

/// Add the `'use client';` directive at the top of the module.
pub fn to_client_component(ctx: &ActionContext<'_>) -> CursorResult<Option<ActionPlan>> {
    if !at_module_level(ctx) {
        return Ok(None);
    }
    let already = ctx
        .lines
        .iter()
        .any(|l| CLIENT_DIRECTIVES.contains(&l.as_ref().trim()));
    if already {
        return Ok(None);
    }
    Ok(Some(ActionPlan {
        edits: vec![LineEdit::InsertAbove {
            line: 1,
            text: "'use client';".to_string(),
        }],
        summary: "added client directive".to_string(),
    }))
}

/// Remove the `'use client';` directive from the module.
pub fn to_server_component(ctx: &ActionContext<'_>) -> CursorResult<Option<ActionPlan>> {
    if !at_module_level(ctx) {
        return Ok(None);
    }
    let directive = ctx
        .lines
        .iter()
        .position(|l| CLIENT_DIRECTIVES.contains(&l.as_ref().trim()));
    let Some(idx) = directive else {
        return Ok(None);
    };
    Ok(Some(ActionPlan {
        edits: vec![LineEdit::Delete {
            line: idx as u32 + 1,
        }],
        summary: "removed client directive".to_string(),
    }))
}

/// Replace a `useState` binding with a reducer scaffold.
pub fn to_use_reducer(ctx: &ActionContext<'_>) -> CursorResult<Option<ActionPlan>> {
    let line_no = ctx.position.line;
    let line_text = ctx.current_line().to_string();
    let Some(caps) = use_state_re().captures(&line_text) else {
        return Ok(None);
    };
    let indent = caps[1].to_string();
    let state = caps[2].to_string();
    let init = caps[4].to_string();

    let decl = format!(
        "{}const [{}, dispatch] = useReducer({}Reducer, {});",
        indent, state, state, init
    );
    let scaffold = [
        format!("{}function {}Reducer(state, action) {{", indent, state),
        format!("{}  switch (action.type) {{", indent),
        format!("{}    default:", indent),
        format!("{}      return state;", indent),
        format!("{}  }}", indent),
        format!("{}}}", indent),
    ];

    let mut edits = vec![LineEdit::Write {
        line: line_no,
        text: decl,
    }];
    for (k, text) in scaffold.into_iter().enumerate() {
        edits.push(LineEdit::InsertAbove {
            line: line_no + k as u32,
            text,
        });
    }
    Ok(Some(ActionPlan {
        edits,
        summary: format!("converted useState '{}' to useReducer", state),
    }))
}

/// Replace a `useState` binding with context access.
pub fn to_context_api(
    ctx: &ActionContext<'_>,
    context_name: &str,
) -> CursorResult<Option<ActionPlan>> {
    ident::validate_identifier(context_name)?;
    let line_no = ctx.position.line;
    let line_text = ctx.current_line().to_string();
    let Some(caps) = use_state_re().captures(&line_text) else {
        return Ok(None);
    };
    let indent = caps[1].to_string();
    let state = caps[2].to_string();
    let setter = caps[3].to_string();

    let decl = format!(
        "{}const {{ {}, {} }} = useContext({});",
        indent, state, setter, context_name
    );
    let edits = vec![
        LineEdit::Write {
            line: line_no,
            text: decl,
        },
        LineEdit::InsertAbove {
            line: line_no,
            text: format!("{}const {} = createContext(null);", indent, context_name),
        },
    ];
    Ok(Some(ActionPlan {
        edits,
        summary: format!("converted useState '{}' to context access", state),
    }))
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

    fn ctx<'a>(lines: &'a [Arc<str>], pos: &'a Position) -> ActionContext<'a> {
        ActionContext {
            lines,
            tree: None,
            node: None,
            position: pos,
            imports: &[],
        }
    }

    mod arrow_function {
        use super::*;

        #[test]
        fn plain_function_converts() {
            let src = lines(&["function add(a, b) { return a + b; }"]);
            let pos = Position::new("a.ts", 1);
            let plan = to_arrow_function(&ctx(&src, &pos)).unwrap().unwrap();
            assert_eq!(
                plan.edits,
                vec![LineEdit::Write {
                    line: 1,
                    text: "const add = (a, b) => { return a + b; }".to_string(),
                }]
            );
        }

        #[test]
        fn async_and_export_preserved() {
            let src = lines(&["export async function load(id) {"]);
            let pos = Position::new("a.ts", 1);
            let plan = to_arrow_function(&ctx(&src, &pos)).unwrap().unwrap();
            assert_eq!(
                plan.edits,
                vec![LineEdit::Write {
                    line: 1,
                    text: "export const load = async (id) => {".to_string(),
                }]
            );
        }

        #[test]
        fn non_function_line_does_not_apply() {
            let src = lines(&["const x = 1;"]);
            let pos = Position::new("a.ts", 1);
            assert!(to_arrow_function(&ctx(&src, &pos)).unwrap().is_none());
        }
    }

    mod try_catch {
        use super::*;

        #[test]
        fn wraps_single_statement() {
            let src = lines(&["  await save(data);"]);
            let pos = Position::new("a.ts", 1);
            let plan = wrap_with_try_catch(&ctx(&src, &pos)).unwrap().unwrap();
            assert_eq!(
                plan.edits,
                vec![
                    LineEdit::Write {
                        line: 1,
                        text: "    await save(data);".to_string(),
                    },
                    LineEdit::InsertAbove {
                        line: 1,
                        text: "  try {".to_string(),
                    },
                    LineEdit::InsertBelow {
                        line: 2,
                        text: "  } catch (err) {".to_string(),
                    },
                    LineEdit::InsertBelow {
                        line: 3,
                        text: "    throw err;".to_string(),
                    },
                    LineEdit::InsertBelow {
                        line: 4,
                        text: "  }".to_string(),
                    },
                ]
            );
        }
    }

    mod annotations {
        use super::*;

        #[test]
        fn annotates_untyped_binding() {
            let src = lines(&["const count = 0;"]);
            let pos = Position::new("a.ts", 1);
            let plan = add_type_annotation(&ctx(&src, &pos), "number")
                .unwrap()
                .unwrap();
            assert_eq!(
                plan.edits,
                vec![LineEdit::Write {
                    line: 1,
                    text: "const count: number = 0;".to_string(),
                }]
            );
        }

        #[test]
        fn already_annotated_does_not_apply() {
            let src = lines(&["const count: number = 0;"]);
            let pos = Position::new("a.ts", 1);
            assert!(add_type_annotation(&ctx(&src, &pos), "number")
                .unwrap()
                .is_none());
        }

        #[test]
        fn typescript_conversion_annotates_params() {
            let src = lines(&["function add(a, b = 1) { return a + b; }"]);
            let pos = Position::new("a.ts", 1);
            let plan = to_typescript(&ctx(&src, &pos)).unwrap().unwrap();
            assert_eq!(
                plan.edits,
                vec![LineEdit::Write {
                    line: 1,
                    text: "function add(a: any, b: any = 1) { return a + b; }".to_string(),
                }]
            );
        }
    }

    mod directives {
        use super::*;

        #[test]
        fn client_directive_added_once() {
            let src = lines(&["export function Page() {}"]);
            let pos = Position::new("page.tsx", 1);
            let plan = to_client_component(&ctx(&src, &pos)).unwrap().unwrap();
            assert_eq!(
                plan.edits,
                vec![LineEdit::InsertAbove {
                    line: 1,
                    text: "'use client';".to_string(),
                }]
            );

            let src = lines(&["'use client';", "export function Page() {}"]);
            assert!(to_client_component(&ctx(&src, &pos)).unwrap().is_none());
        }

        #[test]
        fn server_conversion_removes_directive() {
            let src = lines(&["'use client';", "export function Page() {}"]);
            let pos = Position::new("page.tsx", 1);
            let plan = to_server_component(&ctx(&src, &pos)).unwrap().unwrap();
            assert_eq!(plan.edits, vec![LineEdit::Delete { line: 1 }]);
        }

        #[test]
        fn reducer_conversion_scaffolds_reducer() {
            let src = lines(&["  const [count, setCount] = useState(0);"]);
            let pos = Position::new("page.tsx", 1);
            let plan = to_use_reducer(&ctx(&src, &pos)).unwrap().unwrap();
            assert_eq!(plan.edits.len(), 7);
            assert_eq!(
                plan.edits[0],
                LineEdit::Write {
                    line: 1,
                    text: "  const [count, dispatch] = useReducer(countReducer, 0);".to_string(),
                }
            );
        }

        #[test]
        fn context_conversion_requires_use_state() {
            let src = lines(&["const x = 1;"]);
            let pos = Position::new("page.tsx", 1);
            assert!(to_context_api(&ctx(&src, &pos), "AppContext")
                .unwrap()
                .is_none());
        }
    }
}
