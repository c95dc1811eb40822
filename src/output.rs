//! JSON output envelopes and diff previews for the CLI.
//!
//! Every subcommand prints a single JSON object: `status`,
//! `schema_version`, a timestamp, and the command payload. Errors render
//! the same envelope shape with the stable error code from
//! [`OutputErrorCode`].

use caret_core::error::{CursorError, OutputErrorCode};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::json;

/// Schema version of the CLI output envelope.
pub const SCHEMA_VERSION: &str = "1.0";

/// Render a success envelope around a payload.
pub fn ok_envelope<T: Serialize>(payload: &T) -> String {
    let mut value = json!({
        "status": "ok",
        "schema_version": SCHEMA_VERSION,
        "generated_at": Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
    });
    if let (Some(map), Ok(serde_json::Value::Object(extra))) =
        (value.as_object_mut(), serde_json::to_value(payload))
    {
        for (k, v) in extra {
            map.insert(k, v);
        }
    }
    serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{\"status\":\"error\"}".to_string())
}

/// Render an error envelope; the caller exits with the embedded code.
pub fn error_envelope(err: &CursorError) -> (String, i32) {
    let code = OutputErrorCode::from(err);
    let value = json!({
        "status": "error",
        "schema_version": SCHEMA_VERSION,
        "generated_at": Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        "error": {
            "code": code.code(),
            "message": err.to_string(),
        },
    });
    (
        serde_json::to_string_pretty(&value)
            .unwrap_or_else(|_| "{\"status\":\"error\"}".to_string()),
        i32::from(code.code()),
    )
}

// ============================================================================
// Diff Preview
// ============================================================================

/// Generate a unified diff between two line buffers.
///
/// Trims the common prefix and suffix and emits a single hunk for the
/// changed middle, which is exactly the shape single-action previews need.
pub fn unified_diff(path: &str, before: &[String], after: &[String]) -> String {
    let mut prefix = 0usize;
    while prefix < before.len() && prefix < after.len() && before[prefix] == after[prefix] {
        prefix += 1;
    }
    let mut suffix = 0usize;
    while suffix < before.len() - prefix
        && suffix < after.len() - prefix
        && before[before.len() - 1 - suffix] == after[after.len() - 1 - suffix]
    {
        suffix += 1;
    }
    let removed = &before[prefix..before.len() - suffix];
    let added = &after[prefix..after.len() - suffix];
    if removed.is_empty() && added.is_empty() {
        return String::new();
    }

    let mut diff = String::new();
    diff.push_str(&format!("--- a/{}\n", path));
    diff.push_str(&format!("+++ b/{}\n", path));
    diff.push_str(&format!(
        "@@ -{},{} +{},{} @@\n",
        prefix + 1,
        removed.len(),
        prefix + 1,
        added.len()
    ));
    for line in removed {
        diff.push_str(&format!("-{}\n", line));
    }
    for line in added {
        diff.push_str(&format!("+{}\n", line));
    }
    diff
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Payload {
        found: bool,
    }

    #[test]
    fn ok_envelope_flattens_payload() {
        let rendered = ok_envelope(&Payload { found: true });
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value["status"], "ok");
        assert_eq!(value["schema_version"], SCHEMA_VERSION);
        assert_eq!(value["found"], true);
    }

    #[test]
    fn error_envelope_carries_stable_code() {
        let err = CursorError::out_of_range(9, 3);
        let (rendered, code) = error_envelope(&err);
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(code, 3);
        assert_eq!(value["error"]["code"], 3);
        assert!(value["error"]["message"]
            .as_str()
            .unwrap()
            .contains("out of range"));
    }

    mod diffs {
        use super::*;

        fn lines(src: &[&str]) -> Vec<String> {
            src.iter().map(|s| s.to_string()).collect()
        }

        #[test]
        fn single_line_change() {
            let diff = unified_diff("a.ts", &lines(&["x", "old", "z"]), &lines(&["x", "new", "z"]));
            assert!(diff.contains("--- a/a.ts"));
            assert!(diff.contains("@@ -2,1 +2,1 @@"));
            assert!(diff.contains("-old"));
            assert!(diff.contains("+new"));
        }

        #[test]
        fn insertion_produces_empty_removed_side() {
            let diff = unified_diff("a.ts", &lines(&["a", "b"]), &lines(&["a", "mid", "b"]));
            assert!(diff.contains("@@ -2,0 +2,1 @@"));
            assert!(diff.contains("+mid"));
            assert!(!diff.contains("\n-"));
        }

        #[test]
        fn identical_buffers_produce_empty_diff() {
            let diff = unified_diff("a.ts", &lines(&["same"]), &lines(&["same"]));
            assert!(diff.is_empty());
        }
    }
}
