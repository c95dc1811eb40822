//! Disk-backed file store for the CLI.
//!
//! Paths are resolved relative to a workspace root. Reading splits on `\n`
//! and drops a final empty segment from a trailing newline; writing joins
//! with `\n` and restores the trailing newline, so read/modify/write cycles
//! do not churn line endings.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use caret_core::error::{CursorError, CursorResult};
use caret_core::provider::FileStore;
use walkdir::WalkDir;

/// Extensions the CLI treats as source files when listing a workspace.
const SOURCE_EXTENSIONS: [&str; 6] = ["ts", "tsx", "js", "jsx", "mjs", "cjs"];

/// File store over a workspace directory on disk.
#[derive(Debug, Clone)]
pub struct DiskFileStore {
    root: PathBuf,
}

impl DiskFileStore {
    /// Create a store rooted at a workspace directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DiskFileStore { root: root.into() }
    }

    /// Workspace root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let p = Path::new(path);
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            self.root.join(p)
        }
    }

    /// Source files under the root, workspace-relative, sorted for
    /// deterministic output.
    pub fn list_source_files(&self) -> Vec<String> {
        let mut files: Vec<String> = WalkDir::new(&self.root)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter(|entry| {
                entry
                    .path()
                    .extension()
                    .and_then(|e| e.to_str())
                    .map(|e| SOURCE_EXTENSIONS.contains(&e))
                    .unwrap_or(false)
            })
            .filter_map(|entry| {
                entry
                    .path()
                    .strip_prefix(&self.root)
                    .ok()
                    .map(|p| p.to_string_lossy().into_owned())
            })
            .collect();
        files.sort();
        files
    }
}

impl FileStore for DiskFileStore {
    fn read_lines(&self, path: &str) -> CursorResult<Vec<String>> {
        let full = self.resolve(path);
        let content = fs::read_to_string(&full).map_err(|err| {
            if err.kind() == io::ErrorKind::NotFound {
                CursorError::file_not_found(path)
            } else {
                CursorError::Io(err)
            }
        })?;
        let mut lines: Vec<String> = content.split('\n').map(str::to_string).collect();
        if content.ends_with('\n') {
            lines.pop();
        }
        Ok(lines)
    }

    fn write_lines(&self, path: &str, lines: &[String]) -> CursorResult<()> {
        let full = self.resolve(path);
        let mut content = lines.join("\n");
        content.push('\n');
        fs::write(&full, content).map_err(CursorError::Io)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn workspace() -> TempDir {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("app.ts"), "const x = 1;\nuse(x);\n").unwrap();
        fs::write(dir.path().join("notes.md"), "not source\n").unwrap();
        dir
    }

    #[test]
    fn read_drops_trailing_newline_segment() {
        let dir = workspace();
        let store = DiskFileStore::new(dir.path());
        let lines = store.read_lines("app.ts").unwrap();
        assert_eq!(lines, vec!["const x = 1;", "use(x);"]);
    }

    #[test]
    fn write_restores_trailing_newline() {
        let dir = workspace();
        let store = DiskFileStore::new(dir.path());
        store
            .write_lines("app.ts", &["one".to_string(), "two".to_string()])
            .unwrap();
        let raw = fs::read_to_string(dir.path().join("app.ts")).unwrap();
        assert_eq!(raw, "one\ntwo\n");
    }

    #[test]
    fn missing_file_is_file_not_found() {
        let dir = workspace();
        let store = DiskFileStore::new(dir.path());
        let err = store.read_lines("absent.ts").unwrap_err();
        assert!(matches!(err, CursorError::FileNotFound { .. }));
    }

    #[test]
    fn listing_filters_to_source_extensions() {
        let dir = workspace();
        let store = DiskFileStore::new(dir.path());
        assert_eq!(store.list_source_files(), vec!["app.ts"]);
    }
}
