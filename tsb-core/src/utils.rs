//! Shared utility functions.

use std::path::{Component, Path, PathBuf};

/// Convert a JSON value to the string substituted into builds and templates.
///
/// Returns `None` for `null`, which marks "no value".
pub fn value_to_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

/// Resolve `path` against `base` and normalize `.` and `..` lexically.
///
/// Absolute paths are returned normalized but otherwise unchanged. The
/// filesystem is never consulted, so the result is stable for paths that do
/// not exist yet (output directories, for instance).
pub fn resolve_path(base: &Path, path: impl AsRef<Path>) -> PathBuf {
    let path = path.as_ref();
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    };

    let mut normalized = PathBuf::new();
    for component in joined.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push(component);
                }
            }
            other => normalized.push(other),
        }
    }
    normalized
}
