//! Lexical path helpers
//!
//! Report paths come from another machine's build as plain strings, so
//! nothing here touches the filesystem.

use std::path::{Component, Path, PathBuf};

/// Expand `~`, anchor relative paths at `from`, and normalize `.` / `..`.
pub fn resolve_path(path: &str, from: &Path) -> PathBuf {
    let expanded = shellexpand::tilde(path);
    let expanded = Path::new(expanded.as_ref());

    if expanded.is_absolute() {
        normalize_path(expanded)
    } else {
        normalize_path(&from.join(expanded))
    }
}

/// Remove `.` components and fold `..` into its parent without touching the
/// filesystem. `..` above the root is dropped.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => normalized.push(".."),
            },
            other => normalized.push(other.as_os_str()),
        }
    }

    normalized
}

/// Express `path` relative to the directory `to`, `/`-separated.
///
/// Returns an empty string when both are the same directory and a path
/// starting with `..` when `path` lies outside `to`.
///
/// ```
/// use std::path::Path;
/// use llvm_cov_xml::paths::relative_path;
///
/// assert_eq!(relative_path(Path::new("/a/b/c.swift"), Path::new("/a")), "b/c.swift");
/// assert_eq!(relative_path(Path::new("/x/c.swift"), Path::new("/a/b")), "../../x/c.swift");
/// ```
pub fn relative_path(path: &Path, to: &Path) -> String {
    let path = normalize_path(path);
    let to = normalize_path(to);

    let ours: Vec<Component> = path.components().collect();
    let base: Vec<Component> = to.components().collect();

    let common = ours
        .iter()
        .zip(base.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<String> = Vec::new();
    for _ in common..base.len() {
        parts.push("..".to_string());
    }
    for component in &ours[common..] {
        parts.push(component.as_os_str().to_string_lossy().into_owned());
    }

    parts.join("/")
}
