//! Parent-directory checks applied to every path before it reaches the filesystem.

use std::path::{Component, Path, PathBuf};

use super::HostError;

/// Validate `path` for use by a host call.
///
/// Paths without `..` segments pass through (relative ones are joined onto
/// `base` when one is given). Paths with `..` are only accepted when a `base`
/// is known and the lexically normalized result stays inside it.
pub fn validate_path(path: &Path, base: Option<&Path>) -> Result<PathBuf, HostError> {
    let has_parent = path
        .components()
        .any(|component| matches!(component, Component::ParentDir));
    let joined = match base {
        Some(base) if path.is_relative() => base.join(path),
        _ => path.to_path_buf(),
    };
    if !has_parent {
        return Ok(joined);
    }
    let Some(base) = base else {
        return Err(HostError::PathTraversal(path.to_path_buf()));
    };
    let base = normalize(base).ok_or_else(|| HostError::PathTraversal(path.to_path_buf()))?;
    match normalize(&joined) {
        Some(resolved) if resolved.starts_with(&base) => Ok(resolved),
        _ => Err(HostError::PathTraversal(path.to_path_buf())),
    }
}

/// Resolve `.` and `..` lexically. `None` when `..` climbs above the root.
fn normalize(path: &Path) -> Option<PathBuf> {
    let mut out = PathBuf::new();
    let mut depth = 0usize;
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                if depth == 0 {
                    return None;
                }
                out.pop();
                depth -= 1;
            }
            Component::Normal(part) => {
                out.push(part);
                depth += 1;
            }
        }
    }
    Some(out)
}
