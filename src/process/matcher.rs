//! Decides which live processes belong to a configured program path.
//!
//! A process matches when its name equals the target's file name, or when its
//! executable path equals the target path. Both comparisons ignore case.

use std::path::{Component, Path, PathBuf};

use anyhow::Result;

use super::ProcessDirectory;
use super::shortcut;
use crate::model::ProcessRecord;

/// What a configured path is compared against.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchTarget {
    pub resolved: PathBuf,
    basename: String,
    normalized: String,
}

impl MatchTarget {
    pub fn new(path: &Path) -> Self {
        let resolved = shortcut::resolve_target(path);
        Self::from_resolved(resolved)
    }

    fn from_resolved(resolved: PathBuf) -> Self {
        let basename = resolved
            .file_name()
            .map(|n| n.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        let normalized = normalize_path(&resolved);
        Self {
            resolved,
            basename,
            normalized,
        }
    }

    pub fn matches(&self, record: &ProcessRecord) -> bool {
        let name_matches = record
            .name
            .as_ref()
            .is_some_and(|name| !self.basename.is_empty() && name.to_lowercase() == self.basename);
        if name_matches {
            return true;
        }
        record
            .exe
            .as_ref()
            .is_some_and(|exe| normalize_path(exe) == self.normalized)
    }
}

/// Lexical normal form used for path equality: lower case, `.` dropped, `..`
/// folded into its parent, and on Windows `/` treated as `\`.
pub fn normalize_path(path: &Path) -> String {
    let raw = path.to_string_lossy().to_lowercase();
    let raw = if cfg!(windows) {
        raw.replace('/', "\\")
    } else {
        raw
    };

    let mut parts: Vec<Component<'_>> = Vec::new();
    for component in Path::new(&raw).components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            other => parts.push(other),
        }
    }

    let normalized: PathBuf = parts.iter().collect();
    if normalized.as_os_str().is_empty() {
        ".".to_string()
    } else {
        normalized.to_string_lossy().into_owned()
    }
}

/// Resolves shortcuts to the program they point at, falling back to `path`.
pub fn resolve_target(path: &Path) -> PathBuf {
    shortcut::resolve_target(path)
}

/// Live processes belonging to `path`, from a fresh snapshot.
pub fn find_matches<D: ProcessDirectory + ?Sized>(
    directory: &D,
    target: &MatchTarget,
) -> Result<Vec<ProcessRecord>> {
    Ok(directory
        .snapshot()?
        .into_iter()
        .filter(|record| target.matches(record))
        .collect())
}

pub fn try_is_running<D: ProcessDirectory + ?Sized>(directory: &D, path: &Path) -> Result<bool> {
    let target = MatchTarget::new(path);
    Ok(!find_matches(directory, &target)?.is_empty())
}

/// Whether any live process belongs to `path`. A failed scan counts as "not running".
pub fn is_running<D: ProcessDirectory + ?Sized>(directory: &D, path: &Path) -> bool {
    try_is_running(directory, path).unwrap_or_else(|err| {
        log::warn!("Running-state check failed for {}: {:#}", path.display(), err);
        false
    })
}
