use std::path::Path;

use crate::process::shortcut::{ShortcutKind, shortcut_kind};

/// Label shown for an entry: shortcuts by their own name without extension,
/// programs by their file name.
pub fn display_name(path: &str) -> String {
    let p = Path::new(path);
    let file_name = p
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string());

    match shortcut_kind(p) {
        Some(ShortcutKind::WindowsLink) | Some(ShortcutKind::DesktopEntry) => p
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or(file_name),
        _ => file_name,
    }
}

/// Whether `path` is a file this tool knows how to launch: a Windows program or
/// link, a desktop entry, or (on Unix) any executable file.
pub fn is_valid_app_file(path: &Path) -> bool {
    if !path.is_file() {
        return false;
    }
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    if matches!(ext.as_deref(), Some("exe" | "lnk" | "desktop")) {
        return true;
    }
    is_executable(path)
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    std::fs::metadata(path)
        .map(|m| m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(_path: &Path) -> bool {
    false
}
