//! Shortcut resolution: `.lnk` links, `.desktop` launchers and symlinks.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use parselnk::Lnk;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShortcutKind {
    WindowsLink,
    DesktopEntry,
    Symlink,
}

fn has_extension(path: &Path, wanted: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(wanted))
        .unwrap_or(false)
}

pub fn shortcut_kind(path: &Path) -> Option<ShortcutKind> {
    if has_extension(path, "lnk") {
        return Some(ShortcutKind::WindowsLink);
    }
    if has_extension(path, "desktop") {
        return Some(ShortcutKind::DesktopEntry);
    }
    let is_symlink = fs::symlink_metadata(path)
        .map(|m| m.file_type().is_symlink())
        .unwrap_or(false);
    is_symlink.then_some(ShortcutKind::Symlink)
}

/// Returns the program a shortcut points at, or `path` itself when it is not a
/// shortcut or cannot be resolved to something usable.
pub fn resolve_target(path: &Path) -> PathBuf {
    let Some(kind) = shortcut_kind(path) else {
        return path.to_path_buf();
    };

    match resolve_shortcut(path, kind) {
        Ok(target) if usable_target(&target) => target,
        Ok(target) => {
            log::debug!(
                "Shortcut {} points at missing {}, keeping the shortcut path",
                path.display(),
                target.display()
            );
            path.to_path_buf()
        }
        Err(err) => {
            log::debug!("Could not resolve {}: {:#}", path.display(), err);
            path.to_path_buf()
        }
    }
}

/// An existing file, or a bare program name left for `PATH` lookup.
fn usable_target(target: &Path) -> bool {
    target.exists() || (!target.as_os_str().is_empty() && target.components().count() == 1)
}

fn resolve_shortcut(path: &Path, kind: ShortcutKind) -> Result<PathBuf> {
    match kind {
        ShortcutKind::WindowsLink => resolve_lnk(path),
        ShortcutKind::DesktopEntry => resolve_desktop_entry(path),
        ShortcutKind::Symlink => resolve_symlink(path),
    }
}

fn resolve_lnk(path: &Path) -> Result<PathBuf> {
    let link = Lnk::try_from(path).map_err(|e| anyhow!("failed to parse link {:?}: {}", path, e))?;

    if let Some(base) = link.link_info.local_base_path.as_ref() {
        return Ok(PathBuf::from(base));
    }

    if let Some(rel_path) = link.string_data.relative_path.as_ref() {
        let rel_path = Path::new(rel_path);
        if rel_path.is_absolute() {
            return Ok(rel_path.to_path_buf());
        }
        if let Some(work_dir) = link.string_data.working_dir.as_ref() {
            return Ok(Path::new(work_dir).join(rel_path));
        }
        // Relative to the folder the link itself lives in.
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        return Ok(base.join(rel_path));
    }

    bail!("link {:?} has no extractable target path", path)
}

fn resolve_desktop_entry(path: &Path) -> Result<PathBuf> {
    let content = fs::read_to_string(path).context("failed to read .desktop file")?;
    parse_desktop_exec(&content).ok_or_else(|| anyhow!("no usable Exec= line in {:?}", path))
}

/// First token of the `Exec=` key in the `[Desktop Entry]` section.
fn parse_desktop_exec(content: &str) -> Option<PathBuf> {
    let mut in_entry = false;
    for line in content.lines().map(str::trim) {
        if line.starts_with('[') {
            in_entry = line == "[Desktop Entry]";
            continue;
        }
        if !in_entry {
            continue;
        }
        if let Some(cmdline) = line.strip_prefix("Exec=") {
            let cmdline = cmdline.trim();
            let args = shlex::split(cmdline).unwrap_or_else(|| vec![cmdline.to_string()]);
            return args
                .into_iter()
                .find(|arg| !arg.starts_with('%'))
                .map(PathBuf::from);
        }
    }
    None
}

fn resolve_symlink(path: &Path) -> Result<PathBuf> {
    let target = fs::read_link(path).context("failed to read symlink")?;
    if target.is_absolute() {
        return Ok(target);
    }
    let base = path.parent().unwrap_or_else(|| Path::new(""));
    Ok(base.join(target))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_shortcut_kinds_by_extension() {
        assert_eq!(
            shortcut_kind(Path::new("C:/Users/me/Desktop/Editor.LNK")),
            Some(ShortcutKind::WindowsLink)
        );
        assert_eq!(
            shortcut_kind(Path::new("/usr/share/applications/firefox.desktop")),
            Some(ShortcutKind::DesktopEntry)
        );
        assert_eq!(shortcut_kind(Path::new("/nonexistent/tool.exe")), None);
    }

    #[test]
    fn plain_paths_are_returned_unchanged() {
        let path = Path::new("/nonexistent/dir/app.exe");
        assert_eq!(resolve_target(path), path.to_path_buf());
    }

    #[test]
    fn unreadable_link_falls_back_to_original() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.lnk");
        assert_eq!(resolve_target(&missing), missing);
    }

    #[test]
    fn desktop_exec_skips_field_codes_and_other_sections() {
        let content = "\
[Desktop Action new-window]
Exec=/wrong/binary --new-window

[Desktop Entry]
Name=Editor
Exec=\"/opt/My Editor/editor\" --flag %F
";
        assert_eq!(
            parse_desktop_exec(content),
            Some(PathBuf::from("/opt/My Editor/editor"))
        );
        assert_eq!(parse_desktop_exec("[Desktop Entry]\nName=x\n"), None);
        assert_eq!(
            parse_desktop_exec("[Desktop Entry]\nExec=firefox %u\n"),
            Some(PathBuf::from("firefox"))
        );
    }

    #[test]
    fn desktop_entry_resolves_to_existing_or_bare_program() {
        let dir = tempfile::tempdir().unwrap();
        let binary = dir.path().join("editor");
        fs::write(&binary, b"").unwrap();

        let entry = dir.path().join("editor.desktop");
        fs::write(
            &entry,
            format!("[Desktop Entry]\nExec={} %F\n", binary.display()),
        )
        .unwrap();
        assert_eq!(resolve_target(&entry), binary);

        let bare = dir.path().join("browser.desktop");
        fs::write(&bare, "[Desktop Entry]\nExec=firefox %u\n").unwrap();
        assert_eq!(resolve_target(&bare), PathBuf::from("firefox"));

        let dangling = dir.path().join("gone.desktop");
        fs::write(&dangling, "[Desktop Entry]\nExec=/nonexistent/app\n").unwrap();
        assert_eq!(resolve_target(&dangling), dangling);
    }

    #[cfg(unix)]
    #[test]
    fn symlinks_resolve_relative_to_their_folder() {
        let dir = tempfile::tempdir().unwrap();
        let real = dir.path().join("real-app");
        fs::write(&real, b"").unwrap();
        let link = dir.path().join("app-link");
        std::os::unix::fs::symlink("real-app", &link).unwrap();

        assert_eq!(shortcut_kind(&link), Some(ShortcutKind::Symlink));
        assert_eq!(resolve_target(&link), real);
    }
}
