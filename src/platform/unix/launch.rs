//! Unix detached launch: executables run directly, everything else (desktop
//! launchers included) goes through the desktop's file association handler.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::os::unix::process::CommandExt;
use std::path::Path;
use std::process::{Command, Stdio};

use anyhow::{Context, Result, bail};

use crate::process::shortcut::{ShortcutKind, shortcut_kind};

#[cfg(target_os = "macos")]
const OPENER: &str = "open";
#[cfg(not(target_os = "macos"))]
const OPENER: &str = "xdg-open";

fn is_executable_file(path: &Path) -> bool {
    fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

fn launch_command(path: &Path) -> Command {
    // macOS bundles and documents both go through `open`. Trusted `.desktop`
    // launchers carry the exec bit but are not programs.
    let desktop_entry = shortcut_kind(path) == Some(ShortcutKind::DesktopEntry);
    if cfg!(target_os = "macos") || desktop_entry || !is_executable_file(path) {
        let mut cmd = Command::new(OPENER);
        cmd.arg(path);
        cmd
    } else {
        let mut cmd = Command::new(path);
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            cmd.current_dir(dir);
        }
        cmd
    }
}

/// Starts `path` in its own process group and returns without waiting.
pub fn start_detached(path: &Path) -> Result<()> {
    if !path.exists() {
        bail!("{} does not exist", path.display());
    }

    launch_command(path)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .process_group(0)
        .spawn()
        .with_context(|| format!("failed to start {}", path.display()))?;
    Ok(())
}
