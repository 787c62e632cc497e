//! Windows detached launch through ShellExecuteW, so shortcuts, documents and
//! anything else with a registered handler open the way Explorer would open them.

use std::ffi::OsStr;
use std::os::windows::ffi::OsStrExt;
use std::path::Path;

use anyhow::{Result, bail};
use windows::Win32::Foundation::HWND;
use windows::Win32::UI::Shell::ShellExecuteW;
use windows::Win32::UI::WindowsAndMessaging::SW_SHOWNORMAL;
use windows::core::{PCWSTR, w};

/// ShellExecuteW reports failure as a value of 32 or less.
const SE_ERR_MAX: isize = 32;

/// NUL-terminated UTF-16 copy of `value`, passed to the shell verbatim.
fn to_wide(value: &OsStr) -> Vec<u16> {
    value.encode_wide().chain(std::iter::once(0)).collect()
}

pub fn start_detached(path: &Path) -> Result<()> {
    if !path.exists() {
        bail!("{} does not exist", path.display());
    }

    let file = to_wide(path.as_os_str());
    let dir = path
        .parent()
        .filter(|d| !d.as_os_str().is_empty())
        .map(|d| to_wide(d.as_os_str()));
    let dir_ptr = dir.as_ref().map_or(PCWSTR::null(), |d| PCWSTR(d.as_ptr()));

    // SAFETY: every string is NUL-terminated and outlives the call.
    let result = unsafe {
        ShellExecuteW(
            HWND::default(),
            w!("open"),
            PCWSTR(file.as_ptr()),
            PCWSTR::null(),
            dir_ptr,
            SW_SHOWNORMAL,
        )
    };

    let code = result.0 as isize;
    if code <= SE_ERR_MAX {
        bail!("failed to start {} (shell error {})", path.display(), code);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shell_metacharacters_reach_the_shell_untouched() {
        let path = r"C:\Tools\R&D ^%PATH%\app.exe";
        let wide = to_wide(OsStr::new(path));

        assert_eq!(wide.last(), Some(&0));
        assert_eq!(String::from_utf16(&wide[..wide.len() - 1]).unwrap(), path);
    }

    #[test]
    fn missing_path_fails_before_the_shell_is_called() {
        let err = start_detached(Path::new(r"C:\nonexistent\launcher\app.exe")).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }
}
