//! Windows process termination: WM_CLOSE to the process's windows, then TerminateProcess

use windows::Win32::Foundation::{BOOL, CloseHandle, HANDLE, HWND, LPARAM, WPARAM};
use windows::Win32::System::Threading::{
    OpenProcess, PROCESS_ACCESS_RIGHTS, PROCESS_QUERY_LIMITED_INFORMATION, PROCESS_TERMINATE,
    TerminateProcess,
};
use windows::Win32::UI::WindowsAndMessaging::{
    EnumWindows, GetWindowThreadProcessId, PostMessageW, WM_CLOSE,
};

use crate::model::KillOutcome;

const ERROR_ACCESS_DENIED: u32 = 5;
const ERROR_INVALID_PARAMETER: u32 = 87;
const ERROR_NOT_FOUND: u32 = 1168;

fn outcome_from_code(code: u32) -> KillOutcome {
    match code {
        ERROR_INVALID_PARAMETER | ERROR_NOT_FOUND => KillOutcome::AlreadyExited,
        ERROR_ACCESS_DENIED => KillOutcome::PermissionDenied,
        other => KillOutcome::Failed(other as i32),
    }
}

/// Win32 error code carried inside an HRESULT_FROM_WIN32 value.
fn win32_code(e: &windows::core::Error) -> u32 {
    let hr = e.code().0 as u32;
    if hr & 0xFFFF_0000 == 0x8007_0000 {
        hr & 0xFFFF
    } else {
        hr
    }
}

fn open(pid: u32, access: PROCESS_ACCESS_RIGHTS) -> Result<HANDLE, KillOutcome> {
    // SAFETY: OpenProcess has no preconditions; the handle is closed by the caller.
    unsafe { OpenProcess(access, false, pid) }
        .map_err(|e| outcome_from_code(win32_code(&e)))
}

struct CloseCtx {
    target_pid: u32,
    posted: usize,
}

unsafe extern "system" fn post_close(hwnd: HWND, lparam: LPARAM) -> BOOL {
    // SAFETY: lparam carries the CloseCtx owned by request_close for the whole enumeration.
    let ctx = unsafe { &mut *(lparam.0 as *mut CloseCtx) };

    let mut window_pid = 0u32;
    unsafe {
        GetWindowThreadProcessId(hwnd, Some(&mut window_pid));
    }

    if window_pid == ctx.target_pid
        && unsafe { PostMessageW(hwnd, WM_CLOSE, WPARAM(0), LPARAM(0)) }.is_ok()
    {
        ctx.posted += 1;
    }

    BOOL(1) // keep enumerating; a process may own several top-level windows
}

/// Posts WM_CLOSE to every top-level window of `pid`.
///
/// Windowless processes receive nothing here and are left for `force_kill`.
pub fn request_close(pid: u32) -> KillOutcome {
    let handle = match open(pid, PROCESS_QUERY_LIMITED_INFORMATION) {
        Ok(h) => h,
        Err(outcome) => return outcome,
    };
    unsafe {
        let _ = CloseHandle(handle);
    }

    let mut ctx = CloseCtx {
        target_pid: pid,
        posted: 0,
    };
    let ctx_ptr = &mut ctx as *mut CloseCtx;
    unsafe {
        let _ = EnumWindows(Some(post_close), LPARAM(ctx_ptr as isize));
    }

    log::debug!("Posted WM_CLOSE to {} window(s) of PID {}", ctx.posted, pid);
    KillOutcome::Success
}

pub fn force_kill(pid: u32) -> KillOutcome {
    let handle = match open(pid, PROCESS_TERMINATE | PROCESS_QUERY_LIMITED_INFORMATION) {
        Ok(h) => h,
        Err(outcome) => return outcome,
    };

    // SAFETY: handle is valid and obtained from OpenProcess
    let result = unsafe { TerminateProcess(handle, 1) };
    unsafe {
        let _ = CloseHandle(handle);
    }

    match result {
        Ok(()) => KillOutcome::Success,
        Err(e) => {
            let outcome = outcome_from_code(win32_code(&e));
            if !matches!(outcome, KillOutcome::AlreadyExited) {
                log::error!("TerminateProcess failed for PID {}: {:?}", pid, e);
            }
            outcome
        }
    }
}
