//! Unix process termination using SIGTERM/SIGKILL

use nix::errno::Errno;
use nix::sys::signal::{Signal, kill};
use nix::unistd::Pid;

use crate::model::KillOutcome;

fn send(pid_raw: u32, signal: Signal) -> KillOutcome {
    let Ok(raw) = i32::try_from(pid_raw) else {
        return KillOutcome::Failed(Errno::EINVAL as i32);
    };
    // 0 and negative pids address process groups; never signal those.
    if raw <= 0 {
        return KillOutcome::Failed(Errno::EINVAL as i32);
    }

    match kill(Pid::from_raw(raw), signal) {
        Ok(()) => KillOutcome::Success,
        Err(Errno::ESRCH) => KillOutcome::AlreadyExited,
        Err(Errno::EPERM) => KillOutcome::PermissionDenied,
        Err(err) => KillOutcome::Failed(err as i32),
    }
}

/// Sends SIGTERM to the specific PID only (not its process group).
pub fn request_close(pid: u32) -> KillOutcome {
    send(pid, Signal::SIGTERM)
}

pub fn force_kill(pid: u32) -> KillOutcome {
    send(pid, Signal::SIGKILL)
}
