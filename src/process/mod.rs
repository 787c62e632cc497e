//! Live process access.
//!
//! The OS process table is shared state that other programs change at any time,
//! so nothing here caches it: every query takes a fresh snapshot.

use std::path::Path;

use anyhow::Result;
use sysinfo::{ProcessRefreshKind, ProcessesToUpdate, System, UpdateKind};

use crate::model::{KillOutcome, ProcessRecord};
use crate::os;

pub mod launcher;
pub mod matcher;
pub mod shortcut;
pub mod terminator;

#[cfg(test)]
pub(crate) mod fake;

/// Read access to the live process table.
pub trait ProcessDirectory {
    fn snapshot(&self) -> Result<Vec<ProcessRecord>>;
}

/// Primitive process actions the launcher and terminator build on.
pub trait ProcessControl {
    /// Starts `path` detached, resolving file associations through the shell.
    fn start(&self, path: &Path) -> Result<()>;
    /// Asks the process to exit through its normal shutdown path.
    fn request_close(&self, pid: u32) -> KillOutcome;
    fn force_kill(&self, pid: u32) -> KillOutcome;
}

/// The real OS process table.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemProcesses;

impl ProcessDirectory for SystemProcesses {
    fn snapshot(&self) -> Result<Vec<ProcessRecord>> {
        let mut system = System::new();
        system.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::new().with_exe(UpdateKind::OnlyIfNotSet),
        );

        let records = system
            .processes()
            .iter()
            .map(|(pid, process)| {
                let name = process.name().to_string_lossy().into_owned();
                ProcessRecord {
                    pid: pid.as_u32(),
                    name: (!name.is_empty()).then_some(name),
                    exe: process.exe().map(Path::to_path_buf),
                }
            })
            .collect();
        Ok(records)
    }
}

impl ProcessControl for SystemProcesses {
    fn start(&self, path: &Path) -> Result<()> {
        os::launch::start_detached(path)
    }

    fn request_close(&self, pid: u32) -> KillOutcome {
        os::kill::request_close(pid)
    }

    fn force_kill(&self, pid: u32) -> KillOutcome {
        os::kill::force_kill(pid)
    }
}
