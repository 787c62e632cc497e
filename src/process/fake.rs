//! In-memory process table for tests.

use std::cell::RefCell;
use std::path::{Path, PathBuf};

use anyhow::{Result, anyhow, bail};

use super::{ProcessControl, ProcessDirectory};
use crate::model::{KillOutcome, ProcessRecord};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Call {
    Start(PathBuf),
    RequestClose(u32),
    ForceKill(u32),
}

/// How a seeded process reacts to a graceful close request.
#[derive(Clone, Copy, PartialEq, Eq)]
enum OnClose {
    Exits,
    Ignores,
    Refuses,
}

struct FakeProcess {
    record: ProcessRecord,
    on_close: OnClose,
}

#[derive(Default)]
pub struct FakeProcesses {
    table: RefCell<Vec<FakeProcess>>,
    calls: RefCell<Vec<Call>>,
    next_pid: RefCell<u32>,
    unstartable: RefCell<Vec<PathBuf>>,
    snapshot_error: RefCell<Option<String>>,
    failing_snapshots: RefCell<Vec<String>>,
    snapshots: RefCell<usize>,
}

impl FakeProcesses {
    pub fn new() -> Self {
        Self {
            next_pid: RefCell::new(100),
            ..Self::default()
        }
    }

    /// Seeds a process the way `start` would: name is the basename, exe is the full path.
    pub fn with_running(self, path: &str) -> Self {
        self.spawn(Path::new(path), OnClose::Exits);
        self
    }

    /// Seeds a process that survives graceful close and has to be killed.
    pub fn with_stubborn(self, path: &str) -> Self {
        self.spawn(Path::new(path), OnClose::Ignores);
        self
    }

    /// Seeds a process whose close request is denied, like one owned by another user.
    pub fn with_refusing(self, path: &str) -> Self {
        self.spawn(Path::new(path), OnClose::Refuses);
        self
    }

    pub fn with_record(self, record: ProcessRecord) -> Self {
        self.table.borrow_mut().push(FakeProcess {
            record,
            on_close: OnClose::Exits,
        });
        self
    }

    pub fn with_unstartable(self, path: &str) -> Self {
        self.unstartable.borrow_mut().push(PathBuf::from(path));
        self
    }

    pub fn fail_snapshots(&self, message: &str) {
        *self.snapshot_error.borrow_mut() = Some(message.to_string());
    }

    /// Makes only the next snapshot fail.
    pub fn fail_next_snapshot(&self, message: &str) {
        self.failing_snapshots.borrow_mut().push(message.to_string());
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn started(&self) -> Vec<PathBuf> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|c| match c {
                Call::Start(path) => Some(path.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn snapshot_count(&self) -> usize {
        *self.snapshots.borrow()
    }

    /// Executable paths of live processes, sorted.
    pub fn running(&self) -> Vec<PathBuf> {
        let mut paths: Vec<_> = self
            .table
            .borrow()
            .iter()
            .filter_map(|p| p.record.exe.clone())
            .collect();
        paths.sort();
        paths
    }

    fn spawn(&self, path: &Path, on_close: OnClose) {
        let mut next_pid = self.next_pid.borrow_mut();
        *next_pid += 1;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned());
        self.table.borrow_mut().push(FakeProcess {
            record: ProcessRecord {
                pid: *next_pid,
                name,
                exe: Some(path.to_path_buf()),
            },
            on_close,
        });
    }

    fn remove(&self, pid: u32) -> bool {
        let mut table = self.table.borrow_mut();
        let before = table.len();
        table.retain(|p| p.record.pid != pid);
        table.len() != before
    }
}

impl ProcessDirectory for FakeProcesses {
    fn snapshot(&self) -> Result<Vec<ProcessRecord>> {
        *self.snapshots.borrow_mut() += 1;
        if let Some(message) = self.snapshot_error.borrow().as_ref() {
            return Err(anyhow!(message.clone()));
        }
        let next_failure = {
            let mut failing = self.failing_snapshots.borrow_mut();
            (!failing.is_empty()).then(|| failing.remove(0))
        };
        if let Some(message) = next_failure {
            return Err(anyhow!(message));
        }
        Ok(self
            .table
            .borrow()
            .iter()
            .map(|p| p.record.clone())
            .collect())
    }
}

impl ProcessControl for FakeProcesses {
    fn start(&self, path: &Path) -> Result<()> {
        self.calls.borrow_mut().push(Call::Start(path.to_path_buf()));
        if self.unstartable.borrow().iter().any(|p| p == path) {
            bail!("cannot start {}", path.display());
        }
        self.spawn(path, OnClose::Exits);
        Ok(())
    }

    fn request_close(&self, pid: u32) -> KillOutcome {
        self.calls.borrow_mut().push(Call::RequestClose(pid));
        let on_close = self
            .table
            .borrow()
            .iter()
            .find(|p| p.record.pid == pid)
            .map(|p| p.on_close);
        match on_close {
            None => KillOutcome::AlreadyExited,
            Some(OnClose::Refuses) => KillOutcome::PermissionDenied,
            Some(OnClose::Ignores) => KillOutcome::Success,
            Some(OnClose::Exits) => {
                self.remove(pid);
                KillOutcome::Success
            }
        }
    }

    fn force_kill(&self, pid: u32) -> KillOutcome {
        self.calls.borrow_mut().push(Call::ForceKill(pid));
        if self.remove(pid) {
            KillOutcome::Success
        } else {
            KillOutcome::AlreadyExited
        }
    }
}
