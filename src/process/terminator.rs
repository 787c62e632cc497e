//! Closes every live process that belongs to a program path.
//!
//! Two passes over fresh snapshots: a graceful close request to each match, a
//! grace period, then a forced kill of whatever still matches.

use std::path::Path;
use std::thread;
use std::time::Duration;

use anyhow::Result;

use super::matcher::{MatchTarget, find_matches};
use super::{ProcessControl, ProcessDirectory};
use crate::model::KillOutcome;

/// Reference grace period between the graceful and forced passes.
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(1);

pub struct Terminator<'a, D: ?Sized, C: ?Sized> {
    directory: &'a D,
    control: &'a C,
    grace_period: Duration,
}

impl<'a, D, C> Terminator<'a, D, C>
where
    D: ProcessDirectory + ?Sized,
    C: ProcessControl + ?Sized,
{
    pub fn new(directory: &'a D, control: &'a C, grace_period: Duration) -> Self {
        Self {
            directory,
            control,
            grace_period,
        }
    }

    /// Returns whether any process accepted a close request in the graceful pass.
    pub fn close(&self, path: &Path) -> bool {
        self.try_close(path).unwrap_or_else(|err| {
            log::error!("Close failed for {}: {:#}", path.display(), err);
            false
        })
    }

    pub fn try_close(&self, path: &Path) -> Result<bool> {
        let target = MatchTarget::new(path);

        let matches = find_matches(self.directory, &target)?;
        let matched = matches.len();
        let mut closed_names: Vec<String> = Vec::new();
        for record in matches {
            match self.control.request_close(record.pid) {
                KillOutcome::Success => {
                    closed_names.push(record.name.unwrap_or_else(|| format!("PID {}", record.pid)));
                }
                outcome => {
                    log::debug!("Close request for PID {} skipped: {:?}", record.pid, outcome);
                }
            }
        }

        if closed_names.is_empty() {
            if matched == 0 {
                log::info!("No running process found for {}", path.display());
            } else {
                log::warn!(
                    "{} process(es) matched {} but none accepted a close request",
                    matched,
                    path.display()
                );
            }
            return Ok(false);
        }

        if !self.grace_period.is_zero() {
            thread::sleep(self.grace_period);
        }

        // The table may have changed during the grace period; look again.
        for record in find_matches(self.directory, &target)? {
            match self.control.force_kill(record.pid) {
                KillOutcome::Success => {
                    log::info!("Force-killed PID {} for {}", record.pid, path.display());
                }
                KillOutcome::AlreadyExited => {}
                outcome => {
                    log::warn!("Force kill of PID {} failed: {:?}", record.pid, outcome);
                }
            }
        }

        closed_names.sort();
        closed_names.dedup();
        log::info!("Closed {} -> {}", path.display(), closed_names.join(", "));
        Ok(true)
    }
}
