//! Group-level operations: launch or close every enabled entry, and switch the
//! live process set from one group's enabled programs to another's.
//!
//! The reconciler holds no "current group"; callers pass both groups in and get
//! the new current group back.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use anyhow::Result;

use crate::model::{AppEntry, Group, GroupAction, GroupReport, SwitchOutcome, SwitchReport};
use crate::process::launcher::launch;
use crate::process::matcher::{is_running, try_is_running};
use crate::process::terminator::Terminator;
use crate::process::{ProcessControl, ProcessDirectory};

/// Enabled state per distinct path, in first-occurrence order.
///
/// A path listed more than once counts as enabled when any occurrence is.
pub struct EnabledSet<'e> {
    order: Vec<&'e str>,
    enabled: HashMap<&'e str, bool>,
}

impl<'e> EnabledSet<'e> {
    pub fn new(entries: &'e [AppEntry]) -> Self {
        let mut order = Vec::new();
        let mut enabled: HashMap<&'e str, bool> = HashMap::new();
        for entry in entries {
            let path = entry.path.as_str();
            match enabled.get_mut(path) {
                Some(flag) => *flag |= entry.enabled,
                None => {
                    order.push(path);
                    enabled.insert(path, entry.enabled);
                }
            }
        }
        Self { order, enabled }
    }

    pub fn is_enabled(&self, path: &str) -> bool {
        self.enabled.get(path).copied().unwrap_or(false)
    }

    /// Enabled here but disabled or absent in `other`.
    pub fn enabled_not_in<'s>(&'s self, other: &'s EnabledSet<'_>) -> impl Iterator<Item = &'e str> + 's {
        self.order
            .iter()
            .copied()
            .filter(move |path| self.is_enabled(path) && !other.is_enabled(path))
    }
}

pub struct Reconciler<'a, D: ?Sized, C: ?Sized> {
    directory: &'a D,
    control: &'a C,
    grace_period: Duration,
}

impl<'a, D, C> Reconciler<'a, D, C>
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

    fn terminator(&self) -> Terminator<'a, D, C> {
        Terminator::new(self.directory, self.control, self.grace_period)
    }

    pub fn is_running(&self, entry: &AppEntry) -> bool {
        is_running(self.directory, Path::new(&entry.path))
    }

    /// Launches each enabled entry; disabled entries are neither launched nor counted.
    pub fn launch_group(&self, entries: &[AppEntry]) -> GroupReport {
        let mut report = GroupReport::new(GroupAction::Launch);
        for entry in entries.iter().filter(|e| e.enabled) {
            report.total_enabled += 1;
            if launch(self.control, Path::new(&entry.path)) {
                report.succeeded += 1;
            } else {
                report.failed.push(entry.path.clone());
            }
        }
        log::info!("Launch group: {}", report);
        report
    }

    /// Closes each enabled entry. Destructive: survivors of the grace period are killed,
    /// so callers confirm with the user first.
    pub fn close_group(&self, entries: &[AppEntry]) -> GroupReport {
        let terminator = self.terminator();
        let mut report = GroupReport::new(GroupAction::Close);
        for entry in entries.iter().filter(|e| e.enabled) {
            report.total_enabled += 1;
            if terminator.close(Path::new(&entry.path)) {
                report.succeeded += 1;
            }
        }
        log::info!("Close group: {}", report);
        report
    }

    /// Moves the live process set from `current`'s enabled programs to `target`'s.
    ///
    /// Programs enabled in both are left alone. A path that cannot be checked
    /// is skipped and the first such error is recorded in the report; the
    /// remaining paths are still handled.
    pub fn smart_switch(&self, current: &[AppEntry], target: &[AppEntry]) -> SwitchReport {
        let current = EnabledSet::new(current);
        let target = EnabledSet::new(target);
        let terminator = self.terminator();
        let mut report = SwitchReport::default();

        for path in current.enabled_not_in(&target) {
            match self.close_if_running(&terminator, Path::new(path)) {
                Ok(true) => report.closed += 1,
                Ok(false) => {}
                Err(err) => note_failure(&mut report, path, err),
            }
        }

        for path in target.enabled_not_in(&current) {
            match self.launch_if_stopped(Path::new(path)) {
                Ok(true) => report.launched += 1,
                Ok(false) => {}
                Err(err) => note_failure(&mut report, path, err),
            }
        }
        report
    }

    fn close_if_running(&self, terminator: &Terminator<'a, D, C>, path: &Path) -> Result<bool> {
        Ok(try_is_running(self.directory, path)? && terminator.try_close(path)?)
    }

    fn launch_if_stopped(&self, path: &Path) -> Result<bool> {
        Ok(!try_is_running(self.directory, path)? && launch(self.control, path))
    }

    /// Switches from `current` (if any) to `target`. The returned outcome always
    /// names `target` as the new current group, even when reconciliation failed.
    pub fn switch_group(&self, current: Option<&Group>, target: &Group) -> SwitchOutcome {
        let report = match current {
            Some(current) if current.name != target.name => {
                let report = self.smart_switch(&current.entries, &target.entries);
                log::info!(
                    "Smart switch {} -> {}: closed {}, launched {}",
                    current.name,
                    target.name,
                    report.closed,
                    report.launched
                );
                report
            }
            _ => SwitchReport::default(),
        };
        SwitchOutcome {
            current_group: target.name.clone(),
            report,
        }
    }
}

fn note_failure(report: &mut SwitchReport, path: &str, err: anyhow::Error) {
    log::error!("Smart switch failed for {}: {:#}", path, err);
    report.error.get_or_insert_with(|| format!("{}: {:#}", path, err));
}
