use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// One program reference inside a group.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct AppEntry {
    pub path: String,
    pub enabled: bool,
}

impl AppEntry {
    pub fn new(path: impl Into<String>, enabled: bool) -> Self {
        Self {
            path: path.into(),
            enabled,
        }
    }

    pub fn enabled(path: impl Into<String>) -> Self {
        Self::new(path, true)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Group {
    pub name: String,
    pub entries: Vec<AppEntry>,
}

impl Group {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    pub fn enabled_count(&self) -> usize {
        self.entries.iter().filter(|e| e.enabled).count()
    }
}

/// Point-in-time view of one live OS process.
///
/// `name` and `exe` are `None` when the OS refused to reveal them; such fields
/// never take part in matching.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProcessRecord {
    pub pid: u32,
    pub name: Option<String>,
    pub exe: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KillOutcome {
    Success,
    AlreadyExited,
    PermissionDenied,
    Failed(i32),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GroupAction {
    Launch,
    Close,
}

/// Aggregate result of launching or closing every enabled entry of a group.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupReport {
    pub action: GroupAction,
    pub succeeded: usize,
    pub total_enabled: usize,
    /// Paths whose launch failed. Closing a program that is not running is not a failure.
    pub failed: Vec<String>,
}

impl GroupReport {
    pub fn new(action: GroupAction) -> Self {
        Self {
            action,
            succeeded: 0,
            total_enabled: 0,
            failed: Vec::new(),
        }
    }
}

impl fmt::Display for GroupReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self.action {
            GroupAction::Launch => "launched",
            GroupAction::Close => "closed",
        };
        write!(f, "{}/{} {}.", self.succeeded, self.total_enabled, verb)
    }
}

/// Result of a smart switch between two groups.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SwitchReport {
    pub closed: usize,
    pub launched: usize,
    /// Set when reconciliation stopped early; counts cover the work done before that.
    pub error: Option<String>,
}

impl SwitchReport {
    pub fn counts(&self) -> (usize, usize) {
        (self.closed, self.launched)
    }
}

/// The group pointer handed back to the caller after a switch, plus what happened on the way.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SwitchOutcome {
    pub current_group: String,
    pub report: SwitchReport,
}

impl SwitchOutcome {
    pub fn feedback(&self) -> Feedback {
        if let Some(err) = &self.report.error {
            return Feedback::error(format!(
                "Switched to group '{}', but reconciliation failed: {}",
                self.current_group, err
            ));
        }
        let mut message = format!("Switched to group '{}'.", self.current_group);
        if self.report.closed > 0 || self.report.launched > 0 {
            message.push_str(&format!(
                " Closed {} program(s), launched {} program(s).",
                self.report.closed, self.report.launched
            ));
        }
        Feedback::info(message)
    }
}

#[derive(Clone, Debug)]
pub struct Feedback {
    pub message: String,
    pub severity: FeedbackSeverity,
}

impl Feedback {
    pub fn new(message: String, severity: FeedbackSeverity) -> Self {
        Self { message, severity }
    }

    pub fn info(message: String) -> Self {
        Self::new(message, FeedbackSeverity::Info)
    }

    pub fn warning(message: String) -> Self {
        Self::new(message, FeedbackSeverity::Warning)
    }

    pub fn error(message: String) -> Self {
        Self::new(message, FeedbackSeverity::Error)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FeedbackSeverity {
    Info,
    Warning,
    Error,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_report_formats_counts() {
        let mut report = GroupReport::new(GroupAction::Launch);
        report.succeeded = 1;
        report.total_enabled = 1;
        assert_eq!(report.to_string(), "1/1 launched.");

        let mut report = GroupReport::new(GroupAction::Close);
        report.succeeded = 1;
        report.total_enabled = 2;
        assert_eq!(report.to_string(), "1/2 closed.");
    }

    #[test]
    fn switch_feedback_mentions_counts_only_when_work_was_done() {
        let quiet = SwitchOutcome {
            current_group: "Work".into(),
            report: SwitchReport::default(),
        };
        assert_eq!(quiet.feedback().message, "Switched to group 'Work'.");

        let busy = SwitchOutcome {
            current_group: "Work".into(),
            report: SwitchReport {
                closed: 1,
                launched: 2,
                error: None,
            },
        };
        let feedback = busy.feedback();
        assert_eq!(feedback.severity, FeedbackSeverity::Info);
        assert!(feedback.message.contains("Closed 1"));
        assert!(feedback.message.contains("launched 2"));
    }

    #[test]
    fn switch_feedback_reports_errors() {
        let failed = SwitchOutcome {
            current_group: "Games".into(),
            report: SwitchReport {
                closed: 0,
                launched: 0,
                error: Some("process table unavailable".into()),
            },
        };
        let feedback = failed.feedback();
        assert_eq!(feedback.severity, FeedbackSeverity::Error);
        assert!(feedback.message.contains("'Games'"));
        assert!(feedback.message.contains("process table unavailable"));
    }
}
