use std::io::{self, BufRead, Write};
use std::path::Path;

use anyhow::{Context, Result, anyhow};

use crate::cli::{Cli, Command};
use crate::config::{get_config_path, load_or_create_config};
use crate::model::{Feedback, FeedbackSeverity, Group};
use crate::process::{ProcessControl, ProcessDirectory, SystemProcesses};
use crate::reconcile::Reconciler;
use crate::store::GroupStore;
use crate::utils::{display_name, is_valid_app_file};

pub fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.clone().unwrap_or_else(get_config_path);
    let config = load_or_create_config(&config_path).context("failed to load configuration")?;
    let groups_path = cli.groups.clone().unwrap_or_else(|| config.groups_path());
    let mut store = GroupStore::open(groups_path).context("failed to load groups")?;

    let processes = SystemProcesses;
    let reconciler = Reconciler::new(&processes, &processes, config.termination.grace_period());

    let feedback = execute(cli.command, &mut store, &reconciler, &mut confirm_on_stdin)?;
    for item in &feedback {
        show(item);
    }
    Ok(())
}

fn show(feedback: &Feedback) {
    match feedback.severity {
        FeedbackSeverity::Info => println!("{}", feedback.message),
        FeedbackSeverity::Warning => eprintln!("warning: {}", feedback.message),
        FeedbackSeverity::Error => eprintln!("error: {}", feedback.message),
    }
}

fn confirm_on_stdin(question: &str) -> bool {
    print!("{} [y/N] ", question);
    let _ = io::stdout().flush();
    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

fn require<'s>(store: &'s GroupStore, name: &str) -> Result<&'s Group> {
    store
        .group(name)
        .ok_or_else(|| anyhow!("group '{}' does not exist", name))
}

fn require_entry(store: &GroupStore, group: &str, path: &str) -> Result<usize> {
    require(store, group)?;
    store
        .position(group, path)
        .ok_or_else(|| anyhow!("group '{}' has no entry {}", group, path))
}

fn check_box(enabled: bool) -> &'static str {
    if enabled { "[x]" } else { "[ ]" }
}

/// Runs one command against the store and reconciler, returning what to tell the user.
pub fn execute<D, C>(
    command: Command,
    store: &mut GroupStore,
    reconciler: &Reconciler<'_, D, C>,
    confirm: &mut dyn FnMut(&str) -> bool,
) -> Result<Vec<Feedback>>
where
    D: ProcessDirectory + ?Sized,
    C: ProcessControl + ?Sized,
{
    let mut out = Vec::new();
    match command {
        Command::List { group: None } => {
            if store.groups().is_empty() {
                out.push(Feedback::info("No groups yet.".to_string()));
            }
            for group in store.groups() {
                out.push(Feedback::info(format!(
                    "{} ({}/{} enabled)",
                    group.name,
                    group.enabled_count(),
                    group.entries.len()
                )));
            }
        }
        Command::List { group: Some(name) } => {
            let group = require(store, &name)?;
            if group.entries.is_empty() {
                out.push(Feedback::info(format!("Group '{}' is empty.", name)));
            }
            for entry in &group.entries {
                out.push(Feedback::info(format!(
                    "{} {}  {}",
                    check_box(entry.enabled),
                    display_name(&entry.path),
                    entry.path
                )));
            }
        }
        Command::Status { group } => {
            let group = require(store, &group)?;
            for entry in &group.entries {
                let state = if reconciler.is_running(entry) {
                    "running"
                } else {
                    "stopped"
                };
                out.push(Feedback::info(format!(
                    "{} {:<8} {}  {}",
                    check_box(entry.enabled),
                    state,
                    display_name(&entry.path),
                    entry.path
                )));
            }
        }
        Command::Create { name } => {
            store.create_group(&name)?;
            out.push(Feedback::info(format!("Created group '{}'.", name.trim())));
        }
        Command::Delete { name } => {
            store.delete_group(&name)?;
            out.push(Feedback::info(format!("Deleted group '{}'.", name)));
        }
        Command::Rename { old, new } => {
            store.rename_group(&old, &new)?;
            out.push(Feedback::info(format!(
                "Renamed group '{}' to '{}'.",
                old,
                new.trim()
            )));
        }
        Command::Copy { source, new } => {
            store.copy_group(&source, &new)?;
            out.push(Feedback::info(format!(
                "Copied group '{}' to '{}' with every entry enabled.",
                source,
                new.trim()
            )));
        }
        Command::Add { group, paths } => {
            require(store, &group)?;
            for path in paths {
                if !is_valid_app_file(Path::new(&path)) {
                    out.push(Feedback::warning(format!(
                        "{} is not a launchable program or shortcut; skipped.",
                        path
                    )));
                    continue;
                }
                store.add_entry(&group, &path)?;
                out.push(Feedback::info(format!(
                    "Added {} to '{}'.",
                    display_name(&path),
                    group
                )));
            }
        }
        Command::Remove { group, path } => {
            let index = require_entry(store, &group, &path)?;
            let removed = store.remove_entry(&group, index)?;
            out.push(Feedback::info(format!(
                "Removed {} from '{}'.",
                display_name(&removed.path),
                group
            )));
        }
        Command::Toggle { group, path } => {
            let index = require_entry(store, &group, &path)?;
            let enabled = store.toggle_entry(&group, index)?;
            let verb = if enabled { "Enabled" } else { "Disabled" };
            out.push(Feedback::info(format!(
                "{} {} in '{}'.",
                verb,
                display_name(&path),
                group
            )));
        }
        Command::Launch { group } => {
            let group = require(store, &group)?;
            let report = reconciler.launch_group(&group.entries);
            for path in &report.failed {
                out.push(Feedback::warning(format!("Launch failed: {}", path)));
            }
            out.push(Feedback::info(report.to_string()));
        }
        Command::Close { group, yes } => {
            let group = require(store, &group)?;
            let question = format!(
                "Close every enabled program in group '{}'? Programs that do not exit in time are force-killed; unsaved work may be lost.",
                group.name
            );
            if !yes && !confirm(&question) {
                out.push(Feedback::info("Cancelled.".to_string()));
                return Ok(out);
            }
            let report = reconciler.close_group(&group.entries);
            out.push(Feedback::info(report.to_string()));
        }
        Command::Switch { target, from } => {
            let store: &GroupStore = store;
            let target = require(store, &target)?;
            let current = match from.as_deref() {
                Some(name) => Some(require(store, name)?),
                None => None,
            };
            let outcome = reconciler.switch_group(current, target);
            out.push(outcome.feedback());
        }
    }
    Ok(out)
}
