use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser, Clone)]
#[command(
    name = "group-launcher",
    version,
    about = "Launch, close and switch named groups of programs"
)]
pub struct Cli {
    /// Configuration file (default: <config dir>/group-launcher/config.json)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Groups file, overriding the one named in the configuration
    #[arg(long, global = true)]
    pub groups: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// List groups, or the entries of one group
    List { group: Option<String> },
    /// Show each entry of a group with its enabled flag and running state
    Status { group: String },
    /// Create an empty group
    Create { name: String },
    /// Delete a group
    Delete { name: String },
    /// Rename a group
    Rename { old: String, new: String },
    /// Copy a group under a new name, with every entry enabled
    Copy { source: String, new: String },
    /// Add programs or shortcuts to a group
    Add {
        group: String,
        #[arg(required = true)]
        paths: Vec<String>,
    },
    /// Remove the first entry with this path from a group
    Remove { group: String, path: String },
    /// Flip the enabled flag of the first entry with this path
    Toggle { group: String, path: String },
    /// Launch every enabled program of a group
    Launch { group: String },
    /// Close every enabled program of a group (force-kills stragglers)
    Close {
        group: String,
        /// Skip the confirmation prompt
        #[arg(long, short = 'y')]
        yes: bool,
    },
    /// Switch to a group, closing and launching only what differs from the current one
    Switch {
        target: String,
        /// Group that is active now; without it nothing is closed or launched
        #[arg(long)]
        from: Option<String>,
    },
}
