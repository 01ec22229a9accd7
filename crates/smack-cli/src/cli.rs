//! Command-line argument definitions.

use crate::config::CONFIG_ENV_VAR;
use clap::{Parser, Subcommand};
use smack_rules::RuleFormat;
use std::path::PathBuf;

/// smackrules - inspect and edit Smack rule files
#[derive(Parser, Debug)]
#[command(name = "smackrules", author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, env = CONFIG_ENV_VAR)]
    pub config: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Options naming the rule file to operate on.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct RulesArgs {
    /// Rule file (defaults to `rules_path` from the config)
    #[arg(short, long)]
    pub file: Option<PathBuf>,
}

/// Subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the rules of a rule file
    List {
        #[command(flatten)]
        rules: RulesArgs,
        /// Only show rules for this subject
        #[arg(short, long)]
        subject: Option<String>,
        /// Output layout
        #[arg(long)]
        format: Option<RuleFormat>,
        /// Print rules as JSON
        #[arg(long, conflicts_with = "format")]
        json: bool,
    },

    /// Check whether SUBJECT has ACCESS to OBJECT (exit status 1 if not)
    Check {
        #[command(flatten)]
        rules: RulesArgs,
        /// Subject label
        subject: String,
        /// Object label
        object: String,
        /// Required access, e.g. "rw"
        access: String,
    },

    /// Add or replace a rule
    Add {
        #[command(flatten)]
        rules: RulesArgs,
        /// Subject label
        subject: String,
        /// Object label
        object: String,
        /// Granted access, e.g. "rwxa" or "-"
        access: String,
    },

    /// Remove one rule, or every rule of SUBJECT when OBJECT is omitted
    Remove {
        #[command(flatten)]
        rules: RulesArgs,
        /// Subject label
        subject: String,
        /// Object label
        object: Option<String>,
    },

    /// Remove every rule whose object is OBJECT
    RemoveObject {
        #[command(flatten)]
        rules: RulesArgs,
        /// Object label
        object: String,
    },

    /// Rewrite a rule file in another layout
    Convert {
        /// Rule file to read
        input: PathBuf,
        /// Rule file to write
        output: PathBuf,
        /// Output layout (defaults to `output_format` from the config)
        #[arg(long)]
        format: Option<RuleFormat>,
    },

    /// Check label syntax (exit status 1 if any label is invalid)
    Label {
        /// Labels to check
        #[arg(required = true)]
        labels: Vec<String>,
    },

    /// Configuration operations
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the resolved config file path
    Path,
    /// Print the effective configuration
    Show,
    /// Write a default config file
    Init {
        /// Where to write it (defaults to the resolved config path)
        #[arg(long)]
        file: Option<String>,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
