//! Command-line interface definitions for relay.
//!
//! This module contains all CLI argument parsing structures using clap's derive macros.
//! The CLI definitions are shared between the main binary and build tools (like xtask)
//! for man page generation.
//!
//! Note: Field-level documentation is provided via clap attributes (#[arg(help = "...")]),
//! so we allow missing_docs for this module to avoid redundant documentation.

#![allow(missing_docs)]

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use uuid::Uuid;

/// Main CLI structure for relay.
#[derive(Parser)]
#[command(
    name = "relay",
    version = crate::VERSION,
    about = "Game library scanner and launch contract resolver",
    long_about = "Scans game folders, picks their main executables and resolves portable launch contracts"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress informational messages
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Flags shared by the scanning commands.
#[derive(clap::Args, Debug, Clone, Copy, Default)]
pub struct ScanArgs {
    /// Rebuild every folder, ignoring the cache and known games
    #[arg(long)]
    pub full: bool,

    /// Do not rebuild folders that belong to registered games
    #[arg(long)]
    pub skip_known: bool,

    /// Do not reuse cached folders even when unchanged
    #[arg(long)]
    pub no_incremental: bool,
}

/// All available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Scan the configured roots for game folders
    Scan {
        #[command(flatten)]
        args: ScanArgs,
    },

    /// Scan, then register the main executable of every folder
    AddAll {
        #[command(flatten)]
        args: ScanArgs,
    },

    /// Resolve a registered game's launch contract and print the command line
    Launch {
        /// Game key
        #[arg(short, long)]
        key: Uuid,

        /// Resolve this tool executable instead of the main one
        #[arg(short, long)]
        tool: Option<String>,
    },

    /// List registered games
    List,

    /// Hide an executable from all scans
    Hide {
        /// Absolute path of the executable
        exe_path: String,
    },

    /// Validate the configuration
    Validate,

    /// Generate shell completions
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
