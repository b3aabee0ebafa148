//! Command-line interface for safeharbor.
//!
//! This module provides the CLI structure for the `harbor` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    CheckCommand, ConfigCommand, DraftCommand, ResourcesCommand, SlideStep, SlidesCommand,
    SubmitCommand,
};

use crate::logging::Verbosity;

/// harbor - Drive the safeharbor report form and resources page
///
/// Inspect and validate saved report drafts, run the simulated submission,
/// and exercise the resources slider and directory from the terminal.
#[derive(Debug, Parser)]
#[command(name = "harbor")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Inspect or clear saved drafts
    #[command(subcommand)]
    Draft(DraftCommand),

    /// Validate a draft as a submit would
    Check(CheckCommand),

    /// Run the simulated submission for a draft
    Submit(SubmitCommand),

    /// Drive the resources slider
    Slides(SlidesCommand),

    /// Search or filter a resource list
    #[command(subcommand)]
    Resources(ResourcesCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.verbose)
    }
}
