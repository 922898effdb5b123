//! Command-line argument parsing for aimalign
//!
//! Provides clap-based CLI with one subcommand per pipeline stage.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// aimalign - classify course learning outcomes against the BYU Aims and
/// suggest outcomes for under-represented aims
#[derive(Parser, Debug)]
#[command(name = "aimalign")]
#[command(version = "0.1.0")]
#[command(about = "Resumable BYU-Aims enrichment pipeline for learning outcomes", long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override the oracle model for both stages
    #[arg(short, long)]
    pub model: Option<String>,

    /// Verbosity level: default (normal), -v (verbose)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress progress output, keep the final summary)
    #[arg(short, long)]
    pub quiet: bool,

    /// Subcommand
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Classify each learning outcome against the four aims
    Classify {
        /// Cleaned learning-outcomes CSV
        #[arg(long, default_value = "learning_outcomes.csv")]
        input: PathBuf,

        /// Classification output CSV (doubles as the checkpoint)
        #[arg(long, default_value = "classified_learning_outcomes.csv")]
        output: PathBuf,

        /// Flush progress after this many classifications
        #[arg(long)]
        save_frequency: Option<usize>,
    },

    /// Generate three suggested outcomes per non-modal aim for each course
    Suggest {
        /// Classified learning-outcomes CSV (output of the classify stage)
        #[arg(long, default_value = "classified_learning_outcomes.csv")]
        input: PathBuf,

        /// Suggestion output CSV (doubles as the checkpoint)
        #[arg(long, default_value = "suggested_learning_outcomes.csv")]
        output: PathBuf,

        /// Flush progress after this many generated units
        #[arg(long)]
        save_frequency: Option<usize>,
    },

    /// Run both stages back to back
    Run {
        /// Cleaned learning-outcomes CSV
        #[arg(long, default_value = "learning_outcomes.csv")]
        input: PathBuf,

        /// Intermediate classification CSV
        #[arg(long, default_value = "classified_learning_outcomes.csv")]
        classified: PathBuf,

        /// Suggestion output CSV
        #[arg(long, default_value = "suggested_learning_outcomes.csv")]
        output: PathBuf,

        /// Flush progress after this many completed units
        #[arg(long)]
        save_frequency: Option<usize>,
    },

    /// Display current configuration
    Config,
}

/// Verbosity level enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
}

impl Args {
    /// Get verbosity level based on flags
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else if self.verbose > 0 {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        }
    }
}

impl Verbosity {
    /// Check if progress bars should be shown
    pub fn show_progress(&self) -> bool {
        !matches!(self, Verbosity::Quiet)
    }

    /// Check if per-unit detail should be shown
    pub fn show_units(&self) -> bool {
        matches!(self, Verbosity::Verbose)
    }
}
