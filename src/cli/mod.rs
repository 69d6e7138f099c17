//! CLI module for deepr
//!
//! Provides command-line interface parsing and handling for the deepr binary.
//! Uses clap for argument parsing and owo-colors for colored terminal output.

pub mod init;
pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// deepr - deep research followed by report elaboration
#[derive(Parser, Debug)]
#[command(
    name = "deepr",
    author = "Dirmacs <build@dirmacs.com>",
    version,
    about = "deepr - Deep research followed by report elaboration",
    long_about = "Runs a single Firecrawl deep research call for a topic, has an LLM agent\n\
                  organize the findings into a cited report, then has a second agent\n\
                  expand it with explanations, examples and case studies.",
    after_help = "EXAMPLES:\n    \
                  deepr init                                    # Write deepr.toml and .env.example\n    \
                  deepr research \"quantum computing\"            # Print the final report\n    \
                  deepr research \"quantum computing\" --save     # Also write quantum_computing_report.md\n    \
                  deepr config --validate                       # Check the configuration"
)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "deepr.toml", global = true)]
    pub config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Research a topic and print the enhanced report
    Research {
        /// Topic to research
        topic: String,

        /// Write the final report to this file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write the final report to <topic>_report.md
        #[arg(short, long)]
        save: bool,

        /// Print the initial report before elaboration starts
        #[arg(long)]
        show_initial: bool,

        /// Print the full run output as JSON instead of the report
        #[arg(long)]
        json: bool,

        /// Return a "research unavailable" report if deep research fails
        #[arg(long)]
        fail_fast: bool,

        /// Model-provider API key (overrides config and environment)
        #[arg(long, value_name = "KEY")]
        openai_key: Option<String>,

        /// Firecrawl API key (overrides config and FIRECRAWL_API_KEY)
        #[arg(long, value_name = "KEY")]
        firecrawl_key: Option<String>,
    },

    /// Write a commented deepr.toml and .env.example
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Overwrite existing files
        #[arg(short, long)]
        force: bool,
    },

    /// Show the effective configuration
    Config {
        /// Validate the configuration file
        #[arg(long)]
        validate: bool,
    },
}

impl Cli {
    /// Parse CLI arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

/// File name used by `--save`.
///
/// Every character other than a letter, digit, `-` or `_` becomes `_`, so the
/// result is always a single path component in the working directory.
pub fn report_filename(topic: &str) -> String {
    let stem: String = topic
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{}_report.md", stem)
}
