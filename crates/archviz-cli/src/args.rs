//! Command-line argument definitions for the archviz CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. A subcommand selects the operation; configuration file
//! selection and logging verbosity apply to every subcommand.

use clap::{Parser, Subcommand};

/// Command-line arguments for the archviz diagram tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Path to configuration file (TOML)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info", global = true)]
    pub log_level: String,
}

/// The operation to run.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate and render a JSON diagram spec
    Render {
        /// Path to the JSON spec file
        input: String,

        /// Also write the result JSON to this file
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Find a diagram spec embedded in free text
    Extract {
        /// Path to the text file, or `-` for standard input
        input: String,
    },

    /// Ask the configured language model, rendering any diagram it describes
    Chat {
        /// The question or request
        prompt: String,

        /// Print the artifact path after the response
        #[arg(long)]
        download: bool,

        /// Override the configured model identifier
        #[arg(long)]
        model: Option<String>,
    },

    /// List the icon registry and which identifiers pass the icon policy
    Icons,
}
