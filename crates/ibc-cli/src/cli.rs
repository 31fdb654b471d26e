//! CLI argument definitions: top-level `Cli` struct and `Commands` enum.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ibc")]
#[command(about = "Search and verify inductive barrier certificate chains")]
#[command(version)]
pub(crate) struct Cli {
    /// Built-in system: linear-1d | lotka-volterra
    #[arg(long, global = true, default_value = "linear-1d")]
    pub(crate) system: String,

    /// JSON file with k_max and region bounds, replacing the system defaults
    #[arg(long, global = true)]
    pub(crate) config: Option<PathBuf>,

    /// Solver backend: z3 | cvc5 | z3-process
    #[arg(long, global = true, default_value = "z3")]
    pub(crate) solver: String,

    /// Per-check solver timeout in seconds (0 = none)
    #[arg(long, global = true, default_value_t = 0)]
    pub(crate) timeout_secs: u64,

    /// Wall-clock limit for the whole run in seconds (0 = none)
    #[arg(long, global = true, default_value_t = 0)]
    pub(crate) overall_timeout_secs: u64,

    /// Output format: text | json
    #[arg(long, global = true, default_value = "text")]
    pub(crate) format: String,

    /// Write an SVG plot of the resulting chain here
    #[arg(long, global = true)]
    pub(crate) out: Option<PathBuf>,

    /// Samples per axis for plotting and the numeric re-check
    #[arg(long, global = true, default_value_t = 100)]
    pub(crate) samples: usize,

    #[command(subcommand)]
    pub(crate) command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Try chain lengths k = 0..=k_max until the solver finds a chain
    Search {
        /// Override the configured k_max
        #[arg(long)]
        k_max: Option<u32>,
    },

    /// Check the system's known chain
    Verify {
        /// Negate the constant term of B_0 first
        #[arg(long)]
        broken: bool,

        /// Also check each condition separately
        #[arg(long)]
        diagnose: bool,
    },

    /// Print the SMT-LIB2 query for one chain length
    DumpSmt {
        /// Chain length
        #[arg(long, default_value_t = 1)]
        k: u32,

        /// Write the script here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
}
