//! # ptreval-config
//!
//! **Tier 4 (Configuration)**
//!
//! This crate defines the CLI arguments and the evaluation profile file.
//!
//! ## What belongs here
//! * Clap `Parser`, `Args`, `Subcommand` structs
//! * Profile file struct definitions (Serde) and their validation
//! * Default values
//!
//! ## What does NOT belong here
//! * Business logic
//! * I/O operations (except profile file parsing)
//! * Resolution of CLI flags against a profile (the `ptreval` crate does that)

mod profile;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

pub use profile::{
    ConfigError, ConfigProfile, DEFAULT_PROFILE, DEFAULT_PROFILES_FILE, DEFAULT_SEED,
    DiscoverConfig, Profile, ProfilesFile,
};

/// `ptreval` compares a pointer-sensitive and a pointer-insensitive run of a
/// static-analysis tool over a sampled corpus.
#[derive(Parser, Debug)]
#[command(name = "ptreval", version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Verbose output (repeat for more detail).
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Disable progress spinners.
    #[arg(long, global = true)]
    pub no_progress: bool,

    /// Evaluation profile to use.
    #[arg(long, global = true, value_name = "NAME")]
    pub profile: Option<String>,

    /// Profiles file (defaults to `ptreval.toml` in the working directory).
    #[arg(long, global = true, value_name = "FILE")]
    pub profiles: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Walk a source tree and write the cost catalog.
    Discover(DiscoverArgs),

    /// Split the catalog into one balanced input manifest per configuration.
    Distribute(DistributeArgs),

    /// Reduce each configuration's measurement records into one summary.
    Summarize(SummarizeArgs),

    /// Compare the configuration summaries pairwise.
    Compare(CompareArgs),

    /// Assemble the final evaluation report.
    Report(ReportArgs),

    /// Generate shell completions.
    Completions(CompletionsArgs),
}

#[derive(Args, Debug, Clone)]
pub struct DiscoverArgs {
    /// Root of the source tree to sample.
    #[arg(long, value_name = "DIR")]
    pub source: PathBuf,

    /// Output directory.
    #[arg(long, value_name = "DIR")]
    pub out: PathBuf,

    /// File extension to include, without the dot. Repeatable.
    #[arg(long = "extension", value_name = "EXT")]
    pub extensions: Vec<String>,

    /// Character that starts a line comment.
    #[arg(long, value_name = "CHAR")]
    pub comment_marker: Option<char>,

    /// Regex whose first capture group is the path of an included file.
    #[arg(long, value_name = "REGEX")]
    pub include_pattern: Option<String>,

    /// Maximum include nesting depth, counting the root file.
    #[arg(long, value_name = "N")]
    pub max_include_depth: Option<usize>,
}

#[derive(Args, Debug, Clone)]
pub struct DistributeArgs {
    /// Discovery report to distribute (defaults to `<out>/discover.json`).
    #[arg(long, value_name = "FILE")]
    pub discovery: Option<PathBuf>,

    /// Output directory.
    #[arg(long, value_name = "DIR")]
    pub out: PathBuf,

    /// Number of buckets (defaults to the number of configurations).
    #[arg(long, value_name = "N")]
    pub buckets: Option<usize>,

    /// Seed for the bucket shuffle.
    #[arg(long, value_name = "SEED")]
    pub seed: Option<String>,

    /// Keep at most N files per configuration.
    #[arg(long, value_name = "N")]
    pub limit: Option<usize>,
}

#[derive(Args, Debug, Clone)]
pub struct SummarizeArgs {
    /// Output directory holding one subdirectory per configuration.
    #[arg(long, value_name = "DIR")]
    pub out: PathBuf,

    /// Summarize only this configuration.
    #[arg(long, value_name = "NAME")]
    pub config: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct CompareArgs {
    /// Output directory holding the configuration summaries.
    #[arg(long, value_name = "DIR")]
    pub out: PathBuf,

    /// Also compare file by file, whatever the profile says.
    #[arg(long)]
    pub per_file: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ReportArgs {
    /// Output directory of the evaluation.
    #[arg(long, value_name = "DIR")]
    pub out: PathBuf,
}

#[derive(Args, Debug, Clone)]
pub struct CompletionsArgs {
    /// Shell to generate completions for.
    #[arg(value_enum)]
    pub shell: Shell,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Shell {
    Bash,
    Elvish,
    Fish,
    Powershell,
    Zsh,
}
