use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "carryover",
    about = "Carry values from a legacy JSON document into its new version",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Merge an old document into a new one
    Merge(MergeArgs),
    /// Validate a strategy file and summarise its rules
    Check(CheckArgs),
}

#[derive(Args)]
pub struct MergeArgs {
    /// The legacy document
    pub old_file: PathBuf,
    /// The authoritative document
    pub new_file: PathBuf,
    /// Where to write the result (default: <new dir>/<new stem>_merged.json)
    pub output_file: Option<PathBuf>,
    /// Exclude paths starting with PATTERN (repeatable, applied in order)
    #[arg(short = 'x', long = "exclude", value_name = "PATTERN")]
    pub exclude: Vec<String>,
    /// TOML strategy file
    #[arg(short, long, value_name = "FILE")]
    pub strategy: Option<PathBuf>,
}

#[derive(Args)]
pub struct CheckArgs {
    pub strategy: PathBuf,
}
