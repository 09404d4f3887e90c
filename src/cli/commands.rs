//! CLI command definitions

use clap::Args;
use std::path::PathBuf;

/// Run a batch plan
#[derive(Debug, Args, Clone)]
pub struct RunCommand {
    /// Path to batch plan YAML file
    #[arg(short, long)]
    pub file: String,

    /// Concurrency limit, overriding the plan (0 = unbounded)
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Output results in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Validate a batch plan
#[derive(Debug, Args, Clone)]
pub struct ValidateCommand {
    /// Path to batch plan YAML file
    #[arg(short, long)]
    pub file: String,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Concatenate files in order
#[derive(Debug, Args, Clone)]
pub struct ConcatCommand {
    /// Destination file (truncated first)
    #[arg(short, long)]
    pub output: PathBuf,

    /// Input files, in order
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

/// Empty a directory, or remove it entirely
#[derive(Debug, Args, Clone)]
pub struct CleanCommand {
    /// Directory to clean
    pub dir: PathBuf,

    /// Remove the directory itself as well
    #[arg(long)]
    pub remove: bool,
}

/// List a directory's files and subdirectories
#[derive(Debug, Args, Clone)]
pub struct ListCommand {
    /// Directory to list
    pub dir: PathBuf,

    /// Descend into subdirectories
    #[arg(short, long)]
    pub recursive: bool,
}
