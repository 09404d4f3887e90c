//! Command-line interface

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};
use commands::{CleanCommand, ConcatCommand, ListCommand, RunCommand, ValidateCommand};
use std::ffi::OsString;

/// Bounded-concurrency batch runner
#[derive(Debug, Parser, Clone)]
#[command(name = "taskflow")]
#[command(author = "Taskflow Contributors")]
#[command(version = "0.1.0")]
#[command(about = "Run task batches with bounded concurrency", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Available commands
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run a batch plan
    Run(RunCommand),

    /// Validate a batch plan
    Validate(ValidateCommand),

    /// Concatenate files in order
    Concat(ConcatCommand),

    /// Empty or remove a directory
    Clean(CleanCommand),

    /// List files under a directory
    List(ListCommand),
}

impl Cli {
    /// Parse CLI arguments from environment
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Parse CLI arguments from a slice
    pub fn try_parse_from<I, T>(itr: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(itr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_with_limit() {
        let cli = Cli::try_parse_from(["taskflow", "run", "-f", "plan.yaml", "--limit", "0"]).unwrap();
        match cli.command {
            Command::Run(cmd) => {
                assert_eq!(cmd.file, "plan.yaml");
                assert_eq!(cmd.limit, Some(0));
                assert!(!cmd.json);
            }
            other => panic!("expected run, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_concat() {
        let cli = Cli::try_parse_from(["taskflow", "-v", "concat", "-o", "out", "a", "b"]).unwrap();
        assert!(cli.verbose);
        match cli.command {
            Command::Concat(cmd) => {
                assert_eq!(cmd.output.to_str(), Some("out"));
                assert_eq!(cmd.files.len(), 2);
            }
            other => panic!("expected concat, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_clean_and_list() {
        let cli = Cli::try_parse_from(["taskflow", "clean", "target", "--remove"]).unwrap();
        match cli.command {
            Command::Clean(cmd) => {
                assert_eq!(cmd.dir.to_str(), Some("target"));
                assert!(cmd.remove);
            }
            other => panic!("expected clean, got {:?}", other),
        }

        let cli = Cli::try_parse_from(["taskflow", "list", "-r", "src"]).unwrap();
        match cli.command {
            Command::List(cmd) => assert!(cmd.recursive),
            other => panic!("expected list, got {:?}", other),
        }
    }

    #[test]
    fn test_concat_requires_files() {
        assert!(Cli::try_parse_from(["taskflow", "concat", "-o", "out"]).is_err());
    }
}
