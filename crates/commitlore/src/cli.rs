//! CLI definition.

use anyhow::Result;
use clap::Parser;

use crate::commands;

/// Parse commit messages into structured JSON records.
#[derive(Debug, Parser)]
#[command(name = "commitlore")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    #[command(flatten)]
    pub parse: commands::parse::ParseArgs,
}

impl Cli {
    /// Runs the CLI.
    pub fn run(self) -> Result<()> {
        commands::parse::run(self.parse)
    }
}
