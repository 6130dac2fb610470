//! Root CLI structure for persona-rs

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "persona-rs")]
#[command(about = "Command-line tools for Atlus event container files", long_about = None)]
#[command(version)]
#[command(author)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (can be repeated for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// PM1 event container operations
    Pm1 {
        #[command(subcommand)]
        command: crate::commands::pm1::Pm1Commands,
    },
}
