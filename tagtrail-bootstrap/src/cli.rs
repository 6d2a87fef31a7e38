use std::path::PathBuf;

use clap::{Parser, Subcommand};
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "tagtrail")]
#[command(about = "RFID route reconstruction service", long_about = None)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Serve the HTTP API and the optional batch schedule
    Serve,
    /// Process one batch for an account and print the counts
    RunOnce {
        #[arg(long)]
        account: Uuid,
        #[arg(long)]
        batch_size: Option<usize>,
    },
}

impl Cli {
    pub fn resolved_command(&self) -> &Command {
        self.command.as_ref().unwrap_or(&Command::Serve)
    }
}
