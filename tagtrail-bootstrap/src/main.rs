use anyhow::Result;
use clap::Parser;

use tagtrail_bootstrap::cli::{Cli, Command};

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    if json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    match cli.resolved_command() {
        Command::Serve => tagtrail_bootstrap::run_server(cli.config.as_deref()).await,
        Command::RunOnce {
            account,
            batch_size,
        } => tagtrail_bootstrap::run_once(cli.config.as_deref(), *account, *batch_size).await,
    }
}
