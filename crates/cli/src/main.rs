//! # tally CLI entry point
//!
//! Loads settings and the workspace, runs one subcommand, prints its JSON
//! result and writes the workspace back when the command changed it.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use tally_cli::commands::{Command, execute};
use tally_cli::workspace::Workspace;
use tally_infra::{DocumentService, Settings};

/// Invoicing and stock-ledger toolkit.
#[derive(Parser, Debug)]
#[command(name = "tally", version, about)]
struct Cli {
    /// Workspace file holding documents, movements and reference data.
    #[arg(long, global = true, default_value = "tally.json")]
    workspace: PathBuf,

    /// Optional settings file (TOML or JSON); `TALLY__*` variables override it.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit JSON logs instead of human-readable ones.
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.json_logs {
        tally_observability::init();
    } else {
        tally_observability::init_pretty();
    }

    let settings = Settings::load(cli.config.as_deref()).context("loading settings")?;
    let workspace = Workspace::load(&cli.workspace)?;
    let service = DocumentService::new(workspace.into_stores());

    let mutates = cli.command.mutates();
    let output = execute(cli.command, &service, &settings).await?;

    if mutates {
        Workspace::from_stores(service.stores())
            .await?
            .save(&cli.workspace)?;
        tracing::debug!(path = %cli.workspace.display(), "workspace saved");
    }

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
