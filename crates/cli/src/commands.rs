//! Subcommands and their handlers.
//!
//! Handlers delegate to `DocumentService`; each returns the JSON value the
//! binary prints on stdout.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Subcommand, ValueEnum};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use tally_core::{CatalogEntryId, DocumentId, MovementId};
use tally_infra::{CommitError, DocumentService, Settings};
use tally_inventory::NewMovement;
use tally_invoicing::{Document, DocumentType};

/// What to propose a number for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum NumberKind {
    Invoice,
    PurchaseOrder,
    Movement,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Compute line and document totals for a document file.
    Totals {
        #[arg(long)]
        document: PathBuf,
    },
    /// Propose the next document or movement number.
    NextNumber {
        #[arg(long, value_enum)]
        kind: NumberKind,
    },
    /// Validate a document file without saving it.
    Validate {
        #[arg(long)]
        document: PathBuf,
    },
    /// Validate and save a document file.
    Commit {
        #[arg(long)]
        document: PathBuf,
    },
    /// Delete a document and the stock movements it generated.
    DeleteDocument {
        #[arg(long)]
        id: DocumentId,
    },
    /// Current stock balance of a catalog entry.
    Balance {
        #[arg(long)]
        entry: CatalogEntryId,
    },
    /// Movements of a catalog entry, by date then number.
    Movements {
        #[arg(long)]
        entry: CatalogEntryId,
    },
    /// Record a supply, return or write-off from a movement file.
    RecordMovement {
        #[arg(long)]
        movement: PathBuf,
    },
    /// Replace a manually recorded movement with the content of a movement file.
    UpdateMovement {
        #[arg(long)]
        id: MovementId,
        #[arg(long)]
        movement: PathBuf,
    },
    /// Delete a manually recorded movement.
    DeleteMovement {
        #[arg(long)]
        id: MovementId,
    },
}

impl Command {
    /// Whether the workspace must be written back afterwards.
    pub fn mutates(&self) -> bool {
        matches!(
            self,
            Command::Commit { .. }
                | Command::DeleteDocument { .. }
                | Command::RecordMovement { .. }
                | Command::UpdateMovement { .. }
                | Command::DeleteMovement { .. }
        )
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing {}", path.display()))
}

pub async fn execute(
    command: Command,
    service: &DocumentService,
    settings: &Settings,
) -> anyhow::Result<Value> {
    let output = match command {
        Command::Totals { document } => {
            let document: Document = read_json(&document)?;
            let totals = service.compute_totals(&document.lines, &document.kind).await?;
            serde_json::to_value(totals)?
        }
        Command::NextNumber { kind } => {
            let number = match kind {
                NumberKind::Invoice => service.propose_number(DocumentType::Invoice, settings).await?,
                NumberKind::PurchaseOrder => {
                    service.propose_number(DocumentType::PurchaseOrder, settings).await?
                }
                NumberKind::Movement => service.propose_movement_number(settings).await?,
            };
            json!({ "number": number })
        }
        Command::Validate { document } => {
            let document: Document = read_json(&document)?;
            match service.validate(&document, settings).await {
                Ok(()) => json!({ "ok": true }),
                Err(CommitError::Validation(err)) => json!({ "ok": false, "error": err.message }),
                Err(err) => return Err(err.into()),
            }
        }
        Command::Commit { document } => {
            let document: Document = read_json(&document)?;
            let receipt = service.commit(document, settings).await?;
            serde_json::to_value(receipt)?
        }
        Command::DeleteDocument { id } => serde_json::to_value(service.delete_document(id).await?)?,
        Command::Balance { entry } => {
            let balance = service.balance_of(entry).await?;
            json!({ "catalogEntryId": entry, "balance": balance })
        }
        Command::Movements { entry } => serde_json::to_value(service.movements_of(entry).await?)?,
        Command::RecordMovement { movement } => {
            let draft: NewMovement = read_json(&movement)?;
            serde_json::to_value(service.record_movement(draft).await?)?
        }
        Command::UpdateMovement { id, movement } => {
            let draft: NewMovement = read_json(&movement)?;
            serde_json::to_value(service.update_movement(id, draft).await?)?
        }
        Command::DeleteMovement { id } => {
            service.delete_movement(id).await?;
            json!({ "deleted": id })
        }
    };
    Ok(output)
}
