//! Document commit pipeline (application-level orchestration).
//!
//! ```text
//! Document
//!   ↓
//! 1. Load directory + ledger snapshot
//!   ↓
//! 2. Recompute line and document totals
//!   ↓
//! 3. Validate (first failure wins, nothing written)
//!   ↓
//! 4. Add or update the document
//!   ↓
//! 5. New stock-consuming invoice + tracking on: write consumption movements
//! ```
//!
//! Settings are passed per call. Editing an existing invoice never touches
//! the ledger.

use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use tally_catalog::Directory;
use tally_core::{CatalogEntryId, DocumentId, DomainError, MovementId};
use tally_inventory::{LedgerSnapshot, Movement, NewMovement};
use tally_invoicing::{
    Document, DocumentKind, DocumentTotals, DocumentType, LineItem, TaxBasis, ValidationContext,
    ValidationError, compute_document_totals, validate,
};

use crate::bridge::{ConsistencyWarning, InvoiceStockBridge};
use crate::config::Settings;
use crate::ledger::{LedgerError, StockLedger};
use crate::store::{Repository, StoreError, Stores};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommitError {
    /// User-correctable; returned verbatim.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The document could not be read or written. Retry the whole commit.
    #[error("could not save the document: {0}")]
    Persistence(#[from] StoreError),
}

/// Outcome of a successful commit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitReceipt {
    pub document_id: DocumentId,
    pub number: String,
    /// False when an existing document was updated.
    pub created: bool,
    pub totals: DocumentTotals,
    pub movements: Vec<Movement>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<ConsistencyWarning>,
}

/// What a document deletion removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletionReport {
    pub document_id: DocumentId,
    pub movements_removed: usize,
}

#[derive(Clone)]
pub struct DocumentService {
    stores: Stores,
    ledger: StockLedger,
    bridge: InvoiceStockBridge,
}

impl DocumentService {
    pub fn new(stores: Stores) -> Self {
        let ledger = StockLedger::new(stores.movements.clone(), stores.catalog.clone());
        let bridge = InvoiceStockBridge::new(stores.movements.clone());
        Self {
            stores,
            ledger,
            bridge,
        }
    }

    pub fn stores(&self) -> &Stores {
        &self.stores
    }

    pub fn ledger(&self) -> &StockLedger {
        &self.ledger
    }

    /// Totals for unsaved lines, resolving rates from the stored tax rates.
    ///
    /// Amounts too large to represent come back as a validation error.
    pub async fn compute_totals(
        &self,
        lines: &[LineItem],
        kind: &DocumentKind,
    ) -> Result<DocumentTotals, CommitError> {
        let rates = self
            .stores
            .tax_rates
            .get_all()
            .await?
            .into_iter()
            .fold(Directory::new(), Directory::with_tax_rate);
        let totals = compute_document_totals(lines, &rates, &TaxBasis::from(kind))
            .map_err(ValidationError::from)?;
        Ok(totals)
    }

    /// Next number for a document type, against numbers already used by
    /// documents of that type.
    pub async fn propose_number(
        &self,
        document_type: DocumentType,
        settings: &Settings,
    ) -> Result<String, StoreError> {
        let documents = self.stores.documents.get_all().await?;
        let numbers = documents
            .iter()
            .filter(|d| d.document_type() == document_type)
            .map(|d| d.number.as_str());
        Ok(settings.numbering_for(document_type).next(numbers))
    }

    /// Run commit-time validation without writing anything.
    pub async fn validate(&self, document: &Document, settings: &Settings) -> Result<(), CommitError> {
        let directory = self.stores.directory().await?;
        let existing = self.stores.documents.get(document.id).await?.is_some();
        let snapshot = self.validation_snapshot(document.id, existing).await?;
        validate(document, &context(&directory, &snapshot, settings))?;
        Ok(())
    }

    /// Validate and persist a document.
    ///
    /// A new non-proforma invoice with stock tracking on also writes one
    /// consumption movement per product line. A movement failure after the
    /// document was saved does not fail the commit; it comes back as
    /// `CommitReceipt::warning`.
    pub async fn commit(
        &self,
        mut document: Document,
        settings: &Settings,
    ) -> Result<CommitReceipt, CommitError> {
        let directory = self.stores.directory().await?;
        let existing = self.stores.documents.get(document.id).await?.is_some();
        let full = self.ledger.snapshot().await?;
        let movement_numbers: Vec<String> = full.numbers().map(str::to_string).collect();
        let snapshot = if existing {
            full.excluding_document(&document.id)
        } else {
            full
        };

        let totals = document
            .recompute_totals(&directory)
            .map_err(ValidationError::from)?;
        validate(&document, &context(&directory, &snapshot, settings))?;

        if existing {
            self.stores.documents.update(document.clone()).await?;
        } else {
            self.stores.documents.add(document.clone()).await?;
        }
        info!(
            document_id = %document.id,
            number = %document.number,
            created = !existing,
            total_ttc = %totals.total_ttc,
            "document committed"
        );

        let report = if !existing && settings.stock_tracking_enabled && document.consumes_stock() {
            self.bridge
                .consume(&document, &directory, &settings.movement_scheme(), movement_numbers)
                .await
        } else {
            Default::default()
        };

        Ok(CommitReceipt {
            document_id: document.id,
            number: document.number,
            created: !existing,
            totals,
            movements: report.created,
            warning: report.warning,
        })
    }

    /// Delete a document and cascade to the movements it generated.
    pub async fn delete_document(&self, id: DocumentId) -> Result<DeletionReport, LedgerError> {
        let document = self
            .stores
            .documents
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("document {id}")))?;
        let movements_removed = self.ledger.delete_for_document(id).await?;
        if let Err(err) = self.stores.documents.delete(id).await {
            warn!(document_id = %id, error = %err, "movements removed but document deletion failed");
            return Err(err.into());
        }
        info!(document_id = %id, number = %document.number, movements_removed, "document deleted");
        Ok(DeletionReport {
            document_id: id,
            movements_removed,
        })
    }

    pub async fn balance_of(&self, entry: CatalogEntryId) -> Result<Decimal, StoreError> {
        self.ledger.balance_of(entry).await
    }

    pub async fn movements_of(&self, entry: CatalogEntryId) -> Result<Vec<Movement>, StoreError> {
        self.ledger.movements_of(entry).await
    }

    pub async fn record_movement(&self, draft: NewMovement) -> Result<Movement, LedgerError> {
        self.ledger.record_movement(draft).await
    }

    pub async fn update_movement(
        &self,
        id: MovementId,
        draft: NewMovement,
    ) -> Result<Movement, LedgerError> {
        self.ledger.update_movement(id, draft).await
    }

    pub async fn delete_movement(&self, id: MovementId) -> Result<(), LedgerError> {
        self.ledger.delete_movement(id).await
    }

    pub async fn propose_movement_number(&self, settings: &Settings) -> Result<String, StoreError> {
        self.ledger.propose_number(&settings.movement_scheme()).await
    }

    async fn validation_snapshot(
        &self,
        document: DocumentId,
        existing: bool,
    ) -> Result<LedgerSnapshot, StoreError> {
        let snapshot = self.ledger.snapshot().await?;
        Ok(if existing {
            snapshot.excluding_document(&document)
        } else {
            snapshot
        })
    }
}

fn context<'a>(
    directory: &'a Directory,
    ledger: &'a LedgerSnapshot,
    settings: &Settings,
) -> ValidationContext<'a> {
    ValidationContext {
        catalog: directory,
        parties: directory,
        ledger,
        stock_tracking_enabled: settings.stock_tracking_enabled,
    }
}
