use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tally_catalog::CatalogLookup;
use tally_core::{CatalogEntryId, DocumentId, DomainError, DomainResult, Entity, MovementId, PartyId};

/// Whether a movement adds to or removes from stock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    In,
    Out,
}

/// Business reason for a movement. The nature fixes the direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Nature {
    #[serde(rename = "supply")]
    Supply,
    #[serde(rename = "return")]
    ReturnToStock,
    #[serde(rename = "writeoff")]
    WriteOff,
    /// System-generated when a stock-consuming invoice is committed.
    #[serde(rename = "invoice-consumption")]
    InvoiceConsumption,
}

impl Nature {
    pub fn direction(self) -> Direction {
        match self {
            Nature::Supply | Nature::ReturnToStock => Direction::In,
            Nature::WriteOff | Nature::InvoiceConsumption => Direction::Out,
        }
    }

    /// Protected natures can only be removed by deleting their source document.
    pub fn is_system_generated(self) -> bool {
        self == Nature::InvoiceConsumption
    }

    fn requires_supplier(self) -> bool {
        matches!(self, Nature::Supply | Nature::ReturnToStock)
    }

    fn requires_detail(self) -> bool {
        matches!(self, Nature::ReturnToStock | Nature::WriteOff)
    }
}

/// One stock-ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Movement {
    pub id: MovementId,
    pub number: String,
    pub date: NaiveDate,
    /// Date the goods physically moved, when it differs from `date`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_date: Option<NaiveDate>,
    pub catalog_entry_id: CatalogEntryId,
    pub quantity: Decimal,
    pub direction: Direction,
    pub nature: Nature,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supplier_id: Option<PartyId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Set iff `nature` is invoice-consumption.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_document_id: Option<DocumentId>,
}

/// Input for a manually recorded movement (supply, return, write-off).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMovement {
    #[serde(default)]
    pub number: String,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub actual_date: Option<NaiveDate>,
    #[serde(default)]
    pub catalog_entry_id: Option<CatalogEntryId>,
    pub quantity: Decimal,
    pub nature: Nature,
    #[serde(default)]
    pub supplier_id: Option<PartyId>,
    #[serde(default)]
    pub detail: Option<String>,
}

impl Movement {
    /// Validate and build a manually recorded movement.
    ///
    /// The direction is always derived from the nature. Invoice-consumption
    /// movements are refused here; only the invoice commit produces them.
    pub fn record<C>(draft: NewMovement, catalog: &C) -> DomainResult<Movement>
    where
        C: CatalogLookup + ?Sized,
    {
        let number = draft.number.trim();
        if number.is_empty() {
            return Err(DomainError::validation("movement number is required"));
        }
        let date = draft
            .date
            .ok_or_else(|| DomainError::validation("movement date is required"))?;
        let entry_id = draft
            .catalog_entry_id
            .ok_or_else(|| DomainError::validation("select a catalog entry"))?;
        let entry = catalog
            .entry(&entry_id)
            .ok_or_else(|| DomainError::validation(format!("unknown catalog entry {entry_id}")))?;
        if !entry.is_product() {
            return Err(DomainError::validation(
                "only products are tracked in stock",
            ));
        }
        if draft.quantity <= Decimal::ZERO {
            return Err(DomainError::validation(
                "movement quantity must be greater than 0",
            ));
        }
        if draft.nature.is_system_generated() {
            return Err(DomainError::validation(
                "invoice-consumption movements are generated by invoices and cannot be recorded manually",
            ));
        }
        if draft.nature.requires_supplier() && draft.supplier_id.is_none() {
            return Err(DomainError::validation(
                "a supplier is required for this movement nature",
            ));
        }
        let detail = draft
            .detail
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
        if draft.nature.requires_detail() && detail.is_none() {
            return Err(DomainError::validation(
                "a detail is required for a return to stock or a write-off",
            ));
        }

        Ok(Movement {
            id: MovementId::new(),
            number: number.to_string(),
            date,
            actual_date: draft.actual_date.or(Some(date)),
            catalog_entry_id: entry_id,
            quantity: draft.quantity,
            direction: draft.nature.direction(),
            nature: draft.nature,
            supplier_id: draft.supplier_id,
            detail,
            source_document_id: None,
        })
    }

    /// Outbound movement consuming stock for an invoice line.
    pub fn invoice_consumption(
        number: impl Into<String>,
        date: NaiveDate,
        catalog_entry_id: CatalogEntryId,
        quantity: Decimal,
        document_id: DocumentId,
        document_number: &str,
    ) -> Movement {
        Movement {
            id: MovementId::new(),
            number: number.into(),
            date,
            actual_date: Some(date),
            catalog_entry_id,
            quantity,
            direction: Nature::InvoiceConsumption.direction(),
            nature: Nature::InvoiceConsumption,
            supplier_id: None,
            detail: Some(format!("invoice {document_number}")),
            source_document_id: Some(document_id),
        }
    }

    /// Quantity with the sign of its direction.
    pub fn signed_quantity(&self) -> Decimal {
        match self.direction {
            Direction::In => self.quantity,
            Direction::Out => -self.quantity,
        }
    }

    pub fn is_protected(&self) -> bool {
        self.nature.is_system_generated()
    }

    /// Refuse direct deletion of a system-generated movement.
    pub fn ensure_deletable(&self) -> DomainResult<()> {
        self.ensure_manual()
    }

    /// Replace this movement's content with `draft`, keeping its id.
    ///
    /// Runs the same rules as [`Movement::record`], so the direction is
    /// re-derived from the (possibly changed) nature. System-generated
    /// movements are refused.
    pub fn revise<C>(&self, draft: NewMovement, catalog: &C) -> DomainResult<Movement>
    where
        C: CatalogLookup + ?Sized,
    {
        self.ensure_manual()?;
        let revised = Movement::record(draft, catalog)?;
        Ok(Movement {
            id: self.id,
            ..revised
        })
    }

    fn ensure_manual(&self) -> DomainResult<()> {
        if !self.is_protected() {
            return Ok(());
        }
        match self.source_document_id {
            Some(document) => Err(DomainError::guard(self.number.clone(), document)),
            None => Err(DomainError::orphan_guard(self.number.clone())),
        }
    }
}

impl Entity for Movement {
    type Id = MovementId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
