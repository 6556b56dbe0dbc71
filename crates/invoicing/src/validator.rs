//! Commit-time document validation.
//!
//! Rules run in a fixed order and stop at the first failure. Validation never
//! touches the ledger; it only reads the snapshot it is handed.

use rust_decimal::Decimal;
use thiserror::Error;

use tally_catalog::{CatalogLookup, PartyDirectory};
use tally_core::DomainError;
use tally_inventory::LedgerSnapshot;

use crate::document::{Document, DocumentKind};
use crate::totals::{AmountOutOfRange, compute_line};

/// The rule a document failed, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationRule {
    RequiredNumber,
    RequiredParty,
    UnknownParty,
    RequiredDate,
    AtLeastOneLine,
    LineCatalogEntry,
    LineQuantity,
    LineUnitPrice,
    AmountOutOfRange,
    MinimumPrice,
    StockAvailability,
    OfferValidity,
}

/// First failed rule plus a message fit for the end user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ValidationError {
    pub rule: ValidationRule,
    pub message: String,
}

impl ValidationError {
    fn new(rule: ValidationRule, message: impl Into<String>) -> Self {
        Self {
            rule,
            message: message.into(),
        }
    }
}

impl From<AmountOutOfRange> for ValidationError {
    fn from(_: AmountOutOfRange) -> Self {
        Self::new(
            ValidationRule::AmountOutOfRange,
            "document amounts are too large to compute",
        )
    }
}

impl From<ValidationError> for DomainError {
    fn from(value: ValidationError) -> Self {
        DomainError::Validation(value.message)
    }
}

/// Everything validation reads besides the document itself.
#[derive(Clone, Copy)]
pub struct ValidationContext<'a> {
    pub catalog: &'a dyn CatalogLookup,
    pub parties: &'a dyn PartyDirectory,
    pub ledger: &'a LedgerSnapshot,
    pub stock_tracking_enabled: bool,
}

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

/// Validate a document before it is persisted.
pub fn validate(document: &Document, ctx: &ValidationContext<'_>) -> Result<(), ValidationError> {
    check_header(document, ctx)?;
    check_lines(document, ctx)?;
    check_amounts(document)?;
    check_price_floors(document, ctx)?;
    check_stock(document, ctx)?;
    check_proforma(document)
}

fn check_header(document: &Document, ctx: &ValidationContext<'_>) -> Result<(), ValidationError> {
    if document.number.trim().is_empty() {
        return Err(ValidationError::new(
            ValidationRule::RequiredNumber,
            "document number is required",
        ));
    }
    let party_id = document.party_id.ok_or_else(|| {
        ValidationError::new(ValidationRule::RequiredParty, "select a client or supplier")
    })?;
    if ctx.parties.party(&party_id).is_none() {
        return Err(ValidationError::new(
            ValidationRule::UnknownParty,
            format!("unknown client or supplier {party_id}"),
        ));
    }
    if document.date.is_none() {
        return Err(ValidationError::new(
            ValidationRule::RequiredDate,
            "date is required",
        ));
    }
    Ok(())
}

fn check_lines(document: &Document, ctx: &ValidationContext<'_>) -> Result<(), ValidationError> {
    if document.lines.is_empty() {
        return Err(ValidationError::new(
            ValidationRule::AtLeastOneLine,
            "add at least one line",
        ));
    }
    for (idx, line) in document.lines.iter().enumerate() {
        let n = idx + 1;
        let Some(entry_id) = line.catalog_entry_id else {
            return Err(ValidationError::new(
                ValidationRule::LineCatalogEntry,
                format!("line {n}: select a catalog entry"),
            ));
        };
        if ctx.catalog.entry(&entry_id).is_none() {
            return Err(ValidationError::new(
                ValidationRule::LineCatalogEntry,
                format!("line {n}: unknown catalog entry {entry_id}"),
            ));
        }
        if line.quantity <= Decimal::ZERO {
            return Err(ValidationError::new(
                ValidationRule::LineQuantity,
                format!("line {n}: quantity must be greater than 0"),
            ));
        }
        if line.unit_price < Decimal::ZERO {
            return Err(ValidationError::new(
                ValidationRule::LineUnitPrice,
                format!("line {n}: unit price must not be negative"),
            ));
        }
    }
    Ok(())
}

fn check_amounts(document: &Document) -> Result<(), ValidationError> {
    for (idx, line) in document.lines.iter().enumerate() {
        if compute_line(line.quantity, line.unit_price).is_err() {
            return Err(ValidationError::new(
                ValidationRule::AmountOutOfRange,
                format!("line {}: quantity times unit price is too large", idx + 1),
            ));
        }
    }
    Ok(())
}

/// Sale-price floors bind what we sell, not what suppliers charge us.
fn check_price_floors(document: &Document, ctx: &ValidationContext<'_>) -> Result<(), ValidationError> {
    if matches!(document.kind, DocumentKind::PurchaseOrder(_)) {
        return Ok(());
    }
    for (idx, line) in document.lines.iter().enumerate() {
        let Some(entry) = line.catalog_entry_id.and_then(|id| ctx.catalog.entry(&id)) else {
            continue;
        };
        if let Some(min) = entry.price_floor_violation(line.unit_price) {
            return Err(ValidationError::new(
                ValidationRule::MinimumPrice,
                format!(
                    "line {}: unit price {} is below the minimum sale price {} for {}",
                    idx + 1,
                    line.unit_price,
                    min,
                    entry.name
                ),
            ));
        }
    }
    Ok(())
}

fn check_stock(document: &Document, ctx: &ValidationContext<'_>) -> Result<(), ValidationError> {
    if !ctx.stock_tracking_enabled || !document.consumes_stock() {
        return Ok(());
    }
    let availability = ctx
        .ledger
        .check_availability(document.stock_demands(), ctx.catalog);
    match availability.deficiencies.first() {
        None => Ok(()),
        Some(d) => {
            let name = ctx
                .catalog
                .entry(&d.catalog_entry_id)
                .map_or_else(|| d.catalog_entry_id.to_string(), |e| e.name.clone());
            Err(ValidationError::new(
                ValidationRule::StockAvailability,
                format!(
                    "insufficient stock for {name}: requested {}, available {}",
                    d.requested, d.available
                ),
            ))
        }
    }
}

fn check_proforma(document: &Document) -> Result<(), ValidationError> {
    match &document.kind {
        DocumentKind::Invoice(details) if details.proforma => {
            if is_blank(details.offer_validity.as_deref()) {
                return Err(ValidationError::new(
                    ValidationRule::OfferValidity,
                    "offer validity is required for a proforma invoice",
                ));
            }
            Ok(())
        }
        _ => Ok(()),
    }
}
