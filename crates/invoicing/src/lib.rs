//! Invoicing domain module: documents, totals and commit-time validation.
//!
//! This crate contains business rules for invoices and purchase orders,
//! implemented purely as deterministic domain logic (no IO, no storage).

pub mod document;
pub mod totals;
pub mod validator;

pub use document::{
    Document, DocumentKind, DocumentType, InvoiceDetails, LineItem, PurchaseOrderDetails,
};
pub use totals::{
    AmountOutOfRange, DocumentTotals, TaxBasis, compute_document_totals, compute_line,
};
pub use validator::{ValidationContext, ValidationError, ValidationRule, validate};
