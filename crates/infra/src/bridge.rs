//! Stock consumption for newly committed invoices.
//!
//! Runs strictly after the invoice write succeeded. There is no transaction
//! spanning the invoice and its movements: if a movement write fails, the
//! ones already written stay, the invoice stays, and the gap is reported as
//! a [`ConsistencyWarning`].

use std::sync::Arc;

use chrono::Local;
use serde::Serialize;
use tracing::{info, warn};

use tally_catalog::CatalogLookup;
use tally_core::DocumentId;
use tally_inventory::Movement;
use tally_invoicing::Document;
use tally_numbering::NumberingScheme;

use crate::store::Repository;

/// The ledger no longer matches a committed invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsistencyWarning {
    pub document_id: DocumentId,
    pub document_number: String,
    /// Movements written before the failure.
    pub created: usize,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BridgeReport {
    pub created: Vec<Movement>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<ConsistencyWarning>,
}

#[derive(Clone)]
pub struct InvoiceStockBridge {
    movements: Arc<dyn Repository<Movement>>,
}

impl InvoiceStockBridge {
    pub fn new(movements: Arc<dyn Repository<Movement>>) -> Self {
        Self { movements }
    }

    /// Write one invoice-consumption movement per product line.
    ///
    /// `existing_numbers` are the movement numbers already in use; numbers
    /// for this run are proposed against them plus the ones created so far.
    /// Stops at the first failed write.
    pub async fn consume<C>(
        &self,
        invoice: &Document,
        catalog: &C,
        scheme: &NumberingScheme,
        existing_numbers: Vec<String>,
    ) -> BridgeReport
    where
        C: CatalogLookup + Sync + ?Sized,
    {
        let date = invoice.date.unwrap_or_else(|| Local::now().date_naive());
        let mut numbers = existing_numbers;
        let mut report = BridgeReport::default();

        for line in &invoice.lines {
            let Some(entry) = line.catalog_entry_id.and_then(|id| catalog.entry(&id)) else {
                continue;
            };
            if !entry.is_product() {
                continue;
            }

            let number = scheme.next(&numbers);
            let movement = Movement::invoice_consumption(
                number.clone(),
                date,
                entry.id,
                line.quantity,
                invoice.id,
                &invoice.number,
            );

            match self.movements.add(movement.clone()).await {
                Ok(()) => {
                    info!(
                        document_id = %invoice.id,
                        number = %movement.number,
                        catalog_entry_id = %entry.id,
                        quantity = %movement.quantity,
                        "stock consumed"
                    );
                    numbers.push(number);
                    report.created.push(movement);
                }
                Err(err) => {
                    let warning = ConsistencyWarning {
                        document_id: invoice.id,
                        document_number: invoice.number.clone(),
                        created: report.created.len(),
                        message: format!(
                            "invoice {} was saved but stock for {} could not be consumed: {err}",
                            invoice.number, entry.name
                        ),
                    };
                    warn!(
                        document_id = %invoice.id,
                        created = warning.created,
                        error = %err,
                        "invoice committed with incomplete stock consumption"
                    );
                    report.warning = Some(warning);
                    break;
                }
            }
        }

        report
    }
}
