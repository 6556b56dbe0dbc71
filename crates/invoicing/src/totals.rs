//! Line and document totals.
//!
//! Invoices tax each line at its own VAT rate. Purchase orders apply one VAT
//! rate and one secondary rate to the whole HT amount, then add shipping.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use tally_catalog::{TaxKind, TaxRate, TaxRateDirectory};
use tally_core::{TaxRateId, round_currency};

use crate::document::{DocumentKind, LineItem};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentTotals {
    #[serde(rename = "totalHT")]
    pub total_ht: Decimal,
    #[serde(rename = "totalTax")]
    pub total_tax: Decimal,
    #[serde(rename = "totalTTC")]
    pub total_ttc: Decimal,
}

/// How tax is levied on a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaxBasis {
    /// Per-line VAT using each line's own rate.
    Invoice,
    /// Aggregate VAT + secondary levy on the HT total, shipping added after.
    PurchaseOrder {
        vat_rate_id: Option<TaxRateId>,
        secondary_rate_id: Option<TaxRateId>,
        shipping: Decimal,
    },
}

impl From<&DocumentKind> for TaxBasis {
    fn from(kind: &DocumentKind) -> Self {
        match kind {
            DocumentKind::Invoice(_) => TaxBasis::Invoice,
            DocumentKind::PurchaseOrder(po) => TaxBasis::PurchaseOrder {
                vat_rate_id: po.vat_rate_id,
                secondary_rate_id: po.secondary_rate_id,
                shipping: po.shipping_amount,
            },
        }
    }
}

/// An amount left the range `Decimal` can represent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("amount is too large to compute")]
pub struct AmountOutOfRange;

/// `round(quantity * unit_price, 2)`, never negative.
pub fn compute_line(quantity: Decimal, unit_price: Decimal) -> Result<Decimal, AmountOutOfRange> {
    let raw = quantity.checked_mul(unit_price).ok_or(AmountOutOfRange)?;
    Ok(round_currency(raw).max(Decimal::ZERO))
}

fn checked_sum(values: impl IntoIterator<Item = Decimal>) -> Result<Decimal, AmountOutOfRange> {
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, v| acc.checked_add(v).ok_or(AmountOutOfRange))
}

/// Compute HT, tax and TTC for a set of lines.
///
/// Unresolved rate ids, and rates of the wrong kind, contribute nothing.
pub fn compute_document_totals<R>(
    lines: &[LineItem],
    rates: &R,
    basis: &TaxBasis,
) -> Result<DocumentTotals, AmountOutOfRange>
where
    R: TaxRateDirectory + ?Sized,
{
    let line_totals = lines
        .iter()
        .map(|l| compute_line(l.quantity, l.unit_price))
        .collect::<Result<Vec<_>, _>>()?;
    let total_ht = checked_sum(line_totals.iter().copied())?;

    let rate_of = |id: Option<TaxRateId>, kind: TaxKind| {
        id.and_then(|id| rates.tax_rate(&id))
            .filter(|rate| rate.kind == kind)
    };
    let levy = |rate: Option<&TaxRate>, base: Decimal| match rate {
        Some(rate) => rate.apply(base).ok_or(AmountOutOfRange),
        None => Ok(Decimal::ZERO),
    };

    let (raw_tax, extra) = match basis {
        TaxBasis::Invoice => {
            let per_line = lines
                .iter()
                .zip(&line_totals)
                .map(|(line, total)| levy(rate_of(line.tax_rate_id, TaxKind::Vat), *total))
                .collect::<Result<Vec<_>, _>>()?;
            (checked_sum(per_line)?, Decimal::ZERO)
        }
        TaxBasis::PurchaseOrder {
            vat_rate_id,
            secondary_rate_id,
            shipping,
        } => {
            let vat = levy(rate_of(*vat_rate_id, TaxKind::Vat), total_ht)?;
            let secondary = levy(rate_of(*secondary_rate_id, TaxKind::Secondary), total_ht)?;
            (
                checked_sum([vat, secondary])?,
                round_currency(*shipping).max(Decimal::ZERO),
            )
        }
    };

    let total_tax = round_currency(raw_tax).max(Decimal::ZERO);

    Ok(DocumentTotals {
        total_ht,
        total_tax,
        total_ttc: checked_sum([total_ht, total_tax, extra])?,
    })
}
