use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tally_catalog::{CatalogEntry, TaxRateDirectory};
use tally_core::{CatalogEntryId, DocumentId, Entity, PartyId, TaxRateId};
use tally_inventory::StockDemand;

use crate::totals::{
    AmountOutOfRange, DocumentTotals, TaxBasis, compute_document_totals, compute_line,
};

/// Which family of document this is (used for numbering and tax rules).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentType {
    Invoice,
    PurchaseOrder,
}

/// One row of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// `None` while the editor has not picked an entry yet.
    #[serde(default)]
    pub catalog_entry_id: Option<CatalogEntryId>,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_rate_id: Option<TaxRateId>,
    #[serde(default)]
    pub line_total: Decimal,
}

impl LineItem {
    /// A line whose total is out of range starts at 0; commit recomputes it
    /// and rejects the document.
    pub fn new(catalog_entry_id: CatalogEntryId, quantity: Decimal, unit_price: Decimal) -> Self {
        Self {
            catalog_entry_id: Some(catalog_entry_id),
            quantity,
            unit_price,
            tax_rate_id: None,
            line_total: compute_line(quantity, unit_price).unwrap_or_default(),
        }
    }

    /// Line for a catalog entry, priced at its current sale price.
    pub fn from_entry(entry: &CatalogEntry, quantity: Decimal) -> Self {
        Self::new(entry.id, quantity, entry.sale_price)
    }

    pub fn with_tax(mut self, tax_rate_id: TaxRateId) -> Self {
        self.tax_rate_id = Some(tax_rate_id);
        self
    }

    /// Recompute `line_total` from quantity and unit price.
    pub fn refresh_total(&mut self) -> Result<Decimal, AmountOutOfRange> {
        self.line_total = compute_line(self.quantity, self.unit_price)?;
        Ok(self.line_total)
    }
}

/// Invoice-only fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceDetails {
    /// A proforma is a quote: it never consumes stock.
    #[serde(default)]
    pub proforma: bool,
    /// Required on proformas.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offer_validity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warranty: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_delay: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_delay: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_terms: Option<String>,
}

/// Purchase-order-only fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseOrderDetails {
    /// Added after taxes; never part of the taxable base.
    #[serde(default)]
    pub shipping_amount: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vat_rate_id: Option<TaxRateId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary_rate_id: Option<TaxRateId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_place: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_terms: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum DocumentKind {
    Invoice(InvoiceDetails),
    PurchaseOrder(PurchaseOrderDetails),
}

impl DocumentKind {
    pub fn document_type(&self) -> DocumentType {
        match self {
            DocumentKind::Invoice(_) => DocumentType::Invoice,
            DocumentKind::PurchaseOrder(_) => DocumentType::PurchaseOrder,
        }
    }
}

/// An invoice or purchase order with its lines and computed totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: DocumentId,
    #[serde(default)]
    pub number: String,
    #[serde(default)]
    pub party_id: Option<PartyId>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    pub kind: DocumentKind,
    #[serde(default)]
    pub lines: Vec<LineItem>,
    #[serde(rename = "totalHT", default)]
    pub total_ht: Decimal,
    #[serde(default)]
    pub total_tax: Decimal,
    #[serde(rename = "totalTTC", default)]
    pub total_ttc: Decimal,
}

impl Document {
    /// Empty draft of the given kind, with a fresh id.
    pub fn draft(kind: DocumentKind) -> Self {
        Self {
            id: DocumentId::new(),
            number: String::new(),
            party_id: None,
            date: None,
            kind,
            lines: Vec::new(),
            total_ht: Decimal::ZERO,
            total_tax: Decimal::ZERO,
            total_ttc: Decimal::ZERO,
        }
    }

    pub fn document_type(&self) -> DocumentType {
        self.kind.document_type()
    }

    pub fn invoice_details(&self) -> Option<&InvoiceDetails> {
        match &self.kind {
            DocumentKind::Invoice(details) => Some(details),
            DocumentKind::PurchaseOrder(_) => None,
        }
    }

    pub fn is_proforma(&self) -> bool {
        self.invoice_details().is_some_and(|d| d.proforma)
    }

    /// Non-proforma invoices consume stock (when tracking is enabled).
    pub fn consumes_stock(&self) -> bool {
        self.invoice_details().is_some_and(|d| !d.proforma)
    }

    pub fn totals(&self) -> DocumentTotals {
        DocumentTotals {
            total_ht: self.total_ht,
            total_tax: self.total_tax,
            total_ttc: self.total_ttc,
        }
    }

    /// Quantities requested per line, for lines with a selected entry.
    pub fn stock_demands(&self) -> Vec<StockDemand> {
        self.lines
            .iter()
            .filter_map(|l| {
                l.catalog_entry_id.map(|catalog_entry_id| StockDemand {
                    catalog_entry_id,
                    quantity: l.quantity,
                })
            })
            .collect()
    }

    /// Refresh every line total and the three document totals.
    ///
    /// On overflow the document is left partially refreshed and must not be
    /// saved.
    pub fn recompute_totals<R>(&mut self, rates: &R) -> Result<DocumentTotals, AmountOutOfRange>
    where
        R: TaxRateDirectory + ?Sized,
    {
        for line in &mut self.lines {
            line.refresh_total()?;
        }
        let totals = compute_document_totals(&self.lines, rates, &TaxBasis::from(&self.kind))?;
        self.total_ht = totals.total_ht;
        self.total_tax = totals.total_tax;
        self.total_ttc = totals.total_ttc;
        Ok(totals)
    }
}

impl Entity for Document {
    type Id = DocumentId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use tally_catalog::Directory;

    #[test]
    fn proforma_never_consumes_stock() {
        let standard = Document::draft(DocumentKind::Invoice(InvoiceDetails::default()));
        let proforma = Document::draft(DocumentKind::Invoice(InvoiceDetails {
            proforma: true,
            ..InvoiceDetails::default()
        }));
        let order = Document::draft(DocumentKind::PurchaseOrder(PurchaseOrderDetails::default()));

        assert!(standard.consumes_stock());
        assert!(!proforma.consumes_stock());
        assert!(proforma.is_proforma());
        assert!(!order.consumes_stock());
        assert_eq!(order.document_type(), DocumentType::PurchaseOrder);
    }

    #[test]
    fn recompute_overwrites_stale_line_totals() {
        let mut doc = Document::draft(DocumentKind::Invoice(InvoiceDetails::default()));
        let mut line = LineItem::new(CatalogEntryId::new(), dec!(3), dec!(2.5));
        line.line_total = dec!(999);
        doc.lines.push(line);

        let totals = doc.recompute_totals(&Directory::new()).unwrap();

        assert_eq!(doc.lines[0].line_total, dec!(7.50));
        assert_eq!(totals.total_ht, dec!(7.50));
        assert_eq!(doc.total_ttc, dec!(7.50));
    }

    #[test]
    fn line_from_entry_starts_at_the_sale_price() {
        let entry = CatalogEntry {
            id: CatalogEntryId::new(),
            name: "Paint can".to_string(),
            kind: tally_catalog::EntryKind::Product,
            sale_price: dec!(12.5),
            min_sale_price: Some(dec!(10)),
            unit_of_measure: "can".to_string(),
        };

        let line = LineItem::from_entry(&entry, dec!(4));

        assert_eq!(line.catalog_entry_id, Some(entry.id));
        assert_eq!(line.unit_price, dec!(12.5));
        assert_eq!(line.line_total, dec!(50.00));
        assert_eq!(line.tax_rate_id, None);
    }

    #[test]
    fn recompute_reports_overflow() {
        let mut doc = Document::draft(DocumentKind::Invoice(InvoiceDetails::default()));
        doc.lines.push(LineItem::new(CatalogEntryId::new(), Decimal::MAX, dec!(2)));

        assert_eq!(doc.lines[0].line_total, Decimal::ZERO);
        assert_eq!(doc.recompute_totals(&Directory::new()), Err(AmountOutOfRange));
    }

    #[test]
    fn stock_demands_skip_unselected_lines() {
        let mut doc = Document::draft(DocumentKind::Invoice(InvoiceDetails::default()));
        let entry = CatalogEntryId::new();
        doc.lines.push(LineItem::new(entry, dec!(2), dec!(1)));
        doc.lines.push(LineItem {
            catalog_entry_id: None,
            quantity: dec!(1),
            unit_price: dec!(1),
            tax_rate_id: None,
            line_total: Decimal::ZERO,
        });

        let demands = doc.stock_demands();
        assert_eq!(demands.len(), 1);
        assert_eq!(demands[0].catalog_entry_id, entry);
    }

    #[test]
    fn serializes_with_durable_field_names() {
        let mut doc = Document::draft(DocumentKind::PurchaseOrder(PurchaseOrderDetails {
            shipping_amount: dec!(1500),
            ..PurchaseOrderDetails::default()
        }));
        doc.number = "BC-0001".to_string();
        doc.party_id = Some(PartyId::new());
        doc.lines.push(LineItem::new(CatalogEntryId::new(), dec!(1), dec!(10)));

        let json = serde_json::to_value(&doc).unwrap();
        for key in ["id", "number", "partyId", "date", "kind", "lines", "totalHT", "totalTax", "totalTTC"] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
        assert_eq!(json["kind"]["type"], "purchase-order");
        assert!(json["kind"].get("shippingAmount").is_some());
        for key in ["catalogEntryId", "quantity", "unitPrice", "lineTotal"] {
            assert!(json["lines"][0].get(key).is_some(), "missing line {key}");
        }

        let back: Document = serde_json::from_value(json).unwrap();
        assert_eq!(back, doc);
    }
}
