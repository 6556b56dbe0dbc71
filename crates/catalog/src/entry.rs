use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tally_core::{CatalogEntryId, Entity};

/// Whether a catalog entry is a physical, stock-tracked good.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Product,
    Service,
}

/// A product or service that can appear on a document line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub id: CatalogEntryId,
    pub name: String,
    pub kind: EntryKind,
    pub sale_price: Decimal,
    /// Floor for the unit price on sale lines, when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_sale_price: Option<Decimal>,
    #[serde(default)]
    pub unit_of_measure: String,
}

impl CatalogEntry {
    pub fn is_product(&self) -> bool {
        self.kind == EntryKind::Product
    }

    /// Returns the minimum sale price when `unit_price` is below it.
    pub fn price_floor_violation(&self, unit_price: Decimal) -> Option<Decimal> {
        self.min_sale_price.filter(|min| unit_price < *min)
    }
}

impl Entity for CatalogEntry {
    type Id = CatalogEntryId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
