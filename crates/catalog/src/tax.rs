use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tally_core::{Entity, TaxRateId};

/// Tax family. Invoice lines carry VAT; purchase orders add one secondary levy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaxKind {
    #[serde(alias = "TVA")]
    Vat,
    #[serde(alias = "ABIC")]
    Secondary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxRate {
    pub id: TaxRateId,
    pub name: String,
    /// Percentage, e.g. `18` for 18 %.
    pub rate: Decimal,
    pub kind: TaxKind,
}

impl TaxRate {
    /// Unrounded tax owed on `base` at this rate; `None` on overflow.
    pub fn apply(&self, base: Decimal) -> Option<Decimal> {
        base.checked_mul(self.rate)?.checked_div(Decimal::ONE_HUNDRED)
    }
}

impl Entity for TaxRate {
    type Id = TaxRateId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
