//! Read-only lookups over catalog reference data.
//!
//! Engines only ever ask "what is entry X?"; they never enumerate or mutate
//! the catalog. `Directory` is the in-memory snapshot the service layer
//! builds from the stored collections before each operation.

use std::collections::HashMap;

use tally_core::{CatalogEntryId, PartyId, TaxRateId};

use crate::entry::CatalogEntry;
use crate::party::Party;
use crate::tax::TaxRate;

/// Catalog lookup(id) -> entry.
pub trait CatalogLookup {
    fn entry(&self, id: &CatalogEntryId) -> Option<&CatalogEntry>;
}

/// Party directory lookup(id) -> party.
pub trait PartyDirectory {
    fn party(&self, id: &PartyId) -> Option<&Party>;
}

/// Tax-rate directory lookup(id) -> rate.
pub trait TaxRateDirectory {
    fn tax_rate(&self, id: &TaxRateId) -> Option<&TaxRate>;
}

/// Point-in-time snapshot of catalog, parties and tax rates.
#[derive(Debug, Clone, Default)]
pub struct Directory {
    entries: HashMap<CatalogEntryId, CatalogEntry>,
    parties: HashMap<PartyId, Party>,
    tax_rates: HashMap<TaxRateId, TaxRate>,
}

impl Directory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts(
        entries: impl IntoIterator<Item = CatalogEntry>,
        parties: impl IntoIterator<Item = Party>,
        tax_rates: impl IntoIterator<Item = TaxRate>,
    ) -> Self {
        Self {
            entries: entries.into_iter().map(|e| (e.id, e)).collect(),
            parties: parties.into_iter().map(|p| (p.id, p)).collect(),
            tax_rates: tax_rates.into_iter().map(|t| (t.id, t)).collect(),
        }
    }

    pub fn with_entry(mut self, entry: CatalogEntry) -> Self {
        self.entries.insert(entry.id, entry);
        self
    }

    pub fn with_party(mut self, party: Party) -> Self {
        self.parties.insert(party.id, party);
        self
    }

    pub fn with_tax_rate(mut self, rate: TaxRate) -> Self {
        self.tax_rates.insert(rate.id, rate);
        self
    }
}

impl CatalogLookup for Directory {
    fn entry(&self, id: &CatalogEntryId) -> Option<&CatalogEntry> {
        self.entries.get(id)
    }
}

impl PartyDirectory for Directory {
    fn party(&self, id: &PartyId) -> Option<&Party> {
        self.parties.get(id)
    }
}

impl TaxRateDirectory for Directory {
    fn tax_rate(&self, id: &TaxRateId) -> Option<&TaxRate> {
        self.tax_rates.get(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::EntryKind;
    use crate::tax::TaxKind;
    use rust_decimal_macros::dec;

    #[test]
    fn lookups_resolve_by_id() {
        let entry = CatalogEntry {
            id: CatalogEntryId::new(),
            name: "Cement bag".to_string(),
            kind: EntryKind::Product,
            sale_price: dec!(4500),
            min_sale_price: None,
            unit_of_measure: "bag".to_string(),
        };
        let party = Party {
            id: PartyId::new(),
            name: "ACME".to_string(),
        };
        let rate = TaxRate {
            id: TaxRateId::new(),
            name: "TVA".to_string(),
            rate: dec!(18),
            kind: TaxKind::Vat,
        };

        let dir = Directory::from_parts([entry.clone()], [party.clone()], [rate.clone()]);

        assert_eq!(dir.entry(&entry.id), Some(&entry));
        assert_eq!(dir.party(&party.id), Some(&party));
        assert_eq!(dir.tax_rate(&rate.id), Some(&rate));
        assert_eq!(dir.entry(&CatalogEntryId::new()), None);
    }
}
