//! Balance derivation and availability over a point-in-time movement set.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tally_catalog::CatalogLookup;
use tally_core::{CatalogEntryId, DocumentId, MovementId};

use crate::movement::Movement;

/// Σ in − Σ out over the movements of one catalog entry.
///
/// Full scan on every call; order of the movements does not matter. The sum
/// saturates at the bounds of `Decimal`.
pub fn derive_balance<'a, I>(movements: I, entry: &CatalogEntryId) -> Decimal
where
    I: IntoIterator<Item = &'a Movement>,
{
    movements
        .into_iter()
        .filter(|m| m.catalog_entry_id == *entry)
        .fold(Decimal::ZERO, |acc, m| acc.saturating_add(m.signed_quantity()))
}

/// Quantity of a catalog entry requested by a document line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockDemand {
    pub catalog_entry_id: CatalogEntryId,
    pub quantity: Decimal,
}

/// A product whose balance does not cover what is requested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deficiency {
    pub catalog_entry_id: CatalogEntryId,
    pub requested: Decimal,
    pub available: Decimal,
}

/// Outcome of an availability check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Availability {
    pub deficiencies: Vec<Deficiency>,
}

impl Availability {
    pub fn is_ok(&self) -> bool {
        self.deficiencies.is_empty()
    }
}

/// Movements loaded from storage at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LedgerSnapshot {
    movements: Vec<Movement>,
}

impl LedgerSnapshot {
    pub fn new(movements: Vec<Movement>) -> Self {
        Self { movements }
    }

    pub fn movements(&self) -> &[Movement] {
        &self.movements
    }

    pub fn find(&self, id: &MovementId) -> Option<&Movement> {
        self.movements.iter().find(|m| m.id == *id)
    }

    pub fn balance_of(&self, entry: &CatalogEntryId) -> Decimal {
        derive_balance(&self.movements, entry)
    }

    /// Movements of one entry ordered by date, then number.
    pub fn movements_of(&self, entry: &CatalogEntryId) -> Vec<Movement> {
        let mut out: Vec<Movement> = self
            .movements
            .iter()
            .filter(|m| m.catalog_entry_id == *entry)
            .cloned()
            .collect();
        out.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.number.cmp(&b.number)));
        out
    }

    /// Movements generated by one document.
    pub fn sourced_from(&self, document: &DocumentId) -> Vec<&Movement> {
        self.movements
            .iter()
            .filter(|m| m.source_document_id.as_ref() == Some(document))
            .collect()
    }

    /// Snapshot without the movements a document produced.
    ///
    /// Used when re-validating an already committed invoice so it is not
    /// checked against its own consumption.
    pub fn excluding_document(&self, document: &DocumentId) -> LedgerSnapshot {
        LedgerSnapshot {
            movements: self
                .movements
                .iter()
                .filter(|m| m.source_document_id.as_ref() != Some(document))
                .cloned()
                .collect(),
        }
    }

    pub fn numbers(&self) -> impl Iterator<Item = &str> + '_ {
        self.movements.iter().map(|m| m.number.as_str())
    }

    /// Check that every product demand is covered by its balance.
    ///
    /// Demands for the same entry are summed first. Services and entries
    /// the catalog cannot resolve are exempt.
    pub fn check_availability<I, C>(&self, demands: I, catalog: &C) -> Availability
    where
        I: IntoIterator<Item = StockDemand>,
        C: CatalogLookup + ?Sized,
    {
        let mut requested: Vec<(CatalogEntryId, Decimal)> = Vec::new();
        for demand in demands {
            let is_product = catalog
                .entry(&demand.catalog_entry_id)
                .is_some_and(|e| e.is_product());
            if !is_product {
                continue;
            }
            match requested
                .iter_mut()
                .find(|(id, _)| *id == demand.catalog_entry_id)
            {
                Some((_, qty)) => *qty = qty.saturating_add(demand.quantity),
                None => requested.push((demand.catalog_entry_id, demand.quantity)),
            }
        }

        let deficiencies = requested
            .into_iter()
            .filter_map(|(catalog_entry_id, requested)| {
                let available = self.balance_of(&catalog_entry_id);
                (available < requested).then_some(Deficiency {
                    catalog_entry_id,
                    requested,
                    available,
                })
            })
            .collect();

        Availability { deficiencies }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::movement::{Direction, Nature};
    use chrono::NaiveDate;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;
    use tally_catalog::{CatalogEntry, Directory, EntryKind};
    use tally_core::PartyId;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, d).unwrap()
    }

    fn manual(entry: CatalogEntryId, number: &str, d: u32, qty: Decimal, nature: Nature) -> Movement {
        Movement {
            id: MovementId::new(),
            number: number.to_string(),
            date: day(d),
            actual_date: None,
            catalog_entry_id: entry,
            quantity: qty,
            direction: nature.direction(),
            nature,
            supplier_id: Some(PartyId::new()),
            detail: None,
            source_document_id: None,
        }
    }

    fn catalog_entry(kind: EntryKind) -> CatalogEntry {
        CatalogEntry {
            id: CatalogEntryId::new(),
            name: "Rebar 12mm".to_string(),
            kind,
            sale_price: dec!(5000),
            min_sale_price: None,
            unit_of_measure: "bar".to_string(),
        }
    }

    #[test]
    fn balance_is_ins_minus_outs_for_one_entry() {
        let a = CatalogEntryId::new();
        let b = CatalogEntryId::new();
        let snapshot = LedgerSnapshot::new(vec![
            manual(a, "FS-0001", 1, dec!(10), Nature::Supply),
            manual(a, "FS-0002", 2, dec!(3), Nature::WriteOff),
            manual(b, "FS-0003", 2, dec!(99), Nature::Supply),
            manual(a, "FS-0004", 3, dec!(1.5), Nature::ReturnToStock),
        ]);

        assert_eq!(snapshot.balance_of(&a), dec!(8.5));
        assert_eq!(snapshot.balance_of(&b), dec!(99));
        assert_eq!(snapshot.balance_of(&CatalogEntryId::new()), Decimal::ZERO);
    }

    #[test]
    fn balance_follows_stored_direction() {
        let a = CatalogEntryId::new();
        let mut edited = manual(a, "FS-0001", 1, dec!(4), Nature::Supply);
        edited.direction = Direction::Out;

        assert_eq!(LedgerSnapshot::new(vec![edited]).balance_of(&a), dec!(-4));
    }

    #[test]
    fn huge_quantities_saturate_instead_of_overflowing() {
        let a = CatalogEntryId::new();
        let snapshot = LedgerSnapshot::new(vec![
            manual(a, "FS-0001", 1, Decimal::MAX, Nature::Supply),
            manual(a, "FS-0002", 2, Decimal::MAX, Nature::Supply),
        ]);

        assert_eq!(snapshot.balance_of(&a), Decimal::MAX);
    }

    #[test]
    fn movements_of_sorts_by_date_then_number() {
        let a = CatalogEntryId::new();
        let snapshot = LedgerSnapshot::new(vec![
            manual(a, "FS-0003", 2, dec!(1), Nature::Supply),
            manual(a, "FS-0001", 5, dec!(1), Nature::Supply),
            manual(a, "FS-0002", 2, dec!(1), Nature::Supply),
        ]);

        let numbers: Vec<String> = snapshot
            .movements_of(&a)
            .into_iter()
            .map(|m| m.number)
            .collect();
        assert_eq!(numbers, ["FS-0002", "FS-0003", "FS-0001"]);
    }

    #[test]
    fn availability_sums_demands_and_exempts_services() {
        let product = catalog_entry(EntryKind::Product);
        let service = catalog_entry(EntryKind::Service);
        let catalog = Directory::new()
            .with_entry(product.clone())
            .with_entry(service.clone());
        let snapshot =
            LedgerSnapshot::new(vec![manual(product.id, "FS-0001", 1, dec!(5), Nature::Supply)]);

        let covered = snapshot.check_availability(
            [
                StockDemand { catalog_entry_id: product.id, quantity: dec!(5) },
                StockDemand { catalog_entry_id: service.id, quantity: dec!(100) },
            ],
            &catalog,
        );
        assert!(covered.is_ok());

        let split = snapshot.check_availability(
            [
                StockDemand { catalog_entry_id: product.id, quantity: dec!(3) },
                StockDemand { catalog_entry_id: product.id, quantity: dec!(3) },
            ],
            &catalog,
        );
        assert_eq!(
            split.deficiencies,
            vec![Deficiency {
                catalog_entry_id: product.id,
                requested: dec!(6),
                available: dec!(5),
            }]
        );
    }

    #[test]
    fn excluding_document_drops_its_consumption() {
        let a = CatalogEntryId::new();
        let doc = DocumentId::new();
        let snapshot = LedgerSnapshot::new(vec![
            manual(a, "FS-0001", 1, dec!(5), Nature::Supply),
            Movement::invoice_consumption("FS-0002", day(2), a, dec!(5), doc, "FAC-0001"),
        ]);

        assert_eq!(snapshot.balance_of(&a), Decimal::ZERO);
        assert_eq!(snapshot.sourced_from(&doc).len(), 1);
        assert_eq!(snapshot.excluding_document(&doc).balance_of(&a), dec!(5));
    }

    fn arb_movement(entry: CatalogEntryId) -> impl Strategy<Value = Movement> {
        (1i64..10_000, 0u32..3, prop::bool::ANY).prop_map(move |(units, scale, inbound)| {
            let nature = if inbound { Nature::Supply } else { Nature::WriteOff };
            manual(entry, "FS-0001", 1, Decimal::new(units, scale), nature)
        })
    }

    proptest! {
        #[test]
        fn balance_is_independent_of_insertion_order(
            movements in prop::collection::vec(arb_movement(CatalogEntryId::from_uuid(Default::default())), 0..40)
        ) {
            let entry = CatalogEntryId::from_uuid(Default::default());
            let expected: Decimal = movements
                .iter()
                .map(|m| if m.direction == Direction::In { m.quantity } else { -m.quantity })
                .sum();

            let mut reversed = movements.clone();
            reversed.reverse();

            prop_assert_eq!(derive_balance(&movements, &entry), expected);
            prop_assert_eq!(derive_balance(&reversed, &entry), expected);
        }
    }
}
