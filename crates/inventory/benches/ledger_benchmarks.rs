use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tally_catalog::{CatalogEntry, Directory, EntryKind};
use tally_core::{CatalogEntryId, DocumentId, MovementId};
use tally_inventory::{LedgerSnapshot, Movement, Nature, StockDemand};

/// Ledger of `size` movements spread over `entries` catalog entries.
fn ledger(size: usize, entries: &[CatalogEntryId]) -> LedgerSnapshot {
    let date = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
    let movements = (0..size)
        .map(|i| {
            let nature = if i % 3 == 0 { Nature::InvoiceConsumption } else { Nature::Supply };
            Movement {
                id: MovementId::new(),
                number: format!("FS-{i:04}"),
                date,
                actual_date: None,
                catalog_entry_id: entries[i % entries.len()],
                quantity: Decimal::from(1 + (i % 7) as i64),
                direction: nature.direction(),
                nature,
                supplier_id: None,
                detail: None,
                source_document_id: (nature == Nature::InvoiceConsumption).then(DocumentId::new),
            }
        })
        .collect();
    LedgerSnapshot::new(movements)
}

fn bench_balance_full_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("balance_full_scan");
    let entries: Vec<CatalogEntryId> = (0..50).map(|_| CatalogEntryId::new()).collect();

    for size in [1_000usize, 10_000, 100_000] {
        let snapshot = ledger(size, &entries);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &snapshot, |b, snapshot| {
            b.iter(|| black_box(snapshot.balance_of(black_box(&entries[0]))));
        });
    }

    group.finish();
}

fn bench_availability_check(c: &mut Criterion) {
    let mut group = c.benchmark_group("availability_check");
    let entries: Vec<CatalogEntryId> = (0..50).map(|_| CatalogEntryId::new()).collect();
    let catalog = entries.iter().fold(Directory::new(), |dir, id| {
        dir.with_entry(CatalogEntry {
            id: *id,
            name: id.to_string(),
            kind: EntryKind::Product,
            sale_price: Decimal::ONE,
            min_sale_price: None,
            unit_of_measure: String::new(),
        })
    });
    let snapshot = ledger(10_000, &entries);

    for lines in [1usize, 10, 50] {
        let demands: Vec<StockDemand> = entries
            .iter()
            .take(lines)
            .map(|id| StockDemand { catalog_entry_id: *id, quantity: Decimal::ONE })
            .collect();
        group.bench_with_input(BenchmarkId::from_parameter(lines), &demands, |b, demands| {
            b.iter(|| {
                let availability = snapshot.check_availability(demands.iter().copied(), &catalog);
                black_box(availability.deficiencies.len())
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_balance_full_scan,
    bench_availability_check
);
criterion_main!(benches);
