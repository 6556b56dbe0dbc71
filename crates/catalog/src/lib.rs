//! Catalog reference data consumed by the invoicing and stock engines.
//!
//! Catalog CRUD lives elsewhere; this crate only defines the records and the
//! read-only lookups the engines need (catalog, party directory, tax rates).

pub mod directory;
pub mod entry;
pub mod party;
pub mod tax;

pub use directory::{CatalogLookup, Directory, PartyDirectory, TaxRateDirectory};
pub use entry::{CatalogEntry, EntryKind};
pub use party::Party;
pub use tax::{TaxKind, TaxRate};
