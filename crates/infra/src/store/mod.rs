//! Record persistence: the repository abstraction and its in-memory backend.

pub mod in_memory;
pub mod r#trait;

use std::sync::Arc;

use tally_catalog::{CatalogEntry, Directory, Party, TaxRate};
use tally_inventory::Movement;
use tally_invoicing::Document;

pub use in_memory::InMemoryRepository;
pub use r#trait::{Repository, StoreError};

/// The five collections the engines read and write.
#[derive(Clone)]
pub struct Stores {
    pub documents: Arc<dyn Repository<Document>>,
    pub movements: Arc<dyn Repository<Movement>>,
    pub catalog: Arc<dyn Repository<CatalogEntry>>,
    pub parties: Arc<dyn Repository<Party>>,
    pub tax_rates: Arc<dyn Repository<TaxRate>>,
}

impl Stores {
    /// Empty in-memory collections.
    pub fn in_memory() -> Self {
        Self {
            documents: Arc::new(InMemoryRepository::new()),
            movements: Arc::new(InMemoryRepository::new()),
            catalog: Arc::new(InMemoryRepository::new()),
            parties: Arc::new(InMemoryRepository::new()),
            tax_rates: Arc::new(InMemoryRepository::new()),
        }
    }

    /// Load catalog, parties and tax rates into a lookup snapshot.
    pub async fn directory(&self) -> Result<Directory, StoreError> {
        let entries = self.catalog.get_all().await?;
        let parties = self.parties.get_all().await?;
        let tax_rates = self.tax_rates.get_all().await?;
        Ok(Directory::from_parts(entries, parties, tax_rates))
    }
}
