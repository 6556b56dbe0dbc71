//! JSON workspace file holding every collection.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use tally_catalog::{CatalogEntry, Party, TaxRate};
use tally_infra::{InMemoryRepository, Repository, StoreError, Stores};
use tally_inventory::Movement;
use tally_invoicing::Document;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Workspace {
    pub documents: Vec<Document>,
    pub movements: Vec<Movement>,
    pub catalog: Vec<CatalogEntry>,
    pub parties: Vec<Party>,
    pub tax_rates: Vec<TaxRate>,
}

impl Workspace {
    /// Read a workspace file. A missing file is an empty workspace.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("reading workspace {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("parsing workspace {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let raw = serde_json::to_string_pretty(self)?;
        std::fs::write(path, raw).with_context(|| format!("writing workspace {}", path.display()))
    }

    pub fn into_stores(self) -> Stores {
        Stores {
            documents: Arc::new(InMemoryRepository::with_records(self.documents)),
            movements: Arc::new(InMemoryRepository::with_records(self.movements)),
            catalog: Arc::new(InMemoryRepository::with_records(self.catalog)),
            parties: Arc::new(InMemoryRepository::with_records(self.parties)),
            tax_rates: Arc::new(InMemoryRepository::with_records(self.tax_rates)),
        }
    }

    pub async fn from_stores(stores: &Stores) -> Result<Self, StoreError> {
        Ok(Self {
            documents: stores.documents.get_all().await?,
            movements: stores.movements.get_all().await?,
            catalog: stores.catalog.get_all().await?,
            parties: stores.parties.get_all().await?,
            tax_rates: stores.tax_rates.get_all().await?,
        })
    }
}
