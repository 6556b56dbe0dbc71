//! Stock ledger service over the movement and catalog collections.

use std::sync::Arc;

use rust_decimal::Decimal;
use thiserror::Error;
use tracing::{debug, info, warn};

use tally_catalog::{CatalogEntry, Directory};
use tally_core::{CatalogEntryId, DocumentId, DomainError, MovementId};
use tally_inventory::{LedgerSnapshot, Movement, NewMovement};
use tally_numbering::NumberingScheme;

use crate::store::{Repository, StoreError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Persistence(#[from] StoreError),
}

#[derive(Clone)]
pub struct StockLedger {
    movements: Arc<dyn Repository<Movement>>,
    catalog: Arc<dyn Repository<CatalogEntry>>,
}

impl StockLedger {
    pub fn new(
        movements: Arc<dyn Repository<Movement>>,
        catalog: Arc<dyn Repository<CatalogEntry>>,
    ) -> Self {
        Self { movements, catalog }
    }

    /// Every stored movement, as of now.
    pub async fn snapshot(&self) -> Result<LedgerSnapshot, StoreError> {
        Ok(LedgerSnapshot::new(self.movements.get_all().await?))
    }

    /// Current balance, derived by scanning the entry's movements.
    pub async fn balance_of(&self, entry: CatalogEntryId) -> Result<Decimal, StoreError> {
        let snapshot = self.snapshot().await?;
        let balance = snapshot.balance_of(&entry);
        debug!(catalog_entry_id = %entry, %balance, "derived balance");
        Ok(balance)
    }

    pub async fn movements_of(&self, entry: CatalogEntryId) -> Result<Vec<Movement>, StoreError> {
        Ok(self.snapshot().await?.movements_of(&entry))
    }

    pub async fn propose_number(&self, scheme: &NumberingScheme) -> Result<String, StoreError> {
        let snapshot = self.snapshot().await?;
        Ok(scheme.next(snapshot.numbers()))
    }

    async fn catalog(&self) -> Result<Directory, StoreError> {
        Ok(self
            .catalog
            .get_all()
            .await?
            .into_iter()
            .fold(Directory::new(), Directory::with_entry))
    }

    /// Record a supply, return or write-off.
    pub async fn record_movement(&self, draft: NewMovement) -> Result<Movement, LedgerError> {
        let catalog = self.catalog().await?;
        let movement = Movement::record(draft, &catalog)?;
        self.movements.add(movement.clone()).await?;
        info!(
            movement_id = %movement.id,
            number = %movement.number,
            catalog_entry_id = %movement.catalog_entry_id,
            nature = ?movement.nature,
            "movement recorded"
        );
        Ok(movement)
    }

    /// Replace a manually recorded movement, keeping its id.
    ///
    /// The draft goes through the same rules as a new recording. Invoice
    /// consumption is refused like a deletion would be.
    pub async fn update_movement(
        &self,
        id: MovementId,
        draft: NewMovement,
    ) -> Result<Movement, LedgerError> {
        let current = self
            .movements
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("movement {id}")))?;
        let catalog = self.catalog().await?;
        let revised = match current.revise(draft, &catalog) {
            Ok(revised) => revised,
            Err(err) => {
                if current.is_protected() {
                    warn!(movement_id = %id, number = %current.number, error = %err, "refused movement edit");
                }
                return Err(err.into());
            }
        };
        self.movements.update(revised.clone()).await?;
        info!(
            movement_id = %id,
            number = %revised.number,
            catalog_entry_id = %revised.catalog_entry_id,
            nature = ?revised.nature,
            "movement updated"
        );
        Ok(revised)
    }

    /// Delete a manually recorded movement.
    ///
    /// Invoice-consumption movements are refused with a guard error naming
    /// their invoice.
    pub async fn delete_movement(&self, id: MovementId) -> Result<(), LedgerError> {
        let movement = self
            .movements
            .get(id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("movement {id}")))?;
        if let Err(err) = movement.ensure_deletable() {
            warn!(movement_id = %id, number = %movement.number, error = %err, "refused movement deletion");
            return Err(err.into());
        }
        self.movements.delete(id).await?;
        info!(movement_id = %id, number = %movement.number, "movement deleted");
        Ok(())
    }

    /// Remove the movements a document generated. Returns how many went.
    pub async fn delete_for_document(&self, document: DocumentId) -> Result<usize, StoreError> {
        let snapshot = self.snapshot().await?;
        let owned = snapshot.sourced_from(&document);
        for movement in &owned {
            self.movements.delete(movement.id).await?;
        }
        if !owned.is_empty() {
            info!(document_id = %document, count = owned.len(), "cascaded movement deletion");
        }
        Ok(owned.len())
    }
}
