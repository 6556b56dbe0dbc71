use std::sync::RwLock;

use tally_core::Entity;

use super::r#trait::{Repository, StoreError};

/// In-memory collection for tests, the CLI and dev.
///
/// Records keep insertion order; a single `RwLock` serialises writes.
#[derive(Debug)]
pub struct InMemoryRepository<T> {
    records: RwLock<Vec<T>>,
}

impl<T> InMemoryRepository<T> {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
        }
    }

    /// Seed the collection, e.g. from a workspace file.
    pub fn with_records(records: Vec<T>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }
}

impl<T> Default for InMemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl<T> Repository<T> for InMemoryRepository<T>
where
    T: Entity + Clone + Send + Sync + 'static,
{
    async fn get_all(&self) -> Result<Vec<T>, StoreError> {
        let records = self.records.read().map_err(|_| StoreError::Poisoned)?;
        Ok(records.clone())
    }

    async fn get(&self, id: T::Id) -> Result<Option<T>, StoreError> {
        let records = self.records.read().map_err(|_| StoreError::Poisoned)?;
        Ok(records.iter().find(|r| *r.id() == id).cloned())
    }

    async fn add(&self, record: T) -> Result<(), StoreError> {
        let mut records = self.records.write().map_err(|_| StoreError::Poisoned)?;
        if records.iter().any(|r| r.id() == record.id()) {
            return Err(StoreError::Duplicate(record.id().to_string()));
        }
        records.push(record);
        Ok(())
    }

    async fn update(&self, record: T) -> Result<(), StoreError> {
        let mut records = self.records.write().map_err(|_| StoreError::Poisoned)?;
        let slot = records
            .iter_mut()
            .find(|r| r.id() == record.id())
            .ok_or_else(|| StoreError::NotFound(record.id().to_string()))?;
        *slot = record;
        Ok(())
    }

    async fn delete(&self, id: T::Id) -> Result<(), StoreError> {
        let mut records = self.records.write().map_err(|_| StoreError::Poisoned)?;
        let idx = records
            .iter()
            .position(|r| *r.id() == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        records.remove(idx);
        Ok(())
    }
}
