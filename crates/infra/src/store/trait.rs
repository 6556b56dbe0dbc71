use std::sync::Arc;

use thiserror::Error;

use tally_core::Entity;

/// Persistence failure. Callers may retry the whole operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("record {0} already exists")]
    Duplicate(String),

    #[error("record {0} not found")]
    NotFound(String),

    /// The backing store refused or could not complete the write.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store lock poisoned")]
    Poisoned,
}

/// Generic per-collection persistence.
///
/// Only single-record writes are assumed atomic; there is no transaction
/// spanning several calls.
#[async_trait::async_trait]
pub trait Repository<T>: Send + Sync
where
    T: Entity + Clone + Send + Sync + 'static,
{
    /// Every record, in insertion order.
    async fn get_all(&self) -> Result<Vec<T>, StoreError>;

    async fn get(&self, id: T::Id) -> Result<Option<T>, StoreError>;

    /// Insert a new record. Fails with `Duplicate` if the id is taken.
    async fn add(&self, record: T) -> Result<(), StoreError>;

    /// Replace an existing record. Fails with `NotFound` if absent.
    async fn update(&self, record: T) -> Result<(), StoreError>;

    /// Remove a record. Fails with `NotFound` if absent.
    async fn delete(&self, id: T::Id) -> Result<(), StoreError>;
}

#[async_trait::async_trait]
impl<T, R> Repository<T> for Arc<R>
where
    T: Entity + Clone + Send + Sync + 'static,
    R: Repository<T> + ?Sized,
{
    async fn get_all(&self) -> Result<Vec<T>, StoreError> {
        (**self).get_all().await
    }

    async fn get(&self, id: T::Id) -> Result<Option<T>, StoreError> {
        (**self).get(id).await
    }

    async fn add(&self, record: T) -> Result<(), StoreError> {
        (**self).add(record).await
    }

    async fn update(&self, record: T) -> Result<(), StoreError> {
        (**self).update(record).await
    }

    async fn delete(&self, id: T::Id) -> Result<(), StoreError> {
        (**self).delete(id).await
    }
}
