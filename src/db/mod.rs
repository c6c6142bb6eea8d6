pub mod memory;
pub mod postgres;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{DeleteResult, Document, InsertOneResult, ObjectId, Product, UpdateResult, ID_FIELD};

pub use memory::MemoryCollection;
pub use postgres::PgCollection;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("document encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("the '_id' field is assigned by the store and cannot be written")]
    ImmutableIdentifier,

    #[error("store operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("stored identifier {0:?} is malformed")]
    CorruptIdentifier(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Handle to one named collection of schema-less documents.
///
/// Each call is atomic for the single document it touches. `update_one` and
/// `delete_one` report how many documents they matched; zero is not an error.
#[async_trait]
pub trait DocumentCollection: Send + Sync + 'static {
    /// Stores `fields` as a new document under a freshly assigned identifier.
    async fn insert_one(&self, fields: Document) -> StoreResult<InsertOneResult>;

    /// Every document in the collection, in insertion order.
    async fn find_all(&self) -> StoreResult<Vec<Product>>;

    async fn find_one(&self, id: &ObjectId) -> StoreResult<Option<Product>>;

    /// Merges `patch` into the matching document's top-level fields.
    async fn update_one(&self, id: &ObjectId, patch: Document) -> StoreResult<UpdateResult>;

    async fn delete_one(&self, id: &ObjectId) -> StoreResult<DeleteResult>;

    /// Round-trip to the backing store; used by the health check.
    async fn ping(&self) -> StoreResult<()>;
}

/// Refuses writes that try to set the store-owned identifier field.
pub(crate) fn reject_identifier_field(fields: &Document) -> StoreResult<()> {
    if fields.contains_key(ID_FIELD) {
        return Err(StoreError::ImmutableIdentifier);
    }
    Ok(())
}
