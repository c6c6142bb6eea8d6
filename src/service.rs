use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::db::{DocumentCollection, StoreError, StoreResult};
use crate::error::{AppError, AppResult};
use crate::models::{DeleteResult, Document, InsertOneResult, ObjectId, Product, UpdateResult};

/// Translates product requests into single collection operations.
///
/// Holds no state of its own beyond the injected collection handle, so it is
/// cheap to clone into every request.
#[derive(Clone)]
pub struct ProductService {
    collection: Arc<dyn DocumentCollection>,
    timeout: Option<Duration>,
}

impl ProductService {
    pub fn new(collection: Arc<dyn DocumentCollection>) -> Self {
        Self {
            collection,
            timeout: None,
        }
    }

    /// Bounds every store call; elapsed calls surface as [`StoreError::Timeout`].
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    async fn run<T>(&self, op: impl Future<Output = StoreResult<T>>) -> AppResult<T> {
        let result = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, op)
                .await
                .unwrap_or(Err(StoreError::Timeout(limit))),
            None => op.await,
        };
        Ok(result?)
    }

    pub async fn create(&self, fields: Document) -> AppResult<InsertOneResult> {
        self.run(self.collection.insert_one(fields)).await
    }

    pub async fn list(&self) -> AppResult<Vec<Product>> {
        self.run(self.collection.find_all()).await
    }

    pub async fn get(&self, raw_id: &str) -> AppResult<Product> {
        let id = ObjectId::parse_str(raw_id)?;
        self.run(self.collection.find_one(&id))
            .await?
            .ok_or(AppError::NotFound)
    }

    /// Success only when the merge matched a record; a fault-free call that
    /// touched nothing is reported as not found.
    pub async fn update(&self, raw_id: &str, patch: Document) -> AppResult<UpdateResult> {
        let id = ObjectId::parse_str(raw_id)?;
        let result = self.run(self.collection.update_one(&id, patch)).await?;
        if result.matched_count == 0 {
            return Err(AppError::NotFound);
        }
        Ok(result)
    }

    pub async fn delete(&self, raw_id: &str) -> AppResult<DeleteResult> {
        let id = ObjectId::parse_str(raw_id)?;
        let result = self.run(self.collection.delete_one(&id)).await?;
        if result.deleted_count == 0 {
            return Err(AppError::NotFound);
        }
        Ok(result)
    }

    pub async fn ping(&self) -> AppResult<()> {
        self.run(self.collection.ping()).await
    }
}
