use async_trait::async_trait;
use indexmap::IndexMap;
use tokio::sync::RwLock;

use super::{reject_identifier_field, DocumentCollection, StoreResult};
use crate::models::{
    merge_fields, DeleteResult, Document, InsertOneResult, ObjectId, Product, UpdateResult,
};

/// In-process collection. Iteration follows insertion order.
#[derive(Debug, Default)]
pub struct MemoryCollection {
    docs: RwLock<IndexMap<ObjectId, Document>>,
}

impl MemoryCollection {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentCollection for MemoryCollection {
    async fn insert_one(&self, fields: Document) -> StoreResult<InsertOneResult> {
        reject_identifier_field(&fields)?;
        let id = ObjectId::generate();
        self.docs.write().await.insert(id, fields);
        Ok(InsertOneResult::new(id))
    }

    async fn find_all(&self) -> StoreResult<Vec<Product>> {
        let docs = self.docs.read().await;
        Ok(docs
            .iter()
            .map(|(id, fields)| Product::new(*id, fields.clone()))
            .collect())
    }

    async fn find_one(&self, id: &ObjectId) -> StoreResult<Option<Product>> {
        let docs = self.docs.read().await;
        Ok(docs.get(id).map(|fields| Product::new(*id, fields.clone())))
    }

    async fn update_one(&self, id: &ObjectId, patch: Document) -> StoreResult<UpdateResult> {
        reject_identifier_field(&patch)?;
        let mut docs = self.docs.write().await;
        let matched_count = match docs.get_mut(id) {
            Some(existing) => {
                merge_fields(existing, patch);
                1
            }
            None => 0,
        };
        Ok(UpdateResult { matched_count })
    }

    async fn delete_one(&self, id: &ObjectId) -> StoreResult<DeleteResult> {
        let removed = self.docs.write().await.shift_remove(id);
        Ok(DeleteResult {
            deleted_count: u64::from(removed.is_some()),
        })
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
