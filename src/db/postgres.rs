use async_trait::async_trait;
use sqlx::{types::Json, PgPool};

use super::{reject_identifier_field, DocumentCollection, StoreError, StoreResult};
use crate::models::{
    merge_fields, DeleteResult, Document, InsertOneResult, ObjectId, Product, UpdateResult,
};

/// Document collection stored as `json` rows in the shared `documents` table.
///
/// Documents are written as text and cast to `json` so Postgres keeps the
/// caller's key order.
#[derive(Debug, Clone)]
pub struct PgCollection {
    pool: PgPool,
    name: String,
}

#[derive(Debug, sqlx::FromRow)]
struct DocumentRow {
    id: String,
    doc: Json<Document>,
}

impl DocumentRow {
    fn into_product(self) -> StoreResult<Product> {
        let id = ObjectId::parse_str(&self.id).map_err(|_| StoreError::CorruptIdentifier(self.id))?;
        Ok(Product::new(id, self.doc.0))
    }
}

impl PgCollection {
    pub fn new(pool: PgPool, name: impl Into<String>) -> Self {
        Self {
            pool,
            name: name.into(),
        }
    }
}

#[async_trait]
impl DocumentCollection for PgCollection {
    async fn insert_one(&self, fields: Document) -> StoreResult<InsertOneResult> {
        reject_identifier_field(&fields)?;
        let id = ObjectId::generate();
        let body = serde_json::to_string(&fields)?;

        sqlx::query("INSERT INTO documents (collection, id, doc) VALUES ($1, $2, $3::json)")
            .bind(&self.name)
            .bind(id.to_hex())
            .bind(body)
            .execute(&self.pool)
            .await?;

        Ok(InsertOneResult::new(id))
    }

    async fn find_all(&self) -> StoreResult<Vec<Product>> {
        let rows = sqlx::query_as::<_, DocumentRow>(
            "SELECT id, doc FROM documents WHERE collection = $1 ORDER BY seq ASC",
        )
        .bind(&self.name)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(DocumentRow::into_product).collect()
    }

    async fn find_one(&self, id: &ObjectId) -> StoreResult<Option<Product>> {
        sqlx::query_as::<_, DocumentRow>(
            "SELECT id, doc FROM documents WHERE collection = $1 AND id = $2",
        )
        .bind(&self.name)
        .bind(id.to_hex())
        .fetch_optional(&self.pool)
        .await?
        .map(DocumentRow::into_product)
        .transpose()
    }

    async fn update_one(&self, id: &ObjectId, patch: Document) -> StoreResult<UpdateResult> {
        reject_identifier_field(&patch)?;

        let mut tx = self.pool.begin().await?;

        // Row lock holds until commit, so concurrent merges serialize.
        let existing = sqlx::query_as::<_, DocumentRow>(
            "SELECT id, doc FROM documents WHERE collection = $1 AND id = $2 FOR UPDATE",
        )
        .bind(&self.name)
        .bind(id.to_hex())
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = existing else {
            tx.rollback().await?;
            return Ok(UpdateResult { matched_count: 0 });
        };

        let mut merged = row.doc.0;
        merge_fields(&mut merged, patch);
        let body = serde_json::to_string(&merged)?;

        sqlx::query(
            r#"
            UPDATE documents
            SET doc        = $3::json,
                updated_at = NOW()
            WHERE collection = $1 AND id = $2
            "#,
        )
        .bind(&self.name)
        .bind(id.to_hex())
        .bind(body)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(UpdateResult { matched_count: 1 })
    }

    async fn delete_one(&self, id: &ObjectId) -> StoreResult<DeleteResult> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(&self.name)
            .bind(id.to_hex())
            .execute(&self.pool)
            .await?;

        Ok(DeleteResult {
            deleted_count: result.rows_affected(),
        })
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
