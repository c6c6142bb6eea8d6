use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::ObjectId;

/// Schema-less document body. Key order is preserved as received.
pub type Document = Map<String, Value>;

/// Field name the store reserves for the record identifier.
pub const ID_FIELD: &str = "_id";

/// A stored product: the store-assigned identifier followed by the caller's fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    #[serde(flatten)]
    pub fields: Document,
}

impl Product {
    pub fn new(id: ObjectId, fields: Document) -> Self {
        Self { id, fields }
    }
}

/// Acknowledgment returned by a successful insert.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertOneResult {
    pub acknowledged: bool,
    pub inserted_id: ObjectId,
}

impl InsertOneResult {
    pub fn new(inserted_id: ObjectId) -> Self {
        Self {
            acknowledged: true,
            inserted_id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResult {
    pub matched_count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    pub deleted_count: u64,
}

/// Plain `{ "message": ... }` response body.
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub message: String,
}

impl Message {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Top-level field merge: keys in `patch` overwrite or extend `target`,
/// keys absent from `patch` are left as they are.
pub fn merge_fields(target: &mut Document, patch: Document) {
    for (key, value) in patch {
        target.insert(key, value);
    }
}
