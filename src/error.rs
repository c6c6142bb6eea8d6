use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::db::StoreError;
use crate::models::InvalidObjectId;

pub const NOT_FOUND_MESSAGE: &str = "Producto no encontrado";
pub const INVALID_ID_MESSAGE: &str = "Identificador de producto inválido";

#[derive(Debug, Error)]
pub enum AppError {
    /// Well-formed identifier with no matching record. Expected, not a fault.
    #[error("Producto no encontrado")]
    NotFound,

    #[error("invalid identifier: {0}")]
    InvalidIdentifier(#[from] InvalidObjectId),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::InvalidIdentifier(_) => StatusCode::BAD_REQUEST,
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            Self::NotFound => json!({ "message": NOT_FOUND_MESSAGE }),
            Self::InvalidIdentifier(err) => json!({
                "message": INVALID_ID_MESSAGE,
                "error": err.to_string(),
            }),
            Self::Store(err) => {
                tracing::error!(error = %err, "Store operation failed");
                json!({ "error": err.to_string() })
            }
        };
        (status, Json(body)).into_response()
    }
}
