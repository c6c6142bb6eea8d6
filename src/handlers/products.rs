use std::time::Instant;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::info;

use crate::{
    error::AppResult,
    models::{Document, InsertOneResult, Message, Product},
    AppState,
};

pub const UPDATED_MESSAGE: &str = "Producto actualizado exitosamente";
pub const DELETED_MESSAGE: &str = "Producto eliminado exitosamente";

// ── Create ────────────────────────────────────────────────────────────────────

pub async fn create_product(
    State(state): State<AppState>,
    Json(payload): Json<Document>,
) -> AppResult<(StatusCode, Json<InsertOneResult>)> {
    let start = Instant::now();
    let ack = state.products.create(payload).await?;

    info!(
        id = %ack.inserted_id,
        elapsed_ms = start.elapsed().as_millis(),
        "Created product"
    );

    Ok((StatusCode::OK, Json(ack)))
}

// ── List ──────────────────────────────────────────────────────────────────────

pub async fn list_products(
    State(state): State<AppState>,
) -> AppResult<(StatusCode, Json<Vec<Product>>)> {
    let start = Instant::now();
    let products = state.products.list().await?;

    info!(
        count = products.len(),
        elapsed_ms = start.elapsed().as_millis(),
        "Listed products"
    );

    Ok((StatusCode::OK, Json(products)))
}

// ── Get by ID ─────────────────────────────────────────────────────────────────

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<(StatusCode, Json<Product>)> {
    let start = Instant::now();
    let product = state.products.get(&id).await?;

    info!(id = %id, elapsed_ms = start.elapsed().as_millis(), "Fetched product");

    Ok((StatusCode::OK, Json(product)))
}

// ── Update ────────────────────────────────────────────────────────────────────

pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<Document>,
) -> AppResult<(StatusCode, Json<Message>)> {
    let start = Instant::now();
    let fields = payload.len();
    state.products.update(&id, payload).await?;

    info!(
        id = %id,
        fields,
        elapsed_ms = start.elapsed().as_millis(),
        "Updated product"
    );

    Ok((StatusCode::OK, Json(Message::new(UPDATED_MESSAGE))))
}

// ── Delete ────────────────────────────────────────────────────────────────────

pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<(StatusCode, Json<Message>)> {
    let start = Instant::now();
    state.products.delete(&id).await?;

    info!(id = %id, elapsed_ms = start.elapsed().as_millis(), "Deleted product");

    Ok((StatusCode::OK, Json(Message::new(DELETED_MESSAGE))))
}
