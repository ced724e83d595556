//! Stock listing, stock intake, and the public medicine catalog.

use axum::{extract::State, Json};
use validator::Validate;

use crate::dtos::{AddStockRequest, MedicinesResponse, MessageResponse};
use crate::error::AppError;
use crate::middleware::CurrentUser;
use crate::models::{Role, StockItem};
use crate::AppState;

/// GET /stock — full ledger listing for staff.
pub async fn list_stock(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<StockItem>>, AppError> {
    user.require_role(&[Role::Admin, Role::User])?;

    let items = state.stock.list_all().await.map_err(AppError::DatabaseError)?;
    Ok(Json(items))
}

/// POST /stock — add a new product row. Product names are unique.
pub async fn add_stock(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<AddStockRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    user.require_role(&[Role::Admin, Role::User])?;
    req.validate()?;

    let existing = state
        .stock
        .get(&req.product_name)
        .await
        .map_err(AppError::DatabaseError)?;
    if existing.is_some() {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "Product '{}' already exists in stock",
            req.product_name
        )));
    }

    tracing::info!(
        username = %user.username,
        product_name = %req.product_name,
        qty = req.qty,
        "Adding stock"
    );

    state
        .stock
        .add(StockItem::from(req))
        .await
        .map_err(AppError::DatabaseError)?;

    Ok(Json(MessageResponse {
        message: "Stock added successfully!".to_string(),
    }))
}

/// GET /medicines — distinct product names, no authentication required.
pub async fn list_medicines(
    State(state): State<AppState>,
) -> Result<Json<MedicinesResponse>, AppError> {
    let medicines = state
        .stock
        .distinct_names()
        .await
        .map_err(AppError::DatabaseError)?;
    Ok(Json(MedicinesResponse { medicines }))
}
