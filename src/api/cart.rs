//! Cart endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::{ApiJson, AppState};
use crate::domain::cart::Cart;
use crate::error::Result;
use crate::identity::Principal;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    pub product_id: Uuid,
    pub quantity: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct SetQuantityRequest {
    pub quantity: i64,
}

/// GET /api/cart
pub async fn view(State(state): State<AppState>, principal: Principal) -> Result<Json<Cart>> {
    Ok(Json(state.carts.view(principal.user_id).await?))
}

/// POST /api/cart
pub async fn add_item(
    State(state): State<AppState>,
    principal: Principal,
    ApiJson(req): ApiJson<AddItemRequest>,
) -> Result<(StatusCode, Json<Cart>)> {
    let cart = state
        .carts
        .add_item(principal.user_id, req.product_id, req.quantity.unwrap_or(1))
        .await?;
    Ok((StatusCode::CREATED, Json(cart)))
}

/// PUT /api/cart/:product_id
pub async fn set_quantity(
    State(state): State<AppState>,
    principal: Principal,
    Path(product_id): Path<Uuid>,
    ApiJson(req): ApiJson<SetQuantityRequest>,
) -> Result<Json<Cart>> {
    let cart = state
        .carts
        .set_quantity(principal.user_id, product_id, req.quantity)
        .await?;
    Ok(Json(cart))
}

/// DELETE /api/cart/:product_id
pub async fn remove_item(
    State(state): State<AppState>,
    principal: Principal,
    Path(product_id): Path<Uuid>,
) -> Result<Json<Cart>> {
    let cart = state.carts.remove_item(principal.user_id, product_id).await?;
    Ok(Json(cart))
}

/// DELETE /api/cart
pub async fn clear(State(state): State<AppState>, principal: Principal) -> Result<Json<Cart>> {
    Ok(Json(state.carts.clear(principal.user_id).await?))
}
