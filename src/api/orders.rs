//! Order endpoints: checkout, customer queries, administrative lifecycle.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::{ApiJson, AppState};
use crate::domain::order::{Order, OrderStatus, PaymentMethod};
use crate::error::{Error, Result};
use crate::identity::Principal;
use crate::service::OrderListing;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub shipping_address: Option<serde_json::Value>,
    pub payment_method: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct AdminListQuery {
    pub status: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// POST /api/orders
pub async fn checkout(
    State(state): State<AppState>,
    principal: Principal,
    ApiJson(req): ApiJson<CheckoutRequest>,
) -> Result<(StatusCode, Json<Order>)> {
    let payment_method = match req.payment_method.as_deref() {
        Some(label) => label
            .parse::<PaymentMethod>()
            .map_err(|e| Error::InvalidInput(e.to_string()))?,
        None => PaymentMethod::default(),
    };
    let order = state
        .orders
        .checkout(principal.user_id, req.shipping_address, payment_method)
        .await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// GET /api/orders
pub async fn list_mine(
    State(state): State<AppState>,
    principal: Principal,
) -> Result<Json<Vec<Order>>> {
    Ok(Json(state.orders.list_for(principal.user_id).await?))
}

/// GET /api/orders/:id
pub async fn get_mine(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> Result<Json<Order>> {
    Ok(Json(state.orders.get_for(principal.user_id, id).await?))
}

/// GET /api/orders/admin/all
pub async fn list_all(
    State(state): State<AppState>,
    principal: Principal,
    Query(query): Query<AdminListQuery>,
) -> Result<Json<OrderListing>> {
    principal.require_admin()?;
    let status = query
        .status
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(str::parse::<OrderStatus>)
        .transpose()
        .map_err(|e| Error::InvalidInput(e.to_string()))?;
    let listing = state.orders.list_all(status, query.page, query.limit).await?;
    Ok(Json(listing))
}

/// PUT /api/orders/admin/:id/status
pub async fn update_status(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
    ApiJson(req): ApiJson<UpdateStatusRequest>,
) -> Result<Json<Order>> {
    principal.require_admin()?;
    let requested = req
        .status
        .parse::<OrderStatus>()
        .map_err(|e| Error::InvalidInput(e.to_string()))?;
    Ok(Json(state.orders.transition(id, requested).await?))
}
