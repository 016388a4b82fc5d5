//! HTTP surface: router, shared state, extractor glue.

use axum::async_trait;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::catalog::{Catalog, MemoryCatalog, PgCatalog};
use crate::error::Error;
use crate::service::{CartService, OrderService};
use crate::store::{CartStore, MemoryStore, OrderStore, PgCartStore, PgOrderStore};

pub mod cart;
pub mod orders;

#[derive(Clone)]
pub struct AppState {
    pub carts: CartService,
    pub orders: OrderService,
}

impl AppState {
    pub fn new(
        cart_store: Arc<dyn CartStore>,
        order_store: Arc<dyn OrderStore>,
        catalog: Arc<dyn Catalog>,
    ) -> Self {
        Self {
            carts: CartService::new(cart_store.clone(), catalog),
            orders: OrderService::new(cart_store, order_store),
        }
    }

    pub fn postgres(pool: PgPool) -> Self {
        Self::new(
            Arc::new(PgCartStore::new(pool.clone())),
            Arc::new(PgOrderStore::new(pool.clone())),
            Arc::new(PgCatalog::new(pool)),
        )
    }

    /// Fully in-memory state, used by the test suites and local development.
    pub fn in_memory(catalog: MemoryCatalog) -> Self {
        let store = MemoryStore::new();
        Self::new(
            Arc::new(store.clone()),
            Arc::new(store),
            Arc::new(catalog),
        )
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/api/cart",
            get(cart::view).post(cart::add_item).delete(cart::clear),
        )
        .route(
            "/api/cart/:product_id",
            put(cart::set_quantity).delete(cart::remove_item),
        )
        .route("/api/orders", post(orders::checkout).get(orders::list_mine))
        .route("/api/orders/admin/all", get(orders::list_all))
        .route("/api/orders/admin/:id/status", put(orders::update_status))
        .route("/api/orders/:id", get(orders::get_mine))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "healthy", "service": "storefront"}))
}

/// `axum::Json` with the rejection downgraded to our 400, so a malformed body
/// is reported through the same error envelope as every other invalid input.
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| Error::InvalidInput(rejection.body_text()))?;
        Ok(ApiJson(value))
    }
}
