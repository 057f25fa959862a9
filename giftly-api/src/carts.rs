use axum::{
    extract::{Path, State},
    routing::{get, post, put},
    Extension, Json, Router,
};
use chrono::Utc;
use giftly_core::Cart;
use giftly_shared::models::events::CartUpdatedEvent;
use giftly_shared::models::StoreEvent;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::middleware::CustomerId;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    pub product_id: Uuid,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub quantity: i64,
}

fn default_quantity() -> i64 {
    1
}

/// Routes here expect `customer_middleware` to have run
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/cart", get(get_cart).delete(clear_cart))
        .route("/v1/cart/items", post(add_item))
        .route("/v1/cart/items/{item_id}", put(update_item).delete(remove_item))
}

async fn get_cart(
    State(state): State<AppState>,
    Extension(customer): Extension<CustomerId>,
) -> Result<Json<Cart>, AppError> {
    Ok(Json(state.carts.get_cart(customer.as_str()).await?))
}

async fn add_item(
    State(state): State<AppState>,
    Extension(customer): Extension<CustomerId>,
    Json(req): Json<AddItemRequest>,
) -> Result<Json<Cart>, AppError> {
    let cart = state
        .carts
        .add_item(customer.as_str(), req.product_id, req.quantity)
        .await?;
    publish_cart(&state, &cart);
    Ok(Json(cart))
}

async fn update_item(
    State(state): State<AppState>,
    Extension(customer): Extension<CustomerId>,
    Path(item_id): Path<Uuid>,
    Json(req): Json<UpdateItemRequest>,
) -> Result<Json<Cart>, AppError> {
    let cart = state
        .carts
        .update_item(customer.as_str(), item_id, req.quantity)
        .await?;
    publish_cart(&state, &cart);
    Ok(Json(cart))
}

async fn remove_item(
    State(state): State<AppState>,
    Extension(customer): Extension<CustomerId>,
    Path(item_id): Path<Uuid>,
) -> Result<Json<Cart>, AppError> {
    let cart = state.carts.remove_item(customer.as_str(), item_id).await?;
    publish_cart(&state, &cart);
    Ok(Json(cart))
}

async fn clear_cart(
    State(state): State<AppState>,
    Extension(customer): Extension<CustomerId>,
) -> Result<Json<Cart>, AppError> {
    let cart = state.carts.clear(customer.as_str()).await?;
    publish_cart(&state, &cart);
    Ok(Json(cart))
}

fn publish_cart(state: &AppState, cart: &Cart) {
    state.publish(StoreEvent::CartUpdated(CartUpdatedEvent {
        cart_id: cart.id,
        customer_id: cart.customer_id.clone(),
        total_items: cart.total_items,
        total_amount: cart.total_amount,
        timestamp: Utc::now().timestamp(),
    }));
}
