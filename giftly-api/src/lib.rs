use axum::{http::Method, routing::get, Json, Router};
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod admin;
pub mod carts;
pub mod categories;
pub mod error;
pub mod events;
pub mod favorites;
pub mod middleware;
pub mod products;
pub mod proposals;
pub mod state;

pub use state::AppState;

pub fn app(state: AppState) -> Router {
    // CORS Middleware
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::USER_AGENT,
            axum::http::HeaderName::from_static(middleware::customer::CUSTOMER_HEADER),
        ]);

    let customer_routes = Router::new()
        .merge(carts::routes())
        .merge(proposals::routes())
        .merge(favorites::routes())
        .route_layer(axum::middleware::from_fn(middleware::customer_middleware));

    Router::new()
        .route("/health", get(health))
        .merge(products::routes())
        .merge(admin::routes())
        .merge(categories::routes())
        .merge(events::routes())
        .merge(customer_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::rate_limit_middleware,
        ))
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
