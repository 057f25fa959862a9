use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::extract::ConnectInfo;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use futures_util::StreamExt;
use giftly_api::{app, AppState};
use giftly_core::repository::ProposalRepository;
use giftly_order::{CartService, FavoriteService, ProposalService, ProposalSettings};
use giftly_store::app_config::{PricingConfig, RateLimitConfig};
use giftly_store::memory::{
    InMemoryCartRepository, InMemoryCategoryRepository, InMemoryFavoriteRepository,
    InMemoryProductRepository, InMemoryProposalRepository,
};
use giftly_store::InMemoryRateLimiter;
use serde_json::{json, Value};
use tower::ServiceExt;

fn test_state() -> AppState {
    state_with_proposals(Arc::new(InMemoryProposalRepository::new()))
}

fn state_with_proposals(proposals: Arc<InMemoryProposalRepository>) -> AppState {
    let products = Arc::new(InMemoryProductRepository::new());
    let carts = Arc::new(InMemoryCartRepository::new());
    let (events, _) = tokio::sync::broadcast::channel(16);

    AppState {
        products: products.clone(),
        categories: Arc::new(InMemoryCategoryRepository::new()),
        carts: Arc::new(CartService::new(products.clone(), carts.clone(), "MYR")),
        proposals: Arc::new(ProposalService::new(
            products.clone(),
            carts,
            proposals,
            ProposalSettings::default(),
        )),
        favorites: Arc::new(FavoriteService::new(
            products,
            Arc::new(InMemoryFavoriteRepository::new()),
        )),
        rate_limiter: None,
        events,
        pricing: PricingConfig::default(),
        rate_limit: RateLimitConfig {
            enabled: false,
            requests_per_window: 100,
            window_seconds: 60,
        },
    }
}

fn test_app() -> Router {
    app(test_state())
}

async fn send(app: &Router, method: &str, uri: &str, customer: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(customer) = customer {
        builder = builder.header("X-Customer-Id", customer);
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn bottle() -> Value {
    json!({
        "sku": "BOTTLE-01",
        "name": "Steel Bottle",
        "description": "Insulated bottle",
        "category": "Drinkware",
        "subcategory": "Bottles",
        "basePrice": 10.0,
        "quantityAvailable": 500,
        // Submitted out of order on purpose
        "priceTiers": [
            { "minQuantity": 50, "maxQuantity": 999, "price": 7.0 },
            { "minQuantity": 1, "maxQuantity": 9, "price": 10.0 },
            { "minQuantity": 10, "maxQuantity": 49, "price": 8.5 }
        ]
    })
}

async fn seed_taxonomy(app: &Router) {
    let (status, _) = send(app, "POST", "/v1/admin/categories", None, Some(json!({ "name": "Drinkware" }))).await;
    assert_eq!(status, StatusCode::CREATED);
    let subcategory = json!({ "category": "drinkware", "name": "Bottles" });
    let (status, body) = send(app, "POST", "/v1/admin/subcategories", None, Some(subcategory)).await;
    assert_eq!(status, StatusCode::CREATED);
    // Filed under the category's stored spelling
    assert_eq!(body["category"], "Drinkware");
}

async fn create_bottle(app: &Router) -> String {
    seed_taxonomy(app).await;
    let (status, body) = send(app, "POST", "/v1/admin/products", None, Some(bottle())).await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health() {
    let app = test_app();
    let (status, body) = send(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_price_lookup_resolves_tiers() {
    let app = test_app();
    let id = create_bottle(&app).await;

    let (status, body) = send(&app, "GET", &format!("/v1/products/{}/price?quantity=10", id), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["price"], 8.5);
    assert_eq!(body["total"], 85.0);
    assert_eq!(body["currency"], "MYR");
    assert_eq!(body["appliedTier"]["minQuantity"], 10);

    // Above every tier falls back to base price
    let (_, body) = send(&app, "GET", &format!("/v1/products/{}/price?quantity=1000", id), None, None).await;
    assert_eq!(body["price"], 10.0);
    assert!(body["appliedTier"].is_null());

    // Non-positive quantities are clamped to one
    let (_, body) = send(&app, "GET", &format!("/v1/products/{}/price?quantity=0", id), None, None).await;
    assert_eq!(body["quantity"], 1);
    assert_eq!(body["price"], 10.0);
}

#[tokio::test]
async fn test_product_tiers_served_sorted() {
    let app = test_app();
    let id = create_bottle(&app).await;

    let (status, body) = send(&app, "GET", &format!("/v1/products/{}", id), None, None).await;
    assert_eq!(status, StatusCode::OK);
    let mins: Vec<i64> = body["priceTiers"]
        .as_array()
        .unwrap()
        .iter()
        .map(|tier| tier["minQuantity"].as_i64().unwrap())
        .collect();
    assert_eq!(mins, vec![1, 10, 50]);

    let (_, list) = send(&app, "GET", "/v1/products?category=drinkware&search=steel", None, None).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_admin_rejects_overlapping_tiers() {
    let app = test_app();
    let mut product = bottle();
    product["priceTiers"] = json!([
        { "minQuantity": 1, "maxQuantity": 10, "price": 10.0 },
        { "minQuantity": 10, "maxQuantity": 49, "price": 8.5 }
    ]);

    let (status, body) = send(&app, "POST", "/v1/admin/products", None, Some(product)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["issues"][0]["kind"], "OVERLAP");
}

#[tokio::test]
async fn test_admin_update_and_delete() {
    let app = test_app();
    let id = create_bottle(&app).await;

    let mut product = bottle();
    product["basePrice"] = json!(12.0);
    let (status, body) = send(&app, "PUT", &format!("/v1/admin/products/{}", id), None, Some(product)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["basePrice"], 12.0);

    let (status, _) = send(&app, "DELETE", &format!("/v1/admin/products/{}", id), None, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "GET", &format!("/v1/products/{}", id), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_pricing_preview_reports_issues_without_rejecting() {
    let app = test_app();
    let request = json!({
        "basePrice": 10.0,
        "priceTiers": [
            { "minQuantity": 1, "maxQuantity": 9, "price": 10.0 },
            { "minQuantity": 10, "maxQuantity": 49, "price": 8.5 },
            { "minQuantity": 50, "maxQuantity": 999, "price": 7.0 }
        ]
    });

    let (status, body) = send(&app, "POST", "/v1/admin/pricing/preview", None, Some(request)).await;
    assert_eq!(status, StatusCode::OK);
    let prices: Vec<f64> = body["rows"]
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["unitPrice"].as_f64().unwrap())
        .collect();
    assert_eq!(prices, vec![10.0, 8.5, 7.0]);
    assert!(body["issues"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_cart_requires_customer_header() {
    let app = test_app();
    let (status, _) = send(&app, "GET", "/v1/cart", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_cart_flow_prices_on_server() {
    let app = test_app();
    let id = create_bottle(&app).await;

    let (status, cart) = send(
        &app,
        "POST",
        "/v1/cart/items",
        Some("acme"),
        Some(json!({ "productId": id, "quantity": 25 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["items"][0]["unitPrice"], 8.5);
    assert_eq!(cart["totalAmount"], 212.5);

    let item_id = cart["items"][0]["id"].as_str().unwrap().to_string();
    let (_, cart) = send(
        &app,
        "PUT",
        &format!("/v1/cart/items/{}", item_id),
        Some("acme"),
        Some(json!({ "quantity": 100 })),
    )
    .await;
    assert_eq!(cart["items"][0]["unitPrice"], 7.0);
    assert_eq!(cart["totalAmount"], 700.0);

    // Carts are per customer
    let (_, other) = send(&app, "GET", "/v1/cart", Some("globex"), None).await;
    assert!(other["items"].as_array().unwrap().is_empty());

    let (_, cleared) = send(&app, "DELETE", "/v1/cart", Some("acme"), None).await;
    assert!(cleared["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_proposal_flow() {
    let app = test_app();
    let id = create_bottle(&app).await;

    let draft = json!({
        "name": "Year-end gifts",
        "clientName": "Globex",
        "clientEmail": "buyer@globex.test",
        "items": [
            { "productId": id, "quantity": 50 },
            { "productId": id, "quantity": 5, "customPrice": 6.25 }
        ]
    });
    let (status, proposal) = send(&app, "POST", "/v1/proposals", Some("acme"), Some(draft)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(proposal["status"], "DRAFT");
    assert_eq!(proposal["items"][0]["priceSource"], "TIER");
    assert_eq!(proposal["items"][1]["priceSource"], "CUSTOM");
    assert_eq!(proposal["totalAmount"], 381.25);

    let proposal_id = proposal["id"].as_str().unwrap().to_string();
    let status_uri = format!("/v1/proposals/{}/status", proposal_id);

    let (status, _) = send(&app, "POST", &status_uri, Some("acme"), Some(json!({ "status": "ACCEPTED" }))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(&app, "POST", &status_uri, Some("acme"), Some(json!({ "status": "SENT" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "SENT");

    // Other customers cannot see it
    let (status, _) = send(&app, "GET", &format!("/v1/proposals/{}", proposal_id), Some("initech"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, listed) = send(&app, "GET", "/v1/proposals", Some("acme"), None).await;
    assert_eq!(listed.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_proposal_from_cart_keeps_cart_prices() {
    let app = test_app();
    let id = create_bottle(&app).await;

    send(
        &app,
        "POST",
        "/v1/cart/items",
        Some("acme"),
        Some(json!({ "productId": id, "quantity": 10 })),
    )
    .await;

    let request = json!({
        "name": "Team kits",
        "clientName": "Globex",
        "clientEmail": "buyer@globex.test",
        "clearCart": true
    });
    let (status, proposal) = send(&app, "POST", "/v1/proposals/from-cart", Some("acme"), Some(request)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(proposal["items"][0]["unitPrice"], 8.5);
    assert_eq!(proposal["totalAmount"], 85.0);

    let (_, cart) = send(&app, "GET", "/v1/cart", Some("acme"), None).await;
    assert!(cart["items"].as_array().unwrap().is_empty());

    // Nothing left to propose
    let request = json!({
        "name": "Again",
        "clientName": "Globex",
        "clientEmail": "buyer@globex.test"
    });
    let (status, _) = send(&app, "POST", "/v1/proposals/from-cart", Some("acme"), Some(request)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_duplicate_sku_conflicts() {
    let app = test_app();
    create_bottle(&app).await;

    let (status, body) = send(&app, "POST", "/v1/admin/products", None, Some(bottle())).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("BOTTLE-01"));
}

#[tokio::test]
async fn test_product_needs_known_taxonomy() {
    let app = test_app();
    let (status, body) = send(&app, "POST", "/v1/admin/products", None, Some(bottle())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Unknown category: Drinkware");

    seed_taxonomy(&app).await;
    let mut product = bottle();
    product["subcategory"] = json!("Mugs");
    let (status, _) = send(&app, "POST", "/v1/admin/products", None, Some(product)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Names are matched ignoring case and stored canonically
    let mut product = bottle();
    product["category"] = json!("DRINKWARE");
    product["subcategory"] = json!("bottles");
    let (status, body) = send(&app, "POST", "/v1/admin/products", None, Some(product)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["category"], "Drinkware");
    assert_eq!(body["subcategory"], "Bottles");
}

#[tokio::test]
async fn test_taxonomy_admin() {
    let app = test_app();
    seed_taxonomy(&app).await;

    let (status, _) = send(&app, "POST", "/v1/admin/categories", None, Some(json!({ "name": "drinkware" }))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (status, _) = send(&app, "POST", "/v1/admin/categories", None, Some(json!({ "name": " " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let orphan = json!({ "category": "Stationery", "name": "Pens" });
    let (status, _) = send(&app, "POST", "/v1/admin/subcategories", None, Some(orphan)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, categories) = send(&app, "GET", "/v1/admin/categories", None, None).await;
    let category_id = categories[0]["id"].as_str().unwrap().to_string();
    let (_, subcategories) = send(&app, "GET", "/v1/admin/subcategories?category=Drinkware", None, None).await;
    assert_eq!(subcategories.as_array().unwrap().len(), 1);
    let subcategory_id = subcategories[0]["id"].as_str().unwrap().to_string();

    // In use by a product, even a hidden one
    let mut product = bottle();
    product["isActive"] = json!(false);
    let (_, created) = send(&app, "POST", "/v1/admin/products", None, Some(product)).await;
    let product_id = created["id"].as_str().unwrap().to_string();

    let subcategory_uri = format!("/v1/admin/subcategories/{}", subcategory_id);
    let category_uri = format!("/v1/admin/categories/{}", category_id);
    let (status, _) = send(&app, "DELETE", &subcategory_uri, None, None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    send(&app, "DELETE", &format!("/v1/admin/products/{}", product_id), None, None).await;
    // Subcategories must go before their category
    let (status, _) = send(&app, "DELETE", &category_uri, None, None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (status, _) = send(&app, "DELETE", &subcategory_uri, None, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "DELETE", &category_uri, None, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_admin_listing_includes_hidden_products() {
    let app = test_app();
    let id = create_bottle(&app).await;

    let mut hidden = bottle();
    hidden["isActive"] = json!(false);
    send(&app, "PUT", &format!("/v1/admin/products/{}", id), None, Some(hidden)).await;

    let (_, public) = send(&app, "GET", "/v1/products", None, None).await;
    assert!(public.as_array().unwrap().is_empty());
    let (status, admin) = send(&app, "GET", "/v1/admin/products?category=Drinkware", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(admin.as_array().unwrap().len(), 1);
    assert_eq!(admin[0]["isActive"], false);
}

#[tokio::test]
async fn test_likes_flow() {
    let app = test_app();
    let id = create_bottle(&app).await;
    let status_uri = format!("/v1/likes/products/{}/status", id);
    let toggle_uri = format!("/v1/likes/products/{}/toggle", id);

    let (status, _) = send(&app, "GET", &status_uri, None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(&app, "GET", &status_uri, Some("acme"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "isLiked": false, "likeCount": 0 }));

    let (_, body) = send(&app, "POST", &toggle_uri, Some("acme"), None).await;
    assert_eq!(body, json!({ "isLiked": true, "likeCount": 1 }));
    let (_, body) = send(&app, "POST", &toggle_uri, Some("globex"), None).await;
    assert_eq!(body, json!({ "isLiked": true, "likeCount": 2 }));

    let (status, liked) = send(&app, "GET", "/v1/likes/user/liked-products?page=1&limit=1", Some("acme"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(liked["total"], 1);
    assert_eq!(liked["products"][0]["id"], id.as_str());
    // Served like the catalog, tiers sorted
    assert_eq!(liked["products"][0]["priceTiers"][0]["minQuantity"], 1);

    let (_, body) = send(&app, "POST", &toggle_uri, Some("acme"), None).await;
    assert_eq!(body, json!({ "isLiked": false, "likeCount": 1 }));

    let (status, _) = send(&app, "POST", "/v1/likes/products/00000000-0000-0000-0000-000000000000/toggle", Some("acme"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Deleting the product drops its likes
    send(&app, "DELETE", &format!("/v1/admin/products/{}", id), None, None).await;
    let (_, liked) = send(&app, "GET", "/v1/likes/user/liked-products", Some("globex"), None).await;
    assert_eq!(liked["total"], 0);
}

#[tokio::test]
async fn test_expired_proposal_cannot_be_accepted() {
    let proposals = Arc::new(InMemoryProposalRepository::new());
    let app = app(state_with_proposals(proposals.clone()));
    let id = create_bottle(&app).await;

    let draft = json!({
        "name": "Last quarter",
        "clientName": "Globex",
        "clientEmail": "buyer@globex.test",
        "sendNow": true,
        "items": [{ "productId": id, "quantity": 10 }]
    });
    let (_, proposal) = send(&app, "POST", "/v1/proposals", Some("acme"), Some(draft)).await;
    let proposal_id = proposal["id"].as_str().unwrap().parse().unwrap();

    let mut stored = proposals.get_proposal(proposal_id).await.unwrap().unwrap();
    stored.valid_until = chrono::Utc::now() - chrono::Duration::days(1);
    proposals.save_proposal(&stored).await.unwrap();

    let (status, body) = send(
        &app,
        "POST",
        &format!("/v1/proposals/{}/status", proposal_id),
        Some("acme"),
        Some(json!({ "status": "ACCEPTED" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("validity"));
}

#[tokio::test]
async fn test_rate_limit_blocks_after_window_budget() {
    let mut state = test_state();
    state.rate_limiter = Some(Arc::new(InMemoryRateLimiter::new()));
    state.rate_limit = RateLimitConfig {
        enabled: true,
        requests_per_window: 2,
        window_seconds: 60,
    };
    let app = app(state);

    let request = |ip: [u8; 4]| {
        let mut request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        request
            .extensions_mut()
            .insert(ConnectInfo(SocketAddr::from((ip, 4000))));
        request
    };

    for _ in 0..2 {
        let response = app.clone().oneshot(request([10, 0, 0, 1])).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
    let response = app.clone().oneshot(request([10, 0, 0, 1])).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    // Budgets are per client address
    let response = app.clone().oneshot(request([10, 0, 0, 2])).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_event_stream_delivers_pricing_updates() {
    let app = test_app();
    seed_taxonomy(&app).await;

    let request = Request::builder().uri("/v1/events").body(Body::empty()).unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "text/event-stream");

    // Subscribed before the product is created
    let (status, _) = send(&app, "POST", "/v1/admin/products", None, Some(bottle())).await;
    assert_eq!(status, StatusCode::CREATED);

    let mut frames = response.into_body().into_data_stream();
    let frame = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let chunk = frames.next().await.expect("stream ended").unwrap();
            let text = String::from_utf8_lossy(&chunk).to_string();
            if text.contains("event:") {
                return text;
            }
        }
    })
    .await
    .expect("no event within 5s");

    assert!(frame.contains("event: product_pricing_updated"));
    assert!(frame.contains("\"type\":\"PRODUCT_PRICING_UPDATED\""));
    assert!(frame.contains("\"tier_count\":3"));
}

