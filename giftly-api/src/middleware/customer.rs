use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::AppError;

pub const CUSTOMER_HEADER: &str = "x-customer-id";

/// Identity of the caller for cart and proposal routes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerId(pub String);

impl CustomerId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Reads `X-Customer-Id` and injects a [`CustomerId`] into request extensions.
/// Identity plumbing only; the header is trusted as sent.
pub async fn customer_middleware(mut req: Request, next: Next) -> Response {
    let customer = req
        .headers()
        .get(CUSTOMER_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| CustomerId(id.to_string()));

    match customer {
        Some(customer) => {
            req.extensions_mut().insert(customer);
            next.run(req).await
        }
        None => AppError::Unauthenticated("Missing X-Customer-Id header".to_string()).into_response(),
    }
}
