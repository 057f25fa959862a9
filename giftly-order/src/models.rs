use giftly_catalog::Product;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_PAGE_SIZE: u64 = 12;
pub const MAX_PAGE_SIZE: u64 = 100;

/// One requested proposal line
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalLineRequest {
    pub product_id: Uuid,
    pub quantity: i64,
    /// Overrides the catalog price for this line
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub custom_price: Option<Decimal>,
}

/// Client-facing details shared by both ways of creating a proposal
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalDetails {
    pub name: String,
    pub client_name: String,
    pub client_email: String,
    /// Create directly in `SENT` instead of `DRAFT`
    #[serde(default)]
    pub send_now: bool,
}

impl ProposalDetails {
    /// Returns the first problem found, if any
    pub fn problem(&self) -> Option<&'static str> {
        if self.name.trim().is_empty() {
            return Some("proposal name is required");
        }
        if self.client_name.trim().is_empty() {
            return Some("client name is required");
        }
        let email = self.client_email.trim();
        match email.split_once('@') {
            Some((local, domain)) if !local.is_empty() && domain.contains('.') => None,
            _ => Some("client email is invalid"),
        }
    }
}

/// A proposal built from explicit product lines
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalDraft {
    #[serde(flatten)]
    pub details: ProposalDetails,
    pub items: Vec<ProposalLineRequest>,
}

/// A customer's like on one product, with everyone's likes counted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeStatus {
    pub is_liked: bool,
    pub like_count: u64,
}

/// One page of liked products, most recently liked first
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikedProducts {
    pub products: Vec<Product>,
    /// Every like the customer has, not just this page
    pub total: u64,
    pub page: u64,
    pub limit: u64,
}
