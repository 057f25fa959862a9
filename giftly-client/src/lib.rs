//! Storefront-side quoting: an immediate local price on every quantity change,
//! reconciled against the server's authoritative price.

pub mod error;
pub mod feed;
pub mod quote;
pub mod source;

pub use error::ClientError;
pub use feed::{PriceFeed, DEFAULT_DEBOUNCE};
pub use quote::{ClientQuote, QuoteSource, QuoteState};
pub use source::{HttpPriceSource, PriceSource};
