use serde::Serialize;

use crate::pricing::{PricedProduct, Quote};
use crate::validation::{validate_pricing, TierIssue};

/// Quantities shown in the admin preview when none are configured
pub const DEFAULT_SAMPLE_QUANTITIES: [i64; 3] = [1, 25, 100];

/// What a buyer would see at a handful of quantities, plus any authoring problems
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingPreview {
    pub rows: Vec<Quote>,
    pub issues: Vec<TierIssue>,
}

impl PricingPreview {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

/// Build the admin preview. Works on unsaved, possibly malformed tiers.
pub fn preview(pricing: &PricedProduct, sample_quantities: &[i64]) -> PricingPreview {
    let samples: &[i64] = if sample_quantities.is_empty() {
        &DEFAULT_SAMPLE_QUANTITIES
    } else {
        sample_quantities
    };

    PricingPreview {
        rows: samples.iter().map(|&quantity| pricing.quote(quantity)).collect(),
        issues: validate_pricing(pricing),
    }
}
