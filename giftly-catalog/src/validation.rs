//! Authoring-time checks for product pricing.
//!
//! The resolver tolerates anything; these checks are what stop an admin from
//! saving tiers that would price surprisingly.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::inventory::MIN_ORDER_QUANTITY;
use crate::pricing::{PriceTier, PricedProduct, CURRENCY_DP};

/// A single problem with a product's pricing.
///
/// Tier positions refer to the order the tiers were submitted in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TierIssue {
    #[error("Base price must be greater than zero")]
    NonPositiveBasePrice,

    #[error("Base price has more than {max_dp} decimal places")]
    BasePriceExcessPrecision { max_dp: u32 },

    #[error("Tier {position}: minimum quantity must be at least 1")]
    MinQuantityBelowOne { position: usize },

    #[error("Tier {position}: maximum quantity must exceed minimum quantity")]
    DegenerateRange { position: usize },

    #[error("Tier {position}: price must be greater than zero")]
    NonPositivePrice { position: usize },

    #[error("Tier {position}: price has more than {max_dp} decimal places")]
    ExcessPrecision { position: usize, max_dp: u32 },

    #[error("Tiers {first} and {second} overlap")]
    Overlap { first: usize, second: usize },
}

#[derive(Debug, thiserror::Error)]
#[error("Invalid pricing: {}", summarize(.issues))]
pub struct ValidationError {
    pub issues: Vec<TierIssue>,
}

fn summarize(issues: &[TierIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

fn exceeds_currency_precision(amount: Decimal) -> bool {
    amount.normalize().scale() > CURRENCY_DP
}

fn ranges_overlap(a: &PriceTier, b: &PriceTier) -> bool {
    !(a.max_quantity < b.min_quantity || b.max_quantity < a.min_quantity)
}

/// Collect every pricing problem, in a stable order.
pub fn validate_pricing(pricing: &PricedProduct) -> Vec<TierIssue> {
    let mut issues = Vec::new();

    if pricing.base_price <= Decimal::ZERO {
        issues.push(TierIssue::NonPositiveBasePrice);
    }
    if exceeds_currency_precision(pricing.base_price) {
        issues.push(TierIssue::BasePriceExcessPrecision { max_dp: CURRENCY_DP });
    }

    for (position, tier) in pricing.price_tiers.iter().enumerate() {
        if tier.min_quantity < MIN_ORDER_QUANTITY {
            issues.push(TierIssue::MinQuantityBelowOne { position });
        }
        if tier.max_quantity <= tier.min_quantity {
            issues.push(TierIssue::DegenerateRange { position });
        }
        if tier.price <= Decimal::ZERO {
            issues.push(TierIssue::NonPositivePrice { position });
        }
        if exceeds_currency_precision(tier.price) {
            issues.push(TierIssue::ExcessPrecision {
                position,
                max_dp: CURRENCY_DP,
            });
        }
    }

    // Inverted ranges contain no quantity, so they cannot overlap anything
    let tiers = &pricing.price_tiers;
    for first in 0..tiers.len() {
        if tiers[first].max_quantity < tiers[first].min_quantity {
            continue;
        }
        for second in (first + 1)..tiers.len() {
            if tiers[second].max_quantity < tiers[second].min_quantity {
                continue;
            }
            if ranges_overlap(&tiers[first], &tiers[second]) {
                issues.push(TierIssue::Overlap { first, second });
            }
        }
    }

    issues
}

pub fn ensure_valid(pricing: &PricedProduct) -> Result<(), ValidationError> {
    let issues = validate_pricing(pricing);
    if issues.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { issues })
    }
}
