use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Number of decimal places used for displayed amounts
pub const CURRENCY_DP: u32 = 2;

/// A quantity range with a flat unit price
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceTier {
    pub min_quantity: i64,
    pub max_quantity: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

impl PriceTier {
    pub fn new(min_quantity: i64, max_quantity: i64, price: Decimal) -> Self {
        Self {
            min_quantity,
            max_quantity,
            price,
        }
    }

    /// Inclusive on both ends. Inverted ranges contain nothing.
    pub fn contains(&self, quantity: i64) -> bool {
        self.min_quantity <= quantity && quantity <= self.max_quantity
    }
}

/// Outcome of resolving a unit price for a quantity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolution {
    #[serde(with = "rust_decimal::serde::float")]
    pub unit_price: Decimal,
    /// `None` means the base price was used
    pub matched_tier: Option<PriceTier>,
}

impl Resolution {
    pub fn base(base_price: Decimal) -> Self {
        Self {
            unit_price: base_price,
            matched_tier: None,
        }
    }

    pub fn is_base_price(&self) -> bool {
        self.matched_tier.is_none()
    }
}

/// Returns `tiers` ordered ascending by `min_quantity`.
///
/// The sort is stable, so tiers sharing a `min_quantity` keep their input order.
pub fn sorted_tiers(tiers: &[PriceTier]) -> Vec<PriceTier> {
    let mut sorted = tiers.to_vec();
    sorted.sort_by_key(|tier| tier.min_quantity);
    sorted
}

/// Resolve the unit price that applies to every unit of an order of `quantity`.
///
/// Tiers are scanned in ascending `min_quantity` order and the first tier
/// containing `quantity` wins, so when tiers overlap the one starting lowest
/// is used. Quantities that fall in a gap, below the first tier or above the
/// last one get `base_price`. Malformed tiers never cause an error.
pub fn resolve(base_price: Decimal, tiers: &[PriceTier], quantity: i64) -> Resolution {
    if tiers.is_empty() {
        return Resolution::base(base_price);
    }

    sorted_tiers(tiers)
        .into_iter()
        .find(|tier| tier.contains(quantity))
        .map(|tier| Resolution {
            unit_price: tier.price,
            matched_tier: Some(tier),
        })
        .unwrap_or_else(|| Resolution::base(base_price))
}

/// Round an amount for display, half away from zero.
pub fn round_currency(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(CURRENCY_DP, RoundingStrategy::MidpointAwayFromZero)
}

/// Line total for `quantity` units at `unit_price`.
///
/// The product is computed exactly and rounded once. On overflow the result
/// saturates instead of panicking.
pub fn line_total(unit_price: Decimal, quantity: i64) -> Decimal {
    let exact = unit_price
        .checked_mul(Decimal::from(quantity))
        .unwrap_or(if (unit_price.is_sign_negative()) == (quantity < 0) {
            Decimal::MAX
        } else {
            Decimal::MIN
        });
    round_currency(exact)
}

/// Unit price plus the displayed total for a quantity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub quantity: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub unit_price: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total: Decimal,
    pub matched_tier: Option<PriceTier>,
}

impl Quote {
    pub fn from_resolution(resolution: Resolution, quantity: i64) -> Self {
        Self {
            quantity,
            unit_price: resolution.unit_price,
            total: line_total(resolution.unit_price, quantity),
            matched_tier: resolution.matched_tier,
        }
    }
}

/// Pricing inputs of a catalog product
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricedProduct {
    #[serde(with = "rust_decimal::serde::float")]
    pub base_price: Decimal,
    #[serde(default)]
    pub price_tiers: Vec<PriceTier>,
    #[serde(default)]
    pub quantity_available: u32,
}

impl PricedProduct {
    pub fn new(base_price: Decimal, price_tiers: Vec<PriceTier>, quantity_available: u32) -> Self {
        Self {
            base_price,
            price_tiers,
            quantity_available,
        }
    }

    pub fn resolve(&self, quantity: i64) -> Resolution {
        resolve(self.base_price, &self.price_tiers, quantity)
    }

    pub fn quote(&self, quantity: i64) -> Quote {
        Quote::from_resolution(self.resolve(quantity), quantity)
    }

    /// Tiers in the order a buyer sees them.
    pub fn display_tiers(&self) -> Vec<PriceTier> {
        sorted_tiers(&self.price_tiers)
    }
}
