/// Lowest quantity an order line may carry
pub const MIN_ORDER_QUANTITY: i64 = 1;

/// Clamp a requested quantity into `1..=available`.
///
/// Stock is a ceiling enforced here, before pricing, never by the resolver.
pub fn clamp_quantity(requested: i64, available: u32) -> Result<u32, InventoryError> {
    if available == 0 {
        return Err(InventoryError::OutOfStock);
    }

    let clamped = clamp_to_minimum(requested).min(i64::from(available));
    // Bounded by `available` above
    Ok(clamped as u32)
}

/// Clamp only the lower bound. Used where stock does not matter (price lookups).
pub fn clamp_to_minimum(requested: i64) -> i64 {
    requested.max(MIN_ORDER_QUANTITY)
}

/// Whether `quantity` can be fulfilled from `available` without clamping
pub fn is_within_stock(quantity: i64, available: u32) -> bool {
    quantity >= MIN_ORDER_QUANTITY && quantity <= i64::from(available)
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum InventoryError {
    #[error("Product is out of stock")]
    OutOfStock,
}
