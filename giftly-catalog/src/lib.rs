pub mod product;
pub mod pricing;
pub mod inventory;
pub mod validation;
pub mod preview;
pub mod taxonomy;

pub use product::{Product, ProductDraft, ProductFilter};
pub use pricing::{resolve, line_total, PriceTier, PricedProduct, Quote, Resolution};
pub use inventory::{clamp_quantity, InventoryError};
pub use validation::{ensure_valid, validate_pricing, TierIssue, ValidationError};
pub use preview::{preview, PricingPreview};
pub use taxonomy::{Category, CategoryDraft, SubCategory, SubCategoryDraft, TaxonomyError};
