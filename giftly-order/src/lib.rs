pub mod models;
pub mod cart;
pub mod proposal;
pub mod favorites;

pub use models::{LikeStatus, LikedProducts, ProposalDetails, ProposalDraft, ProposalLineRequest};
pub use cart::{CartError, CartService};
pub use proposal::{ProposalError, ProposalService, ProposalSettings};
pub use favorites::{FavoriteError, FavoriteService};
