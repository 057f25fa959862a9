pub mod cart;
pub mod proposal;
pub mod repository;

pub use cart::{Cart, CartItem};
pub use proposal::{PriceSource, Proposal, ProposalItem, ProposalStatus};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Storage error: {0}")]
    StorageError(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
