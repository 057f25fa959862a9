use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Product not found: {0}")]
    NotFound(Uuid),

    #[error("Unexpected status {0} from price endpoint")]
    Status(u16),

    #[error("Price feed has shut down")]
    Closed,
}
