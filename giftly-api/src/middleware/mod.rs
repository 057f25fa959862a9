pub mod customer;
pub mod rate_limit;

pub use customer::{customer_middleware, CustomerId};
pub use rate_limit::rate_limit_middleware;
