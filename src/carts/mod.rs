//! Carts
//!
//! The transactional shell around the resolver: applying a decision to a
//! cart's discounts is a read-modify-write that runs under a per-cart lock.

pub mod errors;
pub mod models;
pub mod service;

pub use errors::CartDiscountsError;
pub use models::CartUuid;
pub use service::*;
