//! Cart discounts service errors.

use thiserror::Error;

use crate::{carts::models::CartUuid, discounts::DiscountId, resolver::ResolveError};

/// Errors raised while changing a cart's discounts.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartDiscountsError {
    /// The cart does not exist.
    #[error("cart {0} not found")]
    NotFound(CartUuid),

    /// A cart with this id already exists.
    #[error("cart {0} already exists")]
    AlreadyExists(CartUuid),

    /// The discount is already applied to the cart.
    #[error("discount {0} is already applied")]
    AlreadyApplied(DiscountId),

    /// The resolver rejected its inputs.
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}
