//! Compatibility graph errors

use thiserror::Error;

use crate::discounts::DiscountId;

/// Errors that can occur when building a compatibility graph.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CompatibilityGraphError {
    /// A discount's compatibility was declared more than once.
    #[error("compatibility for discount {0} is already declared")]
    AlreadyDeclared(DiscountId),
}
