//! Resolver errors

use thiserror::Error;

use crate::discounts::DiscountId;

/// Caller bugs detected while resolving a decision.
///
/// Business outcomes such as conflicts are never errors; they are reported on
/// the [`ApplicationDecision`](super::ApplicationDecision).
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ResolveError {
    /// The existing discounts contain the same id more than once.
    #[error("discount {0} appears more than once in the existing discounts")]
    DuplicateExistingDiscount(DiscountId),

    /// The candidate is already among the existing discounts.
    #[error("discount {0} is already applied")]
    CandidateAlreadyApplied(DiscountId),
}
