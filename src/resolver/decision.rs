//! Application decisions

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::discounts::DiscountId;

/// Why a candidate discount could not be applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum RejectionReason {
    /// The candidate discount does not exist.
    NotFound,

    /// An applied discount that conflicts with the candidate takes precedence.
    HigherPriorityConflict {
        /// The applied discount that blocked the candidate.
        conflicting: DiscountId,
    },

    /// A conflicting applied discount has exactly the same precedence; the
    /// applied discount keeps its place.
    EqualPriorityConflict {
        /// The applied discount that blocked the candidate.
        conflicting: DiscountId,
    },
}

impl RejectionReason {
    /// The applied discount that caused the rejection, if any.
    #[must_use]
    pub const fn conflicting(self) -> Option<DiscountId> {
        match self {
            RejectionReason::NotFound => None,
            RejectionReason::HigherPriorityConflict { conflicting }
            | RejectionReason::EqualPriorityConflict { conflicting } => Some(conflicting),
        }
    }
}

/// The complete outcome of evaluating one candidate against a cart.
///
/// When the candidate is accepted, [`discounts_to_apply`](Self::discounts_to_apply)
/// is the full new set in application order. When rejected, it is the cart's
/// existing set exactly as supplied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationDecision {
    can_apply: bool,
    discounts_to_apply: SmallVec<[DiscountId; 8]>,
    discounts_to_remove: SmallVec<[DiscountId; 4]>,
    rejection_reason: Option<RejectionReason>,
}

impl ApplicationDecision {
    pub(crate) fn accepted(
        discounts_to_apply: SmallVec<[DiscountId; 8]>,
        discounts_to_remove: SmallVec<[DiscountId; 4]>,
    ) -> Self {
        Self {
            can_apply: true,
            discounts_to_apply,
            discounts_to_remove,
            rejection_reason: None,
        }
    }

    pub(crate) fn rejected(existing: &[DiscountId], reason: RejectionReason) -> Self {
        Self {
            can_apply: false,
            discounts_to_apply: SmallVec::from_slice(existing),
            discounts_to_remove: SmallVec::new(),
            rejection_reason: Some(reason),
        }
    }

    /// Whether the candidate may be applied.
    #[must_use]
    pub const fn can_apply(&self) -> bool {
        self.can_apply
    }

    /// Discounts the cart should carry, in application order.
    #[must_use]
    pub fn discounts_to_apply(&self) -> &[DiscountId] {
        &self.discounts_to_apply
    }

    /// Applied discounts evicted by the candidate, in the order they were encountered.
    #[must_use]
    pub fn discounts_to_remove(&self) -> &[DiscountId] {
        &self.discounts_to_remove
    }

    /// Whether `discount` is evicted by this decision.
    #[must_use]
    pub fn removes(&self, discount: DiscountId) -> bool {
        self.discounts_to_remove.contains(&discount)
    }

    /// Why the candidate was rejected; `None` when it was accepted.
    #[must_use]
    pub const fn rejection_reason(&self) -> Option<RejectionReason> {
        self.rejection_reason
    }
}

#[cfg(test)]
mod tests {
    use smallvec::smallvec;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn rejected_decision_keeps_existing_set() {
        let existing = [DiscountId::new(3), DiscountId::new(1)];
        let decision = ApplicationDecision::rejected(
            &existing,
            RejectionReason::EqualPriorityConflict {
                conflicting: DiscountId::new(3),
            },
        );

        assert!(!decision.can_apply());
        assert_eq!(decision.discounts_to_apply(), existing);
        assert!(decision.discounts_to_remove().is_empty());
        assert_eq!(
            decision.rejection_reason().and_then(RejectionReason::conflicting),
            Some(DiscountId::new(3))
        );
    }

    #[test]
    fn accepted_decision_reports_removals() {
        let decision = ApplicationDecision::accepted(
            smallvec![DiscountId::new(2)],
            smallvec![DiscountId::new(9)],
        );

        assert!(decision.can_apply());
        assert!(decision.removes(DiscountId::new(9)));
        assert!(!decision.removes(DiscountId::new(2)));
        assert_eq!(decision.rejection_reason(), None);
    }

    #[test]
    fn rejection_reason_serializes_with_tag() -> TestResult {
        let yaml = serde_norway::to_string(&RejectionReason::HigherPriorityConflict {
            conflicting: DiscountId::new(4),
        })?;

        assert_eq!(yaml, "reason: higher_priority_conflict\nconflicting: 4\n");

        Ok(())
    }
}
