//! Priority ordering
//!
//! Discounts are applied in a single total order: coarse type class first,
//! then the user-assigned priority, then creation time (older first).

use std::cmp::Ordering;

use crate::discounts::{DiscountInfo, DiscountType};

/// Type priority given to discount types the engine does not recognise.
pub const UNKNOWN_TYPE_PRIORITY: u16 = 999;

/// Coarse precedence class for a discount type. Lower values apply first.
#[must_use]
pub const fn type_priority(kind: DiscountType) -> u16 {
    match kind {
        DiscountType::ProductLevel => 1,
        DiscountType::CartLevel | DiscountType::OrderLevel => 2,
        DiscountType::FreeShipping => 3,
        DiscountType::FreeGift => 4,
        DiscountType::Unknown => UNKNOWN_TYPE_PRIORITY,
    }
}

/// Compare two discounts by application priority.
///
/// `Ordering::Less` means `a` applies before `b`. `Ordering::Equal` is only
/// returned when type class, priority field and creation instant all match.
#[must_use]
pub fn compare(a: &DiscountInfo, b: &DiscountInfo) -> Ordering {
    type_priority(a.kind())
        .cmp(&type_priority(b.kind()))
        .then_with(|| a.priority().cmp(&b.priority()))
        .then_with(|| a.created_at().cmp(&b.created_at()))
}

/// Stable sort of discounts into application order.
pub fn sort_by_priority(discounts: &mut [DiscountInfo]) {
    discounts.sort_by(compare);
}

/// Whether `discounts` is already in application order.
#[must_use]
pub fn is_sorted_by_priority(discounts: &[DiscountInfo]) -> bool {
    discounts.is_sorted_by(|a, b| compare(a, b).is_le())
}
