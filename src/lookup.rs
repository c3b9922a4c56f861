//! Discount lookups

use rustc_hash::FxHashMap;

use crate::discounts::{DiscountId, DiscountInfo};

/// Read-only access to discount information.
pub trait DiscountInfoLookup {
    /// Fetch the information for `discount`, or `None` if it does not exist.
    fn get(&self, discount: DiscountId) -> Option<DiscountInfo>;
}

impl<F> DiscountInfoLookup for F
where
    F: Fn(DiscountId) -> Option<DiscountInfo>,
{
    fn get(&self, discount: DiscountId) -> Option<DiscountInfo> {
        self(discount)
    }
}

/// In-memory catalog of discount information keyed by id.
#[derive(Debug, Clone, Default)]
pub struct DiscountCatalog {
    discounts: FxHashMap<DiscountId, DiscountInfo>,
}

impl DiscountCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a discount, returning the previous entry for the same id.
    pub fn insert(&mut self, info: DiscountInfo) -> Option<DiscountInfo> {
        self.discounts.insert(info.id(), info)
    }

    /// Number of discounts in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.discounts.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.discounts.is_empty()
    }

    /// Iterate over every discount, in no particular order.
    pub fn discounts(&self) -> impl Iterator<Item = &DiscountInfo> {
        self.discounts.values()
    }
}

impl DiscountInfoLookup for DiscountCatalog {
    fn get(&self, discount: DiscountId) -> Option<DiscountInfo> {
        self.discounts.get(&discount).copied()
    }
}

impl FromIterator<DiscountInfo> for DiscountCatalog {
    fn from_iter<T: IntoIterator<Item = DiscountInfo>>(iter: T) -> Self {
        Self {
            discounts: iter.into_iter().map(|info| (info.id(), info)).collect(),
        }
    }
}
