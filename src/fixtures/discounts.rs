//! Discount Fixtures

use jiff::Timestamp;
use rustc_hash::FxHashMap;
use serde::Deserialize;

use crate::{
    discounts::{DiscountId, DiscountInfo, DiscountType},
    fixtures::FixtureError,
};

/// Wrapper for discounts in YAML
#[derive(Debug, Deserialize)]
pub struct DiscountsFixture {
    /// Map of discount key -> discount fixture
    pub discounts: FxHashMap<String, DiscountFixture>,
}

/// Discount fixture from YAML
#[derive(Debug, Deserialize)]
pub struct DiscountFixture {
    /// Discount identifier, must be positive
    pub id: u64,

    /// Discount type
    #[serde(rename = "type")]
    pub kind: DiscountType,

    /// User-assigned priority, defaults to 1 when omitted
    pub priority: Option<u32>,

    /// Creation instant, e.g. `"2024-01-01T09:00:00Z"`
    pub created_at: Timestamp,

    /// Types this discount accepts alongside itself.
    ///
    /// Omitting the field leaves the discount without a compatibility record.
    pub compatible_with: Option<Vec<DiscountType>>,
}

impl DiscountFixture {
    /// Validate and convert into [`DiscountInfo`].
    ///
    /// # Errors
    ///
    /// Returns an error if the id or priority is zero.
    pub fn try_into_info(&self, key: &str) -> Result<DiscountInfo, FixtureError> {
        if self.id == 0 {
            return Err(FixtureError::InvalidDiscountId(key.to_string()));
        }

        let mut info = DiscountInfo::new(DiscountId::new(self.id), self.kind, self.created_at);

        if let Some(priority) = self.priority {
            if priority == 0 {
                return Err(FixtureError::InvalidPriority(key.to_string()));
            }

            info = info.with_priority(priority);
        }

        Ok(info)
    }
}
