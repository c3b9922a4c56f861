//! Discounts
//!
//! The read-only projection of a discount that the decision engine works with.

use std::fmt;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Priority assigned to a discount whose record leaves the priority field unset.
pub const DEFAULT_PRIORITY: u32 = 1;

/// Discount identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiscountId(u64);

impl DiscountId {
    /// Wrap a raw discount identifier.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Return the raw identifier.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for DiscountId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for DiscountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// The kind of price adjustment a discount makes.
///
/// Fixed for the lifetime of a discount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscountType {
    /// Adjusts the price of individual products.
    #[serde(alias = "product_level", alias = "product-level")]
    ProductLevel,

    /// Adjusts the cart subtotal.
    #[serde(alias = "cart_level", alias = "cart-level")]
    CartLevel,

    /// Adjusts the order total.
    #[serde(alias = "order_level", alias = "order-level")]
    OrderLevel,

    /// Removes shipping costs.
    #[serde(alias = "free_shipping", alias = "free-shipping")]
    FreeShipping,

    /// Adds a gift item at no cost.
    #[serde(alias = "free_gift", alias = "free-gift")]
    FreeGift,

    /// A type this engine does not recognise.
    ///
    /// Carries no usable type information: it sorts last and its compatibility
    /// cannot be resolved.
    #[serde(other)]
    Unknown,
}

impl DiscountType {
    /// Every recognised discount type.
    pub const ALL: [DiscountType; 5] = [
        DiscountType::ProductLevel,
        DiscountType::CartLevel,
        DiscountType::OrderLevel,
        DiscountType::FreeShipping,
        DiscountType::FreeGift,
    ];

    /// Whether this is the [`DiscountType::Unknown`] placeholder.
    #[must_use]
    pub const fn is_unknown(self) -> bool {
        matches!(self, DiscountType::Unknown)
    }

    /// Canonical name, as used in fixtures and records.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            DiscountType::ProductLevel => "PRODUCT_LEVEL",
            DiscountType::CartLevel => "CART_LEVEL",
            DiscountType::OrderLevel => "ORDER_LEVEL",
            DiscountType::FreeShipping => "FREE_SHIPPING",
            DiscountType::FreeGift => "FREE_GIFT",
            DiscountType::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for DiscountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the decision engine needs to know about a discount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DiscountInfo {
    id: DiscountId,

    #[serde(rename = "type")]
    kind: DiscountType,

    #[serde(default = "default_priority")]
    priority: u32,

    created_at: Timestamp,
}

const fn default_priority() -> u32 {
    DEFAULT_PRIORITY
}

impl DiscountInfo {
    /// Create discount info with the default priority.
    #[must_use]
    pub const fn new(id: DiscountId, kind: DiscountType, created_at: Timestamp) -> Self {
        Self {
            id,
            kind,
            priority: DEFAULT_PRIORITY,
            created_at,
        }
    }

    /// Set the user-assigned priority. Zero means "unset" and falls back to the default.
    #[must_use]
    pub const fn with_priority(mut self, priority: u32) -> Self {
        self.priority = if priority == 0 {
            DEFAULT_PRIORITY
        } else {
            priority
        };

        self
    }

    /// Discount identifier
    #[must_use]
    pub const fn id(&self) -> DiscountId {
        self.id
    }

    /// Discount type
    #[must_use]
    pub const fn kind(&self) -> DiscountType {
        self.kind
    }

    /// User-assigned priority; lower values apply earlier.
    #[must_use]
    pub const fn priority(&self) -> u32 {
        self.priority
    }

    /// Creation instant, only ever used to break ties.
    #[must_use]
    pub const fn created_at(&self) -> Timestamp {
        self.created_at
    }
}
