//! Cart Fixtures

use rustc_hash::FxHashMap;
use serde::Deserialize;

/// Wrapper for carts in YAML
#[derive(Debug, Deserialize)]
pub struct CartsFixture {
    /// Map of cart name -> applied discounts, in application order
    pub carts: FxHashMap<String, Vec<CartEntryFixture>>,
}

/// A discount applied to a fixture cart.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum CartEntryFixture {
    /// Raw discount id, which need not exist in the discounts fixture
    Id(u64),

    /// Key of a discount in the discounts fixture
    Key(String),
}
