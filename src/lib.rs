//! Discount Arbiter
//!
//! Decides whether a discount may be added to a cart that already carries
//! other discounts: which discounts it is compatible with, which ones it
//! evicts, and the order the resulting set is applied in.
//!
//! The [`resolver`] is a pure decision engine over two read-only lookups
//! (discount information and declared compatibility). [`carts`] wraps it in a
//! service that commits decisions atomically per cart.

pub mod carts;
pub mod compatibility;
pub mod discounts;
pub mod fixtures;
pub mod lookup;
pub mod prelude;
pub mod priority;
pub mod render;
pub mod resolver;
