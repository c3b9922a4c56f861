//! Compatibility
//!
//! Two discounts may coexist only when each declares itself compatible with the
//! other's type. Declarations are directional; [`TypeCompatibilityGate`] checks
//! both directions.

use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::discounts::{DiscountId, DiscountInfo, DiscountType};

pub mod error;
pub mod graph;

pub use error::CompatibilityGraphError;
pub use graph::{CompatibilityGraph, CompatibilityGraphBuilder};

/// Read-only access to declared compatibility.
pub trait CompatibilityLookup {
    /// Whether `discount` declares itself compatible with discounts of type `target`.
    ///
    /// Returns `None` when there is no compatibility record for `discount`.
    fn is_declared_compatible(&self, discount: DiscountId, target: DiscountType) -> Option<bool>;
}

impl<F> CompatibilityLookup for F
where
    F: Fn(DiscountId, DiscountType) -> Option<bool>,
{
    fn is_declared_compatible(&self, discount: DiscountId, target: DiscountType) -> Option<bool> {
        self(discount, target)
    }
}

/// How the gate treats a pair whose compatibility cannot be resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum UnknownCompatibility {
    /// Missing information never blocks a discount.
    #[default]
    Permissive,

    /// Missing information counts as a conflict.
    Strict,
}

/// Outcome of a pairwise compatibility check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compatibility {
    /// Both discounts declare the other's type compatible.
    Compatible,

    /// At least one discount does not accept the other's type.
    Incompatible,

    /// One side has no resolvable type information, so the pair is allowed.
    UnknownTreatedAsCompatible,
}

impl Compatibility {
    /// Whether the two discounts may coexist.
    #[must_use]
    pub const fn is_compatible(self) -> bool {
        !matches!(self, Compatibility::Incompatible)
    }
}

/// Existing discounts split by compatibility with a candidate.
///
/// Both halves keep the relative order of the input.
#[derive(Debug, Clone, Default)]
pub struct Partition<'a> {
    /// Discounts that may stay alongside the candidate.
    pub compatible: SmallVec<[&'a DiscountInfo; 8]>,

    /// Discounts that conflict with the candidate.
    pub incompatible: SmallVec<[&'a DiscountInfo; 4]>,
}

/// Bidirectional, type-based compatibility check between concrete discounts.
pub struct TypeCompatibilityGate<'a, C: ?Sized> {
    lookup: &'a C,
    unknown: UnknownCompatibility,
}

impl<C: ?Sized> Clone for TypeCompatibilityGate<'_, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C: ?Sized> Copy for TypeCompatibilityGate<'_, C> {}

impl<C: ?Sized> fmt::Debug for TypeCompatibilityGate<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeCompatibilityGate")
            .field("unknown", &self.unknown)
            .finish_non_exhaustive()
    }
}

impl<'a, C> TypeCompatibilityGate<'a, C>
where
    C: CompatibilityLookup + ?Sized,
{
    /// Create a gate with the permissive policy for missing information.
    #[must_use]
    pub fn new(lookup: &'a C) -> Self {
        Self::with_policy(lookup, UnknownCompatibility::default())
    }

    /// Create a gate with an explicit policy for missing information.
    #[must_use]
    pub fn with_policy(lookup: &'a C, unknown: UnknownCompatibility) -> Self {
        Self { lookup, unknown }
    }

    /// Classify the compatibility of `a` and `b`.
    pub fn evaluate(&self, a: &DiscountInfo, b: &DiscountInfo) -> Compatibility {
        if a.kind().is_unknown() || b.kind().is_unknown() {
            return self.unresolved();
        }

        let forward = self.lookup.is_declared_compatible(a.id(), b.kind());
        let backward = self.lookup.is_declared_compatible(b.id(), a.kind());

        let (Some(forward), Some(backward)) = (forward, backward) else {
            return self.unresolved();
        };

        if forward && backward {
            Compatibility::Compatible
        } else {
            Compatibility::Incompatible
        }
    }

    /// Whether `a` and `b` may be applied together.
    pub fn is_compatible(&self, a: &DiscountInfo, b: &DiscountInfo) -> bool {
        self.evaluate(a, b).is_compatible()
    }

    /// Split `existing` by compatibility with `candidate`, preserving order.
    pub fn partition<'d>(
        &self,
        candidate: &DiscountInfo,
        existing: &'d [DiscountInfo],
    ) -> Partition<'d> {
        let mut partition = Partition::default();

        for discount in existing {
            if self.is_compatible(candidate, discount) {
                partition.compatible.push(discount);
            } else {
                partition.incompatible.push(discount);
            }
        }

        partition
    }

    fn unresolved(&self) -> Compatibility {
        match self.unknown {
            UnknownCompatibility::Permissive => Compatibility::UnknownTreatedAsCompatible,
            UnknownCompatibility::Strict => Compatibility::Incompatible,
        }
    }
}
