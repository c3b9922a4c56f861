//! Discount Arbiter prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    carts::{CartDiscountsError, CartDiscountsService, CartUuid, InMemoryCartDiscountsService},
    compatibility::{
        Compatibility, CompatibilityGraph, CompatibilityGraphBuilder, CompatibilityGraphError,
        CompatibilityLookup, TypeCompatibilityGate, UnknownCompatibility,
    },
    discounts::{DiscountId, DiscountInfo, DiscountType},
    fixtures::{Fixture, FixtureError},
    lookup::{DiscountCatalog, DiscountInfoLookup},
    priority::{compare, sort_by_priority},
    render::{DecisionReport, RenderError},
    resolver::{
        ApplicationDecision, ApplicationResolver, RejectionReason, ResolveError, ResolverSettings,
    },
};
