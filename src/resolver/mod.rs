//! Application Resolver
//!
//! Decides whether a candidate discount may join a cart's applied discounts,
//! which applied discounts it evicts, and the order the resulting set is
//! applied in.

use std::{cmp::Ordering, fmt};

use rustc_hash::FxHashSet;
use smallvec::SmallVec;
use tracing::{debug, warn};

use crate::{
    compatibility::{CompatibilityLookup, TypeCompatibilityGate},
    discounts::{DiscountId, DiscountInfo},
    lookup::DiscountInfoLookup,
    priority::{compare, sort_by_priority},
};

pub mod decision;
pub mod error;
pub mod settings;

pub use decision::{ApplicationDecision, RejectionReason};
pub use error::ResolveError;
pub use settings::ResolverSettings;

/// Resolves candidate discounts against the discounts already on a cart.
///
/// The resolver holds no state beyond a reference to the compatibility lookup
/// and may be shared freely between callers.
pub struct ApplicationResolver<'a, C: ?Sized> {
    gate: TypeCompatibilityGate<'a, C>,
}

impl<C: ?Sized> Clone for ApplicationResolver<'_, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C: ?Sized> Copy for ApplicationResolver<'_, C> {}

impl<C: ?Sized> fmt::Debug for ApplicationResolver<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApplicationResolver")
            .field("gate", &self.gate)
            .finish()
    }
}

impl<'a, C> ApplicationResolver<'a, C>
where
    C: CompatibilityLookup + ?Sized,
{
    /// Create a resolver with default settings.
    #[must_use]
    pub fn new(compatibility: &'a C) -> Self {
        Self::with_settings(compatibility, ResolverSettings::default())
    }

    /// Create a resolver with explicit settings.
    #[must_use]
    pub fn with_settings(compatibility: &'a C, settings: ResolverSettings) -> Self {
        Self {
            gate: TypeCompatibilityGate::with_policy(compatibility, settings.unknown_compatibility),
        }
    }

    /// The compatibility gate used for conflict detection.
    #[must_use]
    pub fn gate(&self) -> TypeCompatibilityGate<'a, C> {
        self.gate
    }

    /// Decide whether `candidate` may be added to a cart carrying `existing`.
    ///
    /// `existing` must be the cart's applied discounts in application order.
    /// A candidate that cannot be found is rejected with
    /// [`RejectionReason::NotFound`]; existing discounts that cannot be found
    /// are skipped.
    ///
    /// # Errors
    ///
    /// Returns a [`ResolveError`] if `existing` contains duplicates or already
    /// contains `candidate`.
    #[tracing::instrument(
        name = "resolver.resolve",
        level = "debug",
        skip(self, existing, discounts),
        fields(candidate = %candidate, existing = existing.len()),
        err
    )]
    pub fn resolve<L>(
        &self,
        candidate: DiscountId,
        existing: &[DiscountId],
        discounts: &L,
    ) -> Result<ApplicationDecision, ResolveError>
    where
        L: DiscountInfoLookup + ?Sized,
    {
        ensure_distinct(candidate, existing.iter().copied())?;

        let Some(candidate_info) = discounts.get(candidate) else {
            debug!("candidate discount not found");

            return Ok(ApplicationDecision::rejected(
                existing,
                RejectionReason::NotFound,
            ));
        };

        let mut existing_infos: SmallVec<[DiscountInfo; 8]> =
            SmallVec::with_capacity(existing.len());

        for &discount in existing {
            match discounts.get(discount) {
                Some(info) => existing_infos.push(info),
                None => warn!(%discount, "skipping applied discount that no longer exists"),
            }
        }

        Ok(self.decide(&candidate_info, &existing_infos, existing))
    }

    /// Decide using already-resolved discount information.
    ///
    /// # Errors
    ///
    /// Returns a [`ResolveError`] if `existing` contains duplicates or already
    /// contains `candidate`.
    pub fn resolve_info(
        &self,
        candidate: &DiscountInfo,
        existing: &[DiscountInfo],
    ) -> Result<ApplicationDecision, ResolveError> {
        ensure_distinct(candidate.id(), existing.iter().map(DiscountInfo::id))?;

        let supplied: SmallVec<[DiscountId; 8]> = existing.iter().map(DiscountInfo::id).collect();

        Ok(self.decide(candidate, existing, &supplied))
    }

    fn decide(
        &self,
        candidate: &DiscountInfo,
        existing: &[DiscountInfo],
        supplied: &[DiscountId],
    ) -> ApplicationDecision {
        if existing.is_empty() {
            debug!("no applied discounts, accepting candidate");

            return ApplicationDecision::accepted(
                SmallVec::from_elem(candidate.id(), 1),
                SmallVec::new(),
            );
        }

        let partition = self.gate.partition(candidate, existing);

        if partition.incompatible.is_empty() {
            debug!("candidate compatible with every applied discount");

            let mut accepted: SmallVec<[DiscountInfo; 8]> = existing.iter().copied().collect();
            accepted.push(*candidate);

            return ApplicationDecision::accepted(into_sorted_ids(accepted), SmallVec::new());
        }

        // Walk conflicts in the cart's order and stop at the first one the
        // candidate cannot beat.
        let mut removals: SmallVec<[DiscountId; 4]> = SmallVec::new();

        for conflicting in &partition.incompatible {
            match compare(candidate, conflicting) {
                Ordering::Less => removals.push(conflicting.id()),
                Ordering::Greater => {
                    debug!(conflicting = %conflicting.id(), "blocked by higher priority discount");

                    return ApplicationDecision::rejected(
                        supplied,
                        RejectionReason::HigherPriorityConflict {
                            conflicting: conflicting.id(),
                        },
                    );
                }
                Ordering::Equal => {
                    debug!(conflicting = %conflicting.id(), "blocked by equal priority discount");

                    return ApplicationDecision::rejected(
                        supplied,
                        RejectionReason::EqualPriorityConflict {
                            conflicting: conflicting.id(),
                        },
                    );
                }
            }
        }

        debug!(removed = removals.len(), "candidate evicts conflicting discounts");

        let mut accepted: SmallVec<[DiscountInfo; 8]> = existing
            .iter()
            .filter(|discount| !removals.contains(&discount.id()))
            .copied()
            .collect();

        accepted.push(*candidate);

        ApplicationDecision::accepted(into_sorted_ids(accepted), removals)
    }
}

fn into_sorted_ids(mut discounts: SmallVec<[DiscountInfo; 8]>) -> SmallVec<[DiscountId; 8]> {
    sort_by_priority(&mut discounts);

    discounts.iter().map(DiscountInfo::id).collect()
}

fn ensure_distinct(
    candidate: DiscountId,
    existing: impl IntoIterator<Item = DiscountId>,
) -> Result<(), ResolveError> {
    let mut seen = FxHashSet::default();

    for discount in existing {
        if discount == candidate {
            return Err(ResolveError::CandidateAlreadyApplied(discount));
        }

        if !seen.insert(discount) {
            return Err(ResolveError::DuplicateExistingDiscount(discount));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use jiff::{SignedDuration, Timestamp};
    use testresult::TestResult;

    use crate::{
        compatibility::{CompatibilityGraph, CompatibilityGraphBuilder, UnknownCompatibility},
        discounts::DiscountType,
        lookup::DiscountCatalog,
        priority::is_sorted_by_priority,
    };

    use super::*;

    fn info(id: u64, kind: DiscountType, priority: u32, created: i64) -> DiscountInfo {
        DiscountInfo::new(
            DiscountId::new(id),
            kind,
            Timestamp::UNIX_EPOCH + SignedDuration::from_secs(created),
        )
        .with_priority(priority)
    }

    fn ids(raw: &[u64]) -> Vec<DiscountId> {
        raw.iter().copied().map(DiscountId::new).collect()
    }

    /// Every discount accepts every type.
    fn accepts_all(_: DiscountId, _: DiscountType) -> Option<bool> {
        Some(true)
    }

    /// Every discount accepts nothing.
    fn accepts_none(_: DiscountId, _: DiscountType) -> Option<bool> {
        Some(false)
    }

    #[test]
    fn empty_cart_accepts_candidate() -> TestResult {
        let resolver = ApplicationResolver::new(&accepts_none);
        let candidate = info(1, DiscountType::FreeGift, 3, 0);

        let decision = resolver.resolve_info(&candidate, &[])?;

        assert!(decision.can_apply());
        assert_eq!(decision.discounts_to_apply(), ids(&[1]));
        assert!(decision.discounts_to_remove().is_empty());

        Ok(())
    }

    #[test]
    fn compatible_candidate_is_sorted_into_place() -> TestResult {
        let resolver = ApplicationResolver::new(&accepts_all);

        let existing = [
            info(1, DiscountType::ProductLevel, 1, 0),
            info(2, DiscountType::CartLevel, 1, 0),
            info(3, DiscountType::FreeGift, 1, 0),
        ];
        let candidate = info(4, DiscountType::FreeShipping, 1, 10);

        let decision = resolver.resolve_info(&candidate, &existing)?;

        assert!(decision.can_apply());
        assert_eq!(decision.discounts_to_apply(), ids(&[1, 2, 4, 3]));
        assert!(decision.discounts_to_remove().is_empty());

        Ok(())
    }

    #[test]
    fn candidate_evicts_every_lower_priority_conflict() -> TestResult {
        let resolver = ApplicationResolver::new(&accepts_none);

        let existing = [
            info(1, DiscountType::CartLevel, 1, 0),
            info(2, DiscountType::FreeShipping, 1, 0),
        ];
        let candidate = info(3, DiscountType::ProductLevel, 1, 100);

        let decision = resolver.resolve_info(&candidate, &existing)?;

        assert!(decision.can_apply());
        assert_eq!(decision.discounts_to_apply(), ids(&[3]));
        assert_eq!(decision.discounts_to_remove(), ids(&[1, 2]));

        Ok(())
    }

    #[test]
    fn compatible_discounts_survive_eviction() -> TestResult {
        let mut builder = CompatibilityGraphBuilder::new();

        // 1 (cart) and 3 (product) coexist; 2 (shipping) accepts nothing.
        builder
            .declare(DiscountId::new(1), [DiscountType::ProductLevel])?
            .register(DiscountId::new(2))?
            .declare(
                DiscountId::new(3),
                [DiscountType::CartLevel, DiscountType::FreeShipping],
            )?;

        let graph = builder.build();
        let resolver = ApplicationResolver::new(&graph);

        let existing = [
            info(1, DiscountType::CartLevel, 1, 0),
            info(2, DiscountType::FreeShipping, 1, 0),
        ];
        let candidate = info(3, DiscountType::ProductLevel, 1, 5);

        let decision = resolver.resolve_info(&candidate, &existing)?;

        assert!(decision.can_apply());
        assert_eq!(decision.discounts_to_apply(), ids(&[3, 1]));
        assert_eq!(decision.discounts_to_remove(), ids(&[2]));

        Ok(())
    }

    #[test]
    fn higher_priority_conflict_rejects_without_changes() -> TestResult {
        let resolver = ApplicationResolver::new(&accepts_none);

        let existing = [info(1, DiscountType::ProductLevel, 1, 0)];
        let candidate = info(2, DiscountType::OrderLevel, 1, 0);

        let decision = resolver.resolve_info(&candidate, &existing)?;

        assert!(!decision.can_apply());
        assert_eq!(decision.discounts_to_apply(), ids(&[1]));
        assert!(decision.discounts_to_remove().is_empty());
        assert_eq!(
            decision.rejection_reason(),
            Some(RejectionReason::HigherPriorityConflict {
                conflicting: DiscountId::new(1)
            })
        );

        Ok(())
    }

    #[test]
    fn exact_tie_favours_the_applied_discount() -> TestResult {
        let resolver = ApplicationResolver::new(&accepts_none);

        let existing = [info(1, DiscountType::CartLevel, 2, 50)];
        let candidate = info(2, DiscountType::OrderLevel, 2, 50);

        let decision = resolver.resolve_info(&candidate, &existing)?;

        assert!(!decision.can_apply());
        assert_eq!(
            decision.rejection_reason(),
            Some(RejectionReason::EqualPriorityConflict {
                conflicting: DiscountId::new(1)
            })
        );

        Ok(())
    }

    #[test]
    fn first_unbeatable_conflict_stops_the_walk() -> TestResult {
        let resolver = ApplicationResolver::new(&accepts_none);

        // The lower-priority gift comes first, so it is marked for removal
        // before the product-level discount blocks the candidate.
        let existing = [
            info(1, DiscountType::FreeGift, 1, 0),
            info(2, DiscountType::ProductLevel, 1, 0),
        ];
        let candidate = info(3, DiscountType::CartLevel, 1, 0);

        let decision = resolver.resolve_info(&candidate, &existing)?;

        assert!(!decision.can_apply());
        assert_eq!(decision.discounts_to_apply(), ids(&[1, 2]));
        assert!(decision.discounts_to_remove().is_empty());
        assert_eq!(
            decision
                .rejection_reason()
                .and_then(RejectionReason::conflicting),
            Some(DiscountId::new(2))
        );

        Ok(())
    }

    #[test]
    fn missing_candidate_is_rejected_as_not_found() -> TestResult {
        let catalog: DiscountCatalog = [info(1, DiscountType::CartLevel, 1, 0)]
            .into_iter()
            .collect();
        let resolver = ApplicationResolver::new(&accepts_all);

        let existing = ids(&[1, 77]);
        let decision = resolver.resolve(DiscountId::new(2), &existing, &catalog)?;

        assert!(!decision.can_apply());
        assert_eq!(decision.discounts_to_apply(), existing);
        assert_eq!(decision.rejection_reason(), Some(RejectionReason::NotFound));

        Ok(())
    }

    #[test]
    fn missing_existing_discounts_are_skipped() -> TestResult {
        let catalog: DiscountCatalog = [
            info(1, DiscountType::FreeGift, 1, 0),
            info(2, DiscountType::ProductLevel, 1, 0),
        ]
        .into_iter()
        .collect();
        let resolver = ApplicationResolver::new(&accepts_all);

        let decision = resolver.resolve(DiscountId::new(2), &ids(&[1, 404]), &catalog)?;

        assert!(decision.can_apply());
        assert_eq!(decision.discounts_to_apply(), ids(&[2, 1]));
        assert!(!decision.removes(DiscountId::new(404)));

        Ok(())
    }

    #[test]
    fn all_existing_missing_behaves_like_empty_cart() -> TestResult {
        let catalog: DiscountCatalog = [info(5, DiscountType::FreeShipping, 1, 0)]
            .into_iter()
            .collect();
        let resolver = ApplicationResolver::new(&accepts_none);

        let decision = resolver.resolve(DiscountId::new(5), &ids(&[8, 9]), &catalog)?;

        assert!(decision.can_apply());
        assert_eq!(decision.discounts_to_apply(), ids(&[5]));

        Ok(())
    }

    #[test]
    fn duplicate_existing_ids_are_a_caller_error() {
        let catalog = DiscountCatalog::new();
        let resolver = ApplicationResolver::new(&accepts_all);

        let result = resolver.resolve(DiscountId::new(1), &ids(&[2, 3, 2]), &catalog);

        assert_eq!(
            result,
            Err(ResolveError::DuplicateExistingDiscount(DiscountId::new(2)))
        );
    }

    #[test]
    fn candidate_in_existing_is_a_caller_error() {
        let resolver = ApplicationResolver::new(&accepts_all);

        let candidate = info(1, DiscountType::CartLevel, 1, 0);
        let result = resolver.resolve_info(&candidate, &[candidate]);

        assert_eq!(
            result,
            Err(ResolveError::CandidateAlreadyApplied(DiscountId::new(1)))
        );
    }

    #[test]
    fn strict_settings_turn_unknown_pairs_into_conflicts() -> TestResult {
        let graph = CompatibilityGraph::default();
        let settings = ResolverSettings {
            unknown_compatibility: UnknownCompatibility::Strict,
        };

        let permissive = ApplicationResolver::new(&graph);
        let strict = ApplicationResolver::with_settings(&graph, settings);

        let existing = [info(1, DiscountType::ProductLevel, 1, 0)];
        let candidate = info(2, DiscountType::FreeGift, 1, 0);

        assert!(permissive.resolve_info(&candidate, &existing)?.can_apply());
        assert!(!strict.resolve_info(&candidate, &existing)?.can_apply());

        Ok(())
    }

    #[test]
    fn accepted_sets_are_always_in_priority_order() -> TestResult {
        // Even ids accept everything, odd ids accept nothing.
        let lookup = |id: DiscountId, _: DiscountType| Some(id.get() % 2 == 0);
        let resolver = ApplicationResolver::new(&lookup);

        let existing = [
            info(2, DiscountType::ProductLevel, 3, 0),
            info(4, DiscountType::CartLevel, 1, 0),
            info(6, DiscountType::FreeShipping, 1, 0),
        ];

        let mut id = 10;

        for kind in DiscountType::ALL {
            for priority in 1..=3 {
                id += 1;

                let candidate = info(id, kind, priority, 1);
                let decision = resolver.resolve_info(&candidate, &existing)?;

                if !decision.can_apply() {
                    continue;
                }

                let catalog: DiscountCatalog =
                    existing.iter().copied().chain([candidate]).collect();

                let applied: Vec<DiscountInfo> = decision
                    .discounts_to_apply()
                    .iter()
                    .filter_map(|&discount| catalog.get(discount))
                    .collect();

                assert_eq!(applied.len(), decision.discounts_to_apply().len());
                assert!(
                    is_sorted_by_priority(&applied),
                    "{kind} priority {priority} produced an unsorted set"
                );
                assert!(!decision.removes(candidate.id()));
            }
        }

        Ok(())
    }
}
