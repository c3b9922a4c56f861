//! Cart discounts service.

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use mockall::automock;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tokio::sync::{Mutex, RwLock};
use tracing::{Span, info};

use crate::{
    carts::{errors::CartDiscountsError, models::CartUuid},
    compatibility::CompatibilityLookup,
    discounts::DiscountId,
    lookup::DiscountInfoLookup,
    resolver::{ApplicationDecision, ApplicationResolver, ResolverSettings},
};

type AppliedDiscounts = SmallVec<[DiscountId; 8]>;

/// Cart discounts held in memory, one lock per cart.
pub struct InMemoryCartDiscountsService<D, C> {
    discounts: Arc<D>,
    compatibility: Arc<C>,
    settings: ResolverSettings,
    carts: RwLock<FxHashMap<CartUuid, Arc<Mutex<AppliedDiscounts>>>>,
}

impl<D, C> fmt::Debug for InMemoryCartDiscountsService<D, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryCartDiscountsService")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl<D, C> InMemoryCartDiscountsService<D, C> {
    /// Create a service over the given discount and compatibility lookups.
    #[must_use]
    pub fn new(discounts: Arc<D>, compatibility: Arc<C>) -> Self {
        Self {
            discounts,
            compatibility,
            settings: ResolverSettings::default(),
            carts: RwLock::new(FxHashMap::default()),
        }
    }

    /// Use explicit resolver settings.
    #[must_use]
    pub fn with_settings(mut self, settings: ResolverSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Create a cart that already carries `discounts`, in application order.
    ///
    /// The discounts are stored as given; ids that no longer resolve are
    /// dropped the next time a discount is accepted.
    ///
    /// # Errors
    ///
    /// Returns [`CartDiscountsError::AlreadyExists`] if the cart exists.
    pub async fn create_cart_with(
        &self,
        cart: CartUuid,
        discounts: impl IntoIterator<Item = DiscountId> + Send,
    ) -> Result<(), CartDiscountsError> {
        let mut carts = self.carts.write().await;

        if carts.contains_key(&cart) {
            return Err(CartDiscountsError::AlreadyExists(cart));
        }

        carts.insert(cart, Arc::new(Mutex::new(discounts.into_iter().collect())));

        Ok(())
    }

    async fn cart(
        &self,
        cart: CartUuid,
    ) -> Result<Arc<Mutex<AppliedDiscounts>>, CartDiscountsError> {
        self.carts
            .read()
            .await
            .get(&cart)
            .cloned()
            .ok_or(CartDiscountsError::NotFound(cart))
    }
}

#[async_trait]
impl<D, C> CartDiscountsService for InMemoryCartDiscountsService<D, C>
where
    D: DiscountInfoLookup + Send + Sync,
    C: CompatibilityLookup + Send + Sync,
{
    async fn create_cart(&self, cart: CartUuid) -> Result<(), CartDiscountsError> {
        self.create_cart_with(cart, []).await
    }

    async fn applied_discounts(
        &self,
        cart: CartUuid,
    ) -> Result<Vec<DiscountId>, CartDiscountsError> {
        let cart = self.cart(cart).await?;
        let applied = cart.lock().await;

        Ok(applied.to_vec())
    }

    #[tracing::instrument(
        name = "cart_discounts.service.add_discount",
        skip(self),
        fields(
            cart_uuid = %cart,
            discount_id = %discount,
            can_apply = tracing::field::Empty,
            removed_count = tracing::field::Empty
        ),
        err
    )]
    async fn add_discount(
        &self,
        cart: CartUuid,
        discount: DiscountId,
    ) -> Result<ApplicationDecision, CartDiscountsError> {
        let cart_lock = self.cart(cart).await?;

        // The lock is held across the whole read-resolve-write cycle.
        let mut applied = cart_lock.lock().await;

        if applied.contains(&discount) {
            return Err(CartDiscountsError::AlreadyApplied(discount));
        }

        let resolver = ApplicationResolver::with_settings(&*self.compatibility, self.settings);
        let decision = resolver.resolve(discount, &applied, &*self.discounts)?;

        let span = Span::current();

        span.record("can_apply", tracing::field::display(decision.can_apply()));

        if decision.can_apply() {
            span.record(
                "removed_count",
                tracing::field::display(decision.discounts_to_remove().len()),
            );

            *applied = SmallVec::from_slice(decision.discounts_to_apply());

            info!(cart_uuid = %cart, discount_id = %discount, "applied discount");
        } else {
            info!(
                cart_uuid = %cart,
                discount_id = %discount,
                reason = ?decision.rejection_reason(),
                "rejected discount"
            );
        }

        Ok(decision)
    }

    #[tracing::instrument(
        name = "cart_discounts.service.remove_discount",
        skip(self),
        fields(cart_uuid = %cart, discount_id = %discount),
        err
    )]
    async fn remove_discount(
        &self,
        cart: CartUuid,
        discount: DiscountId,
    ) -> Result<bool, CartDiscountsError> {
        let cart_lock = self.cart(cart).await?;
        let mut applied = cart_lock.lock().await;

        let Some(position) = applied.iter().position(|&applied| applied == discount) else {
            return Ok(false);
        };

        // Dropping one discount keeps the rest sorted and compatible.
        applied.remove(position);

        info!(cart_uuid = %cart, discount_id = %discount, "removed discount");

        Ok(true)
    }
}

#[automock]
#[async_trait]
pub trait CartDiscountsService: Send + Sync {
    /// Create an empty cart.
    async fn create_cart(&self, cart: CartUuid) -> Result<(), CartDiscountsError>;

    /// Discounts applied to a cart, in application order.
    async fn applied_discounts(
        &self,
        cart: CartUuid,
    ) -> Result<Vec<DiscountId>, CartDiscountsError>;

    /// Resolve `discount` against the cart and apply the decision atomically.
    ///
    /// Rejections are returned as a decision and leave the cart untouched.
    async fn add_discount(
        &self,
        cart: CartUuid,
        discount: DiscountId,
    ) -> Result<ApplicationDecision, CartDiscountsError>;

    /// Detach a discount from a cart; returns whether it was applied.
    async fn remove_discount(
        &self,
        cart: CartUuid,
        discount: DiscountId,
    ) -> Result<bool, CartDiscountsError>;
}
