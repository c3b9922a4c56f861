//! Integration tests for the in-memory cart discounts service over the
//! `scenarios` fixture set.

use std::sync::Arc;

use testresult::TestResult;

use discount_arbiter::{
    carts::{CartDiscountsService, CartUuid, InMemoryCartDiscountsService},
    compatibility::CompatibilityGraph,
    discounts::DiscountId,
    fixtures::Fixture,
    lookup::DiscountCatalog,
    resolver::RejectionReason,
};

fn service(
    fixture: &Fixture,
) -> Arc<InMemoryCartDiscountsService<DiscountCatalog, CompatibilityGraph>> {
    Arc::new(
        InMemoryCartDiscountsService::new(
            Arc::new(fixture.catalog().clone()),
            Arc::new(fixture.compatibility().clone()),
        )
        .with_settings(fixture.settings()),
    )
}

#[tokio::test]
async fn sequence_of_requests_builds_a_compatible_cart() -> TestResult {
    let fixture = Fixture::from_set("scenarios")?;
    let service = service(&fixture);
    let cart = CartUuid::new();

    service.create_cart(cart).await?;

    for key in ["shipping", "cart-five", "product-ten"] {
        service
            .add_discount(cart, fixture.discount_id(key)?)
            .await?;
    }

    // cart-five conflicts with shipping and is the stronger of the two, so
    // shipping is evicted; product-ten coexists with cart-five.
    assert_eq!(
        service.applied_discounts(cart).await?,
        [DiscountId::new(1), DiscountId::new(2)]
    );

    let decision = service
        .add_discount(cart, fixture.discount_id("free-gift")?)
        .await?;

    assert_eq!(
        decision.rejection_reason(),
        Some(RejectionReason::HigherPriorityConflict {
            conflicting: DiscountId::new(1)
        })
    );
    assert_eq!(
        service.applied_discounts(cart).await?,
        [DiscountId::new(1), DiscountId::new(2)]
    );

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_requests_on_many_carts() -> TestResult {
    let fixture = Fixture::from_set("scenarios")?;
    let service = service(&fixture);
    let cart_five = fixture.discount_id("cart-five")?;
    let cart_late = fixture.discount_id("cart-late")?;

    let mut carts = Vec::new();
    let mut tasks = Vec::new();

    for _ in 0..16 {
        let cart = CartUuid::new();

        service.create_cart(cart).await?;
        carts.push(cart);

        for discount in [cart_late, cart_five] {
            let service = Arc::clone(&service);

            tasks.push(tokio::spawn(async move {
                service.add_discount(cart, discount).await
            }));
        }
    }

    for task in tasks {
        task.await??;
    }

    for cart in carts {
        assert_eq!(service.applied_discounts(cart).await?, [cart_five]);
    }

    Ok(())
}
