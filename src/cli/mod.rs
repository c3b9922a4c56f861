//! Command line interface

use std::{io, sync::Arc};

use discount_arbiter::{
    carts::{CartDiscountsError, CartDiscountsService, CartUuid, InMemoryCartDiscountsService},
    fixtures::{Fixture, FixtureError},
    render::{DecisionReport, RenderError},
};
use thiserror::Error;
use tracing::{debug, info};

mod config;
mod logging;

pub(crate) use config::Cli;

use config::{ApplyArgs, Commands, ResolveArgs};

/// Errors surfaced by the command line.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    /// Failed to initialise the tracing subscriber.
    #[error("failed to initialise logging: {0}")]
    Logging(#[from] tracing_subscriber::util::TryInitError),

    /// Failed to load or query the fixture set.
    #[error(transparent)]
    Fixture(#[from] FixtureError),

    /// The cart service refused a change.
    #[error(transparent)]
    Cart(#[from] CartDiscountsError),

    /// Failed to write output.
    #[error(transparent)]
    Render(#[from] RenderError),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), CliError> {
        logging::init_subscriber(&self.logging)?;

        let mut fixture = Fixture::with_base_path(self.fixtures.fixtures_dir.as_path());

        fixture.load_set(&self.fixtures.set)?;

        if let Some(unknown_compatibility) = self.fixtures.unknown_compatibility {
            let mut settings = fixture.settings();

            settings.unknown_compatibility = unknown_compatibility;
            fixture.set_settings(settings);
        }

        debug!(
            set = %self.fixtures.set,
            discounts = fixture.catalog().len(),
            settings = ?fixture.settings(),
            "loaded fixture set"
        );

        match self.command {
            Commands::Resolve(args) => resolve(&fixture, &args),
            Commands::Apply(args) => apply(&fixture, &args).await,
        }
    }
}

fn resolve(fixture: &Fixture, args: &ResolveArgs) -> Result<(), CliError> {
    let candidate = fixture.discount_id(&args.discount)?;
    let existing = fixture.cart(&args.cart)?;
    let decision = fixture.resolve(&args.discount, &args.cart)?;

    DecisionReport::new(candidate, existing, &decision, fixture.catalog())
        .with_names(|discount| fixture.discount_name(discount))
        .write_to(io::stdout().lock())?;

    Ok(())
}

async fn apply(fixture: &Fixture, args: &ApplyArgs) -> Result<(), CliError> {
    let service = InMemoryCartDiscountsService::new(
        Arc::new(fixture.catalog().clone()),
        Arc::new(fixture.compatibility().clone()),
    )
    .with_settings(fixture.settings());

    let starting: &[_] = match &args.cart {
        Some(name) => fixture.cart(name)?,
        None => &[],
    };

    let cart = CartUuid::new();

    service
        .create_cart_with(cart, starting.iter().copied())
        .await?;

    info!(cart_uuid = %cart, "created cart");

    for key in &args.discounts {
        let candidate = fixture.discount_id(key)?;
        let existing = service.applied_discounts(cart).await?;

        let decision = match service.add_discount(cart, candidate).await {
            Ok(decision) => decision,
            Err(CartDiscountsError::AlreadyApplied(discount)) => {
                info!(%discount, "discount already applied, skipping");
                continue;
            }
            Err(error) => return Err(error.into()),
        };

        DecisionReport::new(candidate, &existing, &decision, fixture.catalog())
            .with_names(|discount| fixture.discount_name(discount))
            .write_to(io::stdout().lock())?;
    }

    Ok(())
}
