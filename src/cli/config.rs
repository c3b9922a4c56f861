//! Command line configuration

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use discount_arbiter::compatibility::UnknownCompatibility;

/// Discount Arbiter configuration
#[derive(Debug, Parser)]
#[command(
    name = "discount-arbiter",
    about = "Decide which discounts may be applied together on a cart",
    long_about = None
)]
pub(crate) struct Cli {
    #[command(flatten)]
    pub logging: LoggingConfig,

    #[command(flatten)]
    pub fixtures: FixtureConfig,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Commands {
    /// Resolve one discount against a cart from the fixture set
    Resolve(ResolveArgs),

    /// Add discounts to a cart one at a time, applying each decision
    Apply(ApplyArgs),
}

#[derive(Debug, Args)]
pub(crate) struct ResolveArgs {
    /// Key of the candidate discount
    #[arg(short, long)]
    pub discount: String,

    /// Name of the cart
    #[arg(short, long)]
    pub cart: String,
}

#[derive(Debug, Args)]
pub(crate) struct ApplyArgs {
    /// Keys of the discounts to add, in request order
    #[arg(required = true)]
    pub discounts: Vec<String>,

    /// Start from this cart instead of an empty one
    #[arg(short, long)]
    pub cart: Option<String>,
}

/// Where fixtures are read from and how they are resolved.
#[derive(Debug, Args)]
pub(crate) struct FixtureConfig {
    /// Directory holding `discounts/`, `carts/` and `settings/`
    #[arg(long, global = true, env = "DISCOUNT_FIXTURES_DIR", default_value = "./fixtures")]
    pub fixtures_dir: PathBuf,

    /// Fixture set name
    #[arg(
        short,
        long,
        global = true,
        env = "DISCOUNT_FIXTURE_SET",
        default_value = "scenarios"
    )]
    pub set: String,

    /// Override how pairs with unresolvable compatibility are treated
    #[arg(long, global = true, env = "UNKNOWN_COMPATIBILITY", value_enum)]
    pub unknown_compatibility: Option<UnknownCompatibility>,
}

/// Log output format.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    /// Compact, human-readable logs.
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Logging settings.
#[derive(Debug, Args)]
pub(crate) struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true, env = "RUST_LOG", default_value = "warn")]
    pub log_level: String,

    /// Log format (compact, json)
    #[arg(
        long,
        global = true,
        env = "LOG_FORMAT",
        value_enum,
        default_value_t = LogFormat::Compact
    )]
    pub log_format: LogFormat,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_resolve_with_overrides() -> TestResult {
        let cli = Cli::try_parse_from([
            "discount-arbiter",
            "resolve",
            "--discount",
            "ten-off",
            "--cart",
            "basic",
            "--unknown-compatibility",
            "strict",
            "--set",
            "other",
        ])?;

        assert_eq!(cli.fixtures.set, "other");
        assert_eq!(
            cli.fixtures.unknown_compatibility,
            Some(UnknownCompatibility::Strict)
        );
        assert!(matches!(
            cli.command,
            Commands::Resolve(ResolveArgs { ref discount, ref cart })
                if discount == "ten-off" && cart == "basic"
        ));

        Ok(())
    }

    #[test]
    fn apply_requires_discounts() {
        assert!(Cli::try_parse_from(["discount-arbiter", "apply"]).is_err());
    }
}
