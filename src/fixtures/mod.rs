//! Fixtures
//!
//! YAML descriptions of discounts, their declared compatibility and carts,
//! loaded from `fixtures/discounts/`, `fixtures/carts/` and
//! `fixtures/settings/`.

use std::{fs, path::PathBuf};

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use thiserror::Error;

use crate::{
    compatibility::{CompatibilityGraph, CompatibilityGraphBuilder, CompatibilityGraphError},
    discounts::DiscountId,
    fixtures::{
        carts::{CartEntryFixture, CartsFixture},
        discounts::DiscountsFixture,
    },
    lookup::DiscountCatalog,
    resolver::{ApplicationDecision, ApplicationResolver, ResolveError, ResolverSettings},
};

pub mod carts;
pub mod discounts;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Discount id is not a positive integer
    #[error("Invalid discount id for: {0}")]
    InvalidDiscountId(String),

    /// Discount priority is not a positive integer
    #[error("Invalid priority for: {0}")]
    InvalidPriority(String),

    /// Two discount keys share an id
    #[error("Duplicate discount id: {0}")]
    DuplicateDiscountId(DiscountId),

    /// Discount not found
    #[error("Discount not found: {0}")]
    DiscountNotFound(String),

    /// Cart not found
    #[error("Cart not found: {0}")]
    CartNotFound(String),

    /// Compatibility declarations could not be assembled
    #[error(transparent)]
    Compatibility(#[from] CompatibilityGraphError),

    /// The resolver refused its inputs
    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

/// Fixture
#[derive(Debug)]
pub struct Fixture {
    /// Base path for fixture files
    base_path: PathBuf,

    /// Discount information keyed by id
    catalog: DiscountCatalog,

    /// Compatibility declarations collected so far, and the graph built from them
    declarations: CompatibilityGraphBuilder,
    compatibility: CompatibilityGraph,

    /// String key <-> id mappings
    discount_keys: FxHashMap<String, DiscountId>,
    discount_names: FxHashMap<DiscountId, String>,

    /// Carts, each holding discount ids in application order
    carts: FxHashMap<String, SmallVec<[DiscountId; 8]>>,

    /// Resolver settings for the set
    settings: ResolverSettings,
}

impl Fixture {
    /// Create a new empty fixture with default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            catalog: DiscountCatalog::new(),
            declarations: CompatibilityGraphBuilder::new(),
            compatibility: CompatibilityGraph::default(),
            discount_keys: FxHashMap::default(),
            discount_names: FxHashMap::default(),
            carts: FxHashMap::default(),
            settings: ResolverSettings::default(),
        }
    }

    /// Load discounts and their compatibility declarations from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, if a discount is
    /// invalid, or if an id or compatibility declaration is repeated.
    pub fn load_discounts(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("discounts").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: DiscountsFixture = serde_norway::from_str(&contents)?;

        for (key, discount_fixture) in fixture.discounts {
            let info = discount_fixture.try_into_info(&key)?;

            if self.catalog.insert(info).is_some() {
                return Err(FixtureError::DuplicateDiscountId(info.id()));
            }

            if let Some(compatible_with) = discount_fixture.compatible_with {
                self.declarations.declare(info.id(), compatible_with)?;
            }

            self.discount_names.insert(info.id(), key.clone());
            self.discount_keys.insert(key, info.id());
        }

        self.compatibility = self.declarations.clone().build();

        Ok(self)
    }

    /// Load carts from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if a cart
    /// references a discount key that has not been loaded.
    pub fn load_carts(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("carts").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: CartsFixture = serde_norway::from_str(&contents)?;

        for (cart, entries) in fixture.carts {
            let discounts = entries
                .into_iter()
                .map(|entry| match entry {
                    CartEntryFixture::Id(id) => Ok(DiscountId::new(id)),
                    CartEntryFixture::Key(key) => self.discount_id(&key),
                })
                .collect::<Result<SmallVec<[DiscountId; 8]>, FixtureError>>()?;

            self.carts.insert(cart, discounts);
        }

        Ok(self)
    }

    /// Load resolver settings from a YAML fixture file, if one exists
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_settings(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("settings").join(format!("{name}.yml"));

        if file_path.exists() {
            let contents = fs::read_to_string(&file_path)?;

            self.settings = serde_norway::from_str(&contents)?;
        }

        Ok(self)
    }

    /// Load a complete fixture set (discounts, carts and settings with the same name)
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        let mut fixture = Self::new();

        fixture.load_set(name)?;

        Ok(fixture)
    }

    /// Load a complete fixture set into this fixture
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn load_set(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        self.load_discounts(name)?
            .load_carts(name)?
            .load_settings(name)
    }

    /// Get a discount id by its string key
    ///
    /// # Errors
    ///
    /// Returns an error if the discount is not found.
    pub fn discount_id(&self, key: &str) -> Result<DiscountId, FixtureError> {
        self.discount_keys
            .get(key)
            .copied()
            .ok_or_else(|| FixtureError::DiscountNotFound(key.to_string()))
    }

    /// Get the string key a discount was loaded under
    pub fn discount_name(&self, discount: DiscountId) -> Option<&str> {
        self.discount_names.get(&discount).map(String::as_str)
    }

    /// Get a cart's discounts by name, in application order
    ///
    /// # Errors
    ///
    /// Returns an error if the cart is not found.
    pub fn cart(&self, name: &str) -> Result<&[DiscountId], FixtureError> {
        self.carts
            .get(name)
            .map(SmallVec::as_slice)
            .ok_or_else(|| FixtureError::CartNotFound(name.to_string()))
    }

    /// Get the discount catalog
    pub fn catalog(&self) -> &DiscountCatalog {
        &self.catalog
    }

    /// Get the compatibility graph
    pub fn compatibility(&self) -> &CompatibilityGraph {
        &self.compatibility
    }

    /// Get the resolver settings
    pub fn settings(&self) -> ResolverSettings {
        self.settings
    }

    /// Override the resolver settings
    pub fn set_settings(&mut self, settings: ResolverSettings) {
        self.settings = settings;
    }

    /// Create a resolver over this fixture's compatibility graph
    pub fn resolver(&self) -> ApplicationResolver<'_, CompatibilityGraph> {
        ApplicationResolver::with_settings(&self.compatibility, self.settings)
    }

    /// Resolve a discount (by key) against a named cart
    ///
    /// # Errors
    ///
    /// Returns an error if the discount key or cart is unknown, or if the
    /// resolver rejects its inputs.
    pub fn resolve(&self, discount: &str, cart: &str) -> Result<ApplicationDecision, FixtureError> {
        let candidate = self.discount_id(discount)?;
        let existing = self.cart(cart)?;

        Ok(self.resolver().resolve(candidate, existing, &self.catalog)?)
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}
