//! Resolver settings

use serde::{Deserialize, Serialize};

use crate::compatibility::UnknownCompatibility;

/// Tunables for [`ApplicationResolver`](super::ApplicationResolver).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverSettings {
    /// How to treat pairs whose compatibility cannot be resolved.
    #[serde(default)]
    pub unknown_compatibility: UnknownCompatibility,
}
