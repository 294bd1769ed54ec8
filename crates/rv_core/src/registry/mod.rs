//! Batter registry: every batter's accumulated profile, with persistence.
//!
//! The registry is exclusively owned by the season orchestrator during a
//! pass: loaded (or created empty) at pass start, mutated only by the pass,
//! persisted once at pass end. Loading a prior season's registry is the
//! warm-start mode; starting empty is the cold-start mode. Both are
//! supported — the choice is the caller's, made explicit by whether a prior
//! path is given.

pub mod error;
pub mod format;

pub use error::RegistryError;
pub use format::{load_registry, save_registry};

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::heatmap::BatterProfile;

/// Current registry file format version.
pub const REGISTRY_VERSION: u32 = 1;

/// batter id -> accumulated profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatterRegistry {
    /// Registry format version for forward-compatibility checks on load.
    pub version: u32,
    pub batters: FxHashMap<u32, BatterProfile>,
}

impl Default for BatterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl BatterRegistry {
    pub fn new() -> Self {
        Self {
            version: REGISTRY_VERSION,
            batters: FxHashMap::default(),
        }
    }

    pub fn contains(&self, batter_id: u32) -> bool {
        self.batters.contains_key(&batter_id)
    }

    pub fn profile(&self, batter_id: u32) -> Option<&BatterProfile> {
        self.batters.get(&batter_id)
    }

    /// The batter's profile, created empty on first sight.
    pub fn profile_mut(&mut self, batter_id: u32) -> &mut BatterProfile {
        self.batters.entry(batter_id).or_default()
    }

    pub fn len(&self) -> usize {
        self.batters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batters.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_mut_creates_lazily() {
        let mut registry = BatterRegistry::new();
        assert!(!registry.contains(42));
        assert!(registry.profile(42).is_none());

        registry.profile_mut(42);
        assert!(registry.contains(42));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.profile(42).unwrap().grid_count(), 0);
    }
}
