//! Feature system abstraction: the `FeatureSet` algebra, the `FeatureSystem`
//! trait, and the process-wide registry of named systems.
//!
//! Grounded in `alteruphono/features/__init__.py` (registry pattern) and
//! `alteruphono/features/common.py` (`add_features`/`partial_match`), with
//! the three concrete systems living in sibling modules.

pub mod distinctive;
pub mod geometry;
pub mod ipa;
pub mod tresoldi;

use crate::error::{Error, Result};
use crate::resources::FEATURE_CATEGORIES;
use lazy_static::lazy_static;
use std::collections::BTreeSet;
use std::sync::{Arc, RwLock};

/// An unordered bundle of feature-value identifiers.
///
/// Backed by a `BTreeSet` so that `Hash`/`Eq`/iteration order are
/// deterministic, which the features→grapheme reverse-lookup tables in the
/// concrete systems depend on. Negative (constraint) features used in
/// partial-match patterns are ordinary strings carrying a leading `-`,
/// mirroring the Python reference's `partial_match`.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FeatureSet(BTreeSet<String>);

impl FeatureSet {
    /// An empty feature set.
    pub fn new() -> Self {
        FeatureSet(BTreeSet::new())
    }

    /// Build a feature set from an iterator of feature words.
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FeatureSet(words.into_iter().map(Into::into).collect())
    }

    /// Whether the set has no features.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of features present.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether `feature` is a member.
    pub fn contains(&self, feature: &str) -> bool {
        self.0.contains(feature)
    }

    /// Insert a feature, returning whether it was newly inserted.
    pub fn insert(&mut self, feature: impl Into<String>) -> bool {
        self.0.insert(feature.into())
    }

    /// Remove a feature, returning whether it was present.
    pub fn remove(&mut self, feature: &str) -> bool {
        self.0.remove(feature)
    }

    /// Iterate over the positive (non-`-`-prefixed) features only.
    pub fn positive(&self) -> impl Iterator<Item = &str> {
        self.0.iter().filter(|f| !f.starts_with('-')).map(String::as_str)
    }

    /// Iterate over all features as stored (raw, including any `-` prefix).
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// `base ⊕ additions`: for each feature in `additions`, remove any
    /// feature in `base` belonging to the same category, then insert the
    /// addition. Idempotent: `add(add(base, x), x) == add(base, x)`.
    pub fn add(&self, additions: &FeatureSet, categories: &CategoryMap) -> FeatureSet {
        let mut result = self.clone();
        for feature in additions.iter() {
            if let Some(category) = categories.category_of(feature) {
                let siblings: Vec<String> = result
                    .0
                    .iter()
                    .filter(|f| categories.category_of(f) == Some(category))
                    .cloned()
                    .collect();
                for sibling in siblings {
                    result.0.remove(&sibling);
                }
            }
            result.0.insert(feature.to_string());
        }
        result
    }

    /// `pattern ⊑ target`: pattern splits into positives `P⁺` and negatives
    /// `P⁻` (those prefixed `-`). Holds iff `P⁺ ⊆ target ∧ P⁻ ∩ target = ∅`.
    pub fn partial_match(&self, target: &FeatureSet) -> bool {
        for feature in self.0.iter() {
            if let Some(negated) = feature.strip_prefix('-') {
                if target.contains(negated) {
                    return false;
                }
            } else if !target.contains(feature) {
                return false;
            }
        }
        true
    }
}

impl std::fmt::Display for FeatureSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let words: Vec<&str> = self.0.iter().map(String::as_str).collect();
        write!(f, "{}", words.join(" "))
    }
}

/// A feature → category lookup, used by [`FeatureSet::add`] to implement
/// category-aware replacement.
pub trait CategoryMap {
    /// The category a feature belongs to, if known.
    fn category_of(&self, feature: &str) -> Option<&str>;
}

/// The shared, compiled-in category map every built-in system uses.
pub struct DefaultCategoryMap;

impl CategoryMap for DefaultCategoryMap {
    fn category_of(&self, feature: &str) -> Option<&str> {
        FEATURE_CATEGORIES.get(feature).copied()
    }
}

/// Capability set a pluggable feature system must expose, dispatched
/// through a single vtable (`Arc<dyn FeatureSystem>`).
pub trait FeatureSystem: Send + Sync {
    /// The system's registry name (`"ipa"`, `"tresoldi"`, `"distinctive"`).
    fn name(&self) -> &'static str;

    /// Map a grapheme to its feature set. Unknown graphemes yield `None`;
    /// callers construct an empty-featured `Sound` in that case (non-fatal
    /// per the error-handling design).
    fn grapheme_to_features(&self, grapheme: &str) -> Option<FeatureSet>;

    /// Reverse lookup: the first grapheme whose feature set equals `fs`.
    fn features_to_grapheme(&self, fs: &FeatureSet) -> Option<String>;

    /// The feature set that defines a sound class (`V`, `C`, `N`, ...).
    fn class_features(&self, name: &str) -> Option<FeatureSet>;

    /// Category-aware feature addition/replacement.
    fn add_features(&self, base: &FeatureSet, additions: &FeatureSet) -> FeatureSet {
        base.add(additions, &DefaultCategoryMap)
    }

    /// Subset test with negative-feature support.
    fn partial_match(&self, pattern: &FeatureSet, target: &FeatureSet) -> bool {
        pattern.partial_match(target)
    }

    /// Geometry-weighted distance between two individual feature values.
    fn feature_distance(&self, a: &str, b: &str) -> f64;

    /// Geometry-weighted distance between two feature sets.
    fn sound_distance(&self, a: &FeatureSet, b: &FeatureSet) -> f64;
}

lazy_static! {
    static ref REGISTRY: RwLock<std::collections::HashMap<String, Arc<dyn FeatureSystem>>> = {
        let mut map = std::collections::HashMap::new();
        map.insert("ipa".to_string(), Arc::new(ipa::IpaSystem::new()) as Arc<dyn FeatureSystem>);
        map.insert(
            "tresoldi".to_string(),
            Arc::new(tresoldi::TresoldiSystem::new()) as Arc<dyn FeatureSystem>,
        );
        map.insert(
            "distinctive".to_string(),
            Arc::new(distinctive::DistinctiveSystem::new()) as Arc<dyn FeatureSystem>,
        );
        RwLock::new(map)
    };
    static ref DEFAULT_NAME: RwLock<String> = RwLock::new("ipa".to_string());
}

/// Register a feature system under `name`, overwriting any prior
/// registration of the same name. Documented as an initialisation-only
/// operation; callers should not re-register concurrently with lookups in
/// steady state.
pub fn register(name: impl Into<String>, system: Arc<dyn FeatureSystem>) {
    REGISTRY.write().unwrap().insert(name.into(), system);
}

/// Fetch a registered system by name.
pub fn get_system(name: &str) -> Result<Arc<dyn FeatureSystem>> {
    REGISTRY
        .read()
        .unwrap()
        .get(name)
        .cloned()
        .ok_or_else(|| Error::UnknownSystem { name: name.to_string() })
}

/// List the names of all currently registered systems, sorted.
pub fn list_systems() -> Vec<String> {
    let mut names: Vec<String> = REGISTRY.read().unwrap().keys().cloned().collect();
    names.sort();
    names
}

/// Set the process-wide default system name. Errors if `name` is not
/// registered.
pub fn set_default(name: &str) -> Result<()> {
    if !REGISTRY.read().unwrap().contains_key(name) {
        return Err(Error::UnknownSystem { name: name.to_string() });
    }
    *DEFAULT_NAME.write().unwrap() = name.to_string();
    Ok(())
}

/// The currently configured default system.
pub fn default_system() -> Arc<dyn FeatureSystem> {
    let name = DEFAULT_NAME.read().unwrap().clone();
    get_system(&name).expect("default system is always registered")
}

/// Test-only: restore the registry to its built-in state. Documented as
/// test-only per the design's reset-hook guidance.
#[doc(hidden)]
pub fn reset_registry_for_tests() {
    let mut registry = REGISTRY.write().unwrap();
    registry.clear();
    registry.insert("ipa".to_string(), Arc::new(ipa::IpaSystem::new()) as Arc<dyn FeatureSystem>);
    registry.insert(
        "tresoldi".to_string(),
        Arc::new(tresoldi::TresoldiSystem::new()) as Arc<dyn FeatureSystem>,
    );
    registry.insert(
        "distinctive".to_string(),
        Arc::new(distinctive::DistinctiveSystem::new()) as Arc<dyn FeatureSystem>,
    );
    drop(registry);
    *DEFAULT_NAME.write().unwrap() = "ipa".to_string();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_is_idempotent() {
        let base = FeatureSet::from_words(vec!["voiced", "bilabial", "stop"]);
        let additions = FeatureSet::from_words(vec!["voiceless"]);
        let once = base.add(&additions, &DefaultCategoryMap);
        let twice = once.add(&additions, &DefaultCategoryMap);
        assert_eq!(once, twice);
        assert!(!once.contains("voiced"));
        assert!(once.contains("voiceless"));
    }

    #[test]
    fn partial_match_respects_negatives() {
        let pattern = FeatureSet::from_words(vec!["voiced", "-nasal"]);
        let target_ok = FeatureSet::from_words(vec!["voiced", "bilabial", "stop"]);
        let target_bad = FeatureSet::from_words(vec!["voiced", "bilabial", "nasal"]);
        assert!(pattern.partial_match(&target_ok));
        assert!(!pattern.partial_match(&target_bad));
    }

    #[test]
    fn partial_match_monotone_under_non_conflicting_growth() {
        let pattern = FeatureSet::from_words(vec!["voiced"]);
        let target = FeatureSet::from_words(vec!["voiced"]);
        let mut grown = target.clone();
        grown.insert("bilabial");
        assert!(pattern.partial_match(&target));
        assert!(pattern.partial_match(&grown));
    }

    #[test]
    fn default_system_is_ipa() {
        reset_registry_for_tests();
        assert_eq!(default_system().name(), "ipa");
    }

    #[test]
    fn list_systems_includes_builtins() {
        reset_registry_for_tests();
        let names = list_systems();
        assert_eq!(names, vec!["distinctive", "ipa", "tresoldi"]);
    }

    #[test]
    fn set_default_rejects_unknown_name() {
        reset_registry_for_tests();
        assert!(set_default("klingon").is_err());
    }
}
