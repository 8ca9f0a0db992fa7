//! Extended categorical feature system ("Tresoldi"): same contract as the
//! categorical IPA system, but retains the full descriptive vocabulary
//! verbatim rather than folding alternate terms through an alias table —
//! useful when a rule needs to distinguish secondary articulation or length
//! markers that the plain IPA system's aliasing would otherwise merge.
//!
//! Grounded in `alteruphono/features/tresoldi.py`.

use super::geometry;
use super::{FeatureSet, FeatureSystem};
use crate::resources::{CLASSES, SOUND_NAMES};

fn parse_name_to_features(name: &str) -> FeatureSet {
    FeatureSet::from_words(name.split_whitespace())
}

/// The extended categorical feature system.
pub struct TresoldiSystem;

impl TresoldiSystem {
    pub fn new() -> Self {
        TresoldiSystem
    }
}

impl Default for TresoldiSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureSystem for TresoldiSystem {
    fn name(&self) -> &'static str {
        "tresoldi"
    }

    fn grapheme_to_features(&self, grapheme: &str) -> Option<FeatureSet> {
        let canonical = crate::resources::canonicalize(grapheme);
        SOUND_NAMES.get(canonical).map(|name| parse_name_to_features(name))
    }

    fn features_to_grapheme(&self, fs: &FeatureSet) -> Option<String> {
        SOUND_NAMES
            .iter()
            .find(|(_, name)| &parse_name_to_features(name) == fs)
            .map(|(grapheme, _)| grapheme.to_string())
    }

    fn class_features(&self, name: &str) -> Option<FeatureSet> {
        CLASSES.get(name).map(|entry| {
            if entry.features.is_empty() {
                FeatureSet::new()
            } else {
                parse_name_to_features(entry.features)
            }
        })
    }

    fn feature_distance(&self, a: &str, b: &str) -> f64 {
        geometry::feature_distance(a, b)
    }

    fn sound_distance(&self, a: &FeatureSet, b: &FeatureSet) -> f64 {
        geometry::sound_distance(a, b)
    }
}
