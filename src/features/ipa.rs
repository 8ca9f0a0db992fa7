//! Categorical IPA feature system: the default. Feature names are the words
//! of the `sounds` table descriptions; binary membership; a small alias
//! table folds alternate terminology (`plosive` -> `stop`) on input.
//!
//! Grounded in `alteruphono/features/ipa.py` (`FEATURE_ALIASES`,
//! `_parse_name_to_features`, `IPAFeatureSystem`).

use super::geometry;
use super::{FeatureSet, FeatureSystem};
use crate::resources::{CLASSES, SOUND_NAMES};
use lazy_static::lazy_static;
use std::collections::HashMap;

lazy_static! {
    static ref ALIASES: HashMap<&'static str, &'static str> = maplit::hashmap! {
        "plosive" => "stop",
        "rhotic" => "trill",
    };
}

fn resolve_alias(word: &str) -> &str {
    ALIASES.get(word).copied().unwrap_or(word)
}

fn parse_name_to_features(name: &str) -> FeatureSet {
    FeatureSet::from_words(name.split_whitespace().map(resolve_alias))
}

/// The categorical IPA feature system.
pub struct IpaSystem;

impl IpaSystem {
    pub fn new() -> Self {
        IpaSystem
    }
}

impl Default for IpaSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureSystem for IpaSystem {
    fn name(&self) -> &'static str {
        "ipa"
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
