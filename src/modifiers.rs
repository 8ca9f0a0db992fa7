//! `±feature` modifier helper: applies a `BackRef`'s `[...]` modifier list
//! to a feature set, and inverts a modifier string for the backward engine.
//!
//! Grounded line-for-line in `alteruphono/modifiers.py`
//! (`apply_modifiers`/`invert_modifiers`).

use crate::features::{FeatureSet, FeatureSystem};

/// Tokenise `mod_str` on commas, trim whitespace, apply additions via the
/// system's category-aware `add_features`, then remove subtractions.
pub fn apply_modifiers(
    features: &FeatureSet,
    mod_str: &str,
    system: &dyn FeatureSystem,
) -> FeatureSet {
    let mut additions = FeatureSet::new();
    let mut subtractions: Vec<String> = Vec::new();

    for raw in mod_str.split(',') {
        let item = raw.trim();
        if item.is_empty() {
            continue;
        }
        if let Some(feature) = item.strip_prefix('-') {
            subtractions.push(feature.trim().to_string());
        } else if let Some(feature) = item.strip_prefix('+') {
            additions.insert(feature.trim());
        } else {
            additions.insert(item);
        }
    }

    let mut result = system.add_features(features, &additions);
    for feature in subtractions {
        result.remove(&feature);
    }
    result
}

/// Swap `+` <-> `-`; a bare `feat` (implicit `+`) becomes `-feat`. Used by
/// the backward engine to undo a forward-applied modifier.
pub fn invert_modifiers(mod_str: &str) -> String {
    mod_str
        .split(',')
        .map(|raw| {
            let item = raw.trim();
            if let Some(feature) = item.strip_prefix('-') {
                format!("+{}", feature.trim())
            } else if let Some(feature) = item.strip_prefix('+') {
                format!("-{}", feature.trim())
            } else {
                format!("-{}", item)
            }
        })
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::ipa::IpaSystem;

    #[test]
    fn apply_modifiers_adds_and_removes() {
        let sys = IpaSystem::new();
        let base = FeatureSet::from_words(vec!["voiceless", "bilabial", "stop"]);
        let result = apply_modifiers(&base, "+voiced", &sys);
        assert!(result.contains("voiced"));
        assert!(!result.contains("voiceless"));
    }

    #[test]
    fn apply_modifiers_bare_feature_is_addition() {
        let sys = IpaSystem::new();
        let base = FeatureSet::from_words(vec!["voiceless", "bilabial", "stop"]);
        let result = apply_modifiers(&base, "voiced", &sys);
        assert!(result.contains("voiced"));
    }

    #[test]
    fn apply_modifiers_explicit_subtraction() {
        let sys = IpaSystem::new();
        let base = FeatureSet::from_words(vec!["voiced", "nasal", "bilabial"]);
        let result = apply_modifiers(&base, "-nasal", &sys);
        assert!(!result.contains("nasal"));
        assert!(result.contains("voiced"));
    }

    #[test]
    fn invert_swaps_signs() {
        assert_eq!(invert_modifiers("+voiced,-nasal,high"), "-voiced,+nasal,-high");
    }
}
