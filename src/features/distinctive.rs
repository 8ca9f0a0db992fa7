//! Scalar distinctive feature system: each grapheme projects onto a vector
//! of named dimensions in `[-1.0, 1.0]`, missing = 0. Distance is a
//! geometry-depth-weighted L1 norm over the dimension vector rather than
//! the tree-edge-counting distance the categorical systems use.
//!
//! Grounded in `alteruphono/features/distinctive.py`
//! (`ScalarDimension`, `_dimension_weights`, `_features_to_scalar`).

use super::geometry::{self, Node};
use super::{FeatureSet, FeatureSystem};
use crate::resources::{CLASSES, SOUND_NAMES};
use lazy_static::lazy_static;
use std::collections::HashMap;

/// A single named scalar dimension and the geometry node that weights it.
pub struct Dimension {
    pub name: &'static str,
    pub node: Node,
    /// Word that, if present in a grapheme's description, sets the
    /// dimension to `+1.0`.
    pub positive_word: &'static str,
    /// Word that sets the dimension to `-1.0`.
    pub negative_word: &'static str,
}

lazy_static! {
    /// A curated subset of the reference's 26 dimensions, enough to
    /// distinguish the embedded grapheme inventory.
    pub static ref DIMENSIONS: Vec<Dimension> = vec![
        Dimension { name: "voice", node: Node::Laryngeal, positive_word: "voiced", negative_word: "voiceless" },
        Dimension { name: "nasality", node: Node::Manner, positive_word: "nasal", negative_word: "" },
        Dimension { name: "continuancy", node: Node::Manner, positive_word: "fricative", negative_word: "stop" },
        Dimension { name: "laterality", node: Node::Manner, positive_word: "lateral", negative_word: "" },
        Dimension { name: "height", node: Node::Prosodic, positive_word: "high", negative_word: "low" },
        Dimension { name: "backness", node: Node::Prosodic, positive_word: "back", negative_word: "front" },
        Dimension { name: "roundness", node: Node::Prosodic, positive_word: "rounded", negative_word: "unrounded" },
        Dimension { name: "length", node: Node::Prosodic, positive_word: "long", negative_word: "" },
        Dimension { name: "labiality", node: Node::Labial, positive_word: "bilabial", negative_word: "" },
        Dimension { name: "dorsality", node: Node::Dorsal, positive_word: "velar", negative_word: "" },
    ];
}

fn project(words: &[&str]) -> HashMap<&'static str, f64> {
    let mut vector = HashMap::new();
    for dim in DIMENSIONS.iter() {
        let value = if !dim.positive_word.is_empty() && words.contains(&dim.positive_word) {
            1.0
        } else if !dim.negative_word.is_empty() && words.contains(&dim.negative_word) {
            -1.0
        } else {
            0.0
        };
        if value != 0.0 {
            vector.insert(dim.name, value);
        }
    }
    vector
}

fn scalar_vector_for_words(name: &str) -> HashMap<&'static str, f64> {
    let words: Vec<&str> = name.split_whitespace().collect();
    project(&words)
}

/// Encode a scalar dimension vector as a `FeatureSet` so the system still
/// satisfies the shared contract: `dimension:+0.50`-style tokens.
fn vector_to_feature_set(vector: &HashMap<&'static str, f64>) -> FeatureSet {
    let mut names: Vec<&&str> = vector.keys().collect();
    names.sort();
    FeatureSet::from_words(
        names
            .into_iter()
            .map(|name| format!("{}:{:+.2}", name, vector[name])),
    )
}

fn feature_set_to_vector(fs: &FeatureSet) -> HashMap<&'static str, f64> {
    let mut vector = HashMap::new();
    for token in fs.iter() {
        if let Some((name, value)) = token.split_once(':') {
            if let Some(dim) = DIMENSIONS.iter().find(|d| d.name == name) {
                if let Ok(v) = value.parse::<f64>() {
                    vector.insert(dim.name, v);
                }
            }
        }
    }
    vector
}

/// The scalar distinctive feature system.
pub struct DistinctiveSystem;

impl DistinctiveSystem {
    pub fn new() -> Self {
        DistinctiveSystem
    }
}

impl Default for DistinctiveSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureSystem for DistinctiveSystem {
    fn name(&self) -> &'static str {
        "distinctive"
    }

    fn grapheme_to_features(&self, grapheme: &str) -> Option<FeatureSet> {
        let canonical = crate::resources::canonicalize(grapheme);
        SOUND_NAMES.get(canonical).map(|name| {
            let vector = scalar_vector_for_words(name);
            vector_to_feature_set(&vector)
        })
    }

    fn features_to_grapheme(&self, fs: &FeatureSet) -> Option<String> {
        let target = feature_set_to_vector(fs);
        SOUND_NAMES
            .iter()
            .find(|(_, name)| scalar_vector_for_words(name) == target)
            .map(|(grapheme, _)| grapheme.to_string())
    }

    fn class_features(&self, name: &str) -> Option<FeatureSet> {
        CLASSES.get(name).map(|entry| {
            if entry.features.is_empty() {
                FeatureSet::new()
            } else {
                let vector = scalar_vector_for_words(entry.features);
                vector_to_feature_set(&vector)
            }
        })
    }

    fn feature_distance(&self, a: &str, b: &str) -> f64 {
        geometry::feature_distance(a, b)
    }

    fn sound_distance(&self, a: &FeatureSet, b: &FeatureSet) -> f64 {
        let va = feature_set_to_vector(a);
        let vb = feature_set_to_vector(b);
        if va == vb {
            return 0.0;
        }
        let mut total_weight = 0.0;
        let mut accum = 0.0;
        for dim in DIMENSIONS.iter() {
            let weight = dim.node.weight();
            let av = *va.get(dim.name).unwrap_or(&0.0);
            let bv = *vb.get(dim.name).unwrap_or(&0.0);
            if av == 0.0 && bv == 0.0 {
                continue;
            }
            total_weight += weight;
            accum += weight * (av - bv).abs() / 2.0;
        }
        if total_weight == 0.0 {
            0.0
        } else {
            (accum / total_weight).min(1.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projects_voicing_dimension() {
        let sys = DistinctiveSystem::new();
        let p = sys.grapheme_to_features("p").unwrap();
        let b = sys.grapheme_to_features("b").unwrap();
        assert_ne!(p, b);
        assert!(sys.sound_distance(&p, &b) > 0.0);
    }

    #[test]
    fn sound_distance_symmetric() {
        let sys = DistinctiveSystem::new();
        let p = sys.grapheme_to_features("p").unwrap();
        let b = sys.grapheme_to_features("b").unwrap();
        assert!((sys.sound_distance(&p, &b) - sys.sound_distance(&b, &p)).abs() < 1e-9);
    }
}
