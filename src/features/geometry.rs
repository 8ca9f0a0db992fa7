//! Feature geometry: a rooted tree of grouping nodes whose leaves are binary
//! features, used for depth-weighted feature and sound distance.
//!
//! Grounded directly in `alteruphono/features/geometry.py`: the tree shape
//! (`Root` -> `Laryngeal`/`Manner`/`Place{Labial,Coronal,Dorsal,Pharyngeal,
//! Glottal}`/`TongueRoot`/`Prosodic`) and the `feature_distance`/
//! `sound_distance` algorithms are a direct port.

use super::FeatureSet;
use std::collections::HashMap;

/// A node in the feature geometry tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Node {
    Root,
    Laryngeal,
    Manner,
    Place,
    Labial,
    Coronal,
    Dorsal,
    Pharyngeal,
    Glottal,
    TongueRoot,
    Prosodic,
}

impl Node {
    /// The node's parent, or `None` for the root.
    fn parent(self) -> Option<Node> {
        use Node::*;
        match self {
            Root => None,
            Laryngeal | Manner | Place | TongueRoot | Prosodic => Some(Root),
            Labial | Coronal | Dorsal | Pharyngeal | Glottal => Some(Place),
        }
    }

    /// Depth of the node, root = 0.
    pub fn depth(self) -> u32 {
        let mut d = 0;
        let mut cur = self;
        while let Some(p) = cur.parent() {
            d += 1;
            cur = p;
        }
        d
    }

    /// `w(node) = 1 / depth(node)`; the root has no meaningful weight and
    /// is treated as weight 1.0 (never used directly as a leaf anyway).
    pub fn weight(self) -> f64 {
        let d = self.depth();
        if d == 0 {
            1.0
        } else {
            1.0 / f64::from(d)
        }
    }

    fn ancestors(self) -> Vec<Node> {
        let mut chain = vec![self];
        let mut cur = self;
        while let Some(p) = cur.parent() {
            chain.push(p);
            cur = p;
        }
        chain
    }
}

const SENTINEL_DISTANCE: f64 = 999.0;

lazy_static::lazy_static! {
    /// `FEATURE_TO_GEOMETRY_NODE`: maps a feature value to the tree node it
    /// belongs under, for both binary-leaf features and categorical groups.
    pub static ref FEATURE_TO_NODE: HashMap<&'static str, Node> = {
        use Node::*;
        maplit::hashmap! {
            "voiced" => Laryngeal,
            "voiceless" => Laryngeal,
            "stop" => Manner,
            "nasal" => Manner,
            "fricative" => Manner,
            "lateral" => Manner,
            "trill" => Manner,
            "approximant" => Manner,
            "glide" => Manner,
            "bilabial" => Labial,
            "labiodental" => Labial,
            "labiovelar" => Labial,
            "alveolar" => Coronal,
            "postalveolar" => Coronal,
            "palatal" => Dorsal,
            "velar" => Dorsal,
            "glottal" => Glottal,
            "central" => Prosodic,
            "front" => Prosodic,
            "back" => Prosodic,
            "high" => Prosodic,
            "mid" => Prosodic,
            "low" => Prosodic,
            "long" => Prosodic,
            "rounded" => Prosodic,
            "unrounded" => Prosodic,
        }
    };
}

fn node_of(feature: &str) -> Option<Node> {
    FEATURE_TO_NODE.get(feature).copied()
}

/// Distance between two individual feature values. Identical features have
/// distance 0; otherwise the number of tree edges through the lowest common
/// ancestor. Unknown features return the sentinel `999.0`.
pub fn feature_distance(a: &str, b: &str) -> f64 {
    if a == b {
        return 0.0;
    }
    let (Some(na), Some(nb)) = (node_of(a), node_of(b)) else {
        return SENTINEL_DISTANCE;
    };
    let chain_a = na.ancestors();
    let chain_b = nb.ancestors();
    for (ia, anc_a) in chain_a.iter().enumerate() {
        if let Some(ib) = chain_b.iter().position(|n| n == anc_a) {
            return (ia + ib) as f64;
        }
    }
    SENTINEL_DISTANCE
}

/// Depth-weighted sound distance between two feature sets, per §4.C: for
/// each binary leaf mentioned on either side, `w * |delta| / 2` where
/// `delta in {-1, 0, 1}` encodes negative/absent/positive; for categorical
/// features grouped by node, `w*0` if identical, `w*0.5` if one side empty,
/// `w*1` if both non-empty but different. Normalised by total weight.
pub fn sound_distance(a: &FeatureSet, b: &FeatureSet) -> f64 {
    if a == b {
        return 0.0;
    }

    let mut groups: HashMap<Node, (Vec<&str>, Vec<&str>)> = HashMap::new();
    for feature in a.iter() {
        if let Some(node) = node_of(feature.trim_start_matches('-')) {
            groups.entry(node).or_default().0.push(feature);
        }
    }
    for feature in b.iter() {
        if let Some(node) = node_of(feature.trim_start_matches('-')) {
            groups.entry(node).or_default().1.push(feature);
        }
    }

    let mut total_weight = 0.0;
    let mut accum = 0.0;

    for (node, (left, right)) in groups.iter() {
        let weight = node.weight();
        if is_binary_node(*node) {
            let lv = polarity(left);
            let rv = polarity(right);
            if left.is_empty() && right.is_empty() {
                continue;
            }
            total_weight += weight;
            accum += weight * (lv - rv).abs() / 2.0;
        } else {
            total_weight += weight;
            if left.is_empty() || right.is_empty() {
                accum += weight * 0.5;
            } else if left == right {
                accum += 0.0;
            } else {
                accum += weight * 1.0;
            }
        }
    }

    if total_weight == 0.0 {
        0.0
    } else {
        (accum / total_weight).min(1.0)
    }
}

fn is_binary_node(node: Node) -> bool {
    matches!(node, Node::Laryngeal)
}

fn polarity(features: &[&str]) -> f64 {
    if features.iter().any(|f| !f.starts_with('-') && (*f == "voiced")) {
        1.0
    } else if features.iter().any(|f| *f == "voiceless") {
        -1.0
    } else {
        0.0
    }
}
