//! `Sound`, `Boundary`, and `SequenceElement` — the data the engines
//! actually operate on, as opposed to the `Token`s a rule is parsed into.

use crate::features::{FeatureSet, FeatureSystem};
use std::fmt;

/// A grapheme paired with an immutable feature set and a `partial` flag.
///
/// `partial = true` marks an underspecified class (e.g. "any vowel"),
/// constructed from a sound-class lookup rather than a concrete grapheme;
/// it may match multiple concrete sounds under [`FeatureSet::partial_match`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Sound {
    pub grapheme: String,
    pub features: FeatureSet,
    pub partial: bool,
}

impl Sound {
    /// Construct a fully specified `Sound` by looking `grapheme` up in
    /// `system`. An unknown grapheme yields a `Sound` with empty features,
    /// per the design's non-fatal `UnknownGrapheme` policy — this is never
    /// an error.
    pub fn new(grapheme: &str, system: &dyn FeatureSystem) -> Sound {
        let features = system
            .grapheme_to_features(grapheme)
            .unwrap_or_else(FeatureSet::new);
        Sound {
            grapheme: grapheme.to_string(),
            features,
            partial: false,
        }
    }

    /// Construct a partial (class) `Sound`, e.g. for `V`, `C`, `N`.
    pub fn class(name: &str, system: &dyn FeatureSystem) -> Option<Sound> {
        system.class_features(name).map(|features| Sound {
            grapheme: name.to_string(),
            features,
            partial: true,
        })
    }

    /// Build a `Sound` directly from an already-resolved feature set,
    /// used by the forward/backward engines when synthesizing a sound from
    /// a modifier application.
    pub fn from_features(grapheme: String, features: FeatureSet) -> Sound {
        Sound {
            grapheme,
            features,
            partial: false,
        }
    }
}

impl fmt::Display for Sound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.grapheme)
    }
}

/// The distinguished word-edge sentinel (`#`), distinct from any `Sound`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Boundary;

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#")
    }
}

/// An element of the sequences the engines operate on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SequenceElement {
    Sound(Sound),
    Boundary,
}

impl SequenceElement {
    /// The underlying `Sound`, if this element is one.
    pub fn as_sound(&self) -> Option<&Sound> {
        match self {
            SequenceElement::Sound(s) => Some(s),
            SequenceElement::Boundary => None,
        }
    }
}

impl fmt::Display for SequenceElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SequenceElement::Sound(s) => write!(f, "{}", s),
            SequenceElement::Boundary => write!(f, "#"),
        }
    }
}

/// Join a sequence of elements into the space-separated text format of §6.
pub fn stringify(seq: &[SequenceElement]) -> String {
    seq.iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::ipa::IpaSystem;

    #[test]
    fn unknown_grapheme_yields_empty_features() {
        let sys = IpaSystem::new();
        let sound = Sound::new("%%", &sys);
        assert!(sound.features.is_empty());
        assert!(!sound.partial);
    }

    #[test]
    fn class_sound_is_partial() {
        let sys = IpaSystem::new();
        let sound = Sound::class("V", &sys).unwrap();
        assert!(sound.partial);
    }

    #[test]
    fn stringify_joins_with_spaces() {
        let sys = IpaSystem::new();
        let seq = vec![
            SequenceElement::Boundary,
            SequenceElement::Sound(Sound::new("a", &sys)),
            SequenceElement::Boundary,
        ];
        assert_eq!(stringify(&seq), "# a #");
    }
}
