//! Parsing of concrete sound sequences (§3): the space-separated text
//! format the forward/backward engines operate on, as opposed to rule
//! strings (see [`crate::parser`]).

use crate::features::{self, FeatureSystem};
use crate::sound::{Sound, SequenceElement};
use unicode_normalization::UnicodeNormalization;

/// Parse a sequence with the process-wide default feature system.
pub fn parse_sequence(src: &str) -> Vec<SequenceElement> {
    parse_sequence_with_system(src, features::default_system().as_ref())
}

/// Parse a space-separated sequence of graphemes and `#` boundaries into
/// `SequenceElement`s, NFD-normalising first per §6. Unknown graphemes are
/// never an error (§7); they simply carry an empty feature set.
pub fn parse_sequence_with_system(src: &str, system: &dyn FeatureSystem) -> Vec<SequenceElement> {
    let normalized: String = src.nfd().collect();
    normalized
        .split_whitespace()
        .map(|chunk| {
            if chunk == "#" {
                SequenceElement::Boundary
            } else {
                SequenceElement::Sound(Sound::new(chunk, system))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::ipa::IpaSystem;

    #[test]
    fn parses_boundaries_and_sounds() {
        let sys = IpaSystem::new();
        let seq = parse_sequence_with_system("# a p a #", &sys);
        assert_eq!(seq.len(), 5);
        assert_eq!(seq[0], SequenceElement::Boundary);
        assert!(matches!(seq[1], SequenceElement::Sound(_)));
    }

    #[test]
    fn round_trips_through_stringify() {
        let sys = IpaSystem::new();
        let src = "# a p a #";
        let seq = parse_sequence_with_system(src, &sys);
        assert_eq!(crate::sound::stringify(&seq), src);
    }

    #[test]
    fn unknown_grapheme_is_not_an_error() {
        let sys = IpaSystem::new();
        let seq = parse_sequence_with_system("# %% #", &sys);
        assert_eq!(seq.len(), 3);
    }
}
