//! The shared match protocol of §4.F, used by both the forward engine
//! (matching `ante` against the input) and the backward engine (matching
//! `post` against a daughter sequence). One token list is matched in order
//! against consecutive elements of a sequence window; each token records
//! what it consumed so later tokens (and the caller) can resolve
//! backreferences and emit a rewrite.

use crate::features::FeatureSystem;
use crate::modifiers::apply_modifiers;
use crate::sound::{Sound, SequenceElement};
use crate::token::{QuantifierKind, Token};

/// What a single token in the matching list consumed.
#[derive(Debug, Clone)]
pub struct Captured {
    /// Elements consumed by this token (more than one for `Quantified`,
    /// zero for a failed optional quantifier).
    pub elements: Vec<SequenceElement>,
    /// Which alternative matched, for `Choice`/`Set` tokens.
    pub alt_index: Option<usize>,
}

impl Captured {
    fn single(element: SequenceElement) -> Captured {
        Captured {
            elements: vec![element],
            alt_index: None,
        }
    }

    fn empty() -> Captured {
        Captured {
            elements: Vec::new(),
            alt_index: None,
        }
    }
}

/// The result of successfully matching a token list against a window.
#[derive(Debug, Clone)]
pub struct MatchOutcome {
    /// Total elements consumed from the sequence.
    pub len: usize,
    /// One capture per token in the matched list, in order.
    pub captures: Vec<Captured>,
}

/// Attempt to match `tokens` against `seq[start..]`, in order, with no
/// backtracking across tokens (each token is resolved greedily once it
/// starts matching, as the match protocol specifies).
pub fn match_tokens(
    tokens: &[Token],
    seq: &[SequenceElement],
    start: usize,
    system: &dyn FeatureSystem,
) -> Option<MatchOutcome> {
    let mut cursor = start;
    let mut captures: Vec<Captured> = Vec::with_capacity(tokens.len());

    for token in tokens {
        let (consumed, capture) = match_one(token, seq, cursor, &captures, system)?;
        cursor += consumed;
        captures.push(capture);
    }

    Some(MatchOutcome {
        len: cursor - start,
        captures,
    })
}

/// Match a single token at `pos`. Returns `(consumed_len, capture)`.
fn match_one(
    token: &Token,
    seq: &[SequenceElement],
    pos: usize,
    captures_so_far: &[Captured],
    system: &dyn FeatureSystem,
) -> Option<(usize, Captured)> {
    match token {
        Token::Boundary => match seq.get(pos) {
            Some(SequenceElement::Boundary) => Some((1, Captured::single(SequenceElement::Boundary))),
            _ => None,
        },
        Token::Segment(pattern) => {
            let element = seq.get(pos)?;
            let sound = element.as_sound()?;
            let ok = if pattern.partial {
                system.partial_match(&pattern.features, &sound.features)
            } else {
                crate::resources::canonicalize(&pattern.grapheme) == crate::resources::canonicalize(&sound.grapheme)
            };
            if ok {
                Some((1, Captured::single(element.clone())))
            } else {
                None
            }
        }
        Token::Choice(choices) | Token::Set(choices) => {
            for (idx, choice) in choices.iter().enumerate() {
                if let Some((len, inner)) = match_one(choice, seq, pos, captures_so_far, system) {
                    return Some((
                        len,
                        Captured {
                            elements: inner.elements,
                            alt_index: Some(idx),
                        },
                    ));
                }
            }
            None
        }
        Token::Negation(inner) => {
            let element = seq.get(pos)?;
            if match_one(inner, seq, pos, captures_so_far, system).is_some() {
                None
            } else {
                Some((1, Captured::single(element.clone())))
            }
        }
        Token::Quantified(inner, QuantifierKind::OneOrMore) => {
            let mut cursor = pos;
            let mut elements = Vec::new();
            loop {
                match match_one(inner, seq, cursor, captures_so_far, system) {
                    Some((len, capture)) if len > 0 => {
                        elements.extend(capture.elements);
                        cursor += len;
                    }
                    _ => break,
                }
            }
            if elements.is_empty() {
                None
            } else {
                Some((
                    cursor - pos,
                    Captured {
                        elements,
                        alt_index: None,
                    },
                ))
            }
        }
        Token::Quantified(inner, QuantifierKind::Optional) => {
            match match_one(inner, seq, pos, captures_so_far, system) {
                Some((len, capture)) => Some((len, capture)),
                None => Some((0, Captured::empty())),
            }
        }
        Token::BackRef(idx, modifier) => {
            let referenced = captures_so_far.get(*idx as usize)?.elements.first()?;
            let element = seq.get(pos)?;
            let expected_features = match (modifier, referenced.as_sound()) {
                (Some(m), Some(sound)) => apply_modifiers(&sound.features, m, system),
                (None, Some(sound)) => sound.features.clone(),
                _ => return None,
            };
            match element.as_sound() {
                Some(sound) if sound.features == expected_features => {
                    Some((1, Captured::single(element.clone())))
                }
                _ => None,
            }
        }
        Token::Empty | Token::Focus | Token::SyllableCond(_) => {
            // Not matchable as patterns; they only appear in emission or
            // context position and never as part of a matched token list.
            None
        }
    }
}

/// Synthesize a `Sound` from a modifier application for emission, falling
/// back to the source grapheme if no reverse lookup succeeds.
pub fn synthesize(source: &Sound, mod_str: &str, system: &dyn FeatureSystem) -> Sound {
    let features = apply_modifiers(&source.features, mod_str, system);
    let grapheme = system
        .features_to_grapheme(&features)
        .unwrap_or_else(|| source.grapheme.clone());
    Sound::from_features(grapheme, features)
}
