//! The backward engine (§4.G): enumerates ancestor sequences consistent
//! with an observed daughter under a rule, including the identity
//! (no-application) alternative.
//!
//! Matching runs over `post` instead of `ante` (the roles are the mirror
//! image of the forward engine): wherever `post` contains a `BackRef(k)`,
//! matching it against the daughter is how a value for `ante` position `k`
//! is recovered, since context-rewriting (§4.E) always gives backref index
//! `k` the meaning "ante position `k`". Plain segments in `post` are
//! literal constraints the daughter must satisfy, exactly as in forward
//! matching.

use crate::error::Result;
use crate::features::{FeatureSet, FeatureSystem};
use crate::modifiers::invert_modifiers;
use crate::matching::synthesize;
use crate::sound::{Sound, SequenceElement};
use crate::token::{QuantifierKind, Token};
use std::collections::{BTreeMap, HashMap};

/// Enumerate all ancestor sequences consistent with `seq` under `rule`.
/// Deterministic: the result is deduplicated and sorted lexicographically
/// by stringification.
pub fn backward(seq: &[SequenceElement], rule: &crate::token::Rule, system: &dyn FeatureSystem) -> Result<Vec<Vec<SequenceElement>>> {
    let mut segments: Vec<Vec<Vec<SequenceElement>>> = Vec::new();
    let mut i = 0;

    while i < seq.len() {
        let mut resolved: HashMap<u32, SequenceElement> = HashMap::new();
        match match_post(&rule.post, &rule.ante, seq, i, &mut resolved, system) {
            Some(len) if len > 0 => {
                let identity: Vec<SequenceElement> = seq[i..i + len].to_vec();
                let reconstructed = reconstruct_ante_window(&rule.ante, &resolved, system);
                segments.push(vec![identity, reconstructed]);
                i += len;
            }
            _ => {
                segments.push(vec![vec![seq[i].clone()]]);
                i += 1;
            }
        }
    }

    let mut candidates: BTreeMap<String, Vec<SequenceElement>> = BTreeMap::new();
    let mut accumulated: Vec<Vec<SequenceElement>> = vec![Vec::new()];
    for segment_alts in segments {
        let mut next = Vec::with_capacity(accumulated.len() * segment_alts.len());
        for prefix in &accumulated {
            for alt in &segment_alts {
                let mut combined = prefix.clone();
                combined.extend(alt.iter().cloned());
                next.push(combined);
            }
        }
        accumulated = next;
    }
    for combo in accumulated {
        candidates.entry(crate::sound::stringify(&combo)).or_insert(combo);
    }

    Ok(candidates.into_values().collect())
}

/// Match `post` against `seq[start..]`, collecting ante-position captures
/// from any `BackRef` tokens encountered. `ante` is `rule.ante`, needed to
/// validate each `BackRef(k)` against what `ante[k]` actually requires.
/// Returns the consumed length.
fn match_post(
    post: &[Token],
    ante: &[Token],
    seq: &[SequenceElement],
    start: usize,
    resolved: &mut HashMap<u32, SequenceElement>,
    system: &dyn FeatureSystem,
) -> Option<usize> {
    let mut cursor = start;
    for token in post {
        let consumed = match_post_one(token, ante, seq, cursor, resolved, system)?;
        cursor += consumed;
    }
    Some(cursor - start)
}

fn match_post_one(
    token: &Token,
    ante: &[Token],
    seq: &[SequenceElement],
    pos: usize,
    resolved: &mut HashMap<u32, SequenceElement>,
    system: &dyn FeatureSystem,
) -> Option<usize> {
    match token {
        Token::Boundary => match seq.get(pos) {
            Some(SequenceElement::Boundary) => Some(1),
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
                Some(1)
            } else {
                None
            }
        }
        Token::Choice(choices) | Token::Set(choices) => {
            for choice in choices {
                if let Some(len) = match_post_one(choice, ante, seq, pos, resolved, system) {
                    return Some(len);
                }
            }
            None
        }
        Token::Negation(inner) => {
            if seq.get(pos).is_none() {
                return None;
            }
            if match_post_one(inner, ante, seq, pos, &mut HashMap::new(), system).is_some() {
                None
            } else {
                Some(1)
            }
        }
        Token::Quantified(inner, QuantifierKind::OneOrMore) => {
            let mut cursor = pos;
            let mut reps = 0;
            while let Some(len) = match_post_one(inner, ante, seq, cursor, resolved, system) {
                if len == 0 {
                    break;
                }
                cursor += len;
                reps += 1;
            }
            if reps == 0 {
                None
            } else {
                Some(cursor - pos)
            }
        }
        Token::Quantified(inner, QuantifierKind::Optional) => {
            Some(match_post_one(inner, ante, seq, pos, resolved, system).unwrap_or(0))
        }
        Token::BackRef(idx, modifier) => {
            let element = seq.get(pos)?;
            let undone = match element {
                SequenceElement::Boundary => SequenceElement::Boundary,
                SequenceElement::Sound(sound) => match modifier {
                    Some(m) => SequenceElement::Sound(synthesize(sound, &invert_modifiers(m), system)),
                    None => SequenceElement::Sound(sound.clone()),
                },
            };
            if !consistent_with_ante(ante.get(*idx as usize)?, &undone, system) {
                return None;
            }
            resolved.insert(*idx, undone);
            Some(1)
        }
        Token::Empty => Some(0),
        Token::Focus | Token::SyllableCond(_) => None,
    }
}

/// Whether `candidate` (a daughter element with `modifier` already undone)
/// is a plausible match for what `ante_token` requires, mirroring
/// `matching::match_one`'s forward-direction rules.
fn consistent_with_ante(ante_token: &Token, candidate: &SequenceElement, system: &dyn FeatureSystem) -> bool {
    match (ante_token, candidate) {
        (Token::Boundary, SequenceElement::Boundary) => true,
        (Token::Boundary, SequenceElement::Sound(_)) => false,
        (Token::Segment(pattern), SequenceElement::Sound(sound)) => {
            if pattern.partial {
                system.partial_match(&pattern.features, &sound.features)
            } else {
                crate::resources::canonicalize(&pattern.grapheme) == crate::resources::canonicalize(&sound.grapheme)
            }
        }
        (Token::Segment(_), SequenceElement::Boundary) => false,
        // Other ante token kinds (Choice/Set/Negation/Quantified/BackRef/...)
        // don't have a single literal pattern to check a backref capture
        // against; accept whatever the daughter shows.
        _ => true,
    }
}

/// Reverse-map each `ante` token to a `SequenceElement`, preferring a value
/// recovered from `post`'s backrefs (`resolved`) over the token's own
/// literal content, since a recovered value reflects what the daughter
/// actually showed at a context position rather than a generic placeholder.
fn reconstruct_ante_window(
    ante: &[Token],
    resolved: &HashMap<u32, SequenceElement>,
    system: &dyn FeatureSystem,
) -> Vec<SequenceElement> {
    (0..ante.len())
        .filter_map(|idx| resolve_ante_position(ante, idx, resolved, system, 0))
        .collect()
}

fn resolve_ante_position(
    ante: &[Token],
    idx: usize,
    resolved: &HashMap<u32, SequenceElement>,
    system: &dyn FeatureSystem,
    depth: u32,
) -> Option<SequenceElement> {
    if let Some(element) = resolved.get(&(idx as u32)) {
        return Some(element.clone());
    }
    if depth > 8 {
        return ante.get(idx).map(placeholder_for);
    }
    match ante.get(idx)? {
        Token::Segment(s) => Some(SequenceElement::Sound(s.clone())),
        Token::Boundary => Some(SequenceElement::Boundary),
        Token::Empty => None,
        Token::BackRef(k2, modifier) => {
            let source = resolve_ante_position(ante, *k2 as usize, resolved, system, depth + 1)?;
            match (modifier, &source) {
                (Some(m), SequenceElement::Sound(sound)) => {
                    Some(SequenceElement::Sound(synthesize(sound, &invert_modifiers(m), system)))
                }
                _ => Some(source),
            }
        }
        Token::Choice(choices) | Token::Set(choices) => Some(union_placeholder(choices)),
        other @ (Token::Negation(_) | Token::Quantified(_, _) | Token::Focus | Token::SyllableCond(_)) => {
            Some(placeholder_for(other))
        }
    }
}

fn union_placeholder(choices: &[Token]) -> SequenceElement {
    let grapheme = choices
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join("|");
    SequenceElement::Sound(Sound {
        grapheme,
        features: FeatureSet::new(),
        partial: true,
    })
}

fn placeholder_for(token: &Token) -> SequenceElement {
    SequenceElement::Sound(Sound {
        grapheme: token.to_string(),
        features: FeatureSet::new(),
        partial: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::ipa::IpaSystem;
    use crate::parser::parse_rule_with_system;
    use crate::sequence::parse_sequence_with_system;

    fn sys() -> IpaSystem {
        IpaSystem::new()
    }

    fn run(rule_src: &str, seq_src: &str) -> Vec<String> {
        let system = sys();
        let rule = parse_rule_with_system(rule_src, &system).unwrap();
        let seq = parse_sequence_with_system(seq_src, &system);
        backward(&seq, &rule, &system)
            .unwrap()
            .iter()
            .map(|s| crate::sound::stringify(s))
            .collect()
    }

    #[test]
    fn contains_identity_and_preimage() {
        let results = run("p > b", "# a b a #");
        assert!(results.contains(&"# a b a #".to_string()));
        assert!(results.contains(&"# a p a #".to_string()));
    }

    #[test]
    fn context_rule_recovers_exact_context() {
        let results = run("p > b / V _ V", "# a b a #");
        assert!(results.contains(&"# a p a #".to_string()));
    }

    #[test]
    fn deletion_rule_backward_contains_original() {
        let results = run("C > :null: / _ #", "# a d j aː #");
        assert!(results.contains(&"# a d j aː d #".to_string()));
    }

    #[test]
    fn every_daughter_is_always_in_its_own_backward_set() {
        for (rule_src, daughter) in [
            ("p > b", "# a b a #"),
            ("p > b / V _ V", "# a b a #"),
            ("t > d / V _ V", "# a d a d a #"),
            ("L > d / # _", "# d a b j o p l ɔ l #"),
        ] {
            let results = run(rule_src, daughter);
            assert!(results.contains(&daughter.to_string()), "missing identity for {}", rule_src);
        }
    }

    #[test]
    fn output_is_sorted_and_deduplicated() {
        let results = run("p > b", "# a b a #");
        let mut sorted = results.clone();
        sorted.sort();
        assert_eq!(results, sorted);
        let unique: std::collections::HashSet<_> = results.iter().collect();
        assert_eq!(unique.len(), results.len());
    }
}
