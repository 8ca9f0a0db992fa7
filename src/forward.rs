//! The forward engine (§4.F): a single left-to-right, non-overlapping
//! matcher that rewrites `seq` according to `rule`.

use crate::error::{Error, Result};
use crate::features::FeatureSystem;
use crate::matching::{match_tokens, synthesize, Captured};
use crate::sound::SequenceElement;
use crate::token::{Rule, Token};

/// Apply `rule` to `seq` once, left to right, producing the rewritten
/// sequence. Deterministic: greedy on `Quantified('+')`, first-success on
/// `Choice`/`Set`, non-overlapping.
pub fn forward(seq: &[SequenceElement], rule: &Rule, system: &dyn FeatureSystem) -> Result<Vec<SequenceElement>> {
    let ante_set_positions: Vec<usize> = rule
        .ante
        .iter()
        .enumerate()
        .filter(|(_, t)| matches!(t, Token::Set(_)))
        .map(|(i, _)| i)
        .collect();

    let mut result = Vec::with_capacity(seq.len());
    let mut i = 0;

    while i < seq.len() {
        match match_tokens(&rule.ante, seq, i, system) {
            Some(outcome) => {
                let emitted = emit_post(&rule.post, &outcome.captures, &ante_set_positions, system)?;
                result.extend(emitted);
                i += outcome.len.max(1);
            }
            None => {
                result.push(seq[i].clone());
                i += 1;
            }
        }
    }

    Ok(result)
}

fn emit_post(
    post: &[Token],
    ante_captures: &[Captured],
    ante_set_positions: &[usize],
    system: &dyn FeatureSystem,
) -> Result<Vec<SequenceElement>> {
    let mut out = Vec::new();
    let mut set_occurrence = 0usize;

    for token in post {
        match token {
            Token::Segment(s) if s.partial => {
                return Err(Error::emit("post contains a sound-class placeholder, which cannot be emitted"));
            }
            Token::Segment(s) => out.push(SequenceElement::Sound(s.clone())),
            Token::Empty => {}
            Token::Boundary => out.push(SequenceElement::Boundary),
            Token::BackRef(idx, modifier) => {
                let captured = ante_captures
                    .get(*idx as usize)
                    .ok_or_else(|| Error::emit(format!("backref @{} has no matching ante position", idx + 1)))?;
                for element in &captured.elements {
                    match (modifier, element) {
                        (Some(m), SequenceElement::Sound(sound)) => {
                            out.push(SequenceElement::Sound(synthesize(sound, m, system)));
                        }
                        (None, element) => out.push(element.clone()),
                        (Some(_), SequenceElement::Boundary) => out.push(element.clone()),
                    }
                }
            }
            Token::Set(choices) => {
                let ante_idx = ante_set_positions.get(set_occurrence).copied().ok_or_else(|| {
                    Error::emit("post Set has no positionally-paired ante Set")
                })?;
                set_occurrence += 1;
                let chosen = ante_captures
                    .get(ante_idx)
                    .and_then(|c| c.alt_index)
                    .ok_or_else(|| Error::emit("ante Set did not record which alternative matched"))?;
                let choice = choices.get(chosen).ok_or_else(|| {
                    Error::emit("Set correspondence index out of range")
                })?;
                out.extend(emit_post(
                    std::slice::from_ref(choice),
                    ante_captures,
                    ante_set_positions,
                    system,
                )?);
            }
            Token::Choice(_) | Token::Negation(_) | Token::Quantified(_, _) | Token::Focus | Token::SyllableCond(_) => {
                return Err(Error::emit(format!(
                    "token {} is illegal at emission time",
                    token
                )));
            }
        }
    }

    Ok(out)
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

    fn run(rule_src: &str, seq_src: &str) -> String {
        let system = sys();
        let rule = parse_rule_with_system(rule_src, &system).unwrap();
        let seq = parse_sequence_with_system(seq_src, &system);
        let out = forward(&seq, &rule, &system).unwrap();
        crate::sound::stringify(&out)
    }

    #[test]
    fn simple_substitution() {
        assert_eq!(run("p > b", "# a p a #"), "# a b a #");
    }

    #[test]
    fn context_restricted_substitution() {
        assert_eq!(run("p > b / V _ V", "# a p a #"), "# a b a #");
        assert_eq!(run("t > d / V _ V", "# a t a t a #"), "# a d a d a #");
    }

    #[test]
    fn deletion_before_boundary() {
        assert_eq!(run("C > :null: / _ #", "# a d j aː d #"), "# a d j aː #");
    }

    #[test]
    fn liquid_to_d_word_initially() {
        assert_eq!(run("L > d / # _", "# l a b j o p l ɔ l #"), "# d a b j o p l ɔ l #");
    }

    #[test]
    fn epenthesis_with_doubled_backref() {
        assert_eq!(
            run("V s > @1 z @1 / # p|b r _ t|d", "# p r e s t o #"),
            "# p r e z e t o #"
        );
    }

    #[test]
    fn consonant_nasal_cluster_simplification() {
        assert_eq!(run("C N > @1 / _ #", "# a ɡ r o ɡ ŋ #"), "# a ɡ r o ɡ #");
    }

    #[test]
    fn choice_consonant_cluster_simplification() {
        assert_eq!(run("s|k C > @1 / _ #", "# a k a n k m i k s #"), "# a k a n k m i k #");
    }

    #[test]
    fn set_correspondence_resolves_parallel_choice() {
        assert_eq!(run("{p|b} > {f|v}", "# a p a b a #"), "# a f a v a #");
    }

    #[test]
    fn non_overlapping_and_total_length_preserved() {
        let system = sys();
        let rule = parse_rule_with_system("p > b", &system).unwrap();
        let seq = parse_sequence_with_system("# p p p #", &system);
        let out = forward(&seq, &rule, &system).unwrap();
        assert_eq!(out.len(), seq.len());
    }
}
