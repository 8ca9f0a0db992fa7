//! Integration tests: the worked scenario table and the universal
//! invariants it is drawn from.

use soundlaw::{backward, forward, parse_rule, parse_sequence, stringify, FeatureSystem};

fn run_forward(rule_src: &str, seq_src: &str) -> String {
    let rule = parse_rule(rule_src).unwrap();
    let seq = parse_sequence(seq_src);
    let system = soundlaw::default_system();
    let out = forward(&seq, &rule, system.as_ref()).unwrap();
    stringify(&out)
}

fn run_backward(rule_src: &str, seq_src: &str) -> Vec<String> {
    let rule = parse_rule(rule_src).unwrap();
    let seq = parse_sequence(seq_src);
    let system = soundlaw::default_system();
    backward(&seq, &rule, system.as_ref())
        .unwrap()
        .iter()
        .map(|s| stringify(s))
        .collect()
}

#[test]
fn scenario_simple_substitution() {
    assert_eq!(run_forward("p > b", "# a p a #"), "# a b a #");
}

#[test]
fn scenario_context_restricted_substitution() {
    assert_eq!(run_forward("p > b / V _ V", "# a p a #"), "# a b a #");
    assert_eq!(run_forward("t > d / V _ V", "# a t a t a #"), "# a d a d a #");
}

#[test]
fn scenario_deletion_before_boundary() {
    assert_eq!(run_forward("C > :null: / _ #", "# a d j aː d #"), "# a d j aː #");
}

#[test]
fn scenario_liquid_to_d_word_initially() {
    assert_eq!(
        run_forward("L > d / # _", "# l a b j o p l ɔ l #"),
        "# d a b j o p l ɔ l #"
    );
}

#[test]
fn scenario_epenthesis_with_doubled_backref() {
    assert_eq!(
        run_forward("V s > @1 z @1 / # p|b r _ t|d", "# p r e s t o #"),
        "# p r e z e t o #"
    );
}

#[test]
fn scenario_consonant_nasal_cluster_simplification() {
    assert_eq!(run_forward("C N > @1 / _ #", "# a ɡ r o ɡ ŋ #"), "# a ɡ r o ɡ #");
}

#[test]
fn scenario_choice_consonant_cluster_simplification() {
    assert_eq!(
        run_forward("s|k C > @1 / _ #", "# a k a n k m i k s #"),
        "# a k a n k m i k #"
    );
}

#[test]
fn scenario_set_correspondence_resolves_parallel_choice() {
    assert_eq!(run_forward("{p|b} > {f|v}", "# a p a b a #"), "# a f a v a #");
}

#[test]
fn scenario_backward_contains_identity_and_preimage() {
    let results = run_backward("p > b", "# a b a #");
    assert!(results.contains(&"# a b a #".to_string()));
    assert!(results.contains(&"# a p a #".to_string()));
}

#[test]
fn scenario_backward_contextual_recovers_exact_context() {
    let results = run_backward("p > b / V _ V", "# a b a #");
    assert!(results.contains(&"# a p a #".to_string()));
}

#[test]
fn invariant_parser_round_trips_through_display() {
    for src in ["p > b", "p > b / V _ V", "C > :null: / _ #"] {
        let rule = parse_rule(src).unwrap();
        assert_eq!(rule.to_string(), src);
    }
}

#[test]
fn invariant_forward_is_deterministic() {
    let rule = parse_rule("p > b").unwrap();
    let seq = parse_sequence("# a p a p #");
    let system = soundlaw::default_system();
    let once = forward(&seq, &rule, system.as_ref()).unwrap();
    let twice = forward(&seq, &rule, system.as_ref()).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn invariant_forward_preserves_total_length_for_1to1_rules() {
    let rule = parse_rule("p > b").unwrap();
    let seq = parse_sequence("# p p p #");
    let system = soundlaw::default_system();
    let out = forward(&seq, &rule, system.as_ref()).unwrap();
    assert_eq!(out.len(), seq.len());
}

#[test]
fn invariant_backward_contains_the_daughter_itself() {
    for (rule_src, daughter) in [
        ("p > b", "# a b a #"),
        ("p > b / V _ V", "# a b a #"),
        ("C > :null: / _ #", "# a d j aː #"),
    ] {
        let results = run_backward(rule_src, daughter);
        assert!(results.contains(&daughter.to_string()));
    }
}

#[test]
fn invariant_backward_output_is_sorted_and_deduplicated() {
    let results = run_backward("p > b", "# a b a #");
    let mut sorted = results.clone();
    sorted.sort();
    assert_eq!(results, sorted);
    let unique: std::collections::HashSet<_> = results.iter().collect();
    assert_eq!(unique.len(), results.len());
}

#[test]
fn invariant_sound_distance_is_a_pseudometric() {
    let system = soundlaw::default_system();
    let p = system.grapheme_to_features("p").unwrap();
    let b = system.grapheme_to_features("b").unwrap();
    assert_eq!(system.sound_distance(&p, &p), 0.0);
    let d_pb = system.sound_distance(&p, &b);
    let d_bp = system.sound_distance(&b, &p);
    assert!((d_pb - d_bp).abs() < 1e-9);
    assert!(d_pb >= 0.0 && d_pb <= 1.0);
}

#[test]
fn invariant_feature_set_add_is_idempotent() {
    use soundlaw::FeatureSet;
    let system = soundlaw::default_system();
    let base = system.grapheme_to_features("p").unwrap();
    let additions = FeatureSet::from_words(vec!["voiced"]);
    let once = system.add_features(&base, &additions);
    let twice = system.add_features(&once, &additions);
    assert_eq!(once, twice);
}

#[test]
fn invariant_partial_match_is_monotone_under_feature_growth() {
    use soundlaw::FeatureSet;
    let system = soundlaw::default_system();
    let pattern = FeatureSet::from_words(vec!["voiced"]);
    let b = system.grapheme_to_features("b").unwrap();
    assert!(system.partial_match(&pattern, &b));
}
