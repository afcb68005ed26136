//! End-to-end confidence scoring behavior through the public API,
//! including rule sets deserialized from configuration JSON.

use stratus_core::{
    ConfidenceLevel, Evidence, EvidenceCollection, EvidenceKind, ScoringRule, SourceLocation,
};
use stratus_graph::score::{ScoringConfig, calculate, merge_scores, validate_score};

fn signal(kind: EvidenceKind, confidence: u8) -> Evidence {
    Evidence::new(format!("ev-{kind}"), kind, "observed signal", confidence)
        .with_location(SourceLocation::new("main.tf", 4, 4))
        .with_method("hcl-detector")
}

#[test]
fn depends_on_directive_scores_strictly_above_heuristics() {
    let config = ScoringConfig::default();

    let declared = calculate(
        &[
            signal(EvidenceKind::DependsOnDirective, 90),
            signal(EvidenceKind::Interpolation, 85),
        ],
        &config,
        &[],
    );
    let guessed = calculate(
        &[
            signal(EvidenceKind::NamingConvention, 90),
            signal(EvidenceKind::FileProximity, 85),
        ],
        &config,
        &[],
    );

    assert!(declared.value > guessed.value);
    assert!(matches!(
        declared.level,
        ConfidenceLevel::Certain | ConfidenceLevel::High
    ));
    assert!(matches!(
        guessed.level,
        ConfidenceLevel::Low | ConfidenceLevel::Uncertain
    ));
    assert!(validate_score(&declared));
    assert!(validate_score(&guessed));
}

#[test]
fn rules_deserialized_from_configuration_apply() {
    let rules: Vec<ScoringRule> = serde_json::from_str(
        r#"[
            {
                "id": "prod-depends-on",
                "name": "depends_on in prod trees",
                "applies_to": ["depends_on_directive"],
                "base_score": 3.0,
                "multiplier": 2.0,
                "conditions": [
                    {"field": "location.file", "operator": "matches", "value": "(^|/)prod(/|\\.)"}
                ],
                "priority": 5
            }
        ]"#,
    )
    .expect("rule config parses");

    let config = ScoringConfig::default();
    let in_prod = calculate(
        &[signal(EvidenceKind::DependsOnDirective, 60)
            .with_location(SourceLocation::new("envs/prod/main.tf", 2, 2))],
        &config,
        &rules,
    );
    let elsewhere = calculate(
        &[signal(EvidenceKind::DependsOnDirective, 60)
            .with_location(SourceLocation::new("envs/dev/main.tf", 2, 2))],
        &config,
        &rules,
    );

    assert!((in_prod.breakdown.rule_contribution - 6.0).abs() < f64::EPSILON);
    assert!((elsewhere.breakdown.rule_contribution - 0.0).abs() < f64::EPSILON);
    assert_eq!(u32::from(in_prod.value), u32::from(elsewhere.value) + 6);
}

#[test]
fn evidence_collection_mirrors_scoring_inputs() {
    let items = vec![
        signal(EvidenceKind::DependsOnDirective, 90),
        signal(EvidenceKind::Interpolation, 70),
        signal(EvidenceKind::NamingConvention, 35),
    ];
    let collection = EvidenceCollection::from_items(items.clone());

    assert_eq!(collection.len(), 3);
    assert_eq!(collection.aggregated_confidence, 65); // (90+70+35)/3 = 65
    assert_eq!(
        collection.primary().map(|e| e.kind),
        Some(EvidenceKind::DependsOnDirective)
    );

    let kind_total: usize = collection.count_by_kind.values().sum();
    assert_eq!(kind_total, collection.len());

    // The same items score consistently with their aggregate.
    let score = calculate(&items, &ScoringConfig::default(), &[]);
    assert!(score.value > 0);
    assert!(validate_score(&score));
}

#[test]
fn merged_scores_stay_valid_and_value_weighted() {
    let config = ScoringConfig::default();
    let scores = vec![
        calculate(&[signal(EvidenceKind::DependsOnDirective, 95)], &config, &[]),
        calculate(&[signal(EvidenceKind::Interpolation, 75)], &config, &[]),
        calculate(&[signal(EvidenceKind::NamingConvention, 20)], &config, &[]),
    ];

    let merged = merge_scores(&scores);
    assert!(validate_score(&merged));

    let max = scores.iter().map(|s| s.value).max().unwrap_or(0);
    let min = scores.iter().map(|s| s.value).min().unwrap_or(0);
    assert!(merged.value <= max);
    assert!(merged.value >= min);

    // Breakdown terms accumulate across the inputs.
    let base_sum: f64 = scores.iter().map(|s| s.breakdown.base_score).sum();
    assert!((merged.breakdown.base_score - base_sum).abs() < 1e-9);
}

#[test]
fn scoring_never_fails_on_degenerate_inputs() {
    let config = ScoringConfig::default();

    let empty = calculate(&[], &config, &[]);
    assert_eq!(empty.value, 0);
    assert_eq!(empty.level, ConfidenceLevel::Uncertain);

    let zero_confidence = calculate(&[signal(EvidenceKind::Unknown, 0)], &config, &[]);
    assert!(validate_score(&zero_confidence));

    // A rule with a broken regex is a non-match, never a panic.
    let broken_rule = ScoringRule::new("broken", "broken")
        .applies_to([EvidenceKind::Interpolation])
        .with_base_score(50.0)
        .with_condition(stratus_core::ScoringCondition::new(
            "raw",
            stratus_core::ConditionOperator::Matches,
            "([",
        ));
    let scored = calculate(
        &[signal(EvidenceKind::Interpolation, 50)],
        &config,
        &[broken_rule],
    );
    assert!((scored.breakdown.rule_contribution - 0.0).abs() < f64::EPSILON);
    assert!(validate_score(&scored));
}
