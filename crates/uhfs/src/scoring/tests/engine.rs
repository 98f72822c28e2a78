use chrono::{TimeZone, Utc};

use super::common::*;
use crate::scoring::composite::scale;
use crate::scoring::domain::{IncomeStabilityAnswers, UserAnswers};
use crate::scoring::risk::{overall_risk, RiskLevel};
use crate::scoring::{calculators, CompositeWeights, Ruleset, ScoringEngine};

#[test]
fn all_missing_answers_score_only_the_nonzero_fallbacks() {
    let engine = ScoringEngine::standard();
    let outcome = engine.evaluate(&UserAnswers::default());

    // Trend 0.8 * 0.05, missed payments 1.0 * 0.30, rating 0.5 * 0.10.
    assert_close(outcome.components.income, 0.04);
    assert_close(outcome.components.financial_behavior, 0.3);
    assert_close(outcome.components.reliability, 0.05);
    assert_eq!(outcome.components.protection, 0.0);
    assert_eq!(outcome.components.literacy, 0.0);

    assert_close(outcome.composite, 0.0925);
    assert_eq!(outcome.score, 356);

    assert_eq!(outcome.domain_risk.income, RiskLevel::High);
    assert_eq!(outcome.domain_risk.financial_behavior, RiskLevel::High);
    assert_eq!(outcome.domain_risk.reliability, RiskLevel::Medium);
    assert_eq!(outcome.domain_risk.protection, RiskLevel::High);
    assert_eq!(outcome.domain_risk.literacy, RiskLevel::High);
    assert_eq!(outcome.overall_risk, RiskLevel::High);
}

#[test]
fn maximal_answers_score_900_with_low_risk() {
    let outcome = ScoringEngine::standard().evaluate(&maximal_answers());

    assert_close(outcome.composite, 1.0);
    assert_eq!(outcome.score, 900);
    assert!(outcome
        .domain_risk
        .levels()
        .iter()
        .all(|level| *level == RiskLevel::Low));
    assert_eq!(outcome.overall_risk, RiskLevel::Low);
}

#[test]
fn mixed_answers_produce_expected_snapshot_values() {
    let outcome = ScoringEngine::standard().evaluate(&mixed_answers());

    assert_close(outcome.components.income, 0.6975);
    assert_close(outcome.components.financial_behavior, 0.43);
    assert_close(outcome.components.reliability, 0.715);
    assert_close(outcome.components.protection, 0.67);
    assert_close(outcome.components.literacy, 0.35714285714285715);
    assert_close(outcome.composite, 0.5766964285714287);
    assert_eq!(outcome.score, 646);

    assert_eq!(
        outcome.domain_risk.levels(),
        [
            RiskLevel::Medium,
            RiskLevel::High,
            RiskLevel::Low,
            RiskLevel::Medium,
            RiskLevel::High,
        ]
    );
    assert_eq!(outcome.overall_risk, RiskLevel::High);
    assert_eq!(outcome.ruleset_version, Ruleset::STANDARD_VERSION);
}

#[test]
fn evaluation_is_deterministic() {
    let engine = ScoringEngine::standard();
    let answers = mixed_answers();

    assert_eq!(engine.evaluate(&answers), engine.evaluate(&answers));
}

#[test]
fn every_income_bucket_combination_stays_in_range() {
    let rules = Ruleset::standard().income_stability;
    let labels = |rule: &crate::scoring::FactorRule| {
        let mut labels: Vec<Option<String>> = rule.table.keys().cloned().map(Some).collect();
        labels.push(None);
        labels
    };

    for monthly_income in labels(&rules.monthly_income) {
        for income_drop_frequency in labels(&rules.income_drop_frequency) {
            for working_days_per_week in labels(&rules.working_days_per_week) {
                for income_trend in labels(&rules.income_trend) {
                    let answers = IncomeStabilityAnswers {
                        monthly_income: monthly_income.clone(),
                        income_drop_frequency: income_drop_frequency.clone(),
                        working_days_per_week: working_days_per_week.clone(),
                        income_trend,
                    };
                    let score = calculators::income_stability(Some(&answers), &rules);
                    assert!((0.0..=1.0).contains(&score.value), "{answers:?}");
                }
            }
        }
    }
}

#[test]
fn snapshot_invariants_hold_across_domain_combinations() {
    let engine = ScoringEngine::standard();
    let maximal = maximal_answers();
    let mixed = mixed_answers();

    let income = [None, mixed.income_stability.clone(), maximal.income_stability.clone()];
    let behavior = [None, mixed.financial_behavior.clone(), maximal.financial_behavior.clone()];
    let reliability = [None, mixed.reliability_tenure.clone(), maximal.reliability_tenure.clone()];
    let protection = [
        None,
        mixed.protection_readiness.clone(),
        maximal.protection_readiness.clone(),
    ];
    let literacy = [None, mixed.literacy, maximal.literacy];

    for i in &income {
        for f in &behavior {
            for r in &reliability {
                for p in &protection {
                    for l in &literacy {
                        let answers = UserAnswers {
                            income_stability: i.clone(),
                            financial_behavior: f.clone(),
                            reliability_tenure: r.clone(),
                            protection_readiness: p.clone(),
                            literacy: *l,
                        };
                        let outcome = engine.evaluate(&answers);

                        for value in [
                            outcome.components.income,
                            outcome.components.financial_behavior,
                            outcome.components.reliability,
                            outcome.components.protection,
                            outcome.components.literacy,
                        ] {
                            assert!((0.0..=1.0).contains(&value));
                        }
                        assert!((0.0..=1.0).contains(&outcome.composite));
                        assert!((300..=900).contains(&outcome.score));
                        assert_eq!(outcome.score, scale(outcome.composite));
                        assert_eq!(
                            outcome.overall_risk,
                            overall_risk(outcome.domain_risk.levels())
                        );
                    }
                }
            }
        }
    }
}

#[test]
fn custom_ruleset_drives_composite_weights() {
    let mut ruleset = Ruleset::standard();
    ruleset.version = "income-only".to_string();
    ruleset.composite = CompositeWeights {
        income: 1.0,
        financial_behavior: 0.0,
        reliability: 0.0,
        protection: 0.0,
        literacy: 0.0,
    };
    ruleset.validate().expect("custom ruleset validates");

    let outcome = ScoringEngine::new(ruleset).evaluate(&mixed_answers());

    assert_close(outcome.composite, 0.6975);
    // 300 + 0.6975 * 600 = 718.5, which rounds to the even neighbour.
    assert_eq!(outcome.score, 718);
    assert_eq!(outcome.ruleset_version, "income-only");
}

#[test]
fn report_serializes_snapshot_fields_with_breakdown() {
    let outcome = ScoringEngine::standard().evaluate(&mixed_answers());
    let timestamp = Utc
        .with_ymd_and_hms(2025, 3, 1, 9, 30, 0)
        .single()
        .expect("valid timestamp");

    let report = outcome.into_report(user("u-report"), timestamp);
    let json = serde_json::to_value(&report).expect("serialize report");

    assert_eq!(json["user_id"], "u-report");
    assert_eq!(json["score"], 646);
    assert_eq!(json["overall_risk"], "High");
    assert_eq!(json["domain_risk"]["financial_behavior"], "High");
    assert_eq!(json["components"]["R"], 0.715);
    assert_eq!(json["weights"]["I"], 0.25);
    assert_eq!(json["details"]["literacy"]["factors"][0]["factor"], "average_quiz_score");
    assert_eq!(json["last_updated"], "2025-03-01T09:30:00Z");
    assert_eq!(json["ruleset_version"], "uhfs-v2");
}
