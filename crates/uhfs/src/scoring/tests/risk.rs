use crate::scoring::risk::{classify, overall_risk, DomainRisk, RiskLevel};
use crate::scoring::{DomainScores, Ruleset};

use RiskLevel::{High, Low, Medium};

#[test]
fn income_boundaries_belong_to_lower_risk_bucket() {
    let rules = Ruleset::standard().risk;

    assert_eq!(classify(0.4499, &rules.income), High);
    assert_eq!(classify(0.45, &rules.income), Medium);
    assert_eq!(classify(0.6999, &rules.income), Medium);
    assert_eq!(classify(0.70, &rules.income), Low);
}

#[test]
fn behavior_protection_and_literacy_share_cutoffs() {
    let rules = Ruleset::standard().risk;

    for thresholds in [rules.financial_behavior, rules.protection, rules.literacy] {
        assert_eq!(classify(0.0, &thresholds), High);
        assert_eq!(classify(0.4999, &thresholds), High);
        assert_eq!(classify(0.50, &thresholds), Medium);
        assert_eq!(classify(0.7499, &thresholds), Medium);
        assert_eq!(classify(0.75, &thresholds), Low);
        assert_eq!(classify(1.0, &thresholds), Low);
    }
}

#[test]
fn reliability_never_classifies_high() {
    let rules = Ruleset::standard().risk;

    assert_eq!(classify(0.0, &rules.reliability), Medium);
    assert_eq!(classify(0.5499, &rules.reliability), Medium);
    assert_eq!(classify(0.55, &rules.reliability), Low);
}

#[test]
fn overall_risk_counts_votes() {
    assert_eq!(overall_risk([High, Medium, Low, Low, Low]), Medium);
    assert_eq!(overall_risk([High, Low, Low, Low, Low]), Low);
    assert_eq!(overall_risk([Low, Medium, Low, Low, Low]), Low);
    assert_eq!(overall_risk([Medium, Medium, Low, Low, Low]), Medium);
    assert_eq!(overall_risk([High, High, Low, Low, Low]), High);
    assert_eq!(overall_risk([High, High, High, Medium, Medium]), High);
    assert_eq!(overall_risk([Low; 5]), Low);
}

#[test]
fn domain_risk_classifies_each_component() {
    let rules = Ruleset::standard().risk;
    let scores = DomainScores {
        income: 0.45,
        financial_behavior: 0.80,
        reliability: 0.30,
        protection: 0.49,
        literacy: 0.75,
    };

    let risk = DomainRisk::classify(&scores, &rules);

    assert_eq!(
        risk,
        DomainRisk {
            income: Medium,
            financial_behavior: Low,
            reliability: Medium,
            protection: High,
            literacy: Low,
        }
    );
    // One High plus two Medium: three at Medium or worse, fewer than two High.
    assert_eq!(risk.overall(), Medium);
}

#[test]
fn risk_levels_serialize_as_labels() {
    let encoded = serde_json::to_string(&[High, Medium, Low]).expect("serialize levels");
    assert_eq!(encoded, r#"["High","Medium","Low"]"#);
    assert_eq!(High.label(), "High");
}
