use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::calculators::{self, DomainScore};
use super::composite::{self, DomainScores};
use super::domain::{UserAnswers, UserId};
use super::repository::UhfsSnapshot;
use super::risk::{DomainRisk, RiskLevel};
use super::ruleset::{CompositeWeights, Ruleset};

/// Stateless evaluator applying one ruleset to a user's answers.
#[derive(Debug, Clone)]
pub struct ScoringEngine {
    ruleset: Arc<Ruleset>,
}

impl ScoringEngine {
    pub fn new(ruleset: Ruleset) -> Self {
        Self {
            ruleset: Arc::new(ruleset),
        }
    }

    pub fn standard() -> Self {
        Self::new(Ruleset::standard())
    }

    pub fn ruleset(&self) -> &Ruleset {
        &self.ruleset
    }

    /// Pure function of the answers: identical input always yields an identical outcome.
    pub fn evaluate(&self, answers: &UserAnswers) -> ScoreOutcome {
        let rules = &*self.ruleset;

        let details = ScoreDetails {
            income_stability: calculators::income_stability(
                answers.income_stability.as_ref(),
                &rules.income_stability,
            ),
            financial_behavior: calculators::financial_behavior(
                answers.financial_behavior.as_ref(),
                &rules.financial_behavior,
            ),
            reliability_tenure: calculators::reliability_tenure(
                answers.reliability_tenure.as_ref(),
                &rules.reliability_tenure,
            ),
            protection_readiness: calculators::protection_readiness(
                answers.protection_readiness.as_ref(),
                &rules.protection_readiness,
            ),
            literacy: calculators::literacy(answers.literacy.as_ref(), &rules.literacy),
        };

        let components = DomainScores {
            income: details.income_stability.value,
            financial_behavior: details.financial_behavior.value,
            reliability: details.reliability_tenure.value,
            protection: details.protection_readiness.value,
            literacy: details.literacy.value,
        };

        let composite = composite::composite(&components, &rules.composite);
        let score = composite::scale(composite);
        let domain_risk = DomainRisk::classify(&components, &rules.risk);
        let overall_risk = domain_risk.overall();

        ScoreOutcome {
            ruleset_version: rules.version.clone(),
            weights: rules.composite,
            components,
            composite,
            score,
            domain_risk,
            overall_risk,
            details,
        }
    }
}

/// Per-domain factor breakdown.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreDetails {
    pub income_stability: DomainScore,
    pub financial_behavior: DomainScore,
    pub reliability_tenure: DomainScore,
    pub protection_readiness: DomainScore,
    pub literacy: DomainScore,
}

/// Everything computed for one user before it is stamped and persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreOutcome {
    pub ruleset_version: String,
    pub weights: CompositeWeights,
    pub components: DomainScores,
    pub composite: f64,
    pub score: u16,
    pub domain_risk: DomainRisk,
    pub overall_risk: RiskLevel,
    pub details: ScoreDetails,
}

impl ScoreOutcome {
    pub fn to_snapshot(&self, user_id: UserId, last_updated: DateTime<Utc>) -> UhfsSnapshot {
        UhfsSnapshot {
            user_id,
            ruleset_version: self.ruleset_version.clone(),
            components: self.components,
            composite: self.composite,
            score: self.score,
            domain_risk: self.domain_risk,
            overall_risk: self.overall_risk,
            last_updated,
        }
    }

    pub fn into_report(self, user_id: UserId, last_updated: DateTime<Utc>) -> ScoreReport {
        let snapshot = self.to_snapshot(user_id, last_updated);
        ScoreReport {
            snapshot,
            weights: self.weights,
            details: self.details,
        }
    }
}

/// Snapshot plus the weights and factor details that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreReport {
    #[serde(flatten)]
    pub snapshot: UhfsSnapshot,
    pub weights: CompositeWeights,
    pub details: ScoreDetails,
}
