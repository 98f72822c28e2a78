//! UHFS scoring: per-domain calculators, risk buckets, the 300-900 composite, and the
//! recompute/persist orchestration around them.
//!
//! Calculation is a pure function of a user's answers under one [`Ruleset`]; the service adds
//! per-user serialization and the snapshot write.

pub mod calculators;
pub mod composite;
pub mod domain;
pub mod engine;
pub mod repository;
pub mod risk;
pub mod router;
pub mod ruleset;
pub mod service;

#[cfg(test)]
mod tests;

pub use calculators::{DomainScore, FactorScore};
pub use composite::{DomainScores, SCORE_CEILING, SCORE_FLOOR};
pub use domain::{
    Domain, DomainUpdate, FinancialBehaviorAnswers, IncomeStabilityAnswers, LiteracyRecord,
    ProtectionReadinessAnswers, ReliabilityTenureAnswers, UserAnswers, UserId,
};
pub use engine::{ScoreDetails, ScoreOutcome, ScoreReport, ScoringEngine};
pub use repository::{AnswerSource, RepositoryError, SnapshotRepository, UhfsSnapshot};
pub use risk::{DomainRisk, RiskLevel};
pub use router::uhfs_router;
pub use ruleset::{CompositeWeights, FactorRule, RiskThresholds, Ruleset, RulesetError};
pub use service::{UhfsService, UhfsServiceError};
