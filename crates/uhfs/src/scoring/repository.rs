use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::composite::DomainScores;
use super::domain::{UserAnswers, UserId};
use super::risk::{DomainRisk, RiskLevel};

/// Persisted score for one user, as read by eligibility filters, dashboards and chat context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UhfsSnapshot {
    pub user_id: UserId,
    pub ruleset_version: String,
    pub components: DomainScores,
    pub composite: f64,
    pub score: u16,
    pub domain_risk: DomainRisk,
    pub overall_risk: RiskLevel,
    pub last_updated: DateTime<Utc>,
}

impl UhfsSnapshot {
    /// True when both snapshots describe the same result, ignoring when they were computed.
    pub fn same_assessment(&self, other: &UhfsSnapshot) -> bool {
        self.user_id == other.user_id
            && self.ruleset_version == other.ruleset_version
            && self.components == other.components
            && self.composite == other.composite
            && self.score == other.score
            && self.domain_risk == other.domain_risk
            && self.overall_risk == other.overall_risk
    }
}

/// Storage for the single current snapshot per user.
pub trait SnapshotRepository: Send + Sync {
    fn fetch(&self, user_id: &UserId) -> Result<Option<UhfsSnapshot>, RepositoryError>;
    /// Replaces any stored snapshot for the user. Previous values are not retained.
    fn upsert(&self, snapshot: UhfsSnapshot) -> Result<(), RepositoryError>;
    /// Only used when the user account itself is deleted.
    fn remove(&self, user_id: &UserId) -> Result<(), RepositoryError>;
}

/// Read-only view of the questionnaire and training records kept by intake.
pub trait AnswerSource: Send + Sync {
    /// Missing records are `None` fields on the result, not errors.
    fn load(&self, user_id: &UserId) -> Result<UserAnswers, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
