use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::Utc;
use tracing::{info, warn};

use super::domain::UserId;
use super::engine::{ScoreOutcome, ScoreReport, ScoringEngine};
use super::repository::{AnswerSource, RepositoryError, SnapshotRepository, UhfsSnapshot};
use super::ruleset::Ruleset;

const LOCK_PRUNE_THRESHOLD: usize = 1024;

/// Orchestrates read, evaluate and persist for one user at a time.
pub struct UhfsService<A, S> {
    answers: Arc<A>,
    snapshots: Arc<S>,
    engine: Arc<ScoringEngine>,
    locks: UserLocks,
}

impl<A, S> UhfsService<A, S>
where
    A: AnswerSource + 'static,
    S: SnapshotRepository + 'static,
{
    pub fn new(answers: Arc<A>, snapshots: Arc<S>, ruleset: Ruleset) -> Self {
        Self {
            answers,
            snapshots,
            engine: Arc::new(ScoringEngine::new(ruleset)),
            locks: UserLocks::default(),
        }
    }

    pub fn engine(&self) -> &ScoringEngine {
        &self.engine
    }

    /// Recompute and overwrite the user's snapshot. Call after every answer or literacy write.
    pub fn recompute(&self, user_id: &UserId) -> Result<UhfsSnapshot, UhfsServiceError> {
        let handle = self.locks.handle(user_id);
        let _guard = handle.lock().unwrap_or_else(PoisonError::into_inner);

        let (_, snapshot) = self.recompute_locked(user_id)?;
        Ok(snapshot)
    }

    /// Same as [`Self::recompute`], also returning the weights and per-factor details.
    pub fn recompute_with_breakdown(
        &self,
        user_id: &UserId,
    ) -> Result<ScoreReport, UhfsServiceError> {
        let handle = self.locks.handle(user_id);
        let _guard = handle.lock().unwrap_or_else(PoisonError::into_inner);

        let (outcome, snapshot) = self.recompute_locked(user_id)?;
        Ok(ScoreReport {
            snapshot,
            weights: outcome.weights,
            details: outcome.details,
        })
    }

    pub fn snapshot(&self, user_id: &UserId) -> Result<UhfsSnapshot, UhfsServiceError> {
        let snapshot = self
            .snapshots
            .fetch(user_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(snapshot)
    }

    /// Stored snapshot, computing and persisting one on first read.
    pub fn snapshot_or_recompute(&self, user_id: &UserId) -> Result<UhfsSnapshot, UhfsServiceError> {
        if let Some(snapshot) = self.snapshots.fetch(user_id)? {
            return Ok(snapshot);
        }

        let handle = self.locks.handle(user_id);
        let _guard = handle.lock().unwrap_or_else(PoisonError::into_inner);

        // Another caller may have finished the first computation while we waited.
        if let Some(snapshot) = self.snapshots.fetch(user_id)? {
            return Ok(snapshot);
        }

        let (_, snapshot) = self.recompute_locked(user_id)?;
        Ok(snapshot)
    }

    /// Remove the user's snapshot as part of account deletion.
    pub fn purge(&self, user_id: &UserId) -> Result<(), UhfsServiceError> {
        let handle = self.locks.handle(user_id);
        let _guard = handle.lock().unwrap_or_else(PoisonError::into_inner);

        self.snapshots.remove(user_id)?;
        info!(user_id = %user_id, "uhfs snapshot purged");
        Ok(())
    }

    fn recompute_locked(
        &self,
        user_id: &UserId,
    ) -> Result<(ScoreOutcome, UhfsSnapshot), UhfsServiceError> {
        let answers = self
            .answers
            .load(user_id)
            .map_err(UhfsServiceError::Answers)?;

        let outcome = self.engine.evaluate(&answers);
        let snapshot = outcome.to_snapshot(user_id.clone(), Utc::now());

        match self.snapshots.upsert(snapshot.clone()) {
            Ok(()) => {
                info!(
                    user_id = %user_id,
                    score = snapshot.score,
                    overall_risk = snapshot.overall_risk.label(),
                    ruleset = %snapshot.ruleset_version,
                    "uhfs snapshot persisted"
                );
                Ok((outcome, snapshot))
            }
            Err(source) => {
                warn!(
                    user_id = %user_id,
                    score = snapshot.score,
                    error = %source,
                    "uhfs snapshot computed but not persisted"
                );
                Err(UhfsServiceError::NotPersisted {
                    snapshot: Box::new(snapshot),
                    source,
                })
            }
        }
    }
}

#[derive(Default)]
struct UserLocks {
    entries: Mutex<HashMap<UserId, Arc<Mutex<()>>>>,
}

impl UserLocks {
    fn handle(&self, user_id: &UserId) -> Arc<Mutex<()>> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);

        if entries.len() >= LOCK_PRUNE_THRESHOLD {
            entries.retain(|_, lock| Arc::strong_count(lock) > 1);
        }

        entries
            .entry(user_id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Error raised by the scoring service. Missing answers are never an error.
#[derive(Debug, thiserror::Error)]
pub enum UhfsServiceError {
    #[error("failed to load answers: {0}")]
    Answers(#[source] RepositoryError),
    #[error("uhfs score for {} was computed but not saved: {source}", .snapshot.user_id)]
    NotPersisted {
        snapshot: Box<UhfsSnapshot>,
        #[source]
        source: RepositoryError,
    },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl UhfsServiceError {
    /// The computed value when the only failure was the write.
    pub fn unpersisted_snapshot(&self) -> Option<&UhfsSnapshot> {
        match self {
            UhfsServiceError::NotPersisted { snapshot, .. } => Some(snapshot),
            _ => None,
        }
    }
}
