use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};
use uhfs::scoring::{
    AnswerSource, DomainUpdate, RepositoryError, SnapshotRepository, UhfsService, UhfsSnapshot,
    UserAnswers, UserId,
};

pub(crate) type ScoringService = UhfsService<InMemoryAnswerStore, InMemorySnapshotStore>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Everything the intake endpoints need: the answer store they write and the service that
/// rescores after each write.
#[derive(Clone)]
pub(crate) struct IntakeState {
    pub(crate) answers: Arc<InMemoryAnswerStore>,
    pub(crate) service: Arc<ScoringService>,
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, RepositoryError> {
    mutex
        .lock()
        .map_err(|_| RepositoryError::Unavailable("in-memory store poisoned".to_string()))
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryAnswerStore {
    records: Arc<Mutex<HashMap<UserId, UserAnswers>>>,
}

impl InMemoryAnswerStore {
    pub(crate) fn apply(&self, user_id: &UserId, update: DomainUpdate) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.records)?;
        guard.entry(user_id.clone()).or_default().apply(update);
        Ok(())
    }

    pub(crate) fn forget(&self, user_id: &UserId) -> Result<bool, RepositoryError> {
        let mut guard = lock(&self.records)?;
        Ok(guard.remove(user_id).is_some())
    }
}

impl AnswerSource for InMemoryAnswerStore {
    fn load(&self, user_id: &UserId) -> Result<UserAnswers, RepositoryError> {
        let guard = lock(&self.records)?;
        Ok(guard.get(user_id).cloned().unwrap_or_default())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemorySnapshotStore {
    records: Arc<Mutex<HashMap<UserId, UhfsSnapshot>>>,
}

impl SnapshotRepository for InMemorySnapshotStore {
    fn fetch(&self, user_id: &UserId) -> Result<Option<UhfsSnapshot>, RepositoryError> {
        let guard = lock(&self.records)?;
        Ok(guard.get(user_id).cloned())
    }

    fn upsert(&self, snapshot: UhfsSnapshot) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.records)?;
        guard.insert(snapshot.user_id.clone(), snapshot);
        Ok(())
    }

    fn remove(&self, user_id: &UserId) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.records)?;
        guard.remove(user_id);
        Ok(())
    }
}
