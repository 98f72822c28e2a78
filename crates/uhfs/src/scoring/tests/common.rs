use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::time::Duration;

use axum::response::Response;
use serde_json::Value;

use crate::scoring::domain::{
    FinancialBehaviorAnswers, IncomeStabilityAnswers, LiteracyRecord, ProtectionReadinessAnswers,
    ReliabilityTenureAnswers, UserAnswers, UserId,
};
use crate::scoring::repository::{
    AnswerSource, RepositoryError, SnapshotRepository, UhfsSnapshot,
};
use crate::scoring::{Ruleset, UhfsService};

pub(super) fn user(id: &str) -> UserId {
    UserId(id.to_string())
}

fn text(value: &str) -> Option<String> {
    Some(value.to_string())
}

pub(super) fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

/// Best bucket in every domain.
pub(super) fn maximal_answers() -> UserAnswers {
    UserAnswers {
        income_stability: Some(IncomeStabilityAnswers {
            monthly_income: text("₹50,000+"),
            income_drop_frequency: text("Never"),
            working_days_per_week: text("Every day"),
            income_trend: text("Increased"),
        }),
        financial_behavior: Some(FinancialBehaviorAnswers {
            monthly_savings: text(">₹3,000"),
            saving_methods: vec!["Bank".to_string()],
            missed_payments: text("No"),
            bill_payment_timeliness: text("Always"),
        }),
        reliability_tenure: Some(ReliabilityTenureAnswers {
            platform_tenure: text(">1 year"),
            active_days_per_week: text("7"),
            cancellation_frequency: text("Rarely"),
            customer_rating: text("5"),
        }),
        protection_readiness: Some(ProtectionReadinessAnswers {
            has_health_insurance: text("Yes"),
            has_accident_life_insurance: text("Yes"),
            emergency_expense_handling: text("Immediately"),
            current_savings_fund: text("₹5,000+"),
        }),
        literacy: Some(LiteracyRecord {
            modules_completed: 3,
            average_quiz_score: 100.0,
        }),
    }
}

/// I = 0.6975 (Medium), F = 0.43 (High), R = 0.715 (Low), P = 0.67 (Medium), L ~ 0.357 (High).
pub(super) fn mixed_answers() -> UserAnswers {
    UserAnswers {
        income_stability: Some(IncomeStabilityAnswers {
            monthly_income: text("₹20,001–30,000"),
            income_drop_frequency: text("Once"),
            working_days_per_week: text("5–6 days"),
            income_trend: text("Stable"),
        }),
        financial_behavior: Some(FinancialBehaviorAnswers {
            monthly_savings: text("₹500–1,000"),
            saving_methods: vec!["Cash".to_string(), "Wallet".to_string()],
            missed_payments: text("Yes"),
            bill_payment_timeliness: text("Mostly"),
        }),
        reliability_tenure: Some(ReliabilityTenureAnswers {
            platform_tenure: text("6–12 months"),
            active_days_per_week: text("5–6"),
            cancellation_frequency: text("Sometimes"),
            customer_rating: text("4"),
        }),
        protection_readiness: Some(ProtectionReadinessAnswers {
            has_health_insurance: text("Yes"),
            has_accident_life_insurance: text("Not sure"),
            emergency_expense_handling: text("Within 1 week"),
            current_savings_fund: text("₹501–1,000"),
        }),
        literacy: Some(LiteracyRecord {
            modules_completed: 2,
            average_quiz_score: 50.0,
        }),
    }
}

pub(super) fn build_service() -> (
    UhfsService<MemoryAnswers, MemorySnapshots>,
    Arc<MemoryAnswers>,
    Arc<MemorySnapshots>,
) {
    let answers = Arc::new(MemoryAnswers::default());
    let snapshots = Arc::new(MemorySnapshots::default());
    let service = UhfsService::new(answers.clone(), snapshots.clone(), Ruleset::standard());
    (service, answers, snapshots)
}

#[derive(Default, Clone)]
pub(super) struct MemoryAnswers {
    records: Arc<Mutex<HashMap<UserId, UserAnswers>>>,
}

impl MemoryAnswers {
    pub(super) fn put(&self, user_id: &UserId, answers: UserAnswers) {
        self.records
            .lock()
            .expect("answers mutex poisoned")
            .insert(user_id.clone(), answers);
    }
}

impl AnswerSource for MemoryAnswers {
    fn load(&self, user_id: &UserId) -> Result<UserAnswers, RepositoryError> {
        let guard = self.records.lock().expect("answers mutex poisoned");
        Ok(guard.get(user_id).cloned().unwrap_or_default())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemorySnapshots {
    records: Arc<Mutex<HashMap<UserId, UhfsSnapshot>>>,
    upserts: Arc<AtomicUsize>,
}

impl MemorySnapshots {
    pub(super) fn stored(&self, user_id: &UserId) -> Option<UhfsSnapshot> {
        self.records
            .lock()
            .expect("snapshot mutex poisoned")
            .get(user_id)
            .cloned()
    }

    pub(super) fn upserts(&self) -> usize {
        self.upserts.load(Ordering::SeqCst)
    }
}

impl SnapshotRepository for MemorySnapshots {
    fn fetch(&self, user_id: &UserId) -> Result<Option<UhfsSnapshot>, RepositoryError> {
        Ok(self.stored(user_id))
    }

    fn upsert(&self, snapshot: UhfsSnapshot) -> Result<(), RepositoryError> {
        self.upserts.fetch_add(1, Ordering::SeqCst);
        self.records
            .lock()
            .expect("snapshot mutex poisoned")
            .insert(snapshot.user_id.clone(), snapshot);
        Ok(())
    }

    fn remove(&self, user_id: &UserId) -> Result<(), RepositoryError> {
        self.records
            .lock()
            .expect("snapshot mutex poisoned")
            .remove(user_id);
        Ok(())
    }
}

/// Reads succeed with nothing stored; every write fails.
pub(super) struct ReadOnlySnapshots;

impl SnapshotRepository for ReadOnlySnapshots {
    fn fetch(&self, _user_id: &UserId) -> Result<Option<UhfsSnapshot>, RepositoryError> {
        Ok(None)
    }

    fn upsert(&self, _snapshot: UhfsSnapshot) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("snapshot store read only".to_string()))
    }

    fn remove(&self, _user_id: &UserId) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("snapshot store read only".to_string()))
    }
}

pub(super) struct OfflineSnapshots;

impl SnapshotRepository for OfflineSnapshots {
    fn fetch(&self, _user_id: &UserId) -> Result<Option<UhfsSnapshot>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn upsert(&self, _snapshot: UhfsSnapshot) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn remove(&self, _user_id: &UserId) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) struct OfflineAnswers;

impl AnswerSource for OfflineAnswers {
    fn load(&self, _user_id: &UserId) -> Result<UserAnswers, RepositoryError> {
        Err(RepositoryError::Unavailable("intake store offline".to_string()))
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

/// Answer source whose loads only complete once `expected` loads are in flight together.
/// A load that waits alone past the timeout reports the store as unavailable.
pub(super) struct RendezvousAnswers {
    expected: usize,
    arrived: Mutex<usize>,
    all_arrived: Condvar,
}

impl RendezvousAnswers {
    pub(super) fn new(expected: usize) -> Self {
        Self {
            expected,
            arrived: Mutex::new(0),
            all_arrived: Condvar::new(),
        }
    }
}

impl AnswerSource for RendezvousAnswers {
    fn load(&self, _user_id: &UserId) -> Result<UserAnswers, RepositoryError> {
        let mut arrived = self.arrived.lock().expect("rendezvous mutex poisoned");
        *arrived += 1;
        self.all_arrived.notify_all();

        let (arrived, timeout) = self
            .all_arrived
            .wait_timeout_while(arrived, Duration::from_secs(5), |count| {
                *count < self.expected
            })
            .expect("rendezvous mutex poisoned");
        drop(arrived);

        if timeout.timed_out() {
            return Err(RepositoryError::Unavailable(
                "concurrent load never arrived".to_string(),
            ));
        }
        Ok(UserAnswers::default())
    }
}
