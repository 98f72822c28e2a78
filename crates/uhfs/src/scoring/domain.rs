use serde::{Deserialize, Deserializer, Serialize};

/// Identifier wrapper for scored users.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(pub String);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Income Stability questionnaire (I).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IncomeStabilityAnswers {
    pub monthly_income: Option<String>,
    pub income_drop_frequency: Option<String>,
    pub working_days_per_week: Option<String>,
    pub income_trend: Option<String>,
}

/// Financial Behavior questionnaire (F).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinancialBehaviorAnswers {
    pub monthly_savings: Option<String>,
    /// Multi-select; the best mapped method counts.
    pub saving_methods: Vec<String>,
    pub missed_payments: Option<String>,
    pub bill_payment_timeliness: Option<String>,
}

/// Reliability & Tenure questionnaire (R).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReliabilityTenureAnswers {
    pub platform_tenure: Option<String>,
    pub active_days_per_week: Option<String>,
    pub cancellation_frequency: Option<String>,
    /// Platform customer rating, 1 through 5. Intake may send it as a number or as text.
    #[serde(deserialize_with = "number_or_string")]
    pub customer_rating: Option<String>,
}

/// Protection Readiness questionnaire (P).
///
/// Insurance answers are the canonical Yes / No / "Not sure" flags captured at intake.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProtectionReadinessAnswers {
    pub has_health_insurance: Option<String>,
    pub has_accident_life_insurance: Option<String>,
    pub emergency_expense_handling: Option<String>,
    pub current_savings_fund: Option<String>,
}

/// Training progress maintained by the literacy collaborator (L).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LiteracyRecord {
    pub modules_completed: i64,
    /// Average quiz score on a 0-100 scale.
    pub average_quiz_score: f64,
}

/// Everything the engine reads for one user. Absent records are expected, not errors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserAnswers {
    pub income_stability: Option<IncomeStabilityAnswers>,
    pub financial_behavior: Option<FinancialBehaviorAnswers>,
    pub reliability_tenure: Option<ReliabilityTenureAnswers>,
    pub protection_readiness: Option<ProtectionReadinessAnswers>,
    pub literacy: Option<LiteracyRecord>,
}

impl UserAnswers {
    /// Replaces the record for the domain carried by `update`.
    pub fn apply(&mut self, update: DomainUpdate) {
        match update {
            DomainUpdate::IncomeStability(answers) => self.income_stability = Some(answers),
            DomainUpdate::FinancialBehavior(answers) => self.financial_behavior = Some(answers),
            DomainUpdate::ReliabilityTenure(answers) => self.reliability_tenure = Some(answers),
            DomainUpdate::ProtectionReadiness(answers) => {
                self.protection_readiness = Some(answers)
            }
            DomainUpdate::Literacy(record) => self.literacy = Some(record),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.income_stability.is_none()
            && self.financial_behavior.is_none()
            && self.reliability_tenure.is_none()
            && self.protection_readiness.is_none()
            && self.literacy.is_none()
    }
}

/// A write to one domain's record, as produced by questionnaire intake or training completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "domain", content = "answers", rename_all = "snake_case")]
pub enum DomainUpdate {
    IncomeStability(IncomeStabilityAnswers),
    FinancialBehavior(FinancialBehaviorAnswers),
    ReliabilityTenure(ReliabilityTenureAnswers),
    ProtectionReadiness(ProtectionReadinessAnswers),
    Literacy(LiteracyRecord),
}

impl DomainUpdate {
    pub fn domain(&self) -> Domain {
        match self {
            DomainUpdate::IncomeStability(_) => Domain::Income,
            DomainUpdate::FinancialBehavior(_) => Domain::FinancialBehavior,
            DomainUpdate::ReliabilityTenure(_) => Domain::Reliability,
            DomainUpdate::ProtectionReadiness(_) => Domain::Protection,
            DomainUpdate::Literacy(_) => Domain::Literacy,
        }
    }
}

/// The five scored life areas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Income,
    FinancialBehavior,
    Reliability,
    Protection,
    Literacy,
}

impl Domain {
    pub const ALL: [Domain; 5] = [
        Domain::Income,
        Domain::FinancialBehavior,
        Domain::Reliability,
        Domain::Protection,
        Domain::Literacy,
    ];

    /// Single-letter component key (I, F, R, P, L).
    pub const fn code(self) -> &'static str {
        match self {
            Domain::Income => "I",
            Domain::FinancialBehavior => "F",
            Domain::Reliability => "R",
            Domain::Protection => "P",
            Domain::Literacy => "L",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Domain::Income => "Income Stability",
            Domain::FinancialBehavior => "Financial Behavior",
            Domain::Reliability => "Reliability & Tenure",
            Domain::Protection => "Protection Readiness",
            Domain::Literacy => "Financial Literacy",
        }
    }
}

fn number_or_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(i64),
        Float(f64),
        Text(String),
    }

    let raw = Option::<Raw>::deserialize(deserializer)?;
    Ok(raw.map(|value| match value {
        Raw::Int(number) => number.to_string(),
        Raw::Float(number) => number.to_string(),
        Raw::Text(text) => text,
    }))
}
