use serde::Serialize;
use tracing::debug;

use super::composite::settle;
use super::domain::{
    Domain, FinancialBehaviorAnswers, IncomeStabilityAnswers, LiteracyRecord,
    ProtectionReadinessAnswers, ReliabilityTenureAnswers,
};
use super::ruleset::{
    FactorLookup, FactorRule, FinancialBehaviorRules, IncomeStabilityRules, LiteracyRules,
    ProtectionReadinessRules, ReliabilityTenureRules,
};

/// Contribution of one questionnaire factor, kept for audits and score breakdowns.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FactorScore {
    pub factor: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    pub score: f64,
    pub weight: f64,
    /// False when the answer was missing or unrecognized and the fallback applied.
    pub matched: bool,
}

/// Normalized sub-score for one domain.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DomainScore {
    pub domain: Domain,
    pub value: f64,
    pub factors: Vec<FactorScore>,
}

struct DomainAccumulator {
    domain: Domain,
    factors: Vec<FactorScore>,
}

impl DomainAccumulator {
    fn new(domain: Domain) -> Self {
        Self {
            domain,
            factors: Vec::with_capacity(4),
        }
    }

    fn push(
        &mut self,
        factor: &'static str,
        rule: &FactorRule,
        answer: Option<String>,
        lookup: FactorLookup,
    ) {
        if !lookup.matched {
            if let Some(answer) = &answer {
                debug!(
                    domain = self.domain.code(),
                    factor,
                    answer = answer.as_str(),
                    fallback = lookup.score,
                    "unrecognized answer, using fallback"
                );
            }
        }

        self.factors.push(FactorScore {
            factor,
            answer,
            score: lookup.score,
            weight: rule.weight,
            matched: lookup.matched,
        });
    }

    fn single(&mut self, factor: &'static str, rule: &FactorRule, answer: Option<&String>) {
        let lookup = rule.lookup(answer.map(String::as_str));
        self.push(factor, rule, answer.cloned(), lookup);
    }

    fn finish(self) -> DomainScore {
        let value = self
            .factors
            .iter()
            .fold(0.0, |total, factor| total + factor.weight * factor.score);

        DomainScore {
            domain: self.domain,
            value: settle(value).clamp(0.0, 1.0),
            factors: self.factors,
        }
    }
}

/// Income Stability (I) = 0.20A + 0.50B + 0.25C + 0.05D under the standard ruleset.
pub fn income_stability(
    answers: Option<&IncomeStabilityAnswers>,
    rules: &IncomeStabilityRules,
) -> DomainScore {
    let answers = answers.cloned().unwrap_or_default();
    let mut acc = DomainAccumulator::new(Domain::Income);

    acc.single(
        "monthly_income",
        &rules.monthly_income,
        answers.monthly_income.as_ref(),
    );
    acc.single(
        "income_drop_frequency",
        &rules.income_drop_frequency,
        answers.income_drop_frequency.as_ref(),
    );
    acc.single(
        "working_days_per_week",
        &rules.working_days_per_week,
        answers.working_days_per_week.as_ref(),
    );
    acc.single(
        "income_trend",
        &rules.income_trend,
        answers.income_trend.as_ref(),
    );

    acc.finish()
}

/// Financial Behavior (F) = 0.40A + 0.10B + 0.30C + 0.20D under the standard ruleset.
pub fn financial_behavior(
    answers: Option<&FinancialBehaviorAnswers>,
    rules: &FinancialBehaviorRules,
) -> DomainScore {
    let answers = answers.cloned().unwrap_or_default();
    let mut acc = DomainAccumulator::new(Domain::FinancialBehavior);

    acc.single(
        "monthly_savings",
        &rules.monthly_savings,
        answers.monthly_savings.as_ref(),
    );

    let methods = rules
        .saving_methods
        .best_of(answers.saving_methods.iter().map(String::as_str));
    let joined = if answers.saving_methods.is_empty() {
        None
    } else {
        Some(answers.saving_methods.join(", "))
    };
    acc.push("saving_methods", &rules.saving_methods, joined, methods);

    acc.single(
        "missed_payments",
        &rules.missed_payments,
        answers.missed_payments.as_ref(),
    );
    acc.single(
        "bill_payment_timeliness",
        &rules.bill_payment_timeliness,
        answers.bill_payment_timeliness.as_ref(),
    );

    acc.finish()
}

/// Reliability & Tenure (R) = 0.40A + 0.30B + 0.20C + 0.10D under the standard ruleset.
pub fn reliability_tenure(
    answers: Option<&ReliabilityTenureAnswers>,
    rules: &ReliabilityTenureRules,
) -> DomainScore {
    let answers = answers.cloned().unwrap_or_default();
    let mut acc = DomainAccumulator::new(Domain::Reliability);

    acc.single(
        "platform_tenure",
        &rules.platform_tenure,
        answers.platform_tenure.as_ref(),
    );
    acc.single(
        "active_days_per_week",
        &rules.active_days_per_week,
        answers.active_days_per_week.as_ref(),
    );
    acc.single(
        "cancellation_frequency",
        &rules.cancellation_frequency,
        answers.cancellation_frequency.as_ref(),
    );

    let rating_key = answers.customer_rating.as_deref().and_then(rating_key);
    let rating = rules.customer_rating.lookup(rating_key.as_deref());
    acc.push(
        "customer_rating",
        &rules.customer_rating,
        answers.customer_rating.clone(),
        rating,
    );

    acc.finish()
}

/// Protection Readiness (P) = 0.30A + 0.30B + 0.30C + 0.10D under the standard ruleset.
pub fn protection_readiness(
    answers: Option<&ProtectionReadinessAnswers>,
    rules: &ProtectionReadinessRules,
) -> DomainScore {
    let answers = answers.cloned().unwrap_or_default();
    let mut acc = DomainAccumulator::new(Domain::Protection);

    acc.single(
        "has_health_insurance",
        &rules.has_health_insurance,
        answers.has_health_insurance.as_ref(),
    );
    acc.single(
        "has_accident_life_insurance",
        &rules.has_accident_life_insurance,
        answers.has_accident_life_insurance.as_ref(),
    );
    acc.single(
        "emergency_expense_handling",
        &rules.emergency_expense_handling,
        answers.emergency_expense_handling.as_ref(),
    );
    acc.single(
        "current_savings_fund",
        &rules.current_savings_fund,
        answers.current_savings_fund.as_ref(),
    );

    acc.finish()
}

/// Financial Literacy (L): normalized quiz average, penalized below the pivot once any module
/// has been completed.
pub fn literacy(record: Option<&LiteracyRecord>, rules: &LiteracyRules) -> DomainScore {
    let record = record.copied().unwrap_or_default();

    let raw = if record.average_quiz_score.is_nan() {
        0.0
    } else {
        record.average_quiz_score
    };
    let quiz_norm = (raw / 100.0).clamp(0.0, 1.0);
    let modules_completed = record.modules_completed.max(0);

    let penalized = modules_completed > 0 && quiz_norm < rules.penalty_pivot;
    let value = if penalized {
        quiz_norm * (quiz_norm / rules.penalty_pivot)
    } else {
        quiz_norm
    };

    DomainScore {
        domain: Domain::Literacy,
        value: settle(value).clamp(0.0, 1.0),
        factors: vec![
            FactorScore {
                factor: "average_quiz_score",
                answer: Some(format!("{raw}")),
                score: quiz_norm,
                weight: 1.0,
                matched: true,
            },
            FactorScore {
                factor: "modules_completed",
                answer: Some(modules_completed.to_string()),
                score: if penalized {
                    quiz_norm / rules.penalty_pivot
                } else {
                    1.0
                },
                weight: 0.0,
                matched: true,
            },
        ],
    }
}

/// Integer form of a rating answer ("4", " 4 ", "4.0" -> "4"); anything else is unparseable.
fn rating_key(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if let Ok(value) = trimmed.parse::<i64>() {
        return Some(value.to_string());
    }

    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() && value.fract() == 0.0 => Some(format!("{value:.0}")),
        _ => None,
    }
}

#[cfg(test)]
pub(crate) fn rating_key_for_tests(raw: &str) -> Option<String> {
    rating_key(raw)
}
