//! Versioned lookup tables, weights and thresholds driving every calculation.
//!
//! Questionnaire schema changes are expressed as a new [`Ruleset`] (built in or loaded from JSON)
//! rather than as new calculator code.

mod standard;

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::domain::Domain;

const WEIGHT_TOLERANCE: f64 = 1e-6;

/// Weighted lookup table for one questionnaire factor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactorRule {
    pub weight: f64,
    pub table: BTreeMap<String, f64>,
    /// Score used when the answer is missing or not in `table`.
    #[serde(default)]
    pub fallback: f64,
}

/// Result of resolving one answer against a [`FactorRule`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FactorLookup {
    pub score: f64,
    pub matched: bool,
}

impl FactorRule {
    pub fn new<const N: usize>(weight: f64, entries: [(&str, f64); N], fallback: f64) -> Self {
        Self {
            weight,
            table: entries
                .into_iter()
                .map(|(label, score)| (label.to_string(), score))
                .collect(),
            fallback,
        }
    }

    pub fn lookup(&self, answer: Option<&str>) -> FactorLookup {
        let hit = answer
            .map(normalize_label)
            .and_then(|label| self.table.get(&label).copied());

        match hit {
            Some(score) => FactorLookup {
                score,
                matched: true,
            },
            None => FactorLookup {
                score: self.fallback,
                matched: false,
            },
        }
    }

    /// Multi-select lookup: the highest mapped value wins, unmatched entries count as fallback.
    pub fn best_of<'a, I>(&self, answers: I) -> FactorLookup
    where
        I: IntoIterator<Item = &'a str>,
    {
        answers
            .into_iter()
            .map(|answer| self.lookup(Some(answer)))
            .fold(None, |best: Option<FactorLookup>, current| match best {
                Some(best) if best.score >= current.score => Some(FactorLookup {
                    score: best.score,
                    matched: best.matched || current.matched,
                }),
                Some(best) => Some(FactorLookup {
                    score: current.score,
                    matched: best.matched || current.matched,
                }),
                None => Some(current),
            })
            .unwrap_or(FactorLookup {
                score: self.fallback,
                matched: false,
            })
    }
}

/// Strips invisible characters and collapses whitespace; labels stay case-sensitive.
pub(crate) fn normalize_label(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Income Stability factors: monthly income (A), drop frequency (B), working days (C), trend (D).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeStabilityRules {
    pub monthly_income: FactorRule,
    pub income_drop_frequency: FactorRule,
    pub working_days_per_week: FactorRule,
    pub income_trend: FactorRule,
}

impl IncomeStabilityRules {
    pub fn factors(&self) -> [(&'static str, &FactorRule); 4] {
        [
            ("monthly_income", &self.monthly_income),
            ("income_drop_frequency", &self.income_drop_frequency),
            ("working_days_per_week", &self.working_days_per_week),
            ("income_trend", &self.income_trend),
        ]
    }
}

/// Financial Behavior factors: savings (A), saving method (B), missed payments (C), bills (D).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialBehaviorRules {
    pub monthly_savings: FactorRule,
    pub saving_methods: FactorRule,
    pub missed_payments: FactorRule,
    pub bill_payment_timeliness: FactorRule,
}

impl FinancialBehaviorRules {
    pub fn factors(&self) -> [(&'static str, &FactorRule); 4] {
        [
            ("monthly_savings", &self.monthly_savings),
            ("saving_methods", &self.saving_methods),
            ("missed_payments", &self.missed_payments),
            ("bill_payment_timeliness", &self.bill_payment_timeliness),
        ]
    }
}

/// Reliability & Tenure factors: tenure (A), active days (B), cancellations (C), rating (D).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReliabilityTenureRules {
    pub platform_tenure: FactorRule,
    pub active_days_per_week: FactorRule,
    pub cancellation_frequency: FactorRule,
    /// Keyed by the rating's integer form ("1".."5").
    pub customer_rating: FactorRule,
}

impl ReliabilityTenureRules {
    pub fn factors(&self) -> [(&'static str, &FactorRule); 4] {
        [
            ("platform_tenure", &self.platform_tenure),
            ("active_days_per_week", &self.active_days_per_week),
            ("cancellation_frequency", &self.cancellation_frequency),
            ("customer_rating", &self.customer_rating),
        ]
    }
}

/// Protection Readiness factors: health cover (A), accident/life cover (B), emergency handling
/// (C), emergency fund (D).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtectionReadinessRules {
    pub has_health_insurance: FactorRule,
    pub has_accident_life_insurance: FactorRule,
    pub emergency_expense_handling: FactorRule,
    pub current_savings_fund: FactorRule,
}

impl ProtectionReadinessRules {
    pub fn factors(&self) -> [(&'static str, &FactorRule); 4] {
        [
            ("has_health_insurance", &self.has_health_insurance),
            ("has_accident_life_insurance", &self.has_accident_life_insurance),
            ("emergency_expense_handling", &self.emergency_expense_handling),
            ("current_savings_fund", &self.current_savings_fund),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LiteracyRules {
    /// Normalized quiz scores below this pivot are penalized once any module is completed.
    pub penalty_pivot: f64,
}

/// Cutoffs for one domain. Scores strictly below a cutoff fall into the riskier bucket.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskThresholds {
    /// `None` means the domain never classifies as High.
    pub high_below: Option<f64>,
    pub medium_below: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskRules {
    pub income: RiskThresholds,
    pub financial_behavior: RiskThresholds,
    pub reliability: RiskThresholds,
    pub protection: RiskThresholds,
    pub literacy: RiskThresholds,
}

impl RiskRules {
    pub fn for_domain(&self, domain: Domain) -> &RiskThresholds {
        match domain {
            Domain::Income => &self.income,
            Domain::FinancialBehavior => &self.financial_behavior,
            Domain::Reliability => &self.reliability,
            Domain::Protection => &self.protection,
            Domain::Literacy => &self.literacy,
        }
    }
}

/// Blend of the five domain sub-scores into the composite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompositeWeights {
    #[serde(rename = "I")]
    pub income: f64,
    #[serde(rename = "F")]
    pub financial_behavior: f64,
    #[serde(rename = "R")]
    pub reliability: f64,
    #[serde(rename = "P")]
    pub protection: f64,
    #[serde(rename = "L")]
    pub literacy: f64,
}

impl CompositeWeights {
    pub fn weight_for(&self, domain: Domain) -> f64 {
        match domain {
            Domain::Income => self.income,
            Domain::FinancialBehavior => self.financial_behavior,
            Domain::Reliability => self.reliability,
            Domain::Protection => self.protection,
            Domain::Literacy => self.literacy,
        }
    }
}

/// Complete, versioned scoring configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ruleset {
    pub version: String,
    pub income_stability: IncomeStabilityRules,
    pub financial_behavior: FinancialBehaviorRules,
    pub reliability_tenure: ReliabilityTenureRules,
    pub protection_readiness: ProtectionReadinessRules,
    pub literacy: LiteracyRules,
    pub risk: RiskRules,
    pub composite: CompositeWeights,
}

impl Ruleset {
    pub const STANDARD_VERSION: &'static str = standard::VERSION;

    /// The consolidated-questionnaire tables (`uhfs-v2`).
    pub fn standard() -> Self {
        standard::ruleset()
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, RulesetError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| RulesetError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, RulesetError> {
        let ruleset: Ruleset = serde_json::from_reader(reader)?;
        ruleset.validate()?;
        Ok(ruleset)
    }

    pub fn validate(&self) -> Result<(), RulesetError> {
        if self.version.trim().is_empty() {
            return Err(RulesetError::MissingVersion);
        }

        validate_factor_group(Domain::Income, &self.income_stability.factors())?;
        validate_factor_group(Domain::FinancialBehavior, &self.financial_behavior.factors())?;
        validate_factor_group(Domain::Reliability, &self.reliability_tenure.factors())?;
        validate_factor_group(Domain::Protection, &self.protection_readiness.factors())?;

        let pivot = self.literacy.penalty_pivot;
        if !(pivot.is_finite() && pivot > 0.0 && pivot <= 1.0) {
            return Err(RulesetError::InvalidPenaltyPivot(pivot));
        }

        for domain in Domain::ALL {
            let thresholds = self.risk.for_domain(domain);
            let within = |value: f64| value.is_finite() && (0.0..=1.0).contains(&value);
            let ordered = thresholds
                .high_below
                .map(|high| within(high) && high <= thresholds.medium_below)
                .unwrap_or(true);
            if !within(thresholds.medium_below) || !ordered {
                return Err(RulesetError::InvalidThresholds { domain });
            }
        }

        let mut composite_sum = 0.0;
        for domain in Domain::ALL {
            let weight = self.composite.weight_for(domain);
            if !weight.is_finite() || weight < 0.0 {
                return Err(RulesetError::NegativeCompositeWeight { domain });
            }
            composite_sum += weight;
        }
        if (composite_sum - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(RulesetError::CompositeWeightSum { sum: composite_sum });
        }

        Ok(())
    }
}

fn validate_factor_group(
    domain: Domain,
    factors: &[(&'static str, &FactorRule)],
) -> Result<(), RulesetError> {
    let mut sum = 0.0;
    for &(factor, rule) in factors {
        if !rule.weight.is_finite() || rule.weight < 0.0 {
            return Err(RulesetError::NegativeWeight { domain, factor });
        }
        sum += rule.weight;

        let out_of_range = rule
            .table
            .iter()
            .map(|(label, score)| (label.as_str(), *score))
            .chain(std::iter::once(("<fallback>", rule.fallback)))
            .find(|(_, score)| !(score.is_finite() && (0.0..=1.0).contains(score)));
        if let Some((label, score)) = out_of_range {
            return Err(RulesetError::ScoreOutOfRange {
                domain,
                factor,
                label: label.to_string(),
                score,
            });
        }
    }

    if (sum - 1.0).abs() > WEIGHT_TOLERANCE {
        return Err(RulesetError::WeightSum { domain, sum });
    }

    Ok(())
}

/// Raised when a ruleset cannot be loaded or would produce scores outside [0, 1].
#[derive(Debug, thiserror::Error)]
pub enum RulesetError {
    #[error("failed to read ruleset {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid ruleset JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("ruleset version must not be empty")]
    MissingVersion,
    #[error("{} factor weights sum to {sum:.4}, expected 1", .domain.label())]
    WeightSum { domain: Domain, sum: f64 },
    #[error("{} factor '{factor}' has a negative or non-finite weight", .domain.label())]
    NegativeWeight { domain: Domain, factor: &'static str },
    #[error("{} factor '{factor}' maps '{label}' to {score}, outside [0, 1]", .domain.label())]
    ScoreOutOfRange {
        domain: Domain,
        factor: &'static str,
        label: String,
        score: f64,
    },
    #[error("literacy penalty pivot {0} must be within (0, 1]")]
    InvalidPenaltyPivot(f64),
    #[error("{} risk thresholds must lie in [0, 1] with high <= medium", .domain.label())]
    InvalidThresholds { domain: Domain },
    #[error("composite weight for {} is negative or non-finite", .domain.label())]
    NegativeCompositeWeight { domain: Domain },
    #[error("composite weights sum to {sum:.4}, expected 1")]
    CompositeWeightSum { sum: f64 },
}
