use serde::{Deserialize, Serialize};

use super::domain::Domain;
use super::ruleset::{RiskRules, RiskThresholds};
use super::DomainScores;

/// Risk bucket for a domain sub-score or for the user overall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    High,
    Medium,
    Low,
}

impl RiskLevel {
    pub const fn label(self) -> &'static str {
        match self {
            RiskLevel::High => "High",
            RiskLevel::Medium => "Medium",
            RiskLevel::Low => "Low",
        }
    }
}

/// Per-domain risk labels, keyed the way downstream consumers read them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainRisk {
    pub income: RiskLevel,
    pub financial_behavior: RiskLevel,
    pub reliability: RiskLevel,
    pub protection: RiskLevel,
    pub literacy: RiskLevel,
}

impl DomainRisk {
    pub fn classify(scores: &DomainScores, rules: &RiskRules) -> Self {
        let level = |domain: Domain| classify(scores.get(domain), rules.for_domain(domain));

        Self {
            income: level(Domain::Income),
            financial_behavior: level(Domain::FinancialBehavior),
            reliability: level(Domain::Reliability),
            protection: level(Domain::Protection),
            literacy: level(Domain::Literacy),
        }
    }

    pub fn get(&self, domain: Domain) -> RiskLevel {
        match domain {
            Domain::Income => self.income,
            Domain::FinancialBehavior => self.financial_behavior,
            Domain::Reliability => self.reliability,
            Domain::Protection => self.protection,
            Domain::Literacy => self.literacy,
        }
    }

    pub fn levels(&self) -> [RiskLevel; 5] {
        Domain::ALL.map(|domain| self.get(domain))
    }

    pub fn overall(&self) -> RiskLevel {
        overall_risk(self.levels())
    }
}

/// Boundary values belong to the lower-risk bucket.
pub fn classify(score: f64, thresholds: &RiskThresholds) -> RiskLevel {
    if let Some(high_below) = thresholds.high_below {
        if score < high_below {
            return RiskLevel::High;
        }
    }

    if score < thresholds.medium_below {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

/// Two or more High domains make the user High; otherwise two or more domains at Medium or
/// worse make them Medium. A single weak domain does not escalate.
pub fn overall_risk<I>(levels: I) -> RiskLevel
where
    I: IntoIterator<Item = RiskLevel>,
{
    let (high, medium) = levels
        .into_iter()
        .fold((0usize, 0usize), |(high, medium), level| match level {
            RiskLevel::High => (high + 1, medium),
            RiskLevel::Medium => (high, medium + 1),
            RiskLevel::Low => (high, medium),
        });

    if high >= 2 {
        RiskLevel::High
    } else if high + medium >= 2 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}
