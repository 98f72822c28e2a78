use serde::{Deserialize, Serialize};

use super::domain::Domain;
use super::ruleset::CompositeWeights;

pub const SCORE_FLOOR: u16 = 300;
pub const SCORE_CEILING: u16 = 900;

/// The five normalized sub-scores, serialized under their component codes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DomainScores {
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

impl DomainScores {
    pub fn get(&self, domain: Domain) -> f64 {
        match domain {
            Domain::Income => self.income,
            Domain::FinancialBehavior => self.financial_behavior,
            Domain::Reliability => self.reliability,
            Domain::Protection => self.protection,
            Domain::Literacy => self.literacy,
        }
    }
}

/// Weighted blend of the sub-scores, clamped to [0, 1].
pub fn composite(scores: &DomainScores, weights: &CompositeWeights) -> f64 {
    let blended = Domain::ALL.iter().fold(0.0, |total, domain| {
        total + weights.weight_for(*domain) * scores.get(*domain)
    });

    if blended.is_finite() {
        blended.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Drops accumulated float noise below 1e-9 so weighted sums that are exact on paper
/// (0.55, 718.5) compare and round as written.
pub(crate) fn settle(value: f64) -> f64 {
    (value * 1e9).round() / 1e9
}

/// Maps a composite onto the 300-900 scale. Ties round half to even.
pub fn scale(composite: f64) -> u16 {
    let span = f64::from(SCORE_CEILING - SCORE_FLOOR);
    let composite = if composite.is_finite() { composite } else { 0.0 };
    let raw = settle(f64::from(SCORE_FLOOR) + composite.clamp(0.0, 1.0) * span);
    let raw = raw.round_ties_even();
    raw.clamp(f64::from(SCORE_FLOOR), f64::from(SCORE_CEILING)) as u16
}
