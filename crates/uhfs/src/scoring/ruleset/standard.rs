use super::{
    CompositeWeights, FactorRule, FinancialBehaviorRules, IncomeStabilityRules, LiteracyRules,
    ProtectionReadinessRules, ReliabilityTenureRules, RiskRules, RiskThresholds, Ruleset,
};

pub(super) const VERSION: &str = "uhfs-v2";

// Short labels are canonical; long-form labels from the consolidated questionnaire are aliases.
pub(super) fn ruleset() -> Ruleset {
    Ruleset {
        version: VERSION.to_string(),
        income_stability: IncomeStabilityRules {
            monthly_income: FactorRule::new(
                0.20,
                [
                    ("₹5,000–10,000", 0.1),
                    ("₹10,001–20,000", 0.4),
                    ("₹20,001–30,000", 0.6),
                    ("₹30,001–50,000", 0.9),
                    ("₹50,000+", 1.0),
                ],
                0.0,
            ),
            income_drop_frequency: FactorRule::new(
                0.50,
                [
                    ("Never", 1.0),
                    ("Once", 0.7),
                    ("Often", 0.4),
                    ("Almost every month", 0.2),
                ],
                0.0,
            ),
            working_days_per_week: FactorRule::new(
                0.25,
                [
                    ("1–2 days", 0.25),
                    ("3–4 days", 0.5),
                    ("5–6 days", 0.75),
                    ("Every day", 1.0),
                ],
                0.0,
            ),
            // Unknown trend reads as stable.
            income_trend: FactorRule::new(
                0.05,
                [("Increased", 1.0), ("Stable", 0.8), ("Decreased", 0.4)],
                0.8,
            ),
        },
        financial_behavior: FinancialBehaviorRules {
            monthly_savings: FactorRule::new(
                0.40,
                [
                    ("<₹500", 0.2),
                    ("₹500–1,000", 0.5),
                    ("₹1,000–3,000", 0.8),
                    (">₹3,000", 1.0),
                    ("Less than ₹500", 0.2),
                    ("₹500–₹1,000", 0.5),
                    ("₹1,000–₹3,000", 0.8),
                    ("More than ₹3,000", 1.0),
                ],
                0.0,
            ),
            saving_methods: FactorRule::new(
                0.10,
                [
                    ("Bank", 1.0),
                    ("Wallet", 0.8),
                    ("Cash", 0.4),
                    ("Not saving", 0.0),
                    ("Bank account", 1.0),
                    ("Wallet (Paytm, GPay, etc.)", 0.8),
                    ("Cash at home", 0.4),
                    ("Not saving currently", 0.0),
                ],
                0.0,
            ),
            // No answer is treated as no missed payments.
            missed_payments: FactorRule::new(
                0.30,
                [
                    ("Yes", 0.0),
                    ("No", 1.0),
                    ("N/A", 1.0),
                    ("Not applicable", 1.0),
                ],
                1.0,
            ),
            bill_payment_timeliness: FactorRule::new(
                0.20,
                [
                    ("Always", 1.0),
                    ("Mostly", 0.75),
                    ("Sometimes", 0.5),
                    ("Rarely", 0.2),
                ],
                0.0,
            ),
        },
        reliability_tenure: ReliabilityTenureRules {
            platform_tenure: FactorRule::new(
                0.40,
                [
                    ("<3 months", 0.25),
                    ("3–6 months", 0.5),
                    ("6–12 months", 0.75),
                    (">1 year", 1.0),
                    ("Less than 3 months", 0.25),
                    ("More than 1 year", 1.0),
                ],
                0.0,
            ),
            active_days_per_week: FactorRule::new(
                0.30,
                [
                    ("1–2", 0.25),
                    ("3–4", 0.5),
                    ("5–6", 0.75),
                    ("7", 1.0),
                    ("7 days", 1.0),
                ],
                0.0,
            ),
            cancellation_frequency: FactorRule::new(
                0.20,
                [("Rarely", 1.0), ("Sometimes", 0.5), ("Often", 0.2)],
                0.0,
            ),
            customer_rating: FactorRule::new(
                0.10,
                [
                    ("1", 0.25),
                    ("2", 0.5),
                    ("3", 0.75),
                    ("4", 0.9),
                    ("5", 1.0),
                ],
                0.5,
            ),
        },
        protection_readiness: ProtectionReadinessRules {
            has_health_insurance: insurance_rule(),
            has_accident_life_insurance: insurance_rule(),
            emergency_expense_handling: FactorRule::new(
                0.30,
                [
                    ("Immediately", 1.0),
                    ("Within 1 week", 0.8),
                    ("Within 1 month", 0.4),
                    ("Cannot manage", 0.0),
                ],
                0.0,
            ),
            current_savings_fund: FactorRule::new(
                0.10,
                [
                    ("₹0–500", 0.2),
                    ("₹501–1,000", 0.4),
                    ("₹1,001–5,000", 0.7),
                    ("₹5,000+", 1.0),
                ],
                0.0,
            ),
        },
        literacy: LiteracyRules {
            penalty_pivot: 0.70,
        },
        risk: RiskRules {
            income: RiskThresholds {
                high_below: Some(0.45),
                medium_below: 0.70,
            },
            financial_behavior: RiskThresholds {
                high_below: Some(0.50),
                medium_below: 0.75,
            },
            reliability: RiskThresholds {
                high_below: None,
                medium_below: 0.55,
            },
            protection: RiskThresholds {
                high_below: Some(0.50),
                medium_below: 0.75,
            },
            literacy: RiskThresholds {
                high_below: Some(0.50),
                medium_below: 0.75,
            },
        },
        composite: CompositeWeights {
            income: 0.25,
            financial_behavior: 0.25,
            reliability: 0.15,
            protection: 0.20,
            literacy: 0.15,
        },
    }
}

fn insurance_rule() -> FactorRule {
    FactorRule::new(0.30, [("Yes", 1.0), ("No", 0.0), ("Not sure", 0.3)], 0.0)
}
