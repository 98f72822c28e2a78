use std::io::Read;

use serde::{Deserialize, Deserializer};
use tracing::debug;

use crate::scoring::{
    FinancialBehaviorAnswers, IncomeStabilityAnswers, LiteracyRecord, ProtectionReadinessAnswers,
    ReliabilityTenureAnswers, UserAnswers, UserId,
};

const SAVING_METHOD_SEPARATOR: char = ';';

/// Raised when a questionnaire export cannot be turned into answer records.
#[derive(Debug, thiserror::Error)]
pub enum AnswerImportError {
    #[error("failed to read questionnaire export: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid questionnaire CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("row {row}: {message}")]
    Row { row: usize, message: String },
}

/// Parses a questionnaire export with one row per user into answer records.
///
/// Columns are named after the answer fields; any column may be omitted. A domain whose columns
/// are all blank is treated as not yet answered.
pub fn read_answer_rows<R: Read>(reader: R) -> Result<Vec<(UserId, UserAnswers)>, AnswerImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut rows = Vec::new();

    for (index, record) in csv_reader.deserialize::<AnswerRow>().enumerate() {
        // Header is line 1.
        let row_number = index + 2;
        let row = record?;
        rows.push(row.into_answers(row_number)?);
    }

    Ok(rows)
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AnswerRow {
    #[serde(deserialize_with = "empty_string_as_none")]
    user_id: Option<String>,

    #[serde(deserialize_with = "empty_string_as_none")]
    monthly_income: Option<String>,
    #[serde(deserialize_with = "empty_string_as_none")]
    income_drop_frequency: Option<String>,
    #[serde(deserialize_with = "empty_string_as_none")]
    working_days_per_week: Option<String>,
    #[serde(deserialize_with = "empty_string_as_none")]
    income_trend: Option<String>,

    #[serde(deserialize_with = "empty_string_as_none")]
    monthly_savings: Option<String>,
    #[serde(deserialize_with = "empty_string_as_none")]
    saving_methods: Option<String>,
    #[serde(deserialize_with = "empty_string_as_none")]
    missed_payments: Option<String>,
    #[serde(deserialize_with = "empty_string_as_none")]
    bill_payment_timeliness: Option<String>,

    #[serde(deserialize_with = "empty_string_as_none")]
    platform_tenure: Option<String>,
    #[serde(deserialize_with = "empty_string_as_none")]
    active_days_per_week: Option<String>,
    #[serde(deserialize_with = "empty_string_as_none")]
    cancellation_frequency: Option<String>,
    #[serde(deserialize_with = "empty_string_as_none")]
    customer_rating: Option<String>,

    #[serde(deserialize_with = "empty_string_as_none")]
    has_health_insurance: Option<String>,
    #[serde(deserialize_with = "empty_string_as_none")]
    has_accident_life_insurance: Option<String>,
    #[serde(deserialize_with = "empty_string_as_none")]
    emergency_expense_handling: Option<String>,
    #[serde(deserialize_with = "empty_string_as_none")]
    current_savings_fund: Option<String>,

    #[serde(deserialize_with = "empty_string_as_none")]
    modules_completed: Option<String>,
    #[serde(deserialize_with = "empty_string_as_none")]
    average_quiz_score: Option<String>,
}

impl AnswerRow {
    fn into_answers(self, row: usize) -> Result<(UserId, UserAnswers), AnswerImportError> {
        let user_id = self.user_id.ok_or_else(|| AnswerImportError::Row {
            row,
            message: "user_id is required".to_string(),
        })?;

        let income = IncomeStabilityAnswers {
            monthly_income: self.monthly_income,
            income_drop_frequency: self.income_drop_frequency,
            working_days_per_week: self.working_days_per_week,
            income_trend: self.income_trend,
        };

        let behavior = FinancialBehaviorAnswers {
            monthly_savings: self.monthly_savings,
            saving_methods: split_methods(self.saving_methods.as_deref()),
            missed_payments: self.missed_payments,
            bill_payment_timeliness: self.bill_payment_timeliness,
        };

        let reliability = ReliabilityTenureAnswers {
            platform_tenure: self.platform_tenure,
            active_days_per_week: self.active_days_per_week,
            cancellation_frequency: self.cancellation_frequency,
            customer_rating: self.customer_rating,
        };

        let protection = ProtectionReadinessAnswers {
            has_health_insurance: self.has_health_insurance,
            has_accident_life_insurance: self.has_accident_life_insurance,
            emergency_expense_handling: self.emergency_expense_handling,
            current_savings_fund: self.current_savings_fund,
        };

        let literacy = match (self.modules_completed, self.average_quiz_score) {
            (None, None) => None,
            (modules, quiz) => Some(LiteracyRecord {
                modules_completed: parse_number(row, "modules_completed", modules.as_deref())
                    .trunc() as i64,
                average_quiz_score: parse_number(row, "average_quiz_score", quiz.as_deref()),
            }),
        };

        let answers = UserAnswers {
            income_stability: present(income),
            financial_behavior: present(behavior),
            reliability_tenure: present(reliability),
            protection_readiness: present(protection),
            literacy,
        };

        Ok((UserId(user_id), answers))
    }
}

/// `None` when every field of the record is blank.
fn present<T: Default + PartialEq>(record: T) -> Option<T> {
    if record == T::default() {
        None
    } else {
        Some(record)
    }
}

fn split_methods(raw: Option<&str>) -> Vec<String> {
    raw.map(|value| {
        value
            .split(SAVING_METHOD_SEPARATOR)
            .map(str::trim)
            .filter(|method| !method.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

/// Literacy cells are free-form in spreadsheet exports ("2.0", "n/a"). Anything that is not a
/// number scores as zero instead of rejecting the export.
fn parse_number(row: usize, column: &'static str, raw: Option<&str>) -> f64 {
    let Some(value) = raw else {
        return 0.0;
    };

    match value.parse::<f64>() {
        Ok(number) if !number.is_nan() => number,
        _ => {
            debug!(row, column, value, "non-numeric literacy value, using 0");
            0.0
        }
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const HEADER: &str = "user_id,monthly_income,income_drop_frequency,working_days_per_week,income_trend,\
monthly_savings,saving_methods,missed_payments,bill_payment_timeliness,\
platform_tenure,active_days_per_week,cancellation_frequency,customer_rating,\
has_health_insurance,has_accident_life_insurance,emergency_expense_handling,current_savings_fund,\
modules_completed,average_quiz_score";

    #[test]
    fn rejects_rows_with_unquoted_commas() {
        let csv = format!(
            "{HEADER}\n\
u-1,₹50,000+,Never,Every day,Increased,>₹3,000, Bank ; Cash ,No,Always,>1 year,7,Rarely,5,Yes,Yes,Immediately,\"₹5,000+\",3,100\n"
        );

        let err = read_answer_rows(Cursor::new(csv)).expect_err("unquoted commas shift columns");
        assert!(matches!(err, AnswerImportError::Csv(_)));
    }

    #[test]
    fn parses_quoted_labels_and_splits_saving_methods() {
        let csv = format!(
            "{HEADER}\n\
u-1,\"₹50,000+\",Never,Every day,Increased,\">₹3,000\", Bank ; Cash ,No,Always,>1 year,7,Rarely,5,Yes,Yes,Immediately,\"₹5,000+\",3,100\n"
        );

        let rows = read_answer_rows(Cursor::new(csv)).expect("parse rows");
        assert_eq!(rows.len(), 1);
        let (user_id, answers) = &rows[0];
        assert_eq!(user_id.0, "u-1");

        let income = answers.income_stability.as_ref().expect("income answered");
        assert_eq!(income.monthly_income.as_deref(), Some("₹50,000+"));
        let behavior = answers.financial_behavior.as_ref().expect("behavior answered");
        assert_eq!(behavior.saving_methods, vec!["Bank", "Cash"]);
        let literacy = answers.literacy.expect("literacy present");
        assert_eq!(literacy.modules_completed, 3);
        assert_eq!(literacy.average_quiz_score, 100.0);
    }

    #[test]
    fn blank_domains_are_absent() {
        let csv = "user_id,monthly_income,income_trend,platform_tenure,modules_completed,average_quiz_score\n\
u-2,,,>1 year,,\n\
u-3,\"₹10,001–20,000\",Stable,,,62.5\n";

        let rows = read_answer_rows(Cursor::new(csv)).expect("parse rows");

        let (_, first) = &rows[0];
        assert!(first.income_stability.is_none());
        assert!(first.financial_behavior.is_none());
        assert!(first.literacy.is_none());
        assert_eq!(
            first
                .reliability_tenure
                .as_ref()
                .and_then(|record| record.platform_tenure.as_deref()),
            Some(">1 year")
        );

        let (_, second) = &rows[1];
        assert!(second.income_stability.is_some());
        assert!(second.reliability_tenure.is_none());
        let literacy = second.literacy.expect("quiz score given");
        assert_eq!(literacy.modules_completed, 0);
        assert_eq!(literacy.average_quiz_score, 62.5);
    }

    #[test]
    fn malformed_literacy_cells_do_not_drop_the_export() {
        let csv = "user_id,modules_completed,average_quiz_score\n\
u-1,2.0,80\n\
u-2,1,n/a\n\
u-3,3,100\n";

        let rows = read_answer_rows(Cursor::new(csv)).expect("parse rows");
        assert_eq!(rows.len(), 3);

        let first = rows[0].1.literacy.expect("literacy present");
        assert_eq!(first.modules_completed, 2);
        assert_eq!(first.average_quiz_score, 80.0);

        let second = rows[1].1.literacy.expect("literacy present");
        assert_eq!(second.modules_completed, 1);
        assert_eq!(second.average_quiz_score, 0.0);

        let (user_id, third) = &rows[2];
        assert_eq!(user_id.0, "u-3");
        assert_eq!(third.literacy.map(|record| record.modules_completed), Some(3));
    }

    #[test]
    fn requires_user_id() {
        let csv = "user_id,monthly_income\n ,Never\n";

        match read_answer_rows(Cursor::new(csv)) {
            Err(AnswerImportError::Row { row, .. }) => assert_eq!(row, 2),
            other => panic!("expected row error, got {other:?}"),
        }
    }
}
