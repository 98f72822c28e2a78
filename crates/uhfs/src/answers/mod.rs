//! Batch intake of questionnaire answers exported from the onboarding flow.

pub mod import;

use std::path::Path;

use crate::scoring::{UserAnswers, UserId};

pub use import::{read_answer_rows, AnswerImportError};

pub fn read_answer_file<P: AsRef<Path>>(
    path: P,
) -> Result<Vec<(UserId, UserAnswers)>, AnswerImportError> {
    let file = std::fs::File::open(path)?;
    read_answer_rows(file)
}
