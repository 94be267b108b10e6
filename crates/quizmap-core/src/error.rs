//! Diagnosis input errors.
//!
//! The scorer itself degrades gracefully on partial data. These errors are
//! only produced by the validating entry point, for inputs that break the
//! scorer's preconditions outright.

use thiserror::Error;

/// Errors raised when a diagnosis request is structurally invalid.
#[derive(Debug, Error, PartialEq)]
pub enum DiagnosisError {
    /// The quiz has no questions to score against.
    #[error("no questions supplied")]
    NoQuestions,

    /// There is no archetype to match.
    #[error("no results supplied")]
    NoResults,

    /// A quiz must define exactly an X and a Y axis.
    #[error("expected exactly 2 axes, got {0}")]
    AxisCount(usize),

    /// An axis id other than 1 (X) or 2 (Y).
    #[error("unknown axis id: {0}")]
    UnknownAxis(u32),

    /// A rating outside the 1–5 scale.
    #[error("rating {rating} for question '{question_id}' is outside 1..=5")]
    RatingOutOfRange { question_id: String, rating: u8 },

    /// An axis weight outside `[-1, 1]`.
    #[error("weight {weight} on question '{question_id}' is outside [-1, 1]")]
    WeightOutOfRange { question_id: String, weight: f64 },
}

impl DiagnosisError {
    /// Returns `true` if the error concerns respondent data rather than the
    /// quiz definition.
    pub fn is_answer_error(&self) -> bool {
        matches!(self, DiagnosisError::RatingOutOfRange { .. })
    }
}
