use crate::models::ValidationIssue;
use thiserror::Error;

/// Synchronous errors raised by the session controller. Persistence and
/// transport failures never surface through this type; the result sink
/// absorbs them.
#[derive(Debug, Error)]
pub enum QuizError {
    #[error("question set failed validation with {} issue(s)", .0.len())]
    InvalidQuiz(Vec<ValidationIssue>),
    #[error("'{answer}' is not an option for question {index}")]
    InvalidAnswer { index: usize, answer: String },
    #[error("no answer selected for the current question")]
    NoAnswerSelected,
    #[error("already at the first question")]
    AtStart,
    #[error("session is not complete")]
    SessionNotComplete,
    #[error("session is already complete")]
    SessionCompleted,
}
