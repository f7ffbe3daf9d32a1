//! Shared error types for the services crate.

use thiserror::Error;

use quiz_core::model::{AnswerError, QuestionId, QuizError};

/// Errors emitted by quiz sessions.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error(transparent)]
    InvalidQuiz(#[from] QuizError),
    #[error("question {0} is not part of this quiz")]
    UnknownQuestion(QuestionId),
    #[error(transparent)]
    MalformedAnswer(#[from] AnswerError),
    #[error("session already completed")]
    Completed,
}
