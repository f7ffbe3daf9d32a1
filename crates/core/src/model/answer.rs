use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use thiserror::Error;

use crate::model::ids::{ChoiceId, QuestionId};
use crate::model::question::{Question, QuestionType};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Reasons an answer does not fit the question it was submitted for.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AnswerError {
    #[error("question {question} expects a {expected} answer, got {got}")]
    WrongKind {
        question: QuestionId,
        expected: QuestionType,
        got: QuestionType,
    },

    #[error("choice {choice} does not belong to question {question}")]
    UnknownChoice {
        question: QuestionId,
        choice: ChoiceId,
    },

    #[error("slider answer for question {question} is not an integer: {value:?}")]
    NotAnInteger { question: QuestionId, value: String },
}

//
// ─── ANSWER ────────────────────────────────────────────────────────────────────
//

/// A submitted answer, tagged by the question type it answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "kebab-case")]
pub enum Answer {
    /// Every selected choice.
    Select(BTreeSet<ChoiceId>),
    /// The single picked choice.
    TrueFalse(ChoiceId),
    /// Choices in the order the user arranged them.
    Ordering(Vec<ChoiceId>),
    /// Slider position as entered, e.g. `"7"`.
    Slider(String),
    /// Typed text.
    FreeText(String),
}

/// Answers collected during a session. A missing key means unanswered.
pub type AnswerMap = HashMap<QuestionId, Answer>;

impl Answer {
    #[must_use]
    pub fn select<I, T>(ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<ChoiceId>,
    {
        Self::Select(ids.into_iter().map(Into::into).collect())
    }

    #[must_use]
    pub fn true_false(id: impl Into<ChoiceId>) -> Self {
        Self::TrueFalse(id.into())
    }

    #[must_use]
    pub fn ordering<I, T>(ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<ChoiceId>,
    {
        Self::Ordering(ids.into_iter().map(Into::into).collect())
    }

    #[must_use]
    pub fn slider(value: impl Into<String>) -> Self {
        Self::Slider(value.into())
    }

    #[must_use]
    pub fn free_text(text: impl Into<String>) -> Self {
        Self::FreeText(text.into())
    }

    /// The question type this answer shape belongs to.
    #[must_use]
    pub fn kind(&self) -> QuestionType {
        match self {
            Answer::Select(_) => QuestionType::Select,
            Answer::TrueFalse(_) => QuestionType::TrueFalse,
            Answer::Ordering(_) => QuestionType::Ordering,
            Answer::Slider(_) => QuestionType::Slider,
            Answer::FreeText(_) => QuestionType::FreeText,
        }
    }

    /// Checks that this answer has the shape `question` expects.
    ///
    /// Only the shape is checked: an incomplete ordering or an empty selection
    /// is accepted here and simply grades as wrong.
    ///
    /// # Errors
    ///
    /// Returns `AnswerError::WrongKind` on a type mismatch,
    /// `AnswerError::UnknownChoice` for ids the question does not offer and
    /// `AnswerError::NotAnInteger` for a non-numeric slider value.
    pub fn validate_for(&self, question: &Question) -> Result<(), AnswerError> {
        if self.kind() != question.kind {
            return Err(AnswerError::WrongKind {
                question: question.id.clone(),
                expected: question.kind,
                got: self.kind(),
            });
        }

        match self {
            Answer::Select(ids) => ensure_known(question, ids.iter()),
            Answer::Ordering(ids) => ensure_known(question, ids.iter()),
            Answer::TrueFalse(id) => ensure_known(question, std::iter::once(id)),
            Answer::Slider(raw) => parse_slider_value(raw).map(|_| ()).ok_or_else(|| {
                AnswerError::NotAnInteger {
                    question: question.id.clone(),
                    value: raw.clone(),
                }
            }),
            Answer::FreeText(_) => Ok(()),
        }
    }
}

fn ensure_known<'a>(
    question: &Question,
    mut ids: impl Iterator<Item = &'a ChoiceId>,
) -> Result<(), AnswerError> {
    match ids.find(|id| !question.has_choice(id)) {
        Some(unknown) => Err(AnswerError::UnknownChoice {
            question: question.id.clone(),
            choice: unknown.clone(),
        }),
        None => Ok(()),
    }
}

/// Parses a slider position, ignoring surrounding whitespace.
#[must_use]
pub fn parse_slider_value(raw: &str) -> Option<i64> {
    raw.trim().parse().ok()
}
