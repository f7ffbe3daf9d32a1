use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use crate::model::ids::{ChoiceId, QuestionId};
use crate::model::question::Question;

/// Time limit applied when a quiz does not configure one.
pub const DEFAULT_TIME_LIMIT_SECS: u32 = 30;

/// Points awarded per question when a quiz does not configure a value.
pub const DEFAULT_POINTS_PER_QUESTION: f64 = 10.0;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum QuizError {
    #[error("quiz has no questions")]
    NoQuestions,

    #[error("question {0} has no choices")]
    NoChoices(QuestionId),

    #[error("question id {0} is used more than once")]
    DuplicateQuestion(QuestionId),

    #[error("question {question} lists choice id {choice} more than once")]
    DuplicateChoice {
        question: QuestionId,
        choice: ChoiceId,
    },

    #[error("slider question {0} has no choice carrying min, max and correct value")]
    MissingSliderRange(QuestionId),

    #[error("slider question {id} has min {min} greater than max {max}")]
    InvertedSliderRange { id: QuestionId, min: f64, max: f64 },

    #[error("true/false question {id} must have exactly one correct choice, found {found}")]
    TrueFalseCorrectCount { id: QuestionId, found: usize },

    #[error("quiz definition could not be read: {0}")]
    Parse(String),
}

//
// ─── QUIZ ──────────────────────────────────────────────────────────────────────
//

/// A fully assembled quiz as handed over by the builder.
///
/// Time limit and points are quiz-wide: every question is worth the same
/// number of points and gets the same countdown. Points may be fractional;
/// the time limit is a whole number of seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_limit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<f64>,
}

impl Quiz {
    #[must_use]
    pub fn new(title: impl Into<String>, questions: Vec<Question>) -> Self {
        Self {
            title: title.into(),
            questions,
            time_limit: None,
            points: None,
        }
    }

    #[must_use]
    pub fn with_time_limit(mut self, secs: u32) -> Self {
        self.time_limit = Some(secs);
        self
    }

    #[must_use]
    pub fn with_points(mut self, points: f64) -> Self {
        self.points = Some(points);
        self
    }

    /// Parses a quiz definition from builder JSON and validates it.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Parse` for malformed JSON and any error from
    /// [`Quiz::validate`].
    pub fn from_json(raw: &str) -> Result<Self, QuizError> {
        let quiz: Self =
            serde_json::from_str(raw).map_err(|err| QuizError::Parse(err.to_string()))?;
        quiz.validate()?;
        Ok(quiz)
    }

    /// Countdown length per question. Unset or zero falls back to 30 seconds.
    #[must_use]
    pub fn time_limit_secs(&self) -> u32 {
        self.time_limit
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_TIME_LIMIT_SECS)
    }

    /// Points per question. Unset, zero or negative falls back to 10.
    #[must_use]
    pub fn points_per_question(&self) -> f64 {
        self.points
            .filter(|points| points.is_finite() && *points > 0.0)
            .unwrap_or(DEFAULT_POINTS_PER_QUESTION)
    }

    #[must_use]
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn question(&self, id: &QuestionId) -> Option<&Question> {
        self.questions.iter().find(|question| &question.id == id)
    }

    #[must_use]
    pub fn question_at(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    /// Checks that the quiz can be taken and graded.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NoQuestions` for an empty quiz,
    /// `QuizError::DuplicateQuestion` when two questions share an id, and any
    /// error from [`Question::validate`].
    pub fn validate(&self) -> Result<(), QuizError> {
        if self.questions.is_empty() {
            return Err(QuizError::NoQuestions);
        }

        let mut seen = HashSet::with_capacity(self.questions.len());
        for question in &self.questions {
            if !seen.insert(&question.id) {
                return Err(QuizError::DuplicateQuestion(question.id.clone()));
            }
            question.validate()?;
        }

        Ok(())
    }
}
