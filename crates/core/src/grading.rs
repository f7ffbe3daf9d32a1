//! Per-question grading rules.
//!
//! Grading is a pure function of the question, the submitted answer and the
//! quiz-wide point value. Results are not rounded here; rounding happens once
//! when the grades are aggregated into a [`QuizResult`](crate::QuizResult).

use serde::Serialize;
use std::collections::BTreeSet;

use crate::model::{Answer, AnswerMap, ChoiceId, Question, QuestionId, QuestionType, Quiz};
use crate::model::parse_slider_value;

//
// ─── GRADE REPORT ──────────────────────────────────────────────────────────────
//

/// Points awarded for one question.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradeReport {
    pub question_id: QuestionId,
    pub awarded: f64,
    pub possible: f64,
}

impl GradeReport {
    /// True when the question earned every available point.
    #[must_use]
    pub fn is_full_credit(&self) -> bool {
        self.awarded >= self.possible
    }
}

//
// ─── GRADING ───────────────────────────────────────────────────────────────────
//

/// Grades a single answer.
///
/// Returns a value in `[0, points_per_question]`. A missing answer, or an
/// answer whose shape does not match the question type, scores zero.
#[must_use]
pub fn grade(question: &Question, answer: Option<&Answer>, points_per_question: f64) -> f64 {
    let Some(answer) = answer else {
        return 0.0;
    };

    let credit = match question.kind {
        QuestionType::Select => match answer {
            Answer::Select(ids) => all_or_nothing(selection_matches(question, ids)),
            _ => 0.0,
        },
        QuestionType::TrueFalse => match answer {
            Answer::TrueFalse(id) => {
                all_or_nothing(question.correct_choice_ids().first() == Some(&id))
            }
            _ => 0.0,
        },
        QuestionType::Ordering => match answer {
            Answer::Ordering(ids) => all_or_nothing(order_matches(question, ids)),
            _ => 0.0,
        },
        QuestionType::Slider => match answer {
            Answer::Slider(raw) => slider_credit(question, raw),
            _ => 0.0,
        },
        QuestionType::FreeText => match answer {
            Answer::FreeText(text) => all_or_nothing(text_matches(question, text)),
            _ => 0.0,
        },
    };

    points_per_question * credit
}

/// Grades every question of `quiz` against the collected answers, in order.
#[must_use]
pub fn grade_quiz(quiz: &Quiz, answers: &AnswerMap) -> Vec<GradeReport> {
    let possible = quiz.points_per_question();
    quiz.questions
        .iter()
        .map(|question| GradeReport {
            question_id: question.id.clone(),
            awarded: grade(question, answers.get(&question.id), possible),
            possible,
        })
        .collect()
}

fn all_or_nothing(correct: bool) -> f64 {
    if correct { 1.0 } else { 0.0 }
}

fn selection_matches(question: &Question, submitted: &BTreeSet<ChoiceId>) -> bool {
    let correct = question.correct_choice_ids();
    submitted.len() == correct.len() && submitted.iter().all(|id| correct.contains(id))
}

// Every position must hold the choice whose target order is that position.
fn order_matches(question: &Question, submitted: &[ChoiceId]) -> bool {
    submitted.len() == question.choices.len()
        && submitted.iter().enumerate().all(|(position, id)| {
            question
                .choice(id)
                .and_then(|choice| choice.order)
                .is_some_and(|order| order == position)
        })
}

fn slider_credit(question: &Question, raw: &str) -> f64 {
    let (Some(range), Some(value)) = (question.slider_range(), parse_slider_value(raw)) else {
        return 0.0;
    };

    #[allow(clippy::cast_precision_loss)]
    let deviation = (value as f64 - range.correct_value).abs();
    if deviation == 0.0 {
        return 1.0;
    }

    let width = range.width();
    if width <= 0.0 {
        return 0.0;
    }
    (1.0 - deviation / width).max(0.0)
}

// Case-insensitive, surrounding whitespace ignored on both sides.
fn text_matches(question: &Question, submitted: &str) -> bool {
    let submitted = submitted.trim().to_lowercase();
    if submitted.is_empty() {
        return false;
    }
    question
        .choices
        .iter()
        .any(|choice| choice.text.trim().to_lowercase() == submitted)
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
