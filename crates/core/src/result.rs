use serde::Serialize;

use crate::grading::GradeReport;

/// Final outcome of a quiz session.
///
/// Built once from the per-question grades. The score is the rounded sum of
/// all grades, so slider partial credit is only rounded at this point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuizResult {
    total_score: u32,
    total_possible_points: f64,
    percentage_correct: u32,
    grades: Vec<GradeReport>,
}

impl QuizResult {
    /// Aggregates per-question grades.
    ///
    /// The sum is rounded half-up to a whole score and kept within
    /// `[0, total_possible_points]`. With fractional points the ceiling is the
    /// largest whole score that fits. With no grades the total and the
    /// percentage are both zero.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn from_grades(grades: Vec<GradeReport>, points_per_question: f64) -> Self {
        let total_possible_points = points_per_question * grades.len() as f64;

        let sum: f64 = grades.iter().map(|grade| grade.awarded).sum();
        let total_score = round_half_up(sum, total_possible_points);

        let percentage_correct = if total_possible_points > 0.0 {
            let ratio = f64::from(total_score) / total_possible_points;
            round_half_up(100.0 * ratio, 100.0)
        } else {
            0
        };

        Self {
            total_score,
            total_possible_points,
            percentage_correct,
            grades,
        }
    }

    #[must_use]
    pub fn total_score(&self) -> u32 {
        self.total_score
    }

    #[must_use]
    pub fn total_possible_points(&self) -> f64 {
        self.total_possible_points
    }

    /// Whole-number percentage of the possible points that were earned.
    #[must_use]
    pub fn percentage_correct(&self) -> u32 {
        self.percentage_correct
    }

    #[must_use]
    pub fn grades(&self) -> &[GradeReport] {
        &self.grades
    }

    /// Number of questions that earned full credit.
    #[must_use]
    pub fn fully_correct(&self) -> usize {
        self.grades.iter().filter(|grade| grade.is_full_credit()).count()
    }
}

// Half-up for the non-negative values grading produces.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn round_half_up(value: f64, ceiling: f64) -> u32 {
    if !value.is_finite() || !ceiling.is_finite() {
        return 0;
    }
    (value + 0.5).floor().clamp(0.0, ceiling.floor().max(0.0)) as u32
}
