use serde::{Deserialize, Serialize};

use crate::model::ids::ChoiceId;

//
// ─── SLIDER RANGE ──────────────────────────────────────────────────────────────
//

/// Numeric bounds carried by the single choice of a slider question.
///
/// The builder stores plain JSON numbers, so bounds may be fractional even
/// though submitted slider values are whole numbers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SliderRange {
    pub min: f64,
    pub max: f64,
    pub correct_value: f64,
}

impl SliderRange {
    #[must_use]
    pub fn new(min: f64, max: f64, correct_value: f64) -> Self {
        Self {
            min,
            max,
            correct_value,
        }
    }

    /// Distance between `min` and `max`. Zero for a degenerate range.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.max - self.min
    }

    /// True when a submitted whole number lies within the bounds.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn contains(&self, value: i64) -> bool {
        (self.min..=self.max).contains(&(value as f64))
    }
}

//
// ─── CHOICE ────────────────────────────────────────────────────────────────────
//

/// One answer option of a question.
///
/// The fields are a union of per-type payloads:
/// - `is_correct` is read by select and true/false questions
/// - `order` is the zero-based target position for ordering questions
/// - `min`, `max` and `correct_value` describe a slider
///
/// Free-text questions treat every choice text as an accepted answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Choice {
    pub id: ChoiceId,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub is_correct: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correct_value: Option<f64>,
}

impl Choice {
    #[must_use]
    pub fn new(id: impl Into<ChoiceId>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            is_correct: false,
            order: None,
            min: None,
            max: None,
            correct_value: None,
        }
    }

    /// Builds the bounded choice of a slider question.
    #[must_use]
    pub fn slider(id: impl Into<ChoiceId>, range: SliderRange) -> Self {
        Self {
            min: Some(range.min),
            max: Some(range.max),
            correct_value: Some(range.correct_value),
            ..Self::new(id, "")
        }
    }

    #[must_use]
    pub fn correct(mut self) -> Self {
        self.is_correct = true;
        self
    }

    #[must_use]
    pub fn with_order(mut self, order: usize) -> Self {
        self.order = Some(order);
        self
    }

    /// Returns the slider bounds when all three values are present.
    #[must_use]
    pub fn slider_range(&self) -> Option<SliderRange> {
        Some(SliderRange::new(self.min?, self.max?, self.correct_value?))
    }
}
