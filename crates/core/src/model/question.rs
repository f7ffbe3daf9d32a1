use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fmt;

use crate::model::choice::{Choice, SliderRange};
use crate::model::ids::{ChoiceId, QuestionId};
use crate::model::quiz::QuizError;

//
// ─── QUESTION TYPE ─────────────────────────────────────────────────────────────
//

/// The five supported question types.
///
/// Serialized with kebab-case tags. The tags emitted by the quiz builder
/// (`quiz`, `vrai-faux`, `puzzle`, `curseur`, `reponse-libre`) are accepted
/// as aliases when reading a definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuestionType {
    /// Single or multiple choice; every correct choice must be selected.
    #[serde(rename = "select", alias = "quiz")]
    Select,
    /// Exactly one correct choice.
    #[serde(rename = "true-false", alias = "vrai-faux")]
    TrueFalse,
    /// Drag-to-sequence; each choice carries its target position.
    #[serde(rename = "ordering", alias = "puzzle")]
    Ordering,
    /// Numeric range with partial credit.
    #[serde(rename = "slider", alias = "curseur")]
    Slider,
    /// Typed answer matched against the choice texts.
    #[serde(rename = "free-text", alias = "reponse-libre")]
    FreeText,
}

impl QuestionType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            QuestionType::Select => "select",
            QuestionType::TrueFalse => "true-false",
            QuestionType::Ordering => "ordering",
            QuestionType::Slider => "slider",
            QuestionType::FreeText => "free-text",
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A single question of a quiz together with its answer choices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: QuestionId,
    #[serde(default)]
    pub text: String,
    #[serde(rename = "type")]
    pub kind: QuestionType,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub image_urls: Vec<String>,
    #[serde(default)]
    pub choices: Vec<Choice>,
}

impl Question {
    #[must_use]
    pub fn new(
        id: impl Into<QuestionId>,
        text: impl Into<String>,
        kind: QuestionType,
        choices: Vec<Choice>,
    ) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            kind,
            image_urls: Vec::new(),
            choices,
        }
    }

    #[must_use]
    pub fn choice(&self, id: &ChoiceId) -> Option<&Choice> {
        self.choices.iter().find(|choice| &choice.id == id)
    }

    #[must_use]
    pub fn has_choice(&self, id: &ChoiceId) -> bool {
        self.choice(id).is_some()
    }

    /// Ids of every choice flagged as correct.
    #[must_use]
    pub fn correct_choice_ids(&self) -> BTreeSet<&ChoiceId> {
        self.choices
            .iter()
            .filter(|choice| choice.is_correct)
            .map(|choice| &choice.id)
            .collect()
    }

    /// Bounds of the first choice that carries a complete slider range.
    #[must_use]
    pub fn slider_range(&self) -> Option<SliderRange> {
        self.choices.iter().find_map(Choice::slider_range)
    }

    /// Checks the invariants grading relies on.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NoChoices` for a question without choices,
    /// `QuizError::DuplicateChoice` when two choices share an id,
    /// `QuizError::MissingSliderRange` / `QuizError::InvertedSliderRange` for a
    /// slider without usable bounds and `QuizError::TrueFalseCorrectCount`
    /// when a true/false question does not have exactly one correct choice.
    pub fn validate(&self) -> Result<(), QuizError> {
        if self.choices.is_empty() {
            return Err(QuizError::NoChoices(self.id.clone()));
        }

        let mut seen = HashSet::with_capacity(self.choices.len());
        if let Some(choice) = self.choices.iter().find(|choice| !seen.insert(&choice.id)) {
            return Err(QuizError::DuplicateChoice {
                question: self.id.clone(),
                choice: choice.id.clone(),
            });
        }

        match self.kind {
            QuestionType::Slider => {
                let range = self
                    .slider_range()
                    .ok_or_else(|| QuizError::MissingSliderRange(self.id.clone()))?;
                if range.min > range.max {
                    return Err(QuizError::InvertedSliderRange {
                        id: self.id.clone(),
                        min: range.min,
                        max: range.max,
                    });
                }
            }
            QuestionType::TrueFalse => {
                let found = self.correct_choice_ids().len();
                if found != 1 {
                    return Err(QuizError::TrueFalseCorrectCount {
                        id: self.id.clone(),
                        found,
                    });
                }
            }
            QuestionType::Select | QuestionType::Ordering | QuestionType::FreeText => {}
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_tags_are_accepted_as_aliases() {
        let cases = [
            ("\"quiz\"", QuestionType::Select),
            ("\"vrai-faux\"", QuestionType::TrueFalse),
            ("\"puzzle\"", QuestionType::Ordering),
            ("\"curseur\"", QuestionType::Slider),
            ("\"reponse-libre\"", QuestionType::FreeText),
            ("\"free-text\"", QuestionType::FreeText),
        ];
        for (raw, expected) in cases {
            let parsed: QuestionType = serde_json::from_str(raw).unwrap();
            assert_eq!(parsed, expected, "tag {raw}");
        }
        assert_eq!(
            serde_json::to_string(&QuestionType::TrueFalse).unwrap(),
            "\"true-false\""
        );
    }

    #[test]
    fn question_without_choices_is_invalid() {
        let question = Question::new("q1", "Empty", QuestionType::Select, Vec::new());
        assert_eq!(
            question.validate().unwrap_err(),
            QuizError::NoChoices(QuestionId::from("q1"))
        );
    }

    #[test]
    fn true_false_needs_exactly_one_correct_choice() {
        let question = Question::new(
            "q1",
            "Sky is blue",
            QuestionType::TrueFalse,
            vec![Choice::new("t", "True").correct(), Choice::new("f", "False").correct()],
        );
        assert!(matches!(
            question.validate(),
            Err(QuizError::TrueFalseCorrectCount { found: 2, .. })
        ));
    }

    #[test]
    fn slider_needs_ordered_bounds() {
        let missing = Question::new(
            "q1",
            "Pick",
            QuestionType::Slider,
            vec![Choice::new("s", "")],
        );
        assert!(matches!(
            missing.validate(),
            Err(QuizError::MissingSliderRange(_))
        ));

        let inverted = Question::new(
            "q2",
            "Pick",
            QuestionType::Slider,
            vec![Choice::slider("s", SliderRange::new(10.0, 0.5, 5.0))],
        );
        assert_eq!(
            inverted.validate().unwrap_err(),
            QuizError::InvertedSliderRange {
                id: QuestionId::from("q2"),
                min: 10.0,
                max: 0.5,
            }
        );
    }

    #[test]
    fn repeated_choice_id_is_rejected() {
        // With two "b" entries no submitted ordering could ever match.
        let question = Question::new(
            "q1",
            "Sort",
            QuestionType::Ordering,
            vec![
                Choice::new("a", "first").with_order(0),
                Choice::new("b", "second").with_order(1),
                Choice::new("b", "third").with_order(2),
            ],
        );
        assert_eq!(
            question.validate().unwrap_err(),
            QuizError::DuplicateChoice {
                question: QuestionId::from("q1"),
                choice: ChoiceId::from("b"),
            }
        );
    }

    #[test]
    fn correct_choice_ids_lists_flagged_choices() {
        let question = Question::new(
            "q1",
            "Primes",
            QuestionType::Select,
            vec![
                Choice::new("a", "2").correct(),
                Choice::new("b", "4"),
                Choice::new("c", "5").correct(),
            ],
        );
        let ids: Vec<_> = question.correct_choice_ids().into_iter().cloned().collect();
        assert_eq!(ids, vec![ChoiceId::from("a"), ChoiceId::from("c")]);
    }
}
