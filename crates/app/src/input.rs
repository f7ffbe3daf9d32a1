//! Turns a line typed at the prompt into an [`Answer`].

use std::fmt;

use quiz_core::model::{Answer, ChoiceId, Question, QuestionType, parse_slider_value};

#[derive(Debug, Clone, PartialEq)]
pub enum InputError {
    NoChoices,
    UnknownChoice(String),
    TooManyChoices,
    OutOfRange { min: f64, max: f64 },
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputError::NoChoices => write!(f, "enter at least one choice"),
            InputError::UnknownChoice(token) => write!(f, "no choice matches {token:?}"),
            InputError::TooManyChoices => write!(f, "pick exactly one choice"),
            InputError::OutOfRange { min, max } => {
                write!(f, "pick a value between {min} and {max}")
            }
        }
    }
}

impl std::error::Error for InputError {}

/// Parses `line` according to the question type.
///
/// Choices may be referred to by id or by their one-based position in the
/// list. Lists accept commas and/or spaces as separators. Slider values must
/// lie within the slider bounds, like the on-screen slider; non-numeric ones
/// are passed through and rejected by the session.
pub fn parse_answer(question: &Question, line: &str) -> Result<Answer, InputError> {
    match question.kind {
        QuestionType::Select => {
            let ids = resolve_all(question, line)?;
            Ok(Answer::Select(ids.into_iter().collect()))
        }
        QuestionType::Ordering => Ok(Answer::Ordering(resolve_all(question, line)?)),
        QuestionType::TrueFalse => {
            let mut ids = resolve_all(question, line)?;
            if ids.len() > 1 {
                return Err(InputError::TooManyChoices);
            }
            ids.pop().map(Answer::TrueFalse).ok_or(InputError::NoChoices)
        }
        QuestionType::Slider => {
            let raw = line.trim();
            let outside = question
                .slider_range()
                .zip(parse_slider_value(raw))
                .filter(|(range, value)| !range.contains(*value));
            if let Some((range, _)) = outside {
                return Err(InputError::OutOfRange {
                    min: range.min,
                    max: range.max,
                });
            }
            Ok(Answer::slider(raw))
        }
        QuestionType::FreeText => Ok(Answer::free_text(line)),
    }
}

fn resolve_all(question: &Question, line: &str) -> Result<Vec<ChoiceId>, InputError> {
    let ids = line
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .map(|token| resolve_choice(question, token))
        .collect::<Result<Vec<_>, _>>()?;
    if ids.is_empty() {
        return Err(InputError::NoChoices);
    }
    Ok(ids)
}

fn resolve_choice(question: &Question, token: &str) -> Result<ChoiceId, InputError> {
    if let Some(choice) = question.choices.iter().find(|c| c.id.as_str() == token) {
        return Ok(choice.id.clone());
    }

    token
        .parse::<usize>()
        .ok()
        .and_then(|position| position.checked_sub(1))
        .and_then(|index| question.choices.get(index))
        .map(|choice| choice.id.clone())
        .ok_or_else(|| InputError::UnknownChoice(token.to_string()))
}
