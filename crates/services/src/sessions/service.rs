use chrono::{DateTime, Utc};
use std::fmt;

use quiz_core::model::{Answer, AnswerMap, Question, QuestionId, Quiz};
use quiz_core::{QuizResult, grade_quiz};

use super::progress::SessionProgress;
use crate::error::SessionError;

//
// ─── STATES & TRANSITIONS ──────────────────────────────────────────────────────
//

/// Where a session currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Question `index` is on screen with `remaining_secs` left on the countdown.
    Active { index: usize, remaining_secs: u32 },
    /// Every question has been graded.
    Terminal { final_score: u32 },
}

/// Outcome of moving past the current question.
#[derive(Debug, Clone, PartialEq)]
pub enum Advance {
    /// The session moved on to question `index`.
    Next { index: usize },
    /// The last question was left; the quiz has been graded.
    Finished(QuizResult),
}

/// Outcome of one countdown tick.
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    Counting { remaining_secs: u32 },
    /// Time ran out and the session advanced as if "next" had been pressed.
    Expired(Advance),
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// In-memory, forward-only walk through a quiz.
///
/// Answers can be submitted for any question while the session is active.
/// Leaving the last question grades every question exactly once and moves the
/// session to [`SessionState::Terminal`]; after that every transition is
/// rejected with [`SessionError::Completed`].
pub struct QuizSession {
    quiz: Quiz,
    answers: AnswerMap,
    state: SessionState,
    result: Option<QuizResult>,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl QuizSession {
    /// Create a session positioned on the first question.
    ///
    /// `started_at` should come from the services layer clock to keep time deterministic.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidQuiz` if the quiz cannot be taken.
    pub fn new(quiz: Quiz, started_at: DateTime<Utc>) -> Result<Self, SessionError> {
        quiz.validate()?;

        let state = SessionState::Active {
            index: 0,
            remaining_secs: quiz.time_limit_secs(),
        };
        log::info!(
            "starting quiz session {:?} with {} questions",
            quiz.title,
            quiz.question_count()
        );

        Ok(Self {
            quiz,
            answers: AnswerMap::new(),
            state,
            result: None,
            started_at,
            completed_at: None,
        })
    }

    #[must_use]
    pub fn quiz(&self) -> &Quiz {
        &self.quiz
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn answers(&self) -> &AnswerMap {
        &self.answers
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        matches!(self.state, SessionState::Terminal { .. })
    }

    /// Index of the question on screen, `None` once complete.
    #[must_use]
    pub fn current_index(&self) -> Option<usize> {
        match self.state {
            SessionState::Active { index, .. } => Some(index),
            SessionState::Terminal { .. } => None,
        }
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.current_index()
            .and_then(|index| self.quiz.question_at(index))
    }

    #[must_use]
    pub fn remaining_secs(&self) -> Option<u32> {
        match self.state {
            SessionState::Active { remaining_secs, .. } => Some(remaining_secs),
            SessionState::Terminal { .. } => None,
        }
    }

    #[must_use]
    pub fn is_last_question(&self) -> bool {
        self.current_index()
            .is_some_and(|index| index + 1 == self.quiz.question_count())
    }

    /// The graded result, available once the session is complete.
    #[must_use]
    pub fn result(&self) -> Option<&QuizResult> {
        self.result.as_ref()
    }

    /// Returns a summary of the current session progress.
    #[must_use]
    pub fn progress(&self) -> SessionProgress {
        let total = self.quiz.question_count();
        SessionProgress {
            position: self.current_index().map_or(total, |index| index + 1),
            total,
            answered: self.answers.len(),
            remaining_secs: self.remaining_secs(),
            is_complete: self.is_complete(),
        }
    }

    /// Record (or replace) the answer for a question.
    ///
    /// Does not move the session or touch the countdown.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Completed` once the session is finished,
    /// `SessionError::UnknownQuestion` for an id outside the quiz and
    /// `SessionError::MalformedAnswer` when the answer does not fit the question.
    pub fn submit_answer(
        &mut self,
        question_id: &QuestionId,
        answer: Answer,
    ) -> Result<(), SessionError> {
        if self.is_complete() {
            return Err(SessionError::Completed);
        }

        let question = self
            .quiz
            .question(question_id)
            .ok_or_else(|| SessionError::UnknownQuestion(question_id.clone()))?;
        answer.validate_for(question)?;

        log::debug!("answer recorded for question {question_id}");
        self.answers.insert(question_id.clone(), answer);
        Ok(())
    }

    /// Move past the current question.
    ///
    /// On the last question this grades the whole quiz and completes the
    /// session; otherwise the next question gets a fresh countdown.
    /// `at` should come from the services layer clock.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Completed` if the session is already finished.
    pub fn advance(&mut self, at: DateTime<Utc>) -> Result<Advance, SessionError> {
        let SessionState::Active { index, .. } = self.state else {
            return Err(SessionError::Completed);
        };

        let next = index + 1;
        if next < self.quiz.question_count() {
            self.state = SessionState::Active {
                index: next,
                remaining_secs: self.quiz.time_limit_secs(),
            };
            log::debug!("advanced to question {next}");
            return Ok(Advance::Next { index: next });
        }

        Ok(Advance::Finished(self.finish(at)))
    }

    /// Count one second off the current question.
    ///
    /// When the last second runs out the session advances exactly like
    /// [`QuizSession::advance`].
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Completed` if the session is already finished.
    pub fn tick(&mut self, at: DateTime<Utc>) -> Result<TickOutcome, SessionError> {
        let SessionState::Active {
            index,
            remaining_secs,
        } = self.state
        else {
            return Err(SessionError::Completed);
        };

        if remaining_secs <= 1 {
            log::debug!("time is up on question {index}");
            return self.advance(at).map(TickOutcome::Expired);
        }

        let remaining_secs = remaining_secs - 1;
        self.state = SessionState::Active {
            index,
            remaining_secs,
        };
        Ok(TickOutcome::Counting { remaining_secs })
    }

    fn finish(&mut self, at: DateTime<Utc>) -> QuizResult {
        let grades = grade_quiz(&self.quiz, &self.answers);
        let result = QuizResult::from_grades(grades, self.quiz.points_per_question());

        self.state = SessionState::Terminal {
            final_score: result.total_score(),
        };
        self.completed_at = Some(at);
        self.result = Some(result.clone());

        log::info!(
            "quiz {:?} finished: {}/{} points ({}%)",
            self.quiz.title,
            result.total_score(),
            result.total_possible_points(),
            result.percentage_correct()
        );
        result
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("title", &self.quiz.title)
            .field("questions_len", &self.quiz.question_count())
            .field("answers_len", &self.answers.len())
            .field("state", &self.state)
            .field("started_at", &self.started_at)
            .field("completed_at", &self.completed_at)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{AnswerError, Choice, QuestionType, QuizError, SliderRange};
    use crate::clock::fixed_now;

    fn build_quiz() -> Quiz {
        Quiz::new(
            "Basics",
            vec![
                Question::new(
                    "q1",
                    "The earth is round",
                    QuestionType::TrueFalse,
                    vec![Choice::new("a", "True").correct(), Choice::new("b", "False")],
                ),
                Question::new(
                    "q2",
                    "Pick five",
                    QuestionType::Slider,
                    vec![Choice::slider("s", SliderRange::new(0.0, 10.0, 5.0))],
                ),
            ],
        )
        .with_time_limit(3)
        .with_points(10.0)
    }

    fn qid(id: &str) -> QuestionId {
        QuestionId::from(id)
    }

    #[test]
    fn session_starts_on_first_question_with_full_time() {
        let session = QuizSession::new(build_quiz(), fixed_now()).unwrap();
        assert_eq!(
            session.state(),
            SessionState::Active {
                index: 0,
                remaining_secs: 3
            }
        );
        assert_eq!(session.current_question().unwrap().id, qid("q1"));
        assert!(session.result().is_none());
        assert_eq!(session.started_at(), fixed_now());
    }

    #[test]
    fn invalid_quiz_is_rejected() {
        let err = QuizSession::new(Quiz::new("Empty", Vec::new()), fixed_now()).unwrap_err();
        assert!(matches!(err, SessionError::InvalidQuiz(QuizError::NoQuestions)));

        let no_choices = Quiz::new(
            "No choices",
            vec![Question::new("q1", "?", QuestionType::FreeText, Vec::new())],
        );
        let err = QuizSession::new(no_choices, fixed_now()).unwrap_err();
        assert!(matches!(err, SessionError::InvalidQuiz(QuizError::NoChoices(_))));
    }

    #[test]
    fn submit_replaces_previous_answer_only_for_that_question() {
        let mut session = QuizSession::new(build_quiz(), fixed_now()).unwrap();
        session
            .submit_answer(&qid("q1"), Answer::true_false("b"))
            .unwrap();
        session.submit_answer(&qid("q2"), Answer::slider("3")).unwrap();
        session
            .submit_answer(&qid("q1"), Answer::true_false("a"))
            .unwrap();

        assert_eq!(session.answers().get(&qid("q1")), Some(&Answer::true_false("a")));
        assert_eq!(session.answers().get(&qid("q2")), Some(&Answer::slider("3")));
        assert_eq!(session.current_index(), Some(0));
        assert_eq!(session.remaining_secs(), Some(3));
    }

    #[test]
    fn submit_rejects_unknown_question_and_malformed_answer() {
        let mut session = QuizSession::new(build_quiz(), fixed_now()).unwrap();

        let err = session
            .submit_answer(&qid("nope"), Answer::true_false("a"))
            .unwrap_err();
        assert!(matches!(err, SessionError::UnknownQuestion(ref id) if id == &qid("nope")));

        let err = session
            .submit_answer(&qid("q2"), Answer::true_false("a"))
            .unwrap_err();
        assert!(matches!(
            err,
            SessionError::MalformedAnswer(AnswerError::WrongKind { .. })
        ));
        assert!(session.answers().is_empty());
    }

    #[test]
    fn advance_resets_countdown_and_finishes_once() {
        let mut session = QuizSession::new(build_quiz(), fixed_now()).unwrap();
        session.tick(fixed_now()).unwrap();
        assert_eq!(session.remaining_secs(), Some(2));

        assert_eq!(
            session.advance(fixed_now()).unwrap(),
            Advance::Next { index: 1 }
        );
        assert_eq!(session.remaining_secs(), Some(3));
        assert!(session.is_last_question());

        let Advance::Finished(result) = session.advance(fixed_now()).unwrap() else {
            panic!("expected the session to finish");
        };
        assert_eq!(result.total_score(), 0);
        assert!(session.is_complete());
        assert_eq!(session.completed_at(), Some(fixed_now()));

        let err = session.advance(fixed_now()).unwrap_err();
        assert!(matches!(err, SessionError::Completed));
        assert_eq!(session.state(), SessionState::Terminal { final_score: 0 });
    }

    #[test]
    fn submit_after_completion_is_rejected() {
        let mut session = QuizSession::new(build_quiz(), fixed_now()).unwrap();
        session.advance(fixed_now()).unwrap();
        session.advance(fixed_now()).unwrap();

        let err = session
            .submit_answer(&qid("q1"), Answer::true_false("a"))
            .unwrap_err();
        assert!(matches!(err, SessionError::Completed));
        assert_eq!(session.result().unwrap().total_score(), 0);
    }

    #[test]
    fn expiring_tick_advances_like_next() {
        let mut session = QuizSession::new(build_quiz(), fixed_now()).unwrap();
        assert_eq!(
            session.tick(fixed_now()).unwrap(),
            TickOutcome::Counting { remaining_secs: 2 }
        );
        assert_eq!(
            session.tick(fixed_now()).unwrap(),
            TickOutcome::Counting { remaining_secs: 1 }
        );
        assert_eq!(
            session.tick(fixed_now()).unwrap(),
            TickOutcome::Expired(Advance::Next { index: 1 })
        );
        assert_eq!(session.remaining_secs(), Some(3));
    }

    #[test]
    fn tick_after_completion_is_rejected() {
        let mut session = QuizSession::new(build_quiz(), fixed_now()).unwrap();
        session.advance(fixed_now()).unwrap();
        session.advance(fixed_now()).unwrap();
        assert!(matches!(
            session.tick(fixed_now()),
            Err(SessionError::Completed)
        ));
    }

    #[test]
    fn progress_tracks_position_and_answers() {
        let mut session = QuizSession::new(build_quiz(), fixed_now()).unwrap();
        session.submit_answer(&qid("q2"), Answer::slider("5")).unwrap();

        let progress = session.progress();
        assert_eq!(progress.position, 1);
        assert_eq!(progress.total, 2);
        assert_eq!(progress.answered, 1);
        assert_eq!(progress.remaining_secs, Some(3));
        assert!(!progress.is_complete);

        session.advance(fixed_now()).unwrap();
        session.advance(fixed_now()).unwrap();
        let progress = session.progress();
        assert_eq!(progress.position, 2);
        assert_eq!(progress.remaining_secs, None);
        assert!(progress.is_complete);
    }
}
