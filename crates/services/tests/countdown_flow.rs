use std::time::Duration;

use quiz_core::model::{Answer, Choice, Question, QuestionId, QuestionType, Quiz, SliderRange};
use services::clock::fixed_now;
use services::{Clock, QuizRunner, RunnerConfig, RunnerEvent, SessionError};
use tokio::time::{self, Instant};

const SECOND: Duration = Duration::from_secs(1);

fn timed_quiz(time_limit: u32) -> Quiz {
    Quiz::new(
        "Timed",
        vec![
            Question::new(
                "q1",
                "Is water wet?",
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
    .with_time_limit(time_limit)
    .with_points(10.0)
}

fn config() -> RunnerConfig {
    RunnerConfig::new()
        .with_clock(Clock::anchored(fixed_now()))
        .with_tick_period(SECOND)
}

#[tokio::test(start_paused = true)]
async fn countdown_expiry_advances_to_next_question() {
    let mut runner = QuizRunner::start(timed_quiz(3), config()).unwrap();
    let started = Instant::now();

    assert_eq!(
        runner.next_event().await,
        Some(RunnerEvent::Tick { remaining_secs: 2 })
    );
    assert_eq!(
        runner.next_event().await,
        Some(RunnerEvent::Tick { remaining_secs: 1 })
    );
    assert_eq!(
        runner.next_event().await,
        Some(RunnerEvent::Advanced { index: 1 })
    );
    assert_eq!(started.elapsed(), SECOND * 3);
    assert_eq!(runner.session().remaining_secs(), Some(3));
    assert!(runner.is_counting_down());
}

#[tokio::test(start_paused = true)]
async fn manual_advance_discards_ticks_from_previous_question() {
    let mut runner = QuizRunner::start(timed_quiz(5), config()).unwrap();

    // Let the first question's countdown queue a tick without consuming it.
    time::sleep(SECOND + SECOND / 2).await;
    assert_eq!(runner.advance().unwrap(), RunnerEvent::Advanced { index: 1 });
    let advanced_at = Instant::now();

    assert_eq!(
        runner.next_event().await,
        Some(RunnerEvent::Tick { remaining_secs: 4 })
    );
    assert_eq!(advanced_at.elapsed(), SECOND);
    assert_eq!(runner.session().current_index(), Some(1));
}

#[tokio::test(start_paused = true)]
async fn timer_runs_the_quiz_to_completion() {
    let mut runner = QuizRunner::start(timed_quiz(2), config()).unwrap();
    runner
        .submit_answer(&QuestionId::from("q1"), Answer::true_false("a"))
        .unwrap();
    runner
        .submit_answer(&QuestionId::from("q2"), Answer::slider("7"))
        .unwrap();

    let started = Instant::now();
    let mut events = Vec::new();
    while let Some(event) = runner.next_event().await {
        events.push(event);
    }

    assert_eq!(started.elapsed(), SECOND * 4);
    assert_eq!(events.len(), 4);
    let Some(RunnerEvent::Finished(result)) = events.last() else {
        panic!("last event should be the result, got {events:?}");
    };
    assert_eq!(result.total_score(), 18);
    assert_eq!(result.percentage_correct(), 90);

    assert!(runner.is_finished());
    assert!(!runner.is_counting_down());
    assert_eq!(runner.next_event().await, None);
    // Session timestamps move with the same runtime clock as the countdown.
    assert_eq!(runner.session().started_at(), fixed_now());
    assert_eq!(
        runner.session().completed_at(),
        Some(fixed_now() + chrono::Duration::seconds(4))
    );
}

#[tokio::test(start_paused = true)]
async fn rejected_answer_keeps_the_countdown_alive() {
    let mut runner = QuizRunner::start(timed_quiz(10), config()).unwrap();

    let err = runner
        .submit_answer(&QuestionId::from("missing"), Answer::free_text("x"))
        .unwrap_err();
    assert!(matches!(err, SessionError::UnknownQuestion(_)));
    let err = runner
        .submit_answer(&QuestionId::from("q2"), Answer::slider("lots"))
        .unwrap_err();
    assert!(matches!(err, SessionError::MalformedAnswer(_)));

    assert!(runner.is_counting_down());
    assert_eq!(
        runner.next_event().await,
        Some(RunnerEvent::Tick { remaining_secs: 9 })
    );
}

#[tokio::test(start_paused = true)]
async fn finishing_manually_stops_the_countdown() {
    let mut runner = QuizRunner::start(timed_quiz(10), config()).unwrap();
    runner.advance().unwrap();
    let RunnerEvent::Finished(result) = runner.advance().unwrap() else {
        panic!("second advance should finish the quiz");
    };
    assert_eq!(result.total_score(), 0);
    assert_eq!(runner.session().completed_at(), Some(fixed_now()));
    assert!(!runner.is_counting_down());

    assert!(matches!(runner.advance(), Err(SessionError::Completed)));
    time::sleep(SECOND * 20).await;
    assert_eq!(runner.next_event().await, None);

    let session = runner.into_session();
    assert_eq!(session.result(), Some(&result));
}
