use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use quiz_core::QuizResult;
use quiz_core::model::{Question, QuestionType, Quiz};
use services::{QuizRunner, QuizSession, RunnerConfig, RunnerEvent, SessionError};
use tokio::io::{AsyncBufReadExt, BufReader};

mod input;

/// Countdown values at or below this are announced on every tick.
const ANNOUNCE_BELOW_SECS: u32 = 5;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    MissingQuiz,
    InvalidTickMs { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::MissingQuiz => write!(f, "no quiz given (use --quiz or QUIZ_PATH)"),
            ArgsError::InvalidTickMs { raw } => write!(f, "invalid --tick-ms value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p app -- --quiz <path.json> [--tick-ms <ms>]");
    eprintln!();
    eprintln!("At the prompt, answer and press enter; an empty line skips the question.");
    eprintln!("Choices can be given by id or by number, separated by commas or spaces.");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  QUIZ_PATH, QUIZ_TICK_MS, RUST_LOG");
}

struct Args {
    quiz_path: PathBuf,
    tick_period: Duration,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut quiz_path = std::env::var("QUIZ_PATH").ok().map(PathBuf::from);
        let mut tick_ms = std::env::var("QUIZ_TICK_MS")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .filter(|ms| *ms > 0)
            .unwrap_or(1_000);

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--quiz" => {
                    let value = require_value(args, "--quiz")?;
                    quiz_path = Some(PathBuf::from(value));
                }
                "--tick-ms" => {
                    let value = require_value(args, "--tick-ms")?;
                    tick_ms = value
                        .parse::<u64>()
                        .ok()
                        .filter(|ms| *ms > 0)
                        .ok_or(ArgsError::InvalidTickMs { raw: value })?;
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self {
            quiz_path: quiz_path.ok_or(ArgsError::MissingQuiz)?,
            tick_period: Duration::from_millis(tick_ms),
        })
    }
}

fn print_question(session: &QuizSession) {
    let Some(question) = session.current_question() else {
        return;
    };
    let progress = session.progress();
    let quiz = session.quiz();

    println!();
    println!(
        "Question {} of {} · {} points · {}s",
        progress.position,
        progress.total,
        quiz.points_per_question(),
        progress.remaining_secs.unwrap_or_default()
    );
    println!("{}", question.text);
    for url in &question.image_urls {
        println!("  [image] {url}");
    }
    print_choices(question);
    if session.is_last_question() {
        println!("  (last question: an empty line finishes the quiz)");
    }
}

fn print_choices(question: &Question) {
    match question.kind {
        QuestionType::Select | QuestionType::TrueFalse | QuestionType::Ordering => {
            for (position, choice) in question.choices.iter().enumerate() {
                println!("  {}. {} ({})", position + 1, choice.text, choice.id);
            }
            let hint = match question.kind {
                QuestionType::Select => "pick every correct choice",
                QuestionType::TrueFalse => "pick one choice",
                _ => "list the choices in the right order",
            };
            println!("> {hint}");
        }
        QuestionType::Slider => {
            if let Some(range) = question.slider_range() {
                println!("  Min: {}  Max: {}", range.min, range.max);
            }
            println!("> enter a whole number");
        }
        QuestionType::FreeText => println!("> type your answer"),
    }
}

fn print_result(result: &QuizResult) {
    println!();
    println!("Quiz complete!");
    println!(
        "Your score: {} / {} points",
        result.total_score(),
        result.total_possible_points()
    );
    println!("{}% correct", result.percentage_correct());
    println!(
        "{} of {} questions fully correct",
        result.fully_correct(),
        result.grades().len()
    );
}

/// Applies one typed line. Returns the transition it caused, if any.
fn handle_line(
    runner: &mut QuizRunner,
    line: &str,
) -> Result<Option<RunnerEvent>, SessionError> {
    let Some(question) = runner.session().current_question() else {
        return Ok(None);
    };

    if !line.trim().is_empty() {
        let question_id = question.id.clone();
        let answer = match input::parse_answer(question, line) {
            Ok(answer) => answer,
            Err(err) => {
                println!("  {err}");
                return Ok(None);
            }
        };
        if let Err(err) = runner.submit_answer(&question_id, answer) {
            println!("  {err}");
            return Ok(None);
        }
    }

    runner.advance().map(Some)
}

/// Returns true once the quiz is over.
fn show_event(runner: &QuizRunner, event: &RunnerEvent) -> bool {
    match event {
        RunnerEvent::Tick { remaining_secs } => {
            if *remaining_secs <= ANNOUNCE_BELOW_SECS {
                println!("  {remaining_secs}s left");
            }
            false
        }
        RunnerEvent::Advanced { .. } => {
            print_question(runner.session());
            false
        }
        RunnerEvent::Finished(result) => {
            print_result(result);
            true
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);
    let args = Args::parse(&mut argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let raw = std::fs::read_to_string(&args.quiz_path)?;
    let quiz = Quiz::from_json(&raw)?;
    log::info!(
        "loaded quiz {:?} from {}",
        quiz.title,
        args.quiz_path.display()
    );

    if !quiz.title.is_empty() {
        println!("{}", quiz.title);
    }

    let config = RunnerConfig::new().with_tick_period(args.tick_period);
    let mut runner = QuizRunner::start(quiz, config)?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    print_question(runner.session());

    loop {
        tokio::select! {
            event = runner.next_event() => {
                let Some(event) = event else { break };
                if matches!(event, RunnerEvent::Advanced { .. } | RunnerEvent::Finished(_)) {
                    println!("  time is up");
                }
                if show_event(&runner, &event) {
                    break;
                }
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    // Leaving mid-quiz drops the session and its countdown.
                    log::info!("input closed before the quiz finished");
                    break;
                };
                if let Some(event) = handle_line(&mut runner, &line)? {
                    if show_event(&runner, &event) {
                        break;
                    }
                }
            }
        }
    }

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}
