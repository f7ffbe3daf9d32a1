mod answer;
mod choice;
mod ids;
mod question;
mod quiz;

pub use answer::{Answer, AnswerError, AnswerMap, parse_slider_value};
pub use choice::{Choice, SliderRange};
pub use ids::{ChoiceId, QuestionId};
pub use question::{Question, QuestionType};
pub use quiz::{DEFAULT_POINTS_PER_QUESTION, DEFAULT_TIME_LIMIT_SECS, Quiz, QuizError};
