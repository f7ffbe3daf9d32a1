#![forbid(unsafe_code)]

pub mod grading;
pub mod model;
pub mod result;

pub use grading::{GradeReport, grade, grade_quiz};
pub use result::QuizResult;
