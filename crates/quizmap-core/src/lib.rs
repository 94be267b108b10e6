//! quizmap-core: Diagnosis scoring and response statistics.
//!
//! This crate defines the quiz data model, the scorer that places one
//! respondent on the two-axis trait map, and the statistics that summarize
//! every stored response to a quiz.

pub mod config;
pub mod diagnosis;
pub mod engine;
pub mod error;
pub mod model;
pub mod parser;
pub mod report;
pub mod source;
pub mod statistics;
