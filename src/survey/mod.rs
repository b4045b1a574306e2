//! Survey designer back-end.
//!
//! This module provides:
//! * [`QuestionGenerator`]: async trait for AI question generation.
//! * [`ApiGenerator`]: OpenAI-compatible chat-completions client.
//! * [`extract_json`] / [`parse_questions`]: code-fence tolerant parsing.
//! * [`SurveyDraft`]: the manual builder's question list.
//! * [`run_generator`]: tokio task answering UI requests.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use fieldscan::config::AppConfig;
//! use fieldscan::survey::{ApiGenerator, QuestionGenerator, SurveyDraft};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = AppConfig::default();
//!     let generator = ApiGenerator::from_config(&config.generator);
//!
//!     let mut draft = SurveyDraft::new();
//!     match generator.generate("Household water access, 5 questions").await {
//!         Ok(questions) => {
//!             draft.import(questions);
//!         }
//!         Err(e) => eprintln!("{}", e.user_message()),
//!     }
//! }
//! ```

pub mod builder;
pub mod extract;
pub mod generator;
pub mod prompt;
pub mod question;
pub mod worker;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use builder::{SurveyDraft, DEFAULT_OPTIONS};
pub use extract::{extract_json, parse_questions, ExtractError};
pub use generator::{
    interpret_response, ApiGenerator, GenerateError, QuestionGenerator, FALLBACK_MESSAGE,
};
pub use prompt::PROMPT_HINT;
pub use question::{Question, QuestionType};
pub use worker::{run_generator, SurveyCommand, SurveyEvent};
