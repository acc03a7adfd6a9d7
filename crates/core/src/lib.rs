#![warn(clippy::all, missing_docs)]

//! Core logic for the numeral-conversion quiz.
//!
//! This crate hosts the data models, the console abstraction used for timed
//! input, the question providers, the game session loop and the high-score
//! store used by the terminal front-end.

pub mod answer;
pub mod config;
pub mod console;
pub mod error;
pub mod models;
pub mod provider;
pub mod scores;
pub mod session;

pub use self::config::AppConfig;
pub use console::{Console, ReadOutcome, ScriptedConsole};
pub use models::{Difficulty, GameConfig, Outcome};
pub use provider::{GameRegistry, QuestionProvider};
pub use scores::{HighScoreEntry, ScoreBook, ScoreStore};
pub use session::{GameSession, SessionState};
