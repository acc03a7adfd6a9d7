//! Typed failures surfaced by the quiz core.
//!
//! Input timeouts are not errors: they travel as
//! [`ReadOutcome::TimedOut`](crate::console::ReadOutcome::TimedOut).

use std::path::PathBuf;

use thiserror::Error;

/// A typed answer could not be read as a number in the expected base.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AnswerError {
    /// The text is not a valid number in `radix`.
    #[error("`{text}` is not a base-{radix} number")]
    Malformed {
        /// Raw answer as typed.
        text: String,
        /// Radix the answer was parsed in.
        radix: u32,
    },
}

/// Failures while reading the high-score file.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The file exists but could not be decoded.
    #[error("score file {path} is corrupted: {reason}")]
    Corrupted {
        /// Location of the score file.
        path: PathBuf,
        /// Decoder message.
        reason: String,
    },
    /// The file could not be read.
    #[error("failed to read score file {path}: {source}")]
    Io {
        /// Location of the score file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Failures while assembling the game catalogue.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// Two providers claim the same identifier.
    #[error("game id `{0}` is registered more than once")]
    DuplicateId(String),
}

/// Invalid transitions of a [`GameSession`](crate::session::GameSession).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    /// A round was requested before `setup`.
    #[error("session has not been set up")]
    NotConfigured,
    /// The session already reached its error limit.
    #[error("session is already finished")]
    AlreadyFinished,
}
