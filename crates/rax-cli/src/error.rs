//! Error handling for the rax CLI.

use std::{io, result};

use thiserror::Error;

/// Convenient result type for CLI operations.
pub type Result<T> = result::Result<T, Error>;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum Error {
    /// Wrapper for standard I/O errors.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// Fixture file could not be parsed.
    #[error("Fixture error: {0}")]
    Fixture(#[from] ron::error::SpannedError),
    /// Errors surfaced by the binding engine.
    #[error(transparent)]
    Rax(#[from] rax::Error),
    /// A step addressed an element id that is not in the page.
    #[error("No element with id {0:?}")]
    UnknownTarget(String),
}
