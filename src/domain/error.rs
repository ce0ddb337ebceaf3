//! Domain-level errors (no external dependencies)

use thiserror::Error;

use crate::domain::level::Level;

/// Domain errors represent edits the hierarchy refuses.
///
/// Precondition violations (unknown paths, out-of-range indices) are not
/// errors here; callers check them before editing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("name already exists at {level} level: {name}")]
    DuplicateName { level: Level, name: String },
}

pub type DomainResult<T> = Result<T, DomainError>;
