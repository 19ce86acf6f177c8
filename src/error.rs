//! Error types for the fairshare engine.
//!
//! The engine is deliberately hard to crash: malformed responses, unknown
//! category labels, missing weight attributes and failed exclusion lookups
//! all degrade to documented defaults instead of surfacing errors. The only
//! failures a caller ever sees are the two programmer errors below, raised
//! before a selection is started.

use thiserror::Error;

/// Errors surfaced by `allocate` and the engine entry points.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    /// The requested question count was zero. A selection cannot start.
    #[error("target question count must be positive")]
    InvalidTarget,

    /// No categories were supplied to allocate across.
    #[error("no categories supplied for allocation")]
    NoCategories,
}

pub type Result<T> = std::result::Result<T, EngineError>;
