//! Grammar and parse error types.

use thiserror::Error;

/// The grammar cannot be built from the given options.
///
/// This is a setup defect: it is reported before any message is parsed and
/// is never recovered from by the sequence adapters.
#[derive(Debug, Clone, Error)]
pub enum GrammarError {
    /// A required pattern is empty.
    #[error("`{0}` must not be empty")]
    MissingPattern(&'static str),

    /// A pattern does not compile.
    #[error("invalid `{field}` pattern: {source}")]
    InvalidPattern {
        /// The option holding the pattern.
        field: &'static str,
        /// The compilation error.
        source: regex::Error,
    },

    /// A bounded stream was requested with no room for any message.
    #[error("stream capacity must be at least 1")]
    InvalidCapacity,
}

/// Errors returned while parsing commit messages.
#[derive(Debug, Clone, Error)]
pub enum ParseError {
    /// The raw message is empty or whitespace only.
    #[error("expected a raw commit message, got empty input")]
    EmptyInput,

    /// The grammar could not be built.
    #[error("grammar configuration error: {0}")]
    Configuration(#[from] GrammarError),
}

impl ParseError {
    /// Returns true if the error must terminate a sequence regardless of warn policy.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}

/// Result type for parse operations.
pub type ParseResult<T> = Result<T, ParseError>;
