//! Style error types

use loom_syntax::SourceLocation;
use thiserror::Error;

/// Result type for registry construction
pub type StyleResult<T> = Result<T, StyleError>;

/// Selector registry and selector parsing errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StyleError {
    #[error("Pseudo-class '{name}' registered twice")]
    DuplicatePseudoClass { name: String },

    #[error("Selector function '{name}' registered twice")]
    DuplicateFunction { name: String },

    #[error("Unknown pseudo-class ':{name}' at {location}")]
    UnknownPseudoClass { name: String, location: SourceLocation },

    #[error("Unknown selector function ':{name}()' at {location}")]
    UnknownFunction { name: String, location: SourceLocation },

    #[error("Invalid arguments for ':{name}()' at {location}: {reason}")]
    InvalidArguments {
        name: String,
        reason: String,
        location: SourceLocation,
    },

    #[error("Invalid selector '{text}' at {location}")]
    InvalidSelector { text: String, location: SourceLocation },

    #[error("Combinators are not supported, found at {location}")]
    UnsupportedCombinator { location: SourceLocation },

    #[error("Empty selector at {location}")]
    EmptySelector { location: SourceLocation },
}
