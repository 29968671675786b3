//! Strategy error types

use loom_syntax::SourceLocation;
use thiserror::Error;

/// Result type for strategy configuration and re-encoding
pub type StrategyResult<T> = Result<T, StrategyError>;

/// Strategy errors
///
/// Parse failures are rendered into `ValidationResult` messages; only
/// re-encoding returns these as `Err`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StrategyError {
    #[error("{strategy} strategy can't encode {value} as {kind}")]
    EncodingUnsupported {
        strategy: &'static str,
        value: String,
        kind: String,
    },

    #[error("No tokens available")]
    NoTokens,

    #[error("Unknown token for {strategy} construction {token} found at {location}")]
    UnknownToken {
        strategy: &'static str,
        token: String,
        location: SourceLocation,
    },

    #[error("Unclosed {strategy} found at {location}")]
    Unclosed {
        strategy: &'static str,
        location: SourceLocation,
    },

    #[error("Unclosed token stream found")]
    UnclosedStream,

    #[error("Multiple {kind} tokens found at {location}, expected 1")]
    Multiple {
        kind: &'static str,
        location: SourceLocation,
    },

    #[error("No {kind} token found")]
    Missing { kind: &'static str },

    #[error("Invalid {kind} '{text}' at {location}")]
    Invalid {
        kind: &'static str,
        text: String,
        location: SourceLocation,
    },

    #[error("Unknown tokens at {location}: [{tokens}]")]
    UnknownTokens {
        tokens: String,
        location: SourceLocation,
    },

    #[error("List not properly closed at {location}")]
    ListNotClosed { location: SourceLocation },

    #[error("Errors found constructing list entry {index}: {errors}")]
    ListEntry { index: usize, errors: String },

    #[error("Errors found constructing list entry {index}: {errors}, skipping entry")]
    SkippedListEntry { index: usize, errors: String },

    #[error("Pair split not found")]
    PairSplitNotFound,

    #[error("Couldn't construct pair")]
    IncompletePair,

    #[error("No value strategy for key {key}")]
    NoValueStrategy { key: String },

    #[error("{count} key-value pairs missed")]
    MissedPairs { count: usize },

    #[error("Duplicated keys found: [{keys}]")]
    DuplicateKeys { keys: String },

    #[error("No valid alternatives")]
    NoAlternatives,
}

impl StrategyError {
    /// Render a token run for `UnknownTokens`
    pub fn unknown_tokens<'a>(
        tokens: impl IntoIterator<Item = &'a loom_syntax::Token>,
        location: SourceLocation,
    ) -> Self {
        let tokens = tokens
            .into_iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        StrategyError::UnknownTokens { tokens, location }
    }
}
