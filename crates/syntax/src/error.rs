//! Syntax error types
//!
//! Lexical, structural and registry errors. Lexical and structural errors are
//! rendered into token annotations or `ValidationResult` messages; registry
//! errors are returned from construction-time APIs.

use std::fmt;
use thiserror::Error;

/// Result type for construction-time syntax APIs
pub type SyntaxResult<T> = Result<T, RegistryError>;

/// Source location of a token
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
    /// Character offset from start
    pub offset: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize, offset: usize) -> Self {
        Self { line, column, offset }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Errors recorded on tokens by producers
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    #[error("Multiple decimal points in a number token")]
    MultipleDecimalPoints,

    #[error("Decimals not allowed in exponent part of a number")]
    DecimalInExponent,

    #[error("Exponent with no numeric input")]
    ExponentWithoutDigits,

    #[error("Unparseable number '{text}'")]
    UnparseableNumber { text: String },

    #[error("Unterminated string value; EOF reached")]
    UnterminatedString,

    #[error("Illegal newline in string value")]
    NewlineInString,

    #[error("Unterminated url; EOF reached")]
    UnterminatedUrl,

    #[error("Illegal character '{character}' in url")]
    IllegalUrlCharacter { character: char },

    #[error("Invalid escape sequence")]
    InvalidEscape,

    #[error("Illegal escape '\\{character}' in string")]
    IllegalStringEscape { character: char },

    #[error("Unknown character '{character}'")]
    UnknownCharacter { character: char },
}

/// Errors reported by the structural consumers
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructureError {
    #[error("Unexpected EOF before {construct} completed at {location}")]
    UnexpectedEof {
        construct: String,
        location: SourceLocation,
    },

    #[error("Unclosed {construct} encountered at {location}")]
    Unclosed {
        construct: String,
        location: SourceLocation,
    },

    #[error("Token queue exhausted before {construct} could start")]
    Exhausted { construct: String },

    #[error("Expected {expected} at {location}, found {found}")]
    UnexpectedToken {
        expected: String,
        found: String,
        location: SourceLocation,
    },

    #[error("Declaration without ':' for [{name}] at {location}")]
    MissingColon {
        name: String,
        location: SourceLocation,
    },

    #[error("Empty declaration for [{name}] at {location}")]
    EmptyDeclaration {
        name: String,
        location: SourceLocation,
    },

    #[error("Illegal token {token} found in style block at {location}, skipping")]
    IllegalStyleBlockToken {
        token: String,
        location: SourceLocation,
    },

    #[error("Lexical error in {token} at {location}: {message}")]
    Lexical {
        token: String,
        message: String,
        location: SourceLocation,
    },

    #[error("Nesting depth limit of {limit} exceeded at {location}")]
    DepthLimit {
        limit: usize,
        location: SourceLocation,
    },
}

impl StructureError {
    pub fn unexpected_eof(construct: impl Into<String>, location: SourceLocation) -> Self {
        Self::UnexpectedEof { construct: construct.into(), location }
    }

    pub fn unclosed(construct: impl Into<String>, location: SourceLocation) -> Self {
        Self::Unclosed { construct: construct.into(), location }
    }

    pub fn exhausted(construct: impl Into<String>) -> Self {
        Self::Exhausted { construct: construct.into() }
    }
}

/// Registry construction errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Token type {dialect}:{name} registered twice")]
    DuplicateTokenType {
        dialect: &'static str,
        name: &'static str,
    },

    #[error("Producer {id} registered twice in dialect {dialect}")]
    DuplicateProducer {
        dialect: &'static str,
        id: &'static str,
    },

    #[error("Token type {dialect}:{name} does not belong to dialect {expected}")]
    ForeignTokenType {
        dialect: &'static str,
        name: &'static str,
        expected: &'static str,
    },
}
