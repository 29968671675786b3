//! Token types
//!
//! An open set of token kinds. Each dialect declares its own types as
//! constants and registers them in a `TokenTypeRegistry`.

use std::fmt;
use std::hash::{Hash, Hasher};

use rustc_hash::FxHashMap;

use crate::error::{RegistryError, SyntaxResult};

/// Dialect name of the types shared by every dialect
pub const CORE_DIALECT: &str = "core";

/// Encoder turning a token's textual value into source text
pub type Encoder = fn(&str) -> String;

/// A named token kind owned by a dialect
///
/// Identity is the `(dialect, name)` pair; flags and encoders are ignored by
/// equality and hashing.
#[derive(Clone, Copy)]
pub struct TokenType {
    dialect: &'static str,
    name: &'static str,
    whitespace: bool,
    special: bool,
    error: bool,
    raw: Option<&'static str>,
    encoder: Option<Encoder>,
}

impl TokenType {
    /// Line terminator emitted by line-oriented dialects
    pub const EOL: TokenType = TokenType::new(CORE_DIALECT, "eol").special().raw("\n");
    /// End-of-stream sentinel, always the last token
    pub const EOF: TokenType = TokenType::new(CORE_DIALECT, "eof").special().raw("");
    /// Unrecognized input
    pub const UNKNOWN: TokenType = TokenType::new(CORE_DIALECT, "unknown").error();

    pub const fn new(dialect: &'static str, name: &'static str) -> Self {
        Self {
            dialect,
            name,
            whitespace: false,
            special: false,
            error: false,
            raw: None,
            encoder: None,
        }
    }

    /// Mark as whitespace
    pub const fn whitespace(mut self) -> Self {
        self.whitespace = true;
        self
    }

    /// Mark as a line or stream terminator
    pub const fn special(mut self) -> Self {
        self.special = true;
        self
    }

    /// Mark as an error sentinel
    pub const fn error(mut self) -> Self {
        self.error = true;
        self
    }

    /// Source text used when a token of this type carries no value
    pub const fn raw(mut self, raw: &'static str) -> Self {
        self.raw = Some(raw);
        self
    }

    /// Encoder applied when re-emitting a token's value
    pub const fn encoder(mut self, encoder: Encoder) -> Self {
        self.encoder = Some(encoder);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn dialect(&self) -> &'static str {
        self.dialect
    }

    pub fn is_whitespace(&self) -> bool {
        self.whitespace
    }

    pub fn is_special(&self) -> bool {
        self.special
    }

    pub fn is_error(&self) -> bool {
        self.error
    }

    pub fn raw_text(&self) -> Option<&'static str> {
        self.raw
    }

    /// Encode a textual value as source text
    pub fn encode(&self, text: &str) -> String {
        match self.encoder {
            Some(encoder) => encoder(text),
            None => text.to_string(),
        }
    }
}

impl PartialEq for TokenType {
    fn eq(&self, other: &Self) -> bool {
        self.dialect == other.dialect && self.name == other.name
    }
}

impl Eq for TokenType {}

impl Hash for TokenType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.dialect.hash(state);
        self.name.hash(state);
    }
}

impl fmt::Debug for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.dialect, self.name)
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Explicit registry of token types with duplicate detection
#[derive(Debug, Clone, Default)]
pub struct TokenTypeRegistry {
    dialects: FxHashMap<&'static str, FxHashMap<&'static str, TokenType>>,
}

impl TokenTypeRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry pre-populated with the core types
    pub fn with_core() -> Self {
        let mut registry = Self::new();
        for ty in [TokenType::EOL, TokenType::EOF, TokenType::UNKNOWN] {
            registry.dialects.entry(ty.dialect).or_default().insert(ty.name, ty);
        }
        registry
    }

    /// Register a type; registering the same identity twice is an error
    pub fn register(&mut self, ty: TokenType) -> SyntaxResult<()> {
        let types = self.dialects.entry(ty.dialect).or_default();
        if types.contains_key(ty.name) {
            return Err(RegistryError::DuplicateTokenType {
                dialect: ty.dialect,
                name: ty.name,
            });
        }
        types.insert(ty.name, ty);
        Ok(())
    }

    /// Register every type in `types`
    pub fn register_all(&mut self, types: &[TokenType]) -> SyntaxResult<()> {
        types.iter().try_for_each(|ty| self.register(*ty))
    }

    pub fn get(&self, dialect: &str, name: &str) -> Option<TokenType> {
        self.dialects.get(dialect)?.get(name).copied()
    }

    pub fn contains(&self, ty: &TokenType) -> bool {
        self.get(ty.dialect, ty.name).is_some()
    }

    pub fn len(&self) -> usize {
        self.dialects.values().map(|types| types.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
