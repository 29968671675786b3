//! Tokenizer engine
//!
//! Drives an ordered list of producers over a character cursor. The first
//! producer that claims the current character emits tokens; characters no
//! producer claims become single fallback tokens. Tokenization is total: it
//! never fails and always ends with an EOF token.

use std::fmt;

use rustc_hash::FxHashSet;

use crate::cursor::Cursor;
use crate::error::{LexError, RegistryError, SyntaxResult};
use crate::options::ParseOptions;
use crate::token::{Token, TokenValue};
use crate::token_type::{TokenType, TokenTypeRegistry, CORE_DIALECT};

/// A lexer rule recognizing one lexical class
///
/// A producer that claims a character must consume at least that character.
pub trait Producer: Send + Sync {
    /// Unique id within a dialect
    fn id(&self) -> &'static str;

    /// Can this producer start at the cursor
    fn can_produce(&self, cursor: &Cursor) -> bool;

    /// Consume input and append zero or more tokens
    fn produce(&self, cursor: &mut Cursor, out: &mut Vec<Token>, options: &ParseOptions);
}

/// Input filter applied before tokenizing
pub type InputFilter = fn(&str) -> String;

/// A tokenizer dialect: token types, ordered producers and a fallback type
pub struct Dialect {
    name: &'static str,
    registry: TokenTypeRegistry,
    producers: Vec<Box<dyn Producer>>,
    fallback: TokenType,
    filter: Option<InputFilter>,
}

impl Dialect {
    pub fn builder(name: &'static str) -> DialectBuilder {
        DialectBuilder {
            name,
            registry: TokenTypeRegistry::with_core(),
            producers: Vec::new(),
            producer_ids: FxHashSet::default(),
            fallback: TokenType::UNKNOWN,
            filter: None,
            error: None,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn registry(&self) -> &TokenTypeRegistry {
        &self.registry
    }

    /// Look up one of this dialect's token types by name
    pub fn token_type(&self, name: &str) -> Option<TokenType> {
        self.registry
            .get(self.name, name)
            .or_else(|| self.registry.get(CORE_DIALECT, name))
    }

    pub fn fallback(&self) -> TokenType {
        self.fallback
    }

    /// Tokenize with default options
    pub fn tokenize(&self, input: &str) -> Vec<Token> {
        Tokenizer::new(self).tokenize(input)
    }

    fn filter_input(&self, input: &str) -> String {
        match self.filter {
            Some(filter) => filter(input),
            None => input.to_string(),
        }
    }
}

impl fmt::Debug for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let producers: Vec<_> = self.producers.iter().map(|p| p.id()).collect();
        f.debug_struct("Dialect")
            .field("name", &self.name)
            .field("producers", &producers)
            .field("fallback", &self.fallback)
            .finish()
    }
}

/// Builder for a `Dialect`; registration errors surface from `build`
pub struct DialectBuilder {
    name: &'static str,
    registry: TokenTypeRegistry,
    producers: Vec<Box<dyn Producer>>,
    producer_ids: FxHashSet<&'static str>,
    fallback: TokenType,
    filter: Option<InputFilter>,
    error: Option<RegistryError>,
}

impl DialectBuilder {
    /// Register the dialect's token types
    pub fn token_types(mut self, types: &[TokenType]) -> Self {
        for ty in types {
            if self.error.is_some() {
                break;
            }
            if ty.dialect() != self.name {
                self.error = Some(RegistryError::ForeignTokenType {
                    dialect: ty.dialect(),
                    name: ty.name(),
                    expected: self.name,
                });
            } else if let Err(e) = self.registry.register(*ty) {
                self.error = Some(e);
            }
        }
        self
    }

    /// Append a producer; order is priority
    pub fn producer(mut self, producer: impl Producer + 'static) -> Self {
        if !self.producer_ids.insert(producer.id()) && self.error.is_none() {
            self.error = Some(RegistryError::DuplicateProducer {
                dialect: self.name,
                id: producer.id(),
            });
        }
        self.producers.push(Box::new(producer));
        self
    }

    /// Token type emitted for characters no producer claims
    pub fn fallback(mut self, ty: TokenType) -> Self {
        self.fallback = ty;
        self
    }

    pub fn filter(mut self, filter: InputFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn build(self) -> SyntaxResult<Dialect> {
        if let Some(error) = self.error {
            return Err(error);
        }
        Ok(Dialect {
            name: self.name,
            registry: self.registry,
            producers: self.producers,
            fallback: self.fallback,
            filter: self.filter,
        })
    }
}

/// Tokenizer over one dialect
pub struct Tokenizer<'d> {
    dialect: &'d Dialect,
    options: ParseOptions,
}

impl<'d> Tokenizer<'d> {
    pub fn new(dialect: &'d Dialect) -> Self {
        Self::with_options(dialect, ParseOptions::default())
    }

    pub fn with_options(dialect: &'d Dialect, options: ParseOptions) -> Self {
        Self { dialect, options }
    }

    /// Tokenize `input`; the last token is always EOF
    pub fn tokenize(&self, input: &str) -> Vec<Token> {
        let input = self.dialect.filter_input(input);
        let mut cursor = Cursor::new(&input);
        let mut tokens = Vec::new();

        while !cursor.is_eof() {
            let start = cursor.position();
            let producer = self.dialect.producers.iter().find(|p| p.can_produce(&cursor));
            match producer {
                Some(producer) => {
                    log::trace!("{} producing at {}", producer.id(), cursor.location());
                    producer.produce(&mut cursor, &mut tokens, &self.options);
                    if cursor.position() == start {
                        log::warn!(
                            "Producer {} in dialect {} consumed no input at {}",
                            producer.id(),
                            self.dialect.name,
                            cursor.location()
                        );
                        self.produce_fallback(&mut cursor, &mut tokens);
                    }
                }
                None => self.produce_fallback(&mut cursor, &mut tokens),
            }
        }

        tokens.push(Token::eof(cursor.location()));
        log::debug!(
            "Tokenized {} tokens in dialect {} ({} with errors)",
            tokens.len(),
            self.dialect.name,
            tokens.iter().filter(|t| t.is_error()).count()
        );
        tokens
    }

    fn produce_fallback(&self, cursor: &mut Cursor, tokens: &mut Vec<Token>) {
        let location = cursor.location();
        if let Some(c) = cursor.advance() {
            let fallback = self.dialect.fallback;
            let token = Token::new(fallback, TokenValue::Char(c), location);
            tokens.push(if fallback.is_error() {
                token.with_error(LexError::UnknownCharacter { character: c })
            } else {
                token
            });
        }
    }
}
