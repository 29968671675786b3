//! Tokens
//!
//! Immutable, positioned units of lexical output.

use std::borrow::Cow;
use std::fmt;

use crate::consume::{Function, SimpleBlock};
use crate::error::SourceLocation;
use crate::token_type::TokenType;

/// Numeric value of a number-like token
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Integer(i64),
    Float(f64),
}

impl Number {
    /// Parse a numeric literal; `integer` selects the integer form, which
    /// falls back to a float when it does not fit in an `i64`
    pub fn parse(text: &str, integer: bool) -> Option<Number> {
        if integer {
            if let Ok(value) = text.parse::<i64>() {
                return Some(Number::Integer(value));
            }
        }
        text.parse::<f64>().ok().map(Number::Float)
    }

    pub fn as_f64(&self) -> f64 {
        match *self {
            Number::Integer(value) => value as f64,
            Number::Float(value) => value,
        }
    }

    pub fn is_integer(&self) -> bool {
        matches!(self, Number::Integer(_))
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Number::Integer(value) => write!(f, "{}", value),
            Number::Float(value) if value.is_nan() => f.write_str("NaN"),
            Number::Float(value) if value.is_infinite() => {
                f.write_str(if value.is_sign_negative() { "-Infinity" } else { "Infinity" })
            }
            // Always a decimal point or an exponent, so the text lexes back as a float
            Number::Float(value) => write!(f, "{:?}", value),
        }
    }
}

/// Decoded payload of a token
#[derive(Debug, Clone, PartialEq, Default)]
pub enum TokenValue {
    /// No payload; the type's raw text stands in
    #[default]
    None,
    Char(char),
    Text(String),
    Number(Number),
    /// Number with a unit suffix (`%` for percentages)
    Dimension(Number, String),
    Bool(bool),
    /// Partial token wrapped by an error token
    Nested(Box<Token>),
    /// Consumed simple block
    Block(Box<SimpleBlock>),
    /// Consumed function
    Function(Box<Function>),
}

/// A typed, positioned token
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenType,
    pub value: TokenValue,
    pub location: SourceLocation,
    /// Lexical error recorded by the producer
    pub error: Option<String>,
}

impl Token {
    pub fn new(kind: TokenType, value: TokenValue, location: SourceLocation) -> Self {
        Self { kind, value, location, error: None }
    }

    /// A token without a payload
    pub fn bare(kind: TokenType, location: SourceLocation) -> Self {
        Self::new(kind, TokenValue::None, location)
    }

    pub fn text_token(kind: TokenType, text: impl Into<String>, location: SourceLocation) -> Self {
        Self::new(kind, TokenValue::Text(text.into()), location)
    }

    pub fn eof(location: SourceLocation) -> Self {
        Self::bare(TokenType::EOF, location)
    }

    /// Attach a lexical error message
    pub fn with_error(mut self, message: impl fmt::Display) -> Self {
        self.error = Some(message.to_string());
        self
    }

    pub fn is(&self, kind: TokenType) -> bool {
        self.kind == kind
    }

    pub fn is_whitespace(&self) -> bool {
        self.kind.is_whitespace()
    }

    pub fn is_special(&self) -> bool {
        self.kind.is_special()
    }

    pub fn is_eof(&self) -> bool {
        self.kind == TokenType::EOF
    }

    /// True for error sentinel types and for tokens carrying an error message
    pub fn is_error(&self) -> bool {
        self.kind.is_error() || self.error.is_some()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.value {
            TokenValue::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<Number> {
        match &self.value {
            TokenValue::Number(number) | TokenValue::Dimension(number, _) => Some(*number),
            _ => None,
        }
    }

    pub fn unit(&self) -> Option<&str> {
        match &self.value {
            TokenValue::Dimension(_, unit) => Some(unit),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.value {
            TokenValue::Bool(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_char(&self) -> Option<char> {
        match &self.value {
            TokenValue::Char(c) => Some(*c),
            TokenValue::Text(text) => {
                let mut chars = text.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Some(c),
                    _ => None,
                }
            }
            _ => None,
        }
    }

    /// Is this a token of `kind` whose single character is `c`
    pub fn is_char(&self, kind: TokenType, c: char) -> bool {
        self.kind == kind && self.as_char() == Some(c)
    }

    pub fn as_block(&self) -> Option<&SimpleBlock> {
        match &self.value {
            TokenValue::Block(block) => Some(block),
            _ => None,
        }
    }

    pub fn as_function(&self) -> Option<&Function> {
        match &self.value {
            TokenValue::Function(function) => Some(function),
            _ => None,
        }
    }

    /// The decoded text of the value, without type encoding
    pub fn text(&self) -> Cow<'_, str> {
        match &self.value {
            TokenValue::None => Cow::Borrowed(self.kind.raw_text().unwrap_or("")),
            TokenValue::Char(c) => Cow::Owned(c.to_string()),
            TokenValue::Text(text) => Cow::Borrowed(text),
            TokenValue::Number(number) => Cow::Owned(number.to_string()),
            TokenValue::Dimension(number, unit) => Cow::Owned(format!("{}{}", number, unit)),
            TokenValue::Bool(value) => Cow::Owned(value.to_string()),
            TokenValue::Nested(token) => Cow::Owned(token.text().into_owned()),
            TokenValue::Block(block) => Cow::Owned(block.to_text()),
            TokenValue::Function(function) => Cow::Owned(function.to_text()),
        }
    }

    /// Source text for this token, applying the type's encoder
    pub fn to_text(&self) -> String {
        match &self.value {
            TokenValue::Nested(token) => token.to_text(),
            TokenValue::Block(block) => block.to_text(),
            TokenValue::Function(function) => function.to_text(),
            _ => self.kind.encode(&self.text()),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.kind, self.to_text())
    }
}

/// Serialize a run of tokens back into source text
pub fn to_text(tokens: &[Token]) -> String {
    tokens.iter().map(Token::to_text).collect()
}
