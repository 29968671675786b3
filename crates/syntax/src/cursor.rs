//! Character cursor
//!
//! Position-tracking reader over the filtered input that producers consume.

use crate::error::SourceLocation;

/// Character reader with line and column tracking
#[derive(Debug, Clone)]
pub struct Cursor {
    chars: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
}

impl Cursor {
    pub fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
        }
    }

    /// Current source location
    pub fn location(&self) -> SourceLocation {
        SourceLocation::new(self.line, self.column, self.position)
    }

    /// Character offset into the input
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn is_eof(&self) -> bool {
        self.position >= self.chars.len()
    }

    /// Peek at the current character
    pub fn peek(&self) -> Option<char> {
        self.chars.get(self.position).copied()
    }

    /// Peek `n` characters ahead of the current one
    pub fn peek_at(&self, n: usize) -> Option<char> {
        self.chars.get(self.position + n).copied()
    }

    /// Does the remaining input start with `s`
    pub fn starts_with(&self, s: &str) -> bool {
        let mut offset = 0;
        for c in s.chars() {
            if self.peek_at(offset) != Some(c) {
                return false;
            }
            offset += 1;
        }
        true
    }

    /// Consume and return the current character
    pub fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.position += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    /// Consume `n` characters
    pub fn skip(&mut self, n: usize) {
        for _ in 0..n {
            if self.advance().is_none() {
                break;
            }
        }
    }

    /// Consume characters while `predicate` holds
    pub fn consume_while(&mut self, predicate: impl Fn(char) -> bool) -> String {
        let mut out = String::new();
        while let Some(c) = self.peek() {
            if !predicate(c) {
                break;
            }
            out.push(c);
            self.advance();
        }
        out
    }
}
