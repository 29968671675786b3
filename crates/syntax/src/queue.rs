//! Token queue
//!
//! A FIFO cursor over a borrowed token slice. Derived queues share the slice
//! and carry their own position: a `Split` is a speculative copy whose
//! consumption reaches the parent only on `commit`, and a slice is a bounded
//! sub-range handed to a nested parse.

use crate::token::Token;
use crate::token_type::TokenType;
use crate::validation::ValidationResult;

/// Cursor over a run of tokens
#[derive(Debug, Clone, Copy)]
pub struct TokenQueue<'a> {
    tokens: &'a [Token],
    position: usize,
}

impl<'a> TokenQueue<'a> {
    pub fn new(tokens: &'a [Token]) -> Self {
        Self { tokens, position: 0 }
    }

    pub fn can_poll(&self) -> bool {
        self.position < self.tokens.len()
    }

    /// Number of tokens left
    pub fn remaining(&self) -> usize {
        self.tokens.len() - self.position
    }

    /// The tokens left, in order
    pub fn as_slice(&self) -> &'a [Token] {
        &self.tokens[self.position..]
    }

    pub fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.position)
    }

    /// Peek `n` tokens past the head
    pub fn peek_nth(&self, n: usize) -> Option<&'a Token> {
        self.tokens.get(self.position + n)
    }

    pub fn poll(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.position)?;
        self.position += 1;
        Some(token)
    }

    /// Poll the head only if it satisfies `predicate`
    pub fn poll_if(&mut self, predicate: impl FnOnce(&Token) -> bool) -> Option<&'a Token> {
        match self.peek() {
            Some(token) if predicate(token) => self.poll(),
            _ => None,
        }
    }

    /// Is the head of kind `kind`
    pub fn peek_is(&self, kind: TokenType) -> bool {
        self.peek().is_some_and(|t| t.kind == kind)
    }

    /// Discard leading whitespace and line terminators; EOF is kept
    pub fn consume_whitespace(&mut self) {
        while self
            .peek()
            .is_some_and(|t| t.is_whitespace() || (t.is_special() && !t.is_eof()))
        {
            self.position += 1;
        }
    }

    /// Is the head a line or stream terminator
    pub fn is_eol(&self) -> bool {
        self.peek().is_some_and(Token::is_special)
    }

    /// Is the queue exhausted or at the EOF token
    pub fn is_eof(&self) -> bool {
        self.peek().map_or(true, Token::is_eof)
    }

    /// Offset from the head of the first token satisfying `predicate`
    pub fn find(&self, predicate: impl Fn(&Token) -> bool) -> Option<usize> {
        self.as_slice().iter().position(predicate)
    }

    /// Run `f` on a speculative copy of this queue
    ///
    /// Consumption inside `f` reaches this queue only if `f` calls
    /// `Split::commit`.
    pub fn split<R>(&mut self, f: impl FnOnce(&mut Split<'a>) -> R) -> R {
        let mut split = Split { queue: *self, committed: false };
        let result = f(&mut split);
        if split.committed {
            self.position = split.queue.position;
        }
        result
    }

    /// Run `f` on a split and commit it if the result is valid
    pub fn attempt<T>(
        &mut self,
        f: impl FnOnce(&mut TokenQueue<'a>) -> ValidationResult<T>,
    ) -> ValidationResult<T> {
        self.split(|split| {
            let result = f(split.queue());
            if result.is_valid() {
                split.commit();
            }
            result
        })
    }

    /// Run `f` on the tokens before the first one satisfying `stop`, or on
    /// everything left if none does
    ///
    /// This queue then resumes at the stop token, which is left for the
    /// caller. Tokens `f` leaves unconsumed are skipped.
    pub fn slice<R>(
        &mut self,
        stop: impl Fn(&Token) -> bool,
        f: impl FnOnce(&mut TokenQueue<'a>) -> R,
    ) -> R {
        let end = self
            .find(stop)
            .map_or(self.tokens.len(), |offset| self.position + offset);
        let mut sliced = TokenQueue::new(&self.tokens[self.position..end]);
        let result = f(&mut sliced);
        self.position = end;
        result
    }
}

/// Speculative copy of a queue
#[derive(Debug)]
pub struct Split<'a> {
    queue: TokenQueue<'a>,
    committed: bool,
}

impl<'a> Split<'a> {
    /// The copied queue
    ///
    /// # Panics
    /// If the split has already been committed.
    pub fn queue(&mut self) -> &mut TokenQueue<'a> {
        assert!(!self.committed, "split queue used after commit");
        &mut self.queue
    }

    /// Propagate this split's consumption to the parent
    ///
    /// # Panics
    /// If the split has already been committed.
    pub fn commit(&mut self) {
        assert!(!self.committed, "split committed twice");
        self.committed = true;
    }

    pub fn is_committed(&self) -> bool {
        self.committed
    }
}
