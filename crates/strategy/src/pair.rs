//! Pair and keyed strategies
//!
//! Two values separated by a delimiter. `PairStrategy` parses both sides
//! with fixed strategies; `KeyedStrategy` picks the second strategy from the
//! parsed first value.

use std::rc::Rc;

use loom_syntax::{Token, TokenQueue, ValidationResult};
use rustc_hash::FxHashMap;

use crate::args::StrategyArgs;
use crate::error::{StrategyError, StrategyResult};
use crate::strategy::{Builder, Factory, ParseStrategy, TokenPredicate};

/// Both halves of a pair as they were parsed
pub struct PairBuilder<A, B> {
    first: Option<ValidationResult<A>>,
    second: Option<ValidationResult<B>>,
}

impl<A, B> Default for PairBuilder<A, B> {
    fn default() -> Self {
        Self { first: None, second: None }
    }
}

impl<A, B> PairBuilder<A, B> {
    pub fn set_first(&mut self, first: ValidationResult<A>) {
        self.first = Some(first);
    }

    pub fn set_second(&mut self, second: ValidationResult<B>) {
        self.second = Some(second);
    }

    pub fn is_error(&self) -> bool {
        match (&self.first, &self.second) {
            (Some(first), Some(second)) => first.is_error() || second.is_error(),
            _ => true,
        }
    }
}

impl<A, B> Builder for PairBuilder<A, B> {
    type Output = Option<(A, B)>;

    fn build(self) -> ValidationResult<Option<(A, B)>> {
        match (self.first, self.second) {
            (Some(first), Some(second)) => first.combine(second, |a, b| Some((a, b))),
            _ => ValidationResult::error(None, StrategyError::IncompletePair),
        }
    }
}

/// Parse the first half up to `stop`, then skip to and past the delimiter
///
/// Returns the location to report unknown tokens at, with any non-blank
/// tokens found between the first half and the delimiter.
fn parse_first<'a, SA: ParseStrategy>(
    first: &SA,
    builder: &mut PairBuilder<SA::Output, impl Sized>,
    queue: &mut TokenQueue<'a>,
    stop: impl Fn(&Token) -> bool,
    delimiter: Option<&TokenPredicate>,
    args: &StrategyArgs,
    errored: bool,
) -> Vec<&'a Token> {
    let result = queue.slice(stop, |slice| first.parse_value(slice, args, errored));
    builder.set_first(result);
    queue.consume_whitespace();

    let mut unknown = Vec::new();
    if let Some(delimiter) = delimiter {
        while let Some(token) = queue.peek() {
            if delimiter(token) || token.is_eof() {
                break;
            }
            queue.poll();
            if !token.is_whitespace() && !token.is_special() {
                unknown.push(token);
            }
        }
        queue.poll_if(|t| delimiter(t));
    }
    unknown
}

fn finish<A, B>(
    builder: PairBuilder<A, B>,
    unknown: Vec<&Token>,
    location: loom_syntax::SourceLocation,
) -> ValidationResult<PairBuilder<A, B>> {
    if unknown.is_empty() {
        ValidationResult::success(builder)
    } else {
        ValidationResult::error(builder, StrategyError::unknown_tokens(unknown, location))
    }
}

/// `A delimiter B`, or `A B` split where B can start
pub struct PairStrategy<SA, SB> {
    first: Factory<SA>,
    second: Factory<SB>,
    delimiter: Option<TokenPredicate>,
    delimiter_tokens: Vec<Token>,
}

impl<SA, SB> Clone for PairStrategy<SA, SB> {
    fn clone(&self) -> Self {
        Self {
            first: Rc::clone(&self.first),
            second: Rc::clone(&self.second),
            delimiter: self.delimiter.clone(),
            delimiter_tokens: self.delimiter_tokens.clone(),
        }
    }
}

impl<SA: ParseStrategy, SB: ParseStrategy> PairStrategy<SA, SB> {
    pub fn new(first: impl Fn() -> SA + 'static, second: impl Fn() -> SB + 'static) -> Self {
        Self {
            first: Rc::new(first),
            second: Rc::new(second),
            delimiter: None,
            delimiter_tokens: Vec::new(),
        }
    }

    /// Split the halves at a token matching `delimiter`, re-emitted as `tokens`
    pub fn with_delimiter(mut self, delimiter: TokenPredicate, tokens: Vec<Token>) -> Self {
        self.delimiter = Some(delimiter);
        self.delimiter_tokens = tokens;
        self
    }
}

impl<SA: ParseStrategy, SB: ParseStrategy> ParseStrategy for PairStrategy<SA, SB> {
    type Output = Option<(SA::Output, SB::Output)>;
    type Builder = PairBuilder<SA::Output, SB::Output>;

    fn id(&self) -> &'static str {
        "Pair"
    }

    fn builder(&self) -> Self::Builder {
        PairBuilder::default()
    }

    fn can_process_token(&self, token: &Token, args: &StrategyArgs) -> bool {
        (self.first)().can_process_token(token, args)
    }

    fn process_tokens(
        &self,
        mut builder: Self::Builder,
        queue: &mut TokenQueue<'_>,
        args: &StrategyArgs,
        errored: bool,
    ) -> ValidationResult<Self::Builder> {
        let Some(head) = queue.peek() else {
            return ValidationResult::error(builder, StrategyError::NoTokens);
        };
        let location = head.location;
        let first = (self.first)();
        let second = (self.second)();

        let unknown = match &self.delimiter {
            Some(delimiter) => {
                if queue.find(|t| delimiter(t)).is_none() {
                    return ValidationResult::error(builder, StrategyError::PairSplitNotFound);
                }
                parse_first(&first, &mut builder, queue, |t| delimiter(t), Some(delimiter), args, errored)
            }
            None => {
                // The second half may start at any token after the first one
                let Some(boundary) = queue
                    .as_slice()
                    .iter()
                    .skip(1)
                    .find(|t| second.can_process_token(t, args))
                else {
                    return ValidationResult::error(builder, StrategyError::PairSplitNotFound);
                };
                parse_first(&first, &mut builder, queue, |t| std::ptr::eq(t, boundary), None, args, errored)
            }
        };

        let errored = errored || builder.is_error();
        builder.set_second(second.parse_value(queue, args, errored));
        finish(builder, unknown, location)
    }

    fn provide_tokens(&self, value: &Self::Output) -> StrategyResult<Vec<Token>> {
        let Some((a, b)) = value else {
            return Ok(Vec::new());
        };
        let mut tokens = (self.first)().provide_tokens(a)?;
        tokens.extend(self.delimiter_tokens.iter().cloned());
        tokens.extend((self.second)().provide_tokens(b)?);
        Ok(tokens)
    }
}

/// Chooses the second strategy from the parsed first value
pub type Selector<A, SB> = Rc<dyn Fn(&A) -> Option<SB>>;

/// `key delimiter value`, where the key selects the value's strategy
pub struct KeyedStrategy<SA: ParseStrategy, SB> {
    first: Factory<SA>,
    select: Selector<SA::Output, SB>,
    delimiter: TokenPredicate,
    delimiter_tokens: Vec<Token>,
}

impl<SA: ParseStrategy, SB> Clone for KeyedStrategy<SA, SB> {
    fn clone(&self) -> Self {
        Self {
            first: Rc::clone(&self.first),
            select: Rc::clone(&self.select),
            delimiter: Rc::clone(&self.delimiter),
            delimiter_tokens: self.delimiter_tokens.clone(),
        }
    }
}

impl<SA: ParseStrategy, SB: ParseStrategy> KeyedStrategy<SA, SB> {
    pub fn new(
        first: impl Fn() -> SA + 'static,
        select: impl Fn(&SA::Output) -> Option<SB> + 'static,
        delimiter: TokenPredicate,
    ) -> Self {
        Self {
            first: Rc::new(first),
            select: Rc::new(select),
            delimiter,
            delimiter_tokens: Vec::new(),
        }
    }

    /// Tokens placed between key and value when re-emitting
    pub fn with_delimiter_tokens(mut self, tokens: Vec<Token>) -> Self {
        self.delimiter_tokens = tokens;
        self
    }
}

impl<SA, SB> KeyedStrategy<SA, SB>
where
    SA: ParseStrategy<Output = String>,
    SB: ParseStrategy + 'static,
{
    /// Select value strategies from a table keyed by name
    pub fn from_table(
        first: impl Fn() -> SA + 'static,
        table: FxHashMap<String, Factory<SB>>,
        delimiter: TokenPredicate,
    ) -> Self {
        Self::new(first, move |key: &String| table.get(key).map(|f| f()), delimiter)
    }
}

impl<SA, SB> ParseStrategy for KeyedStrategy<SA, SB>
where
    SA: ParseStrategy,
    SA::Output: std::fmt::Debug,
    SB: ParseStrategy,
{
    type Output = Option<(SA::Output, SB::Output)>;
    type Builder = PairBuilder<SA::Output, SB::Output>;

    fn id(&self) -> &'static str {
        "Keyed"
    }

    fn builder(&self) -> Self::Builder {
        PairBuilder::default()
    }

    fn can_process_token(&self, token: &Token, args: &StrategyArgs) -> bool {
        (self.first)().can_process_token(token, args)
    }

    fn process_tokens(
        &self,
        mut builder: Self::Builder,
        queue: &mut TokenQueue<'_>,
        args: &StrategyArgs,
        errored: bool,
    ) -> ValidationResult<Self::Builder> {
        let Some(head) = queue.peek() else {
            return ValidationResult::error(builder, StrategyError::NoTokens);
        };
        let location = head.location;
        if queue.find(|t| (self.delimiter)(t)).is_none() {
            return ValidationResult::error(builder, StrategyError::PairSplitNotFound);
        }

        let first = (self.first)();
        let delimiter = &self.delimiter;
        let key = queue.slice(|t| delimiter(t), |slice| first.parse_value(slice, args, errored));
        let second = (self.select)(key.get());
        let key_text = format!("{:?}", key.get());
        builder.set_first(key);

        queue.consume_whitespace();
        let mut unknown = Vec::new();
        while let Some(token) = queue.peek() {
            if delimiter(token) || token.is_eof() {
                break;
            }
            queue.poll();
            if !token.is_whitespace() && !token.is_special() {
                unknown.push(token);
            }
        }
        queue.poll_if(|t| delimiter(t));

        match second {
            Some(second) => {
                let errored = errored || builder.is_error();
                builder.set_second(second.parse_value(queue, args, errored));
            }
            None => {
                log::debug!("No value strategy for key {}", key_text);
                return ValidationResult::error(builder, StrategyError::NoValueStrategy { key: key_text });
            }
        }
        finish(builder, unknown, location)
    }

    fn provide_tokens(&self, value: &Self::Output) -> StrategyResult<Vec<Token>> {
        let Some((a, b)) = value else {
            return Ok(Vec::new());
        };
        let second = (self.select)(a).ok_or_else(|| StrategyError::NoValueStrategy { key: format!("{:?}", a) })?;
        let mut tokens = (self.first)().provide_tokens(a)?;
        tokens.extend(self.delimiter_tokens.iter().cloned());
        tokens.extend(second.provide_tokens(b)?);
        Ok(tokens)
    }
}
