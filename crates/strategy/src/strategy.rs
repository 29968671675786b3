//! Strategy traits
//!
//! A strategy is a stateless, reusable recipe for turning a bounded token run
//! into a value. Each parse gets a fresh `Builder` from the strategy, feeds it
//! through `process_tokens` and finally calls `Builder::build`.

use std::fmt;
use std::rc::Rc;

use loom_syntax::{Token, TokenQueue, TokenType, ValidationResult};

use crate::args::StrategyArgs;
use crate::error::StrategyResult;

/// Shared token test used for delimiters, separators and gates
pub type TokenPredicate = Rc<dyn Fn(&Token) -> bool>;

/// Creates a fresh strategy for every use
pub type Factory<S> = Rc<dyn Fn() -> S>;

/// Re-emits a value as tokens
pub type Provider<T> = Rc<dyn Fn(&T) -> Vec<Token>>;

/// Predicate matching tokens of `kind`
pub fn of_type(kind: TokenType) -> TokenPredicate {
    Rc::new(move |token: &Token| token.is(kind))
}

/// Predicate matching a token of `kind` whose single character is `c`
pub fn of_char(kind: TokenType, c: char) -> TokenPredicate {
    Rc::new(move |token: &Token| token.is_char(kind, c))
}

/// Predicate matching when any of `predicates` does
pub fn any_of(predicates: &[TokenPredicate]) -> TokenPredicate {
    let predicates = predicates.to_vec();
    Rc::new(move |token: &Token| predicates.iter().any(|p| p(token)))
}

pub fn factory<S>(f: impl Fn() -> S + 'static) -> Factory<S> {
    Rc::new(f)
}

/// Single-use accumulator for one parse
pub trait Builder {
    type Output;

    fn build(self) -> ValidationResult<Self::Output>;
}

/// What a strategy does with a token it cannot process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownStrategy {
    /// Stop with an error
    #[default]
    Throw,
    /// Skip it; only an unclosed run is an error
    Ignore,
    /// Fall back to the token's encoded text
    Convert,
}

/// A token-run-to-value recipe
pub trait ParseStrategy {
    type Output;
    type Builder: Builder<Output = Self::Output>;

    /// Name used in error messages
    fn id(&self) -> &'static str;

    /// A fresh accumulator
    fn builder(&self) -> Self::Builder;

    /// Can a run starting with `token` be handled by this strategy
    fn can_process_token(&self, token: &Token, args: &StrategyArgs) -> bool;

    /// Consume tokens from `queue` into `builder`
    ///
    /// `errored` tells nested strategies that an enclosing parse has already
    /// failed.
    fn process_tokens(
        &self,
        builder: Self::Builder,
        queue: &mut TokenQueue<'_>,
        args: &StrategyArgs,
        errored: bool,
    ) -> ValidationResult<Self::Builder>;

    /// Re-emit `value` as tokens
    fn provide_tokens(&self, value: &Self::Output) -> StrategyResult<Vec<Token>>;

    fn start_processing(
        &self,
        queue: &mut TokenQueue<'_>,
        args: &StrategyArgs,
        errored: bool,
    ) -> ValidationResult<Self::Builder> {
        self.process_tokens(self.builder(), queue, args, errored)
    }

    /// Process and build in one step, collecting errors from both
    fn parse_value(
        &self,
        queue: &mut TokenQueue<'_>,
        args: &StrategyArgs,
        errored: bool,
    ) -> ValidationResult<Self::Output> {
        self.start_processing(queue, args, errored)
            .and_then(|builder| builder.build())
    }

    fn parse(&self, queue: &mut TokenQueue<'_>, args: &StrategyArgs) -> ValidationResult<Self::Output> {
        self.parse_value(queue, args, false)
    }

    /// Erase the concrete strategy type
    fn boxed(self) -> BoxedStrategy<Self::Output>
    where
        Self: Sized + 'static,
    {
        BoxedStrategy::new(self)
    }
}

/// Object-safe view of a strategy
trait DynStrategy<T> {
    fn erased_id(&self) -> &'static str;
    fn erased_can_process(&self, token: &Token, args: &StrategyArgs) -> bool;
    fn erased_parse(
        &self,
        queue: &mut TokenQueue<'_>,
        args: &StrategyArgs,
        errored: bool,
    ) -> ValidationResult<ValidationResult<T>>;
    fn erased_provide(&self, value: &T) -> StrategyResult<Vec<Token>>;
}

impl<S: ParseStrategy> DynStrategy<S::Output> for S {
    fn erased_id(&self) -> &'static str {
        self.id()
    }

    fn erased_can_process(&self, token: &Token, args: &StrategyArgs) -> bool {
        self.can_process_token(token, args)
    }

    fn erased_parse(
        &self,
        queue: &mut TokenQueue<'_>,
        args: &StrategyArgs,
        errored: bool,
    ) -> ValidationResult<ValidationResult<S::Output>> {
        self.start_processing(queue, args, errored)
            .map(|builder| builder.build())
    }

    fn erased_provide(&self, value: &S::Output) -> StrategyResult<Vec<Token>> {
        self.provide_tokens(value)
    }
}

/// A strategy with its concrete type erased
///
/// Lets strategies of different types producing the same value sit side by
/// side, as in `AlternativesStrategy` or a keyed value table.
pub struct BoxedStrategy<T>(Rc<dyn DynStrategy<T>>);

impl<T> Clone for BoxedStrategy<T> {
    fn clone(&self) -> Self {
        Self(Rc::clone(&self.0))
    }
}

impl<T> fmt::Debug for BoxedStrategy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("BoxedStrategy").field(&self.0.erased_id()).finish()
    }
}

impl<T> BoxedStrategy<T> {
    pub fn new<S>(strategy: S) -> Self
    where
        S: ParseStrategy<Output = T> + 'static,
    {
        Self(Rc::new(strategy))
    }
}

/// Builder of a `BoxedStrategy`
///
/// Processing runs the erased strategy to completion, so the builder only
/// stores its built result. A builder that never saw any tokens builds the
/// strategy's result for an empty run.
pub struct BoxedBuilder<T> {
    state: BoxedState<T>,
}

enum BoxedState<T> {
    Fresh(Rc<dyn DynStrategy<T>>),
    Done(ValidationResult<T>),
}

impl<T> Builder for BoxedBuilder<T> {
    type Output = T;

    fn build(self) -> ValidationResult<T> {
        match self.state {
            BoxedState::Fresh(strategy) => {
                let mut queue = TokenQueue::new(&[]);
                strategy
                    .erased_parse(&mut queue, &StrategyArgs::default(), false)
                    .and_then(|result| result)
            }
            BoxedState::Done(result) => result,
        }
    }
}

impl<T> ParseStrategy for BoxedStrategy<T> {
    type Output = T;
    type Builder = BoxedBuilder<T>;

    fn id(&self) -> &'static str {
        self.0.erased_id()
    }

    fn builder(&self) -> BoxedBuilder<T> {
        BoxedBuilder { state: BoxedState::Fresh(Rc::clone(&self.0)) }
    }

    fn can_process_token(&self, token: &Token, args: &StrategyArgs) -> bool {
        self.0.erased_can_process(token, args)
    }

    fn process_tokens(
        &self,
        _builder: BoxedBuilder<T>,
        queue: &mut TokenQueue<'_>,
        args: &StrategyArgs,
        errored: bool,
    ) -> ValidationResult<BoxedBuilder<T>> {
        self.0
            .erased_parse(queue, args, errored)
            .map(|result| BoxedBuilder { state: BoxedState::Done(result) })
    }

    fn provide_tokens(&self, value: &T) -> StrategyResult<Vec<Token>> {
        self.0.erased_provide(value)
    }
}
