//! Alternatives strategy
//!
//! Tries candidate strategies in order on a speculative split of the queue
//! and commits the first one that parses cleanly.

use std::rc::Rc;

use loom_syntax::{Token, TokenQueue, ValidationResult};

use crate::args::StrategyArgs;
use crate::error::{StrategyError, StrategyResult};
use crate::strategy::{BoxedStrategy, Builder, Factory, ParseStrategy, Provider};

pub struct AlternativesStrategy<T> {
    candidates: Vec<Factory<BoxedStrategy<T>>>,
    provider: Option<Provider<T>>,
}

impl<T> Clone for AlternativesStrategy<T> {
    fn clone(&self) -> Self {
        Self {
            candidates: self.candidates.clone(),
            provider: self.provider.clone(),
        }
    }
}

impl<T> Default for AlternativesStrategy<T> {
    fn default() -> Self {
        Self { candidates: Vec::new(), provider: None }
    }
}

impl<T> AlternativesStrategy<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a candidate, tried after those already added
    pub fn or<S>(mut self, candidate: impl Fn() -> S + 'static) -> Self
    where
        S: ParseStrategy<Output = T> + 'static,
    {
        self.candidates.push(Rc::new(move || candidate().boxed()));
        self
    }

    /// Re-emit values with `provider` instead of asking each candidate in turn
    pub fn with_provider(mut self, provider: impl Fn(&T) -> Vec<Token> + 'static) -> Self {
        self.provider = Some(Rc::new(provider));
        self
    }
}

pub struct AlternativesBuilder<T> {
    chosen: Option<ValidationResult<T>>,
}

impl<T> Builder for AlternativesBuilder<T> {
    type Output = Option<T>;

    fn build(self) -> ValidationResult<Option<T>> {
        match self.chosen {
            Some(result) => result.map(Some),
            None => ValidationResult::error(None, StrategyError::NoAlternatives),
        }
    }
}

impl<T> ParseStrategy for AlternativesStrategy<T> {
    type Output = Option<T>;
    type Builder = AlternativesBuilder<T>;

    fn id(&self) -> &'static str {
        "Alternatives"
    }

    fn builder(&self) -> AlternativesBuilder<T> {
        AlternativesBuilder { chosen: None }
    }

    fn can_process_token(&self, token: &Token, args: &StrategyArgs) -> bool {
        self.candidates
            .iter()
            .any(|candidate| candidate().can_process_token(token, args))
    }

    fn process_tokens(
        &self,
        mut builder: AlternativesBuilder<T>,
        queue: &mut TokenQueue<'_>,
        args: &StrategyArgs,
        errored: bool,
    ) -> ValidationResult<AlternativesBuilder<T>> {
        let Some(head) = queue.peek() else {
            return ValidationResult::error(builder, StrategyError::NoTokens);
        };
        for candidate in &self.candidates {
            let strategy = candidate();
            if !strategy.can_process_token(head, args) {
                continue;
            }
            let result = queue.attempt(|split| strategy.parse_value(split, args, errored));
            if result.is_valid() {
                log::trace!("Alternative {} matched at {}", strategy.id(), head.location);
                builder.chosen = Some(result);
                return ValidationResult::success(builder);
            }
            log::debug!("Alternative {} rejected: {}", strategy.id(), result.error_text());
        }
        // Nothing chosen; `build` reports it
        ValidationResult::success(builder)
    }

    fn provide_tokens(&self, value: &Option<T>) -> StrategyResult<Vec<Token>> {
        let Some(value) = value else {
            return Ok(Vec::new());
        };
        if let Some(provider) = &self.provider {
            return Ok(provider(value));
        }
        let mut last_error = StrategyError::NoAlternatives;
        for candidate in &self.candidates {
            match candidate().provide_tokens(value) {
                Ok(tokens) => return Ok(tokens),
                Err(error) => last_error = error,
            }
        }
        Err(last_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitive::StringStrategy;
    use crate::strategy::UnknownStrategy;
    use loom_syntax::{css, to_text};

    fn text_or_number() -> AlternativesStrategy<String> {
        AlternativesStrategy::new()
            .or(|| StringStrategy::new(css::STRING))
            .or(|| StringStrategy::new(css::IDENT))
            .or(|| StringStrategy::new(css::NUMBER).with_unknown_strategy(UnknownStrategy::Convert))
    }

    fn parse<S: ParseStrategy>(strategy: &S, input: &str) -> ValidationResult<S::Output> {
        let tokens = css::tokenize(input);
        strategy.parse(&mut TokenQueue::new(&tokens), &StrategyArgs::default())
    }

    #[test]
    fn test_first_matching_candidate_wins() {
        assert_eq!(parse(&text_or_number(), "\"a\"").into_value(), Some("a".to_string()));
        assert_eq!(parse(&text_or_number(), "b").into_value(), Some("b".to_string()));
        assert_eq!(parse(&text_or_number(), "12").into_value(), Some("12".to_string()));
    }

    #[test]
    fn test_failed_candidate_rolls_back() {
        let alternatives = AlternativesStrategy::new()
            .or(|| StringStrategy::new(css::NUMBER))
            .or(|| StringStrategy::new(css::NUMBER).with_unknown_strategy(UnknownStrategy::Convert));
        let tokens = css::tokenize("1, 2");
        let mut queue = TokenQueue::new(&tokens);
        let result = alternatives.parse(&mut queue, &StrategyArgs::default());
        assert!(result.is_valid(), "{}", result.error_text());
        assert_eq!(result.into_value(), Some("1, 2".to_string()));
        assert!(queue.is_eof());
    }

    #[test]
    fn test_no_valid_alternatives() {
        let result = parse(&text_or_number(), "{");
        assert_eq!(result.errors().len(), 1);
        assert_eq!(result.error_text(), "No valid alternatives");
        assert!(result.get().is_none());

        let tokens = css::tokenize("a b 1");
        let strict = AlternativesStrategy::new().or(|| StringStrategy::new(css::IDENT));
        let mut queue = TokenQueue::new(&tokens);
        let result = strict.parse(&mut queue, &StrategyArgs::default());
        assert!(result.is_error());
        assert_eq!(queue.remaining(), tokens.len());
    }

    #[test]
    fn test_can_process_any_candidate() {
        let tokens = css::tokenize("a 1 ;");
        let args = StrategyArgs::default();
        let alternatives = text_or_number();
        assert!(alternatives.can_process_token(&tokens[0], &args));
        assert!(alternatives.can_process_token(&tokens[2], &args));
        assert!(!alternatives.can_process_token(&tokens[4], &args));
    }

    #[test]
    fn test_provide_tokens_uses_first_candidate() {
        let tokens = text_or_number().provide_tokens(&Some("x y".to_string())).unwrap();
        assert_eq!(to_text(&tokens), "\"x y\"");
        assert!(text_or_number().provide_tokens(&None).unwrap().is_empty());
    }
}
