//! Primitive strategies
//!
//! String, number and boolean values read from tokens of one configured
//! type. All three share the same token loop: an optional opening and
//! closing delimiter, error gates that end the run early, and an
//! `UnknownStrategy` for tokens of any other type. Line terminators are an
//! error gate unless `ignore_eol` is set.

use std::marker::PhantomData;
use std::rc::Rc;

use loom_syntax::{json5, Number, SourceLocation, Token, TokenQueue, TokenType, TokenValue, ValidationResult};

use crate::args::StrategyArgs;
use crate::error::{StrategyError, StrategyResult};
use crate::strategy::{of_type, Builder, ParseStrategy, Provider, TokenPredicate, UnknownStrategy};

/// Value-specific half of a primitive strategy
pub trait Primitive {
    type Value;
    type Builder: Builder<Output = Self::Value> + Default;

    const ID: &'static str;

    /// Accept a token of the configured type
    fn accept(builder: &mut Self::Builder, token: &Token, args: &StrategyArgs) -> StrategyResult<()>;

    /// Accept a foreign token under `UnknownStrategy::Convert`
    fn convert(builder: &mut Self::Builder, token: &Token);

    /// Tokens for `value` when no provider is configured
    fn default_tokens(value: &Self::Value, kind: TokenType) -> StrategyResult<Vec<Token>>;
}

/// A strategy reading one primitive value
pub struct PrimitiveStrategy<P: Primitive> {
    token_type: TokenType,
    delimiter: Option<TokenPredicate>,
    error_gates: Vec<TokenPredicate>,
    eol_break: bool,
    unknown: UnknownStrategy,
    provider: Option<Provider<P::Value>>,
    primitive: PhantomData<P>,
}

pub type StringStrategy = PrimitiveStrategy<StringPrimitive>;
pub type NumberStrategy = PrimitiveStrategy<NumberPrimitive>;
pub type BooleanStrategy = PrimitiveStrategy<BooleanPrimitive>;

impl<P: Primitive> Clone for PrimitiveStrategy<P> {
    fn clone(&self) -> Self {
        Self {
            token_type: self.token_type,
            delimiter: self.delimiter.clone(),
            error_gates: self.error_gates.clone(),
            eol_break: self.eol_break,
            unknown: self.unknown,
            provider: self.provider.clone(),
            primitive: PhantomData,
        }
    }
}

impl<P: Primitive> PrimitiveStrategy<P> {
    /// Read tokens of `token_type`
    pub fn new(token_type: TokenType) -> Self {
        Self {
            token_type,
            delimiter: None,
            error_gates: Vec::new(),
            eol_break: true,
            unknown: UnknownStrategy::default(),
            provider: None,
            primitive: PhantomData,
        }
    }

    /// Require the run to open and close with a token matching `delimiter`
    pub fn with_delimiter(mut self, delimiter: TokenPredicate) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    pub fn with_delimiter_type(self, kind: TokenType) -> Self {
        self.with_delimiter(of_type(kind))
    }

    /// End the run at a token matching `gate`; an error inside a delimited run
    pub fn with_error_gate(mut self, gate: TokenPredicate) -> Self {
        self.error_gates.push(gate);
        self
    }

    /// Let line terminators pass through instead of gating the run
    pub fn ignore_eol(mut self) -> Self {
        self.eol_break = false;
        self
    }

    pub fn with_unknown_strategy(mut self, unknown: UnknownStrategy) -> Self {
        self.unknown = unknown;
        self
    }

    /// Re-emit values with `provider` instead of one token of the strategy's type
    pub fn with_provider(mut self, provider: impl Fn(&P::Value) -> Vec<Token> + 'static) -> Self {
        self.provider = Some(Rc::new(provider));
        self
    }

    pub fn token_type(&self) -> TokenType {
        self.token_type
    }

    fn is_gate(&self, token: &Token) -> bool {
        (self.eol_break && token.is_special()) || self.error_gates.iter().any(|gate| gate(token))
    }

    fn is_delimiter(&self, token: &Token) -> bool {
        self.delimiter.as_ref().is_some_and(|d| d(token))
    }

    /// Delimiter and gate handling for one polled token; `Some` ends the run
    fn check_delimiters(&self, token: &Token, queue: &TokenQueue<'_>) -> Option<StrategyResult<()>> {
        let delimited = self.delimiter.is_some();
        if self.is_gate(token) {
            return Some(if delimited { Err(self.unclosed(token.location)) } else { Ok(()) });
        }
        if self.is_delimiter(token) {
            return Some(Ok(()));
        }
        if token.is_special() && !queue.can_poll() && delimited {
            return Some(Err(self.unclosed(token.location)));
        }
        None
    }

    fn unclosed(&self, location: SourceLocation) -> StrategyError {
        StrategyError::Unclosed { strategy: P::ID, location }
    }
}

impl<P: Primitive> ParseStrategy for PrimitiveStrategy<P> {
    type Output = P::Value;
    type Builder = P::Builder;

    fn id(&self) -> &'static str {
        P::ID
    }

    fn builder(&self) -> P::Builder {
        P::Builder::default()
    }

    fn can_process_token(&self, token: &Token, _args: &StrategyArgs) -> bool {
        match &self.delimiter {
            Some(delimiter) => delimiter(token),
            None => token.is(self.token_type),
        }
    }

    fn process_tokens(
        &self,
        mut builder: P::Builder,
        queue: &mut TokenQueue<'_>,
        args: &StrategyArgs,
        _errored: bool,
    ) -> ValidationResult<P::Builder> {
        if let Some(delimiter) = &self.delimiter {
            if queue.poll_if(|t| delimiter(t)).is_none() {
                let error = match queue.peek() {
                    Some(head) => StrategyError::UnknownToken {
                        strategy: P::ID,
                        token: head.to_string(),
                        location: head.location,
                    },
                    None => StrategyError::NoTokens,
                };
                return ValidationResult::error(builder, error);
            }
        }
        while let Some(token) = queue.poll() {
            if let Some(end) = self.check_delimiters(token, queue) {
                return match end {
                    Ok(()) => ValidationResult::success(builder),
                    Err(error) => ValidationResult::error(builder, error),
                };
            }
            if token.is(self.token_type) {
                if let Err(error) = P::accept(&mut builder, token, args) {
                    return ValidationResult::error(builder, error);
                }
                continue;
            }
            if (token.is_whitespace() || token.is_special()) && self.unknown != UnknownStrategy::Convert {
                continue;
            }
            match self.unknown {
                UnknownStrategy::Throw => {
                    let error = StrategyError::UnknownToken {
                        strategy: P::ID,
                        token: token.to_string(),
                        location: token.location,
                    };
                    return ValidationResult::error(builder, error);
                }
                UnknownStrategy::Ignore => {
                    log::trace!("{} strategy ignoring {}", P::ID, token);
                    if !queue.can_poll() && self.delimiter.is_some() {
                        return ValidationResult::error(builder, self.unclosed(token.location));
                    }
                }
                UnknownStrategy::Convert => P::convert(&mut builder, token),
            }
        }
        if self.delimiter.is_some() {
            ValidationResult::error(builder, StrategyError::UnclosedStream)
        } else {
            ValidationResult::success(builder)
        }
    }

    fn provide_tokens(&self, value: &P::Value) -> StrategyResult<Vec<Token>> {
        match &self.provider {
            Some(provider) => Ok(provider(value)),
            None => P::default_tokens(value, self.token_type),
        }
    }
}

/// Concatenated token text
#[derive(Debug, Default)]
pub struct StringPrimitive;

#[derive(Debug, Default)]
pub struct StringBuilder {
    text: String,
}

impl StringBuilder {
    pub fn push_str(&mut self, text: &str) {
        self.text.push_str(text);
    }
}

impl Builder for StringBuilder {
    type Output = String;

    fn build(self) -> ValidationResult<String> {
        ValidationResult::success(self.text)
    }
}

impl Primitive for StringPrimitive {
    type Value = String;
    type Builder = StringBuilder;

    const ID: &'static str = "String";

    fn accept(builder: &mut StringBuilder, token: &Token, args: &StrategyArgs) -> StrategyResult<()> {
        if args.quote_strings {
            builder.push_str(&token.to_text());
        } else {
            builder.push_str(&token.text());
        }
        Ok(())
    }

    fn convert(builder: &mut StringBuilder, token: &Token) {
        builder.push_str(&token.to_text());
    }

    fn default_tokens(value: &String, kind: TokenType) -> StrategyResult<Vec<Token>> {
        Ok(vec![Token::text_token(kind, value.clone(), SourceLocation::default())])
    }
}

/// Exactly one numeric token
#[derive(Debug, Default)]
pub struct NumberPrimitive;

#[derive(Debug, Default)]
pub struct NumberBuilder {
    number: Option<Number>,
}

impl NumberBuilder {
    /// Store `number`; false if a number was already accepted
    pub fn accept(&mut self, number: Number) -> bool {
        if self.number.is_some() {
            return false;
        }
        self.number = Some(number);
        true
    }
}

impl Builder for NumberBuilder {
    type Output = Number;

    fn build(self) -> ValidationResult<Number> {
        match self.number {
            Some(number) => ValidationResult::success(number),
            None => ValidationResult::error(Number::Integer(0), StrategyError::Missing { kind: "number" }),
        }
    }
}

impl Primitive for NumberPrimitive {
    type Value = Number;
    type Builder = NumberBuilder;

    const ID: &'static str = "Number";

    fn accept(builder: &mut NumberBuilder, token: &Token, _args: &StrategyArgs) -> StrategyResult<()> {
        let number = token
            .as_number()
            .or_else(|| Number::parse(token.text().trim(), true))
            .ok_or_else(|| StrategyError::Invalid {
                kind: "number",
                text: token.text().into_owned(),
                location: token.location,
            })?;
        if builder.accept(number) {
            Ok(())
        } else {
            Err(StrategyError::Multiple { kind: "number", location: token.location })
        }
    }

    fn convert(builder: &mut NumberBuilder, token: &Token) {
        if let Ok(value) = token.text().trim().parse::<f64>() {
            builder.accept(Number::Float(value));
        }
    }

    /// Infinities and NaN only have a spelling in JSON5
    fn default_tokens(value: &Number, kind: TokenType) -> StrategyResult<Vec<Token>> {
        if !value.as_f64().is_finite() && kind.dialect() != json5::DIALECT {
            return Err(StrategyError::EncodingUnsupported {
                strategy: Self::ID,
                value: value.to_string(),
                kind: kind.to_string(),
            });
        }
        Ok(vec![Token::new(kind, TokenValue::Number(*value), SourceLocation::default())])
    }
}

/// Exactly one boolean-like token
#[derive(Debug, Default)]
pub struct BooleanPrimitive;

#[derive(Debug, Default)]
pub struct BooleanBuilder {
    value: Option<bool>,
}

impl BooleanBuilder {
    /// Store `value`; false if a boolean was already accepted
    pub fn accept(&mut self, value: bool) -> bool {
        if self.value.is_some() {
            return false;
        }
        self.value = Some(value);
        true
    }
}

impl Builder for BooleanBuilder {
    type Output = bool;

    fn build(self) -> ValidationResult<bool> {
        match self.value {
            Some(value) => ValidationResult::success(value),
            None => ValidationResult::error(false, StrategyError::Missing { kind: "boolean" }),
        }
    }
}

fn parse_bool(text: &str) -> Option<bool> {
    let text = text.trim();
    if text.eq_ignore_ascii_case("true") {
        Some(true)
    } else if text.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

impl Primitive for BooleanPrimitive {
    type Value = bool;
    type Builder = BooleanBuilder;

    const ID: &'static str = "Boolean";

    fn accept(builder: &mut BooleanBuilder, token: &Token, _args: &StrategyArgs) -> StrategyResult<()> {
        let value = token
            .as_bool()
            .or_else(|| parse_bool(&token.text()))
            .ok_or_else(|| StrategyError::Invalid {
                kind: "boolean",
                text: token.text().into_owned(),
                location: token.location,
            })?;
        if builder.accept(value) {
            Ok(())
        } else {
            Err(StrategyError::Multiple { kind: "boolean", location: token.location })
        }
    }

    fn convert(builder: &mut BooleanBuilder, token: &Token) {
        if let Some(value) = parse_bool(&token.text()) {
            builder.accept(value);
        }
    }

    fn default_tokens(value: &bool, kind: TokenType) -> StrategyResult<Vec<Token>> {
        Ok(vec![Token::new(kind, TokenValue::Bool(*value), SourceLocation::default())])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::of_char;
    use loom_syntax::{css, to_text};

    fn parse<S: ParseStrategy>(strategy: &S, tokens: &[Token], args: &StrategyArgs) -> ValidationResult<S::Output> {
        strategy.parse(&mut TokenQueue::new(tokens), args)
    }

    #[test]
    fn test_string_from_css_string() {
        let tokens = css::tokenize("\"a b\"");
        let result = parse(&StringStrategy::new(css::STRING), &tokens, &StrategyArgs::default());
        assert!(result.is_valid());
        assert_eq!(result.get(), "a b");
    }

    #[test]
    fn test_string_quote_strings_flag() {
        let tokens = css::tokenize("\"a\\\"b\"");
        let args = StrategyArgs::from_flags(["--quote-strings"]);
        let result = parse(&StringStrategy::new(css::STRING), &tokens, &args);
        assert_eq!(result.get(), "\"a\\\"b\"");
    }

    #[test]
    fn test_string_idents_concatenate_across_whitespace() {
        let tokens = css::tokenize("foo bar");
        let result = parse(&StringStrategy::new(css::IDENT), &tokens, &StrategyArgs::default());
        assert!(result.is_valid());
        assert_eq!(result.get(), "foobar");
    }

    #[test]
    fn test_unknown_token_throws() {
        let tokens = css::tokenize("foo 12");
        let result = parse(&StringStrategy::new(css::IDENT), &tokens, &StrategyArgs::default());
        assert!(result.is_error());
        assert!(result.error_text().starts_with("Unknown token for String construction number(12)"));
    }

    #[test]
    fn test_unknown_token_ignored() {
        let tokens = css::tokenize("foo 12 bar");
        let strategy = StringStrategy::new(css::IDENT).with_unknown_strategy(UnknownStrategy::Ignore);
        let result = parse(&strategy, &tokens, &StrategyArgs::default());
        assert!(result.is_valid());
        assert_eq!(result.get(), "foobar");
    }

    #[test]
    fn test_unknown_token_converted() {
        let tokens = css::tokenize("foo 12");
        let strategy = StringStrategy::new(css::IDENT).with_unknown_strategy(UnknownStrategy::Convert);
        let result = parse(&strategy, &tokens, &StrategyArgs::default());
        assert_eq!(result.get(), "foo 12");
    }

    #[test]
    fn test_delimited_run() {
        let tokens = css::tokenize("|a b| c");
        let strategy = StringStrategy::new(css::IDENT).with_delimiter(of_char(css::DELIM, '|'));
        assert!(strategy.can_process_token(&tokens[0], &StrategyArgs::default()));
        let mut queue = TokenQueue::new(&tokens);
        let result = strategy.parse(&mut queue, &StrategyArgs::default());
        assert!(result.is_valid());
        assert_eq!(result.get(), "ab");
        queue.consume_whitespace();
        assert_eq!(queue.peek().unwrap().as_str(), Some("c"));
    }

    #[test]
    fn test_unclosed_delimited_run() {
        let tokens = css::tokenize("|a b");
        let strategy = StringStrategy::new(css::IDENT).with_delimiter(of_char(css::DELIM, '|'));
        let result = parse(&strategy, &tokens, &StrategyArgs::default());
        assert!(result.is_error());
        assert!(result.error_text().starts_with("Unclosed String"));
    }

    #[test]
    fn test_error_gate() {
        let tokens = css::tokenize("a ; b");
        let strategy = StringStrategy::new(css::IDENT).with_error_gate(of_type(css::SEMICOLON));
        let result = parse(&strategy, &tokens, &StrategyArgs::default());
        assert!(result.is_valid());
        assert_eq!(result.get(), "a");
    }

    #[test]
    fn test_eol_gate() {
        let tokens = json5::tokenize("a\nb");
        let strategy = StringStrategy::new(json5::IDENT);
        assert_eq!(parse(&strategy, &tokens, &StrategyArgs::default()).get(), "a");
        let strategy = StringStrategy::new(json5::IDENT).ignore_eol();
        assert_eq!(parse(&strategy, &tokens, &StrategyArgs::default()).get(), "ab");
    }

    #[test]
    fn test_number_single() {
        let tokens = css::tokenize("2.5");
        let result = parse(&NumberStrategy::new(css::NUMBER), &tokens, &StrategyArgs::default());
        assert!(result.is_valid());
        assert_eq!(*result.get(), Number::Float(2.5));
    }

    #[test]
    fn test_number_rejects_second_token() {
        let tokens = css::tokenize("1 2");
        let result = parse(&NumberStrategy::new(css::NUMBER), &tokens, &StrategyArgs::default());
        assert!(result.is_error());
        assert!(result.error_text().starts_with("Multiple number tokens found at 1:3, expected 1"));
        assert_eq!(*result.get(), Number::Integer(1));
    }

    #[test]
    fn test_number_missing() {
        let tokens = css::tokenize("");
        let result = parse(&NumberStrategy::new(css::NUMBER), &tokens, &StrategyArgs::default());
        assert_eq!(result.error_text(), "No number token found");
        assert_eq!(*result.get(), Number::Integer(0));
    }

    #[test]
    fn test_number_convert() {
        let tokens = css::tokenize("\"3.5\"");
        let strategy = NumberStrategy::new(css::NUMBER).with_unknown_strategy(UnknownStrategy::Convert);
        let result = parse(&strategy, &tokens, &StrategyArgs::default());
        assert_eq!(*result.get(), Number::Float(3.5));
    }

    #[test]
    fn test_boolean_decoded_and_text() {
        let tokens = json5::tokenize("true");
        let result = parse(&BooleanStrategy::new(json5::BOOLEAN), &tokens, &StrategyArgs::default());
        assert!(*result.get());

        let tokens = css::tokenize("FALSE");
        let result = parse(&BooleanStrategy::new(css::IDENT), &tokens, &StrategyArgs::default());
        assert!(result.is_valid());
        assert!(!*result.get());
    }

    #[test]
    fn test_boolean_invalid_text() {
        let tokens = css::tokenize("maybe");
        let result = parse(&BooleanStrategy::new(css::IDENT), &tokens, &StrategyArgs::default());
        assert!(result.error_text().starts_with("Invalid boolean 'maybe'"));
    }

    #[test]
    fn test_round_trip_string_with_escapes() {
        let strategy = StringStrategy::new(css::STRING);
        let value = "say \"hi\"\\ now\nplease".to_string();
        let text = to_text(&strategy.provide_tokens(&value).unwrap());
        let tokens = css::tokenize(&text);
        assert_eq!(parse(&strategy, &tokens, &StrategyArgs::default()).into_value(), value);
    }

    #[test]
    fn test_round_trip_numbers() {
        let strategy = NumberStrategy::new(css::NUMBER);
        for value in [Number::Integer(42), Number::Integer(-7), Number::Float(2.5), Number::Float(-0.125), Number::Float(3.0)] {
            let text = to_text(&strategy.provide_tokens(&value).unwrap());
            let tokens = css::tokenize(&text);
            let result = parse(&strategy, &tokens, &StrategyArgs::default());
            assert!(result.is_valid(), "{}: {}", text, result.error_text());
            assert_eq!(*result.get(), value);
        }
    }

    #[test]
    fn test_round_trip_extreme_floats() {
        let strategy = NumberStrategy::new(css::NUMBER);
        for value in [1e15, 1e16, -1e15, 1.5e300, -2.5e-7, 1e-12, f64::MAX, f64::MIN_POSITIVE] {
            let value = Number::Float(value);
            let text = to_text(&strategy.provide_tokens(&value).unwrap());
            let tokens = css::tokenize(&text);
            let result = parse(&strategy, &tokens, &StrategyArgs::default());
            assert!(result.is_valid(), "{}: {}", text, result.error_text());
            assert_eq!(*result.get(), value, "re-parsed from {}", text);
        }
    }

    #[test]
    fn test_non_finite_numbers() {
        let strategy = NumberStrategy::new(css::NUMBER);
        let error = strategy.provide_tokens(&Number::Float(f64::INFINITY)).unwrap_err();
        assert_eq!(error.to_string(), "Number strategy can't encode Infinity as number");
        assert!(strategy.provide_tokens(&Number::Float(f64::NAN)).is_err());

        let strategy = NumberStrategy::new(json5::NUMBER);
        for value in [f64::INFINITY, f64::NEG_INFINITY] {
            let text = to_text(&strategy.provide_tokens(&Number::Float(value)).unwrap());
            let tokens = json5::tokenize(&text);
            assert_eq!(*parse(&strategy, &tokens, &StrategyArgs::default()).get(), Number::Float(value));
        }
        let text = to_text(&strategy.provide_tokens(&Number::Float(f64::NAN)).unwrap());
        let tokens = json5::tokenize(&text);
        assert!(parse(&strategy, &tokens, &StrategyArgs::default()).get().as_f64().is_nan());
    }

    #[test]
    fn test_delimiter_must_open_the_run() {
        let tokens = css::tokenize("a b|");
        let strategy = StringStrategy::new(css::IDENT).with_delimiter(of_char(css::DELIM, '|'));
        let mut queue = TokenQueue::new(&tokens);
        let result = strategy.parse(&mut queue, &StrategyArgs::default());
        assert!(result.error_text().starts_with("Unknown token for String construction ident(a)"));
        assert_eq!(queue.remaining(), tokens.len());
    }

    #[test]
    fn test_round_trip_booleans() {
        let strategy = BooleanStrategy::new(json5::BOOLEAN);
        for value in [true, false] {
            let text = to_text(&strategy.provide_tokens(&value).unwrap());
            let tokens = json5::tokenize(&text);
            assert_eq!(*parse(&strategy, &tokens, &StrategyArgs::default()).get(), value);
        }
    }

    #[test]
    fn test_custom_provider() {
        let strategy = BooleanStrategy::new(css::IDENT)
            .with_provider(|b| vec![Token::text_token(css::IDENT, if *b { "yes" } else { "no" }, SourceLocation::default())]);
        assert_eq!(to_text(&strategy.provide_tokens(&true).unwrap()), "yes");
    }
}
