//! List strategy
//!
//! Separator-delimited elements, each parsed by a fresh element strategy
//! inside a slice that ends at the next separator. Element errors are kept
//! per entry and reported when the list is built.

use std::rc::Rc;

use loom_syntax::{Token, TokenQueue, ValidationResult};

use crate::args::StrategyArgs;
use crate::error::{StrategyError, StrategyResult};
use crate::strategy::{Builder, Factory, ParseStrategy, TokenPredicate};

/// How an end gate closes a list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EndGateBehavior {
    /// Consume the gate token
    pub poll: bool,
    /// Closing at a gate is an error
    pub error: bool,
    /// Element slices also stop at a gate
    pub slice: bool,
}

impl EndGateBehavior {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn poll(mut self) -> Self {
        self.poll = true;
        self
    }

    pub fn error(mut self) -> Self {
        self.error = true;
        self
    }

    pub fn slice(mut self) -> Self {
        self.slice = true;
        self
    }
}

/// Tokens placed around and between elements when re-emitting a list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListEncoding {
    pub open: Vec<Token>,
    pub separator: Vec<Token>,
    pub close: Vec<Token>,
}

/// A list of values parsed by an element strategy
pub struct ListStrategy<S: ParseStrategy> {
    element: Factory<S>,
    start: Option<TokenPredicate>,
    end: Option<TokenPredicate>,
    separator: TokenPredicate,
    end_gates: Vec<TokenPredicate>,
    behavior: EndGateBehavior,
    skip_errors: bool,
    encoding: ListEncoding,
}

impl<S: ParseStrategy> Clone for ListStrategy<S> {
    fn clone(&self) -> Self {
        Self {
            element: Rc::clone(&self.element),
            start: self.start.clone(),
            end: self.end.clone(),
            separator: Rc::clone(&self.separator),
            end_gates: self.end_gates.clone(),
            behavior: self.behavior,
            skip_errors: self.skip_errors,
            encoding: self.encoding.clone(),
        }
    }
}

impl<S: ParseStrategy> ListStrategy<S> {
    pub fn new(element: impl Fn() -> S + 'static, separator: TokenPredicate) -> Self {
        Self {
            element: Rc::new(element),
            start: None,
            end: None,
            separator,
            end_gates: Vec::new(),
            behavior: EndGateBehavior::default(),
            skip_errors: false,
            encoding: ListEncoding::default(),
        }
    }

    /// Open and close the list with the same token
    pub fn with_delimiter(self, delimiter: TokenPredicate) -> Self {
        self.with_delimiters(Rc::clone(&delimiter), delimiter)
    }

    pub fn with_delimiters(mut self, start: TokenPredicate, end: TokenPredicate) -> Self {
        self.start = Some(start);
        self.end = Some(end);
        self
    }

    pub fn with_end_gate(mut self, gate: TokenPredicate) -> Self {
        self.end_gates.push(gate);
        self
    }

    pub fn with_end_gate_behavior(mut self, behavior: EndGateBehavior) -> Self {
        self.behavior = behavior;
        self
    }

    /// Drop failed elements from the built list; their errors are still reported
    pub fn skip_errors(mut self) -> Self {
        self.skip_errors = true;
        self
    }

    pub fn with_encoding(mut self, encoding: ListEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    fn is_end(&self, token: &Token) -> bool {
        self.end.as_ref().is_some_and(|end| end(token))
    }

    fn is_gate(&self, token: &Token) -> bool {
        self.end_gates.iter().any(|gate| gate(token))
    }

    fn is_separator(&self, token: &Token) -> bool {
        (self.separator)(token)
    }

    /// Where an element slice stops
    fn is_slice_stop(&self, token: &Token) -> bool {
        token.is_eof()
            || self.is_separator(token)
            || self.is_end(token)
            || (self.behavior.slice && self.is_gate(token))
    }

    /// Skip whitespace and line terminators that carry no list meaning
    fn skip_blank(&self, queue: &mut TokenQueue<'_>) {
        while queue.peek().is_some_and(|t| {
            (t.is_whitespace() || (t.is_special() && !t.is_eof()))
                && !self.is_end(t)
                && !self.is_gate(t)
                && !self.is_separator(t)
        }) {
            queue.poll();
        }
    }

    /// Close the list if the head is the end delimiter or an end gate
    fn check_ends(&self, queue: &mut TokenQueue<'_>) -> Option<StrategyResult<()>> {
        let head = queue.peek()?;
        if self.is_end(head) {
            queue.poll();
            return Some(Ok(()));
        }
        if self.is_gate(head) {
            let location = head.location;
            if self.behavior.poll {
                queue.poll();
            }
            return Some(if self.behavior.error {
                Err(StrategyError::ListNotClosed { location })
            } else {
                Ok(())
            });
        }
        None
    }

    /// Parse one element from a slice
    ///
    /// Tokens before a position the element can start at, and tokens the
    /// element leaves behind, are reported against the element.
    fn parse_element(
        &self,
        element: &S,
        slice: &mut TokenQueue<'_>,
        args: &StrategyArgs,
        errored: bool,
    ) -> ValidationResult<S::Output> {
        let location = slice.peek().map(|t| t.location).unwrap_or_default();
        let mut unknown = Vec::new();
        while let Some(token) = slice.peek() {
            if element.can_process_token(token, args) {
                break;
            }
            slice.poll();
            if !token.is_whitespace() && !token.is_special() {
                unknown.push(token);
            }
        }

        let mut result = element.parse_value(slice, args, errored);
        unknown.extend(
            slice
                .as_slice()
                .iter()
                .filter(|t| !t.is_whitespace() && !t.is_special()),
        );
        if !unknown.is_empty() {
            result.add_error(StrategyError::unknown_tokens(unknown, location));
        }
        result
    }
}

impl<S: ParseStrategy> ParseStrategy for ListStrategy<S> {
    type Output = Vec<S::Output>;
    type Builder = ListBuilder<S::Output>;

    fn id(&self) -> &'static str {
        "List"
    }

    fn builder(&self) -> ListBuilder<S::Output> {
        ListBuilder::new(self.skip_errors)
    }

    fn can_process_token(&self, token: &Token, args: &StrategyArgs) -> bool {
        match &self.start {
            Some(start) => start(token),
            None => (self.element)().can_process_token(token, args),
        }
    }

    fn process_tokens(
        &self,
        mut builder: ListBuilder<S::Output>,
        queue: &mut TokenQueue<'_>,
        args: &StrategyArgs,
        errored: bool,
    ) -> ValidationResult<ListBuilder<S::Output>> {
        let Some(head) = queue.peek() else {
            return ValidationResult::error(builder, StrategyError::NoTokens);
        };
        let location = head.location;
        if let Some(start) = &self.start {
            if queue.poll_if(|t| start(t)).is_none() {
                let error = StrategyError::UnknownToken {
                    strategy: "List",
                    token: head.to_string(),
                    location,
                };
                return ValidationResult::error(builder, error);
            }
        }

        let element = (self.element)();
        let mut element_errored = false;
        loop {
            self.skip_blank(queue);
            if let Some(end) = self.check_ends(queue) {
                return match end {
                    Ok(()) => ValidationResult::success(builder),
                    Err(error) => ValidationResult::error(builder, error),
                };
            }
            if queue.is_eof() {
                break;
            }

            let entry = queue.slice(
                |t| self.is_slice_stop(t),
                |slice| self.parse_element(&element, slice, args, errored || element_errored),
            );
            if entry.is_error() {
                log::debug!("List element {} failed: {}", builder.len(), entry.error_text());
                element_errored = true;
            }
            builder.push(entry);

            self.skip_blank(queue);
            queue.poll_if(|t| self.is_separator(t));
        }

        if self.end.is_some() {
            ValidationResult::error(builder, StrategyError::Unclosed { strategy: "List", location })
        } else {
            ValidationResult::success(builder)
        }
    }

    fn provide_tokens(&self, value: &Vec<S::Output>) -> StrategyResult<Vec<Token>> {
        let element = (self.element)();
        let mut tokens = self.encoding.open.clone();
        for (index, item) in value.iter().enumerate() {
            if index > 0 {
                tokens.extend(self.encoding.separator.iter().cloned());
            }
            tokens.extend(element.provide_tokens(item)?);
        }
        tokens.extend(self.encoding.close.iter().cloned());
        Ok(tokens)
    }
}

/// Parsed entries of a list, each with its own errors
pub struct ListBuilder<T> {
    entries: Vec<ValidationResult<T>>,
    skip_errors: bool,
}

impl<T> ListBuilder<T> {
    fn new(skip_errors: bool) -> Self {
        Self { entries: Vec::new(), skip_errors }
    }

    pub fn push(&mut self, entry: ValidationResult<T>) {
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<T> Builder for ListBuilder<T> {
    type Output = Vec<T>;

    fn build(self) -> ValidationResult<Vec<T>> {
        let mut values = Vec::with_capacity(self.entries.len());
        let mut errors = Vec::new();
        for (index, entry) in self.entries.into_iter().enumerate() {
            let (value, entry_errors) = entry.into_parts();
            if !entry_errors.is_empty() {
                let joined = entry_errors.join(" ");
                let error = if self.skip_errors {
                    StrategyError::SkippedListEntry { index, errors: joined }
                } else {
                    StrategyError::ListEntry { index, errors: joined }
                };
                errors.push(error.to_string());
                if self.skip_errors {
                    continue;
                }
            }
            values.push(value);
        }
        ValidationResult::with_errors(values, errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitive::{NumberStrategy, StringStrategy};
    use crate::strategy::{of_char, of_type};
    use loom_syntax::{css, json5, to_text, Number};

    fn numbers() -> ListStrategy<NumberStrategy> {
        ListStrategy::new(|| NumberStrategy::new(css::NUMBER), of_type(css::COMMA))
    }

    fn parse<S: ParseStrategy>(strategy: &S, input: &str) -> ValidationResult<S::Output> {
        let tokens = css::tokenize(input);
        strategy.parse(&mut TokenQueue::new(&tokens), &StrategyArgs::default())
    }

    fn ints(values: &[Number]) -> Vec<i64> {
        values.iter().map(|n| n.as_f64() as i64).collect()
    }

    #[test]
    fn test_simple_list() {
        let result = parse(&numbers(), "1, 2,3 , 4");
        assert!(result.is_valid(), "{}", result.error_text());
        assert_eq!(ints(result.get()), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_skip_errors_drops_bad_element() {
        let result = parse(&numbers().skip_errors(), "1, 2, x, 4, 5");
        assert_eq!(ints(result.get()), vec![1, 2, 4, 5]);
        assert_eq!(result.errors().len(), 1);
        assert!(result.errors()[0].contains("entry 2"));
        assert!(result.errors()[0].ends_with("skipping entry"));
    }

    #[test]
    fn test_default_mode_keeps_positions() {
        let result = parse(&numbers(), "1, 2, x, 4, 5");
        assert!(result.is_error());
        assert_eq!(result.errors().len(), 1);
        let values = result.get();
        assert_eq!(values.len(), 5);
        assert_eq!(ints(&values[..2]), vec![1, 2]);
        assert_eq!(ints(&values[3..]), vec![4, 5]);
    }

    #[test]
    fn test_bad_element_reports_tokens() {
        let result = parse(&numbers(), "1, x 2 y");
        assert!(result.error_text().contains("ident(x)"));
        assert!(result.error_text().contains("ident(y)"));
    }

    #[test]
    fn test_delimited_list() {
        let list = numbers().with_delimiters(of_type(css::OPEN_BRACKET), of_type(css::CLOSE_BRACKET));
        let tokens = css::tokenize("[1, 2] rest");
        let mut queue = TokenQueue::new(&tokens);
        assert!(list.can_process_token(queue.peek().unwrap(), &StrategyArgs::default()));
        let result = list.parse(&mut queue, &StrategyArgs::default());
        assert!(result.is_valid(), "{}", result.error_text());
        assert_eq!(ints(result.get()), vec![1, 2]);
        queue.consume_whitespace();
        assert_eq!(queue.peek().unwrap().as_str(), Some("rest"));
    }

    #[test]
    fn test_empty_and_trailing_separator() {
        let list = numbers().with_delimiters(of_type(css::OPEN_BRACKET), of_type(css::CLOSE_BRACKET));
        assert!(parse(&list, "[ ]").get().is_empty());
        assert_eq!(ints(parse(&list, "[1, ]").get()), vec![1]);
    }

    #[test]
    fn test_missing_opener_consumes_nothing() {
        let list = numbers().with_delimiters(of_type(css::OPEN_BRACKET), of_type(css::CLOSE_BRACKET));
        let tokens = css::tokenize("1, 2]");
        let mut queue = TokenQueue::new(&tokens);
        let result = list.parse(&mut queue, &StrategyArgs::default());
        assert!(result.error_text().starts_with("Unknown token for List construction number(1)"));
        assert!(result.get().is_empty());
        assert_eq!(queue.remaining(), tokens.len());
    }

    #[test]
    fn test_unclosed_delimited_list() {
        let list = numbers().with_delimiters(of_type(css::OPEN_BRACKET), of_type(css::CLOSE_BRACKET));
        let result = parse(&list, "[1, 2");
        assert!(result.error_text().starts_with("Unclosed List"));
        assert_eq!(result.get().len(), 2);
    }

    #[test]
    fn test_end_gate_behaviors() {
        let gate = of_type(css::SEMICOLON);
        let tokens = css::tokenize("1, 2; 3");

        let list = numbers().with_end_gate(gate.clone()).with_end_gate_behavior(EndGateBehavior::new().slice());
        let mut queue = TokenQueue::new(&tokens);
        let result = list.parse(&mut queue, &StrategyArgs::default());
        assert!(result.is_valid());
        assert_eq!(ints(result.get()), vec![1, 2]);
        assert!(queue.peek_is(css::SEMICOLON));

        let list = numbers()
            .with_end_gate(gate)
            .with_end_gate_behavior(EndGateBehavior::new().slice().poll().error());
        let mut queue = TokenQueue::new(&tokens);
        let result = list.parse(&mut queue, &StrategyArgs::default());
        assert!(result.error_text().starts_with("List not properly closed"));
        assert!(!queue.peek_is(css::SEMICOLON));
    }

    #[test]
    fn test_line_terminator_gate() {
        let list = ListStrategy::new(|| StringStrategy::new(json5::IDENT), of_type(json5::COMMA))
            .with_end_gate(Rc::new(|t: &Token| t.is(loom_syntax::TokenType::EOL)))
            .with_end_gate_behavior(EndGateBehavior::new().slice());
        let tokens = json5::tokenize("a, b\nc");
        let result = list.parse(&mut TokenQueue::new(&tokens), &StrategyArgs::default());
        assert_eq!(result.get(), &vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_nested_lists() {
        let inner = || {
            ListStrategy::new(|| NumberStrategy::new(css::NUMBER), of_char(css::DELIM, '/'))
        };
        let outer = ListStrategy::new(inner, of_type(css::COMMA));
        let result = parse(&outer, "1 / 2, 3");
        assert!(result.is_valid(), "{}", result.error_text());
        assert_eq!(result.get().len(), 2);
        assert_eq!(ints(&result.get()[0]), vec![1, 2]);
    }

    #[test]
    fn test_provide_tokens_with_encoding() {
        let list = numbers().with_encoding(ListEncoding {
            open: css::tokenize("[")[..1].to_vec(),
            separator: css::tokenize(", ")[..2].to_vec(),
            close: css::tokenize("]")[..1].to_vec(),
        });
        let tokens = list
            .provide_tokens(&vec![Number::Integer(1), Number::Float(2.5)])
            .unwrap();
        assert_eq!(to_text(&tokens), "[1, 2.5]");
    }
}
