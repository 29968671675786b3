//! Selector parser
//!
//! Turns a qualified rule prelude such as `a.b#c:hover, :func(x)` into a
//! `Selector`. Each comma-separated group is one compound selector. A group
//! with an invalid or unknown part is dropped and reported; the other
//! groups are still returned.

use loom_syntax::consume::{ComponentValueConsumer, ConsumeContext, Consumer, QualifiedRule};
use loom_syntax::{css, SourceLocation, Token, TokenQueue, ValidationResult};
use smallvec::SmallVec;

use crate::error::StyleError;
use crate::registry::SelectorRegistry;
use crate::selector::{FunctionSelector, RuleSelector, Selector};

pub struct SelectorParser<'r> {
    registry: &'r SelectorRegistry,
}

impl<'r> SelectorParser<'r> {
    pub fn new(registry: &'r SelectorRegistry) -> Self {
        Self { registry }
    }

    /// Parse selector source text
    pub fn parse(&self, input: &str) -> ValidationResult<Option<RuleSelector>> {
        let tokens = css::tokenize(input);
        let mut queue = TokenQueue::new(&tokens);
        let mut context = ConsumeContext::default();
        let mut values = Vec::new();
        let mut errors = Vec::new();
        while !queue.is_eof() {
            let value = ComponentValueConsumer.consume(&mut queue, &mut context);
            value.write_errors(&mut errors);
            values.push(value.into_value());
        }
        ValidationResult::with_errors((), errors).and_then(|_| self.parse_prelude(&values))
    }

    pub fn parse_rule(&self, rule: &QualifiedRule) -> ValidationResult<Option<RuleSelector>> {
        self.parse_prelude(&rule.prelude)
    }

    /// Parse consumed component values
    ///
    /// Several groups yield an `Any`; a group of several parts yields an
    /// `All`. `None` when no group survived.
    pub fn parse_prelude(&self, prelude: &[Token]) -> ValidationResult<Option<RuleSelector>> {
        let start = prelude.first().map_or(SourceLocation::default(), |t| t.location);
        let mut selectors = Vec::new();
        let mut errors = Vec::new();

        let mut location = start;
        for group in prelude.split(|t| t.is(css::COMMA)) {
            let compound = trim(group);
            location = compound.first().map_or(location, |t| t.location);
            match self.parse_compound(compound) {
                Ok(Some(selector)) => selectors.push(selector),
                Ok(None) => errors.push(StyleError::EmptySelector { location }.to_string()),
                Err(error) => {
                    log::debug!("Dropping selector group '{}': {}", loom_syntax::to_text(compound), error);
                    errors.push(error.to_string());
                }
            }
        }

        let selector = match selectors.len() {
            0 => None,
            1 => selectors.pop(),
            _ => Some(Selector::Any(selectors)),
        };
        ValidationResult::with_errors(selector.map(RuleSelector::new), errors)
    }

    fn parse_compound(&self, tokens: &[Token]) -> Result<Option<Selector>, StyleError> {
        let mut parts: SmallVec<[Selector; 4]> = SmallVec::new();
        let mut queue = TokenQueue::new(tokens);
        while let Some(token) = queue.poll() {
            let part = if token.is_whitespace() || is_combinator(token) {
                return Err(StyleError::UnsupportedCombinator { location: token.location });
            } else if token.is(css::IDENT) {
                Selector::Type(token.text().to_ascii_lowercase())
            } else if token.is(css::HASH) {
                Selector::Id(token.text().into_owned())
            } else if token.as_char() == Some('*') {
                Selector::Universal
            } else if token.as_char() == Some('.') {
                match queue.poll_if(|t| t.is(css::IDENT)) {
                    Some(class) => Selector::Class(class.text().into_owned()),
                    None => return Err(invalid(".", token.location)),
                }
            } else if token.is(css::COLON) {
                self.parse_pseudo(&mut queue, token.location)?
            } else {
                return Err(invalid(&token.to_text(), token.location));
            };
            parts.push(part);
        }
        Ok(match parts.len() {
            0 => None,
            1 => parts.pop(),
            _ => Some(Selector::All(parts.into_vec())),
        })
    }

    /// The part after a `:`
    fn parse_pseudo(&self, queue: &mut TokenQueue<'_>, colon: SourceLocation) -> Result<Selector, StyleError> {
        let Some(token) = queue.poll() else {
            return Err(invalid(":", colon));
        };
        if token.is(css::IDENT) {
            let name = token.text().to_ascii_lowercase();
            if !self.registry.has_pseudo_class(&name) {
                return Err(StyleError::UnknownPseudoClass { name, location: token.location });
            }
            return Ok(Selector::PseudoClass(name));
        }
        let Some(function) = token.as_function() else {
            return Err(invalid(&format!(":{}", token.to_text()), token.location));
        };
        let name = function.name.to_ascii_lowercase();
        let Some(behaviour) = self.registry.function(&name) else {
            return Err(StyleError::UnknownFunction { name, location: token.location });
        };
        behaviour
            .prepare(&function.values)
            .map_err(|reason| StyleError::InvalidArguments {
                name: name.clone(),
                reason,
                location: token.location,
            })?;
        Ok(Selector::Function(FunctionSelector::new(name, function.values.clone(), behaviour)))
    }
}

fn invalid(text: &str, location: SourceLocation) -> StyleError {
    StyleError::InvalidSelector { text: text.to_string(), location }
}

fn is_combinator(token: &Token) -> bool {
    matches!(token.as_char(), Some('>' | '+' | '~'))
}

fn is_blank(token: &Token) -> bool {
    token.is_whitespace() || token.is_special()
}

fn trim(tokens: &[Token]) -> &[Token] {
    let start = tokens.iter().position(|t| !is_blank(t)).unwrap_or(tokens.len());
    let end = tokens.iter().rposition(|t| !is_blank(t)).map_or(start, |i| i + 1);
    &tokens[start..end]
}
