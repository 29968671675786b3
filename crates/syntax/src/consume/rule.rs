//! Qualified rules, at-rules and rule lists

use crate::css;
use crate::error::{SourceLocation, StructureError};
use crate::queue::TokenQueue;
use crate::token::Token;
use crate::validation::ValidationResult;

use super::component::{ComponentValueConsumer, SimpleBlockConsumer};
use super::nodes::{AtRule, QualifiedRule, Rule, SimpleBlock};
use super::{ConsumeContext, Consumer};

/// What ended a rule prelude
enum PreludeEnd {
    Block(SimpleBlock),
    Semicolon,
    Eof,
    Exhausted,
}

/// Collect prelude component values until a `{` block, a `;` (if
/// `semicolon_ends` is set) or the end of input
fn consume_prelude(
    queue: &mut TokenQueue<'_>,
    context: &mut ConsumeContext,
    semicolon_ends: bool,
    prelude: &mut Vec<Token>,
    errors: &mut Vec<String>,
) -> PreludeEnd {
    loop {
        let Some(token) = queue.peek() else {
            return PreludeEnd::Exhausted;
        };
        if token.is_eof() {
            return PreludeEnd::Eof;
        }
        if semicolon_ends && token.is(css::SEMICOLON) {
            queue.poll();
            return PreludeEnd::Semicolon;
        }
        if token.is(css::OPEN_BRACE) {
            let block = SimpleBlockConsumer { closing: css::CLOSE_BRACE }.consume(queue, context);
            block.write_errors(errors);
            return PreludeEnd::Block(block.into_value());
        }
        if let Some(block) = token.as_block().filter(|b| b.opening == css::OPEN_BRACE) {
            queue.poll();
            return PreludeEnd::Block(block.clone());
        }
        let value = ComponentValueConsumer.consume(queue, context);
        value.write_errors(errors);
        prelude.push(value.into_value());
    }
}

fn trim_whitespace(tokens: &mut Vec<Token>) {
    while tokens.last().is_some_and(Token::is_whitespace) {
        tokens.pop();
    }
    let leading = tokens.iter().take_while(|t| t.is_whitespace()).count();
    tokens.drain(..leading);
}

/// Prelude followed by a `{}` block
pub struct QualifiedRuleConsumer;

impl Consumer for QualifiedRuleConsumer {
    type Output = Rule;

    fn consume(&self, queue: &mut TokenQueue<'_>, context: &mut ConsumeContext) -> ValidationResult<Rule> {
        let location = queue.peek().map(|t| t.location).unwrap_or_default();
        let mut prelude = Vec::new();
        let mut errors = Vec::new();

        match consume_prelude(queue, context, false, &mut prelude, &mut errors) {
            PreludeEnd::Block(block) => {
                trim_whitespace(&mut prelude);
                log::trace!("Qualified rule at {}", location);
                ValidationResult::with_errors(Rule::Qualified(QualifiedRule { prelude, block, location }), errors)
            }
            end => {
                errors.push(unfinished(end, "qualified-rule".to_string(), location));
                ValidationResult::with_errors(Rule::Unknown(location), errors)
            }
        }
    }
}

/// `@name prelude` ended by `;` or a `{}` block
pub struct AtRuleConsumer;

impl Consumer for AtRuleConsumer {
    type Output = Rule;

    fn consume(&self, queue: &mut TokenQueue<'_>, context: &mut ConsumeContext) -> ValidationResult<Rule> {
        let location = queue.peek().map(|t| t.location).unwrap_or_default();
        let Some(head) = queue.poll_if(|t| t.is(css::AT_KEYWORD)) else {
            let found = queue.peek().map_or_else(|| "nothing".to_string(), Token::to_string);
            return ValidationResult::error(
                Rule::Unknown(location),
                StructureError::UnexpectedToken { expected: "at-keyword".to_string(), found, location },
            );
        };
        let name = head.text().into_owned();
        let mut prelude = Vec::new();
        let mut errors = Vec::new();

        let block = match consume_prelude(queue, context, true, &mut prelude, &mut errors) {
            PreludeEnd::Block(block) => Some(block),
            PreludeEnd::Semicolon => None,
            end => {
                errors.push(unfinished(end, format!("at-rule [{}]", name), location));
                return ValidationResult::with_errors(Rule::Unknown(location), errors);
            }
        };
        trim_whitespace(&mut prelude);
        log::trace!("At-rule @{} at {}", name, location);
        ValidationResult::with_errors(Rule::At(AtRule { name, prelude, block, location }), errors)
    }
}

fn unfinished(end: PreludeEnd, construct: String, location: SourceLocation) -> String {
    match end {
        PreludeEnd::Exhausted => StructureError::unclosed(construct, location).to_string(),
        _ => StructureError::unexpected_eof(construct, location).to_string(),
    }
}

/// Top-level rule list
///
/// Whitespace, line terminators and `<!--`/`-->` are skipped. A rule that
/// cannot be recovered becomes `Rule::Unknown` and parsing continues.
pub struct ListOfRulesConsumer;

impl Consumer for ListOfRulesConsumer {
    type Output = Vec<Rule>;

    fn consume(&self, queue: &mut TokenQueue<'_>, context: &mut ConsumeContext) -> ValidationResult<Vec<Rule>> {
        let mut rules = Vec::new();
        let mut errors = Vec::new();

        while let Some(token) = queue.peek() {
            if token.is_eof() {
                break;
            }
            if token.is_whitespace() || token.is_special() || token.is(css::CDO) || token.is(css::CDC) {
                queue.poll();
                continue;
            }
            let rule = if token.is(css::AT_KEYWORD) {
                AtRuleConsumer.consume(queue, context)
            } else {
                QualifiedRuleConsumer.consume(queue, context)
            };
            if rule.is_error() {
                log::debug!("Recovered from malformed rule at {}: {}", token.location, rule.error_text());
            }
            rule.write_errors(&mut errors);
            rules.push(rule.into_value());
        }
        ValidationResult::with_errors(rules, errors)
    }
}
