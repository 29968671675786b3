//! Component values, simple blocks and functions

use crate::css;
use crate::error::{SourceLocation, StructureError};
use crate::queue::TokenQueue;
use crate::token::Token;
use crate::token_type::TokenType;
use crate::validation::ValidationResult;

use super::nodes::{Function, SimpleBlock};
use super::{ConsumeContext, Consumer};

/// A single token, or a whole block or function re-wrapped as a token
pub struct ComponentValueConsumer;

impl Consumer for ComponentValueConsumer {
    type Output = Token;

    fn consume(
        &self,
        queue: &mut TokenQueue<'_>,
        context: &mut ConsumeContext,
    ) -> ValidationResult<Token> {
        let Some(head) = queue.peek() else {
            return ValidationResult::error(
                Token::bare(TokenType::UNKNOWN, SourceLocation::default()),
                StructureError::exhausted("component value"),
            );
        };

        if let Some(closing) = css::closing_for(head.kind) {
            SimpleBlockConsumer { closing }
                .consume(queue, context)
                .map(SimpleBlock::into_token)
        } else if head.is(css::FUNCTION) {
            FunctionConsumer
                .consume(queue, context)
                .map(Function::into_token)
        } else {
            queue.poll();
            ValidationResult::success(head.clone())
        }
    }
}

/// Block opened by the head token and closed by `closing`
pub struct SimpleBlockConsumer {
    pub closing: TokenType,
}

impl Consumer for SimpleBlockConsumer {
    type Output = SimpleBlock;

    fn consume(
        &self,
        queue: &mut TokenQueue<'_>,
        context: &mut ConsumeContext,
    ) -> ValidationResult<SimpleBlock> {
        let Some(open) = queue.poll() else {
            return ValidationResult::error(
                SimpleBlock::new(TokenType::UNKNOWN, self.closing, SourceLocation::default()),
                StructureError::exhausted("simple block"),
            );
        };
        let mut block = SimpleBlock::new(open.kind, self.closing, open.location);
        let construct = format!("{}-block", open.kind.raw_text().unwrap_or(open.kind.name()));

        if !context.enter() {
            skip_nested(queue);
            return depth_exceeded(block, context, open.location);
        }
        let mut errors = Vec::new();
        let result = consume_until(queue, context, self.closing, &mut block.values, &mut errors);
        context.leave();

        if let Err(error) = result {
            errors.push(error.into_message(construct, open.location));
        }
        ValidationResult::with_errors(block, errors)
    }
}

/// Function token followed by arguments up to `)`
pub struct FunctionConsumer;

impl Consumer for FunctionConsumer {
    type Output = Function;

    fn consume(
        &self,
        queue: &mut TokenQueue<'_>,
        context: &mut ConsumeContext,
    ) -> ValidationResult<Function> {
        let location = queue.peek().map(|t| t.location).unwrap_or_default();
        let Some(head) = queue.poll_if(|t| t.is(css::FUNCTION)) else {
            let found = queue.peek().map_or_else(|| "nothing".to_string(), Token::to_string);
            return ValidationResult::error(
                Function { name: String::new(), values: Vec::new(), location },
                StructureError::UnexpectedToken { expected: "function".to_string(), found, location },
            );
        };
        let mut function = Function {
            name: head.text().into_owned(),
            values: Vec::new(),
            location,
        };
        let construct = format!("function [{}]", function.name);

        if !context.enter() {
            skip_nested(queue);
            return depth_exceeded(function, context, location);
        }
        let mut errors = Vec::new();
        let result = consume_until(queue, context, css::CLOSE_PAREN, &mut function.values, &mut errors);
        context.leave();

        if let Err(error) = result {
            errors.push(error.into_message(construct, location));
        }
        ValidationResult::with_errors(function, errors)
    }
}

/// How a block body ended without its closing token
enum Unfinished {
    Eof,
    Exhausted,
}

impl Unfinished {
    fn into_message(self, construct: String, location: SourceLocation) -> String {
        match self {
            Unfinished::Eof => StructureError::unexpected_eof(construct, location).to_string(),
            Unfinished::Exhausted => StructureError::unclosed(construct, location).to_string(),
        }
    }
}

/// Consume component values into `values` until `closing` is polled
fn consume_until(
    queue: &mut TokenQueue<'_>,
    context: &mut ConsumeContext,
    closing: TokenType,
    values: &mut Vec<Token>,
    errors: &mut Vec<String>,
) -> Result<(), Unfinished> {
    loop {
        match queue.peek() {
            None => return Err(Unfinished::Exhausted),
            Some(token) if token.is_eof() => return Err(Unfinished::Eof),
            Some(token) if token.kind == closing => {
                queue.poll();
                return Ok(());
            }
            Some(_) => {
                let value = ComponentValueConsumer.consume(queue, context);
                value.write_errors(errors);
                values.push(value.into_value());
            }
        }
    }
}

/// Skip a block body without recursing, up to its balancing close token
fn skip_nested(queue: &mut TokenQueue<'_>) {
    let mut depth = 1usize;
    while let Some(token) = queue.peek() {
        if token.is_eof() {
            break;
        }
        queue.poll();
        if css::closing_for(token.kind).is_some() || token.is(css::FUNCTION) {
            depth += 1;
        } else if token.is(css::CLOSE_BRACE) || token.is(css::CLOSE_BRACKET) || token.is(css::CLOSE_PAREN) {
            depth -= 1;
            if depth == 0 {
                break;
            }
        }
    }
}

fn depth_exceeded<T>(node: T, context: &ConsumeContext, location: SourceLocation) -> ValidationResult<T> {
    let limit = context.options().max_nesting_depth;
    log::debug!("Nesting depth limit {} reached at {}, skipping block", limit, location);
    ValidationResult::error(node, StructureError::DepthLimit { limit, location })
}
