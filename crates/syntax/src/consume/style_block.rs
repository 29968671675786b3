//! Style blocks

use crate::css;
use crate::error::StructureError;
use crate::queue::TokenQueue;
use crate::token::Token;
use crate::validation::ValidationResult;

use super::component::ComponentValueConsumer;
use super::declaration::{write_lexical_errors, DeclarationConsumer};
use super::nodes::StyleBlock;
use super::rule::{AtRuleConsumer, QualifiedRuleConsumer};
use super::{ConsumeContext, Consumer};

/// Declarations and nested rules
///
/// An identifier starts a declaration ending at `;`, an at-keyword starts a
/// nested at-rule and `&` starts a nested qualified rule. Anything else is
/// reported and skipped up to the next `;`.
pub struct StyleBlockConsumer;

impl Consumer for StyleBlockConsumer {
    type Output = StyleBlock;

    fn consume(
        &self,
        queue: &mut TokenQueue<'_>,
        context: &mut ConsumeContext,
    ) -> ValidationResult<StyleBlock> {
        let mut block = StyleBlock::default();
        let mut errors = Vec::new();

        while let Some(token) = queue.peek() {
            if token.is_eof() {
                break;
            }
            if token.is_whitespace() || token.is_special() || token.is(css::SEMICOLON) {
                queue.poll();
            } else if token.is(css::AT_KEYWORD) {
                let rule = AtRuleConsumer.consume(queue, context);
                rule.write_errors(&mut errors);
                block.rules.push(rule.into_value());
            } else if token.is(css::IDENT) {
                let run = consume_run(queue, context, &mut errors);
                let declaration = DeclarationConsumer.consume(&mut TokenQueue::new(&run), context);
                if declaration.is_valid() {
                    block.declarations.push(declaration.into_value());
                } else {
                    log::debug!("Dropping declaration at {}: {}", token.location, declaration.error_text());
                    declaration.write_errors(&mut errors);
                }
            } else if css::is_delim(token, '&') {
                let rule = QualifiedRuleConsumer.consume(queue, context);
                rule.write_errors(&mut errors);
                block.rules.push(rule.into_value());
            } else {
                log::debug!("Skipping illegal token {} in style block", token);
                errors.push(
                    StructureError::IllegalStyleBlockToken {
                        token: token.to_string(),
                        location: token.location,
                    }
                    .to_string(),
                );
                for skipped in consume_run(queue, context, &mut errors) {
                    write_lexical_errors(&skipped, &mut errors);
                }
            }
        }
        ValidationResult::with_errors(block, errors)
    }
}

/// Component values up to the next `;` or EOF; the `;` is consumed
fn consume_run(queue: &mut TokenQueue<'_>, context: &mut ConsumeContext, errors: &mut Vec<String>) -> Vec<Token> {
    let mut run = Vec::new();
    while queue.peek().is_some_and(|t| !t.is(css::SEMICOLON) && !t.is_eof()) {
        let value = ComponentValueConsumer.consume(queue, context);
        value.write_errors(errors);
        run.push(value.into_value());
    }
    queue.poll_if(|t| t.is(css::SEMICOLON));
    run
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consume::Rule;

    fn consume(input: &str) -> ValidationResult<StyleBlock> {
        let tokens = css::tokenize(input);
        let mut queue = TokenQueue::new(&tokens);
        StyleBlockConsumer.consume(&mut queue, &mut ConsumeContext::default())
    }

    fn names(block: &StyleBlock) -> Vec<&str> {
        block.declarations.iter().map(|d| d.name.as_str()).collect()
    }

    #[test]
    fn test_declarations() {
        let result = consume("color: red; margin: 1px !important;;");
        assert!(result.is_valid());
        assert_eq!(names(result.get()), vec!["color", "margin"]);
        assert!(result.get().declaration("MARGIN").unwrap().important);
    }

    #[test]
    fn test_last_declaration_without_semicolon() {
        let result = consume("a: b; c: d");
        assert_eq!(names(result.get()), vec!["a", "c"]);
    }

    #[test]
    fn test_resync_after_illegal_token() {
        let result = consume("color: red; 5px solid; margin: 0");
        assert_eq!(names(result.get()), vec!["color", "margin"]);
        assert!(result.is_error());
        assert!(result.error_text().contains("Illegal token dimension(5px)"));
    }

    #[test]
    fn test_resync_after_bad_declaration() {
        let result = consume("color red; width: 2px; height:");
        assert_eq!(names(result.get()), vec!["width"]);
        assert_eq!(result.errors().len(), 2);
        assert!(result.errors()[0].contains("[color]"));
        assert!(result.errors()[1].contains("[height]"));
    }

    #[test]
    fn test_semicolon_inside_block_does_not_split_declaration() {
        let result = consume("a: {x;y}; b: c");
        assert!(result.is_valid());
        assert_eq!(names(result.get()), vec!["a", "b"]);
        assert_eq!(result.get().declarations[0].value_text(), "{x;y}");
    }

    #[test]
    fn test_nested_rules() {
        let result = consume("color: red; & .child { color: blue } @media print { color: black }");
        assert!(result.is_valid(), "{}", result.error_text());
        assert_eq!(result.get().rules.len(), 2);
        let Rule::Qualified(nested) = &result.get().rules[0] else {
            panic!("expected qualified rule");
        };
        assert_eq!(nested.prelude_text(), "& .child");
        let inner = nested.style_block();
        assert_eq!(inner.get().declaration("color").unwrap().value_text(), "blue");
        assert!(matches!(result.get().rules[1], Rule::At(_)));
    }

    #[test]
    fn test_lexical_errors_in_skipped_run() {
        let result = consume("! \"open\n; a: b");
        assert_eq!(names(result.get()), vec!["a"]);
        assert!(result.error_text().contains("Illegal newline"));
    }
}
