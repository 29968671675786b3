//! Declarations

use crate::css;
use crate::error::StructureError;
use crate::queue::TokenQueue;
use crate::token::Token;
use crate::validation::ValidationResult;

use super::component::ComponentValueConsumer;
use super::nodes::Declaration;
use super::{ConsumeContext, Consumer};

/// `name : values [!important]` over a bounded run
///
/// The trailing `!important` marker is removed from the values and recorded
/// in the `important` flag.
pub struct DeclarationConsumer;

impl Consumer for DeclarationConsumer {
    type Output = Declaration;

    fn consume(
        &self,
        queue: &mut TokenQueue<'_>,
        context: &mut ConsumeContext,
    ) -> ValidationResult<Declaration> {
        let mut declaration = Declaration {
            location: queue.peek().map(|t| t.location).unwrap_or_default(),
            ..Declaration::default()
        };
        let location = declaration.location;

        let Some(head) = queue.poll() else {
            return ValidationResult::error(declaration, StructureError::exhausted("declaration"));
        };
        if !head.is(css::IDENT) {
            return ValidationResult::error(
                declaration,
                StructureError::UnexpectedToken {
                    expected: "identifier".to_string(),
                    found: head.to_string(),
                    location,
                },
            );
        }
        declaration.name = head.text().into_owned();

        queue.consume_whitespace();
        if queue.poll_if(|t| t.is(css::COLON)).is_none() {
            let name = declaration.name.clone();
            return ValidationResult::error(declaration, StructureError::MissingColon { name, location });
        }
        queue.consume_whitespace();

        let mut errors = Vec::new();
        while queue.peek().is_some_and(|t| !t.is_eof()) {
            let value = ComponentValueConsumer.consume(queue, context);
            value.write_errors(&mut errors);
            let token = value.into_value();
            write_lexical_errors(&token, &mut errors);
            declaration.values.push(token);
        }

        trim_trailing_whitespace(&mut declaration.values);
        declaration.important = strip_important(&mut declaration.values);

        if declaration.values.is_empty() {
            errors.push(
                StructureError::EmptyDeclaration {
                    name: declaration.name.clone(),
                    location,
                }
                .to_string(),
            );
        }
        ValidationResult::with_errors(declaration, errors)
    }
}

/// Report the lexical error of `token` and of every token nested in its
/// function or block
pub(super) fn write_lexical_errors(token: &Token, errors: &mut Vec<String>) {
    if let Some(message) = token.error_message() {
        errors.push(
            StructureError::Lexical {
                token: token.to_string(),
                message: message.to_string(),
                location: token.location,
            }
            .to_string(),
        );
    }
    let nested = match (token.as_function(), token.as_block()) {
        (Some(function), _) => function.values.as_slice(),
        (_, Some(block)) => block.values.as_slice(),
        _ => &[],
    };
    for child in nested {
        write_lexical_errors(child, errors);
    }
}

fn trim_trailing_whitespace(values: &mut Vec<Token>) {
    while values.last().is_some_and(Token::is_whitespace) {
        values.pop();
    }
}

/// Remove a trailing `! important` pair, scanning back over whitespace
fn strip_important(values: &mut Vec<Token>) -> bool {
    let Some(last) = values.last() else {
        return false;
    };
    let is_important = last.is(css::IDENT)
        && last
            .as_str()
            .is_some_and(|s| s.eq_ignore_ascii_case("important"));
    if !is_important {
        return false;
    }

    let Some(bang) = values[..values.len() - 1]
        .iter()
        .rposition(|t| !t.is_whitespace())
    else {
        return false;
    };
    if !css::is_delim(&values[bang], '!') {
        return false;
    }
    values.truncate(bang);
    trim_trailing_whitespace(values);
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn consume(input: &str) -> ValidationResult<Declaration> {
        let tokens = css::tokenize(input);
        let mut queue = TokenQueue::new(&tokens);
        DeclarationConsumer.consume(&mut queue, &mut ConsumeContext::default())
    }

    #[test]
    fn test_simple_declaration() {
        let result = consume("color : red");
        assert!(result.is_valid());
        let declaration = result.get();
        assert_eq!(declaration.name, "color");
        assert_eq!(declaration.value_text(), "red");
        assert!(!declaration.important);
    }

    #[test]
    fn test_important_is_stripped() {
        let result = consume("margin: 1px 2px ! IMPORTANT  ");
        assert!(result.is_valid());
        let declaration = result.get();
        assert!(declaration.important);
        assert_eq!(declaration.value_text(), "1px 2px");
        assert_eq!(declaration.to_text(), "margin:1px 2px !important");
    }

    #[test]
    fn test_important_without_bang_is_a_value() {
        let result = consume("x: important");
        assert!(!result.get().important);
        assert_eq!(result.get().value_text(), "important");
    }

    #[test]
    fn test_only_important_is_empty() {
        let result = consume("x: !important");
        assert!(result.get().important);
        assert!(result.error_text().starts_with("Empty declaration for [x]"));
    }

    #[test]
    fn test_missing_colon() {
        let result = consume("color red");
        assert!(result.is_error());
        assert!(result.error_text().starts_with("Declaration without ':' for [color]"));
    }

    #[test]
    fn test_empty_value() {
        let result = consume("color:   ");
        assert!(result.error_text().starts_with("Empty declaration for [color]"));
    }

    #[test]
    fn test_not_an_identifier() {
        let result = consume("12: x");
        assert!(result.error_text().starts_with("Expected identifier"));
    }

    #[test]
    fn test_lexical_errors_surface() {
        let result = consume("width: 1.2.3px");
        assert!(result.is_error());
        assert!(result.error_text().contains("Multiple decimal points"));
    }

    #[test]
    fn test_nested_lexical_errors_surface() {
        let result = consume("a: f(\"x\n)");
        assert!(result.is_error());
        assert!(result.error_text().contains("Illegal newline in string value"), "{}", result.error_text());

        let result = consume("b: [1 g(1.2.3)]");
        assert_eq!(result.errors().len(), 1);
        assert!(result.error_text().contains("Multiple decimal points"));

        assert!(consume("c: f([x] \"ok\")").is_valid());
    }

    #[test]
    fn test_values_keep_functions_and_blocks() {
        let result = consume("background: rgb(0, 0, 0) [a]");
        assert!(result.is_valid());
        let values = &result.get().values;
        assert!(values[0].is(css::FUNCTION_BLOCK));
        assert!(values[2].is(css::SIMPLE_BLOCK));
    }
}
