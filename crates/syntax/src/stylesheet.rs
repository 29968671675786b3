//! Stylesheet entry points
//!
//! Tokenize CSS text and run the rule list consumer over it.

use crate::consume::{
    ConsumeContext, Consumer, ListOfRulesConsumer, QualifiedRule, Rule, StyleBlock,
    StyleBlockConsumer,
};
use crate::css;
use crate::options::ParseOptions;
use crate::queue::TokenQueue;
use crate::validation::ValidationResult;

/// An ordered list of parsed rules
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Stylesheet {
    pub rules: Vec<Rule>,
}

impl Stylesheet {
    /// Parse a stylesheet with default options
    pub fn parse(input: &str) -> ValidationResult<Stylesheet> {
        Self::parse_with(input, &ParseOptions::default())
    }

    pub fn parse_with(input: &str, options: &ParseOptions) -> ValidationResult<Stylesheet> {
        let tokens = css::tokenize_with(input, options);
        let mut queue = TokenQueue::new(&tokens);
        let mut context = ConsumeContext::new(options.clone());
        let result = ListOfRulesConsumer
            .consume(&mut queue, &mut context)
            .map(|rules| Stylesheet { rules });
        log::debug!(
            "Parsed {} rules ({} errors)",
            result.get().rules.len(),
            result.errors().len()
        );
        result
    }

    pub fn qualified_rules(&self) -> impl Iterator<Item = &QualifiedRule> {
        self.rules.iter().filter_map(Rule::as_qualified)
    }

    pub fn to_text(&self) -> String {
        self.rules
            .iter()
            .map(Rule::to_text)
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Parse a bare declaration list, such as an inline style attribute
pub fn parse_style_block(input: &str) -> ValidationResult<StyleBlock> {
    let tokens = css::tokenize(input);
    let mut queue = TokenQueue::new(&tokens);
    StyleBlockConsumer.consume(&mut queue, &mut ConsumeContext::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn test_rule_with_important_declaration() {
        init_logging();
        let result = Stylesheet::parse(".a{color:red;margin:1px !important}");
        assert!(result.is_valid(), "{}", result.error_text());

        let sheet = result.get();
        assert_eq!(sheet.rules.len(), 1);
        let rule = sheet.rules[0].as_qualified().unwrap();
        assert_eq!(rule.prelude_text(), ".a");
        assert_eq!(rule.block.opening, css::OPEN_BRACE);

        let body = rule.style_block();
        assert!(body.is_valid());
        let declarations = &body.get().declarations;
        assert_eq!(declarations.len(), 2);
        assert_eq!(declarations[0].name, "color");
        assert!(!declarations[0].important);
        assert_eq!(declarations[1].name, "margin");
        assert_eq!(declarations[1].value_text(), "1px");
        assert!(declarations[1].important);
    }

    #[test]
    fn test_unterminated_block() {
        init_logging();
        let result = Stylesheet::parse("a{");
        assert!(result.is_error());
        assert!(result.error_text().contains("Unexpected EOF"));
        assert_eq!(result.get().rules.len(), 1);
    }

    #[test]
    fn test_many_rules_with_one_bad() {
        let input = "a { x: 1 }\n@import url(x.css);\nb { y: 2; oops; z: 3 }\nc { w: 4 }";
        let result = Stylesheet::parse(input);
        assert_eq!(result.get().qualified_rules().count(), 3);
        let b = result.get().qualified_rules().nth(1).unwrap().style_block();
        assert_eq!(b.get().declarations.len(), 2);
        assert!(b.error_text().contains("oops"));
    }

    #[test]
    fn test_round_trip_text() {
        let result = Stylesheet::parse("a{b:c}  @x y;");
        assert_eq!(result.get().to_text(), "a{b:c}\n@x y;");
    }

    #[test]
    fn test_depth_option() {
        let options = ParseOptions::new().with_max_nesting_depth(2);
        let result = Stylesheet::parse_with("a{b:[[[c]]]} d{}", &options);
        assert!(result.error_text().contains("Nesting depth limit of 2 exceeded"));
        assert_eq!(result.get().qualified_rules().count(), 2);
    }

    #[test]
    fn test_inline_style() {
        let result = parse_style_block("color: blue; font-size: 12px");
        assert!(result.is_valid());
        assert_eq!(result.get().declarations.len(), 2);
    }
}
