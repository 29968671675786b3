//! Structural nodes
//!
//! Immutable results of the consumers. Blocks and functions are also
//! re-wrapped as tokens so they can sit inside other value runs.

use crate::css;
use crate::error::SourceLocation;
use crate::options::ParseOptions;
use crate::queue::TokenQueue;
use crate::token::{to_text, Token, TokenValue};
use crate::token_type::TokenType;
use crate::validation::ValidationResult;

use super::style_block::StyleBlockConsumer;
use super::{ConsumeContext, Consumer};

/// A `{}`, `[]` or `()` delimited run of component values
#[derive(Debug, Clone, PartialEq)]
pub struct SimpleBlock {
    pub opening: TokenType,
    pub closing: TokenType,
    pub values: Vec<Token>,
    pub location: SourceLocation,
}

impl SimpleBlock {
    pub fn new(opening: TokenType, closing: TokenType, location: SourceLocation) -> Self {
        Self { opening, closing, values: Vec::new(), location }
    }

    /// Queue over the block's values
    pub fn queue(&self) -> TokenQueue<'_> {
        TokenQueue::new(&self.values)
    }

    pub fn to_text(&self) -> String {
        format!(
            "{}{}{}",
            self.opening.raw_text().unwrap_or(""),
            to_text(&self.values),
            self.closing.raw_text().unwrap_or("")
        )
    }

    pub fn into_token(self) -> Token {
        let location = self.location;
        Token::new(css::SIMPLE_BLOCK, TokenValue::Block(Box::new(self)), location)
    }
}

/// A function name and its argument values
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: String,
    pub values: Vec<Token>,
    pub location: SourceLocation,
}

impl Function {
    pub fn queue(&self) -> TokenQueue<'_> {
        TokenQueue::new(&self.values)
    }

    pub fn to_text(&self) -> String {
        format!("{}({})", self.name, to_text(&self.values))
    }

    pub fn into_token(self) -> Token {
        let location = self.location;
        Token::new(css::FUNCTION_BLOCK, TokenValue::Function(Box::new(self)), location)
    }
}

/// `name : values [!important]`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Declaration {
    pub name: String,
    /// Values with surrounding whitespace and the importance marker removed
    pub values: Vec<Token>,
    pub important: bool,
    pub location: SourceLocation,
}

impl Declaration {
    pub fn queue(&self) -> TokenQueue<'_> {
        TokenQueue::new(&self.values)
    }

    /// The value run as source text
    pub fn value_text(&self) -> String {
        to_text(&self.values)
    }

    pub fn to_text(&self) -> String {
        let important = if self.important { " !important" } else { "" };
        format!("{}:{}{}", self.name, self.value_text(), important)
    }
}

/// A selector-style prelude followed by a `{}` block
#[derive(Debug, Clone, PartialEq)]
pub struct QualifiedRule {
    pub prelude: Vec<Token>,
    pub block: SimpleBlock,
    pub location: SourceLocation,
}

impl QualifiedRule {
    pub fn prelude_text(&self) -> String {
        to_text(&self.prelude)
    }

    /// Parse the block as declarations and nested rules
    pub fn style_block(&self) -> ValidationResult<StyleBlock> {
        self.style_block_with(&ParseOptions::default())
    }

    pub fn style_block_with(&self, options: &ParseOptions) -> ValidationResult<StyleBlock> {
        parse_block_body(&self.block, options)
    }
}

/// `@name prelude ;` or `@name prelude { ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct AtRule {
    pub name: String,
    pub prelude: Vec<Token>,
    /// `None` for rules terminated by a semicolon
    pub block: Option<SimpleBlock>,
    pub location: SourceLocation,
}

impl AtRule {
    pub fn prelude_text(&self) -> String {
        to_text(&self.prelude)
    }

    /// Parse the block, if any, as declarations and nested rules
    pub fn style_block(&self) -> Option<ValidationResult<StyleBlock>> {
        self.block
            .as_ref()
            .map(|block| parse_block_body(block, &ParseOptions::default()))
    }
}

fn parse_block_body(block: &SimpleBlock, options: &ParseOptions) -> ValidationResult<StyleBlock> {
    let mut queue = block.queue();
    let mut context = ConsumeContext::new(options.clone());
    StyleBlockConsumer.consume(&mut queue, &mut context)
}

/// A top-level or nested rule
#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    Qualified(QualifiedRule),
    At(AtRule),
    /// Sentinel for a rule that could not be recovered
    Unknown(SourceLocation),
}

impl Rule {
    pub fn location(&self) -> SourceLocation {
        match self {
            Rule::Qualified(rule) => rule.location,
            Rule::At(rule) => rule.location,
            Rule::Unknown(location) => *location,
        }
    }

    pub fn as_qualified(&self) -> Option<&QualifiedRule> {
        match self {
            Rule::Qualified(rule) => Some(rule),
            _ => None,
        }
    }

    pub fn as_at_rule(&self) -> Option<&AtRule> {
        match self {
            Rule::At(rule) => Some(rule),
            _ => None,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Rule::Unknown(_))
    }

    pub fn to_text(&self) -> String {
        match self {
            Rule::Qualified(rule) => format!("{}{}", rule.prelude_text(), rule.block.to_text()),
            Rule::At(rule) => {
                let prelude = rule.prelude_text();
                let separator = if prelude.is_empty() { "" } else { " " };
                match &rule.block {
                    Some(block) => format!("@{}{}{}{}", rule.name, separator, prelude, block.to_text()),
                    None => format!("@{}{}{};", rule.name, separator, prelude),
                }
            }
            Rule::Unknown(_) => String::new(),
        }
    }
}

/// Declarations and nested rules of a block body
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StyleBlock {
    pub declarations: Vec<Declaration>,
    pub rules: Vec<Rule>,
}

impl StyleBlock {
    /// Last declaration named `name`, ignoring ASCII case
    pub fn declaration(&self, name: &str) -> Option<&Declaration> {
        self.declarations
            .iter()
            .rev()
            .find(|d| d.name.eq_ignore_ascii_case(name))
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty() && self.rules.is_empty()
    }
}
