//! Loom Syntax
//!
//! Dialect-driven tokenizing, token queues and structural consumers, with
//! a CSS dialect, a JSON5 dialect and a stylesheet parser built on them.

pub mod consume;
pub mod css;
pub mod json5;

mod cursor;
mod error;
mod options;
mod queue;
mod stylesheet;
mod token;
mod token_type;
mod tokenizer;
mod validation;

pub use cursor::Cursor;
pub use error::{LexError, RegistryError, SourceLocation, StructureError, SyntaxResult};
pub use options::ParseOptions;
pub use queue::{Split, TokenQueue};
pub use stylesheet::{parse_style_block, Stylesheet};
pub use token::{to_text, Number, Token, TokenValue};
pub use token_type::{Encoder, TokenType, TokenTypeRegistry, CORE_DIALECT};
pub use tokenizer::{Dialect, DialectBuilder, InputFilter, Producer, Tokenizer};
pub use validation::ValidationResult;
