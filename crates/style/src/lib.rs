//! Loom Style
//!
//! Selector algebra with additive specificity, a registry of pseudo-classes
//! and selector functions, and a parser from rule preludes to selectors.

mod error;
mod parser;
mod registry;
mod selector;
mod specificity;

pub use error::{StyleError, StyleResult};
pub use parser::SelectorParser;
pub use registry::{SelectorFunction, SelectorRegistry, STANDARD_PSEUDO_CLASSES};
pub use selector::{FunctionSelector, RuleSelector, Selector, SelectorContext};
pub use specificity::Specificity;
