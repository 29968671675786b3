//! Structural consumers
//!
//! Recursive-descent routines over a `TokenQueue`. Every consumer returns a
//! `ValidationResult`: malformed input yields a best-effort node plus error
//! messages, never a panic or an early abort of the surrounding parse.

mod component;
mod declaration;
mod nodes;
mod rule;
mod style_block;

pub use component::{ComponentValueConsumer, FunctionConsumer, SimpleBlockConsumer};
pub use declaration::DeclarationConsumer;
pub use nodes::{AtRule, Declaration, Function, QualifiedRule, Rule, SimpleBlock, StyleBlock};
pub use rule::{AtRuleConsumer, ListOfRulesConsumer, QualifiedRuleConsumer};
pub use style_block::StyleBlockConsumer;

use crate::options::ParseOptions;
use crate::queue::TokenQueue;
use crate::validation::ValidationResult;

/// A grammar routine producing one node from the head of a queue
pub trait Consumer {
    type Output;

    fn consume(
        &self,
        queue: &mut TokenQueue<'_>,
        context: &mut ConsumeContext,
    ) -> ValidationResult<Self::Output>;
}

/// Per-parse state threaded through the consumers
#[derive(Debug, Clone, Default)]
pub struct ConsumeContext {
    options: ParseOptions,
    depth: usize,
}

impl ConsumeContext {
    pub fn new(options: ParseOptions) -> Self {
        Self { options, depth: 0 }
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Current block nesting depth
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Enter a nested block; false once the configured limit is reached
    fn enter(&mut self) -> bool {
        if self.depth >= self.options.max_nesting_depth {
            return false;
        }
        self.depth += 1;
        true
    }

    fn leave(&mut self) {
        self.depth = self.depth.saturating_sub(1);
    }
}
