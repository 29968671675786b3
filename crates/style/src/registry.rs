//! Selector registry
//!
//! Known pseudo-class names and selector functions. A registry is built
//! once, then shared by reference with every `SelectorParser`.

use std::rc::Rc;

use loom_syntax::Token;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::{StyleError, StyleResult};
use crate::selector::SelectorContext;

/// Behaviour behind a `:name(args)` selector
pub trait SelectorFunction {
    /// Check the argument run once, when the selector is parsed
    fn prepare(&self, _args: &[Token]) -> Result<(), String> {
        Ok(())
    }

    fn apply(&self, args: &[Token], context: &dyn SelectorContext) -> bool;
}

impl<F> SelectorFunction for F
where
    F: Fn(&[Token], &dyn SelectorContext) -> bool,
{
    fn apply(&self, args: &[Token], context: &dyn SelectorContext) -> bool {
        self(args, context)
    }
}

/// Pseudo-classes registered by `SelectorRegistry::standard`
pub const STANDARD_PSEUDO_CLASSES: &[&str] = &["hover", "focus", "active", "disabled", "checked", "selected"];

#[derive(Default)]
pub struct SelectorRegistry {
    pseudo_classes: FxHashSet<String>,
    functions: FxHashMap<String, Rc<dyn SelectorFunction>>,
}

impl SelectorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the interaction-state pseudo-classes
    pub fn standard() -> Self {
        let mut registry = Self::new();
        for name in STANDARD_PSEUDO_CLASSES {
            registry.pseudo_classes.insert((*name).to_string());
        }
        registry
    }

    /// Names are matched case-insensitively
    pub fn register_pseudo_class(&mut self, name: &str) -> StyleResult<()> {
        let key = name.to_ascii_lowercase();
        if !self.pseudo_classes.insert(key) {
            return Err(StyleError::DuplicatePseudoClass { name: name.to_string() });
        }
        log::debug!("Registered pseudo-class :{}", name);
        Ok(())
    }

    pub fn register_function(
        &mut self,
        name: &str,
        function: impl SelectorFunction + 'static,
    ) -> StyleResult<()> {
        let key = name.to_ascii_lowercase();
        if self.functions.contains_key(&key) {
            return Err(StyleError::DuplicateFunction { name: name.to_string() });
        }
        self.functions.insert(key, Rc::new(function));
        log::debug!("Registered selector function :{}()", name);
        Ok(())
    }

    pub fn has_pseudo_class(&self, name: &str) -> bool {
        self.pseudo_classes.contains(&name.to_ascii_lowercase())
    }

    pub fn function(&self, name: &str) -> Option<Rc<dyn SelectorFunction>> {
        self.functions.get(&name.to_ascii_lowercase()).cloned()
    }
}

impl std::fmt::Debug for SelectorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut functions: Vec<&String> = self.functions.keys().collect();
        functions.sort();
        f.debug_struct("SelectorRegistry")
            .field("pseudo_classes", &self.pseudo_classes.len())
            .field("functions", &functions)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn always(_args: &[Token], _context: &dyn SelectorContext) -> bool {
        true
    }

    #[test]
    fn test_standard_pseudo_classes() {
        let registry = SelectorRegistry::standard();
        assert!(registry.has_pseudo_class("hover"));
        assert!(registry.has_pseudo_class("HOVER"));
        assert!(!registry.has_pseudo_class("visited"));
    }

    #[test]
    fn test_duplicate_pseudo_class() {
        let mut registry = SelectorRegistry::new();
        assert!(registry.register_pseudo_class("open").is_ok());
        assert_eq!(
            registry.register_pseudo_class("Open"),
            Err(StyleError::DuplicatePseudoClass { name: "Open".to_string() })
        );
    }

    #[test]
    fn test_duplicate_function() {
        let mut registry = SelectorRegistry::new();
        assert!(registry.register_function("always", always).is_ok());
        let err = registry.register_function("always", always).unwrap_err();
        assert_eq!(err.to_string(), "Selector function 'always' registered twice");
        assert!(registry.function("ALWAYS").is_some());
        assert!(registry.function("never").is_none());
    }
}
