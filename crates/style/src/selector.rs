//! Selector algebra
//!
//! Leaf selectors combined by conjunction and disjunction. `And` and `Or`
//! are the binary forms built while parsing; `flatten` rewrites any chain of
//! them into flat `All` and `Any` lists so that specificity and rendering do
//! not depend on how the chain associated.

use std::fmt;
use std::rc::Rc;

use loom_syntax::{css, to_text, Token};

use crate::registry::SelectorFunction;
use crate::specificity::Specificity;

/// The element a selector is tested against
pub trait SelectorContext {
    fn element_type(&self) -> &str;

    fn id(&self) -> Option<&str>;

    fn has_class(&self, class: &str) -> bool;

    fn has_pseudo_class(&self, name: &str) -> bool;
}

/// A `:name(args)` selector bound to its registered function
#[derive(Clone)]
pub struct FunctionSelector {
    pub name: String,
    pub args: Vec<Token>,
    function: Rc<dyn SelectorFunction>,
}

impl FunctionSelector {
    pub fn new(name: impl Into<String>, args: Vec<Token>, function: Rc<dyn SelectorFunction>) -> Self {
        Self { name: name.into(), args, function }
    }

    pub fn matches(&self, context: &dyn SelectorContext) -> bool {
        self.function.apply(&self.args, context)
    }
}

impl fmt::Debug for FunctionSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionSelector")
            .field("name", &self.name)
            .field("args", &to_text(&self.args))
            .finish()
    }
}

impl PartialEq for FunctionSelector {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.args == other.args
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Selector {
    /// `*`
    Universal,
    /// Element type, stored lowercase
    Type(String),
    Class(String),
    Id(String),
    PseudoClass(String),
    Function(FunctionSelector),
    /// Every child must match
    All(Vec<Selector>),
    /// At least one child must match
    Any(Vec<Selector>),
    And(Box<Selector>, Box<Selector>),
    Or(Box<Selector>, Box<Selector>),
}

impl Selector {
    pub fn and(self, other: Selector) -> Selector {
        Selector::And(Box::new(self), Box::new(other))
    }

    pub fn or(self, other: Selector) -> Selector {
        Selector::Or(Box::new(self), Box::new(other))
    }

    /// Rewrite nested conjunctions into one `All` and nested disjunctions
    /// into one `Any`
    ///
    /// Single-element lists collapse to their element.
    pub fn flatten(&self) -> Selector {
        match self {
            Selector::All(_) | Selector::And(..) => {
                let mut children = Vec::new();
                self.collect_conjuncts(&mut children);
                collapse(children, Selector::All)
            }
            Selector::Any(_) | Selector::Or(..) => {
                let mut children = Vec::new();
                self.collect_disjuncts(&mut children);
                collapse(children, Selector::Any)
            }
            leaf => leaf.clone(),
        }
    }

    fn collect_conjuncts(&self, out: &mut Vec<Selector>) {
        match self {
            Selector::And(left, right) => {
                left.collect_conjuncts(out);
                right.collect_conjuncts(out);
            }
            Selector::All(children) => children.iter().for_each(|child| child.collect_conjuncts(out)),
            other => out.push(other.flatten()),
        }
    }

    fn collect_disjuncts(&self, out: &mut Vec<Selector>) {
        match self {
            Selector::Or(left, right) => {
                left.collect_disjuncts(out);
                right.collect_disjuncts(out);
            }
            Selector::Any(children) => children.iter().for_each(|child| child.collect_disjuncts(out)),
            other => out.push(other.flatten()),
        }
    }

    /// Conjunctions add their children's weights; disjunctions take the
    /// heaviest child
    pub fn specificity(&self) -> Specificity {
        match self {
            Selector::Universal => Specificity::ZERO,
            Selector::Type(_) => Specificity::TYPE,
            Selector::Class(_) | Selector::PseudoClass(_) | Selector::Function(_) => Specificity::CLASS,
            Selector::Id(_) => Specificity::ID,
            Selector::All(children) => children.iter().map(Selector::specificity).sum(),
            Selector::And(left, right) => left.specificity() + right.specificity(),
            Selector::Any(children) => children
                .iter()
                .map(Selector::specificity)
                .max()
                .unwrap_or(Specificity::ZERO),
            Selector::Or(left, right) => left.specificity().max(right.specificity()),
        }
    }

    pub fn matches(&self, context: &dyn SelectorContext) -> bool {
        match self {
            Selector::Universal => true,
            Selector::Type(name) => context.element_type().eq_ignore_ascii_case(name),
            Selector::Class(class) => context.has_class(class),
            Selector::Id(id) => context.id() == Some(id.as_str()),
            Selector::PseudoClass(name) => context.has_pseudo_class(name),
            Selector::Function(function) => function.matches(context),
            Selector::All(children) => children.iter().all(|child| child.matches(context)),
            Selector::And(left, right) => left.matches(context) && right.matches(context),
            Selector::Any(children) => children.iter().any(|child| child.matches(context)),
            Selector::Or(left, right) => left.matches(context) || right.matches(context),
        }
    }

    /// Canonical source text of the flattened selector
    pub fn to_text(&self) -> String {
        self.flatten().to_string()
    }

    /// The selector as comma groups of simple selectors
    ///
    /// Conjunctions distribute over disjunctions, so
    /// `.a(.b | .c)` becomes the groups `.a.b` and `.a.c`.
    fn compounds(&self) -> Vec<Vec<&Selector>> {
        match self {
            Selector::All(children) => conjoin(children),
            Selector::And(left, right) => conjoin([left.as_ref(), right.as_ref()]),
            Selector::Any(children) => children.iter().flat_map(Selector::compounds).collect(),
            Selector::Or(left, right) => {
                let mut groups = left.compounds();
                groups.extend(right.compounds());
                groups
            }
            simple => vec![vec![simple]],
        }
    }

    fn is_type_like(&self) -> bool {
        matches!(self, Selector::Universal | Selector::Type(_))
    }
}

fn conjoin<'a>(parts: impl IntoIterator<Item = &'a Selector>) -> Vec<Vec<&'a Selector>> {
    parts.into_iter().fold(vec![Vec::new()], |groups, part| {
        let alternatives = part.compounds();
        groups
            .iter()
            .flat_map(|prefix| {
                alternatives.iter().map(move |alternative| {
                    let mut group = prefix.clone();
                    group.extend(alternative.iter().copied());
                    group
                })
            })
            .collect()
    })
}

/// A rule's selector, flattened, with its specificity computed once
#[derive(Debug, Clone, PartialEq)]
pub struct RuleSelector {
    pub selector: Selector,
    pub specificity: Specificity,
}

impl RuleSelector {
    pub fn new(selector: Selector) -> Self {
        let selector = selector.flatten();
        let specificity = selector.specificity();
        Self { selector, specificity }
    }

    pub fn matches(&self, context: &dyn SelectorContext) -> bool {
        self.selector.matches(context)
    }

    pub fn to_text(&self) -> String {
        self.selector.to_string()
    }
}

impl From<Selector> for RuleSelector {
    fn from(selector: Selector) -> Self {
        Self::new(selector)
    }
}

fn collapse(mut children: Vec<Selector>, wrap: fn(Vec<Selector>) -> Selector) -> Selector {
    if children.len() == 1 {
        children.remove(0)
    } else {
        wrap(children)
    }
}

/// Type selectors lead their compound
fn write_compound(f: &mut fmt::Formatter<'_>, group: &[&Selector]) -> fmt::Result {
    if group.is_empty() {
        return f.write_str("*");
    }
    let (leading, rest): (Vec<&Selector>, Vec<&Selector>) =
        group.iter().copied().partition(|s| s.is_type_like());
    leading
        .into_iter()
        .chain(rest)
        .try_for_each(|simple| write_simple(f, simple))
}

fn write_simple(f: &mut fmt::Formatter<'_>, selector: &Selector) -> fmt::Result {
    match selector {
        Selector::Universal => f.write_str("*"),
        Selector::Type(name) => f.write_str(&css::IDENT.encode(name)),
        Selector::Class(class) => write!(f, ".{}", css::IDENT.encode(class)),
        Selector::Id(id) => f.write_str(&css::HASH.encode(id)),
        Selector::PseudoClass(name) => write!(f, ":{}", css::IDENT.encode(name)),
        Selector::Function(function) => write!(
            f,
            ":{}{})",
            css::FUNCTION.encode(&function.name),
            to_text(&function.args)
        ),
        composite => fmt::Display::fmt(composite, f),
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, group) in self.compounds().iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write_compound(f, group)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Element {
        kind: &'static str,
        id: Option<&'static str>,
        classes: Vec<&'static str>,
        states: Vec<&'static str>,
    }

    impl SelectorContext for Element {
        fn element_type(&self) -> &str {
            self.kind
        }

        fn id(&self) -> Option<&str> {
            self.id
        }

        fn has_class(&self, class: &str) -> bool {
            self.classes.contains(&class)
        }

        fn has_pseudo_class(&self, name: &str) -> bool {
            self.states.contains(&name)
        }
    }

    fn button() -> Element {
        Element {
            kind: "button",
            id: Some("ok"),
            classes: vec!["primary", "large"],
            states: vec!["hover"],
        }
    }

    fn class(name: &str) -> Selector {
        Selector::Class(name.to_string())
    }

    #[test]
    fn test_flatten_specificity() {
        let s1 = Selector::Type("button".to_string());
        let s2 = class("primary");
        let s3 = Selector::Id("ok".to_string());
        let nested = s1.clone().and(s2.clone()).and(s3.clone());
        let flat = Selector::All(vec![s1, s2, s3]);

        assert_eq!(nested.flatten(), flat);
        assert_eq!(nested.specificity(), flat.specificity());
        assert_eq!(nested.flatten().specificity(), Specificity::new(1, 1, 1));
    }

    #[test]
    fn test_flatten_mixed() {
        let right_leaning = class("a").and(class("b").and(class("c")));
        let left_leaning = class("a").and(class("b")).and(class("c"));
        assert_eq!(right_leaning.flatten(), left_leaning.flatten());

        let disjunction = class("a").or(Selector::Any(vec![class("b"), class("c")]));
        assert_eq!(disjunction.flatten(), Selector::Any(vec![class("a"), class("b"), class("c")]));

        // A disjunction nested in a conjunction stays a separate group
        let grouped = class("a").and(class("b").or(class("c")));
        assert_eq!(
            grouped.flatten(),
            Selector::All(vec![class("a"), Selector::Any(vec![class("b"), class("c")])])
        );

        assert_eq!(Selector::All(vec![class("a")]).flatten(), class("a"));
    }

    #[test]
    fn test_disjunction_specificity() {
        let selector = class("a").or(Selector::Id("x".to_string()));
        assert_eq!(selector.specificity(), Specificity::ID);
        assert_eq!(Selector::Any(Vec::new()).specificity(), Specificity::ZERO);
        assert_eq!(Selector::Universal.specificity(), Specificity::ZERO);
    }

    #[test]
    fn test_matches() {
        let element = button();
        assert!(Selector::Universal.matches(&element));
        assert!(Selector::Type("BUTTON".to_string()).matches(&element));
        assert!(Selector::Id("ok".to_string()).matches(&element));
        assert!(!Selector::Id("cancel".to_string()).matches(&element));
        assert!(Selector::PseudoClass("hover".to_string()).matches(&element));

        let all = Selector::All(vec![class("primary"), class("large")]);
        assert!(all.matches(&element));
        let all = class("primary").and(class("small"));
        assert!(!all.matches(&element));

        let any = class("small").or(class("large"));
        assert!(any.matches(&element));
        assert!(!Selector::Any(vec![class("x"), class("y")]).matches(&element));
    }

    #[test]
    fn test_to_text() {
        let selector = Selector::Type("a".to_string())
            .and(class("b"))
            .and(Selector::Id("c".to_string()))
            .and(Selector::PseudoClass("hover".to_string()))
            .or(Selector::Universal);
        assert_eq!(selector.to_text(), "a.b#c:hover, *");
    }

    #[test]
    fn test_nested_disjunction_text() {
        let nested = class("a").and(class("b").or(Selector::Id("c".to_string())));
        assert_eq!(nested.to_text(), ".a.b, .a#c");

        let grid = Selector::All(vec![
            Selector::Any(vec![class("a"), class("b")]),
            Selector::Any(vec![Selector::Type("p".to_string()), Selector::Universal]),
        ]);
        assert_eq!(grid.to_text(), "p.a, *.a, p.b, *.b");

        assert_eq!(Selector::All(Vec::new()).to_string(), "*");
        assert_eq!(class("a b").to_text(), ".a\\ b");
        assert_eq!(Selector::Id("1x".to_string()).to_text(), "#1x");
    }

    #[test]
    fn test_rule_selector() {
        let rule = RuleSelector::new(class("a").and(class("b")).and(Selector::Type("p".to_string())));
        assert_eq!(rule.specificity, Specificity::new(0, 2, 1));
        assert_eq!(rule.selector, Selector::All(vec![class("a"), class("b"), Selector::Type("p".to_string())]));
        assert_eq!(rule.to_text(), "p.a.b");
        assert!(!rule.matches(&button()));
    }
}
