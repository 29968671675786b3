//! Selector specificity
//!
//! An `(id, class, type)` weight triple. Ordering is lexicographic with the
//! id count most significant, so one id outweighs any number of classes.

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

/// Precedence weight of a selector
///
/// Field order matters: the derived ordering compares `ids` first, then
/// `classes`, then `types`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Specificity {
    /// Id selectors
    pub ids: u32,
    /// Class selectors, pseudo-classes and selector functions
    pub classes: u32,
    /// Type selectors
    pub types: u32,
}

impl Specificity {
    pub const ZERO: Specificity = Specificity::new(0, 0, 0);
    pub const ID: Specificity = Specificity::new(1, 0, 0);
    pub const CLASS: Specificity = Specificity::new(0, 1, 0);
    pub const TYPE: Specificity = Specificity::new(0, 0, 1);

    pub const fn new(ids: u32, classes: u32, types: u32) -> Self {
        Self { ids, classes, types }
    }
}

impl Add for Specificity {
    type Output = Specificity;

    fn add(self, other: Specificity) -> Specificity {
        Specificity::new(
            self.ids + other.ids,
            self.classes + other.classes,
            self.types + other.types,
        )
    }
}

impl AddAssign for Specificity {
    fn add_assign(&mut self, other: Specificity) {
        *self = *self + other;
    }
}

impl Sum for Specificity {
    fn sum<I: Iterator<Item = Specificity>>(iter: I) -> Specificity {
        iter.fold(Specificity::ZERO, Add::add)
    }
}

impl fmt::Display for Specificity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.ids, self.classes, self.types)
    }
}
