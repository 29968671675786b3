//! Loom Strategy
//!
//! Composable recipes that turn a run of tokens into a typed value and
//! back. Primitive strategies read strings, numbers and booleans; lists,
//! pairs, maps and alternatives combine them.

mod alternatives;
mod args;
mod error;
mod list;
mod map;
mod pair;
mod primitive;
mod strategy;

pub use alternatives::{AlternativesBuilder, AlternativesStrategy};
pub use args::StrategyArgs;
pub use error::{StrategyError, StrategyResult};
pub use list::{EndGateBehavior, ListBuilder, ListEncoding, ListStrategy};
pub use map::{MapBuilder, MapStrategy};
pub use pair::{KeyedStrategy, PairBuilder, PairStrategy, Selector};
pub use primitive::{
    BooleanBuilder, BooleanPrimitive, BooleanStrategy, NumberBuilder, NumberPrimitive, NumberStrategy,
    Primitive, PrimitiveStrategy, StringBuilder, StringPrimitive, StringStrategy,
};
pub use strategy::{
    any_of, factory, of_char, of_type, BoxedBuilder, BoxedStrategy, Builder, Factory, ParseStrategy,
    Provider, TokenPredicate, UnknownStrategy,
};
