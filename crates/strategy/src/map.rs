//! Map strategy
//!
//! A list of optional key-value pairs folded into a hash map. Missing pairs
//! and duplicated keys are reported as errors; the last value for a
//! duplicated key wins.

use std::fmt::Debug;
use std::hash::Hash;

use loom_syntax::{Token, TokenQueue, ValidationResult};
use rustc_hash::FxHashMap;

use crate::args::StrategyArgs;
use crate::error::{StrategyError, StrategyResult};
use crate::list::{ListBuilder, ListStrategy};
use crate::strategy::{Builder, ParseStrategy};

/// Map of pairs produced by a `PairStrategy` or `KeyedStrategy` list
pub struct MapStrategy<S: ParseStrategy> {
    list: ListStrategy<S>,
}

impl<S: ParseStrategy> Clone for MapStrategy<S> {
    fn clone(&self) -> Self {
        Self { list: self.list.clone() }
    }
}

impl<S: ParseStrategy> MapStrategy<S> {
    pub fn new(list: ListStrategy<S>) -> Self {
        Self { list }
    }
}

pub struct MapBuilder<K, V> {
    entries: Option<ListBuilder<Option<(K, V)>>>,
}

impl<K, V> Builder for MapBuilder<K, V>
where
    K: Eq + Hash + Debug,
{
    type Output = FxHashMap<K, V>;

    fn build(self) -> ValidationResult<FxHashMap<K, V>> {
        let Some(entries) = self.entries else {
            return ValidationResult::success(FxHashMap::default());
        };
        let (pairs, mut errors) = entries.build().into_parts();

        let mut map = FxHashMap::default();
        let mut missed = 0;
        let mut duplicates: Vec<String> = Vec::new();
        for pair in pairs {
            let Some((key, value)) = pair else {
                missed += 1;
                continue;
            };
            let rendered = format!("{:?}", key);
            if map.insert(key, value).is_some() && !duplicates.contains(&rendered) {
                duplicates.push(rendered);
            }
        }

        if missed > 0 {
            errors.push(StrategyError::MissedPairs { count: missed }.to_string());
        }
        if !duplicates.is_empty() {
            errors.push(StrategyError::DuplicateKeys { keys: duplicates.join(", ") }.to_string());
        }
        ValidationResult::with_errors(map, errors)
    }
}

impl<S, K, V> ParseStrategy for MapStrategy<S>
where
    S: ParseStrategy<Output = Option<(K, V)>>,
    K: Eq + Hash + Debug + Clone,
    V: Clone,
{
    type Output = FxHashMap<K, V>;
    type Builder = MapBuilder<K, V>;

    fn id(&self) -> &'static str {
        "Map"
    }

    fn builder(&self) -> MapBuilder<K, V> {
        MapBuilder { entries: None }
    }

    fn can_process_token(&self, token: &Token, args: &StrategyArgs) -> bool {
        self.list.can_process_token(token, args)
    }

    fn process_tokens(
        &self,
        mut builder: MapBuilder<K, V>,
        queue: &mut TokenQueue<'_>,
        args: &StrategyArgs,
        errored: bool,
    ) -> ValidationResult<MapBuilder<K, V>> {
        let (entries, errors) = self.list.start_processing(queue, args, errored).into_parts();
        builder.entries = Some(entries);
        ValidationResult::with_errors(builder, errors)
    }

    fn provide_tokens(&self, value: &FxHashMap<K, V>) -> StrategyResult<Vec<Token>> {
        let pairs: Vec<Option<(K, V)>> = value
            .iter()
            .map(|(k, v)| Some((k.clone(), v.clone())))
            .collect();
        self.list.provide_tokens(&pairs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::list::ListEncoding;
    use crate::pair::PairStrategy;
    use crate::primitive::{NumberStrategy, StringStrategy};
    use crate::strategy::of_type;
    use loom_syntax::{css, json5, Number};

    type Entry = PairStrategy<StringStrategy, NumberStrategy>;

    fn map() -> MapStrategy<Entry> {
        let pair = || {
            PairStrategy::new(|| StringStrategy::new(css::IDENT), || NumberStrategy::new(css::NUMBER))
                .with_delimiter(of_type(css::COLON), css::tokenize(":")[..1].to_vec())
        };
        MapStrategy::new(
            ListStrategy::new(pair, of_type(css::COMMA))
                .with_delimiters(of_type(css::OPEN_BRACE), of_type(css::CLOSE_BRACE)),
        )
    }

    fn parse(input: &str) -> ValidationResult<FxHashMap<String, Number>> {
        let tokens = css::tokenize(input);
        map().parse(&mut TokenQueue::new(&tokens), &StrategyArgs::default())
    }

    #[test]
    fn test_map() {
        let result = parse("{a: 1, b: 2}");
        assert!(result.is_valid(), "{}", result.error_text());
        assert_eq!(result.get().len(), 2);
        assert_eq!(result.get()["a"], Number::Integer(1));
        assert_eq!(result.get()["b"], Number::Integer(2));
    }

    #[test]
    fn test_duplicate_keys() {
        let result = parse("{a: 1, b: 2, a: 3}");
        assert_eq!(result.get()["a"], Number::Integer(3));
        assert_eq!(result.error_text(), "Duplicated keys found: [\"a\"]");
    }

    #[test]
    fn test_missed_pair() {
        let result = parse("{a: 1, b 2, c: 3}");
        assert_eq!(result.get().len(), 2);
        let errors = result.errors();
        assert!(errors.iter().any(|e| e.starts_with("Errors found constructing list entry 1")));
        assert!(errors.iter().any(|e| e == "1 key-value pairs missed"));
    }

    #[test]
    fn test_empty_map() {
        let result = parse("{}");
        assert!(result.is_valid());
        assert!(result.get().is_empty());
    }

    #[test]
    fn test_json5_object() {
        let pair = || {
            PairStrategy::new(|| StringStrategy::new(json5::STRING), || NumberStrategy::new(json5::NUMBER))
                .with_delimiter(of_type(json5::COLON), Vec::new())
        };
        let map = MapStrategy::new(
            ListStrategy::new(pair, of_type(json5::COMMA))
                .with_delimiters(of_type(json5::OPEN_OBJECT), of_type(json5::CLOSE_OBJECT)),
        );
        let tokens = json5::tokenize("{\n  'x': 1,\n  \"y\": 0x10,\n}");
        let result = map.parse(&mut TokenQueue::new(&tokens), &StrategyArgs::default());
        assert!(result.is_valid(), "{}", result.error_text());
        assert_eq!(result.get()["y"], Number::Integer(16));
    }

    #[test]
    fn test_provide_tokens_round_trip() {
        let map = MapStrategy::new(map().list.with_encoding(ListEncoding {
            open: css::tokenize("{")[..1].to_vec(),
            separator: css::tokenize(",")[..1].to_vec(),
            close: css::tokenize("}")[..1].to_vec(),
        }));
        let mut value = FxHashMap::default();
        value.insert("a".to_string(), Number::Integer(1));
        value.insert("b".to_string(), Number::Float(0.5));
        let text = loom_syntax::to_text(&map.provide_tokens(&value).unwrap());
        let tokens = css::tokenize(&text);
        let result = map.parse(&mut TokenQueue::new(&tokens), &StrategyArgs::default());
        assert!(result.is_valid(), "{}: {}", text, result.error_text());
        assert_eq!(result.into_value(), value);
    }
}
