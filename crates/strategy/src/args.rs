//! Strategy arguments
//!
//! Formatting switches shared by every strategy in one parse.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

const QUOTE_STRINGS: &str = "quote-strings";

/// Switches passed down through nested strategies
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyArgs {
    /// String strategies keep the encoded source form (quotes and escapes)
    pub quote_strings: bool,
    /// Free-form switches, stored without leading dashes
    pub flags: FxHashSet<String>,
}

impl StrategyArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from command-line style switches such as `--quote-strings`
    pub fn from_flags<I, S>(flags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut args = Self::default();
        for flag in flags {
            let flag = flag.as_ref().trim().trim_start_matches('-');
            if flag.is_empty() {
                continue;
            }
            if flag == QUOTE_STRINGS {
                args.quote_strings = true;
            } else {
                args.flags.insert(flag.to_string());
            }
        }
        args
    }

    pub fn with_quote_strings(mut self, quote_strings: bool) -> Self {
        self.quote_strings = quote_strings;
        self
    }

    pub fn with_flag(mut self, flag: impl Into<String>) -> Self {
        self.flags.insert(flag.into());
        self
    }

    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.contains(flag.trim_start_matches('-'))
    }
}
