//! Line Tokenizer
//!
//! Pulls letter-prefixed numbers out of a raw G-code line.
//! Letters may appear in any order; only the ones asked for are parsed.

use std::collections::HashMap;

use regex::Regex;

/// Table of precompiled per-letter matchers.
///
/// Built once per interpreter and borrowed for the whole parse, since the
/// lookups run for every parameter of every line.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    matchers: HashMap<char, Regex>,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tokenizer {
    pub fn new() -> Self {
        // Capture everything after the letter up to the next whitespace
        let matchers = ('A'..='Z')
            .filter_map(|letter| {
                Regex::new(&format!(r"{letter}(\S+)"))
                    .ok()
                    .map(|re| (letter, re))
            })
            .collect();

        Self { matchers }
    }

    /// Raw text following the first occurrence of `code`
    fn raw_value<'l>(&self, line: &'l str, code: char) -> Option<&'l str> {
        let matcher = self.matchers.get(&code)?;
        let captures = matcher.captures(line)?;
        captures.get(1).map(|m| m.as_str())
    }

    /// Integer value for command codes (`G`, `M`, `T`)
    ///
    /// Returns `None` when the letter is missing or the token is not an
    /// integer, e.g. `G1.5`.
    pub fn code_int(&self, line: &str, code: char) -> Option<i64> {
        self.raw_value(line, code)?.parse().ok()
    }

    /// Floating-point value for parameter codes (`X`, `E`, `F`, ...)
    ///
    /// Non-finite spellings such as `inf` or `NaN` count as malformed.
    pub fn code_float(&self, line: &str, code: char) -> Option<f64> {
        self.raw_value(line, code)?
            .parse()
            .ok()
            .filter(|value: &f64| value.is_finite())
    }

    /// Whether `code` starts a word on the line, with or without a value.
    ///
    /// Needed for axis flags like `G28 X Y`, where the letters carry no number.
    pub fn has_word(&self, line: &str, code: char) -> bool {
        line.split_whitespace().any(|word| word.starts_with(code))
    }
}
