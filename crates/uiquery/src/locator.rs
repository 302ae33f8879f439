//! A single locator term: `method:criterion[grid address]`

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::condition_type::{map_condition_type, PropertyId};
use crate::errors::Result;
use crate::grid_address::GridAddress;

/// Separates the method from the criterion
pub const METHOD_DELIMITER: char = ':';

// A trailing bracket group preceded by a non-whitespace, non-escape character
// and at most one space. `\[` escapes the bracket.
static GRID_SUFFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^(.*[^\s\\])\s?\[([^\]]*)\]$").expect("valid grid suffix regex")
});

/// One parsed query term.
///
/// The criterion keeps its escape sequences; use [`Locator::unescaped_criterion`]
/// when the value is consumed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Locator {
    method: String,
    criterion: String,
    grid_address: String,
}

impl Locator {
    /// Parses a term. `default_method` is used when the term has no `:`.
    ///
    /// Every input is accepted; an unknown method only fails once the
    /// condition type is resolved.
    pub fn parse(input: &str, default_method: &str) -> Self {
        let (method, criterion) = match input.find(METHOD_DELIMITER) {
            Some(idx) => (
                input[..idx].trim().to_string(),
                input[idx + METHOD_DELIMITER.len_utf8()..].trim(),
            ),
            None => (default_method.to_string(), input.trim()),
        };

        let (criterion, grid_address) = match GRID_SUFFIX.captures(criterion) {
            Some(caps) => (caps[1].to_string(), caps[2].trim().to_string()),
            None => (criterion.to_string(), String::new()),
        };

        Self {
            method,
            criterion,
            grid_address,
        }
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    /// The criterion as written, escape sequences included
    pub fn criterion(&self) -> &str {
        &self.criterion
    }

    pub fn unescaped_criterion(&self) -> String {
        unescape(&self.criterion)
    }

    /// The raw grid-address fragment, empty when absent
    pub fn grid_address(&self) -> &str {
        &self.grid_address
    }

    pub fn has_grid_address(&self) -> bool {
        !self.grid_address.is_empty()
    }

    /// Parses the grid-address fragment, if there is one
    pub fn parsed_grid_address(&self) -> Result<Option<GridAddress>> {
        if self.has_grid_address() {
            GridAddress::parse(&self.grid_address).map(Some)
        } else {
            Ok(None)
        }
    }

    /// Resolves the method through the condition-type registry
    pub fn condition_type(&self) -> Result<PropertyId> {
        map_condition_type(&self.method)
    }

    /// Both method and criterion are empty (the "match anything" locator)
    pub fn is_blank(&self) -> bool {
        self.method.is_empty() && self.criterion.is_empty()
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.method, METHOD_DELIMITER, self.criterion)?;
        if self.has_grid_address() {
            write!(f, "[{}]", self.grid_address)?;
        }
        Ok(())
    }
}

/// Resolves backslash escapes: `\n`, `\t`, `\r`, and `\x` -> `x` for any other
/// character. A trailing lone backslash is kept.
pub fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
