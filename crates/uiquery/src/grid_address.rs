//! Grid addresses: the `[row 2, column 1]` suffix of a locator

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::{AutomationError, Result};

static BARE_PAIR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\d+)\s*,\s*(\d+)\s*$").expect("valid bare pair regex"));

// A keyword must not follow a letter, but may follow a digit ("row3col4")
static ROW_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:^|[^a-z])(?:rows?|r)\s*[:=]?\s*(\d+)").expect("valid row token regex")
});

static COLUMN_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:^|[^a-z])(?:col(?:umn)?s?|c)\s*[:=]?\s*(\d+)")
        .expect("valid column token regex")
});

/// A 1-based reference into a grid-like element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GridAddress {
    Cell { row: usize, column: usize },
    Row(usize),
    Column(usize),
}

impl GridAddress {
    /// Parses `"1,2"`, `"row 3"`, `"col 4"`, `"column 4, row 3"`, ...
    pub fn parse(input: &str) -> Result<Self> {
        let invalid = || AutomationError::InvalidGridAddress {
            input: input.to_string(),
        };

        if let Some(caps) = BARE_PAIR.captures(input) {
            let row = one_based(&caps[1]).ok_or_else(invalid)?;
            let column = one_based(&caps[2]).ok_or_else(invalid)?;
            return Ok(Self::Cell { row, column });
        }

        let row = match ROW_TOKEN.captures(input) {
            Some(caps) => Some(one_based(&caps[1]).ok_or_else(invalid)?),
            None => None,
        };
        let column = match COLUMN_TOKEN.captures(input) {
            Some(caps) => Some(one_based(&caps[1]).ok_or_else(invalid)?),
            None => None,
        };

        match (row, column) {
            (Some(row), Some(column)) => Ok(Self::Cell { row, column }),
            (Some(row), None) => Ok(Self::Row(row)),
            (None, Some(column)) => Ok(Self::Column(column)),
            (None, None) => Err(invalid()),
        }
    }

    /// 1-based row, if the address names one
    pub fn row(&self) -> Option<usize> {
        match self {
            Self::Cell { row, .. } | Self::Row(row) => Some(*row),
            Self::Column(_) => None,
        }
    }

    /// 1-based column, if the address names one
    pub fn column(&self) -> Option<usize> {
        match self {
            Self::Cell { column, .. } | Self::Column(column) => Some(*column),
            Self::Row(_) => None,
        }
    }
}

/// Row and column numbers are 1-based; zero and overflow are rejected
fn one_based(digits: &str) -> Option<usize> {
    digits.parse::<usize>().ok().filter(|n| *n > 0)
}

impl FromStr for GridAddress {
    type Err = AutomationError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for GridAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cell { row, column } => write!(f, "row {row}, column {column}"),
            Self::Row(row) => write!(f, "row {row}"),
            Self::Column(column) => write!(f, "column {column}"),
        }
    }
}
