//! Composite search queries: locator terms joined by `" && "`

use std::fmt;

use tracing::debug;

use crate::condition_type::PropertyId;
use crate::config::EngineConfig;
use crate::control_type::is_main_window;
use crate::errors::{AutomationError, Result};
use crate::grid_address::GridAddress;
use crate::locator::{unescape, Locator};

/// Separates the terms of a query. A lone `&` inside a criterion is kept.
pub const AND_DELIMITER: &str = " && ";

/// An ordered, AND-combined list of locators
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchQuery {
    locators: Vec<Locator>,
}

impl SearchQuery {
    /// Parses a query using the configuration's default condition type.
    ///
    /// An empty string yields one locator with an empty criterion.
    pub fn parse(input: &str, config: &EngineConfig) -> Self {
        Self::parse_with_default(input, config.default_condition_type())
    }

    /// Parses a query that may be absent; `None` is a usage error
    pub fn parse_optional(input: Option<&str>, config: &EngineConfig) -> Result<Self> {
        let input = input.ok_or_else(|| {
            AutomationError::InvalidArgument("search query must not be null".to_string())
        })?;
        Ok(Self::parse(input, config))
    }

    pub fn parse_with_default(input: &str, default_method: &str) -> Self {
        let locators: Vec<Locator> = input
            .split(AND_DELIMITER)
            .map(|term| Locator::parse(term, default_method))
            .collect();
        debug!("Parsed query '{}' into {} locator(s)", input, locators.len());
        Self { locators }
    }

    pub fn from_locators(locators: Vec<Locator>) -> Self {
        Self { locators }
    }

    pub fn locators(&self) -> &[Locator] {
        &self.locators
    }

    pub fn len(&self) -> usize {
        self.locators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locators.is_empty()
    }

    /// Exactly one locator, matching on `ProcessId` or `Name` (including the
    /// `Caption` alias). Unknown methods make the query invalid, not an error.
    ///
    /// Front-ends use this and [`SearchQuery::is_window_query`] to decide
    /// between attaching to a process and searching the top-level windows.
    pub fn is_valid_process_query(&self) -> bool {
        match self.locators.as_slice() {
            [only] => matches!(
                only.condition_type(),
                Ok(PropertyId::ProcessId | PropertyId::Name)
            ),
            _ => false,
        }
    }

    /// Any locator of the form `ControlType:Window` (case-insensitive).
    /// `MainWindow` does not count; see [`SearchQuery::is_main_window_query`].
    pub fn is_window_query(&self) -> bool {
        self.locators.iter().any(|locator| {
            matches!(locator.condition_type(), Ok(PropertyId::ControlType))
                && locator.unescaped_criterion().eq_ignore_ascii_case("Window")
        })
    }

    /// A single `ControlType:MainWindow` locator, which addresses the search
    /// root itself rather than one of its descendants
    pub fn is_main_window_query(&self) -> bool {
        match self.locators.as_slice() {
            [only] => {
                matches!(only.condition_type(), Ok(id) if id.is_control_type_valued())
                    && is_main_window(&unescape(only.criterion()))
            }
            _ => false,
        }
    }

    /// Zero locators, or a single locator with empty method and criterion
    pub fn matches_anything(&self) -> bool {
        match self.locators.as_slice() {
            [] => true,
            [only] => only.is_blank(),
            _ => false,
        }
    }

    /// The grid address of the first locator carrying one
    pub fn grid_address(&self) -> Result<Option<GridAddress>> {
        match self.locators.iter().find(|l| l.has_grid_address()) {
            Some(locator) => locator.parsed_grid_address(),
            None => Ok(None),
        }
    }
}

impl fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, locator) in self.locators.iter().enumerate() {
            if i > 0 {
                f.write_str(AND_DELIMITER)?;
            }
            write!(f, "{locator}")?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a SearchQuery {
    type Item = &'a Locator;
    type IntoIter = std::slice::Iter<'a, Locator>;

    fn into_iter(self) -> Self::IntoIter {
        self.locators.iter()
    }
}
