//! Search/match engine: compiles a query and runs it against the provider

use std::sync::Arc;

use tracing::{debug, instrument};

use crate::condition::compile;
use crate::config::EngineConfig;
use crate::errors::{AutomationError, Result};
use crate::grid_address::GridAddress;
use crate::platforms::{AutomationProvider, ElementHandle, PatternId, TreeScope};
use crate::query::SearchQuery;
use crate::wait::wait_for_some;

/// A resolved search result
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchMatch {
    /// The element the query addresses
    pub element: ElementHandle,
    /// The element it was found under: the search parent, or the grid when a
    /// grid address re-anchored the result
    pub anchor: ElementHandle,
}

/// Runs queries against an [`AutomationProvider`].
///
/// Not thread-safe beyond what the provider itself tolerates: calls are
/// synchronous and waits block the calling thread.
#[derive(Clone)]
pub struct SearchEngine {
    provider: Arc<dyn AutomationProvider>,
    config: EngineConfig,
}

impl std::fmt::Debug for SearchEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchEngine")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SearchEngine {
    pub fn new(provider: Arc<dyn AutomationProvider>, config: EngineConfig) -> Self {
        Self { provider, config }
    }

    pub fn provider(&self) -> &dyn AutomationProvider {
        self.provider.as_ref()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut EngineConfig {
        &mut self.config
    }

    /// Parses with this engine's default condition type
    pub fn parse(&self, query: &str) -> SearchQuery {
        SearchQuery::parse(query, &self.config)
    }

    /// Finds the first element under `parent` matching `query`.
    ///
    /// `Ok(None)` means nothing matched (or a grid address could not be
    /// resolved); errors are usage, lookup or provider failures.
    #[instrument(level = "debug", skip(self, query), fields(query = %query))]
    pub fn find_match(
        &self,
        parent: ElementHandle,
        scope: TreeScope,
        query: &SearchQuery,
    ) -> Result<Option<SearchMatch>> {
        let grid_address = query.grid_address()?;

        if query.is_main_window_query() {
            debug!("Main window query resolves to the search root {}", parent);
            return match grid_address {
                None => Ok(Some(SearchMatch {
                    element: parent,
                    anchor: parent,
                })),
                Some(address) => Ok(self
                    .resolve_grid_address(parent, address)?
                    .map(|element| SearchMatch {
                        element,
                        anchor: parent,
                    })),
            };
        }

        let condition = compile(query)?;

        let found = match self.provider.find_first(parent, scope, &condition)? {
            Some(found) => found,
            None => {
                debug!("No element matched under {}", parent);
                return Ok(None);
            }
        };

        match grid_address {
            None => Ok(Some(SearchMatch {
                element: found,
                anchor: parent,
            })),
            Some(address) => Ok(self
                .resolve_grid_address(found, address)?
                .map(|element| SearchMatch {
                    element,
                    anchor: found,
                })),
        }
    }

    pub fn find(
        &self,
        parent: ElementHandle,
        scope: TreeScope,
        query: &SearchQuery,
    ) -> Result<Option<ElementHandle>> {
        Ok(self.find_match(parent, scope, query)?.map(|m| m.element))
    }

    /// Parses and runs `query`
    pub fn find_str(
        &self,
        parent: ElementHandle,
        scope: TreeScope,
        query: &str,
    ) -> Result<Option<ElementHandle>> {
        self.find(parent, scope, &self.parse(query))
    }

    /// Searches the top-level windows (children of the provider root)
    pub fn find_window(&self, query: &SearchQuery) -> Result<Option<ElementHandle>> {
        self.find(self.provider.root(), TreeScope::Children, query)
    }

    /// Searches every descendant of `window`
    pub fn find_control(
        &self,
        window: ElementHandle,
        query: &SearchQuery,
    ) -> Result<Option<ElementHandle>> {
        self.find(window, TreeScope::Descendants, query)
    }

    /// Like [`SearchEngine::find`], but absence is an [`AutomationError::ElementNotFound`]
    pub fn find_required(
        &self,
        parent: ElementHandle,
        scope: TreeScope,
        query: &SearchQuery,
    ) -> Result<ElementHandle> {
        self.find(parent, scope, query)?.ok_or_else(|| {
            AutomationError::ElementNotFound(format!("no element matches '{query}' under {parent}"))
        })
    }

    /// Repeats the whole search until it matches or the configured timeout
    /// elapses. Each attempt starts from `parent`, never from an earlier result.
    #[instrument(level = "debug", skip(self, query), fields(query = %query))]
    pub fn wait_for(
        &self,
        parent: ElementHandle,
        scope: TreeScope,
        query: &SearchQuery,
    ) -> Result<Option<ElementHandle>> {
        let timeout = self.config.timeout();
        let poll_interval = self.config.poll_interval();
        wait_for_some(|| self.find(parent, scope, query), timeout, poll_interval)
    }

    /// Like [`SearchEngine::wait_for`], but a timeout is an [`AutomationError::Timeout`]
    pub fn wait_for_required(
        &self,
        parent: ElementHandle,
        scope: TreeScope,
        query: &SearchQuery,
    ) -> Result<ElementHandle> {
        self.wait_for(parent, scope, query)?.ok_or_else(|| {
            AutomationError::Timeout(format!(
                "timed out after {:?} waiting for '{query}' under {parent}",
                self.config.timeout()
            ))
        })
    }

    /// Maps a grid address onto a cell or header of `grid`.
    ///
    /// A missing grid/table capability or an out-of-range address resolves to
    /// `None`, not an error.
    pub fn resolve_grid_address(
        &self,
        grid: ElementHandle,
        address: GridAddress,
    ) -> Result<Option<ElementHandle>> {
        let provider = self.provider.as_ref();
        match address {
            GridAddress::Cell { row, column } => {
                if !provider.supports(grid, PatternId::Grid)? {
                    debug!("{} has no grid capability for {}", grid, address);
                    return Ok(None);
                }
                if row == 0
                    || column == 0
                    || row > provider.row_count(grid)?
                    || column > provider.column_count(grid)?
                {
                    debug!("{} is outside grid {}", address, grid);
                    return Ok(None);
                }
                provider.grid_item(grid, row - 1, column - 1)
            }
            GridAddress::Row(row) => {
                if !provider.supports(grid, PatternId::Table)? {
                    debug!("{} has no table capability for {}", grid, address);
                    return Ok(None);
                }
                let headers = provider.row_headers(grid)?;
                Ok(row.checked_sub(1).and_then(|i| headers.get(i)).copied())
            }
            GridAddress::Column(column) => {
                if !provider.supports(grid, PatternId::Table)? {
                    debug!("{} has no table capability for {}", grid, address);
                    return Ok(None);
                }
                let headers = provider.column_headers(grid)?;
                Ok(column.checked_sub(1).and_then(|i| headers.get(i)).copied())
            }
        }
    }
}
