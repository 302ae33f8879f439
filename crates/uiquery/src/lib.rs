//! Locator query language and capability-fallback value access for UI
//! automation trees.
//!
//! A query such as `"ControlType:Edit && id:txtUser"` is parsed into
//! [`SearchQuery`] locators, compiled to a property [`Condition`] and run
//! against an [`AutomationProvider`]. Values are read and written through
//! [`CapabilityChain`], which tries each capability an element exposes in a
//! fixed order.

pub mod capability;
pub mod condition;
pub mod condition_type;
pub mod config;
pub mod control_type;
pub mod errors;
pub mod grid_address;
pub mod locator;
pub mod logging;
pub mod platforms;
pub mod query;
pub mod registry;
pub mod search;
#[cfg(test)]
mod tests;
pub mod wait;

pub use capability::{Capability, CapabilityChain, SetOutcome};
pub use condition::{Condition, PropertyValue};
pub use condition_type::{is_condition_type, map_condition_type, PropertyId};
pub use config::EngineConfig;
pub use control_type::{is_main_window, map_control_type, ControlType};
pub use errors::{AutomationError, Result};
pub use grid_address::GridAddress;
pub use locator::Locator;
pub use logging::init_logging;
pub use platforms::{
    AutomationProvider, ElementHandle, MemoryTree, NodeSpec, PatternId, ToggleState, TreeScope,
};
pub use query::SearchQuery;
pub use search::{SearchEngine, SearchMatch};
pub use wait::{try_wait_until, wait_for_some, wait_until};
