//! The automation tree provider the engine searches and drives.
//!
//! Process/window discovery, tree walking and the native capability
//! implementations live behind [`AutomationProvider`]. The engine only holds
//! [`ElementHandle`]s, which are opaque lookups into the provider's tree and
//! may go stale between calls.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::condition::{Condition, PropertyValue};
use crate::condition_type::PropertyId;
use crate::errors::AutomationError;

pub mod memory;

pub use memory::{MemoryTree, NodeSpec};

/// Opaque, non-owning reference to an element in the provider's tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementHandle(u64);

impl ElementHandle {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Which elements a search considers, relative to its start element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TreeScope {
    /// Only the start element itself
    Element,
    /// Immediate children of the start element
    Children,
    /// Every descendant of the start element
    Descendants,
}

/// Native capability (pattern) identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PatternId {
    Value,
    RangeValue,
    Text,
    Toggle,
    Selection,
    SelectionItem,
    LegacyAccessible,
    Grid,
    Table,
}

/// State reported by the toggle capability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToggleState {
    Off,
    On,
    Indeterminate,
}

impl ToggleState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::On => "On",
            Self::Off => "Off",
            Self::Indeterminate => "Indeterminate",
        }
    }

    /// Accepts `On`/`Off`/`Indeterminate` and the usual checkbox spellings
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "on" | "true" | "checked" | "1" => Some(Self::On),
            "off" | "false" | "unchecked" | "0" => Some(Self::Off),
            "indeterminate" | "mixed" => Some(Self::Indeterminate),
            _ => None,
        }
    }
}

impl fmt::Display for ToggleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn unsupported<T>(operation: &str) -> Result<T, AutomationError> {
    Err(AutomationError::UnsupportedOperation(format!(
        "{operation} not implemented by this provider"
    )))
}

/// The external automation tree.
///
/// Only the tree-walking methods are required. Native capability operations
/// default to [`AutomationError::UnsupportedOperation`]; a provider that
/// reports a pattern through [`AutomationProvider::supports`] must implement
/// that pattern's operations.
pub trait AutomationProvider: Send + Sync {
    /// The desktop (or application) root every window hangs off
    fn root(&self) -> ElementHandle;

    /// First element in `scope` of `parent` matching `condition`, in tree order
    fn find_first(
        &self,
        parent: ElementHandle,
        scope: TreeScope,
        condition: &Condition,
    ) -> Result<Option<ElementHandle>, AutomationError>;

    fn get_property(
        &self,
        element: ElementHandle,
        property: PropertyId,
    ) -> Result<Option<PropertyValue>, AutomationError>;

    /// Parent of `element`; `None` for the root
    fn parent(&self, _element: ElementHandle) -> Result<Option<ElementHandle>, AutomationError> {
        unsupported("parent")
    }

    /// Whether the element currently exposes the given capability
    fn supports(&self, element: ElementHandle, pattern: PatternId)
        -> Result<bool, AutomationError>;

    // Value

    fn get_value(&self, _element: ElementHandle) -> Result<String, AutomationError> {
        unsupported("get_value")
    }

    fn set_value(&self, _element: ElementHandle, _value: &str) -> Result<(), AutomationError> {
        unsupported("set_value")
    }

    fn is_value_read_only(&self, _element: ElementHandle) -> Result<bool, AutomationError> {
        unsupported("is_value_read_only")
    }

    // RangeValue

    fn get_range_value(&self, _element: ElementHandle) -> Result<f64, AutomationError> {
        unsupported("get_range_value")
    }

    fn set_range_value(&self, _element: ElementHandle, _value: f64) -> Result<(), AutomationError> {
        unsupported("set_range_value")
    }

    /// `(minimum, maximum)` accepted by the range capability
    fn range_bounds(&self, _element: ElementHandle) -> Result<(f64, f64), AutomationError> {
        unsupported("range_bounds")
    }

    fn is_range_read_only(&self, _element: ElementHandle) -> Result<bool, AutomationError> {
        unsupported("is_range_read_only")
    }

    // Text

    /// Full document text span
    fn get_text(&self, _element: ElementHandle) -> Result<String, AutomationError> {
        unsupported("get_text")
    }

    // Toggle

    fn toggle_state(&self, _element: ElementHandle) -> Result<ToggleState, AutomationError> {
        unsupported("toggle_state")
    }

    /// Advances the toggle state by one step
    fn toggle(&self, _element: ElementHandle) -> Result<(), AutomationError> {
        unsupported("toggle")
    }

    // Selection (container)

    fn selected_items(&self, _element: ElementHandle) -> Result<Vec<ElementHandle>, AutomationError> {
        unsupported("selected_items")
    }

    fn can_select_multiple(&self, _element: ElementHandle) -> Result<bool, AutomationError> {
        unsupported("can_select_multiple")
    }

    // SelectionItem

    fn is_selected(&self, _element: ElementHandle) -> Result<bool, AutomationError> {
        unsupported("is_selected")
    }

    /// Selects the item, deselecting its siblings
    fn select(&self, _element: ElementHandle) -> Result<(), AutomationError> {
        unsupported("select")
    }

    fn add_to_selection(&self, _element: ElementHandle) -> Result<(), AutomationError> {
        unsupported("add_to_selection")
    }

    fn remove_from_selection(&self, _element: ElementHandle) -> Result<(), AutomationError> {
        unsupported("remove_from_selection")
    }

    // LegacyAccessible

    fn get_legacy_value(&self, _element: ElementHandle) -> Result<String, AutomationError> {
        unsupported("get_legacy_value")
    }

    fn set_legacy_value(&self, _element: ElementHandle, _value: &str) -> Result<(), AutomationError> {
        unsupported("set_legacy_value")
    }

    // Grid / Table

    fn row_count(&self, _element: ElementHandle) -> Result<usize, AutomationError> {
        unsupported("row_count")
    }

    fn column_count(&self, _element: ElementHandle) -> Result<usize, AutomationError> {
        unsupported("column_count")
    }

    /// Cell at 0-based `(row, column)`
    fn grid_item(
        &self,
        _element: ElementHandle,
        _row: usize,
        _column: usize,
    ) -> Result<Option<ElementHandle>, AutomationError> {
        unsupported("grid_item")
    }

    fn row_headers(&self, _element: ElementHandle) -> Result<Vec<ElementHandle>, AutomationError> {
        unsupported("row_headers")
    }

    fn column_headers(&self, _element: ElementHandle) -> Result<Vec<ElementHandle>, AutomationError> {
        unsupported("column_headers")
    }

    // Input

    fn set_focus(&self, _element: ElementHandle) -> Result<(), AutomationError> {
        unsupported("set_focus")
    }

    /// Types `text` into the element, which has already been focused
    fn send_keys(&self, _element: ElementHandle, _text: &str) -> Result<(), AutomationError> {
        unsupported("send_keys")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A provider with a single element and no native capabilities
    struct Bare;

    impl AutomationProvider for Bare {
        fn root(&self) -> ElementHandle {
            ElementHandle::new(0)
        }

        fn find_first(
            &self,
            parent: ElementHandle,
            _scope: TreeScope,
            condition: &Condition,
        ) -> Result<Option<ElementHandle>, AutomationError> {
            Ok((*condition == Condition::True).then_some(parent))
        }

        fn get_property(
            &self,
            _element: ElementHandle,
            _property: PropertyId,
        ) -> Result<Option<PropertyValue>, AutomationError> {
            Ok(None)
        }

        fn supports(&self, _element: ElementHandle, _pattern: PatternId) -> Result<bool, AutomationError> {
            Ok(false)
        }
    }

    #[test]
    fn test_optional_operations_default_to_unsupported() {
        let provider = Bare;
        let root = provider.root();
        assert!(matches!(
            provider.parent(root),
            Err(AutomationError::UnsupportedOperation(_))
        ));
        assert!(matches!(
            provider.get_value(root),
            Err(AutomationError::UnsupportedOperation(_))
        ));
        assert!(matches!(
            provider.send_keys(root, "x"),
            Err(AutomationError::UnsupportedOperation(_))
        ));
    }

    #[test]
    fn test_toggle_state_spellings() {
        assert_eq!(ToggleState::parse(" Checked "), Some(ToggleState::On));
        assert_eq!(ToggleState::parse("0"), Some(ToggleState::Off));
        assert_eq!(ToggleState::parse("mixed"), Some(ToggleState::Indeterminate));
        assert_eq!(ToggleState::parse("sometimes"), None);
        assert_eq!(ToggleState::Indeterminate.to_string(), "Indeterminate");
    }
}
