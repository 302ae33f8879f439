//! In-memory automation tree.
//!
//! Used by the crate's tests and by scripting front-ends that want to dry-run
//! queries without a live desktop. Searches are depth-first, pre-order,
//! first-match, like the native providers.

use std::collections::{HashMap, HashSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::trace;

use super::{AutomationProvider, ElementHandle, PatternId, ToggleState, TreeScope};
use crate::condition::{Condition, PropertyValue};
use crate::condition_type::PropertyId;
use crate::control_type::ControlType;
use crate::errors::AutomationError;

/// Description of a node to insert into a [`MemoryTree`]
#[derive(Debug, Clone, Default)]
pub struct NodeSpec {
    properties: HashMap<PropertyId, PropertyValue>,
    patterns: HashSet<PatternId>,
    value: String,
    value_read_only: bool,
    range: f64,
    range_bounds: (f64, f64),
    range_read_only: bool,
    text: String,
    toggle: Option<ToggleState>,
    three_state: bool,
    multiple_selection: bool,
    selected: bool,
    legacy_value: String,
}

impl NodeSpec {
    pub fn new(control_type: ControlType) -> Self {
        let mut spec = Self::default();
        spec.properties
            .insert(PropertyId::ControlType, PropertyValue::ControlType(control_type));
        spec.properties
            .insert(PropertyId::IsEnabled, PropertyValue::Boolean(true));
        spec.properties
            .insert(PropertyId::IsPassword, PropertyValue::Boolean(false));
        spec
    }

    pub fn property(mut self, property: PropertyId, value: PropertyValue) -> Self {
        self.properties.insert(property, value);
        self
    }

    pub fn name(self, name: &str) -> Self {
        self.property(PropertyId::Name, PropertyValue::Text(name.to_string()))
    }

    pub fn automation_id(self, id: &str) -> Self {
        self.property(PropertyId::AutomationId, PropertyValue::Text(id.to_string()))
    }

    pub fn class_name(self, class: &str) -> Self {
        self.property(PropertyId::ClassName, PropertyValue::Text(class.to_string()))
    }

    pub fn process_id(self, pid: i64) -> Self {
        self.property(PropertyId::ProcessId, PropertyValue::Integer(pid))
    }

    pub fn enabled(self, enabled: bool) -> Self {
        self.property(PropertyId::IsEnabled, PropertyValue::Boolean(enabled))
    }

    pub fn value(mut self, value: &str) -> Self {
        self.patterns.insert(PatternId::Value);
        self.value = value.to_string();
        self
    }

    pub fn read_only(mut self) -> Self {
        self.value_read_only = true;
        self.range_read_only = true;
        self
    }

    pub fn range(mut self, value: f64, minimum: f64, maximum: f64) -> Self {
        self.patterns.insert(PatternId::RangeValue);
        self.range = value;
        self.range_bounds = (minimum, maximum);
        self
    }

    pub fn text(mut self, text: &str) -> Self {
        self.patterns.insert(PatternId::Text);
        self.text = text.to_string();
        self
    }

    pub fn toggle(mut self, state: ToggleState) -> Self {
        self.patterns.insert(PatternId::Toggle);
        self.toggle = Some(state);
        self
    }

    /// Toggle that cycles through `Indeterminate` as well
    pub fn three_state(mut self) -> Self {
        self.three_state = true;
        self
    }

    pub fn selection(mut self, multiple: bool) -> Self {
        self.patterns.insert(PatternId::Selection);
        self.multiple_selection = multiple;
        self
    }

    pub fn selection_item(mut self, selected: bool) -> Self {
        self.patterns.insert(PatternId::SelectionItem);
        self.selected = selected;
        self
    }

    pub fn legacy(mut self, value: &str) -> Self {
        self.patterns.insert(PatternId::LegacyAccessible);
        self.legacy_value = value.to_string();
        self
    }
}

#[derive(Debug, Default)]
struct Grid {
    cells: Vec<Vec<ElementHandle>>,
    row_headers: Vec<ElementHandle>,
    column_headers: Vec<ElementHandle>,
    is_table: bool,
}

#[derive(Debug)]
struct Node {
    parent: Option<ElementHandle>,
    children: Vec<ElementHandle>,
    spec: NodeSpec,
    grid: Option<Grid>,
    typed: Vec<String>,
    removed: bool,
}

#[derive(Debug, Default)]
struct Tree {
    nodes: Vec<Node>,
    focused: Option<ElementHandle>,
}

impl Tree {
    fn node(&self, element: ElementHandle) -> Result<&Node, AutomationError> {
        match self.nodes.get(element.raw() as usize) {
            Some(node) if !node.removed => Ok(node),
            _ => Err(stale(element)),
        }
    }

    fn node_mut(&mut self, element: ElementHandle) -> Result<&mut Node, AutomationError> {
        match self.nodes.get_mut(element.raw() as usize) {
            Some(node) if !node.removed => Ok(node),
            _ => Err(stale(element)),
        }
    }

    fn matches(&self, element: ElementHandle, condition: &Condition) -> bool {
        match self.node(element) {
            Ok(node) => condition.matches(&|id| node.spec.properties.get(&id)),
            Err(_) => false,
        }
    }

    fn first_descendant(
        &self,
        start: ElementHandle,
        condition: &Condition,
    ) -> Result<Option<ElementHandle>, AutomationError> {
        let mut stack: Vec<ElementHandle> = self.node(start)?.children.iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            if self.matches(current, condition) {
                return Ok(Some(current));
            }
            stack.extend(self.node(current)?.children.iter().rev().copied());
        }
        Ok(None)
    }

    /// Nearest ancestor (or self) exposing the selection container pattern
    fn selection_container(&self, item: ElementHandle) -> Option<ElementHandle> {
        let mut current = self.node(item).ok()?.parent;
        while let Some(element) = current {
            let node = self.node(element).ok()?;
            if node.spec.patterns.contains(&PatternId::Selection) {
                return Some(element);
            }
            current = node.parent;
        }
        None
    }

    fn selection_items(&self, container: ElementHandle) -> Vec<ElementHandle> {
        let mut items = Vec::new();
        let mut stack: Vec<ElementHandle> = match self.node(container) {
            Ok(node) => node.children.iter().rev().copied().collect(),
            Err(_) => return items,
        };
        while let Some(current) = stack.pop() {
            if let Ok(node) = self.node(current) {
                if node.spec.patterns.contains(&PatternId::SelectionItem) {
                    items.push(current);
                }
                stack.extend(node.children.iter().rev().copied());
            }
        }
        items
    }
}

fn stale(element: ElementHandle) -> AutomationError {
    AutomationError::PlatformError(format!("element {element} is not available"))
}

fn poisoned<E>(_: E) -> AutomationError {
    AutomationError::PlatformError("memory tree lock poisoned".to_string())
}

/// A thread-safe, in-memory [`AutomationProvider`]
#[derive(Debug)]
pub struct MemoryTree {
    tree: RwLock<Tree>,
}

impl Default for MemoryTree {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryTree {
    /// Creates a tree holding only the desktop root pane
    pub fn new() -> Self {
        let root = Node {
            parent: None,
            children: Vec::new(),
            spec: NodeSpec::new(ControlType::Pane).name("Desktop"),
            grid: None,
            typed: Vec::new(),
            removed: false,
        };
        Self {
            tree: RwLock::new(Tree {
                nodes: vec![root],
                focused: None,
            }),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tree>, AutomationError> {
        self.tree.read().map_err(poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tree>, AutomationError> {
        self.tree.write().map_err(poisoned)
    }

    /// Appends a node as the last child of `parent`
    pub fn add(&self, parent: ElementHandle, spec: NodeSpec) -> Result<ElementHandle, AutomationError> {
        let mut tree = self.write()?;
        tree.node(parent)?;
        let handle = ElementHandle::new(tree.nodes.len() as u64);
        tree.nodes.push(Node {
            parent: Some(parent),
            children: Vec::new(),
            spec,
            grid: None,
            typed: Vec::new(),
            removed: false,
        });
        tree.node_mut(parent)?.children.push(handle);
        trace!("Added {} under {}", handle, parent);
        Ok(handle)
    }

    /// Detaches an element and its subtree; their handles become stale
    pub fn remove(&self, element: ElementHandle) -> Result<(), AutomationError> {
        let mut tree = self.write()?;
        let parent = tree.node(element)?.parent;
        if let Some(parent) = parent {
            tree.node_mut(parent)?.children.retain(|c| *c != element);
        }
        let mut stack = vec![element];
        while let Some(current) = stack.pop() {
            let node = tree.node_mut(current)?;
            node.removed = true;
            stack.extend(node.children.iter().copied());
        }
        Ok(())
    }

    /// Overwrites one property of an existing node
    pub fn set_property(
        &self,
        element: ElementHandle,
        property: PropertyId,
        value: PropertyValue,
    ) -> Result<(), AutomationError> {
        self.write()?
            .node_mut(element)?
            .spec
            .properties
            .insert(property, value);
        Ok(())
    }

    /// Adds a `rows x columns` grid of data items under `element`.
    /// Cell names default to `"r,c"` (1-based). Returns the cells row-major.
    pub fn add_grid(
        &self,
        element: ElementHandle,
        rows: usize,
        columns: usize,
    ) -> Result<Vec<Vec<ElementHandle>>, AutomationError> {
        let mut cells = Vec::with_capacity(rows);
        for r in 0..rows {
            let mut row = Vec::with_capacity(columns);
            for c in 0..columns {
                let name = format!("{},{}", r + 1, c + 1);
                row.push(self.add(element, NodeSpec::new(ControlType::DataItem).name(&name))?);
            }
            cells.push(row);
        }
        let mut tree = self.write()?;
        let node = tree.node_mut(element)?;
        let grid = node.grid.get_or_insert_with(Grid::default);
        grid.cells = cells.clone();
        Ok(cells)
    }

    /// Adds row and column header items, turning the grid into a table
    pub fn add_table_headers(
        &self,
        element: ElementHandle,
        row_headers: &[&str],
        column_headers: &[&str],
    ) -> Result<(), AutomationError> {
        let mut rows = Vec::with_capacity(row_headers.len());
        for name in row_headers {
            rows.push(self.add(element, NodeSpec::new(ControlType::HeaderItem).name(name))?);
        }
        let mut columns = Vec::with_capacity(column_headers.len());
        for name in column_headers {
            columns.push(self.add(element, NodeSpec::new(ControlType::HeaderItem).name(name))?);
        }
        let mut tree = self.write()?;
        let grid = tree.node_mut(element)?.grid.get_or_insert_with(Grid::default);
        grid.row_headers = rows;
        grid.column_headers = columns;
        grid.is_table = true;
        Ok(())
    }

    /// Everything sent to `element` through [`AutomationProvider::send_keys`]
    pub fn typed_text(&self, element: ElementHandle) -> Result<Vec<String>, AutomationError> {
        Ok(self.read()?.node(element)?.typed.clone())
    }

    pub fn focused(&self) -> Result<Option<ElementHandle>, AutomationError> {
        Ok(self.read()?.focused)
    }

    fn with_spec<T>(
        &self,
        element: ElementHandle,
        f: impl FnOnce(&NodeSpec) -> T,
    ) -> Result<T, AutomationError> {
        Ok(f(&self.read()?.node(element)?.spec))
    }

    fn with_spec_mut<T>(
        &self,
        element: ElementHandle,
        f: impl FnOnce(&mut NodeSpec) -> T,
    ) -> Result<T, AutomationError> {
        Ok(f(&mut self.write()?.node_mut(element)?.spec))
    }

    fn with_grid<T>(
        &self,
        element: ElementHandle,
        f: impl FnOnce(&Grid) -> T,
    ) -> Result<T, AutomationError> {
        let tree = self.read()?;
        match &tree.node(element)?.grid {
            Some(grid) => Ok(f(grid)),
            None => Err(AutomationError::UnsupportedOperation(format!(
                "element {element} is not a grid"
            ))),
        }
    }
}

impl AutomationProvider for MemoryTree {
    fn root(&self) -> ElementHandle {
        ElementHandle::new(0)
    }

    fn find_first(
        &self,
        parent: ElementHandle,
        scope: TreeScope,
        condition: &Condition,
    ) -> Result<Option<ElementHandle>, AutomationError> {
        let tree = self.read()?;
        match scope {
            TreeScope::Element => {
                tree.node(parent)?;
                Ok(Some(parent).filter(|e| tree.matches(*e, condition)))
            }
            TreeScope::Children => Ok(tree
                .node(parent)?
                .children
                .iter()
                .copied()
                .find(|child| tree.matches(*child, condition))),
            TreeScope::Descendants => tree.first_descendant(parent, condition),
        }
    }

    fn get_property(
        &self,
        element: ElementHandle,
        property: PropertyId,
    ) -> Result<Option<PropertyValue>, AutomationError> {
        self.with_spec(element, |spec| spec.properties.get(&property).cloned())
    }

    fn parent(&self, element: ElementHandle) -> Result<Option<ElementHandle>, AutomationError> {
        Ok(self.read()?.node(element)?.parent)
    }

    fn supports(&self, element: ElementHandle, pattern: PatternId) -> Result<bool, AutomationError> {
        let tree = self.read()?;
        let node = tree.node(element)?;
        Ok(match pattern {
            PatternId::Grid => node.grid.is_some(),
            PatternId::Table => node.grid.as_ref().is_some_and(|g| g.is_table),
            other => node.spec.patterns.contains(&other),
        })
    }

    fn get_value(&self, element: ElementHandle) -> Result<String, AutomationError> {
        self.with_spec(element, |spec| spec.value.clone())
    }

    fn set_value(&self, element: ElementHandle, value: &str) -> Result<(), AutomationError> {
        self.with_spec_mut(element, |spec| spec.value = value.to_string())
    }

    fn is_value_read_only(&self, element: ElementHandle) -> Result<bool, AutomationError> {
        self.with_spec(element, |spec| spec.value_read_only)
    }

    fn get_range_value(&self, element: ElementHandle) -> Result<f64, AutomationError> {
        self.with_spec(element, |spec| spec.range)
    }

    fn set_range_value(&self, element: ElementHandle, value: f64) -> Result<(), AutomationError> {
        self.with_spec_mut(element, |spec| spec.range = value)
    }

    fn range_bounds(&self, element: ElementHandle) -> Result<(f64, f64), AutomationError> {
        self.with_spec(element, |spec| spec.range_bounds)
    }

    fn is_range_read_only(&self, element: ElementHandle) -> Result<bool, AutomationError> {
        self.with_spec(element, |spec| spec.range_read_only)
    }

    fn get_text(&self, element: ElementHandle) -> Result<String, AutomationError> {
        self.with_spec(element, |spec| spec.text.clone())
    }

    fn toggle_state(&self, element: ElementHandle) -> Result<ToggleState, AutomationError> {
        self.with_spec(element, |spec| spec.toggle.unwrap_or(ToggleState::Off))
    }

    fn toggle(&self, element: ElementHandle) -> Result<(), AutomationError> {
        self.with_spec_mut(element, |spec| {
            spec.toggle = Some(match spec.toggle.unwrap_or(ToggleState::Off) {
                ToggleState::Off => ToggleState::On,
                ToggleState::On if spec.three_state => ToggleState::Indeterminate,
                ToggleState::On | ToggleState::Indeterminate => ToggleState::Off,
            });
        })
    }

    fn selected_items(&self, element: ElementHandle) -> Result<Vec<ElementHandle>, AutomationError> {
        let tree = self.read()?;
        tree.node(element)?;
        Ok(tree
            .selection_items(element)
            .into_iter()
            .filter(|item| tree.node(*item).is_ok_and(|n| n.spec.selected))
            .collect())
    }

    fn can_select_multiple(&self, element: ElementHandle) -> Result<bool, AutomationError> {
        self.with_spec(element, |spec| spec.multiple_selection)
    }

    fn is_selected(&self, element: ElementHandle) -> Result<bool, AutomationError> {
        self.with_spec(element, |spec| spec.selected)
    }

    fn select(&self, element: ElementHandle) -> Result<(), AutomationError> {
        let mut tree = self.write()?;
        tree.node(element)?;
        if let Some(container) = tree.selection_container(element) {
            for item in tree.selection_items(container) {
                tree.node_mut(item)?.spec.selected = false;
            }
        }
        tree.node_mut(element)?.spec.selected = true;
        Ok(())
    }

    fn add_to_selection(&self, element: ElementHandle) -> Result<(), AutomationError> {
        self.with_spec_mut(element, |spec| spec.selected = true)
    }

    fn remove_from_selection(&self, element: ElementHandle) -> Result<(), AutomationError> {
        self.with_spec_mut(element, |spec| spec.selected = false)
    }

    fn get_legacy_value(&self, element: ElementHandle) -> Result<String, AutomationError> {
        self.with_spec(element, |spec| spec.legacy_value.clone())
    }

    fn set_legacy_value(&self, element: ElementHandle, value: &str) -> Result<(), AutomationError> {
        self.with_spec_mut(element, |spec| spec.legacy_value = value.to_string())
    }

    fn row_count(&self, element: ElementHandle) -> Result<usize, AutomationError> {
        self.with_grid(element, |grid| grid.cells.len())
    }

    fn column_count(&self, element: ElementHandle) -> Result<usize, AutomationError> {
        self.with_grid(element, |grid| grid.cells.first().map_or(0, Vec::len))
    }

    fn grid_item(
        &self,
        element: ElementHandle,
        row: usize,
        column: usize,
    ) -> Result<Option<ElementHandle>, AutomationError> {
        self.with_grid(element, |grid| {
            grid.cells.get(row).and_then(|r| r.get(column)).copied()
        })
    }

    fn row_headers(&self, element: ElementHandle) -> Result<Vec<ElementHandle>, AutomationError> {
        self.with_grid(element, |grid| grid.row_headers.clone())
    }

    fn column_headers(&self, element: ElementHandle) -> Result<Vec<ElementHandle>, AutomationError> {
        self.with_grid(element, |grid| grid.column_headers.clone())
    }

    fn set_focus(&self, element: ElementHandle) -> Result<(), AutomationError> {
        let mut tree = self.write()?;
        tree.node(element)?;
        tree.focused = Some(element);
        Ok(())
    }

    fn send_keys(&self, element: ElementHandle, text: &str) -> Result<(), AutomationError> {
        let mut tree = self.write()?;
        if tree.focused != Some(element) {
            return Err(AutomationError::PlatformError(format!(
                "element {element} does not have keyboard focus"
            )));
        }
        tree.node_mut(element)?.typed.push(text.to_string());
        Ok(())
    }
}
