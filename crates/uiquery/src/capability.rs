//! Capability-access chain: reads and writes an element's textual value by
//! trying an ordered list of capabilities.
//!
//! Reading picks the first capability that *applies*, even if its value is
//! empty. Writing walks a different order and stops at the first capability
//! that either succeeds or definitively rejects the input.
//!
//! The two orders are a compatibility contract with existing test scripts.
//! Controls commonly expose several capabilities at once (a combo box has
//! both selection and value), so changing either order changes which one
//! wins.

use std::fmt;

use tracing::{debug, instrument, trace};

use crate::condition::{Condition, PropertyValue};
use crate::condition_type::PropertyId;
use crate::config::EngineConfig;
use crate::control_type::ControlType;
use crate::errors::Result;
use crate::platforms::{AutomationProvider, ElementHandle, PatternId, ToggleState, TreeScope};
use crate::wait::try_wait_until;

/// Joins selected item names when reading a multi-select control; also
/// splits names when writing one
pub const SELECTION_DELIMITER: char = ';';

/// Text rendered for a selected item by the select-item capability
pub const SELECTED: &str = "Selected";

/// Outcome of a write through one capability
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOutcome {
    /// The capability is absent; try the next one
    NotApplicable,
    Success,
    /// The capability applies but rejected the value; stop trying
    Failure,
}

/// The value capabilities, one variant per kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Value,
    RangeValue,
    Text,
    Toggle,
    Selection,
    SelectionItem,
    LegacyAccessible,
    /// First plain-text descendant, else the element's own name; writes by typing
    Structural,
}

/// Capabilities consulted by [`CapabilityChain::get_value`] before the
/// structural fallback
pub const GET_ORDER: [Capability; 6] = [
    Capability::Value,
    Capability::RangeValue,
    Capability::Text,
    Capability::Toggle,
    Capability::Selection,
    Capability::SelectionItem,
];

/// Capabilities consulted by [`CapabilityChain::set_value`], in order
pub const SET_ORDER: [Capability; 6] = [
    Capability::Selection,
    Capability::RangeValue,
    Capability::Value,
    Capability::SelectionItem,
    Capability::LegacyAccessible,
    Capability::Structural,
];

impl Capability {
    /// The native pattern behind this capability; `None` for the structural fallback
    pub fn pattern(self) -> Option<PatternId> {
        match self {
            Self::Value => Some(PatternId::Value),
            Self::RangeValue => Some(PatternId::RangeValue),
            Self::Text => Some(PatternId::Text),
            Self::Toggle => Some(PatternId::Toggle),
            Self::Selection => Some(PatternId::Selection),
            Self::SelectionItem => Some(PatternId::SelectionItem),
            Self::LegacyAccessible => Some(PatternId::LegacyAccessible),
            Self::Structural => None,
        }
    }

    /// Whether the element exposes this capability right now.
    /// The structural fallback applies to every element.
    pub fn applies(self, provider: &dyn AutomationProvider, element: ElementHandle) -> Result<bool> {
        match self.pattern() {
            Some(pattern) => provider.supports(element, pattern),
            None => Ok(true),
        }
    }

    /// Reads the value as text. Callers check [`Capability::applies`] first.
    pub fn get(self, provider: &dyn AutomationProvider, element: ElementHandle) -> Result<Option<String>> {
        let value = match self {
            Self::Value => provider.get_value(element)?,
            Self::RangeValue => format_number(provider.get_range_value(element)?),
            Self::Text => provider.get_text(element)?,
            Self::Toggle => provider.toggle_state(element)?.to_string(),
            Self::Selection => selected_names(provider, element)?,
            Self::SelectionItem => {
                if provider.is_selected(element)? {
                    SELECTED.to_string()
                } else {
                    String::new()
                }
            }
            Self::LegacyAccessible => provider.get_legacy_value(element)?,
            Self::Structural => return structural_text(provider, element),
        };
        Ok(Some(value))
    }

    /// Writes `value`, reporting whether this capability was the right one
    pub fn set(
        self,
        provider: &dyn AutomationProvider,
        element: ElementHandle,
        value: &str,
    ) -> Result<SetOutcome> {
        if !self.applies(provider, element)? {
            return Ok(SetOutcome::NotApplicable);
        }
        match self {
            Self::Value => {
                if provider.is_value_read_only(element)? {
                    return Ok(SetOutcome::Failure);
                }
                provider.set_value(element, value)?;
                Ok(SetOutcome::Success)
            }
            Self::RangeValue => set_range(provider, element, value),
            // Text spans are read-only
            Self::Text => Ok(SetOutcome::NotApplicable),
            Self::Toggle => set_toggle(provider, element, value),
            Self::Selection => select_by_names(provider, element, value),
            Self::SelectionItem => set_selected(provider, element, value),
            Self::LegacyAccessible => {
                provider.set_legacy_value(element, value)?;
                Ok(SetOutcome::Success)
            }
            Self::Structural => type_text(provider, element, value),
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Value => "Value",
            Self::RangeValue => "RangeValue",
            Self::Text => "Text",
            Self::Toggle => "Toggle",
            Self::Selection => "Selection",
            Self::SelectionItem => "SelectionItem",
            Self::LegacyAccessible => "LegacyIAccessible",
            Self::Structural => "Structural",
        };
        f.write_str(name)
    }
}

/// Integral values render without a fraction ("5", not "5.0")
fn format_number(value: f64) -> String {
    format!("{value}")
}

fn element_name(provider: &dyn AutomationProvider, element: ElementHandle) -> Result<Option<String>> {
    Ok(provider
        .get_property(element, PropertyId::Name)?
        .and_then(|v| v.as_text().map(str::to_string)))
}

fn selected_names(provider: &dyn AutomationProvider, element: ElementHandle) -> Result<String> {
    let mut names = Vec::new();
    for item in provider.selected_items(element)? {
        if let Some(name) = element_name(provider, item)? {
            names.push(name);
        }
    }
    Ok(names.join(&format!("{SELECTION_DELIMITER} ")))
}

fn structural_text(provider: &dyn AutomationProvider, element: ElementHandle) -> Result<Option<String>> {
    let text_child = Condition::property(PropertyId::ControlType, ControlType::Text);
    if let Some(child) = provider.find_first(element, TreeScope::Descendants, &text_child)? {
        if let Some(name) = element_name(provider, child)? {
            return Ok(Some(name));
        }
    }
    element_name(provider, element)
}

fn set_range(provider: &dyn AutomationProvider, element: ElementHandle, value: &str) -> Result<SetOutcome> {
    let number = match value.trim().parse::<f64>() {
        Ok(n) if n.is_finite() => n,
        _ => {
            debug!("'{}' is not a number for the range capability", value);
            return Ok(SetOutcome::Failure);
        }
    };
    if provider.is_range_read_only(element)? {
        return Ok(SetOutcome::Failure);
    }
    let (minimum, maximum) = provider.range_bounds(element)?;
    if number < minimum || number > maximum {
        debug!("{} is outside [{}, {}]", number, minimum, maximum);
        return Ok(SetOutcome::Failure);
    }
    provider.set_range_value(element, number)?;
    Ok(SetOutcome::Success)
}

fn set_toggle(provider: &dyn AutomationProvider, element: ElementHandle, value: &str) -> Result<SetOutcome> {
    let Some(target) = ToggleState::parse(value) else {
        return Ok(SetOutcome::Failure);
    };
    // A toggle cycles through at most three states
    for _ in 0..3 {
        if provider.toggle_state(element)? == target {
            return Ok(SetOutcome::Success);
        }
        provider.toggle(element)?;
    }
    if provider.toggle_state(element)? == target {
        Ok(SetOutcome::Success)
    } else {
        Ok(SetOutcome::Failure)
    }
}

/// Selects the descendant items named in `value` (`;`-separated for
/// multi-select containers). Every name must resolve before anything changes.
fn select_by_names(
    provider: &dyn AutomationProvider,
    container: ElementHandle,
    value: &str,
) -> Result<SetOutcome> {
    let names: Vec<&str> = if provider.can_select_multiple(container)? {
        value
            .split(SELECTION_DELIMITER)
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .collect()
    } else {
        vec![value.trim()]
    };

    let mut items = Vec::with_capacity(names.len());
    for name in &names {
        let condition = Condition::property(PropertyId::Name, PropertyValue::Text((*name).to_string()));
        match provider.find_first(container, TreeScope::Descendants, &condition)? {
            Some(item) if provider.supports(item, PatternId::SelectionItem)? => items.push(item),
            _ => {
                debug!("No selectable item named '{}' under {}", name, container);
                return Ok(SetOutcome::Failure);
            }
        }
    }

    let Some((first, rest)) = items.split_first() else {
        return Ok(SetOutcome::Failure);
    };
    provider.select(*first)?;
    for item in rest {
        provider.add_to_selection(*item)?;
    }
    Ok(SetOutcome::Success)
}

fn set_selected(provider: &dyn AutomationProvider, element: ElementHandle, value: &str) -> Result<SetOutcome> {
    let wanted = match value.trim().to_lowercase().as_str() {
        "selected" | "true" | "on" | "yes" => true,
        "" | "unselected" | "false" | "off" | "no" => false,
        _ => return Ok(SetOutcome::Failure),
    };
    if provider.is_selected(element)? != wanted {
        if wanted {
            provider.select(element)?;
        } else {
            provider.remove_from_selection(element)?;
        }
    }
    Ok(SetOutcome::Success)
}

/// Keystroke fallback; disabled elements cannot take input
fn type_text(provider: &dyn AutomationProvider, element: ElementHandle, value: &str) -> Result<SetOutcome> {
    if let Some(PropertyValue::Boolean(false)) = provider.get_property(element, PropertyId::IsEnabled)? {
        return Ok(SetOutcome::Failure);
    }
    provider.set_focus(element)?;
    provider.send_keys(element, value)?;
    Ok(SetOutcome::Success)
}

/// Uniform get/set over an element's value capabilities
#[derive(Clone, Copy)]
pub struct CapabilityChain<'a> {
    provider: &'a dyn AutomationProvider,
}

impl<'a> CapabilityChain<'a> {
    pub fn new(provider: &'a dyn AutomationProvider) -> Self {
        Self { provider }
    }

    /// Reads the element's value through the first applicable capability,
    /// falling back to the structural text. `None` when nothing yields text.
    #[instrument(level = "debug", skip(self))]
    pub fn get_value(&self, element: ElementHandle) -> Result<Option<String>> {
        for capability in GET_ORDER {
            if capability.applies(self.provider, element)? {
                trace!("Reading {} through {}", element, capability);
                return capability.get(self.provider, element);
            }
        }
        trace!("Reading {} through the structural fallback", element);
        Capability::Structural.get(self.provider, element)
    }

    /// Writes `value` through the first capability that accepts or rejects it
    #[instrument(level = "debug", skip(self, value))]
    pub fn set_value(&self, element: ElementHandle, value: &str) -> Result<SetOutcome> {
        for capability in SET_ORDER {
            let outcome = capability.set(self.provider, element, value)?;
            trace!("{} on {} -> {:?}", capability, element, outcome);
            if outcome != SetOutcome::NotApplicable {
                debug!("Set {} through {}: {:?}", element, capability, outcome);
                return Ok(outcome);
            }
        }
        Ok(SetOutcome::NotApplicable)
    }

    /// Every capability that applies to `element`, in read order, followed by
    /// the legacy capability when present
    pub fn capabilities_of(&self, element: ElementHandle) -> Result<Vec<Capability>> {
        let mut found = Vec::new();
        for capability in GET_ORDER.into_iter().chain([Capability::LegacyAccessible]) {
            if capability.applies(self.provider, element)? {
                found.push(capability);
            }
        }
        Ok(found)
    }

    /// Polls [`CapabilityChain::get_value`] until it equals `expected`
    pub fn wait_for_value(
        &self,
        element: ElementHandle,
        expected: &str,
        config: &EngineConfig,
    ) -> Result<bool> {
        try_wait_until(
            || -> Result<bool> { Ok(self.get_value(element)?.as_deref() == Some(expected)) },
            config.timeout(),
            config.poll_interval(),
        )
    }
}

impl fmt::Debug for CapabilityChain<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapabilityChain").finish_non_exhaustive()
    }
}
