//! Search conditions compiled from locators

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::condition_type::{PropertyId, ValueKind};
use crate::control_type::{map_control_type, ControlType};
use crate::errors::{AutomationError, Result};
use crate::locator::Locator;
use crate::query::SearchQuery;

/// A typed property value, as compared by a condition
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyValue {
    Text(String),
    Integer(i64),
    Boolean(bool),
    ControlType(ControlType),
}

impl PropertyValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::ControlType(ct) => write!(f, "{ct}"),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<ControlType> for PropertyValue {
    fn from(ct: ControlType) -> Self {
        Self::ControlType(ct)
    }
}

/// A search condition handed to the provider
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Condition {
    /// Matches every element
    True,
    Property {
        property: PropertyId,
        value: PropertyValue,
    },
    And(Vec<Condition>),
}

impl Condition {
    pub fn property(property: PropertyId, value: impl Into<PropertyValue>) -> Self {
        Self::Property {
            property,
            value: value.into(),
        }
    }

    /// Evaluates the condition against an element's properties.
    ///
    /// Providers that do their own matching never call this; in-memory
    /// providers use it directly.
    pub fn matches<'a, F>(&self, lookup: &F) -> bool
    where
        F: Fn(PropertyId) -> Option<&'a PropertyValue>,
    {
        match self {
            Self::True => true,
            Self::Property { property, value } => lookup(*property) == Some(value),
            Self::And(parts) => parts.iter().all(|c| c.matches(lookup)),
        }
    }
}

/// Converts a locator's criterion into the value its condition type compares.
///
/// Control types resolve through the control-type registry, numeric types
/// parse as integers, boolean types as `true`/`false`; everything else is the
/// unescaped criterion unchanged.
pub fn condition_value(locator: &Locator) -> Result<PropertyValue> {
    let property = locator.condition_type()?;
    let criterion = locator.unescaped_criterion();
    let invalid = |expected: &str| AutomationError::InvalidValue {
        condition_type: locator.method().to_string(),
        value: criterion.clone(),
        expected: expected.to_string(),
    };

    match property.value_kind() {
        ValueKind::ControlType => map_control_type(&criterion).map(PropertyValue::ControlType),
        ValueKind::Integer => criterion
            .trim()
            .parse::<i64>()
            .map(PropertyValue::Integer)
            .map_err(|_| invalid("an integer")),
        ValueKind::Boolean => parse_bool(&criterion)
            .map(PropertyValue::Boolean)
            .ok_or_else(|| invalid("'true' or 'false'")),
        ValueKind::Text => Ok(PropertyValue::Text(criterion)),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("true") {
        Some(true)
    } else if raw.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Builds the condition for one locator
pub fn locator_condition(locator: &Locator) -> Result<Condition> {
    Ok(Condition::Property {
        property: locator.condition_type()?,
        value: condition_value(locator)?,
    })
}

/// ANDs the conditions of every locator in the query.
///
/// Zero locators, or one blank locator, compile to [`Condition::True`]
/// rather than an empty AND.
pub fn compile(query: &SearchQuery) -> Result<Condition> {
    if query.matches_anything() {
        return Ok(Condition::True);
    }
    let mut conditions = query
        .locators()
        .iter()
        .map(locator_condition)
        .collect::<Result<Vec<_>>>()?;
    if conditions.len() == 1 {
        Ok(conditions.remove(0))
    } else {
        Ok(Condition::And(conditions))
    }
}
