//! Condition-type registry: which element property a locator method matches on

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::registry::NameRegistry;

/// Provider-level property identifiers a condition can test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyId {
    AccessKey,
    AutomationId,
    ClassName,
    ControlType,
    HelpText,
    IsEnabled,
    IsPassword,
    Name,
    ProcessId,
    NativeWindowHandle,
}

/// How a criterion string is converted before it is compared
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Text,
    Integer,
    Boolean,
    ControlType,
}

impl PropertyId {
    pub fn value_kind(self) -> ValueKind {
        match self {
            Self::IsEnabled | Self::IsPassword => ValueKind::Boolean,
            Self::ProcessId | Self::NativeWindowHandle => ValueKind::Integer,
            Self::ControlType => ValueKind::ControlType,
            _ => ValueKind::Text,
        }
    }

    pub fn is_boolean_valued(self) -> bool {
        self.value_kind() == ValueKind::Boolean
    }

    pub fn is_numeric_valued(self) -> bool {
        self.value_kind() == ValueKind::Integer
    }

    pub fn is_control_type_valued(self) -> bool {
        self.value_kind() == ValueKind::ControlType
    }
}

static CONDITION_TYPES: Lazy<NameRegistry<PropertyId>> = Lazy::new(|| {
    NameRegistry::new(
        "Condition Type",
        &[
            ("AccessKey", PropertyId::AccessKey),
            ("Caption", PropertyId::Name),
            ("ClassName", PropertyId::ClassName),
            ("ControlType", PropertyId::ControlType),
            ("HelpText", PropertyId::HelpText),
            ("Id", PropertyId::AutomationId),
            ("IsEnabled", PropertyId::IsEnabled),
            ("IsPassword", PropertyId::IsPassword),
            ("Name", PropertyId::Name),
            ("ProcessId", PropertyId::ProcessId),
            ("WindowHandle", PropertyId::NativeWindowHandle),
        ],
    )
});

/// The process-wide condition-type table (read-only after first use)
pub fn condition_types() -> &'static NameRegistry<PropertyId> {
    &CONDITION_TYPES
}

/// Maps a locator method such as `"id"` or `"control type"` to its property
pub fn map_condition_type(name: &str) -> Result<PropertyId> {
    CONDITION_TYPES.map(name)
}

pub fn is_condition_type(name: &str) -> bool {
    CONDITION_TYPES.contains(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AutomationError;

    #[test]
    fn test_lookup_ignores_case_and_spaces() {
        for name in ["control type", "ControlType", "CONTROLTYPE"] {
            assert_eq!(map_condition_type(name), Ok(PropertyId::ControlType));
        }
    }

    #[test]
    fn test_aliases() {
        assert_eq!(map_condition_type("Caption"), Ok(PropertyId::Name));
        assert_eq!(map_condition_type("id"), Ok(PropertyId::AutomationId));
        assert_eq!(
            map_condition_type("Window Handle"),
            Ok(PropertyId::NativeWindowHandle)
        );
    }

    #[test]
    fn test_unknown_name_is_reported() {
        let err = map_condition_type("NonExisting").unwrap_err();
        assert!(matches!(err, AutomationError::Unrecognized { .. }));
        assert!(err.to_string().contains("NonExisting"));
        assert!(err.to_string().contains("Condition Type"));
    }

    #[test]
    fn test_value_kinds() {
        assert!(PropertyId::IsEnabled.is_boolean_valued());
        assert!(PropertyId::IsPassword.is_boolean_valued());
        assert!(PropertyId::ProcessId.is_numeric_valued());
        assert!(PropertyId::NativeWindowHandle.is_numeric_valued());
        assert!(PropertyId::ControlType.is_control_type_valued());
        assert_eq!(PropertyId::HelpText.value_kind(), ValueKind::Text);
    }
}
