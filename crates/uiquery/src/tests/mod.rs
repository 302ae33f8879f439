mod query_tests;

use std::sync::Arc;
use std::time::Duration;

use crate::condition::PropertyValue;
use crate::condition_type::PropertyId;
use crate::config::EngineConfig;
use crate::control_type::ControlType;
use crate::platforms::{AutomationProvider, ElementHandle, MemoryTree, NodeSpec, ToggleState};
use crate::search::SearchEngine;

/// A login dialog plus a second top-level window
pub(crate) struct LoginDialog {
    pub tree: Arc<MemoryTree>,
    pub window: ElementHandle,
    pub other_window: ElementHandle,
    pub user: ElementHandle,
    pub password: ElementHandle,
    pub ok: ElementHandle,
    pub cancel: ElementHandle,
    pub status: ElementHandle,
    pub remember: ElementHandle,
    pub role: ElementHandle,
    pub role_admin: ElementHandle,
    pub role_guest: ElementHandle,
    pub grid: ElementHandle,
    pub cells: Vec<Vec<ElementHandle>>,
}

impl LoginDialog {
    pub fn new() -> Self {
        let tree = Arc::new(MemoryTree::new());
        let root = tree.root();
        let add = |parent, spec| tree.add(parent, spec).unwrap();

        let window = add(
            root,
            NodeSpec::new(ControlType::Window)
                .name("Login")
                .automation_id("frmLogin")
                .process_id(4242),
        );
        let user = add(
            window,
            NodeSpec::new(ControlType::Edit)
                .name("User")
                .automation_id("txtUser")
                .value(""),
        );
        let password = add(
            window,
            NodeSpec::new(ControlType::Edit)
                .name("Password")
                .automation_id("txtPass")
                .property(PropertyId::IsPassword, PropertyValue::Boolean(true))
                .value("hunter2"),
        );
        let ok = add(
            window,
            NodeSpec::new(ControlType::Button).name("OK").automation_id("btnOk"),
        );
        let cancel = add(
            window,
            NodeSpec::new(ControlType::Button).name("Cancel").enabled(false),
        );
        let status = add(window, NodeSpec::new(ControlType::Text).name("Ready"));
        let remember = add(
            window,
            NodeSpec::new(ControlType::CheckBox)
                .name("Remember me")
                .toggle(ToggleState::Off),
        );
        let role = add(
            window,
            NodeSpec::new(ControlType::ComboBox)
                .name("Role")
                .automation_id("cmbRole")
                .selection(false)
                .value("Admin"),
        );
        let role_admin = add(
            role,
            NodeSpec::new(ControlType::ListItem)
                .name("Admin")
                .selection_item(true),
        );
        let role_guest = add(
            role,
            NodeSpec::new(ControlType::ListItem)
                .name("Guest")
                .selection_item(false),
        );
        let grid = add(
            window,
            NodeSpec::new(ControlType::DataGrid)
                .name("Sessions")
                .automation_id("grdSessions"),
        );
        let cells = tree.add_grid(grid, 2, 3).unwrap();
        tree.add_table_headers(grid, &["First", "Second"], &["Host", "User", "Started"])
            .unwrap();

        let other_window = add(
            root,
            NodeSpec::new(ControlType::Window)
                .name("Other")
                .process_id(7),
        );

        Self {
            tree,
            window,
            other_window,
            user,
            password,
            ok,
            cancel,
            status,
            remember,
            role,
            role_admin,
            role_guest,
            grid,
            cells,
        }
    }

    /// Engine with a short timeout so negative waits stay fast
    pub fn engine(&self) -> SearchEngine {
        let config = EngineConfig::new()
            .with_timeout_seconds(0.3)
            .with_poll_interval(Duration::from_millis(10));
        SearchEngine::new(self.tree.clone(), config)
    }
}
