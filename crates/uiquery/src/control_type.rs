//! Control-type registry: symbolic control categories and the `MainWindow` alias

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::registry::{normalize_key, NameRegistry};

/// Name of the pseudo-type that addresses the search root window itself
pub const MAIN_WINDOW: &str = "MainWindow";

macro_rules! control_types {
    ($($variant:ident),+ $(,)?) => {
        /// Provider-level control-type identifiers
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum ControlType {
            $($variant,)+
        }

        impl ControlType {
            /// Every standard control type, in declaration order
            pub const ALL: &'static [ControlType] = &[$(ControlType::$variant,)+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $(ControlType::$variant => stringify!($variant),)+
                }
            }
        }
    };
}

control_types!(
    AppBar,
    Button,
    Calendar,
    CheckBox,
    ComboBox,
    Custom,
    DataGrid,
    DataItem,
    Document,
    Edit,
    Group,
    Header,
    HeaderItem,
    Hyperlink,
    Image,
    List,
    ListItem,
    Menu,
    MenuBar,
    MenuItem,
    Pane,
    ProgressBar,
    RadioButton,
    ScrollBar,
    SemanticZoom,
    Separator,
    Slider,
    Spinner,
    SplitButton,
    StatusBar,
    Tab,
    TabItem,
    Table,
    Text,
    Thumb,
    TitleBar,
    ToolBar,
    ToolTip,
    Tree,
    TreeItem,
    Window,
);

impl std::fmt::Display for ControlType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

static CONTROL_TYPES: Lazy<NameRegistry<ControlType>> = Lazy::new(|| {
    let mut pairs: Vec<(&'static str, ControlType)> =
        ControlType::ALL.iter().map(|ct| (ct.as_str(), *ct)).collect();
    pairs.push((MAIN_WINDOW, ControlType::Window));
    NameRegistry::new("Control Type", &pairs)
});

/// The process-wide control-type table (read-only after first use)
pub fn control_types() -> &'static NameRegistry<ControlType> {
    &CONTROL_TYPES
}

/// Maps `"Button"`, `"check box"`, `"MainWindow"`... to a control type
pub fn map_control_type(name: &str) -> Result<ControlType> {
    CONTROL_TYPES.map(name)
}

/// True when `name` spells the `MainWindow` alias rather than plain `Window`
pub fn is_main_window(name: &str) -> bool {
    normalize_key(name) == normalize_key(MAIN_WINDOW)
}
