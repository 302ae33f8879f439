//! Script-style flows through the public API against an in-memory tree

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;
use uiquery::{
    AutomationError, AutomationProvider, CapabilityChain, ControlType, EngineConfig, MemoryTree,
    NodeSpec, SearchEngine, SearchQuery, SetOutcome, TreeScope,
};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("debug")
        .with_test_writer()
        .try_init();
}

/// Calculator-like window: a display, a keypad and a mode selector
fn calculator() -> Result<Arc<MemoryTree>> {
    let tree = Arc::new(MemoryTree::new());
    let window = tree.add(
        tree.root(),
        NodeSpec::new(ControlType::Window)
            .name("Calculator")
            .class_name("ApplicationFrameWindow")
            .process_id(9001),
    )?;
    tree.add(
        window,
        NodeSpec::new(ControlType::Edit)
            .name("Display")
            .automation_id("display")
            .value("0"),
    )?;
    let keypad = tree.add(
        window,
        NodeSpec::new(ControlType::Group).automation_id("keypad"),
    )?;
    for digit in ["7", "8", "9"] {
        tree.add(
            keypad,
            NodeSpec::new(ControlType::Button)
                .name(digit)
                .automation_id(&format!("num{digit}Button")),
        )?;
    }
    let mode = tree.add(
        window,
        NodeSpec::new(ControlType::ComboBox)
            .automation_id("mode")
            .selection(false),
    )?;
    for (name, selected) in [("Standard", true), ("Scientific", false)] {
        tree.add(
            mode,
            NodeSpec::new(ControlType::ListItem)
                .name(name)
                .selection_item(selected),
        )?;
    }
    Ok(tree)
}

#[test]
fn test_config_file_drives_parsing() -> Result<()> {
    init_tracing();

    let mut file = tempfile::NamedTempFile::new()?;
    writeln!(
        file,
        r#"{{ "defaultConditionType": "Id", "timeoutSeconds": 0.5, "pollIntervalMs": 10 }}"#
    )?;
    let config = EngineConfig::from_json_file(file.path())?;
    assert_eq!(config.default_condition_type(), "Id");
    assert_eq!(config.timeout(), Duration::from_millis(500));

    let tree = calculator()?;
    let engine = SearchEngine::new(tree.clone(), config);
    let window = engine
        .find_window(&engine.parse("ProcessId:9001"))?
        .context("calculator window")?;
    // bare criteria now search by automation id
    let display = engine
        .find_control(window, &engine.parse("display"))?
        .context("display")?;
    let chain = CapabilityChain::new(&*tree);
    assert_eq!(chain.get_value(display)?.as_deref(), Some("0"));
    Ok(())
}

#[test]
fn test_find_then_set_and_read_back() -> Result<()> {
    init_tracing();

    let tree = calculator()?;
    let engine = SearchEngine::new(tree.clone(), EngineConfig::default());
    let window = engine
        .find_window(&engine.parse("ControlType:Window && Name:Calculator"))?
        .context("calculator window")?;

    let display = engine
        .find_control(window, &engine.parse("ControlType:Edit && id:display"))?
        .context("display")?;
    let chain = CapabilityChain::new(&*tree);
    assert_eq!(chain.set_value(display, "42")?, SetOutcome::Success);
    assert_eq!(chain.get_value(display)?.as_deref(), Some("42"));

    let mode = engine
        .find_control(window, &engine.parse("id:mode"))?
        .context("mode selector")?;
    assert_eq!(chain.get_value(mode)?.as_deref(), Some("Standard"));
    assert_eq!(chain.set_value(mode, "Scientific")?, SetOutcome::Success);
    assert_eq!(chain.get_value(mode)?.as_deref(), Some("Scientific"));
    info!("Mode switched to Scientific");
    Ok(())
}

#[test]
fn test_keypad_buttons_in_order() -> Result<()> {
    init_tracing();

    let tree = calculator()?;
    let engine = SearchEngine::new(tree.clone(), EngineConfig::default());
    let window = engine
        .find_window(&engine.parse("Calculator"))?
        .context("calculator window")?;
    let keypad = engine
        .find_control(window, &engine.parse("id:keypad"))?
        .context("keypad")?;

    let first = engine.find(keypad, TreeScope::Children, &engine.parse("ControlType:Button"))?;
    let nine = engine.find(keypad, TreeScope::Children, &engine.parse("id:num9Button"))?;
    assert!(first.is_some());
    assert!(nine.is_some());
    assert!(first < nine);
    assert_eq!(
        engine.find(keypad, TreeScope::Children, &engine.parse("Name:Display"))?,
        None
    );
    Ok(())
}

#[test]
fn test_main_window_alias_is_the_search_root() -> Result<()> {
    init_tracing();

    let tree = calculator()?;
    let engine = SearchEngine::new(tree.clone(), EngineConfig::default());
    let window = engine
        .find_window(&engine.parse("ProcessId:9001"))?
        .context("calculator window")?;
    let query = SearchQuery::parse("ControlType:MainWindow", engine.config());
    assert_eq!(engine.find_control(window, &query)?, Some(window));
    Ok(())
}

#[test]
fn test_errors_are_typed() {
    init_tracing();

    let tree = calculator().unwrap();
    let engine = SearchEngine::new(tree, EngineConfig::default());
    let root = engine.provider().root();

    let err = engine
        .find_str(root, TreeScope::Descendants, "Colour:blue")
        .unwrap_err();
    assert!(err.is_usage_error());
    assert!(err.to_string().contains("Colour"));

    let err = engine
        .find_required(root, TreeScope::Descendants, &engine.parse("id:equals"))
        .unwrap_err();
    assert!(matches!(err, AutomationError::ElementNotFound(_)));
    assert!(!err.is_usage_error());
}
