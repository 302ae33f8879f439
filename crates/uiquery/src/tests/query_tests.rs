use crate::{AutomationError, EngineConfig, GridAddress, SearchQuery};

fn parse(input: &str) -> SearchQuery {
    SearchQuery::parse(input, &EngineConfig::default())
}

#[test]
fn splits_on_double_ampersand() {
    let query = parse("ControlType:Button && id:Save[row 2, column 1]");
    assert_eq!(query.len(), 2);
    assert_eq!(query.locators()[0].method(), "ControlType");
    assert_eq!(query.locators()[0].criterion(), "Button");
    assert_eq!(query.locators()[1].method(), "id");
    assert_eq!(query.locators()[1].criterion(), "Save");
    assert_eq!(query.locators()[1].grid_address(), "row 2, column 1");
    assert_eq!(
        query.grid_address().unwrap(),
        Some(GridAddress::Cell { row: 2, column: 1 })
    );
}

#[test]
fn lone_ampersand_stays_in_criterion() {
    let query = parse("Name:Save & Close");
    assert_eq!(query.len(), 1);
    assert_eq!(query.locators()[0].criterion(), "Save & Close");

    // no surrounding spaces, no split
    let query = parse("Name:a&&b");
    assert_eq!(query.len(), 1);
    assert_eq!(query.locators()[0].criterion(), "a&&b");
}

#[test]
fn absent_query_is_a_usage_error() {
    match SearchQuery::parse_optional(None, &EngineConfig::default()) {
        Err(AutomationError::InvalidArgument(_)) => {}
        other => panic!("expected InvalidArgument, got {:?}", other),
    }
    let query = SearchQuery::parse_optional(Some("OK"), &EngineConfig::default()).unwrap();
    assert_eq!(query.locators()[0].method(), "Name");
}

#[test]
fn empty_string_yields_one_empty_locator() {
    let query = parse("");
    assert_eq!(query.len(), 1);
    assert_eq!(query.locators()[0].criterion(), "");
    assert_eq!(query.locators()[0].method(), "Name");
}

#[test]
fn default_condition_type_comes_from_config() {
    let config = EngineConfig::new().with_default_condition_type("Id");
    let query = SearchQuery::parse("btnOk", &config);
    assert_eq!(query.locators()[0].method(), "Id");
}

#[test]
fn valid_process_queries() {
    assert!(parse("ProcessId:123").is_valid_process_query());
    assert!(parse("Name:Foo").is_valid_process_query());
    assert!(parse("Foo").is_valid_process_query());
    assert!(parse("Caption:Foo").is_valid_process_query());
    assert!(parse("processid:123").is_valid_process_query());
}

#[test]
fn invalid_process_queries() {
    assert!(!parse("ControlType:abc").is_valid_process_query());
    assert!(!parse("id:123").is_valid_process_query());
    assert!(!parse("ProcessId:123 && id:abc").is_valid_process_query());
    assert!(!parse("Bogus:123").is_valid_process_query());
    assert!(!SearchQuery::from_locators(Vec::new()).is_valid_process_query());
}

#[test]
fn window_query_detection() {
    assert!(parse("ControlType:Window").is_window_query());
    assert!(parse("Name:Login && controltype:window").is_window_query());
    assert!(!parse("ControlType:Button").is_window_query());
    assert!(!parse("Name:Window").is_window_query());
    // MainWindow is handled separately by the search engine
    assert!(!parse("ControlType:MainWindow").is_window_query());
    assert!(parse("ControlType:MainWindow").is_main_window_query());
    assert!(parse("ControlType:Main Window").is_main_window_query());
    assert!(!parse("ControlType:MainWindow && Name:x").is_main_window_query());
}

#[test]
fn matches_anything_only_for_blank_queries() {
    assert!(SearchQuery::from_locators(Vec::new()).matches_anything());
    assert!(parse(":").matches_anything());
    // the default method fills in, so this is a search for an empty name
    assert!(!parse("").matches_anything());
    assert!(!parse("Name:x").matches_anything());
}

#[test]
fn first_grid_address_wins() {
    let query = parse("id:grid[col 3] && Name:x[1,2]");
    assert_eq!(query.grid_address().unwrap(), Some(GridAddress::Column(3)));
    assert_eq!(parse("id:grid").grid_address().unwrap(), None);
}

#[test]
fn malformed_grid_address_fails() {
    match parse("id:grid[left side]").grid_address() {
        Err(AutomationError::InvalidGridAddress { input }) => assert_eq!(input, "left side"),
        other => panic!("expected InvalidGridAddress, got {:?}", other),
    }
}

#[test]
fn display_joins_terms() {
    let query = parse("ControlType:Edit &&  id:txtUser [r 1]");
    assert_eq!(query.to_string(), "ControlType:Edit && id:txtUser[r 1]");
    assert_eq!(parse(&query.to_string()), query);
}

#[test]
fn iterates_in_order() {
    let query = parse("a:1 && b:2 && c:3");
    let methods: Vec<&str> = (&query).into_iter().map(|l| l.method()).collect();
    assert_eq!(methods, vec!["a", "b", "c"]);
}
