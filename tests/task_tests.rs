mod common;

use common::{exec, social, social_manager};
use graphbridge::{
    ConnectionConfig, ConnectionManager, DbObject, GraphBridgeError, GraphModel, Network,
    ParameterMode, TableKind, Value,
    link::{is_linked_to, read_link},
    monitor::{MessageLevel, RecordingMonitor},
    network::NAME_COLUMN,
    tasks::{self, CreateWorkspaceRequest},
};

fn node_named(network: &Network, name: &str) -> Option<i64> {
    network.node_ids().into_iter().find(|&suid| {
        network.get(TableKind::Node, suid, NAME_COLUMN).expect("name") == Value::from(name)
    })
}

fn request(schema: &str, name: &str, create_schema: bool) -> CreateWorkspaceRequest {
    CreateWorkspaceRequest {
        workspace: DbObject::new(schema, name),
        node_table: format!("{name}_NODES"),
        edge_table: format!("{name}_EDGES"),
        create_schema,
    }
}

#[test]
fn test_connect_reports_progress() {
    let mut manager = ConnectionManager::new();
    let mut monitor = RecordingMonitor::new();
    tasks::connect(&mut manager, &ConnectionConfig::in_memory(), &mut monitor).expect("connect");
    assert_eq!(monitor.title.as_deref(), Some("Connect to database"));
    assert_eq!(monitor.last_progress(), Some(1.0));
    assert!(monitor.has_message(MessageLevel::Info));
    assert!(!monitor.has_message(MessageLevel::Error));
}

#[test]
fn test_failed_connect_reports_error_and_stops_progress() {
    let mut manager = ConnectionManager::new();
    let mut monitor = RecordingMonitor::new();
    let mut config = ConnectionConfig::in_memory();
    config.advanced_properties = Some("broken".to_string());
    let err = tasks::connect(&mut manager, &config, &mut monitor).expect_err("bad option");
    assert!(matches!(err, GraphBridgeError::InvalidAdvancedOption(_)));
    assert!(monitor.has_message(MessageLevel::Error));
    assert_eq!(monitor.last_progress(), Some(0.0));
    assert!(!manager.is_connected());
}

#[test]
fn test_load_requires_connection() {
    let mut manager = ConnectionManager::new();
    let mut monitor = RecordingMonitor::new();
    let err = tasks::load_workspace(&mut manager, &social(), &mut monitor).expect_err("offline");
    assert!(matches!(err, GraphBridgeError::ConnectionError(_)));
    assert!(monitor.has_message(MessageLevel::Error));
}

#[test]
fn test_load_links_network_to_workspace() {
    let mut manager = social_manager();
    let mut monitor = RecordingMonitor::new();
    let network = tasks::load_workspace(&mut manager, &social(), &mut monitor).expect("load");
    assert_eq!(network.name(), "SOCIAL");
    assert_eq!(network.node_count(), 3);
    assert_eq!(network.edge_count(), 2);
    assert_eq!(monitor.last_progress(), Some(1.0));

    let link = read_link(&network).expect("linked");
    assert_eq!(link.workspace, social());
    assert_eq!(Some(link.instance.as_str()), manager.instance_identifier());
    assert!(tasks::refreshable(&manager, &network));
}

#[test]
fn test_refresh_picks_up_upstream_changes() {
    let mut manager = social_manager();
    let mut monitor = RecordingMonitor::new();
    let mut network = tasks::load_workspace(&mut manager, &social(), &mut monitor).expect("load");
    let bob = node_named(&network, "bob").expect("bob");

    exec(
        &mut manager,
        "DELETE FROM main.KNOWS WHERE SRC = 'alice' OR DST = 'alice';\
         DELETE FROM main.PEOPLE WHERE ID = 'alice';\
         UPDATE main.PEOPLE SET AGE = 42 WHERE ID = 'bob';\
         INSERT INTO main.PEOPLE VALUES ('dave', 19, NULL, 1);\
         INSERT INTO main.KNOWS VALUES ('k3', 'carol', 'dave', 2024);",
    );
    let report =
        tasks::refresh_network(&mut manager, &mut network, &mut monitor).expect("refresh");
    assert_eq!(report.nodes_created, 1);
    assert_eq!(report.nodes_updated, 2);
    assert_eq!(report.nodes_deleted, 1);
    assert_eq!(report.edges_created, 1);
    assert_eq!(report.edges_updated, 1);
    assert_eq!(report.edges_deleted, 1);

    assert!(node_named(&network, "alice").is_none());
    assert_eq!(node_named(&network, "bob"), Some(bob));
    assert_eq!(
        network.get(TableKind::Node, bob, "AGE").expect("age"),
        Value::Int(42)
    );
    assert!(node_named(&network, "dave").is_some());
    assert_eq!(network.edge_count(), 2);

    let again = tasks::refresh_network(&mut manager, &mut network, &mut monitor).expect("again");
    assert!(again.is_structurally_unchanged());
}

#[test]
fn test_refresh_rejects_unlinked_network() {
    let mut manager = social_manager();
    let mut monitor = RecordingMonitor::new();
    let mut network = Network::new("loose");
    let err = tasks::refresh_network(&mut manager, &mut network, &mut monitor)
        .expect_err("unlinked");
    assert!(matches!(err, GraphBridgeError::InvalidInput(_)));
    assert!(monitor.has_message(MessageLevel::Error));
}

#[test]
fn test_refresh_rejects_other_instance() {
    let mut manager = social_manager();
    let mut monitor = RecordingMonitor::new();
    let mut network = tasks::load_workspace(&mut manager, &social(), &mut monitor).expect("load");

    manager
        .connect(&ConnectionConfig::in_memory())
        .expect("reconnect");
    assert!(!tasks::refreshable(&manager, &network));
    let err = tasks::refresh_network(&mut manager, &mut network, &mut monitor)
        .expect_err("other instance");
    assert!(matches!(err, GraphBridgeError::ConnectionError(_)));
    assert_eq!(network.node_count(), 3);
}

#[test]
fn test_create_requires_existing_schema_unless_asked() {
    let mut manager = social_manager();
    let mut monitor = RecordingMonitor::new();
    let mut network = tasks::load_workspace(&mut manager, &social(), &mut monitor).expect("load");

    let err = tasks::create_workspace(
        &mut manager,
        &mut network,
        &request("archive", "COPY", false),
        ParameterMode::Typed,
        &mut monitor,
    )
    .expect_err("missing schema");
    assert!(matches!(err, GraphBridgeError::NotFound(_)));
    assert!(!tasks::schema_exists(&mut manager, "archive").expect("exists"));
}

#[test]
fn test_create_then_load_round_trip() {
    let mut manager = social_manager();
    let mut monitor = RecordingMonitor::new();
    let mut network = tasks::load_workspace(&mut manager, &social(), &mut monitor).expect("load");

    let summary = tasks::create_workspace(
        &mut manager,
        &mut network,
        &request("archive", "COPY", true),
        ParameterMode::Typed,
        &mut monitor,
    )
    .expect("create");
    assert_eq!(summary.nodes, 3);
    assert_eq!(summary.edges, 2);
    assert!(tasks::schema_exists(&mut manager, "archive").expect("exists"));

    let link = read_link(&network).expect("relinked");
    assert_eq!(link.workspace, DbObject::new("archive", "COPY"));

    let workspaces = tasks::list_workspaces(&mut manager).expect("list");
    assert!(workspaces.contains(&DbObject::new("archive", "COPY")));
    assert!(workspaces.contains(&social()));

    let copy = tasks::load_workspace(&mut manager, &DbObject::new("archive", "COPY"), &mut monitor)
        .expect("load copy");
    assert_eq!(copy.node_count(), 3);
    assert_eq!(copy.edge_count(), 2);
    let instance = manager.instance_identifier().expect("instance").to_string();
    assert!(is_linked_to(&copy, &instance));
    let alice = node_named(&copy, "alice").expect("alice");
    assert_eq!(
        copy.get(TableKind::Node, alice, "AGE").expect("age"),
        Value::Int(30)
    );
}

#[test]
fn test_schema_helpers() {
    let mut manager = social_manager();
    assert_eq!(tasks::current_schema(&mut manager).expect("schema"), "main");
    tasks::create_schema(&mut manager, "staging").expect("create");
    assert!(tasks::schema_exists(&mut manager, "staging").expect("exists"));
}

#[test]
fn test_load_widens_integer_column_holding_64_bit_values() {
    let mut manager = social_manager();
    exec(
        &mut manager,
        "UPDATE main.PEOPLE SET AGE = 3000000000 WHERE ID = 'alice'",
    );
    let mut monitor = RecordingMonitor::new();
    let network = tasks::load_workspace(&mut manager, &social(), &mut monitor).expect("load");
    let alice = node_named(&network, "alice").expect("alice");
    let bob = node_named(&network, "bob").expect("bob");
    assert_eq!(
        network.get(TableKind::Node, alice, "AGE").expect("age"),
        Value::Long(3_000_000_000)
    );
    assert_eq!(
        network.get(TableKind::Node, bob, "AGE").expect("age"),
        Value::Long(41)
    );
}
