use std::sync::Arc;

use graphbridge::{
    ColumnInfo, DbObject, Endpoint, GraphBridgeError, GraphModel, GraphWorkspace, Network,
    RefreshReport, SqlType, TableKind, Value,
    assembler::assemble_graph,
    bench_utils::{GraphShape, generate_workspace, perturb_workspace},
    network::NAME_COLUMN,
    reconcile::reconcile,
    workspace::{ColumnRole, EdgeRecord, EdgeRoles, GraphRecord, GraphSide, NodeRecord},
};

fn descriptor(nodes: &[(&str, &str)], edges: &[(&str, &str, &str)]) -> GraphWorkspace {
    let mut ws = GraphWorkspace::new(DbObject::new("main", "WS"));
    let col = |table: &str, name: &str| ColumnInfo::new("main", table, name, SqlType::NVarchar);
    ws.assign_column(ColumnRole::NodeKey, col("N", "key").primary_key());
    ws.assign_column(ColumnRole::Attribute(GraphSide::Node), col("N", "label"));
    ws.assign_column(ColumnRole::EdgeKey, col("E", "key").primary_key());
    ws.assign_column(ColumnRole::EdgeSource, col("E", "src"));
    ws.assign_column(ColumnRole::EdgeTarget, col("E", "dst"));

    let key_column: Arc<str> = Arc::from("key");
    ws.set_nodes(
        nodes
            .iter()
            .map(|(key, label)| {
                let mut record = GraphRecord::new();
                record.set("key", Value::from(*key));
                record.set("label", Value::from(*label));
                NodeRecord::new(record, key_column.clone())
            })
            .collect(),
    );
    let roles = Arc::new(EdgeRoles {
        key: "key".to_string(),
        source: "src".to_string(),
        target: "dst".to_string(),
    });
    ws.set_edges(
        edges
            .iter()
            .map(|(key, src, dst)| {
                let mut record = GraphRecord::new();
                record.set("key", Value::from(*key));
                record.set("src", Value::from(*src));
                record.set("dst", Value::from(*dst));
                EdgeRecord::new(record, roles.clone())
            })
            .collect(),
    );
    ws
}

fn node_by_key(network: &Network, key: &str) -> Option<i64> {
    network.node_ids().into_iter().find(|&suid| {
        network.get(TableKind::Node, suid, "key").expect("key") == Value::from(key)
    })
}

fn edge_by_key(network: &Network, key: &str) -> Option<i64> {
    network.edge_ids().into_iter().find(|&suid| {
        network.get(TableKind::Edge, suid, "key").expect("key") == Value::from(key)
    })
}

fn label(network: &Network, suid: i64) -> Value {
    network.get(TableKind::Node, suid, "label").expect("label")
}

#[test]
fn test_refresh_applies_minimal_edits() {
    let initial = descriptor(
        &[("1", "one"), ("2", "two"), ("3", "three")],
        &[("E1", "1", "2")],
    );
    let mut network = Network::new("WS");
    assemble_graph(&mut network, &initial).expect("assemble");
    let two = node_by_key(&network, "2").expect("2");
    let three = node_by_key(&network, "3").expect("3");

    let fresh = descriptor(
        &[("2", "two*"), ("3", "three*"), ("4", "four")],
        &[("E2", "3", "4")],
    );
    let report = reconcile(&mut network, &fresh).expect("reconcile");
    assert_eq!(
        report,
        RefreshReport {
            nodes_created: 1,
            nodes_updated: 2,
            nodes_deleted: 1,
            edges_created: 1,
            edges_updated: 0,
            edges_deleted: 1,
        }
    );

    assert!(node_by_key(&network, "1").is_none());
    assert_eq!(node_by_key(&network, "2"), Some(two));
    assert_eq!(node_by_key(&network, "3"), Some(three));
    assert_eq!(label(&network, two), Value::from("two*"));
    assert_eq!(label(&network, three), Value::from("three*"));
    let four = node_by_key(&network, "4").expect("4");
    assert_eq!(label(&network, four), Value::from("four"));

    assert!(edge_by_key(&network, "E1").is_none());
    let e2 = edge_by_key(&network, "E2").expect("E2");
    assert_eq!(network.edge_endpoints(e2), Some((three, four)));
    assert_eq!(network.node_count(), 3);
    assert_eq!(network.edge_count(), 1);
}

#[test]
fn test_second_refresh_keeps_structure_and_identity() {
    let ws = descriptor(
        &[("a", "A"), ("b", "B"), ("c", "C")],
        &[("ab", "a", "b"), ("bc", "b", "c")],
    );
    let mut network = Network::new("WS");
    reconcile(&mut network, &ws).expect("first");
    let nodes = network.node_ids();
    let edges = network.edge_ids();

    let report = reconcile(&mut network, &ws).expect("second");
    assert!(report.is_structurally_unchanged(), "{report:?}");
    assert_eq!(report.nodes_updated, 3);
    assert_eq!(report.edges_updated, 2);
    assert_eq!(network.node_ids(), nodes);
    assert_eq!(network.edge_ids(), edges);
    let b = node_by_key(&network, "b").expect("b");
    assert_eq!(label(&network, b), Value::from("B"));
}

#[test]
fn test_reconcile_into_empty_graph_creates_everything() {
    let ws = descriptor(&[("a", "A"), ("b", "B")], &[("ab", "a", "b")]);
    let mut network = Network::new("WS");
    let report = reconcile(&mut network, &ws).expect("reconcile");
    assert_eq!(report.nodes_created, 2);
    assert_eq!(report.edges_created, 1);
    let edge = edge_by_key(&network, "ab").expect("ab");
    assert_eq!(
        network.get(TableKind::Edge, edge, NAME_COLUMN).expect("name"),
        Value::from("a -> b")
    );
}

#[test]
fn test_changed_endpoints_replace_the_edge() {
    let ws = descriptor(
        &[("a", "A"), ("b", "B"), ("c", "C")],
        &[("x", "a", "b")],
    );
    let mut network = Network::new("WS");
    assemble_graph(&mut network, &ws).expect("assemble");

    let moved = descriptor(
        &[("a", "A"), ("b", "B"), ("c", "C")],
        &[("x", "a", "c")],
    );
    let report = reconcile(&mut network, &moved).expect("reconcile");
    assert_eq!(report.edges_updated, 1);
    assert_eq!(report.edges_created, 0);
    assert_eq!(report.edges_deleted, 0);
    let a = node_by_key(&network, "a").expect("a");
    let c = node_by_key(&network, "c").expect("c");
    let x = edge_by_key(&network, "x").expect("x");
    assert_eq!(network.edge_endpoints(x), Some((a, c)));
    assert_eq!(network.edge_count(), 1);
}

#[test]
fn test_dangling_reference_aborts_reconciliation() {
    let ws = descriptor(&[("A", "a"), ("B", "b")], &[]);
    let mut network = Network::new("WS");
    assemble_graph(&mut network, &ws).expect("assemble");

    let fresh = descriptor(&[("A", "a"), ("B", "b")], &[("AC", "A", "C")]);
    let err = reconcile(&mut network, &fresh).expect_err("dangling");
    match err {
        GraphBridgeError::DanglingEdgeReference { endpoint, key } => {
            assert_eq!(endpoint, Endpoint::Target);
            assert_eq!(key, "C");
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert_eq!(network.edge_count(), 0);
    assert_eq!(network.node_count(), 2);
}

#[test]
fn test_host_objects_without_key_are_removed() {
    let ws = descriptor(&[("a", "A")], &[]);
    let mut network = Network::new("WS");
    assemble_graph(&mut network, &ws).expect("assemble");
    network.add_node();
    assert_eq!(network.node_count(), 2);

    let report = reconcile(&mut network, &ws).expect("reconcile");
    assert_eq!(report.nodes_deleted, 1);
    assert_eq!(network.node_count(), 1);
}

#[test]
fn test_perturbed_bench_workspace() {
    let base = generate_workspace(GraphShape::Line, 10, 7);
    let mut network = Network::new("BENCH");
    assemble_graph(&mut network, &base).expect("assemble");
    assert_eq!(network.edge_count(), 9);

    let perturbed = perturb_workspace(&base, 3, 11);
    let report = reconcile(&mut network, &perturbed).expect("reconcile");
    assert_eq!(report.nodes_deleted, 4);
    assert_eq!(report.nodes_updated, 6);
    assert_eq!(report.nodes_created, 0);
    assert_eq!(report.edges_updated, 3);
    assert_eq!(report.edges_deleted, 6);
    assert_eq!(report.edges_created, 0);
    assert_eq!(network.node_count(), 6);
    assert_eq!(network.edge_count(), 3);
}
