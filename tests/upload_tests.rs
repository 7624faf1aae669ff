use std::sync::Arc;

use graphbridge::{
    ColumnInfo, ConnectionConfig, ConnectionManager, DbObject, Edition, GraphWorkspace,
    ParameterMode, QueryExecutor, SqlType, Value,
    bench_utils::{BENCH_NODE_TABLE, BENCH_SCHEMA, GraphShape, generate_workspace},
    loader::load_graph_workspace,
    tasks,
    upload::{bulk_insert, count_records, create_table, upload_workspace},
    workspace::{ColumnRole, EdgeRecord, EdgeRoles, GraphRecord, GraphSide, NodeRecord},
};

fn connected() -> ConnectionManager {
    let mut manager = ConnectionManager::new();
    manager
        .connect(&ConnectionConfig::in_memory())
        .expect("connect");
    manager
}

/// Two flagged nodes joined by one edge, with boolean and integer attributes.
fn flagged_workspace(name: &str) -> GraphWorkspace {
    let node_table = format!("{name}_N");
    let edge_table = format!("{name}_E");
    let mut ws = GraphWorkspace::new(DbObject::new("main", name));
    let node = |column: &str, sql_type| ColumnInfo::new("main", node_table.as_str(), column, sql_type);
    let edge = |column: &str, sql_type| ColumnInfo::new("main", edge_table.as_str(), column, sql_type);
    ws.assign_column(ColumnRole::NodeKey, node("key", SqlType::NVarchar).primary_key());
    ws.assign_column(ColumnRole::Attribute(GraphSide::Node), node("flag", SqlType::Boolean));
    ws.assign_column(ColumnRole::Attribute(GraphSide::Node), node("rank", SqlType::Integer));
    ws.assign_column(ColumnRole::EdgeKey, edge("key", SqlType::BigInt).primary_key());
    ws.assign_column(ColumnRole::EdgeSource, edge("src", SqlType::NVarchar).not_null());
    ws.assign_column(ColumnRole::EdgeTarget, edge("dst", SqlType::NVarchar).not_null());

    let key_column: Arc<str> = Arc::from("key");
    let nodes = [("a", true, 5), ("b", false, 6)]
        .into_iter()
        .map(|(key, flag, rank)| {
            let mut record = GraphRecord::new();
            record.set("key", Value::from(key));
            record.set("flag", Value::Bool(flag));
            record.set("rank", Value::Int(rank));
            NodeRecord::new(record, key_column.clone())
        })
        .collect();
    let mut record = GraphRecord::new();
    record.set("key", Value::Long(1));
    record.set("src", Value::from("a"));
    record.set("dst", Value::from("b"));
    let roles = Arc::new(EdgeRoles {
        key: "key".to_string(),
        source: "src".to_string(),
        target: "dst".to_string(),
    });
    ws.set_nodes(nodes);
    ws.set_edges(vec![EdgeRecord::new(record, roles)]);
    ws
}

fn storage_class(manager: &mut ConnectionManager, table: &str, column: &str) -> Value {
    manager
        .handle()
        .expect("handle")
        .query_scalar(
            &format!("SELECT typeof(\"{column}\") FROM main.\"{table}\" WHERE \"key\" = 'a'"),
            &[],
        )
        .expect("typeof")
}

#[test]
fn test_bulk_upload_row_count_matches_records() {
    let mut manager = connected();
    let handle = manager.handle().expect("handle");
    let ws = generate_workspace(GraphShape::Star, 250, 3);
    let table = DbObject::new(BENCH_SCHEMA, BENCH_NODE_TABLE);
    create_table(handle, &table, &ws.node_fields).expect("create");
    let inserted = bulk_insert(
        handle,
        &table,
        &ws.node_fields,
        ws.nodes().iter().map(|n| &n.record),
        ParameterMode::Typed,
    )
    .expect("insert");
    assert_eq!(inserted, 250);
    assert_eq!(count_records(handle, &table).expect("count"), 250);
}

#[test]
fn test_text_mode_row_count_matches_records() {
    let mut manager = connected();
    let handle = manager.handle().expect("handle");
    let ws = generate_workspace(GraphShape::RandomErdosRenyi { edges: 40 }, 20, 9);
    let summary = upload_workspace(handle, &ws, ParameterMode::Text).expect("upload");
    assert_eq!(summary.nodes, 20);
    assert_eq!(summary.edges, 40);
    let edges = ws.edge_table().expect("edge table").clone();
    assert_eq!(count_records(handle, &edges).expect("count"), 40);
}

#[test]
fn test_empty_table_counts_zero() {
    let mut manager = connected();
    let handle = manager.handle().expect("handle");
    let ws = generate_workspace(GraphShape::Line, 2, 1);
    let table = DbObject::new(BENCH_SCHEMA, BENCH_NODE_TABLE);
    create_table(handle, &table, &ws.node_fields).expect("create");
    let none: Vec<&GraphRecord> = Vec::new();
    assert_eq!(
        bulk_insert(handle, &table, &ws.node_fields, none, ParameterMode::Typed).expect("insert"),
        0
    );
    assert_eq!(count_records(handle, &table).expect("count"), 0);
}

#[test]
fn test_typed_mode_binds_native_values() {
    let mut manager = connected();
    let ws = flagged_workspace("TYPED");
    upload_workspace(manager.handle().expect("handle"), &ws, ParameterMode::Typed)
        .expect("upload");
    assert_eq!(
        storage_class(&mut manager, "TYPED_N", "flag"),
        Value::from("integer")
    );
    assert_eq!(
        storage_class(&mut manager, "TYPED_N", "rank"),
        Value::from("integer")
    );
}

#[test]
fn test_text_mode_relies_on_column_coercion() {
    let mut manager = connected();
    let ws = flagged_workspace("TEXT");
    upload_workspace(manager.handle().expect("handle"), &ws, ParameterMode::Text)
        .expect("upload");
    assert_eq!(
        storage_class(&mut manager, "TEXT_N", "flag"),
        Value::from("text")
    );
    assert_eq!(
        storage_class(&mut manager, "TEXT_N", "rank"),
        Value::from("integer")
    );
}

#[test]
fn test_both_modes_read_back_as_booleans() {
    for (name, mode) in [("TYPED", ParameterMode::Typed), ("TEXT", ParameterMode::Text)] {
        let mut manager = connected();
        let ws = flagged_workspace(name);
        let handle = manager.handle().expect("handle");
        upload_workspace(handle, &ws, mode).expect("upload");
        let loaded = load_graph_workspace(handle, Edition::OnPremise, &ws.workspace).expect("load");
        let a = loaded
            .nodes()
            .iter()
            .find(|n| n.key().as_deref() == Some("a"))
            .expect("a");
        assert_eq!(a.record.get("flag"), &Value::Bool(true), "{mode:?}");
        assert_eq!(a.record.get("rank"), &Value::Int(5), "{mode:?}");
        assert_eq!(loaded.edges().len(), 1);
    }
}

#[test]
fn test_uploaded_workspace_is_registered() {
    let mut manager = connected();
    let ws = flagged_workspace("REG");
    upload_workspace(manager.handle().expect("handle"), &ws, ParameterMode::Typed)
        .expect("upload");
    assert_eq!(
        tasks::list_workspaces(&mut manager).expect("list"),
        vec![DbObject::new("main", "REG")]
    );

    let handle = manager.handle().expect("handle");
    for edition in [Edition::OnPremise, Edition::Cloud] {
        let loaded = load_graph_workspace(handle, edition, &ws.workspace).expect("load");
        assert_eq!(loaded.node_key.as_deref(), Some("key"));
        assert_eq!(loaded.edge_source.as_deref(), Some("src"));
        assert_eq!(loaded.edge_target.as_deref(), Some("dst"));
        assert_eq!(loaded.node_fields.names(), vec!["key", "flag", "rank"]);
        assert_eq!(loaded.nodes().len(), 2);
    }
}

#[test]
fn test_duplicate_table_fails_upload() {
    let mut manager = connected();
    let ws = flagged_workspace("DUP");
    let handle = manager.handle().expect("handle");
    upload_workspace(handle, &ws, ParameterMode::Typed).expect("first");
    assert!(matches!(
        upload_workspace(handle, &ws, ParameterMode::Typed),
        Err(graphbridge::GraphBridgeError::QueryError { .. })
    ));
}
