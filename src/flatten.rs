//! Flattens a host graph into a workspace descriptor plus row records for upload.

use tracing::info;

use crate::{
    errors::GraphBridgeError,
    network::{GraphModel, HostColumn, SUID_COLUMN, Suid, TableKind},
    types::SqlType,
    value::Value,
    workspace::{
        ColumnInfo, ColumnRole, DbObject, EdgeRecord, GraphRecord, GraphSide, GraphWorkspace,
        NodeRecord,
    },
};

pub const SOURCE_SUID_COLUMN: &str = "GRAPH_SOURCE_SUID";
pub const TARGET_SUID_COLUMN: &str = "GRAPH_TARGET_SUID";

/// Describes `graph` as a workspace stored in `node_table` and `edge_table`.
///
/// The key of each table is its first primary-key column, or `SUID` when the
/// host exposes none. Edge tables always gain two not-null endpoint columns
/// holding the SUIDs of the source and target nodes.
pub fn flatten_network<G: GraphModel + ?Sized>(
    graph: &G,
    workspace: DbObject,
    node_table: DbObject,
    edge_table: DbObject,
) -> Result<GraphWorkspace, GraphBridgeError> {
    let mut descriptor = GraphWorkspace::new(workspace);

    let node_columns = graph.columns(TableKind::Node);
    let node_key = describe_table(
        &mut descriptor,
        GraphSide::Node,
        &node_table,
        &node_columns,
    )?;
    let edge_columns = graph.columns(TableKind::Edge);
    let edge_key = describe_table(
        &mut descriptor,
        GraphSide::Edge,
        &edge_table,
        &edge_columns,
    )?;
    for (role, name) in [
        (ColumnRole::EdgeSource, SOURCE_SUID_COLUMN),
        (ColumnRole::EdgeTarget, TARGET_SUID_COLUMN),
    ] {
        descriptor.assign_column(
            role,
            ColumnInfo::new(&edge_table.schema, &edge_table.name, name, SqlType::BigInt).not_null(),
        );
    }
    descriptor.ensure_metadata_complete()?;

    let key_column = descriptor.node_key_column()?;
    let mut nodes = Vec::new();
    for suid in graph.node_ids() {
        let record = copy_row(graph, TableKind::Node, suid, &node_columns, &node_key)?;
        nodes.push(NodeRecord::new(record, key_column.clone()));
    }

    let roles = descriptor.edge_roles()?;
    let mut edges = Vec::new();
    for suid in graph.edge_ids() {
        let (source, target) = graph
            .edge_endpoints(suid)
            .ok_or_else(|| GraphBridgeError::not_found(format!("edge {suid}")))?;
        let mut record = copy_row(graph, TableKind::Edge, suid, &edge_columns, &edge_key)?;
        record.set(SOURCE_SUID_COLUMN, Value::Long(source));
        record.set(TARGET_SUID_COLUMN, Value::Long(target));
        edges.push(EdgeRecord::new(record, roles.clone()));
    }

    info!(
        workspace = %descriptor.workspace,
        nodes = nodes.len(),
        edges = edges.len(),
        "flattened network"
    );
    descriptor.set_nodes(nodes);
    descriptor.set_edges(edges);
    Ok(descriptor)
}

/// Registers every host column of one table and returns the key column name.
fn describe_table(
    descriptor: &mut GraphWorkspace,
    side: GraphSide,
    table: &DbObject,
    columns: &[HostColumn],
) -> Result<String, GraphBridgeError> {
    let key = columns
        .iter()
        .find(|c| c.primary_key)
        .map(|c| c.name.clone())
        .unwrap_or_else(|| SUID_COLUMN.to_string());
    let key_role = match side {
        GraphSide::Node => ColumnRole::NodeKey,
        GraphSide::Edge => ColumnRole::EdgeKey,
    };
    if !columns.iter().any(|c| c.name == key) {
        descriptor.assign_column(
            key_role,
            ColumnInfo::new(&table.schema, &table.name, &key, SqlType::BigInt).primary_key(),
        );
    }
    for column in columns {
        let sql_type = SqlType::from_host(column.host_type).map_err(|e| {
            GraphBridgeError::unsupported_type(format!("column {}: {e}", column.name))
        })?;
        let mut info = ColumnInfo::new(&table.schema, &table.name, &column.name, sql_type);
        let role = if column.name == key {
            info = info.primary_key();
            key_role
        } else {
            ColumnRole::Attribute(side)
        };
        descriptor.assign_column(role, info);
    }
    Ok(key)
}

fn copy_row<G: GraphModel + ?Sized>(
    graph: &G,
    table: TableKind,
    row: Suid,
    columns: &[HostColumn],
    key: &str,
) -> Result<GraphRecord, GraphBridgeError> {
    let mut record = GraphRecord::with_capacity(columns.len() + 2);
    for column in columns {
        record.set(column.name.clone(), graph.get(table, row, &column.name)?);
    }
    if !columns.iter().any(|c| c.name == key) {
        record.set(key, Value::Long(row));
    }
    Ok(record)
}
