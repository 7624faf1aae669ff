//! Loads node and edge rows of a resolved workspace into graph records.

use tracing::{debug, info};

use crate::{
    errors::GraphBridgeError,
    executor::{QueryExecutor, QueryResult},
    metadata::{Edition, resolve_workspace},
    statements::select_projection,
    workspace::{DbObject, EdgeRecord, FieldMap, GraphRecord, GraphWorkspace, NodeRecord},
};

/// Resolves `workspace` and loads both of its tables.
pub fn load_graph_workspace<E: QueryExecutor + ?Sized>(
    exec: &mut E,
    edition: Edition,
    workspace: &DbObject,
) -> Result<GraphWorkspace, GraphBridgeError> {
    let mut descriptor = resolve_workspace(exec, edition, workspace)?;
    load_nodes(exec, &mut descriptor)?;
    load_edges(exec, &mut descriptor)?;
    info!(
        workspace = %workspace,
        nodes = descriptor.nodes().len(),
        edges = descriptor.edges().len(),
        "loaded graph workspace"
    );
    Ok(descriptor)
}

pub fn load_nodes<E: QueryExecutor + ?Sized>(
    exec: &mut E,
    workspace: &mut GraphWorkspace,
) -> Result<(), GraphBridgeError> {
    workspace.ensure_metadata_complete()?;
    let table = workspace.node_table()?.clone();
    let key_column = workspace.node_key_column()?;
    let result = fetch_table(exec, &table, &mut workspace.node_fields)?;
    let nodes = to_records(&result)
        .map(|record| NodeRecord::new(record, key_column.clone()))
        .collect();
    workspace.set_nodes(nodes);
    Ok(())
}

pub fn load_edges<E: QueryExecutor + ?Sized>(
    exec: &mut E,
    workspace: &mut GraphWorkspace,
) -> Result<(), GraphBridgeError> {
    workspace.ensure_metadata_complete()?;
    let table = workspace.edge_table()?.clone();
    let roles = workspace.edge_roles()?;
    let result = fetch_table(exec, &table, &mut workspace.edge_fields)?;
    let edges = to_records(&result)
        .map(|record| EdgeRecord::new(record, roles.clone()))
        .collect();
    workspace.set_edges(edges);
    Ok(())
}

/// Projects the declared fields and refines their types from the result set.
fn fetch_table<E: QueryExecutor + ?Sized>(
    exec: &mut E,
    table: &DbObject,
    fields: &mut FieldMap,
) -> Result<QueryResult, GraphBridgeError> {
    let sql = select_projection(table, &fields.names());
    let result = exec.execute_query(&sql, &[])?;
    for column in &result.columns {
        if fields.update_type(&column.name, column.sql_type) {
            debug!(table = %table, column = %column.name, sql_type = %column.sql_type, "observed column type");
        }
    }
    Ok(result)
}

fn to_records(result: &QueryResult) -> impl Iterator<Item = GraphRecord> + '_ {
    result.rows.iter().map(|row| {
        let mut record = GraphRecord::with_capacity(row.len());
        for (column, value) in result.columns.iter().zip(row) {
            record.set(column.name.clone(), value.clone());
        }
        record
    })
}
