//! Table creation, bulk insertion and workspace registration.

use tracing::info;

use crate::{
    config::ParameterMode,
    errors::GraphBridgeError,
    executor::{QueryExecutor, SqlParameter},
    statements,
    value::Value,
    workspace::{DbObject, FieldMap, GraphRecord, GraphWorkspace},
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UploadSummary {
    pub nodes: usize,
    pub edges: usize,
}

pub fn create_table<E: QueryExecutor + ?Sized>(
    exec: &mut E,
    table: &DbObject,
    fields: &FieldMap,
) -> Result<(), GraphBridgeError> {
    exec.execute(&statements::create_table(table, fields))
}

/// Inserts one row per record in a single batch. Returns the affected row count.
pub fn bulk_insert<'a, E, I>(
    exec: &mut E,
    table: &DbObject,
    fields: &FieldMap,
    records: I,
    mode: ParameterMode,
) -> Result<usize, GraphBridgeError>
where
    E: QueryExecutor + ?Sized,
    I: IntoIterator<Item = &'a GraphRecord>,
{
    let sql = statements::insert_into(table, &fields.names());
    let mut parameter_sets = Vec::new();
    for record in records {
        let mut params = Vec::with_capacity(fields.len());
        for field in fields.iter() {
            let value = record.get(&field.name);
            let param = match mode {
                ParameterMode::Typed => {
                    SqlParameter::new(value.cast_to(field.scalar_type())?, field.sql_type)
                }
                ParameterMode::Text => SqlParameter::text(value.clone()),
            };
            params.push(param);
        }
        parameter_sets.push(params);
    }
    exec.execute_batch(&sql, &parameter_sets)
}

pub fn count_records<E: QueryExecutor + ?Sized>(
    exec: &mut E,
    table: &DbObject,
) -> Result<i64, GraphBridgeError> {
    match exec.query_scalar(&statements::count_records(table), &[])? {
        Value::Long(n) => Ok(n),
        Value::Int(n) => Ok(i64::from(n)),
        other => Err(GraphBridgeError::type_mismatch(other.to_string(), "row count")),
    }
}

pub fn create_graph_workspace<E: QueryExecutor + ?Sized>(
    exec: &mut E,
    workspace: &GraphWorkspace,
) -> Result<(), GraphBridgeError> {
    exec.execute(&statements::create_graph_workspace(workspace)?)
}

/// Creates and fills both tables, then registers the workspace.
pub fn upload_workspace<E: QueryExecutor + ?Sized>(
    exec: &mut E,
    workspace: &GraphWorkspace,
    mode: ParameterMode,
) -> Result<UploadSummary, GraphBridgeError> {
    workspace.ensure_metadata_complete()?;
    let node_table = workspace.node_table()?;
    let edge_table = workspace.edge_table()?;

    create_table(exec, node_table, &workspace.node_fields)?;
    let nodes = bulk_insert(
        exec,
        node_table,
        &workspace.node_fields,
        workspace.nodes().iter().map(|n| &n.record),
        mode,
    )?;
    create_table(exec, edge_table, &workspace.edge_fields)?;
    let edges = bulk_insert(
        exec,
        edge_table,
        &workspace.edge_fields,
        workspace.edges().iter().map(|e| &e.record),
        mode,
    )?;
    create_graph_workspace(exec, workspace)?;

    info!(workspace = %workspace.workspace, nodes, edges, ?mode, "uploaded workspace");
    Ok(UploadSummary { nodes, edges })
}
