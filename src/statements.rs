//! SQL text used against the relational target.
//!
//! Identifiers are always double-quoted so mixed-case workspace and column
//! names survive unchanged. Catalog statements address the `main` schema,
//! where the graph workspace catalog lives.

use crate::{
    errors::GraphBridgeError,
    workspace::{DbObject, FieldMap, GraphWorkspace},
};

pub const GET_BUILD: &str = "SELECT 'sqlite/' || sqlite_version()";

pub const CURRENT_SCHEMA: &str = "SELECT name FROM pragma_database_list WHERE seq = 0";

pub const SCHEMA_EXISTS: &str = "SELECT COUNT(*) FROM pragma_database_list WHERE name = ?1";

pub const LIST_GRAPH_WORKSPACES: &str = "SELECT SCHEMA_NAME, WORKSPACE_NAME \
     FROM main.GRAPH_WORKSPACES ORDER BY SCHEMA_NAME, WORKSPACE_NAME";

pub const LIVENESS_PROBE: &str = "SELECT 1";

/// Column roles as recorded in the workspace catalog.
pub const LOAD_WORKSPACE_METADATA_ONPREM: &str = "SELECT ENTITY_TYPE, ENTITY_ROLE, \
     ENTITY_SCHEMA_NAME, ENTITY_TABLE_NAME, ENTITY_COLUMN_NAME \
     FROM main.GRAPH_WORKSPACE_COLUMNS \
     WHERE SCHEMA_NAME = ?1 AND WORKSPACE_NAME = ?2 \
     ORDER BY rowid";

/// Column roles derived from the workspace definition and the live table layout.
pub const LOAD_WORKSPACE_METADATA_CLOUD: &str = "SELECT 'VERTEX', \
     CASE c.name WHEN w.VERTEX_KEY_COLUMN THEN 'KEY' ELSE 'ATTRIBUTE' END, \
     w.VERTEX_SCHEMA_NAME, w.VERTEX_TABLE_NAME, c.name \
     FROM main.GRAPH_WORKSPACES AS w, \
     pragma_table_info(w.VERTEX_TABLE_NAME, w.VERTEX_SCHEMA_NAME) AS c \
     WHERE w.SCHEMA_NAME = ?1 AND w.WORKSPACE_NAME = ?2 \
     UNION ALL \
     SELECT 'EDGE', \
     CASE c.name WHEN w.EDGE_KEY_COLUMN THEN 'KEY' \
     WHEN w.EDGE_SOURCE_COLUMN THEN 'SOURCE' \
     WHEN w.EDGE_TARGET_COLUMN THEN 'TARGET' ELSE 'ATTRIBUTE' END, \
     w.EDGE_SCHEMA_NAME, w.EDGE_TABLE_NAME, c.name \
     FROM main.GRAPH_WORKSPACES AS w, \
     pragma_table_info(w.EDGE_TABLE_NAME, w.EDGE_SCHEMA_NAME) AS c \
     WHERE w.SCHEMA_NAME = ?1 AND w.WORKSPACE_NAME = ?2";

pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

pub fn quote_literal(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

pub fn select_projection(table: &DbObject, columns: &[&str]) -> String {
    let projection = columns
        .iter()
        .map(|c| quote_identifier(c))
        .collect::<Vec<_>>()
        .join(", ");
    format!("SELECT {projection} FROM {}", table.qualified())
}

/// `CREATE TABLE` with one `"name" TYPE` entry per field.
pub fn create_table(table: &DbObject, fields: &FieldMap) -> String {
    let columns = fields
        .iter()
        .map(|column| {
            let mut def = format!("{} {}", quote_identifier(&column.name), column.ddl());
            if column.primary_key {
                def.push_str(" PRIMARY KEY");
            } else if column.not_null {
                def.push_str(" NOT NULL");
            }
            def
        })
        .collect::<Vec<_>>()
        .join(", ");
    format!("CREATE TABLE {} ({columns})", table.qualified())
}

pub fn insert_into(table: &DbObject, columns: &[&str]) -> String {
    let names = columns
        .iter()
        .map(|c| quote_identifier(c))
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = vec!["?"; columns.len()].join(", ");
    format!(
        "INSERT INTO {} ({names}) VALUES ({placeholders})",
        table.qualified()
    )
}

pub fn count_records(table: &DbObject) -> String {
    format!("SELECT COUNT(*) FROM {}", table.qualified())
}

pub fn attach_schema(file: &str, schema: &str) -> String {
    format!(
        "ATTACH DATABASE {} AS {}",
        quote_literal(file),
        quote_identifier(schema)
    )
}

/// Registers a workspace and its column roles in the catalog.
///
/// Column rows are read from the live node and edge tables, so both tables
/// must exist before this runs.
pub fn create_graph_workspace(workspace: &GraphWorkspace) -> Result<String, GraphBridgeError> {
    workspace.ensure_metadata_complete()?;
    let ws = &workspace.workspace;
    let nodes = workspace.node_table()?;
    let edges = workspace.edge_table()?;
    let roles = workspace.edge_roles()?;
    let node_key = workspace.node_key_column()?;

    let lit = |text: &str| quote_literal(text);
    Ok(format!(
        "INSERT INTO main.GRAPH_WORKSPACES (SCHEMA_NAME, WORKSPACE_NAME, \
         EDGE_SCHEMA_NAME, EDGE_TABLE_NAME, EDGE_SOURCE_COLUMN, EDGE_TARGET_COLUMN, \
         EDGE_KEY_COLUMN, VERTEX_SCHEMA_NAME, VERTEX_TABLE_NAME, VERTEX_KEY_COLUMN) \
         VALUES ({ws_schema}, {ws_name}, {edge_schema}, {edge_table}, {source}, {target}, \
         {edge_key}, {node_schema}, {node_table}, {node_key});\n\
         INSERT INTO main.GRAPH_WORKSPACE_COLUMNS (SCHEMA_NAME, WORKSPACE_NAME, ENTITY_TYPE, \
         ENTITY_ROLE, ENTITY_SCHEMA_NAME, ENTITY_TABLE_NAME, ENTITY_COLUMN_NAME) \
         SELECT {ws_schema}, {ws_name}, 'VERTEX', \
         CASE name WHEN {node_key} THEN 'KEY' ELSE 'ATTRIBUTE' END, \
         {node_schema}, {node_table}, name \
         FROM pragma_table_info({node_table}, {node_schema}) ORDER BY cid;\n\
         INSERT INTO main.GRAPH_WORKSPACE_COLUMNS (SCHEMA_NAME, WORKSPACE_NAME, ENTITY_TYPE, \
         ENTITY_ROLE, ENTITY_SCHEMA_NAME, ENTITY_TABLE_NAME, ENTITY_COLUMN_NAME) \
         SELECT {ws_schema}, {ws_name}, 'EDGE', \
         CASE name WHEN {edge_key} THEN 'KEY' WHEN {source} THEN 'SOURCE' \
         WHEN {target} THEN 'TARGET' ELSE 'ATTRIBUTE' END, \
         {edge_schema}, {edge_table}, name \
         FROM pragma_table_info({edge_table}, {edge_schema}) ORDER BY cid;",
        ws_schema = lit(&ws.schema),
        ws_name = lit(&ws.name),
        edge_schema = lit(&edges.schema),
        edge_table = lit(&edges.name),
        source = lit(&roles.source),
        target = lit(&roles.target),
        edge_key = lit(&roles.key),
        node_schema = lit(&nodes.schema),
        node_table = lit(&nodes.name),
        node_key = lit(&node_key),
    ))
}
