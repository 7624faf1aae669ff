use rusqlite::Connection;

use crate::errors::GraphBridgeError;

/// Creates the graph workspace catalog in `main` if it is missing.
pub fn ensure_catalog(conn: &Connection) -> Result<(), GraphBridgeError> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS main.GRAPH_WORKSPACES (
            SCHEMA_NAME         TEXT NOT NULL,
            WORKSPACE_NAME      TEXT NOT NULL,
            EDGE_SCHEMA_NAME    TEXT NOT NULL,
            EDGE_TABLE_NAME     TEXT NOT NULL,
            EDGE_SOURCE_COLUMN  TEXT NOT NULL,
            EDGE_TARGET_COLUMN  TEXT NOT NULL,
            EDGE_KEY_COLUMN     TEXT NOT NULL,
            VERTEX_SCHEMA_NAME  TEXT NOT NULL,
            VERTEX_TABLE_NAME   TEXT NOT NULL,
            VERTEX_KEY_COLUMN   TEXT NOT NULL,
            PRIMARY KEY (SCHEMA_NAME, WORKSPACE_NAME)
        );
        CREATE TABLE IF NOT EXISTS main.GRAPH_WORKSPACE_COLUMNS (
            SCHEMA_NAME         TEXT NOT NULL,
            WORKSPACE_NAME      TEXT NOT NULL,
            ENTITY_TYPE         TEXT NOT NULL CHECK (ENTITY_TYPE IN ('EDGE', 'VERTEX')),
            ENTITY_ROLE         TEXT NOT NULL,
            ENTITY_SCHEMA_NAME  TEXT NOT NULL,
            ENTITY_TABLE_NAME   TEXT NOT NULL,
            ENTITY_COLUMN_NAME  TEXT NOT NULL,
            PRIMARY KEY (SCHEMA_NAME, WORKSPACE_NAME, ENTITY_TYPE, ENTITY_COLUMN_NAME)
        );
        CREATE INDEX IF NOT EXISTS main.idx_workspace_columns_owner
            ON GRAPH_WORKSPACE_COLUMNS(SCHEMA_NAME, WORKSPACE_NAME);
        "#,
    )
    .map_err(|e| GraphBridgeError::schema(e.to_string()))?;
    Ok(())
}
