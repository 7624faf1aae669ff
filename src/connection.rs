//! SQLite-backed query executor and the manager that owns its lifecycle.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use rusqlite::{
    Connection, params_from_iter,
    types::{Value as SqlValue, ValueRef},
};
use tracing::{debug, error, info, warn};

use crate::{
    catalog::ensure_catalog,
    config::{ConnectionConfig, EditionSetting, parse_advanced_properties},
    errors::GraphBridgeError,
    executor::{QueryExecutor, QueryResult, SqlParameter},
    metadata::Edition,
    statements::{CURRENT_SCHEMA, GET_BUILD, LIVENESS_PROBE, SCHEMA_EXISTS, attach_schema},
    types::SqlType,
    value::{Value, storage_sql_type},
    workspace::ColumnInfo,
};

/// One open database plus the facts probed when it was opened.
pub struct SqliteConnection {
    conn: Connection,
    location: Option<PathBuf>,
    instance: String,
    build: Option<String>,
    edition: Edition,
}

impl SqliteConnection {
    pub fn open(config: &ConnectionConfig) -> Result<Self, GraphBridgeError> {
        let props = parse_advanced_properties(config.advanced_properties.as_deref())?;
        let (conn, location) = if config.is_memory() {
            let conn = Connection::open_in_memory()
                .map_err(|e| GraphBridgeError::connection(e.to_string()))?;
            (conn, None)
        } else {
            let path = PathBuf::from(&config.database);
            let conn =
                Connection::open(&path).map_err(|e| GraphBridgeError::connection(e.to_string()))?;
            (conn, Some(path))
        };
        conn.busy_timeout(Duration::from_millis(config.probe_timeout_ms))
            .map_err(|e| GraphBridgeError::connection(e.to_string()))?;

        let alive = conn
            .query_row(LIVENESS_PROBE, [], |row| row.get::<_, i64>(0))
            .map(|v| v == 1)
            .map_err(|e| GraphBridgeError::connection(format!("liveness probe failed: {e}")))?;
        let build = if alive {
            match conn.query_row(GET_BUILD, [], |row| row.get::<_, Option<String>>(0)) {
                Ok(build) => build,
                Err(err) => {
                    warn!(error = %err, "build probe failed");
                    None
                }
            }
        } else {
            None
        };
        let edition = match config.edition {
            EditionSetting::Auto => Edition::from_build(build.as_deref()),
            EditionSetting::Cloud => Edition::Cloud,
            EditionSetting::OnPremise => Edition::OnPremise,
        };

        for (key, value) in &props {
            conn.pragma_update(None, key, value).map_err(|e| {
                GraphBridgeError::invalid_advanced_option(format!("{key}={value}: {e}"))
            })?;
        }
        for (schema, file) in &config.schemas {
            conn.execute_batch(&attach_schema(file, schema))
                .map_err(|e| GraphBridgeError::connection(format!("attach {schema}: {e}")))?;
        }
        ensure_catalog(&conn)?;

        let instance = match &location {
            Some(path) => instance_for_path(path),
            None => format!("sqlite::memory:{:016x}", rand::random::<u64>()),
        };
        info!(instance = %instance, build = ?build, ?edition, "connected");
        Ok(Self {
            conn,
            location,
            instance,
            build,
            edition,
        })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn instance_identifier(&self) -> &str {
        &self.instance
    }

    pub fn build(&self) -> Option<&str> {
        self.build.as_deref()
    }

    pub fn edition(&self) -> Edition {
        self.edition
    }

    pub fn current_schema(&mut self) -> Result<String, GraphBridgeError> {
        Ok(self
            .query_scalar(CURRENT_SCHEMA, &[])?
            .key_string()
            .unwrap_or_else(|| "main".to_string()))
    }

    pub fn schema_exists(&mut self, schema: &str) -> Result<bool, GraphBridgeError> {
        let count = self.query_scalar(SCHEMA_EXISTS, &[SqlParameter::text(schema)])?;
        Ok(matches!(count, Value::Long(n) if n > 0))
    }

    /// Attaches a new schema, stored next to the main database file when there is one.
    pub fn create_schema(&mut self, schema: &str) -> Result<(), GraphBridgeError> {
        let file = match &self.location {
            Some(path) => path
                .with_file_name(format!("{schema}.db"))
                .display()
                .to_string(),
            None => ":memory:".to_string(),
        };
        self.execute(&attach_schema(&file, schema))
    }
}

fn instance_for_path(path: &Path) -> String {
    let resolved = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    format!("sqlite:{}", resolved.display())
}

fn run_query(
    conn: &Connection,
    sql: &str,
    params: &[SqlParameter],
) -> Result<QueryResult, GraphBridgeError> {
    let mut stmt = conn
        .prepare(sql)
        .map_err(|e| GraphBridgeError::query(sql, e))?;
    let declared: Vec<(String, Option<SqlType>)> = stmt
        .columns()
        .iter()
        .map(|c| {
            let sql_type = c
                .decl_type()
                .map(SqlType::from_declared)
                .filter(|t| *t != SqlType::Other);
            (c.name().to_string(), sql_type)
        })
        .collect();
    let mut observed: Vec<Option<SqlType>> = declared.iter().map(|(_, t)| *t).collect();

    let mut raw_rows: Vec<Vec<SqlValue>> = Vec::new();
    let mut rows = stmt
        .query(params_from_iter(params.iter()))
        .map_err(|e| GraphBridgeError::query(sql, e))?;
    while let Some(row) = rows.next().map_err(|e| GraphBridgeError::query(sql, e))? {
        let mut raw = Vec::with_capacity(observed.len());
        for (idx, slot) in observed.iter_mut().enumerate() {
            let cell = row
                .get_ref(idx)
                .map_err(|e| GraphBridgeError::query(sql, e))?;
            match (*slot, cell) {
                (None, ValueRef::Null) => {}
                (None, _) => *slot = Some(storage_sql_type(cell)),
                // INTEGER affinity stores 64-bit values.
                (Some(SqlType::Integer), ValueRef::Integer(i)) if i32::try_from(i).is_err() => {
                    *slot = Some(SqlType::BigInt);
                }
                _ => {}
            }
            raw.push(SqlValue::from(cell));
        }
        raw_rows.push(raw);
    }

    let columns: Vec<ColumnInfo> = declared
        .into_iter()
        .zip(observed)
        .map(|((name, _), sql_type)| {
            ColumnInfo::new("", "", name, sql_type.unwrap_or(SqlType::Other))
        })
        .collect();
    let rows = raw_rows
        .iter()
        .map(|raw| {
            raw.iter()
                .zip(&columns)
                .map(|(cell, column)| Value::from_sql(cell.into(), column.sql_type))
                .collect()
        })
        .collect();
    Ok(QueryResult { columns, rows })
}

impl QueryExecutor for SqliteConnection {
    fn execute_query(
        &mut self,
        sql: &str,
        params: &[SqlParameter],
    ) -> Result<QueryResult, GraphBridgeError> {
        debug!(statement = sql, params = params.len(), "executing query");
        run_query(&self.conn, sql, params).inspect_err(|err| {
            error!(statement = sql, error = %err, "query failed");
        })
    }

    fn execute(&mut self, sql: &str) -> Result<(), GraphBridgeError> {
        debug!(statement = sql, "executing statement");
        self.conn
            .execute_batch(sql)
            .map_err(|e| GraphBridgeError::query(sql, e))
            .inspect_err(|err| {
                error!(statement = sql, error = %err, "statement failed");
            })
    }

    fn execute_batch(
        &mut self,
        sql: &str,
        parameter_sets: &[Vec<SqlParameter>],
    ) -> Result<usize, GraphBridgeError> {
        debug!(statement = sql, batches = parameter_sets.len(), "executing batch");
        let result: Result<usize, GraphBridgeError> = (|| {
            let tx = self
                .conn
                .transaction()
                .map_err(|e| GraphBridgeError::query(sql, e))?;
            let mut affected = 0;
            {
                let mut stmt = tx
                    .prepare(sql)
                    .map_err(|e| GraphBridgeError::query(sql, e))?;
                for params in parameter_sets {
                    affected += stmt
                        .execute(params_from_iter(params.iter()))
                        .map_err(|e| GraphBridgeError::query(sql, e))?;
                }
            }
            tx.commit().map_err(|e| GraphBridgeError::query(sql, e))?;
            Ok(affected)
        })();
        result.inspect_err(|err| {
            error!(statement = sql, error = %err, "batch failed");
        })
    }
}

/// Owns the single live connection; reconnecting replaces it.
#[derive(Default)]
pub struct ConnectionManager {
    handle: Option<SqliteConnection>,
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a new connection. On failure the previous connection is kept.
    pub fn connect(&mut self, config: &ConnectionConfig) -> Result<(), GraphBridgeError> {
        let connection = SqliteConnection::open(config)?;
        if self.handle.is_some() {
            debug!("replacing existing connection");
        }
        self.handle = Some(connection);
        Ok(())
    }

    pub fn disconnect(&mut self) {
        if let Some(handle) = self.handle.take() {
            info!(instance = %handle.instance, "disconnected");
        }
    }

    pub fn is_connected(&self) -> bool {
        self.handle.is_some()
    }

    pub fn current(&self) -> Option<&SqliteConnection> {
        self.handle.as_ref()
    }

    pub fn handle(&mut self) -> Result<&mut SqliteConnection, GraphBridgeError> {
        self.handle
            .as_mut()
            .ok_or_else(|| GraphBridgeError::connection("not connected"))
    }

    pub fn instance_identifier(&self) -> Option<&str> {
        self.handle.as_ref().map(|h| h.instance_identifier())
    }
}
