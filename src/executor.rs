//! The query-execution seam consumed by the loader, resolver and uploader.

use rusqlite::types::{ToSql, ToSqlOutput};

use crate::{
    errors::GraphBridgeError,
    types::{ScalarType, SqlType},
    value::Value,
    workspace::ColumnInfo,
};

/// A bound value paired with the relational type it is sent as.
#[derive(Clone, Debug, PartialEq)]
pub struct SqlParameter {
    pub value: Value,
    pub sql_type: SqlType,
}

impl SqlParameter {
    pub fn new(value: Value, sql_type: SqlType) -> Self {
        Self { value, sql_type }
    }

    /// Sends the value as a generic variable-length string.
    pub fn text(value: impl Into<Value>) -> Self {
        Self::new(value.into(), SqlType::NVarchar)
    }
}

impl ToSql for SqlParameter {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match (&self.value, self.sql_type.scalar_type()) {
            (Value::Null, _) | (Value::Text(_), _) => self.value.to_sql(),
            (other, ScalarType::String) => Ok(ToSqlOutput::Owned(
                rusqlite::types::Value::Text(other.to_string()),
            )),
            (other, _) => other.to_sql(),
        }
    }
}

/// Rows of a single query with one column descriptor per ordinal position.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QueryResult {
    pub columns: Vec<ColumnInfo>,
    pub rows: Vec<Vec<Value>>,
}

impl QueryResult {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// First cell of the first row, null for an empty result.
    pub fn scalar(&self) -> Value {
        self.rows
            .first()
            .and_then(|row| row.first())
            .cloned()
            .unwrap_or(Value::Null)
    }
}

pub trait QueryExecutor {
    fn execute_query(
        &mut self,
        sql: &str,
        params: &[SqlParameter],
    ) -> Result<QueryResult, GraphBridgeError>;

    /// Runs one or more `;`-separated statements without parameters.
    fn execute(&mut self, sql: &str) -> Result<(), GraphBridgeError>;

    /// Runs `sql` once per parameter set in one transaction, returning affected rows.
    fn execute_batch(
        &mut self,
        sql: &str,
        parameter_sets: &[Vec<SqlParameter>],
    ) -> Result<usize, GraphBridgeError>;

    fn query_scalar(
        &mut self,
        sql: &str,
        params: &[SqlParameter],
    ) -> Result<Value, GraphBridgeError> {
        Ok(self.execute_query(sql, params)?.scalar())
    }
}
