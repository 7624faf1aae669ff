//! Workspace descriptors, column descriptors and the row records loaded for them.

use std::{fmt, sync::Arc};

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::{
    errors::GraphBridgeError,
    statements::quote_identifier,
    types::{ScalarType, SqlType},
    value::Value,
};

static NULL: Value = Value::Null;

/// A `(schema, name)` pair naming a table or graph workspace.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DbObject {
    pub schema: String,
    pub name: String,
}

impl DbObject {
    pub fn new(schema: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
        }
    }

    /// Parses `SCHEMA.NAME`; the name may itself contain dots.
    pub fn parse(qualified: &str) -> Result<Self, GraphBridgeError> {
        match qualified.split_once('.') {
            Some((schema, name)) if !schema.is_empty() && !name.is_empty() => {
                Ok(Self::new(schema, name))
            }
            _ => Err(GraphBridgeError::invalid_input(format!(
                "expected SCHEMA.NAME, got '{qualified}'"
            ))),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.schema.is_empty() && !self.name.is_empty()
    }

    /// Quoted `"schema"."name"` reference for use in SQL text.
    pub fn qualified(&self) -> String {
        format!(
            "{}.{}",
            quote_identifier(&self.schema),
            quote_identifier(&self.name)
        )
    }
}

impl fmt::Display for DbObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.name)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ColumnInfo {
    pub schema: String,
    pub table: String,
    pub name: String,
    pub sql_type: SqlType,
    pub primary_key: bool,
    pub not_null: bool,
}

impl ColumnInfo {
    pub fn new(
        schema: impl Into<String>,
        table: impl Into<String>,
        name: impl Into<String>,
        sql_type: SqlType,
    ) -> Self {
        Self {
            schema: schema.into(),
            table: table.into(),
            name: name.into(),
            sql_type,
            primary_key: false,
            not_null: false,
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    pub fn scalar_type(&self) -> ScalarType {
        self.sql_type.scalar_type()
    }

    pub fn ddl(&self) -> &'static str {
        self.sql_type.ddl()
    }

    pub fn table_object(&self) -> DbObject {
        DbObject::new(self.schema.clone(), self.table.clone())
    }
}

/// Column descriptors keyed by name, iterated in insertion order.
#[derive(Clone, Debug, Default)]
pub struct FieldMap {
    columns: Vec<ColumnInfo>,
    index: AHashMap<String, usize>,
}

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Registers a column. A repeated name keeps the existing entry and only
    /// merges the key and not-null flags into it.
    pub fn insert(&mut self, column: ColumnInfo) {
        match self.index.get(&column.name) {
            Some(&pos) => {
                let existing = &mut self.columns[pos];
                existing.primary_key |= column.primary_key;
                existing.not_null |= column.not_null;
            }
            None => {
                self.index.insert(column.name.clone(), self.columns.len());
                self.columns.push(column);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&ColumnInfo> {
        self.index.get(name).map(|&pos| &self.columns[pos])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Refines the type of a known column. Returns `false` for unknown names.
    pub fn update_type(&mut self, name: &str, sql_type: SqlType) -> bool {
        match self.index.get(name) {
            Some(&pos) => {
                self.columns[pos].sql_type = sql_type;
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ColumnInfo> {
        self.columns.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }
}

/// Column name to value mapping for one node or edge row.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphRecord {
    values: AHashMap<String, Value>,
}

impl GraphRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            values: AHashMap::with_capacity(capacity),
        }
    }

    pub fn set(&mut self, column: impl Into<String>, value: Value) {
        self.values.insert(column.into(), value);
    }

    /// Value for the column, null when the column is absent.
    pub fn get(&self, column: &str) -> &Value {
        self.values.get(column).unwrap_or(&NULL)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct NodeRecord {
    pub record: GraphRecord,
    key_column: Arc<str>,
}

impl NodeRecord {
    pub fn new(record: GraphRecord, key_column: Arc<str>) -> Self {
        Self { record, key_column }
    }

    pub fn key_column(&self) -> &str {
        &self.key_column
    }

    pub fn key(&self) -> Option<String> {
        self.record.get(&self.key_column).key_string()
    }
}

/// Names of the identity and endpoint columns shared by every edge of a workspace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EdgeRoles {
    pub key: String,
    pub source: String,
    pub target: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EdgeRecord {
    pub record: GraphRecord,
    roles: Arc<EdgeRoles>,
}

impl EdgeRecord {
    pub fn new(record: GraphRecord, roles: Arc<EdgeRoles>) -> Self {
        Self { record, roles }
    }

    pub fn roles(&self) -> &EdgeRoles {
        &self.roles
    }

    pub fn key(&self) -> Option<String> {
        self.record.get(&self.roles.key).key_string()
    }

    pub fn source(&self) -> Option<String> {
        self.record.get(&self.roles.source).key_string()
    }

    pub fn target(&self) -> Option<String> {
        self.record.get(&self.roles.target).key_string()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GraphSide {
    Node,
    Edge,
}

/// Role a relational column plays inside a graph workspace.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnRole {
    NodeKey,
    EdgeKey,
    EdgeSource,
    EdgeTarget,
    Attribute(GraphSide),
}

/// A graph workspace: table identities, role columns, field maps and loaded rows.
#[derive(Clone, Debug)]
pub struct GraphWorkspace {
    pub workspace: DbObject,
    pub node_table: Option<DbObject>,
    pub edge_table: Option<DbObject>,
    pub node_key: Option<String>,
    pub edge_key: Option<String>,
    pub edge_source: Option<String>,
    pub edge_target: Option<String>,
    pub node_fields: FieldMap,
    pub edge_fields: FieldMap,
    nodes: Vec<NodeRecord>,
    edges: Vec<EdgeRecord>,
}

impl GraphWorkspace {
    pub fn new(workspace: DbObject) -> Self {
        Self {
            workspace,
            node_table: None,
            edge_table: None,
            node_key: None,
            edge_key: None,
            edge_source: None,
            edge_target: None,
            node_fields: FieldMap::new(),
            edge_fields: FieldMap::new(),
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    pub fn assign_column(&mut self, role: ColumnRole, column: ColumnInfo) {
        let side = match role {
            ColumnRole::NodeKey => {
                self.node_key = Some(column.name.clone());
                GraphSide::Node
            }
            ColumnRole::EdgeKey => {
                self.edge_key = Some(column.name.clone());
                GraphSide::Edge
            }
            ColumnRole::EdgeSource => {
                self.edge_source = Some(column.name.clone());
                GraphSide::Edge
            }
            ColumnRole::EdgeTarget => {
                self.edge_target = Some(column.name.clone());
                GraphSide::Edge
            }
            ColumnRole::Attribute(side) => side,
        };
        match side {
            GraphSide::Node => {
                self.node_table.get_or_insert_with(|| column.table_object());
                self.node_fields.insert(column);
            }
            GraphSide::Edge => {
                self.edge_table.get_or_insert_with(|| column.table_object());
                self.edge_fields.insert(column);
            }
        }
    }

    fn missing_roles(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if !self.workspace.is_complete() {
            missing.push("workspace identity");
        }
        let resolves = |name: &Option<String>, fields: &FieldMap| {
            name.as_deref().is_some_and(|n| fields.contains(n))
        };
        if self.node_table.is_none() || !resolves(&self.node_key, &self.node_fields) {
            missing.push("node key");
        }
        if self.edge_table.is_none() || !resolves(&self.edge_key, &self.edge_fields) {
            missing.push("edge key");
        }
        if !resolves(&self.edge_source, &self.edge_fields) {
            missing.push("edge source");
        }
        if !resolves(&self.edge_target, &self.edge_fields) {
            missing.push("edge target");
        }
        missing
    }

    pub fn is_metadata_complete(&self) -> bool {
        self.missing_roles().is_empty()
    }

    pub fn ensure_metadata_complete(&self) -> Result<(), GraphBridgeError> {
        let missing = self.missing_roles();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(GraphBridgeError::incomplete_workspace(format!(
                "{} is missing {}",
                self.workspace,
                missing.join(", ")
            )))
        }
    }

    pub fn node_key_column(&self) -> Result<Arc<str>, GraphBridgeError> {
        self.node_key
            .as_deref()
            .map(Arc::from)
            .ok_or_else(|| GraphBridgeError::incomplete_workspace("node key is not set"))
    }

    pub fn edge_roles(&self) -> Result<Arc<EdgeRoles>, GraphBridgeError> {
        match (&self.edge_key, &self.edge_source, &self.edge_target) {
            (Some(key), Some(source), Some(target)) => Ok(Arc::new(EdgeRoles {
                key: key.clone(),
                source: source.clone(),
                target: target.clone(),
            })),
            _ => Err(GraphBridgeError::incomplete_workspace(
                "edge key, source and target must all be set",
            )),
        }
    }

    pub fn node_table(&self) -> Result<&DbObject, GraphBridgeError> {
        self.node_table
            .as_ref()
            .ok_or_else(|| GraphBridgeError::incomplete_workspace("node table is not set"))
    }

    pub fn edge_table(&self) -> Result<&DbObject, GraphBridgeError> {
        self.edge_table
            .as_ref()
            .ok_or_else(|| GraphBridgeError::incomplete_workspace("edge table is not set"))
    }

    pub fn nodes(&self) -> &[NodeRecord] {
        &self.nodes
    }

    pub fn edges(&self) -> &[EdgeRecord] {
        &self.edges
    }

    pub fn set_nodes(&mut self, nodes: Vec<NodeRecord>) {
        self.nodes = nodes;
    }

    pub fn set_edges(&mut self, edges: Vec<EdgeRecord>) {
        self.edges = edges;
    }
}
