use std::{
    collections::{BTreeMap, BTreeSet},
    sync::atomic::{AtomicI64, Ordering},
};

use ahash::AHashMap;

use crate::{errors::GraphBridgeError, types::HostType, value::Value};

use super::{GraphModel, HostColumn, NAME_COLUMN, SUID_COLUMN, Suid, TableKind};

static NEXT_SUID: AtomicI64 = AtomicI64::new(1);

fn next_suid() -> Suid {
    NEXT_SUID.fetch_add(1, Ordering::Relaxed)
}

/// Keeps future SUIDs clear of one restored from a dump.
fn reserve_suid(suid: Suid) {
    NEXT_SUID.fetch_max(suid + 1, Ordering::Relaxed);
}

#[derive(Clone, Debug)]
struct Table {
    columns: Vec<HostColumn>,
    rows: AHashMap<Suid, AHashMap<String, Value>>,
}

impl Table {
    fn new() -> Self {
        let mut pk = HostColumn::new(SUID_COLUMN, HostType::Long);
        pk.primary_key = true;
        Self {
            columns: vec![pk, HostColumn::new(NAME_COLUMN, HostType::String)],
            rows: AHashMap::new(),
        }
    }

    fn column(&self, name: &str) -> Option<&HostColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    fn insert_row(&mut self, suid: Suid) {
        let mut cells = AHashMap::new();
        cells.insert(SUID_COLUMN.to_string(), Value::Long(suid));
        self.rows.insert(suid, cells);
    }
}

/// In-memory property graph with node, edge and network attribute tables.
#[derive(Clone, Debug)]
pub struct Network {
    suid: Suid,
    nodes: BTreeSet<Suid>,
    edges: BTreeMap<Suid, (Suid, Suid)>,
    node_table: Table,
    edge_table: Table,
    network_table: Table,
}

impl Network {
    pub fn new(name: &str) -> Self {
        Self::with_suid(next_suid(), name)
    }

    pub(super) fn with_suid(suid: Suid, name: &str) -> Self {
        reserve_suid(suid);
        let mut network_table = Table::new();
        network_table.insert_row(suid);
        if let Some(cells) = network_table.rows.get_mut(&suid) {
            cells.insert(NAME_COLUMN.to_string(), Value::Text(name.to_string()));
        }
        Self {
            suid,
            nodes: BTreeSet::new(),
            edges: BTreeMap::new(),
            node_table: Table::new(),
            edge_table: Table::new(),
            network_table,
        }
    }

    pub fn name(&self) -> String {
        self.network_table
            .rows
            .get(&self.suid)
            .and_then(|cells| cells.get(NAME_COLUMN))
            .and_then(Value::key_string)
            .unwrap_or_default()
    }

    pub(super) fn insert_node_with_suid(&mut self, suid: Suid) {
        reserve_suid(suid);
        self.nodes.insert(suid);
        self.node_table.insert_row(suid);
    }

    pub(super) fn insert_edge_with_suid(
        &mut self,
        suid: Suid,
        source: Suid,
        target: Suid,
    ) -> Result<(), GraphBridgeError> {
        self.check_endpoints(source, target)?;
        reserve_suid(suid);
        self.edges.insert(suid, (source, target));
        self.edge_table.insert_row(suid);
        Ok(())
    }

    /// Writes a cell without casting; used when restoring already typed values.
    pub(super) fn put_raw(&mut self, table: TableKind, row: Suid, column: &str, value: Value) {
        if let Some(cells) = self.table_mut(table).rows.get_mut(&row) {
            cells.insert(column.to_string(), value);
        }
    }

    fn check_endpoints(&self, source: Suid, target: Suid) -> Result<(), GraphBridgeError> {
        for endpoint in [source, target] {
            if !self.nodes.contains(&endpoint) {
                return Err(GraphBridgeError::not_found(format!("node {endpoint}")));
            }
        }
        Ok(())
    }

    fn table(&self, table: TableKind) -> &Table {
        match table {
            TableKind::Node => &self.node_table,
            TableKind::Edge => &self.edge_table,
            TableKind::Network => &self.network_table,
        }
    }

    fn table_mut(&mut self, table: TableKind) -> &mut Table {
        match table {
            TableKind::Node => &mut self.node_table,
            TableKind::Edge => &mut self.edge_table,
            TableKind::Network => &mut self.network_table,
        }
    }
}

impl GraphModel for Network {
    fn network_suid(&self) -> Suid {
        self.suid
    }

    fn add_node(&mut self) -> Suid {
        let suid = next_suid();
        self.nodes.insert(suid);
        self.node_table.insert_row(suid);
        suid
    }

    fn remove_nodes(&mut self, nodes: &[Suid]) -> usize {
        let doomed: BTreeSet<Suid> = nodes
            .iter()
            .copied()
            .filter(|n| self.nodes.contains(n))
            .collect();
        if doomed.is_empty() {
            return 0;
        }
        let incident: Vec<Suid> = self
            .edges
            .iter()
            .filter(|(_, (s, t))| doomed.contains(s) || doomed.contains(t))
            .map(|(id, _)| *id)
            .collect();
        self.remove_edges(&incident);
        for node in &doomed {
            self.nodes.remove(node);
            self.node_table.rows.remove(node);
        }
        doomed.len()
    }

    fn add_edge(&mut self, source: Suid, target: Suid) -> Result<Suid, GraphBridgeError> {
        self.check_endpoints(source, target)?;
        let suid = next_suid();
        self.edges.insert(suid, (source, target));
        self.edge_table.insert_row(suid);
        Ok(suid)
    }

    fn remove_edges(&mut self, edges: &[Suid]) -> usize {
        let mut removed = 0;
        for edge in edges {
            if self.edges.remove(edge).is_some() {
                self.edge_table.rows.remove(edge);
                removed += 1;
            }
        }
        removed
    }

    fn node_ids(&self) -> Vec<Suid> {
        self.nodes.iter().copied().collect()
    }

    fn edge_ids(&self) -> Vec<Suid> {
        self.edges.keys().copied().collect()
    }

    fn edge_endpoints(&self, edge: Suid) -> Option<(Suid, Suid)> {
        self.edges.get(&edge).copied()
    }

    fn columns(&self, table: TableKind) -> Vec<HostColumn> {
        self.table(table).columns.clone()
    }

    fn column(&self, table: TableKind, name: &str) -> Option<HostColumn> {
        self.table(table).column(name).cloned()
    }

    fn create_column(
        &mut self,
        table: TableKind,
        name: &str,
        host_type: HostType,
    ) -> Result<HostColumn, GraphBridgeError> {
        let target = self.table_mut(table);
        if target.column(name).is_some() {
            return Err(GraphBridgeError::invalid_input(format!(
                "column {name} already exists"
            )));
        }
        let column = HostColumn::new(name, host_type);
        target.columns.push(column.clone());
        Ok(column)
    }

    fn get(&self, table: TableKind, row: Suid, column: &str) -> Result<Value, GraphBridgeError> {
        let source = self.table(table);
        if source.column(column).is_none() {
            return Err(GraphBridgeError::not_found(format!("column {column}")));
        }
        let cells = source
            .rows
            .get(&row)
            .ok_or_else(|| GraphBridgeError::not_found(format!("row {row}")))?;
        Ok(cells.get(column).cloned().unwrap_or(Value::Null))
    }

    fn set(
        &mut self,
        table: TableKind,
        row: Suid,
        column: &str,
        value: Value,
    ) -> Result<(), GraphBridgeError> {
        let target = self.table_mut(table);
        let declared = target
            .column(column)
            .ok_or_else(|| GraphBridgeError::not_found(format!("column {column}")))?;
        if declared.primary_key {
            return Err(GraphBridgeError::invalid_input(format!(
                "column {column} is host assigned"
            )));
        }
        let cast = value.cast_to_host(declared.host_type)?;
        let cells = target
            .rows
            .get_mut(&row)
            .ok_or_else(|| GraphBridgeError::not_found(format!("row {row}")))?;
        cells.insert(column.to_string(), cast);
        Ok(())
    }
}
