//! Host graph model: the mutable property graph the bridge reads from and writes into.
//!
//! [`GraphModel`] is the seam the assembler, reconciler and flattener talk to.
//! [`Network`] is the in-memory implementation used by the command-line front
//! end and the tests. Every node, edge and network row is identified by a
//! process-wide unique `SUID`.

pub mod dump;
mod model;

use serde::{Deserialize, Serialize};

use crate::{errors::GraphBridgeError, types::HostType, value::Value};

pub use dump::{dump_network_to_path, dump_network_to_writer, load_network_from_path, load_network_from_reader};
pub use model::Network;

pub type Suid = i64;

/// Host-assigned identifier column present on every table.
pub const SUID_COLUMN: &str = "SUID";
pub const NAME_COLUMN: &str = "name";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    Node,
    Edge,
    Network,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostColumn {
    pub name: String,
    pub host_type: HostType,
    pub primary_key: bool,
}

impl HostColumn {
    pub fn new(name: impl Into<String>, host_type: HostType) -> Self {
        Self {
            name: name.into(),
            host_type,
            primary_key: false,
        }
    }
}

pub trait GraphModel {
    /// Identifier of the graph itself, the single row of its network table.
    fn network_suid(&self) -> Suid;

    fn add_node(&mut self) -> Suid;

    /// Removes nodes and every edge incident to them. Returns the number of nodes removed.
    fn remove_nodes(&mut self, nodes: &[Suid]) -> usize;

    fn add_edge(&mut self, source: Suid, target: Suid) -> Result<Suid, GraphBridgeError>;

    fn remove_edges(&mut self, edges: &[Suid]) -> usize;

    fn node_ids(&self) -> Vec<Suid>;

    fn edge_ids(&self) -> Vec<Suid>;

    fn edge_endpoints(&self, edge: Suid) -> Option<(Suid, Suid)>;

    fn columns(&self, table: TableKind) -> Vec<HostColumn>;

    fn column(&self, table: TableKind, name: &str) -> Option<HostColumn> {
        self.columns(table).into_iter().find(|c| c.name == name)
    }

    fn create_column(
        &mut self,
        table: TableKind,
        name: &str,
        host_type: HostType,
    ) -> Result<HostColumn, GraphBridgeError>;

    /// Cell value, null when unset. Unknown rows or columns are errors.
    fn get(&self, table: TableKind, row: Suid, column: &str) -> Result<Value, GraphBridgeError>;

    /// Stores `value` cast to the column's declared type.
    fn set(
        &mut self,
        table: TableKind,
        row: Suid,
        column: &str,
        value: Value,
    ) -> Result<(), GraphBridgeError>;

    fn node_count(&self) -> usize {
        self.node_ids().len()
    }

    fn edge_count(&self) -> usize {
        self.edge_ids().len()
    }
}
