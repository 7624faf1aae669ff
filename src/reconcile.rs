//! Brings a previously loaded host graph in line with a fresh workspace snapshot.
//!
//! Host objects are matched to records by external key: the value stored in
//! the workspace's key column, stringified. Matched objects are updated in
//! place, unmatched records create new objects and host objects whose key was
//! not seen are removed. All nodes are reconciled before any edge, because
//! edge endpoints resolve against the post-sweep node index.
//!
//! Edits are applied as the sweep runs. A dangling edge endpoint aborts the
//! remaining sweep and leaves the graph partially reconciled.

use ahash::AHashMap;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
    assembler::{
        NodeIndex, create_edge, create_node, ensure_columns, resolve_endpoints, write_edge,
        write_node,
    },
    errors::GraphBridgeError,
    network::{GraphModel, Suid, TableKind},
    workspace::GraphWorkspace,
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RefreshReport {
    pub nodes_created: usize,
    pub nodes_updated: usize,
    pub nodes_deleted: usize,
    pub edges_created: usize,
    pub edges_updated: usize,
    pub edges_deleted: usize,
}

impl RefreshReport {
    /// No object was created or deleted. Matched objects are always rewritten
    /// and counted as updated, so the update counters are not consulted.
    pub fn is_structurally_unchanged(&self) -> bool {
        self.nodes_created == 0
            && self.nodes_deleted == 0
            && self.edges_created == 0
            && self.edges_deleted == 0
    }
}

/// Host objects of one table keyed by external key, plus those that have no usable key.
struct ExistingIndex {
    by_key: AHashMap<String, Suid>,
    stale: Vec<Suid>,
}

impl ExistingIndex {
    fn build<G: GraphModel + ?Sized>(
        graph: &G,
        table: TableKind,
        key_column: &str,
        rows: Vec<Suid>,
    ) -> Result<Self, GraphBridgeError> {
        let mut index = Self {
            by_key: AHashMap::with_capacity(rows.len()),
            stale: Vec::new(),
        };
        for row in rows {
            match graph.get(table, row, key_column)?.key_string() {
                Some(key) if !index.by_key.contains_key(&key) => {
                    index.by_key.insert(key, row);
                }
                Some(key) => {
                    warn!(?table, key = %key, row, "duplicate external key on host, removing");
                    index.stale.push(row);
                }
                None => index.stale.push(row),
            }
        }
        Ok(index)
    }

    /// Every object whose key was never claimed by a record.
    fn into_stale(self) -> Vec<Suid> {
        let mut stale = self.stale;
        stale.extend(self.by_key.into_values());
        stale
    }
}

/// Edges removed together with a deleted endpoint count as deleted edges.
pub fn reconcile<G: GraphModel + ?Sized>(
    graph: &mut G,
    workspace: &GraphWorkspace,
) -> Result<RefreshReport, GraphBridgeError> {
    workspace.ensure_metadata_complete()?;
    let node_key = workspace.node_key_column()?;
    let edge_roles = workspace.edge_roles()?;
    ensure_columns(graph, TableKind::Node, &workspace.node_fields)?;
    ensure_columns(graph, TableKind::Edge, &workspace.edge_fields)?;
    let mut report = RefreshReport::default();

    let mut existing = ExistingIndex::build(&*graph, TableKind::Node, &node_key, graph.node_ids())?;
    let mut current = NodeIndex::with_capacity(workspace.nodes().len());
    for node in workspace.nodes() {
        let Some(key) = node.key() else {
            warn!(column = %node_key, "skipping node row without key");
            continue;
        };
        if let Some(&suid) = current.get(&key) {
            write_node(graph, suid, node, &workspace.node_fields)?;
        } else if let Some(suid) = existing.by_key.remove(&key) {
            write_node(graph, suid, node, &workspace.node_fields)?;
            current.insert(key, suid);
            report.nodes_updated += 1;
        } else {
            let suid = create_node(graph, node, &workspace.node_fields)?;
            debug!(key = %key, suid, "created node");
            current.insert(key, suid);
            report.nodes_created += 1;
        }
    }
    let edges_before = graph.edge_count();
    report.nodes_deleted = graph.remove_nodes(&existing.into_stale());
    let cascaded = edges_before - graph.edge_count();

    let mut existing_edges =
        ExistingIndex::build(&*graph, TableKind::Edge, &edge_roles.key, graph.edge_ids())?;
    let mut current_edges: AHashMap<String, Suid> =
        AHashMap::with_capacity(workspace.edges().len());
    for edge in workspace.edges() {
        let Some(key) = edge.key() else {
            warn!(column = %edge_roles.key, "skipping edge row without key");
            continue;
        };
        let (source, target) = resolve_endpoints(edge, &current)?;
        if let Some(&suid) = current_edges.get(&key) {
            write_edge(graph, suid, edge, &workspace.edge_fields)?;
        } else if let Some(suid) = existing_edges.by_key.remove(&key) {
            let suid = if graph.edge_endpoints(suid) == Some((source, target)) {
                write_edge(graph, suid, edge, &workspace.edge_fields)?;
                suid
            } else {
                debug!(key = %key, suid, "edge endpoints changed, replacing");
                graph.remove_edges(&[suid]);
                create_edge(graph, source, target, edge, &workspace.edge_fields)?
            };
            current_edges.insert(key, suid);
            report.edges_updated += 1;
        } else {
            let suid = create_edge(graph, source, target, edge, &workspace.edge_fields)?;
            debug!(key = %key, suid, "created edge");
            current_edges.insert(key, suid);
            report.edges_created += 1;
        }
    }
    report.edges_deleted = cascaded + graph.remove_edges(&existing_edges.into_stale());

    info!(
        workspace = %workspace.workspace,
        nodes_created = report.nodes_created,
        nodes_updated = report.nodes_updated,
        nodes_deleted = report.nodes_deleted,
        edges_created = report.edges_created,
        edges_updated = report.edges_updated,
        edges_deleted = report.edges_deleted,
        "reconciled graph"
    );
    Ok(report)
}
