//! Builds host nodes and edges from freshly loaded workspace records.

use ahash::AHashMap;
use tracing::{debug, info, warn};

use crate::{
    errors::{Endpoint, GraphBridgeError},
    network::{GraphModel, NAME_COLUMN, Suid, TableKind},
    types::HostType,
    value::Value,
    workspace::{EdgeRecord, FieldMap, GraphRecord, GraphWorkspace, NodeRecord},
};

/// External key to host node, for resolving edge endpoints.
pub type NodeIndex = AHashMap<String, Suid>;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AssemblySummary {
    pub nodes: usize,
    pub edges: usize,
}

/// Creates one host node per node record and one host edge per edge record.
///
/// Every endpoint is resolved before its edge is created, so a dangling
/// reference never leaves a half-built edge behind.
pub fn assemble_graph<G: GraphModel + ?Sized>(
    graph: &mut G,
    workspace: &GraphWorkspace,
) -> Result<AssemblySummary, GraphBridgeError> {
    workspace.ensure_metadata_complete()?;
    ensure_columns(graph, TableKind::Node, &workspace.node_fields)?;
    ensure_columns(graph, TableKind::Edge, &workspace.edge_fields)?;

    let mut index = NodeIndex::with_capacity(workspace.nodes().len());
    for node in workspace.nodes() {
        let Some(key) = node.key() else {
            warn!(column = node.key_column(), "skipping node row without key");
            continue;
        };
        match index.get(&key) {
            Some(&existing) => write_node(graph, existing, node, &workspace.node_fields)?,
            None => {
                let suid = create_node(graph, node, &workspace.node_fields)?;
                index.insert(key, suid);
            }
        }
    }

    let mut created_edges: AHashMap<String, Suid> = AHashMap::new();
    for edge in workspace.edges() {
        let Some(key) = edge.key() else {
            warn!(column = %edge.roles().key, "skipping edge row without key");
            continue;
        };
        let (source, target) = resolve_endpoints(edge, &index)?;
        match created_edges.get(&key) {
            Some(&existing) => write_edge(graph, existing, edge, &workspace.edge_fields)?,
            None => {
                let suid = create_edge(graph, source, target, edge, &workspace.edge_fields)?;
                created_edges.insert(key, suid);
            }
        }
    }

    let summary = AssemblySummary {
        nodes: index.len(),
        edges: created_edges.len(),
    };
    info!(
        workspace = %workspace.workspace,
        nodes = summary.nodes,
        edges = summary.edges,
        "assembled graph"
    );
    Ok(summary)
}

/// Creates a typed host column for every field the host table lacks.
pub fn ensure_columns<G: GraphModel + ?Sized>(
    graph: &mut G,
    table: TableKind,
    fields: &FieldMap,
) -> Result<(), GraphBridgeError> {
    for field in fields.iter() {
        if graph.column(table, &field.name).is_none() {
            let host_type = HostType::from(field.scalar_type());
            debug!(?table, column = %field.name, %host_type, "creating host column");
            graph.create_column(table, &field.name, host_type)?;
        }
    }
    Ok(())
}

pub(crate) fn resolve_endpoints(
    edge: &EdgeRecord,
    index: &NodeIndex,
) -> Result<(Suid, Suid), GraphBridgeError> {
    let lookup = |endpoint: Endpoint, key: Option<String>| {
        let key = key.unwrap_or_else(|| "<null>".to_string());
        index
            .get(&key)
            .copied()
            .ok_or_else(|| GraphBridgeError::dangling_edge(endpoint, key))
    };
    let source = lookup(Endpoint::Source, edge.source())?;
    let target = lookup(Endpoint::Target, edge.target())?;
    Ok((source, target))
}

pub(crate) fn create_node<G: GraphModel + ?Sized>(
    graph: &mut G,
    node: &NodeRecord,
    fields: &FieldMap,
) -> Result<Suid, GraphBridgeError> {
    let suid = graph.add_node();
    write_node(graph, suid, node, fields)?;
    Ok(suid)
}

pub(crate) fn write_node<G: GraphModel + ?Sized>(
    graph: &mut G,
    suid: Suid,
    node: &NodeRecord,
    fields: &FieldMap,
) -> Result<(), GraphBridgeError> {
    let name = node.key().map(Value::Text).unwrap_or(Value::Null);
    graph.set(TableKind::Node, suid, NAME_COLUMN, name)?;
    write_attributes(graph, TableKind::Node, suid, &node.record, fields)
}

pub(crate) fn create_edge<G: GraphModel + ?Sized>(
    graph: &mut G,
    source: Suid,
    target: Suid,
    edge: &EdgeRecord,
    fields: &FieldMap,
) -> Result<Suid, GraphBridgeError> {
    let suid = graph.add_edge(source, target)?;
    let source_name = graph.get(TableKind::Node, source, NAME_COLUMN)?;
    let target_name = graph.get(TableKind::Node, target, NAME_COLUMN)?;
    graph.set(
        TableKind::Edge,
        suid,
        NAME_COLUMN,
        Value::Text(format!("{source_name} -> {target_name}")),
    )?;
    write_edge(graph, suid, edge, fields)?;
    Ok(suid)
}

pub(crate) fn write_edge<G: GraphModel + ?Sized>(
    graph: &mut G,
    suid: Suid,
    edge: &EdgeRecord,
    fields: &FieldMap,
) -> Result<(), GraphBridgeError> {
    write_attributes(graph, TableKind::Edge, suid, &edge.record, fields)
}

/// Copies declared fields into the host row, leaving host-assigned columns alone.
fn write_attributes<G: GraphModel + ?Sized>(
    graph: &mut G,
    table: TableKind,
    row: Suid,
    record: &GraphRecord,
    fields: &FieldMap,
) -> Result<(), GraphBridgeError> {
    for field in fields.iter() {
        let Some(column) = graph.column(table, &field.name) else {
            continue;
        };
        if column.primary_key {
            continue;
        }
        graph.set(table, row, &field.name, record.get(&field.name).clone())?;
    }
    Ok(())
}
