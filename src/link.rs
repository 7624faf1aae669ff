use crate::{
    errors::GraphBridgeError,
    network::{GraphModel, TableKind},
    types::HostType,
    value::Value,
    workspace::DbObject,
};

pub const INSTANCE_COLUMN: &str = "db_instance";
pub const WORKSPACE_SCHEMA_COLUMN: &str = "db_workspace_schema";
pub const WORKSPACE_NAME_COLUMN: &str = "db_workspace_name";

/// Where a host graph was loaded from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WorkspaceLink {
    pub instance: String,
    pub workspace: DbObject,
}

/// Records `workspace` on `instance` as the source of `graph`.
pub fn link_network<G: GraphModel + ?Sized>(
    graph: &mut G,
    instance: &str,
    workspace: &DbObject,
) -> Result<(), GraphBridgeError> {
    let row = graph.network_suid();
    for (column, value) in [
        (INSTANCE_COLUMN, instance),
        (WORKSPACE_SCHEMA_COLUMN, workspace.schema.as_str()),
        (WORKSPACE_NAME_COLUMN, workspace.name.as_str()),
    ] {
        if graph.column(TableKind::Network, column).is_none() {
            graph.create_column(TableKind::Network, column, HostType::String)?;
        }
        graph.set(TableKind::Network, row, column, Value::from(value))?;
    }
    Ok(())
}

/// Reads the link marker, `None` when the graph was never linked.
pub fn read_link<G: GraphModel + ?Sized>(graph: &G) -> Option<WorkspaceLink> {
    let row = graph.network_suid();
    let read = |column: &str| {
        graph
            .get(TableKind::Network, row, column)
            .ok()
            .and_then(|v| v.key_string())
            .filter(|s| !s.is_empty())
    };
    Some(WorkspaceLink {
        instance: read(INSTANCE_COLUMN)?,
        workspace: DbObject::new(read(WORKSPACE_SCHEMA_COLUMN)?, read(WORKSPACE_NAME_COLUMN)?),
    })
}

pub fn is_linked_to<G: GraphModel + ?Sized>(graph: &G, instance: &str) -> bool {
    read_link(graph).is_some_and(|link| link.instance == instance)
}
