//! User-facing operations. Each reports a title, a progress fraction, a
//! status line and leveled messages to a [`TaskMonitor`]; a failure is
//! reported as an error message and progress stops where it was.

use tracing::info;

use crate::{
    assembler::assemble_graph,
    config::{ConnectionConfig, ParameterMode},
    connection::{ConnectionManager, SqliteConnection},
    errors::GraphBridgeError,
    executor::QueryExecutor,
    flatten::flatten_network,
    link::{is_linked_to, link_network, read_link},
    loader::{load_edges, load_nodes},
    metadata::resolve_workspace,
    monitor::{MessageLevel, TaskMonitor},
    network::{GraphModel, Network},
    reconcile::{RefreshReport, reconcile},
    statements::LIST_GRAPH_WORKSPACES,
    upload::{UploadSummary, upload_workspace},
    workspace::DbObject,
};

/// Target of [`create_workspace`]; both tables are created in the workspace schema.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateWorkspaceRequest {
    pub workspace: DbObject,
    pub node_table: String,
    pub edge_table: String,
    pub create_schema: bool,
}

fn report<T>(
    monitor: &mut dyn TaskMonitor,
    result: Result<T, GraphBridgeError>,
) -> Result<T, GraphBridgeError> {
    result.inspect_err(|err| monitor.show_message(MessageLevel::Error, &err.to_string()))
}

fn require_connection<'a>(
    manager: &'a mut ConnectionManager,
    monitor: &mut dyn TaskMonitor,
) -> Result<&'a mut SqliteConnection, GraphBridgeError> {
    if !manager.is_connected() {
        return report(
            monitor,
            Err(GraphBridgeError::connection("not connected to a database")),
        );
    }
    report(monitor, manager.handle())
}

pub fn connect(
    manager: &mut ConnectionManager,
    config: &ConnectionConfig,
    monitor: &mut dyn TaskMonitor,
) -> Result<(), GraphBridgeError> {
    monitor.set_title("Connect to database");
    monitor.set_progress(0.0);
    monitor.set_status(&format!("Opening {}", config.database));
    report(monitor, manager.connect(config))?;
    monitor.set_progress(1.0);
    if let Some(handle) = manager.current() {
        monitor.show_message(
            MessageLevel::Info,
            &format!(
                "Connected to {} ({:?} edition)",
                handle.instance_identifier(),
                handle.edition()
            ),
        );
    }
    Ok(())
}

/// Loads `workspace` into a new network named after it and links the two.
pub fn load_workspace(
    manager: &mut ConnectionManager,
    workspace: &DbObject,
    monitor: &mut dyn TaskMonitor,
) -> Result<Network, GraphBridgeError> {
    monitor.set_title(&format!("Load graph workspace {workspace}"));
    monitor.set_progress(0.0);
    let handle = require_connection(manager, monitor)?;
    let edition = handle.edition();

    monitor.set_status("Loading workspace metadata");
    let mut descriptor = report(monitor, resolve_workspace(handle, edition, workspace))?;
    monitor.set_progress(0.2);
    monitor.set_status("Loading nodes");
    report(monitor, load_nodes(handle, &mut descriptor))?;
    monitor.set_progress(0.4);
    monitor.set_status("Loading edges");
    report(monitor, load_edges(handle, &mut descriptor))?;
    monitor.set_progress(0.6);

    monitor.set_status("Building network");
    let mut network = Network::new(&workspace.name);
    let summary = report(monitor, assemble_graph(&mut network, &descriptor))?;
    monitor.set_progress(0.9);
    report(
        monitor,
        link_network(&mut network, handle.instance_identifier(), workspace),
    )?;
    monitor.set_progress(1.0);
    monitor.show_message(
        MessageLevel::Info,
        &format!(
            "Loaded {} nodes and {} edges from {workspace}",
            summary.nodes, summary.edges
        ),
    );
    Ok(network)
}

/// Reloads the workspace a network was loaded from and reconciles the network with it.
pub fn refresh_network<G: GraphModel + ?Sized>(
    manager: &mut ConnectionManager,
    network: &mut G,
    monitor: &mut dyn TaskMonitor,
) -> Result<RefreshReport, GraphBridgeError> {
    monitor.set_title("Refresh network");
    monitor.set_progress(0.0);
    let link = report(
        monitor,
        read_link(&*network).ok_or_else(|| {
            GraphBridgeError::invalid_input("network is not linked to a graph workspace")
        }),
    )?;
    let handle = require_connection(manager, monitor)?;
    if link.instance != handle.instance_identifier() {
        return report(
            monitor,
            Err(GraphBridgeError::connection(format!(
                "network was loaded from {}, but the connection is to {}",
                link.instance,
                handle.instance_identifier()
            ))),
        );
    }
    let edition = handle.edition();

    monitor.set_status("Loading workspace metadata");
    let mut descriptor = report(monitor, resolve_workspace(handle, edition, &link.workspace))?;
    monitor.set_progress(0.2);
    monitor.set_status("Loading nodes");
    report(monitor, load_nodes(handle, &mut descriptor))?;
    monitor.set_progress(0.4);
    monitor.set_status("Loading edges");
    report(monitor, load_edges(handle, &mut descriptor))?;
    monitor.set_progress(0.6);

    monitor.set_status("Reconciling network");
    let result = report(monitor, reconcile(network, &descriptor))?;
    monitor.set_progress(1.0);
    monitor.show_message(
        MessageLevel::Info,
        &format!(
            "Nodes: {} created, {} updated, {} deleted. Edges: {} created, {} updated, {} deleted",
            result.nodes_created,
            result.nodes_updated,
            result.nodes_deleted,
            result.edges_created,
            result.edges_updated,
            result.edges_deleted
        ),
    );
    Ok(result)
}

/// Uploads a network as a new graph workspace and links the network to it.
pub fn create_workspace<G: GraphModel + ?Sized>(
    manager: &mut ConnectionManager,
    network: &mut G,
    request: &CreateWorkspaceRequest,
    mode: ParameterMode,
    monitor: &mut dyn TaskMonitor,
) -> Result<UploadSummary, GraphBridgeError> {
    monitor.set_title(&format!("Create graph workspace {}", request.workspace));
    monitor.set_progress(0.0);
    let handle = require_connection(manager, monitor)?;
    let schema = request.workspace.schema.as_str();

    monitor.set_status("Checking schema");
    if !report(monitor, handle.schema_exists(schema))? {
        if !request.create_schema {
            return report(
                monitor,
                Err(GraphBridgeError::not_found(format!(
                    "schema {schema} does not exist"
                ))),
            );
        }
        report(monitor, handle.create_schema(schema))?;
        monitor.show_message(MessageLevel::Info, &format!("Created schema {schema}"));
    }
    monitor.set_progress(0.1);

    monitor.set_status("Flattening network");
    let descriptor = report(
        monitor,
        flatten_network(
            &*network,
            request.workspace.clone(),
            DbObject::new(schema, request.node_table.as_str()),
            DbObject::new(schema, request.edge_table.as_str()),
        ),
    )?;
    report(monitor, descriptor.ensure_metadata_complete())?;
    monitor.set_progress(0.3);

    monitor.set_status("Uploading tables");
    let summary = report(monitor, upload_workspace(handle, &descriptor, mode))?;
    monitor.set_progress(0.9);
    report(
        monitor,
        link_network(network, handle.instance_identifier(), &request.workspace),
    )?;
    monitor.set_progress(1.0);
    monitor.show_message(
        MessageLevel::Info,
        &format!(
            "Created {} with {} nodes and {} edges",
            request.workspace, summary.nodes, summary.edges
        ),
    );
    Ok(summary)
}

pub fn list_workspaces(manager: &mut ConnectionManager) -> Result<Vec<DbObject>, GraphBridgeError> {
    let handle = manager.handle()?;
    let result = handle.execute_query(LIST_GRAPH_WORKSPACES, &[])?;
    let workspaces: Vec<DbObject> = result
        .rows
        .iter()
        .filter_map(|row| match row.as_slice() {
            [schema, name] => Some(DbObject::new(
                schema.key_string()?,
                name.key_string()?,
            )),
            _ => None,
        })
        .collect();
    info!(count = workspaces.len(), "listed graph workspaces");
    Ok(workspaces)
}

pub fn schema_exists(
    manager: &mut ConnectionManager,
    schema: &str,
) -> Result<bool, GraphBridgeError> {
    manager.handle()?.schema_exists(schema)
}

pub fn create_schema(manager: &mut ConnectionManager, schema: &str) -> Result<(), GraphBridgeError> {
    manager.handle()?.create_schema(schema)
}

pub fn current_schema(manager: &mut ConnectionManager) -> Result<String, GraphBridgeError> {
    manager.handle()?.current_schema()
}

/// Whether `network` was loaded from the instance currently connected.
pub fn refreshable<G: GraphModel + ?Sized>(manager: &ConnectionManager, network: &G) -> bool {
    manager
        .instance_identifier()
        .is_some_and(|instance| is_linked_to(network, instance))
}
