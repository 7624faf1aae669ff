use std::{path::PathBuf, process};

use clap::{Args, Parser, Subcommand};
use graphbridge::{
    BridgeConfig, ConnectionManager, DbObject, GraphBridgeError, ParameterMode,
    logging::init_logging,
    monitor::LogMonitor,
    network::{GraphModel, dump_network_to_path, load_network_from_path},
    tasks::{self, CreateWorkspaceRequest},
};

#[derive(Parser, Debug)]
#[command(
    name = "graphbridge",
    version,
    about = "Load, refresh and create relational graph workspaces",
    disable_help_subcommand = true
)]
struct Cli {
    #[arg(long, global = true, env = "GRAPHBRIDGE_CONFIG", help = "Configuration file")]
    config: Option<PathBuf>,

    #[arg(long, global = true, help = "Database file, or `memory`")]
    db: Option<String>,

    #[arg(long, global = true, help = "Log filter, e.g. `info` or `graphbridge=debug`")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the connected instance.
    Status,
    /// List graph workspaces.
    Workspaces,
    /// Load a workspace into a network dump.
    Load {
        #[arg(long, value_name = "SCHEMA.NAME")]
        workspace: String,
        #[arg(long, value_name = "FILE")]
        output: PathBuf,
    },
    /// Reconcile a network dump with the workspace it was loaded from.
    Refresh {
        #[arg(long, value_name = "FILE")]
        network: PathBuf,
    },
    /// Upload a network dump as a new workspace.
    Create(CreateCmd),
}

#[derive(Args, Debug)]
struct CreateCmd {
    #[arg(long, value_name = "FILE")]
    network: PathBuf,
    #[arg(long)]
    schema: String,
    #[arg(long)]
    name: String,
    #[arg(long)]
    node_table: String,
    #[arg(long)]
    edge_table: String,
    #[arg(long, help = "Create the schema if it does not exist")]
    create_schema: bool,
    #[arg(long, value_parser = ["typed", "text"], help = "How bulk-insert values are bound")]
    parameter_mode: Option<String>,
}

fn main() {
    let cli = Cli::parse();
    let mut config = match BridgeConfig::load(cli.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(err) => {
            eprintln!("error: {err}");
            process::exit(2);
        }
    };
    if let Some(db) = &cli.db {
        config.connection.database = db.clone();
    }
    let level = cli.log_level.as_deref().unwrap_or(&config.log_level);
    if let Err(err) = init_logging(level) {
        eprintln!("warning: {err}");
    }

    let mut manager = ConnectionManager::new();
    let mut monitor = LogMonitor::new();
    if let Err(err) = tasks::connect(&mut manager, &config.connection, &mut monitor) {
        eprintln!("{err}");
        process::exit(2);
    }
    if let Err(err) = run_command(&mut manager, &config, &cli.command) {
        eprintln!("command failed: {err}");
        process::exit(1);
    }
}

fn run_command(
    manager: &mut ConnectionManager,
    config: &BridgeConfig,
    command: &Command,
) -> Result<(), GraphBridgeError> {
    let mut monitor = LogMonitor::new();
    match command {
        Command::Status => {
            let schema = tasks::current_schema(manager)?;
            let workspaces = tasks::list_workspaces(manager)?.len();
            if let Some(handle) = manager.current() {
                println!(
                    "backend=sqlite instance={} build={} edition={:?} schema={schema} workspaces={workspaces}",
                    handle.instance_identifier(),
                    handle.build().unwrap_or("unknown"),
                    handle.edition(),
                );
            }
            Ok(())
        }
        Command::Workspaces => {
            for workspace in tasks::list_workspaces(manager)? {
                println!("{workspace}");
            }
            Ok(())
        }
        Command::Load { workspace, output } => {
            let workspace = DbObject::parse(workspace)?;
            let network = tasks::load_workspace(manager, &workspace, &mut monitor)?;
            dump_network_to_path(&network, output)?;
            println!(
                "workspace={workspace} nodes={} edges={} output={}",
                network.node_count(),
                network.edge_count(),
                output.display()
            );
            Ok(())
        }
        Command::Refresh { network: path } => {
            let mut network = load_network_from_path(path)?;
            let report = tasks::refresh_network(manager, &mut network, &mut monitor)?;
            dump_network_to_path(&network, path)?;
            println!(
                "nodes_created={} nodes_updated={} nodes_deleted={} edges_created={} edges_updated={} edges_deleted={}",
                report.nodes_created,
                report.nodes_updated,
                report.nodes_deleted,
                report.edges_created,
                report.edges_updated,
                report.edges_deleted
            );
            Ok(())
        }
        Command::Create(cmd) => {
            let mode = match cmd.parameter_mode.as_deref() {
                Some("text") => ParameterMode::Text,
                Some(_) => ParameterMode::Typed,
                None => config.upload.parameter_mode,
            };
            let mut network = load_network_from_path(&cmd.network)?;
            let request = CreateWorkspaceRequest {
                workspace: DbObject::new(cmd.schema.as_str(), cmd.name.as_str()),
                node_table: cmd.node_table.clone(),
                edge_table: cmd.edge_table.clone(),
                create_schema: cmd.create_schema,
            };
            let summary =
                tasks::create_workspace(manager, &mut network, &request, mode, &mut monitor)?;
            dump_network_to_path(&network, &cmd.network)?;
            println!(
                "workspace={} nodes={} edges={}",
                request.workspace, summary.nodes, summary.edges
            );
            Ok(())
        }
    }
}
