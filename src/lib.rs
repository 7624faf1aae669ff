//! Bridges relational graph workspaces and mutable in-memory property graphs.
//!
//! A graph workspace is a node table and an edge table with designated key,
//! source and target columns, registered in a catalog. Loading resolves the
//! workspace's column roles, fetches both tables and assembles a [`Network`].
//! Refreshing reconciles a previously loaded network against a fresh
//! snapshot. Creating a workspace flattens a network into typed tables and
//! registers them.
//! Run Criterion benchmarks with `cargo bench` to inspect reports under `target/criterion`.

pub mod assembler;
pub mod bench_utils;
pub mod catalog;
pub mod config;
pub mod connection;
pub mod errors;
pub mod executor;
pub mod flatten;
pub mod link;
pub mod loader;
pub mod logging;
pub mod metadata;
pub mod monitor;
pub mod network;
pub mod reconcile;
pub mod statements;
pub mod tasks;
pub mod types;
pub mod upload;
pub mod value;
pub mod workspace;

pub use crate::config::{BridgeConfig, ConnectionConfig, ParameterMode};
pub use crate::connection::{ConnectionManager, SqliteConnection};
pub use crate::errors::{Endpoint, GraphBridgeError};
pub use crate::executor::{QueryExecutor, QueryResult, SqlParameter};
pub use crate::metadata::Edition;
pub use crate::network::{GraphModel, Network, Suid, TableKind};
pub use crate::reconcile::RefreshReport;
pub use crate::types::{HostType, ScalarType, SqlType};
pub use crate::value::Value;
pub use crate::workspace::{ColumnInfo, DbObject, GraphWorkspace};
