//! Workspace metadata discovery and column-role classification.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::{
    errors::GraphBridgeError,
    executor::{QueryExecutor, SqlParameter},
    statements::{LOAD_WORKSPACE_METADATA_CLOUD, LOAD_WORKSPACE_METADATA_ONPREM},
    types::SqlType,
    value::Value,
    workspace::{ColumnInfo, ColumnRole, DbObject, GraphSide, GraphWorkspace},
};

/// Substring of the build string identifying the cloud edition.
pub const CLOUD_MARKER: &str = "/CE";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Edition {
    Cloud,
    OnPremise,
}

impl Edition {
    pub fn from_build(build: Option<&str>) -> Self {
        match build {
            Some(build) if build.contains(CLOUD_MARKER) => Edition::Cloud,
            _ => Edition::OnPremise,
        }
    }

    pub fn metadata_query(self) -> &'static str {
        match self {
            Edition::Cloud => LOAD_WORKSPACE_METADATA_CLOUD,
            Edition::OnPremise => LOAD_WORKSPACE_METADATA_ONPREM,
        }
    }
}

/// Maps an `(ENTITY_TYPE, ENTITY_ROLE)` catalog pair onto a column role.
pub fn classify(group: &str, role: &str) -> Option<ColumnRole> {
    match (group, role) {
        ("EDGE", "KEY") => Some(ColumnRole::EdgeKey),
        ("EDGE", "SOURCE") => Some(ColumnRole::EdgeSource),
        ("EDGE", "TARGET") => Some(ColumnRole::EdgeTarget),
        ("EDGE", _) => Some(ColumnRole::Attribute(GraphSide::Edge)),
        ("VERTEX", "KEY") => Some(ColumnRole::NodeKey),
        ("VERTEX", _) => Some(ColumnRole::Attribute(GraphSide::Node)),
        _ => None,
    }
}

/// Reads the column roles of `workspace` and checks the result is complete.
///
/// Columns are registered with [`SqlType::Other`]; the loader replaces it
/// with the type observed in the projection result.
pub fn resolve_workspace<E: QueryExecutor + ?Sized>(
    exec: &mut E,
    edition: Edition,
    workspace: &DbObject,
) -> Result<GraphWorkspace, GraphBridgeError> {
    let params = [
        SqlParameter::text(workspace.schema.as_str()),
        SqlParameter::text(workspace.name.as_str()),
    ];
    let result = exec.execute_query(edition.metadata_query(), &params)?;
    let mut descriptor = GraphWorkspace::new(workspace.clone());
    for row in &result.rows {
        let [group, role, schema, table, column] = match row.as_slice() {
            [a, b, c, d, e] => [a, b, c, d, e].map(text_of),
            _ => {
                return Err(GraphBridgeError::schema(format!(
                    "workspace metadata rows must have 5 columns, got {}",
                    row.len()
                )));
            }
        };
        let Some(role) = classify(&group, &role) else {
            warn!(workspace = %workspace, group = %group, "skipping metadata row with unknown entity type");
            continue;
        };
        debug!(workspace = %workspace, column = %column, ?role, "resolved workspace column");
        descriptor.assign_column(role, ColumnInfo::new(schema, table, column, SqlType::Other));
    }
    descriptor.ensure_metadata_complete()?;
    Ok(descriptor)
}

fn text_of(value: &Value) -> String {
    value.key_string().unwrap_or_default()
}
