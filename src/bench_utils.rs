//! Seeded synthetic workspaces for benches and tests.

use std::sync::Arc;

use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::{
    types::SqlType,
    value::Value,
    workspace::{
        ColumnInfo, ColumnRole, DbObject, EdgeRecord, EdgeRoles, GraphRecord, GraphSide, GraphWorkspace,
        NodeRecord,
    },
};

pub const BENCH_SCHEMA: &str = "main";
pub const BENCH_NODE_TABLE: &str = "BENCH_NODES";
pub const BENCH_EDGE_TABLE: &str = "BENCH_EDGES";

#[derive(Clone, Debug)]
pub enum GraphShape {
    Line,
    Star,
    RandomErdosRenyi { edges: usize },
}

/// Empty descriptor with `id`/`label`/`weight` nodes and `id`/`src`/`dst`/`weight` edges.
pub fn bench_descriptor() -> GraphWorkspace {
    let mut ws = GraphWorkspace::new(DbObject::new(BENCH_SCHEMA, "BENCH"));
    let node = |name: &str, sql_type| {
        ColumnInfo::new(BENCH_SCHEMA, BENCH_NODE_TABLE, name, sql_type)
    };
    let edge = |name: &str, sql_type| {
        ColumnInfo::new(BENCH_SCHEMA, BENCH_EDGE_TABLE, name, sql_type)
    };
    ws.assign_column(ColumnRole::NodeKey, node("id", SqlType::BigInt).primary_key());
    ws.assign_column(
        ColumnRole::Attribute(GraphSide::Node),
        node("label", SqlType::NVarchar),
    );
    ws.assign_column(
        ColumnRole::Attribute(GraphSide::Node),
        node("weight", SqlType::Double),
    );
    ws.assign_column(ColumnRole::EdgeKey, edge("id", SqlType::BigInt).primary_key());
    ws.assign_column(ColumnRole::EdgeSource, edge("src", SqlType::BigInt).not_null());
    ws.assign_column(ColumnRole::EdgeTarget, edge("dst", SqlType::BigInt).not_null());
    ws.assign_column(
        ColumnRole::Attribute(GraphSide::Edge),
        edge("weight", SqlType::Double),
    );
    ws
}

/// Builds a metadata-complete workspace whose records form `shape`.
pub fn generate_workspace(shape: GraphShape, node_count: usize, seed: u64) -> GraphWorkspace {
    assert!(node_count > 1, "node_count must exceed 1");
    let mut rng = StdRng::seed_from_u64(seed);
    let pairs = match shape {
        GraphShape::Line => (0..node_count - 1).map(|idx| (idx, idx + 1)).collect(),
        GraphShape::Star => (1..node_count).map(|leaf| (0, leaf)).collect(),
        GraphShape::RandomErdosRenyi { edges } => random_pairs(&mut rng, node_count, edges),
    };

    let mut ws = bench_descriptor();
    let key_column: Arc<str> = Arc::from("id");
    let roles = Arc::new(EdgeRoles {
        key: "id".to_string(),
        source: "src".to_string(),
        target: "dst".to_string(),
    });
    let nodes = (0..node_count)
        .map(|idx| {
            let mut record = GraphRecord::with_capacity(3);
            record.set("id", Value::Long(idx as i64));
            record.set("label", Value::Text(format!("Node{idx}")));
            record.set("weight", Value::Double(rng.gen_range(0.0..1.0)));
            NodeRecord::new(record, key_column.clone())
        })
        .collect();
    let edges = pairs
        .into_iter()
        .enumerate()
        .map(|(idx, (src, dst))| {
            let mut record = GraphRecord::with_capacity(4);
            record.set("id", Value::Long(idx as i64));
            record.set("src", Value::Long(src as i64));
            record.set("dst", Value::Long(dst as i64));
            record.set("weight", Value::Double(rng.gen_range(0.0..1.0)));
            EdgeRecord::new(record, roles.clone())
        })
        .collect();
    ws.set_nodes(nodes);
    ws.set_edges(edges);
    ws
}

/// Copy of `base` with every `stride`-th node removed and all weights redrawn.
pub fn perturb_workspace(base: &GraphWorkspace, stride: usize, seed: u64) -> GraphWorkspace {
    assert!(stride > 1, "stride must exceed 1");
    let mut rng = StdRng::seed_from_u64(seed);
    let removed = |key: Option<String>| {
        key.and_then(|k| k.parse::<usize>().ok())
            .is_some_and(|idx| idx % stride == 0)
    };
    let nodes = base
        .nodes()
        .iter()
        .filter(|n| !removed(n.key()))
        .map(|n| {
            let mut next = n.clone();
            next.record
                .set("weight", Value::Double(rng.gen_range(0.0..1.0)));
            next
        })
        .collect();
    let edges = base
        .edges()
        .iter()
        .filter(|e| !removed(e.source()) && !removed(e.target()))
        .cloned()
        .collect();
    let mut ws = base.clone();
    ws.set_nodes(nodes);
    ws.set_edges(edges);
    ws
}

fn random_pairs(rng: &mut StdRng, node_count: usize, edge_count: usize) -> Vec<(usize, usize)> {
    let max_pairs = node_count * (node_count - 1);
    assert!(edge_count <= max_pairs, "edge_count exceeds possible pairs");
    let mut seen = ahash::AHashSet::with_capacity(edge_count);
    let mut pairs = Vec::with_capacity(edge_count);
    while pairs.len() < edge_count {
        let from = rng.gen_range(0..node_count);
        let to = rng.gen_range(0..node_count);
        if from != to && seen.insert((from, to)) {
            pairs.push((from, to));
        }
    }
    pairs.sort_unstable();
    pairs
}
