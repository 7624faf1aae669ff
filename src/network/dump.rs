//! JSON-lines snapshot of a [`Network`], one record per line.

use std::{
    fs::File,
    io::{BufRead, BufReader, BufWriter, Write},
    path::Path,
};

use serde::{Deserialize, Serialize};

use crate::{errors::GraphBridgeError, types::HostType, value::Value};

use super::{GraphModel, NAME_COLUMN, Network, SUID_COLUMN, Suid, TableKind};

#[derive(Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum DumpRecord {
    Network {
        suid: Suid,
        name: String,
    },
    Column {
        table: TableKind,
        name: String,
        host_type: HostType,
    },
    Node {
        suid: Suid,
    },
    Edge {
        suid: Suid,
        source: Suid,
        target: Suid,
    },
    Cell {
        table: TableKind,
        row: Suid,
        column: String,
        value: Value,
    },
}

pub fn dump_network_to_path<P: AsRef<Path>>(
    network: &Network,
    path: P,
) -> Result<(), GraphBridgeError> {
    let file =
        File::create(path.as_ref()).map_err(|e| GraphBridgeError::invalid_input(e.to_string()))?;
    dump_network_to_writer(network, BufWriter::new(file))
}

pub fn dump_network_to_writer<W: Write>(
    network: &Network,
    mut writer: W,
) -> Result<(), GraphBridgeError> {
    write_record(
        &mut writer,
        &DumpRecord::Network {
            suid: network.network_suid(),
            name: network.name(),
        },
    )?;
    for table in [TableKind::Network, TableKind::Node, TableKind::Edge] {
        for column in network.columns(table) {
            if column.name == SUID_COLUMN || column.name == NAME_COLUMN {
                continue;
            }
            write_record(
                &mut writer,
                &DumpRecord::Column {
                    table,
                    name: column.name,
                    host_type: column.host_type,
                },
            )?;
        }
    }
    for suid in network.node_ids() {
        write_record(&mut writer, &DumpRecord::Node { suid })?;
    }
    for suid in network.edge_ids() {
        if let Some((source, target)) = network.edge_endpoints(suid) {
            write_record(
                &mut writer,
                &DumpRecord::Edge {
                    suid,
                    source,
                    target,
                },
            )?;
        }
    }
    dump_cells(network, TableKind::Network, &[network.network_suid()], &mut writer)?;
    dump_cells(network, TableKind::Node, &network.node_ids(), &mut writer)?;
    dump_cells(network, TableKind::Edge, &network.edge_ids(), &mut writer)?;
    writer
        .flush()
        .map_err(|e| GraphBridgeError::invalid_input(e.to_string()))
}

fn dump_cells<W: Write>(
    network: &Network,
    table: TableKind,
    rows: &[Suid],
    writer: &mut W,
) -> Result<(), GraphBridgeError> {
    let columns = network.columns(table);
    for &row in rows {
        for column in &columns {
            if column.primary_key {
                continue;
            }
            let value = network.get(table, row, &column.name)?;
            if value.is_null() {
                continue;
            }
            write_record(
                writer,
                &DumpRecord::Cell {
                    table,
                    row,
                    column: column.name.clone(),
                    value,
                },
            )?;
        }
    }
    Ok(())
}

pub fn load_network_from_path<P: AsRef<Path>>(path: P) -> Result<Network, GraphBridgeError> {
    let file =
        File::open(path.as_ref()).map_err(|e| GraphBridgeError::invalid_input(e.to_string()))?;
    load_network_from_reader(BufReader::new(file))
}

pub fn load_network_from_reader<R: BufRead>(reader: R) -> Result<Network, GraphBridgeError> {
    let mut network: Option<Network> = None;
    for line in reader.lines() {
        let line = line.map_err(|e| GraphBridgeError::invalid_input(e.to_string()))?;
        if line.trim().is_empty() {
            continue;
        }
        let record: DumpRecord = serde_json::from_str(&line)
            .map_err(|e| GraphBridgeError::invalid_input(e.to_string()))?;
        if let DumpRecord::Network { suid, name } = record {
            if network.is_some() {
                return Err(GraphBridgeError::invalid_input(
                    "dump contains more than one network record",
                ));
            }
            network = Some(Network::with_suid(suid, &name));
            continue;
        }
        let target = network.as_mut().ok_or_else(|| {
            GraphBridgeError::invalid_input("dump must start with a network record")
        })?;
        match record {
            DumpRecord::Network { .. } => {}
            DumpRecord::Column {
                table,
                name,
                host_type,
            } => {
                target.create_column(table, &name, host_type)?;
            }
            DumpRecord::Node { suid } => target.insert_node_with_suid(suid),
            DumpRecord::Edge {
                suid,
                source,
                target: to,
            } => target.insert_edge_with_suid(suid, source, to)?,
            DumpRecord::Cell {
                table,
                row,
                column,
                value,
            } => {
                if target.column(table, &column).is_none() {
                    return Err(GraphBridgeError::invalid_input(format!(
                        "cell references unknown column {column}"
                    )));
                }
                target.put_raw(table, row, &column, value);
            }
        }
    }
    network.ok_or_else(|| GraphBridgeError::invalid_input("dump is empty"))
}

fn write_record<W: Write>(writer: &mut W, record: &DumpRecord) -> Result<(), GraphBridgeError> {
    serde_json::to_writer(&mut *writer, record)
        .map_err(|e| GraphBridgeError::invalid_input(e.to_string()))?;
    writer
        .write_all(b"\n")
        .map_err(|e| GraphBridgeError::invalid_input(e.to_string()))
}
