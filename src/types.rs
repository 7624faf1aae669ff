//! Conversions between relational column types, host column types and DDL.
//!
//! Relational types are identified by their JDBC-style type code so that
//! catalogs from any SQL engine can be described uniformly. The mapping into
//! the host's scalar types is total: every code lands somewhere, with
//! [`ScalarType::String`] as the fallback. The mapping from host types into
//! relational codes is partial and fails for anything without a column
//! representation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::GraphBridgeError;

/// Bounded variable-length string type used for every non-numeric column.
pub const STRING_DDL: &str = "NVARCHAR(5000)";

/// Relational column type, keyed by its JDBC type code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SqlType {
    Boolean,
    TinyInt,
    SmallInt,
    Integer,
    BigInt,
    Real,
    Double,
    Decimal,
    Varchar,
    NVarchar,
    Blob,
    /// Placeholder for columns whose type has not been observed yet.
    Other,
}

impl SqlType {
    pub fn code(self) -> i32 {
        match self {
            SqlType::Boolean => 16,
            SqlType::TinyInt => -6,
            SqlType::SmallInt => 5,
            SqlType::Integer => 4,
            SqlType::BigInt => -5,
            SqlType::Real => 7,
            SqlType::Double => 8,
            SqlType::Decimal => 3,
            SqlType::Varchar => 12,
            SqlType::NVarchar => -9,
            SqlType::Blob => 2004,
            SqlType::Other => 1111,
        }
    }

    pub fn from_code(code: i32) -> Self {
        match code {
            16 => SqlType::Boolean,
            -6 => SqlType::TinyInt,
            5 => SqlType::SmallInt,
            4 => SqlType::Integer,
            -5 => SqlType::BigInt,
            7 => SqlType::Real,
            8 => SqlType::Double,
            3 => SqlType::Decimal,
            12 => SqlType::Varchar,
            -9 => SqlType::NVarchar,
            2004 => SqlType::Blob,
            _ => SqlType::Other,
        }
    }

    /// Classifies a declared column type as written in a `CREATE TABLE`.
    pub fn from_declared(decl: &str) -> Self {
        let upper = decl.trim().to_ascii_uppercase();
        let base = upper
            .split('(')
            .next()
            .unwrap_or_default()
            .trim()
            .to_string();
        match base.as_str() {
            "BOOLEAN" | "BOOL" => SqlType::Boolean,
            "TINYINT" => SqlType::TinyInt,
            "SMALLINT" => SqlType::SmallInt,
            "INTEGER" | "INT" | "MEDIUMINT" => SqlType::Integer,
            "BIGINT" | "INT8" => SqlType::BigInt,
            "REAL" | "FLOAT" => SqlType::Real,
            "DOUBLE" | "DOUBLE PRECISION" => SqlType::Double,
            "DECIMAL" | "NUMERIC" => SqlType::Decimal,
            "VARCHAR" | "CHAR" | "CLOB" => SqlType::Varchar,
            "NVARCHAR" | "NCHAR" | "TEXT" | "NCLOB" => SqlType::NVarchar,
            "BLOB" | "VARBINARY" => SqlType::Blob,
            _ => SqlType::Other,
        }
    }

    /// Host scalar type a column of this relational type is materialized as.
    pub fn scalar_type(self) -> ScalarType {
        match self {
            SqlType::Boolean => ScalarType::Boolean,
            SqlType::SmallInt | SqlType::Integer => ScalarType::Integer,
            SqlType::BigInt => ScalarType::Long,
            SqlType::Real | SqlType::Double => ScalarType::Double,
            _ => ScalarType::String,
        }
    }

    /// Relational type used to store a host column of the given type.
    pub fn from_host(host: HostType) -> Result<Self, GraphBridgeError> {
        match host {
            HostType::String => Ok(SqlType::NVarchar),
            HostType::Integer => Ok(SqlType::Integer),
            HostType::Long => Ok(SqlType::BigInt),
            HostType::Double => Ok(SqlType::Double),
            HostType::Boolean => Ok(SqlType::Boolean),
            HostType::List(element) => Err(GraphBridgeError::unsupported_type(format!(
                "List<{element}> has no relational representation"
            ))),
        }
    }

    pub fn ddl(self) -> &'static str {
        self.scalar_type().ddl()
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SqlType::Boolean => "BOOLEAN",
            SqlType::TinyInt => "TINYINT",
            SqlType::SmallInt => "SMALLINT",
            SqlType::Integer => "INTEGER",
            SqlType::BigInt => "BIGINT",
            SqlType::Real => "REAL",
            SqlType::Double => "DOUBLE",
            SqlType::Decimal => "DECIMAL",
            SqlType::Varchar => "VARCHAR",
            SqlType::NVarchar => "NVARCHAR",
            SqlType::Blob => "BLOB",
            SqlType::Other => "OTHER",
        };
        f.write_str(name)
    }
}

/// The limited scalar type set supported by the host graph model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScalarType {
    Boolean,
    Integer,
    Long,
    Double,
    String,
}

impl ScalarType {
    pub fn ddl(self) -> &'static str {
        match self {
            ScalarType::Boolean => "BOOLEAN",
            ScalarType::Integer => "INTEGER",
            ScalarType::Long => "BIGINT",
            ScalarType::Double => "DOUBLE",
            ScalarType::String => STRING_DDL,
        }
    }

    pub fn sql_type(self) -> SqlType {
        match self {
            ScalarType::Boolean => SqlType::Boolean,
            ScalarType::Integer => SqlType::Integer,
            ScalarType::Long => SqlType::BigInt,
            ScalarType::Double => SqlType::Double,
            ScalarType::String => SqlType::NVarchar,
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ScalarType::Boolean => "Boolean",
            ScalarType::Integer => "Integer",
            ScalarType::Long => "Long",
            ScalarType::Double => "Double",
            ScalarType::String => "String",
        };
        f.write_str(name)
    }
}

/// Declared type of a column in the host graph model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HostType {
    Boolean,
    Integer,
    Long,
    Double,
    String,
    List(ScalarType),
}

impl HostType {
    /// Scalar view of the host type; list columns collapse to `String`.
    pub fn scalar_type(self) -> ScalarType {
        match self {
            HostType::Boolean => ScalarType::Boolean,
            HostType::Integer => ScalarType::Integer,
            HostType::Long => ScalarType::Long,
            HostType::Double => ScalarType::Double,
            HostType::String => ScalarType::String,
            HostType::List(_) => ScalarType::String,
        }
    }
}

impl From<ScalarType> for HostType {
    fn from(value: ScalarType) -> Self {
        match value {
            ScalarType::Boolean => HostType::Boolean,
            ScalarType::Integer => HostType::Integer,
            ScalarType::Long => HostType::Long,
            ScalarType::Double => HostType::Double,
            ScalarType::String => HostType::String,
        }
    }
}

impl fmt::Display for HostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostType::List(element) => write!(f, "List<{element}>"),
            other => write!(f, "{}", other.scalar_type()),
        }
    }
}
