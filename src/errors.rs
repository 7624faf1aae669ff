use std::fmt;

use thiserror::Error;

/// Which end of an edge failed to resolve.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Endpoint {
    Source,
    Target,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Source => f.write_str("source"),
            Endpoint::Target => f.write_str("target"),
        }
    }
}

/// Error type for graphbridge operations.
#[derive(Debug, Error)]
pub enum GraphBridgeError {
    #[error("connection error: {0}")]
    ConnectionError(String),
    #[error("query error: {message} (statement: {statement})")]
    QueryError { statement: String, message: String },
    #[error("schema error: {0}")]
    SchemaError(String),
    #[error("incomplete graph workspace definition: {0}")]
    IncompleteWorkspaceDefinition(String),
    #[error("{endpoint} node with key {key} does not exist")]
    DanglingEdgeReference { endpoint: Endpoint, key: String },
    #[error("unsupported type: {0}")]
    UnsupportedType(String),
    #[error("invalid advanced option: {0}")]
    InvalidAdvancedOption(String),
    #[error("cannot cast {value} to {target}")]
    TypeMismatch { value: String, target: String },
    #[error("configuration error: {0}")]
    ConfigError(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl GraphBridgeError {
    pub fn connection<T: Into<String>>(msg: T) -> Self {
        GraphBridgeError::ConnectionError(msg.into())
    }

    pub fn query<S: Into<String>, T: ToString>(statement: S, err: T) -> Self {
        GraphBridgeError::QueryError {
            statement: statement.into(),
            message: err.to_string(),
        }
    }

    pub fn schema<T: Into<String>>(msg: T) -> Self {
        GraphBridgeError::SchemaError(msg.into())
    }

    pub fn incomplete_workspace<T: Into<String>>(msg: T) -> Self {
        GraphBridgeError::IncompleteWorkspaceDefinition(msg.into())
    }

    pub fn dangling_edge<T: Into<String>>(endpoint: Endpoint, key: T) -> Self {
        GraphBridgeError::DanglingEdgeReference {
            endpoint,
            key: key.into(),
        }
    }

    pub fn unsupported_type<T: Into<String>>(msg: T) -> Self {
        GraphBridgeError::UnsupportedType(msg.into())
    }

    pub fn invalid_advanced_option<T: Into<String>>(msg: T) -> Self {
        GraphBridgeError::InvalidAdvancedOption(msg.into())
    }

    pub fn type_mismatch<V: Into<String>, T: Into<String>>(value: V, target: T) -> Self {
        GraphBridgeError::TypeMismatch {
            value: value.into(),
            target: target.into(),
        }
    }

    pub fn config<T: Into<String>>(msg: T) -> Self {
        GraphBridgeError::ConfigError(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        GraphBridgeError::NotFound(msg.into())
    }

    pub fn invalid_input<T: Into<String>>(msg: T) -> Self {
        GraphBridgeError::InvalidInput(msg.into())
    }
}
