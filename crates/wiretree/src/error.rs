use alloc::string::String;

use thiserror::Error;

use crate::{DataType, json::JsonError};

/// Errors returned by [`Tree`](crate::Tree) operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("path is empty")]
    EmptyPath,
    #[error("no node at {0}")]
    NotFound(String),
    #[error("{label} holds a {ty} value and cannot contain children")]
    NotAContainer { label: String, ty: DataType },
    #[error("{0} is a container with children")]
    HasChildren(String),
    #[error("{requested} cannot be used for a node of type {stored}")]
    TypeMismatch {
        requested: DataType,
        stored: DataType,
    },
    #[error("{ty} is not valid for {operation}")]
    InvalidType {
        operation: &'static str,
        ty: DataType,
    },
    #[error("{0} is not a value node")]
    NotARecord(String),
    #[error("label {0:?} contains '/'")]
    InvalidLabel(String),
    #[error("node carries no payload")]
    MissingPayload,
    #[error("stale node handle")]
    StaleHandle,
    #[error("json: {0}")]
    Json(#[from] JsonError),
    #[error("protobuf: {0}")]
    Protobuf(#[from] ProtobufError),
}

/// Protobuf wire decode failures.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtobufError {
    #[error("field at offset {offset} runs past the end of the input")]
    Truncated { offset: usize },
    #[error("malformed varint at offset {offset}")]
    VarintOverflow { offset: usize },
    #[error("unsupported wire type {wire_type} at offset {offset}")]
    UnsupportedWireType { wire_type: u8, offset: usize },
    #[error("invalid field number {field} at offset {offset}")]
    InvalidFieldNumber { field: u64, offset: usize },
}

/// First node found that cannot be rendered as strict JSON.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{path}: {reason}")]
pub struct ValidationError {
    /// Slash-separated path of the offending node.
    pub path: String,
    /// What is wrong with it.
    pub reason: &'static str,
}
