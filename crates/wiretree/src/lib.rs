//! A schema-less, hierarchical data tree that moves data between JSON text
//! and Protocol Buffers wire bytes.
//!
//! A [`Tree`] is populated through `/`-separated paths, imported from JSON or
//! protobuf, and exported to either format. Every scalar is stored the way
//! protobuf stores it on the wire (zig-zag signed integers, raw IEEE bit
//! patterns for floats), so a value takes the same shape whichever codec it
//! later travels through.
//!
//! ```rust
//! use wiretree::{DataType, Tree};
//!
//! let mut tree = Tree::new();
//! tree.set_uint(DataType::Uint32, 5, "/records").unwrap();
//! tree.set_sint(DataType::Sint64, -2, "/array/+/second").unwrap();
//! tree.set_data(DataType::String, "text", "/data/string").unwrap();
//! assert_eq!(
//!     tree.to_json(),
//!     r#"{"records":5,"array":[{"second":-2}],"data":{"string":"text"}}"#
//! );
//! ```
//!
//! Protobuf decoding is type-oblivious: varints come back as `uint64`,
//! fixed-width fields as `fixed32`/`fixed64` and length-delimited fields as
//! opaque `data`. A typed read picks the intended interpretation, and
//! [`Tree::expand_from_protobuf`] turns an embedded message blob into a
//! navigable subtree on demand.
//!
//! ```rust
//! use wiretree::{DataType, Tree};
//!
//! let mut msg = Tree::new();
//! msg.set_sint(DataType::Sint32, -7, "/f1").unwrap();
//! msg.set_data(DataType::String, "inner", "/f2/f1").unwrap();
//!
//! let mut decoded = Tree::new();
//! decoded.from_protobuf(&msg.to_protobuf()).unwrap();
//! assert_eq!(decoded.get_sint(DataType::Sint32, "/f1").unwrap(), -7);
//!
//! decoded.expand_from_protobuf("/f2").unwrap();
//! assert_eq!(decoded.get_data("/f2/f1").unwrap().unwrap(), "inner");
//! ```

#![no_std]
extern crate alloc;

#[cfg(test)]
extern crate std;

mod data_type;
mod error;
mod expand;
mod json;
mod path;
mod protobuf;
mod scalar;
mod tree;

#[cfg(test)]
mod tests;

pub use data_type::{DataType, WireType};
pub use error::{ProtobufError, TreeError, ValidationError};
pub use json::{DEFAULT_MAX_DEPTH, JsonError, JsonErrorReason, JsonOptions};
pub use scalar::{decode_double, decode_float, encode_double, encode_float, zigzag_decode, zigzag_encode};
pub use tree::{NodeId, Siblings, Tree};

/// Convenience alias for results produced by [`Tree`] operations.
pub type Result<T, E = TreeError> = core::result::Result<T, E>;
