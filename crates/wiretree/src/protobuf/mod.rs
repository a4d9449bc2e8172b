//! Protocol Buffers wire bytes in and out of a [`Tree`].
//!
//! Only members labeled `f<number>` are fields; every other member is
//! invisible to the encoder. Decoding cannot tell an embedded message from a
//! byte string, so length-delimited fields come back as `data` until
//! [`Tree::expand_from_protobuf`] is asked to parse one.
mod decoder;
mod encoder;
mod varint;

use alloc::{string::ToString, vec::Vec};

pub(crate) use decoder::read_fields;

use crate::{
    ProtobufError, Result, TreeError,
    tree::{Cell, Parent, Tree},
};

impl Tree {
    /// Encodes the top chain as a protobuf message.
    #[must_use]
    pub fn to_protobuf(&self) -> Vec<u8> {
        let mut out = Vec::new();
        encoder::write_chain(self, self.head(), &mut out);
        out
    }

    /// Encodes the children of the container at `path` as a message.
    ///
    /// # Errors
    ///
    /// The errors of [`Tree::find`], or [`TreeError::NotAContainer`] for a
    /// value node.
    pub fn to_protobuf_at(&self, path: &str) -> Result<Vec<u8>> {
        let id = self.find(path)?;
        let node = self.get(id).ok_or(TreeError::StaleHandle)?;
        if !matches!(node.cell, Cell::Container | Cell::Empty) {
            return Err(TreeError::NotAContainer {
                label: node.label.to_string(),
                ty: node.cell.ty(),
            });
        }
        let mut out = Vec::new();
        encoder::write_chain(self, node.first_child, &mut out);
        Ok(out)
    }

    /// Replaces the content of the tree with a decoded message.
    ///
    /// # Errors
    ///
    /// On truncated or malformed input; the tree is left empty.
    pub fn from_protobuf(&mut self, bytes: impl AsRef<[u8]>) -> Result<(), ProtobufError> {
        self.clear();
        let result = read_fields(self, Parent::Root, bytes.as_ref());
        if let Err(err) = &result {
            tracing::warn!(%err, "protobuf decode failed");
            self.clear();
        }
        result
    }
}
