use alloc::vec::Vec;
use core::fmt::{self, Write};

use super::escape::write_escaped;
use crate::{
    DataType, NodeId,
    tree::{Cell, Tree, fmt_scalar},
};

/// Byte output that also accepts formatted text.
#[derive(Debug, Default)]
pub(crate) struct Sink {
    buf: Vec<u8>,
}

impl Sink {
    pub(crate) fn push(&mut self, b: u8) {
        self.buf.push(b);
    }

    pub(crate) fn into_inner(self) -> Vec<u8> {
        self.buf
    }
}

impl Write for Sink {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.buf.extend_from_slice(s.as_bytes());
        Ok(())
    }
}

/// Renders a sibling chain as an object, or as an array when `is_array`.
pub(crate) fn write_chain(
    tree: &Tree,
    first: Option<NodeId>,
    is_array: bool,
    out: &mut Sink,
) -> fmt::Result {
    out.push(if is_array { b'[' } else { b'{' });
    for (i, id) in tree.chain(first).enumerate() {
        let Some(node) = tree.get(id) else { continue };
        if i > 0 {
            out.push(b',');
        }
        if !is_array {
            out.push(b'"');
            write_escaped(&node.label, out)?;
            out.write_str("\":")?;
        }
        match &node.cell {
            Cell::Empty | Cell::Text { payload: None, .. } => out.write_str("null")?,
            Cell::Container => write_chain(tree, node.first_child, node.is_array, out)?,
            Cell::Scalar { ty, raw } => fmt_scalar(out, *ty, *raw)?,
            Cell::Text {
                ty: DataType::Unquoted,
                payload: Some(raw),
            } => out.buf.extend_from_slice(raw),
            Cell::Text {
                payload: Some(text), ..
            } => {
                out.push(b'"');
                write_escaped(text, out)?;
                out.push(b'"');
            }
        }
    }
    out.push(if is_array { b']' } else { b'}' });
    Ok(())
}
