use alloc::vec::Vec;

use super::varint::encode_varint;
use crate::{
    NodeId, WireType,
    path::numeric_label,
    tree::{Cell, Tree},
};

/// Largest field number protobuf allows.
pub(crate) const MAX_FIELD_NUMBER: u64 = (1 << 29) - 1;

/// Field number carried by an `f<digits>` label.
pub(crate) fn field_number(label: &[u8]) -> Option<u64> {
    let digits = label.strip_prefix(b"f")?;
    numeric_label(digits).filter(|n| (1..=MAX_FIELD_NUMBER).contains(n))
}

fn write_key(field: u64, wire: WireType, out: &mut Vec<u8>) {
    encode_varint((field << 3) | wire as u64, out);
}

fn write_bytes(field: u64, bytes: &[u8], out: &mut Vec<u8>) {
    write_key(field, WireType::LengthDelimited, out);
    encode_varint(bytes.len() as u64, out);
    out.extend_from_slice(bytes);
}

/// Appends the fields of a sibling chain to `out`.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn write_chain(tree: &Tree, first: Option<NodeId>, out: &mut Vec<u8>) {
    for id in tree.chain(first) {
        let Some(node) = tree.get(id) else { continue };
        let Some(field) = field_number(&node.label) else {
            tracing::trace!(label = %node.label, "skipping member without a field label");
            continue;
        };
        match &node.cell {
            Cell::Empty => {
                tracing::trace!(label = %node.label, "skipping untyped member");
            }
            Cell::Container => {
                let mut body = Vec::new();
                write_chain(tree, node.first_child, &mut body);
                write_bytes(field, &body, out);
            }
            Cell::Text { payload, .. } => {
                write_bytes(field, payload.as_ref().map_or(&[][..], |p| p.as_slice()), out);
            }
            Cell::Scalar { ty, raw } => match ty.wire_type() {
                Some(WireType::Varint) => {
                    write_key(field, WireType::Varint, out);
                    encode_varint(*raw, out);
                }
                Some(WireType::Fixed64) => {
                    write_key(field, WireType::Fixed64, out);
                    out.extend_from_slice(&raw.to_le_bytes());
                }
                Some(WireType::Fixed32) => {
                    write_key(field, WireType::Fixed32, out);
                    out.extend_from_slice(&(*raw as u32).to_le_bytes());
                }
                Some(WireType::LengthDelimited) | None => {}
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_labels() {
        assert_eq!(field_number(b"f1"), Some(1));
        assert_eq!(field_number(b"f536870911"), Some(MAX_FIELD_NUMBER));
        assert_eq!(field_number(b"f536870912"), None);
        assert_eq!(field_number(b"f0"), None);
        assert_eq!(field_number(b"f"), None);
        assert_eq!(field_number(b"f+1"), None);
        assert_eq!(field_number(b"g1"), None);
        assert_eq!(field_number(b"name"), None);
    }
}
