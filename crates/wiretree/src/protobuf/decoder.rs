use alloc::format;

use bstr::BString;

use super::{
    encoder::MAX_FIELD_NUMBER,
    varint::{decode_fixed, decode_varint},
};
use crate::{
    DataType, ProtobufError, WireType,
    tree::{Cell, Parent, Tree},
};

/// Decodes every field of `buf` into `parent`'s chain.
///
/// Decoding is type-oblivious: varints become `uint64`, fixed-width words
/// `fixed64`/`fixed32` and length-delimited fields opaque `data`.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn read_fields(tree: &mut Tree, parent: Parent, buf: &[u8]) -> Result<(), ProtobufError> {
    let mut pos = 0;
    while pos < buf.len() {
        let offset = pos;
        let key = decode_varint(buf, &mut pos)?;
        let wire = WireType::from_bits(key & 0x7).ok_or(ProtobufError::UnsupportedWireType {
            wire_type: (key & 0x7) as u8,
            offset,
        })?;
        let field = key >> 3;
        if field == 0 || field > MAX_FIELD_NUMBER {
            return Err(ProtobufError::InvalidFieldNumber { field, offset });
        }
        let cell = match wire {
            WireType::Varint => Cell::Scalar {
                ty: DataType::Uint64,
                raw: decode_varint(buf, &mut pos)?,
            },
            WireType::Fixed64 => Cell::Scalar {
                ty: DataType::Fixed64,
                raw: decode_fixed::<8>(buf, &mut pos)?,
            },
            WireType::Fixed32 => Cell::Scalar {
                ty: DataType::Fixed32,
                raw: decode_fixed::<4>(buf, &mut pos)?,
            },
            WireType::LengthDelimited => {
                let len_offset = pos;
                let len = decode_varint(buf, &mut pos)?;
                let end = usize::try_from(len)
                    .ok()
                    .and_then(|len| pos.checked_add(len))
                    .filter(|&end| end <= buf.len())
                    .ok_or(ProtobufError::Truncated { offset: len_offset })?;
                let payload = BString::from(&buf[pos..end]);
                pos = end;
                Cell::Text {
                    ty: DataType::Data,
                    payload: Some(payload),
                }
            }
        };
        tree.append(parent, format!("f{field}").into(), cell);
    }
    Ok(())
}
