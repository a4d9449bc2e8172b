//! LEB128 varints and little-endian fixed-width words.
use alloc::vec::Vec;

use crate::ProtobufError;

/// Longest varint that can carry a `u64`.
pub(crate) const MAX_VARINT_LEN: usize = 10;

/// Encode an unsigned 64-bit integer as LEB128 into `buf`.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn encode_varint(mut value: u64, buf: &mut Vec<u8>) {
    loop {
        let mut byte = (value & 0x7F) as u8;
        value >>= 7;
        if value != 0 {
            byte |= 0x80;
        }
        buf.push(byte);
        if value == 0 {
            break;
        }
    }
}

/// Number of bytes [`encode_varint`] writes for `value`.
#[cfg(test)]
pub(crate) fn varint_len(value: u64) -> usize {
    let bits = 64 - value.leading_zeros() as usize;
    bits.div_ceil(7).max(1)
}

/// Decode a LEB128 unsigned 64-bit integer from `buf` starting at `*pos`.
/// Advances `*pos` past the consumed bytes.
pub(crate) fn decode_varint(buf: &[u8], pos: &mut usize) -> Result<u64, ProtobufError> {
    let start = *pos;
    let mut result: u64 = 0;
    let mut shift: u32 = 0;
    loop {
        let Some(&byte) = buf.get(*pos) else {
            return Err(ProtobufError::Truncated { offset: start });
        };
        *pos += 1;

        let payload = u64::from(byte & 0x7F);
        if *pos - start > MAX_VARINT_LEN || (shift == 63 && payload > 1) {
            return Err(ProtobufError::VarintOverflow { offset: start });
        }
        result |= payload << shift;
        if byte & 0x80 == 0 {
            return Ok(result);
        }
        shift += 7;
    }
}

/// Reads `N` bytes at `*pos` as a little-endian word.
pub(crate) fn decode_fixed<const N: usize>(buf: &[u8], pos: &mut usize) -> Result<u64, ProtobufError> {
    let end = pos.checked_add(N).filter(|&end| end <= buf.len());
    let Some(end) = end else {
        return Err(ProtobufError::Truncated { offset: *pos });
    };
    let mut word = [0u8; 8];
    word[..N].copy_from_slice(&buf[*pos..end]);
    *pos = end;
    Ok(u64::from_le_bytes(word))
}
