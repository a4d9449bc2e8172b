//! String escaping for output and the naive unescape applied on input.
use alloc::vec::Vec;
use core::fmt::Write;

use super::encoder::Sink;

/// Writes `src` with JSON escapes. Bytes from 0x80 up pass through.
pub(crate) fn write_escaped(src: &[u8], out: &mut Sink) -> core::fmt::Result {
    for &b in src {
        match b {
            b'"' => out.write_str("\\\"")?,
            b'\\' => out.write_str("\\\\")?,
            b'\n' => out.write_str("\\n")?,
            b'\r' => out.write_str("\\r")?,
            b'\t' => out.write_str("\\t")?,
            // apostrophes are escaped so output can sit inside single quotes
            b'\'' | 0x00..=0x1f => write!(out, "\\u{:04X}", b)?,
            _ => out.push(b),
        }
    }
    Ok(())
}

fn hex4(digits: &[u8]) -> Option<u32> {
    if digits.len() < 4 {
        return None;
    }
    digits[..4].iter().try_fold(0u32, |acc, &d| {
        let v = char::from(d).to_digit(16)?;
        Some((acc << 4) | v)
    })
}

/// Decodes the escapes of a string body. Each `\uXXXX` is decoded on its
/// own; surrogate halves become U+FFFD. Unknown or truncated escapes are
/// kept verbatim.
pub(crate) fn unescape(src: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(src.len());
    let mut i = 0;
    while i < src.len() {
        let b = src[i];
        if b != b'\\' || i + 1 == src.len() {
            out.push(b);
            i += 1;
            continue;
        }
        let simple = match src[i + 1] {
            b'"' => Some(b'"'),
            b'\\' => Some(b'\\'),
            b'/' => Some(b'/'),
            b'b' => Some(0x08),
            b'f' => Some(0x0c),
            b'n' => Some(b'\n'),
            b'r' => Some(b'\r'),
            b't' => Some(b'\t'),
            _ => None,
        };
        if let Some(c) = simple {
            out.push(c);
            i += 2;
        } else if let Some(code) = src.get(i + 2..).filter(|_| src[i + 1] == b'u').and_then(hex4) {
            let ch = char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER);
            let mut buf = [0u8; 4];
            out.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
            i += 6;
        } else {
            out.extend_from_slice(&src[i..i + 2]);
            i += 2;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn escaped(src: &str) -> alloc::string::String {
        let mut sink = Sink::default();
        write_escaped(src.as_bytes(), &mut sink).unwrap();
        alloc::string::String::from_utf8(sink.into_inner()).unwrap()
    }

    #[test]
    fn escapes_specials() {
        assert_eq!(escaped("a\"b\\c"), r#"a\"b\\c"#);
        assert_eq!(escaped("l1\nl2\r\t"), r"l1\nl2\r\t");
        assert_eq!(escaped("it's"), r"it\u0027s");
        assert_eq!(escaped("\u{1}\u{1f}"), r"\u0001\u001F");
        assert_eq!(escaped("caf\u{e9}"), "caf\u{e9}");
    }

    #[test]
    fn unescapes_known_sequences() {
        assert_eq!(unescape(br#"a\"b\\c\/d\n"#), b"a\"b\\c/d\n");
        assert_eq!(unescape(br"\u0041\u00e9"), "A\u{e9}".as_bytes());
        assert_eq!(unescape(br"\ud83d"), "\u{fffd}".as_bytes());
    }

    #[test]
    fn keeps_unknown_sequences() {
        assert_eq!(unescape(br"\q\u12"), br"\q\u12");
        assert_eq!(unescape(br"end\"), br"end\");
    }
}
