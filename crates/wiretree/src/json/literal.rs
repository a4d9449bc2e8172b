//! Classification of bare (unquoted) scalar tokens.
use crate::{
    DataType,
    scalar::{encode_double, zigzag_encode},
    tree::Cell,
};

/// Bytes that continue a bare token.
pub(crate) fn is_token_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'.' | b'+' | b'-')
}

/// Parses a number token.
///
/// A token containing `.`, `e` or `E` is a double, anything else a signed
/// 64-bit integer. Integers that do not fit fall back to double. A token
/// that overflows to infinity is not a number.
pub(crate) fn number(token: &[u8]) -> Option<Cell> {
    let text = core::str::from_utf8(token).ok()?;
    if !text.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    if text.bytes().any(|b| matches!(b, b'.' | b'e' | b'E')) {
        return finite(text).map(double);
    }
    match text.parse::<i64>() {
        Ok(n) => Some(Cell::Scalar {
            ty: DataType::Sint64,
            raw: zigzag_encode(n),
        }),
        Err(_) => finite(text).map(double),
    }
}

fn finite(text: &str) -> Option<f64> {
    text.parse().ok().filter(|v: &f64| v.is_finite())
}

fn double(value: f64) -> Cell {
    Cell::Scalar {
        ty: DataType::Double,
        raw: encode_double(value),
    }
}

/// Resolves an `unquoted` literal: integer, then double, then boolean.
/// `None` leaves the literal unquoted.
pub(crate) fn classify(token: &[u8]) -> Option<Cell> {
    number(token).or_else(|| match token {
        b"true" => Some(Cell::Scalar {
            ty: DataType::Bool,
            raw: 1,
        }),
        b"false" => Some(Cell::Scalar {
            ty: DataType::Bool,
            raw: 0,
        }),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::scalar::zigzag_encode;

    #[rstest]
    #[case(b"12", Some((DataType::Sint64, zigzag_encode(12))))]
    #[case(b"-2", Some((DataType::Sint64, 5)))]
    #[case(b"+7", Some((DataType::Sint64, 14)))]
    #[case(b"3.1", Some((DataType::Double, encode_double(3.1))))]
    #[case(b"1e3", Some((DataType::Double, encode_double(1000.0))))]
    #[case(b"true", Some((DataType::Bool, 1)))]
    #[case(b"false", Some((DataType::Bool, 0)))]
    #[case(b"true1", None)]
    #[case(b"1.2.3", None)]
    #[case(b"inf", None)]
    #[case(b"1e400", None)]
    #[case(b"-1e999", None)]
    #[case(b"$(unq)", None)]
    fn classifies(#[case] token: &[u8], #[case] expected: Option<(DataType, u64)>) {
        let got = classify(token).map(|cell| match cell {
            Cell::Scalar { ty, raw } => (ty, raw),
            other => panic!("unexpected {other:?}"),
        });
        assert_eq!(got, expected);
    }

    #[test]
    fn oversized_integer_becomes_double() {
        assert_eq!(
            number(b"18446744073709551616"),
            Some(double(18_446_744_073_709_551_616.0))
        );
    }
}
