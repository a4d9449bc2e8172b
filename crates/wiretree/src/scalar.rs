//! Conversions between native numbers and the 64-bit stored form.

/// Zig-zag encodes a signed value using sign-magnitude: the magnitude is
/// shifted left and the low bit carries the sign. Magnitudes beyond
/// `i64::MAX` saturate, so `i64::MIN` is stored like `-i64::MAX`.
#[must_use]
pub fn zigzag_encode(n: i64) -> u64 {
    let magnitude = n.unsigned_abs().min(i64::MAX as u64);
    if n < 0 {
        (magnitude << 1) | 1
    } else {
        magnitude << 1
    }
}

/// Inverse of [`zigzag_encode`].
#[must_use]
#[allow(clippy::cast_possible_wrap)]
pub fn zigzag_decode(n: u64) -> i64 {
    let magnitude = (n >> 1) as i64;
    if n & 1 == 1 { -magnitude } else { magnitude }
}

/// Bit pattern of a double.
#[must_use]
pub fn encode_double(value: f64) -> u64 {
    value.to_bits()
}

/// Double from its bit pattern.
#[must_use]
pub fn decode_double(bits: u64) -> f64 {
    f64::from_bits(bits)
}

/// Bit pattern of a float, widened into the low 32 bits.
#[must_use]
pub fn encode_float(value: f32) -> u64 {
    u64::from(value.to_bits())
}

/// Float from the low 32 bits of a stored value.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn decode_float(bits: u64) -> f32 {
    f32::from_bits(bits as u32)
}

#[cfg(test)]
mod tests {
    use quickcheck_macros::quickcheck;
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(0, 0)]
    #[case(1, 2)]
    #[case(-1, 3)]
    #[case(-7, 15)]
    #[case(63, 126)]
    #[case(-64, 129)]
    fn zigzag_known_values(#[case] n: i64, #[case] stored: u64) {
        assert_eq!(zigzag_encode(n), stored);
        assert_eq!(zigzag_decode(stored), n);
    }

    #[test]
    fn zigzag_saturates_min() {
        assert_eq!(zigzag_encode(i64::MIN), zigzag_encode(-i64::MAX));
        assert_eq!(zigzag_decode(zigzag_encode(i64::MIN)), -i64::MAX);
    }

    #[quickcheck]
    fn zigzag_roundtrips(n: i64) -> bool {
        n == i64::MIN || zigzag_decode(zigzag_encode(n)) == n
    }

    #[test]
    fn float_bits_stay_in_low_word() {
        let bits = encode_float(-2.5);
        assert_eq!(bits >> 32, 0);
        assert!((decode_float(bits) + 2.5).abs() < f32::EPSILON);
        assert!((decode_double(encode_double(2.1)) - 2.1).abs() < f64::EPSILON);
    }
}
