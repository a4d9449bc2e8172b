//! The closed set of type tags a node can carry.
//!
//! A tag says how the node's stored bits are to be read, not how they are
//! laid out: every numeric tag shares one 64-bit cell, and the tag decides
//! whether that cell is read as a plain integer, a zig-zag signed integer or
//! an IEEE bit pattern.
use core::fmt;

/// Type tag of a node.
///
/// The numeric tags mirror the protobuf scalar types. `Bits64`/`Bits32` are
/// untyped raw 64/32-bit values, `Data` is opaque binary, `Node` marks a
/// container, `Unquoted` holds a raw JSON fragment that has not been
/// classified yet and `Unknown` marks a node nobody has assigned a value to.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Int32,
    Int64,
    Uint32,
    Uint64,
    Sint32,
    Sint64,
    Bool,
    Enum,
    Bits64,
    Fixed64,
    Sfixed64,
    Double,
    String,
    Data,
    Bits32,
    Fixed32,
    Sfixed32,
    Float,
    Node,
    Unquoted,
    Unknown,
}

/// Protobuf wire type, the 3-bit encoding category of a field.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum WireType {
    Varint = 0,
    Fixed64 = 1,
    LengthDelimited = 2,
    Fixed32 = 5,
}

impl WireType {
    /// Maps the low three bits of a field key to a supported wire type.
    #[must_use]
    pub fn from_bits(bits: u64) -> Option<Self> {
        match bits {
            0 => Some(Self::Varint),
            1 => Some(Self::Fixed64),
            2 => Some(Self::LengthDelimited),
            5 => Some(Self::Fixed32),
            _ => None,
        }
    }
}

impl DataType {
    /// Wire type used when a node of this type is written as a protobuf
    /// field. `None` for tags that never produce a field of their own.
    #[must_use]
    pub const fn wire_type(self) -> Option<WireType> {
        match self {
            Self::Int32
            | Self::Int64
            | Self::Uint32
            | Self::Uint64
            | Self::Sint32
            | Self::Sint64
            | Self::Bool
            | Self::Enum => Some(WireType::Varint),
            Self::Bits64 | Self::Fixed64 | Self::Sfixed64 | Self::Double => Some(WireType::Fixed64),
            Self::Bits32 | Self::Fixed32 | Self::Sfixed32 | Self::Float => Some(WireType::Fixed32),
            Self::String | Self::Data | Self::Unquoted | Self::Node => Some(WireType::LengthDelimited),
            Self::Unknown => None,
        }
    }

    /// `true` for tags whose value lives in the 64-bit scalar cell.
    #[must_use]
    pub const fn is_scalar(self) -> bool {
        !matches!(
            self,
            Self::String | Self::Data | Self::Unquoted | Self::Node | Self::Unknown
        )
    }

    /// `true` for tags whose value is a byte payload.
    #[must_use]
    pub const fn is_text(self) -> bool {
        matches!(self, Self::String | Self::Data | Self::Unquoted)
    }

    /// `true` for tags stored zig-zag encoded.
    #[must_use]
    pub const fn is_signed(self) -> bool {
        matches!(
            self,
            Self::Sint32 | Self::Sint64 | Self::Sfixed32 | Self::Sfixed64
        )
    }

    /// Tags accepted by [`Tree::set_uint`](crate::Tree::set_uint).
    #[must_use]
    pub const fn is_unsigned_settable(self) -> bool {
        matches!(
            self,
            Self::Int32
                | Self::Int64
                | Self::Uint32
                | Self::Uint64
                | Self::Bool
                | Self::Enum
                | Self::Bits64
                | Self::Fixed64
                | Self::Bits32
                | Self::Fixed32
        )
    }

    /// Tags that only record a wire layout. Reads through one of these may
    /// reinterpret the bits under any requested tag with the same wire type.
    #[must_use]
    pub const fn is_wire_generic(self) -> bool {
        matches!(
            self,
            Self::Uint64 | Self::Fixed64 | Self::Fixed32 | Self::Bits64 | Self::Bits32
        )
    }

    /// Lower-case name, as used in dumps and error messages.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Uint32 => "uint32",
            Self::Uint64 => "uint64",
            Self::Sint32 => "sint32",
            Self::Sint64 => "sint64",
            Self::Bool => "bool",
            Self::Enum => "enum",
            Self::Bits64 => "64bit",
            Self::Fixed64 => "fixed64",
            Self::Sfixed64 => "sfixed64",
            Self::Double => "double",
            Self::String => "string",
            Self::Data => "data",
            Self::Bits32 => "32bit",
            Self::Fixed32 => "fixed32",
            Self::Sfixed32 => "sfixed32",
            Self::Float => "float",
            Self::Node => "node",
            Self::Unquoted => "unquoted",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(DataType::Bool, Some(WireType::Varint))]
    #[case(DataType::Sint64, Some(WireType::Varint))]
    #[case(DataType::Double, Some(WireType::Fixed64))]
    #[case(DataType::Sfixed64, Some(WireType::Fixed64))]
    #[case(DataType::Float, Some(WireType::Fixed32))]
    #[case(DataType::Data, Some(WireType::LengthDelimited))]
    #[case(DataType::Unknown, None)]
    fn wire_type_by_tag(#[case] ty: DataType, #[case] expected: Option<WireType>) {
        assert_eq!(ty.wire_type(), expected);
    }

    #[test]
    fn unsupported_wire_bits() {
        for bits in [3, 4, 6, 7] {
            assert_eq!(WireType::from_bits(bits), None);
        }
        assert_eq!(WireType::from_bits(5), Some(WireType::Fixed32));
    }

    #[test]
    fn only_layout_tags_are_generic() {
        assert!(DataType::Uint64.is_wire_generic());
        assert!(DataType::Fixed32.is_wire_generic());
        assert!(!DataType::Sint64.is_wire_generic());
        assert!(!DataType::Double.is_wire_generic());
    }
}
