//! Typed reads and writes of value nodes.
use alloc::string::ToString;

use bstr::{BStr, BString, ByteSlice};

use super::{Cell, NodeId, Parent, Tree};
use crate::{
    DataType, Result, TreeError,
    json::literal,
    scalar::{decode_double, decode_float, encode_double, encode_float, zigzag_decode, zigzag_encode},
};

/// A value as a numeric getter sees it.
enum Reading {
    Bits(DataType, u64),
    Length(usize),
}

impl Tree {
    /// Stores an unsigned or unsigned-like value as-is.
    ///
    /// Accepts `int32`, `int64`, `uint32`, `uint64`, `bool`, `enum`,
    /// `64bit`, `fixed64`, `32bit` and `fixed32`.
    ///
    /// # Errors
    ///
    /// [`TreeError::InvalidType`] for any other tag, and the path errors of
    /// [`Tree::node`]. Writing onto a container that still has children is
    /// [`TreeError::HasChildren`].
    pub fn set_uint(&mut self, ty: DataType, value: u64, path: &str) -> Result<NodeId> {
        if !ty.is_unsigned_settable() {
            return Err(TreeError::InvalidType {
                operation: "set_uint",
                ty,
            });
        }
        self.store(path, Cell::Scalar { ty, raw: value })
    }

    /// Stores a boolean.
    ///
    /// # Errors
    ///
    /// As [`Tree::set_uint`].
    pub fn set_bool(&mut self, value: bool, path: &str) -> Result<NodeId> {
        self.set_uint(DataType::Bool, u64::from(value), path)
    }

    /// Stores a signed value zig-zag encoded. Accepts `sint32`, `sint64`,
    /// `sfixed32` and `sfixed64`.
    ///
    /// # Errors
    ///
    /// As [`Tree::set_uint`].
    pub fn set_sint(&mut self, ty: DataType, value: i64, path: &str) -> Result<NodeId> {
        if !ty.is_signed() {
            return Err(TreeError::InvalidType {
                operation: "set_sint",
                ty,
            });
        }
        self.store(path, Cell::Scalar {
            ty,
            raw: zigzag_encode(value),
        })
    }

    /// Stores the bit pattern of a `float` or `double`.
    ///
    /// # Errors
    ///
    /// As [`Tree::set_uint`].
    #[allow(clippy::cast_possible_truncation)]
    pub fn set_real(&mut self, ty: DataType, value: f64, path: &str) -> Result<NodeId> {
        let raw = match ty {
            DataType::Double => encode_double(value),
            DataType::Float => encode_float(value as f32),
            _ => {
                return Err(TreeError::InvalidType {
                    operation: "set_real",
                    ty,
                });
            }
        };
        self.store(path, Cell::Scalar { ty, raw })
    }

    /// Stores a byte payload as `string`, `data` or `unquoted`.
    ///
    /// # Errors
    ///
    /// As [`Tree::set_uint`].
    pub fn set_data(&mut self, ty: DataType, value: impl AsRef<[u8]>, path: &str) -> Result<NodeId> {
        if !ty.is_text() {
            return Err(TreeError::InvalidType {
                operation: "set_data",
                ty,
            });
        }
        self.store(path, Cell::Text {
            ty,
            payload: Some(BString::from(value.as_ref())),
        })
    }

    /// Stores a JSON `null`: a string node without payload.
    ///
    /// # Errors
    ///
    /// As [`Tree::set_uint`].
    pub fn set_null(&mut self, path: &str) -> Result<NodeId> {
        self.store(path, Cell::Text {
            ty: DataType::String,
            payload: None,
        })
    }

    /// Changes the declared type of a value node without touching its bits.
    ///
    /// Used to disambiguate protobuf-decoded values before exporting them.
    /// A text node switched to a numeric type keeps its payload length as
    /// the scalar.
    ///
    /// # Errors
    ///
    /// Fails for containers, for `node`/`unknown` targets, and when
    /// switching to a text type while no payload exists.
    pub fn set_type(&mut self, ty: DataType, path: &str) -> Result<()> {
        if matches!(ty, DataType::Node | DataType::Unknown) {
            return Err(TreeError::InvalidType {
                operation: "set_type",
                ty,
            });
        }
        let id = self.find(path)?;
        let node = self.get_mut(id).ok_or(TreeError::StaleHandle)?;
        let cell = match &mut node.cell {
            Cell::Container => {
                return Err(TreeError::TypeMismatch {
                    requested: ty,
                    stored: DataType::Node,
                });
            }
            Cell::Text {
                payload: Some(payload),
                ..
            } if ty.is_text() => Cell::Text {
                ty,
                payload: Some(core::mem::take(payload)),
            },
            Cell::Text { payload, .. } if !ty.is_text() => Cell::Scalar {
                ty,
                raw: payload.as_ref().map_or(0, |p| p.len() as u64),
            },
            Cell::Scalar { raw, .. } if !ty.is_text() => Cell::Scalar { ty, raw: *raw },
            Cell::Empty if !ty.is_text() => Cell::Scalar { ty, raw: 0 },
            _ => return Err(TreeError::MissingPayload),
        };
        node.cell = cell;
        Ok(())
    }

    /// Stored type tag of the node at `path`.
    ///
    /// # Errors
    ///
    /// As [`Tree::find`].
    pub fn type_at(&self, path: &str) -> Result<DataType> {
        let id = self.find(path)?;
        self.node_type(id).ok_or(TreeError::StaleHandle)
    }

    /// Reads a value through the unsigned accessor.
    ///
    /// Signed values yield their magnitude, floats their truncated absolute
    /// value and text nodes their payload length.
    ///
    /// # Errors
    ///
    /// [`TreeError::TypeMismatch`] for containers and untyped nodes, and the
    /// errors of [`Tree::find`].
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn get_uint(&self, ty: DataType, path: &str) -> Result<u64> {
        Ok(match self.reading(ty, path)? {
            Reading::Length(len) => len as u64,
            Reading::Bits(DataType::Double, raw) => decode_double(raw).abs() as u64,
            Reading::Bits(DataType::Float, raw) => f64::from(decode_float(raw)).abs() as u64,
            Reading::Bits(stored, raw) if stored.is_signed() => raw >> 1,
            Reading::Bits(_, raw) => raw,
        })
    }

    /// Reads a value through the signed accessor. Floats truncate toward
    /// zero.
    ///
    /// # Errors
    ///
    /// As [`Tree::get_uint`], plus [`TreeError::TypeMismatch`] for text.
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    pub fn get_sint(&self, ty: DataType, path: &str) -> Result<i64> {
        Ok(match self.reading(ty, path)? {
            Reading::Length(_) => return Err(self.mismatch(ty, path)),
            Reading::Bits(DataType::Double, raw) => decode_double(raw) as i64,
            Reading::Bits(DataType::Float, raw) => decode_float(raw) as i64,
            Reading::Bits(stored, raw) if stored.is_signed() => zigzag_decode(raw),
            Reading::Bits(_, raw) => raw as i64,
        })
    }

    /// Reads a value as a double.
    ///
    /// # Errors
    ///
    /// As [`Tree::get_sint`].
    #[allow(clippy::cast_precision_loss)]
    pub fn get_real(&self, ty: DataType, path: &str) -> Result<f64> {
        Ok(match self.reading(ty, path)? {
            Reading::Length(_) => return Err(self.mismatch(ty, path)),
            Reading::Bits(DataType::Double, raw) => decode_double(raw),
            Reading::Bits(DataType::Float, raw) => f64::from(decode_float(raw)),
            Reading::Bits(stored, raw) if stored.is_signed() => zigzag_decode(raw) as f64,
            Reading::Bits(_, raw) => raw as f64,
        })
    }

    /// Payload of a text node, `None` for `null`.
    ///
    /// # Errors
    ///
    /// [`TreeError::TypeMismatch`] for anything but `string`, `data` and
    /// `unquoted` nodes, and the errors of [`Tree::find`].
    pub fn get_data(&self, path: &str) -> Result<Option<&BStr>> {
        let id = self.find(path)?;
        match &self.get(id).ok_or(TreeError::StaleHandle)?.cell {
            Cell::Text { payload, .. } => Ok(payload.as_ref().map(|p| p.as_bstr())),
            other => Err(TreeError::TypeMismatch {
                requested: DataType::Data,
                stored: other.ty(),
            }),
        }
    }

    /// Classifies the `unquoted` literal at `path` and stores the result:
    /// integers become `sint64`, floats `double`, `true`/`false` `bool`.
    /// Anything else stays `unquoted`. Returns the resulting type.
    ///
    /// # Errors
    ///
    /// As [`Tree::find`].
    pub fn resolve_unquoted(&mut self, path: &str) -> Result<DataType> {
        let id = self.find(path)?;
        self.commit_unquoted(id).ok_or(TreeError::StaleHandle)
    }

    /// Classifies every `unquoted` literal in the tree.
    pub fn resolve_all_unquoted(&mut self) {
        let mut pending: alloc::vec::Vec<NodeId> = self.top().collect();
        while let Some(id) = pending.pop() {
            self.commit_unquoted(id);
            pending.extend(self.children(id));
        }
    }

    fn commit_unquoted(&mut self, id: NodeId) -> Option<DataType> {
        let node = self.get_mut(id)?;
        let classified = match &node.cell {
            Cell::Text {
                ty: DataType::Unquoted,
                payload: Some(raw),
            } => literal::classify(raw),
            _ => None,
        };
        if let Some(cell) = classified {
            node.cell = cell;
        }
        Some(node.cell.ty())
    }

    /// Resolves `path` for writing and assigns `cell` to the node.
    fn store(&mut self, path: &str, cell: Cell) -> Result<NodeId> {
        let id = self.resolve(Parent::Root, path)?;
        self.assign(id, cell)?;
        Ok(id)
    }

    /// Replaces the value of a node that has no children.
    pub(crate) fn assign(&mut self, id: NodeId, cell: Cell) -> Result<()> {
        let node = self.get_mut(id).ok_or(TreeError::StaleHandle)?;
        if node.first_child.is_some() {
            return Err(TreeError::HasChildren(node.label.to_string()));
        }
        node.cell = cell;
        node.is_array = false;
        Ok(())
    }

    fn reading(&self, requested: DataType, path: &str) -> Result<Reading> {
        let id = self.find(path)?;
        let node = self.get(id).ok_or(TreeError::StaleHandle)?;
        let cell = match &node.cell {
            Cell::Text {
                ty: DataType::Unquoted,
                payload: Some(raw),
            } => literal::classify(raw),
            _ => None,
        };
        match cell.as_ref().unwrap_or(&node.cell) {
            Cell::Scalar { ty, raw } => Ok(Reading::Bits(effective_type(*ty, requested), *raw)),
            Cell::Text { payload, .. } => Ok(Reading::Length(payload.as_ref().map_or(0, |p| p.len()))),
            other => Err(TreeError::TypeMismatch {
                requested,
                stored: other.ty(),
            }),
        }
    }

    fn mismatch(&self, requested: DataType, path: &str) -> TreeError {
        TreeError::TypeMismatch {
            requested,
            stored: self.type_at(path).unwrap_or(DataType::Unknown),
        }
    }
}

/// The tag a stored value is read under.
///
/// Protobuf decoding only records the wire layout, so a wire-generic tag
/// gives way to a requested tag of the same wire type.
fn effective_type(stored: DataType, requested: DataType) -> DataType {
    if stored.is_wire_generic() && requested.is_scalar() && stored.wire_type() == requested.wire_type() {
        requested
    } else {
        stored
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(DataType::Int32, 7)]
    #[case(DataType::Uint64, u64::MAX)]
    #[case(DataType::Enum, 3)]
    #[case(DataType::Fixed32, 0xdead_beef)]
    #[case(DataType::Bits64, 1 << 63)]
    fn unsigned_round_trip(#[case] ty: DataType, #[case] value: u64) {
        let mut tree = Tree::new();
        tree.set_uint(ty, value, "/v").unwrap();
        assert_eq!(tree.get_uint(ty, "/v").unwrap(), value);
        assert_eq!(tree.type_at("/v").unwrap(), ty);
    }

    #[rstest]
    #[case(DataType::Sint32, -1)]
    #[case(DataType::Sint64, i64::MAX)]
    #[case(DataType::Sfixed32, -40)]
    #[case(DataType::Sfixed64, 12)]
    fn signed_round_trip(#[case] ty: DataType, #[case] value: i64) {
        let mut tree = Tree::new();
        tree.set_sint(ty, value, "/v").unwrap();
        assert_eq!(tree.get_sint(ty, "/v").unwrap(), value);
        assert_eq!(tree.get_uint(ty, "/v").unwrap(), value.unsigned_abs());
    }

    #[test]
    fn float_coercions() {
        let mut tree = Tree::new();
        tree.set_real(DataType::Float, -3.75, "/f").unwrap();
        tree.set_real(DataType::Double, 2.1, "/d").unwrap();
        assert_eq!(tree.get_uint(DataType::Float, "/f").unwrap(), 3);
        assert_eq!(tree.get_sint(DataType::Float, "/f").unwrap(), -3);
        assert!((tree.get_real(DataType::Float, "/f").unwrap() + 3.75).abs() < 1e-9);
        assert!((tree.get_real(DataType::Double, "/d").unwrap() - 2.1).abs() < 1e-12);
    }

    #[test]
    fn bool_reads_as_integer() {
        let mut tree = Tree::new();
        tree.set_bool(true, "/b").unwrap();
        assert_eq!(tree.get_sint(DataType::Bool, "/b").unwrap(), 1);
        assert_eq!(tree.get_uint(DataType::Bool, "/b").unwrap(), 1);
    }

    #[test]
    fn text_reads() {
        let mut tree = Tree::new();
        tree.set_data(DataType::String, "abc", "/s").unwrap();
        tree.set_null("/n").unwrap();
        assert_eq!(tree.get_data("/s").unwrap().unwrap(), "abc");
        assert_eq!(tree.get_data("/n").unwrap(), None);
        assert_eq!(tree.get_uint(DataType::String, "/s").unwrap(), 3);
        assert!(matches!(
            tree.get_sint(DataType::Sint64, "/s"),
            Err(TreeError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn setters_reject_wrong_family() {
        let mut tree = Tree::new();
        assert!(tree.set_uint(DataType::Sint32, 1, "/x").is_err());
        assert!(tree.set_sint(DataType::Uint32, 1, "/x").is_err());
        assert!(tree.set_real(DataType::Int64, 1.0, "/x").is_err());
        assert!(tree.set_data(DataType::Bool, "x", "/x").is_err());
        assert!(tree.is_empty());
    }

    #[test]
    fn value_nodes_cannot_be_descended() {
        let mut tree = Tree::new();
        tree.set_uint(DataType::Uint32, 1, "/a").unwrap();
        assert!(matches!(
            tree.set_uint(DataType::Uint32, 2, "/a/b"),
            Err(TreeError::NotAContainer { .. })
        ));
        assert_eq!(tree.node_count(), 1);
    }

    #[test]
    fn containers_with_children_are_not_overwritten() {
        let mut tree = Tree::new();
        tree.set_uint(DataType::Uint32, 1, "/a/b").unwrap();
        assert_eq!(
            tree.set_uint(DataType::Uint32, 2, "/a"),
            Err(TreeError::HasChildren("a".into()))
        );
        tree.remove("/a/b").unwrap();
        tree.set_uint(DataType::Uint32, 2, "/a").unwrap();
        assert_eq!(tree.get_uint(DataType::Uint32, "/a").unwrap(), 2);
    }

    #[test]
    fn set_type_keeps_bits() {
        let mut tree = Tree::new();
        tree.set_uint(DataType::Uint64, 15, "/v").unwrap();
        tree.set_type(DataType::Sint32, "/v").unwrap();
        assert_eq!(tree.get_sint(DataType::Sint32, "/v").unwrap(), -7);

        tree.set_data(DataType::Data, "four", "/s").unwrap();
        tree.set_type(DataType::String, "/s").unwrap();
        assert_eq!(tree.get_data("/s").unwrap().unwrap(), "four");
        tree.set_type(DataType::Uint32, "/s").unwrap();
        assert_eq!(tree.get_uint(DataType::Uint32, "/s").unwrap(), 4);

        assert_eq!(tree.set_type(DataType::String, "/v"), Err(TreeError::MissingPayload));
        assert!(tree.set_type(DataType::Node, "/v").is_err());
    }

    #[test]
    fn wire_generic_values_take_requested_type() {
        let mut tree = Tree::new();
        tree.set_uint(DataType::Fixed64, encode_double(-0.5), "/d").unwrap();
        assert!((tree.get_real(DataType::Double, "/d").unwrap() + 0.5).abs() < 1e-12);
        tree.set_uint(DataType::Uint64, 3, "/z").unwrap();
        assert_eq!(tree.get_sint(DataType::Sint64, "/z").unwrap(), -1);
        // wire types differ, the stored tag wins
        assert_eq!(tree.get_sint(DataType::Sfixed32, "/z").unwrap(), 3);
    }

    #[test]
    fn unquoted_is_classified_lazily() {
        let mut tree = Tree::new();
        tree.set_data(DataType::Unquoted, "-12", "/i").unwrap();
        tree.set_data(DataType::Unquoted, "true1", "/u").unwrap();
        assert_eq!(tree.get_sint(DataType::Sint64, "/i").unwrap(), -12);
        assert_eq!(tree.type_at("/i").unwrap(), DataType::Unquoted);

        tree.resolve_all_unquoted();
        assert_eq!(tree.type_at("/i").unwrap(), DataType::Sint64);
        assert_eq!(tree.type_at("/u").unwrap(), DataType::Unquoted);
        assert_eq!(tree.resolve_unquoted("/u").unwrap(), DataType::Unquoted);
    }
}
