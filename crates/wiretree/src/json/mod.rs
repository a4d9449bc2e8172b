//! JSON text in and out of a [`Tree`].
mod encoder;
mod error;
mod escape;
pub(crate) mod literal;
mod options;
mod parser;

use alloc::string::{String, ToString};

use bstr::{BString, ByteSlice};

pub(crate) use encoder::{Sink, write_chain};
pub use error::{JsonError, JsonErrorReason};
pub use options::{DEFAULT_MAX_DEPTH, JsonOptions};
pub(crate) use parser::Parser;

use crate::{
    DataType, Result, TreeError, ValidationError,
    path::numeric_label,
    scalar::{decode_double, decode_float},
    tree::{Cell, NodeId, Parent, Tree},
};

impl Tree {
    /// Replaces the content of the tree with a parsed JSON document.
    ///
    /// Numbers become `sint64` or `double`, `true`/`false` become `bool`
    /// and `null` becomes a `string` node without payload.
    ///
    /// # Errors
    ///
    /// On malformed input. The container that failed is emptied, its
    /// ancestors keep the members parsed before it, and the error text is
    /// kept for [`Tree::json_parse_error`].
    pub fn from_json(&mut self, input: impl AsRef<[u8]>) -> Result<(), JsonError> {
        self.from_json_with(input, JsonOptions::default())
    }

    /// Like [`Tree::from_json`], but keeps every bare scalar as an
    /// `unquoted` literal.
    ///
    /// # Errors
    ///
    /// As [`Tree::from_json`].
    pub fn from_json_unquoted(&mut self, input: impl AsRef<[u8]>) -> Result<(), JsonError> {
        self.from_json_with(input, JsonOptions {
            unquoted_literals: true,
            ..JsonOptions::default()
        })
    }

    /// Parses with explicit [`JsonOptions`].
    ///
    /// # Errors
    ///
    /// As [`Tree::from_json`].
    pub fn from_json_with(&mut self, input: impl AsRef<[u8]>, options: JsonOptions) -> Result<(), JsonError> {
        self.clear();
        let result = Parser::new(input.as_ref(), options).document(self, Parent::Root);
        self.record_json_result(result.map(|_| ()))
    }

    pub(crate) fn record_json_result(&mut self, result: Result<(), JsonError>) -> Result<(), JsonError> {
        match &result {
            Ok(()) => self.json_error = None,
            Err(err) => {
                tracing::debug!(%err, "json parse failed");
                self.json_error = Some(err.to_string());
            }
        }
        result
    }

    /// Text of the last JSON parse error on this tree, `"OK"` if the last
    /// parse succeeded or nothing was parsed.
    #[must_use]
    pub fn json_parse_error(&self) -> &str {
        self.json_error.as_deref().unwrap_or("OK")
    }

    /// Renders the tree. An empty tree renders as `{}`.
    #[must_use]
    pub fn to_json(&self) -> BString {
        let mut out = Sink::default();
        // writing into memory cannot fail
        let _ = write_chain(self, self.head(), self.is_array, &mut out);
        BString::from(out.into_inner())
    }

    /// Renders the container at `path`.
    ///
    /// # Errors
    ///
    /// The errors of [`Tree::find`], or [`TreeError::NotAContainer`] for a
    /// value node.
    pub fn to_json_at(&self, path: &str) -> Result<BString> {
        let id = self.find(path)?;
        let node = self.get(id).ok_or(TreeError::StaleHandle)?;
        if !matches!(node.cell, Cell::Container | Cell::Empty) {
            return Err(TreeError::NotAContainer {
                label: node.label.to_string(),
                ty: node.cell.ty(),
            });
        }
        let mut out = Sink::default();
        let _ = write_chain(self, node.first_child, node.is_array, &mut out);
        Ok(BString::from(out.into_inner()))
    }

    /// Checks that the tree renders as strict JSON: every value node has a
    /// definite type, every array element has a positional label and no
    /// float or double is NaN or infinite.
    ///
    /// # Errors
    ///
    /// The first offending node in document order.
    pub fn validate_json(&self) -> Result<(), ValidationError> {
        let mut path = String::new();
        self.validate_chain(self.head(), self.is_array, &mut path)
    }

    /// `true` when [`Tree::validate_json`] passes.
    #[must_use]
    pub fn is_valid_json(&self) -> bool {
        self.validate_json().is_ok()
    }

    fn validate_chain(&self, first: Option<NodeId>, is_array: bool, path: &mut String) -> Result<(), ValidationError> {
        for id in self.chain(first) {
            let Some(node) = self.get(id) else { continue };
            let len = path.len();
            path.push('/');
            path.push_str(&node.label.to_str_lossy());
            let reason = match &node.cell {
                _ if is_array && numeric_label(&node.label).is_none() => Some("array element without a positional label"),
                Cell::Empty => Some("value has no type"),
                Cell::Text {
                    ty: DataType::Unquoted,
                    ..
                } => Some("unquoted literal is not resolved"),
                Cell::Scalar {
                    ty: DataType::Double,
                    raw,
                } if !decode_double(*raw).is_finite() => Some("number is not finite"),
                Cell::Scalar {
                    ty: DataType::Float,
                    raw,
                } if !decode_float(*raw).is_finite() => Some("number is not finite"),
                _ => None,
            };
            if let Some(reason) = reason {
                return Err(ValidationError {
                    path: path.clone(),
                    reason,
                });
            }
            self.validate_chain(node.first_child, node.is_array, path)?;
            path.truncate(len);
        }
        Ok(())
    }
}
