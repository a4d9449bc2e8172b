//! Recursive-descent JSON parser writing straight into a [`Tree`].
//!
//! The grammar is lenient the way hand-written configs tend to need: any
//! run of whitespace and `:` separates a label from its value, any run of
//! whitespace and `,` separates members, and trailing commas are accepted.
//! Whatever follows the closing bracket of the document is ignored.
use alloc::{string::ToString, vec::Vec};

use bstr::BString;

use super::{
    JsonError, JsonErrorReason, JsonOptions,
    escape::unescape,
    literal::{self, is_token_byte},
};
use crate::{
    DataType,
    tree::{Cell, Parent, Tree},
};

pub(crate) struct Parser<'a> {
    input: &'a [u8],
    pos: usize,
    options: JsonOptions,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(input: &'a [u8], options: JsonOptions) -> Self {
        Self {
            input,
            pos: 0,
            options,
        }
    }

    /// Parses one document into the chain under `parent`. Returns whether
    /// the document was an array.
    pub(crate) fn document(&mut self, tree: &mut Tree, parent: Parent) -> Result<bool, JsonError> {
        self.skip_whitespace();
        let is_array = match self.peek() {
            Some(b'{') => false,
            Some(b'[') => true,
            _ => return Err(self.error(JsonErrorReason::UnexpectedCharacter)),
        };
        self.pos += 1;
        if is_array {
            tree.mark_array(parent);
        }
        self.members(tree, parent, 0, is_array)?;
        Ok(is_array)
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) {
        self.skip_while(|b| b.is_ascii_whitespace());
    }

    fn skip_while(&mut self, mut pred: impl FnMut(u8) -> bool) {
        while self.peek().is_some_and(&mut pred) {
            self.pos += 1;
        }
    }

    fn error(&self, reason: JsonErrorReason) -> JsonError {
        JsonError::at(reason, self.input, self.pos)
    }

    /// Reports an error detected at this level, dropping what the level
    /// built so far.
    fn fail(&self, tree: &mut Tree, parent: Parent, reason: JsonErrorReason) -> JsonError {
        tree.clear_children(parent);
        self.error(reason)
    }

    /// Parses members up to and including the closing bracket. The opening
    /// bracket has been consumed.
    fn members(&mut self, tree: &mut Tree, parent: Parent, depth: usize, is_array: bool) -> Result<(), JsonError> {
        let (close, unclosed) = if is_array {
            (b']', JsonErrorReason::ExpectedArrayEnd)
        } else {
            (b'}', JsonErrorReason::ExpectedObjectEnd)
        };
        let mut index = 0usize;
        loop {
            self.skip_whitespace();
            match self.peek() {
                None => return Err(self.fail(tree, parent, unclosed)),
                Some(b) if b == close => {
                    self.pos += 1;
                    return Ok(());
                }
                _ => {}
            }

            let label = if is_array {
                index += 1;
                BString::from((index - 1).to_string())
            } else {
                match self.peek() {
                    Some(b'"') => {
                        let raw = self.string().map_err(|e| {
                            tree.clear_children(parent);
                            e
                        })?;
                        self.skip_while(|b| b == b':' || b.is_ascii_whitespace());
                        BString::from(raw)
                    }
                    Some(b) if b.is_ascii_alphanumeric() || b == b'_' => {
                        return Err(self.fail(tree, parent, JsonErrorReason::MissingLabel));
                    }
                    _ => return Err(self.fail(tree, parent, unclosed)),
                }
            };

            self.value(tree, parent, label, depth)?;

            let start = self.pos;
            self.skip_while(|b| b == b',' || b.is_ascii_whitespace());
            let separated = self.input[start..self.pos].contains(&b',');
            if !separated {
                if self.peek() == Some(close) {
                    self.pos += 1;
                    return Ok(());
                }
                return Err(self.fail(tree, parent, unclosed));
            }
        }
    }

    fn value(&mut self, tree: &mut Tree, parent: Parent, label: BString, depth: usize) -> Result<(), JsonError> {
        let cell = match self.peek() {
            Some(open @ (b'{' | b'[')) => {
                if depth >= self.options.max_depth {
                    return Err(self.fail(tree, parent, JsonErrorReason::TooDeep));
                }
                self.pos += 1;
                let id = tree.append(parent, label, Cell::Container);
                let is_array = open == b'[';
                if is_array {
                    tree.mark_array(Parent::Node(id));
                }
                return self.members(tree, Parent::Node(id), depth + 1, is_array);
            }
            Some(b'"') => match self.string() {
                Ok(raw) => Cell::Text {
                    ty: DataType::String,
                    payload: Some(BString::from(raw)),
                },
                Err(e) => {
                    tree.clear_children(parent);
                    return Err(e);
                }
            },
            Some(b) if is_token_byte(b) => {
                let start = self.pos;
                let token = &self.input[start..];
                let len = token.iter().position(|&b| !is_token_byte(b)).unwrap_or(token.len());
                let token = &token[..len];
                let cell = if self.options.unquoted_literals {
                    Some(Cell::Text {
                        ty: DataType::Unquoted,
                        payload: Some(BString::from(token)),
                    })
                } else {
                    keyword(token[0]).or_else(|| literal::number(token))
                };
                match cell {
                    Some(cell) => {
                        self.pos += len;
                        cell
                    }
                    None => return Err(self.fail(tree, parent, JsonErrorReason::UnexpectedCharacter)),
                }
            }
            _ => return Err(self.fail(tree, parent, JsonErrorReason::UnexpectedCharacter)),
        };
        tree.append(parent, label, cell);
        Ok(())
    }

    /// Scans a quoted string at the cursor and returns its unescaped body.
    fn string(&mut self) -> Result<Vec<u8>, JsonError> {
        let open = self.pos;
        let mut i = open + 1;
        while i < self.input.len() {
            match self.input[i] {
                b'\\' => i += 2,
                b'"' => {
                    self.pos = i + 1;
                    return Ok(unescape(&self.input[open + 1..i]));
                }
                _ => i += 1,
            }
        }
        Err(self.error(JsonErrorReason::UnterminatedString))
    }
}

/// `null`, `true` and `false` are recognised by their first letter alone.
fn keyword(first: u8) -> Option<Cell> {
    match first {
        b'n' | b'N' => Some(Cell::Text {
            ty: DataType::String,
            payload: None,
        }),
        b't' | b'T' => Some(Cell::Scalar {
            ty: DataType::Bool,
            raw: 1,
        }),
        b'f' | b'F' => Some(Cell::Scalar {
            ty: DataType::Bool,
            raw: 0,
        }),
        _ => None,
    }
}
