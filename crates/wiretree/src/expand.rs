//! On-demand reinterpretation of a text or binary leaf as a nested tree.
use bstr::BString;

use crate::{
    DataType, JsonOptions, Result, TreeError,
    json::Parser,
    protobuf::read_fields,
    tree::{Cell, NodeId, Parent, Tree},
};

impl Tree {
    /// Parses the JSON document held by the `string`/`data` node at `path`
    /// and replaces the node's value with the resulting children.
    ///
    /// On failure the node is left untouched and the error text is kept
    /// for [`Tree::json_parse_error`].
    ///
    /// # Errors
    ///
    /// The errors of [`Tree::find`], [`TreeError::TypeMismatch`] for other
    /// node types, [`TreeError::MissingPayload`] for `null`, and
    /// [`TreeError::Json`] for malformed payloads.
    pub fn expand_from_json(&mut self, path: &str) -> Result<NodeId> {
        let (id, payload) = self.expandable(path)?;
        let result = Parser::new(&payload, JsonOptions::default()).document(self, Parent::Node(id));
        match result {
            Ok(is_array) => self.commit_expansion(id, is_array),
            Err(_) => self.abandon_expansion(id),
        }
        self.record_json_result(result.map(|_| ()))?;
        Ok(id)
    }

    /// Decodes the embedded message held by the `string`/`data` node at
    /// `path` into children of that node.
    ///
    /// # Errors
    ///
    /// As [`Tree::expand_from_json`], with [`TreeError::Protobuf`] for
    /// malformed payloads.
    pub fn expand_from_protobuf(&mut self, path: &str) -> Result<NodeId> {
        let (id, payload) = self.expandable(path)?;
        if let Err(err) = read_fields(self, Parent::Node(id), &payload) {
            tracing::debug!(path, %err, "payload is not a protobuf message");
            self.abandon_expansion(id);
            return Err(err.into());
        }
        self.commit_expansion(id, false);
        Ok(id)
    }

    /// Finds an expandable node and copies its payload out.
    fn expandable(&self, path: &str) -> Result<(NodeId, BString)> {
        let id = self.find(path)?;
        let node = self.get(id).ok_or(TreeError::StaleHandle)?;
        match &node.cell {
            Cell::Text {
                ty: DataType::String | DataType::Data,
                payload: Some(payload),
            } if node.first_child.is_none() => Ok((id, payload.clone())),
            Cell::Text {
                ty: DataType::String | DataType::Data,
                payload: None,
            } => Err(TreeError::MissingPayload),
            other => Err(TreeError::TypeMismatch {
                requested: DataType::Node,
                stored: other.ty(),
            }),
        }
    }

    fn commit_expansion(&mut self, id: NodeId, is_array: bool) {
        if let Some(node) = self.get_mut(id) {
            node.cell = Cell::Container;
            node.is_array = is_array;
        }
    }

    fn abandon_expansion(&mut self, id: NodeId) {
        self.clear_children(Parent::Node(id));
        if let Some(node) = self.get_mut(id) {
            node.is_array = false;
        }
    }
}
