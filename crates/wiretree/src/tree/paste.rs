//! Deep copies between trees and within one tree.
use alloc::string::ToString;

use super::{Cell, NodeId, Parent, Tree};
use crate::{Result, TreeError};

impl Tree {
    /// Copies the top chain of `source` under the node at `path`, which is
    /// created if needed and becomes a container.
    ///
    /// With `merge == false` the destination's previous children are
    /// released first. Either way the destination takes the array or object
    /// shape of `source`. With `merge == true` members are matched by label:
    /// a match has its value and type overwritten and its children merged
    /// the same way, unmatched source members are appended, and
    /// destination-only members are kept.
    ///
    /// # Errors
    ///
    /// The path errors of [`Tree::node`], or [`TreeError::NotAContainer`]
    /// if the destination holds a value.
    pub fn paste_copy(&mut self, path: &str, source: &Tree, merge: bool) -> Result<NodeId> {
        let dest = self.resolve(Parent::Root, path)?;
        self.make_container(dest)?;
        let parent = Parent::Node(dest);
        if !merge {
            self.clear_children(parent);
        }
        self.set_array(parent, source.is_array);
        self.graft(parent, source, source.head, merge, None);
        Ok(dest)
    }

    /// Copies the children of the container at `src` under the node at
    /// `dest` in the same tree.
    ///
    /// When `dest` lies inside `src` the destination node itself is left
    /// out of the copy, so a container can be pasted into one of its own
    /// descendants without recursing into the copy.
    ///
    /// # Errors
    ///
    /// As [`Tree::paste_copy`], plus the errors of [`Tree::find`] for `src`.
    pub fn copy_within(&mut self, dest: &str, src: &str, merge: bool) -> Result<NodeId> {
        let from = self.find(src)?;
        let to = self.resolve(Parent::Root, dest)?;
        let node = self.get(from).ok_or(TreeError::StaleHandle)?;
        let mut snapshot = Tree::new();
        snapshot.is_array = node.is_array;
        snapshot.graft(Parent::Root, self, node.first_child, false, Some(to));

        self.make_container(to)?;
        let parent = Parent::Node(to);
        if !merge {
            self.clear_children(parent);
        }
        self.set_array(parent, snapshot.is_array);
        self.graft(parent, &snapshot, snapshot.head, merge, None);
        Ok(to)
    }

    /// Standalone copy of the children of the container at `path`.
    ///
    /// # Errors
    ///
    /// The errors of [`Tree::find`], or [`TreeError::NotAContainer`] when
    /// `path` names a value node.
    pub fn subtree(&self, path: &str) -> Result<Tree> {
        let id = self.find(path)?;
        let node = self.get(id).ok_or(TreeError::StaleHandle)?;
        if !matches!(node.cell, Cell::Container | Cell::Empty) {
            return Err(TreeError::NotAContainer {
                label: node.label.to_string(),
                ty: node.cell.ty(),
            });
        }
        let mut out = Tree::new();
        out.is_array = node.is_array;
        out.graft(Parent::Root, self, node.first_child, false, None);
        Ok(out)
    }

    /// Copies the `source` chain starting at `first` under `parent`,
    /// leaving out `skip` and its descendants.
    pub(crate) fn graft(
        &mut self,
        parent: Parent,
        source: &Tree,
        first: Option<NodeId>,
        merge: bool,
        skip: Option<NodeId>,
    ) {
        for src_id in source.chain(first) {
            if Some(src_id) == skip {
                continue;
            }
            let Some(src) = source.get(src_id) else {
                continue;
            };
            let existing = if merge {
                self.lookup(parent, &src.label)
            } else {
                None
            };
            let id = match existing {
                Some(id) => {
                    if src.cell != Cell::Container {
                        self.clear_children(Parent::Node(id));
                    }
                    if let Some(node) = self.get_mut(id) {
                        node.cell = src.cell.clone();
                        node.is_array = src.is_array;
                    }
                    id
                }
                None => {
                    let id = self.append(parent, src.label.clone(), src.cell.clone());
                    if src.is_array {
                        self.mark_array(Parent::Node(id));
                    }
                    id
                }
            };
            self.graft(Parent::Node(id), source, src.first_child, merge, skip);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{DataType, Tree};

    fn source() -> Tree {
        let mut tree = Tree::new();
        tree.set_uint(DataType::Uint32, 1, "/a").unwrap();
        tree.set_data(DataType::String, "new", "/b/c").unwrap();
        tree
    }

    #[test]
    fn replace_discards_previous_children() {
        let mut tree = Tree::new();
        tree.set_uint(DataType::Uint32, 9, "/dst/old").unwrap();
        tree.paste_copy("/dst", &source(), false).unwrap();
        assert!(tree.find("/dst/old").is_err());
        assert_eq!(tree.get_uint(DataType::Uint32, "/dst/a").unwrap(), 1);
        assert_eq!(tree.get_data("/dst/b/c").unwrap().unwrap(), "new");
    }

    #[test]
    fn merge_keeps_destination_only_members() {
        let mut tree = Tree::new();
        tree.set_uint(DataType::Uint32, 9, "/dst/old").unwrap();
        tree.set_uint(DataType::Uint32, 5, "/dst/a").unwrap();
        tree.set_data(DataType::String, "kept", "/dst/b/d").unwrap();
        tree.paste_copy("/dst", &source(), true).unwrap();
        assert_eq!(tree.get_uint(DataType::Uint32, "/dst/old").unwrap(), 9);
        assert_eq!(tree.get_uint(DataType::Uint32, "/dst/a").unwrap(), 1);
        assert_eq!(tree.get_data("/dst/b/d").unwrap().unwrap(), "kept");
        assert_eq!(tree.get_data("/dst/b/c").unwrap().unwrap(), "new");
    }

    #[test]
    fn merge_replaces_container_with_value() {
        let mut tree = Tree::new();
        tree.set_uint(DataType::Uint32, 1, "/dst/a/deep").unwrap();
        tree.paste_copy("/dst", &source(), true).unwrap();
        assert!(tree.find("/dst/a/deep").is_err());
        assert_eq!(tree.get_uint(DataType::Uint32, "/dst/a").unwrap(), 1);
    }

    #[test]
    fn paste_onto_value_fails() {
        let mut tree = Tree::new();
        tree.set_uint(DataType::Uint32, 1, "/v").unwrap();
        assert!(tree.paste_copy("/v", &source(), false).is_err());
        assert_eq!(tree.get_uint(DataType::Uint32, "/v").unwrap(), 1);
    }

    #[test]
    fn subtree_is_independent() {
        let mut tree = source();
        let copy = tree.subtree("/b").unwrap();
        tree.remove("/b").unwrap();
        assert_eq!(copy.get_data("/c").unwrap().unwrap(), "new");
        assert!(tree.subtree("/a").is_err());
    }

    #[test]
    fn copy_into_own_descendant_skips_destination() {
        let mut tree = Tree::new();
        tree.set_uint(DataType::Uint32, 1, "/box/x").unwrap();
        tree.copy_within("/box/inner", "/box", false).unwrap();
        assert_eq!(tree.get_uint(DataType::Uint32, "/box/inner/x").unwrap(), 1);
        assert!(tree.find("/box/inner/inner").is_err());
        assert_eq!(tree.node_count(), 4);
    }

    #[test]
    fn copy_within_preserves_arrays() {
        let mut tree = Tree::new();
        tree.set_uint(DataType::Uint32, 1, "/list/+").unwrap();
        tree.set_uint(DataType::Uint32, 2, "/list/+").unwrap();
        tree.copy_within("/other", "/list", false).unwrap();
        assert!(tree.node_is_array(tree.find("/other").unwrap()));
        assert_eq!(tree.get_uint(DataType::Uint32, "/other/1").unwrap(), 2);
        assert_eq!(tree.subtree("/other").unwrap(), tree.subtree("/list").unwrap());
    }

    #[test]
    fn replacing_an_array_with_an_object_drops_array_shape() {
        let mut object = Tree::new();
        object.set_uint(DataType::Uint32, 7, "/a").unwrap();

        let mut tree = Tree::new();
        tree.set_uint(DataType::Uint32, 1, "/list/+").unwrap();
        tree.set_uint(DataType::Uint32, 2, "/list/+").unwrap();
        tree.paste_copy("/list", &object, false).unwrap();
        assert!(!tree.node_is_array(tree.find("/list").unwrap()));
        assert_eq!(tree.to_json(), r#"{"list":{"a":7}}"#);
        assert!(tree.is_valid_json());
    }

    #[test]
    fn copy_within_takes_object_shape() {
        let mut tree = Tree::new();
        tree.set_uint(DataType::Uint32, 1, "/list/+").unwrap();
        tree.set_uint(DataType::Uint32, 7, "/obj/a").unwrap();
        tree.copy_within("/list", "/obj", false).unwrap();
        assert_eq!(tree.to_json(), r#"{"list":{"a":7},"obj":{"a":7}}"#);
        assert!(tree.is_valid_json());
    }
}
