//! The node arena and the path resolver every other operation goes through.
//!
//! Nodes live in a slot vector and link to each other with [`NodeId`]
//! handles forming a first-child / next-sibling tree. Each slot carries a
//! generation that is bumped when its node is released, so a handle kept
//! across a `remove` or `clear` is detected instead of silently aliasing
//! whatever reuses the slot.
mod access;
mod paste;

use alloc::{
    string::{String, ToString},
    vec::Vec,
};
use core::fmt;

use bstr::{BStr, BString, ByteSlice};

use crate::{
    DataType, Result, TreeError,
    path::{self, Segment},
    scalar::{decode_double, decode_float, zigzag_decode},
};

/// Handle to a node of a [`Tree`].
///
/// Handles stay valid until the node is removed or the tree is cleared.
/// Looking up a released handle returns `None` (or
/// [`TreeError::StaleHandle`]) even if its slot has been reused since.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

/// What a node holds.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Cell {
    /// Created by path resolution, no value assigned yet.
    Empty,
    Container,
    /// Every numeric tag shares this 64-bit cell.
    Scalar { ty: DataType, raw: u64 },
    /// `payload: None` is the JSON `null`.
    Text {
        ty: DataType,
        payload: Option<BString>,
    },
}

impl Cell {
    pub(crate) fn ty(&self) -> DataType {
        match self {
            Cell::Empty => DataType::Unknown,
            Cell::Container => DataType::Node,
            Cell::Scalar { ty, .. } | Cell::Text { ty, .. } => *ty,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) label: BString,
    pub(crate) cell: Cell,
    pub(crate) is_array: bool,
    pub(crate) first_child: Option<NodeId>,
    last_child: Option<NodeId>,
    next: Option<NodeId>,
}

impl Node {
    fn new(label: BString, cell: Cell) -> Self {
        Self {
            label,
            cell,
            is_array: false,
            first_child: None,
            last_child: None,
            next: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// Where a sibling chain hangs: the tree's own top chain or a container's
/// children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Parent {
    Root,
    Node(NodeId),
}

/// A hierarchical, dynamically typed data tree.
///
/// The tree owns a top-level chain of nodes that renders as a JSON object
/// (or as an array, see [`Tree::is_array`]) and as the fields of a protobuf
/// message.
#[derive(Clone, Default)]
pub struct Tree {
    slots: Vec<Slot>,
    free: Vec<u32>,
    head: Option<NodeId>,
    tail: Option<NodeId>,
    pub(crate) is_array: bool,
    pub(crate) json_error: Option<String>,
}

/// Iterator over a sibling chain, see [`Tree::children`] and [`Tree::top`].
#[derive(Debug, Clone)]
pub struct Siblings<'a> {
    tree: &'a Tree,
    next: Option<NodeId>,
}

impl Iterator for Siblings<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.next?;
        self.next = self.tree.get(id).and_then(|n| n.next);
        Some(id)
    }
}

impl Tree {
    /// Creates an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Releases every node. The last JSON parse error is kept until the
    /// next JSON parse.
    pub fn clear(&mut self) {
        let head = self.head.take();
        self.tail = None;
        self.release_chain(head);
        self.is_array = false;
    }

    /// `true` when the tree has no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// `true` when the top chain holds array elements rather than members.
    #[must_use]
    pub fn is_array(&self) -> bool {
        self.is_array
    }

    /// Number of live nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// First node of the top chain.
    #[must_use]
    pub fn head(&self) -> Option<NodeId> {
        self.head
    }

    /// Iterates the top chain.
    #[must_use]
    pub fn top(&self) -> Siblings<'_> {
        self.chain(self.head)
    }

    /// Iterates the children of `id`. Empty for value nodes and stale
    /// handles.
    #[must_use]
    pub fn children(&self, id: NodeId) -> Siblings<'_> {
        self.chain(self.get(id).and_then(|n| n.first_child))
    }

    /// First child of a container.
    #[must_use]
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?.first_child
    }

    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?.next
    }

    /// Label bytes of `id`, kept exactly as parsed.
    #[must_use]
    pub fn label(&self, id: NodeId) -> Option<&BStr> {
        self.get(id).map(|n| n.label.as_bstr())
    }

    /// Stored type tag of `id`.
    #[must_use]
    pub fn node_type(&self, id: NodeId) -> Option<DataType> {
        self.get(id).map(|n| n.cell.ty())
    }

    #[must_use]
    pub fn node_is_array(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(|n| n.is_array)
    }

    /// Resolves `path`, creating every missing node on the way.
    ///
    /// Intermediate nodes become containers. The final node is left as it
    /// was, or untyped if it had to be created.
    ///
    /// # Errors
    ///
    /// Fails on an empty path, or when the path descends through a node that
    /// already holds a value. Nothing is created in that case.
    pub fn node(&mut self, path: &str) -> Result<NodeId> {
        self.resolve(Parent::Root, path)
    }

    /// Resolves `path` without creating anything.
    ///
    /// # Errors
    ///
    /// [`TreeError::NotFound`] if any segment is missing, `+` is used, or
    /// `*` finds no array element.
    pub fn find(&self, path: &str) -> Result<NodeId> {
        self.locate(Parent::Root, path).map(|(_, id)| id)
    }

    /// Resolves `path` relative to the container `node`.
    ///
    /// # Errors
    ///
    /// As [`Tree::find`], plus [`TreeError::StaleHandle`].
    pub fn find_in(&self, node: NodeId, path: &str) -> Result<NodeId> {
        self.get(node).ok_or(TreeError::StaleHandle)?;
        self.locate(Parent::Node(node), path).map(|(_, id)| id)
    }

    /// Resolves `path` and insists it names a value node.
    ///
    /// # Errors
    ///
    /// As [`Tree::find`], plus [`TreeError::NotARecord`] for containers.
    pub fn find_record(&self, path: &str) -> Result<NodeId> {
        let id = self.find(path)?;
        match self.get(id).map(|n| &n.cell) {
            Some(Cell::Container) => Err(TreeError::NotARecord(path.into())),
            _ => Ok(id),
        }
    }

    /// Iterates the children of the node at `path`.
    ///
    /// # Errors
    ///
    /// As [`Tree::find`].
    pub fn children_at(&self, path: &str) -> Result<Siblings<'_>> {
        Ok(self.children(self.find(path)?))
    }

    /// Unlinks and releases the node at `path` with everything under it.
    ///
    /// # Errors
    ///
    /// As [`Tree::find`].
    pub fn remove(&mut self, path: &str) -> Result<()> {
        let (parent, id) = self.locate(Parent::Root, path)?;
        self.unlink(parent, id);
        self.release(id);
        Ok(())
    }

    /// Replaces the label of the node at `path`.
    ///
    /// # Errors
    ///
    /// [`TreeError::InvalidLabel`] if `label` contains `/`, otherwise as
    /// [`Tree::find`].
    pub fn rename(&mut self, path: &str, label: &str) -> Result<()> {
        if label.contains('/') {
            tracing::warn!(path, label, "rejected rename to a label containing '/'");
            return Err(TreeError::InvalidLabel(label.into()));
        }
        let id = self.find(path)?;
        let node = self.get_mut(id).ok_or(TreeError::StaleHandle)?;
        node.label = label.into();
        Ok(())
    }

    pub(crate) fn get(&self, id: NodeId) -> Option<&Node> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation == id.generation {
            slot.node.as_ref()
        } else {
            None
        }
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation == id.generation {
            slot.node.as_mut()
        } else {
            None
        }
    }

    pub(crate) fn chain(&self, first: Option<NodeId>) -> Siblings<'_> {
        Siblings {
            tree: self,
            next: first,
        }
    }

    pub(crate) fn first_of(&self, parent: Parent) -> Option<NodeId> {
        match parent {
            Parent::Root => self.head,
            Parent::Node(id) => self.get(id)?.first_child,
        }
    }

    fn last_of(&self, parent: Parent) -> Option<NodeId> {
        match parent {
            Parent::Root => self.tail,
            Parent::Node(id) => self.get(id)?.last_child,
        }
    }

    fn ends_mut(&mut self, parent: Parent) -> Option<(&mut Option<NodeId>, &mut Option<NodeId>)> {
        match parent {
            Parent::Root => Some((&mut self.head, &mut self.tail)),
            Parent::Node(id) => self
                .get_mut(id)
                .map(|n| (&mut n.first_child, &mut n.last_child)),
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn alloc(&mut self, node: Node) -> NodeId {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.node = Some(node);
            NodeId {
                index,
                generation: slot.generation,
            }
        } else {
            let index = self.slots.len() as u32;
            self.slots.push(Slot {
                generation: 0,
                node: Some(node),
            });
            NodeId {
                index,
                generation: 0,
            }
        }
    }

    fn take(&mut self, id: NodeId) -> Option<Node> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let node = slot.node.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        Some(node)
    }

    /// Releases a node and its descendants. The caller unlinks it first.
    pub(crate) fn release(&mut self, id: NodeId) {
        if let Some(node) = self.take(id) {
            self.release_chain(node.first_child);
        }
    }

    /// Releases a whole sibling chain and everything below it.
    fn release_chain(&mut self, first: Option<NodeId>) {
        let mut pending: Vec<NodeId> = first.into_iter().collect();
        while let Some(id) = pending.pop() {
            if let Some(node) = self.take(id) {
                pending.extend(node.next);
                pending.extend(node.first_child);
            }
        }
    }

    /// Releases every child of `parent`.
    pub(crate) fn clear_children(&mut self, parent: Parent) {
        let first = self.first_of(parent);
        if let Some((first, last)) = self.ends_mut(parent) {
            *first = None;
            *last = None;
        }
        self.release_chain(first);
    }

    /// Appends a node at the end of `parent`'s chain.
    pub(crate) fn append(&mut self, parent: Parent, label: BString, cell: Cell) -> NodeId {
        let id = self.alloc(Node::new(label, cell));
        if let Some(last) = self.last_of(parent) {
            if let Some(node) = self.get_mut(last) {
                node.next = Some(id);
            }
        }
        if let Some((first, last)) = self.ends_mut(parent) {
            if first.is_none() {
                *first = Some(id);
            }
            *last = Some(id);
        }
        id
    }

    fn unlink(&mut self, parent: Parent, id: NodeId) {
        let mut prev = None;
        let mut cursor = self.first_of(parent);
        while let Some(current) = cursor {
            if current == id {
                break;
            }
            prev = Some(current);
            cursor = self.next_sibling(current);
        }
        if cursor.is_none() {
            return;
        }
        let next = self.get_mut(id).and_then(|n| n.next.take());
        match prev {
            Some(prev) => {
                if let Some(node) = self.get_mut(prev) {
                    node.next = next;
                }
            }
            None => {
                if let Some((first, _)) = self.ends_mut(parent) {
                    *first = next;
                }
            }
        }
        if self.last_of(parent) == Some(id) {
            if let Some((_, last)) = self.ends_mut(parent) {
                *last = prev;
            }
        }
    }

    pub(crate) fn lookup(&self, parent: Parent, label: &[u8]) -> Option<NodeId> {
        self.chain(self.first_of(parent))
            .find(|&id| self.get(id).is_some_and(|n| n.label.as_slice() == label))
    }

    /// Last sibling with a numeric label.
    fn last_element(&self, parent: Parent) -> Option<NodeId> {
        self.chain(self.first_of(parent))
            .filter(|&id| {
                self.get(id)
                    .is_some_and(|n| path::numeric_label(&n.label).is_some())
            })
            .last()
    }

    pub(crate) fn mark_array(&mut self, parent: Parent) {
        self.set_array(parent, true);
    }

    /// Sets whether `parent`'s chain renders as an array.
    pub(crate) fn set_array(&mut self, parent: Parent, is_array: bool) {
        match parent {
            Parent::Root => self.is_array = is_array,
            Parent::Node(id) => {
                if let Some(node) = self.get_mut(id) {
                    node.is_array = is_array;
                }
            }
        }
    }

    /// Appends an array element labeled one past the highest numeric label.
    fn push_element(&mut self, parent: Parent) -> NodeId {
        let index = self
            .chain(self.first_of(parent))
            .filter_map(|id| self.get(id).and_then(|n| path::numeric_label(&n.label)))
            .max()
            .map_or(0, |max| max.saturating_add(1));
        self.mark_array(parent);
        self.append(parent, index.to_string().into(), Cell::Empty)
    }

    /// Turns an untyped node into a container. Containers pass through.
    pub(crate) fn make_container(&mut self, id: NodeId) -> Result<()> {
        let node = self.get_mut(id).ok_or(TreeError::StaleHandle)?;
        match node.cell {
            Cell::Container => Ok(()),
            Cell::Empty => {
                node.cell = Cell::Container;
                Ok(())
            }
            Cell::Scalar { .. } | Cell::Text { .. } => Err(TreeError::NotAContainer {
                label: node.label.to_string(),
                ty: node.cell.ty(),
            }),
        }
    }

    /// Write-mode resolution starting below `from`.
    pub(crate) fn resolve(&mut self, from: Parent, path: &str) -> Result<NodeId> {
        if path::is_empty(path) {
            return Err(TreeError::EmptyPath);
        }
        let mut parent = from;
        let mut current = None;
        for segment in path::segments(path) {
            if let Parent::Node(id) = parent {
                self.make_container(id)?;
            }
            let id = match segment {
                Segment::Label(label) => match self.lookup(parent, label.as_bytes()) {
                    Some(id) => id,
                    None => self.append(parent, label.into(), Cell::Empty),
                },
                Segment::Append => self.push_element(parent),
                Segment::Last => match self.last_element(parent) {
                    Some(id) => id,
                    None => self.push_element(parent),
                },
            };
            current = Some(id);
            parent = Parent::Node(id);
        }
        current.ok_or(TreeError::EmptyPath)
    }

    /// Read-mode resolution. Returns the node and the chain it hangs on.
    pub(crate) fn locate(&self, from: Parent, path: &str) -> Result<(Parent, NodeId)> {
        let mut parent = from;
        let mut current = None;
        for segment in path::segments(path) {
            let found = match segment {
                Segment::Label(label) => self.lookup(parent, label.as_bytes()),
                Segment::Append => None,
                Segment::Last => self.last_element(parent),
            };
            let id = found.ok_or_else(|| TreeError::NotFound(path.into()))?;
            current = Some((parent, id));
            parent = Parent::Node(id);
        }
        current.ok_or(TreeError::EmptyPath)
    }

    fn dump(&self, f: &mut fmt::Formatter<'_>, first: Option<NodeId>, depth: usize) -> fmt::Result {
        for id in self.chain(first) {
            let Some(node) = self.get(id) else { continue };
            write!(f, "{:indent$}{}: ", "", node.label, indent = depth * 2)?;
            match &node.cell {
                Cell::Container if node.is_array => writeln!(f, "node[]")?,
                Cell::Empty | Cell::Container => writeln!(f, "{}", node.cell.ty())?,
                Cell::Text { ty, payload: None } => writeln!(f, "{ty} = null")?,
                Cell::Text {
                    ty,
                    payload: Some(bytes),
                } => writeln!(f, "{ty} = {bytes:?}")?,
                Cell::Scalar { ty, raw } => {
                    write!(f, "{ty} = ")?;
                    fmt_scalar(f, *ty, *raw)?;
                    writeln!(f)?;
                }
            }
            self.dump(f, node.first_child, depth + 1)?;
        }
        Ok(())
    }
}

/// Writes a scalar the way its tag reads it.
#[allow(clippy::cast_possible_wrap)]
pub(crate) fn fmt_scalar<W: fmt::Write>(out: &mut W, ty: DataType, raw: u64) -> fmt::Result {
    match ty {
        DataType::Bool => out.write_str(if raw == 0 { "false" } else { "true" }),
        DataType::Double => write!(out, "{:.6}", decode_double(raw)),
        DataType::Float => write!(out, "{:.6}", f64::from(decode_float(raw))),
        ty if ty.is_signed() => write!(out, "{}", zigzag_decode(raw)),
        _ => write!(out, "{raw}"),
    }
}

impl fmt::Debug for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_array {
            writeln!(f, "[]")?;
        }
        self.dump(f, self.head, 0)
    }
}

impl PartialEq for Tree {
    fn eq(&self, other: &Self) -> bool {
        self.is_array == other.is_array && chains_equal(self, self.head, other, other.head)
    }
}

fn chains_equal(a: &Tree, a_first: Option<NodeId>, b: &Tree, b_first: Option<NodeId>) -> bool {
    let mut left = a.chain(a_first);
    let mut right = b.chain(b_first);
    loop {
        match (left.next(), right.next()) {
            (None, None) => return true,
            (Some(x), Some(y)) => {
                let (Some(x), Some(y)) = (a.get(x), b.get(y)) else {
                    return false;
                };
                if x.label != y.label
                    || x.cell != y.cell
                    || x.is_array != y.is_array
                    || !chains_equal(a, x.first_child, b, y.first_child)
                {
                    return false;
                }
            }
            _ => return false,
        }
    }
}
