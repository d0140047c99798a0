//! Node arena for a parsed document.
//!
//! Nodes live in a flat `Vec` and refer to each other by index: children by
//! index lists, parents by index, and aliases by the index of the anchored
//! node they resolve to. Aliases never own their target, so the arena has no
//! ownership cycles. Reads through an alias are delegated to the target
//! (see [`NodeRef`]), which makes point-writes to an anchor visible through
//! every alias of it.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::error::{Result, YamletError};
use crate::scalar;
use crate::types::{Tag, Value};

/// Index of a node inside its [`Tree`].
pub type NodeId = usize;

/// The synthetic document root.
pub const ROOT: NodeId = 0;

/// The map key that splices another map into the containing one.
pub const MERGE_KEY: &str = "<<";

/// Leafness of a node. `Undetermined` only exists while the builder runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NodeState {
    Undetermined,
    Leaf,
    Container,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Children {
    None,
    Map(Vec<(String, NodeId)>),
    Seq(Vec<NodeId>),
}

#[derive(Debug, Clone)]
pub(crate) struct NodeData {
    pub(crate) parent: Option<NodeId>,
    /// `None` only for the root.
    pub(crate) indent: Option<usize>,
    pub(crate) line: usize,
    pub(crate) key: Option<String>,
    pub(crate) array_entry: bool,
    pub(crate) tag: Tag,
    pub(crate) anchor: Option<String>,
    pub(crate) state: NodeState,
    pub(crate) children: Children,
    pub(crate) value: Option<Value>,
    pub(crate) alias: Option<NodeId>,
}

impl NodeData {
    pub(crate) fn root() -> Self {
        Self {
            parent: None,
            indent: None,
            line: 0,
            key: None,
            array_entry: false,
            tag: Tag::Auto,
            anchor: None,
            state: NodeState::Undetermined,
            children: Children::None,
            value: None,
            alias: None,
        }
    }
}

/// The tree of one document segment.
#[derive(Debug, Clone)]
pub struct Tree {
    pub(crate) nodes: Vec<NodeData>,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    pub(crate) fn new() -> Self {
        Self {
            nodes: vec![NodeData::root()],
        }
    }

    pub fn root(&self) -> NodeRef<'_> {
        NodeRef { tree: self, id: ROOT }
    }

    pub fn node(&self, id: NodeId) -> Option<NodeRef<'_>> {
        (id < self.nodes.len()).then_some(NodeRef { tree: self, id })
    }

    /// Number of nodes, not counting the synthetic root.
    pub fn len(&self) -> usize {
        self.nodes.len() - 1
    }

    /// True for a document with no content lines.
    pub fn is_empty(&self) -> bool {
        self.nodes[ROOT].children == Children::None
    }

    /// The whole document as a generic value (`Null` when empty).
    pub fn to_value(&self) -> Value {
        self.value_of(ROOT)
    }

    /// Follow alias links to the node that actually holds content.
    pub(crate) fn resolve(&self, mut id: NodeId) -> NodeId {
        while let Some(target) = self.nodes[id].alias {
            id = target;
        }
        id
    }

    pub(crate) fn value_of(&self, id: NodeId) -> Value {
        let node = &self.nodes[self.resolve(id)];
        match &node.children {
            Children::None => node.value.clone().unwrap_or(Value::Null),
            Children::Map(entries) => Value::Map(self.merged_entries(entries)),
            Children::Seq(items) => {
                let values: Vec<Value> = items.iter().map(|&i| self.value_of(i)).collect();
                if node.tag == Tag::OrderedMap {
                    if let Some(pairs) = scalar::flatten_pairs(&values) {
                        return Value::Map(pairs);
                    }
                }
                Value::Seq(values)
            }
        }
    }

    /// Build a map's entries, splicing `<<` merge sources in place.
    ///
    /// Explicit keys always win over merged ones; among merge sources the
    /// first one to supply a key wins. A later duplicate explicit key
    /// replaces the earlier value in place.
    fn merged_entries(&self, entries: &[(String, NodeId)]) -> Vec<(String, Value)> {
        let mut out: Vec<(String, Value)> = Vec::with_capacity(entries.len());
        // key -> slot in `out`
        let mut slots: HashMap<String, usize> = HashMap::with_capacity(entries.len());
        for (key, child) in entries {
            let value = self.value_of(*child);
            if key == MERGE_KEY {
                if let Some(sources) = merge_sources(&value) {
                    for source in sources {
                        for (k, v) in source {
                            if let Entry::Vacant(slot) = slots.entry(k.clone()) {
                                slot.insert(out.len());
                                out.push((k.clone(), v.clone()));
                            }
                        }
                    }
                    continue;
                }
            }
            match slots.get(key) {
                Some(&i) => out[i].1 = value,
                None => {
                    slots.insert(key.clone(), out.len());
                    out.push((key.clone(), value));
                }
            }
        }
        out
    }

    /// Overwrite the leaf at `path` (map keys, or decimal indices into
    /// arrays). Writing through an alias updates the anchored node, so every
    /// other alias of it observes the new value.
    pub fn set_value(&mut self, path: &[&str], value: Value) -> Result<()> {
        let mut id = ROOT;
        for segment in path {
            let node = &self.nodes[self.resolve(id)];
            let next = match &node.children {
                Children::Map(entries) => entries
                    .iter()
                    .rev()
                    .find(|(k, _)| k == segment)
                    .map(|&(_, child)| child),
                Children::Seq(items) => segment
                    .parse::<usize>()
                    .ok()
                    .and_then(|i| items.get(i).copied()),
                Children::None => None,
            };
            id = next
                .ok_or_else(|| YamletError::Shape(format!("no node at '{}'", path.join("."))))?;
        }
        self.set_leaf(id, value)
    }

    /// Replace the value of a leaf. Writes land on the alias target.
    fn set_leaf(&mut self, id: NodeId, value: Value) -> Result<()> {
        let id = self.resolve(id);
        let node = &mut self.nodes[id];
        if node.state != NodeState::Leaf {
            return Err(YamletError::Shape(format!(
                "node at line {} is not a leaf",
                node.line
            )));
        }
        node.value = Some(value);
        Ok(())
    }
}

pub(crate) fn merge_sources(value: &Value) -> Option<Vec<&[(String, Value)]>> {
    match value {
        Value::Map(entries) => Some(vec![entries.as_slice()]),
        Value::Seq(items) if !items.is_empty() => items.iter().map(Value::as_map).collect(),
        _ => None,
    }
}

/// A borrowed handle to one node of a [`Tree`].
///
/// `key`, `line`, `anchor` and `tag` describe the node itself; everything
/// about content (`is_leaf`, `is_array`, `value`, `get`, `at`, ...) is read
/// from the alias target when the node is an alias.
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    tree: &'a Tree,
    id: NodeId,
}

impl<'a> NodeRef<'a> {
    fn data(&self) -> &'a NodeData {
        &self.tree.nodes[self.id]
    }

    fn content(&self) -> &'a NodeData {
        &self.tree.nodes[self.tree.resolve(self.id)]
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn is_root(&self) -> bool {
        self.id == ROOT
    }

    /// 1-based source line (0 for the root).
    pub fn line(&self) -> usize {
        self.data().line
    }

    pub fn indent(&self) -> Option<usize> {
        self.data().indent
    }

    pub fn key(&self) -> Option<&'a str> {
        self.data().key.as_deref()
    }

    pub fn anchor(&self) -> Option<&'a str> {
        self.data().anchor.as_deref()
    }

    pub fn tag(&self) -> Tag {
        self.data().tag
    }

    pub fn parent(&self) -> Option<NodeRef<'a>> {
        self.data().parent.map(|id| NodeRef {
            tree: self.tree,
            id,
        })
    }

    pub fn is_alias(&self) -> bool {
        self.data().alias.is_some()
    }

    /// The anchored node this alias resolves to.
    pub fn target(&self) -> Option<NodeRef<'a>> {
        self.data().alias.map(|_| NodeRef {
            tree: self.tree,
            id: self.tree.resolve(self.id),
        })
    }

    pub fn is_leaf(&self) -> bool {
        self.content().state == NodeState::Leaf
    }

    pub fn is_array(&self) -> bool {
        matches!(self.content().children, Children::Seq(_))
    }

    pub fn is_map(&self) -> bool {
        matches!(self.content().children, Children::Map(_))
    }

    /// The scalar (or flow) value of a leaf.
    pub fn value(&self) -> Option<&'a Value> {
        self.content().value.as_ref()
    }

    /// Number of children.
    pub fn len(&self) -> usize {
        match &self.content().children {
            Children::None => 0,
            Children::Map(entries) => entries.len(),
            Children::Seq(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Map child by key. With duplicate keys the last one wins.
    pub fn get(&self, key: &str) -> Option<NodeRef<'a>> {
        match &self.content().children {
            Children::Map(entries) => entries
                .iter()
                .rev()
                .find(|(k, _)| k == key)
                .map(|&(_, id)| NodeRef {
                    tree: self.tree,
                    id,
                }),
            _ => None,
        }
    }

    /// Array child by position.
    pub fn at(&self, index: usize) -> Option<NodeRef<'a>> {
        match &self.content().children {
            Children::Seq(items) => items.get(index).map(|&id| NodeRef {
                tree: self.tree,
                id,
            }),
            _ => None,
        }
    }

    /// Children in document order (map children and array children alike).
    pub fn children(&self) -> Vec<NodeRef<'a>> {
        let tree = self.tree;
        match &self.content().children {
            Children::None => Vec::new(),
            Children::Map(entries) => entries
                .iter()
                .map(|&(_, id)| NodeRef { tree, id })
                .collect(),
            Children::Seq(items) => items.iter().map(|&id| NodeRef { tree, id }).collect(),
        }
    }

    /// The subtree as a generic value, with merge keys applied.
    pub fn to_value(&self) -> Value {
        self.tree.value_of(self.id)
    }

    /// Coerce this node's value to `tag`, for binding layers that know the
    /// target type they want.
    pub fn value_as(&self, tag: Tag) -> Result<Value> {
        scalar::coerce_value(tag, self.to_value())
            .map_err(|message| YamletError::tag(self.line(), message))
    }
}
