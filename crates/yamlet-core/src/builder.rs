//! Tree builder and anchor/alias resolver (second pass).
//!
//! Consumes the flat [`LineRecord`] list and rebuilds parent/child links
//! purely from indentation deltas between consecutive records:
//!
//! - deeper than the previous record → child of it
//! - an array entry at the same indent as a valueless key → first item of
//!   that key's array (`key:\n- a`)
//! - otherwise walk up from the previous record to the ancestor at exactly
//!   the same indent and become its sibling; an indent that matches no
//!   ancestor fails immediately instead of snapping to a looser level
//!
//! Leafness is decided during the walk: a valueless node that a later record
//! walks past without having gained children becomes a leaf (null, or an
//! empty collection when tagged so).

use crate::error::{Result, YamletError};
use crate::scalar;
use crate::scanner::{LineRecord, LineValue};
use crate::tree::{Children, NodeData, NodeId, NodeState, Tree, ROOT};
use crate::types::{Tag, Value};

/// Build the node tree for one document segment.
pub fn build(records: &[LineRecord]) -> Result<Tree> {
    let mut builder = Builder {
        tree: Tree::new(),
        anchors: Vec::new(),
    };

    let mut prev: Option<NodeId> = None;
    for record in records {
        let parent = match prev {
            None => ROOT,
            Some(p) => builder.find_parent(p, record)?,
        };
        prev = Some(builder.attach(parent, record)?);
    }
    if let Some(last) = prev {
        builder.close_chain(last)?;
    }
    builder.check_collection_tags()?;

    debug_assert!(builder
        .tree
        .nodes
        .iter()
        .skip(1)
        .all(|n| n.state != NodeState::Undetermined));
    log::debug!(
        "built tree: {} nodes, {} anchors",
        builder.tree.len(),
        builder.anchors.len()
    );
    Ok(builder.tree)
}

struct Anchor {
    name: String,
    line: usize,
    node: NodeId,
}

struct Builder {
    tree: Tree,
    /// Every anchor seen so far, in document order.
    anchors: Vec<Anchor>,
}

impl Builder {
    fn find_parent(&mut self, prev: NodeId, record: &LineRecord) -> Result<NodeId> {
        let p = &self.tree.nodes[prev];
        let p_indent = p.indent.unwrap_or(0);

        if record.indent > p_indent {
            if p.alias.is_some() {
                return Err(YamletError::indentation(
                    record.line,
                    "content nested under an alias",
                ));
            }
            if p.state == NodeState::Leaf {
                return Err(YamletError::indentation(
                    record.line,
                    format!("content nested under the scalar value on line {}", p.line),
                ));
            }
            return Ok(prev);
        }

        if record.indent == p_indent
            && record.array_entry
            && !p.array_entry
            && p.state == NodeState::Undetermined
        {
            return Ok(prev);
        }

        let mut candidate = prev;
        loop {
            let node = &self.tree.nodes[candidate];
            let (indent, array_entry, parent) = (node.indent, node.array_entry, node.parent);
            let indent = match indent {
                Some(i) if i >= record.indent => i,
                _ => {
                    return Err(YamletError::indentation(
                        record.line,
                        format!(
                            "indent of {} does not match any enclosing level",
                            record.indent
                        ),
                    ))
                }
            };
            if indent == record.indent {
                if array_entry == record.array_entry {
                    self.close(candidate)?;
                    return Ok(parent.unwrap_or(ROOT));
                }
                if record.array_entry {
                    return Err(YamletError::indentation(
                        record.line,
                        "array entry at the indent of a mapping key",
                    ));
                }
                // A key beside a compact array: the array's owner is the sibling.
            }
            self.close(candidate)?;
            candidate = parent.unwrap_or(ROOT);
        }
    }

    fn attach(&mut self, parent: NodeId, record: &LineRecord) -> Result<NodeId> {
        match (&self.tree.nodes[parent].children, record.array_entry) {
            (Children::Map(_), true) => {
                return Err(YamletError::indentation(
                    record.line,
                    "array entry mixed into a mapping",
                ))
            }
            (Children::Seq(_), false) => {
                return Err(YamletError::indentation(
                    record.line,
                    "mapping key mixed into an array",
                ))
            }
            _ => {}
        }

        let mut node = NodeData {
            parent: Some(parent),
            indent: Some(record.indent),
            line: record.line,
            key: record.key.clone(),
            array_entry: record.array_entry,
            tag: record.tag,
            anchor: record.anchor.clone(),
            state: NodeState::Undetermined,
            children: Children::None,
            value: None,
            alias: None,
        };

        match &record.value {
            LineValue::Empty => {}
            LineValue::Alias(name) => {
                if record.tag != Tag::Auto {
                    return Err(YamletError::tag(
                        record.line,
                        format!("!!{} cannot be applied to an alias", record.tag.name()),
                    ));
                }
                node.alias = Some(self.resolve_alias(name, record.line, parent)?);
                node.state = NodeState::Leaf;
            }
            value => {
                let resolved = resolve_leaf(value, record.tag)
                    .map_err(|message| YamletError::tag(record.line, message))?;
                node.value = Some(resolved);
                node.state = NodeState::Leaf;
            }
        }

        let id = self.tree.nodes.len();
        self.tree.nodes.push(node);

        let parent_node = &mut self.tree.nodes[parent];
        parent_node.state = NodeState::Container;
        match (&mut parent_node.children, &record.key) {
            (Children::Map(entries), Some(key)) => entries.push((key.clone(), id)),
            (Children::Seq(items), None) => items.push(id),
            (children, Some(key)) => *children = Children::Map(vec![(key.clone(), id)]),
            (children, None) => *children = Children::Seq(vec![id]),
        }

        if let Some(name) = &record.anchor {
            self.anchors.push(Anchor {
                name: name.clone(),
                line: record.line,
                node: id,
            });
        }
        Ok(id)
    }

    /// Bind an alias to the nearest earlier anchor of the same name.
    fn resolve_alias(&self, name: &str, line: usize, parent: NodeId) -> Result<NodeId> {
        let anchor = self
            .anchors
            .iter()
            .rev()
            .find(|a| a.name == name && a.line < line)
            .ok_or_else(|| {
                YamletError::anchor(
                    line,
                    format!("alias '*{name}' does not refer to an earlier anchor"),
                )
            })?;

        let mut current = Some(parent);
        while let Some(id) = current {
            if id == anchor.node {
                return Err(YamletError::anchor(
                    line,
                    format!("alias '*{name}' refers to a node that encloses it"),
                ));
            }
            current = self.tree.nodes[id].parent;
        }
        Ok(anchor.node)
    }

    /// Settle a node the walk has moved past: without children it is a leaf.
    fn close(&mut self, id: NodeId) -> Result<()> {
        let node = &mut self.tree.nodes[id];
        if node.state == NodeState::Undetermined && id != ROOT {
            let value = scalar::coerce(node.tag, "")
                .map_err(|message| YamletError::tag(node.line, message))?;
            node.value = Some(value);
            node.state = NodeState::Leaf;
        }
        Ok(())
    }

    fn close_chain(&mut self, mut id: NodeId) -> Result<()> {
        while id != ROOT {
            self.close(id)?;
            id = self.tree.nodes[id].parent.unwrap_or(ROOT);
        }
        Ok(())
    }

    /// Collection tags on containers must match the container's shape.
    fn check_collection_tags(&self) -> Result<()> {
        for node in self.tree.nodes.iter().skip(1) {
            let ok = match (&node.children, node.tag) {
                (Children::None, _) | (_, Tag::Auto) => true,
                (Children::Map(_), Tag::Map | Tag::Set | Tag::OrderedMap) => true,
                (Children::Seq(_), Tag::Seq) => true,
                (Children::Seq(items), Tag::OrderedMap) => items.iter().all(|&item| {
                    let item = &self.tree.nodes[self.tree.resolve(item)];
                    matches!(&item.children, Children::Map(entries) if entries.len() == 1)
                        || matches!(&item.value, Some(Value::Map(entries)) if entries.len() == 1)
                }),
                _ => false,
            };
            if !ok {
                let shape = match node.children {
                    Children::Seq(_) => "an array",
                    _ => "a mapping",
                };
                return Err(YamletError::tag(
                    node.line,
                    format!("!!{} cannot tag {shape}", node.tag.name()),
                ));
            }
        }
        Ok(())
    }
}

/// Resolve the value of a leaf record against its tag.
fn resolve_leaf(value: &LineValue, tag: Tag) -> std::result::Result<Value, String> {
    match value {
        LineValue::Plain(text) => scalar::coerce(tag, text),
        LineValue::Quoted(text) | LineValue::Block { text, .. } => match tag {
            Tag::Auto | Tag::Str => Ok(Value::String(text.clone())),
            _ => scalar::coerce(tag, text),
        },
        LineValue::Flow(value) => scalar::coerce_value(tag, value.clone()),
        LineValue::Empty | LineValue::Alias(_) => Ok(Value::Null),
    }
}
