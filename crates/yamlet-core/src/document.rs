// Yamlet - YAML parser, document model, and emitter
//
// Copyright (c) 2025 the Yamlet contributors.
//
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE file at the
// root of this repository or at: http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The document: a tree of nodes over an arena.
//!
//! Nodes live in a flat arena owned by their [`Document`] and are
//! addressed by [`NodeId`] handles; child-to-parent links are plain
//! indices, which models the original's back-pointer graph without
//! ownership cycles. Mapping pairs preserve insertion order. Anchors are
//! kept in declaration order; lookup returns the most recently declared
//! anchor of a name.
//!
//! Parent invariants: the root and every mapping key have no parent; a
//! mapping value's parent is the mapping; a sequence item's parent is
//! the sequence. [`Document::reparent`] re-establishes this after
//! structural mutation.

use crate::compare;
use crate::diag::Diagnostic;
use crate::docstate::DocumentState;
use crate::error::{YamlError, YamlResult};
use crate::token::{ScalarStyle, Token};
use std::rc::Rc;

/// Handle to a node within one document's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    #[inline]
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// What a node is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Scalar,
    Sequence,
    Mapping,
}

/// Presentation style hint carried by a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NodeStyle {
    /// Let the emitter choose.
    #[default]
    Any,
    /// Flow collection form.
    Flow,
    /// Block collection form.
    Block,
    /// Plain scalar.
    Plain,
    /// Single-quoted scalar.
    SingleQuoted,
    /// Double-quoted scalar.
    DoubleQuoted,
    /// Literal block scalar.
    Literal,
    /// Folded block scalar.
    Folded,
    /// An unresolved alias; the scalar token is the alias name.
    Alias,
}

impl NodeStyle {
    /// The node style recording a scalar's scanned presentation.
    pub fn from_scalar(style: ScalarStyle) -> Self {
        match style {
            ScalarStyle::Plain => Self::Plain,
            ScalarStyle::SingleQuoted => Self::SingleQuoted,
            ScalarStyle::DoubleQuoted => Self::DoubleQuoted,
            ScalarStyle::Literal => Self::Literal,
            ScalarStyle::Folded => Self::Folded,
        }
    }
}

/// A key/value pair within a mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodePair {
    pub key: NodeId,
    pub value: NodeId,
}

#[derive(Debug, Clone)]
pub(crate) enum NodeContent {
    Scalar { token: Token },
    Sequence(Vec<NodeId>),
    Mapping(Vec<NodePair>),
}

#[derive(Debug, Clone)]
pub(crate) struct NodeData {
    pub(crate) content: NodeContent,
    pub(crate) tag: Option<Token>,
    pub(crate) style: NodeStyle,
    pub(crate) parent: Option<NodeId>,
}

/// An anchor declaration.
#[derive(Debug, Clone)]
pub struct Anchor {
    /// The `&name` token.
    pub name: Token,
    /// The anchored node.
    pub node: NodeId,
}

/// A parsed (or hand-built) YAML document. See the module docs.
#[derive(Debug, Clone)]
pub struct Document {
    pub(crate) nodes: Vec<NodeData>,
    root: Option<NodeId>,
    anchors: Vec<Anchor>,
    state: Rc<DocumentState>,
    diagnostics: Vec<Diagnostic>,
    has_parse_error: bool,
}

impl Document {
    /// An empty document with default state.
    pub fn new() -> Self {
        Self::with_state(Rc::new(DocumentState::new()))
    }

    /// An empty document sharing the given state.
    pub fn with_state(state: Rc<DocumentState>) -> Self {
        Self {
            nodes: Vec::new(),
            root: None,
            anchors: Vec::new(),
            state,
            diagnostics: Vec::new(),
            has_parse_error: false,
        }
    }

    /// The document state (version, tag directives).
    pub fn state(&self) -> &Rc<DocumentState> {
        &self.state
    }

    /// Mutable access to the document state, copy-on-write when shared.
    pub fn state_mut(&mut self) -> &mut DocumentState {
        Rc::make_mut(&mut self.state)
    }

    pub(crate) fn set_state(&mut self, state: Rc<DocumentState>) {
        self.state = state;
    }

    /// The root node, if the document has content.
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Replace the root. The old subtree stays in the arena but becomes
    /// unreachable.
    pub fn set_root(&mut self, root: Option<NodeId>) {
        self.root = root;
        self.reparent();
    }

    /// Number of live arena slots (including unreachable ones).
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// True if a parse error was captured while building.
    pub fn has_parse_error(&self) -> bool {
        self.has_parse_error
    }

    pub(crate) fn set_parse_error(&mut self) {
        self.has_parse_error = true;
    }

    /// Diagnostics captured while building (with
    /// `collect_diagnostics`).
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub(crate) fn push_diagnostics(&mut self, diags: Vec<Diagnostic>) {
        self.diagnostics.extend(diags);
    }

    pub(crate) fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.index()]
    }

    pub(crate) fn data_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id.index()]
    }

    fn check(&self, id: NodeId) -> YamlResult<()> {
        if id.index() >= self.nodes.len() {
            return Err(YamlError::api("node handle does not belong to this document"));
        }
        Ok(())
    }

    // ==================== node creation ====================

    fn alloc(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(data);
        id
    }

    /// Create a scalar node from caller text.
    pub fn new_scalar(&mut self, text: &str) -> NodeId {
        let token = Token::synthetic_scalar(text, ScalarStyle::Plain);
        self.new_scalar_from_token(token, NodeStyle::Any)
    }

    /// Create a scalar node from an existing token.
    pub fn new_scalar_from_token(&mut self, token: Token, style: NodeStyle) -> NodeId {
        self.alloc(NodeData {
            content: NodeContent::Scalar { token },
            tag: None,
            style,
            parent: None,
        })
    }

    /// Create an empty sequence node.
    pub fn new_sequence(&mut self) -> NodeId {
        self.alloc(NodeData {
            content: NodeContent::Sequence(Vec::new()),
            tag: None,
            style: NodeStyle::Any,
            parent: None,
        })
    }

    /// Create an empty mapping node.
    pub fn new_mapping(&mut self) -> NodeId {
        self.alloc(NodeData {
            content: NodeContent::Mapping(Vec::new()),
            tag: None,
            style: NodeStyle::Any,
            parent: None,
        })
    }

    /// Deep-copy a subtree within this document. Tokens are shared, the
    /// structure is new.
    pub fn deep_copy(&mut self, id: NodeId) -> NodeId {
        let data = self.nodes[id.index()].clone();
        match data.content {
            NodeContent::Scalar { token } => self.alloc(NodeData {
                content: NodeContent::Scalar { token },
                tag: data.tag,
                style: data.style,
                parent: None,
            }),
            NodeContent::Sequence(items) => {
                let copies: Vec<NodeId> = items.iter().map(|&c| self.deep_copy(c)).collect();
                self.alloc(NodeData {
                    content: NodeContent::Sequence(copies),
                    tag: data.tag,
                    style: data.style,
                    parent: None,
                })
            }
            NodeContent::Mapping(pairs) => {
                let copies: Vec<NodePair> = pairs
                    .iter()
                    .map(|p| NodePair {
                        key: self.deep_copy(p.key),
                        value: self.deep_copy(p.value),
                    })
                    .collect();
                self.alloc(NodeData {
                    content: NodeContent::Mapping(copies),
                    tag: data.tag,
                    style: data.style,
                    parent: None,
                })
            }
        }
    }

    // ==================== node inspection ====================

    /// The kind of a node.
    pub fn kind(&self, id: NodeId) -> NodeKind {
        match self.data(id).content {
            NodeContent::Scalar { .. } => NodeKind::Scalar,
            NodeContent::Sequence(_) => NodeKind::Sequence,
            NodeContent::Mapping(_) => NodeKind::Mapping,
        }
    }

    /// The style hint of a node.
    pub fn style(&self, id: NodeId) -> NodeStyle {
        self.data(id).style
    }

    /// Set the style hint of a node.
    pub fn set_style(&mut self, id: NodeId, style: NodeStyle) {
        self.data_mut(id).style = style;
    }

    /// The parent of a node; the root and mapping keys have none.
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.data(id).parent
    }

    /// The tag token of a node.
    pub fn tag(&self, id: NodeId) -> Option<&Token> {
        self.data(id).tag.as_ref()
    }

    /// The resolved tag text of a node.
    pub fn tag_text(&self, id: NodeId) -> Option<&str> {
        self.data(id).tag.as_ref().map(|t| t.text())
    }

    /// Set or clear a node's tag.
    pub fn set_tag(&mut self, id: NodeId, tag: Option<Token>) {
        self.data_mut(id).tag = tag;
    }

    /// True if the node is an unresolved alias.
    pub fn is_alias(&self, id: NodeId) -> bool {
        self.data(id).style == NodeStyle::Alias
    }

    /// The content token of a scalar node.
    pub fn scalar_token(&self, id: NodeId) -> Option<&Token> {
        match &self.data(id).content {
            NodeContent::Scalar { token } => Some(token),
            _ => None,
        }
    }

    /// The decoded text of a scalar node, borrowed from the token's
    /// cache.
    pub fn scalar_text(&self, id: NodeId) -> Option<&str> {
        self.scalar_token(id).map(|t| t.text())
    }

    // ==================== sequences ====================

    fn sequence_items(&self, id: NodeId) -> YamlResult<&Vec<NodeId>> {
        match &self.data(id).content {
            NodeContent::Sequence(items) => Ok(items),
            _ => Err(YamlError::api("node is not a sequence")),
        }
    }

    fn sequence_items_mut(&mut self, id: NodeId) -> YamlResult<&mut Vec<NodeId>> {
        match &mut self.data_mut(id).content {
            NodeContent::Sequence(items) => Ok(items),
            _ => Err(YamlError::api("node is not a sequence")),
        }
    }

    /// Number of items in a sequence.
    pub fn sequence_len(&self, id: NodeId) -> usize {
        self.sequence_items(id).map(|v| v.len()).unwrap_or(0)
    }

    /// Item by index.
    pub fn sequence_get(&self, id: NodeId, index: usize) -> Option<NodeId> {
        self.sequence_items(id).ok()?.get(index).copied()
    }

    /// Iterate the items of a sequence. Mutating the sequence while
    /// iterating is not supported.
    pub fn sequence_iter(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let items = match &self.data(id).content {
            NodeContent::Sequence(items) => items.as_slice(),
            _ => &[],
        };
        items.iter().copied()
    }

    /// Append an item.
    pub fn sequence_append(&mut self, seq: NodeId, item: NodeId) -> YamlResult<()> {
        self.check(seq)?;
        self.check(item)?;
        self.sequence_items_mut(seq)?.push(item);
        self.data_mut(item).parent = Some(seq);
        Ok(())
    }

    /// Prepend an item.
    pub fn sequence_prepend(&mut self, seq: NodeId, item: NodeId) -> YamlResult<()> {
        self.check(seq)?;
        self.sequence_items_mut(seq)?.insert(0, item);
        self.data_mut(item).parent = Some(seq);
        Ok(())
    }

    /// Insert `item` before `mark`, which must be in the sequence.
    pub fn sequence_insert_before(
        &mut self,
        seq: NodeId,
        mark: NodeId,
        item: NodeId,
    ) -> YamlResult<()> {
        let items = self.sequence_items_mut(seq)?;
        let pos = items
            .iter()
            .position(|&n| n == mark)
            .ok_or_else(|| YamlError::api("reference item is not in the sequence"))?;
        items.insert(pos, item);
        self.data_mut(item).parent = Some(seq);
        Ok(())
    }

    /// Insert `item` after `mark`, which must be in the sequence.
    pub fn sequence_insert_after(
        &mut self,
        seq: NodeId,
        mark: NodeId,
        item: NodeId,
    ) -> YamlResult<()> {
        let items = self.sequence_items_mut(seq)?;
        let pos = items
            .iter()
            .position(|&n| n == mark)
            .ok_or_else(|| YamlError::api("reference item is not in the sequence"))?;
        items.insert(pos + 1, item);
        self.data_mut(item).parent = Some(seq);
        Ok(())
    }

    /// Remove an item from a sequence.
    pub fn sequence_remove(&mut self, seq: NodeId, item: NodeId) -> YamlResult<()> {
        let items = self.sequence_items_mut(seq)?;
        let pos = items
            .iter()
            .position(|&n| n == item)
            .ok_or_else(|| YamlError::api("item is not in the sequence"))?;
        items.remove(pos);
        self.data_mut(item).parent = None;
        Ok(())
    }

    // ==================== mappings ====================

    fn mapping_pairs_vec(&self, id: NodeId) -> YamlResult<&Vec<NodePair>> {
        match &self.data(id).content {
            NodeContent::Mapping(pairs) => Ok(pairs),
            _ => Err(YamlError::api("node is not a mapping")),
        }
    }

    pub(crate) fn mapping_pairs_mut(&mut self, id: NodeId) -> YamlResult<&mut Vec<NodePair>> {
        match &mut self.data_mut(id).content {
            NodeContent::Mapping(pairs) => Ok(pairs),
            _ => Err(YamlError::api("node is not a mapping")),
        }
    }

    /// Number of pairs in a mapping.
    pub fn mapping_len(&self, id: NodeId) -> usize {
        self.mapping_pairs_vec(id).map(|v| v.len()).unwrap_or(0)
    }

    /// Pair by index.
    pub fn mapping_get(&self, id: NodeId, index: usize) -> Option<NodePair> {
        self.mapping_pairs_vec(id).ok()?.get(index).copied()
    }

    /// Iterate the pairs of a mapping in insertion order.
    pub fn mapping_iter(&self, id: NodeId) -> impl Iterator<Item = NodePair> + '_ {
        let pairs = match &self.data(id).content {
            NodeContent::Mapping(pairs) => pairs.as_slice(),
            _ => &[],
        };
        pairs.iter().copied()
    }

    /// Look up a value by decoded key text. Non-scalar keys never match.
    pub fn mapping_lookup(&self, id: NodeId, key: &str) -> Option<NodeId> {
        self.mapping_iter(id)
            .find(|pair| self.scalar_text(pair.key) == Some(key))
            .map(|pair| pair.value)
    }

    /// Look up a full pair by decoded key text.
    pub fn mapping_lookup_pair(&self, id: NodeId, key: &str) -> Option<NodePair> {
        self.mapping_iter(id)
            .find(|pair| self.scalar_text(pair.key) == Some(key))
    }

    /// True if `key` is semantically equal to an existing key of the
    /// mapping.
    pub fn mapping_has_key(&self, id: NodeId, key: NodeId) -> bool {
        self.mapping_iter(id)
            .any(|pair| compare::nodes_equal(self, pair.key, self, key))
    }

    /// Append a pair, rejecting keys already present under semantic
    /// equality.
    pub fn mapping_append(&mut self, map: NodeId, key: NodeId, value: NodeId) -> YamlResult<()> {
        if self.mapping_has_key(map, key) {
            let mark = self.scalar_token(key).map(|t| t.start());
            let mut err = YamlError::semantic("duplicate mapping key");
            if let Some(mark) = mark {
                err = err.at(mark);
            }
            return Err(err);
        }
        self.mapping_append_unchecked(map, key, value)
    }

    /// Append a pair without the duplicate-key check.
    pub fn mapping_append_unchecked(
        &mut self,
        map: NodeId,
        key: NodeId,
        value: NodeId,
    ) -> YamlResult<()> {
        self.check(map)?;
        self.check(key)?;
        self.check(value)?;
        self.mapping_pairs_mut(map)?.push(NodePair { key, value });
        self.data_mut(key).parent = None;
        self.data_mut(value).parent = Some(map);
        Ok(())
    }

    /// Prepend a pair, with the duplicate-key check.
    pub fn mapping_prepend(&mut self, map: NodeId, key: NodeId, value: NodeId) -> YamlResult<()> {
        if self.mapping_has_key(map, key) {
            return Err(YamlError::semantic("duplicate mapping key"));
        }
        self.mapping_pairs_mut(map)?.insert(0, NodePair { key, value });
        self.data_mut(key).parent = None;
        self.data_mut(value).parent = Some(map);
        Ok(())
    }

    /// Remove the pair whose key node is `key`.
    pub fn mapping_remove(&mut self, map: NodeId, key: NodeId) -> YamlResult<()> {
        let pairs = self.mapping_pairs_mut(map)?;
        let pos = pairs
            .iter()
            .position(|p| p.key == key)
            .ok_or_else(|| YamlError::api("key is not in the mapping"))?;
        let pair = pairs.remove(pos);
        self.data_mut(pair.value).parent = None;
        Ok(())
    }

    /// Set the value for a text key, replacing an existing pair's value
    /// in place (order preserved) or appending a new pair.
    pub fn mapping_set(&mut self, map: NodeId, key: &str, value: NodeId) -> YamlResult<()> {
        self.check(map)?;
        self.check(value)?;
        let pos = self
            .mapping_iter(map)
            .position(|p| self.scalar_text(p.key) == Some(key));
        match pos {
            Some(pos) => {
                let pairs = self.mapping_pairs_mut(map)?;
                let old = pairs[pos].value;
                pairs[pos].value = value;
                self.data_mut(old).parent = None;
                self.data_mut(value).parent = Some(map);
                Ok(())
            }
            None => {
                let key_node = self.new_scalar(key);
                self.mapping_append_unchecked(map, key_node, value)
            }
        }
    }

    /// Remove a pair by decoded key text, returning the value node.
    pub fn mapping_remove_by_key(&mut self, map: NodeId, key: &str) -> Option<NodeId> {
        let pos = self
            .mapping_iter(map)
            .position(|pair| self.scalar_text(pair.key) == Some(key))?;
        let pairs = self.mapping_pairs_mut(map).ok()?;
        let pair = pairs.remove(pos);
        self.data_mut(pair.value).parent = None;
        Some(pair.value)
    }

    // ==================== merging ====================

    /// Merge `source` into `target`: scalars overwrite, sequences
    /// append, mappings shallow-merge with the source winning on key
    /// collisions. Both nodes must be of the same kind.
    pub fn insert(&mut self, target: NodeId, source: NodeId) -> YamlResult<()> {
        match (self.kind(target), self.kind(source)) {
            (NodeKind::Scalar, NodeKind::Scalar) => {
                let content = self.data(source).content.clone();
                let style = self.data(source).style;
                let tag = self.data(source).tag.clone();
                let data = self.data_mut(target);
                data.content = content;
                data.style = style;
                data.tag = tag;
                Ok(())
            }
            (NodeKind::Sequence, NodeKind::Sequence) => {
                let items: Vec<NodeId> = self.sequence_iter(source).collect();
                for item in items {
                    let copy = self.deep_copy(item);
                    self.sequence_append(target, copy)?;
                }
                Ok(())
            }
            (NodeKind::Mapping, NodeKind::Mapping) => {
                let pairs: Vec<NodePair> = self.mapping_iter(source).collect();
                for pair in pairs {
                    // Source wins: drop any existing pair with an equal
                    // key first.
                    let existing = self
                        .mapping_iter(target)
                        .find(|p| compare::nodes_equal(self, p.key, self, pair.key));
                    if let Some(existing) = existing {
                        self.mapping_remove(target, existing.key)?;
                    }
                    let key_copy = self.deep_copy(pair.key);
                    let value_copy = self.deep_copy(pair.value);
                    self.mapping_append_unchecked(target, key_copy, value_copy)?;
                }
                Ok(())
            }
            _ => Err(YamlError::api(
                "insert requires nodes of the same kind",
            )),
        }
    }

    // ==================== anchors ====================

    /// Register an anchor. Duplicate names within one document are
    /// rejected.
    pub fn add_anchor(&mut self, name: Token, node: NodeId) -> YamlResult<()> {
        if self.anchors.iter().any(|a| a.name.text() == name.text()) {
            return Err(YamlError::semantic(format!(
                "duplicate anchor '&{}'",
                name.text()
            ))
            .at(name.start()));
        }
        self.anchors.push(Anchor { name, node });
        Ok(())
    }

    /// Set an anchor from caller text, replacing any previous anchor of
    /// that name.
    pub fn set_anchor(&mut self, name: &str, node: NodeId) -> YamlResult<()> {
        self.check(node)?;
        self.anchors.retain(|a| a.name.text() != name);
        self.anchors.push(Anchor {
            name: Token::synthetic_scalar(name, ScalarStyle::Plain),
            node,
        });
        Ok(())
    }

    /// Remove an anchor by name.
    pub fn remove_anchor(&mut self, name: &str) -> YamlResult<()> {
        let before = self.anchors.len();
        self.anchors.retain(|a| a.name.text() != name);
        if self.anchors.len() == before {
            return Err(YamlError::api(format!("no anchor named '{name}'")));
        }
        Ok(())
    }

    /// The most recently declared anchor of a name.
    pub fn lookup_anchor(&self, name: &str) -> Option<NodeId> {
        self.anchors
            .iter()
            .rev()
            .find(|a| a.name.text() == name)
            .map(|a| a.node)
    }

    /// Iterate anchors in declaration order.
    pub fn anchors(&self) -> impl Iterator<Item = &Anchor> {
        self.anchors.iter()
    }

    /// The anchor name attached to a node, if any.
    pub fn anchor_name_of(&self, node: NodeId) -> Option<&str> {
        self.anchors
            .iter()
            .rev()
            .find(|a| a.node == node)
            .map(|a| a.name.text())
    }

    // ==================== parents ====================

    /// Recompute every parent pointer from the root. Mapping keys get no
    /// parent; unreachable nodes keep stale links but are never visited.
    pub fn reparent(&mut self) {
        if let Some(root) = self.root {
            self.data_mut(root).parent = None;
            self.reparent_node(root);
        }
    }

    fn reparent_node(&mut self, id: NodeId) {
        match self.data(id).content.clone() {
            NodeContent::Scalar { .. } => {}
            NodeContent::Sequence(items) => {
                for item in items {
                    self.data_mut(item).parent = Some(id);
                    self.reparent_node(item);
                }
            }
            NodeContent::Mapping(pairs) => {
                for pair in pairs {
                    self.data_mut(pair.key).parent = None;
                    self.reparent_node(pair.key);
                    self.data_mut(pair.value).parent = Some(id);
                    self.reparent_node(pair.value);
                }
            }
        }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scalar(doc: &mut Document, text: &str) -> NodeId {
        doc.new_scalar(text)
    }

    // ==================== creation tests ====================

    #[test]
    fn test_empty_document() {
        let doc = Document::new();
        assert!(doc.root().is_none());
        assert_eq!(doc.node_count(), 0);
        assert!(!doc.has_parse_error());
    }

    #[test]
    fn test_new_scalar() {
        let mut doc = Document::new();
        let id = scalar(&mut doc, "hello");
        assert_eq!(doc.kind(id), NodeKind::Scalar);
        assert_eq!(doc.scalar_text(id), Some("hello"));
        assert_eq!(doc.parent(id), None);
    }

    #[test]
    fn test_new_collections() {
        let mut doc = Document::new();
        let seq = doc.new_sequence();
        let map = doc.new_mapping();
        assert_eq!(doc.kind(seq), NodeKind::Sequence);
        assert_eq!(doc.kind(map), NodeKind::Mapping);
        assert_eq!(doc.sequence_len(seq), 0);
        assert_eq!(doc.mapping_len(map), 0);
    }

    // ==================== sequence mutation tests ====================

    #[test]
    fn test_sequence_append_and_get() {
        let mut doc = Document::new();
        let seq = doc.new_sequence();
        let a = scalar(&mut doc, "a");
        let b = scalar(&mut doc, "b");
        doc.sequence_append(seq, a).unwrap();
        doc.sequence_append(seq, b).unwrap();
        assert_eq!(doc.sequence_len(seq), 2);
        assert_eq!(doc.sequence_get(seq, 0), Some(a));
        assert_eq!(doc.sequence_get(seq, 1), Some(b));
        assert_eq!(doc.parent(a), Some(seq));
    }

    #[test]
    fn test_sequence_prepend() {
        let mut doc = Document::new();
        let seq = doc.new_sequence();
        let a = scalar(&mut doc, "a");
        let b = scalar(&mut doc, "b");
        doc.sequence_append(seq, a).unwrap();
        doc.sequence_prepend(seq, b).unwrap();
        assert_eq!(doc.sequence_get(seq, 0), Some(b));
    }

    #[test]
    fn test_sequence_insert_before_after() {
        let mut doc = Document::new();
        let seq = doc.new_sequence();
        let a = scalar(&mut doc, "a");
        let c = scalar(&mut doc, "c");
        doc.sequence_append(seq, a).unwrap();
        doc.sequence_append(seq, c).unwrap();
        let b = scalar(&mut doc, "b");
        doc.sequence_insert_before(seq, c, b).unwrap();
        let d = scalar(&mut doc, "d");
        doc.sequence_insert_after(seq, c, d).unwrap();
        let texts: Vec<&str> = doc
            .sequence_iter(seq)
            .map(|n| doc.scalar_text(n).unwrap())
            .collect();
        assert_eq!(texts, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_sequence_remove() {
        let mut doc = Document::new();
        let seq = doc.new_sequence();
        let a = scalar(&mut doc, "a");
        doc.sequence_append(seq, a).unwrap();
        doc.sequence_remove(seq, a).unwrap();
        assert_eq!(doc.sequence_len(seq), 0);
        assert_eq!(doc.parent(a), None);
    }

    #[test]
    fn test_sequence_remove_missing_errors() {
        let mut doc = Document::new();
        let seq = doc.new_sequence();
        let stray = scalar(&mut doc, "x");
        assert!(doc.sequence_remove(seq, stray).is_err());
    }

    // ==================== mapping mutation tests ====================

    #[test]
    fn test_mapping_append_and_lookup() {
        let mut doc = Document::new();
        let map = doc.new_mapping();
        let k = scalar(&mut doc, "name");
        let v = scalar(&mut doc, "value");
        doc.mapping_append(map, k, v).unwrap();
        assert_eq!(doc.mapping_len(map), 1);
        assert_eq!(doc.mapping_lookup(map, "name"), Some(v));
        assert_eq!(doc.mapping_lookup(map, "other"), None);
        // Keys have no parent, values point at the mapping.
        assert_eq!(doc.parent(k), None);
        assert_eq!(doc.parent(v), Some(map));
    }

    #[test]
    fn test_mapping_duplicate_key_rejected() {
        let mut doc = Document::new();
        let map = doc.new_mapping();
        let k1 = scalar(&mut doc, "k");
        let v1 = scalar(&mut doc, "1");
        doc.mapping_append(map, k1, v1).unwrap();
        let k2 = scalar(&mut doc, "k");
        let v2 = scalar(&mut doc, "2");
        let err = doc.mapping_append(map, k2, v2).unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Semantic);
    }

    #[test]
    fn test_mapping_append_unchecked_allows_duplicates() {
        let mut doc = Document::new();
        let map = doc.new_mapping();
        let k1 = scalar(&mut doc, "k");
        let v1 = scalar(&mut doc, "1");
        let k2 = scalar(&mut doc, "k");
        let v2 = scalar(&mut doc, "2");
        doc.mapping_append_unchecked(map, k1, v1).unwrap();
        doc.mapping_append_unchecked(map, k2, v2).unwrap();
        assert_eq!(doc.mapping_len(map), 2);
    }

    #[test]
    fn test_mapping_remove_by_key() {
        let mut doc = Document::new();
        let map = doc.new_mapping();
        let k = scalar(&mut doc, "k");
        let v = scalar(&mut doc, "v");
        doc.mapping_append(map, k, v).unwrap();
        let removed = doc.mapping_remove_by_key(map, "k");
        assert_eq!(removed, Some(v));
        assert_eq!(doc.mapping_len(map), 0);
    }

    #[test]
    fn test_mapping_preserves_insertion_order() {
        let mut doc = Document::new();
        let map = doc.new_mapping();
        for name in ["zebra", "alpha", "mid"] {
            let k = scalar(&mut doc, name);
            let v = scalar(&mut doc, "x");
            doc.mapping_append(map, k, v).unwrap();
        }
        let keys: Vec<&str> = doc
            .mapping_iter(map)
            .map(|p| doc.scalar_text(p.key).unwrap())
            .collect();
        assert_eq!(keys, vec!["zebra", "alpha", "mid"]);
    }

    // ==================== insert (merge) tests ====================

    #[test]
    fn test_insert_scalar_overwrites() {
        let mut doc = Document::new();
        let target = scalar(&mut doc, "old");
        let source = scalar(&mut doc, "new");
        doc.insert(target, source).unwrap();
        assert_eq!(doc.scalar_text(target), Some("new"));
    }

    #[test]
    fn test_insert_sequence_appends() {
        let mut doc = Document::new();
        let target = doc.new_sequence();
        let a = scalar(&mut doc, "a");
        doc.sequence_append(target, a).unwrap();
        let source = doc.new_sequence();
        let b = scalar(&mut doc, "b");
        doc.sequence_append(source, b).unwrap();
        doc.insert(target, source).unwrap();
        assert_eq!(doc.sequence_len(target), 2);
    }

    #[test]
    fn test_insert_mapping_source_wins() {
        let mut doc = Document::new();
        let target = doc.new_mapping();
        let k = scalar(&mut doc, "k");
        let v = scalar(&mut doc, "old");
        doc.mapping_append(target, k, v).unwrap();
        let source = doc.new_mapping();
        let k2 = scalar(&mut doc, "k");
        let v2 = scalar(&mut doc, "new");
        doc.mapping_append(source, k2, v2).unwrap();
        doc.insert(target, source).unwrap();
        assert_eq!(doc.mapping_len(target), 1);
        let value = doc.mapping_lookup(target, "k").unwrap();
        assert_eq!(doc.scalar_text(value), Some("new"));
    }

    #[test]
    fn test_insert_kind_mismatch_errors() {
        let mut doc = Document::new();
        let s = scalar(&mut doc, "x");
        let seq = doc.new_sequence();
        assert!(doc.insert(s, seq).is_err());
    }

    // ==================== anchor tests ====================

    #[test]
    fn test_anchor_set_and_lookup() {
        let mut doc = Document::new();
        let node = scalar(&mut doc, "x");
        doc.set_anchor("a1", node).unwrap();
        assert_eq!(doc.lookup_anchor("a1"), Some(node));
        assert_eq!(doc.anchor_name_of(node), Some("a1"));
        assert_eq!(doc.lookup_anchor("missing"), None);
    }

    #[test]
    fn test_duplicate_anchor_rejected() {
        let mut doc = Document::new();
        let a = scalar(&mut doc, "x");
        let b = scalar(&mut doc, "y");
        doc.add_anchor(Token::synthetic_scalar("a1", ScalarStyle::Plain), a)
            .unwrap();
        assert!(doc
            .add_anchor(Token::synthetic_scalar("a1", ScalarStyle::Plain), b)
            .is_err());
    }

    #[test]
    fn test_most_recent_anchor_wins() {
        let mut doc = Document::new();
        let a = scalar(&mut doc, "x");
        let b = scalar(&mut doc, "y");
        doc.set_anchor("n", a).unwrap();
        // set_anchor replaces, so re-adding shadows the old node.
        doc.set_anchor("n", b).unwrap();
        assert_eq!(doc.lookup_anchor("n"), Some(b));
    }

    #[test]
    fn test_remove_anchor() {
        let mut doc = Document::new();
        let a = scalar(&mut doc, "x");
        doc.set_anchor("n", a).unwrap();
        doc.remove_anchor("n").unwrap();
        assert_eq!(doc.lookup_anchor("n"), None);
        assert!(doc.remove_anchor("n").is_err());
    }

    // ==================== parent invariant tests ====================

    #[test]
    fn test_reparent_after_mutation() {
        let mut doc = Document::new();
        let map = doc.new_mapping();
        let k = scalar(&mut doc, "k");
        let seq = doc.new_sequence();
        let item = scalar(&mut doc, "i");
        doc.sequence_append(seq, item).unwrap();
        doc.mapping_append(map, k, seq).unwrap();
        doc.set_root(Some(map));
        assert_eq!(doc.parent(map), None);
        assert_eq!(doc.parent(k), None);
        assert_eq!(doc.parent(seq), Some(map));
        assert_eq!(doc.parent(item), Some(seq));
    }

    #[test]
    fn test_deep_copy_shares_tokens() {
        let mut doc = Document::new();
        let seq = doc.new_sequence();
        let a = scalar(&mut doc, "a");
        doc.sequence_append(seq, a).unwrap();
        let copy = doc.deep_copy(seq);
        assert_ne!(copy, seq);
        assert_eq!(doc.sequence_len(copy), 1);
        let copied_item = doc.sequence_get(copy, 0).unwrap();
        assert_ne!(copied_item, a);
        assert_eq!(doc.scalar_text(copied_item), Some("a"));
    }
}
