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

//! Resolution: aliases and `<<` merge keys.
//!
//! One walk in document order. Alias nodes are replaced in place by a
//! structural deep copy of their anchor target (tokens shared); since
//! anchors are declared before use, a target's own aliases were already
//! substituted when the walk reaches a reference to it. A mapping pair
//! is a merge directive iff its key is a plain scalar `<<` and its value
//! is an alias to a mapping or a sequence of such aliases; the
//! referenced pairs are copied in after the merge pair in declaration
//! order, existing keys win, and the merge pair itself is removed.
//! Recursion depth and total expansion are bounded by the limits to
//! catch malformed or hostile input.

use crate::compare;
use crate::document::{Document, NodeId, NodeKind, NodePair, NodeStyle};
use crate::error::{YamlError, YamlResult};
use crate::limits::Limits;
use crate::mark::Mark;

/// Resolve every alias and merge key under the document root, then
/// re-establish parent links. Post-condition: no alias nodes and no
/// `<<` keys remain.
pub fn resolve(doc: &mut Document, limits: &Limits) -> YamlResult<()> {
    let Some(root) = doc.root() else {
        return Ok(());
    };
    let mut budget = Budget {
        remaining: limits.max_expanded_nodes,
    };
    resolve_node(doc, root, 0, limits, &mut budget)?;
    doc.reparent();
    Ok(())
}

struct Budget {
    remaining: usize,
}

impl Budget {
    fn charge(&mut self, nodes: usize, mark: Option<Mark>) -> YamlResult<()> {
        if nodes > self.remaining {
            let mut err =
                YamlError::limit("alias or merge expansion exceeds the node limit");
            if let Some(mark) = mark {
                err = err.at(mark);
            }
            return Err(err);
        }
        self.remaining -= nodes;
        Ok(())
    }
}

fn resolve_node(
    doc: &mut Document,
    id: NodeId,
    depth: usize,
    limits: &Limits,
    budget: &mut Budget,
) -> YamlResult<()> {
    if depth > limits.max_alias_depth {
        return Err(YamlError::semantic("alias resolution depth limit exceeded"));
    }
    if doc.is_alias(id) {
        return resolve_alias(doc, id, depth, limits, budget);
    }
    match doc.kind(id) {
        NodeKind::Scalar => Ok(()),
        NodeKind::Sequence => {
            let items: Vec<NodeId> = doc.sequence_iter(id).collect();
            for item in items {
                resolve_node(doc, item, depth, limits, budget)?;
            }
            Ok(())
        }
        NodeKind::Mapping => {
            let mut index = 0;
            while index < doc.mapping_len(id) {
                let pair = match doc.mapping_get(id, index) {
                    Some(pair) => pair,
                    None => break,
                };
                if is_merge_pair(doc, &pair) {
                    expand_merge(doc, id, index, budget)?;
                    // The inserted copies are walked next; a source that
                    // was already resolved contributes nothing further.
                    continue;
                }
                resolve_node(doc, pair.key, depth, limits, budget)?;
                resolve_node(doc, pair.value, depth, limits, budget)?;
                index += 1;
            }
            Ok(())
        }
    }
}

/// Replace an alias node in place by a deep copy of its anchor target.
fn resolve_alias(
    doc: &mut Document,
    id: NodeId,
    depth: usize,
    limits: &Limits,
    budget: &mut Budget,
) -> YamlResult<()> {
    let (name, mark) = match doc.scalar_token(id) {
        Some(token) => (token.text().to_string(), token.start()),
        None => return Err(YamlError::semantic("malformed alias node")),
    };
    let target = doc.lookup_anchor(&name).ok_or_else(|| {
        YamlError::semantic(format!("undefined alias '*{name}'")).at(mark)
    })?;
    tracing::trace!(target: "yamlet_core::resolver", "expanding alias *{name}");
    let before = doc.node_count();
    let copy = doc.deep_copy(target);
    budget.charge(doc.node_count() - before, Some(mark))?;
    let parent = doc.data(id).parent;
    let mut data = doc.data(copy).clone();
    data.parent = parent;
    if data.style == NodeStyle::Alias {
        // The anchor target was itself an alias (possible only with a
        // forward reference); normalise and resolve the copy.
        *doc.data_mut(id) = data;
        return resolve_node(doc, id, depth + 1, limits, budget);
    }
    *doc.data_mut(id) = data;
    // A forward-referenced target may still contain unresolved content.
    resolve_node(doc, id, depth + 1, limits, budget)
}

/// True iff the pair is a `<<` merge directive key.
fn is_merge_pair(doc: &Document, pair: &NodePair) -> bool {
    doc.scalar_token(pair.key)
        .is_some_and(|t| t.is_plain_scalar("<<"))
        && !doc.is_alias(pair.key)
}

/// The mapping an alias refers to, for merge validation.
fn merge_source(doc: &Document, value: NodeId) -> Option<NodeId> {
    if !doc.is_alias(value) {
        return None;
    }
    let name = doc.scalar_text(value)?;
    let target = doc.lookup_anchor(name)?;
    (doc.kind(target) == NodeKind::Mapping).then_some(target)
}

/// Expand the merge pair at `index` of `map`: splice the referenced
/// mappings' pairs in after it (declaration order, first writer wins)
/// and drop the pair.
fn expand_merge(
    doc: &mut Document,
    map: NodeId,
    index: usize,
    budget: &mut Budget,
) -> YamlResult<()> {
    let pair = doc
        .mapping_get(map, index)
        .ok_or_else(|| YamlError::api("merge pair index out of range"))?;
    let mark = doc.scalar_token(pair.key).map(|t| t.start());
    let invalid = || {
        let mut err = YamlError::semantic("invalid merge key value");
        if let Some(mark) = mark {
            err = err.at(mark);
        }
        err
    };

    // Collect the referenced mappings in declaration order.
    let mut sources: Vec<NodeId> = Vec::new();
    if let Some(source) = merge_source(doc, pair.value) {
        sources.push(source);
    } else if doc.kind(pair.value) == NodeKind::Sequence {
        let items: Vec<NodeId> = doc.sequence_iter(pair.value).collect();
        for item in items {
            sources.push(merge_source(doc, item).ok_or_else(invalid)?);
        }
    } else {
        return Err(invalid());
    }

    // Decide what to insert while the merge pair is still present, so a
    // self-referential merge sees its own keys as duplicates.
    let mut to_insert: Vec<NodePair> = Vec::new();
    for source in &sources {
        let pairs: Vec<NodePair> = doc.mapping_iter(*source).collect();
        for sp in pairs {
            let already_present = doc
                .mapping_iter(map)
                .any(|p| compare::nodes_equal(doc, p.key, doc, sp.key))
                || to_insert
                    .iter()
                    .any(|p| compare::nodes_equal(doc, p.key, doc, sp.key));
            if !already_present {
                to_insert.push(sp);
            }
        }
    }

    // Remove the merge pair, then splice the copies in at its position.
    doc.mapping_pairs_mut(map)?.remove(index);
    let mut at = index;
    for sp in to_insert {
        let before = doc.node_count();
        let key = doc.deep_copy(sp.key);
        let value = doc.deep_copy(sp.value);
        budget.charge(doc.node_count() - before, mark)?;
        doc.mapping_pairs_mut(map)?
            .insert(at, NodePair { key, value });
        at += 1;
    }
    Ok(())
}
