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

//! Semantic node comparison.
//!
//! Scalars compare by decoded text, sequences element-wise in order, and
//! mappings pair-wise after sorting both sides with the default key
//! comparator, so two mappings with the same pairs in different insertion
//! order are equal. The default comparator orders mapping keys first,
//! then sequence keys, then scalar keys lexicographically by decoded
//! bytes, breaking ties by insertion index.

use crate::document::{Document, NodeId, NodeKind, NodePair};
use std::cmp::Ordering;

/// Semantic equality of two nodes, possibly across documents.
pub fn nodes_equal(da: &Document, a: NodeId, db: &Document, b: NodeId) -> bool {
    match (da.kind(a), db.kind(b)) {
        (NodeKind::Scalar, NodeKind::Scalar) => da.scalar_text(a) == db.scalar_text(b),
        (NodeKind::Sequence, NodeKind::Sequence) => {
            if da.sequence_len(a) != db.sequence_len(b) {
                return false;
            }
            da.sequence_iter(a)
                .zip(db.sequence_iter(b))
                .all(|(x, y)| nodes_equal(da, x, db, y))
        }
        (NodeKind::Mapping, NodeKind::Mapping) => {
            if da.mapping_len(a) != db.mapping_len(b) {
                return false;
            }
            let pa: Vec<NodePair> = da.mapping_iter(a).collect();
            let pb: Vec<NodePair> = db.mapping_iter(b).collect();
            let ia = sorted_pair_indices(da, &pa);
            let ib = sorted_pair_indices(db, &pb);
            ia.iter().zip(ib.iter()).all(|(&x, &y)| {
                nodes_equal(da, pa[x].key, db, pb[y].key)
                    && nodes_equal(da, pa[x].value, db, pb[y].value)
            })
        }
        _ => false,
    }
}

/// Semantic equality of two documents. Documents without content are
/// equal to each other.
pub fn documents_equal(a: &Document, b: &Document) -> bool {
    match (a.root(), b.root()) {
        (None, None) => true,
        (Some(ra), Some(rb)) => nodes_equal(a, ra, b, rb),
        _ => false,
    }
}

fn kind_rank(kind: NodeKind) -> u8 {
    match kind {
        NodeKind::Mapping => 0,
        NodeKind::Sequence => 1,
        NodeKind::Scalar => 2,
    }
}

/// The default key ordering between two pairs of one mapping, ignoring
/// insertion-index tie-breaks (the caller supplies those).
pub fn pair_key_order(doc: &Document, a: &NodePair, b: &NodePair) -> Ordering {
    let ka = doc.kind(a.key);
    let kb = doc.kind(b.key);
    match kind_rank(ka).cmp(&kind_rank(kb)) {
        Ordering::Equal => {}
        other => return other,
    }
    if ka == NodeKind::Scalar {
        let ta = doc.scalar_text(a.key).unwrap_or("");
        let tb = doc.scalar_text(b.key).unwrap_or("");
        return ta.as_bytes().cmp(tb.as_bytes());
    }
    Ordering::Equal
}

/// Indices of `pairs` in default-comparator order, stable on ties.
pub fn sorted_pair_indices(doc: &Document, pairs: &[NodePair]) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..pairs.len()).collect();
    indices.sort_by(|&i, &j| {
        pair_key_order(doc, &pairs[i], &pairs[j]).then_with(|| i.cmp(&j))
    });
    indices
}
