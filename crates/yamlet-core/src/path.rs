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

//! Path-based node addressing.
//!
//! A path is a `/`-separated chain of components. A component addresses
//! a mapping entry by key text (optionally quoted, with backslash
//! escapes for the special characters) or a sequence item by index,
//! written bare (`0`) or bracketed (`[0]`). `path_of` produces the
//! canonical address of a node; mapping keys are not addressable and
//! report the root path.

use crate::document::{Document, NodeId, NodeKind};

impl Document {
    /// Resolve a path from the document root.
    pub fn lookup_by_path(&self, path: &str) -> Option<NodeId> {
        let root = self.root()?;
        self.lookup_by_path_from(root, path)
    }

    /// Resolve a path starting at a node.
    pub fn lookup_by_path_from(&self, from: NodeId, path: &str) -> Option<NodeId> {
        let mut current = from;
        let mut rest = path;
        loop {
            rest = rest.trim_start_matches('/');
            if rest.is_empty() {
                return Some(current);
            }
            let (component, remainder) = split_component(rest)?;
            rest = remainder;
            current = self.step(current, &component)?;
        }
    }

    fn step(&self, node: NodeId, component: &str) -> Option<NodeId> {
        match self.kind(node) {
            NodeKind::Sequence => {
                let index = parse_index(component)?;
                self.sequence_get(node, index)
            }
            NodeKind::Mapping => self.mapping_lookup(node, component),
            NodeKind::Scalar => None,
        }
    }

    /// The canonical path of a node: `/` for the root, components for
    /// each ancestor below it.
    pub fn path_of(&self, id: NodeId) -> String {
        let mut components: Vec<String> = Vec::new();
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            components.push(self.address_in(parent, current));
            current = parent;
        }
        if components.is_empty() {
            return "/".to_string();
        }
        components.reverse();
        let mut out = String::new();
        for component in components {
            out.push('/');
            out.push_str(&component);
        }
        out
    }

    /// The address of `child` within `parent`.
    fn address_in(&self, parent: NodeId, child: NodeId) -> String {
        match self.kind(parent) {
            NodeKind::Sequence => {
                let index = self
                    .sequence_iter(parent)
                    .position(|n| n == child)
                    .unwrap_or(0);
                format!("[{index}]")
            }
            NodeKind::Mapping => {
                let key = self
                    .mapping_iter(parent)
                    .find(|p| p.value == child)
                    .map(|p| p.key);
                match key {
                    Some(key) => self.render_key(key),
                    None => String::new(),
                }
            }
            NodeKind::Scalar => String::new(),
        }
    }

    /// Render a key node as a path component.
    fn render_key(&self, key: NodeId) -> String {
        match self.kind(key) {
            NodeKind::Scalar => escape_component(self.scalar_text(key).unwrap_or("")),
            NodeKind::Sequence => {
                let items: Vec<String> = self
                    .sequence_iter(key)
                    .map(|n| self.render_key(n))
                    .collect();
                format!("[{}]", items.join(", "))
            }
            NodeKind::Mapping => {
                let pairs: Vec<String> = self
                    .mapping_iter(key)
                    .map(|p| {
                        format!("{}: {}", self.render_key(p.key), self.render_key(p.value))
                    })
                    .collect();
                format!("{{{}}}", pairs.join(", "))
            }
        }
    }
}

/// Split the leading component off a path, handling quotes and
/// backslash escapes. Returns the decoded component and the remainder.
fn split_component(path: &str) -> Option<(String, &str)> {
    let mut out = String::new();
    let mut chars = path.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        match c {
            '/' => return Some((out, &path[i..])),
            '\\' => {
                let (_, escaped) = chars.next()?;
                if !"/*&.{}[]\\\"'".contains(escaped) {
                    return None;
                }
                out.push(escaped);
            }
            '"' => {
                // A double-quoted stretch; \" escapes a quote.
                loop {
                    let (_, q) = chars.next()?;
                    match q {
                        '"' => break,
                        '\\' => {
                            let (_, e) = chars.next()?;
                            out.push(e);
                        }
                        other => out.push(other),
                    }
                }
            }
            '\'' => {
                // A single-quoted stretch; '' escapes a quote.
                loop {
                    let (_, q) = chars.next()?;
                    if q == '\'' {
                        if chars.peek().map(|&(_, n)| n) == Some('\'') {
                            chars.next();
                            out.push('\'');
                        } else {
                            break;
                        }
                    } else {
                        out.push(q);
                    }
                }
            }
            other => out.push(other),
        }
    }
    Some((out, ""))
}

/// Parse a sequence index component: bare digits or `[digits]`.
fn parse_index(component: &str) -> Option<usize> {
    let digits = component
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .unwrap_or(component);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

/// Escape a key for use as a path component.
fn escape_component(text: &str) -> String {
    if text.is_empty() {
        return "\"\"".to_string();
    }
    if !text.contains(['/', '"', '\'', '\\', '[', ']', '{', '}']) {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

#[cfg(test)]
mod tests {
    use crate::document::Document;

    // ==================== lookup tests ====================

    #[test]
    fn test_lookup_mapping_key() {
        let doc = Document::from_yaml_str("invoice: 34843\ndate: today\n").unwrap();
        let node = doc.lookup_by_path("/invoice").unwrap();
        assert_eq!(doc.scalar_text(node), Some("34843"));
    }

    #[test]
    fn test_lookup_nested() {
        let doc = Document::from_yaml_str("a:\n  b:\n    c: deep\n").unwrap();
        let node = doc.lookup_by_path("/a/b/c").unwrap();
        assert_eq!(doc.scalar_text(node), Some("deep"));
    }

    #[test]
    fn test_lookup_sequence_index() {
        let doc = Document::from_yaml_str("items: [x, y, z]\n").unwrap();
        let y = doc.lookup_by_path("/items/1").unwrap();
        assert_eq!(doc.scalar_text(y), Some("y"));
        let z = doc.lookup_by_path("/items/[2]").unwrap();
        assert_eq!(doc.scalar_text(z), Some("z"));
    }

    #[test]
    fn test_lookup_missing_returns_none() {
        let doc = Document::from_yaml_str("a: 1\n").unwrap();
        assert!(doc.lookup_by_path("/missing").is_none());
        assert!(doc.lookup_by_path("/a/too/deep").is_none());
    }

    #[test]
    fn test_lookup_quoted_component() {
        let doc = Document::from_yaml_str("\"a/b\": 1\n").unwrap();
        let node = doc.lookup_by_path("/\"a/b\"").unwrap();
        assert_eq!(doc.scalar_text(node), Some("1"));
    }

    #[test]
    fn test_lookup_escaped_component() {
        let doc = Document::from_yaml_str("\"a/b\": 1\n").unwrap();
        let node = doc.lookup_by_path("/a\\/b").unwrap();
        assert_eq!(doc.scalar_text(node), Some("1"));
    }

    #[test]
    fn test_root_path_lookup() {
        let doc = Document::from_yaml_str("a: 1\n").unwrap();
        let root = doc.lookup_by_path("/").unwrap();
        assert_eq!(Some(root), doc.root());
    }

    #[test]
    fn test_redundant_slashes_ignored() {
        let doc = Document::from_yaml_str("a:\n  b: 1\n").unwrap();
        assert!(doc.lookup_by_path("//a//b").is_some());
    }

    // ==================== path_of tests ====================

    #[test]
    fn test_path_of_root() {
        let doc = Document::from_yaml_str("a: 1\n").unwrap();
        assert_eq!(doc.path_of(doc.root().unwrap()), "/");
    }

    #[test]
    fn test_path_of_mapping_value() {
        let doc = Document::from_yaml_str("a:\n  b: 1\n").unwrap();
        let node = doc.lookup_by_path("/a/b").unwrap();
        assert_eq!(doc.path_of(node), "/a/b");
    }

    #[test]
    fn test_path_of_sequence_item() {
        let doc = Document::from_yaml_str("items:\n- x\n- y\n").unwrap();
        let node = doc.lookup_by_path("/items/1").unwrap();
        assert_eq!(doc.path_of(node), "/items/[1]");
    }

    #[test]
    fn test_path_roundtrip() {
        let doc = Document::from_yaml_str("a:\n  list:\n  - k: v\n").unwrap();
        let node = doc.lookup_by_path("/a/list/0/k").unwrap();
        let path = doc.path_of(node);
        assert_eq!(doc.lookup_by_path(&path), Some(node));
    }
}
