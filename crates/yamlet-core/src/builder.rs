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

//! Building documents from parse events.
//!
//! One [`DocumentBuilder::build_next`] call consumes the events of one
//! document and materialises the tree. The builder keeps its partial
//! state across the `NeedMoreInput` sentinel, so streamed parses resume
//! where they stopped. Anchors register as their events arrive, before
//! any alias that might reference them; duplicate mapping keys are
//! rejected here, pointing at the offending key.

use crate::compare;
use crate::diag::Diagnostic;
use crate::document::{Document, NodeId, NodeStyle};
use crate::error::{YamlError, YamlResult};
use crate::event::EventData;
use crate::mark::Mark;
use crate::parser::Parser;
use crate::resolver;
use crate::token::Token;

#[derive(Debug)]
enum Ctx {
    Sequence(NodeId),
    Mapping {
        node: NodeId,
        pending_key: Option<(NodeId, Mark)>,
    },
}

/// Incremental events-to-tree builder. See the module docs.
#[derive(Debug, Default)]
pub struct DocumentBuilder {
    doc: Option<Document>,
    stack: Vec<Ctx>,
    root: Option<NodeId>,
}

impl DocumentBuilder {
    /// Create an idle builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the next document in the stream, or `None` once the stream
    /// is exhausted. On the `NeedMoreInput` sentinel the partial tree is
    /// kept; call again after feeding the input.
    pub fn build_next(&mut self, parser: &mut Parser) -> YamlResult<Option<Document>> {
        loop {
            let event = match parser.next_event() {
                Ok(Some(event)) => event,
                Ok(None) => {
                    if self.doc.is_some() {
                        return Err(YamlError::grammar(
                            "stream ended inside an unfinished document",
                        ));
                    }
                    return Ok(None);
                }
                Err(e) => {
                    if !e.is_need_more() {
                        self.abandon();
                    }
                    return Err(e);
                }
            };
            match self.apply(parser, event.data, event.start) {
                Ok(Some(doc)) => return Ok(Some(doc)),
                Ok(None) => {}
                Err(e) => {
                    self.fail(parser, &e);
                    return Err(e);
                }
            }
        }
    }

    fn abandon(&mut self) {
        self.doc = None;
        self.stack.clear();
        self.root = None;
    }

    fn fail(&mut self, parser: &mut Parser, error: &YamlError) {
        let mut diag = Diagnostic::error("doc", &error.message);
        if let Some(mark) = error.mark {
            diag = diag.locate(parser.input(), mark);
        }
        parser.report_diag(diag);
        if let Some(doc) = &mut self.doc {
            doc.set_parse_error();
        }
        self.abandon();
    }

    fn apply(
        &mut self,
        parser: &mut Parser,
        data: EventData,
        start: Mark,
    ) -> YamlResult<Option<Document>> {
        match data {
            EventData::StreamStart => Ok(None),
            EventData::StreamEnd => Ok(None),
            EventData::DocumentStart { state, implicit: _ } => {
                self.doc = Some(Document::with_state(state));
                self.stack.clear();
                self.root = None;
                Ok(None)
            }
            EventData::DocumentEnd { implicit } => {
                let mut doc = self
                    .doc
                    .take()
                    .ok_or_else(|| YamlError::api("document end without a document"))?;
                if !implicit {
                    doc.state_mut().end_implicit = false;
                }
                doc.set_root(self.root.take());
                if parser.options().resolve_on_build {
                    let limits = parser.options().limits.clone();
                    resolver::resolve(&mut doc, &limits)?;
                }
                doc.push_diagnostics(parser.take_diagnostics());
                self.stack.clear();
                Ok(Some(doc))
            }
            EventData::Scalar {
                anchor,
                tag,
                value,
                style,
                ..
            } => {
                let node = {
                    let doc = self.doc_mut()?;
                    let node =
                        doc.new_scalar_from_token(value, NodeStyle::from_scalar(style));
                    doc.set_tag(node, tag);
                    node
                };
                self.register_anchor(anchor, node)?;
                self.attach(node, start)?;
                Ok(None)
            }
            EventData::Alias { anchor } => {
                let doc = self.doc_mut()?;
                let node = doc.new_scalar_from_token(anchor, NodeStyle::Alias);
                self.attach(node, start)?;
                Ok(None)
            }
            EventData::SequenceStart {
                anchor, tag, flow, ..
            } => {
                let node = {
                    let doc = self.doc_mut()?;
                    let node = doc.new_sequence();
                    doc.set_tag(node, tag);
                    doc.set_style(node, if flow { NodeStyle::Flow } else { NodeStyle::Block });
                    node
                };
                self.register_anchor(anchor, node)?;
                self.attach(node, start)?;
                self.stack.push(Ctx::Sequence(node));
                Ok(None)
            }
            EventData::MappingStart {
                anchor, tag, flow, ..
            } => {
                let node = {
                    let doc = self.doc_mut()?;
                    let node = doc.new_mapping();
                    doc.set_tag(node, tag);
                    doc.set_style(node, if flow { NodeStyle::Flow } else { NodeStyle::Block });
                    node
                };
                self.register_anchor(anchor, node)?;
                self.attach(node, start)?;
                self.stack.push(Ctx::Mapping {
                    node,
                    pending_key: None,
                });
                Ok(None)
            }
            EventData::SequenceEnd | EventData::MappingEnd => {
                self.stack.pop();
                Ok(None)
            }
        }
    }

    fn doc_mut(&mut self) -> YamlResult<&mut Document> {
        self.doc
            .as_mut()
            .ok_or_else(|| YamlError::api("content event outside a document"))
    }

    fn register_anchor(&mut self, anchor: Option<Token>, node: NodeId) -> YamlResult<()> {
        if let Some(name) = anchor {
            self.doc_mut()?.add_anchor(name, node)?;
        }
        Ok(())
    }

    /// Place a finished node into the enclosing context. The attach
    /// order follows the event order, so containers receive children as
    /// they complete.
    fn attach(&mut self, node: NodeId, mark: Mark) -> YamlResult<()> {
        // Resolve what to do while borrowing the stack, then release it
        // before touching the arena.
        enum Action {
            Root,
            Append(NodeId),
            Pair(NodeId, NodeId, Mark),
        }
        let action = match self.stack.last_mut() {
            None => Action::Root,
            Some(Ctx::Sequence(seq)) => Action::Append(*seq),
            Some(Ctx::Mapping { node: map, pending_key }) => match pending_key.take() {
                None => {
                    *pending_key = Some((node, mark));
                    return Ok(());
                }
                Some((key, key_mark)) => Action::Pair(*map, key, key_mark),
            },
        };
        match action {
            Action::Root => {
                self.root = Some(node);
                Ok(())
            }
            Action::Append(seq) => self.doc_mut()?.sequence_append(seq, node),
            Action::Pair(map, key, key_mark) => {
                let doc = self.doc_mut()?;
                let duplicate = doc
                    .mapping_iter(map)
                    .any(|p| compare::nodes_equal(doc, p.key, doc, key));
                if duplicate {
                    let text = doc.scalar_text(key).unwrap_or("<collection>").to_string();
                    return Err(YamlError::semantic(format!(
                        "duplicate mapping key '{text}'"
                    ))
                    .at(key_mark));
                }
                doc.mapping_append_unchecked(map, key, node)
            }
        }
    }
}

impl Document {
    /// Build the next document from a parser. Streamed inputs must be
    /// finished; use [`DocumentBuilder`] directly to resume across the
    /// `NeedMoreInput` sentinel.
    pub fn build_next(parser: &mut Parser) -> YamlResult<Option<Document>> {
        DocumentBuilder::new().build_next(parser)
    }

    /// Parse one document from a string (the first of the stream). An
    /// empty stream yields an empty document.
    pub fn from_str_opts(
        text: &str,
        options: crate::options::ParseOptions,
    ) -> YamlResult<Document> {
        let mut parser = Parser::from_str(text, options);
        Ok(Self::build_next(&mut parser)?.unwrap_or_default())
    }

    /// Parse one document with default options.
    pub fn from_yaml_str(text: &str) -> YamlResult<Document> {
        Self::from_str_opts(text, crate::options::ParseOptions::default())
    }

    /// Parse one document from bytes.
    pub fn from_yaml_bytes(
        bytes: Vec<u8>,
        options: crate::options::ParseOptions,
    ) -> YamlResult<Document> {
        let mut parser = Parser::from_bytes(bytes, options);
        Ok(Self::build_next(&mut parser)?.unwrap_or_default())
    }

    /// Parse one document from a file.
    pub fn from_yaml_path(
        path: &std::path::Path,
        options: crate::options::ParseOptions,
    ) -> YamlResult<Document> {
        let mut parser = Parser::from_path(path, options)?;
        Ok(Self::build_next(&mut parser)?.unwrap_or_default())
    }

    /// Parse one document from a reader (the bytes are drained up
    /// front).
    pub fn from_yaml_reader<R: std::io::Read>(
        mut reader: R,
        options: crate::options::ParseOptions,
    ) -> YamlResult<Document> {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;
        if buf.len() > options.limits.max_input_size {
            return Err(YamlError::limit("input exceeds the configured size limit"));
        }
        Self::from_yaml_bytes(buf, options)
    }

    /// Parse every document in a stream.
    pub fn parse_all(
        text: &str,
        options: crate::options::ParseOptions,
    ) -> YamlResult<Vec<Document>> {
        let mut parser = Parser::from_str(text, options);
        let mut docs = Vec::new();
        while let Some(doc) = Self::build_next(&mut parser)? {
            docs.push(doc);
        }
        Ok(docs)
    }

    /// Parse `yaml` and compare it semantically against this document.
    pub fn compare_to_yaml_string(&self, yaml: &str) -> bool {
        match Self::from_yaml_str(yaml) {
            Ok(other) => compare::documents_equal(self, &other),
            Err(_) => false,
        }
    }

    /// Semantic equality against another document.
    pub fn compare(&self, other: &Document) -> bool {
        compare::documents_equal(self, other)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::NodeKind;
    use crate::options::ParseOptions;

    // ==================== basic build tests ====================

    #[test]
    fn test_build_scalar_document() {
        let doc = Document::from_yaml_str("hello\n").unwrap();
        let root = doc.root().unwrap();
        assert_eq!(doc.kind(root), NodeKind::Scalar);
        assert_eq!(doc.scalar_text(root), Some("hello"));
    }

    #[test]
    fn test_build_empty_stream() {
        let doc = Document::from_yaml_str("").unwrap();
        assert!(doc.root().is_none());
    }

    #[test]
    fn test_build_mapping() {
        let doc = Document::from_yaml_str("a: 1\nb: two\n").unwrap();
        let root = doc.root().unwrap();
        assert_eq!(doc.kind(root), NodeKind::Mapping);
        assert_eq!(doc.mapping_len(root), 2);
        let a = doc.mapping_lookup(root, "a").unwrap();
        assert_eq!(doc.scalar_text(a), Some("1"));
        let b = doc.mapping_lookup(root, "b").unwrap();
        assert_eq!(doc.scalar_text(b), Some("two"));
    }

    #[test]
    fn test_build_nested() {
        let doc = Document::from_yaml_str("outer:\n  inner:\n  - 1\n  - 2\n").unwrap();
        let root = doc.root().unwrap();
        let outer = doc.mapping_lookup(root, "outer").unwrap();
        let inner = doc.mapping_lookup(outer, "inner").unwrap();
        assert_eq!(doc.kind(inner), NodeKind::Sequence);
        assert_eq!(doc.sequence_len(inner), 2);
    }

    #[test]
    fn test_parse_all_multiple_documents() {
        let docs = Document::parse_all("one\n---\ntwo\n", ParseOptions::default()).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].scalar_text(docs[0].root().unwrap()), Some("one"));
        assert_eq!(docs[1].scalar_text(docs[1].root().unwrap()), Some("two"));
    }

    // ==================== parent invariant tests ====================

    #[test]
    fn test_built_tree_parent_invariants() {
        let doc = Document::from_yaml_str("a:\n- 1\n- x: y\n").unwrap();
        let root = doc.root().unwrap();
        assert_eq!(doc.parent(root), None);
        for pair in doc.mapping_iter(root) {
            assert_eq!(doc.parent(pair.key), None);
            assert_eq!(doc.parent(pair.value), Some(root));
        }
    }

    // ==================== anchor tests ====================

    #[test]
    fn test_anchors_registered() {
        let doc = Document::from_str_opts(
            "a: &first 1\nb: &second 2\n",
            ParseOptions::builder().resolve_on_build(false).build(),
        )
        .unwrap();
        assert!(doc.lookup_anchor("first").is_some());
        assert!(doc.lookup_anchor("second").is_some());
        assert_eq!(doc.anchors().count(), 2);
    }

    #[test]
    fn test_duplicate_anchor_is_error() {
        let result = Document::from_yaml_str("a: &x 1\nb: &x 2\n");
        assert!(result.is_err());
    }

    // ==================== duplicate key tests ====================

    #[test]
    fn test_duplicate_key_is_error() {
        let result = Document::from_yaml_str("k: 1\nk: 2\n");
        let err = result.unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::Semantic);
        // The diagnostic points at the second key, on line 2.
        assert_eq!(err.mark.map(|m| m.line), Some(1));
    }

    #[test]
    fn test_duplicate_key_diagnostic_captured() {
        let mut parser = Parser::from_str(
            "k: 1\nk: 2\n",
            ParseOptions::builder()
                .collect_diagnostics(true)
                .quiet(true)
                .build(),
        );
        let result = Document::build_next(&mut parser);
        assert!(result.is_err());
        let diags = parser.take_diagnostics();
        assert!(!diags.is_empty());
        assert!(diags[0].render().contains("duplicate mapping key"));
        assert!(diags[0].render().contains(":2:"));
    }

    // ==================== comparison helpers ====================

    #[test]
    fn test_compare_to_yaml_string() {
        let doc = Document::from_yaml_str("b: 2\na: 1\n").unwrap();
        assert!(doc.compare_to_yaml_string("a: 1\nb: 2\n"));
        assert!(!doc.compare_to_yaml_string("a: 1\nb: 3\n"));
    }

    // ==================== long implicit key (S4-adjacent) ====================

    #[test]
    fn test_very_long_implicit_key_builds() {
        let key = "x".repeat(2_000);
        let doc = Document::from_yaml_str(&format!("{key}: value\n")).unwrap();
        let root = doc.root().unwrap();
        assert_eq!(doc.mapping_len(root), 1);
        let value = doc.mapping_lookup(root, &key).unwrap();
        assert_eq!(doc.scalar_text(value), Some("value"));
    }
}
