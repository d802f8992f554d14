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

//! The emitter: document trees to tagged byte chunks.
//!
//! Emission walks the node tree and writes through an [`EmitSink`],
//! choosing scalar styles from the node hints, the content analysis, and
//! the configured mode. The width budget is a soft target applied at
//! separator positions; an indivisible token is never split. No BOM is
//! ever produced.

use crate::config::{EmitConfig, EmitMode, MarkerPolicy};
use crate::scalar::{
    analyze, escape_double_quoted, escape_json, escape_single_quoted, is_json_scalar,
};
use crate::sink::{EmitSink, WriteKind};
use yamlet_core::compare;
use yamlet_core::docstate::CORE_PREFIX;
use yamlet_core::{Document, NodeId, NodeKind, NodePair, NodeStyle, YamlError, YamlResult};

/// Recursion guard for hostile or corrupted trees.
const MAX_EMIT_DEPTH: usize = 1000;

/// A tree-walking emitter over a caller-supplied sink.
pub struct Emitter<'a> {
    config: EmitConfig,
    sink: &'a mut dyn EmitSink,
    column: usize,
    documents_emitted: usize,
}

impl<'a> Emitter<'a> {
    /// Create an emitter writing to `sink`.
    pub fn new(sink: &'a mut dyn EmitSink, config: EmitConfig) -> Self {
        Self {
            config,
            sink,
            column: 0,
            documents_emitted: 0,
        }
    }

    // ==================== low-level output ====================

    fn put(&mut self, kind: WriteKind, text: &str) -> YamlResult<()> {
        debug_assert!(!text.contains('\n'), "line breaks go through newline()");
        self.sink.write(kind, text.as_bytes())?;
        self.column += text.chars().count();
        Ok(())
    }

    fn newline(&mut self) -> YamlResult<()> {
        self.sink.write(WriteKind::LineBreak, b"\n")?;
        self.column = 0;
        Ok(())
    }

    fn indent(&mut self, columns: usize) -> YamlResult<()> {
        if columns > 0 {
            let spaces = " ".repeat(columns);
            self.put(WriteKind::Indent, &spaces)?;
        }
        Ok(())
    }

    fn over_width(&self) -> bool {
        self.config
            .width_limit()
            .is_some_and(|w| self.column >= w)
    }

    // ==================== documents ====================

    /// Emit one document, markers and directives per configuration.
    pub fn emit_document(&mut self, doc: &Document) -> YamlResult<()> {
        if self.config.mode.is_json() {
            if let Some(root) = doc.root() {
                self.emit_json_node(doc, root, 0, 0)?;
                self.newline()?;
            }
            self.documents_emitted += 1;
            return Ok(());
        }

        let state = doc.state();
        let mut wrote_directives = false;
        let version_wanted = match self.config.version_directive {
            MarkerPolicy::On => true,
            MarkerPolicy::Off => false,
            MarkerPolicy::Auto => state.version_explicit,
        };
        if version_wanted {
            let v = state.version;
            self.put(
                WriteKind::VersionDirective,
                &format!("%YAML {}.{}", v.major, v.minor),
            )?;
            self.newline()?;
            wrote_directives = true;
        }
        if self.config.tag_directives != MarkerPolicy::Off {
            for directive in state.explicit_tag_directives() {
                self.put(
                    WriteKind::TagDirective,
                    &format!("%TAG {} {}", directive.handle, directive.prefix),
                )?;
                self.newline()?;
                wrote_directives = true;
            }
        }

        let start_wanted = match self.config.doc_start_mark {
            MarkerPolicy::On => true,
            MarkerPolicy::Off => false,
            MarkerPolicy::Auto => {
                wrote_directives || self.documents_emitted > 0 || !state.start_implicit
            }
        };

        match doc.root() {
            Some(root) => {
                let inline_root = start_wanted
                    && (doc.kind(root) == NodeKind::Scalar
                        || self.effective_flow(doc, root)
                        || self.collection_is_empty(doc, root));
                if start_wanted {
                    self.put(WriteKind::DocumentIndicator, "---")?;
                    if inline_root {
                        self.put(WriteKind::Whitespace, " ")?;
                    } else {
                        self.newline()?;
                    }
                }
                self.emit_block_node(doc, root, 0, inline_root)?;
            }
            None => {
                if start_wanted {
                    self.put(WriteKind::DocumentIndicator, "---")?;
                    self.newline()?;
                }
            }
        }

        let end_wanted = match self.config.doc_end_mark {
            MarkerPolicy::On => true,
            MarkerPolicy::Off => false,
            MarkerPolicy::Auto => !state.end_implicit,
        };
        if end_wanted {
            self.put(WriteKind::DocumentIndicator, "...")?;
            self.newline()?;
        }
        self.documents_emitted += 1;
        Ok(())
    }

    /// Emit the directives and start marker of a document, for callers
    /// that drive node emission themselves.
    pub fn emit_document_start(&mut self, doc: &Document) -> YamlResult<()> {
        if self.config.mode.is_json() {
            return Ok(());
        }
        let state = doc.state();
        let mut wrote_directives = false;
        let version_wanted = match self.config.version_directive {
            MarkerPolicy::On => true,
            MarkerPolicy::Off => false,
            MarkerPolicy::Auto => state.version_explicit,
        };
        if version_wanted {
            let v = state.version;
            self.put(
                WriteKind::VersionDirective,
                &format!("%YAML {}.{}", v.major, v.minor),
            )?;
            self.newline()?;
            wrote_directives = true;
        }
        if self.config.tag_directives != MarkerPolicy::Off {
            for directive in state.explicit_tag_directives() {
                self.put(
                    WriteKind::TagDirective,
                    &format!("%TAG {} {}", directive.handle, directive.prefix),
                )?;
                self.newline()?;
                wrote_directives = true;
            }
        }
        let start_wanted = match self.config.doc_start_mark {
            MarkerPolicy::On => true,
            MarkerPolicy::Off => false,
            MarkerPolicy::Auto => {
                wrote_directives || self.documents_emitted > 0 || !state.start_implicit
            }
        };
        if start_wanted {
            self.put(WriteKind::DocumentIndicator, "---")?;
            self.newline()?;
        }
        Ok(())
    }

    /// Emit the end marker of a document and advance the document
    /// counter.
    pub fn emit_document_end(&mut self, doc: &Document) -> YamlResult<()> {
        if !self.config.mode.is_json() {
            let end_wanted = match self.config.doc_end_mark {
                MarkerPolicy::On => true,
                MarkerPolicy::Off => false,
                MarkerPolicy::Auto => !doc.state().end_implicit,
            };
            if end_wanted {
                self.put(WriteKind::DocumentIndicator, "...")?;
                self.newline()?;
            }
        }
        self.documents_emitted += 1;
        Ok(())
    }

    /// Emit a single node as a standalone fragment (no document
    /// markers).
    pub fn emit_node(&mut self, doc: &Document, node: NodeId) -> YamlResult<()> {
        if self.config.mode.is_json() {
            self.emit_json_node(doc, node, 0, 0)?;
            self.newline()?;
            return Ok(());
        }
        self.emit_block_node(doc, node, 0, false)
    }

    /// Emit the document's root node as a fragment.
    pub fn emit_root_node(&mut self, doc: &Document) -> YamlResult<()> {
        match doc.root() {
            Some(root) => self.emit_node(doc, root),
            None => Ok(()),
        }
    }

    // ==================== shared helpers ====================

    fn effective_flow(&self, doc: &Document, node: NodeId) -> bool {
        if self.config.mode.forces_flow() {
            return true;
        }
        if self.config.mode == EmitMode::Block {
            return false;
        }
        doc.style(node) == NodeStyle::Flow
    }

    fn collection_is_empty(&self, doc: &Document, node: NodeId) -> bool {
        match doc.kind(node) {
            NodeKind::Sequence => doc.sequence_len(node) == 0,
            NodeKind::Mapping => doc.mapping_len(node) == 0,
            NodeKind::Scalar => false,
        }
    }

    fn sorted_pairs(&self, doc: &Document, node: NodeId) -> Vec<NodePair> {
        let pairs: Vec<NodePair> = doc.mapping_iter(node).collect();
        if !self.config.sort_keys {
            return pairs;
        }
        let order = compare::sorted_pair_indices(doc, &pairs);
        order.into_iter().map(|i| pairs[i]).collect()
    }

    /// Write the anchor and tag properties of a node, each followed by a
    /// space. Skipped entirely in JSON modes.
    fn emit_props(&mut self, doc: &Document, node: NodeId) -> YamlResult<()> {
        if let Some(name) = doc.anchor_name_of(node) {
            self.put(WriteKind::Anchor, &format!("&{name}"))?;
            self.put(WriteKind::Whitespace, " ")?;
        }
        if let Some(tag) = doc.tag_text(node) {
            let rendered = self.render_tag(doc, tag)?;
            self.put(WriteKind::Tag, &rendered)?;
            self.put(WriteKind::Whitespace, " ")?;
        }
        Ok(())
    }

    /// Render a resolved tag back to its shortest written form.
    fn render_tag(&self, doc: &Document, tag: &str) -> YamlResult<String> {
        if tag == "!" {
            return Ok("!".to_string());
        }
        if let Some(suffix) = tag.strip_prefix(CORE_PREFIX) {
            return Ok(format!("!!{suffix}"));
        }
        if let Some(rest) = tag.strip_prefix('!') {
            // A local tag resolved through the primary handle.
            return Ok(format!("!{rest}"));
        }
        // Try the declared shorthands, longest prefix first.
        let mut best: Option<(usize, String)> = None;
        for directive in doc.state().tag_directives() {
            if let Some(suffix) = tag.strip_prefix(directive.prefix.as_str()) {
                let len = directive.prefix.len();
                if best.as_ref().map_or(true, |(l, _)| len > *l) {
                    best = Some((len, format!("{}{}", directive.handle, suffix)));
                }
            }
        }
        if let Some((_, shorthand)) = best {
            return Ok(shorthand);
        }
        if self.config.tag_directives == MarkerPolicy::Off {
            return Err(YamlError::emit(format!(
                "tag '{tag}' has no declared shorthand and tag directives are disabled"
            )));
        }
        Ok(format!("!<{tag}>"))
    }

    // ==================== block emission ====================

    /// Emit a node in block context. With `inline` set the cursor sits
    /// after an indicator (`- `, `key: `, `--- `) and the first line's
    /// indent is already in place. Ends having written its final line
    /// break.
    fn emit_block_node(
        &mut self,
        doc: &Document,
        node: NodeId,
        indent: usize,
        inline: bool,
    ) -> YamlResult<()> {
        if indent / self.config.indent.max(1) > MAX_EMIT_DEPTH {
            return Err(YamlError::emit("nesting too deep to emit"));
        }
        if doc.is_alias(node) {
            if !inline {
                self.indent(indent)?;
            }
            let name = doc.scalar_text(node).unwrap_or("");
            self.put(WriteKind::Alias, &format!("*{name}"))?;
            return self.newline();
        }
        if self.effective_flow(doc, node) && doc.kind(node) != NodeKind::Scalar {
            if !inline {
                self.indent(indent)?;
            }
            self.emit_props(doc, node)?;
            self.emit_flow_node(doc, node, indent, 0)?;
            return self.newline();
        }
        match doc.kind(node) {
            NodeKind::Scalar => {
                if !inline {
                    self.indent(indent)?;
                }
                self.emit_props(doc, node)?;
                let ended_line = self.emit_scalar(doc, node, false, false, indent)?;
                if !ended_line {
                    self.newline()?;
                }
                Ok(())
            }
            NodeKind::Sequence => {
                if doc.sequence_len(node) == 0 {
                    if !inline {
                        self.indent(indent)?;
                    }
                    self.emit_props(doc, node)?;
                    self.put(WriteKind::Indicator, "[]")?;
                    return self.newline();
                }
                let items: Vec<NodeId> = doc.sequence_iter(node).collect();
                for (i, item) in items.iter().enumerate() {
                    if !(inline && i == 0) {
                        self.indent(indent)?;
                    }
                    self.put(WriteKind::Indicator, "-")?;
                    if self.is_block_empty_scalar(doc, *item) {
                        self.newline()?;
                        continue;
                    }
                    self.put(WriteKind::Whitespace, " ")?;
                    self.emit_block_node(doc, *item, indent + self.config.indent, true)?;
                }
                Ok(())
            }
            NodeKind::Mapping => {
                if doc.mapping_len(node) == 0 {
                    if !inline {
                        self.indent(indent)?;
                    }
                    self.emit_props(doc, node)?;
                    self.put(WriteKind::Indicator, "{}")?;
                    return self.newline();
                }
                let pairs = self.sorted_pairs(doc, node);
                for (i, pair) in pairs.iter().enumerate() {
                    if !(inline && i == 0) {
                        self.indent(indent)?;
                    }
                    self.emit_block_pair(doc, pair, indent)?;
                }
                Ok(())
            }
        }
    }

    fn is_block_empty_scalar(&self, doc: &Document, node: NodeId) -> bool {
        doc.kind(node) == NodeKind::Scalar
            && !doc.is_alias(node)
            && doc.scalar_text(node) == Some("")
            && doc.tag(node).is_none()
            && doc.anchor_name_of(node).is_none()
    }

    fn emit_block_pair(
        &mut self,
        doc: &Document,
        pair: &NodePair,
        indent: usize,
    ) -> YamlResult<()> {
        let simple_key = doc.kind(pair.key) == NodeKind::Scalar && !doc.is_alias(pair.key);
        if simple_key {
            self.emit_props(doc, pair.key)?;
            self.emit_scalar(doc, pair.key, false, true, indent)?;
            self.put(WriteKind::Indicator, ":")?;
        } else {
            // Complex key form.
            self.put(WriteKind::Indicator, "?")?;
            self.put(WriteKind::Whitespace, " ")?;
            self.emit_block_node(doc, pair.key, indent + self.config.indent, true)?;
            self.indent(indent)?;
            self.put(WriteKind::Indicator, ":")?;
        }
        if self.is_block_empty_scalar(doc, pair.value) {
            return self.newline();
        }
        let value_block_collection = !self.effective_flow(doc, pair.value)
            && doc.kind(pair.value) != NodeKind::Scalar
            && !self.collection_is_empty(doc, pair.value)
            && !doc.is_alias(pair.value);
        if value_block_collection {
            self.newline()?;
            self.emit_block_node(doc, pair.value, indent + self.config.indent, false)
        } else {
            self.put(WriteKind::Whitespace, " ")?;
            self.emit_block_node(doc, pair.value, indent + self.config.indent, true)
        }
    }

    // ==================== flow emission ====================

    /// Emit a node in flow context; writes no line break of its own
    /// except soft width wraps.
    fn emit_flow_node(
        &mut self,
        doc: &Document,
        node: NodeId,
        wrap_indent: usize,
        depth: usize,
    ) -> YamlResult<()> {
        if depth > MAX_EMIT_DEPTH {
            return Err(YamlError::emit("nesting too deep to emit"));
        }
        if doc.is_alias(node) {
            let name = doc.scalar_text(node).unwrap_or("");
            return self.put(WriteKind::Alias, &format!("*{name}"));
        }
        match doc.kind(node) {
            NodeKind::Scalar => {
                self.emit_scalar(doc, node, true, false, wrap_indent)?;
                Ok(())
            }
            NodeKind::Sequence => {
                self.put(WriteKind::Indicator, "[")?;
                let items: Vec<NodeId> = doc.sequence_iter(node).collect();
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        self.flow_separator(wrap_indent)?;
                    }
                    self.emit_props(doc, *item)?;
                    self.emit_flow_node(doc, *item, wrap_indent, depth + 1)?;
                }
                self.put(WriteKind::Indicator, "]")
            }
            NodeKind::Mapping => {
                self.put(WriteKind::Indicator, "{")?;
                let pairs = self.sorted_pairs(doc, node);
                for (i, pair) in pairs.iter().enumerate() {
                    if i > 0 {
                        self.flow_separator(wrap_indent)?;
                    }
                    self.emit_props(doc, pair.key)?;
                    if doc.kind(pair.key) == NodeKind::Scalar && !doc.is_alias(pair.key) {
                        self.emit_scalar(doc, pair.key, true, true, wrap_indent)?;
                    } else {
                        self.put(WriteKind::Indicator, "? ")?;
                        self.emit_flow_node(doc, pair.key, wrap_indent, depth + 1)?;
                    }
                    self.put(WriteKind::Indicator, ":")?;
                    self.put(WriteKind::Whitespace, " ")?;
                    self.emit_props(doc, pair.value)?;
                    self.emit_flow_node(doc, pair.value, wrap_indent, depth + 1)?;
                }
                self.put(WriteKind::Indicator, "}")
            }
        }
    }

    /// `, ` between flow items, soft-wrapping at the width target.
    fn flow_separator(&mut self, wrap_indent: usize) -> YamlResult<()> {
        self.put(WriteKind::Indicator, ",")?;
        if self.over_width() {
            self.newline()?;
            self.indent(wrap_indent + self.config.indent)
        } else {
            self.put(WriteKind::Whitespace, " ")
        }
    }

    // ==================== JSON emission ====================

    fn emit_json_node(
        &mut self,
        doc: &Document,
        node: NodeId,
        indent: usize,
        depth: usize,
    ) -> YamlResult<()> {
        if depth > MAX_EMIT_DEPTH {
            return Err(YamlError::emit("nesting too deep to emit"));
        }
        if doc.is_alias(node) {
            // Aliases cannot appear in JSON; substitute the target.
            let name = doc.scalar_text(node).unwrap_or("");
            let target = doc.lookup_anchor(name).ok_or_else(|| {
                YamlError::emit(format!("undefined alias '*{name}' in JSON output"))
            })?;
            return self.emit_json_node(doc, target, indent, depth + 1);
        }
        let compact = self.config.mode.oneline();
        match doc.kind(node) {
            NodeKind::Scalar => {
                let text = doc.scalar_text(node).unwrap_or("");
                let plain_ok = self.config.mode.json_preserves_types()
                    && matches!(doc.style(node), NodeStyle::Plain | NodeStyle::Any)
                    && is_json_scalar(text);
                if plain_ok {
                    self.put(WriteKind::PlainScalar, text)
                } else {
                    self.put(
                        WriteKind::DoubleQuotedScalar,
                        &format!("\"{}\"", escape_json(text)),
                    )
                }
            }
            NodeKind::Sequence => {
                let items: Vec<NodeId> = doc.sequence_iter(node).collect();
                if items.is_empty() {
                    return self.put(WriteKind::Indicator, "[]");
                }
                self.put(WriteKind::Indicator, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        self.put(WriteKind::Indicator, ",")?;
                    }
                    if !compact {
                        self.newline()?;
                        self.indent(indent + self.config.indent)?;
                    }
                    self.emit_json_node(doc, *item, indent + self.config.indent, depth + 1)?;
                }
                if !compact {
                    self.newline()?;
                    self.indent(indent)?;
                }
                self.put(WriteKind::Indicator, "]")
            }
            NodeKind::Mapping => {
                let pairs = self.sorted_pairs(doc, node);
                if pairs.is_empty() {
                    return self.put(WriteKind::Indicator, "{}");
                }
                self.put(WriteKind::Indicator, "{")?;
                for (i, pair) in pairs.iter().enumerate() {
                    if i > 0 {
                        self.put(WriteKind::Indicator, ",")?;
                    }
                    if !compact {
                        self.newline()?;
                        self.indent(indent + self.config.indent)?;
                    }
                    let key = self.json_key_text(doc, pair.key)?;
                    self.put(
                        WriteKind::DoubleQuotedScalarKey,
                        &format!("\"{}\"", escape_json(&key)),
                    )?;
                    self.put(WriteKind::Indicator, ":")?;
                    if !compact {
                        self.put(WriteKind::Whitespace, " ")?;
                    }
                    self.emit_json_node(doc, pair.value, indent + self.config.indent, depth + 1)?;
                }
                if !compact {
                    self.newline()?;
                    self.indent(indent)?;
                }
                self.put(WriteKind::Indicator, "}")
            }
        }
    }

    fn json_key_text(&self, doc: &Document, key: NodeId) -> YamlResult<String> {
        if doc.is_alias(key) {
            let name = doc.scalar_text(key).unwrap_or("");
            let target = doc.lookup_anchor(name).ok_or_else(|| {
                YamlError::emit(format!("undefined alias '*{name}' in JSON output"))
            })?;
            return self.json_key_text(doc, target);
        }
        match doc.scalar_text(key) {
            Some(text) => Ok(text.to_string()),
            None => Err(YamlError::emit(
                "collection mapping keys cannot be represented in JSON",
            )),
        }
    }

    // ==================== scalar emission ====================

    /// Emit a scalar. Returns true when the scalar ended the line itself
    /// (block scalar bodies do).
    fn emit_scalar(
        &mut self,
        doc: &Document,
        node: NodeId,
        in_flow: bool,
        for_key: bool,
        indent: usize,
    ) -> YamlResult<bool> {
        let text = doc.scalar_text(node).unwrap_or("").to_string();
        let analysis = analyze(&text, in_flow, for_key);
        let hint = doc.style(node);
        let mode = self.config.mode;

        // Resolve the style: honour the hint, downgrade when content or
        // context forbids it.
        enum Chosen {
            Plain,
            Single,
            Double,
            Literal,
        }
        let chosen = if mode == EmitMode::Block && !in_flow && !for_key {
            // Plain if the content permits, else literal; quotes only
            // for content no block form can carry.
            if analysis.allow_plain {
                Chosen::Plain
            } else if analysis.allow_literal {
                Chosen::Literal
            } else if analysis.allow_single {
                Chosen::Single
            } else {
                Chosen::Double
            }
        } else {
            match hint {
                NodeStyle::Plain | NodeStyle::Any => {
                    if analysis.allow_plain {
                        Chosen::Plain
                    } else if !in_flow && !for_key && analysis.multiline && analysis.allow_literal
                    {
                        Chosen::Literal
                    } else if analysis.allow_single {
                        Chosen::Single
                    } else {
                        Chosen::Double
                    }
                }
                NodeStyle::SingleQuoted => {
                    if analysis.allow_single {
                        Chosen::Single
                    } else {
                        Chosen::Double
                    }
                }
                NodeStyle::DoubleQuoted => Chosen::Double,
                NodeStyle::Literal | NodeStyle::Folded => {
                    if !in_flow && !for_key && analysis.allow_literal {
                        Chosen::Literal
                    } else if analysis.allow_single {
                        Chosen::Single
                    } else {
                        Chosen::Double
                    }
                }
                // Collection-only hints on a scalar fall back to content
                // analysis.
                _ => {
                    if analysis.allow_plain {
                        Chosen::Plain
                    } else if analysis.allow_single {
                        Chosen::Single
                    } else {
                        Chosen::Double
                    }
                }
            }
        };

        match chosen {
            Chosen::Plain => {
                let kind = if for_key {
                    WriteKind::PlainScalarKey
                } else {
                    WriteKind::PlainScalar
                };
                self.put(kind, &text)?;
                Ok(false)
            }
            Chosen::Single => {
                let kind = if for_key {
                    WriteKind::SingleQuotedScalarKey
                } else {
                    WriteKind::SingleQuotedScalar
                };
                self.put(WriteKind::Indicator, "'")?;
                self.put(kind, &escape_single_quoted(&text))?;
                self.put(WriteKind::Indicator, "'")?;
                Ok(false)
            }
            Chosen::Double => {
                let kind = if for_key {
                    WriteKind::DoubleQuotedScalarKey
                } else {
                    WriteKind::DoubleQuotedScalar
                };
                self.put(WriteKind::Indicator, "\"")?;
                self.put(kind, &escape_double_quoted(&text))?;
                self.put(WriteKind::Indicator, "\"")?;
                Ok(false)
            }
            Chosen::Literal => {
                self.emit_literal(&text, indent)?;
                Ok(true)
            }
        }
    }

    /// Emit a literal block scalar at the given content indent.
    fn emit_literal(&mut self, text: &str, indent: usize) -> YamlResult<()> {
        let content_indent = indent.max(self.config.indent);
        let trailing = text.len() - text.trim_end_matches('\n').len();
        let mut header = String::from("|");
        if text.starts_with(' ') || text.starts_with('\n') {
            // Auto-detection would misread the indentation; pin it.
            header.push_str(&self.config.indent.to_string());
        }
        match trailing {
            0 => header.push('-'),
            1 => {}
            _ => header.push('+'),
        }
        self.put(WriteKind::Indicator, &header)?;
        self.newline()?;
        let mut lines: Vec<&str> = text.split('\n').collect();
        if text.ends_with('\n') {
            lines.pop();
        }
        for line in lines {
            if line.is_empty() {
                self.newline()?;
            } else {
                self.indent(content_indent)?;
                self.put(WriteKind::LiteralScalar, line)?;
                self.newline()?;
            }
        }
        Ok(())
    }
}

/// Emit a document to a string with the given configuration.
pub fn emit_to_string(doc: &Document, config: &EmitConfig) -> YamlResult<String> {
    let mut out = String::new();
    let mut emitter = Emitter::new(&mut out, config.clone());
    emitter.emit_document(doc)?;
    Ok(out)
}

/// Emit a document to bytes with the given configuration.
pub fn emit_to_vec(doc: &Document, config: &EmitConfig) -> YamlResult<Vec<u8>> {
    let mut out = Vec::new();
    let mut emitter = Emitter::new(&mut out, config.clone());
    emitter.emit_document(doc)?;
    Ok(out)
}

/// Emit a document to an [`std::io::Write`] with the given
/// configuration.
pub fn emit_to_writer<W: std::io::Write>(
    doc: &Document,
    config: &EmitConfig,
    writer: W,
) -> YamlResult<()> {
    let mut sink = crate::sink::WriterSink::new(writer);
    let mut emitter = Emitter::new(&mut sink, config.clone());
    emitter.emit_document(doc)
}

/// Emit a document with default configuration.
pub fn to_yaml_string(doc: &Document) -> YamlResult<String> {
    emit_to_string(doc, &EmitConfig::default())
}
