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

//! # Yamlet
//!
//! A YAML 1.3 parser, in-memory document model, and emitter. JSON is
//! read as a strict subset and can be emitted directly.
//!
//! ## Quick start
//!
//! ```rust
//! use yamlet::{parse, to_string, EmitConfig, EmitMode};
//!
//! let doc = parse("invoice: 34843\nbill-to:\n  given: Chris\n").unwrap();
//!
//! // Path-based access.
//! let invoice = doc.lookup_by_path("/invoice").unwrap();
//! assert_eq!(doc.scalar_text(invoice), Some("34843"));
//!
//! // Re-emit, in any shape.
//! let block = to_string(&doc).unwrap();
//! let json = yamlet::to_string_with(
//!     &doc,
//!     &EmitConfig::with_mode(EmitMode::JsonOneline),
//! ).unwrap();
//! assert_eq!(json, "{\"invoice\":34843,\"bill-to\":{\"given\":\"Chris\"}}\n");
//! # let _ = block;
//! ```
//!
//! ## Pieces
//!
//! - [`yamlet_core`]: input management, scanner, event parser, document
//!   model, resolver (re-exported here).
//! - [`yamlet_emit`]: configurable emission (re-exported here).
//! - [`access`](PathAccess): typed path readers and writers, plus
//!   format-string scanning and document templating.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

mod access;

pub use access::{
    build_from_template, scan, PathAccess, PrimitiveKind, ScanValue, TemplateArg,
};

// Re-export the core surface.
pub use yamlet_core::{
    documents_equal, nodes_equal, Anchor, ColorMode, Diagnostic, Document, DocumentBuilder,
    DocumentState, ErrorKind, Event, EventData, Input, Limits, Mark, NodeId, NodeKind,
    NodePair, NodeStyle, Origin, ParseOptions, ParseOptionsBuilder, Parser, ScalarStyle,
    Severity, TagDirective, Token, TokenData, VersionDirective, YamlError, YamlResult,
};

// Re-export the emitter surface.
pub use yamlet_emit::{
    emit_to_string, emit_to_vec, emit_to_writer, EmitConfig, EmitConfigBuilder, EmitMode,
    EmitSink, Emitter, MarkerPolicy, WriteKind, WriterSink,
};

/// Parse the first document of a YAML (or JSON) string with default
/// options.
pub fn parse(text: &str) -> YamlResult<Document> {
    Document::from_yaml_str(text)
}

/// Parse every document of a stream with default options.
pub fn parse_all(text: &str) -> YamlResult<Vec<Document>> {
    Document::parse_all(text, ParseOptions::default())
}

/// Parse the first document from owned bytes.
pub fn parse_bytes(bytes: Vec<u8>) -> YamlResult<Document> {
    Document::from_yaml_bytes(bytes, ParseOptions::default())
}

/// Parse the first document from a file path.
pub fn parse_path(path: impl AsRef<std::path::Path>) -> YamlResult<Document> {
    Document::from_yaml_path(path.as_ref(), ParseOptions::default())
}

/// Parse the first document from a reader.
pub fn parse_reader<R: std::io::Read>(reader: R) -> YamlResult<Document> {
    Document::from_yaml_reader(reader, ParseOptions::default())
}

/// Emit a document with the default configuration.
pub fn to_string(doc: &Document) -> YamlResult<String> {
    yamlet_emit::to_yaml_string(doc)
}

/// Emit a document with an explicit configuration.
pub fn to_string_with(doc: &Document, config: &EmitConfig) -> YamlResult<String> {
    emit_to_string(doc, config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_to_string() {
        let doc = parse("a: 1\n").unwrap();
        assert_eq!(to_string(&doc).unwrap(), "a: 1\n");
    }

    #[test]
    fn test_parse_all() {
        let docs = parse_all("1\n---\n2\n").unwrap();
        assert_eq!(docs.len(), 2);
    }

    #[test]
    fn test_json_subset() {
        let doc = parse("{\"a\": [1, 2], \"b\": null}").unwrap();
        let root = doc.root().unwrap();
        assert_eq!(doc.kind(root), NodeKind::Mapping);
        let a = doc.lookup_by_path("/a").unwrap();
        assert_eq!(doc.sequence_len(a), 2);
    }
}
