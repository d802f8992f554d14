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

//! Emission sinks.
//!
//! The emitter delivers output as chunks tagged with a [`WriteKind`], so
//! a sink can colorise, filter, or count without re-parsing its own
//! output. Sink errors propagate to the emitter caller verbatim.

use std::io;
use yamlet_core::{YamlError, YamlResult};

/// What a written chunk is. One chunk never mixes kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteKind {
    /// `---` or `...`.
    DocumentIndicator,
    /// A `%TAG` line.
    TagDirective,
    /// A `%YAML` line.
    VersionDirective,
    /// Leading indentation spaces.
    Indent,
    /// Structural indicator characters (`-`, `?`, `:`, `,`, brackets,
    /// quotes, block scalar headers).
    Indicator,
    /// Inter-token whitespace.
    Whitespace,
    /// A plain scalar value.
    PlainScalar,
    /// A single-quoted scalar body.
    SingleQuotedScalar,
    /// A double-quoted scalar body.
    DoubleQuotedScalar,
    /// A literal block scalar body line.
    LiteralScalar,
    /// A folded block scalar body line.
    FoldedScalar,
    /// An `&anchor` property.
    Anchor,
    /// A tag property.
    Tag,
    /// A line break.
    LineBreak,
    /// An `*alias` reference.
    Alias,
    /// A terminating NUL, only on request by zero-terminated helpers.
    TerminatingZero,
    /// A plain scalar used as a mapping key.
    PlainScalarKey,
    /// A single-quoted scalar used as a mapping key.
    SingleQuotedScalarKey,
    /// A double-quoted scalar used as a mapping key.
    DoubleQuotedScalarKey,
    /// A comment body (reserved; best-effort).
    Comment,
}

/// Receives emitter output.
pub trait EmitSink {
    /// Write one tagged chunk. Returning an error aborts emission.
    fn write(&mut self, kind: WriteKind, bytes: &[u8]) -> YamlResult<()>;
}

/// The callback form of output: wraps a closure as a sink.
#[derive(Debug)]
pub struct CallbackSink<F>(pub F);

impl<F> EmitSink for CallbackSink<F>
where
    F: FnMut(WriteKind, &[u8]) -> YamlResult<()>,
{
    fn write(&mut self, kind: WriteKind, bytes: &[u8]) -> YamlResult<()> {
        (self.0)(kind, bytes)
    }
}

impl EmitSink for Vec<u8> {
    fn write(&mut self, _kind: WriteKind, bytes: &[u8]) -> YamlResult<()> {
        self.extend_from_slice(bytes);
        Ok(())
    }
}

impl EmitSink for String {
    fn write(&mut self, _kind: WriteKind, bytes: &[u8]) -> YamlResult<()> {
        match std::str::from_utf8(bytes) {
            Ok(s) => {
                self.push_str(s);
                Ok(())
            }
            Err(_) => Err(YamlError::emit("emitter produced invalid UTF-8")),
        }
    }
}

/// Adapts any [`io::Write`] into a sink.
#[derive(Debug)]
pub struct WriterSink<W: io::Write> {
    writer: W,
}

impl<W: io::Write> WriterSink<W> {
    /// Wrap a writer.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Recover the inner writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: io::Write> EmitSink for WriterSink<W> {
    fn write(&mut self, _kind: WriteKind, bytes: &[u8]) -> YamlResult<()> {
        self.writer
            .write_all(bytes)
            .map_err(|e| YamlError::emit(format!("sink write failed: {e}")))
    }
}

/// A sink that records `(kind, text)` chunks, for tests and tooling.
#[derive(Debug, Default)]
pub struct RecordingSink {
    /// The chunks written so far.
    pub chunks: Vec<(WriteKind, Vec<u8>)>,
}

impl EmitSink for RecordingSink {
    fn write(&mut self, kind: WriteKind, bytes: &[u8]) -> YamlResult<()> {
        self.chunks.push((kind, bytes.to_vec()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== sink implementation tests ====================

    #[test]
    fn test_vec_sink_appends() {
        let mut sink = Vec::new();
        sink.write(WriteKind::PlainScalar, b"abc").unwrap();
        sink.write(WriteKind::LineBreak, b"\n").unwrap();
        assert_eq!(sink, b"abc\n");
    }

    #[test]
    fn test_string_sink() {
        let mut sink = String::new();
        sink.write(WriteKind::PlainScalar, "héllo".as_bytes()).unwrap();
        assert_eq!(sink, "héllo");
    }

    #[test]
    fn test_string_sink_rejects_invalid_utf8() {
        let mut sink = String::new();
        assert!(sink.write(WriteKind::PlainScalar, &[0xff]).is_err());
    }

    #[test]
    fn test_writer_sink() {
        let mut sink = WriterSink::new(Vec::new());
        sink.write(WriteKind::Indicator, b"-").unwrap();
        assert_eq!(sink.into_inner(), b"-");
    }

    #[test]
    fn test_callback_sink() {
        let mut seen = Vec::new();
        {
            let mut sink = CallbackSink(|kind: WriteKind, bytes: &[u8]| {
                seen.push((kind, bytes.to_vec()));
                Ok(())
            });
            sink.write(WriteKind::PlainScalar, b"x").unwrap();
        }
        assert_eq!(seen, vec![(WriteKind::PlainScalar, b"x".to_vec())]);
    }

    #[test]
    fn test_recording_sink_tags() {
        let mut sink = RecordingSink::default();
        sink.write(WriteKind::Indicator, b"[").unwrap();
        sink.write(WriteKind::PlainScalar, b"1").unwrap();
        assert_eq!(sink.chunks.len(), 2);
        assert_eq!(sink.chunks[0].0, WriteKind::Indicator);
        assert_eq!(sink.chunks[1].1, b"1");
    }
}
