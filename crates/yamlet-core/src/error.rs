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

//! Error types for YAML parsing and emission.

use crate::mark::Mark;
use std::fmt;
use thiserror::Error;

/// The kind of error that occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// I/O failure while reading an input or writing to a sink.
    Io,
    /// Input bytes are not valid UTF-8.
    Encoding,
    /// Lexical violation: bad escape, unterminated scalar, bad block
    /// header, invalid tag URI, invalid directive.
    Lexical,
    /// Grammatical violation: unexpected token, unmatched flow terminator,
    /// implicit key across a line break, missing mapping value.
    Grammar,
    /// Semantic violation: undefined tag handle or alias, duplicate mapping
    /// key, invalid merge-key value, conflicting tag directive.
    Semantic,
    /// A configured security limit was exceeded.
    Limit,
    /// Emission failure: sink error or a style forced onto incompatible
    /// content.
    Emit,
    /// API misuse: cross-document mutation, invalid argument.
    Api,
    /// A streamed input has no more committed bytes; feed more input (or
    /// finish the stream) and retry.
    NeedMore,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io => write!(f, "IoError"),
            Self::Encoding => write!(f, "EncodingError"),
            Self::Lexical => write!(f, "LexicalError"),
            Self::Grammar => write!(f, "GrammarError"),
            Self::Semantic => write!(f, "SemanticError"),
            Self::Limit => write!(f, "LimitError"),
            Self::Emit => write!(f, "EmitError"),
            Self::Api => write!(f, "ApiError"),
            Self::NeedMore => write!(f, "NeedMoreInput"),
        }
    }
}

/// An error produced by any Yamlet entry point.
#[derive(Debug, Clone, Error)]
pub struct YamlError {
    /// The kind of error.
    pub kind: ErrorKind,
    /// Human-readable error message.
    pub message: String,
    /// Source position where the error was detected, if known.
    pub mark: Option<Mark>,
    /// Additional context (e.g. "while scanning a block scalar").
    pub context: Option<String>,
}

impl fmt::Display for YamlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.mark, &self.context) {
            (Some(m), Some(c)) => write!(
                f,
                "{} at line {}, column {}: {} ({})",
                self.kind,
                m.line + 1,
                m.column + 1,
                self.message,
                c
            ),
            (Some(m), None) => write!(
                f,
                "{} at line {}, column {}: {}",
                self.kind,
                m.line + 1,
                m.column + 1,
                self.message
            ),
            (None, Some(c)) => write!(f, "{}: {} ({})", self.kind, self.message, c),
            (None, None) => write!(f, "{}: {}", self.kind, self.message),
        }
    }
}

impl YamlError {
    /// Create a new error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            mark: None,
            context: None,
        }
    }

    /// Attach a source position.
    pub fn at(mut self, mark: Mark) -> Self {
        self.mark = Some(mark);
        self
    }

    /// Attach context information.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    // Convenience constructors, one per kind.

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Io, message)
    }

    pub fn encoding(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Encoding, message)
    }

    pub fn lexical(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Lexical, message)
    }

    pub fn grammar(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Grammar, message)
    }

    pub fn semantic(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Semantic, message)
    }

    pub fn limit(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Limit, message)
    }

    pub fn emit(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Emit, message)
    }

    pub fn api(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Api, message)
    }

    /// The "need more input" sentinel for streamed inputs. Not a fatal
    /// error; the parser does not latch on it.
    pub fn need_more() -> Self {
        Self::new(ErrorKind::NeedMore, "more input required")
    }

    /// True if this is the non-fatal "need more input" sentinel.
    #[inline]
    pub fn is_need_more(&self) -> bool {
        self.kind == ErrorKind::NeedMore
    }
}

impl From<std::io::Error> for YamlError {
    fn from(err: std::io::Error) -> Self {
        Self::io(err.to_string())
    }
}

/// Result type for Yamlet operations.
pub type YamlResult<T> = Result<T, YamlError>;

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== ErrorKind Display tests ====================

    #[test]
    fn test_error_kind_display() {
        assert_eq!(format!("{}", ErrorKind::Io), "IoError");
        assert_eq!(format!("{}", ErrorKind::Lexical), "LexicalError");
        assert_eq!(format!("{}", ErrorKind::Grammar), "GrammarError");
        assert_eq!(format!("{}", ErrorKind::Semantic), "SemanticError");
        assert_eq!(format!("{}", ErrorKind::NeedMore), "NeedMoreInput");
    }

    // ==================== YamlError construction tests ====================

    #[test]
    fn test_error_display_with_mark() {
        let err = YamlError::lexical("bad escape").at(Mark::new(10, 2, 4));
        let msg = format!("{}", err);
        assert!(msg.contains("LexicalError"));
        assert!(msg.contains("line 3"));
        assert!(msg.contains("column 5"));
        assert!(msg.contains("bad escape"));
    }

    #[test]
    fn test_error_display_without_mark() {
        let err = YamlError::io("file not found");
        assert_eq!(format!("{}", err), "IoError: file not found");
    }

    #[test]
    fn test_error_with_context() {
        let err = YamlError::lexical("unexpected end of input")
            .with_context("while scanning a quoted scalar");
        let msg = format!("{}", err);
        assert!(msg.contains("while scanning a quoted scalar"));
    }

    #[test]
    fn test_convenience_constructors() {
        assert_eq!(YamlError::io("x").kind, ErrorKind::Io);
        assert_eq!(YamlError::encoding("x").kind, ErrorKind::Encoding);
        assert_eq!(YamlError::lexical("x").kind, ErrorKind::Lexical);
        assert_eq!(YamlError::grammar("x").kind, ErrorKind::Grammar);
        assert_eq!(YamlError::semantic("x").kind, ErrorKind::Semantic);
        assert_eq!(YamlError::limit("x").kind, ErrorKind::Limit);
        assert_eq!(YamlError::emit("x").kind, ErrorKind::Emit);
        assert_eq!(YamlError::api("x").kind, ErrorKind::Api);
    }

    #[test]
    fn test_need_more_sentinel() {
        let err = YamlError::need_more();
        assert!(err.is_need_more());
        assert!(!YamlError::io("x").is_need_more());
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: YamlError = io_err.into();
        assert_eq!(err.kind, ErrorKind::Io);
        assert!(err.message.contains("missing"));
    }

    #[test]
    fn test_error_is_std_error() {
        fn accepts_error<E: std::error::Error>(_: E) {}
        accepts_error(YamlError::grammar("test"));
    }

    #[test]
    fn test_error_clone() {
        let original = YamlError::semantic("duplicate key").at(Mark::new(5, 1, 0));
        let cloned = original.clone();
        assert_eq!(original.kind, cloned.kind);
        assert_eq!(original.message, cloned.message);
        assert_eq!(original.mark, cloned.mark);
    }
}
