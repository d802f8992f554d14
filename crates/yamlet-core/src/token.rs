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

//! Tokens produced by the scanner.
//!
//! A token is immutable after creation and shared by reference count: the
//! same scalar token may back a parse event, a document node, and an
//! anchor entry. Content-carrying variants hold [`Atom`]s; the decoded
//! text is materialised once on demand and cached.

use crate::atom::{Atom, AtomStyle};
use crate::mark::Mark;
use std::cell::OnceCell;
use std::fmt;
use std::rc::Rc;

/// Scalar presentation styles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScalarStyle {
    /// Plain (unquoted).
    #[default]
    Plain,
    /// Single-quoted.
    SingleQuoted,
    /// Double-quoted.
    DoubleQuoted,
    /// Literal block (`|`).
    Literal,
    /// Folded block (`>`).
    Folded,
}

impl ScalarStyle {
    /// The atom style that decodes this scalar style.
    pub fn atom_style(self) -> AtomStyle {
        match self {
            Self::Plain => AtomStyle::Plain,
            Self::SingleQuoted => AtomStyle::SingleQuoted,
            Self::DoubleQuoted => AtomStyle::DoubleQuoted,
            Self::Literal => AtomStyle::Literal,
            Self::Folded => AtomStyle::Folded,
        }
    }
}

/// The token payload.
#[derive(Debug)]
pub enum TokenData {
    /// Start of the stream.
    StreamStart,
    /// End of the stream.
    StreamEnd,
    /// A `%YAML major.minor` directive.
    VersionDirective { major: u32, minor: u32 },
    /// A `%TAG handle prefix` directive; the handle and prefix URI are
    /// separate atoms.
    TagDirective { handle: Atom, prefix: Atom },
    /// An explicit `---`.
    DocumentStart,
    /// An explicit `...`.
    DocumentEnd,
    /// Start of a block sequence.
    BlockSequenceStart,
    /// Start of a block mapping.
    BlockMappingStart,
    /// End of a block collection.
    BlockEnd,
    /// `[`.
    FlowSequenceStart,
    /// `]`.
    FlowSequenceEnd,
    /// `{`.
    FlowMappingStart,
    /// `}`.
    FlowMappingEnd,
    /// `-` introducing a block sequence entry.
    BlockEntry,
    /// `,` in flow context.
    FlowEntry,
    /// An explicit `?` or a retroactively inserted implicit-key marker.
    Key,
    /// `:`.
    Value,
    /// `*name`.
    Alias { name: Atom },
    /// `&name`.
    Anchor { name: Atom },
    /// A tag shorthand or verbatim tag; `handle` is absent for verbatim
    /// `!<...>` forms.
    Tag { handle: Option<Atom>, suffix: Atom },
    /// A scalar with its presentation style.
    Scalar { atom: Atom, style: ScalarStyle },
}

#[derive(Debug)]
struct TokenInner {
    data: TokenData,
    start: Mark,
    end: Mark,
    /// Lazily decoded presentation text. For tag tokens the parser
    /// installs the resolved full URI here.
    text: OnceCell<String>,
}

/// A reference-counted, immutable scanner token.
#[derive(Debug, Clone)]
pub struct Token(Rc<TokenInner>);

impl Token {
    /// Create a token spanning `start..end`.
    pub fn new(data: TokenData, start: Mark, end: Mark) -> Self {
        Self(Rc::new(TokenInner {
            data,
            start,
            end,
            text: OnceCell::new(),
        }))
    }

    /// A synthetic scalar token presenting `text` verbatim. Used by the
    /// document mutation API.
    pub fn synthetic_scalar(text: &str, style: ScalarStyle) -> Self {
        let atom = Atom::synthetic(text, style.atom_style());
        Self::new(
            TokenData::Scalar { atom, style },
            Mark::start(),
            Mark::start(),
        )
    }

    /// The token payload.
    #[inline]
    pub fn data(&self) -> &TokenData {
        &self.0.data
    }

    /// Start position.
    #[inline]
    pub fn start(&self) -> Mark {
        self.0.start
    }

    /// End position (exclusive).
    #[inline]
    pub fn end(&self) -> Mark {
        self.0.end
    }

    /// The primary atom, if this token carries content.
    pub fn atom(&self) -> Option<&Atom> {
        match &self.0.data {
            TokenData::Scalar { atom, .. } => Some(atom),
            TokenData::Alias { name } | TokenData::Anchor { name } => Some(name),
            TokenData::Tag { suffix, .. } => Some(suffix),
            TokenData::TagDirective { prefix, .. } => Some(prefix),
            _ => None,
        }
    }

    /// The scalar style, if this is a scalar token.
    pub fn scalar_style(&self) -> Option<ScalarStyle> {
        match &self.0.data {
            TokenData::Scalar { style, .. } => Some(*style),
            _ => None,
        }
    }

    /// The decoded presentation text of this token, cached after the
    /// first call. The cache always agrees with re-decoding the atom.
    pub fn text(&self) -> &str {
        self.0.text.get_or_init(|| match &self.0.data {
            TokenData::Scalar { atom, .. } => atom.decode(),
            TokenData::Alias { name } | TokenData::Anchor { name } => {
                name.raw_str().into_owned()
            }
            TokenData::Tag { handle, suffix } => {
                let mut s = String::new();
                if let Some(h) = handle {
                    s.push_str(&h.raw_str());
                }
                s.push_str(&suffix.raw_str());
                s
            }
            TokenData::TagDirective { handle, prefix } => {
                format!("{} {}", handle.raw_str(), prefix.raw_str())
            }
            TokenData::VersionDirective { major, minor } => format!("{major}.{minor}"),
            _ => String::new(),
        })
    }

    /// Install resolved text (used by the parser for tag tokens once the
    /// handle is looked up in the document state). A no-op if the cache
    /// is already populated.
    pub(crate) fn set_resolved_text(&self, text: String) {
        let _ = self.0.text.set(text);
    }

    /// True if this is a scalar token.
    #[inline]
    pub fn is_scalar(&self) -> bool {
        matches!(self.0.data, TokenData::Scalar { .. })
    }

    /// True if this token is a plain scalar whose raw content equals
    /// `text`.
    pub fn is_plain_scalar(&self, text: &str) -> bool {
        match &self.0.data {
            TokenData::Scalar { atom, style } => {
                *style == ScalarStyle::Plain && atom.plain_eq(text)
            }
            _ => false,
        }
    }

    /// Number of strong references, exposed for tests of sharing
    /// behaviour.
    pub fn ref_count(&self) -> usize {
        Rc::strong_count(&self.0)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0.data {
            TokenData::StreamStart => write!(f, "stream start"),
            TokenData::StreamEnd => write!(f, "stream end"),
            TokenData::VersionDirective { major, minor } => {
                write!(f, "%YAML {major}.{minor}")
            }
            TokenData::TagDirective { .. } => write!(f, "%TAG {}", self.text()),
            TokenData::DocumentStart => write!(f, "---"),
            TokenData::DocumentEnd => write!(f, "..."),
            TokenData::BlockSequenceStart => write!(f, "block sequence start"),
            TokenData::BlockMappingStart => write!(f, "block mapping start"),
            TokenData::BlockEnd => write!(f, "block end"),
            TokenData::FlowSequenceStart => write!(f, "'['"),
            TokenData::FlowSequenceEnd => write!(f, "']'"),
            TokenData::FlowMappingStart => write!(f, "'{{'"),
            TokenData::FlowMappingEnd => write!(f, "'}}'"),
            TokenData::BlockEntry => write!(f, "'-'"),
            TokenData::FlowEntry => write!(f, "','"),
            TokenData::Key => write!(f, "'?'"),
            TokenData::Value => write!(f, "':'"),
            TokenData::Alias { .. } => write!(f, "alias *{}", self.text()),
            TokenData::Anchor { .. } => write!(f, "anchor &{}", self.text()),
            TokenData::Tag { .. } => write!(f, "tag !{}", self.text()),
            TokenData::Scalar { .. } => write!(f, "scalar \"{}\"", self.text()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atom::AtomStyle;
    use crate::input::Input;

    fn scalar_token(text: &str, style: ScalarStyle) -> Token {
        let input = Input::from_str(text);
        let end = input.len();
        let atom = Atom::new(input, 0, end, style.atom_style());
        Token::new(
            TokenData::Scalar { atom, style },
            Mark::start(),
            Mark::new(end, 0, end),
        )
    }

    // ==================== text caching tests ====================

    #[test]
    fn test_scalar_text_decodes() {
        let token = scalar_token("hello", ScalarStyle::Plain);
        assert_eq!(token.text(), "hello");
    }

    #[test]
    fn test_scalar_text_cached_agrees_with_redecode() {
        let token = scalar_token("a\\tb", ScalarStyle::DoubleQuoted);
        let first = token.text().to_string();
        assert_eq!(first, "a\tb");
        // The cache must agree with re-decoding the atom.
        assert_eq!(token.text(), token.atom().unwrap().decode());
    }

    #[test]
    fn test_anchor_text() {
        let input = Input::from_str("id001");
        let atom = Atom::new(Rc::clone(&input), 0, 5, AtomStyle::Plain);
        let token = Token::new(TokenData::Anchor { name: atom }, Mark::start(), Mark::start());
        assert_eq!(token.text(), "id001");
    }

    #[test]
    fn test_resolved_text_wins_for_tags() {
        let input = Input::from_str("!!str");
        let handle = Atom::new(Rc::clone(&input), 0, 2, AtomStyle::Plain);
        let suffix = Atom::new(Rc::clone(&input), 2, 5, AtomStyle::Uri);
        let token = Token::new(
            TokenData::Tag {
                handle: Some(handle),
                suffix,
            },
            Mark::start(),
            Mark::start(),
        );
        token.set_resolved_text("tag:yaml.org,2002:str".to_string());
        assert_eq!(token.text(), "tag:yaml.org,2002:str");
    }

    // ==================== sharing tests ====================

    #[test]
    fn test_token_sharing() {
        let token = scalar_token("shared", ScalarStyle::Plain);
        let copy = token.clone();
        assert_eq!(token.ref_count(), 2);
        assert_eq!(copy.text(), "shared");
    }

    // ==================== predicate tests ====================

    #[test]
    fn test_is_plain_scalar() {
        assert!(scalar_token("<<", ScalarStyle::Plain).is_plain_scalar("<<"));
        assert!(!scalar_token("<<", ScalarStyle::DoubleQuoted).is_plain_scalar("<<"));
        assert!(!scalar_token("x", ScalarStyle::Plain).is_plain_scalar("<<"));
    }

    #[test]
    fn test_synthetic_scalar() {
        let token = Token::synthetic_scalar("line1\nline2", ScalarStyle::Plain);
        assert_eq!(token.text(), "line1\nline2");
        assert!(token.is_scalar());
    }

    #[test]
    fn test_scalar_style_accessor() {
        let token = scalar_token("x", ScalarStyle::Literal);
        assert_eq!(token.scalar_style(), Some(ScalarStyle::Literal));
        let stream = Token::new(TokenData::StreamStart, Mark::start(), Mark::start());
        assert_eq!(stream.scalar_style(), None);
    }
}
