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

//! Atoms: tagged byte-slice views into an input.
//!
//! An atom identifies a textual region of an input together with the YAML
//! style that governs how the raw bytes are presented. Atoms never own
//! character data; [`Atom::raw`] borrows straight from the input segments
//! (a copy is made only when a streamed chunk boundary splits the region),
//! and [`Atom::decode`] materialises the presented string on demand by
//! re-processing the raw bytes under the atom's style: escape expansion
//! for quoted styles, flow-scalar line folding, and block-scalar
//! indentation stripping, folding, and chomping.

use crate::input::{Input, Slice};
use crate::utf8;
use std::borrow::Cow;
use std::rc::Rc;

/// The styles an atom can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AtomStyle {
    /// A plain (unquoted) scalar.
    Plain,
    /// A single-quoted scalar, `''` escapes.
    SingleQuoted,
    /// A double-quoted scalar, backslash escapes.
    DoubleQuoted,
    /// A literal block scalar (`|`).
    Literal,
    /// A folded block scalar (`>`).
    Folded,
    /// A tag URI.
    Uri,
    /// A comment body.
    Comment,
}

/// Chomping discipline for block scalars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Chomp {
    /// `-`: drop all trailing line breaks.
    Strip,
    /// Default: keep exactly one trailing line break.
    #[default]
    Clip,
    /// `+`: keep every trailing line break.
    Keep,
}

/// Properties of the region recorded at scan time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AtomFlags {
    /// The region contains escape sequences.
    pub has_escapes: bool,
    /// The region spans line breaks that decode under folding rules.
    pub has_folds: bool,
    /// Leading whitespace is significant (quoted styles).
    pub ws_lead: bool,
    /// Trailing whitespace is significant (quoted styles).
    pub ws_trail: bool,
    /// The region spans more than one streamed chunk.
    pub multi_chunk: bool,
    /// The bytes are presented verbatim regardless of style. Used for
    /// synthetic atoms built from caller-supplied strings.
    pub verbatim: bool,
}

/// A tagged byte-slice view into an input. See the module docs.
#[derive(Debug, Clone)]
pub struct Atom {
    input: Rc<Input>,
    start: usize,
    end: usize,
    pieces: Vec<Slice>,
    style: AtomStyle,
    flags: AtomFlags,
    /// Block scalars only: chomping discipline from the header.
    chomp: Chomp,
    /// Block scalars only: content indentation in columns to strip.
    indent: usize,
}

impl Atom {
    /// Create an atom over `start..end` of `input`.
    pub(crate) fn new(input: Rc<Input>, start: usize, end: usize, style: AtomStyle) -> Self {
        let pieces = input.slices(start, end);
        let multi_chunk = pieces.len() > 1;
        Self {
            input,
            start,
            end,
            pieces,
            style,
            flags: AtomFlags {
                multi_chunk,
                ..AtomFlags::default()
            },
            chomp: Chomp::Clip,
            indent: 0,
        }
    }

    /// Create a synthetic atom presenting `text` verbatim. The atom owns
    /// a private memory input; used for scalars built by the mutation API.
    pub fn synthetic(text: &str, style: AtomStyle) -> Self {
        let input = Input::from_str(text);
        let end = input.len();
        let mut atom = Self::new(input, 0, end, style);
        atom.flags.verbatim = true;
        atom
    }

    pub(crate) fn with_flags(mut self, flags: AtomFlags) -> Self {
        let multi_chunk = self.flags.multi_chunk;
        self.flags = flags;
        self.flags.multi_chunk = multi_chunk;
        self
    }

    pub(crate) fn with_block_params(mut self, chomp: Chomp, indent: usize) -> Self {
        self.chomp = chomp;
        self.indent = indent;
        self
    }

    /// The input this atom points into.
    pub fn input(&self) -> &Rc<Input> {
        &self.input
    }

    /// Absolute start offset.
    #[inline]
    pub fn start(&self) -> usize {
        self.start
    }

    /// Absolute end offset (exclusive).
    #[inline]
    pub fn end(&self) -> usize {
        self.end
    }

    /// Raw byte length of the region.
    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// True if the region is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// The style discipline of this atom.
    #[inline]
    pub fn style(&self) -> AtomStyle {
        self.style
    }

    /// The recorded flags.
    #[inline]
    pub fn flags(&self) -> AtomFlags {
        self.flags
    }

    /// Block-scalar chomping discipline.
    #[inline]
    pub fn chomp(&self) -> Chomp {
        self.chomp
    }

    /// Block-scalar content indentation in columns.
    #[inline]
    pub fn block_indent(&self) -> usize {
        self.indent
    }

    /// The raw bytes of the region. Borrowed from the backing segment
    /// when the region lies within one chunk; owned concatenation only
    /// when a streamed chunk boundary splits it.
    pub fn raw(&self) -> Cow<'_, [u8]> {
        match self.pieces.len() {
            0 => Cow::Borrowed(&[]),
            1 => Cow::Borrowed(self.pieces[0].bytes()),
            _ => {
                let mut out = Vec::with_capacity(self.len());
                for piece in &self.pieces {
                    out.extend_from_slice(piece.bytes());
                }
                Cow::Owned(out)
            }
        }
    }

    /// The raw region as text. The scanner only creates atoms over
    /// validated UTF-8; invalid sequences (possible only through synthetic
    /// misuse) are replaced.
    pub fn raw_str(&self) -> Cow<'_, str> {
        match self.raw() {
            Cow::Borrowed(bytes) => String::from_utf8_lossy(bytes),
            Cow::Owned(bytes) => match String::from_utf8(bytes) {
                Ok(s) => Cow::Owned(s),
                Err(err) => {
                    Cow::Owned(String::from_utf8_lossy(err.as_bytes()).into_owned())
                }
            },
        }
    }

    /// True if this atom is a plain scalar whose raw bytes equal `text`.
    /// Plain scalars decode to their raw bytes for single-line content,
    /// so this is the cheap comparison used for merge-key detection.
    pub fn plain_eq(&self, text: &str) -> bool {
        self.style == AtomStyle::Plain && self.raw().as_ref() == text.as_bytes()
    }

    /// Materialise the presented string under this atom's style. The
    /// result is computed on demand and never stored in the atom; the
    /// token layer caches it.
    pub fn decode(&self) -> String {
        let raw = self.raw_str();
        if self.flags.verbatim {
            return raw.into_owned();
        }
        match self.style {
            AtomStyle::Plain => fold_flow(&raw, false),
            AtomStyle::SingleQuoted => fold_flow(&raw.replace("''", "'"), true),
            AtomStyle::DoubleQuoted => decode_double_quoted(&raw),
            AtomStyle::Literal => decode_block(&raw, self.indent, self.chomp, false),
            AtomStyle::Folded => decode_block(&raw, self.indent, self.chomp, true),
            AtomStyle::Uri | AtomStyle::Comment => raw.into_owned(),
        }
    }
}

/// Split `text` into lines on YAML breaks, treating CR LF as one break.
fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut start = 0;
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        let bw = utf8::break_width(&bytes[i..]);
        if bw > 0 {
            lines.push(&text[start..i]);
            i += bw;
            start = i;
        } else {
            i += utf8::utf8_width(bytes[i]).max(1);
        }
    }
    lines.push(&text[start..]);
    lines
}

/// Flow-scalar folding: inner line edges are trimmed of blanks, a single
/// break folds to a space, and a run of `n` breaks folds to `n - 1`
/// newlines. When `keep_edges` is set (quoted styles) the whitespace at
/// the very start and end of the scalar is preserved.
fn fold_flow(text: &str, keep_edges: bool) -> String {
    let lines = split_lines(text);
    if lines.len() == 1 {
        return if keep_edges {
            lines[0].to_string()
        } else {
            lines[0].trim_matches([' ', '\t']).to_string()
        };
    }
    let last = lines.len() - 1;
    let mut trimmed: Vec<&str> = Vec::with_capacity(lines.len());
    for (i, line) in lines.iter().enumerate() {
        let mut s = *line;
        if i > 0 || !keep_edges {
            s = s.trim_start_matches([' ', '\t']);
        }
        if i < last || !keep_edges {
            s = s.trim_end_matches([' ', '\t']);
        }
        // Inner edges adjacent to a break are always folded away.
        if i > 0 {
            s = s.trim_start_matches([' ', '\t']);
        }
        if i < last {
            s = s.trim_end_matches([' ', '\t']);
        }
        trimmed.push(s);
    }
    let mut out = String::new();
    out.push_str(trimmed[0]);
    let mut pending_breaks = 0usize;
    for line in &trimmed[1..] {
        pending_breaks += 1;
        if line.is_empty() {
            continue;
        }
        if pending_breaks == 1 {
            out.push(' ');
        } else {
            for _ in 0..pending_breaks - 1 {
                out.push('\n');
            }
        }
        out.push_str(line);
        pending_breaks = 0;
    }
    // Trailing break run folds into newlines.
    if pending_breaks > 0 {
        for _ in 0..pending_breaks.saturating_sub(1) {
            out.push('\n');
        }
    }
    out
}

/// Decode a double-quoted scalar body: backslash escapes plus flow
/// folding. An escaped break joins lines with nothing; escaped
/// whitespace survives folding.
fn decode_double_quoted(text: &str) -> String {
    let mut out = String::new();
    // Watermark below which trailing blanks must not be trimmed: escaped
    // characters are literal.
    let mut protect = 0usize;
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some(b) if utf8::is_break(b) => {
                    // Escaped line break: join with nothing, swallow the
                    // continuation line's leading blanks.
                    if b == '\r' && chars.peek() == Some(&'\n') {
                        chars.next();
                    }
                    while matches!(chars.peek(), Some(' ') | Some('\t')) {
                        chars.next();
                    }
                }
                Some(e) => {
                    out.push(unescape_char(e, &mut chars));
                    protect = out.len();
                }
                None => break,
            }
        } else if utf8::is_break(c) {
            // Fold a run of breaks and surrounding blanks.
            while out.len() > protect && out.ends_with([' ', '\t']) {
                out.pop();
            }
            let mut breaks = 1usize;
            if c == '\r' && chars.peek() == Some(&'\n') {
                chars.next();
            }
            loop {
                match chars.peek() {
                    Some(&b) if b == ' ' || b == '\t' => {
                        chars.next();
                    }
                    Some(&b) if utf8::is_break(b) => {
                        chars.next();
                        if b == '\r' && chars.peek() == Some(&'\n') {
                            chars.next();
                        }
                        breaks += 1;
                    }
                    _ => break,
                }
            }
            if breaks == 1 {
                out.push(' ');
            } else {
                for _ in 0..breaks - 1 {
                    out.push('\n');
                }
            }
            protect = out.len();
        } else {
            out.push(c);
        }
    }
    out
}

/// Expand one escape character (the character after the backslash).
/// Hex escapes pull their digits from `chars`. Invalid escapes were
/// rejected at scan time; the replacement character covers synthetic
/// misuse.
fn unescape_char(e: char, chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> char {
    match e {
        '0' => '\0',
        'a' => '\u{7}',
        'b' => '\u{8}',
        't' | '\t' => '\t',
        'n' => '\n',
        'v' => '\u{b}',
        'f' => '\u{c}',
        'r' => '\r',
        'e' => '\u{1b}',
        ' ' => ' ',
        '"' => '"',
        '/' => '/',
        '\\' => '\\',
        'N' => '\u{85}',
        '_' => '\u{a0}',
        'L' => '\u{2028}',
        'P' => '\u{2029}',
        'x' => unescape_hex(chars, 2),
        'u' => unescape_hex(chars, 4),
        'U' => unescape_hex(chars, 8),
        other => other,
    }
}

fn unescape_hex(chars: &mut std::iter::Peekable<std::str::Chars<'_>>, digits: usize) -> char {
    let mut value: u32 = 0;
    for _ in 0..digits {
        match chars.peek() {
            Some(&c) if utf8::is_hex(c) => {
                value = (value << 4) | utf8::hex_value(c);
                chars.next();
            }
            _ => break,
        }
    }
    char::from_u32(value).unwrap_or('\u{fffd}')
}

/// Decode a block scalar body. `indent` is the content indentation in
/// columns; lines with more indentation keep the excess and suppress
/// folding on their adjacent breaks.
fn decode_block(text: &str, indent: usize, chomp: Chomp, folded: bool) -> String {
    if text.is_empty() {
        return String::new();
    }
    let raw_lines = split_lines(text);
    // The region ends at the break that closed the last content line, so
    // a trailing empty element corresponds to that final break.
    let mut lines: Vec<(String, bool, bool)> = Vec::with_capacity(raw_lines.len());
    for line in &raw_lines {
        let mut stripped = *line;
        let mut taken = 0;
        while taken < indent {
            if let Some(rest) = stripped.strip_prefix(' ') {
                stripped = rest;
                taken += 1;
            } else {
                break;
            }
        }
        let more_indented = stripped.starts_with([' ', '\t']);
        // Folded style treats whitespace-only lines as empty; literal
        // style keeps their excess spaces as content.
        let empty = if folded {
            stripped.trim_matches([' ', '\t']).is_empty()
        } else {
            stripped.is_empty()
        };
        lines.push((stripped.to_string(), more_indented, empty));
    }
    // Separate trailing empty lines; they feed the chomping logic.
    let mut content_len = lines.len();
    while content_len > 0 && lines[content_len - 1].2 {
        content_len -= 1;
    }
    let trailing_breaks = lines.len() - content_len;

    let mut out = String::new();
    let mut first = true;
    let mut prev_more = false;
    let mut empties = 0usize;
    for (line, more, empty) in &lines[..content_len] {
        if *empty {
            empties += 1;
            continue;
        }
        if first {
            // Leading empty lines are literal breaks before the content.
            for _ in 0..empties {
                out.push('\n');
            }
            out.push_str(line);
            first = false;
        } else {
            let breaks = empties + 1;
            if folded && !prev_more && !*more {
                if breaks == 1 {
                    out.push(' ');
                } else {
                    for _ in 0..breaks - 1 {
                        out.push('\n');
                    }
                }
            } else {
                for _ in 0..breaks {
                    out.push('\n');
                }
            }
            out.push_str(line);
        }
        prev_more = *more;
        empties = 0;
    }

    if out.is_empty() {
        // Only breaks: keep them all under Keep, nothing otherwise.
        if chomp == Chomp::Keep {
            for _ in 0..trailing_breaks.saturating_sub(1) {
                out.push('\n');
            }
        }
        return out;
    }
    match chomp {
        Chomp::Strip => {}
        Chomp::Clip => {
            if trailing_breaks > 0 {
                out.push('\n');
            }
        }
        Chomp::Keep => {
            for _ in 0..trailing_breaks {
                out.push('\n');
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(text: &str) -> Atom {
        let input = Input::from_str(text);
        let end = input.len();
        Atom::new(input, 0, end, AtomStyle::Plain)
    }

    fn styled(text: &str, style: AtomStyle) -> Atom {
        let input = Input::from_str(text);
        let end = input.len();
        Atom::new(input, 0, end, style)
    }

    fn block(text: &str, style: AtomStyle, chomp: Chomp, indent: usize) -> Atom {
        styled(text, style).with_block_params(chomp, indent)
    }

    // ==================== raw access tests ====================

    #[test]
    fn test_raw_is_borrowed_single_segment() {
        let atom = plain("hello");
        assert!(matches!(atom.raw(), Cow::Borrowed(b"hello")));
    }

    #[test]
    fn test_raw_spanning_chunks_is_owned() {
        let input = Input::stream();
        input.push_chunk(b"hel").unwrap();
        input.push_chunk(b"lo").unwrap();
        input.finish();
        let atom = Atom::new(input, 0, 5, AtomStyle::Plain);
        assert!(atom.flags().multi_chunk);
        assert_eq!(atom.raw().as_ref(), b"hello");
        assert!(matches!(atom.raw(), Cow::Owned(_)));
    }

    #[test]
    fn test_empty_atom() {
        let atom = plain("");
        assert!(atom.is_empty());
        assert_eq!(atom.decode(), "");
    }

    #[test]
    fn test_plain_eq() {
        assert!(plain("<<").plain_eq("<<"));
        assert!(!plain("<<x").plain_eq("<<"));
        assert!(!styled("<<", AtomStyle::DoubleQuoted).plain_eq("<<"));
    }

    // ==================== plain decode tests ====================

    #[test]
    fn test_plain_single_line() {
        assert_eq!(plain("hello world").decode(), "hello world");
    }

    #[test]
    fn test_plain_folds_single_break_to_space() {
        assert_eq!(plain("hello\n  world").decode(), "hello world");
    }

    #[test]
    fn test_plain_folds_double_break_to_newline() {
        assert_eq!(plain("hello\n\n  world").decode(), "hello\nworld");
    }

    #[test]
    fn test_plain_crlf_folds_as_one_break() {
        assert_eq!(plain("a\r\nb").decode(), "a b");
    }

    // ==================== single-quoted decode tests ====================

    #[test]
    fn test_single_quoted_escape() {
        assert_eq!(
            styled("it''s here", AtomStyle::SingleQuoted).decode(),
            "it's here"
        );
    }

    #[test]
    fn test_single_quoted_preserves_edge_spaces() {
        assert_eq!(
            styled(" # Not a ''comment''.", AtomStyle::SingleQuoted).decode(),
            " # Not a 'comment'."
        );
    }

    #[test]
    fn test_single_quoted_folding() {
        assert_eq!(styled("a\nb", AtomStyle::SingleQuoted).decode(), "a b");
    }

    // ==================== double-quoted decode tests ====================

    #[test]
    fn test_double_quoted_simple_escapes() {
        assert_eq!(
            styled("a\\tb\\nc", AtomStyle::DoubleQuoted).decode(),
            "a\tb\nc"
        );
    }

    #[test]
    fn test_double_quoted_hex_escapes() {
        assert_eq!(
            styled("\\x0d\\x0a", AtomStyle::DoubleQuoted).decode(),
            "\r\n"
        );
        assert_eq!(
            styled("\\u263A", AtomStyle::DoubleQuoted).decode(),
            "\u{263a}"
        );
        assert_eq!(
            styled("\\U0001F389", AtomStyle::DoubleQuoted).decode(),
            "🎉"
        );
    }

    #[test]
    fn test_double_quoted_unicode_named_escapes() {
        assert_eq!(styled("\\N\\_\\L\\P", AtomStyle::DoubleQuoted).decode(),
            "\u{85}\u{a0}\u{2028}\u{2029}");
    }

    #[test]
    fn test_double_quoted_folding() {
        assert_eq!(styled("a\n  b", AtomStyle::DoubleQuoted).decode(), "a b");
    }

    #[test]
    fn test_double_quoted_escaped_break_joins() {
        assert_eq!(
            styled("folded \\\n  to a space", AtomStyle::DoubleQuoted).decode(),
            "folded to a space"
        );
    }

    #[test]
    fn test_double_quoted_escaped_space_survives_folding() {
        assert_eq!(
            styled("a\\ \nb", AtomStyle::DoubleQuoted).decode(),
            "a  b"
        );
    }

    // ==================== literal decode tests ====================

    #[test]
    fn test_literal_preserves_breaks() {
        let atom = block("  line1\n  line2\n", AtomStyle::Literal, Chomp::Clip, 2);
        assert_eq!(atom.decode(), "line1\nline2\n");
    }

    #[test]
    fn test_literal_strip_chomping() {
        let atom = block("  text\n\n\n", AtomStyle::Literal, Chomp::Strip, 2);
        assert_eq!(atom.decode(), "text");
    }

    #[test]
    fn test_literal_keep_chomping() {
        let atom = block("  text\n\n\n", AtomStyle::Literal, Chomp::Keep, 2);
        assert_eq!(atom.decode(), "text\n\n\n");
    }

    #[test]
    fn test_literal_more_indented_kept() {
        let atom = block("  a\n    b\n", AtomStyle::Literal, Chomp::Clip, 2);
        assert_eq!(atom.decode(), "a\n  b\n");
    }

    // ==================== folded decode tests ====================

    #[test]
    fn test_folded_joins_lines() {
        let atom = block("  a\n  b\n", AtomStyle::Folded, Chomp::Clip, 2);
        assert_eq!(atom.decode(), "a b\n");
    }

    #[test]
    fn test_folded_blank_line_becomes_newline() {
        let atom = block("  a\n\n  b\n", AtomStyle::Folded, Chomp::Clip, 2);
        assert_eq!(atom.decode(), "a\nb\n");
    }

    #[test]
    fn test_folded_more_indented_not_folded() {
        let atom = block("  a\n    b\n  c\n", AtomStyle::Folded, Chomp::Clip, 2);
        assert_eq!(atom.decode(), "a\n  b\nc\n");
    }

    // ==================== synthetic atom tests ====================

    #[test]
    fn test_synthetic_verbatim() {
        let atom = Atom::synthetic("has\nnewlines  kept", AtomStyle::Plain);
        assert_eq!(atom.decode(), "has\nnewlines  kept");
        assert!(atom.flags().verbatim);
    }

    // ==================== invariant 7 spot check ====================

    #[test]
    fn test_decode_is_deterministic() {
        let atom = styled("a\\tb\n  c", AtomStyle::DoubleQuoted);
        assert_eq!(atom.decode(), atom.decode());
    }
}
