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

//! Scalar scanning: plain, quoted, and block scalars.
//!
//! Scalars are consumed by position only; the token's atom points at the
//! raw source region and the style plus flags tell the decoder how to
//! present it. Nothing is unescaped or folded here.

use super::Scanner;
use crate::atom::{AtomFlags, AtomStyle, Chomp};
use crate::error::{YamlError, YamlResult};
use crate::token::{ScalarStyle, TokenData};
use crate::utf8;

impl Scanner {
    // ==================== plain scalars ====================

    pub(super) fn fetch_plain_scalar(&mut self) -> YamlResult<()> {
        self.save_simple_key()?;
        let start = self.mark;
        let mut end_mark = self.mark;
        let mut end_offset = self.mark.index;
        // Continuation lines must be indented past the current block
        // level.
        let min_column = (self.indent + 1).max(0) as usize;
        let mut has_folds = false;
        let mut ended_after_break = false;

        'outer: loop {
            // A comment or a document marker ends the scalar.
            if self.cur()? == Some('#') {
                break;
            }
            if self.mark.column == 0
                && (self.check_document_indicator("---")?
                    || self.check_document_indicator("...")?)
            {
                break;
            }
            // Consume one run of content.
            loop {
                let c = match self.cur()? {
                    None => break,
                    Some(c) => c,
                };
                if utf8::is_blank(c) || utf8::is_break(c) {
                    break;
                }
                if c == ':' {
                    let next = self.look(1)?;
                    if utf8::is_blankz(next)
                        || (self.flow_level > 0
                            && next.is_some_and(utf8::is_flow_indicator))
                    {
                        break;
                    }
                }
                if self.flow_level > 0 && utf8::is_flow_indicator(c) {
                    break;
                }
                self.skip_one()?;
                end_mark = self.mark;
                end_offset = self.mark.index;
            }
            // Stop on a terminator that is not whitespace.
            let c = self.cur()?;
            if !utf8::is_blankz(c) {
                break;
            }
            if c.is_none() {
                break;
            }
            // Consume blanks and line breaks, then decide whether the
            // scalar continues on the next line.
            let mut saw_break = false;
            loop {
                match self.cur()? {
                    Some(b) if utf8::is_blank(b) => self.skip_one()?,
                    Some(b) if utf8::is_break(b) => {
                        saw_break = true;
                        has_folds = true;
                        self.skip_one()?;
                    }
                    _ => break,
                }
            }
            if !saw_break {
                // Blanks within a line: the content continues. A comment
                // after blanks still ends it, checked at loop top.
                if self.cur()? == Some('#') || self.cur()?.is_none() {
                    break;
                }
                continue;
            }
            ended_after_break = true;
            if self.cur()?.is_none() {
                break;
            }
            if self.flow_level == 0 && self.mark.column < min_column {
                break;
            }
            ended_after_break = false;
            continue 'outer;
        }

        // An implicit key may follow only when the scalar ended at a
        // line break.
        self.simple_key_allowed = ended_after_break;

        let mut atom = self.atom(start.index, end_offset, AtomStyle::Plain);
        let mc = atom.flags().multi_chunk;
        atom = atom.with_flags(AtomFlags {
            has_folds,
            multi_chunk: mc,
            ..AtomFlags::default()
        });
        self.push(
            TokenData::Scalar {
                atom,
                style: ScalarStyle::Plain,
            },
            start,
            end_mark,
        );
        Ok(())
    }

    // ==================== quoted scalars ====================

    pub(super) fn fetch_flow_scalar(&mut self, single: bool) -> YamlResult<()> {
        self.save_simple_key()?;
        self.simple_key_allowed = false;
        let start = self.mark;
        self.skip_one()?; // opening quote
        let content_start = self.mark.index;
        let mut has_escapes = false;
        let mut has_folds = false;

        loop {
            if self.mark.column == 0
                && (self.check_document_indicator("---")?
                    || self.check_document_indicator("...")?)
            {
                return Err(YamlError::lexical(
                    "unexpected document indicator inside a quoted scalar",
                )
                .at(self.mark)
                .with_context("while scanning a quoted scalar"));
            }
            let c = match self.cur()? {
                None => {
                    return Err(YamlError::lexical("unterminated quoted scalar")
                        .at(start)
                        .with_context("while scanning a quoted scalar"))
                }
                Some(c) => c,
            };
            if single {
                if c == '\'' {
                    if self.look(1)? == Some('\'') {
                        has_escapes = true;
                        self.skip_n(2)?;
                        continue;
                    }
                    break;
                }
                if utf8::is_break(c) {
                    has_folds = true;
                }
                self.skip_one()?;
            } else {
                if c == '"' {
                    break;
                }
                if c == '\\' {
                    has_escapes = true;
                    let e = match self.look(1)? {
                        None => {
                            return Err(YamlError::lexical("unterminated quoted scalar")
                                .at(start))
                        }
                        Some(e) => e,
                    };
                    if utf8::is_break(e) {
                        has_folds = true;
                        self.skip_one()?; // backslash
                        self.skip_one()?; // the break
                        continue;
                    }
                    self.validate_escape(e)?;
                    continue;
                }
                if utf8::is_break(c) {
                    has_folds = true;
                }
                self.skip_one()?;
            }
        }

        let content_end = self.mark.index;
        self.skip_one()?; // closing quote
        let end = self.mark;

        let ws_lead = self
            .input()
            .byte_at(content_start)
            .is_some_and(|b| b == b' ' || b == b'\t');
        let ws_trail = content_end > content_start
            && self
                .input()
                .byte_at(content_end - 1)
                .is_some_and(|b| b == b' ' || b == b'\t');
        let style = if single {
            AtomStyle::SingleQuoted
        } else {
            AtomStyle::DoubleQuoted
        };
        let mut atom = self.atom(content_start, content_end, style);
        let mc = atom.flags().multi_chunk;
        atom = atom.with_flags(AtomFlags {
            has_escapes,
            has_folds,
            ws_lead,
            ws_trail,
            multi_chunk: mc,
            verbatim: false,
        });
        self.push(
            TokenData::Scalar {
                atom,
                style: if single {
                    ScalarStyle::SingleQuoted
                } else {
                    ScalarStyle::DoubleQuoted
                },
            },
            start,
            end,
        );
        Ok(())
    }

    /// Consume and validate one escape sequence; the cursor sits on the
    /// backslash and `e` is the character after it.
    fn validate_escape(&mut self, e: char) -> YamlResult<()> {
        let hex_digits = match e {
            '0' | 'a' | 'b' | 't' | '\t' | 'n' | 'v' | 'f' | 'r' | 'e' | ' ' | '"' | '/'
            | '\\' | 'N' | '_' | 'L' | 'P' => 0,
            'x' => 2,
            'u' => 4,
            'U' => 8,
            other => {
                return Err(YamlError::lexical(format!(
                    "invalid escape character {other:?} in double-quoted scalar"
                ))
                .at(self.mark))
            }
        };
        self.skip_n(2)?; // backslash + escape character
        for _ in 0..hex_digits {
            match self.cur()? {
                Some(c) if utf8::is_hex(c) => self.skip_one()?,
                _ => {
                    return Err(YamlError::lexical(
                        "invalid hex escape in double-quoted scalar",
                    )
                    .at(self.mark))
                }
            }
        }
        Ok(())
    }

    // ==================== block scalars ====================

    pub(super) fn fetch_block_scalar(&mut self, literal: bool) -> YamlResult<()> {
        self.remove_simple_key()?;
        self.simple_key_allowed = true;
        let start = self.mark;
        self.skip_one()?; // '|' or '>'

        // Header: chomping and indentation indicators in either order.
        let mut chomp = Chomp::Clip;
        let mut increment: Option<usize> = None;
        for _ in 0..2 {
            match self.cur()? {
                Some('+') if chomp == Chomp::Clip => {
                    chomp = Chomp::Keep;
                    self.skip_one()?;
                }
                Some('-') if chomp == Chomp::Clip => {
                    chomp = Chomp::Strip;
                    self.skip_one()?;
                }
                Some('0') if increment.is_none() => {
                    return Err(YamlError::lexical(
                        "indentation indicator in block scalar header must be 1-9",
                    )
                    .at(self.mark));
                }
                Some(c) if utf8::is_digit(c) && increment.is_none() => {
                    increment = c.to_digit(10).map(|d| d as usize);
                    self.skip_one()?;
                }
                _ => break,
            }
        }
        while self.cur()?.is_some_and(utf8::is_blank) {
            self.skip_one()?;
        }
        if self.cur()? == Some('#') {
            while !utf8::is_breakz(self.cur()?) {
                self.skip_one()?;
            }
        }
        if !utf8::is_breakz(self.cur()?) {
            return Err(
                YamlError::lexical("unexpected character after block scalar header")
                    .at(self.mark)
                    .with_context("while scanning a block scalar"),
            );
        }
        if self.cur()?.is_some() {
            self.skip_one()?; // header line break
        }

        let base = if self.indent < 0 { 0 } else { self.indent as usize };
        let mut content_indent = increment.map(|inc| base + inc);
        let content_start = self.mark.index;
        let mut end_offset = self.mark.index;

        'lines: loop {
            // Consume the line's indentation, up to the content indent
            // once it is known.
            loop {
                match self.cur()? {
                    Some(' ')
                        if content_indent.map_or(true, |ci| self.mark.column < ci) =>
                    {
                        self.skip_one()?;
                    }
                    _ => break,
                }
            }
            let c = self.cur()?;
            match content_indent {
                None => {
                    if c.is_none() {
                        break 'lines;
                    }
                    if utf8::is_breakz(c) {
                        // Leading empty line; indentation still unknown.
                        self.skip_one()?;
                        end_offset = self.mark.index;
                        continue 'lines;
                    }
                    let detected = self.mark.column;
                    if detected < base + 1 {
                        // Content is not indented past the parent: the
                        // scalar is empty and the line belongs to the
                        // enclosing context.
                        break 'lines;
                    }
                    content_indent = Some(detected);
                    // Fall through into the content path below.
                }
                Some(ci) => {
                    if c.is_none() {
                        break 'lines;
                    }
                    if utf8::is_breakz(c) {
                        self.skip_one()?;
                        end_offset = self.mark.index;
                        continue 'lines;
                    }
                    if self.mark.column < ci {
                        // Dedented content ends the scalar.
                        break 'lines;
                    }
                }
            }
            // A content line: consume to its end, then its break.
            while !utf8::is_breakz(self.cur()?) {
                self.skip_one()?;
            }
            end_offset = self.mark.index;
            match self.cur()? {
                Some(_) => {
                    self.skip_one()?;
                    end_offset = self.mark.index;
                }
                None => break 'lines,
            }
        }

        let ci = content_indent.unwrap_or(base + 1);
        let atom = self
            .atom(
                content_start.min(end_offset),
                end_offset,
                if literal {
                    AtomStyle::Literal
                } else {
                    AtomStyle::Folded
                },
            )
            .with_block_params(chomp, ci);
        let end = self.mark;
        self.push(
            TokenData::Scalar {
                atom,
                style: if literal {
                    ScalarStyle::Literal
                } else {
                    ScalarStyle::Folded
                },
            },
            start,
            end,
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::input::Input;
    use crate::limits::Limits;
    use crate::scanner::Scanner;
    use crate::token::{ScalarStyle, Token, TokenData};
    use std::rc::Rc;

    fn scan_scalars(text: &str) -> Vec<Token> {
        let mut scanner = Scanner::new(Input::from_str(text), Limits::default());
        let mut out = Vec::new();
        loop {
            let token = scanner.next_token().expect("scan failure");
            match token.data() {
                TokenData::StreamEnd => break,
                TokenData::Scalar { .. } => out.push(token),
                _ => {}
            }
        }
        out
    }

    fn only_scalar(text: &str) -> Token {
        let scalars = scan_scalars(text);
        assert_eq!(scalars.len(), 1, "expected one scalar in {text:?}");
        scalars.into_iter().next().unwrap()
    }

    // ==================== plain scalar tests ====================

    #[test]
    fn test_plain_simple() {
        let token = only_scalar("hello world");
        assert_eq!(token.text(), "hello world");
        assert_eq!(token.scalar_style(), Some(ScalarStyle::Plain));
    }

    #[test]
    fn test_plain_multiline_folds() {
        let token = only_scalar("hello\n  world\n");
        assert_eq!(token.text(), "hello world");
    }

    #[test]
    fn test_plain_stops_at_comment() {
        let token = only_scalar("value # comment\n");
        assert_eq!(token.text(), "value");
    }

    #[test]
    fn test_plain_keeps_inner_colon() {
        let token = only_scalar("a:b:c\n");
        assert_eq!(token.text(), "a:b:c");
    }

    #[test]
    fn test_plain_trailing_spaces_excluded() {
        let token = only_scalar("value   \n");
        assert_eq!(token.text(), "value");
    }

    // ==================== quoted scalar tests ====================

    #[test]
    fn test_single_quoted() {
        let token = only_scalar("'it''s'");
        assert_eq!(token.text(), "it's");
        assert_eq!(token.scalar_style(), Some(ScalarStyle::SingleQuoted));
    }

    #[test]
    fn test_double_quoted_escapes() {
        let token = only_scalar("\"a\\tb\\u263A\"");
        assert_eq!(token.text(), "a\tb\u{263a}");
        assert_eq!(token.scalar_style(), Some(ScalarStyle::DoubleQuoted));
    }

    #[test]
    fn test_double_quoted_empty() {
        let token = only_scalar("\"\"");
        assert_eq!(token.text(), "");
    }

    #[test]
    fn test_unterminated_quoted_is_error() {
        let mut scanner = Scanner::new(Input::from_str("'oops"), Limits::default());
        let mut failed = false;
        for _ in 0..5 {
            match scanner.next_token() {
                Err(_) => {
                    failed = true;
                    break;
                }
                Ok(t) if matches!(t.data(), TokenData::StreamEnd) => break,
                Ok(_) => {}
            }
        }
        assert!(failed);
    }

    #[test]
    fn test_bad_escape_is_error() {
        let mut scanner = Scanner::new(Input::from_str("\"a\\qb\""), Limits::default());
        let mut failed = false;
        for _ in 0..5 {
            match scanner.next_token() {
                Err(_) => {
                    failed = true;
                    break;
                }
                Ok(t) if matches!(t.data(), TokenData::StreamEnd) => break,
                Ok(_) => {}
            }
        }
        assert!(failed);
    }

    // ==================== block scalar tests ====================

    #[test]
    fn test_literal_block() {
        let token = only_scalar("|\n  line1\n  line2\n");
        assert_eq!(token.text(), "line1\nline2\n");
        assert_eq!(token.scalar_style(), Some(ScalarStyle::Literal));
    }

    #[test]
    fn test_folded_block() {
        let token = only_scalar(">\n  line1\n  line2\n");
        assert_eq!(token.text(), "line1 line2\n");
        assert_eq!(token.scalar_style(), Some(ScalarStyle::Folded));
    }

    #[test]
    fn test_literal_strip() {
        let token = only_scalar("|-\n  text\n\n");
        assert_eq!(token.text(), "text");
    }

    #[test]
    fn test_literal_keep() {
        let token = only_scalar("|+\n  text\n\n");
        assert_eq!(token.text(), "text\n\n");
    }

    #[test]
    fn test_explicit_indentation_indicator() {
        let token = only_scalar("|2\n  text\n");
        assert_eq!(token.text(), "text\n");
    }

    #[test]
    fn test_indentation_indicator_zero_is_error() {
        let mut scanner = Scanner::new(Input::from_str("|0\n  x\n"), Limits::default());
        let mut failed = false;
        for _ in 0..5 {
            match scanner.next_token() {
                Err(_) => {
                    failed = true;
                    break;
                }
                Ok(t) if matches!(t.data(), TokenData::StreamEnd) => break,
                Ok(_) => {}
            }
        }
        assert!(failed);
    }

    #[test]
    fn test_block_scalar_in_mapping() {
        let scalars = scan_scalars("key: |\n  body line\nnext: x\n");
        let texts: Vec<&str> = scalars.iter().map(|t| t.text()).collect();
        assert_eq!(texts, vec!["key", "body line\n", "next", "x"]);
    }

    #[test]
    fn test_literal_leading_blank_lines() {
        let token = only_scalar("|\n\n  text\n");
        assert_eq!(token.text(), "\ntext\n");
    }

    #[test]
    fn test_folded_more_indented_lines() {
        let token = only_scalar(">\n  folded\n    literal part\n  again\n");
        assert_eq!(token.text(), "folded\n  literal part\nagain\n");
    }
}
