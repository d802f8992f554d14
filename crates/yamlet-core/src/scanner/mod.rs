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

//! The scanner: bytes to a FIFO of tokens.
//!
//! The scanner tracks the block indentation stack, the per-level
//! implicit-key candidates, and the flow nesting level, and queues tokens
//! ahead of the parser. A queued token is not stable until pending
//! implicit-key resolution can no longer insert a `KEY` (and a block
//! mapping start) in front of it, which is why fetching is driven by
//! [`Scanner::peek`] rather than scanned eagerly.
//!
//! Implicit-key candidates record a token-queue position, not buffered
//! text, so keys have no artificial length limit; a candidate goes stale
//! only when the scan crosses a line break.
//!
//! On a streamed input that runs out of committed bytes mid-token, every
//! fetch is rolled back to its entry state and the non-fatal
//! `NeedMoreInput` sentinel is returned; feeding the input and retrying
//! resumes cleanly.

mod scalars;

use crate::atom::{Atom, AtomStyle};
use crate::error::{YamlError, YamlResult};
use crate::input::{CharRead, Input};
use crate::limits::Limits;
use crate::mark::Mark;
use crate::token::{Token, TokenData};
use crate::utf8;
use std::collections::VecDeque;
use std::rc::Rc;

/// An implicit (simple) key candidate for one nesting level.
#[derive(Debug, Clone, Default)]
struct SimpleKey {
    /// A key is still possible at the recorded position.
    possible: bool,
    /// A key is required there (block context, at the current indent).
    required: bool,
    /// Queue position the `KEY` token would be inserted at.
    token_number: usize,
    /// Where the candidate token started.
    mark: Mark,
}

#[derive(Debug)]
struct Snapshot {
    mark: Mark,
    indent: i64,
    indents_len: usize,
    simple_key_allowed: bool,
    simple_keys: Vec<SimpleKey>,
    flow_level: usize,
    tokens_len: usize,
    stream_start_produced: bool,
    stream_end_produced: bool,
}

/// A streaming YAML scanner. See the module docs.
#[derive(Debug)]
pub struct Scanner {
    input: Rc<Input>,
    limits: Limits,
    mark: Mark,
    stream_start_produced: bool,
    stream_end_produced: bool,
    /// Current block indentation column, -1 before any block context.
    indent: i64,
    indents: Vec<i64>,
    simple_key_allowed: bool,
    simple_keys: Vec<SimpleKey>,
    flow_level: usize,
    tokens: VecDeque<Token>,
    /// Monotonic count of tokens handed to the parser.
    tokens_taken: usize,
    error: Option<YamlError>,
}

impl Scanner {
    /// Create a scanner over an input.
    pub fn new(input: Rc<Input>, limits: Limits) -> Self {
        Self {
            input,
            limits,
            mark: Mark::start(),
            stream_start_produced: false,
            stream_end_produced: false,
            indent: -1,
            indents: Vec::new(),
            simple_key_allowed: false,
            simple_keys: Vec::new(),
            flow_level: 0,
            tokens: VecDeque::new(),
            tokens_taken: 0,
            error: None,
        }
    }

    /// The input this scanner reads.
    pub fn input(&self) -> &Rc<Input> {
        &self.input
    }

    /// Monotonic token counter; detects queue churn across calls.
    pub fn tokens_taken(&self) -> usize {
        self.tokens_taken
    }

    /// Current scan position.
    pub fn position(&self) -> Mark {
        self.mark
    }

    /// The head token without consuming it. Scans as much input as is
    /// needed to make the head stable.
    pub fn peek(&mut self) -> YamlResult<Token> {
        self.fetch_more_tokens()?;
        self.tokens
            .front()
            .cloned()
            .ok_or_else(|| YamlError::grammar("no more tokens in stream").at(self.mark))
    }

    /// Consume the head token.
    pub fn skip_token(&mut self) {
        if self.tokens.pop_front().is_some() {
            self.tokens_taken += 1;
        }
    }

    /// Peek and consume in one step.
    pub fn next_token(&mut self) -> YamlResult<Token> {
        let token = self.peek()?;
        self.skip_token();
        Ok(token)
    }

    // ==================== character access ====================

    /// The codepoint `n` positions ahead of the cursor, or `None` at the
    /// finished end. Unfinished streamed inputs yield the `NeedMoreInput`
    /// sentinel instead of `None`.
    pub(crate) fn look(&self, n: usize) -> YamlResult<Option<char>> {
        let mut off = self.mark.index;
        for _ in 0..n {
            match self.input.char_at(off) {
                CharRead::Char(_, w) => off += w,
                CharRead::End if self.input.is_finished() => return Ok(None),
                CharRead::End | CharRead::Truncated => return Err(YamlError::need_more()),
                CharRead::Invalid => {
                    return Err(YamlError::encoding("invalid UTF-8 in input").at(self.mark))
                }
            }
        }
        match self.input.char_at(off) {
            CharRead::Char(c, _) => Ok(Some(c)),
            CharRead::End if self.input.is_finished() => Ok(None),
            CharRead::End | CharRead::Truncated => Err(YamlError::need_more()),
            CharRead::Invalid => Err(YamlError::encoding("invalid UTF-8 in input").at(self.mark)),
        }
    }

    /// The codepoint under the cursor.
    #[inline]
    pub(crate) fn cur(&self) -> YamlResult<Option<char>> {
        self.look(0)
    }

    /// Consume one codepoint, updating line and column. `CR LF` is
    /// consumed as a single break.
    pub(crate) fn skip_one(&mut self) -> YamlResult<()> {
        match self.input.char_at(self.mark.index) {
            CharRead::Char('\r', _) => {
                let width = if self.input.byte_at(self.mark.index + 1) == Some(b'\n') {
                    2
                } else {
                    1
                };
                self.mark.advance_line(width);
                Ok(())
            }
            CharRead::Char(c, w) if utf8::is_break(c) => {
                self.mark.advance_line(w);
                Ok(())
            }
            CharRead::Char(_, w) => {
                self.mark.advance(w);
                Ok(())
            }
            CharRead::End | CharRead::Truncated => Err(YamlError::need_more()),
            CharRead::Invalid => Err(YamlError::encoding("invalid UTF-8 in input").at(self.mark)),
        }
    }

    /// Consume `n` codepoints.
    pub(crate) fn skip_n(&mut self, n: usize) -> YamlResult<()> {
        for _ in 0..n {
            self.skip_one()?;
        }
        Ok(())
    }

    /// Build an atom over an absolute byte range of the input.
    pub(crate) fn atom(&self, start: usize, end: usize, style: AtomStyle) -> Atom {
        Atom::new(Rc::clone(&self.input), start, end, style)
    }

    /// Queue a token at the back.
    pub(crate) fn push(&mut self, data: TokenData, start: Mark, end: Mark) {
        self.tokens.push_back(Token::new(data, start, end));
    }

    // ==================== fetch loop ====================

    fn fetch_more_tokens(&mut self) -> YamlResult<()> {
        loop {
            if let Some(err) = &self.error {
                if !err.is_need_more() {
                    return Err(err.clone());
                }
            }
            let mut need = self.tokens.is_empty();
            if !need {
                self.stale_simple_keys()?;
                for key in &self.simple_keys {
                    // The head of the queue may still be reinterpreted by
                    // a pending candidate at its position.
                    if key.possible && key.token_number == self.tokens_taken {
                        need = true;
                        break;
                    }
                }
            }
            if !need || self.stream_end_produced {
                return Ok(());
            }
            let snapshot = self.snapshot();
            match self.fetch_next_token() {
                Ok(()) => {}
                Err(e) if e.is_need_more() => {
                    self.restore(snapshot);
                    return Err(e);
                }
                Err(e) => {
                    self.error = Some(e.clone());
                    return Err(e);
                }
            }
        }
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            mark: self.mark,
            indent: self.indent,
            indents_len: self.indents.len(),
            simple_key_allowed: self.simple_key_allowed,
            simple_keys: self.simple_keys.clone(),
            flow_level: self.flow_level,
            tokens_len: self.tokens.len(),
            stream_start_produced: self.stream_start_produced,
            stream_end_produced: self.stream_end_produced,
        }
    }

    fn restore(&mut self, snapshot: Snapshot) {
        self.mark = snapshot.mark;
        self.indent = snapshot.indent;
        self.indents.truncate(snapshot.indents_len);
        self.simple_key_allowed = snapshot.simple_key_allowed;
        self.simple_keys = snapshot.simple_keys;
        self.flow_level = snapshot.flow_level;
        self.tokens.truncate(snapshot.tokens_len);
        self.stream_start_produced = snapshot.stream_start_produced;
        self.stream_end_produced = snapshot.stream_end_produced;
    }

    fn fetch_next_token(&mut self) -> YamlResult<()> {
        if !self.stream_start_produced {
            return self.fetch_stream_start();
        }
        self.scan_to_next_token()?;
        self.stale_simple_keys()?;
        if self.flow_level == 0 {
            self.unroll_indent(self.mark.column as i64);
        }

        let c = match self.cur()? {
            None => return self.fetch_stream_end(),
            Some(c) => c,
        };
        let col0 = self.mark.column == 0;

        if c == '%' && col0 {
            return self.fetch_directive();
        }
        if col0 && self.check_document_indicator("---")? {
            return self.fetch_document_indicator(TokenData::DocumentStart);
        }
        if col0 && self.check_document_indicator("...")? {
            return self.fetch_document_indicator(TokenData::DocumentEnd);
        }
        match c {
            '[' => self.fetch_flow_collection_start(TokenData::FlowSequenceStart),
            '{' => self.fetch_flow_collection_start(TokenData::FlowMappingStart),
            ']' => self.fetch_flow_collection_end(TokenData::FlowSequenceEnd),
            '}' => self.fetch_flow_collection_end(TokenData::FlowMappingEnd),
            ',' => self.fetch_flow_entry(),
            '-' if utf8::is_blankz(self.look(1)?) => self.fetch_block_entry(),
            '?' if self.flow_level > 0 || utf8::is_blankz(self.look(1)?) => self.fetch_key(),
            ':' if self.flow_level > 0 || utf8::is_blankz(self.look(1)?) => self.fetch_value(),
            '*' => self.fetch_anchor(false),
            '&' => self.fetch_anchor(true),
            '!' => self.fetch_tag(),
            '|' if self.flow_level == 0 => self.fetch_block_scalar(true),
            '>' if self.flow_level == 0 => self.fetch_block_scalar(false),
            '\'' => self.fetch_flow_scalar(true),
            '"' => self.fetch_flow_scalar(false),
            c if can_start_plain(c, self.flow_level > 0) => self.fetch_plain_scalar(),
            c => Err(YamlError::lexical(format!(
                "found a character {c:?} that cannot start any token"
            ))
            .at(self.mark)),
        }
    }

    fn check_document_indicator(&self, marker: &str) -> YamlResult<bool> {
        debug_assert_eq!(marker.len(), 3);
        let m: Vec<char> = marker.chars().collect();
        Ok(self.look(0)? == Some(m[0])
            && self.look(1)? == Some(m[1])
            && self.look(2)? == Some(m[2])
            && utf8::is_blankz(self.look(3)?))
    }

    /// Skip blanks, breaks, and comments up to the next token start. A
    /// line break in block context re-allows implicit keys.
    fn scan_to_next_token(&mut self) -> YamlResult<()> {
        loop {
            if self.mark.index == 0 && self.cur()? == Some(utf8::BOM) {
                self.skip_one()?;
                continue;
            }
            match self.cur()? {
                Some(' ') => self.skip_one()?,
                Some('\t') => {
                    if self.flow_level > 0 || !self.simple_key_allowed {
                        self.skip_one()?;
                    } else {
                        return Err(YamlError::lexical(
                            "tab character used for indentation",
                        )
                        .at(self.mark));
                    }
                }
                Some('#') => {
                    while !utf8::is_breakz(self.cur()?) {
                        self.skip_one()?;
                    }
                }
                Some(c) if utf8::is_break(c) => {
                    self.skip_one()?;
                    if self.flow_level == 0 {
                        self.simple_key_allowed = true;
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    // ==================== simple keys ====================

    /// Invalidate candidates the scan has moved past. A candidate cannot
    /// survive a line break; a required candidate that goes stale is an
    /// error. There is no length-based staleness.
    fn stale_simple_keys(&mut self) -> YamlResult<()> {
        let mark = self.mark;
        for key in &mut self.simple_keys {
            if key.possible && key.mark.line < mark.line {
                if key.required {
                    return Err(YamlError::grammar(
                        "implicit mapping key crosses a line break; expected ':'",
                    )
                    .at(key.mark));
                }
                key.possible = false;
            }
        }
        Ok(())
    }

    fn save_simple_key(&mut self) -> YamlResult<()> {
        let required = self.flow_level == 0 && self.indent == self.mark.column as i64;
        if self.simple_key_allowed {
            let key = SimpleKey {
                possible: true,
                required,
                token_number: self.tokens_taken + self.tokens.len(),
                mark: self.mark,
            };
            self.remove_simple_key()?;
            if let Some(slot) = self.simple_keys.last_mut() {
                *slot = key;
            }
        }
        Ok(())
    }

    fn remove_simple_key(&mut self) -> YamlResult<()> {
        if let Some(key) = self.simple_keys.last_mut() {
            if key.possible && key.required {
                return Err(YamlError::grammar(
                    "could not find expected ':' for implicit mapping key",
                )
                .at(key.mark));
            }
            key.possible = false;
        }
        Ok(())
    }

    // ==================== indentation ====================

    fn roll_indent(
        &mut self,
        column: i64,
        number: Option<usize>,
        data: TokenData,
        mark: Mark,
    ) -> YamlResult<()> {
        if self.flow_level > 0 {
            return Ok(());
        }
        if self.indent < column {
            if self.indents.len() >= self.limits.max_nesting_depth {
                return Err(YamlError::limit("nesting depth limit exceeded").at(mark));
            }
            self.indents.push(self.indent);
            self.indent = column;
            let token = Token::new(data, mark, mark);
            match number {
                Some(n) => self.tokens.insert(n - self.tokens_taken, token),
                None => self.tokens.push_back(token),
            }
        }
        Ok(())
    }

    fn unroll_indent(&mut self, column: i64) {
        if self.flow_level > 0 {
            return;
        }
        while self.indent > column {
            let mark = self.mark;
            self.push(TokenData::BlockEnd, mark, mark);
            self.indent = self.indents.pop().unwrap_or(-1);
        }
    }

    // ==================== structural fetchers ====================

    fn fetch_stream_start(&mut self) -> YamlResult<()> {
        let mark = self.mark;
        self.indent = -1;
        self.simple_keys.push(SimpleKey::default());
        self.simple_key_allowed = true;
        self.stream_start_produced = true;
        self.push(TokenData::StreamStart, mark, mark);
        Ok(())
    }

    fn fetch_stream_end(&mut self) -> YamlResult<()> {
        if self.mark.column != 0 {
            self.mark.column = 0;
            self.mark.line += 1;
        }
        self.unroll_indent(-1);
        self.remove_simple_key()?;
        self.simple_key_allowed = false;
        self.stream_end_produced = true;
        let mark = self.mark;
        self.push(TokenData::StreamEnd, mark, mark);
        Ok(())
    }

    fn fetch_document_indicator(&mut self, data: TokenData) -> YamlResult<()> {
        self.unroll_indent(-1);
        self.remove_simple_key()?;
        self.simple_key_allowed = false;
        let start = self.mark;
        self.skip_n(3)?;
        let end = self.mark;
        self.push(data, start, end);
        Ok(())
    }

    fn fetch_flow_collection_start(&mut self, data: TokenData) -> YamlResult<()> {
        self.save_simple_key()?;
        if self.flow_level >= self.limits.max_nesting_depth {
            return Err(YamlError::limit("flow nesting depth limit exceeded").at(self.mark));
        }
        self.simple_keys.push(SimpleKey::default());
        self.flow_level += 1;
        self.simple_key_allowed = true;
        let start = self.mark;
        self.skip_one()?;
        let end = self.mark;
        self.push(data, start, end);
        Ok(())
    }

    fn fetch_flow_collection_end(&mut self, data: TokenData) -> YamlResult<()> {
        self.remove_simple_key()?;
        if self.flow_level > 0 {
            self.flow_level -= 1;
            self.simple_keys.pop();
        }
        self.simple_key_allowed = false;
        let start = self.mark;
        self.skip_one()?;
        let end = self.mark;
        self.push(data, start, end);
        Ok(())
    }

    fn fetch_flow_entry(&mut self) -> YamlResult<()> {
        self.remove_simple_key()?;
        self.simple_key_allowed = true;
        let start = self.mark;
        self.skip_one()?;
        let end = self.mark;
        self.push(TokenData::FlowEntry, start, end);
        Ok(())
    }

    fn fetch_block_entry(&mut self) -> YamlResult<()> {
        if self.flow_level > 0 {
            return Err(
                YamlError::grammar("block sequence entries are not allowed in flow context")
                    .at(self.mark),
            );
        }
        if !self.simple_key_allowed {
            return Err(
                YamlError::grammar("block sequence entries are not allowed in this context")
                    .at(self.mark),
            );
        }
        let mark = self.mark;
        self.roll_indent(
            mark.column as i64,
            None,
            TokenData::BlockSequenceStart,
            mark,
        )?;
        self.remove_simple_key()?;
        self.simple_key_allowed = true;
        let start = self.mark;
        self.skip_one()?;
        let end = self.mark;
        self.push(TokenData::BlockEntry, start, end);
        Ok(())
    }

    fn fetch_key(&mut self) -> YamlResult<()> {
        if self.flow_level == 0 {
            if !self.simple_key_allowed {
                return Err(
                    YamlError::grammar("mapping keys are not allowed in this context")
                        .at(self.mark),
                );
            }
            let mark = self.mark;
            self.roll_indent(mark.column as i64, None, TokenData::BlockMappingStart, mark)?;
        }
        self.remove_simple_key()?;
        self.simple_key_allowed = self.flow_level == 0;
        let start = self.mark;
        self.skip_one()?;
        let end = self.mark;
        self.push(TokenData::Key, start, end);
        Ok(())
    }

    fn fetch_value(&mut self) -> YamlResult<()> {
        let key = self.simple_keys.last().cloned().unwrap_or_default();
        if key.possible {
            // Insert the KEY retroactively before the candidate, then the
            // mapping start before that.
            let idx = key.token_number - self.tokens_taken;
            self.tokens
                .insert(idx, Token::new(TokenData::Key, key.mark, key.mark));
            self.roll_indent(
                key.mark.column as i64,
                Some(key.token_number),
                TokenData::BlockMappingStart,
                key.mark,
            )?;
            if let Some(slot) = self.simple_keys.last_mut() {
                slot.possible = false;
            }
            self.simple_key_allowed = false;
        } else {
            if self.flow_level == 0 {
                if !self.simple_key_allowed {
                    return Err(YamlError::grammar(
                        "mapping values are not allowed in this context",
                    )
                    .at(self.mark));
                }
                let mark = self.mark;
                self.roll_indent(
                    mark.column as i64,
                    None,
                    TokenData::BlockMappingStart,
                    mark,
                )?;
            }
            self.simple_key_allowed = self.flow_level == 0;
        }
        let start = self.mark;
        self.skip_one()?;
        let end = self.mark;
        self.push(TokenData::Value, start, end);
        Ok(())
    }

    fn fetch_anchor(&mut self, is_anchor: bool) -> YamlResult<()> {
        self.save_simple_key()?;
        self.simple_key_allowed = false;
        let start = self.mark;
        self.skip_one()?; // '&' or '*'
        let name_start = self.mark.index;
        while self.cur()?.is_some_and(utf8::is_alnum) {
            self.skip_one()?;
        }
        let name_end = self.mark.index;
        if name_start == name_end {
            return Err(YamlError::lexical(if is_anchor {
                "empty anchor name"
            } else {
                "empty alias name"
            })
            .at(start));
        }
        let follower = self.cur()?;
        if !utf8::is_blankz(follower)
            && !follower.is_some_and(|c| matches!(c, '?' | ':' | ',' | ']' | '}' | '%' | '@' | '`'))
        {
            return Err(YamlError::lexical(format!(
                "unexpected character {:?} after {} name",
                follower.unwrap_or('\0'),
                if is_anchor { "anchor" } else { "alias" }
            ))
            .at(self.mark));
        }
        let name = self.atom(name_start, name_end, AtomStyle::Plain);
        let end = self.mark;
        let data = if is_anchor {
            TokenData::Anchor { name }
        } else {
            TokenData::Alias { name }
        };
        self.push(data, start, end);
        Ok(())
    }

    fn fetch_tag(&mut self) -> YamlResult<()> {
        self.save_simple_key()?;
        self.simple_key_allowed = false;
        self.scan_tag()
    }

    fn scan_tag(&mut self) -> YamlResult<()> {
        let start = self.mark;
        self.skip_one()?; // '!'
        let (handle, suffix) = if self.cur()? == Some('<') {
            // Verbatim form: !<uri>
            self.skip_one()?;
            let uri_start = self.mark.index;
            while self.cur()?.is_some_and(utf8::is_uri_char) {
                self.check_uri_escape()?;
                self.skip_one()?;
            }
            let uri_end = self.mark.index;
            if self.cur()? != Some('>') {
                return Err(YamlError::lexical("unterminated verbatim tag, expected '>'")
                    .at(self.mark));
            }
            if uri_start == uri_end {
                return Err(YamlError::lexical("empty verbatim tag").at(start));
            }
            self.skip_one()?;
            (None, self.atom(uri_start, uri_end, AtomStyle::Uri))
        } else {
            // Shorthand: !suffix, !!suffix, or !handle!suffix.
            let word_start = self.mark.index;
            while self.cur()?.is_some_and(utf8::is_alnum) {
                self.skip_one()?;
            }
            if self.cur()? == Some('!') {
                // Named or secondary handle.
                self.skip_one()?;
                let handle = self.atom(start.index, self.mark.index, AtomStyle::Plain);
                let suffix_start = self.mark.index;
                while self.cur()?.is_some_and(utf8::is_uri_char) {
                    self.check_uri_escape()?;
                    self.skip_one()?;
                }
                (
                    Some(handle),
                    self.atom(suffix_start, self.mark.index, AtomStyle::Uri),
                )
            } else {
                // Primary handle; the word scanned so far starts the
                // suffix.
                while self.cur()?.is_some_and(utf8::is_uri_char) {
                    self.check_uri_escape()?;
                    self.skip_one()?;
                }
                let handle = self.atom(start.index, start.index + 1, AtomStyle::Plain);
                (
                    Some(handle),
                    self.atom(word_start, self.mark.index, AtomStyle::Uri),
                )
            }
        };
        let follower = self.cur()?;
        if !utf8::is_blankz(follower)
            && !(self.flow_level > 0 && follower.is_some_and(utf8::is_flow_indicator))
        {
            return Err(
                YamlError::lexical("expected whitespace after tag").at(self.mark)
            );
        }
        let end = self.mark;
        self.push(TokenData::Tag { handle, suffix }, start, end);
        Ok(())
    }

    /// Validate that a `%` in a tag URI begins a two-digit hex escape.
    fn check_uri_escape(&self) -> YamlResult<()> {
        if self.cur()? == Some('%') {
            let d1 = self.look(1)?;
            let d2 = self.look(2)?;
            if !(d1.is_some_and(utf8::is_hex) && d2.is_some_and(utf8::is_hex)) {
                return Err(YamlError::lexical(
                    "invalid %-escape in tag URI, expected two hex digits",
                )
                .at(self.mark));
            }
        }
        Ok(())
    }

    fn fetch_directive(&mut self) -> YamlResult<()> {
        self.unroll_indent(-1);
        self.remove_simple_key()?;
        self.simple_key_allowed = false;
        self.scan_directive()
    }

    fn scan_directive(&mut self) -> YamlResult<()> {
        let start = self.mark;
        self.skip_one()?; // '%'
        let name_start = self.mark.index;
        while self.cur()?.is_some_and(|c| utf8::is_alnum(c)) {
            self.skip_one()?;
        }
        let name = self
            .input
            .bytes_to_vec(name_start, self.mark.index)
            .unwrap_or_default();
        match name.as_slice() {
            b"YAML" => self.scan_version_directive(start),
            b"TAG" => self.scan_tag_directive(start),
            _ => {
                // Unknown directives are skipped to the end of the line.
                tracing::debug!(
                    target: "yamlet_core::scanner",
                    "skipping unknown directive at {}", start
                );
                while !utf8::is_breakz(self.cur()?) {
                    self.skip_one()?;
                }
                Ok(())
            }
        }
    }

    fn scan_version_directive(&mut self, start: Mark) -> YamlResult<()> {
        while self.cur()?.is_some_and(utf8::is_blank) {
            self.skip_one()?;
        }
        let major = self.scan_version_number()?;
        if self.cur()? != Some('.') {
            return Err(YamlError::lexical("expected '.' in %YAML directive").at(self.mark));
        }
        self.skip_one()?;
        let minor = self.scan_version_number()?;
        self.finish_directive_line()?;
        let end = self.mark;
        self.push(TokenData::VersionDirective { major, minor }, start, end);
        Ok(())
    }

    fn scan_version_number(&mut self) -> YamlResult<u32> {
        let mut value: u32 = 0;
        let mut digits = 0;
        while let Some(c) = self.cur()? {
            if !utf8::is_digit(c) {
                break;
            }
            value = value
                .saturating_mul(10)
                .saturating_add(c.to_digit(10).unwrap_or(0));
            digits += 1;
            if digits > 9 {
                return Err(
                    YamlError::lexical("version number in %YAML directive is too long")
                        .at(self.mark),
                );
            }
            self.skip_one()?;
        }
        if digits == 0 {
            return Err(YamlError::lexical("expected version digit in %YAML directive")
                .at(self.mark));
        }
        Ok(value)
    }

    fn scan_tag_directive(&mut self, start: Mark) -> YamlResult<()> {
        while self.cur()?.is_some_and(utf8::is_blank) {
            self.skip_one()?;
        }
        // Handle: '!', '!!', or '!word!'.
        if self.cur()? != Some('!') {
            return Err(YamlError::lexical("expected '!' in %TAG directive").at(self.mark));
        }
        let handle_start = self.mark.index;
        self.skip_one()?;
        while self.cur()?.is_some_and(utf8::is_alnum) {
            self.skip_one()?;
        }
        if self.cur()? == Some('!') {
            self.skip_one()?;
        } else if self.mark.index != handle_start + 1 {
            return Err(
                YamlError::lexical("tag handle in %TAG directive must end with '!'")
                    .at(self.mark),
            );
        }
        let handle = self.atom(handle_start, self.mark.index, AtomStyle::Plain);
        if !self.cur()?.is_some_and(utf8::is_blank) {
            return Err(
                YamlError::lexical("expected whitespace after %TAG handle").at(self.mark)
            );
        }
        while self.cur()?.is_some_and(utf8::is_blank) {
            self.skip_one()?;
        }
        let prefix_start = self.mark.index;
        while self.cur()?.is_some_and(utf8::is_uri_char) {
            self.check_uri_escape()?;
            self.skip_one()?;
        }
        if prefix_start == self.mark.index {
            return Err(YamlError::lexical("expected tag prefix in %TAG directive")
                .at(self.mark));
        }
        let prefix = self.atom(prefix_start, self.mark.index, AtomStyle::Uri);
        self.finish_directive_line()?;
        let end = self.mark;
        self.push(TokenData::TagDirective { handle, prefix }, start, end);
        Ok(())
    }

    /// Skip trailing blanks and a comment; require the line to end.
    fn finish_directive_line(&mut self) -> YamlResult<()> {
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
                YamlError::lexical("unexpected content after directive").at(self.mark)
            );
        }
        Ok(())
    }
}

/// Whether `c` may start a plain scalar in the given context.
fn can_start_plain(c: char, in_flow: bool) -> bool {
    let indicator = matches!(
        c,
        '-' | '?'
            | ':'
            | ','
            | '['
            | ']'
            | '{'
            | '}'
            | '#'
            | '&'
            | '*'
            | '!'
            | '|'
            | '>'
            | '\''
            | '"'
            | '%'
            | '@'
            | '`'
    );
    if !indicator {
        return !utf8::is_blank(c) && !utf8::is_break(c);
    }
    // '-', '?' and ':' may start a plain scalar when not followed by a
    // blank; the dispatcher already handled the indicator readings.
    if in_flow {
        matches!(c, '-')
    } else {
        matches!(c, '-' | '?' | ':')
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan_all(text: &str) -> Vec<Token> {
        let mut scanner = Scanner::new(Input::from_str(text), Limits::default());
        let mut tokens = Vec::new();
        loop {
            let token = scanner.next_token().expect("scan failure");
            let is_end = matches!(token.data(), TokenData::StreamEnd);
            tokens.push(token);
            if is_end {
                break;
            }
        }
        tokens
    }

    fn kinds(tokens: &[Token]) -> Vec<String> {
        tokens
            .iter()
            .map(|t| match t.data() {
                TokenData::StreamStart => "stream-start".to_string(),
                TokenData::StreamEnd => "stream-end".to_string(),
                TokenData::VersionDirective { major, minor } => {
                    format!("%YAML {major}.{minor}")
                }
                TokenData::TagDirective { .. } => "%TAG".to_string(),
                TokenData::DocumentStart => "doc-start".to_string(),
                TokenData::DocumentEnd => "doc-end".to_string(),
                TokenData::BlockSequenceStart => "block-seq-start".to_string(),
                TokenData::BlockMappingStart => "block-map-start".to_string(),
                TokenData::BlockEnd => "block-end".to_string(),
                TokenData::FlowSequenceStart => "[".to_string(),
                TokenData::FlowSequenceEnd => "]".to_string(),
                TokenData::FlowMappingStart => "{".to_string(),
                TokenData::FlowMappingEnd => "}".to_string(),
                TokenData::BlockEntry => "-".to_string(),
                TokenData::FlowEntry => ",".to_string(),
                TokenData::Key => "key".to_string(),
                TokenData::Value => "value".to_string(),
                TokenData::Alias { .. } => format!("*{}", t.text()),
                TokenData::Anchor { .. } => format!("&{}", t.text()),
                TokenData::Tag { .. } => "tag".to_string(),
                TokenData::Scalar { .. } => format!("scalar({})", t.text()),
            })
            .collect()
    }

    // ==================== basic stream tests ====================

    #[test]
    fn test_empty_stream() {
        let tokens = scan_all("");
        assert_eq!(kinds(&tokens), vec!["stream-start", "stream-end"]);
    }

    #[test]
    fn test_bom_is_skipped() {
        let tokens = scan_all("\u{feff}x");
        assert_eq!(
            kinds(&tokens),
            vec!["stream-start", "scalar(x)", "stream-end"]
        );
    }

    #[test]
    fn test_single_scalar() {
        let tokens = scan_all("hello");
        assert_eq!(
            kinds(&tokens),
            vec!["stream-start", "scalar(hello)", "stream-end"]
        );
    }

    // ==================== block mapping tests ====================

    #[test]
    fn test_simple_block_mapping() {
        let tokens = scan_all("b:\nc: true");
        assert_eq!(
            kinds(&tokens),
            vec![
                "stream-start",
                "block-map-start",
                "key",
                "scalar(b)",
                "value",
                "key",
                "scalar(c)",
                "value",
                "scalar(true)",
                "block-end",
                "stream-end"
            ]
        );
    }

    #[test]
    fn test_nested_block_mapping() {
        let tokens = scan_all("a:\n  b: 1\nc: 2\n");
        assert_eq!(
            kinds(&tokens),
            vec![
                "stream-start",
                "block-map-start",
                "key",
                "scalar(a)",
                "value",
                "block-map-start",
                "key",
                "scalar(b)",
                "value",
                "scalar(1)",
                "block-end",
                "key",
                "scalar(c)",
                "value",
                "scalar(2)",
                "block-end",
                "stream-end"
            ]
        );
    }

    // ==================== block sequence tests ====================

    #[test]
    fn test_block_sequence() {
        let tokens = scan_all("- a\n- b\n");
        assert_eq!(
            kinds(&tokens),
            vec![
                "stream-start",
                "block-seq-start",
                "-",
                "scalar(a)",
                "-",
                "scalar(b)",
                "block-end",
                "stream-end"
            ]
        );
    }

    // ==================== flow tests ====================

    #[test]
    fn test_flow_sequence() {
        let tokens = scan_all("[1, 2]");
        assert_eq!(
            kinds(&tokens),
            vec![
                "stream-start",
                "[",
                "scalar(1)",
                ",",
                "scalar(2)",
                "]",
                "stream-end"
            ]
        );
    }

    #[test]
    fn test_flow_mapping_json_style() {
        // No space after ':' is fine in flow context after a quoted key.
        let tokens = scan_all("{\"a\":1}");
        assert_eq!(
            kinds(&tokens),
            vec![
                "stream-start",
                "{",
                "key",
                "scalar(a)",
                "value",
                "scalar(1)",
                "}",
                "stream-end"
            ]
        );
    }

    // ==================== document marker tests ====================

    #[test]
    fn test_document_markers() {
        let tokens = scan_all("---\na\n...\n");
        assert_eq!(
            kinds(&tokens),
            vec![
                "stream-start",
                "doc-start",
                "scalar(a)",
                "doc-end",
                "stream-end"
            ]
        );
    }

    #[test]
    fn test_triple_dash_in_scalar_position_not_marker() {
        // Not at column 0, so it is plain content.
        let tokens = scan_all("a: ---\n");
        assert!(kinds(&tokens).contains(&"scalar(---)".to_string()));
    }

    // ==================== directive tests ====================

    #[test]
    fn test_yaml_directive() {
        let tokens = scan_all("%YAML 1.3\n---\nx\n");
        assert_eq!(
            kinds(&tokens),
            vec![
                "stream-start",
                "%YAML 1.3",
                "doc-start",
                "scalar(x)",
                "stream-end"
            ]
        );
    }

    #[test]
    fn test_tag_directive() {
        let tokens = scan_all("%TAG !e! tag:example.com,2026:\n---\nx\n");
        assert_eq!(kinds(&tokens)[1], "%TAG");
    }

    #[test]
    fn test_unknown_directive_skipped() {
        let tokens = scan_all("%FOO bar baz\n---\nx\n");
        assert_eq!(
            kinds(&tokens),
            vec!["stream-start", "doc-start", "scalar(x)", "stream-end"]
        );
    }

    // ==================== anchor and alias tests ====================

    #[test]
    fn test_anchor_and_alias() {
        let tokens = scan_all("a: &id x\nb: *id\n");
        let k = kinds(&tokens);
        assert!(k.contains(&"&id".to_string()));
        assert!(k.contains(&"*id".to_string()));
    }

    #[test]
    fn test_empty_anchor_is_error() {
        let mut scanner = Scanner::new(Input::from_str("a: & x"), Limits::default());
        let mut result = Ok(());
        for _ in 0..10 {
            match scanner.next_token() {
                Err(e) => {
                    result = Err(e);
                    break;
                }
                Ok(t) if matches!(t.data(), TokenData::StreamEnd) => break,
                Ok(_) => {}
            }
        }
        assert!(result.is_err());
    }

    // ==================== tag token tests ====================

    #[test]
    fn test_secondary_tag_shorthand() {
        let tokens = scan_all("!!str x");
        let tag = tokens
            .iter()
            .find(|t| matches!(t.data(), TokenData::Tag { .. }))
            .unwrap();
        match tag.data() {
            TokenData::Tag { handle, suffix } => {
                assert_eq!(handle.as_ref().unwrap().raw().as_ref(), b"!!");
                assert_eq!(suffix.raw().as_ref(), b"str");
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_verbatim_tag() {
        let tokens = scan_all("!<tag:example.com,2026:thing> x");
        let tag = tokens
            .iter()
            .find(|t| matches!(t.data(), TokenData::Tag { .. }))
            .unwrap();
        match tag.data() {
            TokenData::Tag { handle, suffix } => {
                assert!(handle.is_none());
                assert_eq!(suffix.raw().as_ref(), b"tag:example.com,2026:thing");
            }
            _ => unreachable!(),
        }
    }

    // ==================== implicit key tests ====================

    #[test]
    fn test_long_implicit_key_no_limit() {
        // Far beyond the classic 1024-character cap.
        let key = "k".repeat(10_000);
        let tokens = scan_all(&format!("{key}: v\n"));
        let k = kinds(&tokens);
        assert_eq!(k[1], "block-map-start");
        assert_eq!(k[2], "key");
        assert_eq!(k[3], format!("scalar({key})"));
    }

    #[test]
    fn test_tab_indentation_is_error() {
        let mut scanner = Scanner::new(Input::from_str("a:\n\tb: 1\n"), Limits::default());
        let mut saw_error = false;
        for _ in 0..20 {
            match scanner.next_token() {
                Err(_) => {
                    saw_error = true;
                    break;
                }
                Ok(t) if matches!(t.data(), TokenData::StreamEnd) => break,
                Ok(_) => {}
            }
        }
        assert!(saw_error);
    }

    // ==================== streamed input tests ====================

    #[test]
    fn test_need_more_then_resume() {
        let input = Input::stream();
        input.push_chunk(b"key: val").unwrap();
        let mut scanner = Scanner::new(Rc::clone(&input), Limits::default());
        // Pull what is stable so far.
        let mut got = Vec::new();
        loop {
            match scanner.next_token() {
                Ok(t) => {
                    let done = matches!(t.data(), TokenData::StreamEnd);
                    got.push(t);
                    if done {
                        break;
                    }
                }
                Err(e) if e.is_need_more() => {
                    input.push_chunk(b"ue\n").unwrap();
                    input.finish();
                }
                Err(e) => panic!("unexpected error: {e}"),
            }
        }
        let texts: Vec<String> = got
            .iter()
            .filter(|t| t.is_scalar())
            .map(|t| t.text().to_string())
            .collect();
        assert_eq!(texts, vec!["key", "value"]);
    }
}
