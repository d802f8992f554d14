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

//! The parser: tokens to a flat event stream.
//!
//! A grammar state machine drives the scanner and composes events.
//! Directive tokens update the per-document [`DocumentState`]; anchors
//! and tags attach to the next content event. Every start event is
//! matched by an end event unless a stream error latches first, after
//! which [`Parser::next_event`] reports end-of-stream.

use crate::atom::{Atom, AtomStyle};
use crate::diag::{DiagSink, Diagnostic};
use crate::docstate::DocumentState;
use crate::error::{ErrorKind, YamlError, YamlResult};
use crate::event::{Event, EventData};
use crate::input::Input;
use crate::mark::Mark;
use crate::options::ParseOptions;
use crate::scanner::Scanner;
use crate::token::{ScalarStyle, Token, TokenData};
use std::path::Path;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    StreamStart,
    ImplicitDocumentStart,
    DocumentStart,
    DocumentContent,
    DocumentEnd,
    BlockNode,
    BlockSequenceFirstEntry,
    BlockSequenceEntry,
    IndentlessSequenceEntry,
    BlockMappingFirstKey,
    BlockMappingKey,
    BlockMappingValue,
    FlowSequenceFirstEntry,
    FlowSequenceEntry,
    FlowSequenceEntryMappingKey,
    FlowSequenceEntryMappingValue,
    FlowSequenceEntryMappingEnd,
    FlowMappingFirstKey,
    FlowMappingKey,
    FlowMappingValue,
    FlowMappingEmptyValue,
    End,
}

/// A pull parser producing [`Event`]s. See the module docs.
#[derive(Debug)]
pub struct Parser {
    scanner: Scanner,
    state: State,
    states: Vec<State>,
    doc_state: Rc<DocumentState>,
    error: Option<YamlError>,
    diag: DiagSink,
    options: ParseOptions,
    documents_seen: usize,
    /// True when the next document may open with bare content: at the
    /// stream start, and after an explicit `...` (a `---` is only
    /// required when the previous document ended implicitly, since its
    /// terminator was the next document's own marker).
    next_implicit: bool,
}

impl Parser {
    /// Create a parser over an already constructed input.
    pub fn from_input(input: Rc<Input>, options: ParseOptions) -> Self {
        let diag = DiagSink {
            quiet: options.quiet,
            collect: options.collect_diagnostics,
            collected: Vec::new(),
        };
        Self {
            scanner: Scanner::new(input, options.limits.clone()),
            state: State::StreamStart,
            states: Vec::new(),
            doc_state: Rc::new(DocumentState::new()),
            error: None,
            diag,
            options,
            documents_seen: 0,
            next_implicit: true,
        }
    }

    /// Parse from a string.
    pub fn from_str(text: &str, options: ParseOptions) -> Self {
        Self::from_input(Input::from_str(text), options)
    }

    /// Parse from owned bytes.
    pub fn from_bytes(bytes: Vec<u8>, options: ParseOptions) -> Self {
        Self::from_input(Input::from_bytes(bytes), options)
    }

    /// Parse from a file, honouring the search path and the mmap toggle.
    pub fn from_path(path: &Path, options: ParseOptions) -> YamlResult<Self> {
        let input = open_with_search_path(path, &options)?;
        if input.len() > options.limits.max_input_size {
            return Err(YamlError::limit(format!(
                "input of {} bytes exceeds the configured limit",
                input.len()
            )));
        }
        Ok(Self::from_input(input, options))
    }

    /// Create a parser over a fresh streamed input; feed it with
    /// [`feed`](Self::feed) and seal it with [`finish`](Self::finish).
    pub fn new_stream(options: ParseOptions) -> Self {
        Self::from_input(Input::stream(), options)
    }

    /// Append bytes to a streamed input.
    pub fn feed(&mut self, chunk: &[u8]) -> YamlResult<()> {
        let input = self.scanner.input();
        if input.len() + chunk.len() > self.options.limits.max_input_size {
            return Err(YamlError::limit("streamed input exceeds the size limit"));
        }
        input.push_chunk(chunk)
    }

    /// Mark a streamed input complete.
    pub fn finish(&mut self) {
        self.scanner.input().finish();
    }

    /// The input being parsed.
    pub fn input(&self) -> &Rc<Input> {
        self.scanner.input()
    }

    /// The latched stream error, if any.
    pub fn stream_error(&self) -> Option<&YamlError> {
        self.error.as_ref()
    }

    /// The document state the parser is currently reading under.
    pub fn document_state(&self) -> Rc<DocumentState> {
        Rc::clone(&self.doc_state)
    }

    /// Drain the diagnostics captured so far (with
    /// `collect_diagnostics`).
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        self.diag.take()
    }

    /// Route a diagnostic through this parser's configured channel.
    pub(crate) fn report_diag(&mut self, diag: Diagnostic) {
        self.diag.report(diag);
    }

    /// The parse options this parser runs under.
    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Produce the next event, or `None` at (or after) the end of the
    /// stream. After a fatal error the first call returns the error and
    /// every later call returns `None`; the non-fatal `NeedMoreInput`
    /// sentinel is returned as an `Err` without latching.
    pub fn next_event(&mut self) -> YamlResult<Option<Event>> {
        if self.error.is_some() {
            return Ok(None);
        }
        if self.state == State::End {
            return Ok(None);
        }
        match self.dispatch() {
            Ok(event) => {
                tracing::trace!(target: "yamlet_core::parser", "event {}", event.name());
                Ok(Some(event))
            }
            Err(e) if e.is_need_more() => Err(e),
            Err(e) => {
                let module = match e.kind {
                    ErrorKind::Lexical | ErrorKind::Encoding => "scanner",
                    _ => "parser",
                };
                let mut diag = Diagnostic::error(module, &e.message);
                if let Some(mark) = e.mark {
                    diag = diag.locate(self.scanner.input(), mark);
                }
                self.diag.report(diag);
                self.error = Some(e.clone());
                Err(e)
            }
        }
    }

    fn dispatch(&mut self) -> YamlResult<Event> {
        match self.state {
            State::StreamStart => self.parse_stream_start(),
            State::ImplicitDocumentStart => self.parse_document_start(true),
            State::DocumentStart => {
                let implicit = self.next_implicit;
                self.parse_document_start(implicit)
            }
            State::DocumentContent => self.parse_document_content(),
            State::DocumentEnd => self.parse_document_end(),
            State::BlockNode => self.parse_node(true, false),
            State::BlockSequenceFirstEntry => self.parse_block_sequence_entry(true),
            State::BlockSequenceEntry => self.parse_block_sequence_entry(false),
            State::IndentlessSequenceEntry => self.parse_indentless_sequence_entry(),
            State::BlockMappingFirstKey => self.parse_block_mapping_key(true),
            State::BlockMappingKey => self.parse_block_mapping_key(false),
            State::BlockMappingValue => self.parse_block_mapping_value(),
            State::FlowSequenceFirstEntry => self.parse_flow_sequence_entry(true),
            State::FlowSequenceEntry => self.parse_flow_sequence_entry(false),
            State::FlowSequenceEntryMappingKey => self.parse_flow_sequence_entry_mapping_key(),
            State::FlowSequenceEntryMappingValue => {
                self.parse_flow_sequence_entry_mapping_value()
            }
            State::FlowSequenceEntryMappingEnd => self.parse_flow_sequence_entry_mapping_end(),
            State::FlowMappingFirstKey => self.parse_flow_mapping_key(true),
            State::FlowMappingKey => self.parse_flow_mapping_key(false),
            State::FlowMappingValue => self.parse_flow_mapping_value(false),
            State::FlowMappingEmptyValue => self.parse_flow_mapping_value(true),
            State::End => Err(YamlError::api("next_event called after stream end")),
        }
    }

    fn pop_state(&mut self) -> State {
        self.states.pop().unwrap_or(State::End)
    }

    /// An empty plain scalar event at `mark`, for omitted keys/values.
    fn empty_scalar(&self, mark: Mark) -> Event {
        let atom = Atom::new(
            Rc::clone(self.scanner.input()),
            mark.index,
            mark.index,
            AtomStyle::Plain,
        );
        let value = Token::new(
            TokenData::Scalar {
                atom,
                style: ScalarStyle::Plain,
            },
            mark,
            mark,
        );
        Event::new(
            EventData::Scalar {
                anchor: None,
                tag: None,
                value,
                tag_implicit: true,
                style: ScalarStyle::Plain,
            },
            mark,
            mark,
        )
    }

    // ==================== stream and documents ====================

    fn parse_stream_start(&mut self) -> YamlResult<Event> {
        let token = self.scanner.peek()?;
        match token.data() {
            TokenData::StreamStart => {
                self.scanner.skip_token();
                self.state = State::ImplicitDocumentStart;
                Ok(Event::new(
                    EventData::StreamStart,
                    token.start(),
                    token.end(),
                ))
            }
            _ => Err(YamlError::grammar("expected stream start").at(token.start())),
        }
    }

    fn parse_document_start(&mut self, implicit: bool) -> YamlResult<Event> {
        let mut token = self.scanner.peek()?;
        if self.state == State::DocumentStart {
            // Consume stray explicit document-end markers between
            // documents (`l-document-suffix+`).
            while matches!(token.data(), TokenData::DocumentEnd) {
                self.scanner.skip_token();
                token = self.scanner.peek()?;
            }
        }
        let directive_ahead = matches!(
            token.data(),
            TokenData::VersionDirective { .. }
                | TokenData::TagDirective { .. }
                | TokenData::DocumentStart
        );
        if implicit && !directive_ahead && !matches!(token.data(), TokenData::StreamEnd) {
            // Bare content after the stream start: an implicit document.
            self.begin_document(true, token.start())?;
            self.states.push(State::DocumentEnd);
            self.state = State::BlockNode;
            return Ok(Event::new(
                EventData::DocumentStart {
                    state: Rc::clone(&self.doc_state),
                    implicit: true,
                },
                token.start(),
                token.start(),
            ));
        }
        if matches!(token.data(), TokenData::StreamEnd) {
            self.scanner.skip_token();
            self.state = State::End;
            if !self.states.is_empty() {
                return Err(
                    YamlError::grammar("unexpected end of stream inside a document")
                        .at(token.start()),
                );
            }
            return Ok(Event::new(EventData::StreamEnd, token.start(), token.end()));
        }
        // Explicit document: process directives, then require '---'.
        let start_mark = token.start();
        self.begin_document(false, start_mark)?;
        let token = self.scanner.peek()?;
        if !matches!(token.data(), TokenData::DocumentStart) {
            return Err(YamlError::grammar("expected '---' to begin a document")
                .at(token.start()));
        }
        self.scanner.skip_token();
        self.states.push(State::DocumentEnd);
        self.state = State::DocumentContent;
        Ok(Event::new(
            EventData::DocumentStart {
                state: Rc::clone(&self.doc_state),
                implicit: false,
            },
            start_mark,
            token.end(),
        ))
    }

    /// Build the state for the next document, consuming any directive
    /// tokens in front of it.
    fn begin_document(&mut self, implicit: bool, mark: Mark) -> YamlResult<()> {
        self.documents_seen += 1;
        if self.documents_seen > self.options.limits.max_documents {
            return Err(YamlError::limit("document count limit exceeded").at(mark));
        }
        let mut state = DocumentState::new();
        state.start_implicit = implicit;
        loop {
            let token = self.scanner.peek()?;
            match token.data() {
                TokenData::VersionDirective { major, minor } => {
                    state
                        .set_version(*major, *minor)
                        .map_err(|e| e.at(token.start()))?;
                    self.scanner.skip_token();
                }
                TokenData::TagDirective { handle, prefix } => {
                    let handle = handle.raw_str().into_owned();
                    let prefix = prefix.raw_str().into_owned();
                    state
                        .add_tag_directive(&handle, &prefix)
                        .map_err(|e| e.at(token.start()))?;
                    self.scanner.skip_token();
                }
                _ => break,
            }
        }
        self.doc_state = Rc::new(state);
        Ok(())
    }

    fn parse_document_content(&mut self) -> YamlResult<Event> {
        let token = self.scanner.peek()?;
        match token.data() {
            TokenData::VersionDirective { .. }
            | TokenData::TagDirective { .. }
            | TokenData::DocumentStart
            | TokenData::DocumentEnd
            | TokenData::StreamEnd => {
                // An empty document body.
                self.state = self.pop_state();
                Ok(self.empty_scalar(token.start()))
            }
            _ => self.parse_node(true, false),
        }
    }

    fn parse_document_end(&mut self) -> YamlResult<Event> {
        let token = self.scanner.peek()?;
        let mut implicit = true;
        let start = token.start();
        let mut end = token.start();
        if matches!(token.data(), TokenData::DocumentEnd) {
            self.scanner.skip_token();
            implicit = false;
            end = token.end();
        }
        // Record how the document ended on a private copy of the state;
        // events already emitted keep the shared original.
        if !implicit {
            let mut state = (*self.doc_state).clone();
            state.end_implicit = false;
            self.doc_state = Rc::new(state);
        }
        // After an explicit `...` the next document may open with bare
        // content; after an implicit end the terminator was `---` (or
        // the stream end), so the next document must be explicit.
        self.next_implicit = !implicit;
        self.state = State::DocumentStart;
        Ok(Event::new(EventData::DocumentEnd { implicit }, start, end))
    }

    // ==================== nodes ====================

    fn parse_node(&mut self, block: bool, indentless: bool) -> YamlResult<Event> {
        let token = self.scanner.peek()?;
        if let TokenData::Alias { .. } = token.data() {
            self.scanner.skip_token();
            self.state = self.pop_state();
            return Ok(Event::new(
                EventData::Alias {
                    anchor: token.clone(),
                },
                token.start(),
                token.end(),
            ));
        }

        let start_mark = token.start();
        let mut anchor: Option<Token> = None;
        let mut tag: Option<Token> = None;
        // Anchor and tag may appear in either order.
        for _ in 0..2 {
            let token = self.scanner.peek()?;
            match token.data() {
                TokenData::Anchor { .. } if anchor.is_none() => {
                    self.scanner.skip_token();
                    anchor = Some(token);
                }
                TokenData::Tag { .. } if tag.is_none() => {
                    self.scanner.skip_token();
                    tag = Some(token);
                }
                _ => break,
            }
        }
        if let Some(tag_token) = &tag {
            self.resolve_tag_token(tag_token)?;
        }
        let tag_implicit = tag.is_none();

        let token = self.scanner.peek()?;
        if indentless && matches!(token.data(), TokenData::BlockEntry) {
            self.state = State::IndentlessSequenceEntry;
            return Ok(Event::new(
                EventData::SequenceStart {
                    anchor,
                    tag,
                    flow: false,
                    opening: None,
                },
                start_mark,
                token.end(),
            ));
        }
        match token.data() {
            TokenData::Scalar { style, .. } => {
                let style = *style;
                self.scanner.skip_token();
                self.state = self.pop_state();
                Ok(Event::new(
                    EventData::Scalar {
                        anchor,
                        tag,
                        value: token.clone(),
                        tag_implicit,
                        style,
                    },
                    start_mark,
                    token.end(),
                ))
            }
            TokenData::FlowSequenceStart => {
                self.state = State::FlowSequenceFirstEntry;
                Ok(Event::new(
                    EventData::SequenceStart {
                        anchor,
                        tag,
                        flow: true,
                        opening: Some(token.clone()),
                    },
                    start_mark,
                    token.end(),
                ))
            }
            TokenData::FlowMappingStart => {
                self.state = State::FlowMappingFirstKey;
                Ok(Event::new(
                    EventData::MappingStart {
                        anchor,
                        tag,
                        flow: true,
                        opening: Some(token.clone()),
                    },
                    start_mark,
                    token.end(),
                ))
            }
            TokenData::BlockSequenceStart if block => {
                self.state = State::BlockSequenceFirstEntry;
                Ok(Event::new(
                    EventData::SequenceStart {
                        anchor,
                        tag,
                        flow: false,
                        opening: Some(token.clone()),
                    },
                    start_mark,
                    token.end(),
                ))
            }
            TokenData::BlockMappingStart if block => {
                self.state = State::BlockMappingFirstKey;
                Ok(Event::new(
                    EventData::MappingStart {
                        anchor,
                        tag,
                        flow: false,
                        opening: Some(token.clone()),
                    },
                    start_mark,
                    token.end(),
                ))
            }
            _ if anchor.is_some() || tag.is_some() => {
                // A node with properties but no content is an empty
                // scalar.
                self.state = self.pop_state();
                let mut event = self.empty_scalar(start_mark);
                if let EventData::Scalar {
                    anchor: a, tag: t, tag_implicit: ti, ..
                } = &mut event.data
                {
                    *a = anchor;
                    *t = tag;
                    *ti = tag_implicit;
                }
                Ok(event)
            }
            _ => Err(YamlError::grammar(format!(
                "did not find expected node content, got {token}"
            ))
            .at(token.start())),
        }
    }

    /// Resolve a tag token's handle against the document state and cache
    /// the full tag on the token.
    fn resolve_tag_token(&self, token: &Token) -> YamlResult<()> {
        if let TokenData::Tag { handle, suffix } = token.data() {
            let resolved = match handle {
                None => suffix.raw_str().into_owned(),
                Some(handle_atom) => {
                    let handle_text = handle_atom.raw_str().into_owned();
                    let suffix_text = suffix.raw_str().into_owned();
                    if handle_text == "!" && suffix_text.is_empty() {
                        // The non-specific tag.
                        "!".to_string()
                    } else {
                        self.doc_state
                            .resolve_tag(&handle_text, &suffix_text)
                            .map_err(|e| e.at(token.start()))?
                    }
                }
            };
            token.set_resolved_text(resolved);
        }
        Ok(())
    }

    // ==================== block collections ====================

    fn parse_block_sequence_entry(&mut self, first: bool) -> YamlResult<Event> {
        if first {
            self.scanner.skip_token(); // BlockSequenceStart
        }
        let token = self.scanner.peek()?;
        match token.data() {
            TokenData::BlockEntry => {
                self.scanner.skip_token();
                let next = self.scanner.peek()?;
                if matches!(next.data(), TokenData::BlockEntry | TokenData::BlockEnd) {
                    self.state = State::BlockSequenceEntry;
                    Ok(self.empty_scalar(token.end()))
                } else {
                    self.states.push(State::BlockSequenceEntry);
                    self.parse_node(true, false)
                }
            }
            TokenData::BlockEnd => {
                self.scanner.skip_token();
                self.state = self.pop_state();
                Ok(Event::new(EventData::SequenceEnd, token.start(), token.end()))
            }
            _ => Err(YamlError::grammar("expected '-' or the end of the block sequence")
                .at(token.start())
                .with_context("while parsing a block sequence")),
        }
    }

    fn parse_indentless_sequence_entry(&mut self) -> YamlResult<Event> {
        let token = self.scanner.peek()?;
        if matches!(token.data(), TokenData::BlockEntry) {
            self.scanner.skip_token();
            let next = self.scanner.peek()?;
            if matches!(
                next.data(),
                TokenData::BlockEntry | TokenData::Key | TokenData::Value | TokenData::BlockEnd
            ) {
                self.state = State::IndentlessSequenceEntry;
                Ok(self.empty_scalar(token.end()))
            } else {
                self.states.push(State::IndentlessSequenceEntry);
                self.parse_node(true, false)
            }
        } else {
            self.state = self.pop_state();
            Ok(Event::new(
                EventData::SequenceEnd,
                token.start(),
                token.start(),
            ))
        }
    }

    fn parse_block_mapping_key(&mut self, first: bool) -> YamlResult<Event> {
        if first {
            self.scanner.skip_token(); // BlockMappingStart
        }
        let token = self.scanner.peek()?;
        match token.data() {
            TokenData::Key => {
                self.scanner.skip_token();
                let next = self.scanner.peek()?;
                if matches!(
                    next.data(),
                    TokenData::Key | TokenData::Value | TokenData::BlockEnd
                ) {
                    self.state = State::BlockMappingValue;
                    Ok(self.empty_scalar(token.end()))
                } else {
                    self.states.push(State::BlockMappingValue);
                    self.parse_node(true, true)
                }
            }
            TokenData::Value => {
                // A value with an omitted key.
                self.state = State::BlockMappingValue;
                Ok(self.empty_scalar(token.start()))
            }
            TokenData::BlockEnd => {
                self.scanner.skip_token();
                self.state = self.pop_state();
                Ok(Event::new(EventData::MappingEnd, token.start(), token.end()))
            }
            _ => Err(YamlError::grammar("expected a mapping key or the end of the mapping")
                .at(token.start())
                .with_context("while parsing a block mapping")),
        }
    }

    fn parse_block_mapping_value(&mut self) -> YamlResult<Event> {
        let token = self.scanner.peek()?;
        if matches!(token.data(), TokenData::Value) {
            self.scanner.skip_token();
            let next = self.scanner.peek()?;
            if matches!(
                next.data(),
                TokenData::Key | TokenData::Value | TokenData::BlockEnd
            ) {
                self.state = State::BlockMappingKey;
                Ok(self.empty_scalar(token.end()))
            } else {
                self.states.push(State::BlockMappingKey);
                self.parse_node(true, true)
            }
        } else {
            self.state = State::BlockMappingKey;
            Ok(self.empty_scalar(token.start()))
        }
    }

    // ==================== flow collections ====================

    fn parse_flow_sequence_entry(&mut self, first: bool) -> YamlResult<Event> {
        if first {
            self.scanner.skip_token(); // FlowSequenceStart
        }
        let mut token = self.scanner.peek()?;
        if !matches!(token.data(), TokenData::FlowSequenceEnd) {
            if !first {
                if matches!(token.data(), TokenData::FlowEntry) {
                    self.scanner.skip_token();
                    token = self.scanner.peek()?;
                } else {
                    return Err(YamlError::grammar("expected ',' or ']'")
                        .at(token.start())
                        .with_context("while parsing a flow sequence"));
                }
            }
            if matches!(token.data(), TokenData::Key) {
                // A single-pair mapping inside the sequence.
                self.scanner.skip_token();
                self.state = State::FlowSequenceEntryMappingKey;
                return Ok(Event::new(
                    EventData::MappingStart {
                        anchor: None,
                        tag: None,
                        flow: true,
                        opening: Some(token.clone()),
                    },
                    token.start(),
                    token.end(),
                ));
            }
            if !matches!(token.data(), TokenData::FlowSequenceEnd) {
                self.states.push(State::FlowSequenceEntry);
                return self.parse_node(false, false);
            }
        }
        self.scanner.skip_token();
        self.state = self.pop_state();
        Ok(Event::new(EventData::SequenceEnd, token.start(), token.end()))
    }

    fn parse_flow_sequence_entry_mapping_key(&mut self) -> YamlResult<Event> {
        let token = self.scanner.peek()?;
        if matches!(
            token.data(),
            TokenData::Value | TokenData::FlowEntry | TokenData::FlowSequenceEnd
        ) {
            self.state = State::FlowSequenceEntryMappingValue;
            Ok(self.empty_scalar(token.start()))
        } else {
            self.states.push(State::FlowSequenceEntryMappingValue);
            self.parse_node(false, false)
        }
    }

    fn parse_flow_sequence_entry_mapping_value(&mut self) -> YamlResult<Event> {
        let token = self.scanner.peek()?;
        if matches!(token.data(), TokenData::Value) {
            self.scanner.skip_token();
            let next = self.scanner.peek()?;
            if matches!(
                next.data(),
                TokenData::FlowEntry | TokenData::FlowSequenceEnd
            ) {
                self.state = State::FlowSequenceEntryMappingEnd;
                Ok(self.empty_scalar(token.end()))
            } else {
                self.states.push(State::FlowSequenceEntryMappingEnd);
                self.parse_node(false, false)
            }
        } else {
            self.state = State::FlowSequenceEntryMappingEnd;
            Ok(self.empty_scalar(token.start()))
        }
    }

    fn parse_flow_sequence_entry_mapping_end(&mut self) -> YamlResult<Event> {
        let mark = self.scanner.position();
        self.state = State::FlowSequenceEntry;
        Ok(Event::new(EventData::MappingEnd, mark, mark))
    }

    fn parse_flow_mapping_key(&mut self, first: bool) -> YamlResult<Event> {
        if first {
            self.scanner.skip_token(); // FlowMappingStart
        }
        let mut token = self.scanner.peek()?;
        if !matches!(token.data(), TokenData::FlowMappingEnd) {
            if !first {
                if matches!(token.data(), TokenData::FlowEntry) {
                    self.scanner.skip_token();
                    token = self.scanner.peek()?;
                } else {
                    return Err(YamlError::grammar("expected ',' or '}'")
                        .at(token.start())
                        .with_context("while parsing a flow mapping"));
                }
            }
            if matches!(token.data(), TokenData::Key) {
                self.scanner.skip_token();
                let next = self.scanner.peek()?;
                if matches!(
                    next.data(),
                    TokenData::Value | TokenData::FlowEntry | TokenData::FlowMappingEnd
                ) {
                    self.state = State::FlowMappingValue;
                    return Ok(self.empty_scalar(token.end()));
                }
                self.states.push(State::FlowMappingValue);
                return self.parse_node(false, false);
            }
            if !matches!(token.data(), TokenData::FlowMappingEnd) {
                // Content without a key indicator: treat it as a key
                // whose value is empty.
                self.states.push(State::FlowMappingEmptyValue);
                return self.parse_node(false, false);
            }
        }
        self.scanner.skip_token();
        self.state = self.pop_state();
        Ok(Event::new(EventData::MappingEnd, token.start(), token.end()))
    }

    fn parse_flow_mapping_value(&mut self, empty: bool) -> YamlResult<Event> {
        let token = self.scanner.peek()?;
        if empty {
            self.state = State::FlowMappingKey;
            return Ok(self.empty_scalar(token.start()));
        }
        if matches!(token.data(), TokenData::Value) {
            self.scanner.skip_token();
            let next = self.scanner.peek()?;
            if !matches!(
                next.data(),
                TokenData::FlowEntry | TokenData::FlowMappingEnd
            ) {
                self.states.push(State::FlowMappingKey);
                return self.parse_node(false, false);
            }
        }
        self.state = State::FlowMappingKey;
        Ok(self.empty_scalar(token.start()))
    }
}

fn open_with_search_path(path: &Path, options: &ParseOptions) -> YamlResult<Rc<Input>> {
    let use_mmap = !options.disable_mmap;
    if path.is_absolute() || options.search_path.is_empty() {
        return Input::open_path(path, use_mmap);
    }
    if path.exists() {
        return Input::open_path(path, use_mmap);
    }
    for dir in &options.search_path {
        let candidate = dir.join(path);
        if candidate.exists() {
            return Input::open_path(&candidate, use_mmap);
        }
    }
    Input::open_path(path, use_mmap)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn events_of(text: &str) -> Vec<String> {
        let mut parser = Parser::from_str(text, ParseOptions::default());
        let mut out = Vec::new();
        while let Some(event) = parser.next_event().expect("parse failure") {
            let label = match &event.data {
                EventData::Scalar { value, .. } => format!("scalar({})", value.text()),
                EventData::Alias { anchor } => format!("alias({})", anchor.text()),
                EventData::DocumentStart { implicit, .. } => {
                    format!("doc-start(implicit={implicit})")
                }
                EventData::DocumentEnd { implicit } => {
                    format!("doc-end(implicit={implicit})")
                }
                _ => event.name().to_string(),
            };
            out.push(label);
        }
        out
    }

    // ==================== stream shape tests ====================

    #[test]
    fn test_empty_stream_has_no_documents() {
        assert_eq!(events_of(""), vec!["stream-start", "stream-end"]);
    }

    #[test]
    fn test_comment_only_stream() {
        assert_eq!(events_of("# nothing\n"), vec!["stream-start", "stream-end"]);
    }

    #[test]
    fn test_bare_scalar_document() {
        assert_eq!(
            events_of("hello\n"),
            vec![
                "stream-start",
                "doc-start(implicit=true)",
                "scalar(hello)",
                "doc-end(implicit=true)",
                "stream-end"
            ]
        );
    }

    #[test]
    fn test_explicit_document_markers() {
        assert_eq!(
            events_of("---\nhello\n...\n"),
            vec![
                "stream-start",
                "doc-start(implicit=false)",
                "scalar(hello)",
                "doc-end(implicit=false)",
                "stream-end"
            ]
        );
    }

    #[test]
    fn test_multiple_documents() {
        assert_eq!(
            events_of("one\n---\ntwo\n"),
            vec![
                "stream-start",
                "doc-start(implicit=true)",
                "scalar(one)",
                "doc-end(implicit=true)",
                "doc-start(implicit=false)",
                "scalar(two)",
                "doc-end(implicit=true)",
                "stream-end"
            ]
        );
    }

    // ==================== collection tests ====================

    #[test]
    fn test_block_mapping_events() {
        assert_eq!(
            events_of("a: 1\nb: 2\n"),
            vec![
                "stream-start",
                "doc-start(implicit=true)",
                "mapping-start",
                "scalar(a)",
                "scalar(1)",
                "scalar(b)",
                "scalar(2)",
                "mapping-end",
                "doc-end(implicit=true)",
                "stream-end"
            ]
        );
    }

    #[test]
    fn test_block_sequence_events() {
        assert_eq!(
            events_of("- x\n- y\n"),
            vec![
                "stream-start",
                "doc-start(implicit=true)",
                "sequence-start",
                "scalar(x)",
                "scalar(y)",
                "sequence-end",
                "doc-end(implicit=true)",
                "stream-end"
            ]
        );
    }

    #[test]
    fn test_flow_sequence_events() {
        assert_eq!(
            events_of("[1, 2, 3]"),
            vec![
                "stream-start",
                "doc-start(implicit=true)",
                "sequence-start",
                "scalar(1)",
                "scalar(2)",
                "scalar(3)",
                "sequence-end",
                "doc-end(implicit=true)",
                "stream-end"
            ]
        );
    }

    #[test]
    fn test_nested_flow() {
        assert_eq!(
            events_of("[1, [2, 3]]"),
            vec![
                "stream-start",
                "doc-start(implicit=true)",
                "sequence-start",
                "scalar(1)",
                "sequence-start",
                "scalar(2)",
                "scalar(3)",
                "sequence-end",
                "sequence-end",
                "doc-end(implicit=true)",
                "stream-end"
            ]
        );
    }

    #[test]
    fn test_indentless_sequence_in_mapping() {
        assert_eq!(
            events_of("key:\n- a\n- b\n"),
            vec![
                "stream-start",
                "doc-start(implicit=true)",
                "mapping-start",
                "scalar(key)",
                "sequence-start",
                "scalar(a)",
                "scalar(b)",
                "sequence-end",
                "mapping-end",
                "doc-end(implicit=true)",
                "stream-end"
            ]
        );
    }

    #[test]
    fn test_missing_value_is_empty_scalar() {
        assert_eq!(
            events_of("a:\nb: 2\n"),
            vec![
                "stream-start",
                "doc-start(implicit=true)",
                "mapping-start",
                "scalar(a)",
                "scalar()",
                "scalar(b)",
                "scalar(2)",
                "mapping-end",
                "doc-end(implicit=true)",
                "stream-end"
            ]
        );
    }

    // ==================== anchors, aliases, tags ====================

    #[test]
    fn test_anchor_and_alias_events() {
        let events = events_of("a: &x 1\nb: *x\n");
        assert!(events.contains(&"alias(x)".to_string()));
    }

    #[test]
    fn test_tag_resolution() {
        let mut parser = Parser::from_str("!!str 123\n", ParseOptions::default());
        let mut tag_text = None;
        while let Some(event) = parser.next_event().unwrap() {
            if let EventData::Scalar { tag: Some(tag), .. } = &event.data {
                tag_text = Some(tag.text().to_string());
            }
        }
        assert_eq!(tag_text.as_deref(), Some("tag:yaml.org,2002:str"));
    }

    #[test]
    fn test_declared_tag_handle() {
        let mut parser = Parser::from_str(
            "%TAG !e! tag:example.com,2026:\n---\n!e!thing x\n",
            ParseOptions::default(),
        );
        let mut tag_text = None;
        while let Some(event) = parser.next_event().unwrap() {
            if let EventData::Scalar { tag: Some(tag), .. } = &event.data {
                tag_text = Some(tag.text().to_string());
            }
        }
        assert_eq!(tag_text.as_deref(), Some("tag:example.com,2026:thing"));
    }

    #[test]
    fn test_undeclared_tag_handle_is_error() {
        let mut parser = Parser::from_str("!nope!thing x\n", ParseOptions::default());
        let mut result: YamlResult<Option<Event>> = Ok(None);
        loop {
            match parser.next_event() {
                Ok(None) => break,
                Ok(Some(_)) => {}
                Err(e) => {
                    result = Err(e);
                    break;
                }
            }
        }
        assert!(result.is_err());
        assert!(parser.stream_error().is_some());
    }

    // ==================== error latch tests ====================

    #[test]
    fn test_error_latch_returns_end_of_stream() {
        let mut parser = Parser::from_str("[1, 2", ParseOptions::default());
        let mut first_error = None;
        loop {
            match parser.next_event() {
                Ok(None) => break,
                Ok(Some(_)) => {}
                Err(e) => {
                    first_error = Some(e);
                    break;
                }
            }
        }
        assert!(first_error.is_some());
        // After the latch, end-of-stream.
        assert!(parser.next_event().unwrap().is_none());
        assert!(parser.next_event().unwrap().is_none());
    }

    #[test]
    fn test_balanced_events() {
        let mut parser =
            Parser::from_str("a: [1, {b: 2}]\nc:\n- d\n", ParseOptions::default());
        let mut depth = 0i64;
        while let Some(event) = parser.next_event().unwrap() {
            if event.is_collection_start() {
                depth += 1;
            }
            if event.is_collection_end() {
                depth -= 1;
                assert!(depth >= 0);
            }
        }
        assert_eq!(depth, 0);
    }

    // ==================== directive state tests ====================

    #[test]
    fn test_version_directive_state() {
        let mut parser = Parser::from_str("%YAML 1.2\n---\nx\n", ParseOptions::default());
        let mut version = None;
        while let Some(event) = parser.next_event().unwrap() {
            if let EventData::DocumentStart { state, .. } = &event.data {
                version = Some(state.version);
            }
        }
        let version = version.unwrap();
        assert_eq!((version.major, version.minor), (1, 2));
    }

    #[test]
    fn test_bare_document_after_explicit_end() {
        // An explicit `...` terminates the document; the next document
        // may open with bare content and is implicit.
        assert_eq!(
            events_of("a\n...\nb\n"),
            vec![
                "stream-start",
                "doc-start(implicit=true)",
                "scalar(a)",
                "doc-end(implicit=false)",
                "doc-start(implicit=true)",
                "scalar(b)",
                "doc-end(implicit=true)",
                "stream-end"
            ]
        );
    }

    #[test]
    fn test_repeated_document_suffixes_skipped() {
        let events = events_of("a\n...\n...\nb\n");
        assert_eq!(
            events
                .iter()
                .filter(|e| e.starts_with("doc-start"))
                .count(),
            2
        );
        assert!(events.contains(&"scalar(b)".to_string()));
    }

    #[test]
    fn test_content_after_implicit_end_still_requires_marker() {
        // A document that ended implicitly was terminated by the next
        // marker, so trailing bare content is a grammar error.
        let mut parser = Parser::from_str("[1]\nextra\n", ParseOptions::default());
        let mut failed = false;
        loop {
            match parser.next_event() {
                Ok(None) => break,
                Ok(Some(_)) => {}
                Err(_) => {
                    failed = true;
                    break;
                }
            }
        }
        assert!(failed);
    }
}
