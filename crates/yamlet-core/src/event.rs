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

//! Parse events.
//!
//! The parser turns the scanner's token FIFO into a flat event stream
//! obeying the YAML grammar. Every start event is matched by exactly one
//! end event; nesting is balanced regardless of input errors, short of a
//! latched stream error. Events own their tokens (`Rc`), so an event
//! outliving the parser that produced it stays valid.

use crate::docstate::DocumentState;
use crate::mark::Mark;
use crate::token::{ScalarStyle, Token};
use std::rc::Rc;

/// The event payload.
#[derive(Debug, Clone)]
pub enum EventData {
    /// Start of the stream; always the first event.
    StreamStart,
    /// End of the stream; always the last event.
    StreamEnd,
    /// Start of a document, carrying the state it is parsed under.
    DocumentStart {
        /// Shared document state (version, tag directives).
        state: Rc<DocumentState>,
        /// True when no explicit `---` introduced the document.
        implicit: bool,
    },
    /// End of a document.
    DocumentEnd {
        /// True when no explicit `...` terminated the document.
        implicit: bool,
    },
    /// An alias node.
    Alias {
        /// The `*name` token.
        anchor: Token,
    },
    /// A scalar node.
    Scalar {
        /// Optional `&name` token.
        anchor: Option<Token>,
        /// Optional tag token; its resolved text is the full tag.
        tag: Option<Token>,
        /// The content token.
        value: Token,
        /// True when no tag was written and resolution is left to the
        /// schema.
        tag_implicit: bool,
        /// Presentation style.
        style: ScalarStyle,
    },
    /// Start of a sequence.
    SequenceStart {
        /// Optional `&name` token.
        anchor: Option<Token>,
        /// Optional tag token.
        tag: Option<Token>,
        /// True for `[...]` flow form.
        flow: bool,
        /// The opening structural token, when one exists.
        opening: Option<Token>,
    },
    /// End of a sequence.
    SequenceEnd,
    /// Start of a mapping.
    MappingStart {
        /// Optional `&name` token.
        anchor: Option<Token>,
        /// Optional tag token.
        tag: Option<Token>,
        /// True for `{...}` flow form.
        flow: bool,
        /// The opening structural token, when one exists.
        opening: Option<Token>,
    },
    /// End of a mapping.
    MappingEnd,
}

/// One parse event with its source span.
#[derive(Debug, Clone)]
pub struct Event {
    /// The payload.
    pub data: EventData,
    /// Start position.
    pub start: Mark,
    /// End position (exclusive).
    pub end: Mark,
}

impl Event {
    /// Create an event.
    pub fn new(data: EventData, start: Mark, end: Mark) -> Self {
        Self { data, start, end }
    }

    /// Short name for traces and error messages.
    pub fn name(&self) -> &'static str {
        match self.data {
            EventData::StreamStart => "stream-start",
            EventData::StreamEnd => "stream-end",
            EventData::DocumentStart { .. } => "document-start",
            EventData::DocumentEnd { .. } => "document-end",
            EventData::Alias { .. } => "alias",
            EventData::Scalar { .. } => "scalar",
            EventData::SequenceStart { .. } => "sequence-start",
            EventData::SequenceEnd => "sequence-end",
            EventData::MappingStart { .. } => "mapping-start",
            EventData::MappingEnd => "mapping-end",
        }
    }

    /// True for sequence-start and mapping-start.
    #[inline]
    pub fn is_collection_start(&self) -> bool {
        matches!(
            self.data,
            EventData::SequenceStart { .. } | EventData::MappingStart { .. }
        )
    }

    /// True for sequence-end and mapping-end.
    #[inline]
    pub fn is_collection_end(&self) -> bool {
        matches!(self.data, EventData::SequenceEnd | EventData::MappingEnd)
    }

    /// The scalar value token, if this is a scalar event.
    pub fn as_scalar(&self) -> Option<&Token> {
        match &self.data {
            EventData::Scalar { value, .. } => Some(value),
            _ => None,
        }
    }

    /// The anchor token attached to this event, if any.
    pub fn anchor(&self) -> Option<&Token> {
        match &self.data {
            EventData::Alias { anchor } => Some(anchor),
            EventData::Scalar { anchor, .. }
            | EventData::SequenceStart { anchor, .. }
            | EventData::MappingStart { anchor, .. } => anchor.as_ref(),
            _ => None,
        }
    }

    /// The tag token attached to this event, if any.
    pub fn tag(&self) -> Option<&Token> {
        match &self.data {
            EventData::Scalar { tag, .. }
            | EventData::SequenceStart { tag, .. }
            | EventData::MappingStart { tag, .. } => tag.as_ref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(data: EventData) -> Event {
        Event::new(data, Mark::start(), Mark::start())
    }

    // ==================== classification tests ====================

    #[test]
    fn test_names() {
        assert_eq!(event(EventData::StreamStart).name(), "stream-start");
        assert_eq!(event(EventData::SequenceEnd).name(), "sequence-end");
        assert_eq!(
            event(EventData::DocumentStart {
                state: Rc::new(DocumentState::new()),
                implicit: true
            })
            .name(),
            "document-start"
        );
    }

    #[test]
    fn test_collection_start_end() {
        let start = event(EventData::SequenceStart {
            anchor: None,
            tag: None,
            flow: false,
            opening: None,
        });
        assert!(start.is_collection_start());
        assert!(!start.is_collection_end());
        let end = event(EventData::MappingEnd);
        assert!(end.is_collection_end());
        assert!(!end.is_collection_start());
    }

    #[test]
    fn test_as_scalar() {
        let value = Token::synthetic_scalar("x", ScalarStyle::Plain);
        let ev = event(EventData::Scalar {
            anchor: None,
            tag: None,
            value,
            tag_implicit: true,
            style: ScalarStyle::Plain,
        });
        assert_eq!(ev.as_scalar().unwrap().text(), "x");
        assert!(event(EventData::StreamEnd).as_scalar().is_none());
    }

    #[test]
    fn test_anchor_accessor() {
        let anchor = Token::synthetic_scalar("a1", ScalarStyle::Plain);
        let ev = event(EventData::MappingStart {
            anchor: Some(anchor),
            tag: None,
            flow: true,
            opening: None,
        });
        assert!(ev.anchor().is_some());
        assert!(event(EventData::MappingEnd).anchor().is_none());
    }
}
