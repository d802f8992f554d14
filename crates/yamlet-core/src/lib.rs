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

//! Core YAML 1.3 parsing for Yamlet: input management, scanning,
//! event-stream parsing, the document model, and resolution. JSON is
//! accepted as a strict subset of the grammar.
//!
//! The pipeline, bottom up:
//!
//! - [`input`]: shared byte storage (owned, memory-mapped, or streamed
//!   chunks) with position mapping.
//! - [`atom`]: zero-copy tagged views into an input; decoding happens on
//!   demand per style.
//! - [`token`]: reference-counted scanner tokens.
//! - [`scanner`]: bytes to a token FIFO, with the indentation stack and
//!   implicit-key tracking (no key length limit).
//! - [`parser`]: tokens to a balanced event stream via a grammar state
//!   machine.
//! - [`builder`](DocumentBuilder): events to a [`Document`] tree.
//! - [`resolver`]: alias substitution and `<<` merge-key expansion.
//!
//! # Example
//!
//! ```
//! use yamlet_core::Document;
//!
//! let doc = Document::from_yaml_str("invoice: 34843\nitems: [a, b]\n").unwrap();
//! let invoice = doc.lookup_by_path("/invoice").unwrap();
//! assert_eq!(doc.scalar_text(invoice), Some("34843"));
//! ```

// Unsafe is denied crate-wide; the single exception is the documented
// mmap call in `input`, which carries its own narrow allow.
#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod atom;
mod builder;
pub mod compare;
pub mod diag;
pub mod docstate;
pub mod document;
pub mod error;
pub mod event;
pub mod input;
pub mod limits;
mod mark;
pub mod options;
mod parser;
mod path;
pub mod resolver;
pub mod scanner;
pub mod token;
pub mod utf8;

pub use atom::{Atom, AtomFlags, AtomStyle, Chomp};
pub use builder::DocumentBuilder;
pub use compare::{documents_equal, nodes_equal};
pub use diag::{ColorMode, Diagnostic, Severity};
pub use docstate::{DocumentState, TagDirective, VersionDirective};
pub use document::{Anchor, Document, NodeId, NodeKind, NodePair, NodeStyle};
pub use error::{ErrorKind, YamlError, YamlResult};
pub use event::{Event, EventData};
pub use input::{Input, Origin};
pub use limits::Limits;
pub use mark::Mark;
pub use options::{ParseOptions, ParseOptionsBuilder};
pub use parser::Parser;
pub use scanner::Scanner;
pub use token::{ScalarStyle, Token, TokenData};
