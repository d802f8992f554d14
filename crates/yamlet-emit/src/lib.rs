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

//! Emission of Yamlet documents to YAML and JSON.
//!
//! Output is delivered through an [`EmitSink`] as chunks tagged with a
//! [`WriteKind`], so front-ends can colorise or filter without parsing
//! their own output. The [`EmitConfig`] selects block, flow, one-line,
//! or JSON shapes; style hints on nodes are honoured where the content
//! allows and downgraded where it does not. The round-trip guarantee is
//! semantic: re-parsing emitted output yields an equal document.
//!
//! # Example
//!
//! ```
//! use yamlet_core::Document;
//! use yamlet_emit::{emit_to_string, EmitConfig, EmitMode};
//!
//! let doc = Document::from_yaml_str("a: 1\nitems: [x, y]\n").unwrap();
//! let json = emit_to_string(&doc, &EmitConfig::with_mode(EmitMode::JsonOneline)).unwrap();
//! assert_eq!(json, "{\"a\":1,\"items\":[\"x\",\"y\"]}\n");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

mod config;
mod emitter;
pub mod scalar;
mod sink;

pub use config::{EmitConfig, EmitConfigBuilder, EmitMode, MarkerPolicy};
pub use emitter::{emit_to_string, emit_to_vec, emit_to_writer, to_yaml_string, Emitter};
pub use sink::{CallbackSink, EmitSink, RecordingSink, WriteKind, WriterSink};
