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

//! Security limits for YAML parsing.
//!
//! Note that there is intentionally no limit on the length of implicit
//! mapping keys: key candidates are tracked by token-queue position, not by
//! buffered length, so arbitrarily long keys cost nothing extra.

/// Configurable limits for parser security.
///
/// These limits bound the resources consumed while parsing hostile input.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Limits {
    /// Maximum input size in bytes (default: 1GB).
    pub max_input_size: usize,
    /// Maximum nesting depth of block and flow collections (default: 256).
    pub max_nesting_depth: usize,
    /// Maximum alias resolution depth (default: 128). Anchors must be
    /// declared before use, so cycles cannot occur in well-formed input;
    /// this bound catches malformed documents.
    pub max_alias_depth: usize,
    /// Maximum number of anchors per document (default: 64k).
    pub max_anchors: usize,
    /// Maximum number of documents per stream (default: 1M).
    pub max_documents: usize,
    /// Maximum number of nodes produced by alias and merge-key expansion
    /// (default: 10M). Guards against billion-laughs style blowup.
    pub max_expanded_nodes: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_input_size: 1024 * 1024 * 1024, // 1GB
            max_nesting_depth: 256,
            max_alias_depth: 128,
            max_anchors: 65_536,
            max_documents: 1_000_000,
            max_expanded_nodes: 10_000_000,
        }
    }
}

impl Limits {
    /// Create limits with no restrictions (for testing).
    pub fn unlimited() -> Self {
        Self {
            max_input_size: usize::MAX,
            max_nesting_depth: usize::MAX,
            max_alias_depth: usize::MAX,
            max_anchors: usize::MAX,
            max_documents: usize::MAX,
            max_expanded_nodes: usize::MAX,
        }
    }
}
