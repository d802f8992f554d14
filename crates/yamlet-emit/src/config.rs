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

//! Emitter configuration.

/// Overall output shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EmitMode {
    /// Honour each node's style hint.
    #[default]
    Original,
    /// Block collections only; scalars plain or literal where possible.
    Block,
    /// Flow collections only.
    Flow,
    /// Flow collections on a single line.
    FlowOneline,
    /// JSON output; every scalar double-quoted.
    Json,
    /// JSON output; plain scalars matching the JSON number/bool/null
    /// grammar stay unquoted.
    JsonTypePreserving,
    /// Type-preserving JSON on a single line.
    JsonOneline,
}

impl EmitMode {
    /// True for the three JSON modes.
    pub fn is_json(self) -> bool {
        matches!(self, Self::Json | Self::JsonTypePreserving | Self::JsonOneline)
    }

    /// True when scalar types survive into the JSON output.
    pub fn json_preserves_types(self) -> bool {
        matches!(self, Self::JsonTypePreserving | Self::JsonOneline)
    }

    /// True when everything is emitted on one line.
    pub fn oneline(self) -> bool {
        matches!(self, Self::FlowOneline | Self::JsonOneline)
    }

    /// True when collections must use flow form.
    pub fn forces_flow(self) -> bool {
        self.is_json() || matches!(self, Self::Flow | Self::FlowOneline)
    }
}

/// Whether a marker or directive is emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MarkerPolicy {
    /// Emit only when needed for correctness or fidelity.
    #[default]
    Auto,
    /// Never emit.
    Off,
    /// Always emit.
    On,
}

/// Emitter configuration; build with [`EmitConfig::builder`].
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EmitConfig {
    /// Spaces per indentation level, 1-9.
    pub indent: usize,
    /// Soft line-width target, 0-255; 255 means unlimited.
    pub width: usize,
    /// Output shape.
    pub mode: EmitMode,
    /// `---` emission policy.
    pub doc_start_mark: MarkerPolicy,
    /// `...` emission policy.
    pub doc_end_mark: MarkerPolicy,
    /// `%YAML` emission policy.
    pub version_directive: MarkerPolicy,
    /// `%TAG` emission policy.
    pub tag_directives: MarkerPolicy,
    /// Reorder mapping pairs with the default comparator.
    pub sort_keys: bool,
    /// Reserved; comment emission is best-effort and currently off.
    pub output_comments: bool,
}

impl Default for EmitConfig {
    fn default() -> Self {
        Self {
            indent: 2,
            width: 80,
            mode: EmitMode::Original,
            doc_start_mark: MarkerPolicy::Auto,
            doc_end_mark: MarkerPolicy::Auto,
            version_directive: MarkerPolicy::Auto,
            tag_directives: MarkerPolicy::Auto,
            sort_keys: false,
            output_comments: false,
        }
    }
}

impl EmitConfig {
    /// Start building a configuration.
    pub fn builder() -> EmitConfigBuilder {
        EmitConfigBuilder::default()
    }

    /// A configuration for the given mode, defaults otherwise.
    pub fn with_mode(mode: EmitMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// The effective width; `None` when unlimited.
    pub fn width_limit(&self) -> Option<usize> {
        if self.width == 0 || self.width >= 255 || self.mode.oneline() {
            None
        } else {
            Some(self.width)
        }
    }
}

/// Builder for [`EmitConfig`]; out-of-range values are clamped.
#[derive(Debug, Clone, Default)]
pub struct EmitConfigBuilder {
    config: EmitConfig,
}

impl EmitConfigBuilder {
    /// Spaces per indentation level; clamped to 1-9.
    pub fn indent(mut self, indent: usize) -> Self {
        self.config.indent = indent.clamp(1, 9);
        self
    }

    /// Soft width target; clamped to 0-255.
    pub fn width(mut self, width: usize) -> Self {
        self.config.width = width.min(255);
        self
    }

    /// Output shape.
    pub fn mode(mut self, mode: EmitMode) -> Self {
        self.config.mode = mode;
        self
    }

    /// `---` policy.
    pub fn doc_start_mark(mut self, policy: MarkerPolicy) -> Self {
        self.config.doc_start_mark = policy;
        self
    }

    /// `...` policy.
    pub fn doc_end_mark(mut self, policy: MarkerPolicy) -> Self {
        self.config.doc_end_mark = policy;
        self
    }

    /// `%YAML` policy.
    pub fn version_directive(mut self, policy: MarkerPolicy) -> Self {
        self.config.version_directive = policy;
        self
    }

    /// `%TAG` policy.
    pub fn tag_directives(mut self, policy: MarkerPolicy) -> Self {
        self.config.tag_directives = policy;
        self
    }

    /// Sort mapping keys with the default comparator.
    pub fn sort_keys(mut self, sort: bool) -> Self {
        self.config.sort_keys = sort;
        self
    }

    /// Finish building.
    pub fn build(self) -> EmitConfig {
        self.config
    }
}
