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

//! Parse configuration.

use crate::diag::ColorMode;
use crate::limits::Limits;
use std::path::PathBuf;

/// Options accepted by parsers and document builders.
///
/// Construct with [`ParseOptions::builder`] or mutate the fields
/// directly; `Default` gives strict parsing with normal limits.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Security limits.
    pub limits: Limits,
    /// Suppress diagnostics to stderr.
    pub quiet: bool,
    /// Capture diagnostics on the parser/document instead of printing.
    pub collect_diagnostics: bool,
    /// Color handling hint for diagnostic front-ends.
    pub color: ColorMode,
    /// Run the resolver (aliases, merge keys) as part of building.
    pub resolve_on_build: bool,
    /// Never memory-map file inputs; always use buffered reads.
    pub disable_mmap: bool,
    /// Accepted for configuration compatibility; token recycling is not
    /// a meaningful knob here and the flag has no effect.
    pub disable_recycling: bool,
    /// Directories searched when opening relative paths, colon-separated
    /// in the environment style.
    pub search_path: Vec<PathBuf>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            limits: Limits::default(),
            quiet: false,
            collect_diagnostics: false,
            color: ColorMode::Auto,
            resolve_on_build: true,
            disable_mmap: false,
            disable_recycling: false,
            search_path: Vec::new(),
        }
    }
}

impl ParseOptions {
    /// Create a new builder.
    pub fn builder() -> ParseOptionsBuilder {
        ParseOptionsBuilder::new()
    }

    /// Parse a colon-separated search path list.
    pub fn with_search_path_env(mut self, spec: &str) -> Self {
        self.search_path = spec
            .split(':')
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .collect();
        self
    }
}

/// Builder for [`ParseOptions`].
#[derive(Debug, Clone, Default)]
pub struct ParseOptionsBuilder {
    options: ParseOptions,
}

impl ParseOptionsBuilder {
    /// Create a builder with default options.
    pub fn new() -> Self {
        Self {
            options: ParseOptions::default(),
        }
    }

    /// Override the security limits.
    pub fn limits(mut self, limits: Limits) -> Self {
        self.options.limits = limits;
        self
    }

    /// Set the maximum collection nesting depth.
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.options.limits.max_nesting_depth = depth;
        self
    }

    /// Suppress stderr diagnostics.
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.options.quiet = quiet;
        self
    }

    /// Capture diagnostics instead of printing them.
    pub fn collect_diagnostics(mut self, collect: bool) -> Self {
        self.options.collect_diagnostics = collect;
        self
    }

    /// Set the color mode hint.
    pub fn color(mut self, color: ColorMode) -> Self {
        self.options.color = color;
        self
    }

    /// Resolve aliases and merge keys during build.
    pub fn resolve_on_build(mut self, resolve: bool) -> Self {
        self.options.resolve_on_build = resolve;
        self
    }

    /// Disable memory-mapped file inputs.
    pub fn disable_mmap(mut self, disable: bool) -> Self {
        self.options.disable_mmap = disable;
        self
    }

    /// Add a directory to the search path for relative file inputs.
    pub fn search_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.options.search_path.push(dir.into());
        self
    }

    /// Finish building.
    pub fn build(self) -> ParseOptions {
        self.options
    }
}
