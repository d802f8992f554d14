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

//! Per-document parse state: version and tag directives.
//!
//! A [`DocumentState`] is shared (`Rc`) between the parser and every
//! document built from it. When a directive arrives while the state is
//! already shared with a built document, the parser clones it first
//! (`Rc::make_mut` copy-on-write), so earlier documents keep the state
//! they were parsed under.

use crate::error::{YamlError, YamlResult};

/// The handle every document implicitly maps to itself.
pub const PRIMARY_HANDLE: &str = "!";
/// The secondary handle and its implicit prefix.
pub const SECONDARY_HANDLE: &str = "!!";
/// The YAML core schema prefix, implicit target of `!!`.
pub const CORE_PREFIX: &str = "tag:yaml.org,2002:";

/// The YAML version a document is parsed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VersionDirective {
    /// Major version number.
    pub major: u32,
    /// Minor version number.
    pub minor: u32,
}

impl Default for VersionDirective {
    fn default() -> Self {
        Self { major: 1, minor: 3 }
    }
}

/// A `handle -> prefix` tag shorthand declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TagDirective {
    /// The shorthand handle, including its `!` delimiters.
    pub handle: String,
    /// The prefix the handle expands to.
    pub prefix: String,
    /// True for the two always-available built-in directives. A built-in
    /// may be overridden silently; explicit directives may not.
    pub builtin: bool,
}

impl TagDirective {
    /// An explicit directive.
    pub fn new(handle: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            handle: handle.into(),
            prefix: prefix.into(),
            builtin: false,
        }
    }

    fn implicit(handle: &str, prefix: &str) -> Self {
        Self {
            handle: handle.to_string(),
            prefix: prefix.to_string(),
            builtin: true,
        }
    }
}

/// Version, directives, and boundary implicitness of one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentState {
    /// The YAML version.
    pub version: VersionDirective,
    /// True if a `%YAML` directive appeared.
    pub version_explicit: bool,
    /// True if any `%TAG` directive appeared.
    pub tags_explicit: bool,
    /// True if the document started without an explicit `---`.
    pub start_implicit: bool,
    /// True if the document ended without an explicit `...`.
    pub end_implicit: bool,
    tag_directives: Vec<TagDirective>,
}

impl Default for DocumentState {
    fn default() -> Self {
        Self {
            version: VersionDirective::default(),
            version_explicit: false,
            tags_explicit: false,
            start_implicit: true,
            end_implicit: true,
            tag_directives: vec![
                TagDirective::implicit(PRIMARY_HANDLE, PRIMARY_HANDLE),
                TagDirective::implicit(SECONDARY_HANDLE, CORE_PREFIX),
            ],
        }
    }
}

impl DocumentState {
    /// A fresh state with only the built-in directives.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the version from a `%YAML` directive. Only major version 1 is
    /// accepted; minor versions above 3 parse with a best-effort warning
    /// left to the caller.
    pub fn set_version(&mut self, major: u32, minor: u32) -> YamlResult<()> {
        if self.version_explicit {
            return Err(YamlError::semantic("duplicate %YAML directive"));
        }
        if major != 1 {
            return Err(YamlError::semantic(format!(
                "unsupported YAML version {major}.{minor}"
            )));
        }
        self.version = VersionDirective { major, minor };
        self.version_explicit = true;
        Ok(())
    }

    /// Register a `%TAG` directive. A duplicate handle with a differing
    /// prefix is an error unless it overrides a built-in, which is
    /// replaced silently.
    pub fn add_tag_directive(&mut self, handle: &str, prefix: &str) -> YamlResult<()> {
        if let Some(existing) = self.tag_directives.iter_mut().find(|d| d.handle == handle) {
            if existing.builtin {
                existing.prefix = prefix.to_string();
                existing.builtin = false;
            } else if existing.prefix != prefix {
                return Err(YamlError::semantic(format!(
                    "conflicting %TAG directive for handle '{handle}'"
                )));
            }
        } else {
            self.tag_directives.push(TagDirective::new(handle, prefix));
        }
        self.tags_explicit = true;
        Ok(())
    }

    /// Remove an explicit directive by handle. Built-ins cannot be
    /// removed.
    pub fn remove_tag_directive(&mut self, handle: &str) -> YamlResult<()> {
        let before = self.tag_directives.len();
        self.tag_directives
            .retain(|d| d.builtin || d.handle != handle);
        if self.tag_directives.len() == before {
            return Err(YamlError::api(format!(
                "no removable %TAG directive for handle '{handle}'"
            )));
        }
        Ok(())
    }

    /// The prefix a handle expands to, if declared.
    pub fn lookup_tag_directive(&self, handle: &str) -> Option<&str> {
        self.tag_directives
            .iter()
            .find(|d| d.handle == handle)
            .map(|d| d.prefix.as_str())
    }

    /// Iterate the declared directives in declaration order, built-ins
    /// first.
    pub fn tag_directives(&self) -> impl Iterator<Item = &TagDirective> {
        self.tag_directives.iter()
    }

    /// Iterate only the explicit (non-built-in, non-overridden-default)
    /// directives, the ones emission must declare.
    pub fn explicit_tag_directives(&self) -> impl Iterator<Item = &TagDirective> {
        self.tag_directives.iter().filter(|d| !d.builtin)
    }

    /// Expand a tag shorthand `handle` + `suffix` to a full tag. Unknown
    /// handles are an error; `!` and `!!` are always available.
    pub fn resolve_tag(&self, handle: &str, suffix: &str) -> YamlResult<String> {
        match self.lookup_tag_directive(handle) {
            Some(prefix) => Ok(format!("{prefix}{suffix}")),
            None => Err(YamlError::semantic(format!(
                "undeclared tag handle '{handle}'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== default state tests ====================

    #[test]
    fn test_default_version_is_1_3() {
        let state = DocumentState::new();
        assert_eq!(state.version, VersionDirective { major: 1, minor: 3 });
        assert!(!state.version_explicit);
    }

    #[test]
    fn test_builtin_directives_present() {
        let state = DocumentState::new();
        assert_eq!(state.lookup_tag_directive("!"), Some("!"));
        assert_eq!(state.lookup_tag_directive("!!"), Some(CORE_PREFIX));
    }

    #[test]
    fn test_default_boundaries_implicit() {
        let state = DocumentState::new();
        assert!(state.start_implicit);
        assert!(state.end_implicit);
    }

    // ==================== version directive tests ====================

    #[test]
    fn test_set_version() {
        let mut state = DocumentState::new();
        state.set_version(1, 2).unwrap();
        assert_eq!(state.version, VersionDirective { major: 1, minor: 2 });
        assert!(state.version_explicit);
    }

    #[test]
    fn test_duplicate_version_directive_errors() {
        let mut state = DocumentState::new();
        state.set_version(1, 3).unwrap();
        assert!(state.set_version(1, 3).is_err());
    }

    #[test]
    fn test_major_version_2_rejected() {
        let mut state = DocumentState::new();
        assert!(state.set_version(2, 0).is_err());
    }

    // ==================== tag directive tests ====================

    #[test]
    fn test_add_and_lookup() {
        let mut state = DocumentState::new();
        state.add_tag_directive("!e!", "tag:example.com,2026:").unwrap();
        assert_eq!(
            state.lookup_tag_directive("!e!"),
            Some("tag:example.com,2026:")
        );
        assert!(state.tags_explicit);
    }

    #[test]
    fn test_builtin_override_is_silent() {
        let mut state = DocumentState::new();
        state.add_tag_directive("!!", "tag:custom:").unwrap();
        assert_eq!(state.lookup_tag_directive("!!"), Some("tag:custom:"));
    }

    #[test]
    fn test_conflicting_duplicate_errors() {
        let mut state = DocumentState::new();
        state.add_tag_directive("!e!", "tag:a:").unwrap();
        assert!(state.add_tag_directive("!e!", "tag:b:").is_err());
    }

    #[test]
    fn test_identical_duplicate_allowed() {
        let mut state = DocumentState::new();
        state.add_tag_directive("!e!", "tag:a:").unwrap();
        assert!(state.add_tag_directive("!e!", "tag:a:").is_ok());
    }

    #[test]
    fn test_remove_explicit_directive() {
        let mut state = DocumentState::new();
        state.add_tag_directive("!e!", "tag:a:").unwrap();
        state.remove_tag_directive("!e!").unwrap();
        assert_eq!(state.lookup_tag_directive("!e!"), None);
    }

    #[test]
    fn test_remove_builtin_errors() {
        let mut state = DocumentState::new();
        assert!(state.remove_tag_directive("!!").is_err());
    }

    // ==================== resolution tests ====================

    #[test]
    fn test_resolve_secondary() {
        let state = DocumentState::new();
        assert_eq!(
            state.resolve_tag("!!", "str").unwrap(),
            "tag:yaml.org,2002:str"
        );
    }

    #[test]
    fn test_resolve_primary() {
        let state = DocumentState::new();
        assert_eq!(state.resolve_tag("!", "local").unwrap(), "!local");
    }

    #[test]
    fn test_resolve_unknown_handle_errors() {
        let state = DocumentState::new();
        assert!(state.resolve_tag("!nope!", "x").is_err());
    }

    #[test]
    fn test_explicit_directives_excludes_builtins() {
        let mut state = DocumentState::new();
        assert_eq!(state.explicit_tag_directives().count(), 0);
        state.add_tag_directive("!e!", "tag:a:").unwrap();
        assert_eq!(state.explicit_tag_directives().count(), 1);
    }
}
