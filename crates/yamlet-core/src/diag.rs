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

//! Diagnostics.
//!
//! One line per diagnostic, `source:line:column: <level>: <module>:
//! <message>`, optionally followed by the offending source line and a
//! caret. Positions are stored 0-based and rendered 1-based. Rendering is
//! plain text; color is an external concern, the mode is only carried in
//! configuration.

use crate::input::Input;
use crate::mark::Mark;
use std::fmt;
use std::rc::Rc;

/// Diagnostic severity levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Severity {
    Debug,
    Info,
    Notice,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
            Self::Notice => write!(f, "notice"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Color handling requested by the caller. The renderer itself emits
/// plain text; front-ends interpret this mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ColorMode {
    #[default]
    Auto,
    None,
    Force,
}

/// One diagnostic record.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Diagnostic {
    /// Severity level.
    pub severity: Severity,
    /// Reporting module: `scanner`, `parser`, `doc`, `resolve`, `emit`.
    pub module: String,
    /// The message text.
    pub message: String,
    /// Diagnostic source name (input origin).
    pub source: String,
    /// Position, if known.
    pub mark: Option<Mark>,
    /// The offending source line, if captured.
    pub snippet: Option<String>,
}

impl Diagnostic {
    /// Create an error diagnostic.
    pub fn error(module: &str, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            module: module.to_string(),
            message: message.into(),
            source: "<memory>".to_string(),
            mark: None,
            snippet: None,
        }
    }

    /// Attach a position and capture its source line for the caret
    /// snippet.
    pub fn locate(mut self, input: &Rc<Input>, mark: Mark) -> Self {
        self.source = input.name();
        self.snippet = input.line_text(mark.line);
        self.mark = Some(mark);
        self
    }

    /// Render the one-line form plus the optional snippet and caret.
    pub fn render(&self) -> String {
        let mut out = match self.mark {
            Some(m) => format!(
                "{}:{}:{}: {}: {}: {}",
                self.source,
                m.line + 1,
                m.column + 1,
                self.severity,
                self.module,
                self.message
            ),
            None => format!(
                "{}: {}: {}: {}",
                self.source, self.severity, self.module, self.message
            ),
        };
        if let (Some(mark), Some(snippet)) = (&self.mark, &self.snippet) {
            out.push('\n');
            out.push_str(snippet);
            out.push('\n');
            for _ in 0..mark.column {
                out.push(' ');
            }
            out.push('^');
        }
        out
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

/// Where diagnostics go. With `collect` set they accumulate in the
/// parser (and transfer to the document); otherwise they are written to
/// stderr unless `quiet`.
#[derive(Debug, Default)]
pub(crate) struct DiagSink {
    pub(crate) quiet: bool,
    pub(crate) collect: bool,
    pub(crate) collected: Vec<Diagnostic>,
}

impl DiagSink {
    pub(crate) fn report(&mut self, diag: Diagnostic) {
        tracing::debug!(target: "yamlet_core::diag", "{}", diag.render());
        if self.collect {
            self.collected.push(diag);
        } else if !self.quiet {
            eprintln!("{}", diag.render());
        }
    }

    pub(crate) fn take(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.collected)
    }
}
