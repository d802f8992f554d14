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

//! Scalar content analysis for style selection, plus escaping.
//!
//! The analysis is deliberately conservative: when content is anywhere
//! near an ambiguity it falls back to a quoted style. The semantic
//! round-trip guarantee depends on representability, not on choosing the
//! tersest form.

use yamlet_core::utf8;

/// What styles a scalar's content permits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScalarAnalysis {
    /// The content is empty.
    pub empty: bool,
    /// The content contains line breaks.
    pub multiline: bool,
    /// Plain form re-scans to the same content.
    pub allow_plain: bool,
    /// Single-quoted form can represent the content.
    pub allow_single: bool,
    /// A literal block scalar can represent the content (block context
    /// only).
    pub allow_literal: bool,
}

/// Characters that may never begin a plain scalar.
fn starts_indicator(c: char) -> bool {
    matches!(
        c,
        ',' | '[' | ']' | '{' | '}' | '#' | '&' | '*' | '!' | '|' | '>' | '\'' | '"' | '%'
            | '@' | '`'
    )
}

/// Analyse `text` for emission in the given context.
pub fn analyze(text: &str, in_flow: bool, for_key: bool) -> ScalarAnalysis {
    if text.is_empty() {
        return ScalarAnalysis {
            empty: true,
            multiline: false,
            allow_plain: false,
            allow_single: true,
            allow_literal: false,
        };
    }

    let mut multiline = false;
    let mut printable_only = true;
    let mut has_tab = false;
    let mut has_cr = false;
    for c in text.chars() {
        if c == '\n' {
            multiline = true;
        } else if c == '\r' {
            has_cr = true;
            multiline = true;
        } else if c == '\t' {
            has_tab = true;
        } else if !utf8::is_printable(c) {
            printable_only = false;
        }
    }

    let first = text.chars().next().unwrap_or(' ');
    let second = text.chars().nth(1);
    let edge_blank = text.starts_with([' ', '\t']) || text.ends_with([' ', '\t']);

    let mut allow_plain = printable_only && !multiline && !has_tab && !edge_blank;
    if allow_plain {
        if starts_indicator(first) {
            allow_plain = false;
        }
        if matches!(first, '-' | '?' | ':')
            && second.map_or(true, |c| c == ' ' || (in_flow && utf8::is_flow_indicator(c)))
        {
            allow_plain = false;
        }
        // In flow context '?' and ':' are indicators regardless of what
        // follows them.
        if in_flow && matches!(first, '?' | ':') {
            allow_plain = false;
        }
        if text.starts_with("---") || text.starts_with("...") {
            allow_plain = false;
        }
        if text.contains(": ") || text.ends_with(':') {
            allow_plain = false;
        }
        if text.contains(" #") {
            allow_plain = false;
        }
        if in_flow {
            if text.contains(['[', ']', '{', '}', ',']) {
                allow_plain = false;
            }
            // A key followed by ':' must not swallow it.
            if for_key && text.contains(':') {
                allow_plain = false;
            }
        }
    }

    let allow_single = printable_only && !multiline && !has_tab;
    let allow_literal = !in_flow && !for_key && printable_only && !has_cr && !text.is_empty();

    ScalarAnalysis {
        empty: false,
        multiline,
        allow_plain,
        allow_single,
        allow_literal,
    }
}

/// True iff `text` matches the JSON grammar for a number, `true`,
/// `false`, or `null`.
pub fn is_json_scalar(text: &str) -> bool {
    matches!(text, "null" | "true" | "false") || is_json_number(text)
}

fn is_json_number(text: &str) -> bool {
    let mut rest = text.strip_prefix('-').unwrap_or(text);
    // Integer part: 0, or a nonzero digit followed by digits.
    let digits = rest.bytes().take_while(|b| b.is_ascii_digit()).count();
    if digits == 0 {
        return false;
    }
    if digits > 1 && rest.starts_with('0') {
        return false;
    }
    rest = &rest[digits..];
    if let Some(frac) = rest.strip_prefix('.') {
        let digits = frac.bytes().take_while(|b| b.is_ascii_digit()).count();
        if digits == 0 {
            return false;
        }
        rest = &frac[digits..];
    }
    if let Some(exp) = rest.strip_prefix(['e', 'E']) {
        let exp = exp.strip_prefix(['+', '-']).unwrap_or(exp);
        let digits = exp.bytes().take_while(|b| b.is_ascii_digit()).count();
        if digits == 0 {
            return false;
        }
        rest = &exp[digits..];
    }
    rest.is_empty()
}

/// Escape content for a double-quoted scalar (also valid as a JSON
/// string for ASCII-safe output).
pub fn escape_double_quoted(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\0' => out.push_str("\\0"),
            '\u{7}' => out.push_str("\\a"),
            '\u{8}' => out.push_str("\\b"),
            '\u{b}' => out.push_str("\\v"),
            '\u{c}' => out.push_str("\\f"),
            '\u{1b}' => out.push_str("\\e"),
            '\u{85}' => out.push_str("\\N"),
            '\u{a0}' => out.push_str("\\_"),
            '\u{2028}' => out.push_str("\\L"),
            '\u{2029}' => out.push_str("\\P"),
            c if (c as u32) < 0x20 || c as u32 == 0x7f => {
                out.push_str(&format!("\\x{:02x}", c as u32));
            }
            c if !utf8::is_printable(c) => {
                if (c as u32) <= 0xffff {
                    out.push_str(&format!("\\u{:04x}", c as u32));
                } else {
                    out.push_str(&format!("\\U{:08x}", c as u32));
                }
            }
            c => out.push(c),
        }
    }
    out
}

/// Escape content for a JSON string: strict JSON escapes only.
pub fn escape_json(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            c if (c as u32) < 0x20 => {
                out.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => out.push(c),
        }
    }
    out
}

/// Escape content for a single-quoted scalar.
pub fn escape_single_quoted(text: &str) -> String {
    text.replace('\'', "''")
}
