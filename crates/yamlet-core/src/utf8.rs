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

//! UTF-8 decoding and YAML character classification.
//!
//! The scanner works on codepoints decoded one at a time from raw bytes.
//! [`decode`] returns the codepoint together with its byte width; the
//! predicates implement the YAML 1.3 character classes. End-of-input is
//! modelled as `None`, so the `*z` predicates take `Option<char>`.

/// The byte-order mark, accepted at stream and document starts and
/// excluded from the printable set.
pub const BOM: char = '\u{FEFF}';

/// Decode one codepoint from the front of `bytes`.
///
/// Returns `(codepoint, byte_width)`, or `None` if the bytes are empty or
/// not valid UTF-8 (including overlong encodings and surrogates, which
/// `str::from_utf8` rejects).
pub fn decode(bytes: &[u8]) -> Option<(char, usize)> {
    let first = *bytes.first()?;
    let width = utf8_width(first);
    if width == 0 || bytes.len() < width {
        return None;
    }
    let s = std::str::from_utf8(&bytes[..width]).ok()?;
    let c = s.chars().next()?;
    Some((c, width))
}

/// Byte width of a UTF-8 sequence from its first byte, 0 if invalid.
#[inline]
pub fn utf8_width(first: u8) -> usize {
    match first {
        0x00..=0x7f => 1,
        0xc2..=0xdf => 2,
        0xe0..=0xef => 3,
        0xf0..=0xf4 => 4,
        _ => 0,
    }
}

/// ASCII space.
#[inline]
pub fn is_space(c: char) -> bool {
    c == ' '
}

/// ASCII tab.
#[inline]
pub fn is_tab(c: char) -> bool {
    c == '\t'
}

/// Space or tab.
#[inline]
pub fn is_blank(c: char) -> bool {
    is_space(c) || is_tab(c)
}

/// Line break: LF, CR, NEL, LS, or PS.
#[inline]
pub fn is_break(c: char) -> bool {
    matches!(c, '\n' | '\r' | '\u{85}' | '\u{2028}' | '\u{2029}')
}

/// Line break or end of input.
#[inline]
pub fn is_breakz(c: Option<char>) -> bool {
    c.map_or(true, is_break)
}

/// Blank, line break, or end of input.
#[inline]
pub fn is_blankz(c: Option<char>) -> bool {
    c.map_or(true, |c| is_blank(c) || is_break(c))
}

/// Space, line break, or end of input.
#[inline]
pub fn is_spacez(c: Option<char>) -> bool {
    c.map_or(true, |c| is_space(c) || is_break(c))
}

/// ASCII decimal digit.
#[inline]
pub fn is_digit(c: char) -> bool {
    c.is_ascii_digit()
}

/// ASCII hex digit.
#[inline]
pub fn is_hex(c: char) -> bool {
    c.is_ascii_hexdigit()
}

/// Letter or underscore, the first character of a word.
#[inline]
pub fn is_first_alpha(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

/// Word character: letter, underscore, or dash.
#[inline]
pub fn is_alpha(c: char) -> bool {
    is_first_alpha(c) || c == '-'
}

/// Word character or digit. Used for anchor names and tag handles.
#[inline]
pub fn is_alnum(c: char) -> bool {
    is_alpha(c) || is_digit(c)
}

/// Characters permitted in a tag URI.
#[inline]
pub fn is_uri_char(c: char) -> bool {
    is_alnum(c) || ";/?:@&=+$,.!~*'()[]%#".contains(c)
}

/// Flow structure indicators.
#[inline]
pub fn is_flow_indicator(c: char) -> bool {
    matches!(c, ',' | '[' | ']' | '{' | '}')
}

/// The YAML printable set, excluding the BOM.
#[inline]
pub fn is_printable(c: char) -> bool {
    matches!(c,
        '\t' | '\n' | '\r' | '\u{20}'..='\u{7e}' | '\u{85}'
        | '\u{a0}'..='\u{d7ff}'
        | '\u{e000}'..='\u{fffd}'
        | '\u{10000}'..='\u{10ffff}')
        && c != BOM
}

/// The hex value of an escape digit.
#[inline]
pub fn hex_value(c: char) -> u32 {
    c.to_digit(16).unwrap_or(0)
}

/// Byte width of the line break starting at the front of `bytes`.
///
/// Recognises `CR LF` as a single two-byte break; returns 0 if `bytes`
/// does not start with a break.
pub fn break_width(bytes: &[u8]) -> usize {
    match decode(bytes) {
        Some(('\r', _)) => {
            if bytes.get(1) == Some(&b'\n') {
                2
            } else {
                1
            }
        }
        Some((c, w)) if is_break(c) => w,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== decode tests ====================

    #[test]
    fn test_decode_ascii() {
        assert_eq!(decode(b"abc"), Some(('a', 1)));
    }

    #[test]
    fn test_decode_two_byte() {
        assert_eq!(decode("é".as_bytes()), Some(('é', 2)));
    }

    #[test]
    fn test_decode_three_byte() {
        assert_eq!(decode("日".as_bytes()), Some(('日', 3)));
    }

    #[test]
    fn test_decode_four_byte() {
        assert_eq!(decode("🎉".as_bytes()), Some(('🎉', 4)));
    }

    #[test]
    fn test_decode_empty() {
        assert_eq!(decode(b""), None);
    }

    #[test]
    fn test_decode_invalid_continuation() {
        assert_eq!(decode(&[0xc3, 0x28]), None);
    }

    #[test]
    fn test_decode_bare_continuation_byte() {
        assert_eq!(decode(&[0x80]), None);
    }

    #[test]
    fn test_decode_truncated_sequence() {
        assert_eq!(decode(&[0xe6, 0x97]), None);
    }

    #[test]
    fn test_decode_overlong_rejected() {
        // 0xc0 0xaf would be an overlong encoding of '/'.
        assert_eq!(decode(&[0xc0, 0xaf]), None);
    }

    // ==================== classification tests ====================

    #[test]
    fn test_is_blank() {
        assert!(is_blank(' '));
        assert!(is_blank('\t'));
        assert!(!is_blank('\n'));
        assert!(!is_blank('a'));
    }

    #[test]
    fn test_is_break_all_five() {
        for c in ['\n', '\r', '\u{85}', '\u{2028}', '\u{2029}'] {
            assert!(is_break(c), "{:?} should be a break", c);
        }
        assert!(!is_break(' '));
    }

    #[test]
    fn test_is_breakz_end_of_input() {
        assert!(is_breakz(None));
        assert!(is_breakz(Some('\n')));
        assert!(!is_breakz(Some('x')));
    }

    #[test]
    fn test_is_blankz() {
        assert!(is_blankz(None));
        assert!(is_blankz(Some(' ')));
        assert!(is_blankz(Some('\t')));
        assert!(is_blankz(Some('\n')));
        assert!(!is_blankz(Some('-')));
    }

    #[test]
    fn test_is_alnum() {
        assert!(is_alnum('a'));
        assert!(is_alnum('Z'));
        assert!(is_alnum('0'));
        assert!(is_alnum('_'));
        assert!(is_alnum('-'));
        assert!(!is_alnum(' '));
        assert!(!is_alnum('*'));
    }

    #[test]
    fn test_is_uri_char() {
        assert!(is_uri_char('a'));
        assert!(is_uri_char('%'));
        assert!(is_uri_char('/'));
        assert!(is_uri_char(':'));
        assert!(!is_uri_char(' '));
        assert!(!is_uri_char('"'));
    }

    #[test]
    fn test_is_printable() {
        assert!(is_printable('a'));
        assert!(is_printable('\t'));
        assert!(is_printable('\n'));
        assert!(is_printable('日'));
        assert!(is_printable('🎉'));
        assert!(!is_printable('\u{0}'));
        assert!(!is_printable('\u{7f}'));
        assert!(!is_printable(BOM));
    }

    #[test]
    fn test_is_flow_indicator() {
        for c in [',', '[', ']', '{', '}'] {
            assert!(is_flow_indicator(c));
        }
        assert!(!is_flow_indicator(':'));
    }

    // ==================== break_width tests ====================

    #[test]
    fn test_break_width_lf() {
        assert_eq!(break_width(b"\nx"), 1);
    }

    #[test]
    fn test_break_width_crlf_is_one_break() {
        assert_eq!(break_width(b"\r\nx"), 2);
    }

    #[test]
    fn test_break_width_cr_alone() {
        assert_eq!(break_width(b"\rx"), 1);
    }

    #[test]
    fn test_break_width_nel() {
        assert_eq!(break_width("\u{85}x".as_bytes()), 2);
    }

    #[test]
    fn test_break_width_not_a_break() {
        assert_eq!(break_width(b"x"), 0);
        assert_eq!(break_width(b""), 0);
    }

    #[test]
    fn test_hex_value() {
        assert_eq!(hex_value('0'), 0);
        assert_eq!(hex_value('9'), 9);
        assert_eq!(hex_value('a'), 10);
        assert_eq!(hex_value('F'), 15);
    }
}
