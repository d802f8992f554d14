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

//! Input backing storage.
//!
//! An [`Input`] owns the bytes a parse works over: an owned buffer, a
//! memory-mapped file region, or an append-only list of streamed chunks.
//! Inputs are shared via `Rc`; atoms hold references to the segments they
//! cover, so the bytes behind any produced atom stay alive and immutable
//! for as long as the atom does.
//!
//! Offsets are absolute byte positions in the logical stream. A lazily
//! built line-break table maps any offset to a [`Mark`] in amortised
//! constant time.

use crate::error::{YamlError, YamlResult};
use crate::mark::Mark;
use crate::utf8;
use std::cell::RefCell;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Where an input's bytes came from. Used in diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    /// An in-memory buffer.
    Memory,
    /// A file, read or mapped.
    File(PathBuf),
    /// A streamed sequence of chunks.
    Stream,
}

impl Origin {
    /// The name used in diagnostic output.
    pub fn name(&self) -> String {
        match self {
            Self::Memory => "<memory>".to_string(),
            Self::File(path) => path.display().to_string(),
            Self::Stream => "<stream>".to_string(),
        }
    }
}

/// Backing storage of one contiguous segment.
#[derive(Debug)]
pub(crate) enum Backing {
    /// Owned bytes (also used for each streamed chunk).
    Bytes(Box<[u8]>),
    /// Bytes shared with the caller, no copy.
    Shared(Rc<[u8]>),
    /// A memory-mapped file region.
    Mapped(memmap2::Mmap),
}

impl Backing {
    #[inline]
    pub(crate) fn bytes(&self) -> &[u8] {
        match self {
            Self::Bytes(b) => b,
            Self::Shared(b) => b,
            Self::Mapped(m) => m,
        }
    }
}

/// A contiguous segment of the logical stream.
#[derive(Debug, Clone)]
pub(crate) struct Segment {
    pub(crate) data: Rc<Backing>,
    /// Absolute offset of the segment's first byte.
    pub(crate) start: usize,
}

impl Segment {
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.data.bytes().len()
    }

    #[inline]
    pub(crate) fn end(&self) -> usize {
        self.start + self.len()
    }
}

/// A zero-copy reference to a byte range within one segment.
#[derive(Debug, Clone)]
pub(crate) struct Slice {
    pub(crate) data: Rc<Backing>,
    /// Range within the segment's data.
    pub(crate) start: usize,
    pub(crate) end: usize,
}

impl Slice {
    #[inline]
    pub(crate) fn bytes(&self) -> &[u8] {
        &self.data.bytes()[self.start..self.end]
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.end - self.start
    }
}

/// Result of reading one codepoint from an input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CharRead {
    /// A codepoint and its byte width.
    Char(char, usize),
    /// Offset is at or past the committed end.
    End,
    /// A multi-byte sequence runs past the committed end of an unfinished
    /// stream; feeding more bytes may complete it.
    Truncated,
    /// The bytes are not valid UTF-8.
    Invalid,
}

#[derive(Debug, Default)]
struct LineTable {
    /// Absolute offsets of line starts; `starts[0] == 0` once initialised.
    starts: Vec<usize>,
    /// Bytes scanned for breaks so far.
    scanned: usize,
}

/// Shared, append-only input storage. See the module docs.
#[derive(Debug)]
pub struct Input {
    origin: Origin,
    segments: RefCell<Vec<Segment>>,
    len: RefCell<usize>,
    finished: RefCell<bool>,
    lines: RefCell<LineTable>,
}

impl Input {
    fn with_segment(origin: Origin, backing: Backing) -> Rc<Self> {
        let len = backing.bytes().len();
        Rc::new(Self {
            origin,
            segments: RefCell::new(vec![Segment {
                data: Rc::new(backing),
                start: 0,
            }]),
            len: RefCell::new(len),
            finished: RefCell::new(true),
            lines: RefCell::new(LineTable::default()),
        })
    }

    /// Create an input by copying a byte buffer.
    pub fn from_bytes(bytes: Vec<u8>) -> Rc<Self> {
        Self::with_segment(Origin::Memory, Backing::Bytes(bytes.into_boxed_slice()))
    }

    /// Create an input over a string.
    pub fn from_str(text: &str) -> Rc<Self> {
        Self::from_bytes(text.as_bytes().to_vec())
    }

    /// Create an input over shared bytes without copying.
    pub fn from_shared(bytes: Rc<[u8]>) -> Rc<Self> {
        Self::with_segment(Origin::Memory, Backing::Shared(bytes))
    }

    /// Open a file, memory-mapping it when `use_mmap` is set and falling
    /// back to a buffered read otherwise (or when mapping fails).
    pub fn open_path(path: &Path, use_mmap: bool) -> YamlResult<Rc<Self>> {
        let origin = Origin::File(path.to_path_buf());
        if use_mmap {
            let file = fs::File::open(path)?;
            // SAFETY: the mapping is read-only and the documented input
            // contract requires the file not to be truncated while any
            // atom referencing it is alive (same contract as the region
            // staying valid for the input's lifetime).
            #[allow(unsafe_code)]
            let mapped = unsafe { memmap2::Mmap::map(&file) };
            if let Ok(map) = mapped {
                return Ok(Self::with_segment(origin, Backing::Mapped(map)));
            }
            // Fall through to a buffered read on mapping failure.
        }
        let mut file = fs::File::open(path)?;
        let mut buf = Vec::new();
        file.read_to_end(&mut buf)?;
        Ok(Self::with_segment(origin, Backing::Bytes(buf.into_boxed_slice())))
    }

    /// Create an empty, unfinished streamed input. Feed it with
    /// [`push_chunk`](Self::push_chunk) and seal it with
    /// [`finish`](Self::finish).
    pub fn stream() -> Rc<Self> {
        Rc::new(Self {
            origin: Origin::Stream,
            segments: RefCell::new(Vec::new()),
            len: RefCell::new(0),
            finished: RefCell::new(false),
            lines: RefCell::new(LineTable::default()),
        })
    }

    /// Append a chunk to a streamed input. The bytes are committed: every
    /// offset below the new length stays valid forever.
    pub fn push_chunk(&self, chunk: &[u8]) -> YamlResult<()> {
        if *self.finished.borrow() {
            return Err(YamlError::api("push_chunk on a finished input"));
        }
        if chunk.is_empty() {
            return Ok(());
        }
        let start = *self.len.borrow();
        self.segments.borrow_mut().push(Segment {
            data: Rc::new(Backing::Bytes(chunk.to_vec().into_boxed_slice())),
            start,
        });
        *self.len.borrow_mut() = start + chunk.len();
        Ok(())
    }

    /// Mark a streamed input as complete.
    pub fn finish(&self) {
        *self.finished.borrow_mut() = true;
    }

    /// Total committed bytes.
    pub fn len(&self) -> usize {
        *self.len.borrow()
    }

    /// True if no bytes have been committed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True once no more bytes will arrive.
    pub fn is_finished(&self) -> bool {
        *self.finished.borrow()
    }

    /// Origin metadata.
    pub fn origin(&self) -> Origin {
        self.origin.clone()
    }

    /// Diagnostic name of this input.
    pub fn name(&self) -> String {
        self.origin.name()
    }

    /// The segment containing `offset`, if committed.
    pub(crate) fn segment_at(&self, offset: usize) -> Option<Segment> {
        let segments = self.segments.borrow();
        let idx = match segments.binary_search_by(|s| {
            if offset < s.start {
                std::cmp::Ordering::Greater
            } else if offset >= s.end() {
                std::cmp::Ordering::Less
            } else {
                std::cmp::Ordering::Equal
            }
        }) {
            Ok(idx) => idx,
            Err(_) => return None,
        };
        Some(segments[idx].clone())
    }

    /// One byte of the committed stream.
    pub fn byte_at(&self, offset: usize) -> Option<u8> {
        let seg = self.segment_at(offset)?;
        Some(seg.data.bytes()[offset - seg.start])
    }

    /// Read one codepoint at `offset`, assembling bytes across segment
    /// boundaries when a chunk split a sequence.
    pub(crate) fn char_at(&self, offset: usize) -> CharRead {
        let len = self.len();
        if offset >= len {
            return CharRead::End;
        }
        // Fast path: whole sequence within one segment.
        if let Some(seg) = self.segment_at(offset) {
            let local = offset - seg.start;
            let bytes = &seg.data.bytes()[local..];
            let width = utf8::utf8_width(bytes[0]);
            if width == 0 {
                return CharRead::Invalid;
            }
            if bytes.len() >= width {
                return match utf8::decode(&bytes[..width]) {
                    Some((c, w)) => CharRead::Char(c, w),
                    None => CharRead::Invalid,
                };
            }
            // Slow path: assemble up to 4 bytes across segments.
            let avail = len - offset;
            if avail < width {
                return if self.is_finished() {
                    CharRead::Invalid
                } else {
                    CharRead::Truncated
                };
            }
            let mut buf = [0u8; 4];
            for (i, slot) in buf.iter_mut().enumerate().take(width) {
                match self.byte_at(offset + i) {
                    Some(b) => *slot = b,
                    None => return CharRead::Invalid,
                }
            }
            return match utf8::decode(&buf[..width]) {
                Some((c, w)) => CharRead::Char(c, w),
                None => CharRead::Invalid,
            };
        }
        CharRead::End
    }

    /// Zero-copy slices covering `start..end`. More than one slice is
    /// returned only when the range spans streamed chunks.
    pub(crate) fn slices(&self, start: usize, end: usize) -> Vec<Slice> {
        debug_assert!(start <= end && end <= self.len());
        let mut out = Vec::new();
        let mut offset = start;
        while offset < end {
            let seg = match self.segment_at(offset) {
                Some(seg) => seg,
                None => break,
            };
            let local_start = offset - seg.start;
            let local_end = (end - seg.start).min(seg.len());
            out.push(Slice {
                data: Rc::clone(&seg.data),
                start: local_start,
                end: local_end,
            });
            offset = seg.start + local_end;
        }
        out
    }

    /// Copy a byte range out of the committed stream.
    pub fn bytes_to_vec(&self, start: usize, end: usize) -> Option<Vec<u8>> {
        if end > self.len() || start > end {
            return None;
        }
        let mut out = Vec::with_capacity(end - start);
        for slice in self.slices(start, end) {
            out.extend_from_slice(slice.bytes());
        }
        Some(out)
    }

    fn ensure_lines_scanned(&self, upto: usize) {
        let len = self.len();
        let target = upto.min(len);
        let mut lines = self.lines.borrow_mut();
        if lines.starts.is_empty() {
            lines.starts.push(0);
        }
        while lines.scanned < target {
            let offset = lines.scanned;
            match self.char_at(offset) {
                CharRead::Char('\r', _) => {
                    let width = if self.byte_at(offset + 1) == Some(b'\n') {
                        2
                    } else {
                        1
                    };
                    lines.scanned = offset + width;
                    let next = lines.scanned;
                    lines.starts.push(next);
                }
                CharRead::Char(c, w) if utf8::is_break(c) => {
                    lines.scanned = offset + w;
                    let next = lines.scanned;
                    lines.starts.push(next);
                }
                CharRead::Char(_, w) => {
                    lines.scanned = offset + w;
                }
                // Invalid bytes terminate the scan; the scanner reports
                // the encoding error with its own mark.
                _ => {
                    lines.scanned = offset + 1;
                }
            }
        }
    }

    /// Map an absolute offset to a [`Mark`]. Amortised O(1): the line
    /// table is extended once, and columns are counted within one line.
    pub fn mark(&self, offset: usize) -> Mark {
        self.ensure_lines_scanned(offset);
        let lines = self.lines.borrow();
        let line = match lines.starts.binary_search(&offset) {
            Ok(idx) => idx,
            Err(idx) => idx.saturating_sub(1),
        };
        let line_start = lines.starts.get(line).copied().unwrap_or(0);
        drop(lines);
        let mut column = 0;
        let mut pos = line_start;
        while pos < offset {
            match self.char_at(pos) {
                CharRead::Char(_, w) => {
                    pos += w;
                    column += 1;
                }
                _ => {
                    pos += 1;
                    column += 1;
                }
            }
        }
        Mark::new(offset, line, column)
    }

    /// The text of a 0-based line, without its trailing break. Used for
    /// diagnostic snippets.
    pub fn line_text(&self, line: usize) -> Option<String> {
        self.ensure_lines_scanned(self.len());
        let lines = self.lines.borrow();
        let start = *lines.starts.get(line)?;
        drop(lines);
        let mut out = String::new();
        let mut pos = start;
        loop {
            match self.char_at(pos) {
                CharRead::Char(c, _) if utf8::is_break(c) => break,
                CharRead::Char(c, w) => {
                    out.push(c);
                    pos += w;
                }
                _ => break,
            }
        }
        Some(out)
    }
}
