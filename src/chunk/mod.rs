//=====================================================
// File: chunk.rs
//=====================================================
// Author: ZobieLabs
// License: Duality Public License (DPL v1.0)
// Goal: Character, word, item and line addressing over value text
// Objective: Resolve (possibly nested) chunk descriptors to offsets, read the
//            text they denote, and splice replacement text back in with
//            before/after/into semantics
//=====================================================

use std::ops::Range;

use rand::Rng;

use crate::ast::{ChunkType, Ordinal, Preposition};
use crate::interpreter::errors::{HtError, HtResult};

/// A chunk position after its index expression has been evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Index {
    At(i64),
    Ordinal(Ordinal),
}

/// A chunk whose index expressions are already values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedChunk {
    pub kind: ChunkType,
    pub start: Index,
    pub end: Option<Index>,
    pub within: Option<Box<ResolvedChunk>>,
}

impl ResolvedChunk {
    pub fn single(kind: ChunkType, index: i64) -> Self {
        Self {
            kind,
            start: Index::At(index),
            end: None,
            within: None,
        }
    }

    pub fn range(kind: ChunkType, start: i64, end: i64) -> Self {
        Self {
            end: Some(Index::At(end)),
            ..Self::single(kind, start)
        }
    }

    pub fn of(mut self, within: ResolvedChunk) -> Self {
        self.within = Some(Box::new(within));
        self
    }

    /// The chunk type that governs splicing: the one applied directly to the
    /// container text.
    pub fn mutated_type(&self) -> ChunkType {
        match &self.within {
            Some(within) => within.mutated_type(),
            None => self.kind,
        }
    }

    /// Draws every `any` index against `text` once, so a read followed by a
    /// write through the same chunk addresses the same place.
    pub fn pin(&self, text: &str, item_delimiter: &str) -> ResolvedChunk {
        let within = self
            .within
            .as_ref()
            .map(|within| Box::new(within.pin(text, item_delimiter)));
        let scope = match &within {
            Some(within) => get_chunk(text, within, item_delimiter),
            None => text.to_string(),
        };
        let count = count_chunks(&scope, self.kind, item_delimiter);
        let fix = |index: Index| match index {
            Index::Ordinal(Ordinal::Any) => Index::At(ordinal_position(Ordinal::Any, count).max(1)),
            other => other,
        };
        ResolvedChunk {
            kind: self.kind,
            start: fix(self.start),
            end: self.end.map(fix),
            within,
        }
    }

    fn flat(&self) -> ResolvedChunk {
        ResolvedChunk {
            kind: self.kind,
            start: self.start,
            end: self.end,
            within: None,
        }
    }
}

//=====================================================
// Section 1.0 - Segmentation
//=====================================================

/// Byte ranges of every chunk of `kind` in `text`. For items and lines the
/// list always includes the (possibly empty) segment after the last
/// delimiter, so writes can address it.
fn segments(text: &str, kind: ChunkType, item_delimiter: &str) -> Vec<Range<usize>> {
    match kind {
        ChunkType::Char => text
            .char_indices()
            .map(|(offset, ch)| offset..offset + ch.len_utf8())
            .collect(),
        ChunkType::Word => word_segments(text),
        ChunkType::Item => delimited_segments(text, item_delimiter),
        ChunkType::Line => delimited_segments(text, "\n")
            .into_iter()
            .map(|range| {
                if text[range.clone()].ends_with('\r') {
                    range.start..range.end - 1
                } else {
                    range
                }
            })
            .collect(),
    }
}

fn word_segments(text: &str) -> Vec<Range<usize>> {
    let mut words = Vec::new();
    let mut start = None;
    for (offset, ch) in text.char_indices() {
        match (ch.is_whitespace(), start) {
            (true, Some(begin)) => {
                words.push(begin..offset);
                start = None;
            }
            (false, None) => start = Some(offset),
            _ => {}
        }
    }
    if let Some(begin) = start {
        words.push(begin..text.len());
    }
    words
}

fn delimited_segments(text: &str, delimiter: &str) -> Vec<Range<usize>> {
    if delimiter.is_empty() {
        return vec![0..text.len()];
    }
    let mut ranges = Vec::new();
    let mut begin = 0;
    for (offset, _) in text.match_indices(delimiter) {
        ranges.push(begin..offset);
        begin = offset + delimiter.len();
    }
    ranges.push(begin..text.len());
    ranges
}

/// Number of addressable chunks. A trailing delimiter does not start a new
/// chunk, and the empty string has no items or lines.
fn counted(segments: &[Range<usize>], kind: ChunkType) -> usize {
    match kind {
        ChunkType::Item | ChunkType::Line => match segments.last() {
            Some(last) if last.is_empty() => segments.len() - 1,
            _ => segments.len(),
        },
        ChunkType::Char | ChunkType::Word => segments.len(),
    }
}

pub fn count_chunks(text: &str, kind: ChunkType, item_delimiter: &str) -> usize {
    counted(&segments(text, kind, item_delimiter), kind)
}

pub(crate) fn ordinal_position(ordinal: Ordinal, count: usize) -> i64 {
    let count = count as i64;
    match ordinal {
        Ordinal::Last => count,
        Ordinal::Middle => count / 2 + 1,
        Ordinal::Any if count > 0 => rand::thread_rng().gen_range(1..=count),
        Ordinal::Any => 0,
    }
}

fn position(index: Index, count: usize) -> i64 {
    match index {
        Index::At(n) => n,
        Index::Ordinal(ordinal) => ordinal_position(ordinal, count),
    }
}

//=====================================================
// Section 2.0 - Reading
//=====================================================

/// Byte range of `chunk` within `text`. An out-of-range chunk yields an
/// empty range at the end of the text; reads never fail.
pub fn chunk_range(text: &str, chunk: &ResolvedChunk, item_delimiter: &str) -> Range<usize> {
    let (base, scope) = match &chunk.within {
        Some(within) => {
            let outer = chunk_range(text, within, item_delimiter);
            (outer.start, &text[outer])
        }
        None => (0, text),
    };
    let local = flat_range(scope, chunk, item_delimiter);
    base + local.start..base + local.end
}

fn flat_range(text: &str, chunk: &ResolvedChunk, item_delimiter: &str) -> Range<usize> {
    let all = segments(text, chunk.kind, item_delimiter);
    let count = counted(&all, chunk.kind);
    let nowhere = text.len()..text.len();
    if count == 0 {
        return nowhere;
    }
    let start = position(chunk.start, count);
    let (first, last) = match chunk.end {
        None if start < 1 || start > count as i64 => return nowhere,
        None => (start, start),
        Some(end) => {
            let first = start.max(1);
            let last = position(end, count).min(count as i64);
            if first > last {
                return nowhere;
            }
            (first, last)
        }
    };
    all[first as usize - 1].start..all[last as usize - 1].end
}

pub fn get_chunk(text: &str, chunk: &ResolvedChunk, item_delimiter: &str) -> String {
    text[chunk_range(text, chunk, item_delimiter)].to_string()
}

//=====================================================
// Section 3.0 - Writing
//=====================================================

/// Returns `text` with `replacement` spliced at `chunk`. Nested chunks are
/// written innermost first and then put back into their enclosing chunk, so
/// the enclosing chunk's delimiter rules decide how the container grows.
pub fn put_chunk(
    text: &str,
    chunk: &ResolvedChunk,
    preposition: Preposition,
    replacement: &str,
    item_delimiter: &str,
) -> HtResult<String> {
    match &chunk.within {
        Some(within) => {
            let current = get_chunk(text, within, item_delimiter);
            let updated = put_flat(
                &current,
                &chunk.flat(),
                preposition,
                replacement,
                item_delimiter,
            )?;
            put_chunk(text, within, Preposition::Into, &updated, item_delimiter)
        }
        None => put_flat(text, chunk, preposition, replacement, item_delimiter),
    }
}

fn put_flat(
    text: &str,
    chunk: &ResolvedChunk,
    preposition: Preposition,
    replacement: &str,
    item_delimiter: &str,
) -> HtResult<String> {
    let all = segments(text, chunk.kind, item_delimiter);
    let count = counted(&all, chunk.kind);
    let requested = position(chunk.start, count.max(1));
    if requested < 1 && chunk.end.is_none() {
        if replacement.is_empty() {
            return Ok(text.to_string());
        }
        return Err(HtError::ChunkRange(format!(
            "Can't put into {} {requested}.",
            kind_name(chunk.kind)
        )));
    }
    let start = requested.max(1);

    if start as usize > all.len() {
        if replacement.is_empty() {
            return Ok(text.to_string());
        }
        return Ok(extend(
            text,
            chunk.kind,
            start as usize - all.len(),
            replacement,
            item_delimiter,
        ));
    }

    let first = &all[start as usize - 1];
    let last = match chunk.end {
        Some(end) => position(end, count).min(count as i64),
        None => start,
    };
    if last < start {
        // A reversed range reads as empty.
        if replacement.is_empty() {
            return Ok(text.to_string());
        }
        let mut output = String::with_capacity(text.len() + replacement.len());
        output.push_str(&text[..first.start]);
        output.push_str(replacement);
        output.push_str(&text[first.start..]);
        return Ok(output);
    }
    let final_segment = &all[last as usize - 1];
    let (splice_start, splice_end) = match preposition {
        Preposition::Into => (first.start, final_segment.end),
        Preposition::Before => (first.start, first.start),
        Preposition::After => (final_segment.end, final_segment.end),
    };
    let mut output = String::with_capacity(text.len() + replacement.len());
    output.push_str(&text[..splice_start]);
    output.push_str(replacement);
    output.push_str(&text[splice_end..]);
    Ok(output)
}

pub fn kind_name(kind: ChunkType) -> &'static str {
    match kind {
        ChunkType::Char => "char",
        ChunkType::Word => "word",
        ChunkType::Item => "item",
        ChunkType::Line => "line",
    }
}

/// Appends a chunk `missing` positions past the last existing one.
fn extend(
    text: &str,
    kind: ChunkType,
    missing: usize,
    replacement: &str,
    item_delimiter: &str,
) -> String {
    let mut output = text.to_string();
    match kind {
        ChunkType::Item => output.push_str(&item_delimiter.repeat(missing)),
        ChunkType::Line => output.push_str(&"\n".repeat(missing)),
        ChunkType::Word => {
            if !output.is_empty() && !output.ends_with(char::is_whitespace) {
                output.push(' ');
            }
        }
        ChunkType::Char => {}
    }
    output.push_str(replacement);
    output
}


//=====================================================
// End of file
//=====================================================
