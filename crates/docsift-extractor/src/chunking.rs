//! Paragraph-aware chunking for documents over the single-call budget
//!
//! Paragraphs end after a blank-line separator (a whitespace run holding at
//! least one empty line), so joining the paragraphs gives back the input.
//! Paragraphs are packed greedily; each new chunk starts with the tail of the
//! previous one. A paragraph that does not fit in a chunk behind that tail is
//! cut into fixed windows that overlap by the same amount.
//!
//! Every size here is a count of Unicode scalar values.

use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use crate::types::Chunk;
use regex::Regex;
use std::ops::Range;
use tracing::debug;

/// Whether `text` is long enough to need chunked extraction
pub fn should_chunk(text: &str, threshold: usize) -> bool {
    text.chars().count() > threshold
}

/// Splits text into overlapping chunks no longer than `max_chunk_size`
#[derive(Debug, Clone)]
pub struct TextChunker {
    max_chunk_size: usize,
    overlap: usize,
    paragraph_break: Regex,
}

#[derive(Debug, Clone, Copy)]
struct Span {
    start: usize,
    end: usize,
    overlap: usize,
}

impl Span {
    fn len(&self) -> usize {
        self.end - self.start
    }
}

impl TextChunker {
    /// Create a new text chunker
    pub fn new(max_chunk_size: usize, overlap: usize) -> Result<Self, ExtractorError> {
        if max_chunk_size == 0 {
            return Err(ExtractorError::Config(
                "max_chunk_size must be greater than 0".to_string(),
            ));
        }
        if overlap >= max_chunk_size {
            return Err(ExtractorError::Config(format!(
                "overlap ({}) must be smaller than max_chunk_size ({})",
                overlap, max_chunk_size
            )));
        }
        let paragraph_break = Regex::new(r"\n\s*\n")
            .map_err(|e| ExtractorError::Config(format!("paragraph regex: {}", e)))?;

        Ok(Self {
            max_chunk_size,
            overlap,
            paragraph_break,
        })
    }

    /// Create a chunker from extractor settings
    pub fn from_config(config: &ExtractorConfig) -> Result<Self, ExtractorError> {
        Self::new(config.max_chunk_size, config.chunk_overlap)
    }

    /// Chunk the given text
    ///
    /// Empty text yields no chunks.
    pub fn chunk(&self, text: &str) -> Vec<Chunk> {
        if text.is_empty() {
            return Vec::new();
        }

        let mut spans: Vec<Span> = Vec::new();
        let mut current: Option<Span> = None;

        for para in self.paragraphs(text) {
            let len = para.end - para.start;
            if let Some(cur) = current.as_mut() {
                if cur.len() + len <= self.max_chunk_size {
                    cur.end = para.end;
                    continue;
                }
            }
            if let Some(cur) = current.take() {
                spans.push(cur);
            }

            let seed = self.seed_len(spans.last());
            if seed + len > self.max_chunk_size {
                self.slice_windows(para, &mut spans);
            } else {
                current = Some(Span {
                    start: para.start - seed,
                    end: para.end,
                    overlap: seed,
                });
            }
        }
        if let Some(cur) = current {
            spans.push(cur);
        }

        let bounds: Vec<usize> = text
            .char_indices()
            .map(|(byte, _)| byte)
            .chain(std::iter::once(text.len()))
            .collect();
        let total = spans.len();

        debug!(
            chunks = total,
            sizes = ?spans.iter().map(Span::len).collect::<Vec<_>>(),
            "Document split into chunks"
        );

        spans
            .into_iter()
            .enumerate()
            .map(|(index, span)| Chunk {
                index,
                total,
                text: text[bounds[span.start]..bounds[span.end]].to_string(),
                start: span.start,
                end: span.end,
                overlap: span.overlap,
            })
            .collect()
    }

    /// Paragraph ranges in character offsets, separators kept on the left
    fn paragraphs(&self, text: &str) -> Vec<Range<usize>> {
        let mut ranges = Vec::new();
        let mut char_pos = 0;
        let mut byte_pos = 0;

        for sep in self.paragraph_break.find_iter(text) {
            let len = text[byte_pos..sep.end()].chars().count();
            ranges.push(char_pos..char_pos + len);
            char_pos += len;
            byte_pos = sep.end();
        }
        if byte_pos < text.len() {
            let len = text[byte_pos..].chars().count();
            ranges.push(char_pos..char_pos + len);
        }
        ranges
    }

    /// Fixed windows over one oversized paragraph
    fn slice_windows(&self, para: Range<usize>, spans: &mut Vec<Span>) {
        let seed = self.seed_len(spans.last());
        let mut start = para.start - seed;
        let mut overlap = seed;
        loop {
            let end = (start + self.max_chunk_size).min(para.end);
            spans.push(Span {
                start,
                end,
                overlap,
            });
            if end == para.end {
                break;
            }
            start = end - self.overlap;
            overlap = self.overlap;
        }
    }

    /// How much of the previous chunk's tail starts the next chunk
    fn seed_len(&self, previous: Option<&Span>) -> usize {
        previous.map_or(0, |prev| self.overlap.min(prev.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn reconstruct(chunks: &[Chunk]) -> String {
        chunks.iter().map(Chunk::fresh_text).collect()
    }

    #[test]
    fn test_should_chunk_counts_chars() {
        assert!(!should_chunk("abc", 3));
        assert!(should_chunk("abcd", 3));
        // 4 chars, 8 bytes
        assert!(!should_chunk("éééé", 4));
    }

    #[test]
    fn test_empty_text_has_no_chunks() {
        let chunker = TextChunker::new(10, 2).unwrap();
        assert!(chunker.chunk("").is_empty());
    }

    #[test]
    fn test_short_text_is_one_chunk() {
        let chunker = TextChunker::new(100, 10).unwrap();
        let chunks = chunker.chunk("one\n\ntwo");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "one\n\ntwo");
        assert_eq!(chunks[0].overlap, 0);
        assert_eq!(chunks[0].total, 1);
    }

    #[test]
    fn test_rejects_overlap_not_below_size() {
        assert!(TextChunker::new(10, 10).is_err());
        assert!(TextChunker::new(0, 0).is_err());
    }

    #[test]
    fn test_packs_paragraphs_with_overlap() {
        let chunker = TextChunker::new(12, 3).unwrap();
        // paragraphs: "aaaa\n\n" (6), "bbbb\n\n" (6), "cccc" (4)
        let chunks = chunker.chunk("aaaa\n\nbbbb\n\ncccc");
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].text, "aaaa\n\nbbbb\n\n");
        assert_eq!(chunks[1].text, "b\n\ncccc");
        assert_eq!(chunks[1].overlap, 3);
        assert_eq!(reconstruct(&chunks), "aaaa\n\nbbbb\n\ncccc");
    }

    #[test]
    fn test_separator_stays_with_preceding_paragraph() {
        let chunker = TextChunker::new(8, 0).unwrap();
        let chunks = chunker.chunk("abc\n  \n\ndef");
        assert_eq!(chunks[0].text, "abc\n  \n\n");
        assert_eq!(chunks[1].text, "def");
    }

    #[test]
    fn test_paragraph_too_big_for_overlap_is_windowed() {
        let chunker = TextChunker::new(10, 4).unwrap();
        // 8-char paragraph plus 4 chars of overlap exceeds the budget
        let chunks = chunker.chunk("aaaaa\n\nbbbbbbbb");
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[1].text, "aa\n\nbbbbbb");
        assert_eq!(chunks[1].overlap, 4);
        assert_eq!(chunks[2].text, "bbbbbb");
        assert_eq!(chunks[2].overlap, 4);
        assert!(chunks.iter().all(|c| c.char_len() <= 10));
    }

    #[test]
    fn test_paragraph_filling_budget_keeps_overlap() {
        let chunker = TextChunker::new(10, 4).unwrap();
        // second paragraph is exactly max_chunk_size chars
        let text = "aaaa\n\nbbbbbbbb\n\n";
        let chunks = chunker.chunk(text);

        assert_eq!(chunks[0].text, "aaaa\n\n");
        assert_eq!(chunks[1].text, "aa\n\nbbbbbb");
        assert!(chunks[1].text.starts_with("aa\n\n"));
        assert_eq!(chunks[1].overlap, 4);
        assert_eq!(chunks[2].text, "bbbbbb\n\n");
        assert_eq!(chunks[2].overlap, 4);
        assert_eq!(reconstruct(&chunks), text);
        assert!(chunks.iter().all(|c| c.char_len() <= 10));
    }

    #[test]
    fn test_no_paragraphs_uses_fixed_windows() {
        let chunker = TextChunker::new(10, 3).unwrap();
        let text: String = ('a'..='z').collect();
        let chunks = chunker.chunk(&text);

        let starts: Vec<usize> = chunks.iter().map(|c| c.start).collect();
        assert_eq!(starts, vec![0, 7, 14, 21]);
        assert_eq!(chunks[0].text, "abcdefghij");
        assert_eq!(chunks[1].text, "hijklmnopq");
        assert_eq!(chunks.last().unwrap().text, "vwxyz");
        assert_eq!(reconstruct(&chunks), text);
    }

    #[test]
    fn test_oversized_paragraph_does_not_block_packing() {
        let chunker = TextChunker::new(10, 2).unwrap();
        let big = "x".repeat(25);
        let text = format!("ab\n\n{}\n\ncd\n\nef", big);
        let chunks = chunker.chunk(&text);

        assert_eq!(chunks[0].text, "ab\n\n");
        // the final chunk packs both trailing paragraphs
        let last = chunks.last().unwrap();
        assert!(last.text.ends_with("cd\n\nef"));
        assert_eq!(last.overlap, 2);
        assert_eq!(reconstruct(&chunks), text);
        assert!(chunks.iter().all(|c| c.char_len() <= 10));
    }

    #[test]
    fn test_multibyte_offsets() {
        let chunker = TextChunker::new(4, 1).unwrap();
        let text = "αβγδεζηθ";
        let chunks = chunker.chunk(text);
        assert_eq!(chunks[0].text, "αβγδ");
        assert_eq!(chunks[1].text, "δεζη");
        assert_eq!(chunks[2].text, "ηθ");
        assert_eq!(reconstruct(&chunks), text);
    }

    proptest! {
        #[test]
        fn prop_chunks_reconstruct_text(
            text in "[a-cé \n]{0,300}",
            (max, overlap) in (2usize..60).prop_flat_map(|max| (Just(max), 0..max)),
        ) {
            let chunker = TextChunker::new(max, overlap).unwrap();
            let chunks = chunker.chunk(&text);
            prop_assert_eq!(reconstruct(&chunks), text.clone());
            prop_assert_eq!(chunks.is_empty(), text.is_empty());
        }

        #[test]
        fn prop_chunks_respect_budget_and_overlap(
            text in "[a-c \n]{1,300}",
            (max, overlap) in (2usize..60).prop_flat_map(|max| (Just(max), 0..max)),
        ) {
            let chunker = TextChunker::new(max, overlap).unwrap();
            let chunks = chunker.chunk(&text);
            let chars: Vec<char> = text.chars().collect();

            for chunk in &chunks {
                prop_assert!(chunk.char_len() <= max);
                prop_assert!(chunk.overlap <= overlap);
                let expected: String = chars[chunk.start..chunk.end].iter().collect();
                prop_assert_eq!(&chunk.text, &expected);
            }
            for pair in chunks.windows(2) {
                prop_assert_eq!(pair[1].overlap, overlap.min(pair[0].char_len()));
                prop_assert_eq!(pair[0].end, pair[1].start + pair[1].overlap);
                let tail: String = chars[pair[1].start..pair[0].end].iter().collect();
                prop_assert!(pair[1].text.starts_with(&tail));
            }
        }
    }
}
