//! Iterators for [`AhoCorasick`].

use core::str::{CharIndices, Utf8Chunks};

use crate::automaton::{next_state_id, AhoCorasick, ROOT_STATE_ID};
use crate::Match;

/// Iterator decoding a byte string into code points, each paired with the byte
/// offset where it ends.
///
/// Invalid UTF-8 is decoded lossily: every byte that does not belong to a valid
/// sequence becomes its own `U+FFFD` one byte wide, and decoding continues after it.
pub struct CharWithEndOffsetIterator<'h> {
    chunks: Utf8Chunks<'h>,
    valid: CharIndices<'h>,
    valid_offset: usize,
    // Invalid bytes of the current chunk not yet reported.
    num_invalid: usize,
    offset: usize,
}

impl<'h> CharWithEndOffsetIterator<'h> {
    /// Creates a new iterator.
    pub fn new(haystack: &'h [u8]) -> Self {
        Self {
            chunks: haystack.utf8_chunks(),
            valid: "".char_indices(),
            valid_offset: 0,
            num_invalid: 0,
            offset: 0,
        }
    }
}

impl<'h> Iterator for CharWithEndOffsetIterator<'h> {
    type Item = (usize, char);

    #[inline(always)]
    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((i, c)) = self.valid.next() {
                return Some((self.valid_offset + i + c.len_utf8(), c));
            }
            if self.num_invalid != 0 {
                self.num_invalid -= 1;
                self.offset += 1;
                return Some((self.offset, char::REPLACEMENT_CHARACTER));
            }
            let chunk = self.chunks.next()?;
            self.valid_offset = self.offset;
            self.valid = chunk.valid().char_indices();
            self.offset += chunk.valid().len();
            self.num_invalid = chunk.invalid().len();
        }
    }
}

/// Iterator created by [`AhoCorasick::find_overlapping_iter()`].
pub struct FindOverlappingIterator<'a, 'h> {
    pub(crate) pma: &'a AhoCorasick,
    pub(crate) haystack: CharWithEndOffsetIterator<'h>,
    pub(crate) state_id: usize,
    // Next state to report at the current position, walked along suffix links.
    pub(crate) pending: Option<usize>,
    pub(crate) end: usize,
    pub(crate) num_chars: usize,
    // Ring buffer of the starting offsets of the last characters read.
    pub(crate) starts: Vec<usize>,
}

impl<'a, 'h> FindOverlappingIterator<'a, 'h> {
    pub(crate) fn new(pma: &'a AhoCorasick, haystack: &'h [u8]) -> Self {
        Self {
            pma,
            haystack: CharWithEndOffsetIterator::new(haystack),
            state_id: ROOT_STATE_ID,
            pending: None,
            end: 0,
            num_chars: 0,
            starts: vec![0; pma.max_pattern_len.max(1)],
        }
    }
}

impl<'a, 'h> Iterator for FindOverlappingIterator<'a, 'h> {
    type Item = Match;

    #[inline(always)]
    fn next(&mut self) -> Option<Self::Item> {
        loop {
            while let Some(state_id) = self.pending {
                let state = &self.pma.states[state_id];
                self.pending = state.suffix;
                if let Some(pattern) = state.output {
                    // The pattern length never exceeds the ring length nor the number of
                    // characters read, since the pattern ends at the current position.
                    let len = self.pma.pattern_lens[pattern];
                    let start = self.starts[(self.num_chars - len) % self.starts.len()];
                    return Some(Match {
                        start,
                        end: self.end,
                        pattern,
                    });
                }
            }
            let (end, c) = self.haystack.next()?;
            let ring_len = self.starts.len();
            self.starts[self.num_chars % ring_len] = self.end;
            self.num_chars += 1;
            self.end = end;
            self.state_id = next_state_id(&self.pma.states, self.state_id, c);
            self.pending = Some(self.state_id);
        }
    }
}
