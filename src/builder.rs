use std::collections::VecDeque;
use std::sync::atomic::AtomicU64;

use crate::automaton::{AhoCorasick, State, ROOT_STATE_ID};
use crate::iter::CharWithEndOffsetIterator;
use crate::pool::ScratchPool;

// The default number of idle scratch tables retained per automaton.
const DEFAULT_POOL_CAPACITY: usize = 64;

/// Builder for [`AhoCorasick`].
#[derive(Clone, Copy, Debug)]
pub struct AhoCorasickBuilder {
    pool_capacity: usize,
}

impl Default for AhoCorasickBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AhoCorasickBuilder {
    /// Creates a new [`AhoCorasickBuilder`].
    ///
    /// # Examples
    ///
    /// ```
    /// use runecorasick::AhoCorasickBuilder;
    ///
    /// let patterns = vec!["全世界", "世界", "に"];
    ///
    /// let builder = AhoCorasickBuilder::new();
    /// let mut pma = builder.build(patterns);
    ///
    /// assert_eq!(vec![0, 1, 2], pma.find_all("全世界中に"));
    /// ```
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pool_capacity: DEFAULT_POOL_CAPACITY,
        }
    }

    /// Specifies the maximum number of idle tables kept for
    /// [`AhoCorasick::find_all_thread_safe`].
    ///
    /// A search borrows a table from the pool and returns it when done. When the pool is
    /// empty a new table is allocated, and a returned table is dropped when the pool is full.
    /// Results never depend on this value.
    ///
    /// # Arguments
    ///
    /// * `n` - The number of tables. `0` disables reuse.
    #[must_use]
    pub const fn pool_capacity(mut self, n: usize) -> Self {
        self.pool_capacity = n;
        self
    }

    /// Builds and returns a new [`AhoCorasick`] from input patterns.
    /// The index `i` is reported for `patterns[i]`.
    ///
    /// Patterns are decoded as UTF-8 in the same way as haystacks. Empty patterns are kept
    /// in the numbering but never match. When identical patterns are given, the last index
    /// wins.
    ///
    /// # Arguments
    ///
    /// * `patterns` - List of patterns.
    ///
    /// # Examples
    ///
    /// ```
    /// use runecorasick::AhoCorasickBuilder;
    ///
    /// let patterns = vec!["", "ab", "b", "ab"];
    /// let mut pma = AhoCorasickBuilder::new().pool_capacity(4).build(patterns);
    ///
    /// assert_eq!(vec![3, 2], pma.find_all("abc"));
    /// ```
    pub fn build<I, P>(self, patterns: I) -> AhoCorasick
    where
        I: IntoIterator<Item = P>,
        P: AsRef<[u8]>,
    {
        let patterns: Vec<P> = patterns.into_iter().collect();

        // Each character needs at most one state besides the root.
        let num_chars: usize = patterns
            .iter()
            .map(|p| CharWithEndOffsetIterator::new(p.as_ref()).count())
            .sum();
        let mut states = Vec::with_capacity(num_chars + 1);
        states.push(State::default()); // root

        let mut pattern_lens = Vec::with_capacity(patterns.len());
        let mut num_empty_patterns = 0;
        for (i, pattern) in patterns.iter().enumerate() {
            let len = Self::add(&mut states, pattern.as_ref(), i);
            if len == 0 {
                num_empty_patterns += 1;
            }
            pattern_lens.push(len);
        }

        Self::build_fails(&mut states);
        states.shrink_to_fit();

        tracing::debug!(
            num_patterns = pattern_lens.len(),
            num_empty_patterns,
            num_states = states.len(),
            "built automaton"
        );

        AhoCorasick {
            marks: vec![0; states.len()],
            max_pattern_len: pattern_lens.iter().copied().max().unwrap_or(0),
            pool: ScratchPool::new(pattern_lens.len(), self.pool_capacity),
            generation: AtomicU64::new(0),
            states,
            pattern_lens,
        }
    }

    /// Inserts a pattern into the trie and returns its length in characters.
    #[inline(always)]
    fn add(states: &mut Vec<State>, pattern: &[u8], index: usize) -> usize {
        let mut state_id = ROOT_STATE_ID;
        let mut len = 0;
        for (_, c) in CharWithEndOffsetIterator::new(pattern) {
            state_id = if let Some(&child_id) = states[state_id].edges.get(&c) {
                child_id
            } else {
                let child_id = states.len();
                states[state_id].edges.insert(c, child_id);
                states.push(State::default());
                child_id
            };
            len += 1;
        }
        // The root never outputs, so an empty pattern is never reported.
        if state_id != ROOT_STATE_ID {
            states[state_id].output = Some(index);
        }
        len
    }

    /// Resolves failure and suffix links in breadth-first order, so that the links of a state
    /// are always set before those of its children.
    fn build_fails(states: &mut [State]) {
        // Children of the root keep the default fail (root) and suffix (none).
        let mut queue: VecDeque<usize> = states[ROOT_STATE_ID].edges.values().copied().collect();
        let mut edges = vec![];

        while let Some(state_id) = queue.pop_front() {
            edges.clear();
            edges.extend(states[state_id].edges.iter().map(|(&c, &id)| (c, id)));

            for &(c, child_id) in &edges {
                let mut fail_id = states[state_id].fail;
                let new_fail_id = loop {
                    if let Some(&child_fail_id) = states[fail_id].edges.get(&c) {
                        break child_fail_id;
                    }
                    if fail_id == ROOT_STATE_ID {
                        break ROOT_STATE_ID;
                    }
                    fail_id = states[fail_id].fail;
                };

                let fail_state = &states[new_fail_id];
                let suffix = if fail_state.output.is_some() {
                    Some(new_fail_id)
                } else {
                    fail_state.suffix
                };

                let child = &mut states[child_id];
                child.fail = new_fail_id;
                child.suffix = suffix;
                queue.push_back(child_id);
            }
        }
    }
}
