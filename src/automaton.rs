use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::builder::AhoCorasickBuilder;
use crate::iter::{CharWithEndOffsetIterator, FindOverlappingIterator};
use crate::pool::ScratchPool;

// The root state id.
pub(crate) const ROOT_STATE_ID: usize = 0;

/// Mapping edge labels to child ids using `BTreeMap`.
///
/// An empty map does not allocate, so leaves carry no transition table.
pub(crate) type EdgeMap = BTreeMap<char, usize>;

/// State of [`AhoCorasick`].
#[derive(Clone, Debug, Default)]
pub(crate) struct State {
    pub(crate) edges: EdgeMap,
    pub(crate) fail: usize,
    // The nearest output state on the failure chain, excluding this state.
    pub(crate) suffix: Option<usize>,
    // The dictionary index of the pattern ending here.
    pub(crate) output: Option<usize>,
}

/// Multiple pattern match automaton implemented with the Aho-Corasick algorithm,
/// reading haystacks one code point at a time.
///
/// # Matching variants
///
/// - [`AhoCorasick::find_all`] collects every pattern found, reporting each output state
///   at most once per call. The per-state generation markers it uses live in the
///   automaton, so it takes `&mut self`.
/// - [`AhoCorasick::find_all_thread_safe`] returns the same result through `&self`, using a
///   call-local table borrowed from a pool instead of the shared markers.
/// - [`AhoCorasick::contains`] and [`AhoCorasick::find_first`] stop at the first hit.
///
/// Haystacks are any `AsRef<[u8]>`. Bytes are decoded as UTF-8, and each byte of an
/// invalid sequence is read as one `U+FFFD` without stopping the scan.
pub struct AhoCorasick {
    pub(crate) states: Vec<State>,
    // Pattern lengths in characters, indexed by dictionary index.
    pub(crate) pattern_lens: Vec<usize>,
    pub(crate) max_pattern_len: usize,
    // Generation markers of states used by find_all().
    pub(crate) marks: Vec<u64>,
    pub(crate) generation: AtomicU64,
    pub(crate) pool: ScratchPool,
}

impl Clone for AhoCorasick {
    fn clone(&self) -> Self {
        Self {
            states: self.states.clone(),
            pattern_lens: self.pattern_lens.clone(),
            max_pattern_len: self.max_pattern_len,
            marks: self.marks.clone(),
            generation: AtomicU64::new(self.generation.load(Ordering::Relaxed)),
            pool: self.pool.clone(),
        }
    }
}

impl AhoCorasick {
    /// Creates a new [`AhoCorasick`] from input patterns.
    /// The index `i` is reported for `patterns[i]`.
    ///
    /// Empty patterns never match. When identical patterns are given, the index of the last
    /// one is reported.
    ///
    /// # Arguments
    ///
    /// * `patterns` - List of patterns.
    ///
    /// # Examples
    ///
    /// ```
    /// use runecorasick::AhoCorasick;
    ///
    /// let patterns = vec!["全世界", "世界", "に", "世界"];
    /// let mut pma = AhoCorasick::new(patterns);
    ///
    /// assert_eq!(vec![0, 3, 2], pma.find_all("全世界中に"));
    /// ```
    pub fn new<I, P>(patterns: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<[u8]>,
    {
        AhoCorasickBuilder::new().build(patterns)
    }

    /// Returns the indices of the patterns found in the given haystack, in the order they are
    /// encountered.
    ///
    /// Each output state is reported at most once per call, so a pattern occurring several
    /// times is reported once.
    ///
    /// This variant marks visited states in the automaton itself, hence `&mut self`. Use
    /// [`AhoCorasick::find_all_thread_safe`] to search from several threads at once.
    ///
    /// # Arguments
    ///
    /// * `haystack` - String to search for.
    ///
    /// # Examples
    ///
    /// ```
    /// use runecorasick::AhoCorasick;
    ///
    /// let mut pma = AhoCorasick::new(["he", "she"]);
    ///
    /// assert_eq!(vec![1, 0], pma.find_all("she"));
    /// assert_eq!(vec![0], pma.find_all("hehe"));
    /// ```
    pub fn find_all<P>(&mut self, haystack: P) -> Vec<usize>
    where
        P: AsRef<[u8]>,
    {
        let generation = self.generation.get_mut();
        *generation += 1;
        let generation = *generation;

        let marks = &mut self.marks;
        collect_hits(&self.states, haystack.as_ref(), |state_id, _| {
            let mark = &mut marks[state_id];
            if *mark == generation {
                false
            } else {
                *mark = generation;
                true
            }
        })
    }

    /// Returns the indices of the patterns found in the given haystack, in the order they are
    /// encountered.
    ///
    /// The result is the same as [`AhoCorasick::find_all`], but the automaton is not modified,
    /// so any number of threads can call this at once.
    ///
    /// # Arguments
    ///
    /// * `haystack` - String to search for.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    /// use std::thread;
    ///
    /// use runecorasick::AhoCorasick;
    ///
    /// let pma = Arc::new(AhoCorasick::new(["he", "she"]));
    ///
    /// let handles: Vec<_> = (0..4)
    ///     .map(|_| {
    ///         let pma = Arc::clone(&pma);
    ///         thread::spawn(move || pma.find_all_thread_safe("ushers"))
    ///     })
    ///     .collect();
    /// for handle in handles {
    ///     assert_eq!(vec![1, 0], handle.join().unwrap());
    /// }
    /// ```
    pub fn find_all_thread_safe<P>(&self, haystack: P) -> Vec<usize>
    where
        P: AsRef<[u8]>,
    {
        let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;

        let mut scratch = self.pool.acquire();
        collect_hits(&self.states, haystack.as_ref(), |_, pattern| {
            let mark = &mut scratch[pattern];
            if *mark == generation {
                false
            } else {
                *mark = generation;
                true
            }
        })
    }

    /// Returns `true` if any pattern occurs in the given haystack.
    ///
    /// # Arguments
    ///
    /// * `haystack` - String to search for.
    ///
    /// # Examples
    ///
    /// ```
    /// use runecorasick::AhoCorasick;
    ///
    /// let pma = AhoCorasick::new(["中文"]);
    ///
    /// assert!(pma.contains("这是中文内容"));
    /// assert!(!pma.contains("中间的文字"));
    /// ```
    pub fn contains<P>(&self, haystack: P) -> bool
    where
        P: AsRef<[u8]>,
    {
        let mut state_id = ROOT_STATE_ID;
        for (_, c) in CharWithEndOffsetIterator::new(haystack.as_ref()) {
            state_id = next_state_id(&self.states, state_id, c);
            let state = &self.states[state_id];
            if state.output.is_some() || state.suffix.is_some() {
                return true;
            }
        }
        false
    }

    /// Returns the index of the first pattern found in the given haystack.
    ///
    /// The scan stops at the first position where some pattern ends. If several patterns end
    /// there, the longest one is returned.
    ///
    /// # Arguments
    ///
    /// * `haystack` - String to search for.
    ///
    /// # Examples
    ///
    /// ```
    /// use runecorasick::AhoCorasick;
    ///
    /// let pma = AhoCorasick::new(["bcd", "cd", "abc"]);
    ///
    /// assert_eq!(Some(2), pma.find_first("abcd"));
    /// assert_eq!(Some(0), pma.find_first("xbcd"));
    /// assert_eq!(None, pma.find_first("bc"));
    /// ```
    pub fn find_first<P>(&self, haystack: P) -> Option<usize>
    where
        P: AsRef<[u8]>,
    {
        let mut state_id = ROOT_STATE_ID;
        for (_, c) in CharWithEndOffsetIterator::new(haystack.as_ref()) {
            state_id = next_state_id(&self.states, state_id, c);
            let state = &self.states[state_id];
            let pattern = state
                .output
                .or_else(|| state.suffix.and_then(|id| self.states[id].output));
            if pattern.is_some() {
                return pattern;
            }
        }
        None
    }

    /// Returns an iterator of all occurrences of patterns in the given haystack, including
    /// repeated and overlapping ones.
    ///
    /// Matches are reported in order of their ending positions. Matches ending at the same
    /// position are reported from the longest to the shortest. Positions are byte offsets in
    /// the haystack.
    ///
    /// # Arguments
    ///
    /// * `haystack` - String to search for.
    ///
    /// # Examples
    ///
    /// ```
    /// use runecorasick::AhoCorasick;
    ///
    /// let pma = AhoCorasick::new(["全世界", "世界", "に"]);
    ///
    /// let mut it = pma.find_overlapping_iter("全世界中に");
    ///
    /// let m = it.next().unwrap();
    /// assert_eq!((0, 9, 0), (m.start(), m.end(), m.pattern()));
    ///
    /// let m = it.next().unwrap();
    /// assert_eq!((3, 9, 1), (m.start(), m.end(), m.pattern()));
    ///
    /// let m = it.next().unwrap();
    /// assert_eq!((12, 15, 2), (m.start(), m.end(), m.pattern()));
    ///
    /// assert_eq!(None, it.next());
    /// ```
    pub fn find_overlapping_iter<'a, 'h, P>(
        &'a self,
        haystack: &'h P,
    ) -> FindOverlappingIterator<'a, 'h>
    where
        P: AsRef<[u8]> + ?Sized,
    {
        FindOverlappingIterator::new(self, haystack.as_ref())
    }

    /// Returns the index reported for the given pattern if it is in the dictionary.
    ///
    /// # Arguments
    ///
    /// * `pattern` - Pattern to search for.
    ///
    /// # Examples
    ///
    /// ```
    /// use runecorasick::AhoCorasick;
    ///
    /// let pma = AhoCorasick::new(["bcd", "ab", "a", "ab"]);
    ///
    /// assert_eq!(Some(0), pma.find_pattern_id("bcd"));
    /// assert_eq!(Some(3), pma.find_pattern_id("ab"));
    /// assert_eq!(Some(2), pma.find_pattern_id("a"));
    /// assert_eq!(None, pma.find_pattern_id("abc"));
    /// assert_eq!(None, pma.find_pattern_id(""));
    /// ```
    pub fn find_pattern_id<P>(&self, pattern: P) -> Option<usize>
    where
        P: AsRef<[u8]>,
    {
        let mut state_id = ROOT_STATE_ID;
        for (_, c) in CharWithEndOffsetIterator::new(pattern.as_ref()) {
            state_id = *self.states[state_id].edges.get(&c)?;
        }
        self.states[state_id].output
    }

    /// Returns the total number of states this automaton has, including the root.
    pub fn num_states(&self) -> usize {
        self.states.len()
    }

    /// Returns the number of dictionary entries, including empty and duplicate ones.
    pub fn num_patterns(&self) -> usize {
        self.pattern_lens.len()
    }

    /// Returns the payload size of this automaton in bytes.
    ///
    /// Each edge is counted as one `(char, usize)` pair. The node overhead of the edge maps
    /// and the idle tables kept for [`AhoCorasick::find_all_thread_safe`] are not counted,
    /// so the actual heap usage is larger.
    pub fn heap_bytes(&self) -> usize {
        let num_edges: usize = self.states.iter().map(|s| s.edges.len()).sum();
        self.states.len() * std::mem::size_of::<State>()
            + num_edges * std::mem::size_of::<(char, usize)>()
            + self.marks.len() * std::mem::size_of::<u64>()
            + self.pattern_lens.len() * std::mem::size_of::<usize>()
    }
}

/// Walks the haystack and collects the patterns accepted by `unique`, which receives the
/// state id and the pattern index of each candidate.
///
/// The walk along suffix links stops at the first candidate that `unique` rejects: the rest
/// of that chain was reported together with it.
#[inline(always)]
fn collect_hits<F>(states: &[State], haystack: &[u8], mut unique: F) -> Vec<usize>
where
    F: FnMut(usize, usize) -> bool,
{
    let mut hits = Vec::with_capacity(8);
    let mut state_id = ROOT_STATE_ID;
    for (_, c) in CharWithEndOffsetIterator::new(haystack) {
        state_id = next_state_id(states, state_id, c);
        let state = &states[state_id];
        if let Some(pattern) = state.output {
            if unique(state_id, pattern) {
                hits.push(pattern);
            }
        }
        let mut suffix = state.suffix;
        while let Some(suffix_id) = suffix {
            let suffix_state = &states[suffix_id];
            let Some(pattern) = suffix_state.output else {
                break;
            };
            if !unique(suffix_id, pattern) {
                break;
            }
            hits.push(pattern);
            suffix = suffix_state.suffix;
        }
    }
    hits
}

#[inline(always)]
pub(crate) fn next_state_id(states: &[State], mut state_id: usize, c: char) -> usize {
    loop {
        let state = &states[state_id];
        if let Some(&child_id) = state.edges.get(&c) {
            return child_id;
        }
        if state_id == ROOT_STATE_ID {
            return ROOT_STATE_ID;
        }
        state_id = state.fail;
    }
}
