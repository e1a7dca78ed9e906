//! # Runecorasick: code-point-wise Aho-Corasick
//!
//! A multi-pattern string search automaton that walks the haystack one Unicode
//! code point at a time, so a multi-byte character is never split by a match.
//!
//! ## Examples
//!
//! ```
//! use runecorasick::AhoCorasick;
//!
//! let patterns = vec!["he", "she", "中文"];
//! let mut pma = AhoCorasick::new(patterns);
//!
//! assert_eq!(vec![1, 0], pma.find_all("she"));
//! assert_eq!(vec![2], pma.find_all_thread_safe("这是中文内容"));
//! assert!(pma.contains("ushers"));
//! assert_eq!(Some(0), pma.find_first("the hero"));
//! assert_eq!(None, pma.find_first("文中"));
//! ```
//!
//! Positions are available through [`AhoCorasick::find_overlapping_iter()`]:
//!
//! ```
//! use runecorasick::AhoCorasick;
//!
//! let pma = AhoCorasick::new(["中文"]);
//!
//! let mut it = pma.find_overlapping_iter("这是中文内容");
//!
//! let m = it.next().unwrap();
//! assert_eq!((6, 12, 0), (m.start(), m.end(), m.pattern()));
//!
//! assert_eq!(None, it.next());
//! ```

#![deny(missing_docs)]

mod automaton;
mod builder;
pub mod iter;
mod pool;

#[cfg(test)]
mod tests;

pub use automaton::AhoCorasick;
pub use builder::AhoCorasickBuilder;

/// Match result.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Match {
    pub(crate) start: usize,
    pub(crate) end: usize,
    pub(crate) pattern: usize,
}

impl Match {
    /// Starting position of the match in bytes.
    #[inline(always)]
    pub const fn start(&self) -> usize {
        self.start
    }

    /// Ending position of the match in bytes.
    #[inline(always)]
    pub const fn end(&self) -> usize {
        self.end
    }

    /// Index of the matched pattern in the dictionary.
    #[inline(always)]
    pub const fn pattern(&self) -> usize {
        self.pattern
    }
}
