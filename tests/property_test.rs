use std::collections::HashSet;

use proptest::prelude::*;

use runecorasick::AhoCorasick;

fn dictionary() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[ab中]{0,4}", 0..12)
}

fn haystack() -> impl Strategy<Value = String> {
    "[abc中文]{0,40}"
}

/// Decodes one character at each position, or a `U+FFFD` for a single byte when no valid
/// sequence starts there.
fn decode_per_byte(bytes: &[u8]) -> String {
    let mut decoded = String::new();
    let mut pos = 0;
    while pos < bytes.len() {
        let valid = (1..=4)
            .take_while(|&len| pos + len <= bytes.len())
            .find_map(|len| std::str::from_utf8(&bytes[pos..pos + len]).ok());
        match valid {
            Some(s) => {
                decoded.push_str(s);
                pos += s.len();
            }
            None => {
                decoded.push(char::REPLACEMENT_CHARACTER);
                pos += 1;
            }
        }
    }
    decoded
}

proptest! {
    #[test]
    fn contains_iff_find_all_nonempty(patterns in dictionary(), text in haystack()) {
        let mut pma = AhoCorasick::new(&patterns);
        prop_assert_eq!(pma.contains(&text), !pma.find_all(&text).is_empty());
    }

    #[test]
    fn find_first_is_first_of_find_all(patterns in dictionary(), text in haystack()) {
        let mut pma = AhoCorasick::new(&patterns);
        let first = pma.find_first(&text);
        let all = pma.find_all(&text);
        prop_assert_eq!(first, all.first().copied());
        if let Some(first) = first {
            prop_assert!(all.contains(&first));
        }
    }

    #[test]
    fn find_all_is_idempotent(patterns in dictionary(), text in haystack()) {
        let mut pma = AhoCorasick::new(&patterns);
        let first = pma.find_all(&text);
        let second = pma.find_all(&text);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn thread_safe_equals_single_threaded(patterns in dictionary(), text in haystack()) {
        let mut pma = AhoCorasick::new(&patterns);
        let shared = pma.find_all_thread_safe(&text);
        prop_assert_eq!(pma.find_all(&text), shared);
    }

    #[test]
    fn find_all_reports_exactly_the_occurring_patterns(
        patterns in dictionary(),
        text in haystack(),
    ) {
        let mut pma = AhoCorasick::new(&patterns);
        let all = pma.find_all(&text);

        let reported: HashSet<_> = all.iter().copied().collect();
        prop_assert_eq!(reported.len(), all.len());

        // The last occurrence of each non-empty pattern is the one reported.
        let expected: HashSet<_> = patterns
            .iter()
            .enumerate()
            .filter(|(_, p)| !p.is_empty() && text.contains(p.as_str()))
            .filter(|&(i, p)| patterns[i + 1..].iter().all(|q| q != p))
            .map(|(i, _)| i)
            .collect();
        prop_assert_eq!(expected, reported);
    }

    #[test]
    fn bytes_and_str_agree(patterns in dictionary(), text in haystack()) {
        let mut pma = AhoCorasick::new(&patterns);
        let from_str = pma.find_all(text.as_str());
        prop_assert_eq!(from_str, pma.find_all(text.as_bytes()));
    }

    #[test]
    fn invalid_bytes_read_as_replacement_per_byte(
        patterns in dictionary(),
        bytes in prop::collection::vec(any::<u8>(), 0..40),
    ) {
        let mut pma = AhoCorasick::new(&patterns);
        let decoded = decode_per_byte(&bytes);
        let from_bytes = pma.find_all(&bytes);
        prop_assert_eq!(from_bytes, pma.find_all(&decoded));
    }
}
