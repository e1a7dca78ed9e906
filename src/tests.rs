use std::collections::{HashMap, HashSet};

use rand::Rng;

use crate::automaton::{State, ROOT_STATE_ID};
use crate::{AhoCorasick, AhoCorasickBuilder};

/// Generates a random string consisting of `size` characters from `"random乱数"`.
fn generate_random_string(size: usize) -> String {
    const CHARSET: &[char] = &['r', 'a', 'n', 'd', 'o', 'm', '乱', '数'];
    let mut rng = rand::thread_rng();
    (0..size)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())])
        .collect()
}

// props are a sequence of (num, length) to generate.
fn generate_random_patterns(props: &[(usize, usize)]) -> Vec<String> {
    let mut patterns = HashSet::new();
    for &(num, len) in props {
        for _ in 0..num {
            patterns.insert(generate_random_string(len));
        }
    }
    patterns.into_iter().collect()
}

/// Finds all occurrences in a naive manner, returning `(start, end, pattern)` triples.
fn naive_find_overlapping(patterns: &[String], haystack: &str) -> HashSet<(usize, usize, usize)> {
    let mut answers = HashSet::new();
    for (start, _) in haystack.char_indices() {
        for (i, pattern) in patterns.iter().enumerate() {
            if !pattern.is_empty() && haystack[start..].starts_with(pattern.as_str()) {
                answers.insert((start, start + pattern.len(), i));
            }
        }
    }
    answers
}

#[test]
fn test_structure() {
    /*
     *          e--> 2 --r--> 8 --s--> 9
     *         /
     *   h--> 1 --i--> 6 --s--> 7
     *  /
     * 0 --s--> 3 --h--> 4 --e--> 5
     */
    let pma = AhoCorasick::new(["he", "she", "his", "hers"]);

    let fail_expected = vec![0, 0, 0, 0, 1, 2, 0, 3, 0, 3];
    let suffix_expected = vec![None, None, None, None, None, Some(2), None, None, None, None];
    let output_expected = vec![
        None,
        None,
        Some(0),
        None,
        None,
        Some(1),
        None,
        Some(2),
        None,
        Some(3),
    ];

    let fail: Vec<_> = pma.states.iter().map(|s| s.fail).collect();
    let suffix: Vec<_> = pma.states.iter().map(|s| s.suffix).collect();
    let output: Vec<_> = pma.states.iter().map(|s| s.output).collect();

    assert_eq!(fail_expected, fail);
    assert_eq!(suffix_expected, suffix);
    assert_eq!(output_expected, output);
    assert_eq!(10, pma.num_states());
}

#[test]
fn test_heap_bytes_counts_payload() {
    use std::mem::size_of;

    // 4 states with 3 edges, and 2 patterns.
    let pma = AhoCorasick::new(["ab", "c"]);
    let expected = 4 * size_of::<State>()
        + 3 * size_of::<(char, usize)>()
        + 4 * size_of::<u64>()
        + 2 * size_of::<usize>();
    assert_eq!(expected, pma.heap_bytes());

    // Cloning does not change the payload.
    assert_eq!(expected, pma.clone().heap_bytes());
}

#[test]
fn test_arena_sized_by_chars() {
    // 2 + 2 + 1 characters, all on distinct paths.
    let pma = AhoCorasick::new(["中文", "文中", "x"]);
    assert_eq!(6, pma.num_states());
    assert_eq!(6, pma.marks.len());

    // Shared prefixes only need one state per distinct path.
    let pma = AhoCorasick::new(["abc", "abd", "ab"]);
    assert_eq!(5, pma.num_states());
}

#[test]
fn test_root() {
    let pma = AhoCorasick::new(["", "a"]);
    let root = &pma.states[ROOT_STATE_ID];
    assert_eq!(None, root.output);
    assert_eq!(None, root.suffix);
    assert_eq!(ROOT_STATE_ID, root.fail);
    assert_eq!(vec![0, 1], pma.pattern_lens);
}

#[test]
fn test_find_all_ushers() {
    let mut pma = AhoCorasick::new(["he", "she", "his", "hers"]);
    assert_eq!(vec![1, 0, 3], pma.find_all("ushers"));
    assert_eq!(vec![1, 0, 3], pma.find_all_thread_safe("ushers"));
}

#[test]
fn test_generations_are_per_call() {
    let mut pma = AhoCorasick::new(["he", "she"]);
    assert_eq!(vec![1, 0], pma.find_all("she"));
    assert_eq!(vec![1, 0], pma.find_all("she"));
    assert_eq!(2, *pma.generation.get_mut());
    assert_eq!(vec![1, 0], pma.find_all_thread_safe("she"));
    assert_eq!(3, *pma.generation.get_mut());
    assert_eq!(vec![1, 0], pma.find_all("she"));
}

#[test]
fn test_thread_safe_does_not_touch_marks() {
    let pma = AhoCorasick::new(["he", "she"]);
    pma.find_all_thread_safe("she");
    assert!(pma.marks.iter().all(|&m| m == 0));
    assert_eq!(1, pma.pool.num_idle());
}

#[test]
fn test_pool_capacity_zero() {
    let pma = AhoCorasickBuilder::new().pool_capacity(0).build(["a"]);
    assert_eq!(vec![0], pma.find_all_thread_safe("aaa"));
    assert_eq!(0, pma.pool.num_idle());
}

#[test]
fn test_suffix_chain_is_output_only() {
    for _ in 0..20 {
        let patterns = generate_random_patterns(&[(30, 1), (30, 2), (30, 3), (30, 4)]);
        let pma = AhoCorasick::new(&patterns);
        for state in &pma.states {
            if let Some(suffix_id) = state.suffix {
                assert_ne!(ROOT_STATE_ID, suffix_id);
                assert!(pma.states[suffix_id].output.is_some());
            }
        }
    }
}

#[test]
fn test_fail_depth_decreases_random() {
    for _ in 0..20 {
        let patterns = generate_random_patterns(&[(50, 2), (50, 4), (50, 6)]);
        let pma = AhoCorasick::new(&patterns);

        let mut depths = vec![usize::MAX; pma.num_states()];
        depths[ROOT_STATE_ID] = 0;
        let mut stack = vec![ROOT_STATE_ID];
        while let Some(state_id) = stack.pop() {
            for &child_id in pma.states[state_id].edges.values() {
                assert_eq!(usize::MAX, depths[child_id]);
                depths[child_id] = depths[state_id] + 1;
                stack.push(child_id);
            }
        }
        // Every state is reachable from the root.
        assert!(depths.iter().all(|&d| d != usize::MAX));

        for (state_id, state) in pma.states.iter().enumerate().skip(1) {
            assert!(depths[state.fail] < depths[state_id]);
        }
    }
}

#[test]
fn test_find_all_random() {
    for _ in 0..100 {
        let patterns = generate_random_patterns(&[(10, 1), (20, 2), (30, 3), (40, 4)]);
        let haystack = generate_random_string(100);
        let mut pma = AhoCorasick::new(&patterns);

        let expected: HashSet<_> = naive_find_overlapping(&patterns, &haystack)
            .into_iter()
            .map(|(_, _, pattern)| pattern)
            .collect();

        let actual = pma.find_all(&haystack);
        let actual_set: HashSet<_> = actual.iter().copied().collect();
        assert_eq!(actual.len(), actual_set.len(), "{}", haystack);
        assert_eq!(expected, actual_set, "{}", haystack);

        assert_eq!(actual, pma.find_all_thread_safe(&haystack));
        assert_eq!(!actual.is_empty(), pma.contains(&haystack));
        assert_eq!(actual.first().copied(), pma.find_first(&haystack));
    }
}

#[test]
fn test_find_overlapping_iter_random() {
    for _ in 0..100 {
        let patterns = generate_random_patterns(&[(10, 1), (20, 2), (30, 3), (40, 4)]);
        let haystack = generate_random_string(100);
        let pma = AhoCorasick::new(&patterns);

        let expected = naive_find_overlapping(&patterns, &haystack);
        let mut actual = HashSet::new();
        for m in pma.find_overlapping_iter(&haystack) {
            assert_eq!(
                patterns[m.pattern()],
                &haystack[m.start()..m.end()],
                "{}",
                haystack
            );
            assert!(actual.insert((m.start(), m.end(), m.pattern())));
        }
        assert_eq!(expected, actual, "{}", haystack);
    }
}

#[test]
fn test_find_first_random() {
    for _ in 0..100 {
        let patterns = generate_random_patterns(&[(10, 2), (20, 3), (30, 5)]);
        let haystack = generate_random_string(50);
        let pma = AhoCorasick::new(&patterns);

        // The earliest end wins, then the longest pattern.
        let mut best: HashMap<usize, (usize, usize)> = HashMap::new();
        for (start, end, pattern) in naive_find_overlapping(&patterns, &haystack) {
            let entry = best.entry(end).or_insert((start, pattern));
            if start < entry.0 {
                *entry = (start, pattern);
            }
        }
        let expected = best
            .into_iter()
            .min_by_key(|&(end, _)| end)
            .map(|(_, (_, pattern))| pattern);

        assert_eq!(expected, pma.find_first(&haystack), "{}", haystack);
    }
}

#[test]
fn test_find_pattern_id_random() {
    let patterns = generate_random_patterns(&[(100, 3), (100, 6)]);
    let pma = AhoCorasick::new(&patterns);
    for (i, pattern) in patterns.iter().enumerate() {
        assert_eq!(Some(i), pma.find_pattern_id(pattern));
    }
}
