//! Deterministic corpora shared by the benchmarks and the memory report.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Alphabets used to generate corpora.
#[derive(Clone, Copy, Debug)]
pub enum Alphabet {
    /// Lowercase ASCII letters.
    Ascii,
    /// Common kanji and hiragana, all encoded in three bytes.
    Japanese,
}

impl Alphabet {
    fn chars(self) -> &'static [char] {
        match self {
            Self::Ascii => &[
                'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o', 'p',
                'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z',
            ],
            Self::Japanese => &[
                'あ', 'い', 'う', 'え', 'お', 'か', 'き', 'く', 'の', 'に', 'は', 'を', '日', '本',
                '語', '世', '界', '中', '文', '字',
            ],
        }
    }
}

fn generate_string(rng: &mut StdRng, alphabet: Alphabet, len: usize) -> String {
    let chars = alphabet.chars();
    (0..len)
        .map(|_| chars[rng.gen_range(0..chars.len())])
        .collect()
}

/// Generates `num` sorted patterns of 2 to 8 characters.
pub fn generate_patterns(alphabet: Alphabet, num: usize, seed: u64) -> Vec<String> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut patterns: Vec<_> = (0..num)
        .map(|_| {
            let len = rng.gen_range(2..=8);
            generate_string(&mut rng, alphabet, len)
        })
        .collect();
    patterns.sort_unstable();
    patterns
}

/// Generates `num` lines of 80 characters.
pub fn generate_haystacks(alphabet: Alphabet, num: usize, seed: u64) -> Vec<String> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..num)
        .map(|_| generate_string(&mut rng, alphabet, 80))
        .collect()
}
