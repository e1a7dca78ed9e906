use bench::{generate_patterns, Alphabet};

fn main() {
    for (title, alphabet, num) in [
        ("ascii_100", Alphabet::Ascii, 100),
        ("ascii_5000", Alphabet::Ascii, 5000),
        ("ascii_100000", Alphabet::Ascii, 100000),
        ("japanese_5000", Alphabet::Japanese, 5000),
        ("japanese_100000", Alphabet::Japanese, 100000),
    ] {
        println!("== {title} ==");
        let patterns = generate_patterns(alphabet, num, 0);
        show_memory_stats(&patterns);
    }
}

fn show_memory_stats(patterns: &[String]) {
    {
        let pma = runecorasick::AhoCorasick::new(patterns);
        format_memory("runecorasick", pma.heap_bytes());
        println!("  states: {}", pma.num_states());
    }
    {
        let pma = aho_corasick::AhoCorasick::new(patterns).unwrap();
        format_memory("aho_corasick", pma.memory_usage());
    }
}

fn format_memory(title: &str, bytes: usize) {
    println!(
        "{}: {} bytes, {:.3} MiB",
        title,
        bytes,
        bytes as f64 / (1024.0 * 1024.0)
    );
}
