use std::borrow::Cow;
use std::fs::{self, File};
use std::io::{self, prelude::*, BufReader};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, ValueEnum};
use rayon::prelude::*;
use runecorasick::AhoCorasick;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};
use tracing_subscriber::{fmt, EnvFilter};

mod errors;

use errors::FindError;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ArgColor {
    Never,
    Always,
    Auto,
}

impl From<ArgColor> for ColorChoice {
    fn from(color: ArgColor) -> Self {
        match color {
            ArgColor::Never => Self::Never,
            ArgColor::Always => Self::Always,
            ArgColor::Auto => Self::Auto,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "runefind", about = "A program to find patterns in files.")]
struct Args {
    /// Match patterns separated with new lines.
    #[arg(short, long)]
    patterns: Option<String>,

    /// A filename containing patterns.
    #[arg(short = 'f', long)]
    pattern_file: Option<PathBuf>,

    /// Suppresses printing filenames.
    #[arg(short = 'H', long)]
    no_filename: bool,

    /// Prints line numbers.
    #[arg(short = 'n', long)]
    line_number: bool,

    /// Highlights the matching texts.
    #[arg(long, value_enum, default_value_t = ArgColor::Never)]
    color: ArgColor,

    /// Prints the patterns found in each input instead of matching lines.
    #[arg(short, long)]
    list: bool,

    /// File paths. The standard input is read when none is given.
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,
}

fn init_logging() {
    let filter =
        EnvFilter::try_from_env("RUNEFIND_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Collects patterns from `-f` and `-p`, skipping empty lines. The pattern file is read as
/// bytes, so invalid UTF-8 is matched the same way as in inputs.
fn load_patterns(args: &Args) -> Result<Vec<Vec<u8>>, FindError> {
    let mut patterns = vec![];
    if let Some(path) = &args.pattern_file {
        let pattern_file_error = |source| FindError::PatternFile {
            path: path.clone(),
            source,
        };
        let buf = BufReader::new(File::open(path).map_err(pattern_file_error)?);
        for line in buf.split(b'\n') {
            let mut line = line.map_err(pattern_file_error)?;
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            if !line.is_empty() {
                patterns.push(line);
            }
        }
    }
    if let Some(pats_string) = &args.patterns {
        for pattern in pats_string.split('\n') {
            if !pattern.is_empty() {
                patterns.push(pattern.as_bytes().to_vec());
            }
        }
    }
    if patterns.is_empty() {
        return Err(FindError::NoPatterns);
    }
    Ok(patterns)
}

fn write_prefix(
    stream: &mut StandardStream,
    filename: Option<&str>,
    line_no: Option<usize>,
) -> io::Result<()> {
    if let Some(filename) = filename {
        write!(stream, "{filename}:")?;
    }
    if let Some(line_no) = line_no {
        write!(stream, "{line_no}:")?;
    }
    Ok(())
}

/// Finds patterns using the given PMA and prints lines to the given `stream`.
/// When no pattern is found, this function does not print anything.
fn find_and_output(
    pma: &AhoCorasick,
    line: &[u8],
    filename: Option<&str>,
    line_no: Option<usize>,
    color: ArgColor,
    stream: &mut StandardStream,
) -> io::Result<()> {
    match color {
        ArgColor::Never => {
            if pma.contains(line) {
                write_prefix(stream, filename, line_no)?;
                stream.write_all(line)?;
                writeln!(stream)?;
            }
        }
        ArgColor::Always | ArgColor::Auto => {
            let mut color_counts = vec![0isize; line.len() + 1];
            let mut matched = false;
            for m in pma.find_overlapping_iter(line) {
                matched = true;
                color_counts[m.start()] += 1;
                color_counts[m.end()] -= 1;
            }
            if matched {
                write_prefix(stream, filename, line_no)?;
                let mut depth = 0;
                let mut prev_pos = 0;
                for (pos, c) in color_counts.into_iter().enumerate() {
                    let new_depth = depth + c;
                    if depth == 0 && new_depth != 0 {
                        stream.reset()?;
                        stream.write_all(&line[prev_pos..pos])?;
                        prev_pos = pos;
                    } else if depth != 0 && new_depth == 0 {
                        stream.set_color(ColorSpec::new().set_fg(Some(Color::Red)))?;
                        stream.write_all(&line[prev_pos..pos])?;
                        prev_pos = pos;
                    }
                    depth = new_depth;
                }
                stream.reset()?;
                stream.write_all(&line[prev_pos..])?;
                writeln!(stream)?;
            }
        }
    }
    Ok(())
}

/// Prints the matching lines of `reader`. Lines are read as bytes, so invalid UTF-8 does not
/// stop the scan.
fn scan_lines<R>(
    pma: &AhoCorasick,
    reader: R,
    filename: Option<&str>,
    args: &Args,
    stream: &mut StandardStream,
) -> io::Result<()>
where
    R: BufRead,
{
    for (i, line) in reader.split(b'\n').enumerate() {
        let mut line = line?;
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        let line_no = args.line_number.then_some(i + 1);
        find_and_output(pma, &line, filename, line_no, args.color, stream)?;
    }
    Ok(())
}

fn display_name<'a>(path: &'a Path, args: &Args) -> Option<Cow<'a, str>> {
    if args.no_filename {
        None
    } else {
        Some(path.to_string_lossy())
    }
}

/// Prints the matching lines of every input and returns the number of inputs that could
/// not be read.
fn print_lines(
    pma: &AhoCorasick,
    args: &Args,
    stream: &mut StandardStream,
) -> anyhow::Result<usize> {
    if args.files.is_empty() {
        scan_lines(pma, io::stdin().lock(), None, args, stream)
            .context("reading the standard input")?;
        return Ok(0);
    }
    let mut num_failed = 0;
    for path in &args.files {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "cannot open input");
                num_failed += 1;
                continue;
            }
        };
        let filename = display_name(path, args);
        if let Err(err) = scan_lines(pma, BufReader::new(file), filename.as_deref(), args, stream)
        {
            tracing::warn!(path = %path.display(), %err, "cannot read input");
            num_failed += 1;
        }
    }
    Ok(num_failed)
}

/// Prints the distinct patterns found in each input and returns the number of inputs that
/// could not be read. Files are scanned in parallel.
fn print_found_patterns(
    pma: &AhoCorasick,
    patterns: &[Vec<u8>],
    args: &Args,
    stream: &mut StandardStream,
) -> anyhow::Result<usize> {
    if args.files.is_empty() {
        let mut haystack = vec![];
        io::stdin()
            .lock()
            .read_to_end(&mut haystack)
            .context("reading the standard input")?;
        for idx in pma.find_all_thread_safe(&haystack) {
            writeln!(stream, "{}", String::from_utf8_lossy(&patterns[idx]))?;
        }
        return Ok(0);
    }

    let results: Vec<_> = args
        .files
        .par_iter()
        .map(|path| (path, fs::read(path).map(|h| pma.find_all_thread_safe(h))))
        .collect();
    let mut num_failed = 0;
    for (path, result) in results {
        match result {
            Ok(found) => {
                let filename = display_name(path, args);
                for idx in found {
                    write_prefix(stream, filename.as_deref(), None)?;
                    writeln!(stream, "{}", String::from_utf8_lossy(&patterns[idx]))?;
                }
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "cannot read input");
                num_failed += 1;
            }
        }
    }
    Ok(num_failed)
}

fn main() -> anyhow::Result<()> {
    init_logging();
    let args = Args::parse();

    // Builds a PMA from given patterns.
    let patterns = load_patterns(&args)?;
    let pma = AhoCorasick::new(&patterns);
    tracing::info!(
        num_patterns = pma.num_patterns(),
        num_states = pma.num_states(),
        heap_bytes = pma.heap_bytes(),
        "automaton ready"
    );

    let mut stdout = StandardStream::stdout(args.color.into());
    let num_failed = if args.list {
        print_found_patterns(&pma, &patterns, &args, &mut stdout)?
    } else {
        print_lines(&pma, &args, &mut stdout)?
    };
    if num_failed != 0 {
        return Err(FindError::UnreadableInputs { num_failed }.into());
    }
    Ok(())
}
