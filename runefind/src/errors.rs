//! Definition of errors.

use std::io;
use std::path::PathBuf;

/// Errors in runefind.
#[derive(Debug, thiserror::Error)]
pub enum FindError {
    /// Neither `-p` nor `-f` supplied a non-empty pattern.
    #[error("no patterns given: use -p or -f")]
    NoPatterns,

    /// The pattern file could not be read.
    #[error("pattern file {}: {source}", .path.display())]
    PatternFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Some inputs could not be opened or read. The others were still scanned.
    #[error("{num_failed} input file(s) could not be read")]
    UnreadableInputs { num_failed: usize },
}
