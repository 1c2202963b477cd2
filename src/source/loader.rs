use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use tracing::debug;

/// Longest UTF-8 encoding of one character
const MAX_UTF8_BYTES: usize = 4;

/// Default content budget per file, in characters
pub const DEFAULT_MAX_CHARS: usize = 20_000;

/// Reads source files with a bounded size
///
/// Loading never fails: unreadable files come back as an empty string, which
/// the orchestrator treats as "nothing to analyse".
#[derive(Debug, Clone, Copy)]
pub struct ContentLoader {
    max_chars: usize,
}

impl Default for ContentLoader {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_CHARS)
    }
}

impl ContentLoader {
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }

    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    /// Returns at most `max_chars` characters of the file, decoded lossily
    ///
    /// Only the first `4 * max_chars` bytes are read, which always covers
    /// `max_chars` decoded characters.
    pub fn load(&self, path: &Path) -> String {
        let limit = u64::try_from(self.max_chars.saturating_mul(MAX_UTF8_BYTES)).unwrap_or(u64::MAX);
        match read_prefix(path, limit) {
            Ok(bytes) => truncate_chars(&String::from_utf8_lossy(&bytes), self.max_chars),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "Failed to read file");
                String::new()
            }
        }
    }
}

fn read_prefix(path: &Path, limit: u64) -> io::Result<Vec<u8>> {
    let mut bytes = Vec::new();
    File::open(path)?.take(limit).read_to_end(&mut bytes)?;
    Ok(bytes)
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => text[..byte_index].to_string(),
        None => text.to_string(),
    }
}
