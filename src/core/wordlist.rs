//! Candidate-secret sources.
//!
//! A [`CandidateSource`] either fails to open or yields a lazy, finite,
//! non-restartable sequence of lines. The recovery engine never loads a
//! wordlist wholesale, so a match early in a huge file stops the read.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::error::JwtAuditError;

/// A capability that produces candidate secrets one line at a time.
pub trait CandidateSource {
    /// The line iterator handed out by [`CandidateSource::open`].
    type Candidates: Iterator<Item = io::Result<String>>;

    /// Human-readable label for logs and error messages.
    fn label(&self) -> String;

    /// Open the source for a single pass.
    ///
    /// # Errors
    ///
    /// Returns [`JwtAuditError::WordlistUnavailable`] when the source
    /// cannot be opened.
    fn open(self) -> Result<Self::Candidates, JwtAuditError>;
}

/// A newline-delimited wordlist on disk.
#[derive(Debug, Clone)]
pub struct WordlistFile {
    path: PathBuf,
}

impl WordlistFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CandidateSource for WordlistFile {
    type Candidates = WordlistLines<BufReader<File>>;

    fn label(&self) -> String {
        self.path.display().to_string()
    }

    fn open(self) -> Result<Self::Candidates, JwtAuditError> {
        let file = File::open(&self.path).map_err(|source| JwtAuditError::WordlistUnavailable {
            path: self.label(),
            source,
        })?;
        tracing::debug!(path = %self.path.display(), "opened wordlist");
        Ok(WordlistLines::new(BufReader::new(file)))
    }
}

/// Iterator over the lines of a reader.
///
/// Bytes that are not valid UTF-8 are replaced rather than rejected, so
/// one bad line never ends the search. Line terminators are stripped.
pub struct WordlistLines<R> {
    reader: R,
    buf: Vec<u8>,
}

impl<R: BufRead> WordlistLines<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
        }
    }
}

impl<R: BufRead> Iterator for WordlistLines<R> {
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => None,
            Ok(_) => {
                if self.buf.last() == Some(&b'\n') {
                    self.buf.pop();
                    if self.buf.last() == Some(&b'\r') {
                        self.buf.pop();
                    }
                }
                Some(Ok(String::from_utf8_lossy(&self.buf).into_owned()))
            }
            Err(e) => Some(Err(e)),
        }
    }
}

/// An in-memory wordlist, mostly for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemoryWordlist {
    lines: Vec<String>,
}

impl MemoryWordlist {
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }
}

impl CandidateSource for MemoryWordlist {
    type Candidates = std::iter::Map<std::vec::IntoIter<String>, fn(String) -> io::Result<String>>;

    fn label(&self) -> String {
        format!("<memory: {} lines>", self.lines.len())
    }

    fn open(self) -> Result<Self::Candidates, JwtAuditError> {
        Ok(self.lines.into_iter().map(Ok as fn(String) -> io::Result<String>))
    }
}
