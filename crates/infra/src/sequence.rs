//! Invoice sequence counters.
//!
//! `InMemorySequence` follows the count of invoices issued in this process and
//! restarts with it. `FileSequence` keeps the last issued value on disk so
//! numbering continues across runs.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SequenceError {
    #[error("sequence file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("sequence file {path} does not hold a counter: {content:?}")]
    Corrupt { path: PathBuf, content: String },
    #[error("sequence exhausted")]
    Exhausted,
}

/// Source of invoice sequence numbers. Values start at 1 and only grow.
pub trait InvoiceSequence {
    fn next_value(&mut self) -> Result<u64, SequenceError>;

    /// Last value handed out (0 if none).
    fn current(&self) -> Result<u64, SequenceError>;
}

#[derive(Debug, Default, Clone)]
pub struct InMemorySequence {
    last: u64,
}

impl InMemorySequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_after(last: u64) -> Self {
        Self { last }
    }
}

impl InvoiceSequence for InMemorySequence {
    fn next_value(&mut self) -> Result<u64, SequenceError> {
        self.last = self.last.checked_add(1).ok_or(SequenceError::Exhausted)?;
        Ok(self.last)
    }

    fn current(&self) -> Result<u64, SequenceError> {
        Ok(self.last)
    }
}

/// Durable counter stored as a single decimal number in a text file.
///
/// Updates go through a sibling temp file and a rename. A missing file reads
/// as 0.
#[derive(Debug, Clone)]
pub struct FileSequence {
    path: PathBuf,
}

impl FileSequence {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SequenceError> {
        let path = path.into();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| SequenceError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let sequence = Self { path };
        // Surface a corrupt file at open time rather than at first issue.
        sequence.current()?;
        Ok(sequence)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_err(&self, source: io::Error) -> SequenceError {
        SequenceError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn store(&self, value: u64) -> Result<(), SequenceError> {
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, format!("{value}\n")).map_err(|e| self.io_err(e))?;
        fs::rename(&tmp, &self.path).map_err(|e| self.io_err(e))
    }
}

impl InvoiceSequence for FileSequence {
    fn next_value(&mut self) -> Result<u64, SequenceError> {
        let next = self
            .current()?
            .checked_add(1)
            .ok_or(SequenceError::Exhausted)?;
        self.store(next)?;
        tracing::debug!(path = %self.path.display(), value = next, "sequence advanced");
        Ok(next)
    }

    fn current(&self) -> Result<u64, SequenceError> {
        match fs::read_to_string(&self.path) {
            Ok(content) => content
                .trim()
                .parse::<u64>()
                .map_err(|_| SequenceError::Corrupt {
                    path: self.path.clone(),
                    content,
                }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(0),
            Err(e) => Err(self.io_err(e)),
        }
    }
}

/// Sequence selected at runtime from configuration.
#[derive(Debug, Clone)]
pub enum ConfiguredSequence {
    Memory(InMemorySequence),
    File(FileSequence),
}

impl ConfiguredSequence {
    pub fn from_path(path: Option<&Path>) -> Result<Self, SequenceError> {
        match path {
            Some(path) => Ok(Self::File(FileSequence::open(path)?)),
            None => Ok(Self::Memory(InMemorySequence::new())),
        }
    }
}

impl InvoiceSequence for ConfiguredSequence {
    fn next_value(&mut self) -> Result<u64, SequenceError> {
        match self {
            Self::Memory(s) => s.next_value(),
            Self::File(s) => s.next_value(),
        }
    }

    fn current(&self) -> Result<u64, SequenceError> {
        match self {
            Self::Memory(s) => s.current(),
            Self::File(s) => s.current(),
        }
    }
}
