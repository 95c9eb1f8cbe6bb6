//! Table readers
//!
//! Two ways to read a table file:
//! - `RowStream`: yields rows one at a time, holding only the current row
//!   in memory. Each call to `RowStream::open` reopens the file.
//! - `read_all`: decodes the whole array in one pass.
//!
//! A missing table file, or one that is empty or only whitespace, reads as
//! an empty table.

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use super::errors::{StorageError, StorageResult};
use super::row::Row;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StreamState {
    /// Before the opening `[`
    Start,
    /// Inside the array, expecting a row
    Rows,
    /// Closing `]` seen, source missing, or an error was returned
    Done,
}

/// Lazy, single-pass iterator over the rows of a table file.
///
/// The file handle is held only while the stream is alive. After an error
/// the stream yields `None`.
pub struct RowStream {
    path: PathBuf,
    reader: Option<BufReader<File>>,
    offset: u64,
    state: StreamState,
    pending: Option<u8>,
}

impl RowStream {
    /// Opens a stream over the table at `path`.
    ///
    /// # Errors
    ///
    /// Returns `JSONTABLE_STORAGE_READ_FAILED` if the file exists but
    /// cannot be opened.
    pub fn open(path: &Path) -> StorageResult<Self> {
        let reader = match File::open(path) {
            Ok(file) => Some(BufReader::new(file)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => return Err(StorageError::read_failed(path, e)),
        };

        let state = if reader.is_some() {
            StreamState::Start
        } else {
            StreamState::Done
        };

        Ok(Self {
            path: path.to_path_buf(),
            reader,
            offset: 0,
            state,
            pending: None,
        })
    }

    /// Returns the table file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the number of bytes consumed so far.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    fn next_byte(&mut self) -> StorageResult<Option<u8>> {
        if let Some(b) = self.pending.take() {
            return Ok(Some(b));
        }
        let Some(reader) = self.reader.as_mut() else {
            return Ok(None);
        };
        let buf = reader
            .fill_buf()
            .map_err(|e| StorageError::read_failed(&self.path, e))?;
        let Some(&b) = buf.first() else {
            return Ok(None);
        };
        reader.consume(1);
        self.offset += 1;
        Ok(Some(b))
    }

    fn next_significant(&mut self) -> StorageResult<Option<u8>> {
        loop {
            match self.next_byte()? {
                Some(b) if b.is_ascii_whitespace() => continue,
                other => return Ok(other),
            }
        }
    }

    fn malformed(&self, reason: impl Into<String>) -> StorageError {
        StorageError::malformed_at_offset(&self.path, self.offset, reason)
    }

    /// Checks that only whitespace follows the closing bracket.
    fn read_close(&mut self) -> StorageResult<()> {
        match self.next_significant()? {
            None => Ok(()),
            Some(_) => Err(self.malformed("trailing content after table array")),
        }
    }

    /// Consumes the opening bracket. Returns false for an empty source.
    fn read_open(&mut self) -> StorageResult<bool> {
        match self.next_significant()? {
            None => Ok(false),
            Some(b'[') => match self.next_significant()? {
                Some(b']') => self.read_close().map(|_| false),
                Some(b) => {
                    self.pending = Some(b);
                    Ok(true)
                }
                None => Err(self.malformed("unterminated table array")),
            },
            Some(_) => Err(self.malformed("table file must hold a JSON array")),
        }
    }

    /// Collects the bytes of one object, tracking nesting and string escapes.
    fn read_object(&mut self) -> StorageResult<Vec<u8>> {
        match self.next_significant()? {
            Some(b'{') => {}
            Some(_) => return Err(self.malformed("row is not a JSON object")),
            None => return Err(self.malformed("unterminated table array")),
        }

        let mut buf = vec![b'{'];
        let mut depth = 1usize;
        let mut in_string = false;
        let mut escaped = false;

        while depth > 0 {
            let b = self
                .next_byte()?
                .ok_or_else(|| self.malformed("unterminated row"))?;
            buf.push(b);

            if in_string {
                if escaped {
                    escaped = false;
                } else if b == b'\\' {
                    escaped = true;
                } else if b == b'"' {
                    in_string = false;
                }
                continue;
            }

            match b {
                b'"' => in_string = true,
                b'{' | b'[' => depth += 1,
                b'}' | b']' => depth -= 1,
                _ => {}
            }
        }

        Ok(buf)
    }

    fn read_row(&mut self) -> StorageResult<Row> {
        let bytes = self.read_object()?;
        let row: Row = serde_json::from_slice(&bytes)
            .map_err(|e| self.malformed(format!("invalid row: {}", e)))?;

        match self.next_significant()? {
            Some(b',') => {}
            Some(b']') => {
                self.read_close()?;
                self.state = StreamState::Done;
            }
            Some(_) => return Err(self.malformed("expected ',' or ']' after row")),
            None => return Err(self.malformed("unterminated table array")),
        }

        Ok(row)
    }

    fn advance(&mut self) -> StorageResult<Option<Row>> {
        if self.state == StreamState::Start {
            self.state = if self.read_open()? {
                StreamState::Rows
            } else {
                StreamState::Done
            };
        }

        match self.state {
            StreamState::Rows => self.read_row().map(Some),
            _ => Ok(None),
        }
    }
}

impl Iterator for RowStream {
    type Item = StorageResult<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.advance() {
            Ok(Some(row)) => Some(Ok(row)),
            Ok(None) => {
                self.reader = None;
                None
            }
            Err(e) => {
                self.state = StreamState::Done;
                self.reader = None;
                Some(Err(e))
            }
        }
    }
}

/// Reads the whole table into memory, in storage order.
pub fn read_all(path: &Path) -> StorageResult<Vec<Row>> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(StorageError::read_failed(path, e)),
    };

    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }

    serde_json::from_slice(&bytes)
        .map_err(|e| StorageError::malformed(path, format!("invalid table: {}", e)))
}
